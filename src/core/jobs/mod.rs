//! Periodic sweep jobs
//!
//! The four recurring operations: fetch (visit discovery), fill
//! (incremental section enrichment), mark-complete (lifecycle promotion)
//! and publish (bundle transmission). Jobs never call each other; they
//! are coupled only through the persisted record set, which keeps each
//! sweep independently schedulable, crash-safe and re-entrant.

pub mod complete;
pub mod fetch;
pub mod fill;
pub mod publish;

pub use complete::{is_complete, MarkCompleteJob};
pub use fetch::FetchJob;
pub use fill::FillJob;
pub use publish::PublishJob;
