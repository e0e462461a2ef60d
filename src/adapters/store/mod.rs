//! Visit store abstraction
//!
//! The store is the sole owner and sole writer of visit records. All
//! operations are point, single-record and immediately committed; there
//! is no batch or multi-record transactional API, which is what lets
//! cancellation stop a sweep without leaving any record half-updated.

pub mod sqlite;

pub use sqlite::SqliteVisitStore;

use crate::domain::{
    MappingStatus, NewVisitRecord, PublishOutcome, SectionKind, StoreError, VisitRecord,
};
use async_trait::async_trait;
use serde_json::Value;

/// Persistence contract for visit records.
#[async_trait]
pub trait VisitStore: Send + Sync {
    /// Whether a record with this visit id already exists.
    async fn exists(&self, visit_id: &str) -> Result<bool, StoreError>;

    /// Create the initial record for a newly discovered visit.
    ///
    /// A record is created exactly once per visit id; callers check
    /// [`exists`](Self::exists) first, there is no upsert path.
    async fn create(&self, record: NewVisitRecord) -> Result<(), StoreError>;

    /// All records currently in the given mapping status, in insertion
    /// order.
    async fn list_by_mapping_status(
        &self,
        status: MappingStatus,
    ) -> Result<Vec<VisitRecord>, StoreError>;

    /// Overwrite one section column with a fresh payload.
    async fn update_section(
        &self,
        visit_id: &str,
        kind: SectionKind,
        payload: &Value,
    ) -> Result<(), StoreError>;

    /// Move a record to a new mapping status.
    async fn update_mapping_status(
        &self,
        visit_id: &str,
        status: MappingStatus,
    ) -> Result<(), StoreError>;

    /// Record the outcome of one publish attempt.
    async fn update_publish_outcome(
        &self,
        visit_id: &str,
        outcome: PublishOutcome,
    ) -> Result<(), StoreError>;
}
