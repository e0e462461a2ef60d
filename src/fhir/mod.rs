//! Minimal FHIR R4 wire model
//!
//! Just enough of the R4 resource surface to serialize the transaction
//! bundles the registry accepts. Field presence mirrors the registry's
//! expected request shape; this module performs no conformance checking.

pub mod bundle;
pub mod resources;
pub mod types;

pub use bundle::{Bundle, BundleEntry, BundleRequest};
pub use types::{CodeableConcept, Coding, Extension, Identifier, Period, Quantity, Reference};
