//! Domain models and types for Garuda.
//!
//! This module contains the core domain models and business rules:
//!
//! - **Status vocabulary** ([`MappingStatus`], [`PublishStatus`]): the two
//!   independent lifecycle columns of a visit record
//! - **Snapshots** ([`Visit`], [`VisitDetail`], [`VitalSign`]): raw visit
//!   candidates and the immutable JSON snapshots captured at fetch time
//! - **Sections** ([`SectionKind`] and the six clinical payload types):
//!   the independently-filled clinical data categories
//! - **Aggregate root** ([`VisitRecord`]): the persisted per-visit row
//! - **Error types** ([`GarudaError`] and collaborator sub-errors)
//!
//! All fallible operations return [`Result<T>`], an alias over
//! [`GarudaError`].

pub mod errors;
pub mod record;
pub mod sections;
pub mod status;
pub mod visit;

pub use errors::{GarudaError, RegistryError, SourceError, StoreError};
pub use record::{NewVisitRecord, PublishOutcome, VisitRecord};
pub use sections::{
    decode_section, Diagnosis, MedicationDispense, MedicationRequest, MedicineType,
    ObservationLab, ObservationRadiology, PatientType, Procedure, SectionItem, SectionKind,
    SectionToggles,
};
pub use status::{MappingStatus, PublishStatus};
pub use visit::{Visit, VisitDetail, VitalSign};

/// Result type alias for Garuda operations.
///
/// Defaults to [`GarudaError`]; adapters narrow the error parameter to
/// their collaborator-specific error type.
pub type Result<T, E = GarudaError> = std::result::Result<T, E>;
