//! Persisted visit record
//!
//! One [`VisitRecord`] exists per hospital visit, created exactly once at
//! fetch time and enriched in place by the fill sweep. The store is the
//! sole writer; everything else works on copies returned by queries.

use crate::domain::sections::{
    decode_section, Diagnosis, MedicationDispense, MedicationRequest, ObservationLab,
    ObservationRadiology, Procedure, SectionKind, SectionToggles,
};
use crate::domain::status::{MappingStatus, PublishStatus};
use crate::domain::visit::{VisitDetail, VitalSign};
use chrono::NaiveDateTime;
use serde_json::Value;

/// Aggregate root tracked by the visit store.
#[derive(Debug, Clone)]
pub struct VisitRecord {
    pub visit_id: String,
    pub visit_date: NaiveDateTime,
    pub satusehat_patient_id: String,
    /// Immutable visit-detail snapshot captured at fetch time.
    pub visit_detail: Value,
    /// Immutable vital-sign snapshot captured at fetch time.
    pub vital_sign: Value,
    pub diagnosis: Option<Value>,
    pub lab: Option<Value>,
    pub radiology: Option<Value>,
    pub medication_request: Option<Value>,
    pub medication_dispense: Option<Value>,
    pub procedure: Option<Value>,
    pub publish_date: Option<NaiveDateTime>,
    pub publish_request: Option<String>,
    pub publish_response: Option<String>,
    pub mapping_errors: Option<String>,
    pub mapping_status: MappingStatus,
    pub publish_status: PublishStatus,
}

impl VisitRecord {
    /// Decoded visit-detail snapshot, or `None` when the stored JSON is
    /// unreadable.
    pub fn visit_detail(&self) -> Option<VisitDetail> {
        serde_json::from_value(self.visit_detail.clone()).ok()
    }

    /// Decoded vital-sign snapshot.
    pub fn vital_sign(&self) -> Option<VitalSign> {
        serde_json::from_value(self.vital_sign.clone()).ok()
    }

    pub fn diagnosis(&self) -> Option<Vec<Diagnosis>> {
        decode_section(self.diagnosis.as_ref())
    }

    pub fn lab(&self) -> Option<Vec<ObservationLab>> {
        decode_section(self.lab.as_ref())
    }

    pub fn radiology(&self) -> Option<Vec<ObservationRadiology>> {
        decode_section(self.radiology.as_ref())
    }

    pub fn medication_request(&self) -> Option<Vec<MedicationRequest>> {
        decode_section(self.medication_request.as_ref())
    }

    pub fn medication_dispense(&self) -> Option<Vec<MedicationDispense>> {
        decode_section(self.medication_dispense.as_ref())
    }

    pub fn procedure(&self) -> Option<Vec<Procedure>> {
        decode_section(self.procedure.as_ref())
    }

    /// Whether a section currently holds a present/valid payload.
    pub fn section_present(&self, kind: SectionKind) -> bool {
        match kind {
            SectionKind::Diagnosis => self.diagnosis().is_some(),
            SectionKind::Lab => self.lab().is_some(),
            SectionKind::Radiology => self.radiology().is_some(),
            SectionKind::MedicationRequest => self.medication_request().is_some(),
            SectionKind::MedicationDispense => self.medication_dispense().is_some(),
            SectionKind::Procedure => self.procedure().is_some(),
        }
    }

    /// Enabled sections that are still missing or invalid.
    ///
    /// Disabled sections are excluded outright: the fill sweep never
    /// fetches them and the completeness predicate does not wait for
    /// them.
    pub fn missing_sections(&self, toggles: &SectionToggles) -> Vec<SectionKind> {
        SectionKind::ALL
            .into_iter()
            .filter(|kind| toggles.enabled(*kind) && !self.section_present(*kind))
            .collect()
    }
}

/// Initial row contents for a newly discovered visit.
#[derive(Debug, Clone)]
pub struct NewVisitRecord {
    pub visit_id: String,
    pub visit_date: NaiveDateTime,
    pub satusehat_patient_id: String,
    pub visit_detail: Value,
    pub vital_sign: Value,
    pub mapping_status: MappingStatus,
    pub mapping_errors: String,
}

/// Outcome of one publish attempt, persisted atomically.
#[derive(Debug, Clone)]
pub struct PublishOutcome {
    pub request: String,
    pub response: String,
    pub timestamp: NaiveDateTime,
    pub status: PublishStatus,
}
