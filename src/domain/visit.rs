//! Visit candidate and immutable snapshot types
//!
//! A [`Visit`] is the raw row the SIMRS source returns for one closed
//! hospital visit. At fetch time it is split into two immutable JSON
//! snapshots that are captured once and never recomputed: the
//! [`VisitDetail`] (patient/practitioner/location/period timestamps) and
//! the [`VitalSign`] readings.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Raw visit candidate as returned by a SIMRS source query.
#[derive(Debug, Clone, Default)]
pub struct Visit {
    pub visit_id: String,
    pub patient_satusehat_id: String,
    pub patient_nik: String,
    pub patient_name: String,
    pub patient_sex: String,
    pub patient_birth_date: Option<NaiveDateTime>,
    pub patient_address: String,
    pub practitioner_nik: String,
    pub practitioner_satusehat_id: String,
    pub practitioner_name: String,
    pub clinic_satusehat_id: String,
    pub clinic_name: String,
    pub systole: String,
    pub diastole: String,
    pub heart_rate: String,
    pub respiration_rate: String,
    pub oxygen_saturation: String,
    pub temperature: String,
    pub period_start_date: Option<NaiveDateTime>,
    pub period_end_date: Option<NaiveDateTime>,
    pub arrived_start_time: Option<NaiveDateTime>,
    pub arrived_end_time: Option<NaiveDateTime>,
    pub in_progress_start_time: Option<NaiveDateTime>,
    pub in_progress_end_time: Option<NaiveDateTime>,
    pub finish_start_time: Option<NaiveDateTime>,
    pub finish_end_time: Option<NaiveDateTime>,
}

impl Visit {
    /// Immutable visit-detail snapshot for this candidate.
    pub fn visit_detail(&self) -> VisitDetail {
        VisitDetail {
            visit_id: self.visit_id.clone(),
            patient_satusehat_id: self.patient_satusehat_id.clone(),
            patient_nik: self.patient_nik.clone(),
            patient_name: self.patient_name.clone(),
            patient_sex: self.patient_sex.clone(),
            patient_birth_date: self.patient_birth_date,
            patient_address: self.patient_address.clone(),
            practitioner_nik: self.practitioner_nik.clone(),
            practitioner_satusehat_id: self.practitioner_satusehat_id.clone(),
            practitioner_name: self.practitioner_name.clone(),
            clinic_name: self.clinic_name.clone(),
            clinic_satusehat_id: self.clinic_satusehat_id.clone(),
            period_start_date: self.period_start_date,
            period_end_date: self.period_end_date,
            arrived_start_time: self.arrived_start_time,
            arrived_end_time: self.arrived_end_time,
            in_progress_start_time: self.in_progress_start_time,
            in_progress_end_time: self.in_progress_end_time,
            finish_start_time: self.finish_start_time,
            finish_end_time: self.finish_end_time,
        }
    }

    /// Immutable vital-sign snapshot for this candidate.
    pub fn vital_sign(&self) -> VitalSign {
        VitalSign {
            systole: self.systole.clone(),
            diastole: self.diastole.clone(),
            heart_rate: self.heart_rate.clone(),
            respiration_rate: self.respiration_rate.clone(),
            temperature: self.temperature.clone(),
            oxygen_saturation: self.oxygen_saturation.clone(),
        }
    }
}

/// Immutable visit-detail snapshot, captured once at fetch time.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct VisitDetail {
    pub visit_id: String,
    pub patient_satusehat_id: String,
    #[serde(default)]
    pub patient_nik: String,
    pub patient_name: String,
    #[serde(default)]
    pub patient_sex: String,
    #[serde(default)]
    pub patient_birth_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub patient_address: String,
    #[serde(default)]
    pub practitioner_nik: String,
    pub practitioner_satusehat_id: String,
    pub practitioner_name: String,
    pub clinic_name: String,
    pub clinic_satusehat_id: String,
    pub period_start_date: Option<NaiveDateTime>,
    pub period_end_date: Option<NaiveDateTime>,
    pub arrived_start_time: Option<NaiveDateTime>,
    pub arrived_end_time: Option<NaiveDateTime>,
    pub in_progress_start_time: Option<NaiveDateTime>,
    pub in_progress_end_time: Option<NaiveDateTime>,
    pub finish_start_time: Option<NaiveDateTime>,
    pub finish_end_time: Option<NaiveDateTime>,
}

impl VisitDetail {
    /// Validate the snapshot's required fields.
    ///
    /// Returns the collected validation failures as a single diagnostic
    /// string, suitable for persisting in `mapping_errors`.
    pub fn validate(&self) -> Result<(), String> {
        let mut missing: Vec<&str> = Vec::new();

        let mut require_str = |name: &'static str, value: &str| {
            if value.trim().is_empty() {
                missing.push(name);
            }
        };
        require_str("visit_id", &self.visit_id);
        require_str("patient_satusehat_id", &self.patient_satusehat_id);
        require_str("patient_name", &self.patient_name);
        require_str("practitioner_satusehat_id", &self.practitioner_satusehat_id);
        require_str("practitioner_name", &self.practitioner_name);
        require_str("clinic_name", &self.clinic_name);
        require_str("clinic_satusehat_id", &self.clinic_satusehat_id);

        let mut require_time = |name: &'static str, value: &Option<NaiveDateTime>| {
            if value.is_none() {
                missing.push(name);
            }
        };
        require_time("period_start_date", &self.period_start_date);
        require_time("period_end_date", &self.period_end_date);
        require_time("arrived_start_time", &self.arrived_start_time);
        require_time("arrived_end_time", &self.arrived_end_time);
        require_time("in_progress_start_time", &self.in_progress_start_time);
        require_time("in_progress_end_time", &self.in_progress_end_time);
        require_time("finish_start_time", &self.finish_start_time);
        require_time("finish_end_time", &self.finish_end_time);

        if missing.is_empty() {
            Ok(())
        } else {
            Err(missing
                .iter()
                .map(|f| format!("{f} is required"))
                .collect::<Vec<_>>()
                .join("; "))
        }
    }
}

/// Immutable vital-sign snapshot, captured once at fetch time.
///
/// Values are kept as the free-text strings the SIMRS stores; empty
/// strings mean the reading was not taken and produce no observation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct VitalSign {
    #[serde(default)]
    pub systole: String,
    #[serde(default)]
    pub diastole: String,
    #[serde(default)]
    pub heart_rate: String,
    #[serde(default)]
    pub respiration_rate: String,
    #[serde(default)]
    pub temperature: String,
    #[serde(default)]
    pub oxygen_saturation: String,
}
