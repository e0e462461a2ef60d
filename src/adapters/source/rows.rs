//! Shared row shapes for SIMRS queries
//!
//! Every vendor query aliases its columns to these names, so the row
//! decoding and domain conversion are written once. Vendors differ only
//! in their SQL.

use crate::domain::{
    Diagnosis, MedicationDispense, MedicationRequest, MedicineType, ObservationLab,
    ObservationRadiology, PatientType, Procedure, Visit,
};
use chrono::NaiveDateTime;
use serde_json::Value;

#[derive(sqlx::FromRow)]
pub(crate) struct VisitRow {
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
    pub systole: Option<String>,
    pub diastole: Option<String>,
    pub heart_rate: Option<String>,
    pub respiration_rate: Option<String>,
    pub oxygen_saturation: Option<String>,
    pub temperature: Option<String>,
    pub period_start_date: Option<NaiveDateTime>,
    pub period_end_date: Option<NaiveDateTime>,
    pub arrived_start_time: Option<NaiveDateTime>,
    pub arrived_end_time: Option<NaiveDateTime>,
    pub in_progress_start_time: Option<NaiveDateTime>,
    pub in_progress_end_time: Option<NaiveDateTime>,
    pub finish_start_time: Option<NaiveDateTime>,
    pub finish_end_time: Option<NaiveDateTime>,
}

impl From<VisitRow> for Visit {
    fn from(row: VisitRow) -> Self {
        Visit {
            visit_id: row.visit_id,
            patient_satusehat_id: row.patient_satusehat_id,
            patient_nik: row.patient_nik,
            patient_name: row.patient_name,
            patient_sex: row.patient_sex,
            patient_birth_date: row.patient_birth_date,
            patient_address: row.patient_address,
            practitioner_nik: row.practitioner_nik,
            practitioner_satusehat_id: row.practitioner_satusehat_id,
            practitioner_name: row.practitioner_name,
            clinic_satusehat_id: row.clinic_satusehat_id,
            clinic_name: row.clinic_name,
            systole: row.systole.unwrap_or_default(),
            diastole: row.diastole.unwrap_or_default(),
            heart_rate: row.heart_rate.unwrap_or_default(),
            respiration_rate: row.respiration_rate.unwrap_or_default(),
            oxygen_saturation: row.oxygen_saturation.unwrap_or_default(),
            temperature: row.temperature.unwrap_or_default(),
            period_start_date: row.period_start_date,
            period_end_date: row.period_end_date,
            arrived_start_time: row.arrived_start_time,
            arrived_end_time: row.arrived_end_time,
            in_progress_start_time: row.in_progress_start_time,
            in_progress_end_time: row.in_progress_end_time,
            finish_start_time: row.finish_start_time,
            finish_end_time: row.finish_end_time,
        }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct DiagnosisRow {
    pub visit_id: String,
    pub diagnosis_code: String,
    pub diagnosis_name: String,
    pub diagnosis_date: Option<NaiveDateTime>,
}

impl From<DiagnosisRow> for Diagnosis {
    fn from(row: DiagnosisRow) -> Self {
        Diagnosis {
            visit_id: row.visit_id,
            diagnosis_code: row.diagnosis_code,
            diagnosis_name: row.diagnosis_name,
            diagnosis_date: row.diagnosis_date,
        }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct ObservationRow {
    pub visit_id: Option<i64>,
    pub lab_name: String,
    pub lab_parameter: Option<String>,
    pub lab_unit: Option<String>,
    pub lab_normal: Option<String>,
    pub lab_result: Option<String>,
    pub lab_flag: Option<String>,
    pub lab_method: Option<String>,
    pub lab_loinc_code: Option<String>,
    pub lab_loinc_name: Option<String>,
    pub practitioner_id: Option<String>,
    pub practitioner_name: String,
}

fn text(value: Option<String>) -> Option<Value> {
    value.map(Value::String)
}

impl From<ObservationRow> for ObservationLab {
    fn from(row: ObservationRow) -> Self {
        ObservationLab {
            visit_id: row.visit_id,
            lab_name: row.lab_name,
            lab_parameter: text(row.lab_parameter),
            lab_unit: text(row.lab_unit),
            lab_normal: text(row.lab_normal),
            lab_result: text(row.lab_result),
            lab_flag: text(row.lab_flag),
            lab_method: text(row.lab_method),
            lab_loinc_code: text(row.lab_loinc_code),
            lab_loinc_name: text(row.lab_loinc_name),
            practitioner_id: row.practitioner_id,
            practitioner_name: row.practitioner_name,
        }
    }
}

impl From<ObservationRow> for ObservationRadiology {
    fn from(row: ObservationRow) -> Self {
        ObservationRadiology {
            visit_id: row.visit_id,
            lab_name: row.lab_name,
            lab_parameter: text(row.lab_parameter),
            lab_unit: text(row.lab_unit),
            lab_normal: text(row.lab_normal),
            lab_result: text(row.lab_result),
            lab_flag: text(row.lab_flag),
            lab_method: text(row.lab_method),
            lab_loinc_code: text(row.lab_loinc_code),
            lab_loinc_name: text(row.lab_loinc_name),
            practitioner_id: row.practitioner_id,
            practitioner_name: row.practitioner_name,
        }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct MedicationRequestRow {
    pub visit_id: Option<i64>,
    pub patient_type: String,
    pub date: Option<NaiveDateTime>,
    pub medicine_code: Option<String>,
    pub prescription_id: i64,
    pub kfa_code: Option<String>,
    pub kfa_name: Option<String>,
    #[sqlx(rename = "type")]
    pub medicine_type: String,
    pub practitioner_id: Option<String>,
    pub practitioner_name: Option<String>,
    pub amount: Option<f64>,
    pub unit: String,
}

impl From<MedicationRequestRow> for MedicationRequest {
    fn from(row: MedicationRequestRow) -> Self {
        MedicationRequest {
            visit_id: row.visit_id,
            patient_type: patient_type(&row.patient_type),
            date: row.date,
            medicine_code: row.medicine_code,
            prescription_id: row.prescription_id,
            kfa_code: row.kfa_code,
            kfa_name: row.kfa_name,
            medicine_type: medicine_type(&row.medicine_type),
            practitioner_id: row.practitioner_id,
            practitioner_name: row.practitioner_name,
            amount: row.amount.unwrap_or_default(),
            unit: row.unit,
        }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct MedicationDispenseRow {
    pub visit_id: Option<i64>,
    pub patient_type: String,
    pub date: Option<NaiveDateTime>,
    pub medicine_code: String,
    pub prescription_id: i64,
    pub kfa_code: Option<String>,
    pub kfa_name: Option<String>,
    #[sqlx(rename = "type")]
    pub medicine_type: String,
    pub practitioner_id: Option<String>,
    pub practitioner_name: Option<String>,
    pub batch_number: String,
    pub expired_date: Option<NaiveDateTime>,
    pub prescription_start_date: Option<NaiveDateTime>,
    pub handover_date: Option<NaiveDateTime>,
}

impl From<MedicationDispenseRow> for MedicationDispense {
    fn from(row: MedicationDispenseRow) -> Self {
        MedicationDispense {
            visit_id: row.visit_id,
            patient_type: patient_type(&row.patient_type),
            date: row.date,
            medicine_code: row.medicine_code,
            prescription_id: row.prescription_id,
            kfa_code: row.kfa_code,
            kfa_name: row.kfa_name,
            medicine_type: medicine_type(&row.medicine_type),
            practitioner_id: row.practitioner_id,
            practitioner_name: row.practitioner_name,
            batch_number: row.batch_number,
            expired_date: row.expired_date,
            prescription_start_date: row.prescription_start_date,
            handover_date: row.handover_date,
        }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct ProcedureRow {
    pub visit_id: i64,
    pub procedure_code: String,
    pub procedure_name: String,
}

impl From<ProcedureRow> for Procedure {
    fn from(row: ProcedureRow) -> Self {
        Procedure {
            visit_id: row.visit_id,
            procedure_code: row.procedure_code,
            procedure_name: row.procedure_name,
        }
    }
}

/// Vendors emit `Inpatient`/`Outpatient` from their CASE expressions;
/// anything unexpected is treated as outpatient.
pub(crate) fn patient_type(raw: &str) -> PatientType {
    if raw.eq_ignore_ascii_case("inpatient") {
        PatientType::Inpatient
    } else {
        PatientType::Outpatient
    }
}

pub(crate) fn medicine_type(raw: &str) -> MedicineType {
    if raw.eq_ignore_ascii_case("compound") {
        MedicineType::Compound
    } else {
        MedicineType::NonCompound
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patient_type_mapping() {
        assert_eq!(patient_type("Inpatient"), PatientType::Inpatient);
        assert_eq!(patient_type("inpatient"), PatientType::Inpatient);
        assert_eq!(patient_type("Outpatient"), PatientType::Outpatient);
        assert_eq!(patient_type("anything"), PatientType::Outpatient);
    }

    #[test]
    fn test_medicine_type_mapping() {
        assert_eq!(medicine_type("Compound"), MedicineType::Compound);
        assert_eq!(medicine_type("NonCompound"), MedicineType::NonCompound);
        assert_eq!(medicine_type(""), MedicineType::NonCompound);
    }

    #[test]
    fn test_visit_row_defaults_blank_vitals() {
        let row = VisitRow {
            visit_id: "V-001".to_string(),
            patient_satusehat_id: "P0001".to_string(),
            patient_nik: String::new(),
            patient_name: "Budi".to_string(),
            patient_sex: "L".to_string(),
            patient_birth_date: None,
            patient_address: String::new(),
            practitioner_nik: String::new(),
            practitioner_satusehat_id: "N1".to_string(),
            practitioner_name: "dr. Sari".to_string(),
            clinic_satusehat_id: "L-01".to_string(),
            clinic_name: "Poli Umum".to_string(),
            systole: Some("120".to_string()),
            diastole: None,
            heart_rate: None,
            respiration_rate: None,
            oxygen_saturation: None,
            temperature: None,
            period_start_date: None,
            period_end_date: None,
            arrived_start_time: None,
            arrived_end_time: None,
            in_progress_start_time: None,
            in_progress_end_time: None,
            finish_start_time: None,
            finish_end_time: None,
        };
        let visit = Visit::from(row);
        assert_eq!(visit.systole, "120");
        assert!(visit.diastole.is_empty());
    }
}
