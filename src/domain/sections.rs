//! Clinical section payloads
//!
//! A visit is enriched across six independently-fetched sections:
//! diagnosis, lab, radiology, medication request, medication dispense and
//! procedure. Each section is persisted as a JSON array column on the
//! visit record and counts as *present* only when it decodes to a
//! non-empty list whose every element passes its own required-field
//! check; anything else is treated as absent and eligible for refill.

use chrono::NaiveDateTime;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// The six clinical section kinds of a visit record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    Diagnosis,
    Lab,
    Radiology,
    MedicationRequest,
    MedicationDispense,
    Procedure,
}

impl SectionKind {
    /// All section kinds in fill order.
    pub const ALL: [SectionKind; 6] = [
        SectionKind::Diagnosis,
        SectionKind::Lab,
        SectionKind::Radiology,
        SectionKind::MedicationRequest,
        SectionKind::MedicationDispense,
        SectionKind::Procedure,
    ];

    /// Stable identifier used for store columns and log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKind::Diagnosis => "diagnosis",
            SectionKind::Lab => "lab",
            SectionKind::Radiology => "radiology",
            SectionKind::MedicationRequest => "medication_request",
            SectionKind::MedicationDispense => "medication_dispense",
            SectionKind::Procedure => "medical_procedure",
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operator-configurable per-section skips.
///
/// The medication toggle covers both the request and dispense sections,
/// which always come from the same pharmacy subsystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct SectionToggles {
    pub disable_diagnosis: bool,
    pub disable_lab: bool,
    pub disable_radiology: bool,
    pub disable_procedure: bool,
    pub disable_medication: bool,
}

impl SectionToggles {
    /// Whether a section participates in fill and completeness checks.
    pub fn enabled(&self, kind: SectionKind) -> bool {
        match kind {
            SectionKind::Diagnosis => !self.disable_diagnosis,
            SectionKind::Lab => !self.disable_lab,
            SectionKind::Radiology => !self.disable_radiology,
            SectionKind::Procedure => !self.disable_procedure,
            SectionKind::MedicationRequest | SectionKind::MedicationDispense => {
                !self.disable_medication
            }
        }
    }
}

/// Required-field check shared by all section element types.
pub trait SectionItem {
    fn is_valid(&self) -> bool;
}

/// Decode a stored section payload into its typed list.
///
/// Returns `None` unless the payload parses to a non-empty list whose
/// every element is valid; partial or malformed payloads are treated
/// as absent.
pub fn decode_section<T>(raw: Option<&Value>) -> Option<Vec<T>>
where
    T: DeserializeOwned + SectionItem,
{
    let raw = raw?;
    let items: Vec<T> = serde_json::from_value(raw.clone()).ok()?;
    if items.is_empty() || items.iter().any(|item| !item.is_valid()) {
        return None;
    }
    Some(items)
}

fn not_blank(s: &str) -> bool {
    !s.trim().is_empty()
}

fn some_not_blank(s: &Option<String>) -> bool {
    s.as_deref().map(|v| not_blank(v)).unwrap_or(false)
}

/// Inpatient/outpatient classification carried by medication rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatientType {
    Outpatient,
    Inpatient,
}

/// Compound/non-compound classification carried by medication rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MedicineType {
    NonCompound,
    Compound,
}

/// One diagnosis row (ICD-10 coded).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnosis {
    pub visit_id: String,
    pub diagnosis_code: String,
    pub diagnosis_name: String,
    pub diagnosis_date: Option<NaiveDateTime>,
}

impl SectionItem for Diagnosis {
    fn is_valid(&self) -> bool {
        not_blank(&self.visit_id)
            && not_blank(&self.diagnosis_code)
            && not_blank(&self.diagnosis_name)
            && self.diagnosis_date.is_some()
    }
}

/// One laboratory observation row.
///
/// The LOINC fields arrive as raw JSON values (some SIMRS variants store
/// arrays, others scalars); presence is all the completeness check needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservationLab {
    #[serde(default)]
    pub visit_id: Option<i64>,
    #[serde(default)]
    pub lab_name: String,
    #[serde(default)]
    pub lab_parameter: Option<Value>,
    #[serde(default)]
    pub lab_unit: Option<Value>,
    #[serde(default)]
    pub lab_normal: Option<Value>,
    #[serde(default)]
    pub lab_result: Option<Value>,
    #[serde(default)]
    pub lab_flag: Option<Value>,
    #[serde(default)]
    pub lab_method: Option<Value>,
    pub lab_loinc_code: Option<Value>,
    pub lab_loinc_name: Option<Value>,
    #[serde(default)]
    pub practitioner_id: Option<String>,
    #[serde(default)]
    pub practitioner_name: String,
}

impl SectionItem for ObservationLab {
    fn is_valid(&self) -> bool {
        self.lab_loinc_code.is_some()
            && self.lab_loinc_name.is_some()
            && not_blank(&self.practitioner_name)
    }
}

/// One radiology observation row; same shape as lab.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservationRadiology {
    #[serde(default)]
    pub visit_id: Option<i64>,
    #[serde(default)]
    pub lab_name: String,
    #[serde(default)]
    pub lab_parameter: Option<Value>,
    #[serde(default)]
    pub lab_unit: Option<Value>,
    #[serde(default)]
    pub lab_normal: Option<Value>,
    #[serde(default)]
    pub lab_result: Option<Value>,
    #[serde(default)]
    pub lab_flag: Option<Value>,
    #[serde(default)]
    pub lab_method: Option<Value>,
    pub lab_loinc_code: Option<Value>,
    pub lab_loinc_name: Option<Value>,
    #[serde(default)]
    pub practitioner_id: Option<String>,
    #[serde(default)]
    pub practitioner_name: String,
}

impl SectionItem for ObservationRadiology {
    fn is_valid(&self) -> bool {
        self.lab_loinc_code.is_some()
            && self.lab_loinc_name.is_some()
            && not_blank(&self.practitioner_name)
    }
}

/// One prescription row (KFA coded).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicationRequest {
    #[serde(default)]
    pub visit_id: Option<i64>,
    pub patient_type: PatientType,
    pub date: Option<NaiveDateTime>,
    #[serde(default)]
    pub medicine_code: Option<String>,
    pub prescription_id: i64,
    #[serde(default)]
    pub kfa_code: Option<String>,
    #[serde(default)]
    pub kfa_name: Option<String>,
    #[serde(rename = "type")]
    pub medicine_type: MedicineType,
    pub practitioner_id: Option<String>,
    pub practitioner_name: Option<String>,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub unit: String,
}

impl SectionItem for MedicationRequest {
    fn is_valid(&self) -> bool {
        self.date.is_some()
            && self.prescription_id != 0
            && some_not_blank(&self.practitioner_id)
            && some_not_blank(&self.practitioner_name)
    }
}

/// One pharmacy handover row (KFA coded, batch tracked).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicationDispense {
    #[serde(default)]
    pub visit_id: Option<i64>,
    pub patient_type: PatientType,
    pub date: Option<NaiveDateTime>,
    #[serde(default)]
    pub medicine_code: String,
    pub prescription_id: i64,
    #[serde(default)]
    pub kfa_code: Option<String>,
    #[serde(default)]
    pub kfa_name: Option<String>,
    #[serde(rename = "type")]
    pub medicine_type: MedicineType,
    pub practitioner_id: Option<String>,
    pub practitioner_name: Option<String>,
    pub batch_number: String,
    pub expired_date: Option<NaiveDateTime>,
    pub prescription_start_date: Option<NaiveDateTime>,
    #[serde(rename = "drug_received_date")]
    pub handover_date: Option<NaiveDateTime>,
}

impl SectionItem for MedicationDispense {
    fn is_valid(&self) -> bool {
        self.date.is_some()
            && self.prescription_id != 0
            && some_not_blank(&self.practitioner_id)
            && some_not_blank(&self.practitioner_name)
            && not_blank(&self.batch_number)
            && self.expired_date.is_some()
            && self.prescription_start_date.is_some()
            && self.handover_date.is_some()
    }
}

/// One procedure row (ICD-9-CM coded).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Procedure {
    pub visit_id: i64,
    pub procedure_code: String,
    pub procedure_name: String,
}

impl SectionItem for Procedure {
    fn is_valid(&self) -> bool {
        self.visit_id != 0 && not_blank(&self.procedure_code) && not_blank(&self.procedure_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn dt() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 14)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_section_kind_identifiers() {
        assert_eq!(SectionKind::Diagnosis.as_str(), "diagnosis");
        assert_eq!(SectionKind::Procedure.as_str(), "medical_procedure");
        assert_eq!(SectionKind::ALL.len(), 6);
    }

    #[test]
    fn test_toggles_medication_covers_both_kinds() {
        let toggles = SectionToggles {
            disable_medication: true,
            ..SectionToggles::default()
        };
        assert!(!toggles.enabled(SectionKind::MedicationRequest));
        assert!(!toggles.enabled(SectionKind::MedicationDispense));
        assert!(toggles.enabled(SectionKind::Diagnosis));
        assert!(toggles.enabled(SectionKind::Lab));
    }

    #[test]
    fn test_diagnosis_validity() {
        let valid = Diagnosis {
            visit_id: "V-001".to_string(),
            diagnosis_code: "J06.9".to_string(),
            diagnosis_name: "Acute upper respiratory infection".to_string(),
            diagnosis_date: Some(dt()),
        };
        assert!(valid.is_valid());

        let blank_code = Diagnosis {
            diagnosis_code: "  ".to_string(),
            ..valid.clone()
        };
        assert!(!blank_code.is_valid());

        let no_date = Diagnosis {
            diagnosis_date: None,
            ..valid
        };
        assert!(!no_date.is_valid());
    }

    #[test]
    fn test_decode_section_requires_non_empty_valid_list() {
        let empty = json!([]);
        assert!(decode_section::<Diagnosis>(Some(&empty)).is_none());

        let valid = json!([{
            "visit_id": "V-001",
            "diagnosis_code": "J06.9",
            "diagnosis_name": "ISPA",
            "diagnosis_date": "2024-03-14T10:30:00"
        }]);
        let decoded = decode_section::<Diagnosis>(Some(&valid)).unwrap();
        assert_eq!(decoded.len(), 1);

        // One invalid element poisons the whole section.
        let mixed = json!([
            {
                "visit_id": "V-001",
                "diagnosis_code": "J06.9",
                "diagnosis_name": "ISPA",
                "diagnosis_date": "2024-03-14T10:30:00"
            },
            {
                "visit_id": "V-001",
                "diagnosis_code": "",
                "diagnosis_name": "",
                "diagnosis_date": "2024-03-14T10:30:00"
            }
        ]);
        assert!(decode_section::<Diagnosis>(Some(&mixed)).is_none());
    }

    #[test]
    fn test_decode_section_absent_or_malformed() {
        assert!(decode_section::<Diagnosis>(None).is_none());
        let not_a_list = json!({"diagnosis_code": "J06.9"});
        assert!(decode_section::<Diagnosis>(Some(&not_a_list)).is_none());
    }

    #[test]
    fn test_medication_request_validity() {
        let row = MedicationRequest {
            visit_id: Some(42),
            patient_type: PatientType::Outpatient,
            date: Some(dt()),
            medicine_code: None,
            prescription_id: 9001,
            kfa_code: Some("93001019".to_string()),
            kfa_name: Some("Paracetamol 500 mg".to_string()),
            medicine_type: MedicineType::NonCompound,
            practitioner_id: Some("N10001".to_string()),
            practitioner_name: Some("dr. Sari".to_string()),
            amount: 10.0,
            unit: "tablet".to_string(),
        };
        assert!(row.is_valid());

        let no_practitioner = MedicationRequest {
            practitioner_id: None,
            ..row.clone()
        };
        assert!(!no_practitioner.is_valid());

        let zero_prescription = MedicationRequest {
            prescription_id: 0,
            ..row
        };
        assert!(!zero_prescription.is_valid());
    }

    #[test]
    fn test_medication_dispense_requires_batch_and_dates() {
        let row = MedicationDispense {
            visit_id: Some(42),
            patient_type: PatientType::Outpatient,
            date: Some(dt()),
            medicine_code: String::new(),
            prescription_id: 9001,
            kfa_code: Some("93001019".to_string()),
            kfa_name: Some("Paracetamol 500 mg".to_string()),
            medicine_type: MedicineType::NonCompound,
            practitioner_id: Some("N10001".to_string()),
            practitioner_name: Some("apt. Dewi".to_string()),
            batch_number: "B2024-03".to_string(),
            expired_date: Some(dt()),
            prescription_start_date: Some(dt()),
            handover_date: Some(dt()),
        };
        assert!(row.is_valid());
        assert!(!MedicationDispense {
            batch_number: String::new(),
            ..row.clone()
        }
        .is_valid());
        assert!(!MedicationDispense {
            handover_date: None,
            ..row
        }
        .is_valid());
    }

    #[test]
    fn test_lab_requires_loinc_coding() {
        let lab = ObservationLab {
            visit_id: Some(42),
            lab_name: "Hemoglobin".to_string(),
            lab_parameter: None,
            lab_unit: None,
            lab_normal: None,
            lab_result: Some(json!("13.2")),
            lab_flag: None,
            lab_method: None,
            lab_loinc_code: Some(json!("718-7")),
            lab_loinc_name: Some(json!("Hemoglobin [Mass/volume] in Blood")),
            practitioner_id: None,
            practitioner_name: "dr. Sari".to_string(),
        };
        assert!(lab.is_valid());
        assert!(!ObservationLab {
            lab_loinc_code: None,
            ..lab
        }
        .is_valid());
    }

    #[test]
    fn test_dispense_handover_date_wire_name() {
        let json = json!([{
            "patient_type": "Outpatient",
            "date": "2024-03-14T10:30:00",
            "prescription_id": 1,
            "type": "Compound",
            "practitioner_id": "N1",
            "practitioner_name": "apt. Dewi",
            "batch_number": "B1",
            "expired_date": "2025-03-14T00:00:00",
            "prescription_start_date": "2024-03-14T10:00:00",
            "drug_received_date": "2024-03-14T11:00:00"
        }]);
        let decoded = decode_section::<MedicationDispense>(Some(&json)).unwrap();
        assert!(decoded[0].handover_date.is_some());
    }
}
