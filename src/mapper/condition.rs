//! Diagnosis → Condition mapping

use crate::domain::{GarudaError, Result};
use crate::fhir::resources::Condition;
use crate::fhir::{BundleEntry, CodeableConcept, Coding, Reference};
use crate::mapper::{entry::transaction_entry, missing_fields};

/// Maps one ICD-10 coded diagnosis to an encounter-diagnosis Condition.
#[derive(Debug, Clone, Default)]
pub struct ConditionDiagnosisMapper {
    pub condition_id: String,
    pub encounter_id: String,
    pub patient_satusehat_id: String,
    pub patient_name: String,
    pub time: String,
    pub icd_code: String,
    pub icd_name: String,
}

impl ConditionDiagnosisMapper {
    pub fn validate(&self) -> Result<()> {
        missing_fields(&[
            ("condition_id", &self.condition_id),
            ("encounter_id", &self.encounter_id),
            ("patient_satusehat_id", &self.patient_satusehat_id),
            ("patient_name", &self.patient_name),
            ("time", &self.time),
            ("icd_code", &self.icd_code),
            ("icd_name", &self.icd_name),
        ])
        .map_err(GarudaError::Validation)
    }

    pub fn bundle_entry(&self) -> Result<BundleEntry> {
        self.validate()?;
        transaction_entry(&self.resource(), &self.condition_id, "Condition", &[])
    }

    pub fn resource(&self) -> Condition {
        Condition {
            resource_type: "Condition",
            clinical_status: Some(CodeableConcept::single(Coding::new(
                "http://terminology.hl7.org/CodeSystem/condition-clinical",
                "active",
                "Active",
            ))),
            category: vec![CodeableConcept::single(Coding::new(
                "http://terminology.hl7.org/CodeSystem/condition-category",
                "encounter-diagnosis",
                "Encounter Diagnosis",
            ))],
            code: Some(CodeableConcept::single(Coding::new(
                "http://hl7.org/fhir/sid/icd-10",
                self.icd_code.clone(),
                self.icd_name.clone(),
            ))),
            subject: Reference::typed("Patient", &self.patient_satusehat_id)
                .with_display(&self.patient_name),
            encounter: Some(
                Reference::typed("Encounter", &self.encounter_id).with_display(format!(
                    "Kunjungan {}. Di tanggal {}",
                    self.patient_name, self.time
                )),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapper() -> ConditionDiagnosisMapper {
        ConditionDiagnosisMapper {
            condition_id: "11111111-2222-3333-4444-555555555555".to_string(),
            encounter_id: "99999999-8888-7777-6666-555555555555".to_string(),
            patient_satusehat_id: "P0001".to_string(),
            patient_name: "Budi Santoso".to_string(),
            time: "2024-03-14T10:30:00+00:00".to_string(),
            icd_code: "J06.9".to_string(),
            icd_name: "Acute upper respiratory infection".to_string(),
        }
    }

    #[test]
    fn test_condition_entry() {
        let entry = mapper().bundle_entry().unwrap();
        assert_eq!(entry.request.url, "Condition");
        assert_eq!(
            entry.resource["code"]["coding"][0]["system"],
            "http://hl7.org/fhir/sid/icd-10"
        );
        assert_eq!(entry.resource["code"]["coding"][0]["code"], "J06.9");
        assert_eq!(entry.resource["subject"]["reference"], "Patient/P0001");
        assert_eq!(
            entry.resource["category"][0]["coding"][0]["code"],
            "encounter-diagnosis"
        );
    }

    #[test]
    fn test_missing_icd_code_rejected() {
        let mut mapper = mapper();
        mapper.icd_code = String::new();
        let err = mapper.bundle_entry().unwrap_err();
        assert!(err.to_string().contains("icd_code"));
    }
}
