//! Pharmacy handover → Medication + MedicationDispense mapping

use crate::domain::{GarudaError, MedicineType, PatientType, Result};
use crate::fhir::resources::{
    Medication, MedicationBatch, MedicationDispense, MedicationDispensePerformer,
};
use crate::fhir::{BundleEntry, CodeableConcept, Coding, Extension, Identifier, Reference};
use crate::mapper::medication_request::medicine_type_coding;
use crate::mapper::{entry::transaction_entry, missing_fields, EntryTransform};

/// Maps one pharmacy handover row.
#[derive(Debug, Clone)]
pub struct MedicationDispenseMapper {
    pub medication_id: String,
    pub medication_dispense_id: String,
    pub encounter_id: String,
    pub organization_id: String,
    pub prescription_id: String,
    pub kfa_code: String,
    pub kfa_display: String,
    pub medicine_type: MedicineType,
    pub patient_type: PatientType,
    pub patient_id: String,
    pub patient_name: String,
    pub practitioner_id: String,
    pub practitioner_name: String,
    pub prepared_date: String,
    pub handover_date: String,
    pub batch_number: String,
    pub expiration_date: String,
}

impl MedicationDispenseMapper {
    pub fn validate(&self) -> Result<()> {
        missing_fields(&[
            ("medication_id", &self.medication_id),
            ("medication_dispense_id", &self.medication_dispense_id),
            ("encounter_id", &self.encounter_id),
            ("organization_id", &self.organization_id),
            ("prescription_id", &self.prescription_id),
            ("kfa_code", &self.kfa_code),
            ("kfa_display", &self.kfa_display),
            ("patient_id", &self.patient_id),
            ("patient_name", &self.patient_name),
            ("practitioner_id", &self.practitioner_id),
            ("practitioner_name", &self.practitioner_name),
            ("prepared_date", &self.prepared_date),
            ("handover_date", &self.handover_date),
            ("batch_number", &self.batch_number),
            ("expiration_date", &self.expiration_date),
        ])
        .map_err(GarudaError::Validation)
    }

    fn patient_type_coding(&self) -> Coding {
        match self.patient_type {
            PatientType::Outpatient => Coding::new(
                "http://terminology.hl7.org/fhir/CodeSystem/medicationdispense-category",
                "outpatient",
                "Outpatient",
            ),
            PatientType::Inpatient => Coding::new(
                "http://terminology.hl7.org/fhir/CodeSystem/medicationdispense-category",
                "inpatient",
                "Inpatient",
            ),
        }
    }

    pub fn resources(&self) -> (Medication, MedicationDispense) {
        let medication = Medication {
            resource_type: "Medication",
            identifier: vec![Identifier {
                system: Some(format!(
                    "http://sys-ids.kemkes.go.id/medication/{}",
                    self.organization_id
                )),
                use_: Some("official".to_string()),
                value: Some(self.prescription_id.clone()),
            }],
            code: Some(CodeableConcept::single(Coding::new(
                "http://sys-ids.kemkes.go.id/kfa",
                self.kfa_code.clone(),
                self.kfa_display.clone(),
            ))),
            status: Some("active"),
            batch: Some(MedicationBatch {
                lot_number: Some(self.batch_number.clone()),
                expiration_date: Some(self.expiration_date.clone()),
            }),
            extension: vec![Extension {
                url: "https://fhir.kemkes.go.id/r4/StructureDefinition/MedicationType"
                    .to_string(),
                value_codeable_concept: Some(CodeableConcept::single(medicine_type_coding(
                    self.medicine_type,
                ))),
            }],
        };

        let dispense = MedicationDispense {
            resource_type: "MedicationDispense",
            identifier: vec![Identifier {
                system: Some(format!(
                    "http://sys-ids.kemkes.go.id/prescription/{}",
                    self.organization_id
                )),
                use_: Some("official".to_string()),
                value: Some(self.prescription_id.clone()),
            }],
            status: "completed",
            category: Some(CodeableConcept::single(self.patient_type_coding())),
            medication_reference: Reference::urn(&self.medication_id)
                .with_display(&self.kfa_display),
            subject: Reference::typed("Patient", &self.patient_id)
                .with_display(&self.patient_name),
            context: Some(Reference::typed("Encounter", &self.encounter_id)),
            performer: vec![MedicationDispensePerformer {
                actor: Reference::typed("Practitioner", &self.practitioner_id)
                    .with_display(&self.practitioner_name),
            }],
            when_prepared: Some(self.prepared_date.clone()),
            when_handed_over: Some(self.handover_date.clone()),
        };

        (medication, dispense)
    }

    /// The Medication/MedicationDispense entry pair, in that order.
    pub fn bundle_entries(&self) -> Result<Vec<BundleEntry>> {
        self.validate()?;
        let (medication, dispense) = self.resources();

        let medication_entry =
            transaction_entry(&medication, &self.medication_id, "Medication", &[])?;
        let dispense_entry = transaction_entry(
            &dispense,
            &self.medication_dispense_id,
            "MedicationDispense",
            &[EntryTransform::RemoveKey("medicationCodeableConcept")],
        )?;

        Ok(vec![medication_entry, dispense_entry])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapper() -> MedicationDispenseMapper {
        MedicationDispenseMapper {
            medication_id: "med-uuid".to_string(),
            medication_dispense_id: "disp-uuid".to_string(),
            encounter_id: "enc-uuid".to_string(),
            organization_id: "ORG01".to_string(),
            prescription_id: "9001".to_string(),
            kfa_code: "93001019".to_string(),
            kfa_display: "Paracetamol 500 mg".to_string(),
            medicine_type: MedicineType::NonCompound,
            patient_type: PatientType::Outpatient,
            patient_id: "P0001".to_string(),
            patient_name: "Budi Santoso".to_string(),
            practitioner_id: "N10001".to_string(),
            practitioner_name: "apt. Dewi".to_string(),
            prepared_date: "2024-03-14T10:00:00+00:00".to_string(),
            handover_date: "2024-03-14T11:00:00+00:00".to_string(),
            batch_number: "B2024-03".to_string(),
            expiration_date: "2025-03-14T00:00:00+00:00".to_string(),
        }
    }

    #[test]
    fn test_entry_pair_order() {
        let entries = mapper().bundle_entries().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].request.url, "Medication");
        assert_eq!(entries[1].request.url, "MedicationDispense");
    }

    #[test]
    fn test_medication_batch() {
        let entries = mapper().bundle_entries().unwrap();
        let batch = &entries[0].resource["batch"];
        assert_eq!(batch["lotNumber"], "B2024-03");
        assert_eq!(batch["expirationDate"], "2025-03-14T00:00:00+00:00");
    }

    #[test]
    fn test_dispense_context_and_handover() {
        let entries = mapper().bundle_entries().unwrap();
        let dispense = &entries[1].resource;
        assert_eq!(dispense["context"]["reference"], "Encounter/enc-uuid");
        assert_eq!(dispense["whenHandedOver"], "2024-03-14T11:00:00+00:00");
        assert_eq!(dispense["whenPrepared"], "2024-03-14T10:00:00+00:00");
    }

    #[test]
    fn test_missing_batch_rejected() {
        let mut mapper = mapper();
        mapper.batch_number = String::new();
        let err = mapper.bundle_entries().unwrap_err();
        assert!(err.to_string().contains("batch_number"));
    }
}
