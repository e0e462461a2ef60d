//! Prescription → Medication + MedicationRequest mapping
//!
//! Each prescription row becomes a pair of entries: the Medication first,
//! then the MedicationRequest referencing it through its temporary
//! `urn:uuid:` id.

use crate::domain::{GarudaError, MedicineType, PatientType, Result};
use crate::fhir::resources::{
    Medication, MedicationRequest, MedicationRequestDispenseRequest,
};
use crate::fhir::{
    BundleEntry, CodeableConcept, Coding, Extension, Identifier, Reference,
};
use crate::mapper::{entry::transaction_entry, missing_fields, EntryTransform};

/// Coding for the compound/non-compound medication type extension.
pub(crate) fn medicine_type_coding(medicine_type: MedicineType) -> Coding {
    match medicine_type {
        MedicineType::NonCompound => Coding::new(
            "http://terminology.kemkes.go.id/CodeSystem/medication-type",
            "NC",
            "Non-compound",
        ),
        MedicineType::Compound => Coding::new(
            "http://terminology.kemkes.go.id/CodeSystem/medication-type",
            "C",
            "Compound",
        ),
    }
}

/// Maps one prescription row.
#[derive(Debug, Clone)]
pub struct MedicationRequestMapper {
    pub medication_id: String,
    pub medication_request_id: String,
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
    pub date: String,
}

impl MedicationRequestMapper {
    pub fn validate(&self) -> Result<()> {
        missing_fields(&[
            ("medication_id", &self.medication_id),
            ("medication_request_id", &self.medication_request_id),
            ("encounter_id", &self.encounter_id),
            ("organization_id", &self.organization_id),
            ("prescription_id", &self.prescription_id),
            ("kfa_code", &self.kfa_code),
            ("kfa_display", &self.kfa_display),
            ("patient_id", &self.patient_id),
            ("patient_name", &self.patient_name),
            ("practitioner_id", &self.practitioner_id),
            ("practitioner_name", &self.practitioner_name),
            ("date", &self.date),
        ])
        .map_err(GarudaError::Validation)
    }

    fn patient_type_coding(&self) -> Coding {
        match self.patient_type {
            PatientType::Outpatient => Coding::new(
                "http://terminology.hl7.org/CodeSystem/medicationrequest-category",
                "outpatient",
                "Outpatient",
            ),
            PatientType::Inpatient => Coding::new(
                "http://terminology.hl7.org/CodeSystem/medicationrequest-category",
                "inpatient",
                "Inpatient",
            ),
        }
    }

    pub fn resources(&self) -> (Medication, MedicationRequest) {
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
            batch: None,
            extension: vec![Extension {
                url: "https://fhir.kemkes.go.id/r4/StructureDefinition/MedicationType"
                    .to_string(),
                value_codeable_concept: Some(CodeableConcept::single(medicine_type_coding(
                    self.medicine_type,
                ))),
            }],
        };

        let request = MedicationRequest {
            resource_type: "MedicationRequest",
            identifier: vec![Identifier {
                system: Some(format!(
                    "http://sys-ids.kemkes.go.id/prescription/{}",
                    self.organization_id
                )),
                use_: Some("official".to_string()),
                value: Some(self.prescription_id.clone()),
            }],
            status: "completed",
            intent: "order",
            category: vec![CodeableConcept::single(self.patient_type_coding())],
            priority: Some("routine"),
            medication_reference: Reference::urn(&self.medication_id)
                .with_display(&self.kfa_display),
            subject: Reference::typed("Patient", &self.patient_id)
                .with_display(&self.patient_name),
            encounter: Some(Reference::typed("Encounter", &self.encounter_id)),
            authored_on: Some(self.date.clone()),
            requester: Some(
                Reference::typed("Practitioner", &self.practitioner_id)
                    .with_display(&self.practitioner_name),
            ),
            dispense_request: Some(MedicationRequestDispenseRequest {
                performer: Some(Reference::typed("Organization", &self.organization_id)),
            }),
        };

        (medication, request)
    }

    /// The Medication/MedicationRequest entry pair, in that order.
    pub fn bundle_entries(&self) -> Result<Vec<BundleEntry>> {
        self.validate()?;
        let (medication, request) = self.resources();

        let medication_entry =
            transaction_entry(&medication, &self.medication_id, "Medication", &[])?;
        // The registry chokes on medicationCodeableConcept alongside the
        // reference; strip it from the serialized entry.
        let request_entry = transaction_entry(
            &request,
            &self.medication_request_id,
            "MedicationRequest",
            &[EntryTransform::RemoveKey("medicationCodeableConcept")],
        )?;

        Ok(vec![medication_entry, request_entry])
    }
}
