//! Generic Observation mapping

use crate::domain::{GarudaError, Result};
use crate::fhir::resources::Observation;
use crate::fhir::{BundleEntry, CodeableConcept, Coding, Quantity, Reference};
use crate::mapper::{entry::transaction_entry, missing_fields, parse_decimal};

/// Numeric observation value with its UCUM coding.
#[derive(Debug, Clone)]
pub struct ObservationValue {
    pub value: String,
    pub unit: &'static str,
    pub code: &'static str,
}

/// Coded observation value (LOINC answer code).
#[derive(Debug, Clone)]
pub struct ObservationValueCode {
    pub code: String,
    pub display: String,
}

/// Maps one measurement to a final Observation.
#[derive(Debug, Clone, Default)]
pub struct ObservationMapper {
    pub observation_id: String,
    pub encounter_id: String,
    pub patient_satusehat_id: String,
    pub patient_name: String,
    pub time: String,
    pub loinc_code: &'static str,
    pub loinc_display: &'static str,
    pub practitioner_satusehat_id: String,
    pub practitioner_name: String,
    pub value_quantity: Option<ObservationValue>,
    pub value_code: Option<ObservationValueCode>,
}

impl ObservationMapper {
    pub fn validate(&self) -> Result<()> {
        missing_fields(&[
            ("observation_id", &self.observation_id),
            ("encounter_id", &self.encounter_id),
            ("patient_satusehat_id", &self.patient_satusehat_id),
            ("patient_name", &self.patient_name),
            ("time", &self.time),
            ("loinc_code", self.loinc_code),
        ])
        .map_err(GarudaError::Validation)
    }

    pub fn bundle_entry(&self) -> Result<BundleEntry> {
        self.validate()?;
        transaction_entry(&self.resource(), &self.observation_id, "Observation", &[])
    }

    pub fn resource(&self) -> Observation {
        Observation {
            resource_type: "Observation",
            status: "final",
            code: CodeableConcept::single(Coding::new(
                "http://loinc.org",
                self.loinc_code,
                self.loinc_display,
            )),
            subject: Some(
                Reference::typed("Patient", &self.patient_satusehat_id)
                    .with_display(&self.patient_name),
            ),
            encounter: Some(
                Reference::typed("Encounter", &self.encounter_id).with_display(format!(
                    "Kunjungan {}. Di tanggal {}",
                    self.patient_name, self.time
                )),
            ),
            performer: vec![Reference::typed(
                "Practitioner",
                &self.practitioner_satusehat_id,
            )
            .with_display(&self.practitioner_name)],
            effective_date_time: Some(self.time.clone()),
            value_quantity: self.value_quantity.as_ref().map(|v| Quantity {
                system: Some("http://unitsofmeasure.org".to_string()),
                value: parse_decimal(&v.value),
                unit: Some(v.unit.to_string()),
                code: Some(v.code.to_string()),
            }),
            value_codeable_concept: self.value_code.as_ref().map(|v| {
                CodeableConcept::single(Coding::new(
                    "http://loinc.org",
                    v.code.clone(),
                    v.display.clone(),
                ))
            }),
        }
    }
}
