//! Vital-sign → Observation mapping
//!
//! One visit snapshot fans out into up to six observations, one per
//! reading that was actually taken. LOINC codes and UCUM units are fixed
//! reference data keyed by reading kind.

use crate::domain::{GarudaError, Result};
use crate::fhir::BundleEntry;
use crate::mapper::observation::{ObservationMapper, ObservationValue};
use crate::mapper::missing_fields;

/// Maps the vital-sign snapshot of one visit.
///
/// Entry ids are minted by the caller so the mapper itself stays pure.
#[derive(Debug, Clone, Default)]
pub struct VitalSignMapper {
    pub encounter_id: String,
    pub systole_id: String,
    pub diastole_id: String,
    pub heart_rate_id: String,
    pub temperature_id: String,
    pub respiration_rate_id: String,
    pub oxygen_saturation_id: String,
    pub patient_satusehat_id: String,
    pub patient_name: String,
    pub time: String,
    pub practitioner_satusehat_id: String,
    pub practitioner_name: String,
    pub systole: String,
    pub diastole: String,
    pub heart_rate: String,
    pub temperature: String,
    pub respiration_rate: String,
    pub oxygen_saturation: String,
}

impl VitalSignMapper {
    pub fn validate(&self) -> Result<()> {
        missing_fields(&[
            ("encounter_id", &self.encounter_id),
            ("systole_id", &self.systole_id),
            ("diastole_id", &self.diastole_id),
            ("heart_rate_id", &self.heart_rate_id),
            ("temperature_id", &self.temperature_id),
            ("respiration_rate_id", &self.respiration_rate_id),
            ("oxygen_saturation_id", &self.oxygen_saturation_id),
            ("patient_satusehat_id", &self.patient_satusehat_id),
            ("patient_name", &self.patient_name),
            ("time", &self.time),
        ])
        .map_err(GarudaError::Validation)
    }

    /// One bundle entry per non-empty reading.
    pub fn bundle_entries(&self) -> Result<Vec<BundleEntry>> {
        self.validate()?;
        self.observations()
            .iter()
            .map(|observation| observation.bundle_entry())
            .collect()
    }

    /// Observations for the readings that were taken, in fixed order:
    /// systole, diastole, temperature, heart rate, respiration rate,
    /// oxygen saturation.
    pub fn observations(&self) -> Vec<ObservationMapper> {
        let readings: [(&str, &str, &'static str, &'static str, &'static str, &'static str); 6] = [
            (
                &self.systole,
                &self.systole_id,
                "8480-6",
                "Systolic blood pressure",
                "mmHg",
                "mm[Hg]",
            ),
            (
                &self.diastole,
                &self.diastole_id,
                "8462-4",
                "Diastolic blood pressure",
                "mmHg",
                "mm[Hg]",
            ),
            (
                &self.temperature,
                &self.temperature_id,
                "8310-5",
                "Body temperature",
                "C",
                "Cel",
            ),
            (
                &self.heart_rate,
                &self.heart_rate_id,
                "8867-4",
                "Heart rate",
                "beats/min",
                "/min",
            ),
            (
                &self.respiration_rate,
                &self.respiration_rate_id,
                "9279-1",
                "Respiratory rate",
                "breaths/min",
                "/min",
            ),
            (
                &self.oxygen_saturation,
                &self.oxygen_saturation_id,
                "2708-6",
                "Oxygen saturation in Arterial blood",
                "%",
                "%",
            ),
        ];

        readings
            .into_iter()
            .filter(|(value, ..)| !value.trim().is_empty())
            .map(
                |(value, id, loinc_code, loinc_display, unit, code)| ObservationMapper {
                    observation_id: id.to_string(),
                    encounter_id: self.encounter_id.clone(),
                    patient_satusehat_id: self.patient_satusehat_id.clone(),
                    patient_name: self.patient_name.clone(),
                    time: self.time.clone(),
                    loinc_code,
                    loinc_display,
                    practitioner_satusehat_id: self.practitioner_satusehat_id.clone(),
                    practitioner_name: self.practitioner_name.clone(),
                    value_quantity: Some(ObservationValue {
                        value: value.to_string(),
                        unit,
                        code,
                    }),
                    value_code: None,
                },
            )
            .collect()
    }
}
