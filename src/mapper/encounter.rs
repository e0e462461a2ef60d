//! Visit detail → Encounter mapping

use crate::domain::{GarudaError, Result};
use crate::fhir::resources::{
    Encounter, EncounterDiagnosis, EncounterLocation, EncounterParticipant,
    EncounterStatusHistory,
};
use crate::fhir::{BundleEntry, CodeableConcept, Coding, Identifier, Period, Reference};
use crate::mapper::{entry::transaction_entry, missing_fields};

/// Lightweight reference to an in-bundle Condition, consumed by the
/// encounter's diagnosis list.
#[derive(Debug, Clone)]
pub struct EncounterDiagnosisRef {
    pub id: String,
    pub display: String,
}

/// Maps the visit-detail snapshot to the bundle's Encounter.
#[derive(Debug, Clone, Default)]
pub struct EncounterMapper {
    pub encounter_id: String,
    pub patient_satusehat_id: String,
    pub patient_name: String,
    pub practitioner_satusehat_id: String,
    pub practitioner_name: String,
    pub organization_id: String,
    pub location_name: String,
    pub location_id: String,
    pub period_start_date: String,
    pub period_end_date: String,
    pub arrived_start_time: String,
    pub arrived_end_time: String,
    pub in_progress_start_time: String,
    pub in_progress_end_time: String,
    pub finish_start_time: String,
    pub finish_end_time: String,
    pub diagnosis: Vec<EncounterDiagnosisRef>,
}

impl EncounterMapper {
    pub fn validate(&self) -> Result<()> {
        missing_fields(&[
            ("encounter_id", &self.encounter_id),
            ("patient_satusehat_id", &self.patient_satusehat_id),
            ("patient_name", &self.patient_name),
            ("practitioner_satusehat_id", &self.practitioner_satusehat_id),
            ("practitioner_name", &self.practitioner_name),
            ("organization_id", &self.organization_id),
            ("location_name", &self.location_name),
            ("location_id", &self.location_id),
            ("period_start_date", &self.period_start_date),
            ("period_end_date", &self.period_end_date),
            ("arrived_start_time", &self.arrived_start_time),
            ("arrived_end_time", &self.arrived_end_time),
            ("in_progress_start_time", &self.in_progress_start_time),
            ("in_progress_end_time", &self.in_progress_end_time),
            ("finish_start_time", &self.finish_start_time),
            ("finish_end_time", &self.finish_end_time),
        ])
        .map_err(GarudaError::Validation)
    }

    pub fn bundle_entry(&self) -> Result<BundleEntry> {
        self.validate()?;
        transaction_entry(&self.resource(), &self.encounter_id, "Encounter", &[])
    }

    pub fn resource(&self) -> Encounter {
        let period = |start: &str, end: &str| Period {
            start: Some(start.to_string()),
            end: Some(end.to_string()),
        };

        Encounter {
            resource_type: "Encounter",
            identifier: vec![Identifier {
                system: Some(format!(
                    "http://sys-ids.kemkes.go.id/encounter/{}",
                    self.organization_id
                )),
                use_: None,
                value: Some(self.patient_satusehat_id.clone()),
            }],
            status: "finished",
            class: Coding::new(
                "http://terminology.hl7.org/CodeSystem/v3-ActCode",
                "AMB",
                "ambulatory",
            ),
            subject: Reference::typed("Patient", &self.patient_satusehat_id)
                .with_display(&self.patient_name),
            participant: vec![EncounterParticipant {
                type_: vec![CodeableConcept::single(Coding::new(
                    "http://terminology.hl7.org/CodeSystem/v3-ParticipationType",
                    "ATND",
                    "attender",
                ))],
                individual: Some(
                    Reference::typed("Practitioner", &self.practitioner_satusehat_id)
                        .with_display(&self.practitioner_name),
                ),
            }],
            period: period(&self.period_start_date, &self.period_end_date),
            location: vec![EncounterLocation {
                location: Reference::typed("Location", &self.location_id)
                    .with_display(&self.location_name),
            }],
            status_history: vec![
                EncounterStatusHistory {
                    status: "arrived",
                    period: period(&self.arrived_start_time, &self.arrived_end_time),
                },
                EncounterStatusHistory {
                    status: "in-progress",
                    period: period(&self.in_progress_start_time, &self.in_progress_end_time),
                },
                EncounterStatusHistory {
                    status: "finished",
                    period: period(&self.finish_start_time, &self.finish_end_time),
                },
            ],
            diagnosis: self
                .diagnosis
                .iter()
                .map(|diagnosis| EncounterDiagnosis {
                    condition: Reference::urn(&diagnosis.id).with_display(&diagnosis.display),
                    use_: Some(CodeableConcept::single(Coding::new(
                        "http://terminology.hl7.org/CodeSystem/diagnosis-role",
                        "DD",
                        "Discharge diagnosis",
                    ))),
                })
                .collect(),
            service_provider: Some(Reference::typed("Organization", &self.organization_id)),
        }
    }
}
