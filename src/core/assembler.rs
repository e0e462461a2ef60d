//! Bundle assembler
//!
//! Composes the ordered entry set for one visit into a single
//! transaction bundle. A fresh encounter correlation id is minted per
//! assembly and shared by every entry, so all resources in the bundle
//! bind to the same clinical encounter.
//!
//! Entry order is a compatibility contract with receivers that process
//! transaction entries sequentially: encounter first, then vital-sign
//! observations, diagnoses, medication requests, medication dispenses.

use crate::domain::{
    Diagnosis, GarudaError, MedicationDispense, MedicationRequest, Result, VisitDetail,
    VisitRecord, VitalSign,
};
use crate::fhir::{Bundle, BundleEntry};
use crate::mapper::{
    format_time, ConditionDiagnosisMapper, EncounterDiagnosisRef, EncounterMapper,
    MedicationDispenseMapper, MedicationRequestMapper, VitalSignMapper,
};
use uuid::Uuid;

/// Builds the transaction bundle for one ready visit record.
#[derive(Debug, Clone)]
pub struct BundleAssembler {
    organization_id: String,
    convert_to_utc: bool,
}

impl BundleAssembler {
    pub fn new(organization_id: impl Into<String>, convert_to_utc: bool) -> Self {
        Self {
            organization_id: organization_id.into(),
            convert_to_utc,
        }
    }

    /// Assemble the full bundle for a record.
    ///
    /// Sections decode from whatever is currently persisted; an element
    /// that fails its required-field check is skipped, never failing the
    /// whole bundle. An unreadable visit-detail snapshot is a hard error
    /// since nothing can reference the encounter.
    pub fn assemble(&self, record: &VisitRecord) -> Result<Bundle> {
        let encounter_id = Uuid::new_v4().to_string();
        let detail = record.visit_detail().ok_or_else(|| {
            GarudaError::Mapping(format!(
                "visit {} has an unreadable visit_detail snapshot",
                record.visit_id
            ))
        })?;

        // Diagnoses are mapped first so the encounter can reference them,
        // but their entries land after the vital signs.
        let (diagnosis_entries, encounter_diagnosis) =
            self.diagnosis_entries(&encounter_id, &detail, record.diagnosis());

        let mut entries =
            vec![self.encounter_entry(&encounter_id, &detail, encounter_diagnosis)?];
        entries.extend(self.vital_sign_entries(&encounter_id, &detail, record.vital_sign())?);
        entries.extend(diagnosis_entries);
        entries.extend(self.medication_request_entries(
            &encounter_id,
            &detail,
            record.medication_request(),
        ));
        entries.extend(self.medication_dispense_entries(
            &encounter_id,
            &detail,
            record.medication_dispense(),
        ));

        Ok(Bundle::transaction(entries))
    }

    fn encounter_entry(
        &self,
        encounter_id: &str,
        detail: &VisitDetail,
        diagnosis: Vec<EncounterDiagnosisRef>,
    ) -> Result<BundleEntry> {
        let mapper = EncounterMapper {
            encounter_id: encounter_id.to_string(),
            patient_satusehat_id: detail.patient_satusehat_id.clone(),
            patient_name: detail.patient_name.clone(),
            practitioner_satusehat_id: detail.practitioner_satusehat_id.clone(),
            practitioner_name: detail.practitioner_name.clone(),
            organization_id: self.organization_id.clone(),
            location_name: detail.clinic_name.clone(),
            location_id: detail.clinic_satusehat_id.clone(),
            period_start_date: self.time(detail.period_start_date),
            period_end_date: self.time(detail.period_end_date),
            arrived_start_time: self.time(detail.arrived_start_time),
            arrived_end_time: self.time(detail.arrived_end_time),
            in_progress_start_time: self.time(detail.in_progress_start_time),
            in_progress_end_time: self.time(detail.in_progress_end_time),
            finish_start_time: self.time(detail.finish_start_time),
            finish_end_time: self.time(detail.finish_end_time),
            diagnosis,
        };
        mapper.bundle_entry()
    }

    fn vital_sign_entries(
        &self,
        encounter_id: &str,
        detail: &VisitDetail,
        vital_sign: Option<VitalSign>,
    ) -> Result<Vec<BundleEntry>> {
        let Some(vital_sign) = vital_sign else {
            return Ok(Vec::new());
        };
        let mapper = VitalSignMapper {
            encounter_id: encounter_id.to_string(),
            systole_id: Uuid::new_v4().to_string(),
            diastole_id: Uuid::new_v4().to_string(),
            heart_rate_id: Uuid::new_v4().to_string(),
            temperature_id: Uuid::new_v4().to_string(),
            respiration_rate_id: Uuid::new_v4().to_string(),
            oxygen_saturation_id: Uuid::new_v4().to_string(),
            patient_satusehat_id: detail.patient_satusehat_id.clone(),
            patient_name: detail.patient_name.clone(),
            time: self.time(detail.period_start_date),
            practitioner_satusehat_id: detail.practitioner_satusehat_id.clone(),
            practitioner_name: detail.practitioner_name.clone(),
            systole: vital_sign.systole,
            diastole: vital_sign.diastole,
            heart_rate: vital_sign.heart_rate,
            temperature: vital_sign.temperature,
            respiration_rate: vital_sign.respiration_rate,
            oxygen_saturation: vital_sign.oxygen_saturation,
        };
        mapper.bundle_entries()
    }

    fn diagnosis_entries(
        &self,
        encounter_id: &str,
        detail: &VisitDetail,
        diagnoses: Option<Vec<Diagnosis>>,
    ) -> (Vec<BundleEntry>, Vec<EncounterDiagnosisRef>) {
        let mut entries = Vec::new();
        let mut refs = Vec::new();

        for diagnosis in diagnoses.unwrap_or_default() {
            let condition_id = Uuid::new_v4().to_string();
            let mapper = ConditionDiagnosisMapper {
                condition_id: condition_id.clone(),
                encounter_id: encounter_id.to_string(),
                patient_satusehat_id: detail.patient_satusehat_id.clone(),
                patient_name: detail.patient_name.clone(),
                time: self.time(diagnosis.diagnosis_date),
                icd_code: diagnosis.diagnosis_code.clone(),
                icd_name: diagnosis.diagnosis_name.clone(),
            };
            match mapper.bundle_entry() {
                Ok(entry) => {
                    refs.push(EncounterDiagnosisRef {
                        id: condition_id,
                        display: diagnosis.diagnosis_name,
                    });
                    entries.push(entry);
                }
                Err(_) => continue,
            }
        }

        (entries, refs)
    }

    fn medication_request_entries(
        &self,
        encounter_id: &str,
        detail: &VisitDetail,
        requests: Option<Vec<MedicationRequest>>,
    ) -> Vec<BundleEntry> {
        let mut entries = Vec::new();
        for request in requests.unwrap_or_default() {
            let mapper = MedicationRequestMapper {
                medication_id: Uuid::new_v4().to_string(),
                medication_request_id: Uuid::new_v4().to_string(),
                encounter_id: encounter_id.to_string(),
                organization_id: self.organization_id.clone(),
                prescription_id: request.prescription_id.to_string(),
                kfa_code: request.kfa_code.unwrap_or_default(),
                kfa_display: request.kfa_name.unwrap_or_default(),
                medicine_type: request.medicine_type,
                patient_type: request.patient_type,
                patient_id: detail.patient_satusehat_id.clone(),
                patient_name: detail.patient_name.clone(),
                practitioner_id: request.practitioner_id.unwrap_or_default(),
                practitioner_name: request.practitioner_name.unwrap_or_default(),
                date: self.time(request.date),
            };
            if let Ok(pair) = mapper.bundle_entries() {
                entries.extend(pair);
            }
        }
        entries
    }

    fn medication_dispense_entries(
        &self,
        encounter_id: &str,
        detail: &VisitDetail,
        dispenses: Option<Vec<MedicationDispense>>,
    ) -> Vec<BundleEntry> {
        let mut entries = Vec::new();
        for dispense in dispenses.unwrap_or_default() {
            let mapper = MedicationDispenseMapper {
                medication_id: Uuid::new_v4().to_string(),
                medication_dispense_id: Uuid::new_v4().to_string(),
                encounter_id: encounter_id.to_string(),
                organization_id: self.organization_id.clone(),
                prescription_id: dispense.prescription_id.to_string(),
                kfa_code: dispense.kfa_code.unwrap_or_default(),
                kfa_display: dispense.kfa_name.unwrap_or_default(),
                medicine_type: dispense.medicine_type,
                patient_type: dispense.patient_type,
                patient_id: detail.patient_satusehat_id.clone(),
                patient_name: detail.patient_name.clone(),
                practitioner_id: dispense.practitioner_id.unwrap_or_default(),
                practitioner_name: dispense.practitioner_name.unwrap_or_default(),
                prepared_date: self.time(dispense.prescription_start_date),
                handover_date: self.time(dispense.handover_date),
                batch_number: dispense.batch_number.clone(),
                expiration_date: self.time(dispense.expired_date),
            };
            if let Ok(pair) = mapper.bundle_entries() {
                entries.extend(pair);
            }
        }
        entries
    }

    fn time(&self, t: Option<chrono::NaiveDateTime>) -> String {
        format_time(t, self.convert_to_utc)
    }
}
