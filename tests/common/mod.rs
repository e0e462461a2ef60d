//! Shared test doubles and record builders
//!
//! In-memory implementations of the store and source capabilities with
//! call counters, so the sweep jobs can be exercised end to end without
//! a database.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration, NaiveDateTime};
use garuda::adapters::source::VisitSource;
use garuda::adapters::store::VisitStore;
use garuda::domain::{
    Diagnosis, MappingStatus, MedicationDispense, MedicationRequest, NewVisitRecord,
    ObservationLab, ObservationRadiology, Procedure, PublishOutcome, PublishStatus, SectionKind,
    SourceError, StoreError, Visit, VisitRecord,
};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// In-memory [`VisitStore`] with write counters.
#[derive(Default)]
pub struct MemoryVisitStore {
    pub records: Mutex<Vec<VisitRecord>>,
    pub create_calls: AtomicUsize,
    pub section_writes: AtomicUsize,
    pub status_writes: AtomicUsize,
    pub publish_writes: AtomicUsize,
    /// Visit ids whose create should fail.
    pub fail_create: Mutex<HashSet<String>>,
}

impl MemoryVisitStore {
    pub fn with_records(records: Vec<VisitRecord>) -> Self {
        Self {
            records: Mutex::new(records),
            ..Self::default()
        }
    }

    pub fn record(&self, visit_id: &str) -> Option<VisitRecord> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .find(|record| record.visit_id == visit_id)
            .cloned()
    }

    pub fn visit_ids(&self) -> Vec<String> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .map(|record| record.visit_id.clone())
            .collect()
    }
}

#[async_trait]
impl VisitStore for MemoryVisitStore {
    async fn exists(&self, visit_id: &str) -> Result<bool, StoreError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .any(|record| record.visit_id == visit_id))
    }

    async fn create(&self, record: NewVisitRecord) -> Result<(), StoreError> {
        if self.fail_create.lock().unwrap().contains(&record.visit_id) {
            return Err(StoreError::Write("injected create failure".to_string()));
        }
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.records.lock().unwrap().push(VisitRecord {
            visit_id: record.visit_id,
            visit_date: record.visit_date,
            satusehat_patient_id: record.satusehat_patient_id,
            visit_detail: record.visit_detail,
            vital_sign: record.vital_sign,
            diagnosis: None,
            lab: None,
            radiology: None,
            medication_request: None,
            medication_dispense: None,
            procedure: None,
            publish_date: None,
            publish_request: None,
            publish_response: None,
            mapping_errors: Some(record.mapping_errors),
            mapping_status: record.mapping_status,
            publish_status: PublishStatus::Preparing,
        });
        Ok(())
    }

    async fn list_by_mapping_status(
        &self,
        status: MappingStatus,
    ) -> Result<Vec<VisitRecord>, StoreError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|record| record.mapping_status == status)
            .cloned()
            .collect())
    }

    async fn update_section(
        &self,
        visit_id: &str,
        kind: SectionKind,
        payload: &Value,
    ) -> Result<(), StoreError> {
        self.section_writes.fetch_add(1, Ordering::SeqCst);
        let mut records = self.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|record| record.visit_id == visit_id)
            .ok_or_else(|| StoreError::Write(format!("no such visit: {visit_id}")))?;
        let slot = match kind {
            SectionKind::Diagnosis => &mut record.diagnosis,
            SectionKind::Lab => &mut record.lab,
            SectionKind::Radiology => &mut record.radiology,
            SectionKind::MedicationRequest => &mut record.medication_request,
            SectionKind::MedicationDispense => &mut record.medication_dispense,
            SectionKind::Procedure => &mut record.procedure,
        };
        *slot = Some(payload.clone());
        Ok(())
    }

    async fn update_mapping_status(
        &self,
        visit_id: &str,
        status: MappingStatus,
    ) -> Result<(), StoreError> {
        self.status_writes.fetch_add(1, Ordering::SeqCst);
        let mut records = self.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|record| record.visit_id == visit_id)
            .ok_or_else(|| StoreError::Write(format!("no such visit: {visit_id}")))?;
        record.mapping_status = status;
        Ok(())
    }

    async fn update_publish_outcome(
        &self,
        visit_id: &str,
        outcome: PublishOutcome,
    ) -> Result<(), StoreError> {
        self.publish_writes.fetch_add(1, Ordering::SeqCst);
        let mut records = self.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|record| record.visit_id == visit_id)
            .ok_or_else(|| StoreError::Write(format!("no such visit: {visit_id}")))?;
        record.publish_request = Some(outcome.request);
        record.publish_response = Some(outcome.response);
        record.publish_date = Some(outcome.timestamp);
        record.publish_status = outcome.status;
        Ok(())
    }
}

/// Canned [`VisitSource`] with per-section data and failure injection.
#[derive(Default)]
pub struct StubVisitSource {
    pub visits: Mutex<Vec<Visit>>,
    pub diagnosis: Mutex<HashMap<String, Vec<Diagnosis>>>,
    pub lab: Mutex<HashMap<String, Vec<ObservationLab>>>,
    pub radiology: Mutex<HashMap<String, Vec<ObservationRadiology>>>,
    pub medication_request: Mutex<HashMap<String, Vec<MedicationRequest>>>,
    pub medication_dispense: Mutex<HashMap<String, Vec<MedicationDispense>>>,
    pub procedure: Mutex<HashMap<String, Vec<Procedure>>>,
    /// Section kinds whose fetch should fail.
    pub fail_sections: Mutex<HashSet<&'static str>>,
    /// Every section fetch as `"<kind>:<visit_id>"`, in call order.
    pub calls: Mutex<Vec<String>>,
}

impl StubVisitSource {
    pub fn with_visits(visits: Vec<Visit>) -> Self {
        Self {
            visits: Mutex::new(visits),
            ..Self::default()
        }
    }

    fn fetch<T: Clone>(
        &self,
        kind: SectionKind,
        visit_id: &str,
        data: &Mutex<HashMap<String, Vec<T>>>,
    ) -> Result<Vec<T>, SourceError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{}:{visit_id}", kind.as_str()));
        if self.fail_sections.lock().unwrap().contains(kind.as_str()) {
            return Err(SourceError::QueryFailed("injected failure".to_string()));
        }
        Ok(data
            .lock()
            .unwrap()
            .get(visit_id)
            .cloned()
            .unwrap_or_default())
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl VisitSource for StubVisitSource {
    async fn fetch_visits_between(
        &self,
        _start: NaiveDateTime,
        _end: NaiveDateTime,
    ) -> Result<Vec<Visit>, SourceError> {
        Ok(self.visits.lock().unwrap().clone())
    }

    async fn fetch_diagnosis(&self, visit_id: &str) -> Result<Vec<Diagnosis>, SourceError> {
        self.fetch(SectionKind::Diagnosis, visit_id, &self.diagnosis)
    }

    async fn fetch_lab(&self, visit_id: &str) -> Result<Vec<ObservationLab>, SourceError> {
        self.fetch(SectionKind::Lab, visit_id, &self.lab)
    }

    async fn fetch_radiology(
        &self,
        visit_id: &str,
    ) -> Result<Vec<ObservationRadiology>, SourceError> {
        self.fetch(SectionKind::Radiology, visit_id, &self.radiology)
    }

    async fn fetch_medication_request(
        &self,
        visit_id: &str,
    ) -> Result<Vec<MedicationRequest>, SourceError> {
        self.fetch(
            SectionKind::MedicationRequest,
            visit_id,
            &self.medication_request,
        )
    }

    async fn fetch_medication_dispense(
        &self,
        visit_id: &str,
    ) -> Result<Vec<MedicationDispense>, SourceError> {
        self.fetch(
            SectionKind::MedicationDispense,
            visit_id,
            &self.medication_dispense,
        )
    }

    async fn fetch_procedure(&self, visit_id: &str) -> Result<Vec<Procedure>, SourceError> {
        self.fetch(SectionKind::Procedure, visit_id, &self.procedure)
    }
}

pub fn days_ago(days: i64) -> NaiveDateTime {
    chrono::Local::now().naive_local() - Duration::days(days)
}

/// Complete visit-detail snapshot as stored JSON.
pub fn visit_detail_json(visit_id: &str) -> Value {
    json!({
        "visit_id": visit_id,
        "patient_satusehat_id": "P0001",
        "patient_nik": "3174012345670001",
        "patient_name": "Budi Santoso",
        "patient_sex": "L",
        "patient_birth_date": null,
        "patient_address": "Jl. Melati 12",
        "practitioner_nik": "3174012345670002",
        "practitioner_satusehat_id": "N10001",
        "practitioner_name": "dr. Sari",
        "clinic_name": "Poli Umum",
        "clinic_satusehat_id": "L-01",
        "period_start_date": "2024-03-14T08:00:00",
        "period_end_date": "2024-03-14T09:00:00",
        "arrived_start_time": "2024-03-14T08:00:00",
        "arrived_end_time": "2024-03-14T08:10:00",
        "in_progress_start_time": "2024-03-14T08:10:00",
        "in_progress_end_time": "2024-03-14T08:50:00",
        "finish_start_time": "2024-03-14T08:50:00",
        "finish_end_time": "2024-03-14T09:00:00"
    })
}

pub fn vital_sign_json() -> Value {
    json!({
        "systole": "120",
        "diastole": "80",
        "heart_rate": "",
        "respiration_rate": "",
        "temperature": "36,5",
        "oxygen_saturation": ""
    })
}

pub fn diagnosis_payload(count: usize) -> Value {
    let items: Vec<Value> = (0..count)
        .map(|i| {
            json!({
                "visit_id": "V-001",
                "diagnosis_code": format!("J06.{i}"),
                "diagnosis_name": format!("Diagnosis {i}"),
                "diagnosis_date": "2024-03-14T08:30:00"
            })
        })
        .collect();
    Value::Array(items)
}

pub fn lab_payload() -> Value {
    json!([{
        "visit_id": 1,
        "lab_name": "Hemoglobin",
        "lab_result": "13.2",
        "lab_loinc_code": "718-7",
        "lab_loinc_name": "Hemoglobin [Mass/volume] in Blood",
        "practitioner_name": "dr. Sari"
    }])
}

pub fn radiology_payload() -> Value {
    json!([{
        "visit_id": 1,
        "lab_name": "Thorax PA",
        "lab_result": "Normal",
        "lab_loinc_code": "24648-8",
        "lab_loinc_name": "XR Chest PA upright",
        "practitioner_name": "dr. Sari"
    }])
}

pub fn medication_request_payload(count: usize) -> Value {
    let items: Vec<Value> = (0..count)
        .map(|i| {
            json!({
                "visit_id": 1,
                "patient_type": "Outpatient",
                "date": "2024-03-14T08:45:00",
                "prescription_id": 9000 + i,
                "kfa_code": "93001019",
                "kfa_name": "Paracetamol 500 mg",
                "type": "NonCompound",
                "practitioner_id": "N10001",
                "practitioner_name": "dr. Sari",
                "amount": 10.0,
                "unit": "tablet"
            })
        })
        .collect();
    Value::Array(items)
}

pub fn medication_dispense_payload(count: usize) -> Value {
    let items: Vec<Value> = (0..count)
        .map(|i| {
            json!({
                "visit_id": 1,
                "patient_type": "Outpatient",
                "date": "2024-03-14T10:00:00",
                "prescription_id": 9000 + i,
                "kfa_code": "93001019",
                "kfa_name": "Paracetamol 500 mg",
                "type": "NonCompound",
                "practitioner_id": "N20001",
                "practitioner_name": "apt. Dewi",
                "batch_number": "B2024-03",
                "expired_date": "2025-03-14T00:00:00",
                "prescription_start_date": "2024-03-14T10:00:00",
                "drug_received_date": "2024-03-14T11:00:00"
            })
        })
        .collect();
    Value::Array(items)
}

pub fn procedure_payload() -> Value {
    json!([{
        "visit_id": 1,
        "procedure_code": "87.44",
        "procedure_name": "Routine chest x-ray"
    }])
}

/// Incomplete record with valid snapshots and no sections.
pub fn incomplete_record(visit_id: &str, visit_date: NaiveDateTime) -> VisitRecord {
    VisitRecord {
        visit_id: visit_id.to_string(),
        visit_date,
        satusehat_patient_id: "P0001".to_string(),
        visit_detail: visit_detail_json(visit_id),
        vital_sign: vital_sign_json(),
        diagnosis: None,
        lab: None,
        radiology: None,
        medication_request: None,
        medication_dispense: None,
        procedure: None,
        publish_date: None,
        publish_request: None,
        publish_response: None,
        mapping_errors: Some(String::new()),
        mapping_status: MappingStatus::Incomplete,
        publish_status: PublishStatus::Preparing,
    }
}

/// Record with every section present and valid.
pub fn filled_record(visit_id: &str, visit_date: NaiveDateTime) -> VisitRecord {
    let mut record = incomplete_record(visit_id, visit_date);
    record.diagnosis = Some(diagnosis_payload(1));
    record.lab = Some(lab_payload());
    record.radiology = Some(radiology_payload());
    record.medication_request = Some(medication_request_payload(1));
    record.medication_dispense = Some(medication_dispense_payload(1));
    record.procedure = Some(procedure_payload());
    record
}

/// Ready-to-publish record with diagnoses and medications.
pub fn ready_record(visit_id: &str) -> VisitRecord {
    let mut record = filled_record(visit_id, days_ago(3));
    record.mapping_status = MappingStatus::Ready;
    record
}

/// Visit candidate with a complete snapshot.
pub fn valid_visit(visit_id: &str) -> Visit {
    let detail = visit_detail_json(visit_id);
    Visit {
        visit_id: visit_id.to_string(),
        patient_satusehat_id: "P0001".to_string(),
        patient_nik: "3174012345670001".to_string(),
        patient_name: "Budi Santoso".to_string(),
        patient_sex: "L".to_string(),
        patient_birth_date: None,
        patient_address: "Jl. Melati 12".to_string(),
        practitioner_nik: "3174012345670002".to_string(),
        practitioner_satusehat_id: "N10001".to_string(),
        practitioner_name: "dr. Sari".to_string(),
        clinic_satusehat_id: "L-01".to_string(),
        clinic_name: "Poli Umum".to_string(),
        systole: "120".to_string(),
        diastole: "80".to_string(),
        heart_rate: String::new(),
        respiration_rate: String::new(),
        oxygen_saturation: String::new(),
        temperature: "36,5".to_string(),
        period_start_date: parse_ts(&detail["period_start_date"]),
        period_end_date: parse_ts(&detail["period_end_date"]),
        arrived_start_time: parse_ts(&detail["arrived_start_time"]),
        arrived_end_time: parse_ts(&detail["arrived_end_time"]),
        in_progress_start_time: parse_ts(&detail["in_progress_start_time"]),
        in_progress_end_time: parse_ts(&detail["in_progress_end_time"]),
        finish_start_time: parse_ts(&detail["finish_start_time"]),
        finish_end_time: parse_ts(&detail["finish_end_time"]),
    }
}

/// Visit candidate missing its practitioner mapping (invalid snapshot).
pub fn invalid_visit(visit_id: &str) -> Visit {
    let mut visit = valid_visit(visit_id);
    visit.practitioner_satusehat_id = String::new();
    visit
}

fn parse_ts(value: &Value) -> Option<NaiveDateTime> {
    value
        .as_str()
        .and_then(|s| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").ok())
}
