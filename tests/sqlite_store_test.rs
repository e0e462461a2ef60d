//! Embedded store behavior against a real SQLite file

mod common;

use chrono::NaiveDate;
use common::{diagnosis_payload, visit_detail_json, vital_sign_json};
use garuda::adapters::store::{SqliteVisitStore, VisitStore};
use garuda::domain::{
    MappingStatus, NewVisitRecord, PublishOutcome, PublishStatus, SectionKind,
};

fn new_record(visit_id: &str, status: MappingStatus, errors: &str) -> NewVisitRecord {
    NewVisitRecord {
        visit_id: visit_id.to_string(),
        visit_date: NaiveDate::from_ymd_opt(2024, 3, 14)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap(),
        satusehat_patient_id: "P0001".to_string(),
        visit_detail: visit_detail_json(visit_id),
        vital_sign: vital_sign_json(),
        mapping_status: status,
        mapping_errors: errors.to_string(),
    }
}

async fn open_store(dir: &tempfile::TempDir) -> SqliteVisitStore {
    SqliteVisitStore::open(dir.path().join("garuda.db"))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_create_and_exists() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir).await;

    assert!(!store.exists("V-001").await.unwrap());
    store
        .create(new_record("V-001", MappingStatus::Incomplete, ""))
        .await
        .unwrap();
    assert!(store.exists("V-001").await.unwrap());
}

#[tokio::test]
async fn test_duplicate_create_rejected_by_primary_key() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir).await;

    store
        .create(new_record("V-001", MappingStatus::Incomplete, ""))
        .await
        .unwrap();
    let result = store
        .create(new_record("V-001", MappingStatus::Incomplete, ""))
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_new_record_initial_state() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir).await;

    store
        .create(new_record("V-001", MappingStatus::Incomplete, ""))
        .await
        .unwrap();

    let records = store
        .list_by_mapping_status(MappingStatus::Incomplete)
        .await
        .unwrap();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.visit_id, "V-001");
    assert_eq!(record.publish_status, PublishStatus::Preparing);
    assert!(record.diagnosis.is_none());
    assert!(record.publish_date.is_none());
    let detail = record.visit_detail().unwrap();
    assert_eq!(detail.patient_satusehat_id, "P0001");
}

#[tokio::test]
async fn test_invalid_record_keeps_errors() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir).await;

    store
        .create(new_record(
            "V-002",
            MappingStatus::Invalid,
            "practitioner_satusehat_id is required",
        ))
        .await
        .unwrap();

    let records = store
        .list_by_mapping_status(MappingStatus::Invalid)
        .await
        .unwrap();
    assert_eq!(records.len(), 1);
    assert!(records[0]
        .mapping_errors
        .as_deref()
        .unwrap()
        .contains("practitioner_satusehat_id"));
}

#[tokio::test]
async fn test_list_returns_insertion_order() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir).await;

    for visit_id in ["V-003", "V-001", "V-002"] {
        store
            .create(new_record(visit_id, MappingStatus::Incomplete, ""))
            .await
            .unwrap();
    }

    let records = store
        .list_by_mapping_status(MappingStatus::Incomplete)
        .await
        .unwrap();
    let ids: Vec<&str> = records.iter().map(|r| r.visit_id.as_str()).collect();
    assert_eq!(ids, vec!["V-003", "V-001", "V-002"]);
}

#[tokio::test]
async fn test_update_section_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir).await;

    store
        .create(new_record("V-001", MappingStatus::Incomplete, ""))
        .await
        .unwrap();
    store
        .update_section("V-001", SectionKind::Diagnosis, &diagnosis_payload(2))
        .await
        .unwrap();

    let records = store
        .list_by_mapping_status(MappingStatus::Incomplete)
        .await
        .unwrap();
    let record = &records[0];
    assert!(record.section_present(SectionKind::Diagnosis));
    assert_eq!(record.diagnosis().unwrap().len(), 2);
    assert!(!record.section_present(SectionKind::Lab));
}

#[tokio::test]
async fn test_update_mapping_status_moves_record_between_lists() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir).await;

    store
        .create(new_record("V-001", MappingStatus::Incomplete, ""))
        .await
        .unwrap();
    store
        .update_mapping_status("V-001", MappingStatus::Ready)
        .await
        .unwrap();

    assert!(store
        .list_by_mapping_status(MappingStatus::Incomplete)
        .await
        .unwrap()
        .is_empty());
    let ready = store
        .list_by_mapping_status(MappingStatus::Ready)
        .await
        .unwrap();
    assert_eq!(ready.len(), 1);
}

#[tokio::test]
async fn test_update_publish_outcome_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir).await;

    store
        .create(new_record("V-001", MappingStatus::Ready, ""))
        .await
        .unwrap();

    let timestamp = NaiveDate::from_ymd_opt(2024, 3, 20)
        .unwrap()
        .and_hms_opt(12, 30, 0)
        .unwrap();
    store
        .update_publish_outcome(
            "V-001",
            PublishOutcome {
                request: r#"{"resourceType":"Bundle"}"#.to_string(),
                response: "internal error".to_string(),
                timestamp,
                status: PublishStatus::Error,
            },
        )
        .await
        .unwrap();

    let records = store
        .list_by_mapping_status(MappingStatus::Ready)
        .await
        .unwrap();
    let record = &records[0];
    assert_eq!(record.publish_status, PublishStatus::Error);
    assert_eq!(record.publish_date, Some(timestamp));
    assert_eq!(record.publish_response.as_deref(), Some("internal error"));
    assert!(record.publish_request.as_deref().unwrap().contains("Bundle"));
}

#[tokio::test]
async fn test_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    {
        let store = open_store(&dir).await;
        store
            .create(new_record("V-001", MappingStatus::Incomplete, ""))
            .await
            .unwrap();
    }

    let store = open_store(&dir).await;
    assert!(store.exists("V-001").await.unwrap());
}
