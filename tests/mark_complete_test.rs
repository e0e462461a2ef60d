//! Mark-complete sweep behavior
//!
//! The completeness predicate is an OR: old enough to force-complete, or
//! every enabled section present/valid.

mod common;

use common::{days_ago, filled_record, incomplete_record, MemoryVisitStore};
use garuda::core::{is_complete, MarkCompleteJob};
use garuda::domain::{MappingStatus, SectionToggles};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::sync::watch;

fn shutdown_rx() -> watch::Receiver<bool> {
    watch::channel(false).1
}

#[tokio::test]
async fn test_old_visit_force_completed_regardless_of_sections() {
    // Visit 10 days old, mark_complete_days = 7, all sections still null.
    let store = Arc::new(MemoryVisitStore::with_records(vec![incomplete_record(
        "V-001",
        days_ago(10),
    )]));

    MarkCompleteJob::new(store.clone(), 7, SectionToggles::default())
        .run(shutdown_rx())
        .await
        .unwrap();

    let record = store.record("V-001").unwrap();
    assert_eq!(record.mapping_status, MappingStatus::Ready);
}

#[tokio::test]
async fn test_fresh_visit_with_all_sections_completed() {
    let store = Arc::new(MemoryVisitStore::with_records(vec![filled_record(
        "V-001",
        days_ago(1),
    )]));

    MarkCompleteJob::new(store.clone(), 7, SectionToggles::default())
        .run(shutdown_rx())
        .await
        .unwrap();

    assert_eq!(
        store.record("V-001").unwrap().mapping_status,
        MappingStatus::Ready
    );
}

#[tokio::test]
async fn test_fresh_visit_with_missing_sections_stays_incomplete() {
    let store = Arc::new(MemoryVisitStore::with_records(vec![incomplete_record(
        "V-001",
        days_ago(1),
    )]));

    MarkCompleteJob::new(store.clone(), 7, SectionToggles::default())
        .run(shutdown_rx())
        .await
        .unwrap();

    assert_eq!(
        store.record("V-001").unwrap().mapping_status,
        MappingStatus::Incomplete
    );
    assert_eq!(store.status_writes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_disabled_sections_excluded_from_predicate() {
    // Only diagnosis is filled; everything else is disabled, so the
    // record completes without waiting for the age fallback.
    let mut record = incomplete_record("V-001", days_ago(1));
    record.diagnosis = Some(common::diagnosis_payload(1));
    let store = Arc::new(MemoryVisitStore::with_records(vec![record]));
    let toggles = SectionToggles {
        disable_lab: true,
        disable_radiology: true,
        disable_procedure: true,
        disable_medication: true,
        ..SectionToggles::default()
    };

    MarkCompleteJob::new(store.clone(), 7, toggles)
        .run(shutdown_rx())
        .await
        .unwrap();

    assert_eq!(
        store.record("V-001").unwrap().mapping_status,
        MappingStatus::Ready
    );
}

#[tokio::test]
async fn test_ready_and_invalid_records_not_rescanned() {
    let mut ready = filled_record("V-001", days_ago(10));
    ready.mapping_status = MappingStatus::Ready;
    let mut invalid = incomplete_record("V-002", days_ago(10));
    invalid.mapping_status = MappingStatus::Invalid;
    let store = Arc::new(MemoryVisitStore::with_records(vec![ready, invalid]));

    MarkCompleteJob::new(store.clone(), 7, SectionToggles::default())
        .run(shutdown_rx())
        .await
        .unwrap();

    assert_eq!(store.status_writes.load(Ordering::SeqCst), 0);
    assert_eq!(
        store.record("V-002").unwrap().mapping_status,
        MappingStatus::Invalid
    );
}

#[test]
fn test_predicate_boundary() {
    let now = chrono::Local::now().naive_local();
    let toggles = SectionToggles::default();

    // Exactly at the threshold is not yet past it.
    let at_threshold = incomplete_record("V-001", now - chrono::Duration::days(7));
    assert!(!is_complete(&at_threshold, now, 7, &toggles));

    let past_threshold =
        incomplete_record("V-002", now - chrono::Duration::days(7) - chrono::Duration::hours(1));
    assert!(is_complete(&past_threshold, now, 7, &toggles));
}

#[test]
fn test_predicate_all_sections_present() {
    let now = chrono::Local::now().naive_local();
    let record = filled_record("V-001", now - chrono::Duration::days(1));
    assert!(is_complete(&record, now, 7, &SectionToggles::default()));
}
