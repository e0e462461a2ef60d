//! SQLite-backed visit store
//!
//! Embedded single-file store. Access is serialized behind one
//! coarse-grained async lock: throughput is bounded, but no two writes
//! to a record's columns can ever interleave.

use crate::adapters::store::VisitStore;
use crate::domain::{
    MappingStatus, NewVisitRecord, PublishOutcome, SectionKind, StoreError, VisitRecord,
};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;
use tokio::sync::Mutex;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS satusehat_visit (
    visit_id             TEXT PRIMARY KEY,
    visit_date           TEXT NOT NULL,
    satusehat_patient_id TEXT NOT NULL,
    visit_detail         TEXT NOT NULL,
    vital_sign           TEXT NOT NULL,
    diagnosis            TEXT,
    lab                  TEXT,
    radiology            TEXT,
    medication_request   TEXT,
    medication_dispense  TEXT,
    medical_procedure    TEXT,
    publish_date         TEXT,
    publish_request      TEXT,
    publish_response     TEXT,
    mapping_errors       TEXT,
    mapping_status       TEXT NOT NULL,
    publish_status       TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_satusehat_visit_mapping_status
    ON satusehat_visit (mapping_status);
"#;

const SELECT_BY_STATUS: &str = r#"
SELECT visit_id, visit_date, satusehat_patient_id, visit_detail, vital_sign,
       diagnosis, lab, radiology, medication_request, medication_dispense,
       medical_procedure, publish_date, publish_request, publish_response,
       mapping_errors, mapping_status, publish_status
FROM satusehat_visit
WHERE mapping_status = ?
ORDER BY rowid
"#;

const INSERT: &str = r#"
INSERT INTO satusehat_visit (
    visit_id, visit_date, satusehat_patient_id, visit_detail, vital_sign,
    publish_status, mapping_status, mapping_errors
) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
"#;

/// Embedded SQLite implementation of [`VisitStore`].
pub struct SqliteVisitStore {
    pool: SqlitePool,
    lock: Mutex<()>,
}

impl SqliteVisitStore {
    /// Open (and bootstrap) the store at the given path.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(10));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Open(e.to_string()))?;

        sqlx::raw_sql(SCHEMA)
            .execute(&pool)
            .await
            .map_err(|e| StoreError::Open(e.to_string()))?;

        Ok(Self {
            pool,
            lock: Mutex::new(()),
        })
    }
}

/// Raw row shape; JSON columns stay TEXT until decode.
#[derive(sqlx::FromRow)]
struct VisitRow {
    visit_id: String,
    visit_date: NaiveDateTime,
    satusehat_patient_id: String,
    visit_detail: String,
    vital_sign: String,
    diagnosis: Option<String>,
    lab: Option<String>,
    radiology: Option<String>,
    medication_request: Option<String>,
    medication_dispense: Option<String>,
    medical_procedure: Option<String>,
    publish_date: Option<NaiveDateTime>,
    publish_request: Option<String>,
    publish_response: Option<String>,
    mapping_errors: Option<String>,
    mapping_status: String,
    publish_status: String,
}

impl TryFrom<VisitRow> for VisitRecord {
    type Error = StoreError;

    fn try_from(row: VisitRow) -> Result<Self, Self::Error> {
        let json = |column: &str, raw: &str| -> Result<Value, StoreError> {
            serde_json::from_str(raw)
                .map_err(|e| StoreError::Decode(format!("{column}: {e}")))
        };
        let optional_json = |column: &str, raw: &Option<String>| -> Result<Option<Value>, StoreError> {
            raw.as_deref()
                .map(|raw| json(column, raw))
                .transpose()
        };

        Ok(VisitRecord {
            visit_detail: json("visit_detail", &row.visit_detail)?,
            vital_sign: json("vital_sign", &row.vital_sign)?,
            diagnosis: optional_json("diagnosis", &row.diagnosis)?,
            lab: optional_json("lab", &row.lab)?,
            radiology: optional_json("radiology", &row.radiology)?,
            medication_request: optional_json("medication_request", &row.medication_request)?,
            medication_dispense: optional_json("medication_dispense", &row.medication_dispense)?,
            procedure: optional_json("medical_procedure", &row.medical_procedure)?,
            mapping_status: row
                .mapping_status
                .parse::<MappingStatus>()
                .map_err(StoreError::Decode)?,
            publish_status: row
                .publish_status
                .parse()
                .map_err(StoreError::Decode)?,
            visit_id: row.visit_id,
            visit_date: row.visit_date,
            satusehat_patient_id: row.satusehat_patient_id,
            publish_date: row.publish_date,
            publish_request: row.publish_request,
            publish_response: row.publish_response,
            mapping_errors: row.mapping_errors,
        })
    }
}

#[async_trait]
impl VisitStore for SqliteVisitStore {
    async fn exists(&self, visit_id: &str) -> Result<bool, StoreError> {
        let _guard = self.lock.lock().await;
        let count: i64 =
            sqlx::query_scalar("SELECT count(visit_id) FROM satusehat_visit WHERE visit_id = ?")
                .bind(visit_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| StoreError::Query(e.to_string()))?;
        Ok(count > 0)
    }

    async fn create(&self, record: NewVisitRecord) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        sqlx::query(INSERT)
            .bind(&record.visit_id)
            .bind(record.visit_date)
            .bind(&record.satusehat_patient_id)
            .bind(record.visit_detail.to_string())
            .bind(record.vital_sign.to_string())
            .bind(crate::domain::PublishStatus::Preparing.as_str())
            .bind(record.mapping_status.as_str())
            .bind(&record.mapping_errors)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Write(e.to_string()))?;
        Ok(())
    }

    async fn list_by_mapping_status(
        &self,
        status: MappingStatus,
    ) -> Result<Vec<VisitRecord>, StoreError> {
        let _guard = self.lock.lock().await;
        let rows: Vec<VisitRow> = sqlx::query_as(SELECT_BY_STATUS)
            .bind(status.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        rows.into_iter().map(VisitRecord::try_from).collect()
    }

    async fn update_section(
        &self,
        visit_id: &str,
        kind: SectionKind,
        payload: &Value,
    ) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        // Column names come from the fixed SectionKind set, never from
        // input.
        let sql = format!(
            "UPDATE satusehat_visit SET {} = ? WHERE visit_id = ?",
            kind.as_str()
        );
        sqlx::query(&sql)
            .bind(payload.to_string())
            .bind(visit_id)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Write(e.to_string()))?;
        Ok(())
    }

    async fn update_mapping_status(
        &self,
        visit_id: &str,
        status: MappingStatus,
    ) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        sqlx::query("UPDATE satusehat_visit SET mapping_status = ? WHERE visit_id = ?")
            .bind(status.as_str())
            .bind(visit_id)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Write(e.to_string()))?;
        Ok(())
    }

    async fn update_publish_outcome(
        &self,
        visit_id: &str,
        outcome: PublishOutcome,
    ) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        sqlx::query(
            "UPDATE satusehat_visit \
             SET publish_request = ?, publish_response = ?, publish_date = ?, publish_status = ? \
             WHERE visit_id = ?",
        )
        .bind(&outcome.request)
        .bind(&outcome.response)
        .bind(outcome.timestamp)
        .bind(outcome.status.as_str())
        .bind(visit_id)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Write(e.to_string()))?;
        Ok(())
    }
}
