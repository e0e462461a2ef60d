//! Visit discovery sweep
//!
//! Discovers newly closed visits in a trailing window and creates their
//! initial record. The existence check is the sole de-duplication
//! mechanism; there is no upsert path.

use crate::adapters::source::VisitSource;
use crate::adapters::store::VisitStore;
use crate::domain::{MappingStatus, NewVisitRecord, Result};
use chrono::{Duration, Local};
use std::sync::Arc;
use tokio::sync::watch;

/// Periodic fetch/ingest job.
pub struct FetchJob {
    source: Arc<dyn VisitSource>,
    store: Arc<dyn VisitStore>,
    last_visit_days: i64,
}

impl FetchJob {
    pub fn new(
        source: Arc<dyn VisitSource>,
        store: Arc<dyn VisitStore>,
        last_visit_days: i64,
    ) -> Self {
        Self {
            source,
            store,
            last_visit_days,
        }
    }

    /// Run one discovery sweep.
    ///
    /// The window runs from `last_visit_days` ago through tomorrow to
    /// tolerate clock and timezone skew between the worker and the SIMRS.
    pub async fn run(&self, shutdown: watch::Receiver<bool>) -> Result<()> {
        let now = Local::now().naive_local();
        let start = now - Duration::days(self.last_visit_days);
        let end = now + Duration::days(1);

        let visits = self
            .source
            .fetch_visits_between(start, end)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "failed to fetch visits from SIMRS");
                e
            })?;

        tracing::info!(visit_count = visits.len(), "fetch visit sweep started");

        for visit in &visits {
            if *shutdown.borrow() {
                tracing::info!("shutdown requested, fetch sweep stopped early");
                break;
            }

            let visit_id = &visit.visit_id;

            let exists = match self.store.exists(visit_id).await {
                Ok(exists) => exists,
                Err(e) => {
                    tracing::error!(visit_id = %visit_id, error = %e, "visit existence check failed");
                    continue;
                }
            };
            if exists {
                tracing::debug!(visit_id = %visit_id, "visit exists, skipping");
                continue;
            }

            let detail = visit.visit_detail();
            let record = match detail.validate() {
                Ok(()) => NewVisitRecord {
                    visit_id: visit_id.clone(),
                    visit_date: visit.period_start_date.unwrap_or_default(),
                    satusehat_patient_id: visit.patient_satusehat_id.clone(),
                    visit_detail: serde_json::to_value(&detail)?,
                    vital_sign: serde_json::to_value(visit.vital_sign())?,
                    mapping_status: MappingStatus::Incomplete,
                    mapping_errors: String::new(),
                },
                Err(validation_errors) => {
                    tracing::debug!(visit_id = %visit_id, errors = %validation_errors, "visit snapshot is invalid");
                    NewVisitRecord {
                        visit_id: visit_id.clone(),
                        visit_date: visit.period_start_date.unwrap_or_default(),
                        satusehat_patient_id: visit.patient_satusehat_id.clone(),
                        visit_detail: serde_json::to_value(&detail)?,
                        vital_sign: serde_json::to_value(visit.vital_sign())?,
                        mapping_status: MappingStatus::Invalid,
                        mapping_errors: validation_errors,
                    }
                }
            };

            if let Err(e) = self.store.create(record).await {
                tracing::error!(visit_id = %visit_id, error = %e, "failed to save visit record");
                continue;
            }

            tracing::debug!(visit_id = %visit_id, "visit saved");
        }

        tracing::info!(visit_count = visits.len(), "fetch visit sweep finished");
        Ok(())
    }
}

#[async_trait::async_trait]
impl crate::core::scheduler::Job for FetchJob {
    async fn run(&self, shutdown: watch::Receiver<bool>) -> Result<()> {
        FetchJob::run(self, shutdown).await
    }
}
