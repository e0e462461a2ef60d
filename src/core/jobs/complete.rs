//! Mark-complete sweep
//!
//! Promotes incomplete visits to `Ready` once the completeness predicate
//! holds: either every enabled section is present/valid, or the visit is
//! older than the mark-complete threshold. The SIMRS is assumed to never
//! populate data after that window, so old visits are force-completed
//! with whatever they have.

use crate::adapters::store::VisitStore;
use crate::domain::{MappingStatus, Result, SectionToggles, VisitRecord};
use chrono::{Duration, NaiveDateTime};
use std::sync::Arc;
use tokio::sync::watch;

/// Completeness predicate for one record.
///
/// Disabled sections are excluded outright; operators who switch a
/// section off do not have to wait for the age-based fallback.
pub fn is_complete(
    record: &VisitRecord,
    now: NaiveDateTime,
    mark_complete_days: i64,
    toggles: &SectionToggles,
) -> bool {
    if now.signed_duration_since(record.visit_date) > Duration::days(mark_complete_days) {
        return true;
    }
    record.missing_sections(toggles).is_empty()
}

/// Periodic mark-complete job.
pub struct MarkCompleteJob {
    store: Arc<dyn VisitStore>,
    mark_complete_days: i64,
    toggles: SectionToggles,
}

impl MarkCompleteJob {
    pub fn new(
        store: Arc<dyn VisitStore>,
        mark_complete_days: i64,
        toggles: SectionToggles,
    ) -> Self {
        Self {
            store,
            mark_complete_days,
            toggles,
        }
    }

    /// Run one completeness sweep over all incomplete records.
    ///
    /// Only `Incomplete` records are scanned; `Ready` and `Invalid` are
    /// terminal for mapping purposes and never revisited.
    pub async fn run(&self, shutdown: watch::Receiver<bool>) -> Result<()> {
        let records = self
            .store
            .list_by_mapping_status(MappingStatus::Incomplete)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "failed to list incomplete visits");
                e
            })?;

        let now = chrono::Local::now().naive_local();
        let mut promoted = 0usize;

        for record in &records {
            if *shutdown.borrow() {
                tracing::info!("shutdown requested, mark-complete sweep stopped early");
                break;
            }

            if !is_complete(record, now, self.mark_complete_days, &self.toggles) {
                continue;
            }

            match self
                .store
                .update_mapping_status(&record.visit_id, MappingStatus::Ready)
                .await
            {
                Ok(()) => {
                    promoted += 1;
                    tracing::debug!(visit_id = %record.visit_id, "visit marked ready");
                }
                Err(e) => {
                    tracing::error!(
                        visit_id = %record.visit_id,
                        error = %e,
                        "failed to mark visit ready"
                    );
                    continue;
                }
            }
        }

        tracing::info!(
            visit_count = records.len(),
            promoted,
            "mark-complete sweep finished"
        );
        Ok(())
    }
}

#[async_trait::async_trait]
impl crate::core::scheduler::Job for MarkCompleteJob {
    async fn run(&self, shutdown: watch::Receiver<bool>) -> Result<()> {
        MarkCompleteJob::run(self, shutdown).await
    }
}
