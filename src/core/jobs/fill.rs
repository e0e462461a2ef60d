//! Incremental fill sweep
//!
//! For each incomplete visit, fetches only the sections still missing or
//! invalid and persists them independently. A failure on one section is
//! logged and does not abort the remaining sections of that visit, nor
//! the rest of the sweep; later sweeps retry only what is still missing.

use crate::adapters::source::VisitSource;
use crate::adapters::store::VisitStore;
use crate::domain::{GarudaError, MappingStatus, Result, SectionKind, SectionToggles};
use std::sync::Arc;
use tokio::sync::watch;

/// Periodic section-fill job.
pub struct FillJob {
    source: Arc<dyn VisitSource>,
    store: Arc<dyn VisitStore>,
    toggles: SectionToggles,
}

impl FillJob {
    pub fn new(
        source: Arc<dyn VisitSource>,
        store: Arc<dyn VisitStore>,
        toggles: SectionToggles,
    ) -> Self {
        Self {
            source,
            store,
            toggles,
        }
    }

    /// Run one fill sweep over all incomplete records.
    pub async fn run(&self, shutdown: watch::Receiver<bool>) -> Result<()> {
        let records = self
            .store
            .list_by_mapping_status(MappingStatus::Incomplete)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "failed to list incomplete visits");
                e
            })?;

        tracing::info!(
            visit_count = records.len(),
            diagnosis_disabled = self.toggles.disable_diagnosis,
            lab_disabled = self.toggles.disable_lab,
            radiology_disabled = self.toggles.disable_radiology,
            procedure_disabled = self.toggles.disable_procedure,
            medication_disabled = self.toggles.disable_medication,
            "fill visit sweep started"
        );

        for record in &records {
            if *shutdown.borrow() {
                tracing::info!("shutdown requested, fill sweep stopped early");
                break;
            }

            for kind in record.missing_sections(&self.toggles) {
                if let Err(e) = self.fill_section(&record.visit_id, kind).await {
                    tracing::error!(
                        visit_id = %record.visit_id,
                        section = %kind,
                        error = %e,
                        "failed to fill section"
                    );
                    continue;
                }
                tracing::debug!(visit_id = %record.visit_id, section = %kind, "section filled");
            }
        }

        tracing::info!(visit_count = records.len(), "fill visit sweep finished");
        Ok(())
    }

    /// Fetch one section from the source and overwrite its column.
    ///
    /// Overwriting an already-stored payload is idempotent; the caller
    /// only asks for sections that are currently missing/invalid.
    async fn fill_section(&self, visit_id: &str, kind: SectionKind) -> Result<()> {
        let payload = match kind {
            SectionKind::Diagnosis => {
                serde_json::to_value(self.source.fetch_diagnosis(visit_id).await?)
            }
            SectionKind::Lab => serde_json::to_value(self.source.fetch_lab(visit_id).await?),
            SectionKind::Radiology => {
                serde_json::to_value(self.source.fetch_radiology(visit_id).await?)
            }
            SectionKind::MedicationRequest => {
                serde_json::to_value(self.source.fetch_medication_request(visit_id).await?)
            }
            SectionKind::MedicationDispense => {
                serde_json::to_value(self.source.fetch_medication_dispense(visit_id).await?)
            }
            SectionKind::Procedure => {
                serde_json::to_value(self.source.fetch_procedure(visit_id).await?)
            }
        }
        .map_err(GarudaError::from)?;

        self.store.update_section(visit_id, kind, &payload).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl crate::core::scheduler::Job for FillJob {
    async fn run(&self, shutdown: watch::Receiver<bool>) -> Result<()> {
        FillJob::run(self, shutdown).await
    }
}
