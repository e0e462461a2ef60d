//! Publish sweep
//!
//! For each `Ready` visit, builds the bundle and either writes it to the
//! simulation directory or transmits it to the registry, recording the
//! outcome. Transport and authorization failures leave the record
//! untouched for the next sweep; application-level failures are recorded
//! as `ERROR` together with the outbound payload and inbound response.

use crate::adapters::registry::RegistryClient;
use crate::adapters::store::VisitStore;
use crate::core::assembler::BundleAssembler;
use crate::domain::{
    GarudaError, MappingStatus, PublishOutcome, PublishStatus, Result, VisitRecord,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Periodic publish job.
pub struct PublishJob {
    store: Arc<dyn VisitStore>,
    registry: Arc<RegistryClient>,
    assembler: BundleAssembler,
    simulation_mode: bool,
    simulation_dir: PathBuf,
    send_delay: Duration,
    republish_published: bool,
}

impl PublishJob {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: Arc<dyn VisitStore>,
        registry: Arc<RegistryClient>,
        assembler: BundleAssembler,
        simulation_mode: bool,
        simulation_dir: impl Into<PathBuf>,
        send_delay: Duration,
        republish_published: bool,
    ) -> Self {
        Self {
            store,
            registry,
            assembler,
            simulation_mode,
            simulation_dir: simulation_dir.into(),
            send_delay,
            republish_published,
        }
    }

    /// Run one publish sweep over all ready records.
    pub async fn run(&self, shutdown: watch::Receiver<bool>) -> Result<()> {
        let records = self
            .store
            .list_by_mapping_status(MappingStatus::Ready)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "failed to list ready visits");
                e
            })?;

        tracing::info!(
            ready_visit_count = records.len(),
            simulation_mode = self.simulation_mode,
            "publish sweep started"
        );

        if self.simulation_mode {
            std::fs::create_dir_all(&self.simulation_dir).map_err(|e| {
                tracing::error!(
                    simulation_dir = %self.simulation_dir.display(),
                    error = %e,
                    "failed to create simulation directory"
                );
                GarudaError::from(e)
            })?;
        }

        for record in &records {
            if *shutdown.borrow() {
                tracing::info!("shutdown requested, publish sweep terminated");
                return Err(GarudaError::Other(
                    "shutdown requested, publish sweep terminated".to_string(),
                ));
            }

            if !self.republish_published && record.publish_status == PublishStatus::Success {
                tracing::debug!(visit_id = %record.visit_id, "already published, skipping");
                continue;
            }

            // Self-imposed rate limit towards the registry.
            tokio::time::sleep(self.send_delay).await;

            if let Err(e) = self.publish_record(record).await {
                tracing::error!(visit_id = %record.visit_id, error = %e, "failed to publish visit");
            }
        }

        tracing::info!(
            ready_visit_count = records.len(),
            simulation_mode = self.simulation_mode,
            "publish sweep finished"
        );
        Ok(())
    }

    async fn publish_record(&self, record: &VisitRecord) -> Result<()> {
        let bundle = self.assembler.assemble(record)?;
        let payload = bundle.to_json()?;

        tracing::debug!(
            visit_id = %record.visit_id,
            payload_size = payload.len(),
            "processing visit"
        );

        if self.simulation_mode {
            return self.simulate(&record.visit_id, &payload);
        }
        self.transmit(&record.visit_id, payload).await
    }

    /// Write the bundle as pretty-printed JSON; no status columns change.
    fn simulate(&self, visit_id: &str, payload: &str) -> Result<()> {
        let file_name = self.simulation_dir.join(format!("{visit_id}.json"));
        let value: serde_json::Value = serde_json::from_str(payload)?;
        std::fs::write(&file_name, serde_json::to_string_pretty(&value)?)?;
        tracing::debug!(
            visit_id = %visit_id,
            file_name = %file_name.display(),
            "bundle written to simulation directory"
        );
        Ok(())
    }

    async fn transmit(&self, visit_id: &str, payload: String) -> Result<()> {
        let request_date = chrono::Local::now().naive_local();

        match self.registry.post_bundle(&payload).await {
            Ok(response) => {
                let outcome = PublishOutcome {
                    request: payload,
                    response,
                    timestamp: request_date,
                    status: PublishStatus::Success,
                };
                if let Err(e) = self.store.update_publish_outcome(visit_id, outcome).await {
                    tracing::error!(visit_id = %visit_id, error = %e, "failed to record publish success");
                }
                tracing::debug!(visit_id = %visit_id, "bundle sent to registry");
                Ok(())
            }
            Err(e) if e.is_pre_response() => {
                // No response was obtained; leave the record untouched so
                // the next sweep retries it.
                Err(e.into())
            }
            Err(e) => {
                let outcome = PublishOutcome {
                    request: payload,
                    response: e.body().unwrap_or_default().to_string(),
                    timestamp: request_date,
                    status: PublishStatus::Error,
                };
                if let Err(update_err) =
                    self.store.update_publish_outcome(visit_id, outcome).await
                {
                    tracing::error!(visit_id = %visit_id, error = %update_err, "failed to record publish error");
                }
                Err(e.into())
            }
        }
    }
}

#[async_trait::async_trait]
impl crate::core::scheduler::Job for PublishJob {
    async fn run(&self, shutdown: watch::Receiver<bool>) -> Result<()> {
        PublishJob::run(self, shutdown).await
    }
}
