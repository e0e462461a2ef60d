//! Start command - wires dependencies and runs the scheduler

use crate::adapters::registry::RegistryClient;
use crate::adapters::source::create_visit_source;
use crate::adapters::store::{SqliteVisitStore, VisitStore};
use crate::config::load_config;
use crate::core::{BundleAssembler, FetchJob, FillJob, MarkCompleteJob, PublishJob, Scheduler};
use clap::Args;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Arguments for the start command
#[derive(Args, Debug)]
pub struct StartArgs {}

impl StartArgs {
    /// Build every dependency from configuration and drive the scheduler
    /// until the shutdown signal fires.
    ///
    /// Any failure here is a startup failure and aborts the process;
    /// per-visit failures later on only ever surface through logs and the
    /// persisted status columns.
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        let config = load_config(config_path)?;

        tracing::info!(config = config_path, "initializing worker");

        let store: Arc<dyn VisitStore> =
            Arc::new(SqliteVisitStore::open(&config.store.path).await?);
        let source = create_visit_source(&config.simrs).await?;
        let registry = Arc::new(RegistryClient::new(&config.registry)?);

        let toggles = config.mapping.toggles();
        let assembler = BundleAssembler::new(
            config.registry.organization_id.clone(),
            config.registry.convert_to_utc,
        );

        let mut scheduler = Scheduler::new(config.jobs.max_concurrent);

        if config.jobs.fetch_enabled {
            scheduler.register(
                "fetch-visit",
                Duration::from_secs(config.jobs.fetch_interval_secs),
                true,
                Arc::new(FetchJob::new(
                    source.clone(),
                    store.clone(),
                    config.mapping.last_visit_days,
                )),
            );
        } else {
            tracing::info!("fetch-visit task disabled");
        }

        if config.jobs.fill_enabled {
            scheduler.register(
                "fill-visit",
                Duration::from_secs(config.jobs.fill_interval_secs),
                true,
                Arc::new(FillJob::new(source.clone(), store.clone(), toggles)),
            );
        } else {
            tracing::info!("fill-visit task disabled");
        }

        if config.jobs.mark_complete_enabled {
            scheduler.register(
                "mark-complete",
                Duration::from_secs(config.jobs.mark_complete_interval_secs),
                true,
                Arc::new(MarkCompleteJob::new(
                    store.clone(),
                    config.mapping.mark_complete_days,
                    toggles,
                )),
            );
        } else {
            tracing::info!("mark-complete task disabled");
        }

        if config.jobs.publish_enabled {
            scheduler.register(
                "publish",
                Duration::from_secs(config.jobs.publish_interval_secs),
                false,
                Arc::new(PublishJob::new(
                    store.clone(),
                    registry,
                    assembler,
                    config.publish.simulation_mode,
                    config.publish.simulation_dir.clone(),
                    Duration::from_secs(config.publish.send_delay_secs),
                    config.publish.republish_published,
                )),
            );
        } else {
            tracing::info!("publish task disabled");
        }

        if scheduler.task_count() == 0 {
            tracing::warn!("all tasks are disabled; nothing to schedule");
            return Ok(0);
        }

        tracing::info!("starting scheduler");
        scheduler.run(shutdown).await;
        tracing::info!("worker stopped");

        Ok(0)
    }
}
