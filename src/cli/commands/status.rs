//! Status command - per-status record counts

use crate::adapters::store::{SqliteVisitStore, VisitStore};
use crate::config::load_config;
use crate::domain::{MappingStatus, PublishStatus};
use clap::Args;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {}

impl StatusArgs {
    /// Print visit record counts grouped by mapping status, plus the
    /// publish outcome breakdown of the ready records.
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = load_config(config_path)?;
        let store = SqliteVisitStore::open(&config.store.path).await?;

        println!("Visit store: {}", config.store.path);

        let mut ready_by_publish = [0usize; 4];
        for status in [
            MappingStatus::Incomplete,
            MappingStatus::Ready,
            MappingStatus::Invalid,
        ] {
            let records = store.list_by_mapping_status(status).await?;
            println!("  {:<12} {}", status.as_str(), records.len());

            if status == MappingStatus::Ready {
                for record in &records {
                    let index = match record.publish_status {
                        PublishStatus::Preparing => 0,
                        PublishStatus::Success => 1,
                        PublishStatus::Error => 2,
                        PublishStatus::PayloadInvalid => 3,
                    };
                    ready_by_publish[index] += 1;
                }
            }
        }

        println!("Ready records by publish status:");
        println!("  {:<16} {}", "PREPARING", ready_by_publish[0]);
        println!("  {:<16} {}", "SUCCESS", ready_by_publish[1]);
        println!("  {:<16} {}", "ERROR", ready_by_publish[2]);
        println!("  {:<16} {}", "PAYLOAD_INVALID", ready_by_publish[3]);

        Ok(0)
    }
}
