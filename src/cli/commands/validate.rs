//! Validate-config command

use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Load and validate the configuration file without starting the
    /// worker. Exit code 0 on success, 2 on an invalid configuration.
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        match load_config(config_path) {
            Ok(config) => {
                println!("Configuration is valid: {config_path}");
                println!("  simrs vendor:    {}", config.simrs.vendor);
                println!("  registry:        {}", config.registry.base_url);
                println!("  store:           {}", config.store.path);
                println!(
                    "  simulation mode: {}",
                    if config.publish.simulation_mode {
                        "on"
                    } else {
                        "off"
                    }
                );
                Ok(0)
            }
            Err(e) => {
                eprintln!("Configuration is invalid: {e}");
                Ok(2)
            }
        }
    }
}
