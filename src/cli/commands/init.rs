//! Init command - write an example configuration file

use clap::Args;
use std::path::Path;

const EXAMPLE_CONFIG: &str = r#"# Garuda worker configuration

[application]
log_level = "info"

[jobs]
fetch_enabled = true
fetch_interval_secs = 300
fill_enabled = true
fill_interval_secs = 300
mark_complete_enabled = true
mark_complete_interval_secs = 600
publish_enabled = true
publish_interval_secs = 600
max_concurrent = 2

[mapping]
mark_complete_days = 7
last_visit_days = 7
disable_diagnosis = false
disable_lab = false
disable_radiology = false
disable_procedure = false
disable_medication = false

[publish]
simulation_mode = true
simulation_dir = "/tmp/garuda-bundles"
send_delay_secs = 2
republish_published = false

[registry]
auth_url = "https://api-satusehat-stg.dto.kemkes.go.id/oauth2/v1"
base_url = "https://api-satusehat-stg.dto.kemkes.go.id/fhir-r4/v1"
organization_id = "your-organization-id"
client_id = "${SATUSEHAT_CLIENT_ID}"
client_secret = "${SATUSEHAT_CLIENT_SECRET}"
convert_to_utc = false

[registry.http]
retry_count = 1
retry_wait_secs = 2
retry_max_wait_secs = 30
timeout_secs = 5

[store]
path = "garuda.db"

[simrs]
vendor = "khanza"
host = "127.0.0.1"
port = 3306
username = "simrs"
password = "${SIMRS_DB_PASSWORD}"
database = "simrs"
max_connections = 5

[logging]
local_enabled = false
local_path = "logs"
local_rotation = "daily"
"#;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Output path for the example configuration
    #[arg(short, long, default_value = "garuda.toml")]
    pub output: String,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Write the example configuration. Refuses to overwrite unless
    /// `--force` is given.
    pub async fn execute(&self) -> anyhow::Result<i32> {
        if Path::new(&self.output).exists() && !self.force {
            eprintln!(
                "{} already exists; use --force to overwrite",
                self.output
            );
            return Ok(2);
        }

        std::fs::write(&self.output, EXAMPLE_CONFIG)?;
        println!("Wrote example configuration to {}", self.output);
        println!("Set SATUSEHAT_CLIENT_ID, SATUSEHAT_CLIENT_SECRET and SIMRS_DB_PASSWORD before starting.");
        Ok(0)
    }
}
