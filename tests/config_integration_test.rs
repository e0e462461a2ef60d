//! Configuration loading from disk with environment substitution

use garuda::config::load_config;
use secrecy::ExposeSecret;
use std::io::Write;

fn write_config(dir: &tempfile::TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("garuda.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
}

// Tests run in parallel in one process; each one uses its own
// environment variable names.
fn config_toml(secret_var: &str, password_var: &str) -> String {
    format!(
        r#"
[application]
log_level = "debug"

[jobs]
fetch_interval_secs = 120
publish_enabled = false

[mapping]
mark_complete_days = 14
disable_radiology = true

[publish]
simulation_mode = true
send_delay_secs = 0

[registry]
organization_id = "ORG01"
client_id = "client-id"
client_secret = "${{{secret_var}}}"

[store]
path = "state/garuda.db"

[simrs]
vendor = "medifirst"
host = "10.1.2.3"
username = "integrator"
password = "${{{password_var}}}"
database = "simrs_prod"
"#
    )
}

#[test]
fn test_load_full_config_with_env_substitution() {
    std::env::set_var("GARUDA_IT_LOAD_SECRET", "oauth-secret");
    std::env::set_var("GARUDA_IT_LOAD_PASSWORD", "db-secret");

    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        &dir,
        &config_toml("GARUDA_IT_LOAD_SECRET", "GARUDA_IT_LOAD_PASSWORD"),
    );
    let config = load_config(&path).unwrap();

    assert_eq!(config.application.log_level, "debug");
    assert_eq!(config.jobs.fetch_interval_secs, 120);
    assert!(!config.jobs.publish_enabled);
    assert!(config.jobs.fill_enabled);
    assert_eq!(config.mapping.mark_complete_days, 14);
    assert!(config.mapping.disable_radiology);
    assert!(config.publish.simulation_mode);
    assert_eq!(config.simrs.vendor, "medifirst");
    assert_eq!(config.store.path, "state/garuda.db");
    assert_eq!(
        config.registry.client_secret.expose_secret().as_str(),
        "oauth-secret"
    );
    assert_eq!(config.simrs.password.expose_secret().as_str(), "db-secret");
}

#[test]
fn test_missing_env_variable_fails_load() {
    std::env::set_var("GARUDA_IT_MISSING_PASSWORD", "db-secret");

    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        &dir,
        &config_toml("GARUDA_IT_DEFINITELY_UNSET", "GARUDA_IT_MISSING_PASSWORD"),
    );

    let err = load_config(&path).unwrap_err();
    assert!(err.to_string().contains("GARUDA_IT_DEFINITELY_UNSET"));
}

#[test]
fn test_validation_failure_surfaces() {
    std::env::set_var("GARUDA_IT_INVALID_SECRET", "x");
    std::env::set_var("GARUDA_IT_INVALID_PASSWORD", "y");

    let dir = tempfile::tempdir().unwrap();
    let contents = config_toml("GARUDA_IT_INVALID_SECRET", "GARUDA_IT_INVALID_PASSWORD")
        .replace("vendor = \"medifirst\"", "vendor = \"unknown\"");
    let path = write_config(&dir, &contents);

    let err = load_config(&path).unwrap_err();
    assert!(err.to_string().contains("Unsupported simrs.vendor"));
}
