//! Configuration schema types
//!
//! Root structure for the TOML configuration file, with per-section
//! validation. Intervals are plain seconds; day-based windows are plain
//! day counts.

use crate::config::secret::SecretString;
use crate::domain::SectionToggles;
use serde::Deserialize;

/// Main Garuda configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct GarudaConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Job enablement and intervals
    #[serde(default)]
    pub jobs: JobsConfig,

    /// Mapping windows and per-section skips
    #[serde(default)]
    pub mapping: MappingConfig,

    /// Publish behavior
    #[serde(default)]
    pub publish: PublishConfig,

    /// SatuSehat registry credentials and endpoints
    pub registry: RegistryConfig,

    /// Embedded visit store
    #[serde(default)]
    pub store: StoreConfig,

    /// Hospital information system connection
    pub simrs: SimrsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl GarudaConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.jobs.validate()?;
        self.mapping.validate()?;
        self.registry.validate()?;
        self.simrs.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

/// Job enablement and interval configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JobsConfig {
    #[serde(default = "default_true")]
    pub fetch_enabled: bool,
    #[serde(default = "default_fetch_interval")]
    pub fetch_interval_secs: u64,
    #[serde(default = "default_true")]
    pub fill_enabled: bool,
    #[serde(default = "default_fill_interval")]
    pub fill_interval_secs: u64,
    #[serde(default = "default_true")]
    pub mark_complete_enabled: bool,
    #[serde(default = "default_mark_complete_interval")]
    pub mark_complete_interval_secs: u64,
    #[serde(default = "default_true")]
    pub publish_enabled: bool,
    #[serde(default = "default_publish_interval")]
    pub publish_interval_secs: u64,
    /// Global cap on concurrently running task invocations.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            fetch_enabled: true,
            fetch_interval_secs: default_fetch_interval(),
            fill_enabled: true,
            fill_interval_secs: default_fill_interval(),
            mark_complete_enabled: true,
            mark_complete_interval_secs: default_mark_complete_interval(),
            publish_enabled: true,
            publish_interval_secs: default_publish_interval(),
            max_concurrent: default_max_concurrent(),
        }
    }
}

impl JobsConfig {
    fn validate(&self) -> Result<(), String> {
        for (name, interval) in [
            ("fetch_interval_secs", self.fetch_interval_secs),
            ("fill_interval_secs", self.fill_interval_secs),
            ("mark_complete_interval_secs", self.mark_complete_interval_secs),
            ("publish_interval_secs", self.publish_interval_secs),
        ] {
            if interval == 0 {
                return Err(format!("{name} must be greater than zero"));
            }
        }
        if self.max_concurrent == 0 {
            return Err("max_concurrent must be greater than zero".to_string());
        }
        Ok(())
    }
}

/// Mapping windows and per-section skips.
#[derive(Debug, Clone, Deserialize)]
pub struct MappingConfig {
    /// Force-complete visits older than this many days.
    #[serde(default = "default_mark_complete_days")]
    pub mark_complete_days: i64,
    /// Trailing discovery window in days.
    #[serde(default = "default_last_visit_days")]
    pub last_visit_days: i64,
    #[serde(default)]
    pub disable_diagnosis: bool,
    #[serde(default)]
    pub disable_lab: bool,
    #[serde(default)]
    pub disable_radiology: bool,
    #[serde(default)]
    pub disable_procedure: bool,
    #[serde(default)]
    pub disable_medication: bool,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            mark_complete_days: default_mark_complete_days(),
            last_visit_days: default_last_visit_days(),
            disable_diagnosis: false,
            disable_lab: false,
            disable_radiology: false,
            disable_procedure: false,
            disable_medication: false,
        }
    }
}

impl MappingConfig {
    fn validate(&self) -> Result<(), String> {
        if self.mark_complete_days <= 0 {
            return Err("mark_complete_days must be positive".to_string());
        }
        if self.last_visit_days <= 0 {
            return Err("last_visit_days must be positive".to_string());
        }
        Ok(())
    }

    pub fn toggles(&self) -> SectionToggles {
        SectionToggles {
            disable_diagnosis: self.disable_diagnosis,
            disable_lab: self.disable_lab,
            disable_radiology: self.disable_radiology,
            disable_procedure: self.disable_procedure,
            disable_medication: self.disable_medication,
        }
    }
}

/// Publish behavior.
#[derive(Debug, Clone, Deserialize)]
pub struct PublishConfig {
    /// Write bundles to `simulation_dir` instead of transmitting.
    #[serde(default)]
    pub simulation_mode: bool,
    #[serde(default = "default_simulation_dir")]
    pub simulation_dir: String,
    /// Fixed delay between visits in one sweep.
    #[serde(default = "default_send_delay")]
    pub send_delay_secs: u64,
    /// Re-send records already published successfully. Off by default;
    /// the registry is not known to deduplicate by visit.
    #[serde(default)]
    pub republish_published: bool,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            simulation_mode: false,
            simulation_dir: default_simulation_dir(),
            send_delay_secs: default_send_delay(),
            republish_published: false,
        }
    }
}

/// SatuSehat registry credentials and endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct RegistryConfig {
    #[serde(default = "default_auth_url")]
    pub auth_url: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    pub organization_id: String,
    pub client_id: String,
    pub client_secret: SecretString,
    /// Render timestamps converted to UTC instead of SIMRS-local time.
    #[serde(default)]
    pub convert_to_utc: bool,
    #[serde(default)]
    pub http: HttpClientConfig,
}

impl RegistryConfig {
    fn validate(&self) -> Result<(), String> {
        if url::Url::parse(&self.auth_url).is_err() {
            return Err(format!("registry.auth_url is not a valid URL: {}", self.auth_url));
        }
        if url::Url::parse(&self.base_url).is_err() {
            return Err(format!("registry.base_url is not a valid URL: {}", self.base_url));
        }
        if self.organization_id.trim().is_empty() {
            return Err("registry.organization_id is required".to_string());
        }
        if self.client_id.trim().is_empty() {
            return Err("registry.client_id is required".to_string());
        }
        Ok(())
    }
}

/// HTTP client tuning for registry calls.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpClientConfig {
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
    #[serde(default = "default_retry_wait")]
    pub retry_wait_secs: u64,
    #[serde(default = "default_retry_max_wait")]
    pub retry_max_wait_secs: u64,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            retry_count: default_retry_count(),
            retry_wait_secs: default_retry_wait(),
            retry_max_wait_secs: default_retry_max_wait(),
            timeout_secs: default_timeout(),
        }
    }
}

/// Embedded visit store location.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_path")]
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

/// Hospital information system connection.
#[derive(Debug, Clone, Deserialize)]
pub struct SimrsConfig {
    /// Schema variant: khanza or medifirst.
    pub vendor: String,
    pub host: String,
    #[serde(default = "default_mysql_port")]
    pub port: u16,
    pub username: String,
    pub password: SecretString,
    pub database: String,
    #[serde(default = "default_source_connections")]
    pub max_connections: u32,
}

impl SimrsConfig {
    fn validate(&self) -> Result<(), String> {
        let supported = ["khanza", "medifirst"];
        if !supported.contains(&self.vendor.to_lowercase().as_str()) {
            return Err(format!(
                "Unsupported simrs.vendor '{}'. Must be one of: {}",
                self.vendor,
                supported.join(", ")
            ));
        }
        if self.host.trim().is_empty() {
            return Err("simrs.host is required".to_string());
        }
        if self.username.trim().is_empty() {
            return Err("simrs.username is required".to_string());
        }
        if self.database.trim().is_empty() {
            return Err("simrs.database is required".to_string());
        }
        Ok(())
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Write rotating log files in addition to console output.
    #[serde(default)]
    pub local_enabled: bool,
    #[serde(default = "default_log_path")]
    pub local_path: String,
    /// Rotation cadence: daily or hourly.
    #[serde(default = "default_log_rotation")]
    pub local_rotation: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_log_path(),
            local_rotation: default_log_rotation(),
        }
    }
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid = ["daily", "hourly"];
        if !valid.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid.join(", ")
            ));
        }
        Ok(())
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_fetch_interval() -> u64 {
    300
}

fn default_fill_interval() -> u64 {
    300
}

fn default_mark_complete_interval() -> u64 {
    600
}

fn default_publish_interval() -> u64 {
    600
}

fn default_max_concurrent() -> usize {
    2
}

fn default_mark_complete_days() -> i64 {
    7
}

fn default_last_visit_days() -> i64 {
    7
}

fn default_simulation_dir() -> String {
    std::env::temp_dir().to_string_lossy().into_owned()
}

fn default_send_delay() -> u64 {
    2
}

fn default_auth_url() -> String {
    "https://api-satusehat.kemkes.go.id/oauth2/v1".to_string()
}

fn default_base_url() -> String {
    "https://api-satusehat.kemkes.go.id/fhir-r4/v1".to_string()
}

fn default_retry_count() -> u32 {
    1
}

fn default_retry_wait() -> u64 {
    2
}

fn default_retry_max_wait() -> u64 {
    30
}

fn default_timeout() -> u64 {
    5
}

fn default_store_path() -> String {
    "garuda.db".to_string()
}

fn default_mysql_port() -> u16 {
    3306
}

fn default_source_connections() -> u32 {
    5
}

fn default_log_path() -> String {
    "logs".to_string()
}

fn default_log_rotation() -> String {
    "daily".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn minimal_toml() -> &'static str {
        r#"
[registry]
organization_id = "ORG01"
client_id = "client"
client_secret = "secret"

[simrs]
vendor = "khanza"
host = "10.0.0.5"
username = "simrs"
password = "simrs-pass"
database = "simrs"
"#
    }

    #[test]
    fn test_minimal_config_parses_with_defaults() {
        let config: GarudaConfig = toml::from_str(minimal_toml()).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.application.log_level, "info");
        assert!(config.jobs.fetch_enabled);
        assert_eq!(config.jobs.max_concurrent, 2);
        assert_eq!(config.mapping.mark_complete_days, 7);
        assert_eq!(config.mapping.last_visit_days, 7);
        assert_eq!(config.publish.send_delay_secs, 2);
        assert!(!config.publish.republish_published);
        assert_eq!(config.simrs.port, 3306);
        assert_eq!(config.registry.http.retry_count, 1);
        assert!(config.registry.auth_url.contains("kemkes.go.id"));
    }

    #[test]
    fn test_secret_fields_load() {
        let config: GarudaConfig = toml::from_str(minimal_toml()).unwrap();
        assert_eq!(
            config.registry.client_secret.expose_secret().as_str(),
            "secret"
        );
        assert_eq!(config.simrs.password.expose_secret().as_str(), "simrs-pass");
    }

    #[test]
    fn test_unknown_vendor_rejected() {
        let toml = minimal_toml().replace("khanza", "homegrown");
        let config: GarudaConfig = toml::from_str(&toml).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.contains("Unsupported simrs.vendor"));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let toml = format!("{}\n[jobs]\nfill_interval_secs = 0\n", minimal_toml());
        let config: GarudaConfig = toml::from_str(&toml).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.contains("fill_interval_secs"));
    }

    #[test]
    fn test_invalid_registry_url_rejected() {
        let toml = format!(
            "{}\n",
            minimal_toml().replace(
                "[registry]",
                "[registry]\nbase_url = \"not a url\""
            )
        );
        let config: GarudaConfig = toml::from_str(&toml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toggles_projection() {
        let toml = format!(
            "{}\n[mapping]\ndisable_lab = true\ndisable_medication = true\n",
            minimal_toml()
        );
        let config: GarudaConfig = toml::from_str(&toml).unwrap();
        let toggles = config.mapping.toggles();
        assert!(toggles.disable_lab);
        assert!(toggles.disable_medication);
        assert!(!toggles.disable_diagnosis);
    }
}
