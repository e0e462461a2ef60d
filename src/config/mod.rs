//! Configuration management
//!
//! TOML-based configuration with environment variable substitution,
//! per-section validation and secret-wrapped credentials.

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::load_config;
pub use schema::{
    ApplicationConfig, GarudaConfig, HttpClientConfig, JobsConfig, LoggingConfig, MappingConfig,
    PublishConfig, RegistryConfig, SimrsConfig, StoreConfig,
};
pub use secret::{secret, SecretString, SecretValue};
