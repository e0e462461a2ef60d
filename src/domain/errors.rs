//! Domain error types
//!
//! This module defines the error hierarchy for Garuda. All errors are
//! domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main Garuda error type
///
/// This is the primary error type used throughout the application.
/// It wraps collaborator-specific error types and provides context
/// for error handling.
#[derive(Debug, Error)]
pub enum GarudaError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Required-field validation failures on clinical data
    #[error("Validation error: {0}")]
    Validation(String),

    /// SatuSehat registry errors
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Visit store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// SIMRS source errors
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Bundle mapping/assembly errors
    #[error("Mapping error: {0}")]
    Mapping(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// SatuSehat registry errors
///
/// Outcomes of a registry call, classified the way the publish engine
/// needs them: transport failures and authorization rejections happen
/// before a usable response exists, while server/response errors carry
/// the body the registry returned.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Transport-level failure; no response was obtained
    #[error("request execution failed: {0}")]
    Execution(String),

    /// The registry rejected our credentials or token (401)
    #[error("unauthorized ({status}): {body}")]
    Unauthorized { status: u16, body: String },

    /// The registry returned a server error (5xx)
    #[error("server error ({status}): {body}")]
    Server { status: u16, body: String },

    /// The registry returned a non-success response (4xx other than 401)
    #[error("response error ({status}): {body}")]
    Response { status: u16, body: String },

    /// A lookup returned no matching resource
    #[error("{resource} not found: {body}")]
    NotFound { resource: String, body: String },
}

impl RegistryError {
    /// True when the error occurred before an application-level response
    /// was obtained (transport failure or rejected authorization).
    ///
    /// The publish engine leaves the record untouched for these and
    /// retries on the next sweep.
    pub fn is_pre_response(&self) -> bool {
        matches!(
            self,
            RegistryError::Execution(_) | RegistryError::Unauthorized { .. }
        )
    }

    /// Response body associated with the error, if one was obtained.
    pub fn body(&self) -> Option<&str> {
        match self {
            RegistryError::Execution(_) => None,
            RegistryError::Unauthorized { body, .. }
            | RegistryError::Server { body, .. }
            | RegistryError::Response { body, .. }
            | RegistryError::NotFound { body, .. } => Some(body),
        }
    }
}

/// Visit store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to open or bootstrap the store
    #[error("failed to open store: {0}")]
    Open(String),

    /// A query failed
    #[error("query failed: {0}")]
    Query(String),

    /// A write failed
    #[error("write failed: {0}")]
    Write(String),

    /// A stored row could not be decoded
    #[error("failed to decode row: {0}")]
    Decode(String),
}

/// SIMRS source errors
#[derive(Debug, Error)]
pub enum SourceError {
    /// Failed to connect to the hospital database
    #[error("failed to connect to SIMRS: {0}")]
    ConnectionFailed(String),

    /// A query failed
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// A row could not be decoded into a domain type
    #[error("failed to decode row: {0}")]
    Decode(String),
}

// Conversion from std::io::Error
impl From<std::io::Error> for GarudaError {
    fn from(err: std::io::Error) -> Self {
        GarudaError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for GarudaError {
    fn from(err: serde_json::Error) -> Self {
        GarudaError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for GarudaError {
    fn from(err: toml::de::Error) -> Self {
        GarudaError::Configuration(format!("TOML parse error: {err}"))
    }
}
