//! Structured logging setup using tracing
//!
//! Console output is always on; rotating file output is optional. Logs
//! are the primary user-visible failure surface of the worker, so sweep
//! jobs attach `visit_id` and operation fields to everything they emit.

use crate::config::LoggingConfig;
use crate::domain::{GarudaError, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Guard that must be kept alive for the duration of the program to
/// ensure file logs are flushed.
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Initialize the logging system.
///
/// # Arguments
///
/// * `log_level` - Level name (trace, debug, info, warn, error)
/// * `config` - Logging configuration
///
/// # Errors
///
/// Returns an error if the level is unknown, the log directory cannot be
/// created or a global subscriber is already set.
pub fn init_logging(log_level: &str, config: &LoggingConfig) -> Result<LoggingGuard> {
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&log_level) {
        return Err(GarudaError::Configuration(format!(
            "Invalid log level: {log_level}"
        )));
    }

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("garuda={log_level}")));

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_filter(env_filter);

    let mut layers = vec![console_layer.boxed()];

    let file_guard = if config.local_enabled {
        std::fs::create_dir_all(&config.local_path).map_err(|e| {
            GarudaError::Configuration(format!(
                "Failed to create log directory {}: {e}",
                config.local_path
            ))
        })?;

        let rotation = match config.local_rotation.as_str() {
            "hourly" => Rotation::HOURLY,
            _ => Rotation::DAILY,
        };
        let appender = RollingFileAppender::new(rotation, &config.local_path, "garuda.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);

        let file_filter = EnvFilter::new(format!("garuda={log_level}"));
        let file_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_writer(non_blocking)
            .with_filter(file_filter);
        layers.push(file_layer.boxed());
        Some(guard)
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .map_err(|e| GarudaError::Configuration(format!("Failed to set subscriber: {e}")))?;

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_level_rejected() {
        let config = LoggingConfig::default();
        let result = init_logging("loud", &config);
        assert!(result.is_err());
    }
}
