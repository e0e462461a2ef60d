//! Configuration loader with TOML parsing and environment substitution
//!
//! Loads the TOML file, substitutes `${VAR}` placeholders from the
//! environment (comment lines are left untouched), parses and validates.

use crate::config::schema::GarudaConfig;
use crate::domain::{GarudaError, Result};
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, a referenced environment
/// variable is unset, TOML parsing fails or validation fails.
pub fn load_config(path: impl AsRef<Path>) -> Result<GarudaConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(GarudaError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        GarudaError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let config: GarudaConfig = toml::from_str(&contents)
        .map_err(|e| GarudaError::Configuration(format!("Failed to parse TOML: {e}")))?;

    config
        .validate()
        .map_err(|e| GarudaError::Configuration(format!("Configuration validation failed: {e}")))?;

    Ok(config)
}

/// Substitutes environment variables in the format `${VAR_NAME}`.
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| GarudaError::Configuration(e.to_string()))?;
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    for line in input.lines() {
        // Placeholders inside comments are not substituted.
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for capture in re.captures_iter(line) {
            let var_name = &capture[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{var_name}}}");
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(GarudaError::Configuration(format!(
            "Environment variables not set: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitute_known_variable() {
        std::env::set_var("GARUDA_TEST_SECRET", "s3cret");
        let input = "client_secret = \"${GARUDA_TEST_SECRET}\"";
        let output = substitute_env_vars(input).unwrap();
        assert!(output.contains("s3cret"));
        std::env::remove_var("GARUDA_TEST_SECRET");
    }

    #[test]
    fn test_missing_variable_is_an_error() {
        let input = "client_secret = \"${GARUDA_TEST_UNSET_VARIABLE}\"";
        let err = substitute_env_vars(input).unwrap_err();
        assert!(err.to_string().contains("GARUDA_TEST_UNSET_VARIABLE"));
    }

    #[test]
    fn test_comment_lines_untouched() {
        let input = "# uses ${GARUDA_TEST_UNSET_VARIABLE}\nkey = \"value\"";
        let output = substitute_env_vars(input).unwrap();
        assert!(output.contains("${GARUDA_TEST_UNSET_VARIABLE}"));
    }

    #[test]
    fn test_missing_file_is_configuration_error() {
        let err = load_config("/nonexistent/garuda.toml").unwrap_err();
        assert!(matches!(err, GarudaError::Configuration(_)));
    }
}
