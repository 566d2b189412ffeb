//! Configuration loader.
//!
//! The loading pipeline: read file → YAML parse → validate → freeze
//! with `Arc`. Warnings survive into the result; any error-severity
//! issue fails the load.

use std::path::Path;
use std::sync::Arc;

use crate::config::schema::AppConfig;
use crate::config::validation;
use crate::error::{ConfigError, Severity, ValidationIssue};

/// Result of loading a configuration.
#[derive(Debug)]
pub struct LoadResult {
    /// The loaded and validated configuration.
    pub config: Arc<AppConfig>,

    /// Warnings encountered during validation.
    pub warnings: Vec<ValidationIssue>,
}

/// Loads and validates a configuration file.
///
/// # Errors
///
/// Returns [`ConfigError::MissingFile`] when the file does not exist,
/// [`ConfigError::ParseError`] on malformed YAML, or
/// [`ConfigError::ValidationError`] when validation finds errors.
pub fn load_config(path: &Path) -> Result<LoadResult, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|err| {
        if err.kind() == std::io::ErrorKind::NotFound {
            ConfigError::MissingFile {
                path: path.to_path_buf(),
            }
        } else {
            ConfigError::ParseError {
                path: path.to_path_buf(),
                message: err.to_string(),
            }
        }
    })?;

    let config: AppConfig =
        serde_yaml::from_str(&raw).map_err(|err| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;

    finish(config, &path.display().to_string())
}

/// Loads the given file, or falls back to the built-in defaults when no
/// path is provided.
///
/// # Errors
///
/// Same failure modes as [`load_config`]; the defaults themselves always
/// validate cleanly.
pub fn load_or_default(path: Option<&Path>) -> Result<LoadResult, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => finish(AppConfig::default(), "<defaults>"),
    }
}

fn finish(config: AppConfig, source: &str) -> Result<LoadResult, ConfigError> {
    let issues = validation::validate(&config);
    let (errors, warnings): (Vec<_>, Vec<_>) = issues
        .into_iter()
        .partition(|issue| issue.severity == Severity::Error);

    if errors.is_empty() {
        Ok(LoadResult {
            config: Arc::new(config),
            warnings,
        })
    } else {
        Err(ConfigError::ValidationError {
            path: source.to_string(),
            errors,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
