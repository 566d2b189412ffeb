//! Error types for `breathbox`
//!
//! This module provides the error hierarchy for every subsystem, plus the
//! exit-code mapping used by the CLI.

use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Exit Codes
// ============================================================================

/// Exit codes for `breathbox` CLI operations.
///
/// These codes follow Unix conventions.
pub struct ExitCode;

impl ExitCode {
    /// Successful execution
    pub const SUCCESS: i32 = 0;

    /// General error
    pub const ERROR: i32 = 1;

    /// Configuration error (invalid YAML, validation failure)
    pub const CONFIG_ERROR: i32 = 2;

    /// I/O error (file not found, permission denied)
    pub const IO_ERROR: i32 = 3;

    /// Gateway error (bind failed, serve loop failed)
    pub const GATEWAY_ERROR: i32 = 4;

    /// Cache error (install failed, offline with no fallback)
    pub const CACHE_ERROR: i32 = 5;

    /// Usage error (invalid arguments, missing required options)
    pub const USAGE_ERROR: i32 = 64;

    /// Interrupted by SIGINT (Ctrl+C)
    pub const INTERRUPTED: i32 = 130;

    /// Terminated by SIGTERM
    pub const TERMINATED: i32 = 143;
}

// ============================================================================
// Top-Level Error
// ============================================================================

/// Top-level error type for `breathbox` operations.
///
/// Aggregates all domain-specific errors and provides a unified interface
/// for error handling and exit code mapping.
#[derive(Debug, Error)]
pub enum BreathboxError {
    /// Configuration loading or validation error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Cache lifecycle or fetch error
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// Gateway transport error
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl BreathboxError {
    /// Returns the appropriate exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Json(_) | Self::Yaml(_) => ExitCode::CONFIG_ERROR,
            Self::Cache(_) => ExitCode::CACHE_ERROR,
            Self::Gateway(_) => ExitCode::GATEWAY_ERROR,
            Self::Io(_) => ExitCode::IO_ERROR,
        }
    }
}

// ============================================================================
// Configuration Errors
// ============================================================================

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// YAML parsing failed
    #[error("parse error in {path}: {message}")]
    ParseError {
        /// Path to the configuration file
        path: PathBuf,
        /// Error message from the parser
        message: String,
    },

    /// Configuration validation failed
    #[error("validation failed for {path}")]
    ValidationError {
        /// Path (or `<defaults>`) of the validated configuration
        path: String,
        /// List of validation issues found
        errors: Vec<ValidationIssue>,
    },

    /// Referenced configuration file not found
    #[error("file not found: {path}")]
    MissingFile {
        /// Path to the missing file
        path: PathBuf,
    },

    /// Field has an invalid value
    #[error("invalid value for '{field}': got '{value}', expected {expected}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The actual value provided
        value: String,
        /// Description of what was expected
        expected: String,
    },

    /// One or more files failed validation
    #[error("{failed} of {total} configuration files failed validation")]
    FilesFailed {
        /// Number of files that failed
        failed: usize,
        /// Total number of files checked
        total: usize,
    },
}

// ============================================================================
// Validation Types
// ============================================================================

/// A single validation issue found during configuration validation.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    /// Path to the problematic field (e.g., "gateway.precache[2]")
    pub path: String,
    /// Description of the validation issue
    pub message: String,
    /// Severity level of the issue
    pub severity: Severity,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {} at {}", prefix, self.message, self.path)
    }
}

/// Severity level for validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Error - validation failure that prevents configuration from being used
    Error,
    /// Warning - potential issue that does not prevent configuration loading
    Warning,
}

// ============================================================================
// Cache Errors
// ============================================================================

/// Cache lifecycle and fetch errors.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Network fetch failed (connection refused, timeout, bad status)
    #[error("network fetch failed for {path}: {message}")]
    Network {
        /// Request path that failed
        path: String,
        /// Underlying failure description
        message: String,
    },

    /// Offline and the root document is not cached either
    #[error("offline and no cached fallback for {path}")]
    Offline {
        /// Request path that could not be served
        path: String,
    },

    /// Backing cache storage failed
    #[error("cache storage error: {0}")]
    Storage(String),

    /// Lifecycle method called from the wrong state
    #[error("invalid lifecycle transition: {0}")]
    Lifecycle(String),
}

// ============================================================================
// Gateway Errors
// ============================================================================

/// Gateway transport errors.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Failed to bind the listener
    #[error("bind failed: {0}")]
    Bind(String),

    /// I/O error during the serve loop
    #[error("gateway I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// ============================================================================
// Result Type Alias
// ============================================================================

/// Result type alias for `breathbox` operations.
pub type Result<T> = std::result::Result<T, BreathboxError>;

// ============================================================================
// Tests
// ============================================================================
