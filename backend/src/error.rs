//! Error types for the Titanic insights pipeline.
//!
//! - [`DataSourceError`] - fetching, decoding, or parsing the passenger dataset
//! - [`ConfigError`] - invalid environment configuration
//! - [`OutputError`] - writing derived tables
//! - [`AppError`] - top-level error returned by the CLI commands
//!
//! Conversion into [`AppError`] is automatic via `From` implementations,
//! so `?` works across stage boundaries.
//!
//! Missing values (unknown age, unknown family fields) are not errors. They
//! are domain states represented as `None` on the record.

use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// Data Source Errors
// =============================================================================

/// Errors while loading the passenger dataset.
///
/// Fatal to the load stage and never retried.
#[derive(Debug, Error)]
pub enum DataSourceError {
    /// The HTTP request could not be completed (DNS, connect, timeout...).
    #[error("Failed to fetch '{locator}': {source}")]
    Unreachable {
        locator: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("Fetching '{locator}' returned HTTP {status}")]
    HttpStatus { locator: String, status: u16 },

    /// Failed to read a local file.
    #[error("Failed to read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Payload layout the parser cannot handle.
    #[error("Unsupported payload: {0}")]
    Unsupported(String),

    /// Payload is not well-formed CSV.
    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    /// Payload is empty.
    #[error("Data source is empty")]
    EmptyFile,

    /// Header row is missing or blank.
    #[error("No headers found in data source")]
    NoHeaders,

    /// A required column is absent.
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// A cell holds a value outside its column's domain.
    #[error("Line {line}, column '{column}' (value '{value}'): {message}")]
    InvalidValue {
        line: usize,
        column: String,
        value: String,
        message: String,
    },
}

impl DataSourceError {
    pub(crate) fn invalid_value(
        line: usize,
        column: &str,
        value: &str,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            line,
            column: column.to_string(),
            value: value.to_string(),
            message: message.into(),
        }
    }
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors while reading configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Timeout is not a positive whole number of seconds.
    #[error("Invalid {var} '{value}': expected a positive number of seconds")]
    InvalidTimeout { var: &'static str, value: String },

    /// A variable is set but empty.
    #[error("{0} is set but empty")]
    Empty(&'static str),
}

// =============================================================================
// Output Errors
// =============================================================================

/// Errors while writing derived tables.
#[derive(Debug, Error)]
pub enum OutputError {
    /// Failed to write to the destination.
    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV serialization failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The requested format cannot represent this output.
    #[error("Format '{format}' is not supported for {what}")]
    UnsupportedFormat { format: String, what: &'static str },
}

// =============================================================================
// Application Errors (top-level)
// =============================================================================

/// Top-level error returned by the CLI commands.
#[derive(Debug, Error)]
pub enum AppError {
    /// Loading the dataset failed.
    #[error("Data source error: {0}")]
    DataSource(#[from] DataSourceError),

    /// Configuration is invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Writing results failed.
    #[error("Output error: {0}")]
    Output(#[from] OutputError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for loading operations.
pub type DataSourceResult<T> = Result<T, DataSourceError>;

/// Result type for configuration.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for output operations.
pub type OutputResult<T> = Result<T, OutputError>;

/// Result type for CLI commands.
pub type AppResult<T> = Result<T, AppError>;
