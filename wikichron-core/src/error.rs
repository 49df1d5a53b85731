//! Error types for wikichron-core

use thiserror::Error;

/// Main error type for the wikichron-core library
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV decoding error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// A column the revision log requires is absent from the dump header
    #[error("missing required column: {0}")]
    MissingColumn(String),

    /// A field could not be parsed into its typed value
    #[error("invalid {column} on line {line}: {message}")]
    InvalidField {
        line: u64,
        column: &'static str,
        message: String,
    },

    /// Two rows share the same revision id
    #[error("duplicate revision id: {0}")]
    DuplicateRevision(i64),

    /// Metric not found in the registry
    #[error("metric not found: {0}")]
    MetricNotFound(String),

    /// The time index does not cover the revision log
    #[error("time index mismatch: {0}")]
    TimeIndexMismatch(String),
}

/// Result type alias for wikichron-core
pub type Result<T> = std::result::Result<T, Error>;
