//! Store error types.

use thiserror::Error;

/// Errors that can occur in the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Saved query not found.
    #[error("Query not found: {0}")]
    QueryNotFound(i64),

    /// Unknown settings key.
    #[error("Unknown setting: {0}")]
    UnknownSetting(String),

    /// Settings import file is malformed.
    #[error("Invalid settings file format: {0}")]
    InvalidImport(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}
