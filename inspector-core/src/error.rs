//! Core error types for `Inspector`.

use thiserror::Error;

/// Core error type for `Inspector` operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Unsupported or malformed HTTP method.
    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),

    /// Unknown call status label.
    #[error("Invalid call status: {0}")]
    InvalidStatus(String),

    /// Token lifetime that cannot be turned into an expiry timestamp.
    #[error("Token lifetime out of range: {0}s")]
    InvalidLifetime(i64),

    /// Invalid data from API response.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
