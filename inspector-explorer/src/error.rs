//! Explorer error types.

use inspector_fetch::{ApiError, AuthError};
use inspector_store::StoreError;
use thiserror::Error;

/// Errors surfaced by explorer operations.
#[derive(Debug, Error)]
pub enum ExplorerError {
    /// The request body is not valid JSON.
    #[error("Invalid JSON in request body: {0}")]
    InvalidBody(String),

    /// No record id could be derived from the page URL.
    #[error("No record ID found for {0}")]
    MissingRecordId(String),

    /// The response does not have the expected shape.
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Data API call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Token exchange failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Persisted state could not be read or written.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ExplorerError {
    /// HTTP status of a rejected API call, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api(e) => e.status(),
            Self::Auth(e) => e.status(),
            _ => None,
        }
    }
}
