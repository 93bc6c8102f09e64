//! Fetch error types.

use thiserror::Error;

// ============================================================================
// HTTP Error
// ============================================================================

/// Transport-level error (no HTTP response was obtained).
#[derive(Debug, Error)]
pub enum HttpError {
    /// Request error.
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Invalid header name or value.
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// Timeout.
    #[error("Request timed out")]
    Timeout,
}

// ============================================================================
// Auth Error
// ============================================================================

/// Token exchange failure.
///
/// A failed exchange never clears a cached credential.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The token endpoint answered with a non-success status.
    #[error("Token request failed: {status}")]
    Rejected {
        /// HTTP status code.
        status: u16,
    },

    /// The token endpoint could not be reached.
    #[error("Token request failed: {0}")]
    Transport(#[source] HttpError),

    /// The token endpoint answered 2xx with an unusable body.
    #[error("Invalid token response: {0}")]
    InvalidResponse(String),

    /// No client secret is configured.
    #[error("Missing client secret")]
    MissingSecret,
}

impl AuthError {
    /// HTTP status reported by the token endpoint, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status } => Some(*status),
            _ => None,
        }
    }
}

// ============================================================================
// API Error
// ============================================================================

/// Data API call failure.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Non-2xx response.
    #[error("API call failed: {status} {status_text}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// HTTP reason phrase.
        status_text: String,
    },

    /// The request could not be sent or the response not read.
    #[error("API call failed: {0}")]
    Transport(#[source] HttpError),

    /// A bearer token could not be obtained.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The 2xx response body is not JSON.
    #[error("Invalid JSON response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// HTTP status code of a rejected call.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns true if the failure came from the token exchange.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }
}

impl From<HttpError> for ApiError {
    fn from(err: HttpError) -> Self {
        Self::Transport(err)
    }
}

// ============================================================================
// Keychain Error
// ============================================================================

/// Error type for keychain operations.
#[derive(Debug, Error)]
pub enum KeychainError {
    /// Access denied.
    #[error("Access denied to keychain")]
    AccessDenied,

    /// Platform error.
    #[error("Platform error: {0}")]
    Platform(String),

    /// Stored value could not be decoded.
    #[error("Invalid keychain entry: {0}")]
    InvalidEntry(String),

    /// Generic error.
    #[error("Keychain error: {0}")]
    Other(String),
}

impl From<keyring::Error> for KeychainError {
    fn from(err: keyring::Error) -> Self {
        match err {
            keyring::Error::PlatformFailure(e) => KeychainError::Platform(e.to_string()),
            keyring::Error::NoStorageAccess(_) => KeychainError::AccessDenied,
            _ => KeychainError::Other(err.to_string()),
        }
    }
}

// ============================================================================
// Credential Store Error
// ============================================================================

/// Failure to load, save or clear a persisted credential.
#[derive(Debug, Error)]
#[error("Credential store error: {0}")]
pub struct CredentialStoreError(pub String);

impl From<KeychainError> for CredentialStoreError {
    fn from(err: KeychainError) -> Self {
        Self(err.to_string())
    }
}
