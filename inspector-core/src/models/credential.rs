//! Bearer credential issued by the platform token endpoint.

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Seconds subtracted from the server-reported lifetime when a token is
/// acquired, so it is refreshed before the server starts rejecting it.
pub const EXPIRY_SAFETY_MARGIN_SECS: i64 = 60;

/// Access token plus the instant after which it must not be used.
///
/// `expires_at` already has the safety margin applied.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    /// Opaque bearer token.
    pub access_token: String,
    /// Effective expiry (server lifetime minus the safety margin).
    pub expires_at: DateTime<Utc>,
}

impl Credential {
    /// Creates a credential from a token response lifetime.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidLifetime`] if the expiry does not fit in a
    /// timestamp.
    pub fn from_lifetime(
        access_token: impl Into<String>,
        expires_in_secs: i64,
        acquired_at: DateTime<Utc>,
    ) -> Result<Self, CoreError> {
        let expires_at = TimeDelta::try_seconds(expires_in_secs)
            .and_then(|lifetime| acquired_at.checked_add_signed(lifetime))
            .and_then(|at| {
                TimeDelta::try_seconds(EXPIRY_SAFETY_MARGIN_SECS)
                    .and_then(|margin| at.checked_sub_signed(margin))
            })
            .ok_or(CoreError::InvalidLifetime(expires_in_secs))?;

        Ok(Self {
            access_token: access_token.into(),
            expires_at,
        })
    }

    /// Returns true if the credential can still be used at `now`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    /// Returns true if the credential can still be used.
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    /// Time left before the credential expires, if any.
    pub fn time_until_expiry(&self) -> Option<std::time::Duration> {
        (self.expires_at - Utc::now()).to_std().ok()
    }

    /// Value for the `Authorization` header.
    pub fn bearer_header(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
