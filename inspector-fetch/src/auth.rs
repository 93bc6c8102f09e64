//! Token broker for the platform's client-credentials flow.
//!
//! The broker owns the only live [`Credential`] of the process. It hands out
//! the cached token while it is valid and exchanges the client id and secret
//! for a new one otherwise:
//!
//! ```text
//! POST <token_url>
//! Content-Type: application/x-www-form-urlencoded
//!
//! grant_type=client_credentials&client_id=..&client_secret=..&scope=..
//!
//! 200 {"access_token": "...", "expires_in": 3600}
//! ```
//!
//! Callers that race on a stale credential each run their own exchange; the
//! last one to finish wins the cache.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use inspector_core::Credential;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::error::{AuthError, CredentialStoreError};
use crate::host::http::{form_request, Transport};

// ============================================================================
// Constants
// ============================================================================

/// Grant type sent to the token endpoint.
pub const GRANT_TYPE: &str = "client_credentials";

/// Default scope requested for data API access.
pub const DEFAULT_SCOPE: &str = "data:read data:write";

// ============================================================================
// Configuration
// ============================================================================

/// Client-credentials configuration.
#[derive(Clone)]
pub struct AuthConfig {
    /// Token endpoint URL.
    pub token_url: String,
    /// OAuth client id.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: String,
    /// Space-separated scopes.
    pub scope: String,
}

impl AuthConfig {
    /// Creates a configuration with the default scope.
    pub fn new(
        token_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            token_url: token_url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            scope: DEFAULT_SCOPE.to_string(),
        }
    }

    /// Overrides the requested scope.
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("scope", &self.scope)
            .finish()
    }
}

// ============================================================================
// Credential Persistence
// ============================================================================

/// Durable storage for the broker's credential.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Loads the persisted credential, if any.
    async fn load(&self) -> Result<Option<Credential>, CredentialStoreError>;

    /// Persists a credential, replacing the previous one.
    async fn save(&self, credential: &Credential) -> Result<(), CredentialStoreError>;

    /// Removes the persisted credential.
    async fn clear(&self) -> Result<(), CredentialStoreError>;
}

// ============================================================================
// Token Response
// ============================================================================

/// Token endpoint response body.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    /// Lifetime in seconds. A missing value yields a token that is used once
    /// and refreshed on the next request.
    #[serde(default)]
    expires_in: i64,
}

// ============================================================================
// Token Broker
// ============================================================================

/// Caches and refreshes the platform bearer token.
pub struct TokenBroker {
    config: AuthConfig,
    transport: Arc<dyn Transport>,
    store: Option<Arc<dyn CredentialStore>>,
    credential: RwLock<Option<Credential>>,
}

impl TokenBroker {
    /// Creates a broker with an empty cache and no persistence.
    pub fn new(config: AuthConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            config,
            transport,
            store: None,
            credential: RwLock::new(None),
        }
    }

    /// Persists every acquired credential to `store`.
    pub fn with_store(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// The configuration this broker authenticates with.
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Seeds the cache from the persisted credential if it is still valid.
    ///
    /// Returns true if a credential was restored.
    pub async fn restore(&self) -> bool {
        let Some(store) = &self.store else {
            return false;
        };

        match store.load().await {
            Ok(Some(credential)) if credential.is_valid() => {
                debug!(expires_at = %credential.expires_at, "Restored persisted credential");
                *self.credential.write().await = Some(credential);
                true
            }
            Ok(_) => false,
            Err(e) => {
                warn!(error = %e, "Failed to load persisted credential");
                false
            }
        }
    }

    /// Snapshot of the cached credential.
    pub async fn credential(&self) -> Option<Credential> {
        self.credential.read().await.clone()
    }

    /// Returns a valid access token, exchanging client credentials if needed.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] if the exchange fails. The cache is left as it
    /// was, so a still-valid token survives a failed refresh.
    #[instrument(skip(self), fields(token_url = %self.config.token_url))]
    pub async fn get_token(&self) -> Result<String, AuthError> {
        if let Some(credential) = self.credential.read().await.as_ref() {
            if credential.is_valid() {
                debug!("Using cached token");
                return Ok(credential.access_token.clone());
            }
        }

        let credential = self.exchange().await?;
        let token = credential.access_token.clone();

        if let Some(store) = &self.store {
            if let Err(e) = store.save(&credential).await {
                warn!(error = %e, "Failed to persist credential");
            }
        }

        *self.credential.write().await = Some(credential);
        Ok(token)
    }

    /// Discards the cached and persisted credential.
    ///
    /// The next [`get_token`](Self::get_token) re-authenticates.
    pub async fn clear_token(&self) {
        *self.credential.write().await = None;

        if let Some(store) = &self.store {
            if let Err(e) = store.clear().await {
                warn!(error = %e, "Failed to clear persisted credential");
            }
        }

        info!("Token cleared");
    }

    async fn exchange(&self) -> Result<Credential, AuthError> {
        if self.config.client_secret.is_empty() {
            return Err(AuthError::MissingSecret);
        }

        debug!(client_id = %self.config.client_id, "Requesting token");

        let request = form_request(
            &self.config.token_url,
            &[
                ("grant_type", GRANT_TYPE),
                ("client_id", &self.config.client_id),
                ("client_secret", &self.config.client_secret),
                ("scope", &self.config.scope),
            ],
        )
        .map_err(AuthError::Transport)?;

        let response = self
            .transport
            .execute(request)
            .await
            .map_err(AuthError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Token request rejected");
            return Err(AuthError::Rejected {
                status: status.as_u16(),
            });
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::InvalidResponse(e.to_string()))?;

        let credential = Credential::from_lifetime(body.access_token, body.expires_in, Utc::now())
            .map_err(|e| AuthError::InvalidResponse(e.to_string()))?;
        info!(expires_at = %credential.expires_at, "Token acquired");
        Ok(credential)
    }
}

impl fmt::Debug for TokenBroker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenBroker")
            .field("config", &self.config)
            .field("persistent", &self.store.is_some())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
