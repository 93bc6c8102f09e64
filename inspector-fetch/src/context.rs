//! Fetch context wiring the transport, tap, broker and gateway together.
//!
//! The context is built once at startup and shared. Gateway calls go
//! through the network tap when interception is enabled; token exchanges
//! use the raw client and are never recorded.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::debug;

use inspector_core::TapEvent;

use crate::auth::{AuthConfig, CredentialStore, TokenBroker};
use crate::error::HttpError;
use crate::gateway::ApiGateway;
use crate::host::{http::HttpClient, http::Transport, keychain::KeychainApi, keychain::SystemKeychain};
use crate::tap::{NetworkTap, TapFilter, DEFAULT_CHANNEL_CAPACITY};

// ============================================================================
// Fetch Settings
// ============================================================================

/// Settings for network operations.
#[derive(Debug, Clone)]
pub struct FetchSettings {
    /// Per-request timeout.
    pub timeout: Duration,
    /// Data API base URL.
    pub api_base_url: String,
    /// Whether gateway calls are recorded by the network tap.
    pub intercept: bool,
    /// Which requests the tap records.
    pub tap_filter: TapFilter,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            api_base_url: String::new(),
            intercept: true,
            tap_filter: TapFilter::default(),
        }
    }
}

impl FetchSettings {
    /// Creates settings with custom timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// ============================================================================
// Fetch Context
// ============================================================================

/// Shared network services.
pub struct FetchContext {
    /// Secure credential storage.
    pub keychain: Arc<dyn KeychainApi>,
    /// Raw HTTP client.
    pub http: Arc<HttpClient>,
    /// Network tap, if interception is enabled.
    pub tap: Option<Arc<NetworkTap>>,
    /// Token broker.
    pub broker: Arc<TokenBroker>,
    /// Data API gateway.
    pub gateway: Arc<ApiGateway>,
    /// Settings the context was built with.
    pub settings: FetchSettings,
}

impl FetchContext {
    /// Creates a builder for the given client credentials.
    pub fn builder(auth: AuthConfig) -> FetchContextBuilder {
        FetchContextBuilder::new(auth)
    }

    /// Returns the effective request timeout.
    pub fn timeout(&self) -> Duration {
        self.settings.timeout
    }

    /// Subscribes to tap events, if the tap is installed.
    pub fn subscribe(&self) -> Option<broadcast::Receiver<TapEvent>> {
        self.tap.as_ref().map(|tap| tap.subscribe())
    }
}

impl std::fmt::Debug for FetchContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchContext")
            .field("settings", &self.settings)
            .field("tap", &self.tap.is_some())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Fetch Context Builder
// ============================================================================

/// Builder for constructing a `FetchContext`.
pub struct FetchContextBuilder {
    auth: AuthConfig,
    keychain: Option<Arc<dyn KeychainApi>>,
    credential_store: Option<Arc<dyn CredentialStore>>,
    events: Option<broadcast::Sender<TapEvent>>,
    settings: FetchSettings,
}

impl FetchContextBuilder {
    /// Creates a new builder.
    pub fn new(auth: AuthConfig) -> Self {
        Self {
            auth,
            keychain: None,
            credential_store: None,
            events: None,
            settings: FetchSettings::default(),
        }
    }

    /// Sets the keychain implementation.
    pub fn keychain(mut self, keychain: Arc<dyn KeychainApi>) -> Self {
        self.keychain = Some(keychain);
        self
    }

    /// Persists broker credentials to `store`.
    pub fn credential_store(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.credential_store = Some(store);
        self
    }

    /// Broadcasts tap events on an existing channel.
    pub fn tap_channel(mut self, events: broadcast::Sender<TapEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Sets the fetch settings.
    pub fn settings(mut self, settings: FetchSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Sets the data API base URL.
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.settings.api_base_url = url.into();
        self
    }

    /// Sets the timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.settings.timeout = timeout;
        self
    }

    /// Enables or disables the network tap.
    pub fn intercept(mut self, intercept: bool) -> Self {
        self.settings.intercept = intercept;
        self
    }

    /// Sets the tap filter.
    pub fn tap_filter(mut self, filter: TapFilter) -> Self {
        self.settings.tap_filter = filter;
        self
    }

    /// Builds the fetch context.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn build(self) -> Result<FetchContext, HttpError> {
        let http = Arc::new(HttpClient::with_timeout(self.settings.timeout)?);
        let raw: Arc<dyn Transport> = http.clone();

        let tap = self.settings.intercept.then(|| {
            let events = self
                .events
                .unwrap_or_else(|| broadcast::channel(DEFAULT_CHANNEL_CAPACITY).0);
            Arc::new(NetworkTap::install(
                raw.clone(),
                self.settings.tap_filter.clone(),
                events,
            ))
        });
        let transport: Arc<dyn Transport> = match &tap {
            Some(tap) => tap.clone() as Arc<dyn Transport>,
            None => raw.clone(),
        };

        let mut broker = TokenBroker::new(self.auth, raw);
        if let Some(store) = self.credential_store {
            broker = broker.with_store(store);
        }
        let broker = Arc::new(broker);

        let gateway = Arc::new(ApiGateway::new(
            self.settings.api_base_url.clone(),
            broker.clone(),
            transport,
        ));

        debug!(
            api_base = %self.settings.api_base_url,
            intercept = self.settings.intercept,
            "Fetch context built"
        );

        Ok(FetchContext {
            keychain: self.keychain.unwrap_or_else(|| Arc::new(SystemKeychain::new())),
            http,
            tap,
            broker,
            gateway,
            settings: self.settings,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn auth() -> AuthConfig {
        AuthConfig::new("https://login.example.com/token", "id", "secret")
    }

    #[test]
    fn test_context_builder() {
        let ctx = FetchContext::builder(auth())
            .api_base_url("https://example.com/api/data")
            .timeout(Duration::from_secs(60))
            .build()
            .unwrap();

        assert_eq!(ctx.timeout(), Duration::from_secs(60));
        assert_eq!(ctx.gateway.base_url(), "https://example.com/api/data");
        assert!(ctx.tap.is_some());
    }

    #[test]
    fn test_intercept_disabled() {
        let ctx = FetchContext::builder(auth())
            .intercept(false)
            .build()
            .unwrap();
        assert!(ctx.tap.is_none());
        assert!(ctx.subscribe().is_none());
    }

    #[tokio::test]
    async fn test_shared_channel_sees_ready() {
        let (tx, mut rx) = broadcast::channel(4);
        let _ctx = FetchContext::builder(auth())
            .tap_channel(tx)
            .build()
            .unwrap();
        assert!(matches!(rx.recv().await.unwrap(), TapEvent::Ready { .. }));
    }
}
