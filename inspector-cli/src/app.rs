//! Service wiring shared by the network commands.

use std::sync::Arc;

use anyhow::{Context, Result};
use inspector_explorer::{Backend, Explorer};
use inspector_fetch::{AuthConfig, FetchContext, KeychainApi, SystemKeychain, TapFilter};
use inspector_store::keychain::resolve_client_secret_with_source;
use inspector_store::{QueryStore, Settings, SettingsStore, StatsStore, TokenCache};
use tracing::{debug, warn};

use crate::output::TextFormatter;
use crate::Cli;

/// Everything a network command needs.
pub struct App {
    /// Loaded settings.
    pub settings: Settings,
    /// Network services.
    pub fetch: FetchContext,
    /// Typed backend.
    pub backend: Arc<Backend>,
    /// Explorer over the backend.
    pub explorer: Explorer,
    /// Where the client secret came from, if one was found.
    pub secret_source: Option<String>,
}

impl App {
    /// Loads settings and builds the service graph.
    ///
    /// A missing client secret is not an error here; token requests fail
    /// later with a clear message.
    pub async fn load() -> Result<Self> {
        let store = SettingsStore::load_default()
            .await
            .context("Failed to load settings")?;
        let settings = store.get().await;
        let platform = settings.platform.clone();

        let keychain: Arc<dyn KeychainApi> = Arc::new(SystemKeychain::new());
        let (secret, secret_source) = match resolve_client_secret_with_source(keychain.as_ref()).await
        {
            Some((secret, source)) => (secret, Some(source.to_string())),
            None => {
                warn!("No client secret configured");
                (String::new(), None)
            }
        };

        let auth = AuthConfig::new(&platform.token_url, &platform.client_id, secret)
            .with_scope(&platform.scope);

        let fetch = FetchContext::builder(auth)
            .keychain(keychain)
            .credential_store(Arc::new(TokenCache::at_default_path()))
            .api_base_url(&platform.api_base_url)
            .timeout(settings.timeout())
            .intercept(settings.intercept_network_requests)
            .tap_filter(TapFilter::new(&platform.domain_marker))
            .build()
            .context("Failed to create HTTP client")?;

        if fetch.broker.restore().await {
            debug!("Reusing cached token");
        }

        let stats = Arc::new(StatsStore::load_default().await);
        let backend = Arc::new(
            Backend::new(fetch.gateway.clone(), &platform.platform_domain)
                .with_stats(stats)
                .with_default_headers(settings.custom_headers()?),
        );

        let queries = Arc::new(QueryStore::load_default().await);
        let explorer =
            Explorer::new(backend.clone(), queries).with_default_limit(settings.max_results);

        Ok(Self {
            settings,
            fetch,
            backend,
            explorer,
            secret_source,
        })
    }

    /// Text formatter honouring the color flag and the date format setting.
    pub fn text_formatter(&self, cli: &Cli) -> TextFormatter {
        TextFormatter::new(!cli.no_color).with_date_format(self.settings.date_format)
    }
}
