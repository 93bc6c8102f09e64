//! User preferences store.
//!
//! Manages user settings with persistence, import/export and change
//! notification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{RwLock, watch};
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::persistence::{default_settings_path, Access, JsonFile};

/// Version tag written into settings exports.
pub const EXPORT_VERSION: &str = "1.0.0";

// ============================================================================
// Platform Connection
// ============================================================================

/// Connection parameters for the platform.
///
/// The client secret is never stored here; see
/// [`crate::keychain::resolve_client_secret`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlatformConfig {
    /// Token endpoint.
    pub token_url: String,
    /// Data API base URL.
    pub api_base_url: String,
    /// Platform web origin.
    pub platform_domain: String,
    /// Substring identifying platform requests for the network tap.
    pub domain_marker: String,
    /// OAuth client id.
    pub client_id: String,
    /// Requested scopes.
    pub scope: String,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            token_url: "https://login-preview.congacloud.eu/api/v1/auth/connect/token".to_string(),
            api_base_url: "https://rls-preview.congacloud.eu/api/data".to_string(),
            platform_domain: "https://rls-preview.congacloud.eu".to_string(),
            domain_marker: "congacloud.eu".to_string(),
            client_id: String::new(),
            scope: "data:read data:write".to_string(),
        }
    }
}

// ============================================================================
// Settings Types
// ============================================================================

/// User preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[allow(clippy::struct_excessive_bools)]
pub struct Settings {
    /// Verbose logging.
    pub enable_logging: bool,
    /// Refresh page metadata on navigation.
    pub auto_refresh: bool,
    /// Show status notifications.
    pub show_notifications: bool,
    /// Request timeout in seconds.
    pub api_timeout: u64,
    /// Default row limit for the data browser.
    pub max_results: u32,

    /// Color theme.
    pub theme: Theme,
    /// Font size.
    pub font_size: FontSize,
    /// Compact layout.
    pub compact_mode: bool,

    /// Record export format.
    pub export_format: ExportFormat,
    /// Include metadata in exports.
    pub include_metadata: bool,
    /// Timestamp display format.
    pub date_format: DateFormat,

    /// Record platform calls with the network tap.
    pub intercept_network_requests: bool,
    /// Cache API responses.
    pub cache_api_responses: bool,
    /// Cache lifetime in minutes.
    pub cache_duration: u32,
    /// Extra request headers as a JSON object string.
    pub custom_headers: String,

    /// Platform connection.
    pub platform: PlatformConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enable_logging: true,
            auto_refresh: true,
            show_notifications: true,
            api_timeout: 30,
            max_results: 100,
            theme: Theme::default(),
            font_size: FontSize::default(),
            compact_mode: false,
            export_format: ExportFormat::default(),
            include_metadata: true,
            date_format: DateFormat::default(),
            intercept_network_requests: true,
            cache_api_responses: false,
            cache_duration: 5,
            custom_headers: "{}".to_string(),
            platform: PlatformConfig::default(),
        }
    }
}

impl Settings {
    /// Request timeout as a duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api_timeout)
    }

    /// Parses `custom_headers` into name/value pairs.
    ///
    /// Non-string values are rendered as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Config`] if the field is not a JSON object.
    pub fn custom_headers(&self) -> Result<Vec<(String, String)>, StoreError> {
        let value: Value = serde_json::from_str(&self.custom_headers)
            .map_err(|e| StoreError::Config(format!("Invalid JSON in custom headers: {e}")))?;
        let Value::Object(map) = value else {
            return Err(StoreError::Config(
                "Custom headers must be a JSON object".to_string(),
            ));
        };
        Ok(map
            .into_iter()
            .map(|(k, v)| match v {
                Value::String(s) => (k, s),
                other => (k, other.to_string()),
            })
            .collect())
    }

    /// Checks fields that cannot be expressed in the type.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Config`] describing the first invalid field.
    pub fn validate(&self) -> Result<(), StoreError> {
        self.custom_headers()?;
        if self.api_timeout == 0 {
            return Err(StoreError::Config("apiTimeout must be positive".to_string()));
        }
        Ok(())
    }

    /// Sets a single field from its string form.
    ///
    /// `key` is the camelCase name (`maxResults`) or the snake_case one
    /// (`max_results`); platform fields use a `platform.` prefix.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownSetting`] for unknown keys and
    /// [`StoreError::Config`] for values of the wrong type.
    pub fn set_field(&mut self, key: &str, raw: &str) -> Result<(), StoreError> {
        let mut root = serde_json::to_value(&*self)?;
        let path: Vec<String> = key.split('.').map(camel_case).collect();

        let slot = path
            .iter()
            .try_fold(&mut root, |node, part| node.get_mut(part.as_str()))
            .ok_or_else(|| StoreError::UnknownSetting(key.to_string()))?;

        *slot = match &*slot {
            Value::Bool(_) => raw
                .parse::<bool>()
                .map(Value::Bool)
                .map_err(|_| StoreError::Config(format!("{key} expects true or false")))?,
            Value::Number(_) => raw
                .parse::<u64>()
                .map(Value::from)
                .map_err(|_| StoreError::Config(format!("{key} expects a number")))?,
            _ => Value::String(raw.to_string()),
        };

        *self = serde_json::from_value(root)
            .map_err(|e| StoreError::Config(format!("{key}: {e}")))?;
        Ok(())
    }
}

fn camel_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper = false;
    for c in key.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Color theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    /// Light theme.
    #[default]
    Light,
    /// Dark theme.
    Dark,
    /// Follow system appearance.
    Auto,
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Theme::Light => write!(f, "light"),
            Theme::Dark => write!(f, "dark"),
            Theme::Auto => write!(f, "auto"),
        }
    }
}

/// Font size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FontSize {
    /// Small.
    Small,
    /// Medium.
    #[default]
    Medium,
    /// Large.
    Large,
}

/// Record export format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    /// Pretty-printed JSON.
    #[default]
    Json,
    /// Field/value CSV.
    Csv,
}

impl ExportFormat {
    /// File extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }
}

/// Timestamp display format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DateFormat {
    /// `2024-01-15 10:30`.
    #[default]
    Short,
    /// `Monday, January 15, 2024 10:30:00 UTC`.
    Long,
    /// RFC 3339.
    Iso,
}

impl DateFormat {
    /// Renders a timestamp.
    pub fn format(&self, ts: &DateTime<Utc>) -> String {
        match self {
            DateFormat::Short => ts.format("%Y-%m-%d %H:%M").to_string(),
            DateFormat::Long => ts.format("%A, %B %-d, %Y %H:%M:%S UTC").to_string(),
            DateFormat::Iso => ts.to_rfc3339(),
        }
    }
}

// ============================================================================
// Import / Export
// ============================================================================

/// Portable settings file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsExport {
    /// Format version.
    pub version: String,
    /// When the export was made.
    pub export_date: DateTime<Utc>,
    /// The exported settings.
    pub settings: Settings,
}

impl SettingsExport {
    /// Suggested file name, e.g. `conga-inspector-settings-2024-01-15.json`.
    pub fn file_name(&self) -> String {
        format!(
            "conga-inspector-settings-{}.json",
            self.export_date.format("%Y-%m-%d")
        )
    }

    /// Parses an export document, merging its settings over the defaults.
    ///
    /// Only the `settings` key is required.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidImport`] if `settings` is missing or
    /// holds values of the wrong type.
    pub fn parse(document: &Value) -> Result<Settings, StoreError> {
        let settings = document
            .get("settings")
            .filter(|s| s.is_object())
            .ok_or_else(|| StoreError::InvalidImport("missing settings object".to_string()))?;
        serde_json::from_value(settings.clone())
            .map_err(|e| StoreError::InvalidImport(e.to_string()))
    }
}

// ============================================================================
// Settings Store
// ============================================================================

/// Settings store with persistence.
#[derive(Debug)]
pub struct SettingsStore {
    settings: Arc<RwLock<Settings>>,
    file: JsonFile,
    notify: watch::Sender<u64>,
    version: Arc<RwLock<u64>>,
}

impl SettingsStore {
    /// Creates a new settings store.
    pub fn new(path: PathBuf) -> Self {
        let (notify, _) = watch::channel(0);
        Self {
            settings: Arc::new(RwLock::new(Settings::default())),
            file: JsonFile::new(path, Access::Private),
            notify,
            version: Arc::new(RwLock::new(0)),
        }
    }

    /// Loads settings from the default path.
    ///
    /// # Errors
    ///
    /// Returns error if settings cannot be loaded from disk.
    pub async fn load_default() -> Result<Self, StoreError> {
        Self::load(default_settings_path()).await
    }

    /// Loads settings from a path.
    ///
    /// # Errors
    ///
    /// Returns error if settings cannot be loaded from disk.
    pub async fn load(path: PathBuf) -> Result<Self, StoreError> {
        let file = JsonFile::new(path, Access::Private);
        let settings = match file.read().await {
            Ok(Some(settings)) => {
                info!(path = %file.path().display(), "Loaded settings");
                settings
            }
            Ok(None) => {
                debug!(path = %file.path().display(), "Settings file not found, using defaults");
                Settings::default()
            }
            Err(e) => {
                warn!(error = %e, "Failed to load settings, using defaults");
                Settings::default()
            }
        };

        let (notify, _) = watch::channel(0);
        Ok(Self {
            settings: Arc::new(RwLock::new(settings)),
            file,
            notify,
            version: Arc::new(RwLock::new(0)),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Gets a copy of the current settings.
    pub async fn get(&self) -> Settings {
        self.settings.read().await.clone()
    }

    /// Updates settings and notifies subscribers.
    pub async fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut Settings),
    {
        {
            let mut settings = self.settings.write().await;
            f(&mut settings);
        }
        self.notify_change().await;
    }

    /// Validates and saves settings to disk.
    ///
    /// # Errors
    ///
    /// Returns error if settings are invalid or cannot be written to disk.
    pub async fn save(&self) -> Result<(), StoreError> {
        let settings = self.settings.read().await;
        settings.validate()?;
        self.file.write(&*settings).await?;
        info!(path = %self.file.path().display(), "Settings saved");
        Ok(())
    }

    /// Subscribes to settings changes.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.notify.subscribe()
    }

    /// Notifies subscribers of a change.
    async fn notify_change(&self) {
        let mut version = self.version.write().await;
        *version += 1;
        let _ = self.notify.send(*version);
    }

    // ========================================================================
    // Convenience Methods
    // ========================================================================

    /// Sets a single field from its string form and saves.
    ///
    /// # Errors
    ///
    /// Returns error if the key or value is invalid, or the save fails.
    pub async fn set_field(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut updated = self.get().await;
        updated.set_field(key, value)?;
        updated.validate()?;
        self.update(|s| *s = updated).await;
        self.save().await
    }

    /// Restores defaults and saves.
    ///
    /// The platform connection is kept.
    ///
    /// # Errors
    ///
    /// Returns error if settings cannot be written to disk.
    pub async fn reset(&self) -> Result<(), StoreError> {
        self.update(|s| {
            *s = Settings {
                platform: s.platform.clone(),
                ..Settings::default()
            };
        })
        .await;
        self.save().await
    }

    /// Snapshot for export.
    pub async fn export(&self) -> SettingsExport {
        SettingsExport {
            version: EXPORT_VERSION.to_string(),
            export_date: Utc::now(),
            settings: self.get().await,
        }
    }

    /// Replaces settings with an imported document and saves.
    ///
    /// # Errors
    ///
    /// Returns error if the document is invalid or the save fails.
    pub async fn import(&self, document: &Value) -> Result<(), StoreError> {
        let imported = SettingsExport::parse(document)?;
        imported.validate()?;
        self.update(|s| *s = imported).await;
        self.save().await?;
        info!("Settings imported");
        Ok(())
    }

    /// Gets the platform connection.
    pub async fn platform(&self) -> PlatformConfig {
        self.settings.read().await.platform.clone()
    }

    /// Gets the data browser row limit.
    pub async fn max_results(&self) -> u32 {
        self.settings.read().await.max_results
    }
}

// ============================================================================
// Tests
// ============================================================================
