// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Inspector Store
//!
//! Persisted state for the Inspector.
//!
//! This crate provides:
//!
//! - **SettingsStore**: User preferences with import/export and persistence
//! - **QueryStore**: Saved explorer queries
//! - **StatsStore**: Usage counters for backend calls
//! - **TokenCache**: File-backed credential store for the token broker
//! - **JsonFile**: Atomic JSON documents with per-file permissions
//!
//! ## Usage
//!
//! ```ignore
//! use inspector_store::{SettingsStore, StatsStore};
//!
//! let settings = SettingsStore::load_default().await?;
//! let stats = StatsStore::load_default().await;
//!
//! stats.record_success(12).await;
//!
//! let mut rx = settings.subscribe();
//! while rx.changed().await.is_ok() {
//!     println!("Settings updated!");
//! }
//! ```

pub mod error;
pub mod keychain;
pub mod persistence;
pub mod query_store;
pub mod settings_store;
pub mod stats_store;
pub mod token_cache;

pub use error::StoreError;
pub use persistence::{
    default_cache_dir, default_config_dir, default_queries_path, default_settings_path,
    default_stats_path, default_token_cache_path, Access, JsonFile,
};
pub use query_store::QueryStore;
pub use settings_store::{
    DateFormat, ExportFormat, FontSize, PlatformConfig, Settings, SettingsExport, SettingsStore,
    Theme,
};
pub use stats_store::StatsStore;
pub use token_cache::TokenCache;
#[cfg(test)]
mod persistence_tests;
