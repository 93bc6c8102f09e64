//! Usage statistics for calls made through the backend.
//!
//! Read-modify-write with change notification; the last writer wins.

use inspector_core::UsageStats;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::persistence::{default_stats_path, Access, JsonFile};

/// Persisted [`UsageStats`].
#[derive(Debug)]
pub struct StatsStore {
    stats: Arc<RwLock<UsageStats>>,
    file: JsonFile,
    notify: watch::Sender<UsageStats>,
}

impl StatsStore {
    /// Creates a zeroed store backed by `path`.
    pub fn new(path: PathBuf) -> Self {
        Self::with_stats(JsonFile::new(path, Access::Shared), UsageStats::default())
    }

    fn with_stats(file: JsonFile, stats: UsageStats) -> Self {
        let (notify, _) = watch::channel(stats.clone());
        Self {
            stats: Arc::new(RwLock::new(stats)),
            file,
            notify,
        }
    }

    /// Loads statistics from the default path.
    pub async fn load_default() -> Self {
        Self::load(default_stats_path()).await
    }

    /// Loads statistics from `path`, zeroed if absent.
    pub async fn load(path: PathBuf) -> Self {
        let file = JsonFile::new(path, Access::Shared);
        let stats = file.read_or_default().await;
        Self::with_stats(file, stats)
    }

    /// Current statistics.
    pub async fn get(&self) -> UsageStats {
        self.stats.read().await.clone()
    }

    /// Subscribes to statistics updates.
    pub fn subscribe(&self) -> watch::Receiver<UsageStats> {
        self.notify.subscribe()
    }

    /// Counts a successful call returning `records` records and persists.
    pub async fn record_success(&self, records: usize) {
        self.apply(|s| s.record_success(records)).await;
    }

    /// Counts a failed call and persists.
    pub async fn record_error(&self) {
        self.apply(UsageStats::record_error).await;
    }

    /// Zeroes the counters and persists.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be written.
    pub async fn reset(&self) -> Result<(), StoreError> {
        let stats = {
            let mut stats = self.stats.write().await;
            *stats = UsageStats::default();
            stats.clone()
        };
        let _ = self.notify.send(stats.clone());
        self.file.write(&stats).await
    }

    /// Persistence failures are logged; counters stay in memory.
    async fn apply(&self, f: impl FnOnce(&mut UsageStats)) {
        let stats = {
            let mut stats = self.stats.write().await;
            f(&mut stats);
            stats.clone()
        };
        debug!(api_calls = stats.api_calls, errors = stats.error_count, "Stats updated");
        let _ = self.notify.send(stats.clone());

        if let Err(e) = self.file.write(&stats).await {
            warn!(error = %e, "Failed to persist usage stats");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_counts_persist() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("stats.json");

        let store = StatsStore::load(path.clone()).await;
        let mut rx = store.subscribe();

        store.record_success(3).await;
        store.record_success(0).await;
        store.record_error().await;

        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().api_calls, 3);

        let reloaded = StatsStore::load(path).await.get().await;
        assert_eq!(reloaded.api_calls, 3);
        assert_eq!(reloaded.record_count, 3);
        assert_eq!(reloaded.error_count, 1);
        assert!(reloaded.last_sync.is_some());
    }

    #[tokio::test]
    async fn test_reset() {
        let dir = TempDir::new().unwrap();
        let store = StatsStore::new(dir.path().join("stats.json"));
        store.record_success(10).await;
        store.reset().await.unwrap();
        assert_eq!(store.get().await, UsageStats::default());
    }
}
