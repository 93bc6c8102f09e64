//! JSON files under the Inspector config and cache directories.
//!
//! Each store owns one [`JsonFile`]. Writes go to a sibling `.json.tmp` file
//! that is renamed over the target, so readers never see a partial document.
//! [`Access::Private`] files are created `0600` inside a `0700` directory on
//! Unix; [`Access::Shared`] files keep the process umask.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::error::StoreError;

#[cfg(target_os = "macos")]
const APP_DIR: &str = "Inspector";
#[cfg(not(target_os = "macos"))]
const APP_DIR: &str = "inspector";

// ============================================================================
// Default Paths
// ============================================================================

fn app_dir(base: Option<PathBuf>) -> PathBuf {
    base.map_or_else(|| PathBuf::from("."), |base| base.join(APP_DIR))
}

/// Directory for settings, saved queries and stats.
///
/// `~/Library/Application Support/Inspector` on macOS, `~/.config/inspector`
/// on Linux.
pub fn default_config_dir() -> PathBuf {
    app_dir(dirs::config_dir())
}

/// Directory for the token cache.
pub fn default_cache_dir() -> PathBuf {
    app_dir(dirs::cache_dir())
}

/// `settings.json` in the config dir.
pub fn default_settings_path() -> PathBuf {
    default_config_dir().join("settings.json")
}

/// `queries.json` in the config dir.
pub fn default_queries_path() -> PathBuf {
    default_config_dir().join("queries.json")
}

/// `stats.json` in the config dir.
pub fn default_stats_path() -> PathBuf {
    default_config_dir().join("stats.json")
}

/// `token.json` in the cache dir.
pub fn default_token_cache_path() -> PathBuf {
    default_cache_dir().join("token.json")
}

// ============================================================================
// JSON File
// ============================================================================

/// Who may read a stored file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Saved queries and usage stats.
    Shared,
    /// Bearer tokens, and settings (custom headers may carry credentials).
    Private,
}

/// A JSON document at a fixed path.
#[derive(Debug, Clone)]
pub struct JsonFile {
    path: PathBuf,
    access: Access,
}

impl JsonFile {
    /// Creates a handle; nothing is touched on disk.
    pub fn new(path: impl Into<PathBuf>, access: Access) -> Self {
        Self {
            path: path.into(),
            access,
        }
    }

    /// Location of the document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Permission class used when writing.
    pub fn access(&self) -> Access {
        self.access
    }

    /// Reads and parses the document. A missing file is `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed.
    pub async fn read<T: DeserializeOwned>(&self) -> Result<Option<T>, StoreError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&content)?))
    }

    /// Reads the document, falling back to `T::default()`.
    ///
    /// An unreadable or corrupt file is logged and treated as absent.
    pub async fn read_or_default<T: DeserializeOwned + Default>(&self) -> T {
        match self.read().await {
            Ok(data) => data.unwrap_or_default(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Unreadable file, using defaults");
                T::default()
            }
        }
    }

    /// Replaces the document with `data`.
    ///
    /// # Errors
    ///
    /// Returns error if serialization or any filesystem step fails. The
    /// previous document is left in place on failure.
    pub async fn write<T: Serialize + ?Sized>(&self, data: &T) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(data)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            self.create_dir(parent).await?;
        }

        let temp = self.path.with_extension("json.tmp");
        remove_if_exists(&temp).await?;

        let mut options = OpenOptions::new();
        options.write(true).create_new(true);
        restrict_file(&mut options, self.access);

        let mut file = options.open(&temp).await?;
        file.write_all(&json).await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&temp, &self.path).await?;
        debug!(path = %self.path.display(), bytes = json.len(), "Wrote JSON file");
        Ok(())
    }

    /// Deletes the document. A missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns error if the file exists and cannot be removed.
    pub async fn remove(&self) -> Result<(), StoreError> {
        if remove_if_exists(&self.path).await? {
            debug!(path = %self.path.display(), "Removed JSON file");
        }
        Ok(())
    }

    async fn create_dir(&self, dir: &Path) -> Result<(), StoreError> {
        if tokio::fs::try_exists(dir).await? {
            return Ok(());
        }
        tokio::fs::create_dir_all(dir).await?;
        restrict_dir(dir, self.access).await?;
        debug!(path = %dir.display(), access = ?self.access, "Created directory");
        Ok(())
    }
}

/// Returns whether a file was removed.
async fn remove_if_exists(path: &Path) -> Result<bool, StoreError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

#[cfg(unix)]
fn restrict_file(options: &mut OpenOptions, access: Access) {
    if access == Access::Private {
        options.mode(0o600);
    }
}

#[cfg(not(unix))]
fn restrict_file(_options: &mut OpenOptions, _access: Access) {}

#[cfg(unix)]
async fn restrict_dir(dir: &Path, access: Access) -> Result<(), StoreError> {
    use std::os::unix::fs::PermissionsExt;

    if access == Access::Private {
        tokio::fs::set_permissions(dir, std::fs::Permissions::from_mode(0o700)).await?;
    }
    Ok(())
}

#[cfg(not(unix))]
async fn restrict_dir(_dir: &Path, _access: Access) -> Result<(), StoreError> {
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
