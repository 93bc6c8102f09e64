//! File-backed access token cache.
//!
//! Lets the CLI reuse a token across invocations without touching the
//! keychain. The file holds only the bearer token and its expiry.

use async_trait::async_trait;
use inspector_core::Credential;
use inspector_fetch::{CredentialStore, CredentialStoreError};
use std::path::{Path, PathBuf};

use crate::error::StoreError;
use crate::persistence::{default_token_cache_path, Access, JsonFile};

/// [`CredentialStore`] persisting to a JSON file with owner-only permissions.
#[derive(Debug, Clone)]
pub struct TokenCache {
    file: JsonFile,
}

impl TokenCache {
    /// Creates a cache at `path`.
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: JsonFile::new(path, Access::Private),
        }
    }

    /// Creates a cache at the default path.
    pub fn at_default_path() -> Self {
        Self::new(default_token_cache_path())
    }

    /// Path of the cache file.
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

impl From<StoreError> for CredentialStoreError {
    fn from(err: StoreError) -> Self {
        CredentialStoreError(err.to_string())
    }
}

#[async_trait]
impl CredentialStore for TokenCache {
    async fn load(&self) -> Result<Option<Credential>, CredentialStoreError> {
        Ok(self.file.read().await?)
    }

    async fn save(&self, credential: &Credential) -> Result<(), CredentialStoreError> {
        self.file.write(credential).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), CredentialStoreError> {
        self.file.remove().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_roundtrip() {
        let dir = TempDir::new().unwrap();
        let cache = TokenCache::new(dir.path().join("token.json"));

        assert!(cache.load().await.unwrap().is_none());

        let credential = Credential::from_lifetime("tok", 3600, Utc::now()).unwrap();
        cache.save(&credential).await.unwrap();
        assert_eq!(cache.load().await.unwrap(), Some(credential));

        cache.clear().await.unwrap();
        assert!(cache.load().await.unwrap().is_none());
        cache.clear().await.unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_owner_only_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let cache = TokenCache::new(dir.path().join("token.json"));
        cache
            .save(&Credential::from_lifetime("tok", 60, Utc::now()).unwrap())
            .await
            .unwrap();

        let mode = std::fs::metadata(cache.path()).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("token.json");
        tokio::fs::write(&path, "garbage").await.unwrap();
        assert!(TokenCache::new(path).load().await.is_err());
    }
}
