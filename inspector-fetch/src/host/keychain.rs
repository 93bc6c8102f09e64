//! Secure credential storage using the system keychain.
//!
//! - macOS: Keychain Services
//! - Windows: Credential Manager
//! - Linux: Secret Service (GNOME Keyring, KDE Wallet)
//!
//! Holds the OAuth client secret, and optionally the cached access token via
//! [`KeychainCredentialStore`].

use std::sync::Arc;

use async_trait::async_trait;
use inspector_core::Credential;
use keyring::Entry;
use tracing::{debug, warn};

use crate::auth::CredentialStore;
use crate::error::{CredentialStoreError, KeychainError};

/// Service name prefix for `Inspector` credentials.
const SERVICE_PREFIX: &str = "inspector";

// ============================================================================
// Keychain API Trait
// ============================================================================

/// API for secure credential storage.
#[async_trait]
pub trait KeychainApi: Send + Sync {
    /// Get a secret.
    ///
    /// # Returns
    /// * `Ok(Some(secret))` - Secret found
    /// * `Ok(None)` - Secret not found
    /// * `Err(e)` - Error accessing keychain
    async fn get(&self, service: &str, account: &str) -> Result<Option<String>, KeychainError>;

    /// Store a secret, replacing any existing one.
    async fn set(&self, service: &str, account: &str, secret: &str) -> Result<(), KeychainError>;

    /// Delete a secret. Deleting a missing entry succeeds.
    async fn delete(&self, service: &str, account: &str) -> Result<(), KeychainError>;

    /// Check if a secret exists.
    async fn exists(&self, service: &str, account: &str) -> bool {
        matches!(self.get(service, account).await, Ok(Some(_)))
    }
}

// ============================================================================
// System Keychain Implementation
// ============================================================================

/// Default implementation backed by the `keyring` crate.
#[derive(Debug, Clone, Default)]
pub struct SystemKeychain;

impl SystemKeychain {
    /// Creates a new system keychain instance.
    pub fn new() -> Self {
        Self
    }

    /// Builds the full service name with prefix.
    fn full_service(service: &str) -> String {
        format!("{SERVICE_PREFIX}:{service}")
    }

    fn entry(service: &str, account: &str) -> Result<Entry, KeychainError> {
        let full_service = Self::full_service(service);
        Entry::new(&full_service, account).map_err(|e| KeychainError::Platform(e.to_string()))
    }
}

#[async_trait]
impl KeychainApi for SystemKeychain {
    async fn get(&self, service: &str, account: &str) -> Result<Option<String>, KeychainError> {
        debug!(service = %service, account = %account, "Getting secret from keychain");

        match Self::entry(service, account)?.get_password() {
            Ok(secret) if !secret.is_empty() => Ok(Some(secret)),
            Ok(_) | Err(keyring::Error::NoEntry) => {
                debug!(service = %service, account = %account, "Secret not found");
                Ok(None)
            }
            Err(e) => {
                warn!(service = %service, account = %account, error = %e, "Failed to get secret");
                Err(e.into())
            }
        }
    }

    async fn set(&self, service: &str, account: &str, secret: &str) -> Result<(), KeychainError> {
        debug!(service = %service, account = %account, "Setting secret in keychain");

        Self::entry(service, account)?
            .set_password(secret)
            .map_err(|e| {
                warn!(service = %service, account = %account, error = %e, "Failed to set secret");
                KeychainError::from(e)
            })
    }

    async fn delete(&self, service: &str, account: &str) -> Result<(), KeychainError> {
        debug!(service = %service, account = %account, "Deleting secret from keychain");

        match Self::entry(service, account)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => {
                warn!(service = %service, account = %account, error = %e, "Failed to delete secret");
                Err(e.into())
            }
        }
    }
}

// ============================================================================
// Keychain-backed Credential Store
// ============================================================================

/// Persists the broker's credential as JSON in the keychain.
pub struct KeychainCredentialStore {
    keychain: Arc<dyn KeychainApi>,
}

impl KeychainCredentialStore {
    /// Creates a store over the given keychain.
    pub fn new(keychain: Arc<dyn KeychainApi>) -> Self {
        Self { keychain }
    }
}

#[async_trait]
impl CredentialStore for KeychainCredentialStore {
    async fn load(&self) -> Result<Option<Credential>, CredentialStoreError> {
        let Some(raw) = self.keychain.get(services::PLATFORM, accounts::ACCESS_TOKEN).await? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| KeychainError::InvalidEntry(e.to_string()).into())
    }

    async fn save(&self, credential: &Credential) -> Result<(), CredentialStoreError> {
        let raw = serde_json::to_string(credential)
            .map_err(|e| CredentialStoreError(e.to_string()))?;
        self.keychain
            .set(services::PLATFORM, accounts::ACCESS_TOKEN, &raw)
            .await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), CredentialStoreError> {
        self.keychain
            .delete(services::PLATFORM, accounts::ACCESS_TOKEN)
            .await?;
        Ok(())
    }
}

// ============================================================================
// Common Credential Keys
// ============================================================================

/// Service names.
pub mod services {
    /// The Conga platform.
    pub const PLATFORM: &str = "conga";
}

/// Account names.
pub mod accounts {
    /// OAuth client secret.
    pub const CLIENT_SECRET: &str = "client_secret";
    /// Cached access token (JSON encoded credential).
    pub const ACCESS_TOKEN: &str = "access_token";
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::collections::HashMap;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct MemoryKeychain {
        entries: Mutex<HashMap<(String, String), String>>,
    }

    #[async_trait]
    impl KeychainApi for MemoryKeychain {
        async fn get(&self, service: &str, account: &str) -> Result<Option<String>, KeychainError> {
            let key = (service.to_string(), account.to_string());
            Ok(self.entries.lock().await.get(&key).cloned())
        }

        async fn set(&self, service: &str, account: &str, secret: &str) -> Result<(), KeychainError> {
            let key = (service.to_string(), account.to_string());
            self.entries.lock().await.insert(key, secret.to_string());
            Ok(())
        }

        async fn delete(&self, service: &str, account: &str) -> Result<(), KeychainError> {
            let key = (service.to_string(), account.to_string());
            self.entries.lock().await.remove(&key);
            Ok(())
        }
    }

    #[test]
    fn test_full_service_name() {
        assert_eq!(SystemKeychain::full_service("conga"), "inspector:conga");
    }

    #[tokio::test]
    async fn test_credential_store_roundtrip() {
        let keychain = Arc::new(MemoryKeychain::default());
        let store = KeychainCredentialStore::new(keychain.clone());

        assert!(store.load().await.unwrap().is_none());

        let cred = Credential::from_lifetime("tok", 3600, Utc::now()).unwrap();
        store.save(&cred).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(cred));
        assert!(keychain.exists(services::PLATFORM, accounts::ACCESS_TOKEN).await);

        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_an_error() {
        let keychain = Arc::new(MemoryKeychain::default());
        keychain
            .set(services::PLATFORM, accounts::ACCESS_TOKEN, "not json")
            .await
            .unwrap();
        let store = KeychainCredentialStore::new(keychain);
        assert!(store.load().await.is_err());
    }
}
