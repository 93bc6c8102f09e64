//! Client secret lookup and storage.
//!
//! The secret is resolved in order:
//!
//! 1. `INSPECTOR_CLIENT_SECRET` environment variable
//! 2. System keychain (`inspector:conga` / `client_secret`)
//!
//! ## Usage
//!
//! ```ignore
//! use inspector_store::keychain;
//! use inspector_fetch::SystemKeychain;
//!
//! let keychain = SystemKeychain::new();
//! keychain::store_client_secret(&keychain, "s3cret").await?;
//!
//! if let Some(secret) = keychain::resolve_client_secret(&keychain).await {
//!     println!("Secret configured");
//! }
//! ```

use inspector_fetch::host::keychain::{accounts, services};
use inspector_fetch::{KeychainApi, KeychainError};
use tracing::{debug, warn};

/// Environment variable overriding the stored client secret.
pub const CLIENT_SECRET_ENV: &str = "INSPECTOR_CLIENT_SECRET";

/// Where a resolved secret came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretSource {
    /// Environment variable.
    Environment,
    /// System keychain.
    Keychain,
}

impl std::fmt::Display for SecretSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecretSource::Environment => write!(f, "environment ({CLIENT_SECRET_ENV})"),
            SecretSource::Keychain => write!(f, "keychain"),
        }
    }
}

/// Resolves the client secret, returning it with its source.
pub async fn resolve_client_secret_with_source(
    keychain: &dyn KeychainApi,
) -> Option<(String, SecretSource)> {
    if let Some(secret) = secret_from_env(std::env::var(CLIENT_SECRET_ENV).ok()) {
        debug!("Client secret from environment");
        return Some((secret, SecretSource::Environment));
    }

    match keychain.get(services::PLATFORM, accounts::CLIENT_SECRET).await {
        Ok(Some(secret)) => {
            debug!("Client secret from keychain");
            Some((secret, SecretSource::Keychain))
        }
        Ok(None) => None,
        Err(e) => {
            warn!(error = %e, "Failed to read client secret from keychain");
            None
        }
    }
}

/// Resolves the client secret.
pub async fn resolve_client_secret(keychain: &dyn KeychainApi) -> Option<String> {
    resolve_client_secret_with_source(keychain)
        .await
        .map(|(secret, _)| secret)
}

/// Stores the client secret in the keychain.
///
/// # Errors
///
/// Returns an error if the keychain operation fails.
pub async fn store_client_secret(
    keychain: &dyn KeychainApi,
    secret: &str,
) -> Result<(), KeychainError> {
    keychain
        .set(services::PLATFORM, accounts::CLIENT_SECRET, secret)
        .await?;
    debug!("Client secret stored in keychain");
    Ok(())
}

/// Deletes the client secret from the keychain.
///
/// # Errors
///
/// Returns an error if the deletion fails (a missing entry is fine).
pub async fn delete_client_secret(keychain: &dyn KeychainApi) -> Result<(), KeychainError> {
    keychain
        .delete(services::PLATFORM, accounts::CLIENT_SECRET)
        .await
}

fn secret_from_env(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
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
    fn test_env_value_trimmed() {
        assert_eq!(secret_from_env(Some("  abc \n".into())), Some("abc".into()));
        assert_eq!(secret_from_env(Some("   ".into())), None);
        assert_eq!(secret_from_env(None), None);
    }

    #[tokio::test]
    async fn test_keychain_store_and_delete() {
        let keychain = MemoryKeychain::default();
        store_client_secret(&keychain, "s3cret").await.unwrap();
        assert_eq!(
            keychain
                .get(services::PLATFORM, accounts::CLIENT_SECRET)
                .await
                .unwrap()
                .as_deref(),
            Some("s3cret")
        );

        delete_client_secret(&keychain).await.unwrap();
        assert!(!keychain.exists(services::PLATFORM, accounts::CLIENT_SECRET).await);
    }
}
