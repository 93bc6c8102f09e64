//! Host APIs for Inspector.
//!
//! - [`http`] - HTTP transport and request helpers
//! - [`keychain`] - Secure credential storage (system keychain)

pub mod http;
pub mod keychain;

// Re-export key types
pub use http::{HttpClient, Transport};
pub use keychain::{KeychainApi, KeychainCredentialStore, SystemKeychain};
