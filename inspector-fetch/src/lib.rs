// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Inspector Fetch
//!
//! Network services for talking to the Conga platform.
//!
//! ## Host APIs
//!
//! The [`host`] module provides abstractions for system interactions:
//!
//! - [`host::http`] - The [`Transport`] seam and its reqwest implementation
//! - [`host::keychain`] - Secure credential storage (system keychain)
//!
//! ## Services
//!
//! - [`auth::TokenBroker`] - Client-credentials token cache
//! - [`gateway::ApiGateway`] - Authenticated JSON calls
//! - [`tap::NetworkTap`] - Transport decorator recording platform calls
//! - [`context::FetchContext`] - Wires the above together
//!
//! ## Example
//!
//! ```ignore
//! use inspector_fetch::{AuthConfig, CallOptions, FetchContext};
//!
//! let auth = AuthConfig::new(token_url, client_id, client_secret);
//! let ctx = FetchContext::builder(auth)
//!     .api_base_url("https://rls-preview.congacloud.eu/api/data")
//!     .build()?;
//!
//! let objects = ctx.gateway.call("/objects", CallOptions::get()).await?;
//! ```

pub mod auth;
pub mod context;
pub mod error;
pub mod gateway;
pub mod host;
pub mod tap;

// Errors
pub use error::{ApiError, AuthError, CredentialStoreError, HttpError, KeychainError};

// Host APIs
pub use host::{
    http::{HttpClient, Transport},
    keychain::{KeychainApi, KeychainCredentialStore, SystemKeychain},
};

// Services
pub use auth::{AuthConfig, CredentialStore, TokenBroker};
pub use context::{FetchContext, FetchContextBuilder, FetchSettings};
pub use gateway::{to_reqwest_method, ApiGateway, CallOptions};
pub use tap::{NetworkTap, TapFilter};
