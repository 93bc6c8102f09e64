//! Domain models for Inspector.
//!
//! ## Submodules
//!
//! - [`credential`] - Bearer credential with safety-margined expiry
//! - [`page`] - URL classification and page metadata
//! - [`call`] - Observed API calls and network tap events
//! - [`query`] - Saved explorer queries, HTTP methods and usage counters

mod call;
mod credential;
mod page;
mod query;

pub use call::{ApiCallRecord, CallStatus, TapEvent};
pub use credential::Credential;
pub use page::{PageChange, PageMetadata, PlatformArea, UrlClassification};
pub use query::{HttpMethod, SavedQuery, UsageStats};
#[cfg(test)]
mod serde_tests;
