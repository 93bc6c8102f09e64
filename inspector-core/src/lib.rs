// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `Inspector` Core
//!
//! Core types and pure logic shared by every `Inspector` crate.
//!
//! - Domain models (credentials, observed calls, saved queries, statistics)
//! - The URL classifier that maps platform page URLs to an object type and
//!   record id
//! - Error types
//!
//! ## Key Types
//!
//! ### Auth
//! - [`Credential`] - Cached bearer token with its effective expiry
//!
//! ### Pages
//! - [`UrlClassification`] - Object type and record id derived from a URL
//! - [`PlatformArea`] - Product module a URL belongs to
//! - [`PageMetadata`] - Snapshot of the page being inspected
//!
//! ### Network
//! - [`ApiCallRecord`] - A request observed by the network tap
//! - [`CallStatus`] - Pending, HTTP status, or transport error
//! - [`TapEvent`] - Events broadcast by the network tap
//!
//! ### Explorer
//! - [`SavedQuery`] - A stored API explorer request
//! - [`HttpMethod`] - Request method accepted by the explorer
//! - [`UsageStats`] - Call counters shown in status output

pub mod classifier;
pub mod error;
pub mod models;

pub use classifier::{classify, classify_segments, pascal_case, path_segments};
pub use error::CoreError;

pub use models::{
    // Auth
    Credential,
    // Pages
    PageChange,
    PageMetadata,
    PlatformArea,
    UrlClassification,
    // Network
    ApiCallRecord,
    CallStatus,
    TapEvent,
    // Explorer
    HttpMethod,
    SavedQuery,
    UsageStats,
};
