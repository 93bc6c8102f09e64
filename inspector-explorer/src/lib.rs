// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

//! # Inspector Explorer
//!
//! Front-end facing services built on the fetch and store crates.
//!
//! - [`backend::Backend`] - Typed backend operations and the JSON message contract
//! - [`explorer::Explorer`] - Query runner, metadata and data browsers, record view
//! - [`record`] - Record location and export files
//! - [`catalog::ApiCatalog`] - Endpoints listed by the OpenAPI document
//!
//! ## Example
//!
//! ```ignore
//! use inspector_explorer::{Backend, DataQuery, Explorer};
//!
//! let backend = Arc::new(Backend::new(ctx.gateway.clone(), platform_domain));
//! let explorer = Explorer::new(backend, queries).with_default_limit(100);
//!
//! let rows = explorer.browse(&DataQuery::new("Account").limit(10)).await?;
//! ```

pub mod backend;
pub mod browser;
pub mod catalog;
pub mod error;
pub mod explorer;
pub mod metadata;
pub mod query;
pub mod record;

pub use error::ExplorerError;

pub use backend::{record_count, ApiCallOptions, Backend, BackendConfig, Request, Response};
pub use browser::{cell, columns, extract_records, records_to_csv, DataQuery, ALL_FIELDS};
pub use catalog::{ApiCatalog, CatalogEndpoint, SWAGGER_ENDPOINT};
pub use explorer::{Explorer, RecordView, DEFAULT_LIMIT};
pub use metadata::{filter_objects, FieldInfo, ObjectDescription, ObjectSummary};
pub use query::{append_query, QueryRequest, QueryResult};
pub use record::{
    export_file_name, extract_record_id, locate_record, render_record, write_export,
    ExportOptions, RecordLocation,
};
