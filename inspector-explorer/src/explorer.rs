//! Explorer facade over the backend and the saved query store.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use inspector_core::SavedQuery;
use inspector_fetch::CallOptions;
use inspector_store::{QueryStore, StoreError};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::backend::Backend;
use crate::browser::{extract_records, DataQuery};
use crate::catalog::{ApiCatalog, SWAGGER_ENDPOINT};
use crate::error::ExplorerError;
use crate::metadata::{
    describe_endpoint, parse_description, parse_object_list, ObjectDescription, ObjectSummary,
    OBJECTS_ENDPOINT,
};
use crate::query::{QueryRequest, QueryResult};
use crate::record::{locate_record, write_export, ExportOptions, RecordLocation};

/// Default row limit for the data browser.
pub const DEFAULT_LIMIT: u32 = 100;

/// A fetched record and where it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordView {
    /// Resolved location.
    pub location: RecordLocation,
    /// Record body.
    pub data: Value,
}

/// Query runner, metadata browser, data browser and record viewer.
#[derive(Debug)]
pub struct Explorer {
    backend: Arc<Backend>,
    queries: Arc<QueryStore>,
    default_limit: u32,
}

impl Explorer {
    /// Creates an explorer.
    pub fn new(backend: Arc<Backend>, queries: Arc<QueryStore>) -> Self {
        Self {
            backend,
            queries,
            default_limit: DEFAULT_LIMIT,
        }
    }

    /// Sets the data browser row limit used when a query has none.
    pub fn with_default_limit(mut self, limit: u32) -> Self {
        self.default_limit = limit;
        self
    }

    /// The backend.
    pub fn backend(&self) -> &Arc<Backend> {
        &self.backend
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Runs an ad-hoc query.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid body or a failed call.
    #[instrument(skip(self, request), fields(method = %request.method, endpoint = %request.endpoint))]
    pub async fn execute(&self, request: &QueryRequest) -> Result<QueryResult, ExplorerError> {
        let options = request.call_options()?;
        let url = request.url();

        let started = Instant::now();
        let data = self.backend.api_call(&url, options).await?;
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        debug!(elapsed_ms, "Query completed");
        Ok(QueryResult {
            url,
            data,
            elapsed_ms,
        })
    }

    /// Saves a query under `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query list cannot be written.
    pub async fn save_query(
        &self,
        name: &str,
        request: &QueryRequest,
    ) -> Result<SavedQuery, ExplorerError> {
        Ok(self.queries.save(request.to_saved(name)).await?)
    }

    /// All saved queries, oldest first.
    pub async fn saved_queries(&self) -> Vec<SavedQuery> {
        self.queries.list().await
    }

    /// Looks up a saved query.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::QueryNotFound`] for an unknown id.
    pub async fn saved_query(&self, id: i64) -> Result<SavedQuery, ExplorerError> {
        self.queries
            .get(id)
            .await
            .ok_or_else(|| StoreError::QueryNotFound(id).into())
    }

    /// Runs a saved query.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown id or a failed call.
    pub async fn run_saved(&self, id: i64) -> Result<QueryResult, ExplorerError> {
        let saved = self.saved_query(id).await?;
        self.execute(&QueryRequest::from(&saved)).await
    }

    /// Deletes a saved query.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown id or a failed write.
    pub async fn delete_query(&self, id: i64) -> Result<(), ExplorerError> {
        Ok(self.queries.delete(id).await?)
    }

    // ------------------------------------------------------------------------
    // Metadata and data
    // ------------------------------------------------------------------------

    /// Lists platform objects.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails.
    pub async fn list_objects(&self) -> Result<Vec<ObjectSummary>, ExplorerError> {
        let data = self.backend.api_call(OBJECTS_ENDPOINT, CallOptions::get()).await?;
        Ok(parse_object_list(&data))
    }

    /// Describes one object.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails.
    pub async fn describe_object(&self, name: &str) -> Result<ObjectDescription, ExplorerError> {
        let data = self
            .backend
            .api_call(&describe_endpoint(name), CallOptions::get())
            .await?;
        Ok(parse_description(&data, name))
    }

    /// Fetches rows for the data browser.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails.
    pub async fn browse(&self, query: &DataQuery) -> Result<Vec<Value>, ExplorerError> {
        let endpoint = query.endpoint(self.default_limit);
        let data = self.backend.api_call(&endpoint, CallOptions::get()).await?;
        let records = extract_records(&data);
        debug!(object = %query.object, rows = records.len(), "Browsed data");
        Ok(records)
    }

    // ------------------------------------------------------------------------
    // Records
    // ------------------------------------------------------------------------

    /// Fetches the record shown by a page URL.
    ///
    /// # Errors
    ///
    /// Returns [`ExplorerError::MissingRecordId`] if the page shows no
    /// record, or an error if the call fails.
    pub async fn view_record(&self, url: &str) -> Result<RecordView, ExplorerError> {
        let location = locate_record(url)?;
        let data = self
            .backend
            .api_call(&location.endpoint, CallOptions::get())
            .await?;
        Ok(RecordView { location, data })
    }

    /// Fetches the record shown by a page URL and writes it into `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be fetched or written.
    pub async fn export_record(
        &self,
        url: &str,
        dir: &Path,
        options: ExportOptions,
    ) -> Result<PathBuf, ExplorerError> {
        let view = self.view_record(url).await?;
        write_export(dir, &view.location, &view.data, options).await
    }

    /// Fetches the API catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails.
    pub async fn catalog(&self) -> Result<ApiCatalog, ExplorerError> {
        let document = self
            .backend
            .api_call(SWAGGER_ENDPOINT, CallOptions::get())
            .await?;
        let catalog = ApiCatalog::parse(&document);
        info!(endpoints = catalog.endpoints.len(), "Loaded API catalog");
        Ok(catalog)
    }
}

// ============================================================================
// Tests
// ============================================================================
