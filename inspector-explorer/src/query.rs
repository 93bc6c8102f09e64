//! Ad-hoc API queries.

use inspector_core::{HttpMethod, SavedQuery};
use inspector_fetch::CallOptions;
use serde::Serialize;
use serde_json::Value;

use crate::error::ExplorerError;

/// A query as entered in the explorer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Endpoint, relative to the API base or absolute.
    pub endpoint: String,
    /// JSON object of parameters, or a raw query string.
    pub query_params: String,
    /// JSON body text. Ignored for methods without a body.
    pub request_body: String,
}

impl QueryRequest {
    /// GET query for `endpoint`.
    pub fn get(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    /// Endpoint with the query parameters appended.
    pub fn url(&self) -> String {
        append_query(&self.endpoint, &self.query_params)
    }

    /// Parsed request body.
    ///
    /// # Errors
    ///
    /// Returns [`ExplorerError::InvalidBody`] if a body is required and is
    /// not valid JSON.
    pub fn body(&self) -> Result<Option<Value>, ExplorerError> {
        let text = self.request_body.trim();
        if !self.method.allows_body() || text.is_empty() {
            return Ok(None);
        }
        serde_json::from_str(text)
            .map(Some)
            .map_err(|e| ExplorerError::InvalidBody(e.to_string()))
    }

    /// Gateway options for this query.
    ///
    /// # Errors
    ///
    /// Returns [`ExplorerError::InvalidBody`] for an invalid body.
    pub fn call_options(&self) -> Result<CallOptions, ExplorerError> {
        let mut options = CallOptions::with_method(self.method);
        options.body = self.body()?;
        Ok(options)
    }

    /// Stores this query under `name`.
    pub fn to_saved(&self, name: impl Into<String>) -> SavedQuery {
        SavedQuery::new(
            name,
            self.method,
            self.endpoint.clone(),
            self.query_params.clone(),
            self.request_body.clone(),
        )
    }
}

impl From<&SavedQuery> for QueryRequest {
    fn from(saved: &SavedQuery) -> Self {
        Self {
            method: saved.method,
            endpoint: saved.endpoint.clone(),
            query_params: saved.query_params.clone(),
            request_body: saved.request_body.clone(),
        }
    }
}

/// Outcome of an executed query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    /// Final URL or endpoint sent to the gateway.
    pub url: String,
    /// Response body.
    pub data: Value,
    /// Wall time in milliseconds.
    pub elapsed_ms: u64,
}

/// Appends query parameters to an endpoint.
///
/// A JSON object is form-encoded (non-string values as JSON text); any other
/// text is appended verbatim. The separator is `&` if the endpoint already
/// has a query, `?` otherwise.
pub fn append_query(endpoint: &str, params: &str) -> String {
    let params = params.trim();
    if params.is_empty() {
        return endpoint.to_string();
    }

    let encoded = match serde_json::from_str::<Value>(params) {
        Ok(Value::Object(map)) => {
            let mut query = url::form_urlencoded::Serializer::new(String::new());
            for (key, value) in &map {
                match value {
                    Value::String(s) => query.append_pair(key, s),
                    other => query.append_pair(key, &other.to_string()),
                };
            }
            query.finish()
        }
        _ => params.to_string(),
    };

    let separator = if endpoint.contains('?') { '&' } else { '?' };
    format!("{endpoint}{separator}{encoded}")
}
