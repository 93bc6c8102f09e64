//! Backend service shared by every front end.
//!
//! [`Backend`] exposes typed operations (`get_token`, `api_call`,
//! `get_config`). The [`Request`]/[`Response`] pair carries the same
//! operations as JSON messages:
//!
//! ```text
//! {"action": "getToken"}                      -> {"success": true, "token": "..."}
//! {"action": "apiCall", "endpoint": "/objects",
//!  "options": {"method": "GET"}}              -> {"success": true, "data": ...}
//! {"action": "getConfig"}                     -> {"success": true, "config": {...}}
//! anything else                               -> {"success": false, "error": "..."}
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use inspector_core::HttpMethod;
use inspector_fetch::{ApiError, ApiGateway, AuthError, CallOptions};
use inspector_store::StatsStore;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::browser::extract_records;

// ============================================================================
// Messages
// ============================================================================

/// Connection details visible to front ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Data API base URL.
    #[serde(rename = "API_BASE_URL")]
    pub api_base_url: String,
    /// Platform web origin.
    #[serde(rename = "PLATFORM_DOMAIN")]
    pub platform_domain: String,
}

/// Options carried by an `apiCall` message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiCallOptions {
    /// HTTP method.
    pub method: HttpMethod,
    /// Extra headers.
    pub headers: BTreeMap<String, String>,
    /// JSON body. A string holding JSON text is sent as that JSON.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl From<ApiCallOptions> for CallOptions {
    fn from(options: ApiCallOptions) -> Self {
        let mut call = CallOptions::with_method(options.method);
        call.headers = options.headers.into_iter().collect();
        call.body = options.body.map(|body| match body {
            Value::String(text) => serde_json::from_str(&text).unwrap_or(Value::String(text)),
            other => other,
        });
        call
    }
}

/// Backend request message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    /// Obtain a bearer token.
    GetToken,
    /// Call the data API.
    ApiCall {
        /// Endpoint relative to the API base, or an absolute URL.
        endpoint: String,
        /// Call options.
        #[serde(default)]
        options: ApiCallOptions,
    },
    /// Read connection details.
    GetConfig,
}

/// Backend response message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Whether the operation succeeded.
    pub success: bool,
    /// API call result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Bearer token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Connection details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<BackendConfig>,
    /// Failure message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Response {
    fn empty(success: bool) -> Self {
        Self {
            success,
            data: None,
            token: None,
            config: None,
            error: None,
        }
    }

    /// Successful API call.
    pub fn data(data: Value) -> Self {
        Self {
            data: Some(data),
            ..Self::empty(true)
        }
    }

    /// Successful token request.
    pub fn token(token: String) -> Self {
        Self {
            token: Some(token),
            ..Self::empty(true)
        }
    }

    /// Successful config request.
    pub fn config(config: BackendConfig) -> Self {
        Self {
            config: Some(config),
            ..Self::empty(true)
        }
    }

    /// Failed request.
    pub fn failure(error: impl ToString) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::empty(false)
        }
    }
}

// ============================================================================
// Backend
// ============================================================================

/// Typed backend over the gateway.
pub struct Backend {
    gateway: Arc<ApiGateway>,
    config: BackendConfig,
    stats: Option<Arc<StatsStore>>,
    default_headers: Vec<(String, String)>,
}

impl Backend {
    /// Creates a backend.
    pub fn new(gateway: Arc<ApiGateway>, platform_domain: impl Into<String>) -> Self {
        let config = BackendConfig {
            api_base_url: gateway.base_url().to_string(),
            platform_domain: platform_domain.into(),
        };
        Self {
            gateway,
            config,
            stats: None,
            default_headers: Vec::new(),
        }
    }

    /// Records usage statistics for every API call.
    pub fn with_stats(mut self, stats: Arc<StatsStore>) -> Self {
        self.stats = Some(stats);
        self
    }

    /// Headers sent with every API call. Per-call headers take precedence.
    pub fn with_default_headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.default_headers = headers;
        self
    }

    /// The underlying gateway.
    pub fn gateway(&self) -> &Arc<ApiGateway> {
        &self.gateway
    }

    /// Returns a valid bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] if the token exchange fails.
    pub async fn get_token(&self) -> Result<String, AuthError> {
        self.gateway.broker().get_token().await
    }

    /// Calls the data API and records usage statistics.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the call fails.
    #[instrument(skip(self, options))]
    pub async fn api_call(&self, endpoint: &str, mut options: CallOptions) -> Result<Value, ApiError> {
        if !self.default_headers.is_empty() {
            let mut headers = self.default_headers.clone();
            headers.append(&mut options.headers);
            options.headers = headers;
        }

        let result = self.gateway.call(endpoint, options).await;

        if let Some(stats) = &self.stats {
            match &result {
                Ok(data) => stats.record_success(record_count(data)).await,
                Err(_) => stats.record_error().await,
            }
        }

        if let Err(e) = &result {
            warn!(error = %e, "API call failed");
        }
        result
    }

    /// Connection details.
    pub fn get_config(&self) -> BackendConfig {
        self.config.clone()
    }

    /// Dispatches a request message. Failures become `success: false`.
    pub async fn handle(&self, request: Request) -> Response {
        match request {
            Request::GetToken => match self.get_token().await {
                Ok(token) => Response::token(token),
                Err(e) => Response::failure(e),
            },
            Request::ApiCall { endpoint, options } => {
                match self.api_call(&endpoint, options.into()).await {
                    Ok(data) => Response::data(data),
                    Err(e) => Response::failure(e),
                }
            }
            Request::GetConfig => Response::config(self.get_config()),
        }
    }

    /// Parses and dispatches a raw JSON message.
    pub async fn handle_value(&self, message: Value) -> Response {
        match serde_json::from_value::<Request>(message) {
            Ok(request) => self.handle(request).await,
            Err(e) => {
                debug!(error = %e, "Unrecognised message");
                Response::failure("Unknown action")
            }
        }
    }
}

impl std::fmt::Debug for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backend")
            .field("config", &self.config)
            .field("stats", &self.stats.is_some())
            .finish_non_exhaustive()
    }
}

/// Number of records in a list result; zero for anything else.
pub fn record_count(data: &Value) -> usize {
    extract_records(data).len()
}

// ============================================================================
// Tests
// ============================================================================
