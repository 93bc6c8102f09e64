//! Authenticated JSON calls against the platform data API.

use std::sync::Arc;

use inspector_core::HttpMethod;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, Request};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::auth::TokenBroker;
use crate::error::{ApiError, HttpError};
use crate::host::http::{parse_url, ResponseExt, Transport};

// ============================================================================
// Call Options
// ============================================================================

/// Per-call request options.
#[derive(Debug, Clone)]
pub struct CallOptions {
    /// HTTP method.
    pub method: Method,
    /// Extra headers, applied after the defaults.
    pub headers: Vec<(String, String)>,
    /// Query pairs appended to the URL.
    pub query: Vec<(String, String)>,
    /// JSON request body.
    pub body: Option<Value>,
}

impl Default for CallOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: Vec::new(),
            query: Vec::new(),
            body: None,
        }
    }
}

impl CallOptions {
    /// GET with no extras.
    pub fn get() -> Self {
        Self::default()
    }

    /// Options for the given method.
    pub fn with_method(method: HttpMethod) -> Self {
        Self {
            method: to_reqwest_method(method),
            ..Self::default()
        }
    }

    /// Adds a header. Later values replace earlier ones with the same name.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Adds a query pair.
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Sets the JSON body.
    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Maps the explorer's method enum onto reqwest's.
pub fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}

// ============================================================================
// API Gateway
// ============================================================================

/// Issues bearer-authenticated calls relative to the data API base URL.
pub struct ApiGateway {
    base_url: String,
    broker: Arc<TokenBroker>,
    transport: Arc<dyn Transport>,
}

impl ApiGateway {
    /// Creates a gateway.
    pub fn new(
        base_url: impl Into<String>,
        broker: Arc<TokenBroker>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            broker,
            transport,
        }
    }

    /// Data API base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The broker supplying bearer tokens.
    pub fn broker(&self) -> &Arc<TokenBroker> {
        &self.broker
    }

    /// Absolute URLs pass through; anything else is appended to the base.
    pub fn resolve_url(&self, endpoint: &str) -> String {
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            endpoint.to_string()
        } else {
            format!("{}{}", self.base_url, endpoint)
        }
    }

    /// Performs a call and returns the parsed JSON body.
    ///
    /// A 2xx response with an empty body yields [`Value::Null`].
    ///
    /// # Errors
    ///
    /// - [`ApiError::Auth`] if no token could be obtained
    /// - [`ApiError::Status`] for non-2xx responses
    /// - [`ApiError::Transport`] if the request could not be completed
    /// - [`ApiError::Decode`] if a non-empty 2xx body is not JSON
    #[instrument(skip(self, options), fields(method = %options.method))]
    pub async fn call(&self, endpoint: &str, options: CallOptions) -> Result<Value, ApiError> {
        let token = self.broker.get_token().await?;
        let request = self.build_request(endpoint, &token, options)?;

        let response = self.transport.execute(request).await?;
        let status = response.status();

        if !status.is_success() {
            let status_text = response.status_text();
            warn!(status = status.as_u16(), %status_text, "API call failed");
            return Err(ApiError::Status {
                status: status.as_u16(),
                status_text,
            });
        }

        let bytes = response.bytes().await.map_err(HttpError::from)?;
        debug!(bytes = bytes.len(), "API call succeeded");

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn build_request(
        &self,
        endpoint: &str,
        token: &str,
        options: CallOptions,
    ) -> Result<Request, HttpError> {
        let mut url = parse_url(&self.resolve_url(endpoint))?;
        if !options.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&options.query);
        }

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, header_value(&format!("Bearer {token}"))?);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        for (name, value) in &options.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| HttpError::InvalidHeader(format!("{name}: {e}")))?;
            headers.insert(name, header_value(value)?);
        }

        let mut request = Request::new(options.method, url);
        *request.headers_mut() = headers;
        if let Some(body) = options.body {
            *request.body_mut() = Some(body.to_string().into());
        }
        Ok(request)
    }
}

fn header_value(value: &str) -> Result<HeaderValue, HttpError> {
    HeaderValue::from_str(value).map_err(|e| HttpError::InvalidHeader(e.to_string()))
}

impl std::fmt::Debug for ApiGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiGateway")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthConfig;
    use crate::host::http::HttpClient;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn gateway_for(server: &MockServer) -> ApiGateway {
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "tok",
                "expires_in": 3600,
            })))
            .mount(server)
            .await;

        let transport: Arc<dyn Transport> = Arc::new(HttpClient::new().unwrap());
        let config = AuthConfig::new(format!("{}/token", server.uri()), "id", "secret");
        let broker = Arc::new(TokenBroker::new(config, transport.clone()));
        ApiGateway::new(format!("{}/api/data", server.uri()), broker, transport)
    }

    #[tokio::test]
    async fn test_relative_endpoint_with_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/data/objects"))
            .and(header("authorization", "Bearer tok"))
            .and(header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"name": "Account"}])))
            .expect(1)
            .mount(&server)
            .await;

        let gateway = gateway_for(&server).await;
        let value = gateway.call("/objects", CallOptions::get()).await.unwrap();
        assert_eq!(value, json!([{"name": "Account"}]));
    }

    #[tokio::test]
    async fn test_absolute_url_passes_through() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/elsewhere"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .mount(&server)
            .await;

        let gateway = gateway_for(&server).await;
        let url = format!("{}/elsewhere", server.uri());
        assert_eq!(gateway.resolve_url(&url), url);
        let value = gateway.call(&url, CallOptions::get()).await.unwrap();
        assert_eq!(value["ok"], true);
    }

    #[tokio::test]
    async fn test_non_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/data/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let gateway = gateway_for(&server).await;
        let err = gateway.call("/missing", CallOptions::get()).await.unwrap_err();
        match err {
            ApiError::Status { status, status_text } => {
                assert_eq!(status, 404);
                assert_eq!(status_text, "Not Found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_caller_header_wins() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/data/Account"))
            .and(header("content-type", "application/vnd.custom+json"))
            .and(header("x-trace", "1"))
            .and(body_json(json!({"Name": "Acme"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"Id": "a1"})))
            .expect(1)
            .mount(&server)
            .await;

        let gateway = gateway_for(&server).await;
        let options = CallOptions::with_method(HttpMethod::Post)
            .header("Content-Type", "application/vnd.custom+json")
            .header("X-Trace", "1")
            .body(json!({"Name": "Acme"}));
        let value = gateway.call("/Account", options).await.unwrap();
        assert_eq!(value["Id"], "a1");
    }

    #[tokio::test]
    async fn test_query_pairs_and_empty_body() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/data/Account/a1"))
            .and(query_param("force", "true"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let gateway = gateway_for(&server).await;
        let options = CallOptions::with_method(HttpMethod::Delete).query("force", "true");
        assert_eq!(gateway.call("/Account/a1", options).await.unwrap(), Value::Null);
    }

    #[tokio::test]
    async fn test_invalid_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let gateway = gateway_for(&server).await;
        let err = gateway.call("/objects", CallOptions::get()).await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[tokio::test]
    async fn test_token_failure_is_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400))
            .mount(&server)
            .await;

        let transport: Arc<dyn Transport> = Arc::new(HttpClient::new().unwrap());
        let config = AuthConfig::new(format!("{}/token", server.uri()), "id", "secret");
        let broker = Arc::new(TokenBroker::new(config, transport.clone()));
        let gateway = ApiGateway::new(server.uri(), broker, transport);

        let err = gateway.call("/objects", CallOptions::get()).await.unwrap_err();
        assert!(err.is_auth());
    }
}
