//! HTTP transport.
//!
//! Every request the process issues goes through [`Transport`]. The network
//! tap wraps a transport to observe calls without changing them, so the
//! token broker and the API gateway never talk to reqwest directly.

use async_trait::async_trait;
use reqwest::{
    header::{HeaderValue, CONTENT_TYPE},
    Client, Method, Request, Response, Url,
};
use std::time::Duration;
use tracing::{debug, instrument};

use crate::error::HttpError;

/// Default request timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// User agent string for Inspector.
const USER_AGENT: &str = concat!("Inspector/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// Transport
// ============================================================================

/// Something that can send a fully built HTTP request.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends the request and returns the response, whatever its status.
    async fn execute(&self, request: Request) -> Result<Response, HttpError>;
}

// ============================================================================
// HTTP Client
// ============================================================================

/// reqwest-backed [`Transport`].
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client,
}

impl HttpClient {
    /// Creates a new HTTP client with default settings.
    pub fn new() -> Result<Self, HttpError> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Creates a new HTTP client with a custom timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, HttpError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self { inner: client })
    }

    /// Returns the inner reqwest client for advanced operations.
    pub fn inner(&self) -> &Client {
        &self.inner
    }
}

#[async_trait]
impl Transport for HttpClient {
    #[instrument(skip(self, request), fields(method = %request.method(), url = %request.url()))]
    async fn execute(&self, request: Request) -> Result<Response, HttpError> {
        debug!("Sending request");

        let response = self.inner.execute(request).await.map_err(|e| {
            if e.is_timeout() {
                HttpError::Timeout
            } else {
                HttpError::Request(e)
            }
        })?;

        debug!(status = %response.status(), "Response received");
        Ok(response)
    }
}

// ============================================================================
// Request Helpers
// ============================================================================

/// Parses an absolute URL.
pub fn parse_url(url: &str) -> Result<Url, HttpError> {
    Url::parse(url).map_err(|e| HttpError::InvalidUrl(format!("{url}: {e}")))
}

/// Builds a form-encoded POST request.
pub fn form_request(url: &str, fields: &[(&str, &str)]) -> Result<Request, HttpError> {
    let mut request = Request::new(Method::POST, parse_url(url)?);

    let body = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(fields)
        .finish();

    request.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("application/x-www-form-urlencoded"),
    );
    *request.body_mut() = Some(body.into());
    Ok(request)
}

// ============================================================================
// Response Extensions
// ============================================================================

/// Extension trait for Response handling.
pub trait ResponseExt {
    /// HTTP reason phrase for the status, or an empty string.
    fn status_text(&self) -> String;
}

impl ResponseExt for Response {
    fn status_text(&self) -> String {
        self.status()
            .canonical_reason()
            .unwrap_or_default()
            .to_string()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_request_encodes_fields() {
        let request = form_request(
            "https://login.example.com/token",
            &[("grant_type", "client_credentials"), ("scope", "data:read data:write")],
        )
        .unwrap();

        assert_eq!(request.method(), Method::POST);
        assert_eq!(
            request.headers()[CONTENT_TYPE],
            "application/x-www-form-urlencoded"
        );
        let body = request.body().and_then(|b| b.as_bytes()).unwrap();
        assert_eq!(
            std::str::from_utf8(body).unwrap(),
            "grant_type=client_credentials&scope=data%3Aread+data%3Awrite"
        );
    }

    #[test]
    fn test_invalid_url() {
        assert!(matches!(parse_url("not-a-valid-url"), Err(HttpError::InvalidUrl(_))));
        assert!(parse_url("https://rls-preview.congacloud.eu/api/data").is_ok());
    }

    #[test]
    fn test_client_builds() {
        assert!(HttpClient::new().is_ok());
    }
}
