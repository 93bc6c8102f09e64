//! Explorer types: HTTP methods, saved queries and usage counters.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ============================================================================
// HTTP Method
// ============================================================================

/// Request method accepted by the API explorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// GET.
    #[default]
    Get,
    /// POST.
    Post,
    /// PUT.
    Put,
    /// PATCH.
    Patch,
    /// DELETE.
    Delete,
}

impl HttpMethod {
    /// Returns all methods.
    pub fn all() -> &'static [HttpMethod] {
        &[Self::Get, Self::Post, Self::Put, Self::Patch, Self::Delete]
    }

    /// Upper-case method name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }

    /// Returns true if the explorer sends a request body for this method.
    pub fn allows_body(&self) -> bool {
        matches!(self, Self::Post | Self::Put | Self::Patch)
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            _ => Err(CoreError::InvalidMethod(s.to_string())),
        }
    }
}

// ============================================================================
// Saved Query
// ============================================================================

/// An API explorer request stored for later reuse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedQuery {
    /// Millisecond timestamp taken at creation.
    pub id: i64,
    /// User-chosen name.
    pub name: String,
    /// HTTP method.
    pub method: HttpMethod,
    /// Endpoint, relative to the API base or absolute.
    pub endpoint: String,
    /// Query parameters, either a JSON object or a raw query string.
    #[serde(default)]
    pub query_params: String,
    /// JSON request body text.
    #[serde(default)]
    pub request_body: String,
    /// Creation time.
    pub timestamp: DateTime<Utc>,
}

impl SavedQuery {
    /// Creates a query stamped with the current time.
    pub fn new(
        name: impl Into<String>,
        method: HttpMethod,
        endpoint: impl Into<String>,
        query_params: impl Into<String>,
        request_body: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: now.timestamp_millis(),
            name: name.into(),
            method,
            endpoint: endpoint.into(),
            query_params: query_params.into(),
            request_body: request_body.into(),
            timestamp: now,
        }
    }
}

// ============================================================================
// Usage Stats
// ============================================================================

/// Counters for calls made through the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UsageStats {
    /// Calls attempted.
    pub api_calls: u64,
    /// Records returned by list calls.
    pub record_count: u64,
    /// Calls that failed.
    pub error_count: u64,
    /// Last successful call.
    pub last_sync: Option<DateTime<Utc>>,
}

impl UsageStats {
    /// Counts a successful call returning `records` records.
    pub fn record_success(&mut self, records: usize) {
        self.api_calls += 1;
        self.record_count += records as u64;
        self.last_sync = Some(Utc::now());
    }

    /// Counts a failed call.
    pub fn record_error(&mut self) {
        self.api_calls += 1;
        self.error_count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_parse_case_insensitive() {
        assert_eq!("patch".parse::<HttpMethod>().unwrap(), HttpMethod::Patch);
        assert_eq!("GET".parse::<HttpMethod>().unwrap(), HttpMethod::Get);
        assert!("TRACE".parse::<HttpMethod>().is_err());
    }

    #[test]
    fn test_body_methods() {
        let with_body: Vec<_> = HttpMethod::all()
            .iter()
            .filter(|m| m.allows_body())
            .collect();
        assert_eq!(with_body, vec![&HttpMethod::Post, &HttpMethod::Put, &HttpMethod::Patch]);
    }

    #[test]
    fn test_stats_counters() {
        let mut stats = UsageStats::default();
        stats.record_success(3);
        stats.record_error();
        assert_eq!(stats.api_calls, 2);
        assert_eq!(stats.record_count, 3);
        assert_eq!(stats.error_count, 1);
        assert!(stats.last_sync.is_some());
    }
}
