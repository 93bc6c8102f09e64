//! Observed API calls and network tap events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::page::PageChange;
use crate::error::CoreError;

// ============================================================================
// Call Status
// ============================================================================

/// Lifecycle state of an observed call.
///
/// Serialized as `"pending"`, the numeric HTTP status, or `"error"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "StatusRepr", try_from = "StatusRepr")]
pub enum CallStatus {
    /// Request issued, no response yet.
    Pending,
    /// Response received with this HTTP status.
    Http(u16),
    /// Transport failure, no response.
    Error,
}

impl CallStatus {
    /// Returns true once the call has a response or failed.
    pub fn is_settled(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// HTTP status code, if a response was received.
    pub fn code(&self) -> Option<u16> {
        match self {
            Self::Http(code) => Some(*code),
            _ => None,
        }
    }
}

impl std::fmt::Display for CallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Http(code) => write!(f, "{code}"),
            Self::Error => write!(f, "error"),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum StatusRepr {
    Code(u16),
    Label(String),
}

impl From<CallStatus> for StatusRepr {
    fn from(status: CallStatus) -> Self {
        match status {
            CallStatus::Pending => Self::Label("pending".to_string()),
            CallStatus::Http(code) => Self::Code(code),
            CallStatus::Error => Self::Label("error".to_string()),
        }
    }
}

impl TryFrom<StatusRepr> for CallStatus {
    type Error = CoreError;

    fn try_from(repr: StatusRepr) -> Result<Self, CoreError> {
        match repr {
            StatusRepr::Code(code) => Ok(Self::Http(code)),
            StatusRepr::Label(label) => match label.as_str() {
                "pending" => Ok(Self::Pending),
                "error" => Ok(Self::Error),
                _ => Err(CoreError::InvalidStatus(label)),
            },
        }
    }
}

// ============================================================================
// Call Record
// ============================================================================

/// A platform request observed by the network tap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCallRecord {
    /// Sequential id, unique within a tap's lifetime.
    pub id: u64,
    /// HTTP method.
    pub method: String,
    /// Target URL.
    pub url: String,
    /// When the request was issued.
    pub timestamp: DateTime<Utc>,
    /// Current status.
    pub status: CallStatus,
    /// HTTP reason phrase, once a response arrived.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_text: Option<String>,
    /// Transport error message, if the call failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiCallRecord {
    /// Creates a pending record.
    pub fn pending(id: u64, method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id,
            method: method.into(),
            url: url.into(),
            timestamp: Utc::now(),
            status: CallStatus::Pending,
            status_text: None,
            error: None,
        }
    }
}

// ============================================================================
// Tap Events
// ============================================================================

/// Event broadcast by the network tap to anything rendering it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum TapEvent {
    /// A matching request was issued.
    CallStarted(ApiCallRecord),
    /// A matching request got a response (any HTTP status).
    CallSucceeded(ApiCallRecord),
    /// A matching request failed at the transport level.
    CallFailed(ApiCallRecord),
    /// The inspected page navigated to a new URL.
    PageChanged(PageChange),
    /// The tap was installed.
    Ready {
        /// Install time.
        timestamp: DateTime<Utc>,
    },
}

impl TapEvent {
    /// The call record carried by this event, if any.
    pub fn record(&self) -> Option<&ApiCallRecord> {
        match self {
            Self::CallStarted(r) | Self::CallSucceeded(r) | Self::CallFailed(r) => Some(r),
            Self::PageChanged(_) | Self::Ready { .. } => None,
        }
    }
}
