//! Serde tests for core types.
//!
//! These check the JSON shapes other tools and persisted files rely on.

use chrono::Utc;
use serde_json::json;

use crate::{
    ApiCallRecord, CallStatus, Credential, HttpMethod, PageChange, PlatformArea, SavedQuery,
    TapEvent, UrlClassification, UsageStats,
};

// ============================================================================
// CallStatus
// ============================================================================

#[test]
fn test_call_status_shapes() {
    assert_eq!(serde_json::to_value(CallStatus::Pending).unwrap(), json!("pending"));
    assert_eq!(serde_json::to_value(CallStatus::Http(404)).unwrap(), json!(404));
    assert_eq!(serde_json::to_value(CallStatus::Error).unwrap(), json!("error"));
}

#[test]
fn test_call_status_parse() {
    let status: CallStatus = serde_json::from_str("201").unwrap();
    assert_eq!(status, CallStatus::Http(201));
    let status: CallStatus = serde_json::from_str(r#""error""#).unwrap();
    assert_eq!(status, CallStatus::Error);
}

#[test]
fn test_call_status_rejects_unknown_label() {
    let result: Result<CallStatus, _> = serde_json::from_str(r#""done""#);
    assert!(result.is_err());
}

// ============================================================================
// ApiCallRecord / TapEvent
// ============================================================================

#[test]
fn test_record_omits_empty_optionals() {
    let record = ApiCallRecord::pending(7, "GET", "https://x.example/api/data/objects");
    let value = serde_json::to_value(&record).unwrap();
    assert_eq!(value["id"], json!(7));
    assert_eq!(value["status"], json!("pending"));
    assert!(value.get("statusText").is_none());
    assert!(value.get("error").is_none());
}

#[test]
fn test_tap_event_is_tagged() {
    let record = ApiCallRecord::pending(1, "POST", "https://x.example/api/v1/things");
    let value = serde_json::to_value(TapEvent::CallStarted(record)).unwrap();
    assert_eq!(value["type"], json!("call_started"));
    assert_eq!(value["data"]["method"], json!("POST"));

    let ready = serde_json::to_value(TapEvent::Ready { timestamp: Utc::now() }).unwrap();
    assert_eq!(ready["type"], json!("ready"));
    assert!(ready["data"]["timestamp"].is_string());
}

#[test]
fn test_page_changed_event_roundtrip() {
    let event = TapEvent::PageChanged(PageChange {
        url: "https://x.example/clm/a/b".to_string(),
        object_type: Some("Agreement".to_string()),
        record_id: Some("b".to_string()),
        timestamp: Utc::now(),
    });
    let json = serde_json::to_string(&event).unwrap();
    let back: TapEvent = serde_json::from_str(&json).unwrap();
    assert_eq!(back, event);
    assert!(back.record().is_none());
}

// ============================================================================
// Persisted Types
// ============================================================================

#[test]
fn test_credential_camel_case() {
    let cred = Credential::from_lifetime("tok", 3600, Utc::now()).unwrap();
    let value = serde_json::to_value(&cred).unwrap();
    assert_eq!(value["accessToken"], json!("tok"));
    assert!(value["expiresAt"].is_string());
}

#[test]
fn test_saved_query_defaults_missing_text_fields() {
    let json = r#"{
        "id": 1700000000000,
        "name": "objects",
        "method": "GET",
        "endpoint": "/objects",
        "timestamp": "2024-01-01T00:00:00Z"
    }"#;
    let query: SavedQuery = serde_json::from_str(json).unwrap();
    assert_eq!(query.method, HttpMethod::Get);
    assert!(query.query_params.is_empty());
    assert!(query.request_body.is_empty());
}

#[test]
fn test_usage_stats_tolerates_partial_json() {
    let stats: UsageStats = serde_json::from_str(r#"{"apiCalls": 4}"#).unwrap();
    assert_eq!(stats.api_calls, 4);
    assert_eq!(stats.error_count, 0);
    assert!(stats.last_sync.is_none());
}

#[test]
fn test_classification_and_area_shapes() {
    let value = serde_json::to_value(UrlClassification::new("Proposal", "p-1")).unwrap();
    assert_eq!(value, json!({"objectType": "Proposal", "recordId": "p-1"}));
    assert_eq!(serde_json::to_value(PlatformArea::Cadmin).unwrap(), json!("cadmin"));
}
