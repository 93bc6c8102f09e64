//! JSON output formatting.

use anyhow::Result;
use chrono::{DateTime, Utc};
use inspector_core::{Credential, PlatformArea, UrlClassification, path_segments};
use serde::{Serialize, Serializer};
use std::path::Path;

// ============================================================================
// Output Types
// ============================================================================

/// Token state.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenStatusOutput {
    pub cached: bool,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "serialize_datetime_opt")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in_secs: Option<u64>,
    pub token_url: String,
    pub client_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_source: Option<String>,
}

impl TokenStatusOutput {
    /// Builds the status from the broker's current credential.
    pub fn new(
        credential: Option<&Credential>,
        token_url: &str,
        client_id: &str,
        secret_source: Option<String>,
    ) -> Self {
        let valid = credential.filter(|c| c.is_valid());
        Self {
            cached: valid.is_some(),
            expires_at: valid.map(|c| c.expires_at),
            expires_in_secs: valid
                .and_then(Credential::time_until_expiry)
                .map(|d| d.as_secs()),
            token_url: token_url.to_string(),
            client_id: client_id.to_string(),
            secret_source,
        }
    }
}

/// Classified page URL.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationOutput {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,
}

impl ClassificationOutput {
    /// Builds the output for `url`.
    pub fn new(url: &str, classification: UrlClassification) -> Self {
        let segments = path_segments(url);
        let refs: Vec<&str> = segments.iter().map(String::as_str).collect();
        Self {
            url: url.to_string(),
            area: PlatformArea::detect(&refs).map(|(area, _)| area.to_string()),
            object_type: classification.object_type,
            record_id: classification.record_id,
        }
    }
}

/// Written export file.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportOutput {
    pub path: String,
    pub record_id: String,
    pub format: String,
}

impl ExportOutput {
    /// Builds the output for a written file.
    pub fn new(path: &Path, record_id: &str, format: &str) -> Self {
        Self {
            path: path.display().to_string(),
            record_id: record_id.to_string(),
            format: format.to_string(),
        }
    }
}

// ============================================================================
// Serialization helpers
// ============================================================================

#[allow(clippy::ref_option)]
fn serialize_datetime_opt<S>(dt: &Option<DateTime<Utc>>, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match dt {
        Some(dt) => s.serialize_str(&dt.to_rfc3339()),
        None => s.serialize_none(),
    }
}

// ============================================================================
// JSON Formatter
// ============================================================================

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable value.
    pub fn format<T: Serialize>(&self, data: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        Ok(json)
    }

    /// Formats one value per line, ignoring the pretty flag.
    pub fn format_line<T: Serialize>(&self, data: &T) -> Result<String> {
        Ok(serde_json::to_string(data)?)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use inspector_core::classify;

    #[test]
    fn test_format_pretty() {
        let formatter = JsonFormatter::new(true);
        let data = serde_json::json!({"key": "value"});
        let output = formatter.format(&data).unwrap();
        assert!(output.contains('\n'));
        assert!(!formatter.format_line(&data).unwrap().contains('\n'));
    }

    #[test]
    fn test_format_compact() {
        let formatter = JsonFormatter::new(false);
        let data = serde_json::json!({"key": "value"});
        let output = formatter.format(&data).unwrap();
        assert!(!output.contains('\n'));
    }

    #[test]
    fn test_classification_output() {
        let url = "https://rls-preview.congacloud.eu/cpq/proposals/p1";
        let output = ClassificationOutput::new(url, classify(url));
        let value = serde_json::to_value(&output).unwrap();
        assert_eq!(value["area"], "cpq");
        assert_eq!(value["objectType"], "Proposal");
        assert_eq!(value["recordId"], "p1");

        let output = ClassificationOutput::new("https://example.com/", classify("https://example.com/"));
        let value = serde_json::to_value(&output).unwrap();
        assert!(value.get("objectType").is_none());
    }

    #[test]
    fn test_token_status_without_credential() {
        let status = TokenStatusOutput::new(None, "https://login/token", "id", None);
        let value = serde_json::to_value(&status).unwrap();
        assert_eq!(value["cached"], false);
        assert!(value.get("expiresAt").is_none());
        assert!(value.get("secretSource").is_none());
    }

    #[test]
    fn test_token_status_with_credential() {
        let credential = Credential::from_lifetime("tok", 3600, Utc::now()).unwrap();
        let status = TokenStatusOutput::new(
            Some(&credential),
            "https://login/token",
            "id",
            Some("keychain".into()),
        );
        assert!(status.cached);
        assert!(status.expires_in_secs.unwrap() > 3000);
        let value = serde_json::to_value(&status).unwrap();
        assert!(value["expiresAt"].as_str().is_some());
    }
}
