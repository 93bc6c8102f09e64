//! Record view and export.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use inspector_core::{classify, UrlClassification};
use inspector_store::ExportFormat;
use regex::Regex;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::browser::records_to_csv;
use crate::error::ExplorerError;

// ============================================================================
// Record Location
// ============================================================================

/// Id patterns for pages the classifier does not recognise.
static RECORD_ID_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"/record/([a-zA-Z0-9-]+)",
        r"/([a-zA-Z0-9-]{36})/view",
        r"[?&]id=([a-zA-Z0-9-]+)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("Invalid regex"))
    .collect()
});

/// Extracts a record id from well-known URL shapes.
pub fn extract_record_id(url: &str) -> Option<String> {
    RECORD_ID_PATTERNS
        .iter()
        .find_map(|re| re.captures(url))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Where a page's record lives in the data API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordLocation {
    /// Page URL.
    pub url: String,
    /// Object type, if the page was classified.
    pub object_type: Option<String>,
    /// Record id.
    pub record_id: String,
    /// API endpoint for the record.
    pub endpoint: String,
}

/// Resolves the record behind a page URL.
///
/// Classified pages map to `/{objectType}/{recordId}`. Otherwise the id is
/// taken from known URL shapes and fetched through `/records/{id}`.
///
/// # Errors
///
/// Returns [`ExplorerError::MissingRecordId`] if no id can be found.
pub fn locate_record(url: &str) -> Result<RecordLocation, ExplorerError> {
    let UrlClassification {
        object_type,
        record_id,
    } = classify(url);

    let record_id = record_id
        .or_else(|| extract_record_id(url))
        .ok_or_else(|| ExplorerError::MissingRecordId(url.to_string()))?;

    let endpoint = match &object_type {
        Some(object_type) => format!("/{object_type}/{record_id}"),
        None => format!("/records/{record_id}"),
    };

    Ok(RecordLocation {
        url: url.to_string(),
        object_type,
        record_id,
        endpoint,
    })
}

// ============================================================================
// Export
// ============================================================================

/// Export file name, e.g. `conga-record-a1.json`.
pub fn export_file_name(record_id: &str, format: ExportFormat) -> String {
    let safe: String = record_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("conga-record-{safe}.{}", format.extension())
}

/// Export options.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExportOptions {
    /// Output format.
    pub format: ExportFormat,
    /// Wrap JSON output with export metadata.
    pub include_metadata: bool,
}

/// Renders a record for export.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render_record(
    location: &RecordLocation,
    data: &Value,
    options: ExportOptions,
    exported_at: DateTime<Utc>,
) -> Result<String, ExplorerError> {
    match options.format {
        ExportFormat::Json if options.include_metadata => {
            let wrapped = json!({
                "metadata": {
                    "recordId": location.record_id,
                    "objectType": location.object_type,
                    "source": location.url,
                    "exportDate": exported_at,
                },
                "record": data,
            });
            Ok(serde_json::to_string_pretty(&wrapped)?)
        }
        ExportFormat::Json => Ok(serde_json::to_string_pretty(data)?),
        ExportFormat::Csv => Ok(records_to_csv(std::slice::from_ref(data))),
    }
}

/// Writes a record export into `dir` and returns the file path.
///
/// # Errors
///
/// Returns an error if rendering or writing fails.
pub async fn write_export(
    dir: &Path,
    location: &RecordLocation,
    data: &Value,
    options: ExportOptions,
) -> Result<PathBuf, ExplorerError> {
    let content = render_record(location, data, options, Utc::now())?;
    let path = dir.join(export_file_name(&location.record_id, options.format));

    debug!(path = %path.display(), "Writing record export");
    tokio::fs::create_dir_all(dir).await?;
    tokio::fs::write(&path, content).await?;
    info!(path = %path.display(), record_id = %location.record_id, "Record exported");
    Ok(path)
}
