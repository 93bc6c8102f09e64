//! Store documents on disk: settings compatibility, query payloads and
//! failure handling of [`JsonFile`].

use tempfile::TempDir;

use crate::persistence::{Access, JsonFile};
use crate::settings_store::{DateFormat, ExportFormat, FontSize, Settings, Theme};
use inspector_core::{HttpMethod, SavedQuery};

fn settings_file(dir: &TempDir, name: &str) -> JsonFile {
    JsonFile::new(dir.path().join(name), Access::Private)
}

// ============================================================================
// Settings Documents
// ============================================================================

#[tokio::test]
async fn test_settings_full_roundtrip() {
    let dir = TempDir::new().unwrap();
    let file = settings_file(&dir, "settings.json");

    let mut settings = Settings::default();
    settings.theme = Theme::Dark;
    settings.font_size = FontSize::Large;
    settings.export_format = ExportFormat::Csv;
    settings.date_format = DateFormat::Iso;
    settings.max_results = 500;
    settings.intercept_network_requests = false;
    settings.custom_headers = r#"{"X-Org":"acme"}"#.to_string();
    settings.platform.client_id = "client-123".to_string();

    file.write(&settings).await.unwrap();
    assert_eq!(file.read::<Settings>().await.unwrap(), Some(settings));
}

#[tokio::test]
async fn test_settings_written_camel_case() {
    let dir = TempDir::new().unwrap();
    let file = settings_file(&dir, "settings.json");
    file.write(&Settings::default()).await.unwrap();

    let raw = tokio::fs::read_to_string(file.path()).await.unwrap();
    assert!(raw.contains("\"maxResults\": 100"));
    assert!(raw.contains("\"interceptNetworkRequests\": true"));
    assert!(!raw.contains("clientSecret"));
}

#[tokio::test]
async fn test_minimal_settings_use_defaults() {
    let dir = TempDir::new().unwrap();
    let file = settings_file(&dir, "minimal.json");
    tokio::fs::write(file.path(), r#"{"maxResults": 25}"#).await.unwrap();

    let loaded: Settings = file.read().await.unwrap().unwrap();
    assert_eq!(loaded.max_results, 25);
    assert_eq!(loaded.api_timeout, 30);
    assert!(loaded.include_metadata);
    assert_eq!(loaded.platform.scope, "data:read data:write");
}

#[tokio::test]
async fn test_settings_ignore_unknown_fields() {
    let dir = TempDir::new().unwrap();
    let file = settings_file(&dir, "extra_fields.json");
    tokio::fs::write(
        file.path(),
        r#"{"theme": "dark", "legacyPanel": true, "nested": {"key": "value"}}"#,
    )
    .await
    .unwrap();

    let loaded: Settings = file.read().await.unwrap().unwrap();
    assert_eq!(loaded.theme, Theme::Dark);
}

// ============================================================================
// Failure Handling
// ============================================================================

#[tokio::test]
async fn test_corrupt_document_falls_back_to_default() {
    let dir = TempDir::new().unwrap();
    let file = JsonFile::new(dir.path().join("stats.json"), Access::Shared);
    tokio::fs::write(file.path(), "{ truncated").await.unwrap();

    assert!(file.read::<Settings>().await.is_err());
    let fallback: Settings = file.read_or_default().await;
    assert_eq!(fallback, Settings::default());
}

#[tokio::test]
async fn test_failed_write_keeps_previous_document() {
    let dir = TempDir::new().unwrap();
    let file = JsonFile::new(dir.path().join("queries.json"), Access::Shared);
    file.write(&vec!["kept"]).await.unwrap();

    // Maps with non-string keys cannot be serialized to JSON.
    let bad: std::collections::HashMap<(u8, u8), u8> = [((1, 2), 3)].into_iter().collect();
    assert!(file.write(&bad).await.is_err());

    assert_eq!(file.read::<Vec<String>>().await.unwrap(), Some(vec!["kept".to_string()]));
}

#[tokio::test]
async fn test_write_creates_parent_directories() {
    let dir = TempDir::new().unwrap();
    let file = JsonFile::new(
        dir.path().join("deeply").join("nested").join("queries.json"),
        Access::Shared,
    );

    file.write(&Vec::<SavedQuery>::new()).await.unwrap();
    assert!(file.path().exists());
}

// ============================================================================
// Query Payloads
// ============================================================================

#[tokio::test]
async fn test_unicode_in_saved_queries() {
    let dir = TempDir::new().unwrap();
    let file = JsonFile::new(dir.path().join("queries.json"), Access::Shared);

    let queries = vec![SavedQuery::new(
        "Verträge 日本語",
        HttpMethod::Post,
        "/Agreement",
        "",
        r#"{"Name": "Ünïcødé"}"#,
    )];

    file.write(&queries).await.unwrap();
    assert_eq!(file.read::<Vec<SavedQuery>>().await.unwrap(), Some(queries));
}
