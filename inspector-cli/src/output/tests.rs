//! CLI output formatting tests.
//!
//! These tests verify that CLI output is correctly formatted for both
//! text and JSON output modes.

#[cfg(test)]
mod text_formatter_tests {
    use super::super::json::{ClassificationOutput, TokenStatusOutput};
    use super::super::text::TextFormatter;
    use chrono::{TimeZone, Utc};
    use inspector_core::{
        classify, ApiCallRecord, CallStatus, HttpMethod, PageMetadata, SavedQuery, TapEvent,
        UsageStats,
    };
    use inspector_explorer::{
        locate_record, ApiCatalog, ObjectSummary, QueryResult, RecordView,
    };
    use inspector_store::{DateFormat, Settings};
    use serde_json::json;

    #[test]
    fn test_format_classification() {
        let formatter = TextFormatter::new(false);
        let url = "https://rls-preview.congacloud.eu/clm/agreements/a1";
        let output = formatter.format_classification(&ClassificationOutput::new(url, classify(url)));

        assert!(output.contains("Area:   clm"));
        assert!(output.contains("Type:   Agreement"));
        assert!(output.contains("Record: a1"));

        let output = formatter.format_classification(&ClassificationOutput::new(
            "https://example.com/home",
            classify("https://example.com/home"),
        ));
        assert!(output.contains("Not a record page"));
    }

    #[test]
    fn test_format_token_status_unconfigured() {
        let formatter = TextFormatter::new(false);
        let status = TokenStatusOutput::new(None, "https://login/token", "", None);
        let output = formatter.format_token_status(&status);

        assert!(output.contains("none cached"));
        assert!(output.contains("Client ID: −"));
        assert!(output.contains("not configured"));
    }

    #[test]
    fn test_table_alignment() {
        let formatter = TextFormatter::new(false);
        let rows = vec![
            vec!["1".to_string(), "Acme".to_string()],
            vec!["22".to_string(), "Globex Corporation".to_string()],
        ];
        let output = formatter.table(&["Id", "Name"], &rows);
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines[0], "Id  Name");
        assert_eq!(lines[2], "1   Acme");
        assert_eq!(lines[3], "22  Globex Corporation");
    }

    #[test]
    fn test_table_truncates_long_cells() {
        let formatter = TextFormatter::new(false);
        let rows = vec![vec!["x".repeat(100)]];
        let output = formatter.table(&["Value"], &rows);
        let last = output.lines().last().unwrap();
        assert_eq!(last.chars().count(), 40);
        assert!(last.ends_with('…'));
    }

    #[test]
    fn test_format_records() {
        let formatter = TextFormatter::new(false);
        let records = vec![
            json!({"Id": "1", "Name": "Acme"}),
            json!({"Id": "2", "Name": null}),
        ];
        let output = formatter.format_records(&records);

        assert!(output.starts_with("Id  Name"));
        assert!(output.contains("2 records"));
        assert_eq!(formatter.format_records(&[]), "No records");
    }

    #[test]
    fn test_format_objects() {
        let formatter = TextFormatter::new(false);
        let account = ObjectSummary {
            name: "Account".into(),
            label: "Account".into(),
            object_type: "Standard".into(),
        };
        let output = formatter.format_objects(&[&account]);
        assert!(output.contains("Account"));
        assert!(output.contains("1 objects"));
    }

    #[test]
    fn test_format_query_result() {
        let formatter = TextFormatter::new(false);
        let result = QueryResult {
            url: "/objects?limit=5".into(),
            data: json!({"ok": true}),
            elapsed_ms: 12,
        };
        let output = formatter.format_query_result("GET", &result);
        assert!(output.starts_with("GET /objects?limit=5 (12 ms)"));
        assert!(output.contains("\"ok\": true"));
    }

    #[test]
    fn test_format_saved_query() {
        let formatter = TextFormatter::new(false);
        let query = SavedQuery::new("create", HttpMethod::Post, "/Account", "", "{\"Name\":\"A\"}");
        let output = formatter.format_saved_query(&query);
        assert!(output.contains("POST /Account"));
        assert!(output.contains("Body:"));
        assert!(!output.contains("Params:"));

        assert_eq!(formatter.format_queries(&[]), "No saved queries");
    }

    #[test]
    fn test_format_record() {
        let formatter = TextFormatter::new(false);
        let view = RecordView {
            location: locate_record("https://h/entity/Account/a1").unwrap(),
            data: json!({"Id": "a1", "Name": "Acme"}),
        };
        let output = formatter.format_record(&view);
        assert!(output.starts_with("Account a1"));
        assert!(output.contains("/Account/a1"));
        assert!(output.contains("Name  Acme"));
    }

    #[test]
    fn test_format_events() {
        let formatter = TextFormatter::new(false);

        let mut record = ApiCallRecord::pending(7, "GET", "https://h/api/data/objects");
        record.status = CallStatus::Http(404);
        let line = formatter.format_event(&TapEvent::CallSucceeded(record.clone()));
        assert!(line.contains("#7"));
        assert!(line.contains("404"));
        assert!(line.contains("https://h/api/data/objects"));

        record.status = CallStatus::Error;
        record.error = Some("Request timed out".into());
        let line = formatter.format_event(&TapEvent::CallFailed(record));
        assert!(line.contains("error"));
        assert!(line.ends_with("Request timed out"));

        let line = formatter.format_event(&TapEvent::Ready { timestamp: Utc::now() });
        assert!(line.ends_with("tap ready"));
    }

    #[test]
    fn test_format_page_metadata() {
        let formatter = TextFormatter::new(false);
        let metadata = PageMetadata {
            url: "https://h/clm/agreements/a1".into(),
            object_type: Some("Agreement".into()),
            record_id: Some("a1".into()),
            timestamp: Utc::now(),
            api_calls: 3,
        };
        let output = formatter.format_page_metadata(&metadata);
        assert!(output.contains("Type:   Agreement"));
        assert!(output.contains("Calls:  3"));
    }

    #[test]
    fn test_format_stats_uses_date_format() {
        let formatter = TextFormatter::new(false).with_date_format(DateFormat::Iso);
        let stats = UsageStats {
            api_calls: 1500,
            record_count: 20,
            error_count: 0,
            last_sync: Some(Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap()),
        };
        let output = formatter.format_stats(&stats);
        assert!(output.contains("API calls:  1.5K"));
        assert!(output.contains("2024-03-01T12:30:00"));

        let output = formatter.format_stats(&UsageStats::default());
        assert!(output.contains("Last sync:  never"));
    }

    #[test]
    fn test_format_settings() {
        let formatter = TextFormatter::new(false);
        let output = formatter.format_settings(&Settings::default());
        assert!(output.contains("Max results:    100"));
        assert!(output.contains("Export format:  json"));
    }

    #[test]
    fn test_format_catalog() {
        let formatter = TextFormatter::new(false);
        let catalog = ApiCatalog::parse(&json!({
            "info": {"title": "Data API", "version": "v1"},
            "paths": {"/objects": {"get": {"summary": "List"}}}
        }));
        let endpoints: Vec<_> = catalog.endpoints.iter().collect();
        let output = formatter.format_catalog(&catalog, &endpoints);
        assert!(output.starts_with("Data API v1"));
        assert!(output.contains("GET     /objects"));
        assert!(output.contains("1 endpoints"));
    }
}

#[cfg(test)]
mod json_formatter_tests {
    use super::super::json::{ExportOutput, JsonFormatter};
    use inspector_core::{ApiCallRecord, TapEvent};
    use std::path::Path;

    #[test]
    fn test_format_pretty_json() {
        let formatter = JsonFormatter::new(true);

        let data = serde_json::json!({"key": "value"});
        let output = formatter.format(&data).unwrap();

        assert!(output.contains('\n'));
        assert!(output.contains("  "));
    }

    #[test]
    fn test_format_compact_json() {
        let formatter = JsonFormatter::new(false);

        let data = serde_json::json!({"key": "value"});
        let output = formatter.format(&data).unwrap();

        assert_eq!(output, r#"{"key":"value"}"#);
    }

    #[test]
    fn test_format_event_line() {
        let formatter = JsonFormatter::new(true);
        let event = TapEvent::CallStarted(ApiCallRecord::pending(1, "GET", "https://h/api/x"));
        let line = formatter.format_line(&event).unwrap();

        assert!(!line.contains('\n'));
        let parsed: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["type"], "call_started");
        assert_eq!(parsed["data"]["status"], "pending");
    }

    #[test]
    fn test_export_output() {
        let formatter = JsonFormatter::new(false);
        let output = ExportOutput::new(Path::new("/tmp/conga-record-a1.json"), "a1", "json");
        let parsed: serde_json::Value =
            serde_json::from_str(&formatter.format(&output).unwrap()).unwrap();
        assert_eq!(parsed["recordId"], "a1");
        assert_eq!(parsed["path"], "/tmp/conga-record-a1.json");
    }
}
