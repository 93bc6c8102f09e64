//! Text output formatting with tables and colors.

use chrono::{DateTime, Utc};
use inspector_core::{CallStatus, PageMetadata, SavedQuery, TapEvent, UsageStats};
use inspector_explorer::{
    cell, columns, ApiCatalog, CatalogEndpoint, ObjectDescription, ObjectSummary, QueryResult,
    RecordView,
};
use inspector_store::{DateFormat, Settings};
use serde_json::Value;

use super::json::{ClassificationOutput, TokenStatusOutput};

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const BLUE: &str = "\x1b[34m";
const CYAN: &str = "\x1b[36m";

const MAX_CELL_WIDTH: usize = 40;

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
    date_format: DateFormat,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self {
            use_colors,
            date_format: DateFormat::default(),
        }
    }

    /// Sets the timestamp format.
    pub fn with_date_format(mut self, date_format: DateFormat) -> Self {
        self.date_format = date_format;
        self
    }

    // ========================================================================
    // Pages and tokens
    // ========================================================================

    /// Formats a classified URL.
    pub fn format_classification(&self, output: &ClassificationOutput) -> String {
        let mut lines = vec![self.bold(&output.url)];
        match (&output.object_type, &output.record_id) {
            (Some(object_type), record_id) => {
                if let Some(area) = &output.area {
                    lines.push(format!("  Area:   {area}"));
                }
                lines.push(format!("  Type:   {}", self.cyan(object_type)));
                lines.push(format!("  Record: {}", record_id.as_deref().unwrap_or("−")));
            }
            (None, _) => lines.push(format!("  {}", self.dim("Not a record page"))),
        }
        lines.join("\n")
    }

    /// Formats the token state.
    pub fn format_token_status(&self, status: &TokenStatusOutput) -> String {
        let mut lines = vec![self.bold("Token"), "─".repeat(40)];

        let state = match (status.expires_at, status.expires_in_secs) {
            (Some(at), Some(secs)) => format!(
                "{} (expires {}, in {})",
                self.green("valid"),
                self.format_timestamp(&at),
                format_duration(secs)
            ),
            _ => self.dim("none cached"),
        };
        lines.push(format!("State:     {state}"));
        lines.push(format!("Token URL: {}", status.token_url));
        lines.push(format!(
            "Client ID: {}",
            if status.client_id.is_empty() { "−" } else { &status.client_id }
        ));
        lines.push(format!(
            "Secret:    {}",
            match &status.secret_source {
                Some(source) => self.green(source),
                None => self.red("not configured"),
            }
        ));
        lines.join("\n")
    }

    // ========================================================================
    // Explorer
    // ========================================================================

    /// Formats a query result: a status line and the JSON body.
    pub fn format_query_result(&self, method: &str, result: &QueryResult) -> String {
        let header = format!(
            "{} {} {}",
            self.bold(method),
            result.url,
            self.dim(&format!("({} ms)", result.elapsed_ms))
        );
        let body = serde_json::to_string_pretty(&result.data).unwrap_or_default();
        format!("{header}\n{body}")
    }

    /// Formats saved queries as a table.
    pub fn format_queries(&self, queries: &[SavedQuery]) -> String {
        if queries.is_empty() {
            return self.dim("No saved queries");
        }
        let rows: Vec<Vec<String>> = queries
            .iter()
            .map(|q| {
                vec![
                    q.id.to_string(),
                    q.name.clone(),
                    q.method.to_string(),
                    q.endpoint.clone(),
                    self.format_timestamp(&q.timestamp),
                ]
            })
            .collect();
        self.table(&["ID", "Name", "Method", "Endpoint", "Saved"], &rows)
    }

    /// Formats one saved query in detail.
    pub fn format_saved_query(&self, query: &SavedQuery) -> String {
        let mut lines = vec![
            format!("{} {}", self.bold(&query.name), self.dim(&format!("#{}", query.id))),
            format!("{} {}", query.method, query.endpoint),
        ];
        if !query.query_params.trim().is_empty() {
            lines.push(format!("Params: {}", query.query_params));
        }
        if !query.request_body.trim().is_empty() {
            lines.push(format!("Body:   {}", query.request_body));
        }
        lines.push(format!("Saved:  {}", self.format_timestamp(&query.timestamp)));
        lines.join("\n")
    }

    /// Formats the object list.
    pub fn format_objects(&self, objects: &[&ObjectSummary]) -> String {
        if objects.is_empty() {
            return self.dim("No objects found");
        }
        let rows: Vec<Vec<String>> = objects
            .iter()
            .map(|o| vec![o.name.clone(), o.label.clone(), o.object_type.clone()])
            .collect();
        let mut out = self.table(&["Name", "Label", "Type"], &rows);
        out.push_str(&format!("\n{}", self.dim(&format!("{} objects", objects.len()))));
        out
    }

    /// Formats a described object.
    pub fn format_description(&self, description: &ObjectDescription) -> String {
        let mut lines = vec![format!(
            "{} {}",
            self.bold(&description.name),
            self.dim(&format!("({})", description.object_type))
        )];
        if let Some(text) = &description.description {
            lines.push(text.clone());
        }
        lines.push(format!("Fields: {}", description.field_count()));
        if !description.fields.is_empty() {
            lines.push(String::new());
            let rows: Vec<Vec<String>> = description
                .fields
                .iter()
                .map(|f| vec![f.name.clone(), f.field_type.clone(), f.description.clone()])
                .collect();
            lines.push(self.table(&["Field", "Type", "Description"], &rows));
        }
        lines.join("\n")
    }

    /// Formats records as a table keyed by the first record's fields.
    pub fn format_records(&self, records: &[Value]) -> String {
        if records.is_empty() {
            return self.dim("No records");
        }
        let columns = columns(records);
        if columns.is_empty() {
            return records
                .iter()
                .map(Value::to_string)
                .collect::<Vec<_>>()
                .join("\n");
        }
        let headers: Vec<&str> = columns.iter().map(String::as_str).collect();
        let rows: Vec<Vec<String>> = records
            .iter()
            .map(|r| columns.iter().map(|c| cell(r, c)).collect())
            .collect();
        let mut out = self.table(&headers, &rows);
        out.push_str(&format!("\n{}", self.dim(&format!("{} records", records.len()))));
        out
    }

    /// Formats a fetched record as field/value lines.
    pub fn format_record(&self, view: &RecordView) -> String {
        let title = match &view.location.object_type {
            Some(object_type) => format!("{object_type} {}", view.location.record_id),
            None => view.location.record_id.clone(),
        };
        let mut lines = vec![self.bold(&title), self.dim(&view.location.endpoint), String::new()];

        match view.data.as_object() {
            Some(fields) => {
                let width = fields.keys().map(String::len).max().unwrap_or(0);
                for key in fields.keys() {
                    lines.push(format!(
                        "{:<width$}  {}",
                        self.cyan(key),
                        cell(&view.data, key),
                        width = width + self.color_overhead()
                    ));
                }
            }
            None => lines.push(serde_json::to_string_pretty(&view.data).unwrap_or_default()),
        }
        lines.join("\n")
    }

    /// Formats the API catalog.
    pub fn format_catalog(&self, catalog: &ApiCatalog, endpoints: &[&CatalogEndpoint]) -> String {
        let mut lines = Vec::new();
        if let Some(title) = &catalog.title {
            let version = catalog.version.as_deref().unwrap_or_default();
            lines.push(format!("{} {}", self.bold(title), self.dim(version)));
        }
        let rows: Vec<Vec<String>> = endpoints
            .iter()
            .map(|e| vec![e.method.clone(), e.path.clone(), e.summary.clone()])
            .collect();
        lines.push(self.table(&["Method", "Path", "Summary"], &rows));
        lines.push(self.dim(&format!("{} endpoints", endpoints.len())));
        lines.join("\n")
    }

    // ========================================================================
    // Network tap
    // ========================================================================

    /// Formats a tap event as one line.
    pub fn format_event(&self, event: &TapEvent) -> String {
        match event {
            TapEvent::Ready { timestamp } => {
                format!("{} tap ready", self.dim(&self.format_timestamp(timestamp)))
            }
            TapEvent::PageChanged(change) => format!(
                "{} page  {} {}",
                self.dim(&self.format_timestamp(&change.timestamp)),
                change.url,
                self.cyan(&format!(
                    "[{} {}]",
                    change.object_type.as_deref().unwrap_or("−"),
                    change.record_id.as_deref().unwrap_or("−")
                ))
            ),
            TapEvent::CallStarted(record)
            | TapEvent::CallSucceeded(record)
            | TapEvent::CallFailed(record) => {
                let mut line = format!(
                    "{} #{:<3} {:<6} {} {}",
                    self.dim(&self.format_timestamp(&record.timestamp)),
                    record.id,
                    record.method,
                    self.status(record.status),
                    record.url
                );
                if let Some(error) = &record.error {
                    line.push_str(&format!(" {}", self.red(error)));
                }
                line
            }
        }
    }

    /// Formats page metadata.
    pub fn format_page_metadata(&self, metadata: &PageMetadata) -> String {
        format!(
            "{}\n  Type:   {}\n  Record: {}\n  Calls:  {}",
            self.bold(&metadata.url),
            metadata.object_type.as_deref().unwrap_or("−"),
            metadata.record_id.as_deref().unwrap_or("−"),
            metadata.api_calls
        )
    }

    // ========================================================================
    // Settings and stats
    // ========================================================================

    /// Formats usage statistics.
    pub fn format_stats(&self, stats: &UsageStats) -> String {
        let last_sync = stats
            .last_sync
            .map_or_else(|| "never".to_string(), |t| self.format_timestamp(&t));
        let errors = if stats.error_count > 0 {
            self.red(&stats.error_count.to_string())
        } else {
            stats.error_count.to_string()
        };
        [
            self.bold("Usage"),
            "─".repeat(40),
            format!("API calls:  {}", format_number(stats.api_calls)),
            format!("Records:    {}", format_number(stats.record_count)),
            format!("Errors:     {errors}"),
            format!("Last sync:  {last_sync}"),
        ]
        .join("\n")
    }

    /// Formats settings.
    pub fn format_settings(&self, settings: &Settings) -> String {
        let p = &settings.platform;
        [
            self.bold("Connection"),
            "─".repeat(40),
            format!("Token URL:      {}", p.token_url),
            format!("API base URL:   {}", p.api_base_url),
            format!("Platform:       {}", p.platform_domain),
            format!("Domain marker:  {}", p.domain_marker),
            format!("Client ID:      {}", if p.client_id.is_empty() { "−" } else { &p.client_id }),
            format!("Scope:          {}", p.scope),
            String::new(),
            self.bold("Settings"),
            "─".repeat(40),
            format!("API timeout:    {}s", settings.api_timeout),
            format!("Max results:    {}", settings.max_results),
            format!("Intercept:      {}", settings.intercept_network_requests),
            format!("Export format:  {}", settings.export_format.extension()),
            format!("Metadata:       {}", settings.include_metadata),
            format!("Date format:    {:?}", settings.date_format),
            format!("Theme:          {}", settings.theme),
            format!("Custom headers: {}", settings.custom_headers),
        ]
        .join("\n")
    }

    /// Formats an error message.
    pub fn format_error(&self, context: &str, error: &str) -> String {
        format!("{}: {} - {}", self.bold(context), self.red("Error"), error)
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    /// Formats a timestamp with the configured date format.
    pub fn format_timestamp(&self, ts: &DateTime<Utc>) -> String {
        self.date_format.format(ts)
    }

    /// Colors a call status by class.
    pub fn status(&self, status: CallStatus) -> String {
        let text = format!("{:>7}", status.to_string());
        match status {
            CallStatus::Pending => self.dim(&text),
            CallStatus::Http(code) if code < 300 => self.green(&text),
            CallStatus::Http(code) if code < 400 => self.blue(&text),
            CallStatus::Http(code) if code < 500 => self.yellow(&text),
            CallStatus::Http(_) | CallStatus::Error => self.red(&text),
        }
    }

    /// Renders an aligned table. Cells are truncated to a fixed width.
    pub fn table(&self, headers: &[&str], rows: &[Vec<String>]) -> String {
        let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
        for row in rows {
            for (i, value) in row.iter().enumerate() {
                if let Some(w) = widths.get_mut(i) {
                    *w = (*w).max(value.chars().count()).min(MAX_CELL_WIDTH);
                }
            }
        }

        let header: Vec<String> = headers
            .iter()
            .zip(&widths)
            .map(|(h, w)| pad(h, *w))
            .collect();
        let mut lines = vec![
            self.bold(header.join("  ").trim_end()),
            self.dim(&widths.iter().map(|w| "─".repeat(*w)).collect::<Vec<_>>().join("  ")),
        ];
        for row in rows {
            let cells: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(value, w)| pad(&truncate(value, *w), *w))
                .collect();
            lines.push(cells.join("  ").trim_end().to_string());
        }
        lines.join("\n")
    }

    fn color_overhead(&self) -> usize {
        if self.use_colors { CYAN.len() + RESET.len() } else { 0 }
    }

    fn paint(&self, color: &str, text: &str) -> String {
        if self.use_colors {
            format!("{color}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    fn green(&self, text: &str) -> String {
        self.paint(GREEN, text)
    }

    fn yellow(&self, text: &str) -> String {
        self.paint(YELLOW, text)
    }

    fn red(&self, text: &str) -> String {
        self.paint(RED, text)
    }

    fn blue(&self, text: &str) -> String {
        self.paint(BLUE, text)
    }

    fn cyan(&self, text: &str) -> String {
        self.paint(CYAN, text)
    }
}

fn pad(text: &str, width: usize) -> String {
    let len = text.chars().count();
    format!("{text}{}", " ".repeat(width.saturating_sub(len)))
}

fn truncate(text: &str, width: usize) -> String {
    let single_line = text.replace(['\n', '\r'], " ");
    if single_line.chars().count() <= width {
        return single_line;
    }
    let mut out: String = single_line.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

#[allow(clippy::cast_precision_loss)]
fn format_number(n: u64) -> String {
    let n = n as f64;
    if n >= 1_000_000.0 {
        format!("{:.1}M", n / 1_000_000.0)
    } else if n >= 1_000.0 {
        format!("{:.1}K", n / 1_000.0)
    } else {
        format!("{n:.0}")
    }
}

fn format_duration(secs: u64) -> String {
    let (hours, mins) = (secs / 3600, (secs % 3600) / 60);
    match (hours, mins) {
        (0, 0) => format!("{secs}s"),
        (0, m) => format!("{m}m"),
        (h, 0) => format!("{h}h"),
        (h, m) => format!("{h}h {m}m"),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(500), "500");
        assert_eq!(format_number(1500), "1.5K");
        assert_eq!(format_number(1_500_000), "1.5M");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(42), "42s");
        assert_eq!(format_duration(600), "10m");
        assert_eq!(format_duration(7200), "2h");
        assert_eq!(format_duration(3660), "1h 1m");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a\nb", 10), "a b");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
    }

    #[test]
    fn test_status_colors() {
        let formatter = TextFormatter::new(true);
        assert!(formatter.status(CallStatus::Http(200)).contains(GREEN));
        assert!(formatter.status(CallStatus::Http(404)).contains(YELLOW));
        assert!(formatter.status(CallStatus::Http(503)).contains(RED));
        assert!(formatter.status(CallStatus::Error).contains(RED));
        assert!(formatter.status(CallStatus::Pending).contains(DIM));
    }
}
