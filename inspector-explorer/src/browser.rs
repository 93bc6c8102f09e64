//! Raw data browser.

use serde_json::Value;

/// Field selector meaning "all fields".
pub const ALL_FIELDS: &str = "*";

/// A data browser query against one object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataQuery {
    /// Object API name.
    pub object: String,
    /// Comma-separated field list. `None` or `*` selects all fields.
    pub fields: Option<String>,
    /// Filter expression.
    pub where_clause: Option<String>,
    /// Row limit. `None` uses the configured default.
    pub limit: Option<u32>,
}

impl DataQuery {
    /// Query for all fields of `object`.
    pub fn new(object: impl Into<String>) -> Self {
        Self {
            object: object.into(),
            ..Self::default()
        }
    }

    /// Restricts the returned fields.
    pub fn fields(mut self, fields: impl Into<String>) -> Self {
        self.fields = Some(fields.into());
        self
    }

    /// Adds a filter.
    pub fn filter(mut self, where_clause: impl Into<String>) -> Self {
        self.where_clause = Some(where_clause.into());
        self
    }

    /// Sets the row limit.
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Endpoint for this query: `/{object}?limit=N[&fields=..][&where=..]`.
    pub fn endpoint(&self, default_limit: u32) -> String {
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        query.append_pair("limit", &self.limit.unwrap_or(default_limit).to_string());

        if let Some(fields) = self
            .fields
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty() && *f != ALL_FIELDS)
        {
            query.append_pair("fields", fields);
        }
        if let Some(filter) = self
            .where_clause
            .as_deref()
            .map(str::trim)
            .filter(|w| !w.is_empty())
        {
            query.append_pair("where", filter);
        }

        format!("/{}?{}", self.object, query.finish())
    }
}

/// Pulls the record list out of a list response.
///
/// Accepts a bare array or an object holding the array under `records` or
/// `data`. Anything else has no records.
pub fn extract_records(data: &Value) -> Vec<Value> {
    let list = match data {
        Value::Array(items) => Some(items),
        Value::Object(map) => ["records", "data"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_array)),
        _ => None,
    };
    list.cloned().unwrap_or_default()
}

/// Column names: the keys of the first record.
pub fn columns(records: &[Value]) -> Vec<String> {
    records
        .first()
        .and_then(Value::as_object)
        .map(|first| first.keys().cloned().collect())
        .unwrap_or_default()
}

/// Renders a single cell. Missing and null values are empty.
pub fn cell(record: &Value, column: &str) -> String {
    match record.get(column) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Renders records as CSV with a header row.
pub fn records_to_csv(records: &[Value]) -> String {
    let columns = columns(records);
    let mut out = String::new();
    push_row(&mut out, columns.iter().map(String::as_str));
    for record in records {
        let cells: Vec<String> = columns.iter().map(|c| cell(record, c)).collect();
        push_row(&mut out, cells.iter().map(String::as_str));
    }
    out
}

fn push_row<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>) {
    let row: Vec<String> = cells.map(escape_csv).collect();
    out.push_str(&row.join(","));
    out.push('\n');
}

fn escape_csv(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_endpoint_defaults() {
        assert_eq!(DataQuery::new("Account").endpoint(100), "/Account?limit=100");
        assert_eq!(
            DataQuery::new("Account").fields("*").limit(5).endpoint(100),
            "/Account?limit=5"
        );
    }

    #[test]
    fn test_endpoint_encodes_values() {
        let query = DataQuery::new("Agreement")
            .fields("Id,Name")
            .filter("Status = 'Active'")
            .limit(10);
        assert_eq!(
            query.endpoint(100),
            "/Agreement?limit=10&fields=Id%2CName&where=Status+%3D+%27Active%27"
        );
    }

    #[test]
    fn test_extract_records() {
        assert_eq!(extract_records(&json!([{"a": 1}])).len(), 1);
        assert_eq!(extract_records(&json!({"records": [1, 2]})).len(), 2);
        assert_eq!(extract_records(&json!({"data": [1, 2, 3]})).len(), 3);
        assert!(extract_records(&json!({"records": "x"})).is_empty());
        assert!(extract_records(&json!("text")).is_empty());
    }

    #[test]
    fn test_csv() {
        let records = vec![
            json!({"Id": "1", "Name": "Acme, Inc", "Amount": 10}),
            json!({"Id": "2", "Name": "Say \"hi\"", "Amount": null}),
        ];
        assert_eq!(
            records_to_csv(&records),
            "Amount,Id,Name\n10,1,\"Acme, Inc\"\n,2,\"Say \"\"hi\"\"\"\n"
        );
        assert_eq!(records_to_csv(&[]), "\n");
    }
}
