//! Object metadata browser.
//!
//! Responses are loosely shaped: names may appear as `name`, `label` or
//! `apiName`, and lists may be bare arrays or wrapped in an object.

use serde::Serialize;
use serde_json::Value;

/// Endpoint listing all objects.
pub const OBJECTS_ENDPOINT: &str = "/objects";

/// Type shown for list entries without one.
const DEFAULT_LIST_TYPE: &str = "Object";

/// Type shown for described objects without one.
const DEFAULT_DESCRIBE_TYPE: &str = "Standard";

/// Endpoint describing one object.
pub fn describe_endpoint(name: &str) -> String {
    format!("{OBJECTS_ENDPOINT}/{name}/describe")
}

/// One entry of the object list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectSummary {
    /// API name used in endpoints.
    pub name: String,
    /// Display label.
    pub label: String,
    /// Object type.
    pub object_type: String,
}

impl ObjectSummary {
    fn from_value(value: &Value) -> Option<Self> {
        let name = first_str(value, &["name", "apiName", "label"])?;
        let label = first_str(value, &["name", "label", "apiName"]).unwrap_or_else(|| name.clone());
        Some(Self {
            name,
            label,
            object_type: first_str(value, &["type"]).unwrap_or_else(|| DEFAULT_LIST_TYPE.to_string()),
        })
    }
}

/// Field of a described object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldInfo {
    /// Field name.
    pub name: String,
    /// Field type.
    pub field_type: String,
    /// Description, possibly empty.
    pub description: String,
}

/// Described object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectDescription {
    /// Object name.
    pub name: String,
    /// Description, if provided.
    pub description: Option<String>,
    /// Object type.
    pub object_type: String,
    /// Fields.
    pub fields: Vec<FieldInfo>,
}

impl ObjectDescription {
    /// Number of fields.
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }
}

/// Parses the object list response (`{"objects": [...]}` or a bare array).
pub fn parse_object_list(data: &Value) -> Vec<ObjectSummary> {
    let items = data
        .get("objects")
        .and_then(Value::as_array)
        .or_else(|| data.as_array());
    items
        .map(|items| items.iter().filter_map(ObjectSummary::from_value).collect())
        .unwrap_or_default()
}

/// Case-insensitive substring match on the display label.
pub fn filter_objects<'a>(objects: &'a [ObjectSummary], term: &str) -> Vec<&'a ObjectSummary> {
    let term = term.to_lowercase();
    objects
        .iter()
        .filter(|o| o.label.to_lowercase().contains(&term))
        .collect()
}

/// Parses a describe response. `fallback_name` is used if the response
/// carries no name.
pub fn parse_description(data: &Value, fallback_name: &str) -> ObjectDescription {
    let fields = data
        .get("fields")
        .and_then(Value::as_array)
        .map(|fields| {
            fields
                .iter()
                .map(|f| FieldInfo {
                    name: first_str(f, &["name"]).unwrap_or_default(),
                    field_type: first_str(f, &["type"]).unwrap_or_default(),
                    description: first_str(f, &["description"]).unwrap_or_default(),
                })
                .collect()
        })
        .unwrap_or_default();

    ObjectDescription {
        name: first_str(data, &["name", "label"]).unwrap_or_else(|| fallback_name.to_string()),
        description: first_str(data, &["description"]),
        object_type: first_str(data, &["type"])
            .unwrap_or_else(|| DEFAULT_DESCRIBE_TYPE.to_string()),
        fields,
    }
}

fn first_str(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| value.get(*k).and_then(Value::as_str))
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_object_list_shapes() {
        let wrapped = json!({"objects": [
            {"name": "Account", "type": "Standard"},
            {"apiName": "Agreement", "label": "Contract Agreement"},
            {"unnamed": true}
        ]});
        let objects = parse_object_list(&wrapped);
        assert_eq!(objects.len(), 2);
        assert_eq!(objects[0].object_type, "Standard");
        assert_eq!(objects[1].name, "Agreement");
        assert_eq!(objects[1].label, "Contract Agreement");
        assert_eq!(objects[1].object_type, "Object");

        let bare = json!([{"name": "Proposal"}]);
        assert_eq!(parse_object_list(&bare)[0].name, "Proposal");
        assert!(parse_object_list(&json!({"count": 0})).is_empty());
    }

    #[test]
    fn test_filter_is_case_insensitive() {
        let objects = parse_object_list(&json!([
            {"name": "Account"}, {"name": "AgreementClause"}, {"name": "Proposal"}
        ]));
        let hits: Vec<&str> = filter_objects(&objects, "AGREE")
            .iter()
            .map(|o| o.name.as_str())
            .collect();
        assert_eq!(hits, vec!["AgreementClause"]);
        assert_eq!(filter_objects(&objects, "").len(), 3);
    }

    #[test]
    fn test_parse_description() {
        let data = json!({
            "name": "Account",
            "fields": [
                {"name": "Id", "type": "id"},
                {"name": "Name", "type": "string", "description": "Account name"}
            ]
        });
        let desc = parse_description(&data, "ignored");
        assert_eq!(desc.name, "Account");
        assert_eq!(desc.field_count(), 2);
        assert_eq!(desc.object_type, "Standard");
        assert_eq!(desc.fields[1].description, "Account name");
        assert!(desc.description.is_none());

        let empty = parse_description(&json!({}), "Custom");
        assert_eq!(empty.name, "Custom");
        assert_eq!(empty.field_count(), 0);
    }

    #[test]
    fn test_describe_endpoint() {
        assert_eq!(describe_endpoint("Account"), "/objects/Account/describe");
    }
}
