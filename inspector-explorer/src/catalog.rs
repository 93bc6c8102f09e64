//! API catalog from the OpenAPI document.

use serde::Serialize;
use serde_json::Value;

/// OpenAPI document endpoint.
pub const SWAGGER_ENDPOINT: &str = "/swagger/v1/swagger.json";

const HTTP_METHODS: &[&str] = &["get", "put", "post", "delete", "options", "head", "patch", "trace"];

/// One path+method pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEndpoint {
    /// Path template, e.g. `/{objectName}/{id}`.
    pub path: String,
    /// Uppercase HTTP method.
    pub method: String,
    /// Operation summary, possibly empty.
    pub summary: String,
}

/// Endpoints advertised by the data API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCatalog {
    /// API title.
    pub title: Option<String>,
    /// API version.
    pub version: Option<String>,
    /// Endpoints, sorted by path then method.
    pub endpoints: Vec<CatalogEndpoint>,
}

impl ApiCatalog {
    /// Parses an OpenAPI (or Swagger 2) document.
    ///
    /// Only HTTP method keys under each path count; shared keys such as
    /// `parameters` are skipped.
    pub fn parse(document: &Value) -> Self {
        let info = document.get("info");
        let text = |key: &str| {
            info.and_then(|i| i.get(key))
                .and_then(Value::as_str)
                .map(str::to_string)
        };

        let mut endpoints: Vec<CatalogEndpoint> = document
            .get("paths")
            .and_then(Value::as_object)
            .into_iter()
            .flatten()
            .flat_map(|(path, item)| {
                item.as_object()
                    .into_iter()
                    .flatten()
                    .filter(|(method, _)| HTTP_METHODS.contains(&method.as_str()))
                    .map(move |(method, op)| CatalogEndpoint {
                        path: path.clone(),
                        method: method.to_uppercase(),
                        summary: op
                            .get("summary")
                            .and_then(Value::as_str)
                            .unwrap_or_default()
                            .to_string(),
                    })
            })
            .collect();

        endpoints.sort_by(|a, b| a.path.cmp(&b.path).then_with(|| a.method.cmp(&b.method)));

        Self {
            title: text("title"),
            version: text("version"),
            endpoints,
        }
    }

    /// Endpoints whose path contains `term`, case-insensitive.
    pub fn search(&self, term: &str) -> Vec<&CatalogEndpoint> {
        let term = term.to_lowercase();
        self.endpoints
            .iter()
            .filter(|e| e.path.to_lowercase().contains(&term))
            .collect()
    }
}
