//! URL classification.
//!
//! Maps a platform page URL to the object type and record id it shows.
//! Each product area encodes the object type differently in its routes:
//!
//! ```text
//! /clm/<...>/<...>/<type?>/.../<id>      default Agreement
//! /cpq/<...>/<...>/<type?>/.../<id>      default Proposal
//! /cadmin/<type>/<...>/<type?>/.../<id>  renamed admin types
//! /.../entity/<Type>/.../<id>            literal type
//! ```
//!
//! Positional rules (`segment[3]`, `segment[1]`, ...) index the whole path,
//! not the position of the marker.

use url::Url;

use crate::models::{PlatformArea, UrlClassification};

/// Admin route names that differ from their data API object names.
const ADMIN_RENAMES: &[(&str, &str)] = &[
    ("Catalog", "Category"),
    ("AttributeRule", "ProductAttributeRule"),
    ("VisibilityRule", "SearchFilter"),
    ("Rollup", "FieldExpression"),
    ("WaterfallList", "Waterfall"),
];

/// Classifies a page URL.
///
/// Accepts absolute URLs or bare paths. Query string and fragment are ignored.
pub fn classify(url: &str) -> UrlClassification {
    let segments = path_segments(url);
    let refs: Vec<&str> = segments.iter().map(String::as_str).collect();
    classify_segments(&refs)
}

/// Classifies already-split, non-empty path segments.
pub fn classify_segments(segments: &[&str]) -> UrlClassification {
    let Some((area, marker)) = PlatformArea::detect(segments) else {
        return UrlClassification::default();
    };

    let object_type = match area {
        PlatformArea::Clm => clm_object_type(segments),
        PlatformArea::Cpq => cpq_object_type(segments),
        PlatformArea::Cadmin => cadmin_object_type(segments, marker),
        PlatformArea::Entity => segments[marker + 1].to_string(),
    };

    UrlClassification {
        object_type: Some(object_type),
        record_id: segments.last().map(|s| (*s).to_string()),
    }
}

/// Splits the path of `url` into non-empty segments.
pub fn path_segments(url: &str) -> Vec<String> {
    let path = match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.split(['?', '#']).next().unwrap_or_default().to_string(),
    };

    path.split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Converts `waterfall-list`, `attribute_rule` or `search filter` style
/// names to `PascalCase`.
///
/// The input is lowercased first, so `CLAUSE` becomes `Clause`.
pub fn pascal_case(input: &str) -> String {
    input
        .to_lowercase()
        .split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(capitalize)
        .collect()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn clm_object_type(segments: &[&str]) -> String {
    match segments.get(3) {
        None => "Agreement".to_string(),
        Some(seg) => match pascal_case(seg).as_str() {
            "Clause" => "AgreementClause".to_string(),
            "Approval" => "ApprovalRequest".to_string(),
            other => other.to_string(),
        },
    }
}

fn cpq_object_type(segments: &[&str]) -> String {
    match segments.get(3) {
        None => "Proposal".to_string(),
        Some(seg) => match pascal_case(seg).as_str() {
            "Approval" => "ApprovalRequest".to_string(),
            other => other.to_string(),
        },
    }
}

fn cadmin_object_type(segments: &[&str], marker: usize) -> String {
    let mut name = pascal_case(segments[marker + 1]);
    if let Some((_, renamed)) = ADMIN_RENAMES.iter().find(|(from, _)| *from == name) {
        name = (*renamed).to_string();
    }

    let Some(seg) = segments.get(3) else {
        return name;
    };

    name = pascal_case(seg);
    if segments.get(2) == Some(&"edit") {
        // Edit routes carry the type at [1], or at [4] when present.
        name = pascal_case(segments[1]);
        if let Some(nested) = segments.get(4) {
            name = pascal_case(nested);
        }
    }

    match name.as_str() {
        "Approval" => "ApprovalRequest".to_string(),
        "Catalog" => "Category".to_string(),
        _ => name,
    }
}

// ============================================================================
// Tests
// ============================================================================
