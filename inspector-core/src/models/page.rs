//! Page-level types: URL classification and page metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Platform Area
// ============================================================================

/// Product module identified by a marker segment in the URL path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformArea {
    /// Contract lifecycle management (`/clm/`).
    Clm,
    /// Configure-price-quote (`/cpq/`).
    Cpq,
    /// Revenue admin console (`/cadmin/`).
    Cadmin,
    /// Generic entity pages (`/entity/`).
    Entity,
}

impl PlatformArea {
    /// Areas in the order their markers are checked.
    pub const PRIORITY: [PlatformArea; 4] = [Self::Clm, Self::Cpq, Self::Cadmin, Self::Entity];

    /// Path segment that marks this area.
    pub fn marker(self) -> &'static str {
        match self {
            Self::Clm => "clm",
            Self::Cpq => "cpq",
            Self::Cadmin => "cadmin",
            Self::Entity => "entity",
        }
    }

    /// Finds the first area (in priority order) whose marker is present and
    /// followed by at least one more segment.
    ///
    /// Returns the area and the index of its marker segment.
    pub fn detect(segments: &[&str]) -> Option<(Self, usize)> {
        Self::PRIORITY.into_iter().find_map(|area| {
            segments
                .iter()
                .position(|s| *s == area.marker())
                .filter(|idx| idx + 1 < segments.len())
                .map(|idx| (area, idx))
        })
    }
}

impl std::fmt::Display for PlatformArea {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.marker())
    }
}

// ============================================================================
// URL Classification
// ============================================================================

/// Object type and record id derived from a page URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlClassification {
    /// Platform object type (e.g. `Agreement`).
    pub object_type: Option<String>,
    /// Record id, the final path segment.
    pub record_id: Option<String>,
}

impl UrlClassification {
    /// Creates a classification with both parts present.
    pub fn new(object_type: impl Into<String>, record_id: impl Into<String>) -> Self {
        Self {
            object_type: Some(object_type.into()),
            record_id: Some(record_id.into()),
        }
    }

    /// Returns true if nothing was recognised.
    pub fn is_empty(&self) -> bool {
        self.object_type.is_none() && self.record_id.is_none()
    }
}

// ============================================================================
// Page Events & Metadata
// ============================================================================

/// Navigation to a new URL inside the inspected page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageChange {
    /// New page URL.
    pub url: String,
    /// Object type classified from the URL.
    pub object_type: Option<String>,
    /// Record id classified from the URL.
    pub record_id: Option<String>,
    /// When the change was observed.
    pub timestamp: DateTime<Utc>,
}

/// Snapshot of the page being inspected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    /// Page URL.
    pub url: String,
    /// Object type classified from the URL.
    pub object_type: Option<String>,
    /// Record id classified from the URL.
    pub record_id: Option<String>,
    /// When the snapshot was taken.
    pub timestamp: DateTime<Utc>,
    /// Number of platform calls observed so far.
    pub api_calls: usize,
}
