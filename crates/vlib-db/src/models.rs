//! Rust models matching the database schema.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vlib_common::{ContainerFormat, EntryId};

/// One discovered media file and its known metadata.
///
/// `path` is the reconciliation key and is unique across the catalog. Entries
/// are never deleted: a file missing from the latest scan keeps its row with
/// `available = false`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogEntry {
    pub id: EntryId,
    pub path: String,
    pub name: String,
    /// Lowercase extension without the dot.
    pub format: String,
    pub size_bytes: u64,
    pub modified_at: DateTime<Utc>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub duration_ms: Option<u64>,
    pub available: bool,
    pub predicted_title: Option<String>,
    pub tmdb_id: Option<i64>,
    pub omdb_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl CatalogEntry {
    /// A freshly discovered entry: available, with empty metadata.
    pub fn discovered(
        path: impl Into<String>,
        name: impl Into<String>,
        format: impl Into<String>,
        size_bytes: u64,
        modified_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: EntryId::new(),
            path: path.into(),
            name: name.into(),
            format: format.into(),
            size_bytes,
            modified_at,
            width: None,
            height: None,
            duration_ms: None,
            available: true,
            predicted_title: None,
            tmdb_id: None,
            omdb_id: None,
            created_at: Utc::now(),
        }
    }

    /// True while either external identifier is still unknown.
    pub fn lacks_external_ids(&self) -> bool {
        self.tmdb_id.is_none() || self.omdb_id.is_none()
    }

    /// Container format resolved from `format`.
    pub fn container(&self) -> ContainerFormat {
        ContainerFormat::from_format(&self.format)
    }

    /// Snapshot of the enrichment fields.
    pub fn metadata(&self) -> EntryMetadata {
        EntryMetadata {
            predicted_title: self.predicted_title.clone(),
            tmdb_id: self.tmdb_id,
            omdb_id: self.omdb_id.clone(),
        }
    }
}

/// Externally sourced descriptive metadata for an entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EntryMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predicted_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tmdb_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub omdb_id: Option<String>,
}
