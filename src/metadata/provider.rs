//! The metadata lookup boundary.
//!
//! A lookup is two calls: the file name is turned into a predicted title, and
//! the title is resolved to external identifiers. Either call may fail or hang;
//! callers bound them with a timeout.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use vlib_common::{Error, Result};
use vlib_db::models::EntryMetadata;

/// External identifiers resolved for a predicted title.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalIds {
    pub tmdb_id: Option<i64>,
    pub omdb_id: Option<String>,
}

/// Async trait implemented by metadata backends.
#[async_trait]
pub trait MetadataLookup: Send + Sync {
    /// Short, lowercase identifier for this lookup (e.g. `"http"`).
    fn name(&self) -> &'static str;

    /// Predict a clean title from a file name such as `The.Matrix.1999.1080p.mkv`.
    async fn predict_title(&self, candidate_name: &str) -> Result<String>;

    /// Resolve external identifiers for a predicted title.
    async fn external_ids(&self, title: &str) -> Result<ExternalIds>;
}

/// Run both lookup steps for `candidate_name`, starting from `current`.
///
/// On failure the error is returned together with whatever was learned before
/// it: a predicted title survives a failed identifier lookup.
pub async fn lookup_metadata(
    lookup: &dyn MetadataLookup,
    candidate_name: &str,
    current: EntryMetadata,
) -> std::result::Result<EntryMetadata, (EntryMetadata, Error)> {
    let mut metadata = current;

    let title = match lookup.predict_title(candidate_name).await {
        Ok(title) => title,
        Err(e) => return Err((metadata, e)),
    };
    info!("Got predicted name for '{}': '{}'", candidate_name, title);
    metadata.predicted_title = Some(title.clone());

    match lookup.external_ids(&title).await {
        Ok(ids) => {
            info!(
                "Got IDs for '{}': TMDB={:?}, OMDB={:?}",
                title, ids.tmdb_id, ids.omdb_id
            );
            if ids.tmdb_id.is_some() {
                metadata.tmdb_id = ids.tmdb_id;
            }
            if ids.omdb_id.is_some() {
                metadata.omdb_id = ids.omdb_id;
            }
            Ok(metadata)
        }
        Err(e) => {
            warn!(title = %title, error = %e, "Identifier lookup failed");
            Err((metadata, e))
        }
    }
}
