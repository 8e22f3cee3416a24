//! Catalog reconciliation.
//!
//! [`plan`] aligns the stored catalog with a fresh scan without side effects;
//! [`Reconciler`] writes the plan back one entry at a time. Every existing
//! entry starts the pass as unavailable and is flipped back when its path is
//! rediscovered, so after a pass the available set is exactly the scanned set.
//!
//! Renames are not detected: the old path is left unavailable and the new path
//! becomes a new entry.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info, warn};
use vlib_common::paths::{display_name, file_format};
use vlib_common::Result;
use vlib_db::models::CatalogEntry;
use vlib_db::store::CatalogStore;

use super::walk::ScannedFile;
use crate::metadata::{EnrichmentJob, EnrichmentSink};

/// Counts reported by one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanResult {
    /// New paths added to the catalog.
    pub created: usize,
    /// Rediscovered entries whose size or modification time changed.
    pub updated: usize,
    /// Entries left unavailable after the pass.
    pub unavailable: usize,
    /// Entries handed to the enrichment queue.
    pub enrichment_queued: usize,
    /// Entries whose write failed; they keep their previous stored state.
    pub failed: usize,
}

impl ScanResult {
    /// Created plus updated entries.
    pub fn touched(&self) -> usize {
        self.created + self.updated
    }
}

/// What a pass decided for one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// First time this path was seen.
    Created,
    /// Size or modification time differs from the stored value.
    Updated,
    /// Unchanged file that was unavailable and is back on disk.
    Restored,
    /// Unchanged and still available.
    Unchanged,
    /// Was available, not found in this pass.
    MarkedUnavailable,
    /// Was already unavailable and is still missing.
    StillMissing,
}

/// One entry's target state after the pass.
#[derive(Debug, Clone)]
pub struct PlannedChange {
    pub entry: CatalogEntry,
    pub kind: ChangeKind,
    /// The stored row differs from `entry` and must be written.
    pub write: bool,
    /// The entry should be queued for metadata enrichment.
    pub enrich: bool,
}

/// Diff a scan against the stored catalog.
///
/// Joins on the path string exactly as the filesystem reported it. Entries are
/// returned scanned files first (in scan order), then entries that were not
/// rediscovered.
pub fn plan(existing: Vec<CatalogEntry>, scanned: Vec<ScannedFile>) -> Vec<PlannedChange> {
    let mut by_path: HashMap<String, CatalogEntry> = existing
        .into_iter()
        .map(|entry| (entry.path.clone(), entry))
        .collect();

    let mut changes = Vec::with_capacity(scanned.len() + by_path.len());

    for file in scanned {
        let path = file.path.to_string_lossy().into_owned();
        let name = display_name(&file.path);
        let format = file_format(&file.path);

        let change = match by_path.remove(&path) {
            None => PlannedChange {
                entry: CatalogEntry::discovered(
                    path,
                    name,
                    format,
                    file.size_bytes,
                    file.modified_at,
                ),
                kind: ChangeKind::Created,
                write: true,
                enrich: true,
            },
            Some(mut entry) => {
                let changed = entry.size_bytes != file.size_bytes
                    || entry.modified_at != file.modified_at;
                let was_available = entry.available;
                entry.available = true;

                if changed {
                    entry.name = name;
                    entry.format = format;
                    entry.size_bytes = file.size_bytes;
                    entry.modified_at = file.modified_at;
                    PlannedChange {
                        entry,
                        kind: ChangeKind::Updated,
                        write: true,
                        enrich: true,
                    }
                } else {
                    let enrich = entry.lacks_external_ids();
                    PlannedChange {
                        entry,
                        kind: if was_available {
                            ChangeKind::Unchanged
                        } else {
                            ChangeKind::Restored
                        },
                        write: !was_available,
                        enrich,
                    }
                }
            }
        };
        changes.push(change);
    }

    for (_, mut entry) in by_path {
        let was_available = entry.available;
        entry.available = false;
        changes.push(PlannedChange {
            entry,
            kind: if was_available {
                ChangeKind::MarkedUnavailable
            } else {
                ChangeKind::StillMissing
            },
            write: was_available,
            enrich: false,
        });
    }

    changes
}

/// Applies reconciliation passes against a [`CatalogStore`].
pub struct Reconciler<'a> {
    store: &'a dyn CatalogStore,
    enrichment: Option<&'a dyn EnrichmentSink>,
}

impl<'a> Reconciler<'a> {
    pub fn new(store: &'a dyn CatalogStore) -> Self {
        Self {
            store,
            enrichment: None,
        }
    }

    /// Queue created, changed and identifier-less entries on `sink`.
    pub fn with_enrichment(mut self, sink: &'a dyn EnrichmentSink) -> Self {
        self.enrichment = Some(sink);
        self
    }

    /// Run one pass over `scanned`.
    ///
    /// Fails only when the current catalog cannot be read. Individual write
    /// failures are logged and counted; the pass continues with the next
    /// entry.
    pub fn reconcile(&self, scanned: Vec<ScannedFile>) -> Result<ScanResult> {
        let existing = self.store.find_all()?;
        let scanned_count = scanned.len();
        let changes = plan(existing, scanned);

        let mut result = ScanResult::default();

        for change in changes {
            if change.write {
                if let Err(e) = self.store.save(&change.entry) {
                    warn!(
                        path = %change.entry.path,
                        error = %e,
                        "Failed to persist catalog entry, continuing"
                    );
                    result.failed += 1;
                    continue;
                }
            }

            match change.kind {
                ChangeKind::Created => {
                    info!("Adding new video to catalog: {}", change.entry.name);
                    result.created += 1;
                }
                ChangeKind::Updated => {
                    info!("Updating existing video: {}", change.entry.name);
                    result.updated += 1;
                }
                ChangeKind::Restored => {
                    debug!(path = %change.entry.path, "Entry available again");
                }
                ChangeKind::Unchanged => {}
                ChangeKind::MarkedUnavailable => {
                    debug!(path = %change.entry.path, "Entry no longer on disk");
                    result.unavailable += 1;
                }
                ChangeKind::StillMissing => result.unavailable += 1,
            }

            if change.enrich {
                if let Some(sink) = self.enrichment {
                    if sink.enqueue(EnrichmentJob::for_entry(&change.entry)) {
                        result.enrichment_queued += 1;
                    }
                }
            }
        }

        info!(
            scanned = scanned_count,
            created = result.created,
            updated = result.updated,
            unavailable = result.unavailable,
            enrichment_queued = result.enrichment_queued,
            failed = result.failed,
            "Reconciliation complete"
        );

        Ok(result)
    }
}
