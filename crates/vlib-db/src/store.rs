//! The catalog store seam.
//!
//! The scanner, enrichment worker and streaming engine only see
//! [`CatalogStore`]; [`SqliteCatalogStore`] is the durable implementation.
//! Tests substitute lightweight fakes.

use vlib_common::{EntryId, Result};

use crate::models::{CatalogEntry, EntryMetadata};
use crate::pool::{get_conn, DbPool};
use crate::queries::entries;

/// Durable keyed storage for catalog entries.
pub trait CatalogStore: Send + Sync {
    /// Every entry, available or not.
    fn find_all(&self) -> Result<Vec<CatalogEntry>>;

    /// The entry stored under `path`, if any.
    fn find_by_path(&self, path: &str) -> Result<Option<CatalogEntry>>;

    /// The entry with `id`, if any.
    fn find_by_id(&self, id: EntryId) -> Result<Option<CatalogEntry>>;

    /// Entries seen by the most recent scan.
    fn find_available(&self) -> Result<Vec<CatalogEntry>>;

    /// Upsert keyed by path. Enrichment fields are only written for a new
    /// path; existing rows change them through [`save_metadata`](Self::save_metadata).
    fn save(&self, entry: &CatalogEntry) -> Result<()>;

    /// Overwrite the enrichment fields of `id` and nothing else.
    fn save_metadata(&self, id: EntryId, metadata: &EntryMetadata) -> Result<()>;
}

/// [`CatalogStore`] backed by the SQLite pool.
#[derive(Clone)]
pub struct SqliteCatalogStore {
    pool: DbPool,
}

impl SqliteCatalogStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

impl CatalogStore for SqliteCatalogStore {
    fn find_all(&self) -> Result<Vec<CatalogEntry>> {
        let conn = get_conn(&self.pool)?;
        entries::list_entries(&conn)
    }

    fn find_by_path(&self, path: &str) -> Result<Option<CatalogEntry>> {
        let conn = get_conn(&self.pool)?;
        entries::get_entry_by_path(&conn, path)
    }

    fn find_by_id(&self, id: EntryId) -> Result<Option<CatalogEntry>> {
        let conn = get_conn(&self.pool)?;
        entries::get_entry(&conn, id)
    }

    fn find_available(&self) -> Result<Vec<CatalogEntry>> {
        let conn = get_conn(&self.pool)?;
        entries::list_available_entries(&conn)
    }

    fn save(&self, entry: &CatalogEntry) -> Result<()> {
        let conn = get_conn(&self.pool)?;
        entries::upsert_entry(&conn, entry)
    }

    fn save_metadata(&self, id: EntryId, metadata: &EntryMetadata) -> Result<()> {
        let conn = get_conn(&self.pool)?;
        entries::update_entry_metadata(&conn, id, metadata)
    }
}
