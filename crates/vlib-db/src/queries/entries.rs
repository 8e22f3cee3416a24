//! Catalog entry query operations.
//!
//! Writes are upserts keyed by `path`, so saving an entry that already exists
//! updates it in place and keeps its original `id` and `created_at`.

use chrono::{DateTime, Utc};
use rusqlite::{types::Type, Connection};
use uuid::Uuid;
use vlib_common::{EntryId, Error, Result};

use crate::models::{CatalogEntry, EntryMetadata};

const SELECT_ENTRY: &str = "SELECT id, path, name, format, size_bytes, modified_ms, width, height,
        duration_ms, available, predicted_title, tmdb_id, omdb_id, created_at
 FROM catalog_entries";

/// Insert an entry, or update the row that already has its path.
///
/// Enrichment columns are written only on insert. An existing row keeps its
/// stored metadata, which changes through [`update_entry_metadata`] alone, so
/// a save built from an older snapshot cannot erase a newer lookup result.
pub fn upsert_entry(conn: &Connection, entry: &CatalogEntry) -> Result<()> {
    conn.execute(
        "INSERT INTO catalog_entries (
            id, path, name, format, size_bytes, modified_ms, width, height, duration_ms,
            available, predicted_title, tmdb_id, omdb_id, created_at
         ) VALUES (
            :id, :path, :name, :format, :size_bytes, :modified_ms, :width, :height, :duration_ms,
            :available, :predicted_title, :tmdb_id, :omdb_id, :created_at
         )
         ON CONFLICT(path) DO UPDATE SET
            name = :name,
            format = :format,
            size_bytes = :size_bytes,
            modified_ms = :modified_ms,
            width = :width,
            height = :height,
            duration_ms = :duration_ms,
            available = :available",
        rusqlite::named_params! {
            ":id": entry.id.to_string(),
            ":path": &entry.path,
            ":name": &entry.name,
            ":format": &entry.format,
            ":size_bytes": entry.size_bytes as i64,
            ":modified_ms": entry.modified_at.timestamp_millis(),
            ":width": entry.width,
            ":height": entry.height,
            ":duration_ms": entry.duration_ms.map(|d| d as i64),
            ":available": entry.available,
            ":predicted_title": &entry.predicted_title,
            ":tmdb_id": entry.tmdb_id,
            ":omdb_id": &entry.omdb_id,
            ":created_at": entry.created_at.to_rfc3339(),
        },
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(())
}

/// Overwrite only the enrichment columns of an entry.
///
/// Availability and file attributes are left untouched so a late enrichment
/// result cannot undo a concurrent reconciliation write.
pub fn update_entry_metadata(
    conn: &Connection,
    id: EntryId,
    metadata: &EntryMetadata,
) -> Result<()> {
    let affected = conn
        .execute(
            "UPDATE catalog_entries
             SET predicted_title = :predicted_title, tmdb_id = :tmdb_id, omdb_id = :omdb_id
             WHERE id = :id",
            rusqlite::named_params! {
                ":id": id.to_string(),
                ":predicted_title": &metadata.predicted_title,
                ":tmdb_id": metadata.tmdb_id,
                ":omdb_id": &metadata.omdb_id,
            },
        )
        .map_err(|e| Error::database(e.to_string()))?;

    if affected == 0 {
        return Err(Error::not_found(format!("catalog entry {}", id)));
    }
    Ok(())
}

/// Get an entry by ID.
pub fn get_entry(conn: &Connection, id: EntryId) -> Result<Option<CatalogEntry>> {
    let result = conn.query_row(
        &format!("{SELECT_ENTRY} WHERE id = :id"),
        rusqlite::named_params! { ":id": id.to_string() },
        parse_entry_row,
    );

    match result {
        Ok(entry) => Ok(Some(entry)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// Get an entry by its absolute path.
pub fn get_entry_by_path(conn: &Connection, path: &str) -> Result<Option<CatalogEntry>> {
    let result = conn.query_row(
        &format!("{SELECT_ENTRY} WHERE path = :path"),
        rusqlite::named_params! { ":path": path },
        parse_entry_row,
    );

    match result {
        Ok(entry) => Ok(Some(entry)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// List every entry, available or not, ordered by name.
pub fn list_entries(conn: &Connection) -> Result<Vec<CatalogEntry>> {
    query_entries(conn, &format!("{SELECT_ENTRY} ORDER BY name, path"))
}

/// List entries seen by the most recent scan, ordered by name.
pub fn list_available_entries(conn: &Connection) -> Result<Vec<CatalogEntry>> {
    query_entries(
        conn,
        &format!("{SELECT_ENTRY} WHERE available = 1 ORDER BY name, path"),
    )
}

fn query_entries(conn: &Connection, sql: &str) -> Result<Vec<CatalogEntry>> {
    let mut stmt = conn
        .prepare(sql)
        .map_err(|e| Error::database(e.to_string()))?;

    let entries = stmt
        .query_map([], parse_entry_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(entries)
}

/// Parse an entry from a database row.
fn parse_entry_row(row: &rusqlite::Row) -> rusqlite::Result<CatalogEntry> {
    let id: String = row.get(0)?;
    let id = Uuid::parse_str(&id)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))?;

    let modified_ms: i64 = row.get(5)?;
    let created_at: String = row.get(13)?;

    Ok(CatalogEntry {
        id: EntryId::from(id),
        path: row.get(1)?,
        name: row.get(2)?,
        format: row.get(3)?,
        size_bytes: row.get::<_, i64>(4)?.max(0) as u64,
        modified_at: DateTime::from_timestamp_millis(modified_ms).unwrap_or_default(),
        width: row.get(6)?,
        height: row.get(7)?,
        duration_ms: row.get::<_, Option<i64>>(8)?.map(|d| d.max(0) as u64),
        available: row.get(9)?,
        predicted_title: row.get(10)?,
        tmdb_id: row.get(11)?,
        omdb_id: row.get(12)?,
        created_at: DateTime::parse_from_rfc3339(&created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
    })
}
