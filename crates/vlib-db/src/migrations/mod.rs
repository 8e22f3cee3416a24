//! Embedded schema migrations.
//!
//! Each script runs once, in version order, inside its own transaction. The
//! highest applied version is recorded in `schema_migrations`.

use rusqlite::Connection;
use vlib_common::{Error, Result};

/// `(version, name, sql)` in ascending version order.
const MIGRATIONS: &[(i64, &str, &str)] = &[(1, "catalog", include_str!("001_catalog.sql"))];

/// Apply every migration newer than the recorded schema version.
///
/// Returns the number of migrations applied.
pub fn run_migrations(conn: &Connection) -> Result<usize> {
    let db_err = |version: i64, e: rusqlite::Error| {
        Error::database(format!("migration {version} failed: {e}"))
    };

    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY NOT NULL,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
    )
    .map_err(|e| db_err(0, e))?;

    let applied: i64 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .map_err(|e| db_err(0, e))?;

    let mut count = 0;
    for &(version, name, sql) in MIGRATIONS.iter().filter(|(v, _, _)| *v > applied) {
        let tx = conn.unchecked_transaction().map_err(|e| db_err(version, e))?;
        tx.execute_batch(sql).map_err(|e| db_err(version, e))?;
        tx.execute(
            "INSERT INTO schema_migrations (version, name) VALUES (?1, ?2)",
            rusqlite::params![version, name],
        )
        .map_err(|e| db_err(version, e))?;
        tx.commit().map_err(|e| db_err(version, e))?;

        tracing::info!(version, name, "Applied migration");
        count += 1;
    }

    Ok(count)
}
