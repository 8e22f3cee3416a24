//! Database connection pool management.
//!
//! Connection pooling for SQLite using r2d2: pool initialization, per-connection
//! setup, and running migrations.

use std::time::Duration;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use vlib_common::{Error, Result};

use crate::migrations;

/// Type alias for the database connection pool.
pub type DbPool = Pool<SqliteConnectionManager>;

/// Type alias for a pooled database connection.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// How long a connection waits on a locked database before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Initialize a new database pool with the given file path.
///
/// Creates the SQLite file if needed, sets a busy timeout on every connection
/// (scans and enrichment write concurrently), and runs pending migrations.
///
/// # Example
///
/// ```no_run
/// use vlib_db::pool::init_pool;
///
/// let pool = init_pool("/var/lib/vlib/vlib.db").unwrap();
/// let conn = pool.get().unwrap();
/// ```
pub fn init_pool(db_path: &str) -> Result<DbPool> {
    let manager =
        SqliteConnectionManager::file(db_path).with_init(|conn| conn.busy_timeout(BUSY_TIMEOUT));

    let pool = Pool::builder()
        .max_size(4)
        .build(manager)
        .map_err(|e| Error::database(format!("Failed to create connection pool: {}", e)))?;

    migrate(&pool)?;
    Ok(pool)
}

/// Initialize an in-memory database pool for testing.
///
/// Every SQLite in-memory connection is its own database, so this pool holds a
/// single connection that is never recycled. The database is lost when the
/// pool is dropped.
///
/// # Example
///
/// ```
/// use vlib_db::pool::init_memory_pool;
///
/// let pool = init_memory_pool().unwrap();
/// let conn = pool.get().unwrap();
/// ```
pub fn init_memory_pool() -> Result<DbPool> {
    let manager = SqliteConnectionManager::memory();

    let pool = Pool::builder()
        .max_size(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .build(manager)
        .map_err(|e| Error::database(format!("Failed to create in-memory pool: {}", e)))?;

    migrate(&pool)?;
    Ok(pool)
}

fn migrate(pool: &DbPool) -> Result<()> {
    let conn = pool
        .get()
        .map_err(|e| Error::database(format!("Failed to get connection for migrations: {}", e)))?;

    migrations::run_migrations(&conn)?;
    Ok(())
}

/// Get a connection from the pool.
///
/// Convenience wrapper around `pool.get()` that converts the r2d2 error into
/// the common Error type.
pub fn get_conn(pool: &DbPool) -> Result<PooledConnection> {
    pool.get()
        .map_err(|e| Error::database(format!("Failed to get connection from pool: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_memory_pool() {
        let pool = init_memory_pool().unwrap();
        assert_eq!(pool.max_size(), 1);
    }

    #[test]
    fn test_migrations_run_on_init() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='catalog_entries'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_file_pool_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.db");
        let path = path.to_str().unwrap();

        {
            let pool = init_pool(path).unwrap();
            let conn = get_conn(&pool).unwrap();
            conn.execute(
                "INSERT INTO catalog_entries (id, path, name, size_bytes, modified_ms, created_at)
                 VALUES ('id-1', '/v/a.mp4', 'a.mp4', 1, 0, '2024-01-01T00:00:00Z')",
                [],
            )
            .unwrap();
        }

        let pool = init_pool(path).unwrap();
        let conn = get_conn(&pool).unwrap();
        let name: String = conn
            .query_row(
                "SELECT name FROM catalog_entries WHERE id = 'id-1'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(name, "a.mp4");
    }
}
