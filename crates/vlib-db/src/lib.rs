//! vlib-db: catalog persistence.
//!
//! SQLite storage for catalog entries using rusqlite and r2d2 connection
//! pooling.
//!
//! # Modules
//!
//! - `migrations` - Database schema migrations
//! - `pool` - Connection pool management
//! - `models` - Rust models matching the database schema
//! - `queries` - Database query operations
//! - `store` - The [`store::CatalogStore`] seam used by the scanner and streamer
//!
//! # Example
//!
//! ```no_run
//! use vlib_db::pool::init_pool;
//! use vlib_db::store::{CatalogStore, SqliteCatalogStore};
//!
//! let pool = init_pool("/var/lib/vlib/vlib.db").unwrap();
//! let store = SqliteCatalogStore::new(pool);
//!
//! for entry in store.find_available().unwrap() {
//!     println!("{} ({} bytes)", entry.name, entry.size_bytes);
//! }
//! ```

pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;
pub mod store;
