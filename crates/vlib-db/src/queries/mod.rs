//! Database query modules.
//!
//! - entries: catalog entry upserts and lookups

pub mod entries;
