//! vlib-common: shared types and utilities.
//!
//! - **Typed IDs**: [`EntryId`], a UUID wrapper for catalog entries
//! - **Container formats**: finite mapping from file extension to media type
//! - **Path utilities**: extension matching used by the scanner
//! - **Error handling**: the error taxonomy shared by every vlib crate
//!
//! # Examples
//!
//! ```
//! use vlib_common::{ContainerFormat, EntryId, Error, Result};
//! use vlib_common::paths::file_format;
//! use std::path::Path;
//!
//! let id = EntryId::new();
//! assert_eq!(file_format(Path::new("Movie.MKV")), "mkv");
//! assert_eq!(ContainerFormat::from_format("mkv").mime_type(), "video/x-matroska");
//!
//! fn example() -> Result<()> {
//!     Err(Error::not_found("entry"))
//! }
//! # let _ = id;
//! ```

pub mod error;
pub mod ids;
pub mod paths;
pub mod types;

pub use error::{Error, Result};
pub use ids::*;
pub use types::*;
