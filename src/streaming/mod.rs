//! Media streaming module.
//!
//! Serves catalog entries directly with HTTP range support.
//!
//! # Module layout
//!
//! - [`range`] -- `Range` header parsing and normalisation.
//! - [`chunks`] -- Pull-based chunked file reads.
//! - [`engine`] -- Resolves an entry id and range to a [`MediaStream`].
//! - `direct` -- The axum handler that turns a [`MediaStream`] into a response.
//!
//! # Routes
//!
//! - `GET /api/videos/{id}/stream` - Full or ranged file streaming

mod direct;
pub mod chunks;
pub mod engine;
pub mod range;

pub use chunks::{ChunkStream, DEFAULT_CHUNK_SIZE};
pub use direct::stream_video;
pub use engine::{MediaStream, StreamingEngine};
pub use range::{RangeRequest, RangeSpec};
