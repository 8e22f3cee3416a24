//! Resolves catalog entries to byte streams.

use std::io::SeekFrom;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::fs::File;
use tokio::io::AsyncSeekExt;
use tracing::{debug, warn};
use vlib_common::{EntryId, Error, Result};
use vlib_db::models::CatalogEntry;
use vlib_db::store::CatalogStore;

use super::chunks::{read_chunks, ChunkStream, DEFAULT_CHUNK_SIZE};
use super::range::{RangeRequest, RangeSpec};

/// An opened stream, ready to be written to a response.
pub struct MediaStream {
    pub entry: CatalogEntry,
    pub content_type: &'static str,
    /// Size of the file on disk when the stream was opened.
    pub total: u64,
    /// The satisfied range, or `None` for a full-content response.
    pub range: Option<RangeRequest>,
    /// Exact number of bytes `body` yields on success.
    pub content_length: u64,
    pub body: ChunkStream,
}

impl std::fmt::Debug for MediaStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaStream")
            .field("entry", &self.entry.id)
            .field("content_type", &self.content_type)
            .field("total", &self.total)
            .field("range", &self.range)
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

/// Opens catalog entries for full or ranged reads.
///
/// The file is stat-ed on every request; the size stored in the catalog is
/// only as fresh as the last scan.
#[derive(Clone)]
pub struct StreamingEngine {
    store: Arc<dyn CatalogStore>,
    chunk_size: usize,
}

impl StreamingEngine {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self {
            store,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Open entry `id`, honouring an optional `Range` header value.
    ///
    /// Errors:
    /// - [`Error::NotFound`] for an unknown id, or a file gone from disk
    /// - [`Error::InvalidRange`] for a malformed or unsatisfiable range,
    ///   detected before any byte is read
    pub async fn open(&self, id: EntryId, range_header: Option<&str>) -> Result<MediaStream> {
        let store = self.store.clone();
        let entry = tokio::task::spawn_blocking(move || store.find_by_id(id))
            .await
            .map_err(|e| Error::internal(format!("store lookup task failed: {e}")))??
            .ok_or_else(|| Error::not_found(format!("video {id}")))?;

        let path = PathBuf::from(&entry.path);
        let total = match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => meta.len(),
            Ok(_) => return Err(Error::not_found(format!("{} is not a file", entry.path))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(id = %id, path = %entry.path, "Catalogued file missing from disk");
                return Err(Error::not_found(format!("file for video {id}")));
            }
            Err(e) => return Err(e.into()),
        };

        let range = match range_header {
            None => None,
            Some(header) => {
                let spec = RangeSpec::parse(header).ok_or_else(|| {
                    debug!(id = %id, header, "Malformed range header");
                    Error::invalid_range(total)
                })?;
                Some(spec.resolve(total)?)
            }
        };

        let (start, content_length) = match range {
            Some(r) => (r.start, r.length()),
            None => (0, total),
        };

        let mut file = match File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::not_found(format!("file for video {id}")));
            }
            Err(e) => return Err(e.into()),
        };
        if start > 0 {
            file.seek(SeekFrom::Start(start)).await?;
        }

        debug!(
            id = %id,
            start,
            length = content_length,
            total,
            partial = range.is_some(),
            "Opening stream"
        );

        let content_type = entry.container().mime_type();
        let body = read_chunks(file, path, content_length, self.chunk_size);

        Ok(MediaStream {
            entry,
            content_type,
            total,
            range,
            content_length,
            body,
        })
    }
}
