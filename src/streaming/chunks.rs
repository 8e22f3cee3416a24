//! Chunked file reads.
//!
//! The body of a stream response is a pull-based sequence of fixed-size chunks:
//! the next chunk is only read from disk once the consumer asks for it, so a
//! slow client holds at most one chunk in memory.

use std::path::PathBuf;
use std::pin::Pin;

use async_stream::stream;
use bytes::{Bytes, BytesMut};
use futures::Stream;
use tokio::fs::File;
use tokio::io::AsyncReadExt;
use tracing::error;
use vlib_common::Error;

/// Bytes read per chunk unless configured otherwise.
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

/// Stream of file chunks.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<Bytes, Error>> + Send>>;

/// Read exactly `len` bytes from the current position of `file`.
///
/// A read failure (including the file shrinking underneath us) ends the
/// stream with a single [`Error::StreamIo`]; no further chunks follow.
pub fn read_chunks(mut file: File, path: PathBuf, len: u64, chunk_size: usize) -> ChunkStream {
    let chunk_size = chunk_size.max(1) as u64;

    Box::pin(stream! {
        let mut remaining = len;
        while remaining > 0 {
            let want = remaining.min(chunk_size) as usize;
            let mut buf = BytesMut::zeroed(want);
            if let Err(e) = file.read_exact(&mut buf).await {
                error!(
                    path = %path.display(),
                    remaining,
                    error = %e,
                    "Read failed mid-stream, aborting response"
                );
                yield Err(Error::stream_io(format!("{}: {e}", path.display())));
                return;
            }
            remaining -= want as u64;
            yield Ok(buf.freeze());
        }
    })
}
