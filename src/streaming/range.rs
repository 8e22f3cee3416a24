//! Byte range model.
//!
//! Supports the single-range forms of the `Range` header:
//! - `bytes=0-499`
//! - `bytes=500-`
//! - `bytes=-500` (last 500 bytes)
//!
//! Only the first range of a comma-separated list is used.

use vlib_common::{Error, Result};

/// A range as written by the client, before it is checked against a length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeSpec {
    /// `start-end` or `start-`.
    FromStart { start: u64, end: Option<u64> },
    /// `-n`: the final `n` bytes.
    Suffix(u64),
}

impl RangeSpec {
    /// Parse a `Range` header value. `None` means the header is malformed.
    pub fn parse(header: &str) -> Option<Self> {
        let (unit, ranges) = header.trim().split_once('=')?;
        if !unit.trim().eq_ignore_ascii_case("bytes") {
            return None;
        }

        let first = ranges.split(',').next()?.trim();
        let (start, end) = first.split_once('-')?;
        let (start, end) = (start.trim(), end.trim());

        match (start.is_empty(), end.is_empty()) {
            (true, false) => end.parse().ok().map(RangeSpec::Suffix),
            (false, true) => Some(RangeSpec::FromStart {
                start: start.parse().ok()?,
                end: None,
            }),
            (false, false) => Some(RangeSpec::FromStart {
                start: start.parse().ok()?,
                end: Some(end.parse().ok()?),
            }),
            (true, true) => None,
        }
    }

    /// Resolve against a resource of `total` bytes.
    pub fn resolve(self, total: u64) -> Result<RangeRequest> {
        match self {
            RangeSpec::FromStart { start, end } => RangeRequest::normalize(Some(start), end, total),
            RangeSpec::Suffix(0) => Err(Error::invalid_range(total)),
            RangeSpec::Suffix(n) => {
                RangeRequest::normalize(Some(total.saturating_sub(n)), None, total)
            }
        }
    }
}

/// A satisfiable inclusive byte range of a resource.
///
/// Always `start <= end <= total - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeRequest {
    pub start: u64,
    pub end: u64,
    pub total: u64,
}

impl RangeRequest {
    /// Build a range from optional bounds.
    ///
    /// A missing start is `0`, a missing or oversized end is `total - 1`.
    /// Fails with [`Error::InvalidRange`] when the start lies past the end of
    /// the resource or after the end bound.
    pub fn normalize(start: Option<u64>, end: Option<u64>, total: u64) -> Result<Self> {
        let last = total
            .checked_sub(1)
            .ok_or_else(|| Error::invalid_range(total))?;
        let start = start.unwrap_or(0);
        let end = end.map_or(last, |end| end.min(last));

        if start > last || start > end {
            return Err(Error::invalid_range(total));
        }

        Ok(Self { start, end, total })
    }

    /// The whole resource. `None` for an empty one.
    pub fn full(total: u64) -> Option<Self> {
        Self::normalize(None, None, total).ok()
    }

    /// Number of bytes covered.
    pub fn length(&self) -> u64 {
        self.end - self.start + 1
    }

    /// `Content-Range` header value.
    pub fn content_range(&self) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, self.total)
    }
}
