//! Direct streaming with HTTP range requests.

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::Response,
};

use crate::server::{parse_entry_id, AppContext, AppError};

/// Stream a catalog entry, honouring a single-range `Range` header.
///
/// Replies `200` with the whole file, or `206` with `Content-Range` for a
/// satisfiable range. Malformed and unsatisfiable ranges are answered with
/// `416` before any byte is read.
pub async fn stream_video(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let id = parse_entry_id(&id)?;

    // A header that is not valid ASCII is malformed, not absent.
    let range_header = headers
        .get(header::RANGE)
        .map(|h| h.to_str().unwrap_or_default());

    let stream = ctx.library.stream(id, range_header).await?;

    let mut builder = Response::builder()
        .header(header::CONTENT_TYPE, stream.content_type)
        .header(header::CONTENT_LENGTH, stream.content_length.to_string())
        .header(header::ACCEPT_RANGES, "bytes");

    builder = match stream.range {
        Some(range) => builder
            .status(StatusCode::PARTIAL_CONTENT)
            .header(header::CONTENT_RANGE, range.content_range()),
        None => builder.status(StatusCode::OK),
    };

    builder
        .body(Body::from_stream(stream.body))
        .map_err(|e| AppError::from(vlib_common::Error::internal(e.to_string())))
}
