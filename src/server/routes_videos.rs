//! Catalog and streaming API routes.
//!
//! - `GET  /videos` - every catalog entry
//! - `GET  /videos/available` - entries found by the latest scan
//! - `GET  /videos/list` - stream links for available entries
//! - `GET  /videos/:id` - one entry, available or not
//! - `GET  /videos/:id/stream` - file bytes, range-aware
//! - `POST /videos/scan` - rescan every library root

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tracing::info;
use vlib_common::{EntryId, Error};
use vlib_db::models::CatalogEntry;

use super::{AppContext, AppError};
use crate::streaming;

/// Create catalog routes.
pub fn video_routes() -> Router<AppContext> {
    Router::new()
        .route("/videos", get(list_videos))
        .route("/videos/available", get(list_available_videos))
        .route("/videos/list", get(list_video_links))
        .route("/videos/scan", post(scan_videos))
        .route("/videos/:id", get(get_video))
        .route("/videos/:id/stream", get(streaming::stream_video))
}

/// Parse a path id. Anything that is not a valid id cannot name an entry.
pub fn parse_entry_id(raw: &str) -> Result<EntryId, AppError> {
    raw.parse::<EntryId>()
        .map_err(|_| AppError::from(Error::not_found(format!("video {raw}"))))
}

// ============================================================================
// Response types
// ============================================================================

/// One row of the link listing.
#[derive(Debug, Serialize)]
pub struct VideoLink {
    pub id: String,
    pub name: String,
    /// Relative URL of the stream endpoint for this entry.
    pub link: String,
    pub format: String,
    pub size: u64,
    pub duration_ms: Option<u64>,
    pub available: bool,
}

impl From<&CatalogEntry> for VideoLink {
    fn from(entry: &CatalogEntry) -> Self {
        Self {
            id: entry.id.to_string(),
            name: entry.name.clone(),
            link: format!("/api/videos/{}/stream", entry.id),
            format: entry.format.clone(),
            size: entry.size_bytes,
            duration_ms: entry.duration_ms,
            available: entry.available,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VideoLinkList {
    pub count: usize,
    pub videos: Vec<VideoLink>,
}

#[derive(Debug, Serialize)]
pub struct ScanResponse {
    pub success: bool,
    pub message: String,
    /// Created plus updated entries.
    pub count: usize,
    pub created: usize,
    pub updated: usize,
    pub unavailable: usize,
}

// ============================================================================
// Handlers
// ============================================================================

async fn list_videos(State(ctx): State<AppContext>) -> Result<Json<Vec<CatalogEntry>>, AppError> {
    Ok(Json(ctx.library.list_all()?))
}

async fn list_available_videos(
    State(ctx): State<AppContext>,
) -> Result<Json<Vec<CatalogEntry>>, AppError> {
    Ok(Json(ctx.library.list_available()?))
}

async fn list_video_links(State(ctx): State<AppContext>) -> Result<Json<VideoLinkList>, AppError> {
    let videos: Vec<VideoLink> = ctx
        .library
        .list_available()?
        .iter()
        .map(VideoLink::from)
        .collect();
    Ok(Json(VideoLinkList {
        count: videos.len(),
        videos,
    }))
}

async fn get_video(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Json<CatalogEntry>, AppError> {
    let id = parse_entry_id(&id)?;
    Ok(Json(ctx.library.get(id)?))
}

async fn scan_videos(State(ctx): State<AppContext>) -> Result<Json<ScanResponse>, AppError> {
    info!("Scan requested via API");
    let result = ctx.library.clone().scan_blocking().await?;

    Ok(Json(ScanResponse {
        success: true,
        message: format!(
            "Scan complete: {} created, {} updated, {} unavailable",
            result.created, result.updated, result.unavailable
        ),
        count: result.touched(),
        created: result.created,
        updated: result.updated,
        unavailable: result.unavailable,
    }))
}
