use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::streaming::DEFAULT_CHUNK_SIZE;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub library: LibraryConfig,

    #[serde(default)]
    pub streaming: StreamingConfig,

    #[serde(default)]
    pub metadata: MetadataConfig,

    #[serde(default)]
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LibraryConfig {
    /// Directories scanned recursively for media files
    #[serde(default)]
    pub roots: Vec<PathBuf>,

    /// Recognised extensions, matched case-insensitively (leading dot optional)
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Run a scan when the server starts
    #[serde(default = "default_true")]
    pub scan_on_startup: bool,
}

fn default_extensions() -> Vec<String> {
    vlib_common::paths::default_extensions()
}

fn default_true() -> bool {
    true
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            extensions: default_extensions(),
            scan_on_startup: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StreamingConfig {
    /// Bytes read from disk per streamed chunk
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MetadataConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Endpoint answering `{token, name} -> {predicted_name}`
    #[serde(default)]
    pub name_url: String,

    /// Endpoint answering `{token, name} -> {tmdb_id, omdb_id}`
    #[serde(default)]
    pub ids_url: String,

    #[serde(default)]
    pub token: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_requests_per_second() -> u32 {
    4
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            name_url: String::new(),
            ids_url: String::new(),
            token: String::new(),
            timeout_secs: default_timeout_secs(),
            requests_per_second: default_requests_per_second(),
        }
    }
}

impl MetadataConfig {
    /// Per-request HTTP timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    /// Budget for one enrichment job: a title request then an identifier
    /// request, each bounded by [`request_timeout`](Self::request_timeout).
    pub fn lookup_timeout(&self) -> Duration {
        self.request_timeout() * 2
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// SQLite file; defaults to `vlib.db` next to the config file
    #[serde(default)]
    pub path: Option<PathBuf>,
}
