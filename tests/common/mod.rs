//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which creates a scratch media directory, an
//! in-memory catalog, and a full [`AppContext`] whose library scans that
//! directory. The [`with_server`](TestHarness::with_server) constructor starts
//! Axum on a random port for HTTP-level testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tempfile::TempDir;

use vlib::config::Config;
use vlib::metadata::{EnrichmentSink, ExternalIds, MetadataLookup};
use vlib::scanner::ScanResult;
use vlib::server::{create_router, AppContext};
use vlib::Library;
use vlib_common::{Error, Result};
use vlib_db::models::CatalogEntry;
use vlib_db::pool::init_memory_pool;
use vlib_db::store::{CatalogStore, SqliteCatalogStore};

/// Test harness wrapping a fully-constructed [`AppContext`] backed by an
/// in-memory database and a temporary media root.
pub struct TestHarness {
    pub media: TempDir,
    pub store: Arc<SqliteCatalogStore>,
    pub library: Arc<Library>,
    pub ctx: AppContext,
}

impl TestHarness {
    /// Default configuration, no enrichment.
    pub fn new() -> Self {
        Self::build(Config::default(), None)
    }

    /// Custom configuration; its roots are replaced by the scratch directory.
    pub fn with_config(config: Config) -> Self {
        Self::build(config, None)
    }

    /// Default configuration with scans feeding `sink`.
    pub fn with_enrichment(sink: Arc<dyn EnrichmentSink>) -> Self {
        Self::build(Config::default(), Some(sink))
    }

    fn build(mut config: Config, sink: Option<Arc<dyn EnrichmentSink>>) -> Self {
        let media = tempfile::tempdir().expect("failed to create media dir");
        config.library.roots = vec![media.path().to_path_buf()];

        let pool = init_memory_pool().expect("failed to create in-memory pool");
        let store = Arc::new(SqliteCatalogStore::new(pool));

        let mut library = Library::new(store.clone(), &config);
        if let Some(sink) = sink {
            library = library.with_enrichment(sink);
        }
        let library = Arc::new(library);
        let ctx = AppContext::new(library.clone(), config);

        Self {
            media,
            store,
            library,
            ctx,
        }
    }

    /// Start an Axum server on a random port and return the harness together
    /// with the bound socket address.
    pub async fn with_server() -> (Self, SocketAddr) {
        let harness = Self::new();
        let addr = harness.serve().await;
        (harness, addr)
    }

    /// Serve this harness's router on a random port.
    pub async fn serve(&self) -> SocketAddr {
        let app = create_router(self.ctx.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        addr
    }

    /// Write `data` to `relative` under the media root, creating parents.
    pub fn write_file(&self, relative: &str, data: &[u8]) -> PathBuf {
        let path = self.media.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("failed to create parent dir");
        }
        std::fs::write(&path, data).expect("failed to write media file");
        path
    }

    pub fn remove_file(&self, relative: &str) {
        std::fs::remove_file(self.media.path().join(relative)).expect("failed to remove file");
    }

    pub fn rename_file(&self, from: &str, to: &str) {
        std::fs::rename(self.media.path().join(from), self.media.path().join(to))
            .expect("failed to rename file");
    }

    /// Run a scan on the blocking pool.
    pub async fn scan(&self) -> ScanResult {
        self.library
            .clone()
            .scan_blocking()
            .await
            .expect("scan failed")
    }

    /// The stored entry whose file name is `name`.
    pub fn entry(&self, name: &str) -> CatalogEntry {
        self.store
            .find_all()
            .expect("failed to list catalog")
            .into_iter()
            .find(|e| e.name == name)
            .unwrap_or_else(|| panic!("no catalog entry named {name}"))
    }

    pub fn media_root(&self) -> &Path {
        self.media.path()
    }
}

/// Deterministic file contents: byte `i` is `i % 251`.
pub fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

/// Number of descriptors this process holds open on `path`.
#[cfg(target_os = "linux")]
pub fn open_handles(path: &Path) -> usize {
    let target = path.canonicalize().expect("failed to resolve media path");
    std::fs::read_dir("/proc/self/fd")
        .expect("failed to list /proc/self/fd")
        .filter_map(|fd| std::fs::read_link(fd.ok()?.path()).ok())
        .filter(|link| *link == target)
        .count()
}

/// Wait up to `limit` for every descriptor on `path` to be closed.
#[cfg(target_os = "linux")]
pub async fn handles_released(path: &Path, limit: std::time::Duration) -> bool {
    let deadline = tokio::time::Instant::now() + limit;
    while open_handles(path) > 0 {
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    true
}

/// Metadata lookup that counts calls and answers from the file name.
#[derive(Default)]
pub struct CountingLookup {
    pub title_calls: AtomicUsize,
    pub fail: bool,
}

impl CountingLookup {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.title_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetadataLookup for CountingLookup {
    fn name(&self) -> &'static str {
        "counting"
    }

    async fn predict_title(&self, candidate_name: &str) -> Result<String> {
        self.title_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::metadata_lookup("service unavailable"));
        }
        Ok(candidate_name
            .rsplit_once('.')
            .map_or(candidate_name, |(stem, _)| stem)
            .replace('.', " "))
    }

    async fn external_ids(&self, _title: &str) -> Result<ExternalIds> {
        Ok(ExternalIds {
            tmdb_id: Some(603),
            omdb_id: Some("tt0133093".into()),
        })
    }
}
