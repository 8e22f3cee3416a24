//! The media library service.
//!
//! [`Library`] owns the catalog store and wires the scanner, reconciler,
//! enrichment queue and streaming engine together. The HTTP routes and the
//! CLI only talk to this type.

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::info;
use vlib_common::{EntryId, Error, Result};
use vlib_db::models::CatalogEntry;
use vlib_db::store::CatalogStore;

use crate::config::Config;
use crate::metadata::{EnrichmentJob, EnrichmentSink};
use crate::scanner::{scan_roots, Reconciler, ScanResult};
use crate::streaming::{MediaStream, StreamingEngine};

pub struct Library {
    store: Arc<dyn CatalogStore>,
    roots: Vec<PathBuf>,
    extensions: Vec<String>,
    enrichment: Option<Arc<dyn EnrichmentSink>>,
    streaming: StreamingEngine,
    /// Held for the duration of a scan so passes never interleave.
    scan_lock: Mutex<()>,
}

impl Library {
    /// Build a library over `store` using the `[library]` and `[streaming]`
    /// sections of `config`. Enrichment is off until
    /// [`with_enrichment`](Self::with_enrichment) is called.
    pub fn new(store: Arc<dyn CatalogStore>, config: &Config) -> Self {
        let streaming =
            StreamingEngine::new(store.clone()).with_chunk_size(config.streaming.chunk_size);
        Self {
            store,
            roots: config.library.roots.clone(),
            extensions: config.library.extensions.clone(),
            enrichment: None,
            streaming,
            scan_lock: Mutex::new(()),
        }
    }

    pub fn with_enrichment(mut self, sink: Arc<dyn EnrichmentSink>) -> Self {
        self.enrichment = Some(sink);
        self
    }

    pub fn store(&self) -> &Arc<dyn CatalogStore> {
        &self.store
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Walk every root and reconcile the catalog against what was found.
    ///
    /// Blocks the calling thread for the whole pass; async callers should use
    /// [`scan_blocking`](Self::scan_blocking). A second caller waits for the
    /// running pass and then performs its own.
    pub fn scan(&self) -> Result<ScanResult> {
        let _guard = self.scan_lock.lock();

        info!(roots = self.roots.len(), "Starting library scan");
        let scanned = scan_roots(&self.roots, &self.extensions);

        let reconciler = Reconciler::new(self.store.as_ref());
        let reconciler = match &self.enrichment {
            Some(sink) => reconciler.with_enrichment(sink.as_ref()),
            None => reconciler,
        };
        reconciler.reconcile(scanned)
    }

    /// [`scan`](Self::scan) on the blocking thread pool.
    pub async fn scan_blocking(self: Arc<Self>) -> Result<ScanResult> {
        tokio::task::spawn_blocking(move || self.scan())
            .await
            .map_err(|e| Error::internal(format!("scan task failed: {e}")))?
    }

    /// Every catalog entry, available or not.
    pub fn list_all(&self) -> Result<Vec<CatalogEntry>> {
        self.store.find_all()
    }

    /// Entries found by the most recent scan.
    pub fn list_available(&self) -> Result<Vec<CatalogEntry>> {
        self.store.find_available()
    }

    /// One entry by id, whether or not it is currently available.
    pub fn get(&self, id: EntryId) -> Result<CatalogEntry> {
        self.store
            .find_by_id(id)?
            .ok_or_else(|| Error::not_found(format!("video {id}")))
    }

    /// Open entry `id` for streaming. See [`StreamingEngine::open`].
    pub async fn stream(&self, id: EntryId, range_header: Option<&str>) -> Result<MediaStream> {
        self.streaming.open(id, range_header).await
    }

    /// Queue every available entry that still lacks external identifiers.
    ///
    /// Returns the number of jobs accepted. Does nothing when enrichment is
    /// disabled.
    pub fn queue_missing_metadata(&self) -> Result<usize> {
        let Some(sink) = &self.enrichment else {
            return Ok(0);
        };

        let queued = self
            .store
            .find_available()?
            .iter()
            .filter(|entry| entry.lacks_external_ids())
            .filter(|entry| sink.enqueue(EnrichmentJob::for_entry(entry)))
            .count();

        info!(queued, "Queued entries missing metadata");
        Ok(queued)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vlib_db::store::SqliteCatalogStore;

    #[derive(Default)]
    struct CountingSink {
        jobs: Mutex<Vec<EnrichmentJob>>,
    }

    impl EnrichmentSink for CountingSink {
        fn enqueue(&self, job: EnrichmentJob) -> bool {
            self.jobs.lock().push(job);
            true
        }
    }

    fn library_for(root: &std::path::Path) -> Library {
        let store = SqliteCatalogStore::new(vlib_db::pool::init_memory_pool().unwrap());
        let mut config = Config::default();
        config.library.roots = vec![root.to_path_buf()];
        Library::new(Arc::new(store), &config)
    }

    #[test]
    fn test_scan_and_lookup() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.mp4"), b"aaaa").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();

        let library = library_for(dir.path());
        let result = library.scan().unwrap();
        assert_eq!(result.created, 1);
        assert_eq!(result.touched(), 1);

        let entries = library.list_available().unwrap();
        assert_eq!(entries.len(), 1);
        let entry = library.get(entries[0].id).unwrap();
        assert_eq!(entry.name, "a.mp4");
        assert_eq!(entry.size_bytes, 4);
    }

    #[test]
    fn test_get_unknown_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let library = library_for(dir.path());
        assert!(matches!(
            library.get(EntryId::new()),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_queue_missing_metadata() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.mkv"), b"a").unwrap();
        std::fs::write(dir.path().join("b.mkv"), b"b").unwrap();

        let library = library_for(dir.path());
        assert_eq!(library.queue_missing_metadata().unwrap(), 0);
        library.scan().unwrap();

        let sink = Arc::new(CountingSink::default());
        let library = Library {
            enrichment: Some(sink.clone() as Arc<dyn EnrichmentSink>),
            ..library
        };
        assert_eq!(library.queue_missing_metadata().unwrap(), 2);
        assert_eq!(sink.jobs.lock().len(), 2);
    }
}
