//! Background enrichment queue for asynchronously processing metadata lookups.
//!
//! The [`EnrichmentQueue`] accepts [`EnrichmentJob`] submissions without
//! blocking and processes them one at a time in a spawned background task.
//! Each lookup is bounded by a caller-supplied timeout (see
//! [`MetadataConfig::lookup_timeout`](crate::config::MetadataConfig::lookup_timeout));
//! whatever it learned is written back
//! with [`CatalogStore::save_metadata`], which never touches scan-owned fields.
//!
//! # Example
//!
//! ```rust,ignore
//! let queue = EnrichmentQueue::new(lookup, store, config.metadata.lookup_timeout());
//! queue.enqueue(EnrichmentJob::for_entry(&entry));
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout, Duration, Instant};
use tracing::{debug, info, warn};
use vlib_common::EntryId;
use vlib_db::models::{CatalogEntry, EntryMetadata};
use vlib_db::store::CatalogStore;

use super::provider::{lookup_metadata, MetadataLookup};

/// Channel capacity for the enrichment job queue.
const QUEUE_CAPACITY: usize = 1024;

/// A request to enrich a single catalog entry.
#[derive(Debug, Clone)]
pub struct EnrichmentJob {
    /// The catalog entry to enrich.
    pub entry_id: EntryId,
    /// File name handed to the lookup.
    pub name: String,
    /// Metadata already stored, kept for fields the lookup does not return.
    pub current: EntryMetadata,
}

impl EnrichmentJob {
    pub fn for_entry(entry: &CatalogEntry) -> Self {
        Self {
            entry_id: entry.id,
            name: entry.name.clone(),
            current: entry.metadata(),
        }
    }
}

/// Anything that accepts enrichment jobs without blocking the caller.
pub trait EnrichmentSink: Send + Sync {
    /// Hand off `job`. Returns false when it was dropped (queue full or
    /// closed, or the entry is already pending).
    fn enqueue(&self, job: EnrichmentJob) -> bool;
}

/// Handle to a background enrichment processing queue.
///
/// Jobs for an entry that is already waiting are dropped, so repeated scans
/// of an unidentified library do not pile up duplicate lookups. The worker
/// runs until the queue is dropped or [`shutdown`](Self::shutdown) is called.
pub struct EnrichmentQueue {
    sender: mpsc::Sender<EnrichmentJob>,
    pending: Arc<Mutex<HashSet<EntryId>>>,
    worker: JoinHandle<()>,
}

impl EnrichmentQueue {
    /// Create a new enrichment queue and spawn its background processing task.
    ///
    /// `lookup_timeout` bounds one job (title and identifier calls together).
    /// Must be called from within a Tokio runtime.
    pub fn new(
        lookup: Arc<dyn MetadataLookup>,
        store: Arc<dyn CatalogStore>,
        lookup_timeout: Duration,
    ) -> Self {
        let (sender, receiver) = mpsc::channel(QUEUE_CAPACITY);
        let pending = Arc::new(Mutex::new(HashSet::new()));

        let worker = tokio::spawn(process_jobs(
            receiver,
            lookup,
            store,
            pending.clone(),
            lookup_timeout,
        ));

        Self {
            sender,
            pending,
            worker,
        }
    }

    /// Stop accepting jobs and let the worker finish what is queued.
    ///
    /// Returns true when the worker exited within `limit`; otherwise it is
    /// aborted and unfinished jobs are discarded.
    pub async fn shutdown(self, limit: Duration) -> bool {
        let Self {
            sender, mut worker, ..
        } = self;
        drop(sender);

        match timeout(limit, &mut worker).await {
            Ok(_) => true,
            Err(_) => {
                warn!("Enrichment worker did not stop within {:?}, aborting", limit);
                worker.abort();
                false
            }
        }
    }

    /// Number of jobs submitted but not yet finished.
    pub fn pending(&self) -> usize {
        self.pending.lock().len()
    }

    /// Wait until every submitted job has finished, or `limit` elapses.
    ///
    /// Returns true when the queue drained.
    pub async fn wait_idle(&self, limit: Duration) -> bool {
        let deadline = Instant::now() + limit;
        loop {
            if self.pending() == 0 {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            sleep(Duration::from_millis(10)).await;
        }
    }
}

impl EnrichmentSink for EnrichmentQueue {
    fn enqueue(&self, job: EnrichmentJob) -> bool {
        let entry_id = job.entry_id;
        if !self.pending.lock().insert(entry_id) {
            debug!(entry_id = %entry_id, "Enrichment already pending");
            return false;
        }

        match self.sender.try_send(job) {
            Ok(()) => true,
            Err(TrySendError::Full(job)) => {
                warn!(
                    entry_id = %entry_id,
                    name = %job.name,
                    "Enrichment queue full, dropping job"
                );
                self.pending.lock().remove(&entry_id);
                false
            }
            Err(TrySendError::Closed(_)) => {
                warn!(entry_id = %entry_id, "Enrichment queue is closed");
                self.pending.lock().remove(&entry_id);
                false
            }
        }
    }
}

/// Background loop that drains the job channel and writes results back.
async fn process_jobs(
    mut receiver: mpsc::Receiver<EnrichmentJob>,
    lookup: Arc<dyn MetadataLookup>,
    store: Arc<dyn CatalogStore>,
    pending: Arc<Mutex<HashSet<EntryId>>>,
    lookup_timeout: Duration,
) {
    info!(lookup = lookup.name(), "Enrichment queue worker started");

    while let Some(job) = receiver.recv().await {
        let entry_id = job.entry_id;
        process_job(job, lookup.as_ref(), store.clone(), lookup_timeout).await;
        pending.lock().remove(&entry_id);
    }

    info!("Enrichment queue worker stopped (channel closed)");
}

async fn process_job(
    job: EnrichmentJob,
    lookup: &dyn MetadataLookup,
    store: Arc<dyn CatalogStore>,
    lookup_timeout: Duration,
) {
    let entry_id = job.entry_id;
    debug!(entry_id = %entry_id, name = %job.name, "Processing enrichment job");

    let before = job.current.clone();
    let lookup = lookup_metadata(lookup, &job.name, job.current);
    let metadata = match timeout(lookup_timeout, lookup).await {
        Ok(Ok(metadata)) => metadata,
        Ok(Err((partial, e))) => {
            warn!(
                entry_id = %entry_id,
                name = %job.name,
                error = %e,
                "Enrichment failed; continuing with next job"
            );
            partial
        }
        Err(_) => {
            warn!(
                entry_id = %entry_id,
                name = %job.name,
                "Enrichment timed out after {:?}",
                lookup_timeout
            );
            return;
        }
    };

    if metadata == before {
        return;
    }

    let result =
        tokio::task::spawn_blocking(move || store.save_metadata(entry_id, &metadata)).await;
    match result {
        Ok(Ok(())) => info!(entry_id = %entry_id, "Enrichment saved"),
        Ok(Err(e)) => warn!(entry_id = %entry_id, error = %e, "Failed to save enrichment"),
        Err(e) => warn!(entry_id = %entry_id, error = %e, "Enrichment save task failed"),
    }
}
