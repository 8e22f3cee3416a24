//! Metadata enrichment for catalog entries.
//!
//! Enrichment is best-effort: lookups run on a background queue and their
//! results are written back with a metadata-only store update. A failed lookup
//! leaves the entry as it was, and the next scan queues it again.
//!
//! # Module layout
//!
//! - [`provider`] -- The [`MetadataLookup`] boundary and its result types.
//! - [`providers`] -- Concrete lookups (HTTP).
//! - [`queue`] -- Background enrichment queue.

pub mod provider;
pub mod providers;
pub mod queue;

pub use provider::{lookup_metadata, ExternalIds, MetadataLookup};
pub use providers::HttpMetadataLookup;
pub use queue::{EnrichmentJob, EnrichmentQueue, EnrichmentSink};
