//! Media library scanner.
//!
//! A scan pass is a small pipeline of explicit stages:
//!
//! 1. [`walk`] enumerates media files under the configured roots.
//! 2. [`reconcile::plan`] diffs them against the stored catalog (pure).
//! 3. [`Reconciler`] persists each planned change and hands changed entries to
//!    the enrichment queue.

pub mod reconcile;
pub mod walk;

pub use reconcile::{plan, ChangeKind, PlannedChange, Reconciler, ScanResult};
pub use walk::{scan_root, scan_roots, ScannedFile};
