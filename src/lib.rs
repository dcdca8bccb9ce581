// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod checker;
pub mod config;
pub mod error;
pub mod ingest;
pub mod metrics;
pub mod notify;
pub mod reconcile;
pub mod store;

// ---- Re-exports for stable public API ----
pub use crate::checker::{Checker, Delivery, RunOptions, RunOutcome, RunSummary};
pub use crate::error::CheckerError;
pub use crate::ingest::types::{NewsEntry, NewsProvider, Snapshot};
pub use crate::reconcile::reconcile;
