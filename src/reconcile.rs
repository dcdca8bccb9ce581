//! # Reconciler
//! Pure, testable logic that maps `(previous snapshot, candidates)` → new entries.
//! No I/O, no clock, no hidden state.
//!
//! Policy: a candidate is new iff its id is absent from the previous snapshot.
//! Output keeps the candidates' order. Entries that vanished from the page are
//! not reported. An empty previous snapshot makes every candidate new.

use std::collections::HashSet;

use crate::ingest::types::{NewsEntry, Snapshot};

/// Ordered subsequence of `candidates` whose id is not in `previous`.
pub fn reconcile(previous: &Snapshot, candidates: &[NewsEntry]) -> Vec<NewsEntry> {
    let known: HashSet<&str> = previous.entries.iter().map(|e| e.id.as_str()).collect();
    candidates
        .iter()
        .filter(|c| !known.contains(c.id.as_str()))
        .cloned()
        .collect()
}
