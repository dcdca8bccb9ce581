// src/error.rs
//! Failure taxonomy for one checker run.
//!
//! "Page returned nothing" is not an error here: it is
//! [`RunOutcome::EmptyExtraction`](crate::checker::RunOutcome). Per-entry delivery
//! failures live in [`DeliveryFailure`](crate::notify::DeliveryFailure) and never
//! propagate. Anything else stays an `anyhow::Error` and surfaces from `main`.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CheckerError {
    /// Snapshot file could not be read or written for a reason other than "missing".
    #[error("snapshot store unavailable at {}", .path.display())]
    StoreUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The page did not come back within the configured bound.
    #[error("fetching {target} did not finish within {secs}s")]
    ExtractionTimeout { target: String, secs: u64 },

    /// The page could not be retrieved or read.
    #[error("fetching {target} failed")]
    FetchFailure {
        target: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl CheckerError {
    pub(crate) fn store(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::StoreUnavailable {
            path: path.into(),
            source,
        }
    }
}
