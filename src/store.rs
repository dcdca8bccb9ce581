// src/store.rs
//! Snapshot persistence: one JSON file, whole-file overwrite.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::CheckerError;
use crate::ingest::types::Snapshot;

pub const DEFAULT_STORE_PATH: &str = "data/news.json";

#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Missing or unparsable state yields an empty snapshot, not an error.
    async fn load(&self) -> Result<Snapshot, CheckerError>;
    /// Replace persisted state; readers never see a partial write.
    async fn save(&self, snapshot: &Snapshot) -> Result<(), CheckerError>;
}

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }
}

#[async_trait]
impl SnapshotStore for JsonFileStore {
    async fn load(&self) -> Result<Snapshot, CheckerError> {
        let s = match fs::read_to_string(&self.path).await {
            Ok(s) => s,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "no snapshot yet; starting empty");
                return Ok(Snapshot::default());
            }
            // Non-UTF-8 bytes count as a corrupt file, not an I/O failure.
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                tracing::warn!(path = %self.path.display(), "snapshot is not valid UTF-8; starting empty");
                return Ok(Snapshot::default());
            }
            Err(e) => return Err(CheckerError::store(&self.path, e)),
        };

        match serde_json::from_str::<Snapshot>(&s) {
            Ok(snap) => Ok(snap),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "snapshot malformed; starting empty");
                Ok(Snapshot::default())
            }
        }
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<(), CheckerError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .await
                .map_err(|e| CheckerError::store(dir, e))?;
        }

        let mut json = serde_json::to_vec_pretty(snapshot)
            .map_err(|e| CheckerError::store(&self.path, e.into()))?;
        json.push(b'\n');

        let tmp = self.tmp_path();
        fs::write(&tmp, &json)
            .await
            .map_err(|e| CheckerError::store(&tmp, e))?;
        fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| CheckerError::store(&self.path, e))?;

        tracing::debug!(
            path = %self.path.display(),
            entries = snapshot.entries.len(),
            "snapshot saved"
        );
        Ok(())
    }
}

// --- Test helper ---
/// In-memory store; counts saves so tests can assert "not persisted".
pub struct MemoryStore {
    pub snapshot: std::sync::Mutex<Snapshot>,
    pub saves: std::sync::atomic::AtomicUsize,
    pub fail_saves: bool,
}

impl MemoryStore {
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            snapshot: std::sync::Mutex::new(snapshot),
            saves: std::sync::atomic::AtomicUsize::new(0),
            fail_saves: false,
        }
    }

    pub fn failing_saves(mut self) -> Self {
        self.fail_saves = true;
        self
    }

    pub fn current(&self) -> Snapshot {
        self.snapshot.lock().unwrap().clone()
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn load(&self) -> Result<Snapshot, CheckerError> {
        Ok(self.current())
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<(), CheckerError> {
        if self.fail_saves {
            return Err(CheckerError::store(
                "memory",
                std::io::Error::new(ErrorKind::PermissionDenied, "read-only store"),
            ));
        }
        *self.snapshot.lock().unwrap() = snapshot.clone();
        self.saves.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok(())
    }
}
