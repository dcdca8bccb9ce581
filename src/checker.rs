//! Orchestrator: load → extract → reconcile → notify → persist, once.

use chrono::{DateTime, Utc};
use metrics::{counter, gauge};
use std::time::Duration;

use crate::error::CheckerError;
use crate::ingest::types::{NewsEntry, NewsProvider, Snapshot};
use crate::notify::{deliver_all, DeliveryReport, Notifier};
use crate::reconcile::reconcile;
use crate::store::SnapshotStore;

#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    /// Compute and persist, but do not deliver notifications.
    pub dry_run: bool,
    pub fetch_timeout: Duration,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            fetch_timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    DryRun,
    NothingNew,
    Attempted(DeliveryReport),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub extracted: usize,
    pub new_items: Vec<NewsEntry>,
    pub delivery: Delivery,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The page yielded no entries; nothing reconciled, nothing persisted.
    EmptyExtraction,
    Completed(RunSummary),
}

pub struct Checker {
    provider: Box<dyn NewsProvider>,
    store: Box<dyn SnapshotStore>,
    notifier: Box<dyn Notifier>,
    options: RunOptions,
}

impl Checker {
    pub fn new(
        provider: Box<dyn NewsProvider>,
        store: Box<dyn SnapshotStore>,
        notifier: Box<dyn Notifier>,
        options: RunOptions,
    ) -> Self {
        Self {
            provider,
            store,
            notifier,
            options,
        }
    }

    async fn load_previous(&self) -> Snapshot {
        match self.store.load().await {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(error = ?e, "snapshot load failed; treating as empty");
                Snapshot::default()
            }
        }
    }

    async fn extract(&self) -> Result<Vec<NewsEntry>, CheckerError> {
        let target = self.provider.target().to_string();
        let secs = self.options.fetch_timeout.as_secs();
        match tokio::time::timeout(self.options.fetch_timeout, self.provider.fetch_latest()).await {
            Err(_elapsed) => Err(CheckerError::ExtractionTimeout { target, secs }),
            Ok(Err(e)) if is_timeout(&e) => Err(CheckerError::ExtractionTimeout { target, secs }),
            Ok(Err(source)) => Err(CheckerError::FetchFailure { target, source }),
            Ok(Ok(entries)) => Ok(entries),
        }
    }

    /// One full check. `now` becomes the snapshot's `lastCheckedAt`.
    pub async fn run_once(&self, now: DateTime<Utc>) -> Result<RunOutcome, CheckerError> {
        crate::metrics::ensure_described();
        counter!("checker_runs_total").increment(1);

        if self.options.dry_run {
            tracing::info!("dry-run: no notifications will be sent");
        }

        let previous = self.load_previous().await;
        tracing::debug!(
            known = previous.entries.len(),
            last_checked_at = ?previous.last_checked_at,
            "previous snapshot loaded"
        );

        let candidates = self.extract().await?;
        tracing::info!(
            provider = self.provider.name(),
            found = candidates.len(),
            "news items extracted"
        );

        if candidates.is_empty() {
            counter!("checker_empty_extractions_total").increment(1);
            tracing::warn!("no news items found; the page structure may have changed");
            return Ok(RunOutcome::EmptyExtraction);
        }

        let new_items = reconcile(&previous, &candidates);
        counter!("checker_new_entries_total").increment(new_items.len() as u64);
        tracing::info!(new = new_items.len(), "reconciled against snapshot");
        for item in &new_items {
            tracing::info!(date = %item.date, title = %item.title, url = %item.url, "new item");
        }

        let delivery = if new_items.is_empty() {
            Delivery::NothingNew
        } else if self.options.dry_run {
            Delivery::DryRun
        } else {
            Delivery::Attempted(deliver_all(self.notifier.as_ref(), &new_items).await)
        };

        let extracted = candidates.len();
        let next = Snapshot {
            entries: candidates,
            last_checked_at: Some(now),
        };
        self.store.save(&next).await?;
        gauge!("checker_last_success_ts").set(now.timestamp() as f64);
        tracing::info!(entries = extracted, "snapshot saved");

        Ok(RunOutcome::Completed(RunSummary {
            extracted,
            new_items,
            delivery,
        }))
    }
}

fn is_timeout(e: &anyhow::Error) -> bool {
    e.chain().any(|cause| {
        cause
            .downcast_ref::<reqwest::Error>()
            .is_some_and(|r| r.is_timeout())
    })
}
