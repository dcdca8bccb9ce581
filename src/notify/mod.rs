pub mod slack;

use anyhow::Result;
use metrics::counter;

use crate::ingest::types::NewsEntry;

#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one entry.
    async fn send(&self, entry: &NewsEntry) -> Result<()>;
    fn name(&self) -> &'static str;
    /// `false` means no destination is configured: delivery is a no-op.
    fn is_enabled(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryFailure {
    pub entry_id: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub attempted: usize,
    pub sent: usize,
    pub failures: Vec<DeliveryFailure>,
}

/// One `send` per entry, in order. A failed entry is logged and recorded; the rest still go.
pub async fn deliver_all(notifier: &dyn Notifier, entries: &[NewsEntry]) -> DeliveryReport {
    let mut report = DeliveryReport::default();
    if !notifier.is_enabled() {
        tracing::info!(notifier = notifier.name(), "notifications disabled; skipping delivery");
        return report;
    }

    for entry in entries {
        report.attempted += 1;
        match notifier.send(entry).await {
            Ok(()) => {
                report.sent += 1;
                counter!("checker_notifications_sent_total").increment(1);
                tracing::info!(notifier = notifier.name(), title = %entry.title, "notification sent");
            }
            Err(e) => {
                counter!("checker_delivery_failures_total").increment(1);
                tracing::warn!(
                    notifier = notifier.name(),
                    id = %entry.id,
                    error = ?e,
                    "notification failed"
                );
                report.failures.push(DeliveryFailure {
                    entry_id: entry.id.clone(),
                    error: format!("{e:#}"),
                });
            }
        }
    }
    report
}
