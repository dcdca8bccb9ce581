use anyhow::{Context, Result};
use metrics::{describe_counter, describe_gauge, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};

/// One-time metric descriptions (so series carry HELP text).
pub fn ensure_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("checker_runs_total", "Checker runs started.");
        describe_counter!(
            "checker_entries_extracted_total",
            "Entries extracted from the news page."
        );
        describe_counter!(
            "checker_new_entries_total",
            "Entries not present in the previous snapshot."
        );
        describe_counter!(
            "checker_empty_extractions_total",
            "Runs aborted because the page yielded no entries."
        );
        describe_counter!(
            "checker_notifications_sent_total",
            "Notifications delivered."
        );
        describe_counter!(
            "checker_delivery_failures_total",
            "Notifications that failed to deliver."
        );
        describe_histogram!("checker_extract_ms", "Page parse time in milliseconds.");
        describe_gauge!(
            "checker_last_success_ts",
            "Unix ts of the last run that persisted a snapshot."
        );
    });
}

/// Prometheus recorder whose output goes to a node_exporter textfile.
pub struct Metrics {
    pub handle: PrometheusHandle,
    textfile: PathBuf,
}

impl Metrics {
    /// Install the global recorder. Call once, before the run.
    pub fn install(textfile: impl Into<PathBuf>) -> Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;
        ensure_described();
        Ok(Self {
            handle,
            textfile: textfile.into(),
        })
    }

    pub fn textfile(&self) -> &Path {
        &self.textfile
    }

    /// Render the exposition and replace the textfile (tmp + rename).
    pub fn write_textfile(&self) -> Result<()> {
        if let Some(dir) = self.textfile.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating {}", dir.display()))?;
        }
        let tmp = self.textfile.with_extension("prom.tmp");
        std::fs::write(&tmp, self.handle.render())
            .with_context(|| format!("writing {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.textfile)
            .with_context(|| format!("renaming to {}", self.textfile.display()))?;
        Ok(())
    }
}
