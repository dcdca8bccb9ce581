//! News checker binary entrypoint.
//! One run per invocation; scheduling is the caller's job (cron, CI schedule).

use anyhow::{Context, Result};
use clap::Parser;
use hana_news_checker::config::{self, CheckerConfig, LogFormat};
use hana_news_checker::ingest::fetch::HttpFetcher;
use hana_news_checker::ingest::providers::news_page::NewsPageProvider;
use hana_news_checker::metrics::Metrics;
use hana_news_checker::notify::slack::SlackNotifier;
use hana_news_checker::store::JsonFileStore;
use hana_news_checker::{Checker, CheckerError, Delivery, RunOptions, RunOutcome};
use std::path::Path;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Parser)]
#[command(version, about = "Check the news page and notify Slack about new entries")]
struct Cli {
    /// Extract, diff and save the snapshot, but send no notifications.
    #[arg(long)]
    dry_run: bool,
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("hana_news_checker=info,warn"));
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Compact => registry.with(fmt::layer().compact()).init(),
    }
}

impl Cli {
    fn run_options(&self, cfg: &CheckerConfig) -> RunOptions {
        RunOptions {
            dry_run: self.dry_run,
            fetch_timeout: cfg.fetch_timeout(),
        }
    }
}

fn build_checker(cfg: &CheckerConfig, options: RunOptions) -> Result<Checker> {
    let fetcher = HttpFetcher::new(&cfg.source.user_agent, cfg.fetch_timeout())?;
    let provider = NewsPageProvider::from_url(cfg.source.url.clone(), Box::new(fetcher))
        .with_title_max_chars(cfg.entry.title_max_chars);
    let store = JsonFileStore::new(cfg.store.path.clone());
    let notifier = SlackNotifier::from_env()
        .with_header(cfg.notify.header.clone())
        .with_timeout(cfg.notify.request_timeout_secs);

    Ok(Checker::new(
        Box::new(provider),
        Box::new(store),
        Box::new(notifier),
        options,
    ))
}

/// Log the outcome. An empty page is a clean exit; every error fails the process.
fn conclude(result: Result<RunOutcome, CheckerError>, store_path: &Path) -> Result<()> {
    match result.context("news check failed")? {
        RunOutcome::EmptyExtraction => {
            tracing::info!("nothing extracted; snapshot left untouched");
        }
        RunOutcome::Completed(summary) => {
            match &summary.delivery {
                Delivery::NothingNew => tracing::info!("no new news items"),
                Delivery::DryRun => tracing::info!(
                    new = summary.new_items.len(),
                    "dry-run: notifications suppressed"
                ),
                Delivery::Attempted(report) => tracing::info!(
                    attempted = report.attempted,
                    sent = report.sent,
                    failed = report.failures.len(),
                    "notifications done"
                ),
            }
            tracing::info!(
                path = %store_path.display(),
                entries = summary.extracted,
                "news data saved"
            );
        }
    }
    Ok(())
}

async fn check(cli: &Cli, cfg: &CheckerConfig) -> Result<()> {
    let started = chrono::Utc::now();
    tracing::info!(time = %started.to_rfc3339(), url = %cfg.source.url, "news check starting");

    let checker = build_checker(cfg, cli.run_options(cfg))?;
    conclude(checker.run_once(started).await, &cfg.store.path)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();

    let cfg = config::load_default().context("loading configuration")?;
    init_tracing(cfg.logging.format);

    let metrics = match &cfg.metrics.textfile {
        Some(path) => Some(Metrics::install(path.clone())?),
        None => None,
    };

    let result = check(&cli, &cfg).await;

    if let Some(m) = &metrics {
        if let Err(e) = m.write_textfile() {
            tracing::warn!(error = ?e, path = %m.textfile().display(), "metrics textfile not written");
        }
    }
    result
}
