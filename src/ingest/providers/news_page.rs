use anyhow::Result;
use async_trait::async_trait;
use metrics::{counter, histogram};

use crate::ingest::fetch::PageFetcher;
use crate::ingest::strategy::{ExtractionStrategy, SelectorStrategy};
use crate::ingest::types::{NewsEntry, NewsProvider};
use crate::ingest::{build_entries, DEFAULT_TITLE_MAX_CHARS};

/// The news listing page, scraped into entries.
pub struct NewsPageProvider {
    mode: Mode,
    strategy: Box<dyn ExtractionStrategy>,
    title_max_chars: usize,
}

enum Mode {
    // HTML held in memory; `base_url` resolves relative links.
    Fixture { html: String, base_url: String },
    Http {
        url: String,
        fetcher: Box<dyn PageFetcher>,
    },
}

impl NewsPageProvider {
    pub fn from_fixture(html: &str, base_url: &str) -> Self {
        Self {
            mode: Mode::Fixture {
                html: html.to_string(),
                base_url: base_url.to_string(),
            },
            strategy: Box::new(SelectorStrategy::default()),
            title_max_chars: DEFAULT_TITLE_MAX_CHARS,
        }
    }

    pub fn from_url(url: impl Into<String>, fetcher: Box<dyn PageFetcher>) -> Self {
        Self {
            mode: Mode::Http {
                url: url.into(),
                fetcher,
            },
            strategy: Box::new(SelectorStrategy::default()),
            title_max_chars: DEFAULT_TITLE_MAX_CHARS,
        }
    }

    pub fn with_strategy(mut self, strategy: Box<dyn ExtractionStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_title_max_chars(mut self, max: usize) -> Self {
        self.title_max_chars = max.max(1);
        self
    }

    fn parse_entries(&self, html: &str, base_url: &str) -> Vec<NewsEntry> {
        let t0 = std::time::Instant::now();
        let raw = self.strategy.extract(html, base_url);
        let raw_count = raw.len();
        let (entries, skipped, disambiguated) = build_entries(raw, self.title_max_chars);

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("checker_extract_ms").record(ms);
        counter!("checker_entries_extracted_total").increment(entries.len() as u64);

        tracing::debug!(
            raw = raw_count,
            kept = entries.len(),
            skipped,
            disambiguated,
            "parsed news page"
        );
        entries
    }
}

#[async_trait]
impl NewsProvider for NewsPageProvider {
    async fn fetch_latest(&self) -> Result<Vec<NewsEntry>> {
        match &self.mode {
            Mode::Fixture { html, base_url } => Ok(self.parse_entries(html, base_url)),
            Mode::Http { url, fetcher } => {
                tracing::info!(%url, "fetching news page");
                let html = fetcher.fetch_html(url).await?;
                Ok(self.parse_entries(&html, url))
            }
        }
    }

    fn name(&self) -> &'static str {
        "news-page"
    }

    fn target(&self) -> &str {
        match &self.mode {
            Mode::Fixture { .. } => "fixture",
            Mode::Http { url, .. } => url,
        }
    }
}
