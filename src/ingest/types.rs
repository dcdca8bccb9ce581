// src/ingest/types.rs
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One news item as scraped from the page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewsEntry {
    pub title: String,
    #[serde(default)]
    pub url: String,
    /// Page's own date text, verbatim.
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub category: String,
    pub id: String,
}

/// Everything seen on the most recent successful run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    // `news` / `lastChecked` are the keys older snapshot files used.
    #[serde(default, alias = "news")]
    pub entries: Vec<NewsEntry>,
    #[serde(default, alias = "lastChecked")]
    pub last_checked_at: Option<DateTime<Utc>>,
}

/// Fields pulled out of one list item before identity and cleanup are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEntry {
    pub title: String,
    pub url: String,
    pub date: String,
    pub category: String,
}

/// Produces the candidate list for a run, in page display order, ids unique.
#[async_trait::async_trait]
pub trait NewsProvider: Send + Sync {
    async fn fetch_latest(&self) -> Result<Vec<NewsEntry>>;
    fn name(&self) -> &'static str;
    /// Where the entries come from (URL or "fixture"), for logs and errors.
    fn target(&self) -> &str;
}

/// Deterministic id: the entry URL when present, else a hash of date + title.
pub fn entry_id(url: &str, date: &str, title: &str) -> String {
    if !url.is_empty() {
        return url.to_string();
    }
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(date.as_bytes());
    hasher.update([0x1fu8]);
    hasher.update(title.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(7 + 16);
    out.push_str("sha256:");
    for b in digest.iter().take(8) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}
