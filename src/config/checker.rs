// src/config/checker.rs
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf, time::Duration};

use crate::error::CheckerError;
use crate::ingest::fetch::DEFAULT_USER_AGENT;
use crate::ingest::DEFAULT_TITLE_MAX_CHARS;
use crate::notify::slack::DEFAULT_HEADER;
use crate::store::DEFAULT_STORE_PATH;

pub const DEFAULT_NEWS_URL: &str = "https://hana.b-rave.tokyo/news/";

fn default_url() -> String {
    DEFAULT_NEWS_URL.to_string()
}
fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}
fn default_fetch_timeout_secs() -> u64 {
    60
}
fn default_store_path() -> PathBuf {
    PathBuf::from(DEFAULT_STORE_PATH)
}
fn default_title_max_chars() -> usize {
    DEFAULT_TITLE_MAX_CHARS
}
fn default_header() -> String {
    DEFAULT_HEADER.to_string()
}
fn default_notify_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceConfig {
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Upper bound for the whole page fetch.
    #[serde(default = "default_fetch_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_fetch_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoreConfig {
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EntryConfig {
    #[serde(default = "default_title_max_chars")]
    pub title_max_chars: usize,
}

impl Default for EntryConfig {
    fn default() -> Self {
        Self {
            title_max_chars: default_title_max_chars(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotifyConfig {
    #[serde(default = "default_header")]
    pub header: String,
    #[serde(default = "default_notify_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            header: default_header(),
            request_timeout_secs: default_notify_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MetricsConfig {
    /// Prometheus textfile written at the end of each run; unset = no export.
    #[serde(default)]
    pub textfile: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
}

/// Everything a run needs besides the webhook secret and `--dry-run`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckerConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub entry: EntryConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl CheckerConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, CheckerError> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|e| {
            CheckerError::Config(format!("reading {}: {e}", path.display()))
        })?;
        let cfg: CheckerConfig = toml::from_str(&data)
            .map_err(|e| CheckerError::Config(format!("{}: {e}", path.display())))?;
        cfg.sanitized()
    }

    pub fn from_toml_str(s: &str) -> Result<Self, CheckerError> {
        let cfg: CheckerConfig =
            toml::from_str(s).map_err(|e| CheckerError::Config(e.to_string()))?;
        cfg.sanitized()
    }

    /// Zero limits fall back to defaults; the source must be an http(s) URL.
    pub fn sanitized(mut self) -> Result<Self, CheckerError> {
        let parsed = url::Url::parse(self.source.url.trim())
            .map_err(|e| CheckerError::Config(format!("source.url {:?}: {e}", self.source.url)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(CheckerError::Config(format!(
                "source.url must be http(s), got {:?}",
                parsed.scheme()
            )));
        }
        self.source.url = parsed.to_string();

        if self.source.timeout_secs == 0 {
            self.source.timeout_secs = default_fetch_timeout_secs();
        }
        if self.source.user_agent.trim().is_empty() {
            self.source.user_agent = default_user_agent();
        }
        if self.entry.title_max_chars == 0 {
            self.entry.title_max_chars = default_title_max_chars();
        }
        if self.notify.request_timeout_secs == 0 {
            self.notify.request_timeout_secs = default_notify_timeout_secs();
        }
        if self.notify.header.trim().is_empty() {
            self.notify.header = default_header();
        }
        Ok(self)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.source.timeout_secs)
    }
}
