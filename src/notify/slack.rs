use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;

use super::Notifier;
use crate::ingest::types::NewsEntry;

pub const ENV_SLACK_WEBHOOK_URL: &str = "SLACK_WEBHOOK_URL";
pub const DEFAULT_HEADER: &str = "HANA 新着ニュース";

const NO_DATE: &str = "日付なし";
const NO_CATEGORY: &str = "NEWS";
const BUTTON_LABEL: &str = "詳細を見る";

pub struct SlackNotifier {
    webhook_url: Option<String>,
    header: String,
    client: Client,
    timeout: Duration,
}

impl SlackNotifier {
    /// Unset or empty `SLACK_WEBHOOK_URL` → notifier is disabled.
    pub fn from_env() -> Self {
        let url = std::env::var(ENV_SLACK_WEBHOOK_URL)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        Self::with_webhook(url)
    }

    /// Optional builder for tests/tools
    pub fn new(url: String) -> Self {
        Self::with_webhook(Some(url))
    }

    pub fn disabled() -> Self {
        Self::with_webhook(None)
    }

    fn with_webhook(webhook_url: Option<String>) -> Self {
        Self {
            webhook_url,
            header: DEFAULT_HEADER.to_string(),
            client: Client::new(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = header.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs.max(1));
        self
    }
}

fn mrkdwn_escape(s: &str) -> String {
    html_escape::encode_text(s).into_owned()
}

/// Block Kit message for one entry: header, bold title, date | category, and a
/// link button when the entry has a URL.
pub fn build_message(entry: &NewsEntry, header: &str) -> serde_json::Value {
    let date: &str = if entry.date.is_empty() {
        NO_DATE
    } else {
        &entry.date
    };
    let category: &str = if entry.category.is_empty() {
        NO_CATEGORY
    } else {
        &entry.category
    };

    let mut blocks = vec![
        serde_json::json!({
            "type": "header",
            "text": { "type": "plain_text", "text": header, "emoji": true }
        }),
        serde_json::json!({
            "type": "section",
            "text": { "type": "mrkdwn", "text": format!("*{}*", mrkdwn_escape(&entry.title)) }
        }),
        serde_json::json!({
            "type": "context",
            "elements": [{
                "type": "mrkdwn",
                "text": format!("{} | {}", mrkdwn_escape(date), mrkdwn_escape(category))
            }]
        }),
    ];

    if !entry.url.is_empty() {
        blocks.push(serde_json::json!({
            "type": "actions",
            "elements": [{
                "type": "button",
                "text": { "type": "plain_text", "text": BUTTON_LABEL, "emoji": true },
                "url": entry.url,
                "action_id": "view_news"
            }]
        }));
    }

    // `text` is the fallback shown in push notifications.
    serde_json::json!({ "text": mrkdwn_escape(&entry.title), "blocks": blocks })
}

#[async_trait::async_trait]
impl Notifier for SlackNotifier {
    async fn send(&self, entry: &NewsEntry) -> Result<()> {
        let Some(url) = &self.webhook_url else {
            tracing::debug!("Slack disabled (no SLACK_WEBHOOK_URL)");
            return Ok(());
        };

        let body = build_message(entry, &self.header);

        self.client
            .post(url)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .context("slack post")?
            .error_for_status()
            .context("slack non-2xx")?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "slack"
    }

    fn is_enabled(&self) -> bool {
        self.webhook_url.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(url: &str, date: &str, category: &str) -> NewsEntry {
        NewsEntry {
            title: "Live <tour> & more".into(),
            url: url.into(),
            date: date.into(),
            category: category.into(),
            id: "x".into(),
        }
    }

    #[test]
    fn message_has_header_title_context_and_button() {
        let m = build_message(&entry("https://h/n/1/", "2024.10.01", "LIVE"), DEFAULT_HEADER);
        let blocks = m["blocks"].as_array().unwrap();
        assert_eq!(blocks.len(), 4);
        assert_eq!(blocks[0]["text"]["text"], DEFAULT_HEADER);
        assert_eq!(blocks[1]["text"]["text"], "*Live &lt;tour&gt; &amp; more*");
        assert_eq!(blocks[2]["elements"][0]["text"], "2024.10.01 | LIVE");
        assert_eq!(blocks[3]["elements"][0]["url"], "https://h/n/1/");
        assert_eq!(blocks[3]["elements"][0]["action_id"], "view_news");
        assert_eq!(m["text"], "Live &lt;tour&gt; &amp; more");
    }

    #[test]
    fn fallback_text_cannot_ping_the_channel() {
        let mut e = entry("", "", "");
        e.title = "<!channel> A & B".into();
        let m = build_message(&e, DEFAULT_HEADER);
        assert_eq!(m["text"], "&lt;!channel&gt; A &amp; B");
        assert_eq!(m["blocks"][1]["text"]["text"], "*&lt;!channel&gt; A &amp; B*");
    }

    #[test]
    fn missing_fields_use_placeholders_and_no_button() {
        let m = build_message(&entry("", "", ""), "H");
        let blocks = m["blocks"].as_array().unwrap();
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[2]["elements"][0]["text"], "日付なし | NEWS");
    }

    #[test]
    fn disabled_without_webhook() {
        assert!(!SlackNotifier::disabled().is_enabled());
        assert!(SlackNotifier::new("http://127.0.0.1:9/hook".into()).is_enabled());
    }
}
