//! Posts one sample entry through the Slack notifier (log only when no webhook is set).

use hana_news_checker::notify::{deliver_all, slack::SlackNotifier};
use hana_news_checker::NewsEntry;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_target(false).init();
    let notifier = SlackNotifier::from_env();

    let sample = NewsEntry {
        title: "notify-demo: webhook test".into(),
        url: "https://hana.b-rave.tokyo/news/".into(),
        date: chrono::Utc::now().format("%Y.%m.%d").to_string(),
        category: "TEST".into(),
        id: "notify-demo".into(),
    };

    let report = deliver_all(&notifier, &[sample]).await;
    println!(
        "notify-demo done: attempted={} sent={} failed={}",
        report.attempted,
        report.sent,
        report.failures.len()
    );
}
