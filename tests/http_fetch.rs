// tests/http_fetch.rs
mod support;

use chrono::Utc;
use hana_news_checker::ingest::fetch::{HttpFetcher, PageFetcher, DEFAULT_USER_AGENT};
use hana_news_checker::ingest::providers::news_page::NewsPageProvider;
use hana_news_checker::store::{MemoryStore, SnapshotStore};
use hana_news_checker::{Checker, CheckerError, RunOptions, Snapshot};
use std::time::Duration;

const PAGE: &str = include_str!("fixtures/news_page.html");

#[tokio::test]
async fn fetches_html_with_browser_user_agent() {
    let (base, seen) = support::serve(200, PAGE).await;
    let fetcher = HttpFetcher::new(DEFAULT_USER_AGENT, Duration::from_secs(5)).unwrap();

    let html = fetcher.fetch_html(&format!("{base}/news/")).await.unwrap();
    assert!(html.contains("items-item"));

    let req = seen.lock().unwrap()[0].to_ascii_lowercase();
    assert!(req.starts_with("get /news/ "));
    assert!(req.contains("chrome/120.0.0.0"));
}

#[tokio::test]
async fn non_2xx_is_an_error() {
    let (base, _) = support::serve(503, "maintenance").await;
    let fetcher = HttpFetcher::new(DEFAULT_USER_AGENT, Duration::from_secs(5)).unwrap();
    let err = fetcher.fetch_html(&base).await.unwrap_err();
    assert!(format!("{err:#}").contains("503"));
}

#[tokio::test]
async fn live_page_through_provider_resolves_against_server_url() {
    let (base, _) = support::serve(200, PAGE).await;
    let url = format!("{base}/news/");
    let fetcher = HttpFetcher::new(DEFAULT_USER_AGENT, Duration::from_secs(5)).unwrap();
    let provider = NewsPageProvider::from_url(url.clone(), Box::new(fetcher));

    let items = hana_news_checker::NewsProvider::fetch_latest(&provider)
        .await
        .unwrap();
    assert_eq!(items.len(), 4);
    assert_eq!(items[0].url, format!("{base}/news/2024-12-20-year-end/"));
    // Absolute hrefs to the real host stay as written.
    assert_eq!(items[1].url, "https://hana.b-rave.tokyo/news/2024-12-01-tour/");
}

#[tokio::test]
async fn unresponsive_server_is_a_timeout() {
    let base = support::serve_silence().await;
    let fetcher = HttpFetcher::new(DEFAULT_USER_AGENT, Duration::from_millis(300)).unwrap();
    let provider = NewsPageProvider::from_url(base, Box::new(fetcher));
    let store = MemoryStore::new(Snapshot::default());

    let checker = Checker::new(
        Box::new(provider),
        Box::new(store),
        Box::new(support::RecordingNotifier::default()),
        RunOptions {
            dry_run: false,
            // Outer bound larger than the client's, so the reqwest timeout fires first.
            fetch_timeout: Duration::from_secs(10),
        },
    );

    let err = checker.run_once(Utc::now()).await.unwrap_err();
    assert!(matches!(err, CheckerError::ExtractionTimeout { .. }), "{err:?}");
}

#[tokio::test]
async fn refused_connection_is_a_fetch_failure() {
    // Bind then drop to get a port nobody listens on.
    let port = {
        let l = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        l.local_addr().unwrap().port()
    };
    let fetcher = HttpFetcher::new(DEFAULT_USER_AGENT, Duration::from_secs(2)).unwrap();
    let provider = NewsPageProvider::from_url(format!("http://127.0.0.1:{port}/"), Box::new(fetcher));
    let store = std::sync::Arc::new(MemoryStore::new(Snapshot::default()));

    struct Shared(std::sync::Arc<MemoryStore>);
    #[async_trait::async_trait]
    impl SnapshotStore for Shared {
        async fn load(&self) -> Result<Snapshot, CheckerError> {
            self.0.load().await
        }
        async fn save(&self, s: &Snapshot) -> Result<(), CheckerError> {
            self.0.save(s).await
        }
    }

    let checker = Checker::new(
        Box::new(provider),
        Box::new(Shared(store.clone())),
        Box::new(support::RecordingNotifier::default()),
        RunOptions::default(),
    );
    let err = checker.run_once(Utc::now()).await.unwrap_err();
    assert!(matches!(err, CheckerError::FetchFailure { .. }), "{err:?}");
    assert_eq!(store.save_count(), 0);
}
