// tests/support/mod.rs
#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use hana_news_checker::notify::Notifier;
use hana_news_checker::{NewsEntry, NewsProvider};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

pub fn entry(id: &str) -> NewsEntry {
    NewsEntry {
        title: format!("title {id}"),
        url: format!("https://hana.b-rave.tokyo/news/{id}/"),
        date: "2024.10.01".into(),
        category: "LIVE".into(),
        id: format!("https://hana.b-rave.tokyo/news/{id}/"),
    }
}

pub fn entries(ids: &[&str]) -> Vec<NewsEntry> {
    ids.iter().map(|i| entry(i)).collect()
}

// ---------- providers ----------

pub enum Script {
    Entries(Vec<NewsEntry>),
    Fail(&'static str),
    Hang,
}

pub struct MockProvider {
    pub script: Script,
}

impl MockProvider {
    pub fn returning(v: Vec<NewsEntry>) -> Self {
        Self {
            script: Script::Entries(v),
        }
    }
}

#[async_trait]
impl NewsProvider for MockProvider {
    async fn fetch_latest(&self) -> Result<Vec<NewsEntry>> {
        match &self.script {
            Script::Entries(v) => Ok(v.clone()),
            Script::Fail(msg) => anyhow::bail!("{msg}"),
            Script::Hang => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(vec![])
            }
        }
    }
    fn name(&self) -> &'static str {
        "mock"
    }
    fn target(&self) -> &str {
        "mock://news"
    }
}

// ---------- notifiers ----------

#[derive(Clone, Default)]
pub struct RecordingNotifier {
    pub sent: Arc<Mutex<Vec<String>>>,
    pub fail_ids: Vec<String>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, entry: &NewsEntry) -> Result<()> {
        self.sent.lock().unwrap().push(entry.id.clone());
        if self.fail_ids.contains(&entry.id) {
            anyhow::bail!("delivery refused");
        }
        Ok(())
    }
    fn name(&self) -> &'static str {
        "recording"
    }
}

// ---------- tiny HTTP responder ----------

/// Serve a fixed response to every connection; returns base URL and captured raw requests.
pub async fn serve(status: u16, body: &'static str) -> (String, Arc<Mutex<Vec<String>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_srv = seen.clone();
    tokio::spawn(async move {
        while let Ok((mut sock, _)) = listener.accept().await {
            let seen = seen_srv.clone();
            tokio::spawn(async move {
                let req = read_request(&mut sock).await;
                seen.lock().unwrap().push(req);
                let resp = format!(
                    "HTTP/1.1 {status} OK\r\ncontent-type: text/html; charset=utf-8\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = sock.write_all(resp.as_bytes()).await;
                let _ = sock.shutdown().await;
            });
        }
    });
    (format!("http://{addr}"), seen)
}

/// Accept connections and never answer.
pub async fn serve_silence() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((sock, _)) = listener.accept().await {
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_secs(60)).await;
                drop(sock);
            });
        }
    });
    format!("http://{addr}")
}

async fn read_request(sock: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = sock.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..pos]).to_ascii_lowercase();
            let len = head
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= pos + 4 + len {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// Body part of a captured raw request.
pub fn request_body(raw: &str) -> &str {
    raw.split_once("\r\n\r\n").map(|(_, b)| b).unwrap_or("")
}
