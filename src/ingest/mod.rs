// src/ingest/mod.rs
pub mod fetch;
pub mod providers;
pub mod strategy;
pub mod types;

use crate::ingest::types::{entry_id, NewsEntry, RawEntry};
use std::collections::HashSet;

pub const DEFAULT_TITLE_MAX_CHARS: usize = 200;

/// Normalize scraped text: collapse whitespace (Unicode `\s` covers NBSP and U+3000), trim.
pub fn normalize_text(s: &str) -> String {
    static RE_WS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    re_ws.replace_all(s, " ").trim().to_string()
}

/// Cap at `max` chars (not bytes; titles are often CJK).
pub fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        s.chars().take(max).collect()
    } else {
        s.to_string()
    }
}

/// Turn raw scraped fields into entries with stable, unique ids.
///
/// Items without a title are skipped. An exact repeat of an earlier entry is
/// dropped; a different entry whose id collides gets a `#n` suffix.
/// Returns (entries, skipped, disambiguated).
pub fn build_entries(raw: Vec<RawEntry>, title_max_chars: usize) -> (Vec<NewsEntry>, usize, usize) {
    let mut skipped = 0usize;
    let mut disambiguated = 0usize;
    let mut out: Vec<NewsEntry> = Vec::with_capacity(raw.len());
    let mut seen_ids: HashSet<String> = HashSet::new();

    for r in raw {
        let title = truncate_chars(&normalize_text(&r.title), title_max_chars);
        if title.is_empty() {
            skipped += 1;
            continue;
        }
        let url = r.url.trim().to_string();
        let date = normalize_text(&r.date);
        let category = normalize_text(&r.category);
        let id = entry_id(&url, &date, &title);

        let mut entry = NewsEntry {
            title,
            url,
            date,
            category,
            id,
        };

        if seen_ids.contains(&entry.id) {
            let is_repeat = out.iter().any(|e| {
                e.title == entry.title
                    && e.url == entry.url
                    && e.date == entry.date
                    && e.category == entry.category
            });
            if is_repeat {
                skipped += 1;
                continue;
            }
            let base = entry.id.clone();
            let mut n = 2usize;
            while seen_ids.contains(&format!("{base}#{n}")) {
                n += 1;
            }
            entry.id = format!("{base}#{n}");
            disambiguated += 1;
            tracing::debug!(id = %entry.id, "disambiguated colliding entry id");
        }

        seen_ids.insert(entry.id.clone());
        out.push(entry);
    }

    (out, skipped, disambiguated)
}
