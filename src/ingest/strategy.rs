// src/ingest/strategy.rs
//! Page-structure heuristics: how list items and their fields are found in HTML.
//!
//! Kept behind [`ExtractionStrategy`] so the brittle selectors can change
//! without touching identity rules or reconciliation.

use anyhow::{anyhow, Result};
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::ingest::types::RawEntry;

pub trait ExtractionStrategy: Send + Sync {
    /// Pull raw items from `html`, in document order. Unknown markup yields `[]`.
    fn extract(&self, html: &str, base_url: &str) -> Vec<RawEntry>;
}

/// CSS selectors describing one known page layout.
#[derive(Debug, Clone, Copy)]
pub struct ProbeSpec {
    pub name: &'static str,
    pub item: &'static str,
    pub link: &'static str,
    pub title: &'static str,
    pub date: &'static str,
    pub category: &'static str,
}

/// The news page's own markup first, then two generic layouts.
pub const DEFAULT_PROBES: &[ProbeSpec] = &[
    ProbeSpec {
        name: "items-item",
        item: ".items-item",
        link: "a[href]",
        title: ".item-title p",
        date: ".item-date span:first-child",
        category: ".item-date span:last-child",
    },
    ProbeSpec {
        name: "article",
        item: "article",
        link: "a[href]",
        title: "h2, h3, .title",
        date: "time, .date",
        category: ".category, .cat",
    },
    ProbeSpec {
        name: "news-list",
        item: ".news-list li",
        link: "a[href]",
        title: ".title, a",
        date: ".date, time",
        category: ".category",
    },
];

struct SelectorProbe {
    name: &'static str,
    item: Selector,
    link: Selector,
    title: Selector,
    date: Selector,
    category: Selector,
}

fn parse_selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("invalid selector {css:?}: {e}"))
}

impl SelectorProbe {
    fn compile(spec: &ProbeSpec) -> Result<Self> {
        Ok(Self {
            name: spec.name,
            item: parse_selector(spec.item)?,
            link: parse_selector(spec.link)?,
            title: parse_selector(spec.title)?,
            date: parse_selector(spec.date)?,
            category: parse_selector(spec.category)?,
        })
    }

    fn first_text(el: &ElementRef<'_>, sel: &Selector) -> String {
        el.select(sel)
            .next()
            .map(|e| e.text().collect::<String>())
            .unwrap_or_default()
    }

    fn href(el: &ElementRef<'_>, sel: &Selector, base: Option<&Url>) -> String {
        // The item itself may be the anchor.
        let anchor = if el.value().name() == "a" {
            Some(*el)
        } else {
            el.select(sel).next()
        };
        let Some(href) = anchor.and_then(|a| a.value().attr("href")) else {
            return String::new();
        };
        let href = href.trim();
        if href.is_empty() {
            return String::new();
        }
        match base {
            Some(b) => b.join(href).map(|u| u.to_string()).unwrap_or_default(),
            None => Url::parse(href).map(|u| u.to_string()).unwrap_or_default(),
        }
    }

    fn run(&self, doc: &Html, base: Option<&Url>) -> Vec<RawEntry> {
        doc.select(&self.item)
            .map(|el| RawEntry {
                title: Self::first_text(&el, &self.title),
                url: Self::href(&el, &self.link, base),
                date: Self::first_text(&el, &self.date),
                category: Self::first_text(&el, &self.category),
            })
            .filter(|r| !r.title.trim().is_empty())
            .collect()
    }
}

/// Tries each probe in order; the first one that yields items wins.
pub struct SelectorStrategy {
    probes: Vec<SelectorProbe>,
}

impl SelectorStrategy {
    pub fn new(specs: &[ProbeSpec]) -> Result<Self> {
        let probes = specs
            .iter()
            .map(SelectorProbe::compile)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { probes })
    }

    pub fn with_default_probes() -> Self {
        Self::new(DEFAULT_PROBES).expect("built-in selectors are valid")
    }
}

impl Default for SelectorStrategy {
    fn default() -> Self {
        Self::with_default_probes()
    }
}

impl ExtractionStrategy for SelectorStrategy {
    fn extract(&self, html: &str, base_url: &str) -> Vec<RawEntry> {
        let doc = Html::parse_document(html);
        let base = Url::parse(base_url).ok();
        for probe in &self.probes {
            let found = probe.run(&doc, base.as_ref());
            if !found.is_empty() {
                tracing::debug!(probe = probe.name, count = found.len(), "selector probe matched");
                return found;
            }
            tracing::trace!(probe = probe.name, "selector probe found nothing");
        }
        Vec::new()
    }
}
