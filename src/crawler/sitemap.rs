//! Sitemap discovery
//!
//! Probes the well-known sitemap locations, then the `Sitemap:` directives
//! in robots.txt, and turns the first sitemap that yields pages into page
//! candidates. A failed probe (network error, non-2xx, malformed XML) only
//! skips that candidate.

use crate::crawler::fetcher::{fetch_page, FetchMethod, FetchOptions};
use crate::crawler::types::PageCandidate;
use crate::robots::fetch_robots;
use crate::url::{dedup_key, homepage_of, same_origin};
use quick_xml::events::Event;
use quick_xml::Reader;
use reqwest::Client;
use std::collections::HashSet;
use url::Url;

/// Sitemap locations probed in order before robots.txt is consulted
pub const SITEMAP_PATHS: &[&str] = &["/sitemap.xml", "/sitemap_index.xml", "/sitemaps.xml"];

/// Maximum number of child sitemaps followed from one sitemap index
pub const MAX_CHILD_SITEMAPS: usize = 10;

/// `<loc>` values found in a sitemap document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SitemapDocument {
    /// Page URLs from `<url><loc>` entries
    pub pages: Vec<String>,

    /// Child sitemap URLs from `<sitemap><loc>` entries (sitemap indexes)
    pub sitemaps: Vec<String>,
}

impl SitemapDocument {
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty() && self.sitemaps.is_empty()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Entry {
    None,
    Url,
    Sitemap,
}

/// Parses a sitemap or sitemap index
///
/// Only `<loc>` elements nested in `<url>` or `<sitemap>` are collected;
/// namespace prefixes are ignored.
pub fn parse_sitemap_xml(xml: &str) -> Result<SitemapDocument, quick_xml::Error> {
    let mut reader = Reader::from_reader(xml.as_bytes());
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut document = SitemapDocument::default();
    let mut entry = Entry::None;
    let mut entry_depth = 0usize;
    let mut depth = 0usize;
    let mut in_loc = false;
    let mut loc = String::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                depth += 1;
                match e.local_name().as_ref() {
                    b"url" if entry == Entry::None => {
                        entry = Entry::Url;
                        entry_depth = depth;
                    }
                    b"sitemap" if entry == Entry::None => {
                        entry = Entry::Sitemap;
                        entry_depth = depth;
                    }
                    // Only direct children count; image:loc and friends are nested deeper
                    b"loc" if entry != Entry::None && depth == entry_depth + 1 => {
                        in_loc = true;
                        loc.clear();
                    }
                    _ => {}
                }
            }
            Event::End(_) if in_loc => {
                in_loc = false;
                depth = depth.saturating_sub(1);
                let value = loc.trim();
                if !value.is_empty() {
                    match entry {
                        Entry::Url => document.pages.push(value.to_string()),
                        Entry::Sitemap => document.sitemaps.push(value.to_string()),
                        Entry::None => {}
                    }
                }
            }
            Event::End(_) => {
                if entry != Entry::None && depth == entry_depth {
                    entry = Entry::None;
                }
                depth = depth.saturating_sub(1);
            }
            Event::Text(t) if in_loc => loc.push_str(&t.unescape()?),
            Event::CData(c) if in_loc => loc.push_str(&String::from_utf8_lossy(&c.into_inner())),
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(document)
}

/// Discovers the pages of `site` from its sitemap
///
/// # Discovery Order
///
/// 1. `/sitemap.xml`, `/sitemap_index.xml`, `/sitemaps.xml`
/// 2. Each `Sitemap:` directive in `/robots.txt`
///
/// The first source yielding at least one same-origin page wins. Sitemap
/// indexes are followed one level deep (up to [`MAX_CHILD_SITEMAPS`]
/// same-origin children). Returns an empty list when nothing is found.
pub async fn discover_sitemap_pages(
    client: &Client,
    site: &Url,
    options: &FetchOptions,
) -> Vec<PageCandidate> {
    let origin = homepage_of(site);
    let options = options.with_method(FetchMethod::Get);

    for path in SITEMAP_PATHS {
        let Ok(sitemap_url) = origin.join(path) else {
            continue;
        };
        let pages = load_sitemap(client, &sitemap_url, &origin, &options).await;
        if !pages.is_empty() {
            tracing::info!("Found {} page(s) in {}", pages.len(), sitemap_url);
            return pages;
        }
    }

    if let Some(robots) = fetch_robots(client, &origin, &options).await {
        for sitemap in robots.sitemaps() {
            let Ok(sitemap_url) = Url::parse(sitemap) else {
                continue;
            };
            let pages = load_sitemap(client, &sitemap_url, &origin, &options).await;
            if !pages.is_empty() {
                tracing::info!(
                    "Found {} page(s) in {} (via robots.txt)",
                    pages.len(),
                    sitemap_url
                );
                return pages;
            }
        }
    }

    tracing::debug!("No usable sitemap for {}", origin);
    Vec::new()
}

/// Fetches one sitemap (following an index one level) and keeps same-origin pages
async fn load_sitemap(
    client: &Client,
    sitemap_url: &Url,
    origin: &Url,
    options: &FetchOptions,
) -> Vec<PageCandidate> {
    let Some(document) = fetch_sitemap_document(client, sitemap_url, options).await else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut pages = same_origin_pages(&document.pages, origin, &mut seen);

    let children = document
        .sitemaps
        .iter()
        .filter_map(|loc| Url::parse(loc).ok())
        .filter(|child| same_origin(child, origin))
        .take(MAX_CHILD_SITEMAPS);

    for child in children {
        if let Some(child_document) = fetch_sitemap_document(client, &child, options).await {
            pages.extend(same_origin_pages(&child_document.pages, origin, &mut seen));
        }
    }

    pages
}

async fn fetch_sitemap_document(
    client: &Client,
    sitemap_url: &Url,
    options: &FetchOptions,
) -> Option<SitemapDocument> {
    let page = match fetch_page(client, sitemap_url.as_str(), options).await {
        Ok(page) => page,
        Err(failure) => {
            tracing::debug!("Sitemap probe {} failed: {}", sitemap_url, failure);
            return None;
        }
    };

    match parse_sitemap_xml(&page.body) {
        Ok(document) => Some(document),
        Err(e) => {
            tracing::debug!("Malformed sitemap {}: {}", sitemap_url, e);
            None
        }
    }
}

fn same_origin_pages(
    locs: &[String],
    origin: &Url,
    seen: &mut HashSet<String>,
) -> Vec<PageCandidate> {
    locs.iter()
        .filter_map(|loc| Url::parse(loc).ok())
        .filter(|url| same_origin(url, origin))
        .filter(|url| seen.insert(dedup_key(url)))
        .map(|url| PageCandidate::from_url(&url, None))
        .collect()
}
