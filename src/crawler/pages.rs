//! Page-set builder
//!
//! Assembles the pages a site check visits, from three sources:
//! 1. The sitemap (trusted as-is)
//! 2. Homepage navigation links, each verified with a HEAD request
//! 3. A fixed list of common paths, only when 1 and 2 found nothing
//!
//! The result is deduplicated, starts with the homepage and is otherwise
//! sorted by path, so that truncating it to `max_pages` is deterministic.

use crate::crawler::checker::CheckOptions;
use crate::crawler::fetcher::{fetch_page, fetch_status, FetchMethod, FetchOptions};
use crate::crawler::parser::{extract_navigation_links, extract_title};
use crate::crawler::sitemap::discover_sitemap_pages;
use crate::crawler::types::PageCandidate;
use crate::url::{dedup_key, homepage_of, same_origin};
use futures::stream::{self, StreamExt};
use reqwest::Client;
use std::collections::HashSet;
use url::Url;

/// Paths probed when neither the sitemap nor the navigation yields pages
pub const COMMON_PAGE_PATHS: &[&str] = &[
    "/about", "/contact", "/services", "/products", "/blog", "/news", "/support", "/help", "/faq",
    "/privacy", "/terms",
];

/// Maximum number of navigation links verified per site
pub const MAX_NAV_CANDIDATES: usize = 50;

/// Builds the ordered page set for `site`
///
/// The homepage is always part of the set, even when it is unreachable: the
/// checker then reports the failure instead of silently checking nothing.
pub async fn build_page_set(
    client: &Client,
    site: &Url,
    options: &CheckOptions,
) -> Vec<PageCandidate> {
    let homepage_url = homepage_of(site);
    let get = options.fetch_options(FetchMethod::Get);
    let head = options.fetch_options(FetchMethod::Head);

    let sitemap_pages = discover_sitemap_pages(client, &homepage_url, &get).await;

    let mut known: HashSet<String> = sitemap_pages
        .iter()
        .filter_map(|page| Url::parse(&page.url).ok())
        .map(|url| dedup_key(&url))
        .collect();
    known.insert(dedup_key(&homepage_url));

    let mut homepage_title = None;
    let mut homepage_reachable = false;
    let mut nav_pages = Vec::new();

    match fetch_page(client, homepage_url.as_str(), &get).await {
        Ok(page) if page.is_html() => {
            homepage_reachable = true;
            homepage_title = extract_title(&page.body);

            let nav = navigation_candidates(&page.body, &homepage_url, &mut known);
            tracing::debug!("Verifying {} navigation link(s)", nav.len());
            nav_pages = verify_candidates(client, nav, &head, options.link_concurrency).await;
        }
        Ok(page) => {
            homepage_reachable = true;
            tracing::debug!(
                "Homepage {} is not HTML ({}), skipping navigation discovery",
                homepage_url,
                page.content_type
            );
        }
        Err(failure) => {
            tracing::warn!("Homepage {} unreachable: {}", homepage_url, failure);
        }
    }

    let homepage = PageCandidate::from_url(&homepage_url, homepage_title);
    let mut candidates = sitemap_pages;
    candidates.extend(nav_pages);
    let mut pages = assemble_page_set(homepage.clone(), candidates);

    if pages.len() <= 1 && homepage_reachable {
        let fallback: Vec<(Url, Option<String>)> = COMMON_PAGE_PATHS
            .iter()
            .filter_map(|path| homepage_url.join(path).ok())
            .map(|url| (url, None))
            .collect();
        tracing::debug!("Falling back to {} common path(s)", fallback.len());
        let found = verify_candidates(client, fallback, &head, options.link_concurrency).await;
        pages = assemble_page_set(homepage, found);
    }

    tracing::info!("Page set for {}: {} page(s)", homepage_url, pages.len());
    pages
}

/// Deduplicates candidates and orders them homepage first, then by path
pub fn assemble_page_set(
    homepage: PageCandidate,
    candidates: Vec<PageCandidate>,
) -> Vec<PageCandidate> {
    let mut seen = HashSet::new();
    if let Ok(url) = Url::parse(&homepage.url) {
        seen.insert(dedup_key(&url));
    }

    let mut rest: Vec<PageCandidate> = candidates
        .into_iter()
        .filter(|candidate| match Url::parse(&candidate.url) {
            Ok(url) => seen.insert(dedup_key(&url)),
            Err(_) => false,
        })
        .collect();
    rest.sort_by(|a, b| a.path.cmp(&b.path).then_with(|| a.url.cmp(&b.url)));

    let mut pages = Vec::with_capacity(rest.len() + 1);
    pages.push(homepage);
    pages.extend(rest);
    pages
}

/// Same-origin navigation links not already known, with their link text
fn navigation_candidates(
    html: &str,
    homepage: &Url,
    known: &mut HashSet<String>,
) -> Vec<(Url, Option<String>)> {
    extract_navigation_links(html, homepage)
        .into_iter()
        .filter_map(|link| {
            let mut url = Url::parse(&link.url).ok()?;
            url.set_fragment(None);
            let text = Some(link.link_text).filter(|t| !t.is_empty());
            Some((url, text))
        })
        .filter(|(url, _)| same_origin(url, homepage))
        .filter(|(url, _)| known.insert(dedup_key(url)))
        .take(MAX_NAV_CANDIDATES)
        .collect()
}

/// Keeps the candidates that answer a HEAD request with 200
async fn verify_candidates(
    client: &Client,
    candidates: Vec<(Url, Option<String>)>,
    options: &FetchOptions,
    concurrency: usize,
) -> Vec<PageCandidate> {
    let checked: Vec<_> = stream::iter(candidates)
        .map(|(url, title)| async move {
            let status = fetch_status(client, url.as_str(), options).await;
            (url, title, status)
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    checked
        .into_iter()
        .filter(|(_, _, status)| status.status_code == Some(200))
        .map(|(url, title, _)| PageCandidate::from_url(&url, title))
        .collect()
}
