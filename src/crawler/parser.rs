//! HTML parser for extracting links and metadata
//!
//! This module handles parsing HTML content to extract:
//! - Outbound links (from `<a href>` and, optionally, `<img src>`)
//! - Navigation links used for page discovery
//! - Page title
//!
//! Malformed markup and unresolvable hrefs never fail a parse; they simply
//! produce fewer links.

use crate::crawler::types::LinkReference;
use crate::url::same_origin;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Schemes that never point at a checkable document
const SKIPPED_SCHEMES: &[&str] = &["mailto:", "tel:", "javascript:", "data:"];

/// Extracts every anchor link from `html`
pub fn extract_links(html: &str, base_url: &Url) -> Vec<LinkReference> {
    extract_links_with_images(html, base_url, false)
}

/// Extracts anchor links and, if requested, image sources
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` anywhere in the document
/// - `<img src="...">` when `include_images` is set
///
/// **Exclude:**
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs
/// - Fragment-only links (`#top`)
/// - Hrefs that do not resolve to an http(s) URL
///
/// # Example
///
/// ```no_run
/// use linkscout::crawler::extract_links_with_images;
/// use url::Url;
///
/// let html = r#"<a href="/page">Link</a><img src="/logo.png" alt="Logo">"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let links = extract_links_with_images(html, &base_url, true);
/// assert_eq!(links[0].url, "https://example.com/page");
/// assert_eq!(links[1].tag, "img");
/// ```
pub fn extract_links_with_images(
    html: &str,
    base_url: &Url,
    include_images: bool,
) -> Vec<LinkReference> {
    let document = Html::parse_document(html);
    links_of(&document, base_url, include_images)
}

/// Extracts links from `<nav>` and `<header>` elements
///
/// Pages without navigation markup fall back to every anchor on the page.
pub fn extract_navigation_links(html: &str, base_url: &Url) -> Vec<LinkReference> {
    let document = Html::parse_document(html);

    let nav_links = match Selector::parse("nav a[href], header a[href]") {
        Ok(selector) => document
            .select(&selector)
            .filter_map(|element| anchor_reference(element, base_url))
            .collect(),
        Err(_) => Vec::new(),
    };

    if nav_links.is_empty() {
        links_of(&document, base_url, false)
    } else {
        nav_links
    }
}

/// Extracts the page title from raw HTML
pub fn extract_title(html: &str) -> Option<String> {
    title_of(&Html::parse_document(html))
}

fn title_of(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| collapse_whitespace(&element.text().collect::<String>()))
        .filter(|s| !s.is_empty())
}

fn links_of(document: &Html, base_url: &Url, include_images: bool) -> Vec<LinkReference> {
    let selector = if include_images {
        Selector::parse("a[href], img[src]")
    } else {
        Selector::parse("a[href]")
    };
    let Ok(selector) = selector else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| match element.value().name() {
            "img" => image_reference(element, base_url),
            _ => anchor_reference(element, base_url),
        })
        .collect()
}

fn anchor_reference(element: ElementRef<'_>, base_url: &Url) -> Option<LinkReference> {
    let href = element.value().attr("href")?;
    let url = resolve_link(href, base_url)?;
    let text = collapse_whitespace(&element.text().collect::<String>());
    Some(reference(url, "a", "href", text, base_url))
}

fn image_reference(element: ElementRef<'_>, base_url: &Url) -> Option<LinkReference> {
    let src = element.value().attr("src")?;
    let url = resolve_link(src, base_url)?;
    let alt = collapse_whitespace(element.value().attr("alt").unwrap_or(""));
    Some(reference(url, "img", "src", alt, base_url))
}

fn reference(url: Url, tag: &str, attribute: &str, text: String, base_url: &Url) -> LinkReference {
    LinkReference {
        is_internal: same_origin(&url, base_url),
        url: url.to_string(),
        tag: tag.to_string(),
        attribute: attribute.to_string(),
        link_text: text,
        parent_page_url: base_url.to_string(),
    }
}

/// Resolves a link href to an absolute URL and validates it
///
/// Absolute hrefs are kept, `/path` resolves against the base origin and
/// anything else against the full base URL. Returns None if the link should
/// be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Fragment-only and empty hrefs
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if SKIPPED_SCHEMES
        .iter()
        .any(|scheme| lowered.starts_with(scheme))
    {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;
    match absolute_url.scheme() {
        "http" | "https" => Some(absolute_url),
        _ => None,
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
