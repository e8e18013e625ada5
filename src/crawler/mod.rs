//! Crawler module for page discovery and link checking
//!
//! This module contains the core checking logic, including:
//! - HTTP fetching with retry logic
//! - HTML parsing and link extraction
//! - Sitemap discovery and page-set assembly
//! - Link liveness checks and result aggregation

mod checker;
mod exclude;
mod fetcher;
mod pages;
mod parser;
mod sitemap;
mod types;

pub use checker::{CheckOptions, LinkChecker};
pub use exclude::ExcludeMatcher;
pub use fetcher::{
    backoff_delay, build_http_client, classify_error, fetch_page, fetch_status, is_live_status,
    ErrorKind, FetchFailure, FetchMethod, FetchOptions, FetchStatus, FetchedPage,
    DEFAULT_MAX_REDIRECTS, MAX_BODY_BYTES,
};
pub use pages::{assemble_page_set, build_page_set, COMMON_PAGE_PATHS, MAX_NAV_CANDIDATES};
pub use parser::{
    extract_links, extract_links_with_images, extract_navigation_links, extract_title,
    resolve_link,
};
pub use sitemap::{
    discover_sitemap_pages, parse_sitemap_xml, SitemapDocument, MAX_CHILD_SITEMAPS, SITEMAP_PATHS,
};
pub use types::{
    title_from_path, BrokenLinkRecord, CheckResult, CheckStatus, CheckType, LinkReference,
    PageCandidate, PageOutcome,
};
