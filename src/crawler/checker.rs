//! Link liveness checker
//!
//! Each page goes through the phases of [`CheckPhase`]: the page is fetched,
//! its links are extracted and deduplicated, and every link is probed with
//! bounded concurrency. Results keep document order no matter which probe
//! finishes first, and a site check keeps page-set order.

use crate::config::{
    validate_max_pages, validate_max_retries, validate_timeout_ms, CheckerConfig,
};
use crate::crawler::exclude::ExcludeMatcher;
use crate::crawler::fetcher::{
    build_http_client, fetch_page, fetch_status, FetchMethod, FetchOptions, MAX_BODY_BYTES,
};
use crate::crawler::pages;
use crate::crawler::parser::extract_links_with_images;
use crate::crawler::types::{
    BrokenLinkRecord, CheckResult, CheckType, LinkReference, PageCandidate, PageOutcome,
};
use crate::state::{CheckPhase, PhaseTracker};
use crate::url::parse_seed_url;
use crate::LinkScoutError;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use std::collections::HashSet;
use std::time::{Duration, Instant};
use url::Url;

/// Settings for one check run
#[derive(Debug, Clone)]
pub struct CheckOptions {
    /// Maximum number of pages visited by a site check
    pub max_pages: usize,

    /// Per-request timeout
    pub timeout: Duration,

    /// Retries after a network-level failure
    pub max_retries: u32,

    /// Overrides the client's user agent when set
    pub user_agent: Option<String>,

    /// Regular expressions; matching links are skipped entirely
    pub exclude_patterns: Vec<String>,

    /// Link probes in flight per page
    pub link_concurrency: usize,

    /// Pages checked at once during a site check
    pub page_concurrency: usize,

    /// Base delay between retries
    pub retry_backoff: Duration,

    /// Also check `<img src>` references
    pub check_images: bool,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self::from(&CheckerConfig::default())
    }
}

impl From<&CheckerConfig> for CheckOptions {
    fn from(config: &CheckerConfig) -> Self {
        Self {
            max_pages: config.max_pages,
            timeout: Duration::from_millis(config.timeout_ms),
            max_retries: config.max_retries,
            user_agent: None,
            exclude_patterns: config.exclude_patterns.clone(),
            link_concurrency: config.link_concurrency,
            page_concurrency: config.page_concurrency,
            retry_backoff: Duration::from_millis(config.retry_backoff_ms),
            check_images: config.check_images,
        }
    }
}

impl CheckOptions {
    /// Fetcher settings for requests made with `method`
    pub fn fetch_options(&self, method: FetchMethod) -> FetchOptions {
        FetchOptions {
            method,
            timeout: self.timeout,
            user_agent: self.user_agent.clone(),
            max_retries: self.max_retries,
            retry_backoff: self.retry_backoff,
            max_body_bytes: MAX_BODY_BYTES,
        }
    }

    /// Rejects out-of-range values as input errors
    pub fn validate(&self) -> Result<(), LinkScoutError> {
        let timeout_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX);
        validate_timeout_ms(timeout_ms)
            .and_then(|_| validate_max_retries(self.max_retries))
            .and_then(|_| validate_max_pages(self.max_pages))
            .map_err(|e| LinkScoutError::InvalidInput(e.to_string()))?;

        if self.link_concurrency == 0 || self.page_concurrency == 0 {
            return Err(LinkScoutError::InvalidInput(
                "concurrency limits must be at least 1".to_string(),
            ));
        }

        if let Some(user_agent) = &self.user_agent {
            if user_agent.trim().is_empty() {
                return Err(LinkScoutError::InvalidInput(
                    "userAgent cannot be empty".to_string(),
                ));
            }
        }

        Ok(())
    }
}

/// Checks pages, sites and single URLs for broken links
///
/// # Example
///
/// ```no_run
/// use linkscout::{CheckOptions, LinkChecker};
///
/// # async fn run() -> linkscout::Result<()> {
/// let checker = LinkChecker::new(CheckOptions::default(), "LinkScout/1.0")?;
/// let result = checker.check_page_links("https://example.com/").await?;
/// println!("{} of {} links are broken", result.broken_link_count, result.total_links);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct LinkChecker {
    client: Client,
    options: CheckOptions,
    excludes: ExcludeMatcher,
}

impl LinkChecker {
    /// Creates a checker with its own HTTP client
    pub fn new(options: CheckOptions, user_agent: &str) -> Result<Self, LinkScoutError> {
        let client = build_http_client(user_agent)?;
        Self::with_client(client, options)
    }

    /// Creates a checker that shares an existing HTTP client
    pub fn with_client(client: Client, options: CheckOptions) -> Result<Self, LinkScoutError> {
        options.validate()?;
        let excludes = ExcludeMatcher::new(&options.exclude_patterns)?;
        Ok(Self {
            client,
            options,
            excludes,
        })
    }

    pub fn options(&self) -> &CheckOptions {
        &self.options
    }

    /// Runs the check selected by `check_type`
    ///
    /// A single-URL check is wrapped in a [`CheckResult`] covering one link.
    pub async fn run(&self, check_type: CheckType, url: &str) -> Result<CheckResult, LinkScoutError> {
        match check_type {
            CheckType::Page => self.check_page_links(url).await,
            CheckType::Site => self.check_site_links(url).await,
            CheckType::Single => {
                let start = Instant::now();
                let seed = parse_seed_url(url)?;
                let broken = self.check_url(&seed).await;
                Ok(CheckResult::from_single(seed.as_str(), broken, start.elapsed()))
            }
        }
    }

    /// Checks one URL; returns a record only if it is broken
    pub async fn check_single_url(
        &self,
        url: &str,
    ) -> Result<Option<BrokenLinkRecord>, LinkScoutError> {
        let seed = parse_seed_url(url)?;
        Ok(self.check_url(&seed).await)
    }

    /// Fetches one page and checks every link on it
    pub async fn check_page_links(&self, page_url: &str) -> Result<CheckResult, LinkScoutError> {
        let start = Instant::now();
        let seed = parse_seed_url(page_url)?;

        let outcome = self.check_page(&seed).await?;
        let result = CheckResult::from_outcomes(vec![outcome], start.elapsed());
        log_result(seed.as_str(), &result);
        Ok(result)
    }

    /// Builds the page set of a site and checks the first `max_pages` pages
    pub async fn check_site_links(&self, site_url: &str) -> Result<CheckResult, LinkScoutError> {
        let start = Instant::now();
        let seed = parse_seed_url(site_url)?;

        let mut page_set = pages::build_page_set(&self.client, &seed, &self.options).await;
        if page_set.len() > self.options.max_pages {
            tracing::info!(
                "Checking the first {} of {} page(s)",
                self.options.max_pages,
                page_set.len()
            );
            page_set.truncate(self.options.max_pages);
        }

        let page_urls: Vec<Url> = page_set
            .iter()
            .filter_map(|page| Url::parse(&page.url).ok())
            .collect();

        let checks: Vec<_> = page_urls.iter().map(|url| self.check_page(url)).collect();
        let outcomes = stream::iter(checks)
            .buffered(self.options.page_concurrency.max(1))
            .collect::<Vec<Result<PageOutcome, LinkScoutError>>>()
            .await
            .into_iter()
            .collect::<Result<Vec<_>, _>>()?;

        let result = CheckResult::from_outcomes(outcomes, start.elapsed());
        log_result(seed.as_str(), &result);
        Ok(result)
    }

    /// Builds the ordered page set a site check would visit
    pub async fn build_page_set(
        &self,
        site_url: &str,
    ) -> Result<Vec<PageCandidate>, LinkScoutError> {
        let seed = parse_seed_url(site_url)?;
        Ok(pages::build_page_set(&self.client, &seed, &self.options).await)
    }

    async fn check_page(&self, page_url: &Url) -> Result<PageOutcome, LinkScoutError> {
        let mut tracker = PhaseTracker::new(page_url.as_str());
        tracker.advance(CheckPhase::FetchingPage)?;

        let get = self.options.fetch_options(FetchMethod::Get);
        let page = match fetch_page(&self.client, page_url.as_str(), &get).await {
            Ok(page) => page,
            Err(failure) => {
                tracker.advance(CheckPhase::Error)?;
                tracing::warn!("Failed to fetch {}: {}", page_url, failure);
                return Ok(PageOutcome::Failed {
                    page_url: page_url.to_string(),
                    error: format!("Failed to fetch {}: {}", page_url, failure),
                });
            }
        };

        tracker.advance(CheckPhase::ExtractingLinks)?;
        // Relative links resolve against the URL the page was served from
        let base = Url::parse(&page.final_url).unwrap_or_else(|_| page_url.clone());
        if base != *page_url {
            tracing::debug!("{} redirected to {}", page_url, base);
        }
        let links = if page.is_html() {
            self.collect_links(&page.body, &base)
        } else {
            tracing::debug!("{} is not HTML ({}), no links", page_url, page.content_type);
            Vec::new()
        };

        tracker.advance(CheckPhase::CheckingLinks)?;
        tracing::info!("Checking {} link(s) on {}", links.len(), page_url);
        let head = self.options.fetch_options(FetchMethod::Head);
        let checks: Vec<_> = links.iter().map(|link| self.check_link(link, &head)).collect();
        let broken_links: Vec<BrokenLinkRecord> = stream::iter(checks)
            .buffered(self.options.link_concurrency.max(1))
            .collect::<Vec<Option<BrokenLinkRecord>>>()
            .await
            .into_iter()
            .flatten()
            .collect();

        tracker.advance(CheckPhase::Aggregating)?;
        let outcome = PageOutcome::Checked {
            page_url: page_url.to_string(),
            total_links: links.len(),
            broken_links,
        };

        tracker.advance(CheckPhase::Done)?;
        Ok(outcome)
    }

    /// Extracts links in document order, dropping repeats and excluded URLs
    fn collect_links(&self, html: &str, page_url: &Url) -> Vec<LinkReference> {
        let mut seen = HashSet::new();
        let mut excluded = 0usize;

        let links: Vec<LinkReference> =
            extract_links_with_images(html, page_url, self.options.check_images)
                .into_iter()
                .filter(|link| seen.insert(without_fragment(&link.url).to_string()))
                .filter(|link| {
                    let skip = self.excludes.is_excluded(&link.url);
                    if skip {
                        excluded += 1;
                    }
                    !skip
                })
                .collect();

        if excluded > 0 {
            tracing::debug!("Skipped {} excluded link(s) on {}", excluded, page_url);
        }
        links
    }

    async fn check_url(&self, url: &Url) -> Option<BrokenLinkRecord> {
        let head = self.options.fetch_options(FetchMethod::Head);
        self.check_link(&LinkReference::standalone(url), &head).await
    }

    async fn check_link(
        &self,
        link: &LinkReference,
        options: &FetchOptions,
    ) -> Option<BrokenLinkRecord> {
        let status = fetch_status(&self.client, &link.url, options).await;
        if status.ok {
            None
        } else {
            Some(BrokenLinkRecord::from_check(link, &status))
        }
    }
}

fn without_fragment(url: &str) -> &str {
    url.split_once('#').map_or(url, |(base, _)| base)
}

fn log_result(url: &str, result: &CheckResult) {
    if result.is_success() {
        tracing::info!(
            "{}: {} link(s) on {} page(s), {} broken ({}ms)",
            url,
            result.total_links,
            result.checked_pages.len(),
            result.broken_link_count,
            result.duration
        );
    } else {
        tracing::warn!(
            "{}: no page could be checked ({} error(s))",
            url,
            result.errors.len()
        );
    }
}
