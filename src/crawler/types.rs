//! Records produced and consumed by the checker
//!
//! All records serialize with camelCase keys, matching the JSON shape the
//! HTTP API returns.

use crate::crawler::fetcher::{ErrorKind, FetchStatus};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use url::Url;

/// What a check request covers
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum CheckType {
    /// Every link on one page
    #[default]
    Page,
    /// Every link on up to `max_pages` pages of a site
    Site,
    /// Liveness of exactly one URL
    Single,
}

impl CheckType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::Site => "site",
            Self::Single => "single",
        }
    }
}

impl fmt::Display for CheckType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A page that belongs to the site being checked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageCandidate {
    /// URL path (`/` for the homepage)
    pub path: String,

    /// Page title or a title derived from the path
    pub title: String,

    /// Absolute URL
    pub url: String,
}

impl PageCandidate {
    /// Creates a candidate, deriving a title from the path when none is given
    pub fn from_url(url: &Url, title: Option<String>) -> Self {
        let path = url.path().to_string();
        let title = title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| title_from_path(&path));

        Self {
            path,
            title,
            url: url.to_string(),
        }
    }
}

/// Turns `/about-us/team_members` into `Team Members`
pub fn title_from_path(path: &str) -> String {
    let last = path.trim_end_matches('/').rsplit('/').next().unwrap_or("");
    if last.is_empty() {
        return "Home".to_string();
    }

    let stem = last.split('.').next().unwrap_or(last);
    stem.split(|c| c == '-' || c == '_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// An outbound reference found in a page's HTML
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkReference {
    /// Absolute URL of the link target
    pub url: String,

    /// Element name (`a`, `img`)
    pub tag: String,

    /// Attribute the URL came from (`href`, `src`)
    pub attribute: String,

    /// Whitespace-collapsed link text (or `alt` for images)
    pub link_text: String,

    /// Page the link was found on
    pub parent_page_url: String,

    /// True if the target shares the parent page's origin
    pub is_internal: bool,
}

impl LinkReference {
    /// A reference to a URL that was not found on any page
    pub fn standalone(url: &Url) -> Self {
        Self {
            url: url.to_string(),
            tag: String::new(),
            attribute: String::new(),
            link_text: String::new(),
            parent_page_url: String::new(),
            is_internal: false,
        }
    }
}

/// A link that failed its liveness check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrokenLinkRecord {
    pub url: String,

    /// Final HTTP status, `None` when no response was received
    pub status_code: Option<u16>,

    pub status_text: String,

    /// Why the link counts as broken
    pub reason: String,

    /// Page the link was found on
    pub parent: String,

    pub tag: String,
    pub attribute: String,
    pub link_text: String,
    pub is_internal: bool,

    /// Always true
    pub is_broken: bool,

    /// Network failure class, `None` for HTTP error statuses
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

impl BrokenLinkRecord {
    /// Builds a record from a link and its failed probe
    pub fn from_check(link: &LinkReference, status: &FetchStatus) -> Self {
        let reason = match (status.status_code, status.error_kind) {
            (Some(_), _) => status.status_text.clone(),
            (None, Some(kind)) => match &status.error_message {
                Some(message) => format!("{}: {}", kind.label(), message),
                None => kind.label().to_string(),
            },
            (None, None) => "Unknown error".to_string(),
        };

        Self {
            url: link.url.clone(),
            status_code: status.status_code,
            status_text: status.status_text.clone(),
            reason,
            parent: link.parent_page_url.clone(),
            tag: link.tag.clone(),
            attribute: link.attribute.clone(),
            link_text: link.link_text.clone(),
            is_internal: link.is_internal,
            is_broken: true,
            error_kind: status.error_kind,
        }
    }
}

/// Whether a check could be carried out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    /// At least one page was fetched and examined
    Success,
    /// Nothing could be examined
    Error,
}

/// Result of checking a single page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    /// The page was fetched and its links were checked
    Checked {
        page_url: String,
        total_links: usize,
        broken_links: Vec<BrokenLinkRecord>,
    },
    /// The page itself could not be fetched
    Failed { page_url: String, error: String },
}

/// Aggregate result of a page, site or single-URL check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    pub total_links: usize,
    pub broken_links: Vec<BrokenLinkRecord>,
    pub broken_link_count: usize,
    pub checked_pages: Vec<String>,
    pub errors: Vec<String>,
    pub status: CheckStatus,

    /// Wall-clock duration in milliseconds
    pub duration: u64,
}

impl CheckResult {
    /// Merges page outcomes in the order given
    ///
    /// The status is `Error` only when no page could be examined.
    pub fn from_outcomes(outcomes: Vec<PageOutcome>, elapsed: Duration) -> Self {
        let mut total_links = 0;
        let mut broken = Vec::new();
        let mut checked_pages = Vec::new();
        let mut errors = Vec::new();

        for outcome in outcomes {
            match outcome {
                PageOutcome::Checked {
                    page_url,
                    total_links: links,
                    broken_links,
                } => {
                    total_links += links;
                    broken.extend(broken_links);
                    checked_pages.push(page_url);
                }
                PageOutcome::Failed { error, .. } => errors.push(error),
            }
        }

        let status = if checked_pages.is_empty() {
            CheckStatus::Error
        } else {
            CheckStatus::Success
        };

        Self {
            total_links,
            broken_link_count: broken.len(),
            broken_links: broken,
            checked_pages,
            errors,
            status,
            duration: duration_ms(elapsed),
        }
    }

    /// Result of a single-URL check
    /// Wraps a single-URL check; the probed URL is the one checked page
    pub fn from_single(url: &str, broken: Option<BrokenLinkRecord>, elapsed: Duration) -> Self {
        let broken_links: Vec<BrokenLinkRecord> = broken.into_iter().collect();
        Self {
            total_links: 1,
            broken_link_count: broken_links.len(),
            broken_links,
            checked_pages: vec![url.to_string()],
            errors: Vec::new(),
            status: CheckStatus::Success,
            duration: duration_ms(elapsed),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == CheckStatus::Success
    }
}

fn duration_ms(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}
