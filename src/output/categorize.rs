//! Broken-link categorization
//!
//! Each record falls into exactly one [`Category`]: the first rule in
//! [`CATEGORY_RULES`] that matches wins, and records no rule matches land in
//! [`Category::Other`].

use crate::crawler::{BrokenLinkRecord, ErrorKind};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Failure class of a broken link
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Category {
    #[serde(rename = "Not Found")]
    NotFound,
    #[serde(rename = "Server Error")]
    ServerError,
    #[serde(rename = "Timeout")]
    Timeout,
    #[serde(rename = "DNS/Connection Error")]
    DnsConnection,
    #[serde(rename = "Client Error")]
    ClientError,
    #[serde(rename = "Other")]
    Other,
}

impl Category {
    /// Every category, in rule order
    pub const ALL: [Category; 6] = [
        Category::NotFound,
        Category::ServerError,
        Category::Timeout,
        Category::DnsConnection,
        Category::ClientError,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "Not Found",
            Self::ServerError => "Server Error",
            Self::Timeout => "Timeout",
            Self::DnsConnection => "DNS/Connection Error",
            Self::ClientError => "Client Error",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

type Rule = fn(&BrokenLinkRecord) -> bool;

/// Ordered categorization rules; the first match wins
pub const CATEGORY_RULES: &[(Category, Rule)] = &[
    (Category::NotFound, is_not_found),
    (Category::ServerError, is_server_error),
    (Category::Timeout, is_timeout),
    (Category::DnsConnection, is_dns_or_connection),
    (Category::ClientError, is_client_error),
];

fn is_not_found(record: &BrokenLinkRecord) -> bool {
    record.status_code == Some(404)
}

fn is_server_error(record: &BrokenLinkRecord) -> bool {
    record.status_code.is_some_and(|code| code >= 500)
}

fn is_timeout(record: &BrokenLinkRecord) -> bool {
    record.error_kind == Some(ErrorKind::Timeout)
}

fn is_dns_or_connection(record: &BrokenLinkRecord) -> bool {
    matches!(
        record.error_kind,
        Some(ErrorKind::Dns) | Some(ErrorKind::Network)
    )
}

fn is_client_error(record: &BrokenLinkRecord) -> bool {
    record
        .status_code
        .is_some_and(|code| (400..=499).contains(&code))
}

/// Returns the category of a single record
pub fn categorize_record(record: &BrokenLinkRecord) -> Category {
    CATEGORY_RULES
        .iter()
        .find(|(_, matches)| matches(record))
        .map_or(Category::Other, |(category, _)| *category)
}

/// Broken links grouped by category
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorizedReport {
    /// Non-empty groups, records in input order
    pub categories: BTreeMap<Category, Vec<BrokenLinkRecord>>,

    /// Count per category, including empty ones
    pub counts: BTreeMap<Category, usize>,

    /// Number of records categorized
    pub total: usize,
}

/// Groups broken links by category
///
/// Pure and deterministic: every record appears in exactly one group.
pub fn categorize(records: &[BrokenLinkRecord]) -> CategorizedReport {
    let mut categories: BTreeMap<Category, Vec<BrokenLinkRecord>> = BTreeMap::new();
    for record in records {
        categories
            .entry(categorize_record(record))
            .or_default()
            .push(record.clone());
    }

    let counts = Category::ALL
        .iter()
        .map(|category| {
            let count = categories.get(category).map_or(0, Vec::len);
            (*category, count)
        })
        .collect();

    CategorizedReport {
        categories,
        counts,
        total: records.len(),
    }
}
