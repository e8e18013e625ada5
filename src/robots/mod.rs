//! Robots.txt handling module
//!
//! Robots.txt is only consulted for its `Sitemap:` directives, which feed
//! sitemap discovery when none of the well-known sitemap paths exist.

mod parser;

pub use parser::ParsedRobots;

use crate::crawler::{fetch_page, FetchMethod, FetchOptions};
use reqwest::Client;
use url::Url;

/// Fetches and parses robots.txt for the origin of `site`
///
/// # Returns
///
/// * `Some(ParsedRobots)` - robots.txt was served with a 2xx status
/// * `None` - robots.txt is missing or unreachable
pub async fn fetch_robots(client: &Client, site: &Url, options: &FetchOptions) -> Option<ParsedRobots> {
    let robots_url = site.join("/robots.txt").ok()?;
    let options = options.with_method(FetchMethod::Get);

    match fetch_page(client, robots_url.as_str(), &options).await {
        Ok(page) => Some(ParsedRobots::from_content(&page.body, site)),
        Err(failure) => {
            tracing::debug!("No robots.txt at {}: {}", robots_url, failure);
            None
        }
    }
}
