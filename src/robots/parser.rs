//! Robots.txt parser implementation
//!
//! This module collects `Sitemap:` directives using the robotstxt crate's
//! parse handler, which tolerates the same malformed input search engines do.

use robotstxt::{parse_robotstxt, RobotsParseHandler};
use url::Url;

/// Parsed robots.txt data
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedRobots {
    /// Sitemap URLs in file order, resolved against the robots.txt origin
    sitemaps: Vec<String>,
}

impl ParsedRobots {
    /// Parses raw robots.txt content
    ///
    /// Relative sitemap references are resolved against `origin`; values that
    /// cannot be resolved to an http(s) URL are dropped.
    pub fn from_content(content: &str, origin: &Url) -> Self {
        let mut collector = SitemapCollector::default();
        parse_robotstxt(content, &mut collector);

        let mut sitemaps: Vec<String> = Vec::new();
        for value in collector.values {
            let Ok(url) = origin.join(&value) else {
                tracing::debug!("Ignoring unparsable sitemap directive: {}", value);
                continue;
            };
            if !matches!(url.scheme(), "http" | "https") {
                continue;
            }
            let url = url.to_string();
            if !sitemaps.contains(&url) {
                sitemaps.push(url);
            }
        }

        Self { sitemaps }
    }

    /// Returns the sitemap URLs listed in the file
    pub fn sitemaps(&self) -> &[String] {
        &self.sitemaps
    }
}

#[derive(Default)]
struct SitemapCollector {
    values: Vec<String>,
}

impl RobotsParseHandler for SitemapCollector {
    fn handle_robots_start(&mut self) {}

    fn handle_robots_end(&mut self) {}

    fn handle_user_agent(&mut self, _line_num: u32, _user_agent: &str) {}

    fn handle_allow(&mut self, _line_num: u32, _value: &str) {}

    fn handle_disallow(&mut self, _line_num: u32, _value: &str) {}

    fn handle_sitemap(&mut self, _line_num: u32, value: &str) {
        let value = value.trim();
        if !value.is_empty() {
            self.values.push(value.to_string());
        }
    }

    fn handle_unknown_action(&mut self, _line_num: u32, _action: &str, _value: &str) {}
}
