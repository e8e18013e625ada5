use serde::{Deserialize, Serialize};

/// Main configuration structure for LinkScout
///
/// Every section is optional; missing sections and keys take the defaults
/// below.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub checker: CheckerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
}

/// HTTP API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the API listens on (host:port)
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
        }
    }
}

/// Default behavior of link checks
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CheckerConfig {
    /// Per-request timeout (milliseconds)
    pub timeout_ms: u64,

    /// Retries after a network-level failure
    pub max_retries: u32,

    /// Maximum number of pages visited by a site check
    pub max_pages: usize,

    /// Maximum number of link checks in flight for one page
    pub link_concurrency: usize,

    /// Maximum number of pages checked at once during a site check
    pub page_concurrency: usize,

    /// Base delay between retries, doubled per attempt (milliseconds)
    pub retry_backoff_ms: u64,

    /// Also check `<img src>` references
    pub check_images: bool,

    /// Regular expressions; matching link URLs are skipped
    pub exclude_patterns: Vec<String>,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            max_retries: 2,
            max_pages: 10,
            link_concurrency: 10,
            page_concurrency: 2,
            retry_backoff_ms: 250,
            check_images: false,
            exclude_patterns: Vec::new(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct UserAgentConfig {
    /// Name of the checker
    pub crawler_name: String,

    /// Version of the checker
    pub crawler_version: String,

    /// URL with information about the checker
    pub contact_url: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "LinkScout".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://example.com/linkscout".to_string(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the user agent header value
    ///
    /// Format: `CrawlerName/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{})",
            self.crawler_name, self.crawler_version, self.contact_url
        )
    }
}
