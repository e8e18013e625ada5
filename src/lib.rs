//! LinkScout: broken-link discovery for website audits
//!
//! This crate assembles the set of pages belonging to a site (sitemaps,
//! homepage navigation, common paths), extracts every outbound link from
//! those pages and probes each one for liveness, producing a categorized
//! broken-link report. It is exposed as a library, a CLI and a small HTTP API.

pub mod config;
pub mod crawler;
pub mod output;
pub mod robots;
pub mod server;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for LinkScout operations
///
/// Failures of individual links or pages are not errors: they are recorded
/// in the [`crawler::CheckResult`]. This type covers problems that prevent a
/// check from starting at all.
#[derive(Debug, Error)]
pub enum LinkScoutError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::CheckPhase,
        to: state::CheckPhase,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Server error: {0}")]
    Server(String),
}

impl LinkScoutError {
    /// Returns true if the error was caused by caller-supplied input
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_) | Self::Url(_))
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid exclude pattern: {0}")]
    InvalidPattern(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for LinkScout operations
pub type Result<T> = std::result::Result<T, LinkScoutError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{BrokenLinkRecord, CheckOptions, CheckResult, CheckStatus, LinkChecker};
pub use output::{categorize, Category, CategorizedReport};
pub use state::CheckPhase;
