use crate::config::types::{CheckerConfig, Config, ServerConfig, UserAgentConfig};
use crate::ConfigError;
use regex::Regex;
use std::net::SocketAddr;
use url::Url;

/// Largest accepted per-request timeout (milliseconds)
pub const MAX_TIMEOUT_MS: u64 = 120_000;

/// Largest accepted retry count
pub const MAX_RETRIES: u32 = 10;

/// Largest accepted page limit for site checks
pub const MAX_PAGES: usize = 500;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_server_config(&config.server)?;
    validate_checker_config(&config.checker)?;
    validate_user_agent_config(&config.user_agent)?;
    Ok(())
}

fn validate_server_config(config: &ServerConfig) -> Result<(), ConfigError> {
    config.bind.parse::<SocketAddr>().map_err(|e| {
        ConfigError::Validation(format!("bind must be host:port, got '{}': {}", config.bind, e))
    })?;
    Ok(())
}

/// Validates checker configuration
pub fn validate_checker_config(config: &CheckerConfig) -> Result<(), ConfigError> {
    validate_timeout_ms(config.timeout_ms)?;
    validate_max_retries(config.max_retries)?;
    validate_max_pages(config.max_pages)?;

    if config.link_concurrency < 1 || config.link_concurrency > 100 {
        return Err(ConfigError::Validation(format!(
            "link_concurrency must be between 1 and 100, got {}",
            config.link_concurrency
        )));
    }

    if config.page_concurrency < 1 || config.page_concurrency > 20 {
        return Err(ConfigError::Validation(format!(
            "page_concurrency must be between 1 and 20, got {}",
            config.page_concurrency
        )));
    }

    if config.retry_backoff_ms > 10_000 {
        return Err(ConfigError::Validation(format!(
            "retry_backoff_ms must be <= 10000ms, got {}ms",
            config.retry_backoff_ms
        )));
    }

    validate_exclude_patterns(&config.exclude_patterns)?;

    Ok(())
}

/// Validates a per-request timeout
pub fn validate_timeout_ms(timeout_ms: u64) -> Result<(), ConfigError> {
    if timeout_ms == 0 || timeout_ms > MAX_TIMEOUT_MS {
        return Err(ConfigError::Validation(format!(
            "timeout must be between 1 and {}ms, got {}ms",
            MAX_TIMEOUT_MS, timeout_ms
        )));
    }
    Ok(())
}

/// Validates a retry count
pub fn validate_max_retries(max_retries: u32) -> Result<(), ConfigError> {
    if max_retries > MAX_RETRIES {
        return Err(ConfigError::Validation(format!(
            "max_retries must be <= {}, got {}",
            MAX_RETRIES, max_retries
        )));
    }
    Ok(())
}

/// Validates a page limit
pub fn validate_max_pages(max_pages: usize) -> Result<(), ConfigError> {
    if max_pages < 1 || max_pages > MAX_PAGES {
        return Err(ConfigError::Validation(format!(
            "max_pages must be between 1 and {}, got {}",
            MAX_PAGES, max_pages
        )));
    }
    Ok(())
}

/// Validates that every exclude pattern is a valid regular expression
pub fn validate_exclude_patterns(patterns: &[String]) -> Result<(), ConfigError> {
    for pattern in patterns {
        if pattern.is_empty() {
            return Err(ConfigError::InvalidPattern(
                "exclude pattern cannot be empty".to_string(),
            ));
        }
        Regex::new(pattern)
            .map_err(|e| ConfigError::InvalidPattern(format!("'{}': {}", pattern, e)))?;
    }
    Ok(())
}

fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    if config.crawler_version.trim().is_empty() {
        return Err(ConfigError::Validation(
            "crawler_version cannot be empty".to_string(),
        ));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    Ok(())
}
