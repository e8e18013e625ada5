//! Configuration module for LinkScout
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use linkscout::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("linkscout.toml")).unwrap();
//! println!("Checks will time out after {}ms", config.checker.timeout_ms);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{CheckerConfig, Config, ServerConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};

// Re-export validators shared with request validation
pub use validation::{
    validate, validate_checker_config, validate_exclude_patterns, validate_max_pages,
    validate_max_retries, validate_timeout_ms, MAX_PAGES, MAX_RETRIES, MAX_TIMEOUT_MS,
};
