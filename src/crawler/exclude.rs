//! Exclude patterns for link checks
//!
//! Patterns are regular expressions matched anywhere in the link URL, so a
//! plain substring such as `google-analytics.com` works as expected.

use crate::LinkScoutError;
use regex::RegexSet;

/// Matches link URLs against the configured exclude patterns
#[derive(Debug, Clone, Default)]
pub struct ExcludeMatcher {
    set: Option<RegexSet>,
}

impl ExcludeMatcher {
    /// Compiles `patterns`; an empty list excludes nothing
    pub fn new(patterns: &[String]) -> Result<Self, LinkScoutError> {
        if patterns.is_empty() {
            return Ok(Self::default());
        }

        if patterns.iter().any(|p| p.is_empty()) {
            return Err(LinkScoutError::InvalidInput(
                "exclude pattern cannot be empty".to_string(),
            ));
        }

        let set = RegexSet::new(patterns).map_err(|e| {
            LinkScoutError::InvalidInput(format!("invalid exclude pattern: {}", e))
        })?;

        Ok(Self { set: Some(set) })
    }

    /// Returns true if `url` matches any pattern
    pub fn is_excluded(&self, url: &str) -> bool {
        self.set.as_ref().is_some_and(|set| set.is_match(url))
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_none()
    }
}
