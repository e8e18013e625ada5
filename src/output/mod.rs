//! Output module for check reports
//!
//! This module handles:
//! - Categorizing broken links by failure class
//! - Generating markdown reports of check results
//! - Printing console summaries

mod categorize;
mod markdown;
mod summary;

pub use categorize::{categorize, categorize_record, CategorizedReport, Category, CATEGORY_RULES};
pub use markdown::{format_markdown_report, write_markdown_report};
pub use summary::{format_summary, print_summary};
