//! Console summary of a check
//!
//! Prints the headline numbers of a [`CheckResult`] followed by the broken
//! links grouped by category.

use crate::crawler::CheckResult;
use crate::output::categorize::categorize;

/// Maximum number of broken links listed per category
const MAX_LISTED_PER_CATEGORY: usize = 20;

/// Prints a check result to stdout in a formatted manner
pub fn print_summary(url: &str, result: &CheckResult) {
    print!("{}", format_summary(url, result));
}

/// Formats the console summary
pub fn format_summary(url: &str, result: &CheckResult) -> String {
    let mut out = String::new();

    out.push_str("=== Broken Link Check ===\n\n");

    out.push_str("Overview:\n");
    out.push_str(&format!("  URL: {}\n", url));
    out.push_str(&format!(
        "  Status: {}\n",
        if result.is_success() { "success" } else { "error" }
    ));
    out.push_str(&format!("  Pages checked: {}\n", result.checked_pages.len()));
    out.push_str(&format!("  Links checked: {}\n", result.total_links));
    out.push_str(&format!("  Broken links: {}\n", result.broken_link_count));
    out.push_str(&format!("  Duration: {}ms\n\n", result.duration));

    let report = categorize(&result.broken_links);
    if report.total > 0 {
        out.push_str("Broken Links by Category:\n");
        for (category, records) in &report.categories {
            let percentage = (records.len() as f64 / report.total as f64) * 100.0;
            out.push_str(&format!(
                "  {}: {} ({:.1}%)\n",
                category,
                records.len(),
                percentage
            ));
            for record in records.iter().take(MAX_LISTED_PER_CATEGORY) {
                out.push_str(&format!("    - {} ({})\n", record.url, record.reason));
                if !record.parent.is_empty() {
                    out.push_str(&format!("      on {}\n", record.parent));
                }
            }
            if records.len() > MAX_LISTED_PER_CATEGORY {
                out.push_str(&format!(
                    "    ... and {} more\n",
                    records.len() - MAX_LISTED_PER_CATEGORY
                ));
            }
        }
        out.push('\n');
    }

    if !result.errors.is_empty() {
        out.push_str(&format!("Page Errors ({}):\n", result.errors.len()));
        for error in &result.errors {
            out.push_str(&format!("  - {}\n", error));
        }
        out.push('\n');
    }

    out
}
