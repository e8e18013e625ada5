//! Markdown report generation
//!
//! This module generates human-readable markdown reports of check results,
//! including a summary table, broken links grouped by category and page
//! errors.

use crate::crawler::{CheckResult, CheckType};
use crate::output::categorize::categorize;
use crate::LinkScoutError;
use chrono::{DateTime, Utc};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes a markdown report of `result` to `output_path`
pub fn write_markdown_report(
    url: &str,
    check_type: CheckType,
    result: &CheckResult,
    output_path: &Path,
) -> Result<(), LinkScoutError> {
    let markdown = format_markdown_report(url, check_type, result, Utc::now());

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    tracing::info!("Wrote report to {}", output_path.display());
    Ok(())
}

/// Formats a check result as markdown
pub fn format_markdown_report(
    url: &str,
    check_type: CheckType,
    result: &CheckResult,
    generated_at: DateTime<Utc>,
) -> String {
    let mut md = String::new();

    md.push_str("# Broken Link Report\n\n");

    md.push_str("## Check Information\n\n");
    md.push_str(&format!("- **URL**: {}\n", url));
    md.push_str(&format!("- **Check Type**: {}\n", check_type.as_str()));
    md.push_str(&format!("- **Status**: {}\n", status_label(result)));
    md.push_str(&format!(
        "- **Generated**: {}\n",
        generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    md.push_str(&format!(
        "- **Duration**: {}ms ({:.2} seconds)\n\n",
        result.duration,
        result.duration as f64 / 1000.0
    ));

    md.push_str("## Summary\n\n");
    md.push_str("| Metric | Value |\n");
    md.push_str("|--------|-------|\n");
    md.push_str(&format!("| Pages Checked | {} |\n", result.checked_pages.len()));
    md.push_str(&format!("| Links Checked | {} |\n", result.total_links));
    md.push_str(&format!("| Broken Links | {} |\n", result.broken_link_count));
    md.push_str(&format!("| Page Errors | {} |\n\n", result.errors.len()));

    let report = categorize(&result.broken_links);
    if report.total > 0 {
        md.push_str("## Broken Links by Category\n\n");
        md.push_str("| Category | Count |\n");
        md.push_str("|----------|-------|\n");
        for (category, count) in report.counts.iter().filter(|(_, count)| **count > 0) {
            md.push_str(&format!("| {} | {} |\n", category, count));
        }
        md.push('\n');

        for (category, records) in &report.categories {
            md.push_str(&format!("### {} ({})\n\n", category, records.len()));
            md.push_str("| URL | Status | Found On | Link Text |\n");
            md.push_str("|-----|--------|----------|-----------|\n");
            for record in records {
                let status = match record.status_code {
                    Some(code) => format!("{} {}", code, record.status_text),
                    None => record.reason.clone(),
                };
                md.push_str(&format!(
                    "| {} | {} | {} | {} |\n",
                    escape_cell(&record.url),
                    escape_cell(&status),
                    escape_cell(&record.parent),
                    escape_cell(&record.link_text)
                ));
            }
            md.push('\n');
        }
    } else if result.is_success() {
        md.push_str("No broken links found.\n\n");
    }

    if !result.checked_pages.is_empty() {
        md.push_str("## Pages Checked\n\n");
        for page in &result.checked_pages {
            md.push_str(&format!("- {}\n", page));
        }
        md.push('\n');
    }

    if !result.errors.is_empty() {
        md.push_str("## Page Errors\n\n");
        for error in &result.errors {
            md.push_str(&format!("- {}\n", error));
        }
        md.push('\n');
    }

    md
}

fn status_label(result: &CheckResult) -> &'static str {
    if result.is_success() {
        "success"
    } else {
        "error"
    }
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}
