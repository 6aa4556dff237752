//! Report rendering.
//!
//! Text output prints one line per result (warnings and failures only in
//! quiet mode) followed by a summary block; JSON output serializes results,
//! summary, and the observed-ignore log in one envelope.

use colored::Colorize;
use serde::Serialize;

use linkvet_core::{CheckResult, IgnoredEntry, Status, Summary};

/// Everything a machine-readable report carries.
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    /// Per-link results, sorted by `(file, line, column)`.
    pub results: &'a [CheckResult],
    /// Aggregate counts.
    pub summary: &'a Summary,
    /// URLs skipped by ignore rules.
    pub ignored: &'a [IgnoredEntry],
}

/// Sorts results into the deterministic report order.
pub fn sort_results(results: &mut [CheckResult]) {
    results.sort_by(|a, b| {
        (&a.link.file_path, a.link.line, a.link.column).cmp(&(
            &b.link.file_path,
            b.link.line,
            b.link.column,
        ))
    });
}

/// Renders the JSON report envelope.
pub fn render_json(report: &Report<'_>) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

/// Renders the human-readable text report to stdout.
pub fn render_text(report: &Report<'_>, quiet: bool) {
    for result in report.results {
        if quiet && matches!(result.status, Status::Alive | Status::Duplicate) {
            continue;
        }
        println!("{}", format_result(result));
    }

    let summary = report.summary;
    println!();
    println!(
        "checked {} links ({} unique): {} alive, {} redirects, {} blocked, {} dead, {} errors, {} duplicates",
        summary.total,
        summary.unique_urls,
        summary.alive,
        summary.redirects,
        summary.blocked,
        summary.dead,
        summary.errors,
        summary.duplicates,
    );
    if !report.ignored.is_empty() {
        println!("ignored {} links by rule", report.ignored.len());
    }
}

fn format_result(result: &CheckResult) -> String {
    let label = status_label(result.status);
    let position = format!(
        "{}:{}:{}",
        result.link.file_path, result.link.line, result.link.column
    );
    let mut line = format!("{label:>12}  {position}  {}", result.link.url);
    match result.status {
        Status::Redirect => {
            if let Some(final_url) = &result.final_url {
                line.push_str(&format!(" -> {final_url}"));
            }
        }
        Status::Dead | Status::Blocked => {
            if let Some(code) = result.status_code {
                line.push_str(&format!(" ({code})"));
            }
        }
        Status::Error => {
            if let Some(message) = &result.error_message {
                line.push_str(&format!(" ({message})"));
            }
        }
        Status::Alive | Status::Duplicate => {}
    }
    line
}

fn status_label(status: Status) -> colored::ColoredString {
    let label = status.label();
    match status {
        Status::Alive => label.green(),
        Status::Redirect | Status::Blocked => label.yellow(),
        Status::Dead | Status::Error => label.red(),
        Status::Duplicate => label.dimmed(),
    }
}
