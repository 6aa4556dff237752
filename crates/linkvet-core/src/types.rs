//! Core data structures for link extraction and validation.
//!
//! This module defines the value types that flow through the pipeline:
//! extracted [`Link`]s, per-URL [`CheckResult`]s with their [`Status`]
//! taxonomy, and the aggregate [`Summary`].
//!
//! ## Stability
//!
//! The field meanings of [`Link`] (1-indexed line/column, trimmed URL) and
//! the status labels are the schema downstream reporters depend on. Nothing
//! here mutates after emission: an extractor creates a `Link`, the checker
//! consumes it once and preserves it inside a `CheckResult`.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// How a URL occurrence was expressed in its source document.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    /// Markdown inline link: `[text](url)`.
    Inline,
    /// Markdown reference link whose definition lives on another line.
    Reference,
    /// Markdown image: `![alt](url)`.
    Image,
    /// Bare or angle-bracketed URL autolinked in text.
    Autolink,
    /// Raw `<a href="...">` tag embedded in markdown.
    HtmlAnchor,
    /// String value (or key) inside a structured document (JSON/YAML/TOML/XML).
    StructuredValue,
}

/// An extracted URL occurrence in a document, with position and text metadata.
///
/// Invariants upheld by the extractors:
/// - `url` starts with `http://` or `https://` (lowercase scheme) and has
///   been trimmed of trailing punctuation
/// - `line` and `column` are 1-indexed
/// - `ref_name` and `ref_def_line` are populated exactly when
///   `kind == LinkKind::Reference`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Link {
    /// Absolute HTTP(S) URL, post-trimmed of trailing punctuation.
    pub url: String,
    /// Origin file identifier.
    pub file_path: String,
    /// 1-indexed line of the URL occurrence.
    pub line: usize,
    /// 1-indexed column of the URL occurrence.
    pub column: usize,
    /// Human-visible link text or alt-text. May be empty.
    #[serde(default)]
    pub text: String,
    /// How the URL was expressed in source.
    pub kind: LinkKind,
    /// Reference name for `kind == Reference` links.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_name: Option<String>,
    /// Line of the `[name]: url` definition for `kind == Reference` links.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_def_line: Option<usize>,
}

impl Link {
    /// Creates a link with no reference metadata.
    #[must_use]
    pub fn new(
        url: impl Into<String>,
        file_path: impl Into<String>,
        line: usize,
        column: usize,
        text: impl Into<String>,
        kind: LinkKind,
    ) -> Self {
        Self {
            url: url.into(),
            file_path: file_path.into(),
            line,
            column,
            text: text.into(),
            kind,
            ref_name: None,
            ref_def_line: None,
        }
    }

    /// Promotes this link to a reference link.
    #[must_use]
    pub fn into_reference(mut self, ref_name: impl Into<String>, ref_def_line: usize) -> Self {
        self.kind = LinkKind::Reference;
        self.ref_name = Some(ref_name.into());
        self.ref_def_line = Some(ref_def_line);
        self
    }
}

/// Outcome classification for a checked URL.
///
/// The labels are stable strings consumed by reporters; see [`Status::label`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Final response 2xx with no redirect hops.
    Alive,
    /// One or more redirect hops ending in 2xx. Warning, not failure.
    Redirect,
    /// Final 403. Bot detection is not a dead link, so this is a warning.
    Blocked,
    /// Final 4xx (except 403) or 5xx, or a redirect chain ending there.
    Dead,
    /// Transport failure: DNS, connect, TLS, read, timeout, redirect loop.
    Error,
    /// URL already checked in this run; see [`CheckResult::duplicate_of`].
    Duplicate,
}

impl Status {
    /// Stable display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Alive => "Alive",
            Self::Redirect => "Redirect",
            Self::Blocked => "Blocked",
            Self::Dead => "Dead",
            Self::Error => "Error",
            Self::Duplicate => "Duplicate",
        }
    }

    /// One-line description used by reporters.
    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            Self::Alive => "URL responded with a success status",
            Self::Redirect => "URL redirects before responding successfully",
            Self::Blocked => "origin refused the probe (403), likely bot detection",
            Self::Dead => "URL responded with a failure status",
            Self::Error => "URL could not be reached",
            Self::Duplicate => "URL already checked elsewhere in this run",
        }
    }

    /// Reportable but not exit-failing.
    #[must_use]
    pub const fn is_warning(self) -> bool {
        matches!(self, Self::Redirect | Self::Blocked)
    }

    /// Counts toward a failing run.
    #[must_use]
    pub const fn is_failure(self) -> bool {
        matches!(self, Self::Dead | Self::Error)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One hop of a redirect chain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RedirectStep {
    /// The URL that responded with a redirect.
    pub url: String,
    /// Its redirect status code (301, 302, 307, or 308).
    pub status_code: u16,
}

/// The outcome of checking one [`Link`] (or its duplicate).
///
/// `final_url` and `final_status` are set only when `redirect_chain` is
/// non-empty. `duplicate_of` is a shared handle to the canonical result and
/// is populated exactly when `status == Status::Duplicate`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckResult {
    /// The link this result describes.
    pub link: Link,
    /// Outcome classification.
    pub status: Status,
    /// Status code of the final HTTP response, when one was received.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    /// Concise transport failure description for `status == Error`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Redirect hops followed, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub redirect_chain: Vec<RedirectStep>,
    /// Last `Location` target that was followed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_url: Option<String>,
    /// Status code of the terminal response behind the chain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_status: Option<u16>,
    /// Back-reference to the canonical result for duplicates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duplicate_of: Option<Arc<CheckResult>>,
}

impl CheckResult {
    /// Creates a `Duplicate` result pointing at its canonical counterpart.
    #[must_use]
    pub fn duplicate(link: Link, canonical: Arc<CheckResult>) -> Self {
        Self {
            link,
            status: Status::Duplicate,
            status_code: canonical.status_code,
            error_message: None,
            redirect_chain: Vec::new(),
            final_url: None,
            final_status: None,
            duplicate_of: Some(canonical),
        }
    }

    /// Status of the canonical record for duplicates, own status otherwise.
    #[must_use]
    pub fn effective_status(&self) -> Status {
        self.duplicate_of
            .as_deref()
            .map_or(self.status, |canonical| canonical.status)
    }
}

/// Aggregate counts over a set of results.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Summary {
    /// Results with status `Alive`.
    pub alive: usize,
    /// Results with status `Redirect`.
    pub redirects: usize,
    /// Results with status `Blocked`.
    pub blocked: usize,
    /// Results with status `Dead`.
    pub dead: usize,
    /// Results with status `Error`.
    pub errors: usize,
    /// Results with status `Duplicate`.
    pub duplicates: usize,
    /// Total results.
    pub total: usize,
    /// Distinct URLs actually requested (`total - duplicates`).
    pub unique_urls: usize,
    /// Redirects plus blocked.
    pub warnings_count: usize,
    /// True when any result is `Dead` or `Error`.
    pub has_dead_links: bool,
}

impl Summary {
    /// Whether the run should be considered failing.
    ///
    /// `Blocked` results count as failures only when `fail_on_blocked` is
    /// set; by default 403 responses are warnings.
    #[must_use]
    pub const fn is_failure(&self, fail_on_blocked: bool) -> bool {
        self.has_dead_links || (fail_on_blocked && self.blocked > 0)
    }
}

/// Produces counts by status in one pass over `results`.
#[must_use]
pub fn summarize(results: &[CheckResult]) -> Summary {
    let mut summary = Summary::default();
    for result in results {
        match result.status {
            Status::Alive => summary.alive += 1,
            Status::Redirect => summary.redirects += 1,
            Status::Blocked => summary.blocked += 1,
            Status::Dead => summary.dead += 1,
            Status::Error => summary.errors += 1,
            Status::Duplicate => summary.duplicates += 1,
        }
    }
    summary.total = results.len();
    summary.unique_urls = summary.total - summary.duplicates;
    summary.warnings_count = summary.redirects + summary.blocked;
    summary.has_dead_links = summary.dead > 0 || summary.errors > 0;
    summary
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn link(url: &str) -> Link {
        Link::new(url, "a.md", 1, 1, "", LinkKind::Inline)
    }

    fn result(url: &str, status: Status) -> CheckResult {
        CheckResult {
            link: link(url),
            status,
            status_code: None,
            error_message: None,
            redirect_chain: Vec::new(),
            final_url: None,
            final_status: None,
            duplicate_of: None,
        }
    }

    #[test]
    fn test_status_labels_are_stable() {
        assert_eq!(Status::Alive.label(), "Alive");
        assert_eq!(Status::Redirect.label(), "Redirect");
        assert_eq!(Status::Blocked.label(), "Blocked");
        assert_eq!(Status::Dead.label(), "Dead");
        assert_eq!(Status::Error.label(), "Error");
        assert_eq!(Status::Duplicate.label(), "Duplicate");
    }

    #[test]
    fn test_warning_and_failure_partition() {
        assert!(Status::Redirect.is_warning());
        assert!(Status::Blocked.is_warning());
        assert!(!Status::Redirect.is_failure());
        assert!(Status::Dead.is_failure());
        assert!(Status::Error.is_failure());
        assert!(!Status::Alive.is_failure());
        assert!(!Status::Duplicate.is_failure());
    }

    #[test]
    fn test_reference_promotion() {
        let promoted = link("http://x.test/").into_reference("docs", 42);
        assert_eq!(promoted.kind, LinkKind::Reference);
        assert_eq!(promoted.ref_name.as_deref(), Some("docs"));
        assert_eq!(promoted.ref_def_line, Some(42));
    }

    #[test]
    fn test_duplicate_back_reference() {
        let canonical = Arc::new(result("http://x.test/", Status::Alive));
        let dup = CheckResult::duplicate(link("http://x.test/"), Arc::clone(&canonical));
        assert_eq!(dup.status, Status::Duplicate);
        assert_eq!(dup.effective_status(), Status::Alive);
        assert_eq!(
            dup.duplicate_of.as_deref().map(|c| c.status),
            Some(Status::Alive)
        );
    }

    #[test]
    fn test_summarize_counts() {
        let results = vec![
            result("http://a.test/", Status::Alive),
            result("http://b.test/", Status::Redirect),
            result("http://c.test/", Status::Blocked),
            result("http://d.test/", Status::Dead),
            result("http://e.test/", Status::Error),
            result("http://a.test/", Status::Duplicate),
        ];
        let summary = summarize(&results);
        assert_eq!(summary.total, 6);
        assert_eq!(summary.unique_urls, 5);
        assert_eq!(summary.warnings_count, 2);
        assert!(summary.has_dead_links);
        assert_eq!(summary.duplicates, 1);
    }

    #[test]
    fn test_summary_failure_policy() {
        let warnings_only = summarize(&[result("http://a.test/", Status::Blocked)]);
        assert!(!warnings_only.is_failure(false));
        assert!(warnings_only.is_failure(true));

        let clean = summarize(&[result("http://a.test/", Status::Alive)]);
        assert!(!clean.is_failure(true));
    }

    #[test]
    fn test_result_serialization_round_trip() {
        let canonical = Arc::new(result("http://x.test/", Status::Alive));
        let dup = CheckResult::duplicate(link("http://x.test/"), canonical);
        let json = serde_json::to_string(&dup).unwrap();
        let back: CheckResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.status, Status::Duplicate);
        assert_eq!(back.effective_status(), Status::Alive);
    }
}
