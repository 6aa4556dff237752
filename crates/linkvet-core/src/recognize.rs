//! URL recognition primitives shared by the extractors and the checker.
//!
//! Three operations: the canonical HTTP(S) predicate, a scan regex for
//! digging URLs out of free text, and the trailing-punctuation trim applied
//! to every scanned match.

use once_cell::sync::Lazy;
use regex::Regex;

/// Characters stripped from the end of scanned URLs.
///
/// Prose and structured text habitually end a URL with sentence or bracket
/// punctuation that is not part of the target.
const TRAILING_PUNCTUATION: [char; 9] = ['.', ',', ';', ':', ')', ']', '}', '"', '\''];

#[allow(clippy::expect_used)]
static URL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"https?://[^\s)\]>"'<]+"#).expect("hardcoded URL pattern compiles"));

/// True iff `s` starts with `http://` or `https://`.
///
/// The scheme check is case-sensitive on purpose: a malformed `HTTP://...`
/// in a source document is rejected here rather than probed and reported
/// against a URL that never appears verbatim in the file.
#[must_use]
pub fn is_http_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

/// Scans free text for HTTP(S) URLs, yielding `(byte_offset, url)` matches.
///
/// Matches are returned untrimmed; callers apply [`trim_trailing`].
pub fn scan_urls(s: &str) -> impl Iterator<Item = (usize, &str)> {
    URL_PATTERN.find_iter(s).map(|m| (m.start(), m.as_str()))
}

/// Strips a run of trailing punctuation from a scanned URL.
///
/// Idempotent: trimming a trimmed URL is a no-op.
#[must_use]
pub fn trim_trailing(url: &str) -> &str {
    url.trim_end_matches(TRAILING_PUNCTUATION)
}

/// Fast pre-check before running the scan regex over a string.
///
/// A string without the `http` substring cannot contain a match.
#[must_use]
pub fn may_contain_url(s: &str) -> bool {
    memchr::memmem::find(s.as_bytes(), b"http").is_some()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_is_http_url_accepts_both_schemes() {
        assert!(is_http_url("http://example.com"));
        assert!(is_http_url("https://example.com/path?q=1"));
    }

    #[test]
    fn test_is_http_url_rejects_other_schemes() {
        assert!(!is_http_url("ftp://example.com"));
        assert!(!is_http_url("mailto:user@example.com"));
        assert!(!is_http_url("//example.com"));
        assert!(!is_http_url(""));
    }

    #[test]
    fn test_is_http_url_is_case_sensitive() {
        assert!(!is_http_url("HTTP://example.com"));
        assert!(!is_http_url("Https://example.com"));
    }

    #[test]
    fn test_scan_finds_multiple_urls() {
        let text = "see http://a.test/x and also https://b.test/y.";
        let found: Vec<_> = scan_urls(text).collect();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0], (4, "http://a.test/x"));
        assert_eq!(found[1].1, "https://b.test/y.");
    }

    #[test]
    fn test_scan_stops_at_delimiters() {
        let text = r#"(http://a.test/x) <https://b.test> "http://c.test""#;
        let found: Vec<_> = scan_urls(text).map(|(_, u)| u).collect();
        assert_eq!(found, vec!["http://a.test/x", "https://b.test", "http://c.test"]);
    }

    #[test]
    fn test_trim_trailing_strips_runs() {
        assert_eq!(trim_trailing("http://a.test/x.,;"), "http://a.test/x");
        assert_eq!(trim_trailing("http://a.test/x)]"), "http://a.test/x");
        assert_eq!(trim_trailing("http://a.test/x"), "http://a.test/x");
    }

    #[test]
    fn test_trim_preserves_interior_punctuation() {
        assert_eq!(
            trim_trailing("http://a.test/x.html?q=1,2"),
            "http://a.test/x.html?q=1,2"
        );
    }

    #[test]
    fn test_may_contain_url_prefilter() {
        assert!(may_contain_url("something http later"));
        assert!(!may_contain_url("no links here"));
    }

    proptest! {
        #[test]
        fn prop_trim_trailing_is_idempotent(s in "[a-z:/.,;)\\]}\"']{0,40}") {
            let once = trim_trailing(&s);
            prop_assert_eq!(trim_trailing(once), once);
        }

        #[test]
        fn prop_scanned_urls_satisfy_predicate(s in ".{0,80}") {
            for (_, url) in scan_urls(&s) {
                prop_assert!(is_http_url(url));
            }
        }
    }
}
