//! URL ignore rules.
//!
//! Sits between extraction and checking: each extracted link is offered to
//! [`IgnoreFilter::should_ignore`], and matches are skipped by the pipeline
//! and recorded in an append-only log for reporting. Rules are matched
//! fastest first: exact host, then glob over the whole URL, then regex over
//! the whole URL. First match wins.

use globset::{Glob, GlobSet, GlobSetBuilder};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use url::Url;

use crate::{Error, Result};

/// Which rule class matched a URL.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    /// Case-insensitive host match, including subdomains.
    Host,
    /// Glob over the whole URL.
    Glob,
    /// Regex over the whole URL.
    Regex,
}

/// One observed ignore, kept for reporting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IgnoredEntry {
    /// The ignored URL.
    pub url: String,
    /// File the URL was extracted from.
    pub file: String,
    /// 1-indexed line of the occurrence.
    pub line: usize,
    /// Which rule class matched.
    pub kind: RuleKind,
    /// The rule text that matched.
    pub rule: String,
}

/// Host, glob, and regex ignore rules with an observed-ignore log.
///
/// An empty filter is a no-op: `should_ignore` returns `false` without
/// taking the log lock.
pub struct IgnoreFilter {
    hosts: Vec<String>,
    glob_patterns: Vec<String>,
    globs: Option<GlobSet>,
    regexes: Vec<Regex>,
    log: Mutex<Vec<IgnoredEntry>>,
}

impl IgnoreFilter {
    /// An empty, match-nothing filter.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            hosts: Vec::new(),
            glob_patterns: Vec::new(),
            globs: None,
            regexes: Vec::new(),
            log: Mutex::new(Vec::new()),
        }
    }

    /// Compiles a filter from rule lists.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRule`] for a glob or regex that fails to
    /// compile.
    pub fn new(hosts: &[String], globs: &[String], regexes: &[String]) -> Result<Self> {
        let compiled_globs = if globs.is_empty() {
            None
        } else {
            let mut builder = GlobSetBuilder::new();
            for pattern in globs {
                let glob = Glob::new(pattern).map_err(|e| Error::InvalidRule {
                    rule: pattern.clone(),
                    reason: e.to_string(),
                })?;
                builder.add(glob);
            }
            Some(builder.build().map_err(|e| Error::InvalidRule {
                rule: globs.join(","),
                reason: e.to_string(),
            })?)
        };

        let compiled_regexes = regexes
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| Error::InvalidRule {
                    rule: pattern.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            hosts: hosts.iter().map(|h| h.to_lowercase()).collect(),
            glob_patterns: globs.to_vec(),
            globs: compiled_globs,
            regexes: compiled_regexes,
            log: Mutex::new(Vec::new()),
        })
    }

    /// True when no rules are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty() && self.globs.is_none() && self.regexes.is_empty()
    }

    /// Decides whether `url` should be skipped, logging the match.
    pub fn should_ignore(&self, url: &str, file: &str, line: usize) -> bool {
        if self.is_empty() {
            return false;
        }
        let Some((kind, rule)) = self.match_rule(url) else {
            return false;
        };
        if let Ok(mut log) = self.log.lock() {
            log.push(IgnoredEntry {
                url: url.to_string(),
                file: file.to_string(),
                line,
                kind,
                rule,
            });
        }
        true
    }

    fn match_rule(&self, url: &str) -> Option<(RuleKind, String)> {
        if !self.hosts.is_empty() {
            if let Some(host) = Url::parse(url).ok().and_then(|u| u.host_str().map(str::to_lowercase)) {
                for rule in &self.hosts {
                    if host == *rule || host.ends_with(&format!(".{rule}")) {
                        return Some((RuleKind::Host, rule.clone()));
                    }
                }
            }
        }
        if let Some(globs) = &self.globs {
            let matched = globs.matches(url);
            if let Some(&first) = matched.first() {
                return Some((RuleKind::Glob, self.glob_patterns[first].clone()));
            }
        }
        for regex in &self.regexes {
            if regex.is_match(url) {
                return Some((RuleKind::Regex, regex.as_str().to_string()));
            }
        }
        None
    }

    /// Number of ignores observed so far.
    #[must_use]
    pub fn ignored_count(&self) -> usize {
        self.log.lock().map_or(0, |log| log.len())
    }

    /// Snapshot of the observed-ignore log.
    #[must_use]
    pub fn ignored_entries(&self) -> Vec<IgnoredEntry> {
        self.log.lock().map_or_else(|_| Vec::new(), |log| log.clone())
    }

    /// Clears the observed-ignore log.
    pub fn reset(&self) {
        if let Ok(mut log) = self.log.lock() {
            log.clear();
        }
    }
}

impl Default for IgnoreFilter {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_empty_filter_is_noop() {
        let filter = IgnoreFilter::empty();
        assert!(filter.is_empty());
        assert!(!filter.should_ignore("https://example.com/", "a.md", 1));
        assert_eq!(filter.ignored_count(), 0);
    }

    #[test]
    fn test_host_rule_matches_host_and_subdomains() {
        let filter = IgnoreFilter::new(&strings(&["Example.com"]), &[], &[]).unwrap();
        assert!(filter.should_ignore("https://example.com/x", "a.md", 1));
        assert!(filter.should_ignore("https://docs.EXAMPLE.com/y", "a.md", 2));
        assert!(!filter.should_ignore("https://notexample.com/z", "a.md", 3));
        assert_eq!(filter.ignored_count(), 2);
    }

    #[test]
    fn test_glob_rule_over_whole_url() {
        let filter =
            IgnoreFilter::new(&[], &strings(&["https://example.com/drafts/*"]), &[]).unwrap();
        assert!(filter.should_ignore("https://example.com/drafts/wip", "a.md", 1));
        assert!(!filter.should_ignore("https://example.com/published", "a.md", 2));
    }

    #[test]
    fn test_regex_rule_over_whole_url() {
        let filter = IgnoreFilter::new(&[], &[], &strings(&[r"/v\d+/internal"])).unwrap();
        assert!(filter.should_ignore("https://api.test/v2/internal/x", "a.md", 1));
        assert!(!filter.should_ignore("https://api.test/public", "a.md", 2));
    }

    #[test]
    fn test_host_wins_over_glob_and_regex() {
        let filter = IgnoreFilter::new(
            &strings(&["example.com"]),
            &strings(&["https://example.com/*"]),
            &strings(&["example"]),
        )
        .unwrap();
        assert!(filter.should_ignore("https://example.com/x", "a.md", 1));
        let entries = filter.ignored_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, RuleKind::Host);
    }

    #[test]
    fn test_log_records_position_and_rule() {
        let filter = IgnoreFilter::new(&strings(&["skip.test"]), &[], &[]).unwrap();
        filter.should_ignore("http://skip.test/a", "docs/b.md", 17);
        let entries = filter.ignored_entries();
        assert_eq!(entries[0].file, "docs/b.md");
        assert_eq!(entries[0].line, 17);
        assert_eq!(entries[0].rule, "skip.test");
    }

    #[test]
    fn test_reset_clears_log() {
        let filter = IgnoreFilter::new(&strings(&["skip.test"]), &[], &[]).unwrap();
        filter.should_ignore("http://skip.test/a", "a.md", 1);
        assert_eq!(filter.ignored_count(), 1);
        filter.reset();
        assert_eq!(filter.ignored_count(), 0);
    }

    #[test]
    fn test_invalid_rules_rejected() {
        assert!(IgnoreFilter::new(&[], &[], &strings(&["("])).is_err());
        assert!(IgnoreFilter::new(&[], &strings(&["a{"]), &[]).is_err());
    }
}
