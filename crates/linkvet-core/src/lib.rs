//! # linkvet-core
//!
//! Core engine for linkvet: locate every absolute HTTP(S) URL referenced by
//! a corpus of textual documents (Markdown, JSON, YAML, TOML, XML), validate
//! each URL against its live origin, and summarize the outcome.
//!
//! ## Architecture
//!
//! The pipeline runs in three stages:
//!
//! 1. **Extraction**: an [`ExtractorRegistry`] dispatches files by extension
//!    to format-aware extractors that emit [`Link`]s with 1-indexed source
//!    positions, in source order per file.
//! 2. **Filtering**: an optional [`IgnoreFilter`] drops URLs by host, glob,
//!    or regex rule, logging every ignore for reporting.
//! 3. **Checking**: a [`Checker`] deduplicates URLs, probes each unique one
//!    exactly once over a bounded worker pool, and streams [`CheckResult`]s
//!    classified into the [`Status`] taxonomy.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use linkvet_core::{summarize, Checker, CheckerConfig, ExtractorRegistry};
//!
//! # async fn example() -> linkvet_core::Result<()> {
//! let registry = ExtractorRegistry::with_defaults();
//! let links = registry.extract_files(&["README.md".to_string()], false)?;
//!
//! let checker = Checker::new(CheckerConfig::default())?;
//! let results = checker.check_all(links).await?;
//!
//! let summary = summarize(&results);
//! println!("{} dead of {} checked", summary.dead, summary.total);
//! # Ok(())
//! # }
//! ```
//!
//! ## Failure semantics
//!
//! A single URL's failure is never fatal: transport errors become
//! `Error`-status results and the run continues. Malformed documents yield
//! an empty link list unless strict mode is on. Only resource exhaustion
//! and (in strict mode) parse errors propagate as [`Error`].

/// Concurrent URL checking with dedup and a retry/redirect state machine.
pub mod checker;
/// Error types and result aliases.
pub mod error;
/// Format-aware link extraction and the extractor registry.
pub mod extract;
/// URL ignore rules with an observed-ignore log.
pub mod filter;
/// Byte-offset to line/column mapping.
pub mod line_index;
/// URL recognition primitives.
pub mod recognize;
/// Core data types: links, statuses, results, summaries.
pub mod types;

pub use checker::{Checker, CheckerConfig};
pub use error::{Error, Result};
pub use extract::{
    Extractor, ExtractorRegistry, JsonExtractor, MarkdownExtractor, TomlExtractor, XmlExtractor,
    YamlExtractor,
};
pub use filter::{IgnoreFilter, IgnoredEntry, RuleKind};
pub use line_index::LineIndex;
pub use recognize::{is_http_url, scan_urls, trim_trailing};
pub use types::{summarize, CheckResult, Link, LinkKind, RedirectStep, Status, Summary};
