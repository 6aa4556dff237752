//! Format-aware link extraction.
//!
//! Each supported document format implements [`Extractor`]: one pass that
//! both validates syntax and emits [`Link`]s in source order. Malformed
//! content yields an empty list unless `strict` is set, in which case the
//! parse error propagates with the offending path.
//!
//! The [`registry`] module dispatches extractors by file extension and fans
//! extraction out across worker threads for larger file sets.

/// JSON tree walker.
pub mod json;
/// Markdown AST walker with HTML anchor and reference link handling.
pub mod markdown;
/// Extension dispatch and parallel multi-file extraction.
pub mod registry;
/// TOML tree walker.
pub mod toml;
/// XML event-stream walker.
pub mod xml;
/// YAML tree walker with multi-document support.
pub mod yaml;

pub use json::JsonExtractor;
pub use markdown::MarkdownExtractor;
pub use registry::ExtractorRegistry;
pub use toml::TomlExtractor;
pub use xml::XmlExtractor;
pub use yaml::YamlExtractor;

use crate::line_index::LineIndex;
use crate::recognize::{is_http_url, may_contain_url, scan_urls, trim_trailing};
use crate::types::{Link, LinkKind};
use crate::Result;

/// A single-format link extractor.
///
/// Implementations are stateless and shared across threads by the registry.
pub trait Extractor: Send + Sync {
    /// Short format name, e.g. `md` or `json`.
    fn format(&self) -> &'static str;

    /// File extensions handled by this extractor, lowercase with leading dot.
    fn extensions(&self) -> &'static [&'static str];

    /// Validates `content` and returns its links in source order.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Parse`] for malformed content when `strict`
    /// is set; otherwise malformed content yields `Ok(vec![])`.
    fn extract(&self, path: &str, content: &str, strict: bool) -> Result<Vec<Link>>;
}

/// Recovers the position of `url` by searching the raw document.
///
/// Parsed trees for JSON/YAML/TOML lose node positions, so the extractors
/// fall back to the first literal occurrence of the URL in the raw bytes.
/// Escaped occurrences that never appear literally map to `(1, 1)`.
pub(crate) fn locate(content: &str, index: &LineIndex, url: &str) -> (usize, usize) {
    memchr::memmem::find(content.as_bytes(), url.as_bytes())
        .map_or((1, 1), |offset| index.line_col(offset))
}

/// Restores source order after a walk whose tree does not preserve it.
///
/// Decoded maps may iterate in key order rather than document order, so the
/// structured extractors sort by recovered position before returning.
pub(crate) fn sort_by_position(links: &mut [Link]) {
    links.sort_by_key(|link| (link.line, link.column));
}

/// Emits links for one string value out of a structured document.
///
/// A value that is entirely a URL is emitted as-is; otherwise the value is
/// scanned and every embedded match is emitted. All URLs are trimmed of
/// trailing punctuation before emission.
pub(crate) fn push_string_value(
    content: &str,
    index: &LineIndex,
    path: &str,
    value: &str,
    links: &mut Vec<Link>,
) {
    if is_http_url(value) {
        push_structured(content, index, path, trim_trailing(value), links);
    } else if may_contain_url(value) {
        for (_, raw_url) in scan_urls(value) {
            push_structured(content, index, path, trim_trailing(raw_url), links);
        }
    }
}

fn push_structured(
    content: &str,
    index: &LineIndex,
    path: &str,
    url: &str,
    links: &mut Vec<Link>,
) {
    let (line, column) = locate(content, index, url);
    links.push(Link::new(
        url,
        path,
        line,
        column,
        "",
        LinkKind::StructuredValue,
    ));
}
