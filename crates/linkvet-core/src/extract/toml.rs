//! TOML link extraction.
//!
//! Decodes the document and walks every value. Like JSON, the decoded tree
//! carries no positions, so URLs are located in the raw content.

use toml::Value;

use super::{push_string_value, sort_by_position, Extractor};
use crate::line_index::LineIndex;
use crate::types::Link;
use crate::{Error, Result};

/// Extracts links from TOML documents.
pub struct TomlExtractor;

impl Extractor for TomlExtractor {
    fn format(&self) -> &'static str {
        "toml"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".toml"]
    }

    fn extract(&self, path: &str, content: &str, strict: bool) -> Result<Vec<Link>> {
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        let value: Value = match toml::from_str(content) {
            Ok(value) => value,
            Err(err) if strict => {
                return Err(Error::Parse {
                    path: path.to_string(),
                    reason: err.to_string(),
                });
            }
            Err(_) => return Ok(Vec::new()),
        };
        let index = LineIndex::new(content);
        let mut links = Vec::new();
        walk(content, &index, path, &value, &mut links);
        sort_by_position(&mut links);
        Ok(links)
    }
}

fn walk(content: &str, index: &LineIndex, path: &str, value: &Value, links: &mut Vec<Link>) {
    match value {
        Value::String(s) => push_string_value(content, index, path, s, links),
        Value::Array(items) => {
            for item in items {
                walk(content, index, path, item, links);
            }
        }
        Value::Table(table) => {
            for (key, item) in table {
                push_string_value(content, index, path, key, links);
                walk(content, index, path, item, links);
            }
        }
        Value::Integer(_) | Value::Float(_) | Value::Boolean(_) | Value::Datetime(_) => {}
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn extract(content: &str) -> Vec<Link> {
        TomlExtractor.extract("test.toml", content, false).unwrap()
    }

    #[test]
    fn test_string_values() {
        let content = "homepage = \"https://example.com/\"\nname = \"demo\"\n";
        let links = extract(content);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].url, "https://example.com/");
        assert_eq!(links[0].line, 1);
    }

    #[test]
    fn test_tables_and_arrays() {
        let content = "[package]\nrepos = [\"http://one.test/\", \"http://two.test/\"]\n";
        let urls: Vec<_> = extract(content).into_iter().map(|l| l.url).collect();
        assert_eq!(urls, vec!["http://one.test/", "http://two.test/"]);
    }

    #[test]
    fn test_embedded_url_scanned() {
        let content = "note = \"see https://example.com/docs.\"\n";
        let links = extract(content);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].url, "https://example.com/docs");
    }

    #[test]
    fn test_malformed_lenient_vs_strict() {
        let malformed = "a = [1,\n";
        assert!(extract(malformed).is_empty());
        assert!(TomlExtractor.extract("bad.toml", malformed, true).is_err());
    }

    #[test]
    fn test_empty_content_is_valid() {
        assert!(extract("").is_empty());
    }
}
