//! JSON link extraction.
//!
//! Decodes the document and recursively walks every node. String leaves and
//! object keys are checked with the URL recognizer; positions are recovered
//! by locating the URL in the raw content, since serde's tree drops them.

use serde_json::Value;

use super::{push_string_value, sort_by_position, Extractor};
use crate::line_index::LineIndex;
use crate::types::Link;
use crate::{Error, Result};

/// Extracts links from JSON documents.
pub struct JsonExtractor;

impl Extractor for JsonExtractor {
    fn format(&self) -> &'static str {
        "json"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".json"]
    }

    fn extract(&self, path: &str, content: &str, strict: bool) -> Result<Vec<Link>> {
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        let value: Value = match serde_json::from_str(content) {
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
        Value::Object(map) => {
            for (key, item) in map {
                push_string_value(content, index, path, key, links);
                walk(content, index, path, item, links);
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::LinkKind;

    fn extract(content: &str) -> Vec<Link> {
        JsonExtractor.extract("test.json", content, false).unwrap()
    }

    #[test]
    fn test_string_values() {
        let content = r#"{"homepage": "https://example.com/", "name": "demo"}"#;
        let links = extract(content);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].url, "https://example.com/");
        assert_eq!(links[0].kind, LinkKind::StructuredValue);
    }

    #[test]
    fn test_nested_arrays_and_objects() {
        let content = r#"{"a": [{"b": "http://one.test/"}, ["http://two.test/"]]}"#;
        let urls: Vec<_> = extract(content).into_iter().map(|l| l.url).collect();
        assert_eq!(urls, vec!["http://one.test/", "http://two.test/"]);
    }

    #[test]
    fn test_url_keys_emitted() {
        let content = r#"{"https://key.test/": "value"}"#;
        let links = extract(content);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].url, "https://key.test/");
    }

    #[test]
    fn test_embedded_urls_scanned() {
        let content = r#"{"note": "docs at https://example.com/docs, see there"}"#;
        let links = extract(content);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].url, "https://example.com/docs");
    }

    #[test]
    fn test_positions_recovered_from_raw() {
        let content = "{\n  \"url\": \"https://example.com/\"\n}\n";
        let links = extract(content);
        assert_eq!(links[0].line, 2);
        let line = content.lines().nth(1).unwrap();
        assert!(line[links[0].column - 1..].starts_with("https://example.com/"));
    }

    #[test]
    fn test_malformed_lenient_vs_strict() {
        let malformed = r#"{"a": "#;
        assert!(extract(malformed).is_empty());
        let err = JsonExtractor
            .extract("bad.json", malformed, true)
            .unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn test_empty_content_is_valid() {
        assert!(extract("").is_empty());
        assert!(extract("   \n").is_empty());
    }
}
