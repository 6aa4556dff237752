//! YAML link extraction.
//!
//! Drains every document in a multi-document stream and walks each tree.
//! `serde_yaml` exposes no node positions, so URLs are located by searching
//! the raw content, same as JSON and TOML.

use serde::Deserialize;
use serde_yaml::Value;

use super::{push_string_value, sort_by_position, Extractor};
use crate::line_index::LineIndex;
use crate::types::Link;
use crate::{Error, Result};

/// Extracts links from YAML documents, including multi-document streams.
pub struct YamlExtractor;

impl Extractor for YamlExtractor {
    fn format(&self) -> &'static str {
        "yaml"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".yaml", ".yml"]
    }

    fn extract(&self, path: &str, content: &str, strict: bool) -> Result<Vec<Link>> {
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        let mut documents = Vec::new();
        for document in serde_yaml::Deserializer::from_str(content) {
            match Value::deserialize(document) {
                Ok(value) => documents.push(value),
                Err(err) if strict => {
                    return Err(Error::Parse {
                        path: path.to_string(),
                        reason: err.to_string(),
                    });
                }
                Err(_) => return Ok(Vec::new()),
            }
        }
        let index = LineIndex::new(content);
        let mut links = Vec::new();
        for value in &documents {
            walk(content, &index, path, value, &mut links);
        }
        sort_by_position(&mut links);
        Ok(links)
    }
}

fn walk(content: &str, index: &LineIndex, path: &str, value: &Value, links: &mut Vec<Link>) {
    match value {
        Value::String(s) => push_string_value(content, index, path, s, links),
        Value::Sequence(items) => {
            for item in items {
                walk(content, index, path, item, links);
            }
        }
        Value::Mapping(map) => {
            for (key, item) in map {
                if let Value::String(key) = key {
                    push_string_value(content, index, path, key, links);
                }
                walk(content, index, path, item, links);
            }
        }
        Value::Tagged(tagged) => walk(content, index, path, &tagged.value, links),
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}
