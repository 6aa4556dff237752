//! XML link extraction.
//!
//! Streams events with `quick-xml` and applies the URL recognizer to text
//! nodes, CDATA sections, and attribute values. Positions are recovered by
//! locating the URL in the raw content.

use quick_xml::events::Event;
use quick_xml::Reader;

use super::{push_string_value, sort_by_position, Extractor};
use crate::line_index::LineIndex;
use crate::types::Link;
use crate::{Error, Result};

/// Extracts links from XML documents.
pub struct XmlExtractor;

impl Extractor for XmlExtractor {
    fn format(&self) -> &'static str {
        "xml"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".xml"]
    }

    fn extract(&self, path: &str, content: &str, strict: bool) -> Result<Vec<Link>> {
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        match walk(content, path) {
            Ok(links) => Ok(links),
            Err(reason) if strict => Err(Error::Parse {
                path: path.to_string(),
                reason,
            }),
            Err(_) => Ok(Vec::new()),
        }
    }
}

/// One pass that both validates the document and collects its links.
fn walk(content: &str, path: &str) -> std::result::Result<Vec<Link>, String> {
    let index = LineIndex::new(content);
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut links = Vec::new();
    loop {
        match reader.read_event().map_err(|e| e.to_string())? {
            Event::Eof => break,
            Event::Start(element) | Event::Empty(element) => {
                for attribute in element.attributes() {
                    let attribute = attribute.map_err(|e| e.to_string())?;
                    let value = attribute.unescape_value().map_err(|e| e.to_string())?;
                    push_string_value(content, &index, path, &value, &mut links);
                }
            }
            Event::Text(text) => {
                let text = text.unescape().map_err(|e| e.to_string())?;
                push_string_value(content, &index, path, &text, &mut links);
            }
            Event::CData(cdata) => {
                let text = String::from_utf8_lossy(&cdata).into_owned();
                push_string_value(content, &index, path, &text, &mut links);
            }
            _ => {}
        }
    }
    sort_by_position(&mut links);
    Ok(links)
}
