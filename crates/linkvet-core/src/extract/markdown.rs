//! Markdown link extraction.
//!
//! Parses CommonMark (with the usual GFM table/strikethrough/tasklist
//! extensions) and walks the event stream with byte offsets, so every
//! emitted link carries its source position. Four sources of links:
//!
//! 1. AST link and image nodes (`[text](url)`, `![alt](url)`, `<url>`)
//! 2. Bare URLs autolinked out of plain text
//! 3. Raw `<a href="...">` anchors scanned from the unparsed bytes
//! 4. Reference definitions (`[name]: url`), which promote matching link
//!    nodes to reference links pointing at their definition line
//!
//! Links inside fenced or indented code blocks are ignored.

use once_cell::sync::Lazy;
use pulldown_cmark::{Event, LinkType, Options, Parser, Tag};
use regex::Regex;
use std::collections::HashMap;

use super::Extractor;
use crate::line_index::LineIndex;
use crate::recognize::{is_http_url, may_contain_url, scan_urls, trim_trailing};
use crate::types::{Link, LinkKind};
use crate::Result;

#[allow(clippy::expect_used)]
static HTML_ANCHOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<a\s[^>]*?href\s*=\s*["']?(https?://[^"'\s>]+)["']?[^>]*>(.*?)</a>"#)
        .expect("hardcoded anchor pattern compiles")
});

#[allow(clippy::expect_used)]
static REFERENCE_DEF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*\[([^\]]+)\]:[ \t]*(\S+)").expect("hardcoded def pattern compiles")
});

#[allow(clippy::expect_used)]
static INNER_TAGS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^>]*>").expect("hardcoded tag pattern compiles"));

/// Extracts links from CommonMark documents.
pub struct MarkdownExtractor;

/// A link or image node currently open during the walk.
struct PendingNode {
    url: String,
    kind: LinkKind,
    text: String,
    /// Byte offset of the first descendant text node, once seen.
    text_offset: Option<usize>,
}

impl Extractor for MarkdownExtractor {
    fn format(&self) -> &'static str {
        "md"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".md", ".markdown"]
    }

    fn extract(&self, path: &str, content: &str, _strict: bool) -> Result<Vec<Link>> {
        // Markdown parsing is total: malformed input degrades to text, so
        // strict mode has nothing extra to surface here.
        let index = LineIndex::new(content);
        let mut links = walk_events(path, content, &index);
        links.extend(scan_html_anchors(path, content, &index));
        promote_references(content, &index, &mut links);
        // Anchor-scan results land after the AST walk; restore source order.
        links.sort_by_key(|link| (link.line, link.column));
        Ok(links)
    }
}

fn walk_events(path: &str, content: &str, index: &LineIndex) -> Vec<Link> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_FOOTNOTES);

    let mut links = Vec::new();
    let mut stack: Vec<PendingNode> = Vec::new();
    let mut in_code_block = false;

    for (event, range) in Parser::new_ext(content, options).into_offset_iter() {
        match event {
            Event::Start(Tag::CodeBlock(_)) => in_code_block = true,
            Event::End(Tag::CodeBlock(_)) => in_code_block = false,
            Event::Start(Tag::Link(link_type, dest, _)) if !in_code_block => {
                let kind = match link_type {
                    LinkType::Autolink | LinkType::Email => LinkKind::Autolink,
                    _ => LinkKind::Inline,
                };
                stack.push(PendingNode {
                    url: dest.into_string(),
                    kind,
                    text: String::new(),
                    text_offset: None,
                });
            }
            Event::Start(Tag::Image(_, dest, _)) if !in_code_block => {
                stack.push(PendingNode {
                    url: dest.into_string(),
                    kind: LinkKind::Image,
                    text: String::new(),
                    text_offset: None,
                });
            }
            Event::End(Tag::Link(..) | Tag::Image(..)) if !in_code_block => {
                if let Some(node) = stack.pop() {
                    finish_node(path, index, node, &mut links);
                }
            }
            Event::Text(text) => {
                if in_code_block {
                    continue;
                }
                if stack.is_empty() {
                    scan_bare_urls(path, index, &text, range.start, &mut links);
                } else {
                    append_text(&mut stack, &text, range.start);
                }
            }
            // Inline code spans flatten into link text but are not scanned
            // for bare URLs.
            Event::Code(text) if !stack.is_empty() => {
                append_text(&mut stack, &text, range.start);
            }
            _ => {}
        }
    }

    links
}

/// Flattens descendant text into every open ancestor, so bold/italic/code
/// spans and image alts all contribute to link text.
fn append_text(stack: &mut [PendingNode], text: &str, offset: usize) {
    for node in stack {
        if node.text_offset.is_none() {
            node.text_offset = Some(offset);
        }
        node.text.push_str(text);
    }
}

fn finish_node(path: &str, index: &LineIndex, node: PendingNode, links: &mut Vec<Link>) {
    // mailto/tel/data/relative destinations are dropped here.
    if !is_http_url(&node.url) {
        return;
    }
    let (line, column) = node
        .text_offset
        .map_or((1, 1), |offset| index.line_col(offset));
    links.push(Link::new(
        trim_trailing(&node.url),
        path,
        line,
        column,
        node.text.trim(),
        node.kind,
    ));
}

fn scan_bare_urls(
    path: &str,
    index: &LineIndex,
    text: &str,
    base_offset: usize,
    links: &mut Vec<Link>,
) {
    if !may_contain_url(text) {
        return;
    }
    for (offset, raw_url) in scan_urls(text) {
        let url = trim_trailing(raw_url);
        let (line, column) = index.line_col(base_offset + offset);
        links.push(Link::new(url, path, line, column, url, LinkKind::Autolink));
    }
}

fn scan_html_anchors(path: &str, content: &str, index: &LineIndex) -> Vec<Link> {
    if !may_contain_url(content) {
        return Vec::new();
    }
    HTML_ANCHOR
        .captures_iter(content)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let url = trim_trailing(caps.get(1)?.as_str());
            let inner = caps.get(2).map_or("", |m| m.as_str());
            let text = INNER_TAGS.replace_all(inner, "");
            let (line, column) = index.line_col(whole.start());
            Some(Link::new(
                url,
                path,
                line,
                column,
                text.trim(),
                LinkKind::HtmlAnchor,
            ))
        })
        .collect()
}

/// Scans `[name]: url` definitions and promotes matching links.
///
/// A link whose destination equals a defined reference URL, used on a line
/// other than the definition itself, becomes a reference link carrying the
/// definition's name and line.
fn promote_references(content: &str, index: &LineIndex, links: &mut [Link]) {
    let mut definitions: HashMap<&str, (&str, usize)> = HashMap::new();
    for caps in REFERENCE_DEF.captures_iter(content) {
        let (Some(name), Some(url)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        let trimmed = trim_trailing(url.as_str());
        if !is_http_url(trimmed) {
            continue;
        }
        let (line, _) = index.line_col(url.start());
        definitions.entry(trimmed).or_insert((name.as_str(), line));
    }
    if definitions.is_empty() {
        return;
    }
    for link in links.iter_mut() {
        if link.kind != LinkKind::Inline {
            continue;
        }
        if let Some(&(name, def_line)) = definitions.get(link.url.as_str()) {
            if link.line != def_line {
                *link = link.clone().into_reference(name, def_line);
            }
        }
    }
}
