// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Structural path derivation for page elements.
//!
//! Pure functions mapping a document node to the selectors a locator
//! carries: a short CSS selector, an XPath that can re-find the node,
//! and a text preview. `resolve_xpath` evaluates the paths this module
//! produces, which is what deep links use to re-find commented
//! elements.

use crate::document::tree::{Document, NodeId};
use crate::models::locator::ElementLocator;
use crate::util::format::truncate_chars;

/// Maximum characters kept in a locator's text preview.
pub const TEXT_PREVIEW_LEN: usize = 100;

/// Short CSS selector for an element.
///
/// Prefers `#id`; falls back to `tag.class1.class2`, then to the bare
/// tag name.
pub fn css_selector(doc: &Document, node: NodeId) -> String {
    let element = doc.element(node);

    if let Some(id) = element.id.as_deref() {
        return format!("#{}", id);
    }

    let classes: Vec<&str> = element
        .classes
        .iter()
        .map(String::as_str)
        .filter(|c| !c.is_empty())
        .collect();
    if !classes.is_empty() {
        return format!("{}.{}", element.tag_name, classes.join("."));
    }

    element.tag_name.clone()
}

/// XPath for an element.
///
/// Id-based when an id is present; otherwise a positional path built
/// bottom-up with 1-based indices among same-tag siblings. Cost is
/// O(depth x sibling count), acceptable for one-shot interactive use.
pub fn xpath(doc: &Document, node: NodeId) -> String {
    let element = doc.element(node);

    if let Some(id) = element.id.as_deref() {
        return format!("//*[@id=\"{}\"]", id);
    }
    if node == doc.body() {
        return "/html/body".to_string();
    }
    if node == doc.root() {
        return "/html".to_string();
    }

    let Some(parent) = doc.parent(node) else {
        return String::new();
    };

    let mut index = 0;
    for &sibling in doc.children(parent) {
        if sibling == node {
            return format!(
                "{}/{}[{}]",
                xpath(doc, parent),
                element.tag_name,
                index + 1
            );
        }
        if doc.element(sibling).tag_name == element.tag_name {
            index += 1;
        }
    }

    String::new()
}

/// First characters of the element's text content.
pub fn text_preview(doc: &Document, node: NodeId) -> String {
    truncate_chars(&doc.text_content(node), TEXT_PREVIEW_LEN)
}

/// Bundle the derived paths and current viewport geometry into a
/// locator.
pub fn locator_for(doc: &Document, node: NodeId) -> ElementLocator {
    let element = doc.element(node);
    ElementLocator {
        tag_name: element.tag_name.clone(),
        id: element.id.clone(),
        classes: element.classes.clone(),
        css_selector: css_selector(doc, node),
        xpath: xpath(doc, node),
        text_preview: text_preview(doc, node),
        bounding_rect: doc.viewport_rect(node),
    }
}

/// Evaluate an XPath produced by [`xpath`] against a document.
///
/// Supports the two emitted shapes: `//*[@id="..."]` (optionally with
/// trailing positional segments from an id-bearing ancestor) and
/// absolute `/html/...` paths. Returns `None` when the path no longer
/// matches the tree.
pub fn resolve_xpath(doc: &Document, path: &str) -> Option<NodeId> {
    if let Some(rest) = path.strip_prefix("//*[@id=\"") {
        let close = rest.find("\"]")?;
        let start = doc.find_by_id(&rest[..close])?;
        let remainder = &rest[close + 2..];
        if remainder.is_empty() {
            return Some(start);
        }
        return walk_segments(doc, start, remainder.strip_prefix('/')?);
    }

    let rest = path.strip_prefix("/html")?;
    if rest.is_empty() {
        return Some(doc.root());
    }
    walk_segments(doc, doc.root(), rest.strip_prefix('/')?)
}

/// Re-find the element a locator was derived from, by its xpath.
pub fn resolve_locator(doc: &Document, locator: &ElementLocator) -> Option<NodeId> {
    resolve_xpath(doc, &locator.xpath)
}

fn walk_segments(doc: &Document, start: NodeId, segments: &str) -> Option<NodeId> {
    let mut current = start;
    for segment in segments.split('/') {
        let (tag, index) = parse_segment(segment)?;
        let mut seen = 0;
        let mut found = None;
        for &child in doc.children(current) {
            if doc.element(child).tag_name == tag {
                seen += 1;
                if seen == index {
                    found = Some(child);
                    break;
                }
            }
        }
        current = found?;
    }
    Some(current)
}

/// Split `tag[n]` into its parts; a bare `tag` means the first match.
fn parse_segment(segment: &str) -> Option<(&str, usize)> {
    if segment.is_empty() {
        return None;
    }
    match segment.find('[') {
        Some(open) => {
            let tag = &segment[..open];
            let index: usize = segment[open + 1..].strip_suffix(']')?.parse().ok()?;
            (index >= 1).then_some((tag, index))
        }
        None => Some((segment, 1)),
    }
}
