// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Read-only page tree abstraction.
//!
//! The host embedding the widget mirrors its page into a `Document`:
//! an arena of elements with tags, ids, classes, text, and page-space
//! geometry, plus the browsing environment (url, user agent, viewport,
//! scroll offset). The engine reads the tree and never restructures
//! it; the only mutable decorations are hover outlines and the scroll
//! offset.
//!
//! Element rectangles are stored in page coordinates. Viewport-relative
//! geometry (what a locator records) is derived from the current scroll
//! offset at the moment it is asked for.

use crate::document::events::{
    EventPhase, ListenerRegistry, PointerEventKind, PointerSubscription,
};
use crate::util::geometry::{centering_scroll, page_to_viewport, Point, Rect, Size};
use std::cell::RefCell;
use std::rc::Rc;

/// Index of an element in the document arena.
///
/// Ids are only meaningful for the document that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Visual outline decoration applied to a hovered element.
#[derive(Debug, Clone, PartialEq)]
pub struct Outline {
    pub color: String,
    pub width: f64,
    pub offset: f64,
}

/// A single element of the page tree.
#[derive(Debug, Clone)]
pub struct Element {
    pub tag_name: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub text: String,
    /// Page-space geometry.
    pub rect: Rect,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    outline: Option<Outline>,
}

impl Element {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn outline(&self) -> Option<&Outline> {
        self.outline.as_ref()
    }
}

/// Description of an element to append to the tree.
#[derive(Debug, Clone, Default)]
pub struct ElementSpec {
    tag_name: String,
    id: Option<String>,
    classes: Vec<String>,
    text: String,
    rect: Rect,
}

impl ElementSpec {
    /// Start a spec for the given tag. Tag names are stored lowercase.
    pub fn new(tag_name: &str) -> Self {
        Self {
            tag_name: tag_name.to_lowercase(),
            ..Self::default()
        }
    }

    pub fn id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    /// Page-space geometry of the element.
    pub fn rect(mut self, rect: Rect) -> Self {
        self.rect = rect;
        self
    }
}

/// Browsing environment sampled for submission metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct PageEnvironment {
    pub url: String,
    pub user_agent: String,
    pub viewport: Size,
}

/// Point-in-time copy of the renderable page state.
///
/// Plain owned data, safe to hand to a rasterizer worker thread.
#[derive(Debug, Clone)]
pub struct PageSnapshot {
    pub viewport: Size,
    pub scroll: Point,
    pub content_size: Size,
    pub elements: Vec<SnapshotElement>,
}

/// One element as seen by the rasterizer.
#[derive(Debug, Clone)]
pub struct SnapshotElement {
    pub tag_name: String,
    /// Viewport-relative geometry at snapshot time.
    pub rect: Rect,
    pub visible: bool,
    pub has_text: bool,
}

/// The page tree plus browsing environment.
pub struct Document {
    nodes: Vec<Element>,
    url: String,
    user_agent: String,
    viewport: Size,
    scroll: Point,
    widget_root: Option<NodeId>,
    listeners: Rc<RefCell<ListenerRegistry>>,
}

impl Document {
    /// Create a document with `html` and `body` elements spanning the
    /// viewport.
    pub fn new(url: &str, user_agent: &str, viewport: Size) -> Self {
        let page_rect = Rect::new(0.0, 0.0, viewport.width as f64, viewport.height as f64);
        let html = Element {
            tag_name: "html".to_string(),
            id: None,
            classes: Vec::new(),
            text: String::new(),
            rect: page_rect,
            parent: None,
            children: vec![NodeId(1)],
            outline: None,
        };
        let body = Element {
            tag_name: "body".to_string(),
            id: None,
            classes: Vec::new(),
            text: String::new(),
            rect: page_rect,
            parent: Some(NodeId(0)),
            children: Vec::new(),
            outline: None,
        };

        Self {
            nodes: vec![html, body],
            url: url.to_string(),
            user_agent: user_agent.to_string(),
            viewport,
            scroll: Point::default(),
            widget_root: None,
            listeners: Rc::new(RefCell::new(ListenerRegistry::default())),
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn body(&self) -> NodeId {
        NodeId(1)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn scroll(&self) -> Point {
        self.scroll
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Append a child element under `parent`.
    pub fn append_element(&mut self, parent: NodeId, spec: ElementSpec) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Element {
            tag_name: spec.tag_name,
            id: spec.id,
            classes: spec.classes,
            text: spec.text,
            rect: spec.rect,
            parent: Some(parent),
            children: Vec::new(),
            outline: None,
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn element(&self, node: NodeId) -> &Element {
        &self.nodes[node.0]
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    /// First element with the given id attribute, in document order.
    pub fn find_by_id(&self, id: &str) -> Option<NodeId> {
        self.walk().find(|&node| {
            self.nodes[node.0].id.as_deref() == Some(id)
        })
    }

    /// Concatenated text of the element and its descendants, in
    /// document order.
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            let element = &self.nodes[current.0];
            out.push_str(&element.text);
            for &child in element.children.iter().rev() {
                stack.push(child);
            }
        }
        out
    }

    /// Whether the element occupies any space on the page.
    pub fn is_visible(&self, node: NodeId) -> bool {
        let rect = self.nodes[node.0].rect;
        rect.width > 0.0 || rect.height > 0.0
    }

    /// Mark the subtree that renders the widget itself; pointer events
    /// targeting it are ignored by the targeting engine.
    pub fn set_widget_root(&mut self, node: NodeId) {
        self.widget_root = Some(node);
    }

    pub fn widget_root(&self) -> Option<NodeId> {
        self.widget_root
    }

    /// Whether `node` is the widget root or one of its descendants.
    pub fn is_within_widget(&self, node: NodeId) -> bool {
        let Some(widget_root) = self.widget_root else {
            return false;
        };
        let mut current = Some(node);
        while let Some(n) = current {
            if n == widget_root {
                return true;
            }
            current = self.nodes[n.0].parent;
        }
        false
    }

    pub fn set_outline(&mut self, node: NodeId, outline: Outline) {
        self.nodes[node.0].outline = Some(outline);
    }

    pub fn clear_outline(&mut self, node: NodeId) {
        self.nodes[node.0].outline = None;
    }

    /// Number of elements currently carrying an outline decoration.
    pub fn outlined_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.outline.is_some()).count()
    }

    /// Total scrollable content extent, at least the viewport.
    pub fn content_size(&self) -> Size {
        let mut width = self.viewport.width as f64;
        let mut height = self.viewport.height as f64;
        for node in &self.nodes {
            let max = node.rect.max();
            width = width.max(max.x);
            height = height.max(max.y);
        }
        Size::new(width.ceil() as u32, height.ceil() as u32)
    }

    /// Set the scroll offset, clamped to the scrollable range.
    pub fn set_scroll(&mut self, scroll: Point) {
        let content = self.content_size();
        let max_x = (content.width as f64 - self.viewport.width as f64).max(0.0);
        let max_y = (content.height as f64 - self.viewport.height as f64).max(0.0);
        self.scroll = Point::new(scroll.x.clamp(0.0, max_x), scroll.y.clamp(0.0, max_y));
    }

    /// Scroll so the element is centered in the viewport.
    pub fn scroll_to_element(&mut self, node: NodeId) {
        let rect = self.nodes[node.0].rect;
        self.scroll = centering_scroll(&rect, self.viewport, self.content_size());
    }

    /// The element's geometry relative to the current viewport.
    pub fn viewport_rect(&self, node: NodeId) -> Rect {
        page_to_viewport(&self.nodes[node.0].rect, self.scroll)
    }

    pub fn environment(&self) -> PageEnvironment {
        PageEnvironment {
            url: self.url.clone(),
            user_agent: self.user_agent.clone(),
            viewport: self.viewport,
        }
    }

    /// Register pointer listeners and return the owning handle.
    pub fn subscribe_pointer(
        &self,
        kinds: &[PointerEventKind],
        phase: EventPhase,
    ) -> PointerSubscription {
        PointerSubscription::acquire(&self.listeners, kinds, phase)
    }

    /// Number of registered pointer listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Point-in-time copy of the renderable state for the rasterizer.
    pub fn snapshot(&self) -> PageSnapshot {
        let elements = self
            .walk()
            .map(|node| {
                let element = &self.nodes[node.0];
                SnapshotElement {
                    tag_name: element.tag_name.clone(),
                    rect: page_to_viewport(&element.rect, self.scroll),
                    visible: self.is_visible(node),
                    has_text: !element.text.is_empty(),
                }
            })
            .collect();

        PageSnapshot {
            viewport: self.viewport,
            scroll: self.scroll,
            content_size: self.content_size(),
            elements,
        }
    }

    /// Depth-first traversal from the root, in document order.
    fn walk(&self) -> impl Iterator<Item = NodeId> + '_ {
        let mut stack = vec![self.root()];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            for &child in self.nodes[node.0].children.iter().rev() {
                stack.push(child);
            }
            Some(node)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_document() -> Document {
        let mut doc = Document::new("https://example.com", "TestAgent/1.0", Size::new(800, 600));
        let body = doc.body();
        let main = doc.append_element(
            body,
            ElementSpec::new("main").rect(Rect::new(0.0, 0.0, 800.0, 1200.0)),
        );
        doc.append_element(
            main,
            ElementSpec::new("h1")
                .text("Title")
                .rect(Rect::new(20.0, 20.0, 400.0, 40.0)),
        );
        doc.append_element(
            main,
            ElementSpec::new("p")
                .text(" and text")
                .rect(Rect::new(20.0, 80.0, 400.0, 200.0)),
        );
        doc
    }

    #[test]
    fn test_text_content_concatenates_in_document_order() {
        let doc = sample_document();
        assert_eq!(doc.text_content(doc.body()), "Title and text");
    }

    #[test]
    fn test_find_by_id_in_document_order() {
        let mut doc = sample_document();
        let body = doc.body();
        let first = doc.append_element(body, ElementSpec::new("div").id("dup"));
        doc.append_element(body, ElementSpec::new("span").id("dup"));

        assert_eq!(doc.find_by_id("dup"), Some(first));
        assert_eq!(doc.find_by_id("missing"), None);
    }

    #[test]
    fn test_widget_subtree_containment() {
        let mut doc = sample_document();
        let body = doc.body();
        let overlay = doc.append_element(body, ElementSpec::new("div").class("pins-overlay"));
        let button = doc.append_element(overlay, ElementSpec::new("button"));
        doc.set_widget_root(overlay);

        assert!(doc.is_within_widget(overlay));
        assert!(doc.is_within_widget(button));
        assert!(!doc.is_within_widget(body));
    }

    #[test]
    fn test_content_size_covers_overflow() {
        let doc = sample_document();
        // main extends to y=1200, past the 600px viewport
        assert_eq!(doc.content_size(), Size::new(800, 1200));
    }

    #[test]
    fn test_scroll_clamped_and_viewport_rect_follows() {
        let mut doc = sample_document();
        let h1 = doc.find_first_tag("h1");

        doc.set_scroll(Point::new(0.0, 10_000.0));
        assert_eq!(doc.scroll(), Point::new(0.0, 600.0));

        let rect = doc.viewport_rect(h1);
        assert_eq!(rect.y, 20.0 - 600.0);
    }

    #[test]
    fn test_snapshot_is_viewport_relative() {
        let mut doc = sample_document();
        doc.set_scroll(Point::new(0.0, 100.0));
        let snapshot = doc.snapshot();

        assert_eq!(snapshot.scroll, Point::new(0.0, 100.0));
        assert_eq!(snapshot.content_size, Size::new(800, 1200));

        let h1 = snapshot
            .elements
            .iter()
            .find(|e| e.tag_name == "h1")
            .unwrap();
        assert_eq!(h1.rect.y, -80.0);
        assert!(h1.has_text);
    }

    impl Document {
        fn find_first_tag(&self, tag: &str) -> NodeId {
            self.walk()
                .find(|&n| self.element(n).tag_name == tag)
                .unwrap()
        }
    }
}
