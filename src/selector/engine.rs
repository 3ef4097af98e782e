// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Pointer-driven element targeting engine.
//!
//! Active only while the widget is in design-select mode. On attach it
//! registers capture-phase listeners for enter/leave/click through the
//! document's listener registry and keeps the owning subscription
//! handle; on detach it clears any residual hover outline and releases
//! the handle. Release happens exactly once no matter which exit path
//! runs (element picked, cancel, or teardown), and dropping an engine
//! that was never detached still releases the listeners.

use crate::document::events::{EventPhase, PointerEvent, PointerEventKind, PointerSubscription};
use crate::document::tree::{Document, NodeId, Outline};
use crate::models::locator::ElementLocator;
use crate::selector::path;

/// Hover outline style applied to candidate elements.
const OUTLINE_COLOR: &str = "#667eea";
const OUTLINE_WIDTH: f64 = 2.0;
const OUTLINE_OFFSET: f64 = 2.0;

/// Result of handling one pointer event, reported to the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum TargetingAction {
    None,
    /// The hover highlight moved; carries the now-hovered element.
    HoverChanged(Option<NodeId>),
    /// The user picked an element.
    ElementPicked(ElementLocator),
}

/// The active element-selection session.
pub struct TargetingEngine {
    subscription: PointerSubscription,
    hovered: Option<NodeId>,
}

impl TargetingEngine {
    /// Register pointer listeners and start a selection session.
    pub fn attach(doc: &Document) -> Self {
        let subscription = doc.subscribe_pointer(
            &[
                PointerEventKind::Enter,
                PointerEventKind::Leave,
                PointerEventKind::Click,
            ],
            EventPhase::Capture,
        );
        log::debug!("Targeting engine attached ({} listeners)", doc.listener_count());

        Self {
            subscription,
            hovered: None,
        }
    }

    /// Handle one pointer event, updating hover state and reporting
    /// the outcome upward.
    ///
    /// Events targeting the widget's own subtree are ignored so the
    /// widget cannot select or highlight itself.
    pub fn handle_event(&mut self, doc: &mut Document, event: &PointerEvent) -> TargetingAction {
        if doc.is_within_widget(event.target) {
            return TargetingAction::None;
        }

        match event.kind {
            PointerEventKind::Enter => {
                if let Some(previous) = self.hovered.take() {
                    doc.clear_outline(previous);
                }
                doc.set_outline(event.target, hover_outline());
                self.hovered = Some(event.target);
                TargetingAction::HoverChanged(Some(event.target))
            }
            PointerEventKind::Leave => {
                doc.clear_outline(event.target);
                if self.hovered == Some(event.target) {
                    self.hovered = None;
                }
                TargetingAction::HoverChanged(self.hovered)
            }
            PointerEventKind::Click => {
                let locator = path::locator_for(doc, event.target);
                log::info!(
                    "Element picked: {} ({})",
                    locator.css_selector,
                    locator.xpath
                );
                TargetingAction::ElementPicked(locator)
            }
        }
    }

    /// Element currently carrying the hover highlight.
    pub fn hovered(&self) -> Option<NodeId> {
        self.hovered
    }

    /// End the session: clear any residual outline and release the
    /// listeners.
    pub fn detach(mut self, doc: &mut Document) {
        if let Some(hovered) = self.hovered.take() {
            doc.clear_outline(hovered);
        }
        self.subscription.release();
        log::debug!("Targeting engine detached");
    }
}

fn hover_outline() -> Outline {
    Outline {
        color: OUTLINE_COLOR.to_string(),
        width: OUTLINE_WIDTH,
        offset: OUTLINE_OFFSET,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::tree::ElementSpec;
    use crate::util::geometry::{Rect, Size};

    fn sample_document() -> (Document, NodeId, NodeId) {
        let mut doc = Document::new("https://example.com", "TestAgent/1.0", Size::new(800, 600));
        let body = doc.body();
        let target = doc.append_element(
            body,
            ElementSpec::new("button")
                .id("x")
                .rect(Rect::new(10.0, 10.0, 100.0, 30.0)),
        );
        let overlay = doc.append_element(body, ElementSpec::new("div").class("pins-overlay"));
        doc.set_widget_root(overlay);
        (doc, target, overlay)
    }

    #[test]
    fn test_attach_registers_three_listeners() {
        let (doc, _, _) = sample_document();
        let engine = TargetingEngine::attach(&doc);
        assert_eq!(doc.listener_count(), 3);
        drop(engine);
        assert_eq!(doc.listener_count(), 0);
    }

    #[test]
    fn test_hover_moves_outline() {
        let (mut doc, target, _) = sample_document();
        let other = doc.append_element(doc.body(), ElementSpec::new("p"));
        let mut engine = TargetingEngine::attach(&doc);

        engine.handle_event(&mut doc, &PointerEvent::enter(target));
        assert!(doc.element(target).outline().is_some());

        // Entering another element clears the previous outline even if
        // no leave event was delivered.
        engine.handle_event(&mut doc, &PointerEvent::enter(other));
        assert!(doc.element(target).outline().is_none());
        assert!(doc.element(other).outline().is_some());
        assert_eq!(doc.outlined_count(), 1);

        engine.handle_event(&mut doc, &PointerEvent::leave(other));
        assert_eq!(doc.outlined_count(), 0);
        engine.detach(&mut doc);
    }

    #[test]
    fn test_widget_subtree_ignored() {
        let (mut doc, _, overlay) = sample_document();
        let mut engine = TargetingEngine::attach(&doc);

        let action = engine.handle_event(&mut doc, &PointerEvent::enter(overlay));
        assert_eq!(action, TargetingAction::None);
        assert_eq!(doc.outlined_count(), 0);

        let action = engine.handle_event(&mut doc, &PointerEvent::click(overlay));
        assert_eq!(action, TargetingAction::None);
        engine.detach(&mut doc);
    }

    #[test]
    fn test_click_produces_locator() {
        let (mut doc, target, _) = sample_document();
        let mut engine = TargetingEngine::attach(&doc);

        let action = engine.handle_event(&mut doc, &PointerEvent::click(target));
        match action {
            TargetingAction::ElementPicked(locator) => {
                assert_eq!(locator.css_selector, "#x");
                assert_eq!(locator.xpath, "//*[@id=\"x\"]");
                assert_eq!(locator.bounding_rect, Rect::new(10.0, 10.0, 100.0, 30.0));
            }
            other => panic!("expected ElementPicked, got {:?}", other),
        }
        engine.detach(&mut doc);
    }

    #[test]
    fn test_detach_clears_residual_outline() {
        let (mut doc, target, _) = sample_document();
        let mut engine = TargetingEngine::attach(&doc);

        engine.handle_event(&mut doc, &PointerEvent::enter(target));
        assert_eq!(doc.outlined_count(), 1);

        engine.detach(&mut doc);
        assert_eq!(doc.outlined_count(), 0);
        assert_eq!(doc.listener_count(), 0);
    }
}
