// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility types.
//!
//! This module provides the rectangle and point types shared by the
//! document tree, locators, and the capture pipeline, along with
//! conversions between viewport and page coordinate spaces.

use serde::{Deserialize, Serialize};

/// A 2D point in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An integer width/height pair (viewport or content dimensions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// An axis-aligned rectangle in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle from its top-left corner and dimensions.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The center point of the rectangle.
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// The bottom-right corner.
    pub fn max(&self) -> Point {
        Point::new(self.x + self.width, self.y + self.height)
    }

    /// Whether the rectangle has no visible extent.
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 && self.height <= 0.0
    }

    /// The same rectangle shifted by the given offsets.
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Whether the given point lies inside the rectangle.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x < self.x + self.width
            && point.y >= self.y
            && point.y < self.y + self.height
    }
}

/// Convert a page-space rectangle to viewport space for the given scroll offset.
pub fn page_to_viewport(rect: &Rect, scroll: Point) -> Rect {
    rect.translated(-scroll.x, -scroll.y)
}

/// Convert a viewport-space rectangle back to page space.
pub fn viewport_to_page(rect: &Rect, scroll: Point) -> Rect {
    rect.translated(scroll.x, scroll.y)
}

/// Scroll offset that centers `target` (page space) inside the viewport,
/// clamped so the viewport stays within the page content.
pub fn centering_scroll(target: &Rect, viewport: Size, content: Size) -> Point {
    let max_x = (content.width as f64 - viewport.width as f64).max(0.0);
    let max_y = (content.height as f64 - viewport.height as f64).max(0.0);
    let center = target.center();
    Point::new(
        (center.x - viewport.width as f64 / 2.0).clamp(0.0, max_x),
        (center.y - viewport.height as f64 / 2.0).clamp(0.0, max_y),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_viewport_roundtrip() {
        let rect = Rect::new(120.0, 340.0, 80.0, 24.0);
        let scroll = Point::new(0.0, 300.0);

        let viewport = page_to_viewport(&rect, scroll);
        assert_eq!(viewport.y, 40.0);

        let back = viewport_to_page(&viewport, scroll);
        assert_eq!(back, rect);
    }

    #[test]
    fn test_centering_scroll_clamps_to_content() {
        let viewport = Size::new(800, 600);
        let content = Size::new(800, 2000);

        // Element near the top: no negative scroll.
        let top = Rect::new(0.0, 10.0, 100.0, 20.0);
        let scroll = centering_scroll(&top, viewport, content);
        assert_eq!(scroll.y, 0.0);

        // Element near the bottom: clamped to the last full viewport.
        let bottom = Rect::new(0.0, 1980.0, 100.0, 20.0);
        let scroll = centering_scroll(&bottom, viewport, content);
        assert_eq!(scroll.y, 1400.0);
    }

    #[test]
    fn test_contains_excludes_far_edge() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(rect.contains(Point::new(0.0, 0.0)));
        assert!(rect.contains(Point::new(9.9, 9.9)));
        assert!(!rect.contains(Point::new(10.0, 10.0)));
    }
}
