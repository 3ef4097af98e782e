// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! The rasterizer capability port.
//!
//! A rasterizer turns a page snapshot into pixels. Hosts with a real
//! renderer implement [`Rasterizer`] over it; the built-in
//! [`WireframeRasterizer`] draws element boxes so the pipeline works
//! end to end without one. Capture covers the full scrollable content,
//! not just the viewport: snapshot geometry is viewport-relative, and
//! the options carry the scroll offset to compensate with.

use crate::document::tree::PageSnapshot;
use crate::models::artifact::{EncodeError, RasterImage};
use crate::util::geometry::{viewport_to_page, Point, Rect};
use image::{Rgba, RgbaImage};

/// Why a capture could not produce a raster. Fatal to the operation.
#[derive(thiserror::Error, Debug)]
pub enum CaptureError {
    #[error("rasterization failed: {0}")]
    Rasterize(String),
    #[error("capture worker stopped unexpectedly")]
    WorkerStopped,
    #[error("capture has not completed")]
    NotReady,
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// Capture parameters derived from the page at capture time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureOptions {
    pub scroll_x: f64,
    pub scroll_y: f64,
    pub content_width: u32,
    pub content_height: u32,
}

impl CaptureOptions {
    /// Full-page options for a snapshot: raster the entire scrollable
    /// content, compensating for the scroll position it was taken at.
    pub fn for_page(page: &PageSnapshot) -> Self {
        Self {
            scroll_x: page.scroll.x,
            scroll_y: page.scroll.y,
            content_width: page.content_size.width,
            content_height: page.content_size.height,
        }
    }
}

/// Converts a page snapshot into an RGBA raster.
pub trait Rasterizer: Send + Sync {
    fn capture(&self, page: &PageSnapshot, options: &CaptureOptions)
        -> Result<RasterImage, CaptureError>;
}

/// Built-in software rasterizer drawing element wireframes.
pub struct WireframeRasterizer {
    pub background: [u8; 4],
    pub stroke: [u8; 4],
    pub text_fill: [u8; 4],
}

impl Default for WireframeRasterizer {
    fn default() -> Self {
        Self {
            background: [255, 255, 255, 255],
            stroke: [51, 51, 51, 255],
            text_fill: [229, 229, 229, 255],
        }
    }
}

impl Rasterizer for WireframeRasterizer {
    fn capture(
        &self,
        page: &PageSnapshot,
        options: &CaptureOptions,
    ) -> Result<RasterImage, CaptureError> {
        let width = options.content_width.max(1);
        let height = options.content_height.max(1);
        let mut image = RgbaImage::from_pixel(width, height, Rgba(self.background));

        let scroll = Point::new(options.scroll_x, options.scroll_y);
        for element in &page.elements {
            if !element.visible {
                continue;
            }
            // Back to page space so the raster covers the whole document.
            let rect = viewport_to_page(&element.rect, scroll);
            if element.has_text {
                fill_rect(&mut image, &rect, Rgba(self.text_fill));
            }
            draw_rect_outline(&mut image, &rect, 1, Rgba(self.stroke));
        }

        Ok(RasterImage::from_rgba(image))
    }
}

pub(crate) fn put_pixel_checked(image: &mut RgbaImage, x: i64, y: i64, color: Rgba<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < image.width() && (y as u32) < image.height() {
        image.put_pixel(x as u32, y as u32, color);
    }
}

pub(crate) fn fill_rect(image: &mut RgbaImage, rect: &Rect, color: Rgba<u8>) {
    let x0 = rect.x.round() as i64;
    let y0 = rect.y.round() as i64;
    let x1 = (rect.x + rect.width).round() as i64 - 1;
    let y1 = (rect.y + rect.height).round() as i64 - 1;
    for y in y0..=y1 {
        for x in x0..=x1 {
            put_pixel_checked(image, x, y, color);
        }
    }
}

pub(crate) fn draw_rect_outline(image: &mut RgbaImage, rect: &Rect, thickness: u32, color: Rgba<u8>) {
    let x0 = rect.x.round() as i64;
    let y0 = rect.y.round() as i64;
    let x1 = (rect.x + rect.width).round() as i64 - 1;
    let y1 = (rect.y + rect.height).round() as i64 - 1;
    if x1 < x0 || y1 < y0 {
        return;
    }
    for t in 0..thickness as i64 {
        for x in x0..=x1 {
            put_pixel_checked(image, x, y0 + t, color);
            put_pixel_checked(image, x, y1 - t, color);
        }
        for y in y0..=y1 {
            put_pixel_checked(image, x0 + t, y, color);
            put_pixel_checked(image, x1 - t, y, color);
        }
    }
}

pub(crate) fn draw_line(
    image: &mut RgbaImage,
    from: (f64, f64),
    to: (f64, f64),
    color: Rgba<u8>,
) {
    let mut x0 = from.0.round() as i64;
    let mut y0 = from.1.round() as i64;
    let x1 = to.0.round() as i64;
    let y1 = to.1.round() as i64;

    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        put_pixel_checked(image, x0, y0, color);
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
