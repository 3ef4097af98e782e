// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! The annotation surface capability port.
//!
//! A surface hosts an editable vector overlay seeded with a raster
//! background and exports a flattened image combining both. The
//! built-in [`SketchSurface`] keeps plain sketch shapes (rectangles,
//! lines, arrows, freehand strokes) and rasterizes them over the
//! background on export. Hosts wrapping a richer drawing library
//! implement [`AnnotationSurface`] over it instead.

use crate::capture::rasterizer::{draw_line, draw_rect_outline};
use crate::models::artifact::RasterImage;
use crate::util::geometry::{Point, Rect};
use image::Rgba;
use serde::{Deserialize, Serialize};

/// Default sketch stroke color.
pub const DEFAULT_SKETCH_COLOR: [u8; 4] = [229, 57, 53, 255];

/// Length in pixels of an arrow head flank.
const ARROW_HEAD_LEN: f64 = 12.0;

/// Why flattening failed. Non-fatal: callers fall back to the raw
/// capture.
#[derive(thiserror::Error, Debug)]
pub enum ExportError {
    #[error("no background raster loaded")]
    NoBackground,
    #[error("flatten failed: {0}")]
    Flatten(String),
}

/// Shape of a sketch element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SketchKind {
    Rect,
    Line,
    Arrow,
    Freehand,
}

/// One vector element on the annotation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sketch {
    pub kind: SketchKind,
    pub vertices: Vec<Point>,
    pub color: [u8; 4],
}

impl Sketch {
    /// Create an empty sketch of the given kind.
    pub fn new(kind: SketchKind) -> Self {
        Self {
            kind,
            vertices: Vec::new(),
            color: DEFAULT_SKETCH_COLOR,
        }
    }

    pub fn with_color(mut self, color: [u8; 4]) -> Self {
        self.color = color;
        self
    }

    /// Add a vertex, in raster pixel coordinates.
    pub fn add_vertex(&mut self, point: Point) {
        self.vertices.push(point);
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }
}

/// Editable vector overlay over a raster background.
pub trait AnnotationSurface {
    /// Seed the surface with the captured raster.
    fn load_background(&mut self, raster: RasterImage);

    /// Add one vector element to the overlay.
    fn add_element(&mut self, sketch: Sketch);

    /// Number of vector elements currently on the overlay.
    fn element_count(&self) -> usize;

    /// Flatten overlay and background into a single raster.
    fn export_flattened(&self) -> Result<RasterImage, ExportError>;
}

/// Built-in surface drawing sketches straight into the raster.
#[derive(Default)]
pub struct SketchSurface {
    background: Option<RasterImage>,
    elements: Vec<Sketch>,
}

impl SketchSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn elements(&self) -> &[Sketch] {
        &self.elements
    }
}

impl AnnotationSurface for SketchSurface {
    fn load_background(&mut self, raster: RasterImage) {
        self.background = Some(raster);
    }

    fn add_element(&mut self, sketch: Sketch) {
        self.elements.push(sketch);
    }

    fn element_count(&self) -> usize {
        self.elements.len()
    }

    fn export_flattened(&self) -> Result<RasterImage, ExportError> {
        let background = self.background.as_ref().ok_or(ExportError::NoBackground)?;
        let mut image = background
            .to_rgba()
            .ok_or_else(|| ExportError::Flatten("background buffer mismatch".to_string()))?;

        for sketch in &self.elements {
            if sketch.vertex_count() < 2 {
                log::debug!("Skipping degenerate sketch with {} vertices", sketch.vertex_count());
                continue;
            }
            let color = Rgba(sketch.color);
            match sketch.kind {
                SketchKind::Rect => {
                    let rect = bounding_rect(&sketch.vertices);
                    draw_rect_outline(&mut image, &rect, 2, color);
                }
                SketchKind::Line | SketchKind::Freehand => {
                    draw_polyline(&mut image, &sketch.vertices, color);
                }
                SketchKind::Arrow => {
                    draw_polyline(&mut image, &sketch.vertices, color);
                    draw_arrow_head(&mut image, &sketch.vertices, color);
                }
            }
        }

        Ok(RasterImage::from_rgba(image))
    }
}

fn bounding_rect(vertices: &[Point]) -> Rect {
    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for point in vertices {
        min_x = min_x.min(point.x);
        min_y = min_y.min(point.y);
        max_x = max_x.max(point.x);
        max_y = max_y.max(point.y);
    }
    Rect::new(min_x, min_y, max_x - min_x, max_y - min_y)
}

fn draw_polyline(image: &mut image::RgbaImage, vertices: &[Point], color: Rgba<u8>) {
    for pair in vertices.windows(2) {
        draw_line(
            image,
            (pair[0].x, pair[0].y),
            (pair[1].x, pair[1].y),
            color,
        );
    }
}

fn draw_arrow_head(image: &mut image::RgbaImage, vertices: &[Point], color: Rgba<u8>) {
    let tip = vertices[vertices.len() - 1];
    let tail = vertices[vertices.len() - 2];
    let angle = (tip.y - tail.y).atan2(tip.x - tail.x);

    for flank in [angle + 2.6, angle - 2.6] {
        let end = (
            tip.x + ARROW_HEAD_LEN * flank.cos(),
            tip.y + ARROW_HEAD_LEN * flank.sin(),
        );
        draw_line(image, (tip.x, tip.y), end, color);
    }
}
