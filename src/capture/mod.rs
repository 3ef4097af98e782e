// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Page capture and annotation: the rasterizer and annotation-surface
//! ports, their built-in implementations, and the pipeline that
//! sequences them into a capture artifact.

pub mod pipeline;
pub mod rasterizer;
pub mod surface;

pub use pipeline::{CapturePipeline, SurfaceFactory};
pub use rasterizer::{CaptureError, CaptureOptions, Rasterizer, WireframeRasterizer};
pub use surface::{AnnotationSurface, ExportError, Sketch, SketchKind, SketchSurface};
