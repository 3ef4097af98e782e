// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Raster buffers and capture artifacts.
//!
//! `RasterImage` is the plain RGBA pixel buffer passed between the
//! rasterizer, the annotation surface, and the export step.
//! `CaptureArtifact` is the encoded result of a capture session as it
//! travels toward submission.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{ImageBuffer, ImageFormat, RgbaImage};
use std::io::Cursor;

/// Error produced while encoding a raster into an artifact.
#[derive(thiserror::Error, Debug)]
pub enum EncodeError {
    #[error("raster buffer does not match its declared dimensions")]
    BufferMismatch,
    #[error("png encoding failed: {0}")]
    Png(#[from] image::ImageError),
}

/// An uncompressed RGBA8 pixel buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl RasterImage {
    /// Create an image of the given size filled with a solid color.
    pub fn filled(width: u32, height: u32, color: [u8; 4]) -> Self {
        let mut pixels = Vec::with_capacity(width as usize * height as usize * 4);
        for _ in 0..(width as usize * height as usize) {
            pixels.extend_from_slice(&color);
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Wrap an existing RGBA buffer.
    pub fn from_rgba(buffer: RgbaImage) -> Self {
        let (width, height) = buffer.dimensions();
        Self {
            width,
            height,
            pixels: buffer.into_raw(),
        }
    }

    /// View the buffer as an `image` crate buffer for pixel operations.
    pub fn to_rgba(&self) -> Option<RgbaImage> {
        ImageBuffer::from_raw(self.width, self.height, self.pixels.clone())
    }

    /// Encode the buffer as PNG bytes.
    pub fn to_png(&self) -> Result<Vec<u8>, EncodeError> {
        let buffer = self.to_rgba().ok_or(EncodeError::BufferMismatch)?;
        let mut bytes = Vec::new();
        buffer.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }
}

/// The encoded raster produced by a capture session.
///
/// A re-capture produces a new artifact; existing artifacts are never
/// mutated in place.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureArtifact {
    pub image_data: Vec<u8>,
    pub mime_type: String,
    pub has_annotations: bool,
}

impl CaptureArtifact {
    /// Encode a raster into a PNG artifact.
    pub fn from_raster(raster: &RasterImage, has_annotations: bool) -> Result<Self, EncodeError> {
        Ok(Self {
            image_data: raster.to_png()?,
            mime_type: "image/png".to_string(),
            has_annotations,
        })
    }

    /// Render the artifact as a `data:` URL for the wire payload.
    pub fn to_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime_type,
            STANDARD.encode(&self.image_data)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_png_roundtrip_dimensions() {
        let raster = RasterImage::filled(4, 3, [255, 0, 0, 255]);
        let png = raster.to_png().unwrap();

        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!(decoded.width(), 4);
        assert_eq!(decoded.height(), 3);
    }

    #[test]
    fn test_data_url_prefix() {
        let raster = RasterImage::filled(2, 2, [0, 0, 0, 255]);
        let artifact = CaptureArtifact::from_raster(&raster, false).unwrap();

        let url = artifact.to_data_url();
        assert!(url.starts_with("data:image/png;base64,"));
        assert!(url.len() > "data:image/png;base64,".len());
    }

    #[test]
    fn test_identical_rasters_encode_identically() {
        let a = RasterImage::filled(8, 8, [10, 20, 30, 255]);
        let b = a.clone();
        assert_eq!(a.to_png().unwrap(), b.to_png().unwrap());
    }

    #[test]
    fn test_buffer_mismatch_rejected() {
        let broken = RasterImage {
            width: 10,
            height: 10,
            pixels: vec![0; 12],
        };
        assert!(matches!(broken.to_png(), Err(EncodeError::BufferMismatch)));
    }
}
