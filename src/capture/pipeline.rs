// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! The capture-and-annotation pipeline.
//!
//! Sequences the two capture phases: rasterize the page snapshot on a
//! worker thread (the controller polls for the result), then host the
//! raster in an annotation surface until the session is finished.
//! Capture failure is fatal to the operation; a failed flatten on
//! export degrades to the unannotated raster instead. Dropping the
//! pipeline mid-capture abandons the worker, whose late result is
//! discarded along with the channel.

use crate::capture::rasterizer::{CaptureError, CaptureOptions, Rasterizer};
use crate::capture::surface::AnnotationSurface;
use crate::document::tree::PageSnapshot;
use crate::models::artifact::{CaptureArtifact, RasterImage};
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;

/// Creates a fresh annotation surface for each capture session.
pub type SurfaceFactory = Rc<dyn Fn() -> Box<dyn AnnotationSurface>>;

enum Phase {
    Capturing(Receiver<Result<RasterImage, CaptureError>>),
    Ready {
        raster: RasterImage,
        surface: Option<Box<dyn AnnotationSurface>>,
    },
    Failed,
}

/// One capture session, from rasterization to artifact export.
pub struct CapturePipeline {
    phase: Phase,
    annotate: bool,
    make_surface: SurfaceFactory,
}

impl CapturePipeline {
    /// Start capturing the given snapshot on a worker thread.
    pub fn start(
        page: PageSnapshot,
        rasterizer: Arc<dyn Rasterizer>,
        annotate: bool,
        make_surface: SurfaceFactory,
    ) -> Self {
        let options = CaptureOptions::for_page(&page);
        let (sender, receiver) = mpsc::channel();

        thread::spawn(move || {
            let result = rasterizer.capture(&page, &options);
            // The session may have been cancelled; a dead channel just
            // swallows the result.
            let _ = sender.send(result);
        });

        Self {
            phase: Phase::Capturing(receiver),
            annotate,
            make_surface,
        }
    }

    /// Check whether the capture phase has resolved.
    ///
    /// Returns `None` while the worker is still running, `Some(Ok(()))`
    /// once the raster is ready (and loaded into a surface when
    /// annotation is enabled), or the capture error. A resolved
    /// pipeline keeps returning `None`.
    pub fn poll(&mut self) -> Option<Result<(), CaptureError>> {
        let result = match &self.phase {
            Phase::Capturing(receiver) => match receiver.try_recv() {
                Ok(result) => result,
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Disconnected) => Err(CaptureError::WorkerStopped),
            },
            _ => return None,
        };

        match result {
            Ok(raster) => {
                let surface = self.annotate.then(|| {
                    let mut surface = (self.make_surface)();
                    surface.load_background(raster.clone());
                    surface
                });
                self.phase = Phase::Ready { raster, surface };
                Some(Ok(()))
            }
            Err(err) => {
                self.phase = Phase::Failed;
                Some(Err(err))
            }
        }
    }

    pub fn is_capturing(&self) -> bool {
        matches!(self.phase, Phase::Capturing(_))
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.phase, Phase::Ready { .. })
    }

    /// The annotation surface, once the raster is loaded and when
    /// annotation is enabled.
    pub fn surface_mut(&mut self) -> Option<&mut dyn AnnotationSurface> {
        match &mut self.phase {
            Phase::Ready {
                surface: Some(surface),
                ..
            } => Some(surface.as_mut()),
            _ => None,
        }
    }

    /// Close the session and export the artifact.
    ///
    /// With no surface (annotation disabled) or an empty overlay the
    /// raw raster is returned unannotated. With elements on the
    /// overlay the flattened export is used; if flattening fails the
    /// raw raster is kept instead of failing the whole operation.
    pub fn finish(self) -> Result<CaptureArtifact, CaptureError> {
        let Phase::Ready { raster, surface } = self.phase else {
            return Err(CaptureError::NotReady);
        };

        if let Some(surface) = surface {
            if surface.element_count() > 0 {
                match surface.export_flattened() {
                    Ok(flattened) => return Ok(CaptureArtifact::from_raster(&flattened, true)?),
                    Err(err) => {
                        log::error!("Failed to export annotations: {}", err);
                    }
                }
            }
        }

        Ok(CaptureArtifact::from_raster(&raster, false)?)
    }
}
