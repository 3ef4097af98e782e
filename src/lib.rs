// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! PINS - Page Inspection and Notation System
//!
//! An embeddable engine for element-targeted page feedback: pick an
//! on-page element and derive a re-resolvable locator for it, capture
//! a raster of the full page and draw annotations over it, then attach
//! either to a text comment and submit the result to a persistence
//! service.
//!
//! The crate is display-agnostic. The embedding host mirrors its page
//! into a [`Document`], forwards pointer events, renders whatever the
//! current [`ModeState`] calls for, and drains [`WidgetEvent`]s. The
//! rasterizer, annotation surface, and persistence backend are
//! capability ports with working built-in implementations.
//!
//! Hosts that want a single widget per process can use the module
//! level [`init`]/[`with_widget`]/[`destroy`] lifecycle; everything
//! also works with plainly owned [`FeedbackApp`] values.

pub mod app;
pub mod capture;
pub mod config;
pub mod document;
pub mod io;
pub mod models;
pub mod selector;
pub mod util;

pub use app::{FeedbackApp, Mode, ModeState, SubmitError, WidgetEvent, WidgetPorts};
pub use capture::{AnnotationSurface, CapturePipeline, Rasterizer, Sketch, SketchKind};
pub use config::{ConfigError, DeepLink, Position, Theme, WidgetConfig};
pub use document::{Document, ElementSpec, PointerEvent};
pub use io::PersistenceService;
pub use models::artifact::CaptureArtifact;
pub use models::locator::ElementLocator;
pub use models::payload::{CommentDraft, FeedbackPayload};

use crate::io::api::ApiError;
use std::cell::RefCell;

thread_local! {
    // One instance per UI thread; the engine is single-threaded by
    // design and the widget lives on the thread that owns the page.
    static WIDGET: RefCell<Option<FeedbackApp>> = const { RefCell::new(None) };
}

/// Why the widget singleton could not be installed.
#[derive(thiserror::Error, Debug)]
pub enum InitError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("widget is already initialized; call destroy first")]
    AlreadyInitialized,
}

/// Install the process-wide widget with default ports.
///
/// Validates the configuration first; re-initializing without a prior
/// [`destroy`] is an error.
pub fn init(config: WidgetConfig) -> Result<(), InitError> {
    config.validate()?;
    let ports = WidgetPorts::with_defaults(&config)?;
    init_with_ports(config, ports)
}

/// Install the process-wide widget with custom ports.
pub fn init_with_ports(config: WidgetConfig, ports: WidgetPorts) -> Result<(), InitError> {
    config.validate()?;
    WIDGET.with(|slot| {
        let mut slot = slot.borrow_mut();
        if slot.is_some() {
            return Err(InitError::AlreadyInitialized);
        }
        *slot = Some(FeedbackApp::new(config, ports));
        log::info!("Feedback widget initialized");
        Ok(())
    })
}

/// Whether the singleton is currently installed.
pub fn is_initialized() -> bool {
    WIDGET.with(|slot| slot.borrow().is_some())
}

/// Run `f` against the installed widget, if any.
pub fn with_widget<R>(f: impl FnOnce(&mut FeedbackApp) -> R) -> Option<R> {
    WIDGET.with(|slot| slot.borrow_mut().as_mut().map(f))
}

/// Tear the singleton down completely, cancelling any active mode so
/// listeners and outlines are released. Returns whether a widget was
/// installed. A later [`init`] is valid again afterwards.
pub fn destroy(doc: &mut Document) -> bool {
    WIDGET.with(|slot| {
        let mut slot = slot.borrow_mut();
        match slot.take() {
            Some(mut widget) => {
                widget.teardown(doc);
                log::info!("Feedback widget destroyed");
                true
            }
            None => false,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::geometry::Size;

    fn valid_config() -> WidgetConfig {
        WidgetConfig {
            api_url: "https://api.example.com".to_string(),
            project_id: "proj-1".to_string(),
            ..WidgetConfig::default()
        }
    }

    #[test]
    fn test_init_rejects_incomplete_config() {
        let result = init(WidgetConfig::default());
        assert!(matches!(
            result,
            Err(InitError::Config(ConfigError::MissingApiUrl))
        ));
        assert!(!is_initialized());
    }

    #[test]
    fn test_singleton_lifecycle() {
        let mut doc = Document::new("https://example.com", "TestAgent/1.0", Size::new(800, 600));

        init(valid_config()).unwrap();
        assert!(is_initialized());

        // Double init is rejected while installed.
        assert!(matches!(
            init(valid_config()),
            Err(InitError::AlreadyInitialized)
        ));

        with_widget(|widget| widget.activate()).unwrap();
        assert_eq!(
            with_widget(|widget| widget.state()),
            Some(ModeState::SelectingMode)
        );

        assert!(destroy(&mut doc));
        assert!(!is_initialized());
        assert!(!destroy(&mut doc));

        // Re-init after destroy is supported.
        init(valid_config()).unwrap();
        assert!(destroy(&mut doc));
    }
}
