// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main widget state machine.
//!
//! This module contains the mode controller that coordinates the
//! capture flows: which mode is active, what has been collected so
//! far, and when the targeting engine and capture pipeline are
//! attached or torn down. It is the single owner of the picked
//! locator and the capture artifact; the display layer drives it
//! through these methods and drains `WidgetEvent`s to know what to
//! show.

use crate::capture::pipeline::{CapturePipeline, SurfaceFactory};
use crate::capture::rasterizer::{Rasterizer, WireframeRasterizer};
use crate::capture::surface::{AnnotationSurface, SketchSurface};
use crate::config::{DeepLink, WidgetConfig};
use crate::document::events::PointerEvent;
use crate::document::tree::Document;
use crate::io::api::{ApiError, HttpPersistence, PersistenceService};
use crate::models::artifact::CaptureArtifact;
use crate::models::comment::CommentRecord;
use crate::models::locator::ElementLocator;
use crate::models::payload::{self, CommentDraft, ValidationError};
use crate::selector::engine::{TargetingAction, TargetingEngine};
use crate::selector::path::resolve_locator;
use chrono::Utc;
use std::rc::Rc;
use std::sync::Arc;

/// Capture flow the user can choose once the widget is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Design,
    Screenshot,
    Comment,
}

/// Exclusive widget state. Exactly one is active at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeState {
    Idle,
    SelectingMode,
    DesignSelect,
    ScreenshotCapture,
    ComposeComment,
}

/// Notifications for the display layer, drained with
/// [`FeedbackApp::take_events`].
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetEvent {
    /// Design mode was entered for the first time.
    OnboardingRequested,
    /// Page capture failed; the session was reset.
    CaptureFailed(String),
    /// Submission failed; the composed state is retained.
    SubmissionFailed(String),
    /// A deep link asked to surface this comment.
    FocusComment(String),
}

/// Why a submission was not stored.
#[derive(thiserror::Error, Debug)]
pub enum SubmitError {
    #[error("no comment is being composed")]
    NotComposing,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// The replaceable capabilities the controller drives.
pub struct WidgetPorts {
    pub rasterizer: Arc<dyn Rasterizer>,
    pub make_surface: SurfaceFactory,
    pub persistence: Box<dyn PersistenceService>,
}

impl WidgetPorts {
    /// Built-in implementations: wireframe rasterizer, sketch surface,
    /// HTTP persistence against the configured service.
    pub fn with_defaults(config: &WidgetConfig) -> Result<Self, ApiError> {
        Ok(Self {
            rasterizer: Arc::new(WireframeRasterizer::default()),
            make_surface: Rc::new(|| Box::new(SketchSurface::new()) as Box<dyn AnnotationSurface>),
            persistence: Box::new(HttpPersistence::new(&config.api_url)?),
        })
    }
}

/// The widget mode controller.
pub struct FeedbackApp {
    config: WidgetConfig,
    state: ModeState,

    /// Element picked in design mode, if any.
    locator: Option<ElementLocator>,

    /// Capture produced in screenshot mode, if any.
    artifact: Option<CaptureArtifact>,

    /// Active element-selection session.
    engine: Option<TargetingEngine>,

    /// Active capture session.
    pipeline: Option<CapturePipeline>,

    /// Comments recorded for this page, newest last.
    comments: Vec<CommentRecord>,

    /// Pending notifications for the display layer.
    events: Vec<WidgetEvent>,

    onboarding_seen: bool,
    sidebar_open: bool,

    ports: WidgetPorts,
}

impl FeedbackApp {
    /// Create an idle controller with the given capabilities.
    pub fn new(config: WidgetConfig, ports: WidgetPorts) -> Self {
        Self {
            config,
            state: ModeState::Idle,
            locator: None,
            artifact: None,
            engine: None,
            pipeline: None,
            comments: Vec::new(),
            events: Vec::new(),
            onboarding_seen: false,
            sidebar_open: false,
            ports,
        }
    }

    pub fn state(&self) -> ModeState {
        self.state
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    pub fn locator(&self) -> Option<&ElementLocator> {
        self.locator.as_ref()
    }

    pub fn artifact(&self) -> Option<&CaptureArtifact> {
        self.artifact.as_ref()
    }

    pub fn comments(&self) -> &[CommentRecord] {
        &self.comments
    }

    pub fn sidebar_open(&self) -> bool {
        self.sidebar_open
    }

    /// Drain pending display-layer notifications.
    pub fn take_events(&mut self) -> Vec<WidgetEvent> {
        std::mem::take(&mut self.events)
    }

    /// Open the mode selector.
    pub fn activate(&mut self) {
        if self.state != ModeState::Idle {
            log::warn!("activate ignored in state {:?}", self.state);
            return;
        }
        self.state = ModeState::SelectingMode;
        log::info!("Widget activated");
    }

    /// Start the chosen capture flow.
    pub fn select_mode(&mut self, mode: Mode, doc: &mut Document) {
        if self.state != ModeState::SelectingMode {
            log::warn!("select_mode ignored in state {:?}", self.state);
            return;
        }

        match mode {
            Mode::Design => {
                self.engine = Some(TargetingEngine::attach(doc));
                self.state = ModeState::DesignSelect;
                if !self.onboarding_seen {
                    self.events.push(WidgetEvent::OnboardingRequested);
                }
                log::info!("Entered design select mode");
            }
            Mode::Screenshot => {
                if !self.config.allow_screenshot {
                    log::warn!("Screenshot capture is disabled by configuration");
                    return;
                }
                self.pipeline = Some(CapturePipeline::start(
                    doc.snapshot(),
                    Arc::clone(&self.ports.rasterizer),
                    self.config.allow_annotation,
                    Rc::clone(&self.ports.make_surface),
                ));
                self.state = ModeState::ScreenshotCapture;
                log::info!("Entered screenshot capture mode");
            }
            Mode::Comment => {
                self.state = ModeState::ComposeComment;
                log::info!("Entered comment composition");
            }
        }
    }

    /// The display layer confirmed the onboarding was seen; it will
    /// not be requested again for this instance.
    pub fn acknowledge_onboarding(&mut self) {
        self.onboarding_seen = true;
    }

    /// Route a pointer event to the targeting engine.
    ///
    /// Outside design-select mode events fall through to the page.
    pub fn pointer_event(&mut self, doc: &mut Document, event: &PointerEvent) {
        if self.state != ModeState::DesignSelect {
            return;
        }
        let action = match self.engine.as_mut() {
            Some(engine) => engine.handle_event(doc, event),
            None => return,
        };

        if let TargetingAction::ElementPicked(locator) = action {
            if let Some(engine) = self.engine.take() {
                engine.detach(doc);
            }
            self.locator = Some(locator);
            self.state = ModeState::ComposeComment;
        }
    }

    /// Check on an in-flight capture.
    ///
    /// On failure the session resets to idle and a single
    /// [`WidgetEvent::CaptureFailed`] is emitted.
    pub fn poll(&mut self) {
        if self.state != ModeState::ScreenshotCapture {
            return;
        }
        let outcome = match self.pipeline.as_mut() {
            Some(pipeline) => pipeline.poll(),
            None => None,
        };

        match outcome {
            Some(Ok(())) => log::info!("Page capture ready"),
            Some(Err(err)) => {
                log::error!("Failed to capture page: {}", err);
                self.pipeline = None;
                self.state = ModeState::Idle;
                self.events.push(WidgetEvent::CaptureFailed(err.to_string()));
            }
            None => {}
        }
    }

    /// Whether the capture phase has a raster ready to annotate.
    pub fn capture_ready(&self) -> bool {
        self.pipeline.as_ref().is_some_and(CapturePipeline::is_ready)
    }

    /// The annotation surface of the running capture session.
    pub fn annotation_surface_mut(&mut self) -> Option<&mut dyn AnnotationSurface> {
        if self.state != ModeState::ScreenshotCapture {
            return None;
        }
        self.pipeline.as_mut().and_then(CapturePipeline::surface_mut)
    }

    /// Close the capture session and keep its artifact.
    pub fn finish_capture(&mut self) {
        if self.state != ModeState::ScreenshotCapture {
            log::warn!("finish_capture ignored in state {:?}", self.state);
            return;
        }
        let Some(pipeline) = self.pipeline.take() else {
            return;
        };
        if pipeline.is_capturing() {
            log::warn!("finish_capture ignored while capture is in flight");
            self.pipeline = Some(pipeline);
            return;
        }

        match pipeline.finish() {
            Ok(artifact) => {
                log::info!(
                    "Capture finished ({} bytes, annotated: {})",
                    artifact.image_data.len(),
                    artifact.has_annotations
                );
                self.artifact = Some(artifact);
                self.state = ModeState::ComposeComment;
            }
            Err(err) => {
                log::error!("Failed to export capture: {}", err);
                self.state = ModeState::Idle;
                self.events.push(WidgetEvent::CaptureFailed(err.to_string()));
            }
        }
    }

    /// Abort whatever is in progress and return to idle.
    ///
    /// Accepted in every state; collected locator/artifact state is
    /// discarded and any attached engine is torn down. An in-flight
    /// capture is not interrupted, its result is simply discarded.
    pub fn cancel(&mut self, doc: &mut Document) {
        if self.state == ModeState::Idle {
            return;
        }
        if let Some(engine) = self.engine.take() {
            engine.detach(doc);
        }
        self.pipeline = None;
        self.locator = None;
        self.artifact = None;
        self.state = ModeState::Idle;
        log::info!("Widget session cancelled");
    }

    /// Validate, assemble and submit the composed feedback.
    ///
    /// On success the stored record joins the local comment list and
    /// the widget resets to idle. On failure everything composed so
    /// far stays in place; there is no automatic retry.
    pub fn submit(&mut self, doc: &Document, draft: &CommentDraft) -> Result<(), SubmitError> {
        if self.state != ModeState::ComposeComment {
            return Err(SubmitError::NotComposing);
        }

        draft.validate(&self.config)?;

        let environment = doc.environment();
        let submitted = payload::assemble(
            &self.config,
            &environment,
            draft,
            self.locator.as_ref(),
            self.artifact.as_ref(),
            Utc::now(),
        );

        match self.ports.persistence.submit(&submitted) {
            Ok(record) => {
                log::info!("Feedback submitted for {}", submitted.url);
                self.comments.push(record);
                self.locator = None;
                self.artifact = None;
                self.state = ModeState::Idle;
                Ok(())
            }
            Err(err) => {
                log::error!("Failed to submit comment: {}", err);
                self.events
                    .push(WidgetEvent::SubmissionFailed(err.to_string()));
                Err(err.into())
            }
        }
    }

    /// Refresh the comment list for the current page. Non-fatal on
    /// error: the existing list is kept.
    pub fn load_comments(&mut self, doc: &Document) {
        match self
            .ports
            .persistence
            .fetch_comments(&self.config.project_id, doc.url())
        {
            Ok(comments) => {
                log::info!("Loaded {} comments", comments.len());
                self.comments = comments;
            }
            Err(err) => log::error!("Failed to load comments: {}", err),
        }
    }

    pub fn toggle_sidebar(&mut self) {
        self.sidebar_open = !self.sidebar_open;
    }

    /// Apply page-load deep-link parameters: open the sidebar and ask
    /// the display layer to focus the referenced comment.
    pub fn apply_deep_link(&mut self, link: &DeepLink) {
        if !link.should_activate {
            return;
        }
        self.sidebar_open = true;
        if let Some(feedback_id) = &link.feedback_id {
            self.events
                .push(WidgetEvent::FocusComment(feedback_id.clone()));
        }
    }

    /// Scroll the page to the element a stored comment points at.
    ///
    /// Best effort: the locator may no longer resolve if the page
    /// changed since the comment was recorded.
    pub fn scroll_to_comment(&self, doc: &mut Document, feedback_id: &str) -> bool {
        let locator = self
            .comments
            .iter()
            .find(|c| c.matches_feedback_id(feedback_id))
            .and_then(|c| c.element.as_ref());

        let Some(locator) = locator else {
            log::warn!("Feedback {} not found on this page", feedback_id);
            return false;
        };
        match resolve_locator(doc, locator) {
            Some(node) => {
                doc.scroll_to_element(node);
                true
            }
            None => {
                log::warn!("Feedback {} no longer resolves to an element", feedback_id);
                false
            }
        }
    }

    /// Tear the controller down completely, releasing any engine
    /// resources. Equivalent to cancelling from any state.
    pub fn teardown(&mut self, doc: &mut Document) {
        self.cancel(doc);
    }
}
