// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Submission payload assembly.
//!
//! A `CommentDraft` is what the compose form hands over; validation
//! happens here, before assembly, so a `FeedbackPayload` with empty
//! text can never exist. Assembly is a pure merge of the draft, the
//! optional locator/artifact, and freshly sampled environment
//! metadata; the result is immutable and submitted whole.

use crate::config::WidgetConfig;
use crate::document::tree::PageEnvironment;
use crate::models::artifact::CaptureArtifact;
use crate::models::locator::ElementLocator;
use crate::util::format::is_valid_email;
use crate::util::geometry::Size;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Fallback author name when the form leaves it blank.
pub const ANONYMOUS_NAME: &str = "Anonymous";

/// Draft validation failures, rejected before any network call.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("comment text must not be empty")]
    EmptyComment,
    #[error("invalid email address: {0}")]
    InvalidEmail(String),
    #[error("file attachments are disabled by configuration")]
    AttachmentsDisabled,
    #[error("attachment {file_name} is too large ({size_bytes} bytes, limit {max_bytes})")]
    AttachmentTooLarge {
        file_name: String,
        size_bytes: u64,
        max_bytes: u64,
    },
}

/// Descriptor of a file attached to a draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentInfo {
    pub file_name: String,
    pub size_bytes: u64,
    pub mime_type: String,
}

/// What the compose form collects before submission.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommentDraft {
    pub text: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub attachments: Vec<AttachmentInfo>,
}

impl CommentDraft {
    /// Create a draft holding only comment text.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Check the draft against the widget configuration.
    pub fn validate(&self, config: &WidgetConfig) -> Result<(), ValidationError> {
        if self.text.trim().is_empty() {
            return Err(ValidationError::EmptyComment);
        }

        if let Some(email) = self.email.as_deref() {
            if !email.is_empty() && !is_valid_email(email) {
                return Err(ValidationError::InvalidEmail(email.to_string()));
            }
        }

        if !self.attachments.is_empty() && !config.allow_file_upload {
            return Err(ValidationError::AttachmentsDisabled);
        }

        for attachment in &self.attachments {
            if attachment.size_bytes > config.max_file_size {
                return Err(ValidationError::AttachmentTooLarge {
                    file_name: attachment.file_name.clone(),
                    size_bytes: attachment.size_bytes,
                    max_bytes: config.max_file_size,
                });
            }
        }

        Ok(())
    }
}

/// Environment details sampled at submission time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub user_agent: String,
    pub viewport: Size,
    pub timestamp: String,
}

/// The complete, immutable submission body.
///
/// `screenshot` and `element` serialize as explicit nulls when absent;
/// the persistence service distinguishes "no capture" from a missing
/// field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackPayload {
    pub project_id: String,
    pub url: String,
    pub comment: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub screenshot: Option<String>,
    #[serde(default)]
    pub element: Option<ElementLocator>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<AttachmentInfo>,
    pub metadata: Metadata,
}

/// Merge a validated draft with the collected locator/artifact and the
/// page environment into a submission payload.
///
/// Callers validate the draft first; this function does not re-check.
pub fn assemble(
    config: &WidgetConfig,
    environment: &PageEnvironment,
    draft: &CommentDraft,
    locator: Option<&ElementLocator>,
    artifact: Option<&CaptureArtifact>,
    now: DateTime<Utc>,
) -> FeedbackPayload {
    let name = draft
        .name
        .as_deref()
        .filter(|n| !n.trim().is_empty())
        .unwrap_or(ANONYMOUS_NAME)
        .to_string();

    FeedbackPayload {
        project_id: config.project_id.clone(),
        url: environment.url.clone(),
        comment: draft.text.clone(),
        name,
        email: draft.email.clone().filter(|e| !e.is_empty()),
        screenshot: artifact.map(CaptureArtifact::to_data_url),
        element: locator.cloned(),
        attachments: draft.attachments.clone(),
        metadata: Metadata {
            user_agent: environment.user_agent.clone(),
            viewport: environment.viewport,
            timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn test_config() -> WidgetConfig {
        WidgetConfig {
            api_url: "https://api.example.com".to_string(),
            project_id: "proj-1".to_string(),
            ..WidgetConfig::default()
        }
    }

    fn test_environment() -> PageEnvironment {
        PageEnvironment {
            url: "https://example.com/page".to_string(),
            user_agent: "TestAgent/1.0".to_string(),
            viewport: Size::new(1280, 720),
        }
    }

    #[test]
    fn test_empty_text_rejected_after_trim() {
        let config = test_config();
        assert_eq!(
            CommentDraft::new("   \n\t ").validate(&config),
            Err(ValidationError::EmptyComment)
        );
        assert!(CommentDraft::new("hi").validate(&config).is_ok());
    }

    #[test]
    fn test_bad_email_rejected() {
        let config = test_config();
        let mut draft = CommentDraft::new("hi");
        draft.email = Some("not-an-email".to_string());
        assert!(matches!(
            draft.validate(&config),
            Err(ValidationError::InvalidEmail(_))
        ));
    }

    #[test]
    fn test_oversized_attachment_rejected() {
        let mut config = test_config();
        config.max_file_size = 1000;

        let mut draft = CommentDraft::new("hi");
        draft.attachments.push(AttachmentInfo {
            file_name: "big.png".to_string(),
            size_bytes: 2000,
            mime_type: "image/png".to_string(),
        });

        assert!(matches!(
            draft.validate(&config),
            Err(ValidationError::AttachmentTooLarge { .. })
        ));
    }

    #[test]
    fn test_attachments_rejected_when_disabled() {
        let mut config = test_config();
        config.allow_file_upload = false;

        let mut draft = CommentDraft::new("hi");
        draft.attachments.push(AttachmentInfo {
            file_name: "a.txt".to_string(),
            size_bytes: 10,
            mime_type: "text/plain".to_string(),
        });

        assert_eq!(
            draft.validate(&config),
            Err(ValidationError::AttachmentsDisabled)
        );
    }

    #[test]
    fn test_assemble_plain_comment() {
        let config = test_config();
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 30, 45).unwrap();

        let payload = assemble(
            &config,
            &test_environment(),
            &CommentDraft::new("hi"),
            None,
            None,
            now,
        );

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["projectId"], "proj-1");
        assert_eq!(json["comment"], "hi");
        assert_eq!(json["name"], "Anonymous");
        assert!(json["screenshot"].is_null());
        assert!(json["element"].is_null());
        assert_eq!(json["metadata"]["viewport"]["width"], 1280);
        assert_eq!(json["metadata"]["timestamp"], "2025-06-01T12:30:45.000Z");
    }

    #[test]
    fn test_assemble_keeps_provided_name() {
        let config = test_config();
        let mut draft = CommentDraft::new("hi");
        draft.name = Some("Ada".to_string());

        let payload = assemble(
            &config,
            &test_environment(),
            &draft,
            None,
            None,
            Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap(),
        );
        assert_eq!(payload.name, "Ada");
    }
}
