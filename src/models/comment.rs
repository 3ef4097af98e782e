// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Persisted comment records as returned by the persistence service.

use crate::models::locator::ElementLocator;
use crate::models::payload::Metadata;
use serde::{Deserialize, Serialize};

/// A stored comment, deserialized leniently since older records may
/// predate some fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback_id: Option<String>,
    pub comment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<ElementLocator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl CommentRecord {
    /// Whether this record answers to the given deep-link feedback id.
    pub fn matches_feedback_id(&self, feedback_id: &str) -> bool {
        self.feedback_id.as_deref() == Some(feedback_id)
            || self.id.as_deref() == Some(feedback_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserializes_minimal_record() {
        let record: CommentRecord =
            serde_json::from_str(r#"{"comment": "old comment"}"#).unwrap();
        assert_eq!(record.comment, "old comment");
        assert!(record.id.is_none());
        assert!(record.element.is_none());
    }

    #[test]
    fn test_matches_either_id_field() {
        let record: CommentRecord =
            serde_json::from_str(r#"{"comment": "c", "id": "abc", "feedbackId": "fb-9"}"#)
                .unwrap();
        assert!(record.matches_feedback_id("fb-9"));
        assert!(record.matches_feedback_id("abc"));
        assert!(!record.matches_feedback_id("other"));
    }
}
