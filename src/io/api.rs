// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! HTTP client for the comment persistence service.
//!
//! The service stores and queries feedback comments; the widget core
//! only ever fetches the comments for the current page and submits
//! assembled payloads. Both calls go through the [`PersistenceService`]
//! trait so tests and alternative backends can stand in for the HTTP
//! client.

use crate::models::comment::CommentRecord;
use crate::models::payload::FeedbackPayload;
use serde::Deserialize;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Submission/query failures. Non-fatal to widget state: composed
/// drafts stay in place and nothing is retried automatically.
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server returned {0}")]
    Status(reqwest::StatusCode),
    #[error("unexpected response body: {0}")]
    Decode(String),
}

/// Port to the external comment store.
pub trait PersistenceService {
    /// Comments recorded for the given page.
    fn fetch_comments(&self, project_id: &str, url: &str)
        -> Result<Vec<CommentRecord>, ApiError>;

    /// Store a submission; returns the persisted record.
    fn submit(&self, payload: &FeedbackPayload) -> Result<CommentRecord, ApiError>;
}

#[derive(Debug, Deserialize)]
struct CommentsEnvelope {
    #[serde(default)]
    comments: Vec<CommentRecord>,
}

#[derive(Debug, Deserialize)]
struct SubmitEnvelope {
    comment: CommentRecord,
}

/// Blocking HTTP implementation of the persistence port.
pub struct HttpPersistence {
    client: reqwest::blocking::Client,
    api_url: String,
}

impl HttpPersistence {
    /// Build a client against the service base URL.
    pub fn new(api_url: &str) -> Result<Self, ApiError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }
}

impl PersistenceService for HttpPersistence {
    fn fetch_comments(
        &self,
        project_id: &str,
        url: &str,
    ) -> Result<Vec<CommentRecord>, ApiError> {
        let response = self
            .client
            .get(format!("{}/comments", self.api_url))
            .query(&[("projectId", project_id), ("url", url)])
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status));
        }

        let envelope: CommentsEnvelope = response
            .json()
            .map_err(|err| ApiError::Decode(err.to_string()))?;
        Ok(envelope.comments)
    }

    fn submit(&self, payload: &FeedbackPayload) -> Result<CommentRecord, ApiError> {
        let response = self
            .client
            .post(format!("{}/comments", self.api_url))
            .json(payload)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status));
        }

        let envelope: SubmitEnvelope = response
            .json()
            .map_err(|err| ApiError::Decode(err.to_string()))?;
        Ok(envelope.comment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comments_envelope_tolerates_missing_list() {
        let envelope: CommentsEnvelope = serde_json::from_str("{}").unwrap();
        assert!(envelope.comments.is_empty());

        let envelope: CommentsEnvelope = serde_json::from_str(
            r#"{"comments": [{"comment": "looks off", "feedbackId": "fb-1"}]}"#,
        )
        .unwrap();
        assert_eq!(envelope.comments.len(), 1);
        assert_eq!(envelope.comments[0].comment, "looks off");
    }

    #[test]
    fn test_submit_envelope_unwraps_comment() {
        let envelope: SubmitEnvelope =
            serde_json::from_str(r#"{"comment": {"comment": "hi", "id": "c1"}}"#).unwrap();
        assert_eq!(envelope.comment.id.as_deref(), Some("c1"));
    }

    #[test]
    fn test_base_url_trailing_slash_normalized() {
        let client = HttpPersistence::new("https://api.example.com/").unwrap();
        assert_eq!(client.api_url, "https://api.example.com");
    }
}
