// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Widget configuration.
//!
//! The embedding host owns the configuration; the core only consumes
//! it. Flags gate which modes of the state machine are reachable:
//! screenshot capture, the annotation layer, and file attachments can
//! each be disabled independently. Configuration can come from code,
//! from query-string pairs on the embed tag, or from a YAML/JSON file.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default attachment size limit (5 MiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 5_242_880;

/// Configuration rejected at initialization.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("apiUrl is required")]
    MissingApiUrl,
    #[error("projectId is required")]
    MissingProjectId,
}

/// Screen corner the widget anchors to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Position {
    #[default]
    BottomRight,
    BottomLeft,
    TopRight,
    TopLeft,
}

impl Position {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "bottom-right" => Some(Self::BottomRight),
            "bottom-left" => Some(Self::BottomLeft),
            "top-right" => Some(Self::TopRight),
            "top-left" => Some(Self::TopLeft),
            _ => None,
        }
    }
}

/// Display theme hint passed through to the display layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }
}

/// Host-supplied widget configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WidgetConfig {
    pub api_url: String,
    pub project_id: String,
    pub position: Position,
    pub theme: Theme,
    pub language: String,
    pub allow_screenshot: bool,
    pub allow_annotation: bool,
    pub allow_file_upload: bool,
    pub max_file_size: u64,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            project_id: String::new(),
            position: Position::default(),
            theme: Theme::default(),
            language: "en".to_string(),
            allow_screenshot: true,
            allow_annotation: true,
            allow_file_upload: true,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl WidgetConfig {
    /// Check the required fields are present.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_url.is_empty() {
            return Err(ConfigError::MissingApiUrl);
        }
        if self.project_id.is_empty() {
            return Err(ConfigError::MissingProjectId);
        }
        Ok(())
    }

    /// Build a config from embed-tag query pairs.
    ///
    /// Recognizes the historical short and long key forms
    /// (`api`/`apiUrl`, `project`/`projectId`) plus `position` and
    /// `theme`; unknown keys are ignored.
    pub fn from_query_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut config = Self::default();
        for (key, value) in pairs {
            match key {
                "api" | "apiUrl" => config.api_url = value.to_string(),
                "project" | "projectId" => config.project_id = value.to_string(),
                "position" => {
                    if let Some(position) = Position::parse(value) {
                        config.position = position;
                    }
                }
                "theme" => {
                    if let Some(theme) = Theme::parse(value) {
                        config.theme = theme;
                    }
                }
                _ => {}
            }
        }
        config
    }

    /// Load a config file, YAML or JSON by extension.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let extension = path.extension().and_then(|s| s.to_str());
        let config = match extension {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&text)?,
            Some("json") => serde_json::from_str(&text)?,
            _ => anyhow::bail!("Unsupported config extension: {:?}", extension),
        };
        Ok(config)
    }
}

/// Page-load parameters requesting the widget to surface a comment.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DeepLink {
    pub should_activate: bool,
    pub feedback_id: Option<String>,
}

impl DeepLink {
    /// Parse a page query string (`feedback=true&feedbackID=<id>`).
    pub fn from_query(query: &str) -> Self {
        let mut link = Self::default();
        for (key, value) in parse_query(query) {
            match key {
                "feedback" => link.should_activate = value == "true",
                "feedbackID" | "feedbackId" => {
                    if !value.is_empty() {
                        link.feedback_id = Some(value.to_string());
                    }
                }
                _ => {}
            }
        }
        link
    }
}

/// Split a query string into key/value pairs. No percent decoding;
/// the keys this module cares about never need it.
fn parse_query(query: &str) -> impl Iterator<Item = (&str, &str)> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) => (key, value),
            None => (pair, ""),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_widget_conventions() {
        let config = WidgetConfig::default();
        assert_eq!(config.position, Position::BottomRight);
        assert_eq!(config.theme, Theme::Light);
        assert_eq!(config.language, "en");
        assert!(config.allow_screenshot);
        assert!(config.allow_annotation);
        assert!(config.allow_file_upload);
        assert_eq!(config.max_file_size, 5_242_880);
    }

    #[test]
    fn test_validate_requires_api_url_and_project() {
        let mut config = WidgetConfig::default();
        assert_eq!(config.validate(), Err(ConfigError::MissingApiUrl));

        config.api_url = "https://api.example.com".to_string();
        assert_eq!(config.validate(), Err(ConfigError::MissingProjectId));

        config.project_id = "proj-1".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_query_pairs_short_and_long_keys() {
        let config = WidgetConfig::from_query_pairs([
            ("api", "https://api.example.com"),
            ("project", "proj-1"),
            ("position", "top-left"),
            ("theme", "dark"),
            ("ignored", "x"),
        ]);
        assert_eq!(config.api_url, "https://api.example.com");
        assert_eq!(config.project_id, "proj-1");
        assert_eq!(config.position, Position::TopLeft);
        assert_eq!(config.theme, Theme::Dark);

        let config = WidgetConfig::from_query_pairs([("apiUrl", "a"), ("projectId", "p")]);
        assert_eq!(config.api_url, "a");
        assert_eq!(config.project_id, "p");
    }

    #[test]
    fn test_config_deserializes_camel_case() {
        let config: WidgetConfig = serde_json::from_str(
            r#"{
                "apiUrl": "https://api.example.com",
                "projectId": "proj-1",
                "position": "bottom-left",
                "allowScreenshot": false,
                "maxFileSize": 1024
            }"#,
        )
        .unwrap();
        assert_eq!(config.position, Position::BottomLeft);
        assert!(!config.allow_screenshot);
        assert_eq!(config.max_file_size, 1024);
        // Unspecified fields keep their defaults.
        assert!(config.allow_annotation);
    }

    #[test]
    fn test_deep_link_parsing() {
        let link = DeepLink::from_query("?feedback=true&feedbackID=fb-42");
        assert!(link.should_activate);
        assert_eq!(link.feedback_id.as_deref(), Some("fb-42"));

        let link = DeepLink::from_query("feedback=true&feedbackId=fb-7");
        assert_eq!(link.feedback_id.as_deref(), Some("fb-7"));

        let link = DeepLink::from_query("utm_source=mail");
        assert!(!link.should_activate);
        assert!(link.feedback_id.is_none());

        let link = DeepLink::from_query("feedback=false&feedbackID=fb-1");
        assert!(!link.should_activate);
    }
}
