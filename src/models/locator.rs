// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Element locator data structure.
//!
//! A locator is a structural description of a page element captured at
//! selection time: selectors that can re-find it, a text preview for
//! display, and its viewport geometry. Locators are immutable once
//! produced and make no guarantee of re-resolving to the same node if
//! the page mutates afterwards.

use crate::util::geometry::Rect;
use serde::{Deserialize, Serialize};

/// A structural description of a selected page element.
///
/// `bounding_rect` is viewport-relative and sampled once at selection
/// time; it is not invalidated by later scrolling or reflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementLocator {
    pub tag_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
    pub css_selector: String,
    pub xpath: String,
    pub text_preview: String,
    pub bounding_rect: Rect,
}
