// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Element targeting: locator derivation and the pointer-driven
//! selection engine.

pub mod engine;
pub mod path;

pub use engine::{TargetingAction, TargetingEngine};
