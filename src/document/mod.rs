// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Page document abstraction: the element tree the host keeps current,
//! plus pointer events and listener bookkeeping.

pub mod events;
pub mod tree;

pub use events::{EventPhase, ListenerId, PointerEvent, PointerEventKind, PointerSubscription};
pub use tree::{Document, Element, ElementSpec, NodeId, PageEnvironment, PageSnapshot};
