// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Pointer events and listener bookkeeping.
//!
//! The targeting engine listens to document-level pointer events while
//! it is active. Registrations go through a `ListenerRegistry` owned by
//! the document, and the engine holds a `PointerSubscription`: an owned
//! handle that releases its registrations exactly once, either
//! explicitly on teardown or when dropped. The registry's count is
//! observable so hosts and tests can verify nothing leaks across
//! activation cycles.

use crate::document::tree::NodeId;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

/// Kind of pointer event delivered to the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerEventKind {
    Enter,
    Leave,
    Click,
}

/// Dispatch phase a listener is registered for.
///
/// Capture-phase listeners see events before the page's own handlers
/// and cannot be swallowed by them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventPhase {
    Capture,
    Bubble,
}

/// A pointer event targeting a document element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerEventKind,
    pub target: NodeId,
}

impl PointerEvent {
    pub fn enter(target: NodeId) -> Self {
        Self {
            kind: PointerEventKind::Enter,
            target,
        }
    }

    pub fn leave(target: NodeId) -> Self {
        Self {
            kind: PointerEventKind::Leave,
            target,
        }
    }

    pub fn click(target: NodeId) -> Self {
        Self {
            kind: PointerEventKind::Click,
            target,
        }
    }
}

/// Identifier of a single listener registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Document-level listener table.
#[derive(Debug, Default)]
pub struct ListenerRegistry {
    next_id: u64,
    entries: HashMap<ListenerId, (PointerEventKind, EventPhase)>,
}

impl ListenerRegistry {
    pub fn register(&mut self, kind: PointerEventKind, phase: EventPhase) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.insert(id, (kind, phase));
        id
    }

    pub fn remove(&mut self, id: ListenerId) -> bool {
        self.entries.remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Owned handle over a set of listener registrations.
///
/// Releases the registrations exactly once: calling `release` again is
/// a no-op, and dropping an unreleased subscription releases it.
#[derive(Debug)]
pub struct PointerSubscription {
    registry: Weak<RefCell<ListenerRegistry>>,
    ids: Vec<ListenerId>,
}

impl PointerSubscription {
    /// Register the given event kinds and return the owning handle.
    pub fn acquire(
        registry: &Rc<RefCell<ListenerRegistry>>,
        kinds: &[PointerEventKind],
        phase: EventPhase,
    ) -> Self {
        let ids = kinds
            .iter()
            .map(|&kind| registry.borrow_mut().register(kind, phase))
            .collect();
        Self {
            registry: Rc::downgrade(registry),
            ids,
        }
    }

    /// Remove every registration held by this handle. Idempotent.
    pub fn release(&mut self) {
        if self.ids.is_empty() {
            return;
        }
        if let Some(registry) = self.registry.upgrade() {
            let mut registry = registry.borrow_mut();
            for id in self.ids.drain(..) {
                registry.remove(id);
            }
        } else {
            self.ids.clear();
        }
    }

    /// Whether the handle still holds registrations.
    pub fn is_active(&self) -> bool {
        !self.ids.is_empty()
    }
}

impl Drop for PointerSubscription {
    fn drop(&mut self) {
        self.release();
    }
}
