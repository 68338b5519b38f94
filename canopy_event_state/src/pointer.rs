// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Active pointer tracking.
//!
//! Pointers are keyed by id in a `BTreeMap`, so iteration order, and with it
//! the order gesture recognition sees the pointers in, is deterministic.

use alloc::collections::BTreeMap;
use kurbo::Point;

/// Pointer identifier as reported by the host.
pub type PointerId = u64;

/// Last known position of every active pointer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PointerTracker {
    active: BTreeMap<PointerId, Point>,
}

impl PointerTracker {
    /// Create a tracker with no active pointers.
    pub fn new() -> Self {
        Self::default()
    }

    /// A pointer was pressed at `position`.
    pub fn down(&mut self, id: PointerId, position: Point) {
        self.active.insert(id, position);
    }

    /// A pointer moved to `position`.
    ///
    /// Hovering pointers are tracked too, so a lone mouse moving over the
    /// canvas counts as one active pointer until it is released or cancelled.
    pub fn moved(&mut self, id: PointerId, position: Point) {
        self.active.insert(id, position);
    }

    /// A pointer was released. Returns its last position if it was tracked.
    pub fn up(&mut self, id: PointerId) -> Option<Point> {
        self.active.remove(&id)
    }

    /// A pointer was cancelled by the platform. Returns whether it was tracked.
    pub fn cancel(&mut self, id: PointerId) -> bool {
        self.active.remove(&id).is_some()
    }

    /// Last known position of a pointer.
    pub fn position(&self, id: PointerId) -> Option<Point> {
        self.active.get(&id).copied()
    }

    /// Number of active pointers.
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// Whether no pointer is active.
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Active pointers in id order.
    pub fn iter(&self) -> impl Iterator<Item = (PointerId, Point)> + '_ {
        self.active.iter().map(|(id, p)| (*id, *p))
    }

    /// Forget every pointer.
    pub fn clear(&mut self) {
        self.active.clear();
    }
}
