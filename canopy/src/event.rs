// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Raw host input and the events components receive.

use canopy_effect::EventKind;
use canopy_event_state::pointer::PointerId;
use kurbo::{Point, Vec2};

/// A pointer event as reported by the host, in client (CSS pixel) coordinates.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PointerInput {
    /// Host pointer identifier.
    pub pointer_id: PointerId,
    /// Position relative to the host viewport.
    pub client: Point,
    /// Event time in milliseconds, on any monotonic clock.
    pub timestamp_ms: f64,
    /// Button that changed state; `0` is the primary button.
    pub button: i16,
}

impl PointerInput {
    /// Primary-button input for `pointer_id` at `client`.
    pub fn new(pointer_id: PointerId, client: Point, timestamp_ms: f64) -> Self {
        Self {
            pointer_id,
            client,
            timestamp_ms,
            button: 0,
        }
    }
}

/// A pointer event delivered to a component, in device pixels.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PointerEvent {
    /// Which of the pointer events this is.
    pub kind: EventKind,
    /// Host pointer identifier.
    pub pointer_id: PointerId,
    /// Position on the canvas in device pixels.
    pub position: Point,
    /// Event time in milliseconds.
    pub timestamp_ms: f64,
    /// Button that changed state.
    pub button: i16,
}

/// A wheel event as reported by the host.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct WheelInput {
    /// Cursor position relative to the host viewport.
    pub client: Point,
    /// Scroll amount; positive `y` scrolls down.
    pub delta: Vec2,
    /// Event time in milliseconds.
    pub timestamp_ms: f64,
}

/// A wheel event delivered to a component, in device pixels.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct WheelEvent {
    /// Cursor position on the canvas in device pixels.
    pub position: Point,
    /// Scroll amount; positive `y` scrolls down.
    pub delta: Vec2,
    /// Event time in milliseconds.
    pub timestamp_ms: f64,
}

/// How many components an input event reached.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    /// Components that received the event itself (down, up, move or wheel).
    pub delivered: usize,
    /// Components that received `pointerenter`.
    pub entered: usize,
    /// Components that received `pointerleave`.
    pub left: usize,
    /// Whether the event was swallowed by the pointer-up debounce.
    pub debounced: bool,
}
