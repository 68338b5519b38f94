// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Multi-touch gesture recognition from active pointer positions.
//!
//! ## Rules
//!
//! - Two active pointers: a [`Gesture::PinchRotate`] carrying the change in
//!   distance between them and the change in the angle of the line joining them.
//! - One active pointer: a [`Gesture::Pan`] carrying its displacement.
//! - Any other count: nothing.
//!
//! Deltas are measured against the previous update. Whenever the number of
//! active pointers changes, the first update only records a baseline and
//! reports nothing, so adding or lifting a finger never produces a jump.
//!
//! ```
//! use canopy_event_state::gesture::{Gesture, GestureState};
//! use canopy_event_state::pointer::PointerTracker;
//! use kurbo::{Point, Vec2};
//!
//! let mut pointers = PointerTracker::new();
//! let mut gestures = GestureState::new();
//!
//! pointers.down(1, Point::new(0.0, 0.0));
//! pointers.down(2, Point::new(10.0, 0.0));
//! assert_eq!(gestures.update(&pointers), None); // baseline
//!
//! pointers.moved(2, Point::new(20.0, 0.0));
//! assert_eq!(
//!     gestures.update(&pointers),
//!     Some(Gesture::PinchRotate { zoom_delta: 10.0, rotation_delta: 0.0 })
//! );
//!
//! pointers.up(2);
//! assert_eq!(gestures.update(&pointers), None); // count changed
//! pointers.moved(1, Point::new(3.0, 4.0));
//! assert_eq!(gestures.update(&pointers), Some(Gesture::Pan { delta: Vec2::new(3.0, 4.0) }));
//! ```

use core::f64::consts::{PI, TAU};

use kurbo::{Point, Vec2};

use crate::pointer::PointerTracker;

/// A recognized gesture step.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Gesture {
    /// Two-pointer pinch and rotation.
    PinchRotate {
        /// Change in distance between the pointers.
        zoom_delta: f64,
        /// Change in angle of the line between the pointers, in radians within `(-π, π]`.
        rotation_delta: f64,
    },
    /// Single-pointer displacement.
    Pan {
        /// Displacement since the previous update.
        delta: Vec2,
    },
}

impl Gesture {
    /// Forward this step to a listener.
    pub fn dispatch(&self, listener: &mut dyn GestureListener) {
        match *self {
            Self::PinchRotate {
                zoom_delta,
                rotation_delta,
            } => {
                listener.on_zoom(zoom_delta);
                listener.on_rotate(rotation_delta);
            }
            Self::Pan { delta } => listener.on_pan(delta),
        }
    }
}

/// Receives gesture steps. Every method defaults to doing nothing.
pub trait GestureListener {
    /// Pinch distance changed by `delta`.
    fn on_zoom(&mut self, delta: f64) {
        let _ = delta;
    }

    /// Pinch angle changed by `delta` radians.
    fn on_rotate(&mut self, delta: f64) {
        let _ = delta;
    }

    /// Single pointer moved by `delta`.
    fn on_pan(&mut self, delta: Vec2) {
        let _ = delta;
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
enum Baseline {
    Pan(Point),
    Pair { distance: f64, angle: f64 },
}

/// Gesture recognizer state: the baseline of the previous update.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct GestureState {
    baseline: Option<Baseline>,
}

impl GestureState {
    /// Create a recognizer with no baseline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the baseline so the next update only records one.
    pub fn reset(&mut self) {
        self.baseline = None;
    }

    /// Recognize a step from the current pointers.
    pub fn update(&mut self, pointers: &PointerTracker) -> Option<Gesture> {
        let mut it = pointers.iter().map(|(_, p)| p);
        let current = match (it.next(), it.next(), it.next()) {
            (Some(p), None, None) => Baseline::Pan(p),
            (Some(a), Some(b), None) => {
                let d = b - a;
                Baseline::Pair {
                    distance: d.hypot(),
                    angle: d.atan2(),
                }
            }
            _ => {
                self.baseline = None;
                return None;
            }
        };
        let previous = self.baseline.replace(current)?;
        match (previous, current) {
            (Baseline::Pan(was), Baseline::Pan(now)) => Some(Gesture::Pan { delta: now - was }),
            (
                Baseline::Pair {
                    distance: d0,
                    angle: a0,
                },
                Baseline::Pair {
                    distance: d1,
                    angle: a1,
                },
            ) => Some(Gesture::PinchRotate {
                zoom_delta: d1 - d0,
                rotation_delta: wrap_angle(a1 - a0),
            }),
            // Pointer count changed since the last update.
            _ => None,
        }
    }
}

fn wrap_angle(mut a: f64) -> f64 {
    if a > PI {
        a -= TAU;
    } else if a <= -PI {
        a += TAU;
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        zoom: f64,
        rotate: f64,
        pan: Vec2,
    }

    impl GestureListener for Recorder {
        fn on_zoom(&mut self, delta: f64) {
            self.zoom += delta;
        }
        fn on_rotate(&mut self, delta: f64) {
            self.rotate += delta;
        }
        fn on_pan(&mut self, delta: Vec2) {
            self.pan += delta;
        }
    }

    #[test]
    fn rotation_is_measured_between_updates() {
        let mut pointers = PointerTracker::new();
        let mut g = GestureState::new();
        pointers.down(1, Point::new(0.0, 0.0));
        pointers.down(2, Point::new(10.0, 0.0));
        assert!(g.update(&pointers).is_none());
        pointers.moved(2, Point::new(0.0, 10.0));
        let Some(Gesture::PinchRotate {
            zoom_delta,
            rotation_delta,
        }) = g.update(&pointers)
        else {
            panic!("expected a pinch");
        };
        assert!(zoom_delta.abs() < 1e-9);
        assert!((rotation_delta - PI / 2.0).abs() < 1e-9);
    }

    #[test]
    fn rotation_wraps_across_the_branch_cut() {
        let mut pointers = PointerTracker::new();
        let mut g = GestureState::new();
        pointers.down(1, Point::ORIGIN);
        pointers.down(2, Point::new(-10.0, 0.1));
        g.update(&pointers);
        pointers.moved(2, Point::new(-10.0, -0.1));
        let Some(Gesture::PinchRotate { rotation_delta, .. }) = g.update(&pointers) else {
            panic!("expected a pinch");
        };
        assert!(rotation_delta.abs() < 0.1, "got {rotation_delta}");
    }

    #[test]
    fn three_pointers_recognize_nothing() {
        let mut pointers = PointerTracker::new();
        let mut g = GestureState::new();
        for (id, x) in [(1, 1.0), (2, 2.0), (3, 3.0)] {
            pointers.down(id, Point::new(x, 0.0));
        }
        assert!(g.update(&pointers).is_none());
        pointers.moved(1, Point::new(50.0, 50.0));
        assert!(g.update(&pointers).is_none());
    }

    #[test]
    fn listener_receives_steps() {
        let mut pointers = PointerTracker::new();
        let mut g = GestureState::new();
        let mut rec = Recorder::default();
        pointers.moved(1, Point::new(5.0, 5.0));
        assert!(g.update(&pointers).is_none());
        for step in 1..=3 {
            pointers.moved(1, Point::new(5.0 + f64::from(step), 5.0));
            if let Some(gesture) = g.update(&pointers) {
                gesture.dispatch(&mut rec);
            }
        }
        assert_eq!(rec.pan, Vec2::new(3.0, 0.0));
        assert_eq!(rec.zoom, 0.0);
        assert_eq!(rec.rotate, 0.0);
    }

    #[test]
    fn default_listener_ignores_everything() {
        struct Nothing;
        impl GestureListener for Nothing {}
        Gesture::Pan { delta: Vec2::ZERO }.dispatch(&mut Nothing);
    }
}
