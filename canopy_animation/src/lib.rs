// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canopy Animation: typed property values and time-driven property animations.
//!
//! - [`Value`] is the dynamically typed currency of property writes.
//! - [`Animatable`] is implemented by objects that expose named properties;
//!   a [`PropertyRef`] binds one of those properties to a weakly held target.
//! - [`Animation`] interpolates a property linearly over a duration, with
//!   optional bounce (there and back) and looping.
//! - [`AnimationScheduler`] owns running animations and advances them when the
//!   host calls [`Scheduler::advance`] or [`Scheduler::tick`] from its paint loop.
//!
//! There is no global scheduler. Create one, share it through the cloneable
//! [`Scheduler`] handle, and register a redraw callback so the host knows when
//! to repaint.
//!
//! # Example
//!
//! ```rust
//! use std::{cell::RefCell, rc::Rc};
//! use canopy_animation::{Animatable, Animation, PropertyError, PropertyRef, Scheduler, Value};
//!
//! #[derive(Default)]
//! struct Dot {
//!     radius: f64,
//! }
//!
//! #[derive(Copy, Clone, Debug, PartialEq, Eq)]
//! struct Radius;
//!
//! impl Animatable for Dot {
//!     type Property = Radius;
//!     fn property_name(_: Radius) -> &'static str {
//!         "radius"
//!     }
//!     fn get_property(&self, _: Radius) -> Result<Value, PropertyError> {
//!         Ok(self.radius.into())
//!     }
//!     fn set_property(&mut self, _: Radius, v: Value) -> Result<(), PropertyError> {
//!         self.radius = v.as_number().ok_or(PropertyError::Unsupported("radius"))?;
//!         Ok(())
//!     }
//! }
//!
//! let dot = Rc::new(RefCell::new(Dot::default()));
//! let scheduler = Scheduler::new();
//! let grow = Animation::new(PropertyRef::new(&dot, Radius), 0.0.into(), 8.0.into(), 200.0)
//!     .unwrap();
//! scheduler.add_animation(grow);
//!
//! scheduler.advance(100.0);
//! assert_eq!(dot.borrow().radius, 4.0);
//! scheduler.advance(100.0);
//! assert_eq!(dot.borrow().radius, 8.0);
//! assert!(scheduler.is_idle());
//! assert!(scheduler.take_redraw_request());
//! ```
//!
//! ## Features
//!
//! - `std` *(default)*: forwards to `kurbo/std`.
//! - `libm`: forwards to `kurbo/libm` for `no_std` targets.
//! - `serde`: derive `Serialize`/`Deserialize` for [`Value`] and [`DuplicatePolicy`].

#![no_std]

extern crate alloc;

mod animation;
mod error;
mod property;
mod scheduler;
mod value;

pub use animation::{Animation, AnimationId, CompletionFn};
pub use error::{AnimationError, PropertyError};
pub use property::{Animatable, PropertyRef, TargetKey};
pub use scheduler::{AnimationScheduler, DuplicatePolicy, RedrawFn, Scheduler};
pub use value::{Value, ValueKind};
