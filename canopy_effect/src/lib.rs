// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canopy Effect: declarative property changes bound to pointer events.
//!
//! An [`Effect`] names a target property and what to do to it when an event
//! fires:
//!
//! - `SetValue` writes a fixed value.
//! - `ToggleValue` alternates between two values, comparing the current value
//!   by deep equality.
//! - `AnimateValue` registers an [`Animation`](canopy_animation::Animation)
//!   with a [`Scheduler`](canopy_animation::Scheduler), optionally bouncing,
//!   looping, or reversing direction on every firing.
//!
//! An [`EffectBinder`] holds the effects of one component, keyed by
//! [`EventKind`]. The dispatcher applies a component's bound effects before
//! calling its native handler for the same event.
//!
//! Effects hold their targets weakly. A binding whose target has been dropped
//! logs a warning when fired and does nothing.
//!
//! ## Features
//!
//! - `std` *(default)* / `libm`: forwarded to `canopy_animation`.
//! - `serde`: derive `Serialize`/`Deserialize` for [`EventKind`],
//!   [`EffectType`] and the [`EffectRecord`] persisted form.

#![no_std]

extern crate alloc;

mod binder;
mod effect;
mod error;
mod event;
mod record;

pub use binder::{EffectBinder, apply_effects};
pub use effect::{AnimateEffect, Effect, EffectCallback, EffectEvent, EffectSpec, EffectType};
pub use error::EffectError;
pub use event::EventKind;
pub use record::{EffectRecord, EventEffectsRecord};
