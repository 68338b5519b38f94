// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::string::String;

use canopy_animation::{AnimationError, PropertyError};

/// Errors from binding or applying effects.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum EffectError {
    /// The event name is not one of the pointer events.
    #[error("unknown event `{0}`")]
    UnknownEvent(String),
    /// The effect type name is not `setValue`, `toggleValue` or `animateValue`.
    #[error("unknown effect type `{0}`")]
    UnknownEffectType(String),
    /// A required value was not supplied.
    #[error("{effect} effect requires `{field}`")]
    MissingValue {
        /// Effect type name.
        effect: &'static str,
        /// Name of the missing field.
        field: &'static str,
    },
    /// The animation endpoints cannot be interpolated.
    #[error(transparent)]
    Animation(#[from] AnimationError),
    /// Reading or writing the target property failed.
    #[error(transparent)]
    Property(#[from] PropertyError),
    /// A persisted effect names a target that could not be found.
    #[error("no target for property `{property}` of object {id:?}")]
    UnresolvedTarget {
        /// Persisted target id, if any.
        id: Option<u64>,
        /// Persisted property name.
        property: String,
    },
}
