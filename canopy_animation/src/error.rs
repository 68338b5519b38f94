// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::value::ValueKind;

/// Failure to read or write a property through a [`PropertyRef`](crate::PropertyRef).
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PropertyError {
    /// The target object has been dropped.
    #[error("target object has been dropped")]
    TargetDropped,
    /// The target is currently borrowed elsewhere, usually because the write
    /// originates from inside one of its own methods.
    #[error("target of `{0}` is busy")]
    Busy(&'static str),
    /// The target type does not expose this property.
    #[error("property `{0}` is not supported by this target")]
    Unsupported(&'static str),
    /// The value is of the wrong kind for the property.
    #[error("property `{property}` expects a {expected} value, got {found}")]
    KindMismatch {
        /// Property name.
        property: &'static str,
        /// Kind the property stores.
        expected: ValueKind,
        /// Kind that was supplied.
        found: ValueKind,
    },
}

/// An animation that cannot be evaluated.
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AnimationError {
    /// Values of this kind have no interpolation.
    #[error("{0} values cannot be interpolated")]
    NotInterpolable(ValueKind),
    /// The endpoints are of different kinds.
    #[error("cannot interpolate from a {from} value to a {to} value")]
    KindMismatch {
        /// Kind of the start value.
        from: ValueKind,
        /// Kind of the end value.
        to: ValueKind,
    },
}
