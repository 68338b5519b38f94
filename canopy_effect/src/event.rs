// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::string::ToString;
use core::fmt;
use core::str::FromStr;

use crate::error::EffectError;

/// Pointer events that effects can be bound to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum EventKind {
    /// A pointer was pressed over the component.
    PointerDown,
    /// A pointer was released over the component.
    PointerUp,
    /// The pointer started hovering the component.
    PointerEnter,
    /// The pointer stopped hovering the component.
    PointerLeave,
    /// The pointer moved while hovering the component.
    PointerMove,
}

impl EventKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::PointerDown,
        Self::PointerUp,
        Self::PointerEnter,
        Self::PointerLeave,
        Self::PointerMove,
    ];

    /// Lower-case DOM-style name, such as `"pointerdown"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PointerDown => "pointerdown",
            Self::PointerUp => "pointerup",
            Self::PointerEnter => "pointerenter",
            Self::PointerLeave => "pointerleave",
            Self::PointerMove => "pointermove",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = EffectError;

    /// Parse an event name, ignoring ASCII case.
    ///
    /// ```
    /// use canopy_effect::EventKind;
    ///
    /// assert_eq!("PointerUp".parse::<EventKind>().unwrap(), EventKind::PointerUp);
    /// assert_eq!("pointerup".parse::<EventKind>().unwrap(), EventKind::PointerUp);
    /// assert!("click".parse::<EventKind>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| EffectError::UnknownEvent(s.to_string()))
    }
}
