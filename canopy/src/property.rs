// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Animatable component properties.

use std::fmt;
use std::str::FromStr;

use canopy_animation::{PropertyError, Value, ValueKind};
use kurbo::Point;

use crate::error::ComponentError;
use crate::types::Color;

/// A property effects and animations can drive.
///
/// Every component supports the geometry properties and `isVisible`; the rest
/// belong to particular widgets and report [`PropertyError::Unsupported`]
/// elsewhere.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ComponentProperty {
    /// Top-left corner, a point.
    Position,
    /// Draw scale, a number.
    Scale,
    /// Bounds, a rect.
    Bounds,
    /// Paint order, a number rounded to an integer.
    ZIndex,
    /// Visibility, a bool.
    Visible,
    /// Fill color of buttons and sliders, background of text widgets.
    FillColor,
    /// Knob travel of a toggle, `0.0` (off) to `1.0` (on).
    KnobPosition,
    /// State of a toggle.
    IsOn,
    /// Value of a slider.
    Value,
    /// Displayed string of text widgets.
    Text,
    /// Text color of text widgets.
    TextColor,
}

impl ComponentProperty {
    /// All properties.
    pub const ALL: [Self; 11] = [
        Self::Position,
        Self::Scale,
        Self::Bounds,
        Self::ZIndex,
        Self::Visible,
        Self::FillColor,
        Self::KnobPosition,
        Self::IsOn,
        Self::Value,
        Self::Text,
        Self::TextColor,
    ];

    /// Persisted name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Position => "position",
            Self::Scale => "scale",
            Self::Bounds => "bounds",
            Self::ZIndex => "zIndex",
            Self::Visible => "isVisible",
            Self::FillColor => "fillColor",
            Self::KnobPosition => "knobPosition",
            Self::IsOn => "isOn",
            Self::Value => "value",
            Self::Text => "text",
            Self::TextColor => "textColor",
        }
    }

    /// The error reported by targets that lack this property.
    pub fn unsupported(self) -> PropertyError {
        PropertyError::Unsupported(self.name())
    }
}

impl fmt::Display for ComponentProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ComponentProperty {
    type Err = ComponentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| ComponentError::UnknownProperty(s.to_owned()))
    }
}

fn mismatch(property: ComponentProperty, expected: ValueKind, found: &Value) -> PropertyError {
    PropertyError::KindMismatch {
        property: property.name(),
        expected,
        found: found.kind(),
    }
}

pub(crate) fn number(property: ComponentProperty, value: &Value) -> Result<f64, PropertyError> {
    value
        .as_number()
        .ok_or_else(|| mismatch(property, ValueKind::Number, value))
}

pub(crate) fn flag(property: ComponentProperty, value: &Value) -> Result<bool, PropertyError> {
    value
        .as_bool()
        .ok_or_else(|| mismatch(property, ValueKind::Bool, value))
}

pub(crate) fn point(property: ComponentProperty, value: &Value) -> Result<Point, PropertyError> {
    value
        .as_point()
        .ok_or_else(|| mismatch(property, ValueKind::Point, value))
}

pub(crate) fn color(property: ComponentProperty, value: &Value) -> Result<Color, PropertyError> {
    value
        .as_color()
        .ok_or_else(|| mismatch(property, ValueKind::Color, value))
}

pub(crate) fn text(property: ComponentProperty, value: &Value) -> Result<String, PropertyError> {
    value
        .as_text()
        .map(str::to_owned)
        .ok_or_else(|| mismatch(property, ValueKind::Text, value))
}

pub(crate) fn rect(
    property: ComponentProperty,
    value: &Value,
) -> Result<kurbo::Rect, PropertyError> {
    value
        .as_rect()
        .ok_or_else(|| mismatch(property, ValueKind::Rect, value))
}
