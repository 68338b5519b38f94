// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dynamically typed property values.

use alloc::string::String;
use core::fmt;

use kurbo::{Point, Rect};

use crate::error::AnimationError;

/// A property value read from or written to an [`Animatable`](crate::Animatable) target.
///
/// Equality is deep: two `Color` values are equal when every channel is equal,
/// two `Text` values when the strings are equal.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Value {
    /// A flag, such as visibility or a toggle state.
    Bool(bool),
    /// A scalar, such as scale, z-index or a knob position.
    Number(f64),
    /// A 2D point, such as a component position.
    Point(Point),
    /// An axis-aligned box, such as component bounds.
    Rect(Rect),
    /// Straight RGBA color, channels in `0.0..=1.0`.
    Color([f64; 4]),
    /// A string, such as a label.
    Text(String),
}

/// The kind of a [`Value`], used in error reports.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// [`Value::Bool`].
    Bool,
    /// [`Value::Number`].
    Number,
    /// [`Value::Point`].
    Point,
    /// [`Value::Rect`].
    Rect,
    /// [`Value::Color`].
    Color,
    /// [`Value::Text`].
    Text,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Bool => "bool",
            Self::Number => "number",
            Self::Point => "point",
            Self::Rect => "rect",
            Self::Color => "color",
            Self::Text => "text",
        })
    }
}

impl ValueKind {
    /// Whether values of this kind can be interpolated.
    pub fn is_interpolable(self) -> bool {
        matches!(self, Self::Number | Self::Point | Self::Rect | Self::Color)
    }
}

impl Value {
    /// The kind of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Bool(_) => ValueKind::Bool,
            Self::Number(_) => ValueKind::Number,
            Self::Point(_) => ValueKind::Point,
            Self::Rect(_) => ValueKind::Rect,
            Self::Color(_) => ValueKind::Color,
            Self::Text(_) => ValueKind::Text,
        }
    }

    /// Check that an animation from `from` to `to` can be evaluated.
    pub fn check_interpolable(from: &Self, to: &Self) -> Result<(), AnimationError> {
        let (a, b) = (from.kind(), to.kind());
        if a != b {
            return Err(AnimationError::KindMismatch { from: a, to: b });
        }
        if !a.is_interpolable() {
            return Err(AnimationError::NotInterpolable(a));
        }
        Ok(())
    }

    /// Linear interpolation `from + (to - from) * t`, component-wise.
    ///
    /// `t` is not clamped here; callers pass the eased progress.
    ///
    /// ```
    /// use canopy_animation::Value;
    /// use kurbo::Point;
    ///
    /// let v = Value::lerp(&Value::Number(0.0), &Value::Number(10.0), 0.25).unwrap();
    /// assert_eq!(v, Value::Number(2.5));
    ///
    /// let p = Value::lerp(
    ///     &Value::Point(Point::new(0.0, 0.0)),
    ///     &Value::Point(Point::new(10.0, 20.0)),
    ///     0.5,
    /// )
    /// .unwrap();
    /// assert_eq!(p, Value::Point(Point::new(5.0, 10.0)));
    /// ```
    pub fn lerp(from: &Self, to: &Self, t: f64) -> Result<Self, AnimationError> {
        match (from, to) {
            (Self::Number(a), Self::Number(b)) => Ok(Self::Number(lerp_f64(*a, *b, t))),
            (Self::Point(a), Self::Point(b)) => Ok(Self::Point(a.lerp(*b, t))),
            (Self::Rect(a), Self::Rect(b)) => Ok(Self::Rect(Rect::new(
                lerp_f64(a.x0, b.x0, t),
                lerp_f64(a.y0, b.y0, t),
                lerp_f64(a.x1, b.x1, t),
                lerp_f64(a.y1, b.y1, t),
            ))),
            (Self::Color(a), Self::Color(b)) => Ok(Self::Color(core::array::from_fn(|i| {
                lerp_f64(a[i], b[i], t)
            }))),
            _ => {
                Self::check_interpolable(from, to)?;
                // Same interpolable kind is always matched above.
                Err(AnimationError::NotInterpolable(from.kind()))
            }
        }
    }

    /// The flag, if this is a `Bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The scalar, if this is a `Number`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The point, if this is a `Point`.
    pub fn as_point(&self) -> Option<Point> {
        match self {
            Self::Point(p) => Some(*p),
            _ => None,
        }
    }

    /// The box, if this is a `Rect`.
    pub fn as_rect(&self) -> Option<Rect> {
        match self {
            Self::Rect(r) => Some(*r),
            _ => None,
        }
    }

    /// The channels, if this is a `Color`.
    pub fn as_color(&self) -> Option<[f64; 4]> {
        match self {
            Self::Color(c) => Some(*c),
            _ => None,
        }
    }

    /// The string, if this is `Text`.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

#[inline]
fn lerp_f64(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<Point> for Value {
    fn from(v: Point) -> Self {
        Self::Point(v)
    }
}

impl From<Rect> for Value {
    fn from(v: Rect) -> Self {
        Self::Rect(v)
    }
}

impl From<[f64; 4]> for Value {
    fn from(v: [f64; 4]) -> Self {
        Self::Color(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.into())
    }
}
