// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Primitive geometry types and helpers.

use core::cmp::Ordering;
use core::fmt::Debug;

/// Axis-aligned rectangle in a single coordinate space (device pixels).
///
/// Stored as origin plus size. Constructors clamp negative extents to zero, so
/// `width >= 0` and `height >= 0` always hold for values built through them.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rectangle<T = f64> {
    /// Left edge.
    pub x: T,
    /// Top edge.
    pub y: T,
    /// Horizontal extent.
    pub width: T,
    /// Vertical extent.
    pub height: T,
}

impl<T: Scalar> Rectangle<T> {
    /// Create a rectangle from origin and size.
    #[inline]
    pub fn new(x: T, y: T, width: T, height: T) -> Self {
        Self {
            x,
            y,
            width: T::max(width, T::zero()),
            height: T::max(height, T::zero()),
        }
    }

    /// Create a rectangle from an `(x, y, width, height)` tuple.
    #[inline]
    pub fn from_four_tuple((x, y, width, height): (T, T, T, T)) -> Self {
        Self::new(x, y, width, height)
    }

    /// Create a rectangle from min/max corners.
    #[inline]
    pub fn from_min_max(min_x: T, min_y: T, max_x: T, max_y: T) -> Self {
        Self::new(min_x, min_y, T::sub(max_x, min_x), T::sub(max_y, min_y))
    }

    /// Right edge (`x + width`).
    #[inline]
    pub fn right(&self) -> T {
        T::add(self.x, self.width)
    }

    /// Bottom edge (`y + height`).
    #[inline]
    pub fn bottom(&self) -> T {
        T::add(self.y, self.height)
    }

    /// Center point as `(x, y)`.
    #[inline]
    pub fn center(&self) -> (T, T) {
        (T::mid(self.x, self.right()), T::mid(self.y, self.bottom()))
    }

    /// Whether this rectangle contains the point.
    ///
    /// The test is closed on both ends: a point on the right or bottom edge is
    /// contained, and a zero-area rectangle contains its own origin.
    #[inline]
    pub fn contains_point(&self, x: T, y: T) -> bool {
        self.x <= x && x <= self.right() && self.y <= y && y <= self.bottom()
    }

    /// Whether `other` lies entirely within this rectangle (edges included).
    #[inline]
    pub fn contains_rect(&self, other: &Self) -> bool {
        self.x <= other.x
            && self.y <= other.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Determines whether this rectangle overlaps with another in any way.
    ///
    /// Note that the edge of the rectangle is considered to be part of itself, meaning
    /// that two rectangles that share an edge are considered to intersect.
    ///
    /// # Examples
    ///
    /// ```
    /// use canopy_index::Rectangle;
    ///
    /// let a = Rectangle::new(0.0, 0.0, 10.0, 10.0);
    /// assert!(a.intersects(&Rectangle::new(5.0, 5.0, 10.0, 10.0)));
    /// assert!(a.intersects(&Rectangle::new(10.0, 0.0, 10.0, 10.0)));
    /// assert!(!a.intersects(&Rectangle::new(11.0, 0.0, 10.0, 10.0)));
    /// ```
    #[inline]
    pub fn intersects(&self, other: &Self) -> bool {
        self.x <= other.right()
            && self.right() >= other.x
            && self.y <= other.bottom()
            && self.bottom() >= other.y
    }

    /// The smallest rectangle enclosing both rectangles.
    #[inline]
    pub fn union(&self, other: &Self) -> Self {
        Self::from_min_max(
            min_t(self.x, other.x),
            min_t(self.y, other.y),
            max_t(self.right(), other.right()),
            max_t(self.bottom(), other.bottom()),
        )
    }

    /// Split into four equal quadrants: top-left, top-right, bottom-left, bottom-right.
    pub fn quadrants(&self) -> [Self; 4] {
        let (mx, my) = self.center();
        let (right, bottom) = (self.right(), self.bottom());
        [
            Self::from_min_max(self.x, self.y, mx, my),
            Self::from_min_max(mx, self.y, right, my),
            Self::from_min_max(self.x, my, mx, bottom),
            Self::from_min_max(mx, my, right, bottom),
        ]
    }

    /// Return true if the rectangle has no area.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= T::zero() || self.height <= T::zero()
    }
}

/// Numeric scalar abstraction for rectangles and the quad tree.
///
/// This trait provides the minimal set of operations the index needs to
/// compute edges and split boundaries into quadrants.
pub trait Scalar: Copy + PartialOrd + Debug {
    /// Add two scalar values.
    fn add(a: Self, b: Self) -> Self;

    /// Subtract two scalar values: a - b.
    fn sub(a: Self, b: Self) -> Self;

    /// Zero value for the scalar type.
    fn zero() -> Self;

    /// Max of the two scalar values.
    fn max(a: Self, b: Self) -> Self;

    /// Min of the two scalar values.
    fn min(a: Self, b: Self) -> Self;

    /// Midpoint between a and b (used for quadrant splits).
    fn mid(a: Self, b: Self) -> Self;
}

impl Scalar for f32 {
    #[inline]
    fn add(a: Self, b: Self) -> Self {
        a + b
    }

    #[inline]
    fn sub(a: Self, b: Self) -> Self {
        a - b
    }

    #[inline(always)]
    fn zero() -> Self {
        0.0
    }

    #[inline]
    fn max(a: Self, b: Self) -> Self {
        Self::max(a, b)
    }

    #[inline]
    fn min(a: Self, b: Self) -> Self {
        Self::min(a, b)
    }

    #[inline]
    fn mid(a: Self, b: Self) -> Self {
        0.5 * (a + b)
    }
}

impl Scalar for f64 {
    #[inline]
    fn add(a: Self, b: Self) -> Self {
        a + b
    }

    #[inline]
    fn sub(a: Self, b: Self) -> Self {
        a - b
    }

    #[inline(always)]
    fn zero() -> Self {
        0.0
    }

    #[inline]
    fn max(a: Self, b: Self) -> Self {
        Self::max(a, b)
    }

    #[inline]
    fn min(a: Self, b: Self) -> Self {
        Self::min(a, b)
    }

    #[inline]
    fn mid(a: Self, b: Self) -> Self {
        0.5 * (a + b)
    }
}

impl Scalar for i64 {
    #[inline]
    fn add(a: Self, b: Self) -> Self {
        a.saturating_add(b)
    }

    #[inline]
    fn sub(a: Self, b: Self) -> Self {
        a.saturating_sub(b)
    }

    #[inline(always)]
    fn zero() -> Self {
        0
    }

    #[inline]
    fn max(a: Self, b: Self) -> Self {
        core::cmp::max(a, b)
    }

    #[inline]
    fn min(a: Self, b: Self) -> Self {
        core::cmp::min(a, b)
    }

    #[inline]
    fn mid(a: Self, b: Self) -> Self {
        // Average without overflow: (a & b) + ((a ^ b) >> 1)
        (a & b) + ((a ^ b) >> 1)
    }
}

/// Anything that can report its axis-aligned bounds.
///
/// The index never mutates elements. It stores the handles it is given and
/// compares them with `PartialEq`, so handles to shared objects should compare
/// by identity.
pub trait Bounded<T: Scalar = f64> {
    /// Current bounds of the element.
    fn bounds(&self) -> Rectangle<T>;
}

impl<T: Scalar> Bounded<T> for Rectangle<T> {
    fn bounds(&self) -> Rectangle<T> {
        *self
    }
}

impl<K, T: Scalar> Bounded<T> for (K, Rectangle<T>) {
    fn bounds(&self) -> Rectangle<T> {
        self.1
    }
}

pub(crate) fn min_t<T: PartialOrd + Copy>(a: T, b: T) -> T {
    match a.partial_cmp(&b) {
        Some(Ordering::Greater) => b,
        _ => a,
    }
}

pub(crate) fn max_t<T: PartialOrd + Copy>(a: T, b: T) -> T {
    match a.partial_cmp(&b) {
        Some(Ordering::Less) => b,
        _ => a,
    }
}

#[cfg(test)]
mod tests {
    use super::Rectangle;

    #[test]
    fn negative_extents_are_clamped() {
        let r = Rectangle::new(5.0, 7.0, -3.0, 2.0);
        assert_eq!(r.width, 0.0);
        assert_eq!(r.height, 2.0);
        assert!(r.is_empty());
    }

    #[test]
    fn zero_area_contains_its_origin_only() {
        let r = Rectangle::new(3_i64, 4, 0, 0);
        assert!(r.contains_point(3, 4));
        assert!(!r.contains_point(4, 4));
        assert!(!r.contains_point(3, 5));
    }

    #[test]
    fn contains_point_is_closed() {
        let r = Rectangle::from_four_tuple((10.0, 10.0, 50.0, 50.0));
        assert!(r.contains_point(10.0, 10.0));
        assert!(r.contains_point(60.0, 60.0));
        assert!(!r.contains_point(60.5, 30.0));
        assert!(!r.contains_point(9.9, 30.0));
    }

    #[test]
    fn quadrants_cover_the_parent() {
        let r = Rectangle::new(0.0, 0.0, 800.0, 600.0);
        let [tl, tr, bl, br] = r.quadrants();
        assert_eq!(tl, Rectangle::new(0.0, 0.0, 400.0, 300.0));
        assert_eq!(tr, Rectangle::new(400.0, 0.0, 400.0, 300.0));
        assert_eq!(bl, Rectangle::new(0.0, 300.0, 400.0, 300.0));
        assert_eq!(br, Rectangle::new(400.0, 300.0, 400.0, 300.0));
        assert_eq!(tl.union(&br), r);
    }

    #[test]
    fn contains_rect_includes_edges() {
        let r = Rectangle::new(0_i64, 0, 100, 100);
        assert!(r.contains_rect(&Rectangle::new(0, 0, 100, 100)));
        assert!(r.contains_rect(&Rectangle::new(50, 50, 50, 50)));
        assert!(!r.contains_rect(&Rectangle::new(50, 50, 51, 50)));
    }
}
