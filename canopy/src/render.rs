// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The drawing surface components paint onto.
//!
//! Canopy never rasterizes anything itself. Hosts implement [`Renderer`] over
//! whatever backend they use and pass it to [`Canopy::draw`](crate::Canopy::draw).

use kurbo::{Point, Rect};

use crate::types::Color;

/// An opaque drawing surface. Coordinates are device pixels.
pub trait Renderer {
    /// Fill an axis-aligned rectangle.
    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Fill a rectangle with rounded corners, optionally outlined.
    fn fill_rounded_rect(
        &mut self,
        rect: Rect,
        radius: f64,
        fill: Color,
        outline: Option<(Color, f64)>,
    );

    /// Fill a circle.
    fn fill_circle(&mut self, center: Point, radius: f64, color: Color);

    /// Draw a single line of text with its top-left corner at `origin`.
    fn draw_text(&mut self, origin: Point, text: &str, size: f64, color: Color);
}
