// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use canopy_animation::DuplicatePolicy;
use canopy_event_state::debounce::DEFAULT_THRESHOLD_MS;
use canopy_index::{QuadTreeConfig, Rectangle};
use kurbo::{Point, Size};

/// Controller configuration.
///
/// Every field has a default, so hosts may load a partial JSON object:
///
/// ```
/// use canopy::CanopyConfig;
///
/// let config: CanopyConfig =
///     serde_json::from_str(r#"{ "devicePixelRatio": 2.0 }"#).unwrap();
/// assert_eq!(config.device_pixel_ratio, 2.0);
/// assert_eq!(config.pointer_up_debounce_ms, 200.0);
/// ```
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CanopyConfig {
    /// Device pixels per CSS pixel.
    pub device_pixel_ratio: f64,
    /// Top-left corner of the canvas in client coordinates.
    pub canvas_origin: Point,
    /// Canvas size in CSS pixels.
    pub canvas_size: Size,
    /// Spatial index tuning.
    pub quad_tree: QuadTreeConfig,
    /// Pointer-ups closer than this to the previous one are swallowed.
    pub pointer_up_debounce_ms: f64,
    /// What the scheduler does with a second animation of the same property.
    pub duplicate_animations: DuplicatePolicy,
}

impl Default for CanopyConfig {
    fn default() -> Self {
        Self {
            device_pixel_ratio: 1.0,
            canvas_origin: Point::ORIGIN,
            canvas_size: Size::new(800.0, 600.0),
            quad_tree: QuadTreeConfig::default(),
            pointer_up_debounce_ms: DEFAULT_THRESHOLD_MS,
            duplicate_animations: DuplicatePolicy::default(),
        }
    }
}

impl CanopyConfig {
    /// Default configuration for a canvas of `width` × `height` CSS pixels.
    pub fn with_canvas_size(width: f64, height: f64) -> Self {
        Self {
            canvas_size: Size::new(width, height),
            ..Self::default()
        }
    }

    /// Same configuration with a different device pixel ratio.
    #[must_use]
    pub fn with_device_pixel_ratio(mut self, dpr: f64) -> Self {
        self.device_pixel_ratio = dpr;
        self
    }

    /// Same configuration with a different canvas origin.
    #[must_use]
    pub fn with_canvas_origin(mut self, origin: Point) -> Self {
        self.canvas_origin = origin;
        self
    }

    /// The index boundary: the canvas in device pixels.
    pub fn device_bounds(&self) -> Rectangle {
        Rectangle::new(
            0.0,
            0.0,
            self.canvas_size.width * self.device_pixel_ratio,
            self.canvas_size.height * self.device_pixel_ratio,
        )
    }

    /// Translate client coordinates to device pixels on the canvas.
    pub fn to_device(&self, client: Point) -> Point {
        ((client - self.canvas_origin) * self.device_pixel_ratio).to_point()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_points_are_offset_then_scaled() {
        let config = CanopyConfig::with_canvas_size(400.0, 300.0)
            .with_device_pixel_ratio(2.0)
            .with_canvas_origin(Point::new(10.0, 20.0));
        assert_eq!(config.to_device(Point::new(15.0, 30.0)), Point::new(10.0, 20.0));
        assert_eq!(config.device_bounds(), Rectangle::new(0.0, 0.0, 800.0, 600.0));
    }
}
