// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use canopy_animation::{PropertyError, Value};
use canopy_index::Rectangle;
use kurbo::{Point, Rect};
use serde_json::Map;

use crate::component::{Component, UiComponent};
use crate::core::ComponentCore;
use crate::error::ComponentError;
use crate::event::{PointerEvent, WheelEvent};
use crate::property::{self, ComponentProperty};
use crate::record::ComponentRecord;
use crate::render::Renderer;
use crate::types::Color;
use crate::widgets::{scaled_rect, to_fields};

/// Colors of a [`Slider`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SliderStyle {
    /// Unfilled track.
    pub track_color: Color,
    /// Track up to the knob.
    pub fill_color: Color,
    /// Knob.
    pub knob_color: Color,
}

impl Default for SliderStyle {
    fn default() -> Self {
        Self {
            track_color: [0.8, 0.8, 0.8, 1.0],
            fill_color: [0.0, 0.5, 1.0, 1.0],
            knob_color: [1.0, 1.0, 1.0, 1.0],
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct Fields {
    #[serde(flatten)]
    style: SliderStyle,
    value: f64,
    min: f64,
    max: f64,
    wheel_step: Option<f64>,
}

/// A horizontal value slider.
///
/// Pressing sets the value from the pointer and starts a drag that follows
/// the pointer until release or until it leaves the slider. The wheel nudges
/// the value; scrolling up increases it.
#[derive(Debug)]
pub struct Slider {
    core: ComponentCore,
    style: SliderStyle,
    value: f64,
    min: f64,
    max: f64,
    wheel_step: f64,
    dragging: bool,
}

impl Slider {
    /// Persisted class name.
    pub const CLASS_NAME: &'static str = "SliderComponent";

    /// A slider over `[min, max]` filling `bounds`. The value is clamped.
    pub fn new(bounds: Rectangle, min: f64, max: f64, value: f64) -> Self {
        let mut slider = Self {
            core: ComponentCore::new(bounds),
            style: SliderStyle::default(),
            value: min,
            min,
            max,
            wheel_step: default_step(min, max),
            dragging: false,
        };
        slider.set_value(value);
        slider
    }

    /// Same slider with different colors.
    #[must_use]
    pub fn with_style(mut self, style: SliderStyle) -> Self {
        self.style = style;
        self
    }

    /// Same slider moving `step` per wheel notch.
    #[must_use]
    pub fn with_wheel_step(mut self, step: f64) -> Self {
        self.wheel_step = step;
        self
    }

    /// Wrap the slider. It reacts to input natively and binds no effects.
    pub fn into_component(self) -> Component {
        Component::new(self)
    }

    /// Rebuild a slider from its record.
    pub fn from_record(record: &ComponentRecord) -> Result<Component, ComponentError> {
        let Fields {
            style,
            value,
            min,
            max,
            wheel_step,
        } = record.fields_as()?;
        let mut slider = Self {
            core: record.restore_core(),
            style,
            value: min,
            min,
            max,
            wheel_step: wheel_step.unwrap_or(default_step(min, max)),
            dragging: false,
        };
        slider.set_value(value);
        Ok(Component::new(slider))
    }

    /// Current value.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Set the value, clamped to the range.
    pub fn set_value(&mut self, value: f64) {
        self.value = value.clamp(self.min, self.max.max(self.min));
    }

    /// Whether a drag is in progress.
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    fn ratio(&self) -> f64 {
        let span = self.max - self.min;
        if span > 0.0 {
            ((self.value - self.min) / span).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    fn follow(&mut self, at: Point) {
        let b = self.core.bounds();
        if b.width <= 0.0 {
            return;
        }
        let t = ((at.x - b.x) / b.width).clamp(0.0, 1.0);
        self.set_value(self.min + t * (self.max - self.min));
    }
}

fn default_step(min: f64, max: f64) -> f64 {
    (max - min).abs() / 20.0
}

impl UiComponent for Slider {
    fn core(&self) -> &ComponentCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ComponentCore {
        &mut self.core
    }

    fn class_name(&self) -> &'static str {
        Self::CLASS_NAME
    }

    fn draw(&self, renderer: &mut dyn Renderer) {
        let r = scaled_rect(self.core.bounds(), self.core.scale());
        let h = r.height();
        let track_h = h / 2.0;
        let track_y = r.y0 + (h - track_h) / 2.0;
        let ratio = self.ratio();
        let track = Rect::new(r.x0, track_y, r.x1, track_y + track_h);
        renderer.fill_rounded_rect(track, track_h / 2.0, self.style.track_color, None);
        let filled = Rect::new(r.x0, track_y, r.x0 + r.width() * ratio, track_y + track_h);
        renderer.fill_rounded_rect(filled, track_h / 2.0, self.style.fill_color, None);
        renderer.fill_circle(
            Point::new(r.x0 + r.width() * ratio, r.y0 + h / 2.0),
            h / 2.0,
            self.style.knob_color,
        );
    }

    fn get_property(&self, property: ComponentProperty) -> Result<Value, PropertyError> {
        match property {
            ComponentProperty::Value => Ok(Value::Number(self.value)),
            ComponentProperty::FillColor => Ok(Value::Color(self.style.fill_color)),
            _ => self.core.get_property(property),
        }
    }

    fn set_property(
        &mut self,
        property: ComponentProperty,
        value: Value,
    ) -> Result<(), PropertyError> {
        match property {
            ComponentProperty::Value => self.set_value(property::number(property, &value)?),
            ComponentProperty::FillColor => {
                self.style.fill_color = property::color(property, &value)?;
            }
            _ => return self.core.set_property(property, value),
        }
        Ok(())
    }

    fn record_fields(&self) -> Map<String, serde_json::Value> {
        to_fields(&Fields {
            style: self.style.clone(),
            value: self.value,
            min: self.min,
            max: self.max,
            wheel_step: Some(self.wheel_step),
        })
    }

    fn handle_pointer_down(&mut self, event: &PointerEvent) {
        self.dragging = true;
        self.follow(event.position);
    }

    fn handle_pointer_move(&mut self, event: &PointerEvent) {
        if self.dragging {
            self.follow(event.position);
        }
    }

    fn handle_pointer_up(&mut self, _: &PointerEvent) {
        self.dragging = false;
    }

    fn handle_pointer_leave(&mut self, _: &PointerEvent) {
        self.dragging = false;
    }

    fn accepts_wheel(&self) -> bool {
        true
    }

    fn handle_wheel_scroll(&mut self, event: &WheelEvent) {
        if event.delta.y < 0.0 {
            self.set_value(self.value + self.wheel_step);
        } else if event.delta.y > 0.0 {
            self.set_value(self.value - self.wheel_step);
        }
    }
}

#[cfg(test)]
mod tests {
    use canopy_effect::EventKind;
    use kurbo::Vec2;

    use super::*;

    fn at(kind: EventKind, x: f64) -> PointerEvent {
        PointerEvent {
            kind,
            pointer_id: 1,
            position: Point::new(x, 10.0),
            timestamp_ms: 0.0,
            button: 0,
        }
    }

    fn wheel(dy: f64) -> WheelEvent {
        WheelEvent {
            position: Point::new(50.0, 10.0),
            delta: Vec2::new(0.0, dy),
            timestamp_ms: 0.0,
        }
    }

    fn slider() -> Slider {
        Slider::new(Rectangle::new(0.0, 0.0, 100.0, 20.0), 0.0, 10.0, 5.0)
    }

    #[test]
    fn drag_follows_pointer_until_release() {
        let mut s = slider();
        s.handle_pointer_move(&at(EventKind::PointerMove, 90.0));
        assert_eq!(s.value(), 5.0);

        s.handle_pointer_down(&at(EventKind::PointerDown, 20.0));
        assert_eq!(s.value(), 2.0);
        s.handle_pointer_move(&at(EventKind::PointerMove, 150.0));
        assert_eq!(s.value(), 10.0);

        s.handle_pointer_up(&at(EventKind::PointerUp, 150.0));
        s.handle_pointer_move(&at(EventKind::PointerMove, 0.0));
        assert_eq!(s.value(), 10.0);
    }

    #[test]
    fn leaving_ends_the_drag() {
        let mut s = slider();
        s.handle_pointer_down(&at(EventKind::PointerDown, 50.0));
        s.handle_pointer_leave(&at(EventKind::PointerLeave, 120.0));
        assert!(!s.is_dragging());
    }

    #[test]
    fn wheel_up_increases_and_clamps() {
        let mut s = slider().with_wheel_step(3.0);
        assert!(s.accepts_wheel());
        s.handle_wheel_scroll(&wheel(-1.0));
        assert_eq!(s.value(), 8.0);
        s.handle_wheel_scroll(&wheel(-1.0));
        assert_eq!(s.value(), 10.0);
        s.handle_wheel_scroll(&wheel(4.0));
        assert_eq!(s.value(), 7.0);
        s.handle_wheel_scroll(&wheel(0.0));
        assert_eq!(s.value(), 7.0);
    }

    #[test]
    fn value_property_is_clamped() {
        let c = slider().into_component();
        c.set(ComponentProperty::Value, (-3.0).into()).unwrap();
        assert_eq!(c.get(ComponentProperty::Value), Ok(Value::Number(0.0)));
    }
}
