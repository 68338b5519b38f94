// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use canopy_animation::{PropertyError, Scheduler, Value};
use canopy_effect::{Effect, EventKind};
use canopy_index::Rectangle;
use kurbo::Point;
use serde_json::Map;

use crate::component::{Component, UiComponent};
use crate::core::ComponentCore;
use crate::error::ComponentError;
use crate::property::{self, ComponentProperty};
use crate::record::ComponentRecord;
use crate::render::Renderer;
use crate::types::Color;
use crate::widgets::{scaled_rect, to_fields};

const SWITCH_MS: f64 = 50.0;
const OUTLINE: (Color, f64) = ([0.2, 0.2, 0.2, 1.0], 2.0);
const KNOB_COLOR: Color = [1.0, 1.0, 1.0, 1.0];

/// Colors of a [`Toggle`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ToggleStyle {
    /// Track fill when on.
    pub on_color: Color,
    /// Track fill when off.
    pub off_color: Color,
}

impl Default for ToggleStyle {
    fn default() -> Self {
        Self {
            on_color: [0.0, 1.0, 0.0, 1.0],
            off_color: [1.0, 0.0, 0.0, 1.0],
        }
    }
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct FieldsOut<'a> {
    #[serde(flatten)]
    style: &'a ToggleStyle,
    is_on: bool,
    knob_position: f64,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct FieldsIn {
    #[serde(flatten)]
    style: ToggleStyle,
    #[serde(default)]
    is_on: bool,
    knob_position: Option<f64>,
}

/// An on/off switch with a sliding knob.
///
/// Each release flips `isOn` and slides the knob the other way.
#[derive(Debug)]
pub struct Toggle {
    core: ComponentCore,
    style: ToggleStyle,
    is_on: bool,
    knob_position: f64,
}

impl Toggle {
    /// Persisted class name.
    pub const CLASS_NAME: &'static str = "ToggleComponent";

    /// A switch filling `bounds`, with the knob resting at its state.
    pub fn new(bounds: Rectangle, is_on: bool, style: ToggleStyle) -> Self {
        Self {
            core: ComponentCore::new(bounds),
            style,
            is_on,
            knob_position: rest(is_on),
        }
    }

    /// Whether the switch is on.
    pub fn is_on(&self) -> bool {
        self.is_on
    }

    /// Knob travel, `0.0` (off) to `1.0` (on).
    pub fn knob_position(&self) -> f64 {
        self.knob_position
    }

    /// Wrap the switch and bind its release effects.
    ///
    /// The first release slides the knob away from the initial state.
    pub fn into_component(self) -> Component {
        let (from, to) = (rest(self.is_on), rest(!self.is_on));
        let component = Component::new(self);
        match Effect::animate_value(
            component.property(ComponentProperty::KnobPosition),
            from,
            to,
            SWITCH_MS,
        ) {
            Ok(slide) => component.bind(EventKind::PointerUp, slide.toggle(true)),
            Err(err) => log::warn!("toggle {}: knob effect not bound: {err}", component.id()),
        }
        component.bind(
            EventKind::PointerUp,
            Effect::toggle_value(component.property(ComponentProperty::IsOn), true, false),
        );
        component
    }

    /// Flip a switch as a release would. Returns how many effects applied.
    pub fn toggle(component: &Component, scheduler: &Scheduler) -> usize {
        component.apply_event(EventKind::PointerUp, scheduler)
    }

    /// Rebuild a switch from its record. Its effects are restored separately.
    pub fn from_record(record: &ComponentRecord) -> Result<Component, ComponentError> {
        let FieldsIn {
            style,
            is_on,
            knob_position,
        } = record.fields_as()?;
        Ok(Component::new(Self {
            core: record.restore_core(),
            style,
            is_on,
            knob_position: knob_position.unwrap_or(rest(is_on)),
        }))
    }
}

fn rest(is_on: bool) -> f64 {
    if is_on { 1.0 } else { 0.0 }
}

impl UiComponent for Toggle {
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
        let track = scaled_rect(self.core.bounds(), self.core.scale());
        let h = track.height();
        let fill = if self.is_on {
            self.style.on_color
        } else {
            self.style.off_color
        };
        renderer.fill_rounded_rect(track, h / 2.0, fill, Some(OUTLINE));

        let knob = h * 0.8;
        let inset = (h - knob) / 2.0;
        let off_x = track.x0 + inset;
        let on_x = track.x1 - knob - inset;
        let x = off_x + (on_x - off_x) * self.knob_position.clamp(0.0, 1.0);
        renderer.fill_circle(
            Point::new(x + knob / 2.0, track.y0 + h / 2.0),
            knob / 2.0,
            KNOB_COLOR,
        );
    }

    fn get_property(&self, property: ComponentProperty) -> Result<Value, PropertyError> {
        match property {
            ComponentProperty::KnobPosition => Ok(Value::Number(self.knob_position)),
            ComponentProperty::IsOn => Ok(Value::Bool(self.is_on)),
            _ => self.core.get_property(property),
        }
    }

    fn set_property(
        &mut self,
        property: ComponentProperty,
        value: Value,
    ) -> Result<(), PropertyError> {
        match property {
            ComponentProperty::KnobPosition => {
                self.knob_position = property::number(property, &value)?;
            }
            ComponentProperty::IsOn => self.is_on = property::flag(property, &value)?,
            _ => return self.core.set_property(property, value),
        }
        Ok(())
    }

    fn record_fields(&self) -> Map<String, serde_json::Value> {
        to_fields(&FieldsOut {
            style: &self.style,
            is_on: self.is_on,
            knob_position: self.knob_position,
        })
    }
}
