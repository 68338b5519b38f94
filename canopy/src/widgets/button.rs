// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::fmt::{self, Debug};
use std::rc::Rc;

use canopy_animation::{PropertyError, Value};
use canopy_effect::{Effect, EventKind};
use canopy_index::Rectangle;
use kurbo::{Point, Vec2};
use serde_json::Map;

use crate::component::{Component, UiComponent};
use crate::core::ComponentCore;
use crate::error::ComponentError;
use crate::property::{self, ComponentProperty};
use crate::record::ComponentRecord;
use crate::render::Renderer;
use crate::types::Color;
use crate::widgets::{scaled_rect, to_fields};

/// Called when a button press completes.
pub type ClickFn = Rc<dyn Fn()>;

const PRESS_MS: f64 = 100.0;
const PRESS_SCALE: f64 = 0.9;
const PRESS_DROP: Vec2 = Vec2::new(0.0, 5.0);

/// Appearance of a [`Button`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ButtonStyle {
    /// Caption.
    pub label: String,
    /// Caption size in device pixels.
    pub text_size: f64,
    /// Fill at rest.
    pub background_color: Color,
    /// Fill while hovered.
    pub highlight_color: Color,
    /// Fill while pressed.
    pub down_color: Color,
    /// Caption color.
    pub text_color: Color,
    /// Corner radius in device pixels.
    pub corner_radius: f64,
}

impl Default for ButtonStyle {
    fn default() -> Self {
        Self {
            label: String::new(),
            text_size: 16.0,
            background_color: [0.0, 0.0, 0.0, 0.3],
            highlight_color: [0.5, 0.5, 0.5, 1.0],
            down_color: [0.529, 0.808, 0.98, 1.0],
            text_color: [1.0, 1.0, 1.0, 1.0],
            corner_radius: 8.0,
        }
    }
}

impl ButtonStyle {
    /// Default style with the given caption.
    pub fn labeled(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct FieldsOut<'a> {
    #[serde(flatten)]
    style: &'a ButtonStyle,
    fill_color: Color,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct FieldsIn {
    #[serde(flatten)]
    style: ButtonStyle,
    fill_color: Option<Color>,
}

/// A captioned push button.
///
/// Hovering and pressing recolor it; releasing shrinks it and drops it a few
/// pixels, then springs back and calls the click callback once the spring
/// completes. All of this is bound as effects, so it persists with the button.
pub struct Button {
    core: ComponentCore,
    style: ButtonStyle,
    fill_color: Color,
    /// Position the press drop animates from; follows layout moves.
    rest_position: Point,
    on_click: Option<ClickFn>,
}

impl Debug for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Button")
            .field("core", &self.core)
            .field("style", &self.style)
            .field("fill_color", &self.fill_color)
            .field("rest_position", &self.rest_position)
            .field("has_on_click", &self.on_click.is_some())
            .finish_non_exhaustive()
    }
}

impl Button {
    /// Persisted class name.
    pub const CLASS_NAME: &'static str = "ButtonComponent";

    /// A button filling `bounds`.
    pub fn new(bounds: Rectangle, style: ButtonStyle) -> Self {
        Self {
            core: ComponentCore::new(bounds),
            fill_color: style.background_color,
            rest_position: Point::new(bounds.x, bounds.y),
            style,
            on_click: None,
        }
    }

    /// Run `f` after every completed press.
    #[must_use]
    pub fn on_click(mut self, f: impl Fn() + 'static) -> Self {
        self.on_click = Some(Rc::new(f));
        self
    }

    /// Appearance.
    pub fn style(&self) -> &ButtonStyle {
        &self.style
    }

    /// Current fill.
    pub fn fill_color(&self) -> Color {
        self.fill_color
    }

    /// Wrap the button and bind its hover and press effects.
    pub fn into_component(self) -> Component {
        let style = self.style.clone();
        let scale = self.core.scale();
        let rest = self.core.position();
        let on_click = self.on_click.clone();
        let component = Component::new(self);

        let fill = component.property(ComponentProperty::FillColor);
        component.bind(
            EventKind::PointerDown,
            Effect::set_value(fill.clone(), style.down_color),
        );
        component.bind(
            EventKind::PointerEnter,
            Effect::set_value(fill.clone(), style.highlight_color),
        );
        component.bind(
            EventKind::PointerLeave,
            Effect::set_value(fill, style.background_color),
        );

        let shrink = Effect::animate_value(
            component.property(ComponentProperty::Scale),
            scale,
            scale * PRESS_SCALE,
            PRESS_MS,
        )
        .map(|a| a.bounce(true));
        let dip = Effect::animate_value(
            component.property(ComponentProperty::Position),
            rest,
            rest + PRESS_DROP,
            PRESS_MS,
        )
        .map(|a| {
            let a = a.bounce(true);
            match on_click {
                Some(f) => a.on_complete(move |_| f()),
                None => a,
            }
        });
        for press in [shrink, dip] {
            match press {
                Ok(effect) => component.bind(EventKind::PointerUp, effect),
                Err(err) => log::warn!("button {}: press effect not bound: {err}", component.id()),
            }
        }
        component
    }

    /// Rebuild a button from its record. Its effects are restored separately.
    pub fn from_record(record: &ComponentRecord) -> Result<Component, ComponentError> {
        let FieldsIn { style, fill_color } = record.fields_as()?;
        let core = record.restore_core();
        Ok(Component::new(Self {
            rest_position: core.position(),
            fill_color: fill_color.unwrap_or(style.background_color),
            core,
            style,
            on_click: None,
        }))
    }

    /// Point the press drop at the current position after a layout move.
    fn follow_layout(&mut self) {
        let now = self.core.position();
        if now == self.rest_position {
            return;
        }
        let was = self.rest_position;
        let id = self.core.id();
        self.rest_position = now;
        for effect in self.core.effects_mut().effects_for_mut(EventKind::PointerUp) {
            let Effect::AnimateValue(press) = effect else {
                continue;
            };
            if press.target().name() != ComponentProperty::Position.name()
                || press.from().as_point() != Some(was)
            {
                continue;
            }
            match press.with_range(now, now + PRESS_DROP) {
                Ok(moved) => *press = moved,
                Err(err) => log::warn!("button {id}: press drop not moved: {err}"),
            }
        }
    }
}

impl UiComponent for Button {
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
        let scale = self.core.scale();
        let rect = scaled_rect(self.core.bounds(), scale);
        renderer.fill_rounded_rect(
            rect,
            self.style.corner_radius * scale,
            self.fill_color,
            None,
        );
        if !self.style.label.is_empty() {
            let size = self.style.text_size * scale;
            let origin = Point::new(rect.x0 + size / 2.0, rect.center().y - size / 2.0);
            renderer.draw_text(origin, &self.style.label, size, self.style.text_color);
        }
    }

    fn get_property(&self, property: ComponentProperty) -> Result<Value, PropertyError> {
        match property {
            ComponentProperty::FillColor => Ok(Value::Color(self.fill_color)),
            _ => self.core.get_property(property),
        }
    }

    fn set_property(
        &mut self,
        property: ComponentProperty,
        value: Value,
    ) -> Result<(), PropertyError> {
        match property {
            ComponentProperty::FillColor => {
                self.fill_color = property::color(property, &value)?;
                Ok(())
            }
            _ => self.core.set_property(property, value),
        }
    }

    fn align(&mut self, container: Rectangle) {
        self.core.align(container);
        self.follow_layout();
    }

    fn place(&mut self, position: Point) {
        self.core.set_position(position);
        self.follow_layout();
    }

    fn record_fields(&self) -> Map<String, serde_json::Value> {
        to_fields(&FieldsOut {
            style: &self.style,
            fill_color: self.fill_color,
        })
    }
}
