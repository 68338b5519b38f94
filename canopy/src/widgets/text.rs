// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Static text, bare or boxed.
//!
//! Canopy has no font metrics of its own, so text is measured with a fixed
//! advance per character and a fixed line height, both relative to the text
//! size. Hosts whose fonts differ much from that can set explicit bounds.

use canopy_animation::{PropertyError, Value};
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

/// Width of one character, in multiples of the text size.
const ADVANCE: f64 = 0.5;
/// Distance between baselines, in multiples of the text size.
const LINE_HEIGHT: f64 = 1.25;

fn line_width(line: &str, size: f64) -> f64 {
    line.chars().count() as f64 * size * ADVANCE
}

/// Break `text` into lines no wider than `max_width`, at spaces.
///
/// Newlines always break. A word wider than `max_width` gets a line of its
/// own. A `max_width` of zero or less disables wrapping.
fn wrap(text: &str, size: f64, max_width: f64) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        if max_width <= 0.0 {
            lines.push(paragraph.to_owned());
            continue;
        }
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            if !line.is_empty()
                && line_width(&line, size) + line_width(word, size) + size * ADVANCE > max_width
            {
                lines.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(word);
        }
        lines.push(line);
    }
    lines
}

/// Width and height of wrapped lines.
fn extent(lines: &[String], size: f64) -> (f64, f64) {
    let width = lines
        .iter()
        .map(|l| line_width(l, size))
        .fold(0.0, f64::max);
    (width, lines.len() as f64 * size * LINE_HEIGHT)
}

fn draw_lines(
    renderer: &mut dyn Renderer,
    lines: &[String],
    origin: Point,
    size: f64,
    color: Color,
) {
    for (i, line) in lines.iter().enumerate() {
        if line.is_empty() {
            continue;
        }
        let y = origin.y + i as f64 * size * LINE_HEIGHT;
        renderer.draw_text(Point::new(origin.x, y), line, size, color);
    }
}

/// Appearance of a [`Text`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextStyle {
    /// Text size in device pixels.
    pub text_size: f64,
    /// Text color.
    pub text_color: Color,
    /// Fill behind the text; fully transparent draws nothing.
    pub background_color: Color,
    /// Wrap width in device pixels; zero keeps each paragraph on one line.
    pub max_width: f64,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            text_size: 16.0,
            text_color: [0.0, 0.0, 0.0, 1.0],
            background_color: [0.0, 0.0, 0.0, 0.0],
            max_width: 0.0,
        }
    }
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct TextFieldsOut<'a> {
    text: &'a str,
    #[serde(flatten)]
    style: &'a TextStyle,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct TextFieldsIn {
    #[serde(default)]
    text: String,
    #[serde(flatten)]
    style: TextStyle,
}

/// A block of text sized to its content.
///
/// Changing the text re-wraps it and resizes the bounds, keeping the
/// top-left corner in place.
#[derive(Debug)]
pub struct Text {
    core: ComponentCore,
    text: String,
    style: TextStyle,
    lines: Vec<String>,
}

impl Text {
    /// Persisted class name.
    pub const CLASS_NAME: &'static str = "TextComponent";

    /// Text with its top-left corner at `position`.
    pub fn new(position: Point, text: impl Into<String>, style: TextStyle) -> Self {
        let mut this = Self {
            core: ComponentCore::new(Rectangle::new(position.x, position.y, 0.0, 0.0)),
            text: text.into(),
            style,
            lines: Vec::new(),
        };
        this.relayout();
        this
    }

    /// Wrap the text.
    pub fn into_component(self) -> Component {
        Component::new(self)
    }

    /// Rebuild text from its record, keeping the persisted bounds.
    pub fn from_record(record: &ComponentRecord) -> Result<Component, ComponentError> {
        let TextFieldsIn { text, style } = record.fields_as()?;
        let lines = wrap(&text, style.text_size, style.max_width);
        Ok(Component::new(Self {
            core: record.restore_core(),
            text,
            style,
            lines,
        }))
    }

    /// Displayed text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Appearance.
    pub fn style(&self) -> &TextStyle {
        &self.style
    }

    /// Lines as wrapped.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Replace the text and resize to it.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.relayout();
    }

    /// Wrap to the width of `target` and shrink the text size until the
    /// block fits inside it. The text never grows. The block moves to the
    /// top-left corner of `target`.
    pub fn fit_bounds(&mut self, target: Rectangle) {
        self.style.max_width = target.width;
        let lines = wrap(&self.text, self.style.text_size, target.width);
        let (w, h) = extent(&lines, self.style.text_size);
        let size = self.style.text_size;
        let mut fitted = size;
        if w > 0.0 {
            fitted = fitted.min(size * target.width / w);
        }
        if h > 0.0 {
            fitted = fitted.min(size * target.height / h);
        }
        self.style.text_size = fitted;
        self.core.set_position(Point::new(target.x, target.y));
        self.relayout();
    }

    fn relayout(&mut self) {
        self.lines = wrap(&self.text, self.style.text_size, self.style.max_width);
        let (w, h) = extent(&self.lines, self.style.text_size);
        let origin = self.core.position();
        self.core.set_bounds(Rectangle::new(origin.x, origin.y, w, h));
    }
}

impl UiComponent for Text {
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
        if self.style.background_color[3] > 0.0 {
            renderer.fill_rect(rect, self.style.background_color);
        }
        draw_lines(
            renderer,
            &self.lines,
            Point::new(rect.x0, rect.y0),
            self.style.text_size * scale,
            self.style.text_color,
        );
    }

    fn get_property(&self, property: ComponentProperty) -> Result<Value, PropertyError> {
        match property {
            ComponentProperty::Text => Ok(Value::Text(self.text.clone())),
            ComponentProperty::TextColor => Ok(Value::Color(self.style.text_color)),
            ComponentProperty::FillColor => Ok(Value::Color(self.style.background_color)),
            _ => self.core.get_property(property),
        }
    }

    fn set_property(
        &mut self,
        property: ComponentProperty,
        value: Value,
    ) -> Result<(), PropertyError> {
        match property {
            ComponentProperty::Text => self.set_text(property::text(property, &value)?),
            ComponentProperty::TextColor => {
                self.style.text_color = property::color(property, &value)?;
            }
            ComponentProperty::FillColor => {
                self.style.background_color = property::color(property, &value)?;
            }
            _ => return self.core.set_property(property, value),
        }
        Ok(())
    }

    fn record_fields(&self) -> Map<String, serde_json::Value> {
        to_fields(&TextFieldsOut {
            text: &self.text,
            style: &self.style,
        })
    }
}

/// Appearance of a [`TextBox`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextBoxStyle {
    /// Text size in device pixels.
    pub text_size: f64,
    /// Text color.
    pub text_color: Color,
    /// Box fill.
    pub background_color: Color,
    /// Outline color.
    pub border_color: Color,
    /// Corner radius in device pixels.
    pub border_radius: f64,
    /// Outline width in device pixels; zero draws no outline.
    pub border_width: f64,
    /// Gap between the box edge and the text.
    pub inner_margin: f64,
    /// Wrap width of the text, margins excluded; zero disables wrapping.
    pub max_width: f64,
}

impl Default for TextBoxStyle {
    fn default() -> Self {
        Self {
            text_size: 16.0,
            text_color: [0.0, 0.0, 0.0, 1.0],
            background_color: [0.0, 0.0, 0.0, 0.5],
            border_color: [1.0, 1.0, 1.0, 1.0],
            border_radius: 5.0,
            border_width: 1.0,
            inner_margin: 15.0,
            max_width: 0.0,
        }
    }
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct BoxFieldsOut<'a> {
    text: &'a str,
    #[serde(flatten)]
    style: &'a TextBoxStyle,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct BoxFieldsIn {
    #[serde(default)]
    text: String,
    #[serde(flatten)]
    style: TextBoxStyle,
}

/// Text inside a rounded, outlined box with a margin all round.
#[derive(Debug)]
pub struct TextBox {
    core: ComponentCore,
    text: String,
    style: TextBoxStyle,
    lines: Vec<String>,
}

impl TextBox {
    /// Persisted class name.
    pub const CLASS_NAME: &'static str = "TextBoxComponent";

    /// A box with its top-left corner at `position`.
    pub fn new(position: Point, text: impl Into<String>, style: TextBoxStyle) -> Self {
        let mut this = Self {
            core: ComponentCore::new(Rectangle::new(position.x, position.y, 0.0, 0.0)),
            text: text.into(),
            style,
            lines: Vec::new(),
        };
        this.relayout();
        this
    }

    /// Wrap the box.
    pub fn into_component(self) -> Component {
        Component::new(self)
    }

    /// Rebuild a box from its record, keeping the persisted bounds.
    pub fn from_record(record: &ComponentRecord) -> Result<Component, ComponentError> {
        let BoxFieldsIn { text, style } = record.fields_as()?;
        let lines = wrap(&text, style.text_size, style.max_width);
        Ok(Component::new(Self {
            core: record.restore_core(),
            text,
            style,
            lines,
        }))
    }

    /// Displayed text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Appearance.
    pub fn style(&self) -> &TextBoxStyle {
        &self.style
    }

    /// Replace the text and resize the box to it.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.relayout();
    }

    fn relayout(&mut self) {
        self.lines = wrap(&self.text, self.style.text_size, self.style.max_width);
        let (w, h) = extent(&self.lines, self.style.text_size);
        let margin = self.style.inner_margin;
        let origin = self.core.position();
        self.core.set_bounds(Rectangle::new(
            origin.x,
            origin.y,
            w + 2.0 * margin,
            h + 2.0 * margin,
        ));
    }
}

impl UiComponent for TextBox {
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
        let outline = (self.style.border_width > 0.0)
            .then(|| (self.style.border_color, self.style.border_width * scale));
        renderer.fill_rounded_rect(
            rect,
            self.style.border_radius * scale,
            self.style.background_color,
            outline,
        );
        let margin = self.style.inner_margin * scale;
        draw_lines(
            renderer,
            &self.lines,
            Point::new(rect.x0 + margin, rect.y0 + margin),
            self.style.text_size * scale,
            self.style.text_color,
        );
    }

    fn get_property(&self, property: ComponentProperty) -> Result<Value, PropertyError> {
        match property {
            ComponentProperty::Text => Ok(Value::Text(self.text.clone())),
            ComponentProperty::TextColor => Ok(Value::Color(self.style.text_color)),
            ComponentProperty::FillColor => Ok(Value::Color(self.style.background_color)),
            _ => self.core.get_property(property),
        }
    }

    fn set_property(
        &mut self,
        property: ComponentProperty,
        value: Value,
    ) -> Result<(), PropertyError> {
        match property {
            ComponentProperty::Text => self.set_text(property::text(property, &value)?),
            ComponentProperty::TextColor => {
                self.style.text_color = property::color(property, &value)?;
            }
            ComponentProperty::FillColor => {
                self.style.background_color = property::color(property, &value)?;
            }
            _ => return self.core.set_property(property, value),
        }
        Ok(())
    }

    fn record_fields(&self) -> Map<String, serde_json::Value> {
        to_fields(&BoxFieldsOut {
            text: &self.text,
            style: &self.style,
        })
    }
}

#[cfg(test)]
mod tests {
    use canopy_animation::ValueKind;
    use kurbo::Rect;

    use super::*;
    use crate::widgets::tests::{Op, Recording};

    fn small(max_width: f64) -> TextStyle {
        TextStyle {
            text_size: 10.0,
            max_width,
            ..TextStyle::default()
        }
    }

    #[test]
    fn wraps_at_spaces_and_newlines() {
        assert_eq!(wrap("one two three", 10.0, 50.0), ["one two", "three"]);
        assert_eq!(wrap("one two three", 10.0, 0.0), ["one two three"]);
        assert_eq!(wrap("a\n\nb", 10.0, 0.0), ["a", "", "b"]);
        // Too long for the width, so it stands alone rather than being split.
        assert_eq!(wrap("x unbreakable y", 10.0, 20.0), ["x", "unbreakable", "y"]);
    }

    #[test]
    fn sizes_to_wrapped_lines_and_draws_each() {
        let text = Text::new(Point::new(10.0, 20.0), "one two three", small(50.0));
        assert_eq!(text.lines(), ["one two", "three"]);
        assert_eq!(text.core().bounds(), Rectangle::new(10.0, 20.0, 35.0, 25.0));

        let mut out = Recording::default();
        text.draw(&mut out);
        assert_eq!(
            out.ops,
            [
                Op::Text(Point::new(10.0, 20.0), "one two".to_owned()),
                Op::Text(Point::new(10.0, 32.5), "three".to_owned()),
            ]
        );
    }

    #[test]
    fn opaque_background_is_filled_behind_the_text() {
        let style = TextStyle {
            background_color: [1.0, 1.0, 0.0, 1.0],
            ..small(0.0)
        };
        let text = Text::new(Point::ORIGIN, "hi", style);
        let mut out = Recording::default();
        text.draw(&mut out);
        assert_eq!(out.ops[0], Op::Rect(Rect::new(0.0, 0.0, 10.0, 12.5), [1.0, 1.0, 0.0, 1.0]));
        assert_eq!(out.ops.len(), 2);
    }

    #[test]
    fn text_property_resizes() {
        let c = Text::new(Point::new(5.0, 5.0), "hello world", small(0.0)).into_component();
        c.set(ComponentProperty::Text, "hey".into()).unwrap();
        assert_eq!(c.get(ComponentProperty::Text), Ok(Value::Text("hey".to_owned())));
        assert_eq!(c.borrow().core().bounds(), Rectangle::new(5.0, 5.0, 15.0, 12.5));
        assert!(matches!(
            c.set(ComponentProperty::Text, 1.0.into()),
            Err(PropertyError::KindMismatch {
                expected: ValueKind::Text,
                ..
            })
        ));
    }

    #[test]
    fn fitting_shrinks_but_never_grows() {
        let style = TextStyle {
            text_size: 20.0,
            ..TextStyle::default()
        };
        let mut text = Text::new(Point::ORIGIN, "abcdefghij", style);
        text.fit_bounds(Rectangle::new(30.0, 40.0, 50.0, 100.0));
        assert_eq!(text.style().text_size, 10.0);
        assert_eq!(text.core().bounds(), Rectangle::new(30.0, 40.0, 50.0, 12.5));

        text.fit_bounds(Rectangle::new(0.0, 0.0, 1000.0, 1000.0));
        assert_eq!(text.style().text_size, 10.0);
        assert_eq!(text.core().bounds(), Rectangle::new(0.0, 0.0, 50.0, 12.5));
    }

    #[test]
    fn box_adds_margins_and_outline() {
        let style = TextBoxStyle {
            text_size: 10.0,
            inner_margin: 5.0,
            ..TextBoxStyle::default()
        };
        let boxed = TextBox::new(Point::ORIGIN, "hello", style.clone());
        assert_eq!(boxed.core().bounds(), Rectangle::new(0.0, 0.0, 35.0, 22.5));

        let mut out = Recording::default();
        boxed.draw(&mut out);
        assert_eq!(
            out.ops,
            [
                Op::RoundedRect(Rect::new(0.0, 0.0, 35.0, 22.5), style.background_color),
                Op::Text(Point::new(5.0, 5.0), "hello".to_owned()),
            ]
        );
    }

    #[test]
    fn records_keep_text_and_style() {
        let text = Text::new(Point::new(1.0, 2.0), "one two three", small(50.0)).into_component();
        let record = text.borrow().to_record(&mut |_| None);
        assert_eq!(record.fields["text"], "one two three");
        assert_eq!(record.fields["maxWidth"], 50.0);
        let restored = Text::from_record(&record).unwrap();
        assert_eq!(restored.get(ComponentProperty::Text), text.get(ComponentProperty::Text));
        assert_eq!(restored.borrow().core().bounds(), text.borrow().core().bounds());

        let style = TextBoxStyle {
            border_width: 0.0,
            ..TextBoxStyle::default()
        };
        let boxed = TextBox::new(Point::ORIGIN, "boxed", style).into_component();
        let record = boxed.borrow().to_record(&mut |_| None);
        let restored = TextBox::from_record(&record).unwrap();
        let (mut a, mut b) = (Recording::default(), Recording::default());
        boxed.borrow().draw(&mut a);
        restored.borrow().draw(&mut b);
        assert_eq!(a.ops, b.ops);
    }
}
