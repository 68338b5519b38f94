// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use canopy_animation::{PropertyError, Value};
use canopy_index::Rectangle;
use kurbo::Point;
use serde_json::Map;

use crate::component::{Component, UiComponent};
use crate::core::ComponentCore;
use crate::error::ComponentError;
use crate::property::ComponentProperty;
use crate::record::ComponentRecord;
use crate::render::Renderer;
use crate::types::{Color, ComponentId};
use crate::widgets::{scaled_rect, to_fields};

/// Arrangement and background of a [`Panel`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PanelLayout {
    /// Lay children out left to right instead of top to bottom.
    pub horizontal: bool,
    /// Gap between the panel edge and its children.
    pub padding: f64,
    /// Gap between consecutive children.
    pub spacing: f64,
    /// Background fill.
    pub background_color: Color,
    /// Background corner radius.
    pub corner_radius: f64,
}

impl Default for PanelLayout {
    fn default() -> Self {
        Self {
            horizontal: false,
            padding: 20.0,
            spacing: 20.0,
            background_color: [0.1, 0.1, 0.1, 0.8],
            corner_radius: 10.0,
        }
    }
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct FieldsOut<'a> {
    #[serde(flatten)]
    layout: &'a PanelLayout,
    bounds_explicit: bool,
    children: Vec<ComponentId>,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct FieldsIn {
    #[serde(flatten)]
    layout: PanelLayout,
    #[serde(default)]
    bounds_explicit: bool,
}

/// A container stacking its children in a row or a column.
///
/// Children stay separate components: the controller indexes, hit-tests and
/// draws them on their own, and the panel only positions them. A panel made
/// with [`Panel::fitted`] grows to wrap its children.
///
/// A panel never contains itself, directly or through nested panels.
#[derive(Debug)]
pub struct Panel {
    core: ComponentCore,
    layout: PanelLayout,
    children: Vec<Component>,
    bounds_explicit: bool,
}

impl Panel {
    /// Persisted class name.
    pub const CLASS_NAME: &'static str = "PanelContainerComponent";

    /// A panel with fixed `bounds`.
    pub fn new(bounds: Rectangle, layout: PanelLayout) -> Self {
        Self {
            core: ComponentCore::new(bounds),
            layout,
            children: Vec::new(),
            bounds_explicit: true,
        }
    }

    /// A panel at `position` sized to its children.
    pub fn fitted(position: Point, layout: PanelLayout) -> Self {
        let mut panel = Self::new(Rectangle::new(position.x, position.y, 0.0, 0.0), layout);
        panel.bounds_explicit = false;
        panel.layout_children();
        panel
    }

    /// Same panel holding `child` as well.
    #[must_use]
    pub fn with_child(mut self, child: Component) -> Self {
        self.push(child);
        self
    }

    /// Wrap the panel.
    pub fn into_component(self) -> Component {
        Component::new(self)
    }

    /// Rebuild a panel from its record. Children are attached once every
    /// component of the scene exists.
    pub fn from_record(record: &ComponentRecord) -> Result<Component, ComponentError> {
        let FieldsIn {
            layout,
            bounds_explicit,
        } = record.fields_as()?;
        Ok(Component::new(Self {
            core: record.restore_core(),
            layout,
            children: Vec::new(),
            bounds_explicit,
        }))
    }

    /// Arrangement.
    pub fn layout(&self) -> &PanelLayout {
        &self.layout
    }

    /// Change the arrangement and lay the children out again.
    pub fn set_layout(&mut self, layout: PanelLayout) {
        self.layout = layout;
        self.layout_children();
    }

    fn push(&mut self, child: Component) {
        if self.children.contains(&child) {
            return;
        }
        self.children.push(child);
        self.layout_children();
    }

    /// Adopt `child` unless doing so would make the panel its own descendant.
    fn adopt(&mut self, child: Component) -> bool {
        if reaches_borrowed(&child) {
            log::warn!("panel {}: refusing a child that contains it", self.core.id());
            return false;
        }
        self.push(child);
        true
    }

    /// Place every child, then wrap them if the panel sizes itself.
    fn layout_children(&mut self) {
        let origin = self.core.position();
        let PanelLayout {
            horizontal,
            padding,
            spacing,
            ..
        } = self.layout;
        let mut offset = 0.0;
        let mut breadth: f64 = 0.0;
        for child in &self.children {
            let mut c = child.borrow_mut();
            let slot = if horizontal {
                Point::new(origin.x + padding + offset, origin.y + padding)
            } else {
                Point::new(origin.x + padding, origin.y + padding + offset)
            };
            c.place(slot);
            let b = c.core().bounds();
            let (along, across) = if horizontal {
                (b.width, b.height)
            } else {
                (b.height, b.width)
            };
            offset += along + spacing;
            breadth = breadth.max(across);
        }
        if self.bounds_explicit {
            return;
        }
        let length = if self.children.is_empty() {
            0.0
        } else {
            offset - spacing
        };
        let (w, h) = if horizontal {
            (length, breadth)
        } else {
            (breadth, length)
        };
        self.core.set_bounds(Rectangle::new(
            origin.x,
            origin.y,
            w + 2.0 * padding,
            h + 2.0 * padding,
        ));
    }
}

/// Whether `root` or anything below it is mutably borrowed.
///
/// Children are added through a mutable borrow of the panel, so this finds
/// the panel among the child's descendants without knowing its handle.
fn reaches_borrowed(root: &Component) -> bool {
    let mut pending = vec![root.clone()];
    let mut seen: Vec<Component> = Vec::new();
    while let Some(next) = pending.pop() {
        if seen.contains(&next) {
            continue;
        }
        let Ok(component) = next.try_borrow() else {
            return true;
        };
        pending.extend(component.children());
        drop(component);
        seen.push(next);
    }
    false
}

impl UiComponent for Panel {
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
        renderer.fill_rounded_rect(
            scaled_rect(self.core.bounds(), scale),
            self.layout.corner_radius * scale,
            self.layout.background_color,
            None,
        );
    }

    fn set_property(
        &mut self,
        property: ComponentProperty,
        value: Value,
    ) -> Result<(), PropertyError> {
        self.core.set_property(property, value)?;
        match property {
            ComponentProperty::Bounds => {
                self.bounds_explicit = true;
                self.layout_children();
            }
            ComponentProperty::Position => self.layout_children(),
            _ => {}
        }
        Ok(())
    }

    fn align(&mut self, container: Rectangle) {
        self.core.align(container);
        self.layout_children();
    }

    fn place(&mut self, position: Point) {
        self.core.set_position(position);
        self.layout_children();
    }

    fn handle_resize(&mut self, _: Rectangle) {
        self.layout_children();
    }

    fn children(&self) -> Vec<Component> {
        self.children.clone()
    }

    fn add_child(&mut self, child: Component) -> bool {
        self.adopt(child)
    }

    fn record_fields(&self) -> Map<String, serde_json::Value> {
        to_fields(&FieldsOut {
            layout: &self.layout,
            bounds_explicit: self.bounds_explicit,
            children: self.children.iter().map(Component::id).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::tests::plain;

    fn positions(children: &[Component]) -> Vec<Point> {
        children.iter().map(|c| c.borrow().core().position()).collect()
    }

    #[test]
    fn column_stacks_with_padding_and_spacing() {
        let a = plain(0.0, 0.0, 50.0, 10.0);
        let b = plain(0.0, 0.0, 80.0, 30.0);
        let panel = Panel::fitted(Point::new(100.0, 100.0), PanelLayout::default())
            .with_child(a.clone())
            .with_child(b.clone());
        assert_eq!(
            positions(&[a, b]),
            [Point::new(120.0, 120.0), Point::new(120.0, 150.0)]
        );
        // 80 wide, 10 + 20 + 30 tall, plus padding on both sides.
        assert_eq!(panel.core().bounds(), Rectangle::new(100.0, 100.0, 120.0, 100.0));
    }

    #[test]
    fn row_keeps_explicit_bounds() {
        let layout = PanelLayout {
            horizontal: true,
            padding: 5.0,
            spacing: 10.0,
            ..PanelLayout::default()
        };
        let a = plain(0.0, 0.0, 20.0, 20.0);
        let b = plain(0.0, 0.0, 20.0, 20.0);
        let bounds = Rectangle::new(0.0, 0.0, 300.0, 40.0);
        let panel = Panel::new(bounds, layout)
            .with_child(a.clone())
            .with_child(b.clone());
        assert_eq!(positions(&[a, b]), [Point::new(5.0, 5.0), Point::new(35.0, 5.0)]);
        assert_eq!(panel.core().bounds(), bounds);
    }

    #[test]
    fn moving_the_panel_moves_its_children() {
        let a = plain(0.0, 0.0, 10.0, 10.0);
        let panel = Panel::fitted(Point::ORIGIN, PanelLayout::default())
            .with_child(a.clone())
            .into_component();
        panel
            .set(ComponentProperty::Position, Point::new(50.0, 60.0).into())
            .unwrap();
        assert_eq!(a.borrow().core().position(), Point::new(70.0, 80.0));
        assert_eq!(panel.borrow().children(), [a.clone()]);
        // Adding a child twice keeps one copy.
        assert!(panel.borrow_mut().add_child(a));
        assert_eq!(panel.borrow().children().len(), 1);
    }

    #[test]
    fn refuses_itself_and_its_ancestors() {
        let inner = Panel::fitted(Point::ORIGIN, PanelLayout::default()).into_component();
        let outer = Panel::fitted(Point::ORIGIN, PanelLayout::default())
            .with_child(inner.clone())
            .into_component();

        assert!(!outer.borrow_mut().add_child(outer.clone()));
        assert!(!inner.borrow_mut().add_child(outer.clone()));
        assert_eq!(outer.borrow().children(), [inner.clone()]);
        assert!(inner.borrow().children().is_empty());

        // Siblings shared between panels are fine.
        let leaf = plain(0.0, 0.0, 10.0, 10.0);
        assert!(inner.borrow_mut().add_child(leaf.clone()));
        assert!(outer.borrow_mut().add_child(leaf));
        assert_eq!(outer.borrow().children().len(), 2);
    }

    #[test]
    fn record_lists_child_ids() {
        let a = plain(0.0, 0.0, 10.0, 10.0);
        let panel = Panel::fitted(Point::ORIGIN, PanelLayout::default())
            .with_child(a.clone())
            .into_component();
        let record = panel.borrow().to_record(&mut |_| None);
        assert_eq!(record.child_ids(), [a.id()]);
        let restored = Panel::from_record(&record).unwrap();
        assert!(restored.borrow().children().is_empty());
        assert_eq!(restored.borrow().core().bounds(), panel.borrow().core().bounds());
    }
}
