// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! State shared by every component.

use std::collections::BTreeSet;
use std::fmt;

use canopy_animation::{PropertyError, Value};
use canopy_effect::{EffectBinder, EventKind};
use canopy_index::Rectangle;
use kurbo::{Point, Rect};

use crate::event::{PointerEvent, WheelEvent};
use crate::property::{self, ComponentProperty};
use crate::types::{AlignmentPoint, ComponentFlags, ComponentId};

/// Application callback for one pointer event kind.
pub type PointerHandler = Box<dyn FnMut(&PointerEvent)>;

/// Application callback for wheel events.
pub type WheelHandler = Box<dyn FnMut(&WheelEvent)>;

/// Callback run with the new bounds whenever a component's bounds change.
pub type ResizeListener = Box<dyn FnMut(Rectangle)>;

/// Default inset used by [`ComponentCore::align`].
pub const DEFAULT_ALIGNMENT_OFFSET: f64 = 25.0;

#[derive(Default)]
struct Handlers {
    pointer: [Option<PointerHandler>; 5],
    wheel: Option<WheelHandler>,
}

fn slot(kind: EventKind) -> usize {
    match kind {
        EventKind::PointerDown => 0,
        EventKind::PointerUp => 1,
        EventKind::PointerEnter => 2,
        EventKind::PointerLeave => 3,
        EventKind::PointerMove => 4,
    }
}

/// Geometry, flags, effect bindings and callbacks of a component.
///
/// Bounds are the hit-test box in device pixels; the position is their
/// top-left corner. Scale is a draw-time factor applied around the center of
/// the bounds and does not change hit testing.
pub struct ComponentCore {
    id: ComponentId,
    bounds: Rectangle,
    scale: f64,
    z_index: i32,
    tags: BTreeSet<String>,
    flags: ComponentFlags,
    alignment_point: AlignmentPoint,
    alignment_offset: f64,
    effects: EffectBinder,
    handlers: Handlers,
    resize_listeners: Vec<ResizeListener>,
}

impl fmt::Debug for ComponentCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentCore")
            .field("id", &self.id)
            .field("bounds", &self.bounds)
            .field("scale", &self.scale)
            .field("z_index", &self.z_index)
            .field("tags", &self.tags)
            .field("flags", &self.flags)
            .field("alignment_point", &self.alignment_point)
            .field("alignment_offset", &self.alignment_offset)
            .field("effects", &self.effects)
            .finish_non_exhaustive()
    }
}

impl ComponentCore {
    /// Core with a fresh id and the given bounds.
    pub fn new(bounds: Rectangle) -> Self {
        Self::with_id(ComponentId::next(), bounds)
    }

    /// Core with a known id, for restoring persisted components.
    pub fn with_id(id: ComponentId, bounds: Rectangle) -> Self {
        Self {
            id,
            bounds,
            scale: 1.0,
            z_index: 0,
            tags: BTreeSet::new(),
            flags: ComponentFlags::default(),
            alignment_point: AlignmentPoint::None,
            alignment_offset: DEFAULT_ALIGNMENT_OFFSET,
            effects: EffectBinder::new(),
            handlers: Handlers::default(),
            resize_listeners: Vec::new(),
        }
    }

    /// Component id.
    pub fn id(&self) -> ComponentId {
        self.id
    }

    /// Hit-test bounds.
    pub fn bounds(&self) -> Rectangle {
        self.bounds
    }

    /// Replace the bounds, moving the position with them, and notify resize listeners.
    pub fn set_bounds(&mut self, bounds: Rectangle) {
        self.bounds = bounds;
        if self.resize_listeners.is_empty() {
            return;
        }
        let mut listeners = std::mem::take(&mut self.resize_listeners);
        for listener in &mut listeners {
            listener(bounds);
        }
        // Keep listeners added while the old ones ran.
        listeners.append(&mut self.resize_listeners);
        self.resize_listeners = listeners;
    }

    /// Top-left corner of the bounds.
    pub fn position(&self) -> Point {
        Point::new(self.bounds.x, self.bounds.y)
    }

    /// Move the bounds, keeping their size.
    pub fn set_position(&mut self, position: Point) {
        let b = self.bounds;
        self.set_bounds(Rectangle::new(position.x, position.y, b.width, b.height));
    }

    /// Draw scale.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Set the draw scale.
    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
    }

    /// Paint order; higher is drawn later.
    pub fn z_index(&self) -> i32 {
        self.z_index
    }

    /// Set the paint order.
    pub fn set_z_index(&mut self, z_index: i32) {
        self.z_index = z_index;
    }

    /// Tags, ordered.
    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    /// Whether the component carries `tag`.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Add a tag. Returns `false` if it was already present.
    pub fn add_tag(&mut self, tag: impl Into<String>) -> bool {
        self.tags.insert(tag.into())
    }

    /// Remove a tag. Returns whether it was present.
    pub fn remove_tag(&mut self, tag: &str) -> bool {
        self.tags.remove(tag)
    }

    /// Replace every tag.
    pub fn set_tags<I, S>(&mut self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
    }

    /// Flags.
    pub fn flags(&self) -> ComponentFlags {
        self.flags
    }

    /// Replace the flags.
    pub fn set_flags(&mut self, flags: ComponentFlags) {
        self.flags = flags;
    }

    /// Whether the component is drawn and receives input.
    pub fn is_visible(&self) -> bool {
        self.flags.contains(ComponentFlags::VISIBLE)
    }

    /// Show or hide the component.
    pub fn set_visible(&mut self, visible: bool) {
        self.flags.set(ComponentFlags::VISIBLE, visible);
    }

    /// Whether the host may drag the component.
    pub fn is_draggable(&self) -> bool {
        self.flags.contains(ComponentFlags::DRAGGABLE)
    }

    /// Allow or forbid dragging.
    pub fn set_draggable(&mut self, draggable: bool) {
        self.flags.set(ComponentFlags::DRAGGABLE, draggable);
    }

    /// Alignment point used by [`align`](Self::align).
    pub fn alignment_point(&self) -> AlignmentPoint {
        self.alignment_point
    }

    /// Set the alignment point.
    pub fn set_alignment_point(&mut self, point: AlignmentPoint) {
        self.alignment_point = point;
    }

    /// Inset from the container edges used by [`align`](Self::align).
    pub fn alignment_offset(&self) -> f64 {
        self.alignment_offset
    }

    /// Set the alignment inset.
    pub fn set_alignment_offset(&mut self, offset: f64) {
        self.alignment_offset = offset;
    }

    /// Move the component to its alignment point inside `container`.
    ///
    /// Edges named by the alignment point are inset by the alignment offset;
    /// centered axes are not. [`AlignmentPoint::None`] moves to the
    /// container's top-left corner.
    pub fn align(&mut self, container: Rectangle) {
        let (w, h) = (self.bounds.width, self.bounds.height);
        let inset = self.alignment_offset;
        let left = container.x + inset;
        let center_x = container.x + (container.width - w) / 2.0;
        let right = container.x + container.width - w - inset;
        let top = container.y + inset;
        let middle_y = container.y + (container.height - h) / 2.0;
        let bottom = container.y + container.height - h - inset;
        let (x, y) = match self.alignment_point {
            AlignmentPoint::None => (container.x, container.y),
            AlignmentPoint::TopLeft => (left, top),
            AlignmentPoint::TopCenter => (center_x, top),
            AlignmentPoint::TopRight => (right, top),
            AlignmentPoint::MiddleLeft => (left, middle_y),
            AlignmentPoint::MiddleCenter => (center_x, middle_y),
            AlignmentPoint::MiddleRight => (right, middle_y),
            AlignmentPoint::BottomLeft => (left, bottom),
            AlignmentPoint::BottomCenter => (center_x, bottom),
            AlignmentPoint::BottomRight => (right, bottom),
        };
        self.set_position(Point::new(x, y));
    }

    /// Scale uniformly to fit inside `target` and center there.
    ///
    /// The scale becomes the fitting factor and the bounds shrink or grow by
    /// it. Components with an empty extent are left alone.
    pub fn fit_bounds(&mut self, target: Rectangle) {
        let Rectangle { width, height, .. } = self.bounds;
        if width <= 0.0 || height <= 0.0 {
            return;
        }
        let factor = (target.width / width).min(target.height / height);
        let (w, h) = (width * factor, height * factor);
        self.set_scale(factor);
        self.set_bounds(Rectangle::new(
            target.x + (target.width - w) / 2.0,
            target.y + (target.height - h) / 2.0,
            w,
            h,
        ));
    }

    /// Effect bindings.
    pub fn effects(&self) -> &EffectBinder {
        &self.effects
    }

    /// Mutable effect bindings.
    pub fn effects_mut(&mut self) -> &mut EffectBinder {
        &mut self.effects
    }

    /// Install the application callback for `kind`, replacing any previous one.
    pub fn set_handler(&mut self, kind: EventKind, handler: impl FnMut(&PointerEvent) + 'static) {
        self.handlers.pointer[slot(kind)] = Some(Box::new(handler));
    }

    /// Remove the application callback for `kind`.
    pub fn clear_handler(&mut self, kind: EventKind) -> bool {
        self.handlers.pointer[slot(kind)].take().is_some()
    }

    /// Whether an application callback is installed for `kind`.
    pub fn has_handler(&self, kind: EventKind) -> bool {
        self.handlers.pointer[slot(kind)].is_some()
    }

    /// Take the callback for `kind` out so it can run without a borrow of the component.
    pub fn take_handler(&mut self, kind: EventKind) -> Option<PointerHandler> {
        self.handlers.pointer[slot(kind)].take()
    }

    /// Put a taken callback back, unless a new one was installed meanwhile.
    pub fn restore_handler(&mut self, kind: EventKind, handler: PointerHandler) {
        self.handlers.pointer[slot(kind)].get_or_insert(handler);
    }

    /// Install the wheel callback.
    pub fn set_wheel_handler(&mut self, handler: impl FnMut(&WheelEvent) + 'static) {
        self.handlers.wheel = Some(Box::new(handler));
    }

    /// Whether a wheel callback is installed.
    pub fn has_wheel_handler(&self) -> bool {
        self.handlers.wheel.is_some()
    }

    /// Take the wheel callback out.
    pub fn take_wheel_handler(&mut self) -> Option<WheelHandler> {
        self.handlers.wheel.take()
    }

    /// Put a taken wheel callback back, unless a new one was installed meanwhile.
    pub fn restore_wheel_handler(&mut self, handler: WheelHandler) {
        self.handlers.wheel.get_or_insert(handler);
    }

    /// Run `listener` with the new bounds on every bounds change.
    ///
    /// Listeners run while the component is borrowed; they must not reach
    /// back into it.
    pub fn add_resize_listener(&mut self, listener: impl FnMut(Rectangle) + 'static) {
        self.resize_listeners.push(Box::new(listener));
    }

    /// Drop every resize listener.
    pub fn clear_resize_listeners(&mut self) {
        self.resize_listeners.clear();
    }

    /// Read one of the properties every component has.
    pub fn get_property(&self, property: ComponentProperty) -> Result<Value, PropertyError> {
        Ok(match property {
            ComponentProperty::Position => Value::Point(self.position()),
            ComponentProperty::Scale => Value::Number(self.scale),
            ComponentProperty::Bounds => Value::Rect(to_rect(self.bounds)),
            ComponentProperty::ZIndex => Value::Number(f64::from(self.z_index)),
            ComponentProperty::Visible => Value::Bool(self.is_visible()),
            _ => return Err(property.unsupported()),
        })
    }

    /// Write one of the properties every component has.
    pub fn set_property(
        &mut self,
        property: ComponentProperty,
        value: Value,
    ) -> Result<(), PropertyError> {
        match property {
            ComponentProperty::Position => self.set_position(property::point(property, &value)?),
            ComponentProperty::Scale => self.set_scale(property::number(property, &value)?),
            ComponentProperty::Bounds => {
                self.set_bounds(from_rect(property::rect(property, &value)?));
            }
            ComponentProperty::ZIndex => {
                let z = property::number(property, &value)?.round();
                #[allow(
                    clippy::cast_possible_truncation,
                    reason = "Out-of-range z-indices saturate."
                )]
                self.set_z_index(z as i32);
            }
            ComponentProperty::Visible => self.set_visible(property::flag(property, &value)?),
            _ => return Err(property.unsupported()),
        }
        Ok(())
    }
}

/// Convert index bounds to a kurbo rectangle.
pub fn to_rect(r: Rectangle) -> Rect {
    Rect::new(r.x, r.y, r.x + r.width, r.y + r.height)
}

/// Convert a kurbo rectangle to index bounds.
pub fn from_rect(r: Rect) -> Rectangle {
    let r = r.abs();
    Rectangle::from_min_max(r.x0, r.y0, r.x1, r.y1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn core(x: f64, y: f64, w: f64, h: f64) -> ComponentCore {
        ComponentCore::new(Rectangle::new(x, y, w, h))
    }

    #[test]
    fn set_position_keeps_size() {
        let mut c = core(10.0, 10.0, 50.0, 20.0);
        c.set_position(Point::new(100.0, 5.0));
        assert_eq!(c.bounds(), Rectangle::new(100.0, 5.0, 50.0, 20.0));
        assert_eq!(c.position(), Point::new(100.0, 5.0));
    }

    #[test]
    fn align_uses_point_and_offset() {
        let container = Rectangle::new(0.0, 0.0, 800.0, 600.0);
        let mut c = core(0.0, 0.0, 100.0, 50.0);
        c.set_alignment_offset(10.0);

        c.set_alignment_point(AlignmentPoint::TopLeft);
        c.align(container);
        assert_eq!(c.position(), Point::new(10.0, 10.0));

        c.set_alignment_point(AlignmentPoint::MiddleCenter);
        c.align(container);
        assert_eq!(c.position(), Point::new(350.0, 275.0));

        c.set_alignment_point(AlignmentPoint::BottomRight);
        c.align(container);
        assert_eq!(c.position(), Point::new(690.0, 540.0));

        c.set_alignment_point(AlignmentPoint::None);
        c.align(Rectangle::new(40.0, 30.0, 10.0, 10.0));
        assert_eq!(c.position(), Point::new(40.0, 30.0));
    }

    #[test]
    fn fit_bounds_scales_uniformly_and_centers() {
        let mut c = core(0.0, 0.0, 100.0, 50.0);
        c.fit_bounds(Rectangle::new(0.0, 0.0, 200.0, 200.0));
        assert_eq!(c.scale(), 2.0);
        assert_eq!(c.bounds(), Rectangle::new(0.0, 50.0, 200.0, 100.0));

        let mut empty = core(5.0, 5.0, 0.0, 10.0);
        empty.fit_bounds(Rectangle::new(0.0, 0.0, 200.0, 200.0));
        assert_eq!(empty.scale(), 1.0);
    }

    #[test]
    fn resize_listeners_see_new_bounds() {
        let mut c = core(0.0, 0.0, 10.0, 10.0);
        let seen = Rc::new(Cell::new(0.0));
        let s = seen.clone();
        c.add_resize_listener(move |b| s.set(b.x));
        c.set_position(Point::new(42.0, 0.0));
        assert_eq!(seen.get(), 42.0);
    }

    #[test]
    fn handlers_can_be_taken_and_restored() {
        let mut c = core(0.0, 0.0, 10.0, 10.0);
        c.set_handler(EventKind::PointerUp, |_| {});
        let h = c.take_handler(EventKind::PointerUp).unwrap();
        assert!(!c.has_handler(EventKind::PointerUp));
        c.restore_handler(EventKind::PointerUp, h);
        assert!(c.has_handler(EventKind::PointerUp));
        assert!(!c.has_handler(EventKind::PointerDown));
    }

    #[test]
    fn core_properties_round_trip_and_reject_widget_ones() {
        let mut c = core(0.0, 0.0, 10.0, 10.0);
        c.set_property(ComponentProperty::ZIndex, Value::Number(2.6))
            .unwrap();
        assert_eq!(c.z_index(), 3);
        c.set_property(ComponentProperty::Visible, Value::Bool(false))
            .unwrap();
        assert!(!c.is_visible());
        c.set_property(
            ComponentProperty::Bounds,
            Value::Rect(Rect::new(1.0, 2.0, 4.0, 6.0)),
        )
        .unwrap();
        assert_eq!(c.bounds(), Rectangle::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(
            c.get_property(ComponentProperty::IsOn),
            Err(PropertyError::Unsupported("isOn"))
        );
    }
}
