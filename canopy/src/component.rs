// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The component trait and the shared component handle.

use std::cell::{BorrowError, Ref, RefCell, RefMut};
use std::fmt;
use std::rc::{Rc, Weak};

use canopy_animation::{Animatable, PropertyError, PropertyRef, Scheduler, TargetKey, Value};
use canopy_effect::{Effect, EffectError, EffectSpec, EventKind, apply_effects};
use canopy_index::{Bounded, Rectangle};
use kurbo::Point;
use serde_json::Map;

use crate::core::ComponentCore;
use crate::event::{PointerEvent, WheelEvent};
use crate::property::ComponentProperty;
use crate::record::ComponentRecord;
use crate::render::Renderer;
use crate::types::ComponentId;

/// A positioned, drawable widget.
///
/// Implementors own a [`ComponentCore`] and add their own state and drawing.
/// The `handle_*` methods are the widget's built-in reaction to input; they
/// run after the component's bound effects and before application callbacks
/// installed on the core.
pub trait UiComponent: fmt::Debug {
    /// Shared state.
    fn core(&self) -> &ComponentCore;

    /// Mutable shared state.
    fn core_mut(&mut self) -> &mut ComponentCore;

    /// Class name used for persistence.
    fn class_name(&self) -> &'static str;

    /// Paint the component.
    fn draw(&self, renderer: &mut dyn Renderer);

    /// Read a property. Defaults to the properties every component has.
    fn get_property(&self, property: ComponentProperty) -> Result<Value, PropertyError> {
        self.core().get_property(property)
    }

    /// Write a property. Defaults to the properties every component has.
    fn set_property(
        &mut self,
        property: ComponentProperty,
        value: Value,
    ) -> Result<(), PropertyError> {
        self.core_mut().set_property(property, value)
    }

    /// Move to the component's alignment point inside `container`.
    fn align(&mut self, container: Rectangle) {
        self.core_mut().align(container);
    }

    /// Move to a slot chosen by a container's layout.
    fn place(&mut self, position: Point) {
        self.core_mut().set_position(position);
    }

    /// The canvas changed size; `canvas` is the new boundary in device pixels.
    fn handle_resize(&mut self, canvas: Rectangle) {
        let _ = canvas;
    }

    /// Components that are registered together with this one.
    fn children(&self) -> Vec<Component> {
        Vec::new()
    }

    /// Adopt `child` as a contained component. Returns `false` for
    /// components that are not containers.
    fn add_child(&mut self, child: Component) -> bool {
        let _ = child;
        false
    }

    /// Class-specific persisted fields, merged into the component record.
    fn record_fields(&self) -> Map<String, serde_json::Value> {
        Map::new()
    }

    /// Persisted form of the component.
    ///
    /// `id_of` maps effect targets to component ids.
    fn to_record(&self, id_of: &mut dyn FnMut(&PropertyRef) -> Option<u64>) -> ComponentRecord {
        ComponentRecord::capture(self.core(), self.class_name(), self.record_fields(), id_of)
    }

    /// Built-in reaction to a press.
    fn handle_pointer_down(&mut self, event: &PointerEvent) {
        let _ = event;
    }

    /// Built-in reaction to a release.
    fn handle_pointer_up(&mut self, event: &PointerEvent) {
        let _ = event;
    }

    /// Built-in reaction to the pointer entering the bounds.
    fn handle_pointer_enter(&mut self, event: &PointerEvent) {
        let _ = event;
    }

    /// Built-in reaction to the pointer leaving the bounds.
    fn handle_pointer_leave(&mut self, event: &PointerEvent) {
        let _ = event;
    }

    /// Built-in reaction to the pointer moving within the bounds.
    fn handle_pointer_move(&mut self, event: &PointerEvent) {
        let _ = event;
    }

    /// Whether wheel events are routed to this component.
    ///
    /// Defaults to whether an application wheel callback is installed.
    fn accepts_wheel(&self) -> bool {
        self.core().has_wheel_handler()
    }

    /// Built-in reaction to a wheel event.
    fn handle_wheel_scroll(&mut self, event: &WheelEvent) {
        let _ = event;
    }
}

impl Animatable for dyn UiComponent {
    type Property = ComponentProperty;

    fn property_name(property: ComponentProperty) -> &'static str {
        property.name()
    }

    fn get_property(&self, property: ComponentProperty) -> Result<Value, PropertyError> {
        UiComponent::get_property(self, property)
    }

    fn set_property(
        &mut self,
        property: ComponentProperty,
        value: Value,
    ) -> Result<(), PropertyError> {
        UiComponent::set_property(self, property, value)
    }
}

/// Shared handle to a component.
///
/// Handles compare by identity. Effects and animations refer to components
/// through weak [`PropertyRef`]s, so dropping the last handle drops the
/// component even while effects still name it.
#[derive(Clone)]
pub struct Component(Rc<RefCell<dyn UiComponent>>);

impl Component {
    /// Wrap a widget.
    pub fn new(widget: impl UiComponent + 'static) -> Self {
        let rc: Rc<RefCell<dyn UiComponent>> = Rc::new(RefCell::new(widget));
        Self(rc)
    }

    /// Borrow the component.
    ///
    /// Panics if it is mutably borrowed, as [`RefCell::borrow`] does.
    pub fn borrow(&self) -> Ref<'_, dyn UiComponent> {
        self.0.borrow()
    }

    /// Mutably borrow the component.
    pub fn borrow_mut(&self) -> RefMut<'_, dyn UiComponent> {
        self.0.borrow_mut()
    }

    /// Borrow the component unless it is mutably borrowed.
    pub fn try_borrow(&self) -> Result<Ref<'_, dyn UiComponent>, BorrowError> {
        self.0.try_borrow()
    }

    /// Component id.
    pub fn id(&self) -> ComponentId {
        self.0.borrow().core().id()
    }

    /// Whether both handles refer to the same component.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Identity used by the scheduler to find this component's animations.
    pub fn target_key(&self) -> TargetKey {
        TargetKey::of(&self.0)
    }

    /// A weak reference to one of this component's properties.
    pub fn property(&self, property: ComponentProperty) -> PropertyRef {
        PropertyRef::new(&self.0, property)
    }

    /// Read a property.
    pub fn get(&self, property: ComponentProperty) -> Result<Value, PropertyError> {
        UiComponent::get_property(&*self.0.borrow(), property)
    }

    /// Write a property.
    pub fn set(&self, property: ComponentProperty, value: Value) -> Result<(), PropertyError> {
        UiComponent::set_property(&mut *self.0.borrow_mut(), property, value)
    }

    /// A handle that does not keep the component alive.
    pub fn downgrade(&self) -> WeakComponent {
        WeakComponent(Rc::downgrade(&self.0))
    }

    /// Bind `effect` to `event`.
    pub fn bind(&self, event: EventKind, effect: impl Into<Effect>) {
        self.0.borrow_mut().core_mut().effects_mut().bind(event, effect);
    }

    /// Bind `effect` to the event named `event`.
    pub fn add_event_effect(
        &self,
        event: &str,
        effect: impl Into<Effect>,
    ) -> Result<(), EffectError> {
        self.0
            .borrow_mut()
            .core_mut()
            .effects_mut()
            .add_event_effect(event, effect)
    }

    /// Bind an effect given in flat form.
    pub fn add_effect_spec(&self, spec: EffectSpec) -> Result<(), EffectError> {
        self.0.borrow_mut().core_mut().effects_mut().add_effect_spec(spec)
    }

    /// Apply the effects bound to the event named `event`. Unknown names apply nothing.
    pub fn apply_event_effects(&self, event: &str, scheduler: &Scheduler) -> usize {
        match event.parse() {
            Ok(kind) => self.apply_event(kind, scheduler),
            Err(err) => {
                log::debug!("component {}: ignoring effects for {err}", self.id());
                0
            }
        }
    }

    /// Apply the effects bound to `event`.
    ///
    /// The effects are copied out first, so they run with no borrow of the
    /// component held and may target the component itself.
    pub fn apply_event(&self, event: EventKind, scheduler: &Scheduler) -> usize {
        let effects = self.0.borrow().core().effects().effects_for(event).to_vec();
        if effects.is_empty() {
            return 0;
        }
        apply_effects(&effects, event, scheduler)
    }

    /// Install an application callback for `kind`.
    pub fn set_handler(&self, kind: EventKind, handler: impl FnMut(&PointerEvent) + 'static) {
        self.0.borrow_mut().core_mut().set_handler(kind, handler);
    }

    /// Install an application wheel callback.
    pub fn set_wheel_handler(&self, handler: impl FnMut(&WheelEvent) + 'static) {
        self.0.borrow_mut().core_mut().set_wheel_handler(handler);
    }

    /// Deliver a pointer event: built-in reaction, then the application callback.
    ///
    /// The callback is taken out of the component while it runs, so it may
    /// borrow the component.
    pub(crate) fn deliver_pointer(&self, event: &PointerEvent) {
        let handler = {
            let mut c = self.0.borrow_mut();
            match event.kind {
                EventKind::PointerDown => c.handle_pointer_down(event),
                EventKind::PointerUp => c.handle_pointer_up(event),
                EventKind::PointerEnter => c.handle_pointer_enter(event),
                EventKind::PointerLeave => c.handle_pointer_leave(event),
                EventKind::PointerMove => c.handle_pointer_move(event),
            }
            c.core_mut().take_handler(event.kind)
        };
        if let Some(mut handler) = handler {
            handler(event);
            self.0.borrow_mut().core_mut().restore_handler(event.kind, handler);
        }
    }

    /// Deliver a wheel event the same way.
    pub(crate) fn deliver_wheel(&self, event: &WheelEvent) {
        let handler = {
            let mut c = self.0.borrow_mut();
            c.handle_wheel_scroll(event);
            c.core_mut().take_wheel_handler()
        };
        if let Some(mut handler) = handler {
            handler(event);
            self.0.borrow_mut().core_mut().restore_wheel_handler(handler);
        }
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Component {}

impl Bounded for Component {
    fn bounds(&self) -> Rectangle {
        self.0.borrow().core().bounds()
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(c) => f
                .debug_struct("Component")
                .field("class", &c.class_name())
                .field("id", &c.core().id())
                .field("bounds", &c.core().bounds())
                .finish(),
            Err(_) => f.write_str("Component(<busy>)"),
        }
    }
}

/// A weak handle to a component.
#[derive(Clone)]
pub struct WeakComponent(Weak<RefCell<dyn UiComponent>>);

impl WeakComponent {
    /// The component, if it is still alive.
    pub fn upgrade(&self) -> Option<Component> {
        self.0.upgrade().map(Component)
    }
}

impl fmt::Debug for WeakComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakComponent")
            .field("alive", &(self.0.strong_count() > 0))
            .finish()
    }
}
