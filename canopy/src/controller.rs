// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The controller: component registry, spatial index and input dispatch.

use std::fmt;

use canopy_animation::Scheduler;
use canopy_effect::EventKind;
use canopy_event_state::debounce::DebounceState;
use canopy_event_state::gesture::{GestureListener, GestureState};
use canopy_event_state::hover::HoverState;
use canopy_event_state::pointer::{PointerId, PointerTracker};
use canopy_index::{Bounded, QuadTree, Rectangle};
use kurbo::{Point, Size};

use crate::component::Component;
use crate::config::CanopyConfig;
use crate::event::{DispatchSummary, PointerEvent, PointerInput, WheelEvent, WheelInput};
use crate::render::Renderer;
use crate::types::{ComponentId, TagMatch};

/// A registered component and the bounds it was last indexed under.
struct Entry {
    component: Component,
    indexed: Rectangle,
}

/// Owns the components of one canvas and routes input to them.
///
/// Components are kept in registration order and indexed in a quad tree over
/// the canvas in device pixels. Host input arrives in client coordinates and
/// is translated before hit testing. Bounds that changed since the last query
/// (through animations, layout or direct writes) are re-indexed lazily before
/// every hit test, query and draw.
///
/// ```
/// use canopy::kurbo::Point;
/// use canopy::{Button, ButtonStyle, Canopy, CanopyConfig, PointerInput, Rectangle};
///
/// let mut canopy = Canopy::new(CanopyConfig::default());
/// let ok = Button::new(Rectangle::new(10.0, 10.0, 80.0, 30.0), ButtonStyle::labeled("OK"))
///     .into_component();
/// canopy.add_component(ok);
///
/// let hit = canopy.pointer_down(PointerInput::new(1, Point::new(20.0, 20.0), 0.0));
/// assert_eq!(hit.delivered, 1);
/// let miss = canopy.pointer_down(PointerInput::new(1, Point::new(500.0, 500.0), 10.0));
/// assert_eq!(miss.delivered, 0);
/// ```
pub struct Canopy {
    config: CanopyConfig,
    tree: QuadTree<Component>,
    entries: Vec<Entry>,
    scheduler: Scheduler,
    hover: HoverState<Component>,
    debounce: DebounceState,
    pointers: PointerTracker,
    gestures: GestureState,
    gesture_listener: Option<Box<dyn GestureListener>>,
}

impl fmt::Debug for Canopy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Canopy")
            .field("config", &self.config)
            .field("tree", &self.tree)
            .field("components", &self.entries.len())
            .field("scheduler", &self.scheduler)
            .field("hovered", &self.hover.current().len())
            .field("pointers", &self.pointers.len())
            .finish_non_exhaustive()
    }
}

impl Canopy {
    /// An empty canvas.
    pub fn new(config: CanopyConfig) -> Self {
        Self {
            tree: QuadTree::with_config(config.device_bounds(), config.quad_tree),
            entries: Vec::new(),
            scheduler: Scheduler::with_policy(config.duplicate_animations),
            hover: HoverState::new(),
            debounce: DebounceState::with_threshold(config.pointer_up_debounce_ms),
            pointers: PointerTracker::new(),
            gestures: GestureState::new(),
            gesture_listener: None,
            config,
        }
    }

    /// Current configuration.
    pub fn config(&self) -> &CanopyConfig {
        &self.config
    }

    /// The animation scheduler shared by every component of this canvas.
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Register `component` and, recursively, its children.
    ///
    /// Returns `false` if it was already registered; its children are still
    /// registered then, which lets hosts add children to a panel later.
    /// A child that is also one of its own ancestors is skipped.
    pub fn add_component(&mut self, component: Component) -> bool {
        self.add_tree(component, &mut Vec::new())
    }

    fn add_tree(&mut self, component: Component, ancestors: &mut Vec<Component>) -> bool {
        if ancestors.contains(&component) {
            log::warn!("component {} contains itself; not descending again", component.id());
            return false;
        }
        ancestors.push(component.clone());
        let children = component.borrow().children();
        let added = !self.is_registered(&component);
        if added {
            log::debug!("adding component {}", component.id());
            self.tree.insert(component.clone());
            self.entries.push(Entry {
                indexed: component.bounds(),
                component,
            });
        }
        for child in children {
            self.add_tree(child, ancestors);
        }
        ancestors.pop();
        if added {
            self.request_redraw();
        }
        added
    }

    /// Register a container and everything it holds.
    pub fn add_panel(&mut self, panel: Component) -> bool {
        self.add_component(panel)
    }

    /// Unregister `component` and its children.
    ///
    /// They leave the index and the hover set without a leave event, and
    /// their running animations are cancelled.
    pub fn remove_component(&mut self, component: &Component) -> bool {
        let Some(at) = self
            .entries
            .iter()
            .position(|e| e.component.ptr_eq(component))
        else {
            return false;
        };
        let entry = self.entries.remove(at);
        self.tree.remove(&entry.component);
        self.hover.remove(&entry.component);
        let cancelled = self.scheduler.cancel_target(entry.component.target_key());
        log::debug!(
            "removed component {} ({cancelled} animations cancelled)",
            entry.component.id()
        );
        let children = entry.component.borrow().children();
        for child in &children {
            self.remove_component(child);
        }
        self.request_redraw();
        true
    }

    /// Registered components in registration order.
    pub fn components(&self) -> impl Iterator<Item = &Component> + '_ {
        self.entries.iter().map(|e| &e.component)
    }

    /// The registered component with `id`.
    pub fn find(&self, id: ComponentId) -> Option<&Component> {
        self.components().find(|c| c.id() == id)
    }

    /// Number of registered components.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no component is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn is_registered(&self, component: &Component) -> bool {
        self.components().any(|c| c.ptr_eq(component))
    }

    /// Re-index components whose bounds changed. Returns how many moved.
    pub fn refresh_index(&mut self) -> usize {
        let mut moved = 0;
        for entry in &mut self.entries {
            let now = entry.component.bounds();
            if now != entry.indexed {
                self.tree.reinsert(&entry.component);
                entry.indexed = now;
                moved += 1;
            }
        }
        moved
    }

    fn rebuild_index(&mut self) {
        self.tree.update_boundary(self.config.device_bounds());
        for entry in &mut self.entries {
            self.tree.insert(entry.component.clone());
            entry.indexed = entry.component.bounds();
        }
    }

    /// Components selected by region and tags.
    ///
    /// Candidates are those intersecting `bounds`, or every component in
    /// registration order. With no `tags` only untagged components match and
    /// `negate` is ignored; otherwise a component matches when it carries all
    /// (or any) of `tags`, inverted by `negate`.
    pub fn get_components(
        &mut self,
        bounds: Option<Rectangle>,
        tags: &[&str],
        matching: TagMatch,
        negate: bool,
    ) -> Vec<Component> {
        self.refresh_index();
        let candidates = match bounds {
            Some(region) => self.tree.query(&region),
            None => self.components().cloned().collect(),
        };
        candidates
            .into_iter()
            .filter(|c| {
                let c = c.borrow();
                let core = c.core();
                if tags.is_empty() {
                    return core.tags().is_empty();
                }
                let has = match matching {
                    TagMatch::All => tags.iter().all(|t| core.has_tag(t)),
                    TagMatch::Any => tags.iter().any(|t| core.has_tag(t)),
                };
                has != negate
            })
            .collect()
    }

    /// Align the components carrying all of `tags` inside `bounds`, or inside
    /// the canvas when `bounds` is `None`.
    pub fn align_items(&mut self, bounds: Option<Rectangle>, tags: &[&str]) {
        let container = bounds.unwrap_or_else(|| self.config.device_bounds());
        for component in self.get_components(bounds, tags, TagMatch::All, false) {
            component.borrow_mut().align(container);
        }
        self.refresh_index();
        self.request_redraw();
    }

    /// Paint the visible components selected by `bounds` and `tags` (as in
    /// [`get_components`](Self::get_components) with [`TagMatch::All`]),
    /// lowest z-index first, ties in selection order. Returns how many were painted.
    pub fn draw(
        &mut self,
        renderer: &mut dyn Renderer,
        bounds: Option<Rectangle>,
        tags: &[&str],
    ) -> usize {
        let mut visible: Vec<Component> = self
            .get_components(bounds, tags, TagMatch::All, false)
            .into_iter()
            .filter(|c| c.borrow().core().is_visible())
            .collect();
        visible.sort_by_key(|c| c.borrow().core().z_index());
        for component in &visible {
            component.borrow().draw(renderer);
        }
        visible.len()
    }

    /// Ask the host to repaint.
    pub fn request_redraw(&self) {
        self.scheduler.request_redraw();
    }

    /// Run `f` whenever a repaint is requested, by input, effects or animations.
    pub fn set_redraw_callback(&self, f: impl Fn() + 'static) {
        self.scheduler.set_request_redraw_callback(f);
    }

    /// Whether a repaint was requested since the last call, for polling hosts.
    pub fn take_redraw_request(&self) -> bool {
        self.scheduler.take_redraw_request()
    }

    /// Advance animations by `delta_ms`.
    pub fn advance(&self, delta_ms: f64) {
        self.scheduler.advance(delta_ms);
    }

    /// Advance animations to the host clock `now_ms`.
    pub fn tick(&self, now_ms: f64) {
        self.scheduler.tick(now_ms);
    }

    /// The canvas now measures `css_width` × `css_height` CSS pixels.
    pub fn resize(&mut self, css_width: f64, css_height: f64) {
        self.config.canvas_size = Size::new(css_width, css_height);
        self.canvas_changed();
    }

    /// The device pixel ratio changed.
    pub fn set_device_pixel_ratio(&mut self, dpr: f64) {
        self.config.device_pixel_ratio = dpr;
        self.canvas_changed();
    }

    /// The canvas moved within the host viewport.
    pub fn set_canvas_origin(&mut self, origin: Point) {
        self.config.canvas_origin = origin;
    }

    fn canvas_changed(&mut self) {
        self.rebuild_index();
        let canvas = self.config.device_bounds();
        log::debug!("canvas is now {canvas:?}");
        let components: Vec<Component> = self.components().cloned().collect();
        for component in components {
            component.borrow_mut().handle_resize(canvas);
        }
        self.refresh_index();
        self.request_redraw();
    }

    /// Send pinch, rotate and pan steps to `listener`, replacing any previous one.
    pub fn set_gesture_listener(&mut self, listener: impl GestureListener + 'static) {
        self.gesture_listener = Some(Box::new(listener));
    }

    /// Stop reporting gestures.
    pub fn clear_gesture_listener(&mut self) {
        self.gesture_listener = None;
    }

    /// Visible components under `at`, in query order.
    pub fn hit_test(&mut self, at: Point) -> Vec<Component> {
        self.refresh_index();
        let mut hits = self.tree.query_point(at.x, at.y);
        hits.retain(|c| c.borrow().core().is_visible());
        hits
    }

    fn event(&self, kind: EventKind, input: &PointerInput) -> PointerEvent {
        PointerEvent {
            kind,
            pointer_id: input.pointer_id,
            position: self.config.to_device(input.client),
            timestamp_ms: input.timestamp_ms,
            button: input.button,
        }
    }

    /// Effects first, then the component's own reaction and callback.
    fn deliver(&self, component: &Component, event: &PointerEvent) {
        component.apply_event(event.kind, &self.scheduler);
        component.deliver_pointer(event);
    }

    fn deliver_all(&self, targets: &[Component], event: &PointerEvent) -> usize {
        for component in targets {
            self.deliver(component, event);
        }
        targets.len()
    }

    fn finish(&self, summary: DispatchSummary) -> DispatchSummary {
        if summary.delivered + summary.entered + summary.left > 0 {
            self.request_redraw();
        }
        summary
    }

    /// A pointer was pressed.
    pub fn pointer_down(&mut self, input: PointerInput) -> DispatchSummary {
        let event = self.event(EventKind::PointerDown, &input);
        self.pointers.down(input.pointer_id, event.position);
        self.gestures.reset();
        let hits = self.hit_test(event.position);
        log::trace!(
            "pointer {} down at {:?}: {} hits",
            input.pointer_id,
            event.position,
            hits.len()
        );
        let delivered = self.deliver_all(&hits, &event);
        self.finish(DispatchSummary {
            delivered,
            ..DispatchSummary::default()
        })
    }

    /// A pointer was released.
    ///
    /// Releases closer than the debounce window to the previous one are
    /// swallowed. The pointer stops being tracked either way.
    pub fn pointer_up(&mut self, input: PointerInput) -> DispatchSummary {
        let event = self.event(EventKind::PointerUp, &input);
        self.release(input.pointer_id);
        if !self.debounce.on_pointer_up(input.timestamp_ms) {
            log::debug!("pointer {} up at {} ms debounced", input.pointer_id, input.timestamp_ms);
            return DispatchSummary {
                debounced: true,
                ..DispatchSummary::default()
            };
        }
        let hits = self.hit_test(event.position);
        let delivered = self.deliver_all(&hits, &event);
        self.finish(DispatchSummary {
            delivered,
            ..DispatchSummary::default()
        })
    }

    /// A pointer moved, pressed or not.
    ///
    /// Each visible component under the pointer gets `pointerenter` if it was
    /// not hovered before, then `pointermove`, in query order. Components that
    /// are no longer under it then get `pointerleave`. Finally the active
    /// pointers are fed to gesture recognition.
    pub fn pointer_move(&mut self, input: PointerInput) -> DispatchSummary {
        let event = self.event(EventKind::PointerMove, &input);
        self.pointers.moved(input.pointer_id, event.position);
        let hits = self.hit_test(event.position);
        let transitions = self.hover.update(hits);

        let enter = PointerEvent {
            kind: EventKind::PointerEnter,
            ..event
        };
        for component in &transitions.hovered {
            if transitions.entered.contains(component) {
                self.deliver(component, &enter);
            }
            self.deliver(component, &event);
        }
        let leave = PointerEvent {
            kind: EventKind::PointerLeave,
            ..event
        };
        self.deliver_all(&transitions.left, &leave);

        if let Some(gesture) = self.gestures.update(&self.pointers) {
            log::trace!("gesture {gesture:?}");
            if let Some(listener) = self.gesture_listener.as_deref_mut() {
                gesture.dispatch(listener);
            }
        }

        self.finish(DispatchSummary {
            delivered: transitions.hovered.len(),
            entered: transitions.entered.len(),
            left: transitions.left.len(),
            debounced: false,
        })
    }

    /// The platform cancelled a pointer. Nothing is delivered.
    pub fn pointer_cancel(&mut self, pointer_id: PointerId) {
        if self.pointers.cancel(pointer_id) {
            log::debug!("pointer {pointer_id} cancelled");
        }
        self.gestures.reset();
    }

    fn release(&mut self, pointer_id: PointerId) {
        self.pointers.up(pointer_id);
        self.gestures.reset();
    }

    /// A wheel event. Only visible components under the cursor that accept
    /// wheel input receive it.
    pub fn wheel(&mut self, input: WheelInput) -> DispatchSummary {
        let event = WheelEvent {
            position: self.config.to_device(input.client),
            delta: input.delta,
            timestamp_ms: input.timestamp_ms,
        };
        let mut delivered = 0;
        for component in self.hit_test(event.position) {
            if component.borrow().accepts_wheel() {
                component.deliver_wheel(&event);
                delivered += 1;
            }
        }
        self.finish(DispatchSummary {
            delivered,
            ..DispatchSummary::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use canopy_animation::Value;
    use canopy_effect::Effect;
    use kurbo::Vec2;

    use super::*;
    use crate::component::UiComponent;
    use crate::component::tests::plain;
    use crate::core::ComponentCore;
    use crate::property::ComponentProperty;
    use crate::widgets::tests::Recording;

    fn at(x: f64, y: f64, t: f64) -> PointerInput {
        PointerInput::new(1, Point::new(x, y), t)
    }

    /// A container that adopts anything, itself included.
    #[derive(Debug)]
    struct Group {
        core: ComponentCore,
        members: Vec<Component>,
    }

    impl UiComponent for Group {
        fn core(&self) -> &ComponentCore {
            &self.core
        }
        fn core_mut(&mut self) -> &mut ComponentCore {
            &mut self.core
        }
        fn class_name(&self) -> &'static str {
            "Group"
        }
        fn draw(&self, _: &mut dyn Renderer) {}
        fn children(&self) -> Vec<Component> {
            self.members.clone()
        }
        fn add_child(&mut self, child: Component) -> bool {
            self.members.push(child);
            true
        }
    }

    #[test]
    fn self_containing_groups_register_once() {
        let group = || {
            Component::new(Group {
                core: ComponentCore::new(Rectangle::new(0.0, 0.0, 10.0, 10.0)),
                members: Vec::new(),
            })
        };
        let (a, b) = (group(), group());
        a.borrow_mut().add_child(b.clone());
        b.borrow_mut().add_child(a.clone());
        a.borrow_mut().add_child(a.clone());

        let mut canopy = Canopy::new(CanopyConfig::default());
        assert!(canopy.add_component(a.clone()));
        assert_eq!(canopy.len(), 2);
        assert!(!canopy.add_component(b.clone()));
        assert!(canopy.remove_component(&b));
        assert!(canopy.is_empty());
    }

    #[test]
    fn add_is_idempotent_and_remove_forgets() {
        let mut canopy = Canopy::new(CanopyConfig::default());
        let a = plain(0.0, 0.0, 10.0, 10.0);
        assert!(canopy.add_component(a.clone()));
        assert!(!canopy.add_component(a.clone()));
        assert_eq!(canopy.len(), 1);
        assert_eq!(canopy.find(a.id()), Some(&a));
        assert!(canopy.remove_component(&a));
        assert!(!canopy.remove_component(&a));
        assert!(canopy.hit_test(Point::new(5.0, 5.0)).is_empty());
    }

    #[test]
    fn moved_components_are_found_at_their_new_place() {
        let mut canopy = Canopy::new(CanopyConfig::default());
        let a = plain(0.0, 0.0, 10.0, 10.0);
        canopy.add_component(a.clone());
        a.set(ComponentProperty::Position, Point::new(700.0, 500.0).into())
            .unwrap();
        assert_eq!(canopy.hit_test(Point::new(705.0, 505.0)), [a]);
        assert!(canopy.hit_test(Point::new(5.0, 5.0)).is_empty());
    }

    #[test]
    fn tag_queries() {
        let mut canopy = Canopy::new(CanopyConfig::default());
        let untagged = plain(0.0, 0.0, 10.0, 10.0);
        let tool = plain(20.0, 0.0, 10.0, 10.0);
        let both = plain(40.0, 0.0, 10.0, 10.0);
        tool.borrow_mut().core_mut().add_tag("tool");
        both.borrow_mut().core_mut().set_tags(["tool", "left"]);
        for c in [&untagged, &tool, &both] {
            canopy.add_component(c.clone());
        }
        assert_eq!(canopy.get_components(None, &[], TagMatch::All, false), [untagged.clone()]);
        assert_eq!(canopy.get_components(None, &[], TagMatch::All, true), [untagged.clone()]);
        assert_eq!(
            canopy.get_components(None, &["tool", "left"], TagMatch::All, false),
            [both.clone()]
        );
        assert_eq!(
            canopy.get_components(None, &["left"], TagMatch::Any, true),
            [untagged, tool.clone()]
        );
        assert_eq!(
            canopy.get_components(
                Some(Rectangle::new(15.0, 0.0, 10.0, 10.0)),
                &["tool"],
                TagMatch::All,
                false
            ),
            [tool]
        );
    }

    #[test]
    fn draw_skips_hidden_and_orders_by_z() {
        let mut canopy = Canopy::new(CanopyConfig::default());
        let low = plain(0.0, 0.0, 10.0, 10.0);
        let high = plain(0.0, 0.0, 10.0, 10.0);
        let hidden = plain(0.0, 0.0, 10.0, 10.0);
        high.borrow_mut().core_mut().set_z_index(5);
        hidden.borrow_mut().core_mut().set_visible(false);
        canopy.add_component(high.clone());
        canopy.add_component(low.clone());
        canopy.add_component(hidden);
        let mut out = Recording::default();
        assert_eq!(canopy.draw(&mut out, None, &[]), 2);
    }

    #[test]
    fn hidden_components_receive_nothing() {
        let mut canopy = Canopy::new(CanopyConfig::default());
        let a = plain(0.0, 0.0, 10.0, 10.0);
        a.borrow_mut().core_mut().set_visible(false);
        canopy.add_component(a);
        assert_eq!(canopy.pointer_down(at(5.0, 5.0, 0.0)).delivered, 0);
    }

    #[test]
    fn effects_fire_before_handlers() {
        let mut canopy = Canopy::new(CanopyConfig::default());
        let a = plain(0.0, 0.0, 10.0, 10.0);
        a.bind(
            EventKind::PointerDown,
            Effect::set_value(a.property(ComponentProperty::Scale), 3.0),
        );
        let seen = Rc::new(Cell::new(0.0));
        let s = seen.clone();
        let scale = a.property(ComponentProperty::Scale);
        a.set_handler(EventKind::PointerDown, move |_| {
            s.set(scale.get().ok().and_then(|v| v.as_number()).unwrap_or_default());
        });
        canopy.add_component(a);
        canopy.pointer_down(at(5.0, 5.0, 0.0));
        assert_eq!(seen.get(), 3.0);
    }

    #[test]
    fn cancel_delivers_nothing_and_drops_the_pointer() {
        let mut canopy = Canopy::new(CanopyConfig::default());
        let a = plain(0.0, 0.0, 10.0, 10.0);
        let calls = Rc::new(Cell::new(0));
        let c = calls.clone();
        a.set_handler(EventKind::PointerUp, move |_| c.set(c.get() + 1));
        canopy.add_component(a);
        canopy.pointer_down(at(5.0, 5.0, 0.0));
        canopy.pointer_cancel(1);
        assert_eq!(canopy.pointers.len(), 0);
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn removing_a_component_cancels_its_animations() {
        let mut canopy = Canopy::new(CanopyConfig::default());
        let a = plain(0.0, 0.0, 10.0, 10.0);
        canopy.add_component(a.clone());
        let grow = Effect::animate_value(a.property(ComponentProperty::Scale), 1.0, 2.0, 100.0)
            .unwrap();
        a.bind(EventKind::PointerDown, grow);
        canopy.pointer_down(at(5.0, 5.0, 0.0));
        assert_eq!(canopy.scheduler().active_count(), 1);
        canopy.remove_component(&a);
        assert!(canopy.scheduler().is_idle());
        canopy.advance(100.0);
        assert_eq!(a.get(ComponentProperty::Scale), Ok(Value::Number(1.0)));
    }

    #[test]
    fn gestures_reach_the_listener_after_a_baseline() {
        struct Log(Rc<RefCell<Vec<Vec2>>>);
        impl GestureListener for Log {
            fn on_pan(&mut self, delta: Vec2) {
                self.0.borrow_mut().push(delta);
            }
        }
        let pans = Rc::new(RefCell::new(Vec::new()));
        let mut canopy = Canopy::new(CanopyConfig::default());
        canopy.set_gesture_listener(Log(pans.clone()));
        canopy.pointer_move(at(10.0, 10.0, 0.0));
        canopy.pointer_move(at(13.0, 14.0, 16.0));
        assert_eq!(*pans.borrow(), [Vec2::new(3.0, 4.0)]);
    }
}
