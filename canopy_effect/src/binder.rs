// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-event effect tables.

use alloc::vec::Vec;

use canopy_animation::Scheduler;
use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::effect::{Effect, EffectSpec};
use crate::error::EffectError;
use crate::event::EventKind;

/// Effects bound to pointer events, applied in registration order.
///
/// ```
/// use std::{cell::RefCell, rc::Rc};
/// use canopy_animation::{Animatable, PropertyError, PropertyRef, Scheduler, Value};
/// use canopy_effect::{Effect, EffectBinder};
///
/// struct Switch(bool);
/// #[derive(Copy, Clone, Debug, PartialEq, Eq)]
/// struct On;
/// impl Animatable for Switch {
///     type Property = On;
///     fn property_name(_: On) -> &'static str { "on" }
///     fn get_property(&self, _: On) -> Result<Value, PropertyError> { Ok(self.0.into()) }
///     fn set_property(&mut self, _: On, v: Value) -> Result<(), PropertyError> {
///         self.0 = v.as_bool().ok_or(PropertyError::Unsupported("on"))?;
///         Ok(())
///     }
/// }
///
/// let switch = Rc::new(RefCell::new(Switch(false)));
/// let mut binder = EffectBinder::new();
/// let flip = Effect::toggle_value(PropertyRef::new(&switch, On), true, false);
/// binder.add_event_effect("PointerUp", flip).unwrap();
///
/// let scheduler = Scheduler::new();
/// binder.apply_event_effects("pointerup", &scheduler);
/// assert!(switch.borrow().0);
/// binder.apply_event_effects("pointerup", &scheduler);
/// assert!(!switch.borrow().0);
/// assert_eq!(binder.apply_event_effects("click", &scheduler), 0);
/// ```
#[derive(Clone, Debug, Default)]
pub struct EffectBinder {
    table: HashMap<EventKind, SmallVec<[Effect; 2]>>,
}

impl EffectBinder {
    /// An empty binder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `effect` to the event named `event` (case-insensitive).
    pub fn add_event_effect(
        &mut self,
        event: &str,
        effect: impl Into<Effect>,
    ) -> Result<(), EffectError> {
        let kind = event.parse()?;
        self.bind(kind, effect);
        Ok(())
    }

    /// Bind `effect` to `event`.
    pub fn bind(&mut self, event: EventKind, effect: impl Into<Effect>) {
        self.table.entry(event).or_default().push(effect.into());
    }

    /// Bind an effect given in flat form.
    pub fn add_effect_spec(&mut self, spec: EffectSpec) -> Result<(), EffectError> {
        let event = spec.event;
        self.bind(event, spec.into_effect()?);
        Ok(())
    }

    /// Effects bound to `event`, in registration order.
    pub fn effects_for(&self, event: EventKind) -> &[Effect] {
        self.table.get(&event).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Mutable effects bound to `event`, for rewriting them in place.
    pub fn effects_for_mut(&mut self, event: EventKind) -> &mut [Effect] {
        match self.table.get_mut(&event) {
            Some(effects) => effects.as_mut_slice(),
            None => &mut [],
        }
    }

    /// Events with at least one effect, in [`EventKind`] order.
    pub fn events(&self) -> Vec<EventKind> {
        let mut events: Vec<EventKind> = self
            .table
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, _)| *k)
            .collect();
        events.sort_unstable();
        events
    }

    /// Remove the effects of one event. Returns how many were removed.
    pub fn clear_event(&mut self, event: EventKind) -> usize {
        self.table.remove(&event).map_or(0, |v| v.len())
    }

    /// Remove every binding.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Total number of bound effects.
    pub fn len(&self) -> usize {
        self.table.values().map(SmallVec::len).sum()
    }

    /// Whether nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Apply the effects bound to the event named `event`.
    ///
    /// Unknown names apply nothing. Returns how many effects applied cleanly.
    pub fn apply_event_effects(&self, event: &str, scheduler: &Scheduler) -> usize {
        match event.parse() {
            Ok(kind) => self.apply_event(kind, scheduler),
            Err(err) => {
                log::debug!("ignoring effects for {err}");
                0
            }
        }
    }

    /// Apply the effects bound to `event`.
    pub fn apply_event(&self, event: EventKind, scheduler: &Scheduler) -> usize {
        apply_effects(self.effects_for(event), event, scheduler)
    }
}

/// Apply `effects` in order for `event`, logging and skipping failures.
///
/// Callers that keep effects behind a `RefCell` clone them out first and call
/// this with no borrow held, so effect callbacks may touch the owner.
pub fn apply_effects(effects: &[Effect], event: EventKind, scheduler: &Scheduler) -> usize {
    let mut applied = 0;
    for effect in effects {
        match effect.apply(event, scheduler) {
            Ok(()) => applied += 1,
            Err(err) => log::warn!(
                "skipping {} effect on `{}` for {event}: {err}",
                effect.effect_type().as_str(),
                effect.target().name()
            ),
        }
    }
    applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::tests::{LampProperty, lamp};
    use crate::effect::EffectType;
    use alloc::rc::Rc;
    use alloc::vec;
    use canopy_animation::{PropertyRef, Value};
    use core::cell::RefCell;

    #[test]
    fn effects_apply_in_registration_order() {
        let l = lamp();
        let scheduler = Scheduler::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        let mut binder = EffectBinder::new();
        for (i, level) in [0.25, 0.5, 0.75].into_iter().enumerate() {
            let o = order.clone();
            binder.bind(
                EventKind::PointerDown,
                Effect::set_value(PropertyRef::new(&l, LampProperty::Level), level)
                    .with_on_complete(move |_| o.borrow_mut().push(i)),
            );
        }
        assert_eq!(binder.apply_event(EventKind::PointerDown, &scheduler), 3);
        assert_eq!(*order.borrow(), vec![0, 1, 2]);
        assert_eq!(l.borrow().level, 0.75);
    }

    #[test]
    fn event_names_are_case_insensitive() {
        let l = lamp();
        let mut binder = EffectBinder::new();
        binder
            .add_event_effect(
                "PointerEnter",
                Effect::set_value(PropertyRef::new(&l, LampProperty::On), true),
            )
            .unwrap();
        assert_eq!(binder.effects_for(EventKind::PointerEnter).len(), 1);
        let stray = Effect::set_value(PropertyRef::new(&l, LampProperty::On), true);
        assert!(binder.add_event_effect("hover", stray).is_err());

        let scheduler = Scheduler::new();
        assert_eq!(binder.apply_event_effects("POINTERENTER", &scheduler), 1);
        assert!(l.borrow().on);
    }

    #[test]
    fn failures_do_not_stop_later_effects() {
        let l = lamp();
        let scheduler = Scheduler::new();
        let mut binder = EffectBinder::new();
        binder.bind(
            EventKind::PointerUp,
            Effect::set_value(PropertyRef::new(&l, LampProperty::Level), "bright"),
        );
        binder.bind(
            EventKind::PointerUp,
            Effect::set_value(PropertyRef::new(&l, LampProperty::On), true),
        );
        assert_eq!(binder.apply_event(EventKind::PointerUp, &scheduler), 1);
        assert!(l.borrow().on);
    }

    #[test]
    fn dropped_target_is_skipped() {
        let l = lamp();
        let scheduler = Scheduler::new();
        let mut binder = EffectBinder::new();
        binder.bind(
            EventKind::PointerUp,
            Effect::set_value(PropertyRef::new(&l, LampProperty::On), true),
        );
        drop(l);
        assert_eq!(binder.apply_event(EventKind::PointerUp, &scheduler), 0);
    }

    #[test]
    fn bookkeeping() {
        let l = lamp();
        let mut binder = EffectBinder::new();
        assert!(binder.is_empty());
        let target = PropertyRef::new(&l, LampProperty::Level);
        binder.bind(EventKind::PointerMove, Effect::set_value(target.clone(), 1.0));
        binder.bind(EventKind::PointerDown, Effect::set_value(target.clone(), 0.0));
        binder
            .add_effect_spec({
                let mut spec =
                    EffectSpec::new(EventKind::PointerDown, target, EffectType::ToggleValue, 0.0);
                spec.to = Some(Value::Number(1.0));
                spec
            })
            .unwrap();
        assert_eq!(binder.len(), 3);
        assert_eq!(binder.events(), vec![EventKind::PointerDown, EventKind::PointerMove]);
        assert_eq!(binder.clear_event(EventKind::PointerDown), 2);
        assert_eq!(binder.clear_event(EventKind::PointerDown), 0);
        binder.clear();
        assert!(binder.is_empty());
    }
}
