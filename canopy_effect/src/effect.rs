// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Effect values and how they are applied.

use alloc::rc::Rc;
use alloc::string::ToString;
use core::cell::Cell;
use core::fmt::{self, Debug};
use core::str::FromStr;

use canopy_animation::{Animation, PropertyRef, Scheduler, Value};

use crate::error::EffectError;
use crate::event::EventKind;

/// What an effect callback is told about the firing.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EffectEvent {
    /// The event that fired the effect.
    pub event: EventKind,
}

/// Callback run when an effect finishes.
///
/// Shared so that effects stay cloneable; a callback may run many times over
/// the life of a binding.
pub type EffectCallback = Rc<dyn Fn(&EffectEvent)>;

/// The three kinds of effect.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum EffectType {
    /// Write a fixed value.
    SetValue,
    /// Alternate between two values.
    ToggleValue,
    /// Animate between two values.
    AnimateValue,
}

impl EffectType {
    /// camelCase name, such as `"animateValue"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SetValue => "setValue",
            Self::ToggleValue => "toggleValue",
            Self::AnimateValue => "animateValue",
        }
    }
}

impl FromStr for EffectType {
    type Err = EffectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Self::SetValue, Self::ToggleValue, Self::AnimateValue]
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| EffectError::UnknownEffectType(s.to_string()))
    }
}

/// An animation fired by an event.
///
/// Built with [`Effect::animate_value`]. With [`toggle`](Self::toggle), each
/// firing reverses the direction of the previous one; clones share the
/// direction state.
#[derive(Clone)]
pub struct AnimateEffect {
    target: PropertyRef,
    from: Value,
    to: Value,
    duration_ms: f64,
    bounce: bool,
    looping: bool,
    toggle: bool,
    reversed: Rc<Cell<bool>>,
    on_complete: Option<EffectCallback>,
}

impl Debug for AnimateEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimateEffect")
            .field("target", &self.target)
            .field("from", &self.from)
            .field("to", &self.to)
            .field("duration_ms", &self.duration_ms)
            .field("bounce", &self.bounce)
            .field("looping", &self.looping)
            .field("toggle", &self.toggle)
            .field("reversed", &self.reversed.get())
            .field("has_on_complete", &self.on_complete.is_some())
            .finish()
    }
}

impl AnimateEffect {
    /// Ramp there and back within one firing.
    #[must_use]
    pub fn bounce(mut self, bounce: bool) -> Self {
        self.bounce = bounce;
        self
    }

    /// Repeat forever once fired.
    #[must_use]
    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Reverse direction on every firing.
    #[must_use]
    pub fn toggle(mut self, toggle: bool) -> Self {
        self.toggle = toggle;
        self
    }

    /// Start with the direction flipped, so the next firing runs `to` to `from`.
    ///
    /// Only meaningful for toggling effects; used when restoring saved state.
    #[must_use]
    pub fn reversed(self, reversed: bool) -> Self {
        self.reversed.set(reversed);
        self
    }

    /// Run `f` each time a fired animation completes.
    #[must_use]
    pub fn on_complete(mut self, f: impl Fn(&EffectEvent) + 'static) -> Self {
        self.on_complete = Some(Rc::new(f));
        self
    }

    /// The same effect over a new range, keeping its flags and callback.
    ///
    /// Direction state starts over.
    pub fn with_range(
        &self,
        from: impl Into<Value>,
        to: impl Into<Value>,
    ) -> Result<Self, EffectError> {
        let (from, to) = (from.into(), to.into());
        Value::check_interpolable(&from, &to)?;
        Ok(Self {
            from,
            to,
            reversed: Rc::new(Cell::new(false)),
            ..self.clone()
        })
    }

    /// Animated property.
    pub fn target(&self) -> &PropertyRef {
        &self.target
    }

    /// Start value.
    pub fn from(&self) -> &Value {
        &self.from
    }

    /// End value.
    pub fn to(&self) -> &Value {
        &self.to
    }

    /// Duration of one firing.
    pub fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    /// Whether the ramp bounces.
    pub fn is_bounce(&self) -> bool {
        self.bounce
    }

    /// Whether the animation loops.
    pub fn is_looping(&self) -> bool {
        self.looping
    }

    /// Whether direction alternates between firings.
    pub fn is_toggle(&self) -> bool {
        self.toggle
    }

    /// Whether the next firing runs from `to` back to `from`.
    pub fn is_reversed(&self) -> bool {
        self.reversed.get()
    }

    fn fire(&self, event: EventKind, scheduler: &Scheduler) -> Result<(), EffectError> {
        let (from, to) = if self.reversed.get() {
            (self.to.clone(), self.from.clone())
        } else {
            (self.from.clone(), self.to.clone())
        };
        let mut animation = Animation::new(self.target.clone(), from, to, self.duration_ms)?
            .bounce(self.bounce)
            .looping(self.looping);
        if let Some(f) = self.on_complete.clone() {
            animation = animation.on_complete(move || f(&EffectEvent { event }));
        }
        scheduler.add_animation(animation);
        if self.toggle {
            self.reversed.set(!self.reversed.get());
        }
        Ok(())
    }
}

/// A property change bound to an event.
#[derive(Clone)]
pub enum Effect {
    /// Write `value`, then request a redraw.
    SetValue {
        /// Written property.
        target: PropertyRef,
        /// Written value.
        value: Value,
        /// Run after the write.
        on_complete: Option<EffectCallback>,
    },
    /// Write `value2` if the current value equals `value1`, else `value1`.
    ToggleValue {
        /// Toggled property.
        target: PropertyRef,
        /// First state; also written when the current value matches neither.
        value1: Value,
        /// Second state.
        value2: Value,
        /// Run after the write.
        on_complete: Option<EffectCallback>,
    },
    /// Register an animation with the scheduler.
    AnimateValue(AnimateEffect),
}

impl Debug for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SetValue {
                target,
                value,
                on_complete,
            } => f
                .debug_struct("SetValue")
                .field("target", target)
                .field("value", value)
                .field("has_on_complete", &on_complete.is_some())
                .finish(),
            Self::ToggleValue {
                target,
                value1,
                value2,
                on_complete,
            } => f
                .debug_struct("ToggleValue")
                .field("target", target)
                .field("value1", value1)
                .field("value2", value2)
                .field("has_on_complete", &on_complete.is_some())
                .finish(),
            Self::AnimateValue(a) => a.fmt(f),
        }
    }
}

impl From<AnimateEffect> for Effect {
    fn from(a: AnimateEffect) -> Self {
        Self::AnimateValue(a)
    }
}

impl Effect {
    /// An effect writing `value`.
    pub fn set_value(target: PropertyRef, value: impl Into<Value>) -> Self {
        Self::SetValue {
            target,
            value: value.into(),
            on_complete: None,
        }
    }

    /// An effect alternating between `value1` and `value2`.
    pub fn toggle_value(
        target: PropertyRef,
        value1: impl Into<Value>,
        value2: impl Into<Value>,
    ) -> Self {
        Self::ToggleValue {
            target,
            value1: value1.into(),
            value2: value2.into(),
            on_complete: None,
        }
    }

    /// An effect animating from `from` to `to`.
    ///
    /// Fails now, rather than when fired, if the values cannot be interpolated.
    pub fn animate_value(
        target: PropertyRef,
        from: impl Into<Value>,
        to: impl Into<Value>,
        duration_ms: f64,
    ) -> Result<AnimateEffect, EffectError> {
        let (from, to) = (from.into(), to.into());
        Value::check_interpolable(&from, &to)?;
        Ok(AnimateEffect {
            target,
            from,
            to,
            duration_ms,
            bounce: false,
            looping: false,
            toggle: false,
            reversed: Rc::new(Cell::new(false)),
            on_complete: None,
        })
    }

    /// Attach a completion callback.
    #[must_use]
    pub fn with_on_complete(self, f: impl Fn(&EffectEvent) + 'static) -> Self {
        self.with_shared_on_complete(Rc::new(f))
    }

    /// The property this effect writes.
    pub fn target(&self) -> &PropertyRef {
        match self {
            Self::SetValue { target, .. } | Self::ToggleValue { target, .. } => target,
            Self::AnimateValue(a) => &a.target,
        }
    }

    /// Which kind of effect this is.
    pub fn effect_type(&self) -> EffectType {
        match self {
            Self::SetValue { .. } => EffectType::SetValue,
            Self::ToggleValue { .. } => EffectType::ToggleValue,
            Self::AnimateValue(_) => EffectType::AnimateValue,
        }
    }

    /// Apply the effect for `event`.
    ///
    /// Set and toggle write immediately, request a redraw and run their
    /// callback. Animate registers an animation; its callback runs on completion.
    pub fn apply(&self, event: EventKind, scheduler: &Scheduler) -> Result<(), EffectError> {
        let (target, value, on_complete) = match self {
            Self::SetValue {
                target,
                value,
                on_complete,
            } => (target, value.clone(), on_complete),
            Self::ToggleValue {
                target,
                value1,
                value2,
                on_complete,
            } => {
                let next = if target.get()? == *value1 {
                    value2
                } else {
                    value1
                };
                (target, next.clone(), on_complete)
            }
            Self::AnimateValue(a) => return a.fire(event, scheduler),
        };
        target.set(value)?;
        scheduler.request_redraw();
        if let Some(f) = on_complete {
            f(&EffectEvent { event });
        }
        Ok(())
    }
}

/// The flat form of an effect binding: one struct covering every effect type.
#[derive(Clone)]
pub struct EffectSpec {
    /// Event name, case-insensitive.
    pub event: EventKind,
    /// Written property.
    pub target: PropertyRef,
    /// Kind of effect.
    pub effect_type: EffectType,
    /// The value for `setValue`, the first state for `toggleValue`, the start for `animateValue`.
    pub value_or_from: Value,
    /// The second state or end value.
    pub to: Option<Value>,
    /// Animation duration.
    pub duration_ms: f64,
    /// Bounce flag for `animateValue`.
    pub is_bounce: bool,
    /// Loop flag for `animateValue`.
    pub is_loop: bool,
    /// Direction-toggle flag for `animateValue`.
    pub is_toggle: bool,
    /// Completion callback.
    pub on_complete: Option<EffectCallback>,
}

impl Debug for EffectSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectSpec")
            .field("event", &self.event)
            .field("target", &self.target)
            .field("effect_type", &self.effect_type)
            .field("value_or_from", &self.value_or_from)
            .field("to", &self.to)
            .field("duration_ms", &self.duration_ms)
            .finish_non_exhaustive()
    }
}

impl EffectSpec {
    /// A spec with no second value, zero duration and every flag off.
    pub fn new(
        event: EventKind,
        target: PropertyRef,
        effect_type: EffectType,
        value_or_from: impl Into<Value>,
    ) -> Self {
        Self {
            event,
            target,
            effect_type,
            value_or_from: value_or_from.into(),
            to: None,
            duration_ms: 0.0,
            is_bounce: false,
            is_loop: false,
            is_toggle: false,
            on_complete: None,
        }
    }

    /// Build the effect this spec describes.
    pub fn into_effect(self) -> Result<Effect, EffectError> {
        let effect_name = self.effect_type.as_str();
        let missing_to = || EffectError::MissingValue {
            effect: effect_name,
            field: "to",
        };
        let effect = match self.effect_type {
            EffectType::SetValue => Effect::set_value(self.target, self.value_or_from),
            EffectType::ToggleValue => {
                let to = self.to.clone().ok_or_else(missing_to)?;
                Effect::toggle_value(self.target, self.value_or_from, to)
            }
            EffectType::AnimateValue => {
                let to = self.to.clone().ok_or_else(missing_to)?;
                Effect::animate_value(self.target, self.value_or_from, to, self.duration_ms)?
                    .bounce(self.is_bounce)
                    .looping(self.is_loop)
                    .toggle(self.is_toggle)
                    .into()
            }
        };
        Ok(match self.on_complete {
            Some(cb) => effect.with_shared_on_complete(cb),
            None => effect,
        })
    }
}

impl Effect {
    fn with_shared_on_complete(mut self, cb: EffectCallback) -> Self {
        match &mut self {
            Self::SetValue { on_complete, .. } | Self::ToggleValue { on_complete, .. } => {
                *on_complete = Some(cb);
            }
            Self::AnimateValue(a) => a.on_complete = Some(cb),
        }
        self
    }
}
