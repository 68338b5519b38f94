// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A single property animation.

use alloc::boxed::Box;
use core::fmt::{self, Debug};

use crate::error::AnimationError;
use crate::property::PropertyRef;
use crate::value::Value;

/// Identifier of an animation registered with a scheduler.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnimationId(pub(crate) u64);

/// Callback run once when a non-looping animation finishes.
pub type CompletionFn = Box<dyn FnOnce()>;

/// Linear interpolation of one property from `from` to `to` over `duration_ms`.
///
/// With `bounce`, the value ramps to `to` at the midpoint and returns to
/// `from` at the end. With `looping`, elapsed time resets at the end and the
/// animation never completes.
pub struct Animation {
    target: PropertyRef,
    from: Value,
    to: Value,
    elapsed_ms: f64,
    duration_ms: f64,
    bounce: bool,
    looping: bool,
    on_complete: Option<CompletionFn>,
}

impl Debug for Animation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Animation")
            .field("target", &self.target)
            .field("from", &self.from)
            .field("to", &self.to)
            .field("elapsed_ms", &self.elapsed_ms)
            .field("duration_ms", &self.duration_ms)
            .field("bounce", &self.bounce)
            .field("looping", &self.looping)
            .finish_non_exhaustive()
    }
}

impl Animation {
    /// Animate `target` from `from` to `to` over `duration_ms` milliseconds.
    ///
    /// Fails if the endpoints are of different kinds or cannot be interpolated.
    pub fn new(
        target: PropertyRef,
        from: Value,
        to: Value,
        duration_ms: f64,
    ) -> Result<Self, AnimationError> {
        Value::check_interpolable(&from, &to)?;
        Ok(Self {
            target,
            from,
            to,
            elapsed_ms: 0.0,
            duration_ms,
            bounce: false,
            looping: false,
            on_complete: None,
        })
    }

    /// Reflect the ramp so the value returns to `from` at the end.
    #[must_use]
    pub fn bounce(mut self, bounce: bool) -> Self {
        self.bounce = bounce;
        self
    }

    /// Restart from the beginning instead of completing.
    #[must_use]
    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Run `f` once when the animation completes. Looping animations never do.
    #[must_use]
    pub fn on_complete(mut self, f: impl FnOnce() + 'static) -> Self {
        self.on_complete = Some(Box::new(f));
        self
    }

    /// The animated property.
    pub fn target(&self) -> &PropertyRef {
        &self.target
    }

    /// Milliseconds advanced so far in the current cycle.
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    /// Configured duration.
    pub fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    /// Whether the animation loops.
    pub fn is_looping(&self) -> bool {
        self.looping
    }

    /// Progress in `[0, 1]`. A non-positive duration is always complete.
    pub fn progress(&self) -> f64 {
        if self.duration_ms <= 0.0 || self.duration_ms.is_nan() {
            return 1.0;
        }
        (self.elapsed_ms / self.duration_ms).clamp(0.0, 1.0)
    }

    /// Value at the current progress.
    ///
    /// ```
    /// # use std::{cell::RefCell, rc::Rc};
    /// # use canopy_animation::{Animatable, Animation, PropertyError, PropertyRef, Value};
    /// # #[derive(Copy, Clone, Debug, PartialEq, Eq)] struct P;
    /// # struct S;
    /// # impl Animatable for S {
    /// #     type Property = P;
    /// #     fn property_name(_: P) -> &'static str { "p" }
    /// #     fn get_property(&self, _: P) -> Result<Value, PropertyError> {
    /// #         Ok(Value::Number(0.0))
    /// #     }
    /// #     fn set_property(&mut self, _: P, _: Value) -> Result<(), PropertyError> { Ok(()) }
    /// # }
    /// # let s = Rc::new(RefCell::new(S));
    /// let mut a = Animation::new(PropertyRef::new(&s, P), 0.0.into(), 10.0.into(), 100.0)
    ///     .unwrap()
    ///     .bounce(true);
    /// a.step(50.0);
    /// assert_eq!(a.current_value(), Value::Number(10.0));
    /// a.step(50.0);
    /// assert_eq!(a.current_value(), Value::Number(0.0));
    /// ```
    pub fn current_value(&self) -> Value {
        let t = self.progress();
        let t = if self.bounce { reflect(t) } else { t };
        // Endpoints were validated at construction.
        Value::lerp(&self.from, &self.to, t).unwrap_or_else(|_| self.to.clone())
    }

    /// Advance elapsed time by `delta_ms` (negative deltas are ignored).
    pub fn step(&mut self, delta_ms: f64) {
        if delta_ms > 0.0 {
            self.elapsed_ms += delta_ms;
        }
    }

    /// Whether the current cycle has reached its end.
    pub fn is_finished(&self) -> bool {
        self.progress() >= 1.0
    }

    pub(crate) fn restart(&mut self) {
        self.elapsed_ms = 0.0;
    }

    pub(crate) fn take_on_complete(&mut self) -> Option<CompletionFn> {
        self.on_complete.take()
    }
}

/// `1 - |2t - 1|`: rises 0→1 over the first half, falls back over the second.
#[inline]
fn reflect(t: f64) -> f64 {
    if t <= 0.5 { 2.0 * t } else { 2.0 - 2.0 * t }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::tests::{SpriteProperty, sprite};
    use crate::value::ValueKind;

    fn ramp(duration_ms: f64) -> Animation {
        let s = sprite();
        let target = PropertyRef::new(&s, SpriteProperty::X);
        Animation::new(target, Value::Number(0.0), Value::Number(10.0), duration_ms).unwrap()
    }

    #[test]
    fn linear_ramp_hits_endpoints() {
        let mut a = ramp(100.0);
        assert_eq!(a.current_value(), Value::Number(0.0));
        a.step(25.0);
        assert_eq!(a.current_value(), Value::Number(2.5));
        a.step(75.0);
        assert_eq!(a.current_value(), Value::Number(10.0));
        assert!(a.is_finished());
        a.step(1000.0);
        assert_eq!(a.progress(), 1.0);
    }

    #[test]
    fn bounce_peaks_at_midpoint() {
        let mut a = ramp(100.0).bounce(true);
        a.step(25.0);
        assert_eq!(a.current_value(), Value::Number(5.0));
        a.step(25.0);
        assert_eq!(a.current_value(), Value::Number(10.0));
        a.step(25.0);
        assert_eq!(a.current_value(), Value::Number(5.0));
        a.step(25.0);
        assert_eq!(a.current_value(), Value::Number(0.0));
    }

    #[test]
    fn zero_duration_is_complete_immediately() {
        let a = ramp(0.0);
        assert!(a.is_finished());
        assert_eq!(a.current_value(), Value::Number(10.0));
        assert!(ramp(-5.0).is_finished());
    }

    #[test]
    fn non_interpolable_endpoints_are_rejected() {
        let s = sprite();
        let target = PropertyRef::new(&s, SpriteProperty::Visible);
        let err = Animation::new(target, Value::Bool(false), Value::Bool(true), 10.0).unwrap_err();
        assert_eq!(err, AnimationError::NotInterpolable(ValueKind::Bool));
    }

    #[test]
    fn reflect_matches_closed_form() {
        for i in 0..=20 {
            let t = f64::from(i) / 20.0;
            let expected = 1.0 - (2.0 * t - 1.0).abs();
            assert!((reflect(t) - expected).abs() < 1e-12, "t = {t}");
        }
    }
}
