// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The animation scheduler and its shared handle.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt::{self, Debug};

use crate::animation::{Animation, AnimationId, CompletionFn};
use crate::error::PropertyError;
use crate::property::{PropertyRef, TargetKey};

/// What to do when an animation is added for a property that is already animating.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DuplicatePolicy {
    /// Cancel the running animation, without its completion callback, and
    /// start the new one.
    #[default]
    Replace,
    /// Run both; the one registered last wins each tick.
    Concurrent,
}

/// Callback invoked when the scheduler wants the host to repaint.
pub type RedrawFn = Rc<dyn Fn()>;

#[derive(Default)]
struct StepOutcome {
    advanced: bool,
    completions: Vec<CompletionFn>,
}

/// Owns the active animations and advances them on host-driven ticks.
///
/// Most code shares a [`Scheduler`] handle instead of owning this directly;
/// the handle lets completion callbacks register further animations.
pub struct AnimationScheduler {
    active: Vec<(AnimationId, Animation)>,
    next_id: u64,
    policy: DuplicatePolicy,
    redraw: Option<RedrawFn>,
    redraw_pending: bool,
    last_tick_ms: Option<f64>,
}

impl Debug for AnimationScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationScheduler")
            .field("active", &self.active.len())
            .field("policy", &self.policy)
            .field("has_redraw_callback", &self.redraw.is_some())
            .field("redraw_pending", &self.redraw_pending)
            .field("last_tick_ms", &self.last_tick_ms)
            .finish_non_exhaustive()
    }
}

impl Default for AnimationScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationScheduler {
    /// Create an idle scheduler with [`DuplicatePolicy::Replace`].
    pub fn new() -> Self {
        Self::with_policy(DuplicatePolicy::default())
    }

    /// Create an idle scheduler with the given duplicate policy.
    pub fn with_policy(policy: DuplicatePolicy) -> Self {
        Self {
            active: Vec::new(),
            next_id: 0,
            policy,
            redraw: None,
            redraw_pending: false,
            last_tick_ms: None,
        }
    }

    /// Current duplicate policy.
    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    /// Change the duplicate policy for animations added from now on.
    pub fn set_policy(&mut self, policy: DuplicatePolicy) {
        self.policy = policy;
    }

    /// Register the host's repaint callback, replacing any previous one.
    pub fn set_request_redraw_callback(&mut self, f: impl Fn() + 'static) {
        self.redraw = Some(Rc::new(f));
    }

    /// Ask the host to repaint.
    ///
    /// Without a registered callback the request is latched and can be
    /// collected with [`take_redraw_request`](Self::take_redraw_request).
    pub fn request_redraw(&mut self) {
        match self.redraw.clone() {
            Some(f) => f(),
            None => self.redraw_pending = true,
        }
    }

    /// Whether a redraw was requested since the last call, clearing the flag.
    pub fn take_redraw_request(&mut self) -> bool {
        core::mem::take(&mut self.redraw_pending)
    }

    /// Add an animation; it starts advancing on the next tick.
    pub fn add_animation(&mut self, animation: Animation) -> AnimationId {
        if self.policy == DuplicatePolicy::Replace {
            let target = animation.target().clone();
            let replaced = self.cancel_property(&target);
            if replaced > 0 {
                log::debug!(
                    "replacing {replaced} running animation(s) of `{}`",
                    target.name()
                );
            }
        }
        let id = AnimationId(self.next_id);
        self.next_id += 1;
        self.active.push((id, animation));
        id
    }

    /// Remove an animation without running its completion callback.
    ///
    /// Returns `false` if it already finished or was never added.
    pub fn remove_animation(&mut self, id: AnimationId) -> bool {
        match self.active.iter().position(|(a, _)| *a == id) {
            Some(i) => {
                self.active.remove(i);
                true
            }
            None => false,
        }
    }

    /// Whether `id` is still running.
    pub fn contains(&self, id: AnimationId) -> bool {
        self.active.iter().any(|(a, _)| *a == id)
    }

    /// Cancel every animation of any property of `target`. Returns how many were cancelled.
    pub fn cancel_target(&mut self, target: TargetKey) -> usize {
        let before = self.active.len();
        self.active.retain(|(_, a)| a.target().target_key() != target);
        before - self.active.len()
    }

    /// Cancel every animation of `property`. Returns how many were cancelled.
    pub fn cancel_property(&mut self, property: &PropertyRef) -> usize {
        let before = self.active.len();
        self.active
            .retain(|(_, a)| !a.target().same_property(property));
        before - self.active.len()
    }

    /// Number of running animations.
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Whether nothing is animating.
    pub fn is_idle(&self) -> bool {
        self.active.is_empty()
    }

    /// Drop every animation without running completion callbacks.
    pub fn clear(&mut self) {
        self.active.clear();
    }

    /// Advance every animation by `delta_ms`, write the new values, then run
    /// completion callbacks and request a redraw if anything was animating.
    pub fn advance(&mut self, delta_ms: f64) {
        let outcome = self.step(delta_ms);
        for f in outcome.completions {
            f();
        }
        if outcome.advanced {
            self.request_redraw();
        }
    }

    /// Advance by the time since the previous `tick`. The first tick advances by zero.
    pub fn tick(&mut self, now_ms: f64) {
        let delta = self.tick_delta(now_ms);
        self.advance(delta);
    }

    fn tick_delta(&mut self, now_ms: f64) -> f64 {
        let delta = self
            .last_tick_ms
            .map_or(0.0, |last| f64::max(now_ms - last, 0.0));
        self.last_tick_ms = Some(now_ms);
        delta
    }

    fn step(&mut self, delta_ms: f64) -> StepOutcome {
        let mut outcome = StepOutcome {
            advanced: !self.active.is_empty(),
            completions: Vec::new(),
        };
        let mut i = 0;
        while i < self.active.len() {
            let id = self.active[i].0;
            let animation = &mut self.active[i].1;
            animation.step(delta_ms);
            match animation.target().set(animation.current_value()) {
                Ok(()) => {}
                Err(PropertyError::TargetDropped) => {
                    log::debug!("cancelling {id:?}: target dropped");
                    self.active.remove(i);
                    continue;
                }
                Err(err) => log::warn!("{id:?} skipped a tick: {err}"),
            }
            if animation.is_finished() {
                if animation.is_looping() {
                    animation.restart();
                } else {
                    let (_, mut done) = self.active.remove(i);
                    outcome.completions.extend(done.take_on_complete());
                    continue;
                }
            }
            i += 1;
        }
        outcome
    }
}

/// Shared handle to an [`AnimationScheduler`].
///
/// Cloning shares the same scheduler. Unlike the owned form, the handle runs
/// completion and redraw callbacks after releasing its internal borrow, so
/// they may add or remove animations through another clone.
///
/// ```
/// use std::{cell::Cell, rc::Rc};
/// use canopy_animation::Scheduler;
///
/// let scheduler = Scheduler::new();
/// let frames = Rc::new(Cell::new(0));
/// let f = frames.clone();
/// scheduler.set_request_redraw_callback(move || f.set(f.get() + 1));
///
/// scheduler.request_redraw();
/// scheduler.advance(16.0); // idle: no redraw
/// assert_eq!(frames.get(), 1);
/// ```
#[derive(Clone, Default)]
pub struct Scheduler(Rc<RefCell<AnimationScheduler>>);

impl Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(inner) => f.debug_tuple("Scheduler").field(&*inner).finish(),
            Err(_) => f.write_str("Scheduler(<busy>)"),
        }
    }
}

impl Scheduler {
    /// Create a handle to a fresh scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a handle to a fresh scheduler with the given duplicate policy.
    pub fn with_policy(policy: DuplicatePolicy) -> Self {
        Self(Rc::new(RefCell::new(AnimationScheduler::with_policy(policy))))
    }

    /// Whether both handles share one scheduler.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// See [`AnimationScheduler::policy`].
    pub fn policy(&self) -> DuplicatePolicy {
        self.0.borrow().policy()
    }

    /// See [`AnimationScheduler::set_policy`].
    pub fn set_policy(&self, policy: DuplicatePolicy) {
        self.0.borrow_mut().set_policy(policy);
    }

    /// See [`AnimationScheduler::set_request_redraw_callback`].
    pub fn set_request_redraw_callback(&self, f: impl Fn() + 'static) {
        self.0.borrow_mut().set_request_redraw_callback(f);
    }

    /// Ask the host to repaint; the callback runs with no borrow held.
    pub fn request_redraw(&self) {
        let callback = {
            let mut inner = self.0.borrow_mut();
            let callback = inner.redraw.clone();
            if callback.is_none() {
                inner.redraw_pending = true;
            }
            callback
        };
        if let Some(f) = callback {
            f();
        }
    }

    /// See [`AnimationScheduler::take_redraw_request`].
    pub fn take_redraw_request(&self) -> bool {
        self.0.borrow_mut().take_redraw_request()
    }

    /// See [`AnimationScheduler::add_animation`].
    pub fn add_animation(&self, animation: Animation) -> AnimationId {
        self.0.borrow_mut().add_animation(animation)
    }

    /// See [`AnimationScheduler::remove_animation`].
    pub fn remove_animation(&self, id: AnimationId) -> bool {
        self.0.borrow_mut().remove_animation(id)
    }

    /// See [`AnimationScheduler::contains`].
    pub fn contains(&self, id: AnimationId) -> bool {
        self.0.borrow().contains(id)
    }

    /// See [`AnimationScheduler::cancel_target`].
    pub fn cancel_target(&self, target: TargetKey) -> usize {
        self.0.borrow_mut().cancel_target(target)
    }

    /// See [`AnimationScheduler::cancel_property`].
    pub fn cancel_property(&self, property: &PropertyRef) -> usize {
        self.0.borrow_mut().cancel_property(property)
    }

    /// See [`AnimationScheduler::active_count`].
    pub fn active_count(&self) -> usize {
        self.0.borrow().active_count()
    }

    /// See [`AnimationScheduler::is_idle`].
    pub fn is_idle(&self) -> bool {
        self.0.borrow().is_idle()
    }

    /// See [`AnimationScheduler::clear`].
    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    /// Advance every animation by `delta_ms`.
    ///
    /// Values are written under the scheduler borrow; completion callbacks and
    /// the redraw request run after it is released.
    pub fn advance(&self, delta_ms: f64) {
        let outcome = self.0.borrow_mut().step(delta_ms);
        for f in outcome.completions {
            f();
        }
        if outcome.advanced {
            self.request_redraw();
        }
    }

    /// Advance by the time since the previous `tick`. The first tick advances by zero.
    pub fn tick(&self, now_ms: f64) {
        let delta = self.0.borrow_mut().tick_delta(now_ms);
        self.advance(delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::tests::{Sprite, SpriteProperty, sprite};
    use crate::value::Value;
    use alloc::rc::Rc;
    use core::cell::{Cell, RefCell};

    fn x_ramp(s: &Rc<RefCell<Sprite>>, to: f64, duration_ms: f64) -> Animation {
        Animation::new(
            PropertyRef::new(s, SpriteProperty::X),
            Value::Number(0.0),
            Value::Number(to),
            duration_ms,
        )
        .unwrap()
    }

    fn counter() -> (Rc<Cell<u32>>, impl Fn() + 'static) {
        let c = Rc::new(Cell::new(0));
        let c2 = c.clone();
        (c, move || c2.set(c2.get() + 1))
    }

    #[test]
    fn ramp_reaches_target_and_completes_once() {
        let s = sprite();
        let scheduler = Scheduler::new();
        let (done, on_done) = counter();
        scheduler.add_animation(x_ramp(&s, 10.0, 100.0).on_complete(on_done));

        scheduler.advance(50.0);
        assert_eq!(s.borrow().x, 5.0);
        assert_eq!(done.get(), 0);

        scheduler.advance(50.0);
        assert_eq!(s.borrow().x, 10.0);
        assert_eq!(done.get(), 1);
        assert!(scheduler.is_idle());

        scheduler.advance(50.0);
        assert_eq!(done.get(), 1);
        assert_eq!(s.borrow().x, 10.0);
    }

    #[test]
    fn bounce_returns_to_start() {
        let s = sprite();
        let scheduler = Scheduler::new();
        scheduler.add_animation(x_ramp(&s, 10.0, 100.0).bounce(true));
        scheduler.advance(50.0);
        assert_eq!(s.borrow().x, 10.0);
        scheduler.advance(50.0);
        assert_eq!(s.borrow().x, 0.0);
        assert!(scheduler.is_idle());
    }

    #[test]
    fn loops_never_complete() {
        let s = sprite();
        let scheduler = Scheduler::new();
        let (done, on_done) = counter();
        scheduler.add_animation(x_ramp(&s, 10.0, 100.0).looping(true).on_complete(on_done));
        for _ in 0..10 {
            scheduler.advance(100.0);
            assert_eq!(s.borrow().x, 10.0);
        }
        scheduler.advance(50.0);
        assert_eq!(s.borrow().x, 5.0);
        assert_eq!(done.get(), 0);
        assert_eq!(scheduler.active_count(), 1);
    }

    #[test]
    fn zero_duration_completes_on_first_advance() {
        let s = sprite();
        let scheduler = Scheduler::new();
        let (done, on_done) = counter();
        scheduler.add_animation(x_ramp(&s, 3.0, 0.0).on_complete(on_done));
        scheduler.advance(0.0);
        assert_eq!(s.borrow().x, 3.0);
        assert_eq!(done.get(), 1);
    }

    #[test]
    fn removed_animation_never_fires() {
        let s = sprite();
        let scheduler = Scheduler::new();
        let (done, on_done) = counter();
        let id = scheduler.add_animation(x_ramp(&s, 10.0, 100.0).on_complete(on_done));
        assert!(scheduler.remove_animation(id));
        assert!(!scheduler.remove_animation(id));
        scheduler.advance(200.0);
        assert_eq!(done.get(), 0);
        assert_eq!(s.borrow().x, 0.0);
    }

    #[test]
    fn replace_policy_cancels_previous() {
        let s = sprite();
        let scheduler = Scheduler::new();
        let (first_done, on_first) = counter();
        let first = scheduler.add_animation(x_ramp(&s, 10.0, 100.0).on_complete(on_first));
        scheduler.advance(50.0);
        let second = scheduler.add_animation(x_ramp(&s, 100.0, 100.0));
        assert!(!scheduler.contains(first));
        assert!(scheduler.contains(second));
        scheduler.advance(100.0);
        assert_eq!(s.borrow().x, 100.0);
        assert_eq!(first_done.get(), 0);
    }

    #[test]
    fn concurrent_policy_last_write_wins() {
        let s = sprite();
        let scheduler = Scheduler::with_policy(DuplicatePolicy::Concurrent);
        scheduler.add_animation(x_ramp(&s, 10.0, 100.0));
        scheduler.add_animation(x_ramp(&s, 100.0, 100.0));
        assert_eq!(scheduler.active_count(), 2);
        scheduler.advance(50.0);
        assert_eq!(s.borrow().x, 50.0);
    }

    #[test]
    fn other_properties_are_not_replaced() {
        let s = sprite();
        let scheduler = Scheduler::new();
        scheduler.add_animation(x_ramp(&s, 10.0, 100.0));
        let opacity = Animation::new(
            PropertyRef::new(&s, SpriteProperty::Opacity),
            Value::Number(1.0),
            Value::Number(0.0),
            100.0,
        )
        .unwrap();
        scheduler.add_animation(opacity);
        assert_eq!(scheduler.active_count(), 2);
        assert_eq!(scheduler.cancel_target(crate::TargetKey::of(&s)), 2);
    }

    #[test]
    fn dropped_target_cancels_without_completion() {
        let s = sprite();
        let scheduler = Scheduler::new();
        let (done, on_done) = counter();
        scheduler.add_animation(x_ramp(&s, 10.0, 100.0).on_complete(on_done));
        drop(s);
        scheduler.advance(100.0);
        assert!(scheduler.is_idle());
        assert_eq!(done.get(), 0);
    }

    #[test]
    fn unsupported_write_is_skipped_not_fatal() {
        let s = sprite();
        let scheduler = Scheduler::new();
        let label = Animation::new(
            PropertyRef::new(&s, SpriteProperty::Label),
            Value::Number(0.0),
            Value::Number(1.0),
            100.0,
        )
        .unwrap();
        let (done, on_done) = counter();
        scheduler.add_animation(label.on_complete(on_done));
        scheduler.add_animation(x_ramp(&s, 10.0, 100.0));
        scheduler.advance(100.0);
        assert_eq!(s.borrow().x, 10.0);
        assert_eq!(done.get(), 1);
    }

    #[test]
    fn completion_may_chain_animations() {
        let s = sprite();
        let scheduler = Scheduler::new();
        let chained = scheduler.clone();
        let target = s.clone();
        scheduler.add_animation(x_ramp(&s, 10.0, 100.0).on_complete(move || {
            chained.add_animation(
                Animation::new(
                    PropertyRef::new(&target, SpriteProperty::X),
                    Value::Number(10.0),
                    Value::Number(20.0),
                    100.0,
                )
                .unwrap(),
            );
        }));
        scheduler.advance(100.0);
        assert_eq!(scheduler.active_count(), 1);
        scheduler.advance(100.0);
        assert_eq!(s.borrow().x, 20.0);
    }

    #[test]
    fn redraw_requested_only_while_animating() {
        let s = sprite();
        let scheduler = Scheduler::new();
        scheduler.advance(16.0);
        assert!(!scheduler.take_redraw_request());

        scheduler.add_animation(x_ramp(&s, 10.0, 32.0));
        scheduler.advance(16.0);
        assert!(scheduler.take_redraw_request());
        assert!(!scheduler.take_redraw_request());

        let (frames, on_frame) = counter();
        scheduler.set_request_redraw_callback(on_frame);
        scheduler.advance(16.0);
        scheduler.advance(16.0);
        assert_eq!(frames.get(), 1);
    }

    #[test]
    fn tick_uses_wall_clock_deltas() {
        let s = sprite();
        let scheduler = Scheduler::new();
        scheduler.add_animation(x_ramp(&s, 10.0, 100.0));
        scheduler.tick(1_000.0);
        assert_eq!(s.borrow().x, 0.0);
        scheduler.tick(1_025.0);
        assert_eq!(s.borrow().x, 2.5);
        // Clock going backwards does not rewind.
        scheduler.tick(1_000.0);
        assert_eq!(s.borrow().x, 2.5);
    }

    #[test]
    fn owned_scheduler_runs_callbacks_inline() {
        let s = sprite();
        let mut scheduler = AnimationScheduler::new();
        let (done, on_done) = counter();
        scheduler.add_animation(x_ramp(&s, 1.0, 10.0).on_complete(on_done));
        scheduler.advance(10.0);
        assert_eq!(done.get(), 1);
        assert!(scheduler.take_redraw_request());
    }
}
