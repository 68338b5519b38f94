// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hover set tracking: compute enter/leave transitions as the pointer moves.
//!
//! Unlike path-based hover, the hover set here is flat: every element whose
//! bounds contain the pointer is hovered at once, overlapping elements
//! included. Transitions are the set difference between the previous and the
//! new set, so each element gets exactly one enter and one leave per
//! continuous hover session.
//!
//! ## Minimal example
//!
//! ```
//! use canopy_event_state::hover::HoverState;
//!
//! let mut hover = HoverState::new();
//!
//! let t = hover.update([1, 2]);
//! assert_eq!(t.entered, [1, 2]);
//! assert!(t.left.is_empty());
//!
//! let t = hover.update([2, 3]);
//! assert_eq!(t.entered, [3]);
//! assert_eq!(t.hovered, [2, 3]);
//! assert_eq!(t.left, [1]);
//! ```

use alloc::vec::Vec;

/// Transitions produced by one [`HoverState::update`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HoverTransitions<K> {
    /// Elements that were not hovered before, in query order.
    pub entered: Vec<K>,
    /// Every element hovered now, in query order; the move targets.
    pub hovered: Vec<K>,
    /// Elements that are no longer hovered, in their previous order.
    pub left: Vec<K>,
}

impl<K> HoverTransitions<K> {
    /// Whether nothing entered or left.
    pub fn is_unchanged(&self) -> bool {
        self.entered.is_empty() && self.left.is_empty()
    }
}

/// The current hover set.
#[derive(Clone, Debug)]
pub struct HoverState<K> {
    current: Vec<K>,
}

impl<K> Default for HoverState<K> {
    fn default() -> Self {
        Self {
            current: Vec::new(),
        }
    }
}

impl<K: PartialEq + Clone> HoverState<K> {
    /// Create an empty hover state.
    pub fn new() -> Self {
        Self::default()
    }

    /// The hovered elements, in the order they were last reported.
    pub fn current(&self) -> &[K] {
        &self.current
    }

    /// Whether `k` is hovered.
    pub fn is_hovered(&self, k: &K) -> bool {
        self.current.contains(k)
    }

    /// Replace the hover set and report what changed.
    ///
    /// Repeated elements in `now` are reported once.
    pub fn update(&mut self, now: impl IntoIterator<Item = K>) -> HoverTransitions<K> {
        let mut hovered: Vec<K> = Vec::new();
        for k in now {
            if !hovered.contains(&k) {
                hovered.push(k);
            }
        }
        let entered = hovered
            .iter()
            .filter(|k| !self.current.contains(k))
            .cloned()
            .collect();
        let previous = core::mem::replace(&mut self.current, hovered.clone());
        let left = previous
            .into_iter()
            .filter(|k| !hovered.contains(k))
            .collect();
        HoverTransitions {
            entered,
            hovered,
            left,
        }
    }

    /// Forget `k` without reporting a leave, for elements that were removed.
    pub fn remove(&mut self, k: &K) -> bool {
        let before = self.current.len();
        self.current.retain(|c| c != k);
        before != self.current.len()
    }

    /// Forget everything, returning what was hovered.
    pub fn clear(&mut self) -> Vec<K> {
        core::mem::take(&mut self.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn one_enter_and_one_leave_per_session() {
        let mut hover = HoverState::new();
        let mut enters = 0;
        let mut leaves = 0;
        let frames: [&[u8]; 6] = [&[], &[7], &[7], &[7], &[], &[]];
        for frame in frames {
            let t = hover.update(frame.iter().copied());
            enters += t.entered.len();
            leaves += t.left.len();
        }
        assert_eq!((enters, leaves), (1, 1));
    }

    #[test]
    fn overlapping_elements_enter_together() {
        let mut hover = HoverState::new();
        let t = hover.update(vec!['a', 'b']);
        assert_eq!(t.entered, vec!['a', 'b']);
        let t = hover.update(vec!['b']);
        assert_eq!(t.left, vec!['a']);
        assert!(t.entered.is_empty());
        assert_eq!(t.hovered, vec!['b']);
    }

    #[test]
    fn duplicates_are_collapsed() {
        let mut hover = HoverState::new();
        let t = hover.update(vec![1, 1, 2]);
        assert_eq!(t.entered, vec![1, 2]);
        assert_eq!(hover.current(), &[1, 2]);
    }

    #[test]
    fn remove_skips_the_leave() {
        let mut hover = HoverState::new();
        hover.update(vec![1, 2]);
        assert!(hover.remove(&1));
        assert!(!hover.remove(&1));
        let t = hover.update(vec![]);
        assert_eq!(t.left, vec![2]);
        assert!(!hover.is_hovered(&2));
    }

    #[test]
    fn unchanged_set_reports_only_moves() {
        let mut hover = HoverState::new();
        hover.update(vec![3]);
        let t = hover.update(vec![3]);
        assert!(t.is_unchanged());
        assert_eq!(t.hovered, vec![3]);
        assert_eq!(hover.clear(), vec![3]);
    }
}
