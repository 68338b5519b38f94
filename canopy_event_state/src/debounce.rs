// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer-up debounce.
//!
//! A pointer-up is processed when no earlier pointer-up was seen, or when more
//! than the threshold has elapsed since the previous one. The timestamp is
//! recorded either way, so a burst of rapid releases keeps being suppressed
//! until a gap longer than the threshold.
//!
//! ```
//! use canopy_event_state::debounce::DebounceState;
//!
//! let mut debounce = DebounceState::new();
//! assert!(debounce.on_pointer_up(1_000.0));
//! assert!(!debounce.on_pointer_up(1_150.0));
//! assert!(!debounce.on_pointer_up(1_300.0)); // 150 ms after the suppressed one
//! assert!(debounce.on_pointer_up(1_501.0));
//! ```

/// Default debounce window in milliseconds.
pub const DEFAULT_THRESHOLD_MS: f64 = 200.0;

/// Suppresses pointer-ups that follow the previous one too closely.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DebounceState {
    /// Minimum gap, exclusive, between processed pointer-ups (milliseconds).
    pub threshold_ms: f64,
    last_up_ms: Option<f64>,
}

impl Default for DebounceState {
    fn default() -> Self {
        Self::new()
    }
}

impl DebounceState {
    /// Create a debounce with the default 200 ms window.
    pub fn new() -> Self {
        Self::with_threshold(DEFAULT_THRESHOLD_MS)
    }

    /// Create a debounce with a custom window.
    pub fn with_threshold(threshold_ms: f64) -> Self {
        Self {
            threshold_ms,
            last_up_ms: None,
        }
    }

    /// Record a pointer-up at `timestamp_ms` and decide whether to process it.
    pub fn on_pointer_up(&mut self, timestamp_ms: f64) -> bool {
        let process = self
            .last_up_ms
            .is_none_or(|last| timestamp_ms - last > self.threshold_ms);
        self.last_up_ms = Some(timestamp_ms);
        process
    }

    /// Timestamp of the most recent pointer-up, processed or not.
    pub fn last_pointer_up(&self) -> Option<f64> {
        self.last_up_ms
    }

    /// Forget the previous pointer-up.
    pub fn reset(&mut self) {
        self.last_up_ms = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_threshold_is_suppressed() {
        let mut d = DebounceState::new();
        assert!(d.on_pointer_up(0.0));
        assert!(!d.on_pointer_up(200.0));
        assert!(d.on_pointer_up(400.5));
    }

    #[test]
    fn clicks_spaced_apart_are_all_processed() {
        let mut d = DebounceState::new();
        assert!(d.on_pointer_up(1_000.0));
        assert!(d.on_pointer_up(1_500.0));
        assert!(d.on_pointer_up(2_000.0));
    }

    #[test]
    fn custom_threshold_and_reset() {
        let mut d = DebounceState::with_threshold(50.0);
        assert!(d.on_pointer_up(10.0));
        assert!(!d.on_pointer_up(40.0));
        assert_eq!(d.last_pointer_up(), Some(40.0));
        d.reset();
        assert!(d.on_pointer_up(45.0));
    }
}
