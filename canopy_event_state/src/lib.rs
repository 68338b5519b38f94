// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canopy Event State: small state machines for canvas pointer interaction.
//!
//! Each module handles one interaction pattern and knows nothing about
//! components, hit testing or rendering:
//!
//! - [`hover`]: enter/leave transitions of a flat hover set.
//! - [`debounce`]: suppression of pointer-ups that follow each other too closely.
//! - [`pointer`]: last known positions of every active pointer.
//! - [`gesture`]: pinch, rotate and pan deltas from the active pointers.
//!
//! The controller in the `canopy` crate feeds them hit-test results and raw
//! pointer positions and interprets what they report.
//!
//! ## Example
//!
//! ```rust
//! use canopy_event_state::debounce::DebounceState;
//! use canopy_event_state::hover::HoverState;
//!
//! let mut hover = HoverState::new();
//! let mut debounce = DebounceState::new();
//!
//! // Pointer moves over components 1 and 2.
//! let t = hover.update([1, 2]);
//! assert_eq!(t.entered, [1, 2]);
//!
//! // A double release within 200 ms is processed once.
//! assert!(debounce.on_pointer_up(10.0));
//! assert!(!debounce.on_pointer_up(60.0));
//! ```
//!
//! ## Features
//!
//! - `std` *(default)*: forwards to `kurbo/std`.
//! - `libm`: forwards to `kurbo/libm` for `no_std` targets.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod debounce;
pub mod gesture;
pub mod hover;
pub mod pointer;
