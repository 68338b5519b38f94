// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canopy Index: a quad-tree spatial index over axis-aligned bounds.
//!
//! The index answers two questions for an interactive canvas:
//!
//! - Which elements contain this point? (hit testing for pointer events)
//! - Which elements intersect this rectangle? (culling for redraw)
//!
//! Elements are any type implementing [`Bounded`]. The tree stores them by
//! value and compares them with `PartialEq` on removal, so the usual element is
//! a cheap shared handle that compares by identity.
//!
//! It is generic over the scalar type `T` and does not depend on any geometry crate.
//!
//! # Example
//!
//! ```rust
//! use canopy_index::{QuadTree, QuadTreeConfig, Rectangle};
//!
//! let mut tree = QuadTree::with_config(
//!     Rectangle::new(0.0, 0.0, 800.0, 600.0),
//!     QuadTreeConfig::with_capacity(2),
//! );
//! for i in 0..8_u32 {
//!     let x = f64::from(i) * 90.0;
//!     tree.insert((i, Rectangle::new(x, 20.0, 40.0, 40.0)));
//! }
//!
//! let hits = tree.query_point(95.0, 30.0);
//! assert_eq!(hits.len(), 1);
//! assert_eq!(hits[0].0, 1);
//!
//! let visible = tree.query(&Rectangle::new(0.0, 0.0, 200.0, 100.0));
//! assert_eq!(visible.len(), 3);
//! ```
//!
//! ## Features
//!
//! - `serde`: derive `Serialize`/`Deserialize` for [`Rectangle`] and [`QuadTreeConfig`].
//!
//! ### Float semantics
//!
//! This crate assumes no NaNs for floating-point coordinates. A NaN bound never
//! contains or intersects anything.

#![no_std]

extern crate alloc;

mod quadtree;
mod types;

pub use quadtree::{QuadTree, QuadTreeConfig};
pub use types::{Bounded, Rectangle, Scalar};
