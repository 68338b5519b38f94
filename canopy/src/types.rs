// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Identifiers, flags and small enums shared by components and the controller.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Straight RGBA color, channels in `0.0..=1.0`.
pub type Color = [f64; 4];

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Identifier of a component, unique within the process.
///
/// Ids are persisted, so effect bindings can name their target component.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ComponentId(u64);

impl ComponentId {
    /// Allocate a fresh id.
    pub fn next() -> Self {
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Claim a persisted id so later [`ComponentId::next`] calls never return it.
    pub fn restore(raw: u64) -> Self {
        NEXT_ID.fetch_max(raw.saturating_add(1), Ordering::Relaxed);
        Self(raw)
    }

    /// The raw value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

bitflags::bitflags! {
    /// Component flags controlling drawing and interaction.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ComponentFlags: u8 {
        /// Component is drawn and receives pointer input.
        const VISIBLE   = 0b0000_0001;
        /// Component may be dragged by the host.
        const DRAGGABLE = 0b0000_0010;
    }
}

impl Default for ComponentFlags {
    fn default() -> Self {
        Self::VISIBLE
    }
}

/// Where a component places itself inside a container when aligned.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AlignmentPoint {
    /// Top-left corner of the container, no offset.
    #[default]
    None,
    /// Top-left, inset by the offset on both axes.
    TopLeft,
    /// Centered horizontally, inset from the top.
    TopCenter,
    /// Top-right, inset on both axes.
    TopRight,
    /// Centered vertically, inset from the left.
    MiddleLeft,
    /// Centered on both axes.
    MiddleCenter,
    /// Centered vertically, inset from the right.
    MiddleRight,
    /// Bottom-left, inset on both axes.
    BottomLeft,
    /// Centered horizontally, inset from the bottom.
    BottomCenter,
    /// Bottom-right, inset on both axes.
    BottomRight,
}

/// How a tag filter combines its tags.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum TagMatch {
    /// The component carries every tag.
    #[default]
    All,
    /// The component carries at least one tag.
    Any,
}
