// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canopy: the core of an interactive canvas UI.
//!
//! Canopy keeps a flat set of positioned, drawable components over a canvas,
//! routes pointer, wheel and gesture input to them, and drives declarative
//! property effects and animations. It does not rasterize: hosts implement
//! [`Renderer`] and call [`Canopy::draw`] when a repaint is requested.
//!
//! - [`UiComponent`] is the widget trait; [`Component`] is the shared handle
//!   the controller, effects and animations hold.
//! - [`Canopy`] registers components in a quad tree ([`canopy_index`]) and
//!   dispatches input: hover enter/leave by set difference, debounced
//!   releases, cancellation and multi-touch gestures ([`canopy_event_state`]).
//! - Effects bound to UI events ([`canopy_effect`]) set, toggle or animate
//!   properties through the controller's [`Scheduler`] ([`canopy_animation`]);
//!   they fire before a component's own reaction.
//! - Scenes round-trip through JSON with [`Canopy::serialize_components`] and
//!   [`Canopy::from_json`], effect bindings included.
//!
//! # Example
//!
//! ```rust
//! use std::{cell::Cell, rc::Rc};
//!
//! use canopy::kurbo::Point;
//! use canopy::{Button, ButtonStyle, Canopy, CanopyConfig, PointerInput, Rectangle};
//!
//! let mut canopy = Canopy::new(CanopyConfig::with_canvas_size(800.0, 600.0));
//! let clicks = Rc::new(Cell::new(0));
//! let c = clicks.clone();
//! let ok = Button::new(Rectangle::new(10.0, 10.0, 100.0, 40.0), ButtonStyle::labeled("OK"))
//!     .on_click(move || c.set(c.get() + 1))
//!     .into_component();
//! canopy.add_component(ok);
//!
//! let at = Point::new(20.0, 20.0);
//! canopy.pointer_down(PointerInput::new(1, at, 0.0));
//! canopy.pointer_up(PointerInput::new(1, at, 50.0));
//!
//! // The press springs back over 100 ms, then the click fires.
//! canopy.advance(100.0);
//! assert_eq!(clicks.get(), 1);
//! assert!(canopy.take_redraw_request());
//! ```
//!
//! Everything runs on one thread. Handlers, effect callbacks and animation
//! completions are invoked with no borrow of their component held, so they may
//! read and write it.

mod component;
mod config;
mod controller;
mod core;
mod error;
mod event;
mod property;
mod record;
mod render;
mod types;
mod widgets;

pub use canopy_animation::{DuplicatePolicy, PropertyError, PropertyRef, Scheduler, Value};
pub use canopy_effect::{Effect, EffectError, EffectEvent, EffectSpec, EffectType, EventKind};
pub use canopy_event_state::gesture::{Gesture, GestureListener};
pub use canopy_event_state::pointer::PointerId;
pub use canopy_index::{Bounded, QuadTreeConfig, Rectangle};
pub use kurbo;

pub use component::{Component, UiComponent, WeakComponent};
pub use config::CanopyConfig;
pub use controller::Canopy;
pub use self::core::{
    ComponentCore, DEFAULT_ALIGNMENT_OFFSET, PointerHandler, ResizeListener, WheelHandler,
};
pub use error::{ComponentError, DeserializeError};
pub use event::{DispatchSummary, PointerEvent, PointerInput, WheelEvent, WheelInput};
pub use property::ComponentProperty;
pub use record::{ComponentFactory, ComponentRecord, ComponentRegistry};
pub use render::Renderer;
pub use types::{AlignmentPoint, Color, ComponentFlags, ComponentId, TagMatch};
pub use widgets::{
    Button, ButtonStyle, ClickFn, Panel, PanelLayout, Slider, SliderStyle, Text, TextBox,
    TextBoxStyle, TextStyle, Toggle, ToggleStyle,
};
