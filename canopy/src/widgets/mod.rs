// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Built-in widgets.
//!
//! Each widget is a plain struct implementing [`UiComponent`](crate::UiComponent).
//! Widgets that react to input through effects bind them to themselves in
//! `into_component`, which needs the shared handle; restoring from a record
//! skips that step because the persisted bindings are restored instead.

mod button;
mod panel;
mod slider;
mod text;
mod toggle;

pub use button::{Button, ButtonStyle, ClickFn};
pub use panel::{Panel, PanelLayout};
pub use slider::{Slider, SliderStyle};
pub use text::{Text, TextBox, TextBoxStyle, TextStyle};
pub use toggle::{Toggle, ToggleStyle};

use canopy_index::Rectangle;
use kurbo::Rect;
use serde::Serialize;
use serde_json::{Map, Value as Json};

/// `bounds` scaled by `scale` around their center.
pub(crate) fn scaled_rect(bounds: Rectangle, scale: f64) -> Rect {
    let (cx, cy) = bounds.center();
    let (hw, hh) = (bounds.width * scale / 2.0, bounds.height * scale / 2.0);
    Rect::new(cx - hw, cy - hh, cx + hw, cy + hh)
}

/// Persisted class fields of a widget, as a JSON object.
pub(crate) fn to_fields(fields: &impl Serialize) -> Map<String, Json> {
    match serde_json::to_value(fields) {
        Ok(Json::Object(map)) => map,
        Ok(other) => {
            log::warn!("widget fields serialized to a non-object: {other}");
            Map::new()
        }
        Err(err) => {
            log::warn!("failed to serialize widget fields: {err}");
            Map::new()
        }
    }
}
