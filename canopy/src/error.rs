// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use canopy_effect::EffectError;

use crate::types::ComponentId;

/// A component that could not be restored, or an effect that could not be rebound.
///
/// Restoring continues past these; they are collected and returned.
#[derive(Debug, thiserror::Error)]
pub enum ComponentError {
    /// No factory is registered for the class name.
    #[error("unknown component class `{0}`")]
    UnknownClass(String),
    /// A persisted property name is not one of the animatable properties.
    #[error("unknown property `{0}`")]
    UnknownProperty(String),
    /// The record does not have the shape its class expects.
    #[error("malformed `{class}` record: {source}")]
    Malformed {
        /// Class name of the record.
        class: String,
        /// What failed to parse.
        source: serde_json::Error,
    },
    /// Two records carry the same id; the later one is skipped.
    #[error("duplicate component id {0}")]
    DuplicateId(ComponentId),
    /// A panel lists a child id that no record defines.
    #[error("panel {panel} lists missing child {child}")]
    MissingChild {
        /// The panel.
        panel: ComponentId,
        /// The missing child id.
        child: ComponentId,
    },
    /// A panel lists a child that already contains the panel.
    #[error("panel {panel} cannot hold {child}: the child contains the panel")]
    CyclicChild {
        /// The panel.
        panel: ComponentId,
        /// The rejected child.
        child: ComponentId,
    },
    /// An effect binding of a restored component was skipped.
    #[error("effect of component {component} skipped: {source}")]
    Effect {
        /// Owner of the binding.
        component: ComponentId,
        /// Why it was skipped.
        source: EffectError,
    },
}

/// Scene JSON that could not be read at all.
#[derive(Debug, thiserror::Error)]
pub enum DeserializeError {
    /// The text is not JSON of the expected top-level shape.
    #[error("malformed scene: {0}")]
    Json(#[from] serde_json::Error),
}
