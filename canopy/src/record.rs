// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Persisted form of components and the JSON round trip.
//!
//! A scene is `{ "components": [ ... ] }`. Each record carries the shared
//! component state, its effect bindings (targets by component id, properties by
//! name) and whatever class-specific fields the widget adds. Running
//! animations and callbacks are not persisted.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use canopy_animation::{PropertyRef, TargetKey};
use canopy_effect::{EffectBinder, EventEffectsRecord};
use canopy_index::Rectangle;
use kurbo::Point;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value as Json};

use crate::component::Component;
use crate::config::CanopyConfig;
use crate::controller::Canopy;
use crate::core::{ComponentCore, DEFAULT_ALIGNMENT_OFFSET};
use crate::error::{ComponentError, DeserializeError};
use crate::property::ComponentProperty;
use crate::types::{AlignmentPoint, ComponentFlags, ComponentId};
use crate::widgets::{Button, Panel, Slider, Text, TextBox, Toggle};

fn yes() -> bool {
    true
}

fn one() -> f64 {
    1.0
}

fn default_offset() -> f64 {
    DEFAULT_ALIGNMENT_OFFSET
}

/// One persisted component.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentRecord {
    /// Component id; effect records name their targets by it.
    pub id: ComponentId,
    /// Class name selecting the factory on restore.
    pub class_name: String,
    /// Alignment point.
    #[serde(default)]
    pub alignment_point: AlignmentPoint,
    /// Alignment inset.
    #[serde(default = "default_offset")]
    pub alignment_offset: f64,
    /// Visibility.
    #[serde(default = "yes")]
    pub is_visible: bool,
    /// Draggability.
    #[serde(default)]
    pub is_draggable: bool,
    /// Paint order.
    #[serde(default)]
    pub z_index: i32,
    /// Tags, sorted.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Top-left corner; restored after the bounds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<[f64; 2]>,
    /// `[x, y, width, height]` in device pixels.
    #[serde(default)]
    pub bounds: [f64; 4],
    /// Draw scale.
    #[serde(default = "one")]
    pub scale: f64,
    /// Effect bindings, grouped by event.
    #[serde(default)]
    pub event_effects: Vec<EventEffectsRecord>,
    /// Class-specific fields.
    #[serde(flatten)]
    pub fields: Map<String, Json>,
}

impl ComponentRecord {
    /// Capture a component's shared state and the given class fields.
    pub fn capture(
        core: &ComponentCore,
        class_name: &str,
        fields: Map<String, Json>,
        id_of: &mut dyn FnMut(&PropertyRef) -> Option<u64>,
    ) -> Self {
        let b = core.bounds();
        let p = core.position();
        Self {
            id: core.id(),
            class_name: class_name.to_owned(),
            alignment_point: core.alignment_point(),
            alignment_offset: core.alignment_offset(),
            is_visible: core.is_visible(),
            is_draggable: core.is_draggable(),
            z_index: core.z_index(),
            tags: core.tags().iter().cloned().collect(),
            position: Some([p.x, p.y]),
            bounds: [b.x, b.y, b.width, b.height],
            scale: core.scale(),
            event_effects: core.effects().to_records(|p| id_of(p)),
            fields,
        }
    }

    /// Rebuild the shared state, claiming the persisted id. Effects are not bound here.
    pub fn restore_core(&self) -> ComponentCore {
        let [x, y, w, h] = self.bounds;
        let mut core = ComponentCore::with_id(
            ComponentId::restore(self.id.get()),
            Rectangle::new(x, y, w, h),
        );
        if let Some([px, py]) = self.position {
            core.set_position(Point::new(px, py));
        }
        core.set_alignment_point(self.alignment_point);
        core.set_alignment_offset(self.alignment_offset);
        let mut flags = ComponentFlags::empty();
        flags.set(ComponentFlags::VISIBLE, self.is_visible);
        flags.set(ComponentFlags::DRAGGABLE, self.is_draggable);
        core.set_flags(flags);
        core.set_z_index(self.z_index);
        core.set_tags(self.tags.iter().cloned());
        core.set_scale(self.scale);
        core
    }

    /// Parse the class-specific fields.
    pub fn fields_as<T: DeserializeOwned>(&self) -> Result<T, ComponentError> {
        serde_json::from_value(Json::Object(self.fields.clone())).map_err(|source| {
            ComponentError::Malformed {
                class: self.class_name.clone(),
                source,
            }
        })
    }

    /// Child ids listed by container records.
    pub fn child_ids(&self) -> Vec<ComponentId> {
        self.fields
            .get("children")
            .and_then(Json::as_array)
            .map(|ids| {
                ids.iter()
                    .filter_map(Json::as_u64)
                    .map(ComponentId::restore)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Builds a component, without effect bindings, from its record.
pub type ComponentFactory = fn(&ComponentRecord) -> Result<Component, ComponentError>;

/// Class name to factory table used when restoring a scene.
///
/// The default registry knows the built-in widgets; hosts add their own.
#[derive(Clone)]
pub struct ComponentRegistry {
    factories: BTreeMap<String, ComponentFactory>,
}

impl fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.factories.keys()).finish()
    }
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(Button::CLASS_NAME, Button::from_record);
        registry.register(Toggle::CLASS_NAME, Toggle::from_record);
        registry.register(Slider::CLASS_NAME, Slider::from_record);
        registry.register(Panel::CLASS_NAME, Panel::from_record);
        registry.register(Text::CLASS_NAME, Text::from_record);
        registry.register(TextBox::CLASS_NAME, TextBox::from_record);
        registry
    }
}

impl ComponentRegistry {
    /// A registry with no classes.
    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Register or replace the factory for `class_name`.
    pub fn register(&mut self, class_name: impl Into<String>, factory: ComponentFactory) {
        self.factories.insert(class_name.into(), factory);
    }

    /// Whether `class_name` is known.
    pub fn contains(&self, class_name: &str) -> bool {
        self.factories.contains_key(class_name)
    }

    /// Build the component a record describes.
    pub fn restore(&self, record: &ComponentRecord) -> Result<Component, ComponentError> {
        let factory = self
            .factories
            .get(&record.class_name)
            .ok_or_else(|| ComponentError::UnknownClass(record.class_name.clone()))?;
        factory(record)
    }
}

#[derive(serde::Serialize)]
struct SceneOut {
    components: Vec<ComponentRecord>,
}

#[derive(serde::Deserialize)]
struct SceneIn {
    components: Vec<Json>,
}

impl Canopy {
    /// Persisted form of every registered component, in registration order.
    pub fn component_records(&self) -> Vec<ComponentRecord> {
        let ids: HashMap<TargetKey, u64> = self
            .components()
            .map(|c| (c.target_key(), c.id().get()))
            .collect();
        let mut id_of = |p: &PropertyRef| ids.get(&p.target_key()).copied();
        self.components()
            .map(|c| c.borrow().to_record(&mut id_of))
            .collect()
    }

    /// Serialize every component as pretty-printed JSON.
    pub fn serialize_components(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&SceneOut {
            components: self.component_records(),
        })
    }

    /// Restore a scene serialized by [`serialize_components`](Self::serialize_components),
    /// using the built-in widget classes.
    pub fn from_json(
        json: &str,
        config: CanopyConfig,
    ) -> Result<(Self, Vec<ComponentError>), DeserializeError> {
        Self::from_json_with(json, config, &ComponentRegistry::default())
    }

    /// Restore a scene with a custom registry.
    ///
    /// Only a malformed top level fails. Records that cannot be restored and
    /// effects whose target cannot be resolved are logged, skipped and
    /// returned; everything else is restored.
    pub fn from_json_with(
        json: &str,
        config: CanopyConfig,
        registry: &ComponentRegistry,
    ) -> Result<(Self, Vec<ComponentError>), DeserializeError> {
        let scene: SceneIn = serde_json::from_str(json)?;
        let mut errors = Vec::new();
        let mut restored: Vec<(Component, ComponentRecord)> = Vec::new();
        let mut by_id: HashMap<ComponentId, Component> = HashMap::new();

        for raw in scene.components {
            let class = raw
                .get("className")
                .and_then(Json::as_str)
                .unwrap_or("<unnamed>")
                .to_owned();
            let record: ComponentRecord = match serde_json::from_value(raw) {
                Ok(record) => record,
                Err(source) => {
                    let err = ComponentError::Malformed { class, source };
                    log::warn!("skipping component: {err}");
                    errors.push(err);
                    continue;
                }
            };
            if by_id.contains_key(&record.id) {
                log::warn!("skipping component {}: duplicate id", record.id);
                errors.push(ComponentError::DuplicateId(record.id));
                continue;
            }
            match registry.restore(&record) {
                Ok(component) => {
                    by_id.insert(record.id, component.clone());
                    restored.push((component, record));
                }
                Err(err) => {
                    log::warn!("skipping component {}: {err}", record.id);
                    errors.push(err);
                }
            }
        }

        for (component, record) in &restored {
            for child_id in record.child_ids() {
                match by_id.get(&child_id) {
                    Some(child) => {
                        if !component.borrow_mut().add_child(child.clone()) {
                            log::warn!("panel {} cannot hold child {child_id}", record.id);
                            errors.push(ComponentError::CyclicChild {
                                panel: record.id,
                                child: child_id,
                            });
                        }
                    }
                    None => {
                        log::warn!("panel {} lists missing child {child_id}", record.id);
                        errors.push(ComponentError::MissingChild {
                            panel: record.id,
                            child: child_id,
                        });
                    }
                }
            }
            let (binder, failures) =
                EffectBinder::from_records(record.event_effects.clone(), |id, property| {
                    let target = match id {
                        Some(raw) => by_id.get(&ComponentId::restore(raw))?,
                        None => component,
                    };
                    let property = property.parse::<ComponentProperty>().ok()?;
                    Some(target.property(property))
                });
            *component.borrow_mut().core_mut().effects_mut() = binder;
            for source in failures {
                log::warn!("component {}: skipping effect: {source}", record.id);
                errors.push(ComponentError::Effect {
                    component: record.id,
                    source,
                });
            }
        }

        let mut canopy = Self::new(config);
        for (component, _) in restored {
            canopy.add_component(component);
        }
        Ok((canopy, errors))
    }
}
