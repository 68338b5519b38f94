// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Persisted form of effect bindings.
//!
//! Targets are stored as an object id plus a property name; the owner of the
//! objects maps between ids and live [`PropertyRef`]s. Callbacks are not
//! persisted; the direction of a toggling animation is.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use canopy_animation::{PropertyRef, Value};

use crate::binder::EffectBinder;
use crate::effect::{Effect, EffectType};
use crate::error::EffectError;
use crate::event::EventKind;

/// One persisted effect.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct EffectRecord {
    /// Effect kind.
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub effect_type: EffectType,
    /// Id of the target object.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub target_object_id: Option<u64>,
    /// Name of the target property.
    pub property: String,
    /// Value written by `setValue`.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub value: Option<Value>,
    /// Start of `animateValue`.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub from: Option<Value>,
    /// End of `animateValue`.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub to: Option<Value>,
    /// Duration of `animateValue`, in milliseconds.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub duration: Option<f64>,
    /// Bounce flag of `animateValue`.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub is_bounce: Option<bool>,
    /// Loop flag of `animateValue`.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub is_loop: Option<bool>,
    /// Direction-toggle flag of `animateValue`.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub is_toggle: Option<bool>,
    /// Whether a toggling `animateValue` next runs backwards.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub is_reversed: Option<bool>,
    /// First state of `toggleValue`.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub value1: Option<Value>,
    /// Second state of `toggleValue`.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub value2: Option<Value>,
}

/// The persisted effects of one event.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EventEffectsRecord {
    /// Event the effects are bound to.
    pub event: EventKind,
    /// Effects in registration order.
    pub effects: Vec<EffectRecord>,
}

impl EffectRecord {
    fn empty(effect_type: EffectType, target_object_id: Option<u64>, property: &str) -> Self {
        Self {
            effect_type,
            target_object_id,
            property: property.to_string(),
            value: None,
            from: None,
            to: None,
            duration: None,
            is_bounce: None,
            is_loop: None,
            is_toggle: None,
            is_reversed: None,
            value1: None,
            value2: None,
        }
    }

    /// Rebuild the effect against a resolved target.
    pub fn into_effect(self, target: PropertyRef) -> Result<Effect, EffectError> {
        let effect = self.effect_type.as_str();
        let missing = |field| EffectError::MissingValue { effect, field };
        Ok(match self.effect_type {
            EffectType::SetValue => {
                Effect::set_value(target, self.value.ok_or_else(|| missing("value"))?)
            }
            EffectType::ToggleValue => Effect::toggle_value(
                target,
                self.value1.ok_or_else(|| missing("value1"))?,
                self.value2.ok_or_else(|| missing("value2"))?,
            ),
            EffectType::AnimateValue => Effect::animate_value(
                target,
                self.from.ok_or_else(|| missing("from"))?,
                self.to.ok_or_else(|| missing("to"))?,
                self.duration.unwrap_or(0.0),
            )?
            .bounce(self.is_bounce.unwrap_or(false))
            .looping(self.is_loop.unwrap_or(false))
            .toggle(self.is_toggle.unwrap_or(false))
            .reversed(self.is_reversed.unwrap_or(false))
            .into(),
        })
    }
}

impl Effect {
    /// Persisted form, with the target identified by `target_object_id`.
    pub fn to_record(&self, target_object_id: Option<u64>) -> EffectRecord {
        let mut record =
            EffectRecord::empty(self.effect_type(), target_object_id, self.target().name());
        match self {
            Self::SetValue { value, .. } => record.value = Some(value.clone()),
            Self::ToggleValue { value1, value2, .. } => {
                record.value1 = Some(value1.clone());
                record.value2 = Some(value2.clone());
            }
            Self::AnimateValue(a) => {
                record.from = Some(a.from().clone());
                record.to = Some(a.to().clone());
                record.duration = Some(a.duration_ms());
                record.is_bounce = Some(a.is_bounce());
                record.is_loop = Some(a.is_looping());
                record.is_toggle = Some(a.is_toggle());
                record.is_reversed = a.is_toggle().then_some(a.is_reversed());
            }
        }
        record
    }
}

impl EffectBinder {
    /// Persisted form of every binding, events in [`EventKind`] order.
    ///
    /// `id_of` maps an effect target to the id of its object.
    pub fn to_records(
        &self,
        mut id_of: impl FnMut(&PropertyRef) -> Option<u64>,
    ) -> Vec<EventEffectsRecord> {
        self.events()
            .into_iter()
            .map(|event| EventEffectsRecord {
                event,
                effects: self
                    .effects_for(event)
                    .iter()
                    .map(|e| e.to_record(id_of(e.target())))
                    .collect(),
            })
            .collect()
    }

    /// Rebuild bindings from records.
    ///
    /// `resolve` maps a persisted target id and property name to a live
    /// property. Effects that fail to resolve or rebuild are skipped and
    /// reported; the rest are bound in order.
    pub fn from_records(
        records: Vec<EventEffectsRecord>,
        mut resolve: impl FnMut(Option<u64>, &str) -> Option<PropertyRef>,
    ) -> (Self, Vec<EffectError>) {
        let mut binder = Self::new();
        let mut errors = Vec::new();
        for record in records {
            for effect in record.effects {
                let Some(target) = resolve(effect.target_object_id, &effect.property) else {
                    errors.push(EffectError::UnresolvedTarget {
                        id: effect.target_object_id,
                        property: effect.property,
                    });
                    continue;
                };
                match effect.into_effect(target) {
                    Ok(e) => binder.bind(record.event, e),
                    Err(err) => errors.push(err),
                }
            }
        }
        (binder, errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::tests::{Lamp, LampProperty, lamp};
    use alloc::rc::Rc;
    use canopy_animation::Scheduler;
    use core::cell::RefCell;

    fn resolver(
        l: &Rc<RefCell<Lamp>>,
    ) -> impl FnMut(Option<u64>, &str) -> Option<PropertyRef> + '_ {
        move |id: Option<u64>, property: &str| {
            let p = match (id, property) {
                (Some(7), "on") => LampProperty::On,
                (Some(7), "level") => LampProperty::Level,
                (Some(7), "color") => LampProperty::Color,
                _ => return None,
            };
            Some(PropertyRef::new(l, p))
        }
    }

    #[test]
    fn records_rebuild_equivalent_bindings() {
        let l = lamp();
        let mut binder = EffectBinder::new();
        binder.bind(
            EventKind::PointerEnter,
            Effect::set_value(PropertyRef::new(&l, LampProperty::Color), [1.0, 0.0, 0.0, 1.0]),
        );
        binder.bind(
            EventKind::PointerUp,
            Effect::toggle_value(PropertyRef::new(&l, LampProperty::On), true, false),
        );
        binder.bind(
            EventKind::PointerUp,
            Effect::animate_value(PropertyRef::new(&l, LampProperty::Level), 0.0, 1.0, 40.0)
                .unwrap()
                .toggle(true),
        );

        let records = binder.to_records(|_| Some(7));
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].event, EventKind::PointerUp);
        assert_eq!(records[0].effects[1].is_toggle, Some(true));

        let (rebuilt, errors) = EffectBinder::from_records(records.clone(), resolver(&l));
        assert!(errors.is_empty());
        assert_eq!(rebuilt.to_records(|_| Some(7)), records);

        let scheduler = Scheduler::new();
        rebuilt.apply_event(EventKind::PointerUp, &scheduler);
        scheduler.advance(40.0);
        assert!(l.borrow().on);
        assert_eq!(l.borrow().level, 1.0);
    }

    #[test]
    fn toggling_direction_survives_a_rebuild() {
        let l = lamp();
        let mut binder = EffectBinder::new();
        binder.bind(
            EventKind::PointerUp,
            Effect::animate_value(PropertyRef::new(&l, LampProperty::Level), 0.0, 1.0, 40.0)
                .unwrap()
                .toggle(true),
        );
        let scheduler = Scheduler::new();
        binder.apply_event(EventKind::PointerUp, &scheduler);
        scheduler.advance(40.0);
        assert_eq!(l.borrow().level, 1.0);

        let records = binder.to_records(|_| Some(7));
        assert_eq!(records[0].effects[0].is_reversed, Some(true));
        let (rebuilt, errors) = EffectBinder::from_records(records, resolver(&l));
        assert!(errors.is_empty());

        rebuilt.apply_event(EventKind::PointerUp, &scheduler);
        scheduler.advance(40.0);
        assert_eq!(l.borrow().level, 0.0);
        rebuilt.apply_event(EventKind::PointerUp, &scheduler);
        scheduler.advance(40.0);
        assert_eq!(l.borrow().level, 1.0);
    }

    #[test]
    fn unresolved_targets_are_reported_and_skipped() {
        let l = lamp();
        let mut good = EffectRecord::empty(EffectType::SetValue, Some(7), "on");
        good.value = Some(Value::Bool(true));
        let mut stray = good.clone();
        stray.target_object_id = Some(99);
        let mut incomplete = EffectRecord::empty(EffectType::ToggleValue, Some(7), "on");
        incomplete.value1 = Some(Value::Bool(true));

        let records = alloc::vec![EventEffectsRecord {
            event: EventKind::PointerDown,
            effects: alloc::vec![stray, good, incomplete],
        }];
        let (binder, errors) = EffectBinder::from_records(records, resolver(&l));
        assert_eq!(binder.len(), 1);
        assert_eq!(
            errors,
            alloc::vec![
                EffectError::UnresolvedTarget {
                    id: Some(99),
                    property: "on".to_string()
                },
                EffectError::MissingValue {
                    effect: "toggleValue",
                    field: "value2"
                },
            ]
        );
    }
}
