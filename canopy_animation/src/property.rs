// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Typed property access and weak, type-erased property references.

use alloc::rc::{Rc, Weak};
use core::cell::RefCell;
use core::fmt::{self, Debug};

use crate::error::PropertyError;
use crate::value::Value;

/// An object whose properties can be read and written as [`Value`]s.
///
/// Each implementor names its properties with a small enum, so property
/// resolution happens once, when a [`PropertyRef`] is built, rather than by
/// string lookup on every write.
pub trait Animatable {
    /// The property names this type exposes.
    type Property: Copy + Eq + Debug + 'static;

    /// Stable name of a property, used for logging, duplicate detection and persistence.
    fn property_name(property: Self::Property) -> &'static str;

    /// Read the current value of a property.
    fn get_property(&self, property: Self::Property) -> Result<Value, PropertyError>;

    /// Write a property.
    fn set_property(&mut self, property: Self::Property, value: Value) -> Result<(), PropertyError>;
}

/// Identity of an animation target.
///
/// Derived from the address of the shared allocation. The allocation stays
/// reserved while any [`PropertyRef`] to it exists, so a key is never reused
/// for a different live target while something still refers to the old one.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetKey(usize);

impl TargetKey {
    /// Key of the object behind `target`.
    pub fn of<T: ?Sized>(target: &Rc<RefCell<T>>) -> Self {
        Self(Rc::as_ptr(target).cast::<()>() as usize)
    }

    fn of_weak<T: ?Sized>(target: &Weak<RefCell<T>>) -> Self {
        Self(Weak::as_ptr(target).cast::<()>() as usize)
    }
}

trait ErasedProperty {
    fn get(&self) -> Result<Value, PropertyError>;
    fn set(&self, value: Value) -> Result<(), PropertyError>;
    fn is_alive(&self) -> bool;
}

struct Bound<T: ?Sized + Animatable> {
    target: Weak<RefCell<T>>,
    property: T::Property,
}

impl<T: ?Sized + Animatable> ErasedProperty for Bound<T> {
    fn get(&self) -> Result<Value, PropertyError> {
        let target = self.target.upgrade().ok_or(PropertyError::TargetDropped)?;
        let target = target
            .try_borrow()
            .map_err(|_| PropertyError::Busy(T::property_name(self.property)))?;
        target.get_property(self.property)
    }

    fn set(&self, value: Value) -> Result<(), PropertyError> {
        let target = self.target.upgrade().ok_or(PropertyError::TargetDropped)?;
        let mut target = target
            .try_borrow_mut()
            .map_err(|_| PropertyError::Busy(T::property_name(self.property)))?;
        target.set_property(self.property, value)
    }

    fn is_alive(&self) -> bool {
        self.target.strong_count() > 0
    }
}

/// A property of a shared object, held weakly.
///
/// Cloning is cheap. A `PropertyRef` never keeps its target alive; once the
/// target is dropped every access fails with [`PropertyError::TargetDropped`].
///
/// ```
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use canopy_animation::{Animatable, PropertyError, PropertyRef, Value};
///
/// struct Knob {
///     position: f64,
/// }
///
/// #[derive(Copy, Clone, Debug, PartialEq, Eq)]
/// enum KnobProperty {
///     Position,
/// }
///
/// impl Animatable for Knob {
///     type Property = KnobProperty;
///
///     fn property_name(_: KnobProperty) -> &'static str {
///         "position"
///     }
///
///     fn get_property(&self, _: KnobProperty) -> Result<Value, PropertyError> {
///         Ok(Value::Number(self.position))
///     }
///
///     fn set_property(&mut self, _: KnobProperty, value: Value) -> Result<(), PropertyError> {
///         self.position = value.as_number().ok_or(PropertyError::Unsupported("position"))?;
///         Ok(())
///     }
/// }
///
/// let knob = Rc::new(RefCell::new(Knob { position: 0.0 }));
/// let prop = PropertyRef::new(&knob, KnobProperty::Position);
/// prop.set(Value::Number(1.0)).unwrap();
/// assert_eq!(knob.borrow().position, 1.0);
///
/// drop(knob);
/// assert_eq!(prop.get(), Err(PropertyError::TargetDropped));
/// ```
#[derive(Clone)]
pub struct PropertyRef {
    inner: Rc<dyn ErasedProperty>,
    key: TargetKey,
    name: &'static str,
}

impl Debug for PropertyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyRef")
            .field("key", &self.key)
            .field("name", &self.name)
            .field("alive", &self.inner.is_alive())
            .finish()
    }
}

impl PropertyRef {
    /// Refer to `property` on `target`.
    pub fn new<T>(target: &Rc<RefCell<T>>, property: T::Property) -> Self
    where
        T: ?Sized + Animatable + 'static,
    {
        let weak = Rc::downgrade(target);
        Self {
            key: TargetKey::of_weak(&weak),
            name: T::property_name(property),
            inner: Rc::new(Bound {
                target: weak,
                property,
            }),
        }
    }

    /// Read the current value.
    pub fn get(&self) -> Result<Value, PropertyError> {
        self.inner.get()
    }

    /// Write a value.
    pub fn set(&self, value: Value) -> Result<(), PropertyError> {
        self.inner.set(value)
    }

    /// Identity of the target object.
    pub fn target_key(&self) -> TargetKey {
        self.key
    }

    /// Property name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether the target is still alive.
    pub fn is_alive(&self) -> bool {
        self.inner.is_alive()
    }

    /// Whether both refer to the same property of the same target.
    pub fn same_property(&self, other: &Self) -> bool {
        self.key == other.key && self.name == other.name
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::value::ValueKind;

    /// Minimal animatable used across this crate's tests.
    #[derive(Debug, Default)]
    pub(crate) struct Sprite {
        pub(crate) x: f64,
        pub(crate) opacity: f64,
        pub(crate) visible: bool,
    }

    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub(crate) enum SpriteProperty {
        X,
        Opacity,
        Visible,
        Label,
    }

    impl Animatable for Sprite {
        type Property = SpriteProperty;

        fn property_name(property: SpriteProperty) -> &'static str {
            match property {
                SpriteProperty::X => "x",
                SpriteProperty::Opacity => "opacity",
                SpriteProperty::Visible => "visible",
                SpriteProperty::Label => "label",
            }
        }

        fn get_property(&self, property: SpriteProperty) -> Result<Value, PropertyError> {
            match property {
                SpriteProperty::X => Ok(Value::Number(self.x)),
                SpriteProperty::Opacity => Ok(Value::Number(self.opacity)),
                SpriteProperty::Visible => Ok(Value::Bool(self.visible)),
                SpriteProperty::Label => Err(PropertyError::Unsupported("label")),
            }
        }

        fn set_property(
            &mut self,
            property: SpriteProperty,
            value: Value,
        ) -> Result<(), PropertyError> {
            let name = Self::property_name(property);
            let mismatch = |expected| PropertyError::KindMismatch {
                property: name,
                expected,
                found: value.kind(),
            };
            match property {
                SpriteProperty::X => {
                    self.x = value.as_number().ok_or_else(|| mismatch(ValueKind::Number))?;
                }
                SpriteProperty::Opacity => {
                    self.opacity = value.as_number().ok_or_else(|| mismatch(ValueKind::Number))?;
                }
                SpriteProperty::Visible => {
                    self.visible = value.as_bool().ok_or_else(|| mismatch(ValueKind::Bool))?;
                }
                SpriteProperty::Label => return Err(PropertyError::Unsupported(name)),
            }
            Ok(())
        }
    }

    pub(crate) fn sprite() -> Rc<RefCell<Sprite>> {
        Rc::new(RefCell::new(Sprite::default()))
    }

    #[test]
    fn kind_mismatch_is_reported() {
        let s = sprite();
        let x = PropertyRef::new(&s, SpriteProperty::X);
        assert_eq!(
            x.set(Value::Bool(true)),
            Err(PropertyError::KindMismatch {
                property: "x",
                expected: ValueKind::Number,
                found: ValueKind::Bool,
            })
        );
        assert_eq!(s.borrow().x, 0.0);
    }

    #[test]
    fn refs_do_not_keep_targets_alive() {
        let s = sprite();
        let x = PropertyRef::new(&s, SpriteProperty::X);
        assert!(x.is_alive());
        drop(s);
        assert!(!x.is_alive());
        assert_eq!(x.set(Value::Number(1.0)), Err(PropertyError::TargetDropped));
    }

    #[test]
    fn borrowed_target_is_busy() {
        let s = sprite();
        let x = PropertyRef::new(&s, SpriteProperty::X);
        let _guard = s.borrow_mut();
        assert_eq!(x.get(), Err(PropertyError::Busy("x")));
    }

    #[test]
    fn same_property_compares_target_and_name() {
        let (a, b) = (sprite(), sprite());
        let ax = PropertyRef::new(&a, SpriteProperty::X);
        assert!(ax.same_property(&PropertyRef::new(&a, SpriteProperty::X)));
        assert!(!ax.same_property(&PropertyRef::new(&a, SpriteProperty::Opacity)));
        assert!(!ax.same_property(&PropertyRef::new(&b, SpriteProperty::X)));
        assert_eq!(ax.target_key(), TargetKey::of(&a));
    }
}
