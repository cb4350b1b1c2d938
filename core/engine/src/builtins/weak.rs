//! This module implements `WeakMap`, `WeakSet`, `WeakRef` and
//! `FinalizationRegistry`.
//!
//! Weak slots hold `WeakGc` handles, which the collector never traces: a
//! target only reachable through weak slots is reclaimed, the slot then
//! observes `None`. Cleanup callbacks registered with a
//! `FinalizationRegistry` are queued on the context and run before the next
//! user-code resumption.

use crate::{
    builtins::BuiltIn,
    context::Context,
    object::{ConstructorBuilder, JsObject, Object, ObjectData},
    property::Attribute,
    value::JsValue,
    JsResult,
};
use std::cell::RefCell;
use vesper_gc::{Finalize, Trace, WeakGc};

type WeakTarget = WeakGc<Object>;

/// `WeakMap` entries; dead keys are pruned on every touch. The keys are
/// weak handles, so only the values keep their referents alive.
#[derive(Debug, Default, Trace, Finalize)]
pub struct WeakMap {
    entries: RefCell<Vec<(WeakTarget, JsValue)>>,
}

#[derive(Debug, Default, Trace, Finalize)]
pub struct WeakSet {
    values: RefCell<Vec<WeakTarget>>,
}

#[derive(Debug, Trace, Finalize)]
pub struct WeakRef {
    target: WeakTarget,
}

/// One registration: target, held value, optional unregister token.
#[derive(Debug, Trace, Finalize)]
struct Registration {
    target: WeakTarget,
    holdings: JsValue,
    token: Option<WeakTarget>,
}

#[derive(Debug, Trace, Finalize)]
pub struct FinalizationRegistry {
    callback: JsObject,
    registrations: RefCell<Vec<Registration>>,
}

impl FinalizationRegistry {
    /// Removes every registration whose target died and returns their
    /// `(callback, holdings)` pairs for the cleanup queue.
    pub(crate) fn take_dead_registrations(&self) -> Vec<(JsObject, JsValue)> {
        let mut dead = Vec::new();
        self.registrations.borrow_mut().retain(|registration| {
            if registration.target.is_live() {
                true
            } else {
                dead.push((self.callback.clone(), registration.holdings.clone()));
                false
            }
        });
        dead
    }
}

fn require_object(value: Option<&JsValue>, what: &str, context: &mut Context) -> JsResult<JsObject> {
    match value {
        Some(JsValue::Object(object)) => Ok(object.clone()),
        _ => context.throw_type_error(format!("{what} must be an object")),
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct WeakMapBuiltin;

impl BuiltIn for WeakMapBuiltin {
    const NAME: &'static str = "WeakMap";

    fn init(context: &mut Context) -> (&'static str, JsValue, Attribute) {
        let weak_map = ConstructorBuilder::with_standard_object(
            context,
            Self::constructor,
            context.standard_objects().weak_map_object().clone(),
        )
        .name(Self::NAME)
        .length(0)
        .method(Self::delete, "delete", 1)
        .method(Self::get, "get", 1)
        .method(Self::has, "has", 1)
        .method(Self::set, "set", 2)
        .build();

        (Self::NAME, weak_map.into(), Self::attribute())
    }
}

impl WeakMapBuiltin {
    fn constructor(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        if !context.is_in_constructor_call() {
            return context.throw_type_error("calling WeakMap constructor without new is forbidden");
        }
        let JsValue::Object(object) = this else {
            return context.throw_type_error("WeakMap constructor requires an object `this`");
        };
        object.borrow_mut().data = ObjectData::WeakMap(WeakMap::default());
        Ok(this.clone())
    }

    fn with_entries<R>(
        this: &JsValue,
        context: &mut Context,
        f: impl FnOnce(&WeakMap) -> R,
    ) -> JsResult<R> {
        if let JsValue::Object(object) = this {
            let borrowed = object.borrow();
            if let ObjectData::WeakMap(ref map) = borrowed.data {
                return Ok(f(map));
            }
        }
        context.throw_type_error("WeakMap.prototype method called on incompatible receiver")
    }

    fn delete(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let key = require_object(args.get(0), "WeakMap key", context)?;
        Self::with_entries(this, context, |map| {
            let mut entries = map.entries.borrow_mut();
            let before = entries.len();
            entries.retain(|(target, _)| {
                target.is_live() && !target.points_to(key.inner())
            });
            (before != entries.len()).into()
        })
    }

    fn get(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let Some(JsValue::Object(key)) = args.get(0) else {
            return Ok(JsValue::undefined());
        };
        let key = key.clone();
        Self::with_entries(this, context, |map| {
            map.entries
                .borrow()
                .iter()
                .find(|(target, _)| target.points_to(key.inner()))
                .map_or(JsValue::undefined(), |(_, value)| value.clone())
        })
    }

    fn has(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let Some(JsValue::Object(key)) = args.get(0) else {
            return Ok(false.into());
        };
        let key = key.clone();
        Self::with_entries(this, context, |map| {
            map.entries
                .borrow()
                .iter()
                .any(|(target, _)| target.points_to(key.inner()))
                .into()
        })
    }

    fn set(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let key = require_object(args.get(0), "WeakMap key", context)?;
        let value = args.get(1).cloned().unwrap_or_default();
        Self::with_entries(this, context, |map| {
            let mut entries = map.entries.borrow_mut();
            entries.retain(|(target, _)| target.is_live());
            if let Some(entry) = entries
                .iter_mut()
                .find(|(target, _)| target.points_to(key.inner()))
            {
                entry.1 = value;
            } else {
                entries.push((key.downgrade(), value));
            }
        })?;
        Ok(this.clone())
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct WeakSetBuiltin;

impl BuiltIn for WeakSetBuiltin {
    const NAME: &'static str = "WeakSet";

    fn init(context: &mut Context) -> (&'static str, JsValue, Attribute) {
        let weak_set = ConstructorBuilder::with_standard_object(
            context,
            Self::constructor,
            context.standard_objects().weak_set_object().clone(),
        )
        .name(Self::NAME)
        .length(0)
        .method(Self::add, "add", 1)
        .method(Self::delete, "delete", 1)
        .method(Self::has, "has", 1)
        .build();

        (Self::NAME, weak_set.into(), Self::attribute())
    }
}

impl WeakSetBuiltin {
    fn constructor(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        if !context.is_in_constructor_call() {
            return context.throw_type_error("calling WeakSet constructor without new is forbidden");
        }
        let JsValue::Object(object) = this else {
            return context.throw_type_error("WeakSet constructor requires an object `this`");
        };
        object.borrow_mut().data = ObjectData::WeakSet(WeakSet::default());
        Ok(this.clone())
    }

    fn with_values<R>(
        this: &JsValue,
        context: &mut Context,
        f: impl FnOnce(&WeakSet) -> R,
    ) -> JsResult<R> {
        if let JsValue::Object(object) = this {
            let borrowed = object.borrow();
            if let ObjectData::WeakSet(ref set) = borrowed.data {
                return Ok(f(set));
            }
        }
        context.throw_type_error("WeakSet.prototype method called on incompatible receiver")
    }

    fn add(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let value = require_object(args.get(0), "WeakSet value", context)?;
        Self::with_values(this, context, |set| {
            let mut values = set.values.borrow_mut();
            values.retain(WeakTarget::is_live);
            if !values.iter().any(|target| target.points_to(value.inner())) {
                values.push(value.downgrade());
            }
        })?;
        Ok(this.clone())
    }

    fn delete(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let value = require_object(args.get(0), "WeakSet value", context)?;
        Self::with_values(this, context, |set| {
            let mut values = set.values.borrow_mut();
            let before = values.len();
            values.retain(|target| target.is_live() && !target.points_to(value.inner()));
            (before != values.len()).into()
        })
    }

    fn has(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let Some(JsValue::Object(value)) = args.get(0) else {
            return Ok(false.into());
        };
        let value = value.clone();
        Self::with_values(this, context, |set| {
            set.values
                .borrow()
                .iter()
                .any(|target| target.points_to(value.inner()))
                .into()
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct WeakRefBuiltin;

impl BuiltIn for WeakRefBuiltin {
    const NAME: &'static str = "WeakRef";

    fn init(context: &mut Context) -> (&'static str, JsValue, Attribute) {
        let weak_ref = ConstructorBuilder::with_standard_object(
            context,
            Self::constructor,
            context.standard_objects().weak_ref_object().clone(),
        )
        .name(Self::NAME)
        .length(1)
        .method(Self::deref, "deref", 0)
        .build();

        (Self::NAME, weak_ref.into(), Self::attribute())
    }
}

impl WeakRefBuiltin {
    fn constructor(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        if !context.is_in_constructor_call() {
            return context.throw_type_error("calling WeakRef constructor without new is forbidden");
        }
        let target = require_object(args.get(0), "WeakRef target", context)?;
        let JsValue::Object(object) = this else {
            return context.throw_type_error("WeakRef constructor requires an object `this`");
        };
        object.borrow_mut().data = ObjectData::WeakRef(WeakRef {
            target: target.downgrade(),
        });
        Ok(this.clone())
    }

    /// `WeakRef.prototype.deref()`: `undefined` once the target has been
    /// collected.
    fn deref(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        if let JsValue::Object(object) = this {
            let borrowed = object.borrow();
            if let ObjectData::WeakRef(ref weak) = borrowed.data {
                return Ok(weak
                    .target
                    .upgrade()
                    .map(JsObject::from_inner)
                    .map_or(JsValue::undefined(), JsValue::from));
            }
        }
        context.throw_type_error("WeakRef.prototype.deref called on incompatible receiver")
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct FinalizationRegistryBuiltin;

impl BuiltIn for FinalizationRegistryBuiltin {
    const NAME: &'static str = "FinalizationRegistry";

    fn init(context: &mut Context) -> (&'static str, JsValue, Attribute) {
        let registry = ConstructorBuilder::with_standard_object(
            context,
            Self::constructor,
            context
                .standard_objects()
                .finalization_registry_object()
                .clone(),
        )
        .name(Self::NAME)
        .length(1)
        .method(Self::register, "register", 2)
        .method(Self::unregister, "unregister", 1)
        .build();

        (Self::NAME, registry.into(), Self::attribute())
    }
}

impl FinalizationRegistryBuiltin {
    fn constructor(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        if !context.is_in_constructor_call() {
            return context
                .throw_type_error("calling FinalizationRegistry constructor without new is forbidden");
        }
        let callback = match args.get(0) {
            Some(JsValue::Object(object)) if object.is_callable() => object.clone(),
            _ => {
                return context
                    .throw_type_error("FinalizationRegistry: cleanup callback must be callable")
            }
        };
        let JsValue::Object(object) = this else {
            return context
                .throw_type_error("FinalizationRegistry constructor requires an object `this`");
        };
        object.borrow_mut().data = ObjectData::FinalizationRegistry(FinalizationRegistry {
            callback,
            registrations: RefCell::default(),
        });
        context.track_finalization_registry(object);
        Ok(this.clone())
    }

    /// `register(target, holdings[, token])`.
    fn register(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let target = require_object(args.get(0), "FinalizationRegistry target", context)?;
        let holdings = args.get(1).cloned().unwrap_or_default();
        let token = match args.get(2) {
            None | Some(JsValue::Undefined) => None,
            Some(JsValue::Object(token)) => Some(token.downgrade()),
            _ => {
                return context
                    .throw_type_error("FinalizationRegistry: unregister token must be an object")
            }
        };

        if let JsValue::Object(object) = this {
            let borrowed = object.borrow();
            if let ObjectData::FinalizationRegistry(ref registry) = borrowed.data {
                registry.registrations.borrow_mut().push(Registration {
                    target: target.downgrade(),
                    holdings,
                    token,
                });
                return Ok(JsValue::undefined());
            }
        }
        context.throw_type_error("FinalizationRegistry.prototype.register on incompatible receiver")
    }

    /// `unregister(token)`.
    fn unregister(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let token = require_object(args.get(0), "unregister token", context)?;
        if let JsValue::Object(object) = this {
            let borrowed = object.borrow();
            if let ObjectData::FinalizationRegistry(ref registry) = borrowed.data {
                let mut registrations = registry.registrations.borrow_mut();
                let before = registrations.len();
                registrations.retain(|registration| {
                    registration
                        .token
                        .as_ref()
                        .map_or(true, |t| !t.points_to(token.inner()))
                });
                return Ok((before != registrations.len()).into());
            }
        }
        context
            .throw_type_error("FinalizationRegistry.prototype.unregister on incompatible receiver")
    }
}
