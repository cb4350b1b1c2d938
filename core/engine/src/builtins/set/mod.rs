//! This module implements the global `Set` object.

pub mod ordered_set;
pub mod set_iterator;

use crate::{
    builtins::{
        iterable::{get_iterator, IterationKind},
        BuiltIn,
    },
    context::Context,
    object::{ConstructorBuilder, FunctionBuilder, JsObject, ObjectData},
    property::{Attribute, PropertyKey},
    value::JsValue,
    JsResult,
};
use ordered_set::OrderedSet;
use set_iterator::SetIterator;

#[derive(Debug, Clone, Copy)]
pub(crate) struct Set;

impl BuiltIn for Set {
    const NAME: &'static str = "Set";

    fn init(context: &mut Context) -> (&'static str, JsValue, Attribute) {
        let symbol_iterator = context.well_known_symbols().iterator_symbol();
        let values_function = FunctionBuilder::new(context, Self::values)
            .name("values")
            .build();
        let size_getter = FunctionBuilder::new(context, Self::size).name("get size").build();

        let set = ConstructorBuilder::with_standard_object(
            context,
            Self::constructor,
            context.standard_objects().set_object().clone(),
        )
        .name(Self::NAME)
        .length(0)
        .method(Self::add, "add", 1)
        .method(Self::clear, "clear", 0)
        .method(Self::delete, "delete", 1)
        .method(Self::entries, "entries", 0)
        .method(Self::for_each, "forEach", 1)
        .method(Self::has, "has", 1)
        .method(Self::values, "values", 0)
        .method(Self::values, "keys", 0)
        .accessor(
            "size",
            Some(size_getter),
            None,
            Attribute::NON_ENUMERABLE | Attribute::CONFIGURABLE,
        )
        .property(
            PropertyKey::from(symbol_iterator),
            values_function,
            Attribute::WRITABLE | Attribute::NON_ENUMERABLE | Attribute::CONFIGURABLE,
        )
        .build();

        (Self::NAME, set.into(), Self::attribute())
    }
}

impl Set {
    /// `new Set([iterable])`.
    fn constructor(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        if !context.is_in_constructor_call() {
            return context.throw_type_error("calling Set constructor without new is forbidden");
        }
        let JsValue::Object(object) = this else {
            return context.throw_type_error("Set constructor requires an object `this`");
        };
        object.borrow_mut().data = ObjectData::Set(OrderedSet::new());

        if let Some(iterable) = args.get(0) {
            if !iterable.is_null_or_undefined() {
                let record = get_iterator(iterable, context)?;
                while let Some(value) = record.step(context)? {
                    if let Some(values) = object.borrow_mut().as_set_mut() {
                        values.add(value);
                    }
                }
            }
        }
        Ok(this.clone())
    }

    fn this_set(this: &JsValue, context: &mut Context) -> JsResult<JsObject> {
        if let JsValue::Object(object) = this {
            if object.borrow().as_set_ref().is_some() {
                return Ok(object.clone());
            }
        }
        context.throw_type_error("Set.prototype method called on incompatible receiver")
    }

    /// `Set.prototype.add(value)`.
    fn add(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = Self::this_set(this, context)?;
        let value = args.get(0).cloned().unwrap_or_default();
        if let Some(values) = object.borrow_mut().as_set_mut() {
            values.add(value);
        }
        Ok(this.clone())
    }

    fn clear(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = Self::this_set(this, context)?;
        if let Some(values) = object.borrow_mut().as_set_mut() {
            values.clear();
        }
        Ok(JsValue::undefined())
    }

    /// `Set.prototype.delete(value)`.
    fn delete(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = Self::this_set(this, context)?;
        let value = args.get(0).cloned().unwrap_or_default();
        let removed = object
            .borrow_mut()
            .as_set_mut()
            .map_or(false, |values| values.remove(&value));
        Ok(removed.into())
    }

    fn entries(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = Self::this_set(this, context)?;
        Ok(SetIterator::create_set_iterator(
            object,
            IterationKind::KeyAndValue,
            context,
        ))
    }

    /// `Set.prototype.forEach(callback[, thisArg])`.
    fn for_each(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = Self::this_set(this, context)?;
        let callback = args.get(0).cloned().unwrap_or_default();
        if !callback.is_function() {
            return context.throw_type_error("Set.prototype.forEach: callback is not callable");
        }
        let this_arg = args.get(1).cloned().unwrap_or_default();

        let mut slot = 0;
        loop {
            let value = {
                let borrowed = object.borrow();
                let Some(values) = borrowed.as_set_ref() else {
                    break;
                };
                if slot >= values.raw_len() {
                    break;
                }
                values.value_at(slot).cloned()
            };
            slot += 1;
            if let Some(value) = value {
                context.call(&callback, &this_arg, &[value.clone(), value, this.clone()])?;
            }
        }
        Ok(JsValue::undefined())
    }

    /// `Set.prototype.has(value)`.
    fn has(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = Self::this_set(this, context)?;
        let value = args.get(0).cloned().unwrap_or_default();
        let found = object
            .borrow()
            .as_set_ref()
            .map_or(false, |values| values.contains(&value));
        Ok(found.into())
    }

    /// The `size` accessor.
    fn size(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = Self::this_set(this, context)?;
        let size = object.borrow().as_set_ref().map_or(0, OrderedSet::len);
        Ok(JsValue::new(size))
    }

    fn values(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = Self::this_set(this, context)?;
        Ok(SetIterator::create_set_iterator(
            object,
            IterationKind::Value,
            context,
        ))
    }
}
