//! This module implements the global `Map` object: insertion-ordered
//! entries with `SameValueZero` key equality.

pub mod map_iterator;
pub mod ordered_map;

#[cfg(test)]
mod tests;

use crate::{
    builtins::{
        iterable::{get_iterator, IterationKind},
        BuiltIn,
    },
    context::Context,
    object::{ConstructorBuilder, FunctionBuilder, JsObject, ObjectData},
    property::{AccessorDescriptor, Attribute, PropertyKey},
    value::JsValue,
    JsResult,
};
use map_iterator::MapIterator;
use ordered_map::OrderedMap;

#[derive(Debug, Clone, Copy)]
pub(crate) struct Map;

impl BuiltIn for Map {
    const NAME: &'static str = "Map";

    fn init(context: &mut Context) -> (&'static str, JsValue, Attribute) {
        let symbol_iterator = context.well_known_symbols().iterator_symbol();
        let entries_function = FunctionBuilder::new(context, Self::entries)
            .name("entries")
            .build();
        let size_getter = FunctionBuilder::new(context, Self::size).name("get size").build();

        let map = ConstructorBuilder::with_standard_object(
            context,
            Self::constructor,
            context.standard_objects().map_object().clone(),
        )
        .name(Self::NAME)
        .length(0)
        .method(Self::clear, "clear", 0)
        .method(Self::delete, "delete", 1)
        .method(Self::entries, "entries", 0)
        .method(Self::for_each, "forEach", 1)
        .method(Self::get, "get", 1)
        .method(Self::has, "has", 1)
        .method(Self::keys, "keys", 0)
        .method(Self::set, "set", 2)
        .method(Self::values, "values", 0)
        .accessor(
            "size",
            Some(size_getter),
            None,
            Attribute::NON_ENUMERABLE | Attribute::CONFIGURABLE,
        )
        .property(
            PropertyKey::from(symbol_iterator),
            entries_function,
            Attribute::WRITABLE | Attribute::NON_ENUMERABLE | Attribute::CONFIGURABLE,
        )
        .build();

        (Self::NAME, map.into(), Self::attribute())
    }
}

impl Map {
    /// `new Map([iterable])`.
    fn constructor(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        if !context.is_in_constructor_call() {
            return context.throw_type_error("calling Map constructor without new is forbidden");
        }
        let JsValue::Object(object) = this else {
            return context.throw_type_error("Map constructor requires an object `this`");
        };
        object.borrow_mut().data = ObjectData::Map(OrderedMap::new());

        if let Some(iterable) = args.get(0) {
            if !iterable.is_null_or_undefined() {
                let record = get_iterator(iterable, context)?;
                while let Some(entry) = record.step(context)? {
                    let JsValue::Object(pair) = entry else {
                        return context
                            .throw_type_error("iterator value is not an entry object");
                    };
                    let key =
                        pair.get(&PropertyKey::Index(0), pair.clone().into(), context)?;
                    let value =
                        pair.get(&PropertyKey::Index(1), pair.clone().into(), context)?;
                    if let Some(entries) = object.borrow_mut().as_map_mut() {
                        entries.insert(key, value);
                    }
                }
            }
        }
        Ok(this.clone())
    }

    fn this_map(this: &JsValue, context: &mut Context) -> JsResult<JsObject> {
        if let JsValue::Object(object) = this {
            if object.borrow().as_map_ref().is_some() {
                return Ok(object.clone());
            }
        }
        context.throw_type_error("Map.prototype method called on incompatible receiver")
    }

    /// `Map.prototype.clear()`.
    fn clear(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = Self::this_map(this, context)?;
        if let Some(entries) = object.borrow_mut().as_map_mut() {
            entries.clear();
        }
        Ok(JsValue::undefined())
    }

    /// `Map.prototype.delete(key)`.
    fn delete(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = Self::this_map(this, context)?;
        let key = args.get(0).cloned().unwrap_or_default();
        let removed = object
            .borrow_mut()
            .as_map_mut()
            .map_or(false, |entries| entries.remove(&key));
        Ok(removed.into())
    }

    fn entries(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = Self::this_map(this, context)?;
        Ok(MapIterator::create_map_iterator(
            object,
            IterationKind::KeyAndValue,
            context,
        ))
    }

    /// `Map.prototype.forEach(callback[, thisArg])`.
    fn for_each(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = Self::this_map(this, context)?;
        let callback = args.get(0).cloned().unwrap_or_default();
        if !callback.is_function() {
            return context.throw_type_error("Map.prototype.forEach: callback is not callable");
        }
        let this_arg = args.get(1).cloned().unwrap_or_default();

        let mut slot = 0;
        loop {
            // Re-borrow on every step: the callback may mutate the map.
            let entry = {
                let borrowed = object.borrow();
                let Some(entries) = borrowed.as_map_ref() else {
                    break;
                };
                if slot >= entries.raw_len() {
                    break;
                }
                entries.entry_at(slot).cloned()
            };
            slot += 1;
            if let Some((key, value)) = entry {
                context.call(&callback, &this_arg, &[value, key, this.clone()])?;
            }
        }
        Ok(JsValue::undefined())
    }

    /// `Map.prototype.get(key)`.
    fn get(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = Self::this_map(this, context)?;
        let key = args.get(0).cloned().unwrap_or_default();
        let value = object
            .borrow()
            .as_map_ref()
            .and_then(|entries| entries.get(&key).cloned());
        Ok(value.unwrap_or_default())
    }

    /// `Map.prototype.has(key)`.
    fn has(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = Self::this_map(this, context)?;
        let key = args.get(0).cloned().unwrap_or_default();
        let found = object
            .borrow()
            .as_map_ref()
            .map_or(false, |entries| entries.contains_key(&key));
        Ok(found.into())
    }

    fn keys(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = Self::this_map(this, context)?;
        Ok(MapIterator::create_map_iterator(
            object,
            IterationKind::Key,
            context,
        ))
    }

    /// `Map.prototype.set(key, value)`.
    fn set(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = Self::this_map(this, context)?;
        let key = args.get(0).cloned().unwrap_or_default();
        let value = args.get(1).cloned().unwrap_or_default();
        if let Some(entries) = object.borrow_mut().as_map_mut() {
            entries.insert(key, value);
        }
        Ok(this.clone())
    }

    /// The `size` accessor.
    fn size(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = Self::this_map(this, context)?;
        let size = object.borrow().as_map_ref().map_or(0, OrderedMap::len);
        Ok(JsValue::new(size))
    }

    fn values(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = Self::this_map(this, context)?;
        Ok(MapIterator::create_map_iterator(
            object,
            IterationKind::Value,
            context,
        ))
    }
}
