//! This module implements the global `Array` object.
//!
//! Arrays are ordinary objects plus the exotic `length` behavior: index
//! writes grow `length`, shrinking `length` deletes trailing indexes and
//! stops at the first non-configurable one.

pub mod array_iterator;

#[cfg(test)]
mod tests;

use crate::{
    builtins::{
        iterable::{get_iterator, IterationKind},
        BuiltIn,
    },
    context::Context,
    object::{ConstructorBuilder, FunctionBuilder, JsObject, Object, ObjectData},
    property::{Attribute, DataDescriptor, PropertyKey},
    value::{same_value_zero, JsValue},
    JsResult,
};
use array_iterator::ArrayIterator;

#[derive(Debug, Clone, Copy)]
pub(crate) struct Array;

impl BuiltIn for Array {
    const NAME: &'static str = "Array";

    fn init(context: &mut Context) -> (&'static str, JsValue, Attribute) {
        let symbol_iterator = context.well_known_symbols().iterator_symbol();

        let values_function = FunctionBuilder::new(context, Self::values)
            .name("values")
            .build();

        let array = ConstructorBuilder::with_standard_object(
            context,
            Self::constructor,
            context.standard_objects().array_object().clone(),
        )
        .name(Self::NAME)
        .length(1)
        .static_method(Self::is_array, "isArray", 1)
        .static_method(Self::of, "of", 0)
        .static_method(Self::from, "from", 1)
        .method(Self::at, "at", 1)
        .method(Self::concat, "concat", 1)
        .method(Self::entries, "entries", 0)
        .method(Self::every, "every", 1)
        .method(Self::fill, "fill", 1)
        .method(Self::filter, "filter", 1)
        .method(Self::find, "find", 1)
        .method(Self::find_index, "findIndex", 1)
        .method(Self::flat, "flat", 0)
        .method(Self::flat_map, "flatMap", 1)
        .method(Self::for_each, "forEach", 1)
        .method(Self::includes, "includes", 1)
        .method(Self::index_of, "indexOf", 1)
        .method(Self::join, "join", 1)
        .method(Self::keys, "keys", 0)
        .method(Self::last_index_of, "lastIndexOf", 1)
        .method(Self::map, "map", 1)
        .method(Self::pop, "pop", 0)
        .method(Self::push, "push", 1)
        .method(Self::reduce, "reduce", 1)
        .method(Self::reduce_right, "reduceRight", 1)
        .method(Self::reverse, "reverse", 0)
        .method(Self::shift, "shift", 0)
        .method(Self::slice, "slice", 2)
        .method(Self::some, "some", 1)
        .method(Self::sort, "sort", 1)
        .method(Self::splice, "splice", 2)
        .method(Self::to_string, "toString", 0)
        .method(Self::unshift, "unshift", 1)
        .property(
            PropertyKey::from(symbol_iterator),
            values_function,
            Attribute::WRITABLE | Attribute::NON_ENUMERABLE | Attribute::CONFIGURABLE,
        )
        .build();

        (Self::NAME, array.into(), Self::attribute())
    }
}

impl Array {
    /// Allocates a fresh array object with the given elements.
    pub(crate) fn create_array(elements: Vec<JsValue>, context: &mut Context) -> JsValue {
        let prototype = context.standard_objects().array_object().prototype();
        let array = JsObject::new(Object::with_prototype(prototype.into(), ObjectData::Array));
        let length = elements.len();
        for (index, element) in elements.into_iter().enumerate() {
            array
                .borrow_mut()
                .insert(PropertyKey::from(index), DataDescriptor::new(element, Attribute::all()));
        }
        set_raw_length(&array, length as u64);
        array.into()
    }

    pub(crate) fn new_array_of(values: &[JsValue], context: &mut Context) -> JsValue {
        Self::create_array(values.to_vec(), context)
    }

    /// `Array(...)`: `Array(5)` allocates a hole-only array of length 5,
    /// anything else collects the arguments.
    fn constructor(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        if args.len() == 1 {
            if let Some(number) = args[0].as_number() {
                let length = number as u32;
                if f64::from(length) != number {
                    return context.throw_range_error("invalid array length");
                }
                let prototype = context.standard_objects().array_object().prototype();
                let array =
                    JsObject::new(Object::with_prototype(prototype.into(), ObjectData::Array));
                set_raw_length(&array, u64::from(length));
                return Ok(array.into());
            }
        }
        Ok(Self::create_array(args.to_vec(), context))
    }

    /// `Array.isArray(value)`.
    fn is_array(_: &JsValue, args: &[JsValue], _context: &mut Context) -> JsResult<JsValue> {
        Ok(matches!(args.get(0), Some(JsValue::Object(o)) if o.is_array()).into())
    }

    /// `Array.of(...items)`.
    fn of(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        Ok(Self::create_array(args.to_vec(), context))
    }

    /// `Array.from(items[, mapFn])`.
    fn from(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let items = args.get(0).cloned().unwrap_or_default();
        let map_function = args.get(1).cloned().unwrap_or_default();
        if !map_function.is_undefined() && !map_function.is_function() {
            return context.throw_type_error("Array.from: the map argument must be callable");
        }

        let iterator_key =
            PropertyKey::from(context.well_known_symbols().iterator_symbol());
        let use_iterator = match &items {
            JsValue::Object(object) => object
                .get(&iterator_key, items.clone(), context)?
                .is_function(),
            JsValue::String(_) => true,
            _ => false,
        };

        let mut values = Vec::new();
        if use_iterator {
            let record = get_iterator(&items, context)?;
            while let Some(value) = record.step(context)? {
                values.push(value);
            }
        } else {
            let object = items.to_object(context)?;
            let length = object
                .get(&"length".into(), items.clone(), context)?
                .to_length(context)?;
            for index in 0..length {
                values.push(object.get(&PropertyKey::from(index), items.clone(), context)?);
            }
        }

        if map_function.is_undefined() {
            return Ok(Self::create_array(values, context));
        }
        let mut mapped = Vec::with_capacity(values.len());
        for (index, value) in values.into_iter().enumerate() {
            mapped.push(context.call(
                &map_function,
                &JsValue::undefined(),
                &[value, JsValue::new(index)],
            )?);
        }
        Ok(Self::create_array(mapped, context))
    }

    /// `Array.prototype.at(index)`.
    fn at(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = this.to_object(context)?;
        let length = length_of(&object, context)? as i64;
        let mut index = args
            .get(0)
            .cloned()
            .unwrap_or_default()
            .to_integer_or_infinity(context)? as i64;
        if index < 0 {
            index += length;
        }
        if index < 0 || index >= length {
            return Ok(JsValue::undefined());
        }
        element_at(&object, index as u64, context)
    }

    /// `Array.prototype.concat(...items)`.
    fn concat(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = this.to_object(context)?;
        let mut result = Vec::new();
        let mut sources = vec![JsValue::from(object)];
        sources.extend_from_slice(args);

        for source in sources {
            match &source {
                JsValue::Object(array) if array.is_array() => {
                    let length = length_of(array, context)?;
                    for index in 0..length {
                        result.push(element_at(array, index, context)?);
                    }
                }
                other => result.push(other.clone()),
            }
        }
        Ok(Self::create_array(result, context))
    }

    fn entries(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = this.to_object(context)?;
        Ok(ArrayIterator::create_array_iterator(
            object.into(),
            IterationKind::KeyAndValue,
            context,
        ))
    }

    fn keys(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = this.to_object(context)?;
        Ok(ArrayIterator::create_array_iterator(
            object.into(),
            IterationKind::Key,
            context,
        ))
    }

    pub(crate) fn values(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = this.to_object(context)?;
        Ok(ArrayIterator::create_array_iterator(
            object.into(),
            IterationKind::Value,
            context,
        ))
    }

    /// `Array.prototype.every(callback[, thisArg])`.
    fn every(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = this.to_object(context)?;
        let callback = callback_arg(args, "every", context)?;
        let this_arg = args.get(1).cloned().unwrap_or_default();
        let length = length_of(&object, context)?;
        for index in 0..length {
            let value = element_at(&object, index, context)?;
            let keep = context.call(
                &callback,
                &this_arg,
                &[value, JsValue::new(index), this.clone()],
            )?;
            if !keep.to_boolean() {
                return Ok(false.into());
            }
        }
        Ok(true.into())
    }

    /// `Array.prototype.fill(value[, start[, end]])`.
    fn fill(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = this.to_object(context)?;
        let length = length_of(&object, context)?;
        let value = args.get(0).cloned().unwrap_or_default();
        let start = relative_index(args.get(1), length, 0, context)?;
        let end = relative_index(args.get(2), length, length, context)?;
        for index in start..end {
            object.set(
                PropertyKey::from(index),
                value.clone(),
                this.clone(),
                false,
                context,
            )?;
        }
        Ok(this.clone())
    }

    fn filter(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = this.to_object(context)?;
        let callback = callback_arg(args, "filter", context)?;
        let this_arg = args.get(1).cloned().unwrap_or_default();
        let length = length_of(&object, context)?;
        let mut kept = Vec::new();
        for index in 0..length {
            let value = element_at(&object, index, context)?;
            let keep = context.call(
                &callback,
                &this_arg,
                &[value.clone(), JsValue::new(index), this.clone()],
            )?;
            if keep.to_boolean() {
                kept.push(value);
            }
        }
        Ok(Self::create_array(kept, context))
    }

    fn find(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = this.to_object(context)?;
        let callback = callback_arg(args, "find", context)?;
        let this_arg = args.get(1).cloned().unwrap_or_default();
        let length = length_of(&object, context)?;
        for index in 0..length {
            let value = element_at(&object, index, context)?;
            let found = context.call(
                &callback,
                &this_arg,
                &[value.clone(), JsValue::new(index), this.clone()],
            )?;
            if found.to_boolean() {
                return Ok(value);
            }
        }
        Ok(JsValue::undefined())
    }

    fn find_index(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = this.to_object(context)?;
        let callback = callback_arg(args, "findIndex", context)?;
        let this_arg = args.get(1).cloned().unwrap_or_default();
        let length = length_of(&object, context)?;
        for index in 0..length {
            let value = element_at(&object, index, context)?;
            let found = context.call(
                &callback,
                &this_arg,
                &[value, JsValue::new(index), this.clone()],
            )?;
            if found.to_boolean() {
                return Ok(JsValue::new(index));
            }
        }
        Ok(JsValue::new(-1))
    }

    /// `Array.prototype.flat([depth])`.
    fn flat(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let depth = match args.get(0) {
            None | Some(JsValue::Undefined) => 1.0,
            Some(value) => value.to_integer_or_infinity(context)?,
        };
        let mut result = Vec::new();
        flatten_into(this, depth, &mut result, context)?;
        Ok(Self::create_array(result, context))
    }

    fn flat_map(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let mapped = Self::map(this, args, context)?;
        Self::flat(&mapped, &[], context)
    }

    fn for_each(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = this.to_object(context)?;
        let callback = callback_arg(args, "forEach", context)?;
        let this_arg = args.get(1).cloned().unwrap_or_default();
        let length = length_of(&object, context)?;
        for index in 0..length {
            let value = element_at(&object, index, context)?;
            context.call(
                &callback,
                &this_arg,
                &[value, JsValue::new(index), this.clone()],
            )?;
        }
        Ok(JsValue::undefined())
    }

    /// `Array.prototype.includes(value)`: `SameValueZero`, so `NaN` is
    /// findable.
    fn includes(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = this.to_object(context)?;
        let needle = args.get(0).cloned().unwrap_or_default();
        let length = length_of(&object, context)?;
        for index in 0..length {
            let value = element_at(&object, index, context)?;
            if same_value_zero(&needle, &value) {
                return Ok(true.into());
            }
        }
        Ok(false.into())
    }

    /// `Array.prototype.indexOf(value)`: strict equality, holes skipped.
    fn index_of(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = this.to_object(context)?;
        let needle = args.get(0).cloned().unwrap_or_default();
        let length = length_of(&object, context)?;
        for index in 0..length {
            if !object.has_property(&PropertyKey::from(index)) {
                continue;
            }
            let value = element_at(&object, index, context)?;
            if needle.strict_equals(&value) {
                return Ok(JsValue::new(index));
            }
        }
        Ok(JsValue::new(-1))
    }

    fn last_index_of(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = this.to_object(context)?;
        let needle = args.get(0).cloned().unwrap_or_default();
        let length = length_of(&object, context)?;
        for index in (0..length).rev() {
            if !object.has_property(&PropertyKey::from(index)) {
                continue;
            }
            let value = element_at(&object, index, context)?;
            if needle.strict_equals(&value) {
                return Ok(JsValue::new(index));
            }
        }
        Ok(JsValue::new(-1))
    }

    /// `Array.prototype.join(separator)`.
    fn join(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = this.to_object(context)?;
        let separator = match args.get(0) {
            None | Some(JsValue::Undefined) => ",".into(),
            Some(value) => value.to_string(context)?,
        };
        let length = length_of(&object, context)?;
        let mut pieces = Vec::with_capacity(length as usize);
        for index in 0..length {
            let value = element_at(&object, index, context)?;
            if value.is_null_or_undefined() {
                pieces.push(String::new());
            } else {
                pieces.push(value.to_string(context)?.to_string());
            }
        }
        Ok(JsValue::new(pieces.join(&separator)))
    }

    fn map(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = this.to_object(context)?;
        let callback = callback_arg(args, "map", context)?;
        let this_arg = args.get(1).cloned().unwrap_or_default();
        let length = length_of(&object, context)?;
        let mut mapped = Vec::with_capacity(length as usize);
        for index in 0..length {
            let value = element_at(&object, index, context)?;
            mapped.push(context.call(
                &callback,
                &this_arg,
                &[value, JsValue::new(index), this.clone()],
            )?);
        }
        Ok(Self::create_array(mapped, context))
    }

    /// `Array.prototype.pop()`.
    fn pop(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = this.to_object(context)?;
        let length = length_of(&object, context)?;
        if length == 0 {
            set_length(&object, 0, context)?;
            return Ok(JsValue::undefined());
        }
        let last = element_at(&object, length - 1, context)?;
        object.delete(&PropertyKey::from(length - 1));
        set_length(&object, length - 1, context)?;
        Ok(last)
    }

    /// `Array.prototype.push(...items)`.
    fn push(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = this.to_object(context)?;
        let mut length = length_of(&object, context)?;
        for value in args {
            object.set(
                PropertyKey::from(length),
                value.clone(),
                this.clone(),
                true,
                context,
            )?;
            length += 1;
        }
        set_length(&object, length, context)?;
        Ok(JsValue::new(length))
    }

    /// `Array.prototype.reduce(callback[, initial])`: reducing an empty
    /// array with no initial value is a `TypeError`.
    fn reduce(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = this.to_object(context)?;
        let callback = callback_arg(args, "reduce", context)?;
        let length = length_of(&object, context)?;

        let mut accumulator;
        let mut start = 0;
        if let Some(initial) = args.get(1) {
            accumulator = initial.clone();
        } else {
            if length == 0 {
                return context.throw_type_error("Reduce of empty array with no initial value");
            }
            accumulator = element_at(&object, 0, context)?;
            start = 1;
        }

        for index in start..length {
            let value = element_at(&object, index, context)?;
            accumulator = context.call(
                &callback,
                &JsValue::undefined(),
                &[accumulator, value, JsValue::new(index), this.clone()],
            )?;
        }
        Ok(accumulator)
    }

    fn reduce_right(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = this.to_object(context)?;
        let callback = callback_arg(args, "reduceRight", context)?;
        let length = length_of(&object, context)?;

        let mut accumulator;
        let mut next: i64 = length as i64 - 1;
        if let Some(initial) = args.get(1) {
            accumulator = initial.clone();
        } else {
            if length == 0 {
                return context.throw_type_error("Reduce of empty array with no initial value");
            }
            accumulator = element_at(&object, length - 1, context)?;
            next -= 1;
        }

        while next >= 0 {
            let value = element_at(&object, next as u64, context)?;
            accumulator = context.call(
                &callback,
                &JsValue::undefined(),
                &[accumulator, value, JsValue::new(next as u64), this.clone()],
            )?;
            next -= 1;
        }
        Ok(accumulator)
    }

    fn reverse(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = this.to_object(context)?;
        let length = length_of(&object, context)?;
        let mut values = Vec::with_capacity(length as usize);
        for index in 0..length {
            values.push(element_at(&object, index, context)?);
        }
        values.reverse();
        for (index, value) in values.into_iter().enumerate() {
            object.set(
                PropertyKey::from(index),
                value,
                this.clone(),
                false,
                context,
            )?;
        }
        Ok(this.clone())
    }

    /// `Array.prototype.shift()`.
    fn shift(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = this.to_object(context)?;
        let length = length_of(&object, context)?;
        if length == 0 {
            set_length(&object, 0, context)?;
            return Ok(JsValue::undefined());
        }
        let first = element_at(&object, 0, context)?;
        for index in 1..length {
            let value = element_at(&object, index, context)?;
            object.set(
                PropertyKey::from(index - 1),
                value,
                this.clone(),
                false,
                context,
            )?;
        }
        object.delete(&PropertyKey::from(length - 1));
        set_length(&object, length - 1, context)?;
        Ok(first)
    }

    /// `Array.prototype.slice([start[, end]])`.
    fn slice(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = this.to_object(context)?;
        let length = length_of(&object, context)?;
        let start = relative_index(args.get(0), length, 0, context)?;
        let end = relative_index(args.get(1), length, length, context)?;
        let mut values = Vec::new();
        for index in start..end {
            values.push(element_at(&object, index, context)?);
        }
        Ok(Self::create_array(values, context))
    }

    fn some(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = this.to_object(context)?;
        let callback = callback_arg(args, "some", context)?;
        let this_arg = args.get(1).cloned().unwrap_or_default();
        let length = length_of(&object, context)?;
        for index in 0..length {
            let value = element_at(&object, index, context)?;
            let found = context.call(
                &callback,
                &this_arg,
                &[value, JsValue::new(index), this.clone()],
            )?;
            if found.to_boolean() {
                return Ok(true.into());
            }
        }
        Ok(false.into())
    }

    /// `Array.prototype.sort([comparator])`: stable bottom-up merge sort.
    /// `undefined` elements sink to the end, holes disappear after them.
    fn sort(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let comparator = args.get(0).cloned().unwrap_or_default();
        if !comparator.is_undefined() && !comparator.is_function() {
            return context.throw_type_error("the comparison function must be callable");
        }

        let object = this.to_object(context)?;
        let length = length_of(&object, context)?;

        let mut present = Vec::new();
        let mut undefined_count = 0u64;
        let mut holes = 0u64;
        for index in 0..length {
            if !object.has_property(&PropertyKey::from(index)) {
                holes += 1;
                continue;
            }
            let value = element_at(&object, index, context)?;
            if value.is_undefined() {
                undefined_count += 1;
            } else {
                present.push(value);
            }
        }

        let sorted = merge_sort(present, &comparator, context)?;

        let mut index = 0u64;
        for value in sorted {
            object.set(PropertyKey::from(index), value, this.clone(), false, context)?;
            index += 1;
        }
        for _ in 0..undefined_count {
            object.set(
                PropertyKey::from(index),
                JsValue::undefined(),
                this.clone(),
                false,
                context,
            )?;
            index += 1;
        }
        for _ in 0..holes {
            object.delete(&PropertyKey::from(index));
            index += 1;
        }
        Ok(this.clone())
    }

    /// `Array.prototype.splice(start, deleteCount, ...items)`.
    fn splice(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = this.to_object(context)?;
        let length = length_of(&object, context)?;
        let start = relative_index(args.get(0), length, 0, context)?;
        let delete_count = match args.get(1) {
            None => length - start,
            Some(value) => {
                let count = value.to_integer_or_infinity(context)?;
                (count.max(0.0) as u64).min(length - start)
            }
        };

        let mut removed = Vec::new();
        for index in start..start + delete_count {
            removed.push(element_at(&object, index, context)?);
        }

        let items = args.get(2..).unwrap_or(&[]);
        let mut tail = Vec::new();
        for index in start + delete_count..length {
            tail.push(element_at(&object, index, context)?);
        }

        let mut write = start;
        for item in items {
            object.set(PropertyKey::from(write), item.clone(), this.clone(), false, context)?;
            write += 1;
        }
        for value in tail {
            object.set(PropertyKey::from(write), value, this.clone(), false, context)?;
            write += 1;
        }
        for index in write..length {
            object.delete(&PropertyKey::from(index));
        }
        set_length(&object, write, context)?;

        Ok(Self::create_array(removed, context))
    }

    #[allow(clippy::wrong_self_convention)]
    fn to_string(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        Self::join(this, &[], context)
    }

    /// `Array.prototype.unshift(...items)`.
    fn unshift(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = this.to_object(context)?;
        let length = length_of(&object, context)?;
        let shift = args.len() as u64;
        for index in (0..length).rev() {
            let value = element_at(&object, index, context)?;
            object.set(
                PropertyKey::from(index + shift),
                value,
                this.clone(),
                false,
                context,
            )?;
        }
        for (index, value) in args.iter().enumerate() {
            object.set(
                PropertyKey::from(index),
                value.clone(),
                this.clone(),
                false,
                context,
            )?;
        }
        set_length(&object, length + shift, context)?;
        Ok(JsValue::new(length + shift))
    }
}

// === Exotic length behavior, shared with the object internal methods ===

/// Reads the `length` slot without running any getters.
pub(crate) fn array_length(array: &JsObject) -> u64 {
    array
        .get_own_property(&"length".into())
        .and_then(|desc| desc.value())
        .and_then(|value| value.as_number())
        .map_or(0, |number| number as u64)
}

/// Installs `length` with the canonical attributes, bypassing validation.
fn set_raw_length(array: &JsObject, length: u64) {
    array.borrow_mut().insert(
        PropertyKey::String("length".into()),
        DataDescriptor::new(
            JsValue::new(length),
            Attribute::WRITABLE | Attribute::NON_ENUMERABLE | Attribute::PERMANENT,
        ),
    );
}

/// The `length = value` exotic write: validates the value, deletes trailing
/// indexes in descending order, and stops early at the first
/// non-configurable index, leaving `length` one past it.
pub(crate) fn array_set_length(
    array: &JsObject,
    value: JsValue,
    strict: bool,
    context: &mut Context,
) -> JsResult<bool> {
    let current = array
        .get_own_property(&"length".into())
        .map_or(true, |desc| desc.writable());
    if !current {
        if strict {
            return context.throw_type_error("cannot assign to read only property 'length'");
        }
        return Ok(false);
    }

    let number = value.to_number(context)?;
    let new_length = value.to_u32(context)?;
    if f64::from(new_length) != number {
        return context.throw_range_error("invalid array length");
    }

    let old_length = array_length(array);
    if u64::from(new_length) >= old_length {
        set_raw_length(array, u64::from(new_length));
        return Ok(true);
    }

    // Deleting from the top down; the first stuck index wins.
    let keys = array.borrow().properties().index_property_keys_from(new_length);
    for index in keys {
        if !array.delete(&PropertyKey::Index(index)) {
            set_raw_length(array, u64::from(index) + 1);
            if strict {
                return context.throw_type_error(format!(
                    "cannot delete property '{index}' of the array"
                ));
            }
            return Ok(false);
        }
    }
    set_raw_length(array, u64::from(new_length));
    Ok(true)
}

/// Plain truncation used by `defineProperty` on `length`.
pub(crate) fn array_truncate(array: &JsObject, new_length: u64) {
    let keys = array
        .borrow()
        .properties()
        .index_property_keys_from(new_length as u32);
    for index in keys {
        if !array.delete(&PropertyKey::Index(index)) {
            set_raw_length(array, u64::from(index) + 1);
            return;
        }
    }
    set_raw_length(array, new_length);
}

// === Shared helpers ===

fn length_of(object: &JsObject, context: &mut Context) -> JsResult<u64> {
    let length = object.get(&"length".into(), object.clone().into(), context)?;
    Ok(length.to_length(context)? as u64)
}

fn element_at(object: &JsObject, index: u64, context: &mut Context) -> JsResult<JsValue> {
    object.get(&PropertyKey::from(index as usize), object.clone().into(), context)
}

fn set_length(object: &JsObject, length: u64, context: &mut Context) -> JsResult<()> {
    if object.is_array() {
        array_set_length(object, JsValue::new(length), false, context)?;
    } else {
        object.set(
            PropertyKey::String("length".into()),
            JsValue::new(length),
            object.clone().into(),
            false,
            context,
        )?;
    }
    Ok(())
}

fn callback_arg(args: &[JsValue], name: &str, context: &mut Context) -> JsResult<JsValue> {
    let callback = args.get(0).cloned().unwrap_or_default();
    if !callback.is_function() {
        return context.throw_type_error(format!(
            "Array.prototype.{name}: the callback must be callable"
        ));
    }
    Ok(callback)
}

/// Clamps a possibly negative relative index into `[0, length]`.
fn relative_index(
    value: Option<&JsValue>,
    length: u64,
    default: u64,
    context: &mut Context,
) -> JsResult<u64> {
    let Some(value) = value else {
        return Ok(default);
    };
    if value.is_undefined() {
        return Ok(default);
    }
    let relative = value.to_integer_or_infinity(context)?;
    if relative.is_infinite() {
        return Ok(if relative < 0.0 { 0 } else { length });
    }
    let relative = relative as i64;
    if relative < 0 {
        Ok((length as i64 + relative).max(0) as u64)
    } else {
        Ok((relative as u64).min(length))
    }
}

fn flatten_into(
    value: &JsValue,
    depth: f64,
    result: &mut Vec<JsValue>,
    context: &mut Context,
) -> JsResult<()> {
    let object = value.to_object(context)?;
    let length = length_of(&object, context)?;
    for index in 0..length {
        let element = element_at(&object, index, context)?;
        match &element {
            JsValue::Object(inner) if inner.is_array() && depth >= 1.0 => {
                flatten_into(&element, depth - 1.0, result, context)?;
            }
            _ => result.push(element),
        }
    }
    Ok(())
}

/// Stable bottom-up merge sort with an optional user comparator.
fn merge_sort(
    mut values: Vec<JsValue>,
    comparator: &JsValue,
    context: &mut Context,
) -> JsResult<Vec<JsValue>> {
    let len = values.len();
    if len <= 1 {
        return Ok(values);
    }

    let mut buffer = values.clone();
    let mut width = 1;
    while width < len {
        let mut start = 0;
        while start < len {
            let middle = (start + width).min(len);
            let end = (start + 2 * width).min(len);
            merge(
                &values[start..middle],
                &values[middle..end],
                &mut buffer[start..end],
                comparator,
                context,
            )?;
            start = end;
        }
        std::mem::swap(&mut values, &mut buffer);
        width *= 2;
    }
    Ok(values)
}

fn merge(
    left: &[JsValue],
    right: &[JsValue],
    out: &mut [JsValue],
    comparator: &JsValue,
    context: &mut Context,
) -> JsResult<()> {
    let mut i = 0;
    let mut j = 0;
    let mut k = 0;
    while i < left.len() && j < right.len() {
        if compare(&left[i], &right[j], comparator, context)? <= 0.0 {
            out[k] = left[i].clone();
            i += 1;
        } else {
            out[k] = right[j].clone();
            j += 1;
        }
        k += 1;
    }
    while i < left.len() {
        out[k] = left[i].clone();
        i += 1;
        k += 1;
    }
    while j < right.len() {
        out[k] = right[j].clone();
        j += 1;
        k += 1;
    }
    Ok(())
}

fn compare(
    x: &JsValue,
    y: &JsValue,
    comparator: &JsValue,
    context: &mut Context,
) -> JsResult<f64> {
    if comparator.is_undefined() {
        // The default comparison sorts string forms.
        let x = x.to_string(context)?;
        let y = y.to_string(context)?;
        return Ok(match x.as_str().cmp(y.as_str()) {
            std::cmp::Ordering::Less => -1.0,
            std::cmp::Ordering::Equal => 0.0,
            std::cmp::Ordering::Greater => 1.0,
        });
    }
    let result = context.call(comparator, &JsValue::undefined(), &[x.clone(), y.clone()])?;
    let number = result.to_number(context)?;
    if number.is_nan() {
        Ok(0.0)
    } else {
        Ok(number)
    }
}
