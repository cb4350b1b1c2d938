//! The `Array Iterator` object backing `keys`/`values`/`entries` and
//! `for..of` over arrays.

use crate::{
    builtins::iterable::{create_iter_result_object, IterationKind},
    context::Context,
    object::{JsObject, Object, ObjectData},
    property::PropertyKey,
    value::JsValue,
    JsResult,
};
use std::cell::Cell;
use vesper_gc::{Finalize, Trace, Tracer};

#[derive(Debug, Trace, Finalize)]
pub struct ArrayIterator {
    array: JsValue,
    #[ignore_trace]
    next_index: Cell<u32>,
    #[ignore_trace]
    kind: IterationKind,
    #[ignore_trace]
    done: Cell<bool>,
}

impl ArrayIterator {
    fn new(array: JsValue, kind: IterationKind) -> Self {
        Self {
            array,
            next_index: Cell::new(0),
            kind,
            done: Cell::new(false),
        }
    }

    /// Allocates an array iterator over `array`.
    pub(crate) fn create_array_iterator(
        array: JsValue,
        kind: IterationKind,
        context: &mut Context,
    ) -> JsValue {
        let prototype = context.iterator_prototypes().array_iterator_prototype();
        let iterator = JsObject::new(Object::with_prototype(
            prototype.into(),
            ObjectData::ArrayIterator(Self::new(array, kind)),
        ));
        iterator.into()
    }

    /// `%ArrayIteratorPrototype%.next()`.
    pub(crate) fn next(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let JsValue::Object(object) = this else {
            return context.throw_type_error("`this` is not an ArrayIterator");
        };

        let (array, index, kind, done) = {
            let borrowed = object.borrow();
            let ObjectData::ArrayIterator(ref iterator) = borrowed.data else {
                drop(borrowed);
                return context.throw_type_error("`this` is not an ArrayIterator");
            };
            (
                iterator.array.clone(),
                iterator.next_index.get(),
                iterator.kind,
                iterator.done.get(),
            )
        };

        if done {
            return Ok(create_iter_result_object(JsValue::undefined(), true, context));
        }

        let length = array
            .get_field("length", context)?
            .to_length(context)? as u32;

        if index >= length {
            set_done(object);
            return Ok(create_iter_result_object(JsValue::undefined(), true, context));
        }

        bump_index(object, index + 1);
        let value = array.get_field(PropertyKey::Index(index), context)?;
        let result = kind.package(JsValue::new(index), value, context);
        Ok(create_iter_result_object(result, false, context))
    }
}

fn set_done(object: &JsObject) {
    if let ObjectData::ArrayIterator(ref iterator) = object.borrow().data {
        iterator.done.set(true);
    }
}

fn bump_index(object: &JsObject, next: u32) {
    if let ObjectData::ArrayIterator(ref iterator) = object.borrow().data {
        iterator.next_index.set(next);
    }
}
