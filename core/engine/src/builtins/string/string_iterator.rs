//! The `String Iterator`, stepping code points.

use crate::{
    builtins::iterable::create_iter_result_object,
    context::Context,
    object::{JsObject, Object, ObjectData},
    string::JsString,
    value::JsValue,
    JsResult,
};
use std::cell::Cell;
use vesper_gc::{Finalize, Trace, Tracer};

#[derive(Debug, Finalize)]
pub struct StringIterator {
    string: JsString,
    next_index: Cell<usize>,
}

impl Trace for StringIterator {
    #[inline]
    fn trace(&self, _tracer: &mut Tracer) {}
}

impl StringIterator {
    pub(crate) fn create_string_iterator(string: JsString, context: &mut Context) -> JsValue {
        let prototype = context.iterator_prototypes().string_iterator_prototype();
        JsObject::new(Object::with_prototype(
            prototype.into(),
            ObjectData::StringIterator(Self {
                string,
                next_index: Cell::new(0),
            }),
        ))
        .into()
    }

    pub(crate) fn next(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let JsValue::Object(object) = this else {
            return context.throw_type_error("`this` is not a String Iterator");
        };
        let step = {
            let borrowed = object.borrow();
            let ObjectData::StringIterator(ref iterator) = borrowed.data else {
                drop(borrowed);
                return context.throw_type_error("`this` is not a String Iterator");
            };
            let index = iterator.next_index.get();
            match iterator.string.chars().nth(index) {
                Some(ch) => {
                    iterator.next_index.set(index + 1);
                    Some(ch)
                }
                None => None,
            }
        };
        match step {
            Some(ch) => Ok(create_iter_result_object(JsValue::from(ch), false, context)),
            None => Ok(create_iter_result_object(JsValue::undefined(), true, context)),
        }
    }
}
