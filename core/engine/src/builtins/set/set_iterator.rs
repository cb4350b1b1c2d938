//! The `Set Iterator` object.

use crate::{
    builtins::iterable::{create_iter_result_object, IterationKind},
    context::Context,
    object::{JsObject, Object, ObjectData},
    value::JsValue,
    JsResult,
};
use std::cell::Cell;
use vesper_gc::{Finalize, Trace, Tracer};

#[derive(Debug, Finalize)]
pub struct SetIterator {
    set: JsObject,
    next_slot: Cell<usize>,
    kind: IterationKind,
}

impl Trace for SetIterator {
    fn trace(&self, tracer: &mut Tracer) {
        self.set.trace(tracer);
    }
}

impl SetIterator {
    pub(crate) fn create_set_iterator(
        set: JsObject,
        kind: IterationKind,
        context: &mut Context,
    ) -> JsValue {
        let prototype = context.iterator_prototypes().set_iterator_prototype();
        JsObject::new(Object::with_prototype(
            prototype.into(),
            ObjectData::SetIterator(Self {
                set,
                next_slot: Cell::new(0),
                kind,
            }),
        ))
        .into()
    }

    pub(crate) fn next(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let JsValue::Object(object) = this else {
            return context.throw_type_error("`this` is not a Set Iterator");
        };

        let step = {
            let borrowed = object.borrow();
            let ObjectData::SetIterator(ref iterator) = borrowed.data else {
                drop(borrowed);
                return context.throw_type_error("`this` is not a Set Iterator");
            };

            let set = iterator.set.borrow();
            let Some(values) = set.as_set_ref() else {
                drop(set);
                drop(borrowed);
                return context.throw_type_error("set iterator target is not a Set");
            };

            let mut slot = iterator.next_slot.get();
            let mut found = None;
            while slot < values.raw_len() {
                if let Some(value) = values.value_at(slot) {
                    found = Some((value.clone(), iterator.kind));
                    slot += 1;
                    break;
                }
                slot += 1;
            }
            iterator.next_slot.set(slot);
            found
        };

        match step {
            Some((value, kind)) => {
                // Set entries have `key === value`.
                let result = kind.package(value.clone(), value, context);
                Ok(create_iter_result_object(result, false, context))
            }
            None => Ok(create_iter_result_object(JsValue::undefined(), true, context)),
        }
    }
}
