//! The `Map Iterator` object.

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
pub struct MapIterator {
    map: JsObject,
    next_slot: Cell<usize>,
    kind: IterationKind,
}

impl Trace for MapIterator {
    fn trace(&self, tracer: &mut Tracer) {
        self.map.trace(tracer);
    }
}

impl MapIterator {
    pub(crate) fn create_map_iterator(
        map: JsObject,
        kind: IterationKind,
        context: &mut Context,
    ) -> JsValue {
        let prototype = context.iterator_prototypes().map_iterator_prototype();
        JsObject::new(Object::with_prototype(
            prototype.into(),
            ObjectData::MapIterator(Self {
                map,
                next_slot: Cell::new(0),
                kind,
            }),
        ))
        .into()
    }

    pub(crate) fn next(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let JsValue::Object(object) = this else {
            return context.throw_type_error("`this` is not a Map Iterator");
        };

        let step = {
            let borrowed = object.borrow();
            let ObjectData::MapIterator(ref iterator) = borrowed.data else {
                drop(borrowed);
                return context.throw_type_error("`this` is not a Map Iterator");
            };

            let map = iterator.map.borrow();
            let Some(entries) = map.as_map_ref() else {
                drop(map);
                drop(borrowed);
                return context.throw_type_error("map iterator target is not a Map");
            };

            let mut slot = iterator.next_slot.get();
            let mut found = None;
            while slot < entries.raw_len() {
                if let Some((key, value)) = entries.entry_at(slot) {
                    found = Some((key.clone(), value.clone(), iterator.kind));
                    slot += 1;
                    break;
                }
                slot += 1;
            }
            iterator.next_slot.set(slot);
            found
        };

        match step {
            Some((key, value, kind)) => {
                let result = kind.package(key, value, context);
                Ok(create_iter_result_object(result, false, context))
            }
            None => Ok(create_iter_result_object(JsValue::undefined(), true, context)),
        }
    }
}
