//! The iteration protocol: %IteratorPrototype%, the per-collection
//! iterator prototypes, and the `GetIterator`/`IteratorNext` plumbing used
//! by `for..of`, spread and the collection constructors.

use crate::{
    builtins::BuiltIn,
    context::Context,
    object::{FunctionBuilder, JsObject, Object},
    property::{Attribute, PropertyKey},
    value::JsValue,
    JsResult,
};

/// Creates the `{ value, done }` result object of one iteration step.
pub fn create_iter_result_object(value: JsValue, done: bool, context: &mut Context) -> JsValue {
    let result = context.construct_object();
    result.create_data_property("value", value);
    result.create_data_property("done", done);
    result.into()
}

/// An iterator together with its cached `next` method.
#[derive(Debug)]
pub struct IteratorRecord {
    iterator: JsObject,
    next_function: JsValue,
}

impl IteratorRecord {
    pub fn new(iterator: JsObject, next_function: JsValue) -> Self {
        Self {
            iterator,
            next_function,
        }
    }

    pub fn iterator_object(&self) -> &JsObject {
        &self.iterator
    }

    /// One step: returns `None` once exhausted.
    pub fn step(&self, context: &mut Context) -> JsResult<Option<JsValue>> {
        let this = JsValue::from(self.iterator.clone());
        let result = context.call(&self.next_function, &this, &[])?;
        let JsValue::Object(result) = result else {
            return context.throw_type_error("iterator result is not an object");
        };
        let done = result
            .get(&"done".into(), result.clone().into(), context)?
            .to_boolean();
        if done {
            return Ok(None);
        }
        let value = result.get(&"value".into(), result.clone().into(), context)?;
        Ok(Some(value))
    }

    /// `IteratorClose`: tells the iterator the consumer is finished early.
    pub fn close(&self, context: &mut Context) -> JsResult<()> {
        let this = JsValue::from(self.iterator.clone());
        let return_method = self.iterator.get(&"return".into(), this.clone(), context)?;
        if return_method.is_function() {
            context.call(&return_method, &this, &[])?;
        }
        Ok(())
    }
}

/// `GetIterator(value)` through `value[Symbol.iterator]()`.
pub fn get_iterator(value: &JsValue, context: &mut Context) -> JsResult<IteratorRecord> {
    let key = PropertyKey::from(context.well_known_symbols().iterator_symbol());
    let object = value.to_object(context)?;
    let method = object.get(&key, value.clone(), context)?;
    if !method.is_function() {
        return context.throw_type_error(format!("{} is not iterable", value.display()));
    }
    let iterator = context.call(&method, value, &[])?;
    let JsValue::Object(iterator) = iterator else {
        return context.throw_type_error("the Symbol.iterator method did not return an object");
    };
    let next_function = iterator.get(&"next".into(), iterator.clone().into(), context)?;
    Ok(IteratorRecord::new(iterator, next_function))
}

/// Drains an iterable into a vector.
pub fn iterate_to_vec(value: &JsValue, context: &mut Context) -> JsResult<Vec<JsValue>> {
    let record = get_iterator(value, context)?;
    let mut values = Vec::new();
    while let Some(next) = record.step(context)? {
        values.push(next);
    }
    Ok(values)
}

/// Installs %IteratorPrototype% and the concrete iterator prototypes on the
/// context. Runs before any collection builtin so they can inherit from
/// these.
pub(crate) fn init_iterator_prototypes(context: &mut Context) {
    let object_prototype = context.standard_objects().object_object().prototype();

    // %IteratorPrototype%: [Symbol.iterator]() { return this; }
    let iterator_prototype = JsObject::new(Object::create(object_prototype.into()));
    let self_fn = FunctionBuilder::new(context, |this, _, _| Ok(this.clone()))
        .name("[Symbol.iterator]")
        .build();
    iterator_prototype.insert_property(
        PropertyKey::from(context.well_known_symbols().iterator_symbol()),
        self_fn,
        Attribute::WRITABLE | Attribute::NON_ENUMERABLE | Attribute::CONFIGURABLE,
    );

    let make_child = |context: &mut Context, prototype: &JsObject| {
        JsObject::new(Object::create(JsValue::from(prototype.clone())))
    };

    let array_iterator = make_child(context, &iterator_prototype);
    let string_iterator = make_child(context, &iterator_prototype);
    let map_iterator = make_child(context, &iterator_prototype);
    let set_iterator = make_child(context, &iterator_prototype);

    context.iterator_prototypes_mut().set(
        iterator_prototype,
        array_iterator,
        string_iterator,
        map_iterator,
        set_iterator,
    );
}

/// The global `Iterator` constructor: abstract, it cannot be instantiated
/// directly.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Iterator;

impl BuiltIn for Iterator {
    const NAME: &'static str = "Iterator";

    fn init(context: &mut Context) -> (&'static str, JsValue, Attribute) {
        let constructor = crate::object::ConstructorBuilder::with_standard_object(
            context,
            Self::constructor,
            context.standard_objects().iterator_object().clone(),
        )
        .name(Self::NAME)
        .length(0)
        .build();

        // Iterator.prototype is %IteratorPrototype% itself; wiring the
        // constructor's prototype slot at the %IteratorPrototype% object
        // would detach the already-distributed iterator prototypes, so the
        // prototype object simply inherits from it.
        let iterator_prototype = context.iterator_prototypes().iterator_prototype();
        context
            .standard_objects()
            .iterator_object()
            .prototype()
            .borrow_mut()
            .set_prototype_instance(iterator_prototype.into());

        (Self::NAME, constructor.into(), Self::attribute())
    }
}

impl Iterator {
    fn constructor(_: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        context.throw_type_error("Abstract class Iterator not directly constructable")
    }
}

/// A plain data iterator state: the shared shape of the array, string, map
/// and set iterators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterationKind {
    Key,
    Value,
    KeyAndValue,
}

impl IterationKind {
    /// Packs one iteration result per the kind.
    pub(crate) fn package(
        self,
        key: JsValue,
        value: JsValue,
        context: &mut Context,
    ) -> JsValue {
        match self {
            Self::Key => key,
            Self::Value => value,
            Self::KeyAndValue => {
                crate::builtins::array::Array::create_array(vec![key, value], context)
            }
        }
    }
}
