//! This module implements the global `Boolean` object.

use crate::{
    builtins::BuiltIn,
    context::Context,
    object::{ConstructorBuilder, JsObject, Object, ObjectData},
    property::Attribute,
    value::JsValue,
    JsResult,
};

#[derive(Debug, Clone, Copy)]
pub(crate) struct Boolean;

impl BuiltIn for Boolean {
    const NAME: &'static str = "Boolean";

    fn init(context: &mut Context) -> (&'static str, JsValue, Attribute) {
        let boolean = ConstructorBuilder::with_standard_object(
            context,
            Self::constructor,
            context.standard_objects().boolean_object().clone(),
        )
        .name(Self::NAME)
        .length(1)
        .method(Self::to_string, "toString", 0)
        .method(Self::value_of, "valueOf", 0)
        .build();

        (Self::NAME, boolean.into(), Self::attribute())
    }
}

impl Boolean {
    fn constructor(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let data = args.get(0).map_or(false, JsValue::to_boolean);
        if context.is_in_constructor_call() {
            if let JsValue::Object(object) = this {
                object.borrow_mut().data = ObjectData::Boolean(data);
                return Ok(this.clone());
            }
            let prototype = context.standard_objects().boolean_object().prototype();
            return Ok(JsObject::new(Object::with_prototype(
                prototype.into(),
                ObjectData::Boolean(data),
            ))
            .into());
        }
        Ok(JsValue::new(data))
    }

    fn this_boolean_value(this: &JsValue, context: &mut Context) -> JsResult<bool> {
        match this {
            JsValue::Boolean(boolean) => Ok(*boolean),
            JsValue::Object(object) => match object.borrow().data {
                ObjectData::Boolean(boolean) => Ok(boolean),
                _ => context
                    .throw_type_error("Boolean.prototype method called on incompatible receiver"),
            },
            _ => context
                .throw_type_error("Boolean.prototype method called on incompatible receiver"),
        }
    }

    /// `Boolean.prototype.toString()`.
    #[allow(clippy::wrong_self_convention)]
    fn to_string(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let boolean = Self::this_boolean_value(this, context)?;
        Ok(JsValue::new(if boolean { "true" } else { "false" }))
    }

    /// `Boolean.prototype.valueOf()`.
    fn value_of(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        Ok(JsValue::new(Self::this_boolean_value(this, context)?))
    }
}
