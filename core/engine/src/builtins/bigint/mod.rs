//! This module implements the global `BigInt` object.

use crate::{
    bigint::JsBigInt,
    builtins::BuiltIn,
    context::Context,
    object::{ConstructorBuilder, ObjectData},
    property::Attribute,
    value::JsValue,
    JsResult,
};

#[derive(Debug, Clone, Copy)]
pub(crate) struct BigInt;

impl BuiltIn for BigInt {
    const NAME: &'static str = "BigInt";

    fn init(context: &mut Context) -> (&'static str, JsValue, Attribute) {
        let bigint = ConstructorBuilder::with_standard_object(
            context,
            Self::constructor,
            context.standard_objects().bigint_object().clone(),
        )
        .name(Self::NAME)
        .length(1)
        .constructable(false)
        .method(Self::to_string, "toString", 0)
        .method(Self::value_of, "valueOf", 0)
        .build();

        (Self::NAME, bigint.into(), Self::attribute())
    }
}

impl BigInt {
    /// `BigInt(value)`: conversion only, `new BigInt()` throws.
    fn constructor(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        if context.is_in_constructor_call() {
            return context.throw_type_error("BigInt is not a constructor");
        }
        let value = args.get(0).cloned().unwrap_or_default();
        // Numbers must be integral; everything else goes through ToBigInt.
        if let Some(number) = value.as_number() {
            return match JsBigInt::try_from_f64(number) {
                Some(bigint) => Ok(bigint.into()),
                None => context.throw_range_error(
                    "the number cannot be converted to a BigInt because it is not an integer",
                ),
            };
        }
        Ok(value.to_bigint(context)?.into())
    }

    fn this_bigint_value(this: &JsValue, context: &mut Context) -> JsResult<JsBigInt> {
        match this {
            JsValue::BigInt(bigint) => Ok(bigint.clone()),
            JsValue::Object(object) => match object.borrow().data {
                ObjectData::BigInt(ref bigint) => Ok(bigint.clone()),
                _ => context
                    .throw_type_error("BigInt.prototype method called on incompatible receiver"),
            },
            _ => context
                .throw_type_error("BigInt.prototype method called on incompatible receiver"),
        }
    }

    /// `BigInt.prototype.toString([radix])`.
    #[allow(clippy::wrong_self_convention)]
    fn to_string(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let bigint = Self::this_bigint_value(this, context)?;
        let radix = match args.get(0) {
            None | Some(JsValue::Undefined) => 10,
            Some(value) => value.to_integer_or_infinity(context)? as i64,
        };
        if !(2..=36).contains(&radix) {
            return context
                .throw_range_error("toString() radix argument must be between 2 and 36");
        }
        Ok(JsValue::new(bigint.to_string_radix(radix as u32)))
    }

    /// `BigInt.prototype.valueOf()`.
    fn value_of(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        Ok(Self::this_bigint_value(this, context)?.into())
    }
}
