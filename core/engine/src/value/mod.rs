//! This module implements the JavaScript value.
//!
//! A [`JsValue`] is the tagged union over every primitive and reference type
//! the engine knows, together with the conversions of ECMA-262 §7.1.

#[cfg(test)]
mod tests;

mod conversions;
mod display;
mod equality;
mod operations;
mod r#type;

pub use display::ValueDisplay;
pub use equality::{same_value, same_value_zero};
pub use r#type::Type;

use crate::{
    bigint::JsBigInt,
    builtins::number,
    context::Context,
    object::{JsObject, Object, ObjectData},
    property::{PropertyDescriptor, PropertyKey},
    string::JsString,
    symbol::JsSymbol,
    JsResult,
};
use vesper_gc::{Finalize, Trace, Tracer};

/// A JavaScript value.
#[derive(Debug, Clone)]
pub enum JsValue {
    /// `null` - A null value, for when a value doesn't exist.
    Null,
    /// `undefined` - An undefined value, for when a field or index doesn't
    /// exist.
    Undefined,
    /// `boolean` - A `true` / `false` value.
    Boolean(bool),
    /// `String` - An immutable UTF-8 string.
    String(JsString),
    /// `Number` - A 64-bit floating point number.
    Rational(f64),
    /// `Number` - A 32-bit integer fast path.
    Integer(i32),
    /// `BigInt` - An arbitrarily large signed integer.
    BigInt(JsBigInt),
    /// `Symbol` - A unique identity with an optional description.
    Symbol(JsSymbol),
    /// `Object` - A reference to a heap object, including functions.
    Object(JsObject),
}

impl Default for JsValue {
    fn default() -> Self {
        Self::Undefined
    }
}

impl Finalize for JsValue {}

impl Trace for JsValue {
    fn trace(&self, tracer: &mut Tracer) {
        if let Self::Object(object) = self {
            object.trace(tracer);
        }
    }
}

/// The preferred type passed to `ToPrimitive`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferredType {
    String,
    Number,
    Default,
}

/// A numeric value: `Number` or `BigInt`.
#[derive(Debug, Clone, PartialEq)]
pub enum Numeric {
    Number(f64),
    BigInt(JsBigInt),
}

impl From<Numeric> for JsValue {
    fn from(numeric: Numeric) -> Self {
        match numeric {
            Numeric::Number(number) => Self::new(number),
            Numeric::BigInt(bigint) => Self::BigInt(bigint),
        }
    }
}

impl JsValue {
    /// Creates a new value from anything convertible; `JsValue::new(3)` is
    /// an `Integer`, `JsValue::new(3.5)` a `Rational`.
    #[inline]
    pub fn new<T: Into<Self>>(value: T) -> Self {
        value.into()
    }

    /// Creates a new `undefined` value.
    #[inline]
    pub fn undefined() -> Self {
        Self::Undefined
    }

    /// Creates a new `null` value.
    #[inline]
    pub fn null() -> Self {
        Self::Null
    }

    /// Creates a new number with `NaN` value.
    #[inline]
    pub fn nan() -> Self {
        Self::Rational(f64::NAN)
    }

    /// Creates the `+Infinity` number.
    #[inline]
    pub fn positive_infinity() -> Self {
        Self::Rational(f64::INFINITY)
    }

    /// Creates the `-Infinity` number.
    #[inline]
    pub fn negative_infinity() -> Self {
        Self::Rational(f64::NEG_INFINITY)
    }

    /// Returns true if the value is undefined.
    #[inline]
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// Returns true if the value is null.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns true if the value is null or undefined.
    #[inline]
    pub fn is_null_or_undefined(&self) -> bool {
        matches!(self, Self::Null | Self::Undefined)
    }

    /// Returns true if the value is a boolean.
    #[inline]
    pub fn is_boolean(&self) -> bool {
        matches!(self, Self::Boolean(_))
    }

    #[inline]
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Self::Boolean(boolean) => Some(*boolean),
            _ => None,
        }
    }

    /// Returns true if the value is a number.
    #[inline]
    pub fn is_number(&self) -> bool {
        matches!(self, Self::Rational(_) | Self::Integer(_))
    }

    #[inline]
    pub fn as_number(&self) -> Option<f64> {
        match *self {
            Self::Integer(integer) => Some(integer.into()),
            Self::Rational(rational) => Some(rational),
            _ => None,
        }
    }

    /// Returns true if the value is a string.
    #[inline]
    pub fn is_string(&self) -> bool {
        matches!(self, Self::String(_))
    }

    #[inline]
    pub fn as_string(&self) -> Option<&JsString> {
        match self {
            Self::String(string) => Some(string),
            _ => None,
        }
    }

    /// Returns true if the value is a symbol.
    #[inline]
    pub fn is_symbol(&self) -> bool {
        matches!(self, Self::Symbol(_))
    }

    #[inline]
    pub fn as_symbol(&self) -> Option<JsSymbol> {
        match self {
            Self::Symbol(symbol) => Some(symbol.clone()),
            _ => None,
        }
    }

    /// Returns true if the value is a bigint.
    #[inline]
    pub fn is_bigint(&self) -> bool {
        matches!(self, Self::BigInt(_))
    }

    #[inline]
    pub fn as_bigint(&self) -> Option<&JsBigInt> {
        match self {
            Self::BigInt(bigint) => Some(bigint),
            _ => None,
        }
    }

    /// Returns true if the value is an object.
    #[inline]
    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    #[inline]
    pub fn as_object(&self) -> Option<&JsObject> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Returns true if the value is a callable object.
    #[inline]
    pub fn is_function(&self) -> bool {
        matches!(self, Self::Object(object) if object.is_callable())
    }

    /// Whether the number is an `Integer` or an integral `Rational`.
    #[allow(clippy::float_cmp)]
    pub fn is_integral_number(&self) -> bool {
        match *self {
            Self::Integer(_) => true,
            Self::Rational(rational) => rational.is_finite() && rational == rational.trunc(),
            _ => false,
        }
    }

    /// Converts the value to a `bool` per `ToBoolean`.
    pub fn to_boolean(&self) -> bool {
        match self {
            Self::Undefined | Self::Null => false,
            Self::Symbol(_) | Self::Object(_) => true,
            Self::String(string) => !string.is_empty(),
            Self::Rational(number) => *number != 0.0 && !number.is_nan(),
            Self::Integer(integer) => *integer != 0,
            Self::BigInt(bigint) => !bigint.is_zero(),
            Self::Boolean(boolean) => *boolean,
        }
    }

    /// `ToPrimitive` with a preferred type: consults `Symbol.toPrimitive`,
    /// then `valueOf`/`toString` per hint.
    pub fn to_primitive(
        &self,
        context: &mut Context,
        preferred_type: PreferredType,
    ) -> JsResult<JsValue> {
        let Self::Object(object) = self else {
            return Ok(self.clone());
        };

        let exotic = object.get(
            &context.well_known_symbols().to_primitive_symbol().into(),
            self.clone(),
            context,
        )?;
        if !exotic.is_null_or_undefined() {
            let hint = match preferred_type {
                PreferredType::String => "string",
                PreferredType::Number => "number",
                PreferredType::Default => "default",
            };
            let result = context.call(&exotic, self, &[JsValue::new(hint)])?;
            if result.is_object() {
                return context
                    .throw_type_error("Symbol.toPrimitive must return a primitive value");
            }
            return Ok(result);
        }

        let hint = match preferred_type {
            PreferredType::Default => PreferredType::Number,
            other => other,
        };
        object.ordinary_to_primitive(context, hint)
    }

    /// `ToNumber`.
    pub fn to_number(&self, context: &mut Context) -> JsResult<f64> {
        match self {
            Self::Null => Ok(0.0),
            Self::Undefined => Ok(f64::NAN),
            Self::Boolean(boolean) => Ok(if *boolean { 1.0 } else { 0.0 }),
            Self::String(string) => Ok(number::string_to_number(string)),
            Self::Rational(number) => Ok(*number),
            Self::Integer(integer) => Ok(f64::from(*integer)),
            Self::Symbol(_) => context.throw_type_error("cannot convert a Symbol to a number"),
            Self::BigInt(_) => context.throw_type_error("cannot convert a BigInt to a number"),
            Self::Object(_) => {
                let primitive = self.to_primitive(context, PreferredType::Number)?;
                primitive.to_number(context)
            }
        }
    }

    /// `ToString`.
    pub fn to_string(&self, context: &mut Context) -> JsResult<JsString> {
        match self {
            Self::Null => Ok("null".into()),
            Self::Undefined => Ok("undefined".into()),
            Self::Boolean(boolean) => Ok(if *boolean { "true" } else { "false" }.into()),
            Self::Rational(rational) => Ok(number::to_native_string(*rational).into()),
            Self::Integer(integer) => Ok(integer.to_string().into()),
            Self::String(string) => Ok(string.clone()),
            Self::Symbol(_) => context.throw_type_error("cannot convert a Symbol to a string"),
            Self::BigInt(bigint) => Ok(bigint.to_string().into()),
            Self::Object(_) => {
                let primitive = self.to_primitive(context, PreferredType::String)?;
                primitive.to_string(context)
            }
        }
    }

    /// `ToObject`: wraps primitives with their wrapper objects; `null` and
    /// `undefined` throw.
    pub fn to_object(&self, context: &mut Context) -> JsResult<JsObject> {
        match self {
            Self::Undefined | Self::Null => {
                context.throw_type_error("cannot convert 'null' or 'undefined' to an object")
            }
            Self::Boolean(boolean) => {
                let prototype = context.standard_objects().boolean_object().prototype();
                Ok(JsObject::new(Object::with_prototype(
                    prototype.into(),
                    ObjectData::Boolean(*boolean),
                )))
            }
            Self::Integer(integer) => {
                let prototype = context.standard_objects().number_object().prototype();
                Ok(JsObject::new(Object::with_prototype(
                    prototype.into(),
                    ObjectData::Number(f64::from(*integer)),
                )))
            }
            Self::Rational(rational) => {
                let prototype = context.standard_objects().number_object().prototype();
                Ok(JsObject::new(Object::with_prototype(
                    prototype.into(),
                    ObjectData::Number(*rational),
                )))
            }
            Self::String(string) => {
                let prototype = context.standard_objects().string_object().prototype();
                let object = JsObject::new(Object::with_prototype(
                    prototype.into(),
                    ObjectData::String(string.clone()),
                ));
                // Wrapper strings expose a non-writable `length`.
                object.insert_property(
                    "length",
                    JsValue::new(string.encode_len()),
                    crate::property::Attribute::empty(),
                );
                Ok(object)
            }
            Self::Symbol(symbol) => {
                let prototype = context.standard_objects().symbol_object().prototype();
                Ok(JsObject::new(Object::with_prototype(
                    prototype.into(),
                    ObjectData::Symbol(symbol.clone()),
                )))
            }
            Self::BigInt(bigint) => {
                let prototype = context.standard_objects().bigint_object().prototype();
                Ok(JsObject::new(Object::with_prototype(
                    prototype.into(),
                    ObjectData::BigInt(bigint.clone()),
                )))
            }
            Self::Object(object) => Ok(object.clone()),
        }
    }

    /// `ToPropertyKey`.
    pub fn to_property_key(&self, context: &mut Context) -> JsResult<PropertyKey> {
        Ok(match self {
            // Fast path:
            Self::String(string) => string.clone().into(),
            Self::Symbol(symbol) => symbol.clone().into(),
            // Slow path:
            _ => match self.to_primitive(context, PreferredType::String)? {
                Self::String(string) => string.into(),
                Self::Symbol(symbol) => symbol.into(),
                primitive => PropertyKey::from(primitive.to_string(context)?),
            },
        })
    }

    /// `ToNumeric`: `Number` or `BigInt`.
    pub fn to_numeric(&self, context: &mut Context) -> JsResult<Numeric> {
        let primitive = self.to_primitive(context, PreferredType::Number)?;
        if let Some(bigint) = primitive.as_bigint() {
            return Ok(Numeric::BigInt(bigint.clone()));
        }
        Ok(Numeric::Number(primitive.to_number(context)?))
    }

    /// `ToBigInt`.
    pub fn to_bigint(&self, context: &mut Context) -> JsResult<JsBigInt> {
        match self {
            Self::Null => context.throw_type_error("cannot convert null to a BigInt"),
            Self::Undefined => context.throw_type_error("cannot convert undefined to a BigInt"),
            Self::String(string) => JsBigInt::from_string(string).map_or_else(
                || {
                    context.throw_syntax_error(format!(
                        "cannot convert string '{string}' to a BigInt"
                    ))
                },
                Ok,
            ),
            Self::Boolean(true) => Ok(JsBigInt::new(1)),
            Self::Boolean(false) => Ok(JsBigInt::new(0)),
            Self::Integer(integer) => Ok(JsBigInt::new(*integer)),
            Self::Rational(rational) => JsBigInt::try_from_f64(*rational).map_or_else(
                || {
                    context.throw_range_error(format!(
                        "the number {rational} cannot be converted to a BigInt because it is not an integer"
                    ))
                },
                Ok,
            ),
            Self::BigInt(bigint) => Ok(bigint.clone()),
            Self::Object(_) => {
                let primitive = self.to_primitive(context, PreferredType::Number)?;
                primitive.to_bigint(context)
            }
            Self::Symbol(_) => context.throw_type_error("cannot convert a Symbol to a BigInt"),
        }
    }

    /// `ToIntegerOrInfinity`: truncates toward zero, maps `NaN` to `+0`.
    pub fn to_integer_or_infinity(&self, context: &mut Context) -> JsResult<f64> {
        let number = self.to_number(context)?;
        if number.is_nan() {
            return Ok(0.0);
        }
        if !number.is_finite() {
            return Ok(number);
        }
        // Adding 0.0 turns -0.0 into +0.0.
        Ok(number.trunc() + 0.0)
    }

    /// `ToInt32`.
    pub fn to_i32(&self, context: &mut Context) -> JsResult<i32> {
        if let Self::Integer(integer) = *self {
            return Ok(integer);
        }
        let number = self.to_number(context)?;
        Ok(number::f64_to_int32(number))
    }

    /// `ToUint32`.
    pub fn to_u32(&self, context: &mut Context) -> JsResult<u32> {
        if let Self::Integer(integer) = *self {
            if integer >= 0 {
                return Ok(integer as u32);
            }
        }
        let number = self.to_number(context)?;
        Ok(number::f64_to_uint32(number))
    }

    /// `ToIndex`: a non-negative integer below 2^53 - 1.
    pub fn to_index(&self, context: &mut Context) -> JsResult<usize> {
        if self.is_undefined() {
            return Ok(0);
        }
        let integer = self.to_integer_or_infinity(context)?;
        if integer < 0.0 {
            return context.throw_range_error("integer index must be >= 0");
        }
        if integer > number::MAX_SAFE_INTEGER {
            return context.throw_range_error("integer index must be less than 2**53 - 1");
        }
        Ok(integer as usize)
    }

    /// `ToLength`: clamps to `[0, 2^53 - 1]`.
    pub fn to_length(&self, context: &mut Context) -> JsResult<usize> {
        let len = self.to_integer_or_infinity(context)?;
        if len <= 0.0 {
            return Ok(0);
        }
        Ok(len.min(number::MAX_SAFE_INTEGER) as usize)
    }

    /// `RequireObjectCoercible`: throws on `null`/`undefined`.
    #[inline]
    pub fn require_object_coercible(&self, context: &mut Context) -> JsResult<&JsValue> {
        if self.is_null_or_undefined() {
            context.throw_type_error("cannot convert null or undefined to an object")
        } else {
            Ok(self)
        }
    }

    /// Property read through `ToObject`; the receiver stays the original
    /// value so wrapper methods observe the primitive `this`.
    pub fn get_field<K>(&self, key: K, context: &mut Context) -> JsResult<JsValue>
    where
        K: Into<PropertyKey>,
    {
        let object = self.to_object(context)?;
        object.get(&key.into(), self.clone(), context)
    }

    /// Property write through the object protocol. `strict` decides whether
    /// a rejected write throws.
    pub fn set_field<K, V>(
        &self,
        key: K,
        value: V,
        strict: bool,
        context: &mut Context,
    ) -> JsResult<JsValue>
    where
        K: Into<PropertyKey>,
        V: Into<JsValue>,
    {
        let key = key.into();
        let value = value.into();
        if let Self::Object(object) = self {
            object.set(key, value.clone(), self.clone(), strict, context)?;
            return Ok(value);
        }
        // Primitive receivers silently drop writes in sloppy mode.
        if strict {
            return context
                .throw_type_error(format!("cannot create property '{key}' on a primitive"));
        }
        Ok(value)
    }

    /// Resolves the own-or-inherited property descriptor.
    pub fn get_property(&self, key: &PropertyKey) -> Option<PropertyDescriptor> {
        let mut holder = self.clone();
        loop {
            let Self::Object(object) = holder else {
                return None;
            };
            if let Some(descriptor) = object.get_own_property(key) {
                return Some(descriptor);
            }
            holder = object.prototype();
        }
    }

    /// Invokes a method on the value.
    pub fn invoke<K>(
        &self,
        key: K,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue>
    where
        K: Into<PropertyKey>,
    {
        let method = self.get_field(key, context)?;
        context.call(&method, self, args)
    }

    /// Returns an object that implements `Display` without needing a
    /// context.
    #[inline]
    pub fn display(&self) -> ValueDisplay<'_> {
        ValueDisplay { value: self }
    }
}
