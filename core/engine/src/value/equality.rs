//! Value equality: strict, abstract, `SameValue` and `SameValueZero`.

use super::{JsValue, PreferredType};
use crate::{bigint::JsBigInt, context::Context, object::JsObject, JsResult};

impl JsValue {
    /// Strict equality (`===`): no coercion, `NaN !== NaN`, `+0 === -0`.
    pub fn strict_equals(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Object(x), Self::Object(y)) => JsObject::equals(x, y),
            (Self::String(x), Self::String(y)) => x == y,
            (Self::Boolean(x), Self::Boolean(y)) => x == y,
            (Self::Symbol(x), Self::Symbol(y)) => x == y,
            (Self::BigInt(x), Self::BigInt(y)) => x == y,
            (Self::Null, Self::Null) | (Self::Undefined, Self::Undefined) => true,
            _ => match (self.as_number(), other.as_number()) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            },
        }
    }

    /// Abstract equality (`==`): the coercion ladder of ECMA-262 §7.2.15.
    pub fn equals(&self, other: &Self, context: &mut Context) -> JsResult<bool> {
        if self.get_type() == other.get_type() {
            return Ok(self.strict_equals(other));
        }

        Ok(match (self, other) {
            (Self::Null, Self::Undefined) | (Self::Undefined, Self::Null) => true,

            // Number == String | Boolean: coerce the other side to Number.
            (Self::Rational(_) | Self::Integer(_), Self::String(_) | Self::Boolean(_))
            | (Self::String(_), Self::Rational(_) | Self::Integer(_)) => {
                let x = self.to_number(context)?;
                let y = other.to_number(context)?;
                x == y
            }
            (Self::Boolean(x), _) => {
                return JsValue::new(i32::from(*x)).equals(other, context)
            }
            (_, Self::Boolean(y)) => {
                return self.equals(&JsValue::new(i32::from(*y)), context)
            }

            (Self::BigInt(x), Self::String(y)) => match JsBigInt::from_string(y) {
                Some(y) => *x == y,
                None => false,
            },
            (Self::String(x), Self::BigInt(y)) => match JsBigInt::from_string(x) {
                Some(x) => x == *y,
                None => false,
            },
            (Self::BigInt(x), Self::Rational(_) | Self::Integer(_)) => {
                bigint_equals_number(x, other.as_number().expect("checked number"))
            }
            (Self::Rational(_) | Self::Integer(_), Self::BigInt(y)) => {
                bigint_equals_number(y, self.as_number().expect("checked number"))
            }

            // Object == primitive: bring the object down first.
            (Self::Object(_), _) => {
                let primitive = self.to_primitive(context, PreferredType::Default)?;
                return primitive.equals(other, context);
            }
            (_, Self::Object(_)) => {
                let primitive = other.to_primitive(context, PreferredType::Default)?;
                return self.equals(&primitive, context);
            }

            _ => false,
        })
    }
}

fn bigint_equals_number(x: &JsBigInt, y: f64) -> bool {
    match JsBigInt::try_from_f64(y) {
        Some(y) => *x == y,
        None => false,
    }
}

/// The `SameValue` operation: like `===` except `NaN` equals `NaN` and
/// `+0` differs from `-0`.
pub fn same_value(x: &JsValue, y: &JsValue) -> bool {
    if x.get_type() != y.get_type() {
        return false;
    }
    match (x.as_number(), y.as_number()) {
        (Some(x), Some(y)) => number_same_value(x, y),
        _ => x.strict_equals(y),
    }
}

/// The `SameValueZero` operation: like `SameValue` except `+0` equals `-0`.
pub fn same_value_zero(x: &JsValue, y: &JsValue) -> bool {
    if x.get_type() != y.get_type() {
        return false;
    }
    match (x.as_number(), y.as_number()) {
        (Some(x), Some(y)) => (x.is_nan() && y.is_nan()) || x == y,
        _ => x.strict_equals(y),
    }
}

fn number_same_value(x: f64, y: f64) -> bool {
    if x.is_nan() && y.is_nan() {
        return true;
    }
    x == y && x.is_sign_negative() == y.is_sign_negative()
}
