//! Conversions from Rust values into [`JsValue`].

use super::JsValue;
use crate::{
    bigint::JsBigInt, object::JsObject, string::JsString, symbol::JsSymbol,
};

impl From<&JsValue> for JsValue {
    #[inline]
    fn from(value: &JsValue) -> Self {
        value.clone()
    }
}

impl From<JsString> for JsValue {
    #[inline]
    fn from(value: JsString) -> Self {
        Self::String(value)
    }
}

impl From<&str> for JsValue {
    #[inline]
    fn from(value: &str) -> Self {
        Self::String(value.into())
    }
}

impl From<String> for JsValue {
    #[inline]
    fn from(value: String) -> Self {
        Self::String(value.into())
    }
}

impl From<char> for JsValue {
    #[inline]
    fn from(value: char) -> Self {
        Self::String(value.into())
    }
}

impl From<JsSymbol> for JsValue {
    #[inline]
    fn from(value: JsSymbol) -> Self {
        Self::Symbol(value)
    }
}

impl From<f64> for JsValue {
    #[inline]
    fn from(value: f64) -> Self {
        Self::Rational(value)
    }
}

impl From<f32> for JsValue {
    #[inline]
    fn from(value: f32) -> Self {
        Self::Rational(value.into())
    }
}

impl From<i32> for JsValue {
    #[inline]
    fn from(value: i32) -> Self {
        Self::Integer(value)
    }
}

impl From<i64> for JsValue {
    fn from(value: i64) -> Self {
        match i32::try_from(value) {
            Ok(integer) => Self::Integer(integer),
            Err(_) => Self::Rational(value as f64),
        }
    }
}

impl From<u8> for JsValue {
    #[inline]
    fn from(value: u8) -> Self {
        Self::Integer(value.into())
    }
}

impl From<u16> for JsValue {
    #[inline]
    fn from(value: u16) -> Self {
        Self::Integer(value.into())
    }
}

impl From<i8> for JsValue {
    #[inline]
    fn from(value: i8) -> Self {
        Self::Integer(value.into())
    }
}

impl From<i16> for JsValue {
    #[inline]
    fn from(value: i16) -> Self {
        Self::Integer(value.into())
    }
}

impl From<u32> for JsValue {
    fn from(value: u32) -> Self {
        match i32::try_from(value) {
            Ok(integer) => Self::Integer(integer),
            Err(_) => Self::Rational(value.into()),
        }
    }
}

impl From<u64> for JsValue {
    fn from(value: u64) -> Self {
        match i32::try_from(value) {
            Ok(integer) => Self::Integer(integer),
            Err(_) => Self::Rational(value as f64),
        }
    }
}

impl From<usize> for JsValue {
    fn from(value: usize) -> Self {
        match i32::try_from(value) {
            Ok(integer) => Self::Integer(integer),
            Err(_) => Self::Rational(value as f64),
        }
    }
}

impl From<bool> for JsValue {
    #[inline]
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<JsBigInt> for JsValue {
    #[inline]
    fn from(value: JsBigInt) -> Self {
        Self::BigInt(value)
    }
}

impl From<JsObject> for JsValue {
    #[inline]
    fn from(value: JsObject) -> Self {
        Self::Object(value)
    }
}

impl From<&JsObject> for JsValue {
    #[inline]
    fn from(value: &JsObject) -> Self {
        Self::Object(value.clone())
    }
}

impl<T> From<Option<T>> for JsValue
where
    T: Into<JsValue>,
{
    /// `None` maps to `undefined`.
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => value.into(),
            None => Self::Undefined,
        }
    }
}
