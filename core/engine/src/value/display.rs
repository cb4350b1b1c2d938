//! Context-free display of values, used by diagnostics and the CLI.
//!
//! Getters are never invoked; only own data properties are shown.

use super::JsValue;
use crate::builtins::number;
use crate::object::{JsObject, ObjectData};
use crate::property::PropertyKey;
use std::collections::HashSet;
use std::fmt;

/// A wrapper to display a `JsValue` without a `Context`.
#[derive(Debug)]
pub struct ValueDisplay<'a> {
    pub(super) value: &'a JsValue,
}

impl fmt::Display for ValueDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut encounters = HashSet::new();
        display_value(self.value, f, &mut encounters)
    }
}

fn display_value(
    value: &JsValue,
    f: &mut fmt::Formatter<'_>,
    encounters: &mut HashSet<usize>,
) -> fmt::Result {
    match value {
        JsValue::Null => write!(f, "null"),
        JsValue::Undefined => write!(f, "undefined"),
        JsValue::Boolean(boolean) => write!(f, "{boolean}"),
        JsValue::Symbol(symbol) => write!(f, "{symbol}"),
        JsValue::String(string) => write!(f, "{string}"),
        JsValue::Rational(rational) => write!(f, "{}", number::to_native_string(*rational)),
        JsValue::Integer(integer) => write!(f, "{integer}"),
        JsValue::BigInt(bigint) => write!(f, "{bigint}n"),
        JsValue::Object(object) => display_object(object, f, encounters),
    }
}

fn display_object(
    object: &JsObject,
    f: &mut fmt::Formatter<'_>,
    encounters: &mut HashSet<usize>,
) -> fmt::Result {
    if !encounters.insert(object.addr()) {
        return write!(f, "[Circular]");
    }

    enum Kind {
        Array,
        Function,
        Error,
        String(crate::string::JsString),
        Number(f64),
        Boolean(bool),
        Symbol(crate::symbol::JsSymbol),
        BigInt(crate::bigint::JsBigInt),
        Plain,
        Opaque,
    }

    let kind = match object.try_borrow() {
        Err(_) => Kind::Opaque,
        Ok(borrowed) => match &borrowed.data {
            ObjectData::Array => Kind::Array,
            ObjectData::Function(_) => Kind::Function,
            ObjectData::Error(_) => Kind::Error,
            ObjectData::String(string) => Kind::String(string.clone()),
            ObjectData::Number(number) => Kind::Number(*number),
            ObjectData::Boolean(boolean) => Kind::Boolean(*boolean),
            ObjectData::Symbol(symbol) => Kind::Symbol(symbol.clone()),
            ObjectData::BigInt(bigint) => Kind::BigInt(bigint.clone()),
            _ => Kind::Plain,
        },
    };

    let result = match kind {
        Kind::Opaque => write!(f, "[Object]"),
        Kind::Array => display_array(object, f, encounters),
        Kind::Function => {
            let name = own_string(object, "name").unwrap_or_default();
            if name.is_empty() {
                write!(f, "[Function (anonymous)]")
            } else {
                write!(f, "[Function: {name}]")
            }
        }
        Kind::Error => {
            let name = own_string(object, "name").unwrap_or_else(|| "Error".into());
            let message = own_string(object, "message").unwrap_or_default();
            if message.is_empty() {
                write!(f, "{name}")
            } else {
                write!(f, "{name}: {message}")
            }
        }
        Kind::String(string) => write!(f, "[String: {string:?}]"),
        Kind::Number(number) => write!(f, "[Number: {}]", number::to_native_string(number)),
        Kind::Boolean(boolean) => write!(f, "[Boolean: {boolean}]"),
        Kind::Symbol(symbol) => write!(f, "{symbol}"),
        Kind::BigInt(bigint) => write!(f, "[BigInt: {bigint}n]"),
        Kind::Plain => display_plain_object(object, f, encounters),
    };

    encounters.remove(&object.addr());
    result
}

fn own_string(object: &JsObject, key: &str) -> Option<String> {
    object
        .get_own_property(&PropertyKey::from(key))
        .and_then(|desc| desc.value())
        .map(|value| match value {
            JsValue::String(s) => s.to_string(),
            other => other.display().to_string(),
        })
}

fn display_array(
    object: &JsObject,
    f: &mut fmt::Formatter<'_>,
    encounters: &mut HashSet<usize>,
) -> fmt::Result {
    let length = object
        .get_own_property(&PropertyKey::from("length"))
        .and_then(|desc| desc.value())
        .and_then(|v| v.as_number())
        .unwrap_or(0.0) as u32;

    write!(f, "[ ")?;
    for index in 0..length {
        if index > 0 {
            write!(f, ", ")?;
        }
        match object
            .get_own_property(&PropertyKey::Index(index))
            .and_then(|desc| desc.value())
        {
            Some(ref element) => display_value(element, f, encounters)?,
            None => write!(f, "<empty>")?,
        }
    }
    write!(f, " ]")
}

fn display_plain_object(
    object: &JsObject,
    f: &mut fmt::Formatter<'_>,
    encounters: &mut HashSet<usize>,
) -> fmt::Result {
    write!(f, "{{ ")?;
    let keys = object.own_property_keys();
    let mut first = true;
    for key in keys {
        let Some(descriptor) = object.get_own_property(&key) else {
            continue;
        };
        if !descriptor.attributes().enumerable() {
            continue;
        }
        if !first {
            write!(f, ", ")?;
        }
        first = false;
        write!(f, "{key}: ")?;
        match descriptor.value() {
            Some(ref value) => display_value(value, f, encounters)?,
            None => write!(f, "[Getter/Setter]")?,
        }
    }
    write!(f, " }}")
}
