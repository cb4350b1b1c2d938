//! This module implements the global `JSON` namespace object, built on
//! `serde_json` as the codec.

use crate::{
    builtins::BuiltIn,
    context::Context,
    object::{JsObject, ObjectInitializer},
    property::PropertyKey,
    value::JsValue,
    JsResult,
};
use crate::property::Attribute;
use serde_json::{map::Map, Number as JsonNumber, Value as JsonValue};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy)]
pub(crate) struct Json;

impl BuiltIn for Json {
    const NAME: &'static str = "JSON";

    fn init(context: &mut Context) -> (&'static str, JsValue, Attribute) {
        let object = ObjectInitializer::new(context)
            .function(Self::parse, "parse", 2)
            .function(Self::stringify, "stringify", 3)
            .build();

        (Self::NAME, object.into(), Self::attribute())
    }
}

impl Json {
    /// `JSON.parse(text)`.
    pub(crate) fn parse(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let text = args.get(0).cloned().unwrap_or_default().to_string(context)?;
        match serde_json::from_str::<JsonValue>(&text) {
            Ok(json) => Ok(json_to_value(json, context)),
            Err(err) => context.throw_syntax_error(format!("JSON.parse: {err}")),
        }
    }

    /// `JSON.stringify(value[, replacer[, space]])`: honors `toJSON`,
    /// throws `TypeError` on cycles, renders `undefined` holders as
    /// `undefined`.
    pub(crate) fn stringify(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let value = args.get(0).cloned().unwrap_or_default();
        let space = match args.get(2) {
            None | Some(JsValue::Undefined) => 0,
            Some(space) => (space.to_integer_or_infinity(context)?.max(0.0) as usize).min(10),
        };

        let mut seen = HashSet::new();
        let json = value_to_json(&value, &mut seen, context)?;
        let Some(json) = json else {
            return Ok(JsValue::undefined());
        };
        let rendered = if space == 0 {
            serde_json::to_string(&json)
        } else {
            let indent = " ".repeat(space);
            let mut out = Vec::new();
            let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
            let mut serializer =
                serde_json::Serializer::with_formatter(&mut out, formatter);
            serde::Serialize::serialize(&json, &mut serializer)
                .map(|()| String::from_utf8(out).expect("serde_json writes UTF-8"))
        };
        match rendered {
            Ok(text) => Ok(JsValue::new(text)),
            Err(err) => context.throw_type_error(format!("JSON.stringify: {err}")),
        }
    }
}

/// Builds an engine value from parsed JSON.
pub(crate) fn json_to_value(json: JsonValue, context: &mut Context) -> JsValue {
    match json {
        JsonValue::Null => JsValue::null(),
        JsonValue::Bool(boolean) => JsValue::new(boolean),
        JsonValue::Number(number) => {
            if let Some(integer) = number.as_i64().and_then(|n| i32::try_from(n).ok()) {
                JsValue::new(integer)
            } else {
                JsValue::new(number.as_f64().unwrap_or(f64::NAN))
            }
        }
        JsonValue::String(string) => JsValue::new(string),
        JsonValue::Array(values) => {
            let elements: Vec<JsValue> = values
                .into_iter()
                .map(|element| json_to_value(element, context))
                .collect();
            crate::builtins::array::Array::create_array(elements, context)
        }
        JsonValue::Object(entries) => {
            let object = context.construct_object();
            for (key, value) in entries {
                let value = json_to_value(value, context);
                object.create_data_property(key, value);
            }
            object.into()
        }
    }
}

/// Serializes an engine value; `None` marks values JSON skips
/// (`undefined`, functions, symbols).
fn value_to_json(
    value: &JsValue,
    seen: &mut HashSet<usize>,
    context: &mut Context,
) -> JsResult<Option<JsonValue>> {
    // `toJSON` runs before anything else.
    let value = match value {
        JsValue::Object(_) => {
            let to_json = value.get_field("toJSON", context)?;
            if to_json.is_function() {
                context.call(&to_json, value, &[])?
            } else {
                value.clone()
            }
        }
        _ => value.clone(),
    };

    Ok(match &value {
        JsValue::Null => Some(JsonValue::Null),
        JsValue::Undefined | JsValue::Symbol(_) => None,
        JsValue::Boolean(boolean) => Some(JsonValue::Bool(*boolean)),
        JsValue::Integer(integer) => Some(JsonValue::Number((*integer).into())),
        JsValue::Rational(rational) => Some(
            JsonNumber::from_f64(*rational).map_or(JsonValue::Null, JsonValue::Number),
        ),
        JsValue::String(string) => Some(JsonValue::String(string.to_string())),
        JsValue::BigInt(_) => {
            return context.throw_type_error("BigInt value can't be serialized in JSON")
        }
        JsValue::Object(object) => {
            if object.is_callable() {
                return Ok(None);
            }
            if !seen.insert(object.addr()) {
                return context.throw_type_error("cyclic object value");
            }
            let result = object_to_json(object, seen, context)?;
            seen.remove(&object.addr());
            Some(result)
        }
    })
}

fn object_to_json(
    object: &JsObject,
    seen: &mut HashSet<usize>,
    context: &mut Context,
) -> JsResult<JsonValue> {
    if object.is_array() {
        let length = object
            .get(&"length".into(), object.clone().into(), context)?
            .to_length(context)?;
        let mut elements = Vec::with_capacity(length);
        for index in 0..length {
            let element = object.get(&PropertyKey::from(index), object.clone().into(), context)?;
            elements.push(value_to_json(&element, seen, context)?.unwrap_or(JsonValue::Null));
        }
        return Ok(JsonValue::Array(elements));
    }

    let mut map = Map::new();
    for key in object.enumerable_keys() {
        let element = object.get(&key, object.clone().into(), context)?;
        if let Some(json) = value_to_json(&element, seen, context)? {
            map.insert(key.to_js_string().to_string(), json);
        }
    }
    Ok(JsonValue::Object(map))
}
