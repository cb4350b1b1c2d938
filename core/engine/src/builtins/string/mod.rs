//! This module implements the global `String` object.
//!
//! Every prototype method coerces `this` through `RequireObjectCoercible`
//! and unwraps a wrapper's `[[PrimitiveValue]]`; the regexp-flavored
//! methods route through the regexp's `exec` protocol.

pub mod string_iterator;

#[cfg(test)]
mod tests;

use crate::{
    builtins::{regexp::RegExp, BuiltIn},
    context::Context,
    object::{ConstructorBuilder, FunctionBuilder, JsObject, Object, ObjectData},
    property::{Attribute, PropertyKey},
    string::JsString,
    value::JsValue,
    JsResult,
};
use string_iterator::StringIterator;

#[derive(Debug, Clone, Copy)]
pub(crate) struct String;

impl BuiltIn for String {
    const NAME: &'static str = "String";

    fn init(context: &mut Context) -> (&'static str, JsValue, Attribute) {
        let symbol_iterator = context.well_known_symbols().iterator_symbol();
        let iterator_function = FunctionBuilder::new(context, Self::iterator)
            .name("[Symbol.iterator]")
            .build();

        let string = ConstructorBuilder::with_standard_object(
            context,
            Self::constructor,
            context.standard_objects().string_object().clone(),
        )
        .name(Self::NAME)
        .length(1)
        .static_method(Self::from_char_code, "fromCharCode", 1)
        .method(Self::at, "at", 1)
        .method(Self::char_at, "charAt", 1)
        .method(Self::char_code_at, "charCodeAt", 1)
        .method(Self::concat, "concat", 1)
        .method(Self::ends_with, "endsWith", 1)
        .method(Self::includes, "includes", 1)
        .method(Self::index_of, "indexOf", 1)
        .method(Self::last_index_of, "lastIndexOf", 1)
        .method(Self::r#match, "match", 1)
        .method(Self::pad_end, "padEnd", 1)
        .method(Self::pad_start, "padStart", 1)
        .method(Self::repeat, "repeat", 1)
        .method(Self::replace, "replace", 2)
        .method(Self::replace_all, "replaceAll", 2)
        .method(Self::search, "search", 1)
        .method(Self::slice, "slice", 2)
        .method(Self::split, "split", 2)
        .method(Self::starts_with, "startsWith", 1)
        .method(Self::substring, "substring", 2)
        .method(Self::to_lower_case, "toLowerCase", 0)
        .method(Self::to_string, "toString", 0)
        .method(Self::to_upper_case, "toUpperCase", 0)
        .method(Self::trim, "trim", 0)
        .method(Self::trim_end, "trimEnd", 0)
        .method(Self::trim_start, "trimStart", 0)
        .method(Self::value_of, "valueOf", 0)
        .property(
            PropertyKey::from(symbol_iterator),
            iterator_function,
            Attribute::WRITABLE | Attribute::NON_ENUMERABLE | Attribute::CONFIGURABLE,
        )
        .build();

        (Self::NAME, string.into(), Self::attribute())
    }
}

/// Unwraps `this` into the primitive string the method operates on.
pub(crate) fn this_string_value(this: &JsValue, context: &mut Context) -> JsResult<JsString> {
    this.require_object_coercible(context)?;
    if let JsValue::Object(object) = this {
        if let Some(string) = object.borrow().as_string() {
            return Ok(string);
        }
    }
    this.to_string(context)
}

impl String {
    /// `String([value])`.
    fn constructor(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let string = match args.get(0) {
            Some(JsValue::Symbol(symbol)) if !context.is_in_constructor_call() => {
                // `String(symbol)` is the one sanctioned Symbol-to-string path.
                JsString::from(symbol.to_display_string())
            }
            Some(value) => value.to_string(context)?,
            None => JsString::empty(),
        };

        if context.is_in_constructor_call() {
            if let JsValue::Object(object) = this {
                let length = string.encode_len();
                object.borrow_mut().data = ObjectData::String(string);
                object.insert_property("length", length, Attribute::empty());
                return Ok(this.clone());
            }
            let prototype = context.standard_objects().string_object().prototype();
            let object = JsObject::new(Object::with_prototype(
                prototype.into(),
                ObjectData::String(string.clone()),
            ));
            object.insert_property("length", string.encode_len(), Attribute::empty());
            return Ok(object.into());
        }
        Ok(string.into())
    }

    /// `String.fromCharCode(...codes)`.
    fn from_char_code(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let mut result = std::string::String::with_capacity(args.len());
        for code in args {
            let code = code.to_u32(context)? as u16;
            result.push(char::from_u32(u32::from(code)).unwrap_or('\u{FFFD}'));
        }
        Ok(JsValue::new(result))
    }

    fn iterator(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let string = this_string_value(this, context)?;
        Ok(StringIterator::create_string_iterator(string, context))
    }

    /// `String.prototype.at(index)`.
    fn at(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let string = this_string_value(this, context)?;
        let length = string.encode_len() as i64;
        let mut index = args
            .get(0)
            .cloned()
            .unwrap_or_default()
            .to_integer_or_infinity(context)? as i64;
        if index < 0 {
            index += length;
        }
        if index < 0 || index >= length {
            return Ok(JsValue::undefined());
        }
        Ok(string
            .chars()
            .nth(index as usize)
            .map_or(JsValue::undefined(), JsValue::from))
    }

    /// `String.prototype.charAt(index)`.
    fn char_at(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let string = this_string_value(this, context)?;
        let index = args
            .get(0)
            .cloned()
            .unwrap_or_default()
            .to_integer_or_infinity(context)?;
        if index < 0.0 {
            return Ok(JsValue::new(""));
        }
        Ok(string
            .chars()
            .nth(index as usize)
            .map_or(JsValue::new(""), JsValue::from))
    }

    /// `String.prototype.charCodeAt(index)`.
    fn char_code_at(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let string = this_string_value(this, context)?;
        let index = args
            .get(0)
            .cloned()
            .unwrap_or_default()
            .to_integer_or_infinity(context)?;
        if index < 0.0 {
            return Ok(JsValue::nan());
        }
        Ok(string
            .chars()
            .nth(index as usize)
            .map_or(JsValue::nan(), |ch| JsValue::new(ch as u32)))
    }

    fn concat(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let mut result = this_string_value(this, context)?.to_string();
        for arg in args {
            result.push_str(&arg.to_string(context)?);
        }
        Ok(JsValue::new(result))
    }

    fn ends_with(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let string = this_string_value(this, context)?;
        let search = search_string_arg(args.get(0), "endsWith", context)?;
        Ok(string.as_str().ends_with(search.as_str()).into())
    }

    fn includes(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let string = this_string_value(this, context)?;
        let search = search_string_arg(args.get(0), "includes", context)?;
        Ok(string.as_str().contains(search.as_str()).into())
    }

    /// `String.prototype.indexOf(search)`, in code-point positions.
    fn index_of(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let string = this_string_value(this, context)?;
        let search = args.get(0).cloned().unwrap_or_default().to_string(context)?;
        match string.as_str().find(search.as_str()) {
            Some(byte_index) => Ok(JsValue::new(string[..byte_index].chars().count())),
            None => Ok(JsValue::new(-1)),
        }
    }

    fn last_index_of(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let string = this_string_value(this, context)?;
        let search = args.get(0).cloned().unwrap_or_default().to_string(context)?;
        match string.as_str().rfind(search.as_str()) {
            Some(byte_index) => Ok(JsValue::new(string[..byte_index].chars().count())),
            None => Ok(JsValue::new(-1)),
        }
    }

    /// `String.prototype.match(pattern)`, routed through `exec`.
    fn r#match(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let string = this_string_value(this, context)?;
        let regexp = RegExp::coerce_to_regexp(args.get(0), context)?;
        RegExp::match_string(&regexp, &string, context)
    }

    fn pad_end(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let string = this_string_value(this, context)?;
        let (target, filler) = pad_arguments(args, context)?;
        let current = string.encode_len();
        if target <= current || filler.is_empty() {
            return Ok(string.into());
        }
        let mut result = string.to_string();
        let mut fill = filler.chars().cycle();
        for _ in current..target {
            result.push(fill.next().expect("cycled iterator"));
        }
        Ok(JsValue::new(result))
    }

    fn pad_start(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let string = this_string_value(this, context)?;
        let (target, filler) = pad_arguments(args, context)?;
        let current = string.encode_len();
        if target <= current || filler.is_empty() {
            return Ok(string.into());
        }
        let mut pad = std::string::String::new();
        let mut fill = filler.chars().cycle();
        for _ in current..target {
            pad.push(fill.next().expect("cycled iterator"));
        }
        pad.push_str(&string);
        Ok(JsValue::new(pad))
    }

    /// `String.prototype.repeat(count)`.
    fn repeat(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let string = this_string_value(this, context)?;
        let count = args
            .get(0)
            .cloned()
            .unwrap_or_default()
            .to_integer_or_infinity(context)?;
        if count < 0.0 || count.is_infinite() {
            return context.throw_range_error("invalid repeat count");
        }
        Ok(JsValue::new(string.as_str().repeat(count as usize)))
    }

    /// `String.prototype.replace(pattern, replacement)`: first match only;
    /// regexp patterns run through `exec`.
    fn replace(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let string = this_string_value(this, context)?;
        match args.get(0) {
            Some(JsValue::Object(object)) if object.borrow().data_is_regexp() => {
                RegExp::replace_string(object, &string, args.get(1), false, context)
            }
            pattern => {
                let pattern = pattern.cloned().unwrap_or_default().to_string(context)?;
                replace_plain(&string, &pattern, args.get(1), false, context)
            }
        }
    }

    /// `String.prototype.replaceAll(pattern, replacement)`.
    fn replace_all(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let string = this_string_value(this, context)?;
        match args.get(0) {
            Some(JsValue::Object(object)) if object.borrow().data_is_regexp() => {
                RegExp::replace_string(object, &string, args.get(1), true, context)
            }
            pattern => {
                let pattern = pattern.cloned().unwrap_or_default().to_string(context)?;
                replace_plain(&string, &pattern, args.get(1), true, context)
            }
        }
    }

    /// `String.prototype.search(pattern)`.
    fn search(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let string = this_string_value(this, context)?;
        let regexp = RegExp::coerce_to_regexp(args.get(0), context)?;
        RegExp::search_string(&regexp, &string, context)
    }

    /// `String.prototype.slice(start, end)`.
    fn slice(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let string = this_string_value(this, context)?;
        let chars: Vec<char> = string.chars().collect();
        let length = chars.len() as i64;
        let start = relative_string_index(args.get(0), length, 0, context)?;
        let end = relative_string_index(args.get(1), length, length, context)?;
        if start >= end {
            return Ok(JsValue::new(""));
        }
        Ok(JsValue::new(
            chars[start as usize..end as usize].iter().collect::<std::string::String>(),
        ))
    }

    /// `String.prototype.split(separator, limit)`: regexp separators route
    /// through `exec`.
    fn split(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let string = this_string_value(this, context)?;
        let limit = match args.get(1) {
            None | Some(JsValue::Undefined) => u32::MAX,
            Some(value) => value.to_u32(context)?,
        };

        if let Some(JsValue::Object(object)) = args.get(0) {
            if object.borrow().data_is_regexp() {
                return RegExp::split_string(object, &string, limit, context);
            }
        }

        let pieces: Vec<JsValue> = match args.get(0) {
            None | Some(JsValue::Undefined) => vec![string.clone().into()],
            Some(separator) => {
                let separator = separator.to_string(context)?;
                if separator.is_empty() {
                    string.chars().map(JsValue::from).collect()
                } else {
                    string
                        .as_str()
                        .split(separator.as_str())
                        .map(JsValue::from)
                        .collect()
                }
            }
        };
        let limited: Vec<JsValue> = pieces.into_iter().take(limit as usize).collect();
        Ok(crate::builtins::array::Array::create_array(limited, context))
    }

    fn starts_with(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let string = this_string_value(this, context)?;
        let search = search_string_arg(args.get(0), "startsWith", context)?;
        Ok(string.as_str().starts_with(search.as_str()).into())
    }

    /// `String.prototype.substring(start, end)`: arguments clamp and swap.
    fn substring(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let string = this_string_value(this, context)?;
        let chars: Vec<char> = string.chars().collect();
        let length = chars.len() as i64;
        let finalize = |value: f64| -> i64 { (value.max(0.0) as i64).min(length) };
        let start = match args.get(0) {
            None | Some(JsValue::Undefined) => 0,
            Some(value) => finalize(value.to_integer_or_infinity(context)?),
        };
        let end = match args.get(1) {
            None | Some(JsValue::Undefined) => length,
            Some(value) => finalize(value.to_integer_or_infinity(context)?),
        };
        let (from, to) = if start <= end { (start, end) } else { (end, start) };
        Ok(JsValue::new(
            chars[from as usize..to as usize].iter().collect::<std::string::String>(),
        ))
    }

    fn to_lower_case(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let string = this_string_value(this, context)?;
        Ok(JsValue::new(string.as_str().to_lowercase()))
    }

    #[allow(clippy::wrong_self_convention)]
    fn to_string(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        Ok(this_string_value(this, context)?.into())
    }

    fn to_upper_case(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let string = this_string_value(this, context)?;
        Ok(JsValue::new(string.as_str().to_uppercase()))
    }

    fn trim(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let string = this_string_value(this, context)?;
        Ok(JsValue::new(string.trim()))
    }

    fn trim_end(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let string = this_string_value(this, context)?;
        Ok(JsValue::new(string.trim_end()))
    }

    fn trim_start(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let string = this_string_value(this, context)?;
        Ok(JsValue::new(string.trim_start()))
    }

    /// `String.prototype.valueOf()`.
    fn value_of(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        match this {
            JsValue::String(string) => Ok(string.clone().into()),
            JsValue::Object(object) => match object.borrow().as_string() {
                Some(string) => Ok(string.into()),
                None => context
                    .throw_type_error("String.prototype.valueOf called on incompatible receiver"),
            },
            _ => context
                .throw_type_error("String.prototype.valueOf called on incompatible receiver"),
        }
    }
}

fn search_string_arg(
    value: Option<&JsValue>,
    name: &str,
    context: &mut Context,
) -> JsResult<JsString> {
    if let Some(JsValue::Object(object)) = value {
        if object.borrow().data_is_regexp() {
            return context.throw_type_error(format!(
                "String.prototype.{name} does not accept a regular expression"
            ));
        }
    }
    value.cloned().unwrap_or_default().to_string(context)
}

fn pad_arguments(args: &[JsValue], context: &mut Context) -> JsResult<(usize, JsString)> {
    let target = args.get(0).cloned().unwrap_or_default().to_length(context)?;
    let filler = match args.get(1) {
        None | Some(JsValue::Undefined) => " ".into(),
        Some(value) => value.to_string(context)?,
    };
    Ok((target, filler))
}

fn relative_string_index(
    value: Option<&JsValue>,
    length: i64,
    default: i64,
    context: &mut Context,
) -> JsResult<i64> {
    let relative = match value {
        None | Some(JsValue::Undefined) => return Ok(default),
        Some(value) => value.to_integer_or_infinity(context)?,
    };
    if relative.is_infinite() {
        return Ok(if relative < 0.0 { 0 } else { length });
    }
    let relative = relative as i64;
    if relative < 0 {
        Ok((length + relative).max(0))
    } else {
        Ok(relative.min(length))
    }
}

/// Plain-string pattern replacement; a callable replacement is invoked per
/// match with `(matched, position, string)`.
fn replace_plain(
    string: &JsString,
    pattern: &JsString,
    replacement: Option<&JsValue>,
    all: bool,
    context: &mut Context,
) -> JsResult<JsValue> {
    let callable = matches!(replacement, Some(JsValue::Object(o)) if o.is_callable());
    let mut replacement_for = |position: usize, context: &mut Context| -> JsResult<std::string::String> {
        if callable {
            let function = replacement.cloned().expect("checked above");
            Ok(context
                .call(
                    &function,
                    &JsValue::undefined(),
                    &[
                        pattern.clone().into(),
                        JsValue::new(position),
                        string.clone().into(),
                    ],
                )?
                .to_string(context)?
                .to_string())
        } else {
            match replacement {
                Some(value) => Ok(value.to_string(context)?.to_string()),
                None => Ok("undefined".to_owned()),
            }
        }
    };

    // An empty pattern matches at the start (and between every code point
    // for `replaceAll`).
    if pattern.is_empty() {
        let mut result = replacement_for(0, context)?;
        if !all {
            result.push_str(string);
            return Ok(JsValue::new(result));
        }
        for (position, ch) in string.chars().enumerate() {
            result.push(ch);
            result.push_str(&replacement_for(position + 1, context)?);
        }
        return Ok(JsValue::new(result));
    }

    let mut result = std::string::String::new();
    let mut rest = string.as_str();
    let mut offset = 0usize;
    loop {
        let Some(byte_index) = rest.find(pattern.as_str()) else {
            result.push_str(rest);
            break;
        };
        result.push_str(&rest[..byte_index]);

        let position = string[..offset + byte_index].chars().count();
        let text = replacement_for(position, context)?;
        result.push_str(&text);

        let consumed = byte_index + pattern.len();
        rest = &rest[consumed..];
        offset += consumed;
        if !all {
            result.push_str(rest);
            break;
        }
    }
    Ok(JsValue::new(result))
}
