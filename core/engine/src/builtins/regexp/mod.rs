//! This module implements the global `RegExp` object.
//!
//! The matching engine itself is the `regress` crate; this module wires it
//! into the object model and the `exec` protocol that the `String`
//! prototype methods route through.

use crate::{
    builtins::BuiltIn,
    context::Context,
    object::{ConstructorBuilder, JsObject, Object, ObjectData},
    property::{Attribute, DataDescriptor, PropertyKey},
    string::JsString,
    value::JsValue,
    JsResult,
};

/// The compiled pattern and its flags.
#[derive(Debug)]
pub struct RegExp {
    matcher: regress::Regex,
    source: String,
    flags: String,
    global: bool,
    sticky: bool,
}

impl RegExp {
    fn compile(source: &str, flags: &str, context: &mut Context) -> JsResult<Box<Self>> {
        let mut sorted: Vec<char> = flags.chars().collect();
        sorted.sort_unstable();
        sorted.dedup();
        if sorted.len() != flags.len()
            || !sorted.iter().all(|c| "dgimsuvy".contains(*c))
        {
            return context.throw_syntax_error(format!("invalid regular expression flags '{flags}'"));
        }

        // `regress` understands the syntax-relevant flags; `g`/`y` drive the
        // engine-side `lastIndex` protocol instead.
        let engine_flags: String = flags.chars().filter(|c| "imsu".contains(*c)).collect();
        let matcher = match regress::Regex::with_flags(source, engine_flags.as_str()) {
            Ok(matcher) => matcher,
            Err(error) => {
                return context.throw_syntax_error(format!(
                    "invalid regular expression /{source}/{flags}: {error}"
                ))
            }
        };
        Ok(Box::new(Self {
            matcher,
            source: source.to_owned(),
            flags: flags.to_owned(),
            global: flags.contains('g'),
            sticky: flags.contains('y'),
        }))
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct RegExpBuiltin;

impl BuiltIn for RegExpBuiltin {
    const NAME: &'static str = "RegExp";

    fn init(context: &mut Context) -> (&'static str, JsValue, Attribute) {
        let regexp = ConstructorBuilder::with_standard_object(
            context,
            Self::constructor,
            context.standard_objects().regexp_object().clone(),
        )
        .name(Self::NAME)
        .length(2)
        .method(Self::exec, "exec", 1)
        .method(Self::test, "test", 1)
        .method(Self::to_string, "toString", 0)
        .build();

        (Self::NAME, regexp.into(), Self::attribute())
    }
}

impl RegExpBuiltin {
    /// `RegExp(pattern[, flags])`, usable with and without `new`.
    fn constructor(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let (source, inherited_flags) = match args.get(0) {
            Some(JsValue::Object(object)) if object.borrow().data_is_regexp() => {
                let borrowed = object.borrow();
                let regexp = borrowed.as_regexp().expect("checked above");
                (regexp.source.clone(), Some(regexp.flags.clone()))
            }
            Some(JsValue::Undefined) | None => (String::new(), None),
            Some(value) => (value.to_string(context)?.to_string(), None),
        };
        let flags = match args.get(1) {
            None | Some(JsValue::Undefined) => inherited_flags.unwrap_or_default(),
            Some(value) => value.to_string(context)?.to_string(),
        };

        let data = RegExp::compile(&source, &flags, context)?;
        let object = if context.is_in_constructor_call() {
            match this {
                JsValue::Object(object) => object.clone(),
                _ => new_regexp_object(context),
            }
        } else {
            new_regexp_object(context)
        };
        install_regexp(&object, data);
        Ok(object.into())
    }

    /// `RegExp.prototype.exec(string)`: the single entry point every other
    /// matching method routes through.
    pub(crate) fn exec(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let JsValue::Object(object) = this else {
            return context.throw_type_error("RegExp.prototype.exec on incompatible receiver");
        };
        let input = args.get(0).cloned().unwrap_or_default().to_string(context)?;
        regexp_exec(object, &input, context)
    }

    /// `RegExp.prototype.test(string)`.
    fn test(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let result = Self::exec(this, args, context)?;
        Ok((!result.is_null()).into())
    }

    /// `RegExp.prototype.toString()`.
    #[allow(clippy::wrong_self_convention)]
    fn to_string(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let JsValue::Object(object) = this else {
            return context.throw_type_error("RegExp.prototype.toString on incompatible receiver");
        };
        let borrowed = object.borrow();
        let Some(regexp) = borrowed.as_regexp() else {
            drop(borrowed);
            return context.throw_type_error("RegExp.prototype.toString on incompatible receiver");
        };
        Ok(JsValue::new(format!("/{}/{}", regexp.source, regexp.flags)))
    }
}

fn new_regexp_object(context: &mut Context) -> JsObject {
    let prototype = context.standard_objects().regexp_object().prototype();
    JsObject::new(Object::create(prototype.into()))
}

fn install_regexp(object: &JsObject, data: Box<RegExp>) {
    let source = data.source.clone();
    let flags = data.flags.clone();
    let global = data.global;
    object.borrow_mut().data = ObjectData::RegExp(data);

    let permanent = Attribute::READONLY | Attribute::NON_ENUMERABLE | Attribute::PERMANENT;
    object.insert_property("source", source, permanent);
    object.insert_property("flags", flags, permanent);
    object.insert_property("global", global, permanent);
    object.borrow_mut().insert(
        PropertyKey::String("lastIndex".into()),
        DataDescriptor::new(0, Attribute::WRITABLE | Attribute::NON_ENUMERABLE),
    );
}

fn last_index(object: &JsObject) -> u64 {
    object
        .get_own_property(&"lastIndex".into())
        .and_then(|desc| desc.value())
        .and_then(|value| value.as_number())
        .map_or(0, |number| number.max(0.0) as u64)
}

fn set_last_index(object: &JsObject, value: u64) {
    object.borrow_mut().insert(
        PropertyKey::String("lastIndex".into()),
        DataDescriptor::new(
            JsValue::new(value),
            Attribute::WRITABLE | Attribute::NON_ENUMERABLE,
        ),
    );
}

/// The `exec` core: honors `lastIndex` for global/sticky patterns and
/// produces the match array (`index`, `input`, captures) or `null`.
pub(crate) fn regexp_exec(
    object: &JsObject,
    input: &JsString,
    context: &mut Context,
) -> JsResult<JsValue> {
    let (found, global_or_sticky) = {
        let borrowed = object.borrow();
        let Some(regexp) = borrowed.as_regexp() else {
            drop(borrowed);
            return context.throw_type_error("exec called on a non-RegExp object");
        };
        let global_or_sticky = regexp.global || regexp.sticky;
        let start = if global_or_sticky {
            last_index(object) as usize
        } else {
            0
        };
        if start > input.len() {
            (None, global_or_sticky)
        } else {
            let found = regexp.matcher.find_from(input.as_str(), start).next();
            let found = match found {
                Some(m) if regexp.sticky && m.range.start != start => None,
                other => other,
            };
            (found, global_or_sticky)
        }
    };

    let Some(found) = found else {
        if global_or_sticky {
            set_last_index(object, 0);
        }
        return Ok(JsValue::null());
    };

    let range = found.range.clone();
    if global_or_sticky {
        set_last_index(object, range.end as u64);
    }

    let mut elements = vec![JsValue::new(&input[range.start..range.end])];
    for capture in found.captures.iter() {
        elements.push(match capture {
            Some(range) => JsValue::new(&input[range.start..range.end]),
            None => JsValue::undefined(),
        });
    }

    let result = crate::builtins::array::Array::create_array(elements, context);
    if let JsValue::Object(array) = &result {
        let index = input[..range.start].chars().count();
        array.create_data_property("index", index);
        array.create_data_property("input", input.clone());
    }
    Ok(result)
}

impl RegExp {
    /// Coerces a pattern argument (`undefined`, string, or regexp object)
    /// to a regexp object, the way `String.prototype.match` needs it.
    pub(crate) fn coerce_to_regexp(
        value: Option<&JsValue>,
        context: &mut Context,
    ) -> JsResult<JsObject> {
        if let Some(JsValue::Object(object)) = value {
            if object.borrow().data_is_regexp() {
                return Ok(object.clone());
            }
        }
        let source = match value {
            None | Some(JsValue::Undefined) => String::new(),
            Some(value) => value.to_string(context)?.to_string(),
        };
        let data = Self::compile(&source, "", context)?;
        let object = new_regexp_object(context);
        install_regexp(&object, data);
        Ok(object)
    }

    /// `String.prototype.match` behavior: one exec, or every match for a
    /// global pattern.
    pub(crate) fn match_string(
        regexp: &JsObject,
        input: &JsString,
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let global = regexp.borrow().as_regexp().map_or(false, |r| r.global);
        if !global {
            return regexp_exec(regexp, input, context);
        }

        set_last_index(regexp, 0);
        let mut matches = Vec::new();
        loop {
            let result = regexp_exec(regexp, input, context)?;
            let JsValue::Object(array) = &result else {
                break;
            };
            let first = array.get(&PropertyKey::Index(0), result.clone(), context)?;
            if first.as_string().map_or(true, |s| s.is_empty()) {
                // Empty matches must advance or the loop never ends.
                set_last_index(regexp, last_index(regexp) + 1);
            }
            matches.push(first);
        }
        if matches.is_empty() {
            return Ok(JsValue::null());
        }
        Ok(crate::builtins::array::Array::create_array(matches, context))
    }

    /// `String.prototype.search` behavior.
    pub(crate) fn search_string(
        regexp: &JsObject,
        input: &JsString,
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let found = {
            let borrowed = regexp.borrow();
            let Some(data) = borrowed.as_regexp() else {
                drop(borrowed);
                return context.throw_type_error("search called on a non-RegExp object");
            };
            data.matcher.find(input.as_str()).map(|m| m.range.start)
        };
        match found {
            Some(byte_index) => Ok(JsValue::new(input[..byte_index].chars().count())),
            None => Ok(JsValue::new(-1)),
        }
    }

    /// `String.prototype.replace`/`replaceAll` behavior with a regexp
    /// pattern; a callable replacement receives `(matched, index, input)`.
    pub(crate) fn replace_string(
        regexp: &JsObject,
        input: &JsString,
        replacement: Option<&JsValue>,
        force_all: bool,
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let all = force_all || regexp.borrow().as_regexp().map_or(false, |r| r.global);
        let callable = matches!(replacement, Some(JsValue::Object(o)) if o.is_callable());

        set_last_index(regexp, 0);
        let mut result = String::new();
        let mut cursor = 0usize;
        loop {
            let found = {
                let borrowed = regexp.borrow();
                let Some(data) = borrowed.as_regexp() else {
                    break;
                };
                data.matcher.find_from(input.as_str(), cursor).next()
            };
            let Some(found) = found else {
                break;
            };
            let range = found.range.clone();
            result.push_str(&input[cursor..range.start]);

            let matched = &input[range.start..range.end];
            let text = if callable {
                let function = replacement.cloned().expect("checked above");
                let index = input[..range.start].chars().count();
                context
                    .call(
                        &function,
                        &JsValue::undefined(),
                        &[
                            JsValue::new(matched),
                            JsValue::new(index),
                            JsValue::new(input.clone()),
                        ],
                    )?
                    .to_string(context)?
                    .to_string()
            } else {
                match replacement {
                    Some(value) => value.to_string(context)?.to_string(),
                    None => "undefined".to_owned(),
                }
            };
            result.push_str(&text);

            cursor = if range.end > range.start {
                range.end
            } else {
                // Empty match: copy one code point through and continue.
                match input[range.end..].chars().next() {
                    Some(ch) => {
                        result.push(ch);
                        range.end + ch.len_utf8()
                    }
                    None => break,
                }
            };
            if !all {
                break;
            }
        }
        if cursor <= input.len() {
            result.push_str(&input[cursor..]);
        }
        Ok(JsValue::new(result))
    }

    /// `String.prototype.split` behavior with a regexp separator.
    pub(crate) fn split_string(
        regexp: &JsObject,
        input: &JsString,
        limit: u32,
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let mut pieces = Vec::new();
        let mut cursor = 0usize;
        loop {
            if pieces.len() as u32 >= limit {
                return Ok(crate::builtins::array::Array::create_array(pieces, context));
            }
            let found = {
                let borrowed = regexp.borrow();
                let Some(data) = borrowed.as_regexp() else {
                    break;
                };
                data.matcher.find_from(input.as_str(), cursor).next()
            };
            let Some(found) = found else {
                break;
            };
            let range = found.range.clone();
            if range.end == range.start && range.start >= input.len() {
                break;
            }
            if range.end == range.start && range.start == cursor {
                // Zero-width separator: take one code point and move on.
                match input[cursor..].chars().next() {
                    Some(ch) => {
                        pieces.push(JsValue::new(ch));
                        cursor += ch.len_utf8();
                        continue;
                    }
                    None => break,
                }
            }
            pieces.push(JsValue::new(&input[cursor..range.start]));
            cursor = range.end;
        }
        if (pieces.len() as u32) < limit {
            pieces.push(JsValue::new(&input[cursor..]));
        }
        Ok(crate::builtins::array::Array::create_array(pieces, context))
    }
}
