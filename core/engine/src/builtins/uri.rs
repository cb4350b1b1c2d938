//! The URI handling functions: `encodeURI(Component)`,
//! `decodeURI(Component)` and the legacy `escape`/`unescape`.

use crate::{context::Context, value::JsValue, JsResult};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};

/// Everything `encodeURIComponent` escapes: all but the unreserved marks.
const COMPONENT_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'$')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b',')
    .add(b'/')
    .add(b':')
    .add(b';')
    .add(b'<')
    .add(b'=')
    .add(b'>')
    .add(b'?')
    .add(b'@')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// `encodeURI` keeps the URI syntax characters unescaped.
const URI_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

fn input_string(args: &[JsValue], context: &mut Context) -> JsResult<String> {
    Ok(args
        .get(0)
        .cloned()
        .unwrap_or_default()
        .to_string(context)?
        .to_string())
}

pub(crate) fn encode_uri(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let input = input_string(args, context)?;
    Ok(JsValue::new(
        utf8_percent_encode(&input, URI_SET).to_string(),
    ))
}

pub(crate) fn encode_uri_component(
    _: &JsValue,
    args: &[JsValue],
    context: &mut Context,
) -> JsResult<JsValue> {
    let input = input_string(args, context)?;
    Ok(JsValue::new(
        utf8_percent_encode(&input, COMPONENT_SET).to_string(),
    ))
}

fn decode(input: &str, context: &mut Context) -> JsResult<String> {
    // Validate the escape sequences before decoding; malformed input is a
    // URIError, not garbage output.
    let bytes = input.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            if i + 2 >= bytes.len()
                || !bytes[i + 1].is_ascii_hexdigit()
                || !bytes[i + 2].is_ascii_hexdigit()
            {
                return context.throw_uri_error("URI malformed");
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    match percent_decode_str(input).decode_utf8() {
        Ok(decoded) => Ok(decoded.to_string()),
        Err(_) => context.throw_uri_error("URI malformed"),
    }
}

pub(crate) fn decode_uri(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let input = input_string(args, context)?;
    Ok(JsValue::new(decode(&input, context)?))
}

pub(crate) fn decode_uri_component(
    _: &JsValue,
    args: &[JsValue],
    context: &mut Context,
) -> JsResult<JsValue> {
    let input = input_string(args, context)?;
    Ok(JsValue::new(decode(&input, context)?))
}

/// The legacy `escape`: `%XX` for Latin-1, `%uXXXX` beyond.
pub(crate) fn escape(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let input = input_string(args, context)?;
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        let code = ch as u32;
        if ch.is_ascii_alphanumeric() || "@*_+-./".contains(ch) {
            out.push(ch);
        } else if code < 256 {
            out.push_str(&format!("%{code:02X}"));
        } else {
            out.push_str(&format!("%u{code:04X}"));
        }
    }
    Ok(JsValue::new(out))
}

/// The legacy `unescape`.
pub(crate) fn unescape(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let input = input_string(args, context)?;
    let bytes: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == '%' {
            if i + 5 < bytes.len() && bytes[i + 1] == 'u' {
                let hex: String = bytes[i + 2..i + 6].iter().collect();
                if let Ok(code) = u32::from_str_radix(&hex, 16) {
                    if let Some(ch) = char::from_u32(code) {
                        out.push(ch);
                        i += 6;
                        continue;
                    }
                }
            }
            if i + 2 < bytes.len() {
                let hex: String = bytes[i + 1..i + 3].iter().collect();
                if let Ok(code) = u32::from_str_radix(&hex, 16) {
                    if let Some(ch) = char::from_u32(code) {
                        out.push(ch);
                        i += 3;
                        continue;
                    }
                }
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    Ok(JsValue::new(out))
}
