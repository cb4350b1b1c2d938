//! This module implements the global `Number` object, the numeric
//! formatting/parsing helpers and the global `parseInt`/`parseFloat`/
//! `isNaN`/`isFinite` functions.

#[cfg(test)]
mod tests;

use crate::{
    builtins::BuiltIn,
    context::Context,
    object::{ConstructorBuilder, JsObject, Object, ObjectData},
    property::Attribute,
    value::JsValue,
    JsResult,
};

/// The largest integer exactly representable as an `f64`.
pub const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

pub const MIN_SAFE_INTEGER: f64 = -MAX_SAFE_INTEGER;

pub const EPSILON: f64 = f64::EPSILON;

#[derive(Debug, Clone, Copy)]
pub(crate) struct Number;

impl BuiltIn for Number {
    const NAME: &'static str = "Number";

    fn init(context: &mut Context) -> (&'static str, JsValue, Attribute) {
        let permanent = Attribute::READONLY | Attribute::NON_ENUMERABLE | Attribute::PERMANENT;
        let number = ConstructorBuilder::with_standard_object(
            context,
            Self::constructor,
            context.standard_objects().number_object().clone(),
        )
        .name(Self::NAME)
        .length(1)
        .static_property("MAX_SAFE_INTEGER", MAX_SAFE_INTEGER, permanent)
        .static_property("MIN_SAFE_INTEGER", MIN_SAFE_INTEGER, permanent)
        .static_property("MAX_VALUE", f64::MAX, permanent)
        .static_property("MIN_VALUE", f64::MIN_POSITIVE, permanent)
        .static_property("EPSILON", EPSILON, permanent)
        .static_property("NaN", f64::NAN, permanent)
        .static_property("POSITIVE_INFINITY", f64::INFINITY, permanent)
        .static_property("NEGATIVE_INFINITY", f64::NEG_INFINITY, permanent)
        .static_method(Self::number_is_nan, "isNaN", 1)
        .static_method(Self::number_is_finite, "isFinite", 1)
        .static_method(Self::number_is_integer, "isInteger", 1)
        .static_method(Self::number_is_safe_integer, "isSafeInteger", 1)
        .static_method(parse_int, "parseInt", 2)
        .static_method(parse_float, "parseFloat", 1)
        .method(Self::to_fixed, "toFixed", 1)
        .method(Self::to_precision, "toPrecision", 1)
        .method(Self::to_string, "toString", 1)
        .method(Self::value_of, "valueOf", 0)
        .build();

        (Self::NAME, number.into(), Self::attribute())
    }
}

impl Number {
    /// `Number([value])`: explicit `Number(bigint)` is the sanctioned lossy
    /// path.
    fn constructor(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let number = match args.get(0) {
            None => 0.0,
            Some(JsValue::BigInt(bigint)) => bigint.to_f64(),
            Some(value) => value.to_number(context)?,
        };
        if context.is_in_constructor_call() {
            if let JsValue::Object(object) = this {
                object.borrow_mut().data = ObjectData::Number(number);
                return Ok(this.clone());
            }
            let prototype = context.standard_objects().number_object().prototype();
            return Ok(JsObject::new(Object::with_prototype(
                prototype.into(),
                ObjectData::Number(number),
            ))
            .into());
        }
        Ok(JsValue::new(number))
    }

    /// `Number.isNaN(value)`: no coercion, unlike the global `isNaN`.
    fn number_is_nan(_: &JsValue, args: &[JsValue], _context: &mut Context) -> JsResult<JsValue> {
        Ok(matches!(args.get(0).and_then(JsValue::as_number), Some(n) if n.is_nan()).into())
    }

    fn number_is_finite(_: &JsValue, args: &[JsValue], _context: &mut Context) -> JsResult<JsValue> {
        Ok(matches!(args.get(0).and_then(JsValue::as_number), Some(n) if n.is_finite()).into())
    }

    fn number_is_integer(_: &JsValue, args: &[JsValue], _context: &mut Context) -> JsResult<JsValue> {
        Ok(args.get(0).map_or(false, JsValue::is_integral_number).into())
    }

    fn number_is_safe_integer(
        _: &JsValue,
        args: &[JsValue],
        _context: &mut Context,
    ) -> JsResult<JsValue> {
        let safe = match args.get(0) {
            Some(value) if value.is_integral_number() => value
                .as_number()
                .map_or(false, |n| n.abs() <= MAX_SAFE_INTEGER),
            _ => false,
        };
        Ok(safe.into())
    }

    /// `Number.prototype.toFixed(digits)`.
    fn to_fixed(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let number = this_number_value(this, context)?;
        let digits = args
            .get(0)
            .cloned()
            .unwrap_or_default()
            .to_integer_or_infinity(context)?;
        if !(0.0..=100.0).contains(&digits) {
            return context.throw_range_error("toFixed() digits argument must be between 0 and 100");
        }
        if !number.is_finite() {
            return Ok(JsValue::new(to_native_string(number)));
        }
        Ok(JsValue::new(format!("{:.*}", digits as usize, number)))
    }

    /// `Number.prototype.toPrecision(precision)`.
    fn to_precision(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let number = this_number_value(this, context)?;
        let precision = match args.get(0) {
            None | Some(JsValue::Undefined) => {
                return Ok(JsValue::new(to_native_string(number)))
            }
            Some(value) => value.to_integer_or_infinity(context)?,
        };
        if !(1.0..=100.0).contains(&precision) {
            return context
                .throw_range_error("toPrecision() argument must be between 1 and 100");
        }
        if !number.is_finite() || number == 0.0 {
            return Ok(JsValue::new(to_native_string(number)));
        }
        // Significant digits: the fractional precision depends on the
        // magnitude of the number.
        let exponent = number.abs().log10().floor() as i64;
        let decimals = (precision as i64 - 1 - exponent).max(0) as usize;
        Ok(JsValue::new(format!("{:.*}", decimals, number)))
    }

    /// `Number.prototype.toString([radix])`.
    #[allow(clippy::wrong_self_convention)]
    fn to_string(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let number = this_number_value(this, context)?;
        let radix = match args.get(0) {
            None | Some(JsValue::Undefined) => 10,
            Some(value) => value.to_integer_or_infinity(context)? as i64,
        };
        if !(2..=36).contains(&radix) {
            return context
                .throw_range_error("toString() radix argument must be between 2 and 36");
        }
        if radix == 10 {
            return Ok(JsValue::new(to_native_string(number)));
        }
        Ok(JsValue::new(to_string_radix(number, radix as u32)))
    }

    /// `Number.prototype.valueOf()`.
    fn value_of(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        Ok(JsValue::new(this_number_value(this, context)?))
    }
}

fn this_number_value(this: &JsValue, context: &mut Context) -> JsResult<f64> {
    if let Some(number) = this.as_number() {
        return Ok(number);
    }
    if let JsValue::Object(object) = this {
        if let ObjectData::Number(number) = object.borrow().data {
            return Ok(number);
        }
    }
    context.throw_type_error("Number.prototype method called on incompatible receiver")
}

// === Formatting and parsing helpers shared with `value` ===

/// `Number::toString(10)` per ECMA-262: shortest round-trip form, exponent
/// notation from 1e21, `-0` rendered as `0`.
pub fn to_native_string(number: f64) -> String {
    if number.is_nan() {
        return "NaN".to_owned();
    }
    if number == 0.0 {
        return "0".to_owned();
    }
    if number.is_infinite() {
        return if number > 0.0 { "Infinity" } else { "-Infinity" }.to_owned();
    }
    let mut buffer = ryu_js::Buffer::new();
    buffer.format(number).to_owned()
}

/// Integer-to-digits rendering for `toString(radix)`; the fractional part
/// is rendered to a bounded number of digits.
fn to_string_radix(mut number: f64, radix: u32) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    if number.is_nan() {
        return "NaN".to_owned();
    }
    if number.is_infinite() {
        return if number > 0.0 { "Infinity" } else { "-Infinity" }.to_owned();
    }

    let negative = number < 0.0;
    if negative {
        number = -number;
    }

    let mut integer = number.trunc();
    let mut fraction = number.fract();

    let mut digits = Vec::new();
    if integer == 0.0 {
        digits.push(b'0');
    }
    while integer >= 1.0 {
        let digit = (integer % f64::from(radix)) as usize;
        digits.push(DIGITS[digit]);
        integer = (integer / f64::from(radix)).trunc();
    }
    digits.reverse();

    let mut result = String::from_utf8(digits).expect("radix digits are ascii");
    if fraction > 0.0 {
        result.push('.');
        for _ in 0..20 {
            fraction *= f64::from(radix);
            let digit = fraction.trunc() as usize;
            result.push(DIGITS[digit] as char);
            fraction = fraction.fract();
            if fraction == 0.0 {
                break;
            }
        }
    }

    if negative {
        format!("-{result}")
    } else {
        result
    }
}

/// `ToNumber` applied to the string type: trimmed, `""` is `+0`, `0x`/`0o`/
/// `0b` literals, `Infinity`, and the decimal grammar; anything else is
/// `NaN`.
pub fn string_to_number(string: &str) -> f64 {
    let trimmed = string.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    match trimmed.as_bytes() {
        [b'0', b'x' | b'X', digits @ ..] => return radix_digits_to_number(digits, 16),
        [b'0', b'o' | b'O', digits @ ..] => return radix_digits_to_number(digits, 8),
        [b'0', b'b' | b'B', digits @ ..] => return radix_digits_to_number(digits, 2),
        _ => {}
    }

    let (sign, unsigned) = match trimmed.as_bytes() {
        [b'+', ..] => (1.0, &trimmed[1..]),
        [b'-', ..] => (-1.0, &trimmed[1..]),
        _ => (1.0, trimmed),
    };
    if unsigned == "Infinity" {
        return sign * f64::INFINITY;
    }
    if !is_decimal_literal(unsigned) {
        return f64::NAN;
    }
    match fast_float::parse::<f64, _>(trimmed) {
        Ok(number) => number,
        Err(_) => f64::NAN,
    }
}

/// The `StrUnsignedDecimalLiteral` grammar, which `fast-float` alone is too
/// permissive for (`inf`, `nan`, trailing junk).
fn is_decimal_literal(s: &str) -> bool {
    let bytes = s.as_bytes();
    let mut i = 0;
    let mut digits_before = 0;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
        digits_before += 1;
    }
    let mut digits_after = 0;
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
            digits_after += 1;
        }
    }
    if digits_before == 0 && digits_after == 0 {
        return false;
    }
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        i += 1;
        if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
            i += 1;
        }
        let mut exponent_digits = 0;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
            exponent_digits += 1;
        }
        if exponent_digits == 0 {
            return false;
        }
    }
    i == bytes.len()
}

fn radix_digits_to_number(digits: &[u8], radix: u32) -> f64 {
    if digits.is_empty() {
        return f64::NAN;
    }
    let mut value = 0.0f64;
    for &byte in digits {
        let digit = match (byte as char).to_digit(radix) {
            Some(digit) => digit,
            None => return f64::NAN,
        };
        value = value * f64::from(radix) + f64::from(digit);
    }
    value
}

/// `ToInt32`.
pub fn f64_to_int32(number: f64) -> i32 {
    if !number.is_finite() || number == 0.0 {
        return 0;
    }
    let number = number.trunc();
    let bits = number.rem_euclid(4_294_967_296.0) as u32;
    bits as i32
}

/// `ToUint32`.
pub fn f64_to_uint32(number: f64) -> u32 {
    if !number.is_finite() || number == 0.0 {
        return 0;
    }
    let number = number.trunc();
    number.rem_euclid(4_294_967_296.0) as u32
}

// === Global functions ===

/// The global `parseInt(string, radix)`: leading whitespace skipped, a
/// `0x` prefix selects base 16, parsing stops at the first invalid digit.
pub(crate) fn parse_int(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let input = args.get(0).cloned().unwrap_or_default().to_string(context)?;
    let mut radix = args.get(1).cloned().unwrap_or_default().to_i32(context)?;

    let mut s = input.trim_start();
    let mut sign = 1.0;
    if let Some(rest) = s.strip_prefix('-') {
        sign = -1.0;
        s = rest;
    } else if let Some(rest) = s.strip_prefix('+') {
        s = rest;
    }

    if radix == 0 {
        if s.starts_with("0x") || s.starts_with("0X") {
            radix = 16;
            s = &s[2..];
        } else {
            radix = 10;
        }
    } else if radix == 16 && (s.starts_with("0x") || s.starts_with("0X")) {
        s = &s[2..];
    } else if !(2..=36).contains(&radix) {
        return Ok(JsValue::nan());
    }

    let mut value = 0.0f64;
    let mut any = false;
    for ch in s.chars() {
        match ch.to_digit(radix as u32) {
            Some(digit) => {
                value = value * f64::from(radix) + f64::from(digit);
                any = true;
            }
            None => break,
        }
    }
    if !any {
        return Ok(JsValue::nan());
    }
    Ok(JsValue::new(sign * value))
}

/// The global `parseFloat(string)`: parses the longest decimal prefix.
pub(crate) fn parse_float(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let input = args.get(0).cloned().unwrap_or_default().to_string(context)?;
    let s = input.trim_start();

    let (sign, unsigned) = match s.as_bytes() {
        [b'+', ..] => (1.0, &s[1..]),
        [b'-', ..] => (-1.0, &s[1..]),
        _ => (1.0, s),
    };
    if unsigned.starts_with("Infinity") {
        return Ok(JsValue::new(sign * f64::INFINITY));
    }

    match fast_float::parse_partial::<f64, _>(s) {
        Ok((number, consumed)) if consumed > 0 => {
            // `fast-float` accepts forms the grammar rejects.
            let parsed = &s[..consumed];
            if parsed.contains('i') || parsed.contains('I') || parsed.contains('n') {
                Ok(JsValue::nan())
            } else {
                Ok(JsValue::new(number))
            }
        }
        _ => Ok(JsValue::nan()),
    }
}

/// The global `isNaN(value)`: coerces, unlike `Number.isNaN`.
pub(crate) fn global_is_nan(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let number = args.get(0).cloned().unwrap_or_default().to_number(context)?;
    Ok(number.is_nan().into())
}

/// The global `isFinite(value)`.
pub(crate) fn global_is_finite(
    _: &JsValue,
    args: &[JsValue],
    context: &mut Context,
) -> JsResult<JsValue> {
    let number = args.get(0).cloned().unwrap_or_default().to_number(context)?;
    Ok(number.is_finite().into())
}
