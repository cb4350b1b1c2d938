use super::{same_value, same_value_zero, JsValue, PreferredType};
use crate::Context;

#[test]
fn strict_equality_distinguishes_types() {
    assert!(JsValue::new(1).strict_equals(&JsValue::new(1.0)));
    assert!(!JsValue::new(1).strict_equals(&JsValue::new("1")));
    assert!(!JsValue::undefined().strict_equals(&JsValue::null()));
    assert!(JsValue::new("a").strict_equals(&JsValue::new("a")));
}

#[test]
fn nan_is_not_strictly_equal_to_itself() {
    let nan = JsValue::nan();
    assert!(!nan.strict_equals(&nan));
}

#[test]
fn positive_and_negative_zero_are_strictly_equal() {
    assert!(JsValue::new(0.0).strict_equals(&JsValue::new(-0.0)));
}

#[test]
fn same_value_lattice() {
    // SameValue(NaN, NaN) = true, SameValue(+0, -0) = false.
    assert!(same_value(&JsValue::nan(), &JsValue::nan()));
    assert!(!same_value(&JsValue::new(0.0), &JsValue::new(-0.0)));
    // SameValueZero(NaN, NaN) = true, SameValueZero(+0, -0) = true.
    assert!(same_value_zero(&JsValue::nan(), &JsValue::nan()));
    assert!(same_value_zero(&JsValue::new(0.0), &JsValue::new(-0.0)));
}

#[test]
fn abstract_equality_coercion_ladder() {
    let mut context = Context::new();
    let check = |a: JsValue, b: JsValue, expected: bool, context: &mut Context| {
        assert_eq!(a.equals(&b, context).unwrap(), expected, "{} == {}", a.display(), b.display());
    };
    check(JsValue::null(), JsValue::undefined(), true, &mut context);
    check(JsValue::new(1), JsValue::new("1"), true, &mut context);
    check(JsValue::new(true), JsValue::new(1), true, &mut context);
    check(JsValue::new(false), JsValue::new(""), true, &mut context);
    check(JsValue::new(0), JsValue::null(), false, &mut context);
}

#[test]
fn to_number_on_strings() {
    let mut context = Context::new();
    let number = |s: &str, context: &mut Context| JsValue::new(s).to_number(context).unwrap();

    assert_eq!(number("", &mut context), 0.0);
    assert_eq!(number("  42  ", &mut context), 42.0);
    assert_eq!(number("0x10", &mut context), 16.0);
    assert_eq!(number("3.5e2", &mut context), 350.0);
    assert_eq!(number("-12", &mut context), -12.0);
    assert_eq!(number("Infinity", &mut context), f64::INFINITY);
    assert!(number("42abc", &mut context).is_nan());
    assert!(number("nan", &mut context).is_nan());
    assert!(number("inf", &mut context).is_nan());
}

#[test]
fn to_number_of_undefined_is_nan() {
    let mut context = Context::new();
    assert!(JsValue::undefined().to_number(&mut context).unwrap().is_nan());
    assert_eq!(JsValue::null().to_number(&mut context).unwrap(), 0.0);
}

#[test]
fn to_string_of_numbers() {
    let mut context = Context::new();
    let text = |v: JsValue, context: &mut Context| v.to_string(context).unwrap().to_string();

    assert_eq!(text(JsValue::nan(), &mut context), "NaN");
    assert_eq!(text(JsValue::new(0.0), &mut context), "0");
    assert_eq!(text(JsValue::new(-0.0), &mut context), "0");
    assert_eq!(text(JsValue::new(1.5), &mut context), "1.5");
    // Exponential form starts at 1e21.
    assert_eq!(text(JsValue::new(1e21), &mut context), "1e+21");
    assert_eq!(text(JsValue::positive_infinity(), &mut context), "Infinity");
}

#[test]
fn to_boolean_table() {
    assert!(!JsValue::undefined().to_boolean());
    assert!(!JsValue::null().to_boolean());
    assert!(!JsValue::new(0).to_boolean());
    assert!(!JsValue::nan().to_boolean());
    assert!(!JsValue::new("").to_boolean());
    assert!(JsValue::new(" ").to_boolean());
    assert!(JsValue::new(1).to_boolean());
    assert!(JsValue::new(-1.5).to_boolean());
}

#[test]
fn symbol_conversions_throw_type_errors() {
    let mut context = Context::new();
    let symbol = JsValue::Symbol(context.construct_symbol(None));
    assert!(symbol.to_number(&mut context).is_err());
    assert!(symbol.to_string(&mut context).is_err());
}

#[test]
fn bigint_arithmetic_never_mixes_with_numbers() {
    let mut context = Context::new();
    let bigint = JsValue::new(crate::bigint::JsBigInt::new(7));
    let number = JsValue::new(1);
    assert!(bigint.add(&number, &mut context).is_err());
    // Explicit Number(bigint) is the sanctioned lossy path.
    assert!(bigint.to_number(&mut context).is_err());
}

#[test]
fn to_primitive_consults_value_of_for_number_hint() {
    let mut context = Context::new();
    let result = context
        .eval("({ valueOf: function() { return 5; } })")
        .unwrap();
    let primitive = result
        .to_primitive(&mut context, PreferredType::Number)
        .unwrap();
    assert_eq!(primitive.as_number(), Some(5.0));
}

#[test]
fn to_integer_or_infinity_truncates() {
    let mut context = Context::new();
    assert_eq!(
        JsValue::new(3.9).to_integer_or_infinity(&mut context).unwrap(),
        3.0
    );
    assert_eq!(
        JsValue::new(-3.9).to_integer_or_infinity(&mut context).unwrap(),
        -3.0
    );
    assert_eq!(JsValue::nan().to_integer_or_infinity(&mut context).unwrap(), 0.0);
}

#[test]
fn rational_arithmetic_is_ieee_double() {
    let mut context = Context::new();
    let sum = JsValue::new(0.1)
        .add(&JsValue::new(0.2), &mut context)
        .unwrap();
    let sum = sum.as_number().unwrap();
    assert!(float_cmp::approx_eq!(f64, sum, 0.3, ulps = 2));
    assert_ne!(sum, 0.3);
}

#[test]
fn to_int32_wraps() {
    let mut context = Context::new();
    assert_eq!(JsValue::new(4294967296.0f64).to_i32(&mut context).unwrap(), 0);
    assert_eq!(JsValue::new(2147483648.0f64).to_i32(&mut context).unwrap(), -2147483648);
    assert_eq!(JsValue::new(-1).to_u32(&mut context).unwrap(), 4294967295);
}
