use super::{f64_to_int32, f64_to_uint32, string_to_number, to_native_string};
use crate::Context;

fn eval_display(context: &mut Context, source: &str) -> String {
    context
        .eval(source)
        .unwrap_or_else(|error| panic!("{source} threw {}", error.display()))
        .display()
        .to_string()
}

#[test]
fn parse_int_boundaries() {
    let mut context = Context::new();
    assert_eq!(eval_display(&mut context, "parseInt('0x10')"), "16");
    assert_eq!(eval_display(&mut context, "parseInt('10', 2)"), "2");
    assert_eq!(eval_display(&mut context, "parseInt('')"), "NaN");
    assert_eq!(eval_display(&mut context, "parseInt('  42abc')"), "42");
    assert_eq!(eval_display(&mut context, "parseInt('-7')"), "-7");
    assert_eq!(eval_display(&mut context, "parseInt('9', 1)"), "NaN");
}

#[test]
fn parse_float_boundaries() {
    let mut context = Context::new();
    assert_eq!(eval_display(&mut context, "parseFloat('3.5rest')"), "3.5");
    assert_eq!(eval_display(&mut context, "parseFloat('  -2e2')"), "-200");
    assert_eq!(eval_display(&mut context, "parseFloat('Infinity')"), "Infinity");
    assert_eq!(eval_display(&mut context, "parseFloat('x')"), "NaN");
}

#[test]
fn global_is_nan_coerces_but_number_is_nan_does_not() {
    let mut context = Context::new();
    assert_eq!(eval_display(&mut context, "Number.isNaN(NaN)"), "true");
    assert_eq!(eval_display(&mut context, "Number.isNaN('NaN')"), "false");
    assert_eq!(eval_display(&mut context, "isNaN('NaN')"), "true");
    assert_eq!(eval_display(&mut context, "isNaN('42')"), "false");
    assert_eq!(eval_display(&mut context, "isFinite('42')"), "true");
    assert_eq!(eval_display(&mut context, "Number.isFinite('42')"), "false");
}

#[test]
fn number_constructor_and_bigint_conversion() {
    let mut context = Context::new();
    assert_eq!(eval_display(&mut context, "Number('8')"), "8");
    assert_eq!(eval_display(&mut context, "Number(BigInt('9007199254740993'))"), "9007199254740992");
    assert_eq!(eval_display(&mut context, "Number(true)"), "1");
}

#[test]
fn to_string_with_radix() {
    let mut context = Context::new();
    assert_eq!(eval_display(&mut context, "(255).toString(16)"), "ff");
    assert_eq!(eval_display(&mut context, "(8).toString(2)"), "1000");
    assert_eq!(
        eval_display(
            &mut context,
            "try { (1).toString(37); } catch (e) { e.name }"
        ),
        "RangeError"
    );
}

#[test]
fn to_fixed_validates_digits() {
    let mut context = Context::new();
    assert_eq!(eval_display(&mut context, "(3.14159).toFixed(2)"), "3.14");
    assert_eq!(
        eval_display(&mut context, "try { (1).toFixed(101); } catch (e) { e.name }"),
        "RangeError"
    );
}

#[test]
fn native_string_forms() {
    assert_eq!(to_native_string(f64::NAN), "NaN");
    assert_eq!(to_native_string(0.0), "0");
    assert_eq!(to_native_string(-0.0), "0");
    assert_eq!(to_native_string(1e21), "1e+21");
    assert_eq!(to_native_string(-1.5), "-1.5");
    assert_eq!(to_native_string(f64::INFINITY), "Infinity");
}

#[test]
fn string_to_number_grammar() {
    assert_eq!(string_to_number(""), 0.0);
    assert_eq!(string_to_number("  42  "), 42.0);
    assert_eq!(string_to_number("0x10"), 16.0);
    assert_eq!(string_to_number("0b101"), 5.0);
    assert_eq!(string_to_number("0o17"), 15.0);
    assert_eq!(string_to_number(".5"), 0.5);
    assert!(string_to_number("0x").is_nan());
    assert!(string_to_number("1 2").is_nan());
}

#[test]
fn int32_wrapping() {
    assert_eq!(f64_to_int32(0.0), 0);
    assert_eq!(f64_to_int32(f64::NAN), 0);
    assert_eq!(f64_to_int32(4294967296.0), 0);
    assert_eq!(f64_to_int32(2147483648.0), i32::MIN);
    assert_eq!(f64_to_int32(-1.0), -1);
    assert_eq!(f64_to_uint32(-1.0), u32::MAX);
}
