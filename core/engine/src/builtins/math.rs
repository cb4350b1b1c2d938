//! This module implements the global `Math` namespace object.

use crate::{
    builtins::BuiltIn,
    context::Context,
    object::ObjectInitializer,
    property::Attribute,
    value::JsValue,
    JsResult,
};
use rand::random;

#[derive(Debug, Clone, Copy)]
pub(crate) struct Math;

impl BuiltIn for Math {
    const NAME: &'static str = "Math";

    fn init(context: &mut Context) -> (&'static str, JsValue, Attribute) {
        let permanent = Attribute::READONLY | Attribute::NON_ENUMERABLE | Attribute::PERMANENT;
        let object = ObjectInitializer::new(context)
            .property("E", std::f64::consts::E, permanent)
            .property("LN10", std::f64::consts::LN_10, permanent)
            .property("LN2", std::f64::consts::LN_2, permanent)
            .property("LOG10E", std::f64::consts::LOG10_E, permanent)
            .property("LOG2E", std::f64::consts::LOG2_E, permanent)
            .property("PI", std::f64::consts::PI, permanent)
            .property("SQRT1_2", std::f64::consts::FRAC_1_SQRT_2, permanent)
            .property("SQRT2", std::f64::consts::SQRT_2, permanent)
            .function(Self::abs, "abs", 1)
            .function(Self::acos, "acos", 1)
            .function(Self::asin, "asin", 1)
            .function(Self::atan, "atan", 1)
            .function(Self::atan2, "atan2", 2)
            .function(Self::cbrt, "cbrt", 1)
            .function(Self::ceil, "ceil", 1)
            .function(Self::cos, "cos", 1)
            .function(Self::cosh, "cosh", 1)
            .function(Self::exp, "exp", 1)
            .function(Self::floor, "floor", 1)
            .function(Self::hypot, "hypot", 2)
            .function(Self::log, "log", 1)
            .function(Self::log10, "log10", 1)
            .function(Self::log2, "log2", 1)
            .function(Self::max, "max", 2)
            .function(Self::min, "min", 2)
            .function(Self::pow, "pow", 2)
            .function(Self::random, "random", 0)
            .function(Self::round, "round", 1)
            .function(Self::sign, "sign", 1)
            .function(Self::sin, "sin", 1)
            .function(Self::sinh, "sinh", 1)
            .function(Self::sqrt, "sqrt", 1)
            .function(Self::tan, "tan", 1)
            .function(Self::tanh, "tanh", 1)
            .function(Self::trunc, "trunc", 1)
            .build();

        (Self::NAME, object.into(), Self::attribute())
    }
}

fn first_number(args: &[JsValue], context: &mut Context) -> JsResult<f64> {
    args.get(0).cloned().unwrap_or_default().to_number(context)
}

macro_rules! unary_math {
    ($name:ident, $op:ident) => {
        fn $name(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
            Ok(JsValue::new(first_number(args, context)?.$op()))
        }
    };
}

impl Math {
    unary_math!(abs, abs);
    unary_math!(acos, acos);
    unary_math!(asin, asin);
    unary_math!(atan, atan);
    unary_math!(cbrt, cbrt);
    unary_math!(ceil, ceil);
    unary_math!(cos, cos);
    unary_math!(cosh, cosh);
    unary_math!(exp, exp);
    unary_math!(floor, floor);
    unary_math!(log10, log10);
    unary_math!(log2, log2);
    unary_math!(sin, sin);
    unary_math!(sinh, sinh);
    unary_math!(sqrt, sqrt);
    unary_math!(tan, tan);
    unary_math!(tanh, tanh);
    unary_math!(trunc, trunc);

    fn atan2(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let y = args.get(0).cloned().unwrap_or_default().to_number(context)?;
        let x = args.get(1).cloned().unwrap_or_default().to_number(context)?;
        Ok(JsValue::new(y.atan2(x)))
    }

    fn hypot(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let mut sum = 0.0f64;
        for arg in args {
            let number = arg.to_number(context)?;
            sum += number * number;
        }
        Ok(JsValue::new(sum.sqrt()))
    }

    /// `Math.log(x)`: the natural logarithm.
    fn log(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        Ok(JsValue::new(first_number(args, context)?.ln()))
    }

    /// `Math.max(...values)`: `NaN` wins, the empty call is `-Infinity`.
    fn max(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let mut best = f64::NEG_INFINITY;
        for arg in args {
            let number = arg.to_number(context)?;
            if number.is_nan() {
                return Ok(JsValue::nan());
            }
            if number > best || (number == 0.0 && best == 0.0 && number.is_sign_positive()) {
                best = number;
            }
        }
        Ok(JsValue::new(best))
    }

    fn min(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let mut best = f64::INFINITY;
        for arg in args {
            let number = arg.to_number(context)?;
            if number.is_nan() {
                return Ok(JsValue::nan());
            }
            if number < best || (number == 0.0 && best == 0.0 && number.is_sign_negative()) {
                best = number;
            }
        }
        Ok(JsValue::new(best))
    }

    fn pow(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let base = args.get(0).cloned().unwrap_or_default().to_number(context)?;
        let exponent = args.get(1).cloned().unwrap_or_default().to_number(context)?;
        Ok(JsValue::new(base.powf(exponent)))
    }

    fn random(_: &JsValue, _: &[JsValue], _context: &mut Context) -> JsResult<JsValue> {
        Ok(JsValue::new(random::<f64>()))
    }

    /// `Math.round(x)`: halves round toward `+Infinity`.
    fn round(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let number = first_number(args, context)?;
        Ok(JsValue::new((number + 0.5).floor()))
    }

    fn sign(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let number = first_number(args, context)?;
        if number.is_nan() || number == 0.0 {
            return Ok(JsValue::new(number));
        }
        Ok(JsValue::new(number.signum()))
    }
}
