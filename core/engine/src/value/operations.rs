//! Operator semantics over values, consumed by the interpreter.

use super::{JsValue, Numeric, PreferredType};
use crate::builtins::number::{f64_to_int32, f64_to_uint32};
use crate::{bigint::JsBigInt, context::Context, object::JsObject, JsResult};

/// The result of the abstract relational comparison: `Undefined` means one
/// operand was `NaN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbstractRelation {
    True,
    False,
    Undefined,
}

impl From<bool> for AbstractRelation {
    fn from(value: bool) -> Self {
        if value {
            Self::True
        } else {
            Self::False
        }
    }
}

impl JsValue {
    /// The `+` operator: string concatenation when either side prefers it,
    /// numeric addition otherwise.
    pub fn add(&self, other: &Self, context: &mut Context) -> JsResult<JsValue> {
        let x = self.to_primitive(context, PreferredType::Default)?;
        let y = other.to_primitive(context, PreferredType::Default)?;

        if x.is_string() || y.is_string() {
            let x = x.to_string(context)?;
            let y = y.to_string(context)?;
            let mut result = String::with_capacity(x.len() + y.len());
            result.push_str(&x);
            result.push_str(&y);
            return Ok(JsValue::new(result));
        }

        match (x.to_numeric(context)?, y.to_numeric(context)?) {
            (Numeric::Number(x), Numeric::Number(y)) => Ok(JsValue::new(x + y)),
            (Numeric::BigInt(x), Numeric::BigInt(y)) => {
                Ok(JsValue::new(JsBigInt::add(&x, &y)))
            }
            _ => context.throw_type_error("cannot mix BigInt and other types in addition"),
        }
    }

    /// The `-` operator.
    pub fn sub(&self, other: &Self, context: &mut Context) -> JsResult<JsValue> {
        match (self.to_numeric(context)?, other.to_numeric(context)?) {
            (Numeric::Number(x), Numeric::Number(y)) => Ok(JsValue::new(x - y)),
            (Numeric::BigInt(x), Numeric::BigInt(y)) => {
                Ok(JsValue::new(JsBigInt::sub(&x, &y)))
            }
            _ => context.throw_type_error("cannot mix BigInt and other types in subtraction"),
        }
    }

    /// The `*` operator.
    pub fn mul(&self, other: &Self, context: &mut Context) -> JsResult<JsValue> {
        match (self.to_numeric(context)?, other.to_numeric(context)?) {
            (Numeric::Number(x), Numeric::Number(y)) => Ok(JsValue::new(x * y)),
            (Numeric::BigInt(x), Numeric::BigInt(y)) => {
                Ok(JsValue::new(JsBigInt::mul(&x, &y)))
            }
            _ => context.throw_type_error("cannot mix BigInt and other types in multiplication"),
        }
    }

    /// The `/` operator.
    pub fn div(&self, other: &Self, context: &mut Context) -> JsResult<JsValue> {
        match (self.to_numeric(context)?, other.to_numeric(context)?) {
            (Numeric::Number(x), Numeric::Number(y)) => Ok(JsValue::new(x / y)),
            (Numeric::BigInt(x), Numeric::BigInt(y)) => match JsBigInt::div(&x, &y) {
                Some(result) => Ok(JsValue::new(result)),
                None => context.throw_range_error("BigInt division by zero"),
            },
            _ => context.throw_type_error("cannot mix BigInt and other types in division"),
        }
    }

    /// The `%` operator.
    pub fn rem(&self, other: &Self, context: &mut Context) -> JsResult<JsValue> {
        match (self.to_numeric(context)?, other.to_numeric(context)?) {
            (Numeric::Number(x), Numeric::Number(y)) => Ok(JsValue::new(x % y)),
            (Numeric::BigInt(x), Numeric::BigInt(y)) => match JsBigInt::rem(&x, &y) {
                Some(result) => Ok(JsValue::new(result)),
                None => context.throw_range_error("BigInt division by zero"),
            },
            _ => context.throw_type_error("cannot mix BigInt and other types in remainder"),
        }
    }

    /// The `**` operator.
    pub fn pow(&self, other: &Self, context: &mut Context) -> JsResult<JsValue> {
        match (self.to_numeric(context)?, other.to_numeric(context)?) {
            (Numeric::Number(x), Numeric::Number(y)) => Ok(JsValue::new(x.powf(y))),
            (Numeric::BigInt(x), Numeric::BigInt(y)) => match JsBigInt::pow(&x, &y) {
                Some(result) => Ok(JsValue::new(result)),
                None => context.throw_range_error("BigInt negative exponent"),
            },
            _ => context.throw_type_error("cannot mix BigInt and other types in exponentiation"),
        }
    }

    /// The `&` operator.
    pub fn bitand(&self, other: &Self, context: &mut Context) -> JsResult<JsValue> {
        match (self.to_numeric(context)?, other.to_numeric(context)?) {
            (Numeric::Number(x), Numeric::Number(y)) => {
                Ok(JsValue::new(f64_to_int32(x) & f64_to_int32(y)))
            }
            (Numeric::BigInt(x), Numeric::BigInt(y)) => {
                Ok(JsValue::new(JsBigInt::new(x.as_inner() & y.as_inner())))
            }
            _ => context.throw_type_error("cannot mix BigInt and other types in bitwise and"),
        }
    }

    /// The `|` operator.
    pub fn bitor(&self, other: &Self, context: &mut Context) -> JsResult<JsValue> {
        match (self.to_numeric(context)?, other.to_numeric(context)?) {
            (Numeric::Number(x), Numeric::Number(y)) => {
                Ok(JsValue::new(f64_to_int32(x) | f64_to_int32(y)))
            }
            (Numeric::BigInt(x), Numeric::BigInt(y)) => {
                Ok(JsValue::new(JsBigInt::new(x.as_inner() | y.as_inner())))
            }
            _ => context.throw_type_error("cannot mix BigInt and other types in bitwise or"),
        }
    }

    /// The `^` operator.
    pub fn bitxor(&self, other: &Self, context: &mut Context) -> JsResult<JsValue> {
        match (self.to_numeric(context)?, other.to_numeric(context)?) {
            (Numeric::Number(x), Numeric::Number(y)) => {
                Ok(JsValue::new(f64_to_int32(x) ^ f64_to_int32(y)))
            }
            (Numeric::BigInt(x), Numeric::BigInt(y)) => {
                Ok(JsValue::new(JsBigInt::new(x.as_inner() ^ y.as_inner())))
            }
            _ => context.throw_type_error("cannot mix BigInt and other types in bitwise xor"),
        }
    }

    /// The `<<` operator.
    pub fn shl(&self, other: &Self, context: &mut Context) -> JsResult<JsValue> {
        match (self.to_numeric(context)?, other.to_numeric(context)?) {
            (Numeric::Number(x), Numeric::Number(y)) => Ok(JsValue::new(
                f64_to_int32(x).wrapping_shl(f64_to_uint32(y) % 32),
            )),
            _ => context.throw_type_error("BigInt shifts are not supported"),
        }
    }

    /// The `>>` operator.
    pub fn shr(&self, other: &Self, context: &mut Context) -> JsResult<JsValue> {
        match (self.to_numeric(context)?, other.to_numeric(context)?) {
            (Numeric::Number(x), Numeric::Number(y)) => Ok(JsValue::new(
                f64_to_int32(x).wrapping_shr(f64_to_uint32(y) % 32),
            )),
            _ => context.throw_type_error("BigInt shifts are not supported"),
        }
    }

    /// The `>>>` operator.
    pub fn ushr(&self, other: &Self, context: &mut Context) -> JsResult<JsValue> {
        match (self.to_numeric(context)?, other.to_numeric(context)?) {
            (Numeric::Number(x), Numeric::Number(y)) => Ok(JsValue::new(
                f64_to_uint32(x).wrapping_shr(f64_to_uint32(y) % 32),
            )),
            _ => {
                context.throw_type_error("BigInt has no unsigned right shift, use >> instead")
            }
        }
    }

    /// Unary `-`.
    pub fn neg(&self, context: &mut Context) -> JsResult<JsValue> {
        match self.to_numeric(context)? {
            Numeric::Number(number) => Ok(JsValue::new(-number)),
            Numeric::BigInt(bigint) => Ok(JsValue::new(JsBigInt::neg(&bigint))),
        }
    }

    /// Unary `~`.
    pub fn bitnot(&self, context: &mut Context) -> JsResult<JsValue> {
        match self.to_numeric(context)? {
            Numeric::Number(number) => Ok(JsValue::new(!f64_to_int32(number))),
            Numeric::BigInt(bigint) => Ok(JsValue::new(JsBigInt::new(!bigint.as_inner()))),
        }
    }

    /// Abstract relational comparison, the shared core of `< <= > >=`.
    pub fn abstract_relation(
        &self,
        other: &Self,
        left_first: bool,
        context: &mut Context,
    ) -> JsResult<AbstractRelation> {
        let (px, py) = if left_first {
            let px = self.to_primitive(context, PreferredType::Number)?;
            let py = other.to_primitive(context, PreferredType::Number)?;
            (px, py)
        } else {
            let py = other.to_primitive(context, PreferredType::Number)?;
            let px = self.to_primitive(context, PreferredType::Number)?;
            (px, py)
        };

        if let (Some(x), Some(y)) = (px.as_string(), py.as_string()) {
            return Ok((x.as_str() < y.as_str()).into());
        }

        match (px.to_numeric(context)?, py.to_numeric(context)?) {
            (Numeric::Number(x), Numeric::Number(y)) => {
                if x.is_nan() || y.is_nan() {
                    Ok(AbstractRelation::Undefined)
                } else {
                    Ok((x < y).into())
                }
            }
            (Numeric::BigInt(x), Numeric::BigInt(y)) => Ok((x < y).into()),
            (Numeric::BigInt(x), Numeric::Number(y)) => {
                if y.is_nan() {
                    return Ok(AbstractRelation::Undefined);
                }
                Ok((x.to_f64() < y).into())
            }
            (Numeric::Number(x), Numeric::BigInt(y)) => {
                if x.is_nan() {
                    return Ok(AbstractRelation::Undefined);
                }
                Ok((x < y.to_f64()).into())
            }
        }
    }

    /// The `<` operator.
    pub fn lt(&self, other: &Self, context: &mut Context) -> JsResult<bool> {
        Ok(matches!(
            self.abstract_relation(other, true, context)?,
            AbstractRelation::True
        ))
    }

    /// The `<=` operator.
    pub fn le(&self, other: &Self, context: &mut Context) -> JsResult<bool> {
        Ok(matches!(
            other.abstract_relation(self, false, context)?,
            AbstractRelation::False
        ))
    }

    /// The `>` operator.
    pub fn gt(&self, other: &Self, context: &mut Context) -> JsResult<bool> {
        Ok(matches!(
            other.abstract_relation(self, false, context)?,
            AbstractRelation::True
        ))
    }

    /// The `>=` operator.
    pub fn ge(&self, other: &Self, context: &mut Context) -> JsResult<bool> {
        Ok(matches!(
            self.abstract_relation(other, true, context)?,
            AbstractRelation::False
        ))
    }

    /// The `instanceof` operator: consults `Symbol.hasInstance`, then walks
    /// the prototype chain against `target.prototype`.
    pub fn instance_of(&self, target: &Self, context: &mut Context) -> JsResult<bool> {
        let JsValue::Object(constructor) = target else {
            return context.throw_type_error("right-hand side of 'instanceof' is not an object");
        };

        let has_instance_key =
            crate::property::PropertyKey::from(context.well_known_symbols().has_instance_symbol());
        let handler = constructor.get(&has_instance_key, target.clone(), context)?;
        if !handler.is_null_or_undefined() {
            let result = context.call(&handler, target, &[self.clone()])?;
            return Ok(result.to_boolean());
        }

        if !constructor.is_callable() {
            return context.throw_type_error("right-hand side of 'instanceof' is not callable");
        }

        let prototype = constructor.get(&"prototype".into(), target.clone(), context)?;
        let JsValue::Object(prototype) = prototype else {
            return context.throw_type_error("constructor prototype is not an object");
        };

        let mut chain = match self {
            JsValue::Object(object) => object.prototype(),
            _ => return Ok(false),
        };
        while let JsValue::Object(link) = chain {
            if JsObject::equals(&link, &prototype) {
                return Ok(true);
            }
            chain = link.prototype();
        }
        Ok(false)
    }
}
