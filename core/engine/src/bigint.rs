//! JavaScript `BigInt` primitives.

use num_bigint::BigInt;
use num_traits::{FromPrimitive, Num, Pow, Signed, ToPrimitive, Zero};
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;
use vesper_gc::{Finalize, Trace, Tracer};

/// An arbitrary-precision JavaScript integer.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JsBigInt(Rc<BigInt>);

impl JsBigInt {
    /// Creates a `JsBigInt` from a raw `BigInt`.
    pub fn new<B: Into<BigInt>>(value: B) -> Self {
        Self(Rc::new(value.into()))
    }

    /// The zero value.
    pub fn zero() -> Self {
        Self::new(BigInt::zero())
    }

    /// Parses the string accepted by the `BigInt` constructor: decimal
    /// digits, optionally signed, or a `0x`/`0o`/`0b` prefixed radix literal.
    /// The empty string is zero.
    pub fn from_string(string: &str) -> Option<Self> {
        let string = string.trim();
        if string.is_empty() {
            return Some(Self::zero());
        }
        let (radix, digits) = match string.as_bytes() {
            [b'0', b'x' | b'X', ..] => (16, &string[2..]),
            [b'0', b'o' | b'O', ..] => (8, &string[2..]),
            [b'0', b'b' | b'B', ..] => (2, &string[2..]),
            _ => (10, string),
        };
        BigInt::from_str_radix(digits, radix).ok().map(Self::new)
    }

    /// Converts an integral finite `f64`; fails on NaN, infinity or a
    /// fractional part.
    pub fn try_from_f64(value: f64) -> Option<Self> {
        if value.is_finite() && value.fract() == 0.0 {
            BigInt::from_f64(value).map(Self::new)
        } else {
            None
        }
    }

    /// Lossy conversion to `f64`, the explicit `Number(bigint)` path.
    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or(f64::INFINITY)
    }

    /// Inner `BigInt` reference.
    pub fn as_inner(&self) -> &BigInt {
        &self.0
    }

    /// Whether the value is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn add(x: &Self, y: &Self) -> Self {
        Self::new(&*x.0 + &*y.0)
    }

    pub fn sub(x: &Self, y: &Self) -> Self {
        Self::new(&*x.0 - &*y.0)
    }

    pub fn mul(x: &Self, y: &Self) -> Self {
        Self::new(&*x.0 * &*y.0)
    }

    /// Division truncating toward zero; `None` on division by zero.
    pub fn div(x: &Self, y: &Self) -> Option<Self> {
        if y.is_zero() {
            None
        } else {
            Some(Self::new(&*x.0 / &*y.0))
        }
    }

    /// Remainder; `None` on division by zero.
    pub fn rem(x: &Self, y: &Self) -> Option<Self> {
        if y.is_zero() {
            None
        } else {
            Some(Self::new(&*x.0 % &*y.0))
        }
    }

    /// Exponentiation; `None` on a negative exponent.
    pub fn pow(x: &Self, y: &Self) -> Option<Self> {
        if y.0.is_negative() {
            return None;
        }
        let exponent = y.0.to_u32()?;
        Some(Self::new(Pow::pow(&*x.0, exponent)))
    }

    pub fn neg(x: &Self) -> Self {
        Self::new(-&*x.0)
    }

    /// Radix form used by `BigInt.prototype.toString`.
    pub fn to_string_radix(&self, radix: u32) -> String {
        self.0.to_str_radix(radix)
    }
}

impl Deref for JsBigInt {
    type Target = BigInt;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Finalize for JsBigInt {}

impl Trace for JsBigInt {
    #[inline]
    fn trace(&self, _tracer: &mut Tracer) {}
}

impl fmt::Display for JsBigInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<i32> for JsBigInt {
    fn from(value: i32) -> Self {
        Self::new(value)
    }
}

impl From<i64> for JsBigInt {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

impl From<u64> for JsBigInt {
    fn from(value: u64) -> Self {
        Self::new(value)
    }
}

impl From<BigInt> for JsBigInt {
    fn from(value: BigInt) -> Self {
        Self::new(value)
    }
}
