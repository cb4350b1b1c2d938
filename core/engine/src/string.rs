//! A refcounted, immutable UTF-8 string used for property keys and string
//! values.

use once_cell::unsync::Lazy;
use std::borrow::Borrow;
use std::fmt::{self, Display};
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::rc::Rc;
use vesper_gc::{Finalize, Trace, Tracer};

/// Names that appear in almost every script; cloned instead of re-allocated.
static COMMON: &[&str] = &[
    "", "length", "name", "prototype", "constructor", "undefined", "value",
    "get", "set", "done", "next", "message", "toString", "valueOf", "arguments",
];

thread_local! {
    static COMMON_STRINGS: Lazy<Vec<JsString>> =
        Lazy::new(|| COMMON.iter().map(|s| JsString(Rc::from(*s))).collect());
}

/// An immutable JavaScript string.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct JsString(Rc<str>);

impl JsString {
    /// Creates a new `JsString`, reusing the static allocation for common
    /// names.
    pub fn new<S: AsRef<str>>(value: S) -> Self {
        let value = value.as_ref();
        if value.len() <= 11 {
            if let Some(index) = COMMON.iter().position(|s| *s == value) {
                return COMMON_STRINGS.with(|strings| strings[index].clone());
            }
        }
        Self(Rc::from(value))
    }

    /// The empty string.
    pub fn empty() -> Self {
        Self::new("")
    }

    /// String contents as a `&str`.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of Unicode code points, which is what `String.prototype.length`
    /// style operations index by.
    pub fn encode_len(&self) -> usize {
        self.0.chars().count()
    }
}

impl Default for JsString {
    fn default() -> Self {
        Self::empty()
    }
}

impl Finalize for JsString {}

impl Trace for JsString {
    #[inline]
    fn trace(&self, _tracer: &mut Tracer) {}
}

impl Deref for JsString {
    type Target = str;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Borrow<str> for JsString {
    #[inline]
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for JsString {
    #[inline]
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Hash for JsString {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl From<&str> for JsString {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for JsString {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&String> for JsString {
    fn from(value: &String) -> Self {
        Self::new(value)
    }
}

impl From<Box<str>> for JsString {
    fn from(value: Box<str>) -> Self {
        Self::new(&*value)
    }
}

impl From<char> for JsString {
    fn from(value: char) -> Self {
        Self::new(value.to_string())
    }
}

impl Display for JsString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl fmt::Debug for JsString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl PartialEq<str> for JsString {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for JsString {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl PartialEq<JsString> for str {
    fn eq(&self, other: &JsString) -> bool {
        self == other.as_str()
    }
}
