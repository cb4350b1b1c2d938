//! This module implements the Property Descriptor.
//!
//! A property is described either by a data descriptor (`value`, `writable`)
//! or an accessor descriptor (`get`, `set`); both carry the `enumerable` and
//! `configurable` bits. `defineProperty` input arrives as a
//! [`PartialDescriptor`] where every field may be absent.

use crate::{object::JsObject, string::JsString, symbol::JsSymbol, value::JsValue};
use std::fmt;
use vesper_gc::{Finalize, Trace, Tracer};

mod attribute;
pub use attribute::Attribute;

/// A key in a property table: a canonical array index, a string, or a
/// symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    Index(u32),
    String(JsString),
    Symbol(JsSymbol),
}

impl PropertyKey {
    /// Whether the key is a canonical integer index.
    #[inline]
    pub fn as_index(&self) -> Option<u32> {
        match self {
            Self::Index(index) => Some(*index),
            _ => None,
        }
    }

    /// The key as it appears in diagnostics and `Object.keys` output.
    pub fn to_js_string(&self) -> JsString {
        match self {
            Self::Index(index) => JsString::from(index.to_string()),
            Self::String(string) => string.clone(),
            Self::Symbol(symbol) => JsString::from(symbol.to_display_string()),
        }
    }
}

/// Canonical integer indexes are stored numerically so enumeration yields
/// them in ascending order; `"01"` or `"4294967295"` stay strings.
fn canonical_index(string: &str) -> Option<u32> {
    if string == "0" {
        return Some(0);
    }
    if string.is_empty() || string.starts_with('0') || !string.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    string.parse::<u32>().ok().filter(|i| *i < u32::MAX)
}

impl From<&str> for PropertyKey {
    fn from(string: &str) -> Self {
        match canonical_index(string) {
            Some(index) => Self::Index(index),
            None => Self::String(string.into()),
        }
    }
}

impl From<JsString> for PropertyKey {
    fn from(string: JsString) -> Self {
        match canonical_index(&string) {
            Some(index) => Self::Index(index),
            None => Self::String(string),
        }
    }
}

impl From<String> for PropertyKey {
    fn from(string: String) -> Self {
        Self::from(string.as_str())
    }
}

impl From<JsSymbol> for PropertyKey {
    fn from(symbol: JsSymbol) -> Self {
        Self::Symbol(symbol)
    }
}

impl From<u32> for PropertyKey {
    fn from(index: u32) -> Self {
        if index < u32::MAX {
            Self::Index(index)
        } else {
            Self::String(index.to_string().into())
        }
    }
}

impl From<usize> for PropertyKey {
    fn from(index: usize) -> Self {
        match u32::try_from(index) {
            Ok(index) => Self::from(index),
            Err(_) => Self::String(index.to_string().into()),
        }
    }
}

impl From<u64> for PropertyKey {
    fn from(index: u64) -> Self {
        match u32::try_from(index) {
            Ok(index) => Self::from(index),
            Err(_) => Self::String(index.to_string().into()),
        }
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => fmt::Display::fmt(index, f),
            Self::String(string) => fmt::Display::fmt(string, f),
            Self::Symbol(symbol) => fmt::Display::fmt(symbol, f),
        }
    }
}

impl Finalize for PropertyKey {}

impl Trace for PropertyKey {
    #[inline]
    fn trace(&self, _tracer: &mut Tracer) {}
}

/// A property that has a value, which may or may not be writable.
#[derive(Debug, Clone, Trace, Finalize)]
pub struct DataDescriptor {
    value: JsValue,
    #[ignore_trace]
    attributes: Attribute,
}

impl DataDescriptor {
    /// Create a new `DataDescriptor`.
    #[inline]
    pub fn new<V>(value: V, attributes: Attribute) -> Self
    where
        V: Into<JsValue>,
    {
        Self {
            value: value.into(),
            attributes,
        }
    }

    /// Return the `value` of the data descriptor.
    #[inline]
    pub fn value(&self) -> JsValue {
        self.value.clone()
    }

    /// Return the attributes of the descriptor.
    #[inline]
    pub fn attributes(&self) -> Attribute {
        self.attributes
    }

    #[inline]
    pub fn writable(&self) -> bool {
        self.attributes.writable()
    }
}

/// A property described by a getter-setter pair of functions.
#[derive(Debug, Clone, Trace, Finalize)]
pub struct AccessorDescriptor {
    /// The function serving as getter.
    pub(crate) get: Option<JsObject>,
    /// The function serving as setter.
    pub(crate) set: Option<JsObject>,
    #[ignore_trace]
    attributes: Attribute,
}

impl AccessorDescriptor {
    /// Create a new `AccessorDescriptor`. A `writable` flag in `attributes`
    /// is discarded; accessors have none.
    #[inline]
    pub fn new(get: Option<JsObject>, set: Option<JsObject>, mut attributes: Attribute) -> Self {
        attributes.remove(Attribute::WRITABLE);
        Self {
            get,
            set,
            attributes,
        }
    }

    /// Return the getter if it exists.
    #[inline]
    pub fn getter(&self) -> Option<&JsObject> {
        self.get.as_ref()
    }

    /// Return the setter if it exists.
    #[inline]
    pub fn setter(&self) -> Option<&JsObject> {
        self.set.as_ref()
    }

    /// Set the getter of the accessor descriptor.
    #[inline]
    pub fn set_getter(&mut self, get: Option<JsObject>) {
        self.get = get;
    }

    /// Set the setter of the accessor descriptor.
    #[inline]
    pub fn set_setter(&mut self, set: Option<JsObject>) {
        self.set = set;
    }

    /// Return the attributes of the descriptor.
    #[inline]
    pub fn attributes(&self) -> Attribute {
        self.attributes
    }
}

/// A stored property: either flavor, never both.
#[derive(Debug, Clone, Trace, Finalize)]
pub enum PropertyDescriptor {
    Accessor(AccessorDescriptor),
    Data(DataDescriptor),
}

impl PropertyDescriptor {
    /// Whether this is a data descriptor.
    #[inline]
    pub fn is_data_descriptor(&self) -> bool {
        matches!(self, Self::Data(_))
    }

    /// Whether this is an accessor descriptor.
    #[inline]
    pub fn is_accessor_descriptor(&self) -> bool {
        matches!(self, Self::Accessor(_))
    }

    /// The attributes of either flavor.
    #[inline]
    pub fn attributes(&self) -> Attribute {
        match self {
            Self::Accessor(accessor) => accessor.attributes(),
            Self::Data(data) => data.attributes(),
        }
    }

    #[inline]
    pub(crate) fn attributes_mut(&mut self) -> &mut Attribute {
        match self {
            Self::Accessor(accessor) => &mut accessor.attributes,
            Self::Data(data) => &mut data.attributes,
        }
    }

    #[inline]
    pub fn configurable(&self) -> bool {
        self.attributes().configurable()
    }

    #[inline]
    pub fn enumerable(&self) -> bool {
        self.attributes().enumerable()
    }

    /// `writable` of a data descriptor; accessors are never writable.
    #[inline]
    pub fn writable(&self) -> bool {
        match self {
            Self::Accessor(_) => false,
            Self::Data(data) => data.writable(),
        }
    }

    /// The data value, if this is a data descriptor.
    #[inline]
    pub fn value(&self) -> Option<JsValue> {
        match self {
            Self::Accessor(_) => None,
            Self::Data(data) => Some(data.value()),
        }
    }

    /// The getter, if this is an accessor descriptor.
    #[inline]
    pub fn getter(&self) -> Option<&JsObject> {
        match self {
            Self::Accessor(accessor) => accessor.getter(),
            Self::Data(_) => None,
        }
    }

    /// The setter, if this is an accessor descriptor.
    #[inline]
    pub fn setter(&self) -> Option<&JsObject> {
        match self {
            Self::Accessor(accessor) => accessor.setter(),
            Self::Data(_) => None,
        }
    }
}

impl From<DataDescriptor> for PropertyDescriptor {
    #[inline]
    fn from(value: DataDescriptor) -> Self {
        Self::Data(value)
    }
}

impl From<AccessorDescriptor> for PropertyDescriptor {
    #[inline]
    fn from(value: AccessorDescriptor) -> Self {
        Self::Accessor(value)
    }
}

/// Descriptor input for `defineProperty`: any field may be absent.
///
/// `get`/`set` use a doubled `Option` so that an explicitly passed
/// `undefined` (clearing the function) is distinct from an absent field.
#[derive(Debug, Clone, Default, Trace, Finalize)]
pub struct PartialDescriptor {
    pub value: Option<JsValue>,
    #[ignore_trace]
    pub writable: Option<bool>,
    pub get: Option<Option<JsObject>>,
    pub set: Option<Option<JsObject>>,
    #[ignore_trace]
    pub enumerable: Option<bool>,
    #[ignore_trace]
    pub configurable: Option<bool>,
}

impl PartialDescriptor {
    /// Includes any field named `value` or `writable`.
    pub fn is_data_descriptor(&self) -> bool {
        self.value.is_some() || self.writable.is_some()
    }

    /// Includes any field named `get` or `set`.
    pub fn is_accessor_descriptor(&self) -> bool {
        self.get.is_some() || self.set.is_some()
    }

    /// Neither flavor can be told apart yet.
    pub fn is_generic_descriptor(&self) -> bool {
        !self.is_data_descriptor() && !self.is_accessor_descriptor()
    }

    /// Completes the descriptor with the standard defaults for a fresh
    /// property: absent attributes are `false`, an absent value is
    /// `undefined`.
    pub fn complete(&self) -> PropertyDescriptor {
        let mut attributes = Attribute::empty();
        attributes.set_enumerable(self.enumerable.unwrap_or(false));
        attributes.set_configurable(self.configurable.unwrap_or(false));
        if self.is_accessor_descriptor() {
            AccessorDescriptor::new(
                self.get.clone().flatten(),
                self.set.clone().flatten(),
                attributes,
            )
            .into()
        } else {
            attributes.set_writable(self.writable.unwrap_or(false));
            DataDescriptor::new(
                self.value.clone().unwrap_or_default(),
                attributes,
            )
            .into()
        }
    }

    /// Builder helpers used by builtin installation code.
    pub fn value<V: Into<JsValue>>(mut self, value: V) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn writable(mut self, writable: bool) -> Self {
        self.writable = Some(writable);
        self
    }

    pub fn get(mut self, get: Option<JsObject>) -> Self {
        self.get = Some(get);
        self
    }

    pub fn set(mut self, set: Option<JsObject>) -> Self {
        self.set = Some(set);
        self
    }

    pub fn enumerable(mut self, enumerable: bool) -> Self {
        self.enumerable = Some(enumerable);
        self
    }

    pub fn configurable(mut self, configurable: bool) -> Self {
        self.configurable = Some(configurable);
        self
    }
}

impl From<&PropertyDescriptor> for PartialDescriptor {
    fn from(desc: &PropertyDescriptor) -> Self {
        match desc {
            PropertyDescriptor::Data(data) => Self {
                value: Some(data.value()),
                writable: Some(data.writable()),
                get: None,
                set: None,
                enumerable: Some(desc.enumerable()),
                configurable: Some(desc.configurable()),
            },
            PropertyDescriptor::Accessor(accessor) => Self {
                value: None,
                writable: None,
                get: Some(accessor.getter().cloned()),
                set: Some(accessor.setter().cloned()),
                enumerable: Some(desc.enumerable()),
                configurable: Some(desc.configurable()),
            },
        }
    }
}
