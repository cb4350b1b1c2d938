//! This module implements the Rust representation of a JavaScript object:
//! a property table, a prototype link, an extensibility state and a type
//! tag with its per-type internal slots.

use crate::{
    bigint::JsBigInt,
    builtins::{
        array::array_iterator::ArrayIterator,
        array_buffer::ArrayBuffer,
        dataview::DataView,
        date::Date,
        disposable_stack::DisposableStack,
        error::ErrorKind,
        function::Function,
        map::{map_iterator::MapIterator, ordered_map::OrderedMap},
        promise::Promise,
        proxy::Proxy,
        regexp::RegExp,
        set::{ordered_set::OrderedSet, set_iterator::SetIterator},
        string::string_iterator::StringIterator,
        temporal::{Duration, Instant, PlainDate, PlainDateTime, PlainTime},
        typed_array::TypedArray,
        weak::{FinalizationRegistry, WeakMap, WeakRef, WeakSet},
    },
    property::{Attribute, DataDescriptor, PropertyDescriptor, PropertyKey},
    string::JsString,
    symbol::JsSymbol,
    value::JsValue,
};
use std::any::Any;
use std::fmt::{self, Debug, Display};
use vesper_gc::{Finalize, Trace};

mod builders;
mod internal_methods;
mod jsobject;
mod property_map;

#[cfg(test)]
mod tests;

pub use builders::{ConstructorBuilder, FunctionBuilder, ObjectInitializer};
pub use jsobject::JsObject;
pub use property_map::PropertyMap;

/// Static `prototype`, usually set on constructors as a key to point to
/// their respective prototype object.
pub static PROTOTYPE: &str = "prototype";

/// This trait allows Rust types to be passed around as opaque, traceable
/// engine state, such as the captures of a native closure.
///
/// This is automatically implemented when a type implements `Debug`, `Any`
/// and `Trace`.
pub trait NativeObject: Debug + Any + Trace {
    /// Convert the Rust type which implements `NativeObject` to a `&dyn Any`.
    fn as_any(&self) -> &dyn Any;

    /// Convert the Rust type which implements `NativeObject` to a
    /// `&mut dyn Any`.
    fn as_mut_any(&mut self) -> &mut dyn Any;
}

impl<T: Any + Debug + Trace> NativeObject for T {
    #[inline]
    fn as_any(&self) -> &dyn Any {
        self as &dyn Any
    }

    #[inline]
    fn as_mut_any(&mut self) -> &mut dyn Any {
        self as &mut dyn Any
    }
}

/// The extensibility state of an object. Transitions are monotone:
/// `Extensible → NonExtensible → Sealed → Frozen`, never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IntegrityLevel {
    Extensible,
    NonExtensible,
    Sealed,
    Frozen,
}

/// The internal representation of a JavaScript object.
#[derive(Debug, Trace, Finalize)]
pub struct Object {
    /// The type of the object and its internal slots.
    pub data: ObjectData,
    /// Own properties.
    properties: PropertyMap,
    /// Instance prototype, `__proto__`.
    prototype: JsValue,
    /// Whether new properties can be added, and how frozen the object is.
    #[ignore_trace]
    integrity: IntegrityLevel,
}

/// Defines the different types of objects. The payload of each variant is
/// the set of internal slots of that type.
#[derive(Debug, Trace, Finalize)]
pub enum ObjectData {
    Ordinary,
    Global,
    Array,
    ArrayIterator(ArrayIterator),
    Arguments,
    ArrayBuffer(ArrayBuffer),
    BigInt(JsBigInt),
    Boolean(bool),
    DataView(DataView),
    Date(Date),
    DisposableStack(DisposableStack),
    Duration(Duration),
    Error(#[ignore_trace] ErrorKind),
    FinalizationRegistry(FinalizationRegistry),
    Function(Function),
    Instant(Instant),
    Map(OrderedMap),
    MapIterator(MapIterator),
    Number(f64),
    PlainDate(PlainDate),
    PlainDateTime(PlainDateTime),
    PlainTime(PlainTime),
    Promise(Promise),
    Proxy(Proxy),
    RegExp(#[ignore_trace] Box<RegExp>),
    Set(OrderedSet),
    SetIterator(SetIterator),
    String(JsString),
    StringIterator(StringIterator),
    Symbol(JsSymbol),
    TypedArray(TypedArray),
    WeakMap(WeakMap),
    WeakRef(WeakRef),
    WeakSet(WeakSet),
}

impl ObjectData {
    /// The tag used by `Object.prototype.toString` when no `toStringTag`
    /// overrides it.
    pub fn type_tag(&self) -> &'static str {
        match self {
            Self::Array | Self::TypedArray(_) => "Array",
            Self::ArrayIterator(_) => "Array Iterator",
            Self::Arguments => "Arguments",
            Self::ArrayBuffer(_) => "ArrayBuffer",
            Self::BigInt(_) => "BigInt",
            Self::Boolean(_) => "Boolean",
            Self::DataView(_) => "DataView",
            Self::Date(_) => "Date",
            Self::DisposableStack(_) => "DisposableStack",
            Self::Duration(_) => "Temporal.Duration",
            Self::Error(_) => "Error",
            Self::FinalizationRegistry(_) => "FinalizationRegistry",
            Self::Function(_) => "Function",
            Self::Global => "global",
            Self::Instant(_) => "Temporal.Instant",
            Self::Map(_) => "Map",
            Self::MapIterator(_) => "Map Iterator",
            Self::Number(_) => "Number",
            Self::Ordinary => "Object",
            Self::PlainDate(_) => "Temporal.PlainDate",
            Self::PlainDateTime(_) => "Temporal.PlainDateTime",
            Self::PlainTime(_) => "Temporal.PlainTime",
            Self::Promise(_) => "Promise",
            Self::Proxy(_) => "Object",
            Self::RegExp(_) => "RegExp",
            Self::Set(_) => "Set",
            Self::SetIterator(_) => "Set Iterator",
            Self::String(_) => "String",
            Self::StringIterator(_) => "String Iterator",
            Self::Symbol(_) => "Symbol",
            Self::WeakMap(_) => "WeakMap",
            Self::WeakRef(_) => "WeakRef",
            Self::WeakSet(_) => "WeakSet",
        }
    }
}

impl Display for ObjectData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_tag())
    }
}

impl Default for Object {
    /// A new ordinary, extensible object with a `null` prototype.
    #[inline]
    fn default() -> Self {
        Self {
            data: ObjectData::Ordinary,
            properties: PropertyMap::new(),
            prototype: JsValue::Null,
            integrity: IntegrityLevel::Extensible,
        }
    }
}

impl Object {
    #[inline]
    pub fn new() -> Self {
        Default::default()
    }

    /// An ordinary object with the given prototype.
    #[inline]
    pub fn create(prototype: JsValue) -> Self {
        let mut object = Self::default();
        object.prototype = prototype;
        object
    }

    /// An object with the given prototype and internal slots.
    #[inline]
    pub fn with_prototype(prototype: JsValue, data: ObjectData) -> Self {
        let mut object = Self::create(prototype);
        object.data = data;
        object
    }

    /// A function object.
    #[inline]
    pub fn function(function: Function, prototype: JsValue) -> Self {
        Self::with_prototype(prototype, ObjectData::Function(function))
    }

    /// It determines if the object is a callable function with a `[[Call]]`
    /// internal method.
    #[inline]
    pub fn is_callable(&self) -> bool {
        matches!(self.data, ObjectData::Function(_))
    }

    /// It determines if the object is a function object with a
    /// `[[Construct]]` internal method.
    #[inline]
    pub fn is_constructable(&self) -> bool {
        matches!(self.data, ObjectData::Function(ref f) if f.is_constructable())
    }

    /// Checks if it is an `Array` object.
    #[inline]
    pub fn is_array(&self) -> bool {
        matches!(self.data, ObjectData::Array)
    }

    /// Checks if it is a `Function` object.
    #[inline]
    pub fn is_function(&self) -> bool {
        matches!(self.data, ObjectData::Function(_))
    }

    #[inline]
    pub fn as_function(&self) -> Option<&Function> {
        match self.data {
            ObjectData::Function(ref function) => Some(function),
            _ => None,
        }
    }

    /// Checks if it is a `String` wrapper object.
    #[inline]
    pub fn is_string(&self) -> bool {
        matches!(self.data, ObjectData::String(_))
    }

    #[inline]
    pub fn as_string(&self) -> Option<JsString> {
        match self.data {
            ObjectData::String(ref string) => Some(string.clone()),
            _ => None,
        }
    }

    /// Checks if it is an `Error` object.
    #[inline]
    pub fn is_error(&self) -> bool {
        matches!(self.data, ObjectData::Error(_))
    }

    #[inline]
    pub fn is_ordinary(&self) -> bool {
        matches!(self.data, ObjectData::Ordinary)
    }

    #[inline]
    pub fn is_global(&self) -> bool {
        matches!(self.data, ObjectData::Global)
    }

    /// Checks if it is a `RegExp` object.
    #[inline]
    pub fn data_is_regexp(&self) -> bool {
        matches!(self.data, ObjectData::RegExp(_))
    }

    #[inline]
    pub fn as_regexp(&self) -> Option<&RegExp> {
        match self.data {
            ObjectData::RegExp(ref regexp) => Some(regexp),
            _ => None,
        }
    }

    #[inline]
    pub fn is_proxy(&self) -> bool {
        matches!(self.data, ObjectData::Proxy(_))
    }

    #[inline]
    pub fn as_proxy(&self) -> Option<&Proxy> {
        match self.data {
            ObjectData::Proxy(ref proxy) => Some(proxy),
            _ => None,
        }
    }

    #[inline]
    pub fn as_map_ref(&self) -> Option<&OrderedMap> {
        match self.data {
            ObjectData::Map(ref map) => Some(map),
            _ => None,
        }
    }

    #[inline]
    pub fn as_map_mut(&mut self) -> Option<&mut OrderedMap> {
        match self.data {
            ObjectData::Map(ref mut map) => Some(map),
            _ => None,
        }
    }

    #[inline]
    pub fn as_set_ref(&self) -> Option<&OrderedSet> {
        match self.data {
            ObjectData::Set(ref set) => Some(set),
            _ => None,
        }
    }

    #[inline]
    pub fn as_set_mut(&mut self) -> Option<&mut OrderedSet> {
        match self.data {
            ObjectData::Set(ref mut set) => Some(set),
            _ => None,
        }
    }

    /// The own property table.
    #[inline]
    pub fn properties(&self) -> &PropertyMap {
        &self.properties
    }

    #[inline]
    pub fn properties_mut(&mut self) -> &mut PropertyMap {
        &mut self.properties
    }

    /// Returns the own property for `key`, materializing the exotic index
    /// properties of `String` wrappers and TypedArray views; everything
    /// else reads the table.
    pub fn get_own_property(&self, key: &PropertyKey) -> Option<PropertyDescriptor> {
        if let ObjectData::String(ref string) = self.data {
            if let Some(descriptor) = string_exotic_property(string, key) {
                return Some(descriptor);
            }
        }
        if let ObjectData::TypedArray(ref view) = self.data {
            if let PropertyKey::Index(index) = key {
                if let Some(value) = view.element(*index as usize) {
                    let mut attributes = Attribute::WRITABLE | Attribute::ENUMERABLE;
                    attributes.set_configurable(true);
                    return Some(DataDescriptor::new(value, attributes).into());
                }
            }
        }
        self.properties.get(key).cloned()
    }

    /// Helper for property insertion without any validation.
    #[inline]
    pub(crate) fn insert<K, P>(&mut self, key: K, property: P) -> Option<PropertyDescriptor>
    where
        K: Into<PropertyKey>,
        P: Into<PropertyDescriptor>,
    {
        self.properties.insert(&key.into(), property.into())
    }

    /// Helper for property removal without any validation.
    #[inline]
    pub(crate) fn remove(&mut self, key: &PropertyKey) -> Option<PropertyDescriptor> {
        self.properties.remove(key)
    }

    /// Inserts a data property with the given attributes, without checking
    /// the usual invariants.
    #[inline]
    pub fn insert_property<K, V>(
        &mut self,
        key: K,
        value: V,
        attribute: Attribute,
    ) -> Option<PropertyDescriptor>
    where
        K: Into<PropertyKey>,
        V: Into<JsValue>,
    {
        self.insert(key.into(), DataDescriptor::new(value, attribute))
    }

    /// Returns either the prototype or `null`.
    #[inline]
    pub fn prototype(&self) -> &JsValue {
        &self.prototype
    }

    /// Sets the prototype without cycle or extensibility checks; the checked
    /// path is `JsObject::set_prototype`.
    #[inline]
    pub fn set_prototype_instance(&mut self, prototype: JsValue) {
        debug_assert!(prototype.is_object() || prototype.is_null());
        self.prototype = prototype;
    }

    /// Check if it is extensible.
    #[inline]
    pub fn is_extensible(&self) -> bool {
        self.integrity == IntegrityLevel::Extensible
    }

    /// Disable extensibility. Irreversible.
    #[inline]
    pub fn prevent_extensions(&mut self) {
        if self.integrity < IntegrityLevel::NonExtensible {
            self.integrity = IntegrityLevel::NonExtensible;
        }
    }

    /// Seal: non-extensible plus every own property non-configurable.
    pub fn seal(&mut self) {
        self.properties.update_attributes(|property| {
            property.attributes_mut().set_configurable(false);
        });
        if self.integrity < IntegrityLevel::Sealed {
            self.integrity = IntegrityLevel::Sealed;
        }
    }

    /// Freeze: sealed plus every own data property non-writable.
    pub fn freeze(&mut self) {
        self.properties.update_attributes(|property| {
            property.attributes_mut().set_configurable(false);
            if property.is_data_descriptor() {
                property.attributes_mut().set_writable(false);
            }
        });
        self.integrity = IntegrityLevel::Frozen;
    }

    /// Derived predicate: non-extensible and every own property
    /// non-configurable.
    pub fn is_sealed(&self) -> bool {
        if self.is_extensible() {
            return false;
        }
        self.properties.all(|property| !property.configurable())
    }

    /// Derived predicate: sealed and every own data property non-writable.
    pub fn is_frozen(&self) -> bool {
        if self.is_extensible() {
            return false;
        }
        self.properties.all(|property| {
            !property.configurable() && (!property.is_data_descriptor() || !property.writable())
        })
    }
}

/// `String` wrapper objects expose their code points as exotic integer
/// properties.
fn string_exotic_property(string: &JsString, key: &PropertyKey) -> Option<PropertyDescriptor> {
    let PropertyKey::Index(index) = key else {
        return None;
    };
    let ch = string.chars().nth(*index as usize)?;
    let mut attributes = Attribute::empty();
    attributes.set_enumerable(true);
    Some(DataDescriptor::new(JsValue::from(ch), attributes).into())
}
