//! This module defines the object internal methods: property lookup along
//! the prototype chain, receiver-correct assignment, descriptor
//! (re)definition with the non-configurability invariants, deletion, key
//! enumeration, prototype mutation and the integrity levels.

use super::{JsObject, ObjectData};
use crate::{
    context::Context,
    property::{
        Attribute, DataDescriptor, PartialDescriptor, PropertyDescriptor, PropertyKey,
    },
    value::{same_value, JsValue},
    JsResult,
};

impl JsObject {
    /// `[[GetOwnProperty]]`.
    pub fn get_own_property(&self, key: &PropertyKey) -> Option<PropertyDescriptor> {
        self.borrow().get_own_property(key)
    }

    /// `[[HasProperty]]`: walks the prototype chain.
    pub fn has_property(&self, key: &PropertyKey) -> bool {
        if let Some(proxy) = self.borrow().as_proxy() {
            if let Some(target) = proxy.target() {
                return target.has_property(key);
            }
            return false;
        }
        if self.get_own_property(key).is_some() {
            return true;
        }
        match self.prototype() {
            JsValue::Object(parent) => parent.has_property(key),
            _ => false,
        }
    }

    /// `[[Get]]`: walks the prototype chain; accessors observe the original
    /// `receiver`.
    pub fn get(
        &self,
        key: &PropertyKey,
        receiver: JsValue,
        context: &mut Context,
    ) -> JsResult<JsValue> {
        if self.borrow().is_proxy() {
            return crate::builtins::proxy::proxy_get(self, key, receiver, context);
        }

        match self.get_own_property(key) {
            None => match self.prototype() {
                JsValue::Object(parent) => parent.get(key, receiver, context),
                _ => Ok(JsValue::undefined()),
            },
            Some(PropertyDescriptor::Data(data)) => Ok(data.value()),
            Some(PropertyDescriptor::Accessor(accessor)) => match accessor.getter() {
                Some(getter) => getter.call(&receiver, &[], context),
                None => Ok(JsValue::undefined()),
            },
        }
    }

    /// `[[Set]]`: finds the first descriptor on the chain, assigns on the
    /// receiver for writable data properties, invokes setters, and creates
    /// an own data property when nothing is found. `strict` decides whether
    /// a rejected write throws a `TypeError`.
    // <https://tc39.es/ecma262/#sec-ordinary-object-internal-methods-and-internal-slots-set-p-v-receiver>
    pub fn set(
        &self,
        key: PropertyKey,
        value: JsValue,
        receiver: JsValue,
        strict: bool,
        context: &mut Context,
    ) -> JsResult<bool> {
        if self.borrow().is_proxy() {
            return crate::builtins::proxy::proxy_set(self, key, value, receiver, strict, context);
        }

        // Array `length` keeps the index properties in sync.
        if self.is_array() {
            if let PropertyKey::String(ref name) = key {
                if name == "length" {
                    return crate::builtins::array::array_set_length(
                        self, value, strict, context,
                    );
                }
            }
        }

        // TypedArray index writes go straight into the backing buffer.
        if let PropertyKey::Index(index) = key {
            let is_view = matches!(self.borrow().data, ObjectData::TypedArray(_));
            if is_view {
                let number = value.to_number(context)?;
                let borrowed = self.borrow();
                if let ObjectData::TypedArray(ref view) = borrowed.data {
                    view.set_element(index as usize, number);
                }
                return Ok(true);
            }
        }

        let own = self.get_own_property(&key);
        match own {
            None => match self.prototype() {
                JsValue::Object(parent) => parent.set(key, value, receiver, strict, context),
                _ => create_on_receiver(self, key, value, receiver, strict, context),
            },
            Some(PropertyDescriptor::Data(data)) => {
                if !data.writable() {
                    return reject(
                        strict,
                        format!("cannot assign to read only property '{key}'"),
                        context,
                    );
                }
                create_on_receiver(self, key, value, receiver, strict, context)
            }
            Some(PropertyDescriptor::Accessor(accessor)) => match accessor.setter() {
                Some(setter) => {
                    setter.call(&receiver, &[value], context)?;
                    Ok(true)
                }
                None => reject(
                    strict,
                    format!("cannot set property '{key}' which has only a getter"),
                    context,
                ),
            },
        }
    }

    /// `[[DefineOwnProperty]]` with the standard validation rules.
    // <https://tc39.es/ecma262/#sec-validateandapplypropertydescriptor>
    pub fn define_own_property<K>(&self, key: K, desc: PartialDescriptor) -> bool
    where
        K: Into<PropertyKey>,
    {
        let key = key.into();

        if self.is_array() {
            if let PropertyKey::String(ref name) = key {
                if name == "length" {
                    if let Some(ref value) = desc.value {
                        return array_define_length(self, value, &desc);
                    }
                }
            }
        }

        let current = self.get_own_property(&key);
        let extensible = self.borrow().is_extensible();

        let Some(mut current) = current else {
            if !extensible {
                return false;
            }
            let completed = desc.complete();
            self.borrow_mut().insert(key.clone(), completed);
            self.sync_array_length(&key);
            return true;
        };

        // Nothing to change always succeeds.
        if desc.value.is_none()
            && desc.writable.is_none()
            && desc.get.is_none()
            && desc.set.is_none()
            && desc.enumerable.is_none()
            && desc.configurable.is_none()
        {
            return true;
        }

        if !current.configurable() {
            if desc.configurable == Some(true) {
                return false;
            }
            if let Some(enumerable) = desc.enumerable {
                if enumerable != current.enumerable() {
                    return false;
                }
            }
            if desc.is_data_descriptor() && current.is_accessor_descriptor() {
                return false;
            }
            if desc.is_accessor_descriptor() && current.is_data_descriptor() {
                return false;
            }
            if current.is_data_descriptor() && desc.is_data_descriptor() && !current.writable() {
                if desc.writable == Some(true) {
                    return false;
                }
                if let Some(ref value) = desc.value {
                    let unchanged = current
                        .value()
                        .map_or(false, |current_value| same_value(value, &current_value));
                    if !unchanged {
                        return false;
                    }
                }
                return true;
            }
            if current.is_accessor_descriptor() && desc.is_accessor_descriptor() {
                if let Some(ref get) = desc.get {
                    let same = match (get, current.getter()) {
                        (Some(new), Some(old)) => JsObject::equals(new, old),
                        (None, None) => true,
                        _ => false,
                    };
                    if !same {
                        return false;
                    }
                }
                if let Some(ref set) = desc.set {
                    let same = match (set, current.setter()) {
                        (Some(new), Some(old)) => JsObject::equals(new, old),
                        (None, None) => true,
                        _ => false,
                    };
                    if !same {
                        return false;
                    }
                }
                return true;
            }
        }

        // Apply: a flavor switch replaces the descriptor, otherwise the
        // present fields are merged into the current one.
        let merged = if desc.is_data_descriptor() && current.is_accessor_descriptor()
            || desc.is_accessor_descriptor() && current.is_data_descriptor()
        {
            let mut patch = desc.clone();
            if patch.enumerable.is_none() {
                patch.enumerable = Some(current.enumerable());
            }
            if patch.configurable.is_none() {
                patch.configurable = Some(current.configurable());
            }
            patch.complete()
        } else {
            merge(&mut current, &desc);
            current
        };

        self.borrow_mut().insert(key.clone(), merged);
        self.sync_array_length(&key);
        true
    }

    /// Creates an enumerable, writable, configurable data property, the
    /// shape produced by ordinary assignment. Fails on a non-extensible
    /// object.
    pub fn create_data_property<K, V>(&self, key: K, value: V) -> bool
    where
        K: Into<PropertyKey>,
        V: Into<JsValue>,
    {
        self.define_own_property(
            key,
            PartialDescriptor::default()
                .value(value)
                .writable(true)
                .enumerable(true)
                .configurable(true),
        )
    }

    /// `[[Delete]]`: removes an own configurable property.
    pub fn delete(&self, key: &PropertyKey) -> bool {
        if let Some(proxy) = self.borrow().as_proxy() {
            if let Some(target) = proxy.target() {
                return target.delete(key);
            }
            return false;
        }
        match self.get_own_property(key) {
            Some(desc) if desc.configurable() => {
                self.borrow_mut().remove(key);
                true
            }
            Some(_) => false,
            None => true,
        }
    }

    /// `[[OwnPropertyKeys]]`: indexes ascending, then strings, then symbols,
    /// the latter two in insertion order.
    pub fn own_property_keys(&self) -> Vec<PropertyKey> {
        if let Some(proxy) = self.borrow().as_proxy() {
            if let Some(target) = proxy.target() {
                return target.own_property_keys();
            }
            return Vec::new();
        }
        let object = self.borrow();
        let mut keys: Vec<PropertyKey> = Vec::new();
        if let ObjectData::String(ref string) = object.data {
            keys.extend((0..string.encode_len() as u32).map(PropertyKey::Index));
        }
        keys.extend(object.properties().keys());
        keys
    }

    /// The enumerable string-keyed subset, the order `for..in` and
    /// `Object.keys` observe.
    pub fn enumerable_keys(&self) -> Vec<PropertyKey> {
        self.own_property_keys()
            .into_iter()
            .filter(|key| !matches!(key, PropertyKey::Symbol(_)))
            .filter(|key| {
                self.get_own_property(key)
                    .map_or(false, |desc| desc.attributes().enumerable())
            })
            .collect()
    }

    /// `[[SetPrototypeOf]]`: rejects cycles and any change on a
    /// non-extensible object.
    pub fn set_prototype(&self, prototype: JsValue) -> bool {
        debug_assert!(prototype.is_object() || prototype.is_null());
        let current = self.prototype();
        if same_value(&current, &prototype) {
            return true;
        }
        if !self.borrow().is_extensible() {
            return false;
        }
        // Walk the chain of the candidate; finding ourselves would close a
        // cycle.
        let mut link = prototype.clone();
        while let JsValue::Object(ref object) = link {
            if JsObject::equals(object, self) {
                return false;
            }
            let next = object.prototype();
            link = next;
        }
        self.borrow_mut().set_prototype_instance(prototype);
        true
    }

    /// `[[PreventExtensions]]`.
    pub fn prevent_extensions(&self) -> bool {
        self.borrow_mut().prevent_extensions();
        true
    }

    pub fn is_extensible(&self) -> bool {
        self.borrow().is_extensible()
    }

    /// `Object.seal` semantics; idempotent.
    pub fn seal(&self) {
        let mut object = self.borrow_mut();
        object.prevent_extensions();
        object.seal();
    }

    /// `Object.freeze` semantics; idempotent.
    pub fn freeze(&self) {
        let mut object = self.borrow_mut();
        object.prevent_extensions();
        object.freeze();
    }

    pub fn is_sealed(&self) -> bool {
        self.borrow().is_sealed()
    }

    pub fn is_frozen(&self) -> bool {
        self.borrow().is_frozen()
    }

    /// After an index property lands on an array, `length` grows to
    /// `index + 1` when needed.
    fn sync_array_length(&self, key: &PropertyKey) {
        let PropertyKey::Index(index) = key else {
            return;
        };
        if !self.is_array() {
            return;
        }
        let length = crate::builtins::array::array_length(self);
        if u64::from(*index) + 1 > length {
            let descriptor = self
                .get_own_property(&"length".into())
                .map(|desc| desc.attributes())
                .unwrap_or_else(Attribute::all);
            self.borrow_mut().insert(
                PropertyKey::String("length".into()),
                DataDescriptor::new(JsValue::new(u64::from(*index) + 1), descriptor),
            );
        }
    }
}

/// The receiver side of `[[Set]]`: the write lands on `receiver`, not on the
/// holder of the descriptor.
fn create_on_receiver(
    holder: &JsObject,
    key: PropertyKey,
    value: JsValue,
    receiver: JsValue,
    strict: bool,
    context: &mut Context,
) -> JsResult<bool> {
    let Some(receiver_obj) = receiver.as_object().cloned() else {
        return reject(
            strict,
            format!("cannot create property '{key}' on a primitive"),
            context,
        );
    };

    let existing = if JsObject::equals(holder, &receiver_obj) {
        holder.get_own_property(&key)
    } else {
        receiver_obj.get_own_property(&key)
    };

    match existing {
        Some(PropertyDescriptor::Accessor(_)) => reject(
            strict,
            format!("cannot set property '{key}' which has only a getter"),
            context,
        ),
        Some(PropertyDescriptor::Data(data)) => {
            if !data.writable() {
                return reject(
                    strict,
                    format!("cannot assign to read only property '{key}'"),
                    context,
                );
            }
            let attributes = data.attributes();
            receiver_obj
                .borrow_mut()
                .insert(key.clone(), DataDescriptor::new(value, attributes));
            receiver_obj.sync_array_length(&key);
            Ok(true)
        }
        None => {
            if !receiver_obj.borrow().is_extensible() {
                return reject(
                    strict,
                    format!("cannot add property '{key}', object is not extensible"),
                    context,
                );
            }
            receiver_obj
                .borrow_mut()
                .insert(key.clone(), DataDescriptor::new(value, Attribute::all()));
            receiver_obj.sync_array_length(&key);
            Ok(true)
        }
    }
}

fn reject(strict: bool, message: String, context: &mut Context) -> JsResult<bool> {
    if strict {
        context.throw_type_error(message)
    } else {
        Ok(false)
    }
}

/// Merges the present fields of `desc` into `current` (same flavor).
fn merge(current: &mut PropertyDescriptor, desc: &PartialDescriptor) {
    if let Some(enumerable) = desc.enumerable {
        current.attributes_mut().set_enumerable(enumerable);
    }
    if let Some(configurable) = desc.configurable {
        current.attributes_mut().set_configurable(configurable);
    }
    match current {
        PropertyDescriptor::Data(ref mut data) => {
            let mut attributes = data.attributes();
            if let Some(writable) = desc.writable {
                attributes.set_writable(writable);
            }
            let value = desc.value.clone().unwrap_or_else(|| data.value());
            *data = DataDescriptor::new(value, attributes);
        }
        PropertyDescriptor::Accessor(ref mut accessor) => {
            if let Some(ref get) = desc.get {
                accessor.set_getter(get.clone());
            }
            if let Some(ref set) = desc.set {
                accessor.set_setter(set.clone());
            }
        }
    }
}

/// Redefining `length` on an array through `defineProperty`.
fn array_define_length(array: &JsObject, value: &JsValue, desc: &PartialDescriptor) -> bool {
    let Some(number) = value.as_number() else {
        return false;
    };
    let new_length = number as u32;
    if f64::from(new_length) != number {
        return false;
    }
    let writable_now = array
        .get_own_property(&"length".into())
        .map_or(true, |d| d.writable());
    if !writable_now {
        return false;
    }
    crate::builtins::array::array_truncate(array, u64::from(new_length));
    if desc.writable == Some(false) {
        if let Some(PropertyDescriptor::Data(data)) =
            array.get_own_property(&"length".into())
        {
            let mut attributes = data.attributes();
            attributes.set_writable(false);
            array.borrow_mut().insert(
                PropertyKey::String("length".into()),
                DataDescriptor::new(data.value(), attributes),
            );
        }
    }
    true
}
