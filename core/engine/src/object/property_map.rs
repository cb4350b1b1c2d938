//! Ordered property storage.
//!
//! Enumeration order is observable: canonical integer indexes ascending,
//! then string keys in insertion order, then symbol keys in insertion order.
//! Indexes live in a `BTreeMap` so the ascending order falls out of
//! iteration; the other two tables are insertion-ordered `IndexMap`s.

use crate::{
    property::{PropertyDescriptor, PropertyKey},
    string::JsString,
    symbol::JsSymbol,
};
use indexmap::IndexMap;
use rustc_hash::FxHasher;
use std::collections::BTreeMap;
use std::hash::BuildHasherDefault;
use vesper_gc::{custom_trace, Finalize};

type OrderedMap<K> = IndexMap<K, PropertyDescriptor, BuildHasherDefault<FxHasher>>;

#[derive(Default, Debug)]
pub struct PropertyMap {
    indexed_properties: BTreeMap<u32, PropertyDescriptor>,
    string_properties: OrderedMap<JsString>,
    symbol_properties: OrderedMap<JsSymbol>,
}

impl Finalize for PropertyMap {}

custom_trace!(PropertyMap, this, {
    for value in this.indexed_properties.values() {
        mark!(value);
    }
    for value in this.string_properties.values() {
        mark!(value);
    }
    for value in this.symbol_properties.values() {
        mark!(value);
    }
});

impl PropertyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &PropertyKey) -> Option<&PropertyDescriptor> {
        match key {
            PropertyKey::Index(index) => self.indexed_properties.get(index),
            PropertyKey::String(string) => self.string_properties.get(string),
            PropertyKey::Symbol(symbol) => self.symbol_properties.get(symbol),
        }
    }

    pub fn get_mut(&mut self, key: &PropertyKey) -> Option<&mut PropertyDescriptor> {
        match key {
            PropertyKey::Index(index) => self.indexed_properties.get_mut(index),
            PropertyKey::String(string) => self.string_properties.get_mut(string),
            PropertyKey::Symbol(symbol) => self.symbol_properties.get_mut(symbol),
        }
    }

    pub fn insert(
        &mut self,
        key: &PropertyKey,
        property: PropertyDescriptor,
    ) -> Option<PropertyDescriptor> {
        match key {
            PropertyKey::Index(index) => self.indexed_properties.insert(*index, property),
            PropertyKey::String(string) => self.string_properties.insert(string.clone(), property),
            PropertyKey::Symbol(symbol) => self.symbol_properties.insert(symbol.clone(), property),
        }
    }

    /// Removal keeps the relative order of the remaining keys.
    pub fn remove(&mut self, key: &PropertyKey) -> Option<PropertyDescriptor> {
        match key {
            PropertyKey::Index(index) => self.indexed_properties.remove(index),
            PropertyKey::String(string) => self.string_properties.shift_remove(string),
            PropertyKey::Symbol(symbol) => self.symbol_properties.shift_remove(symbol),
        }
    }

    pub fn contains_key(&self, key: &PropertyKey) -> bool {
        match key {
            PropertyKey::Index(index) => self.indexed_properties.contains_key(index),
            PropertyKey::String(string) => self.string_properties.contains_key(string),
            PropertyKey::Symbol(symbol) => self.symbol_properties.contains_key(symbol),
        }
    }

    /// All keys in enumeration order.
    pub fn keys(&self) -> impl Iterator<Item = PropertyKey> + '_ {
        self.indexed_properties
            .keys()
            .map(|index| PropertyKey::Index(*index))
            .chain(
                self.string_properties
                    .keys()
                    .map(|string| PropertyKey::String(string.clone())),
            )
            .chain(
                self.symbol_properties
                    .keys()
                    .map(|symbol| PropertyKey::Symbol(symbol.clone())),
            )
    }

    /// All `(key, descriptor)` pairs in enumeration order.
    pub fn iter(&self) -> impl Iterator<Item = (PropertyKey, &PropertyDescriptor)> + '_ {
        self.indexed_properties
            .iter()
            .map(|(index, property)| (PropertyKey::Index(*index), property))
            .chain(
                self.string_properties
                    .iter()
                    .map(|(string, property)| (PropertyKey::String(string.clone()), property)),
            )
            .chain(
                self.symbol_properties
                    .iter()
                    .map(|(symbol, property)| (PropertyKey::Symbol(symbol.clone()), property)),
            )
    }

    /// Index keys in ascending order.
    pub fn index_property_keys(&self) -> impl Iterator<Item = u32> + '_ {
        self.indexed_properties.keys().copied()
    }

    /// Index keys above or equal to `from`, descending. Used by the array
    /// `length` truncation, which deletes from the top down.
    pub fn index_property_keys_from(&self, from: u32) -> Vec<u32> {
        let mut keys: Vec<u32> = self.indexed_properties.range(from..).map(|(k, _)| *k).collect();
        keys.reverse();
        keys
    }

    /// String keys in insertion order.
    pub fn string_property_keys(&self) -> impl Iterator<Item = &JsString> + '_ {
        self.string_properties.keys()
    }

    pub fn len(&self) -> usize {
        self.indexed_properties.len() + self.string_properties.len() + self.symbol_properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Applies `f` to every descriptor in place; used by `seal`/`freeze`.
    pub fn update_attributes(&mut self, mut f: impl FnMut(&mut PropertyDescriptor)) {
        for property in self.indexed_properties.values_mut() {
            f(property);
        }
        for property in self.string_properties.values_mut() {
            f(property);
        }
        for property in self.symbol_properties.values_mut() {
            f(property);
        }
    }

    /// Whether `predicate` holds for every descriptor.
    pub fn all(&self, mut predicate: impl FnMut(&PropertyDescriptor) -> bool) -> bool {
        self.indexed_properties.values().all(&mut predicate)
            && self.string_properties.values().all(&mut predicate)
            && self.symbol_properties.values().all(&mut predicate)
    }
}
