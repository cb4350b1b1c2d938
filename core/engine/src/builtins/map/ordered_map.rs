//! Insertion-ordered entry storage for `Map`.
//!
//! Entries are tombstoned instead of removed so that live iterators keep a
//! stable view of the order while the map mutates underneath them.

use crate::value::{same_value_zero, JsValue};
use vesper_gc::{Finalize, Trace, Tracer};

#[derive(Debug, Default)]
pub struct OrderedMap {
    entries: Vec<Option<(JsValue, JsValue)>>,
    size: usize,
}

impl Finalize for OrderedMap {}

impl Trace for OrderedMap {
    fn trace(&self, tracer: &mut Tracer) {
        for entry in self.entries.iter().flatten() {
            entry.0.trace(tracer);
            entry.1.trace(tracer);
        }
    }
}

impl OrderedMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    fn position(&self, key: &JsValue) -> Option<usize> {
        self.entries.iter().position(|entry| {
            entry
                .as_ref()
                .map_or(false, |(existing, _)| same_value_zero(existing, key))
        })
    }

    /// Keys are compared with `SameValueZero`, so `NaN` is a usable key.
    pub fn get(&self, key: &JsValue) -> Option<&JsValue> {
        self.position(key)
            .and_then(|index| self.entries[index].as_ref())
            .map(|(_, value)| value)
    }

    pub fn contains_key(&self, key: &JsValue) -> bool {
        self.position(key).is_some()
    }

    /// Inserting an existing key overwrites in place, keeping its original
    /// position in the order.
    pub fn insert(&mut self, key: JsValue, value: JsValue) {
        match self.position(&key) {
            Some(index) => self.entries[index] = Some((key, value)),
            None => {
                self.entries.push(Some((key, value)));
                self.size += 1;
            }
        }
    }

    pub fn remove(&mut self, key: &JsValue) -> bool {
        match self.position(key) {
            Some(index) => {
                self.entries[index] = None;
                self.size -= 1;
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.size = 0;
    }

    /// The entry at a raw slot, if still live. Iterators step raw slots.
    pub fn entry_at(&self, index: usize) -> Option<&(JsValue, JsValue)> {
        self.entries.get(index).and_then(Option::as_ref)
    }

    /// Number of raw slots, live or tombstoned.
    pub fn raw_len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(JsValue, JsValue)> {
        self.entries.iter().flatten()
    }
}
