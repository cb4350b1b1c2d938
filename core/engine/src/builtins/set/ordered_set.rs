//! Insertion-ordered storage for `Set`, tombstoned like the map storage.

use crate::value::{same_value_zero, JsValue};
use vesper_gc::{Finalize, Trace, Tracer};

#[derive(Debug, Default)]
pub struct OrderedSet {
    values: Vec<Option<JsValue>>,
    size: usize,
}

impl Finalize for OrderedSet {}

impl Trace for OrderedSet {
    fn trace(&self, tracer: &mut Tracer) {
        for value in self.values.iter().flatten() {
            value.trace(tracer);
        }
    }
}

impl OrderedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    fn position(&self, value: &JsValue) -> Option<usize> {
        self.values.iter().position(|slot| {
            slot.as_ref()
                .map_or(false, |existing| same_value_zero(existing, value))
        })
    }

    pub fn contains(&self, value: &JsValue) -> bool {
        self.position(value).is_some()
    }

    /// Re-adding an existing value keeps its original position.
    pub fn add(&mut self, value: JsValue) {
        if self.position(&value).is_none() {
            self.values.push(Some(value));
            self.size += 1;
        }
    }

    pub fn remove(&mut self, value: &JsValue) -> bool {
        match self.position(value) {
            Some(index) => {
                self.values[index] = None;
                self.size -= 1;
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.values.clear();
        self.size = 0;
    }

    pub fn value_at(&self, index: usize) -> Option<&JsValue> {
        self.values.get(index).and_then(Option::as_ref)
    }

    pub fn raw_len(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &JsValue> {
        self.values.iter().flatten()
    }
}
