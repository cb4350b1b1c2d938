//! A realm: the global object together with its environment stack.
//!
//! Every `Context` owns exactly one realm; the intrinsics installed at
//! initialization are scoped to it.

use crate::environment::lexical_environment::LexicalEnvironment;
use crate::object::{JsObject, Object, ObjectData};
use crate::value::JsValue;

#[derive(Debug)]
pub struct Realm {
    pub global_object: JsObject,
    pub environment: LexicalEnvironment,
}

impl Realm {
    /// Creates the global object and wires the global environment around
    /// it. The builtin surface is installed later by `builtins::init`.
    pub fn create() -> Self {
        let global_object = JsObject::new(Object::with_prototype(JsValue::Null, ObjectData::Global));
        let environment = LexicalEnvironment::new(global_object.clone());
        Self {
            global_object,
            environment,
        }
    }

    pub fn global_object(&self) -> &JsObject {
        &self.global_object
    }
}
