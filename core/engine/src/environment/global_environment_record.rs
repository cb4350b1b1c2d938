//! # Global Records
//!
//! The global environment is an object record over the global object plus a
//! declarative record for lexical (`let`/`const`/class) declarations. `var`
//! declarations become non-configurable properties of the global object;
//! implicit sloppy-mode assignments create configurable ones.

use crate::{
    context::Context,
    environment::{
        declarative_environment_record::DeclarativeEnvironmentRecord,
        environment_record_trait::EnvironmentRecordTrait,
        lexical_environment::{Environment, EnvironmentType},
        object_environment_record::ObjectEnvironmentRecord,
    },
    object::JsObject,
    property::{Attribute, DataDescriptor, PropertyKey},
    value::JsValue,
    JsResult,
};
use rustc_hash::FxHashSet;
use std::cell::RefCell;
use vesper_gc::{Finalize, Trace};

#[derive(Debug, Trace, Finalize)]
pub struct GlobalEnvironmentRecord {
    pub object_record: ObjectEnvironmentRecord,
    pub declarative_record: DeclarativeEnvironmentRecord,
    pub global_this_binding: JsObject,
    #[ignore_trace]
    pub var_names: RefCell<FxHashSet<String>>,
}

impl GlobalEnvironmentRecord {
    pub fn new(global: JsObject, this: JsObject) -> Self {
        Self {
            object_record: ObjectEnvironmentRecord::new(global, false, None),
            declarative_record: DeclarativeEnvironmentRecord::new(None),
            global_this_binding: this,
            var_names: RefCell::default(),
        }
    }
}

impl EnvironmentRecordTrait for GlobalEnvironmentRecord {
    fn has_binding(&self, name: &str) -> bool {
        self.declarative_record.has_binding(name) || self.object_record.has_binding(name)
    }

    /// Lexical declarations at the top level live in the declarative record
    /// and shadow same-named global-object properties.
    fn create_mutable_binding(
        &self,
        name: String,
        deletion: bool,
        allow_name_reuse: bool,
        context: &mut Context,
    ) -> JsResult<()> {
        self.declarative_record
            .create_mutable_binding(name, deletion, allow_name_reuse, context)
    }

    fn create_immutable_binding(
        &self,
        name: String,
        strict: bool,
        context: &mut Context,
    ) -> JsResult<()> {
        self.declarative_record
            .create_immutable_binding(name, strict, context)
    }

    fn initialize_binding(
        &self,
        name: &str,
        value: JsValue,
        context: &mut Context,
    ) -> JsResult<()> {
        if self.declarative_record.has_binding(name) {
            return self.declarative_record.initialize_binding(name, value, context);
        }
        self.object_record.initialize_binding(name, value, context)
    }

    fn set_mutable_binding(
        &self,
        name: &str,
        value: JsValue,
        strict: bool,
        context: &mut Context,
    ) -> JsResult<()> {
        if self.declarative_record.has_binding(name) {
            return self
                .declarative_record
                .set_mutable_binding(name, value, strict, context);
        }
        self.object_record
            .set_mutable_binding(name, value, strict, context)
    }

    fn get_binding_value(
        &self,
        name: &str,
        strict: bool,
        context: &mut Context,
    ) -> JsResult<JsValue> {
        if self.declarative_record.has_binding(name) {
            return self.declarative_record.get_binding_value(name, strict, context);
        }
        self.object_record.get_binding_value(name, strict, context)
    }

    fn delete_binding(&self, name: &str) -> bool {
        if self.declarative_record.has_binding(name) {
            return self.declarative_record.delete_binding(name);
        }
        if self.object_record.has_binding(name) {
            let deleted = self.object_record.delete_binding(name);
            if deleted {
                self.var_names.borrow_mut().remove(name);
            }
            return deleted;
        }
        true
    }

    fn has_this_binding(&self) -> bool {
        true
    }

    fn get_this_binding(&self, _context: &mut Context) -> JsResult<JsValue> {
        Ok(self.global_this_binding.clone().into())
    }

    fn with_base_object(&self) -> Option<JsObject> {
        None
    }

    fn get_outer_environment(&self) -> Option<Environment> {
        None
    }

    fn set_outer_environment(&self, _env: Environment) {
        panic!("the global environment has no outer environment");
    }

    fn get_environment_type(&self) -> EnvironmentType {
        EnvironmentType::Global
    }

    fn get_global_object(&self) -> Option<JsValue> {
        Some(self.object_record.bindings.clone().into())
    }

    /// Hoisted `var` bindings on the global object are not configurable.
    fn create_global_var_binding(
        &self,
        name: String,
        deletion: bool,
        _context: &mut Context,
    ) -> JsResult<()> {
        if self.has_binding(&name) {
            return Ok(());
        }
        let mut attributes = Attribute::WRITABLE | Attribute::ENUMERABLE;
        attributes.set_configurable(deletion);
        self.object_record.bindings.borrow_mut().insert(
            PropertyKey::from(name.as_str()),
            DataDescriptor::new(JsValue::undefined(), attributes),
        );
        self.var_names.borrow_mut().insert(name);
        Ok(())
    }
}
