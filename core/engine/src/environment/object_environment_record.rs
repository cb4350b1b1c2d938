//! # Object Records
//!
//! An object environment record is backed by a specific object: the global
//! object, or the target of a `with` statement. Binding operations go
//! through the object's property protocol; `deletable` follows property
//! configurability and `mutable` follows writability.

use crate::{
    context::Context,
    environment::{
        environment_record_trait::EnvironmentRecordTrait,
        lexical_environment::{Environment, EnvironmentType},
    },
    object::JsObject,
    property::{Attribute, DataDescriptor, PropertyKey},
    value::JsValue,
    JsResult,
};
use std::cell::RefCell;
use vesper_gc::{Finalize, Trace};

#[derive(Debug, Trace, Finalize)]
pub struct ObjectEnvironmentRecord {
    pub bindings: JsObject,
    /// Set for `with` environments: their base object is exposed to the
    /// interpreter for method receivers.
    #[ignore_trace]
    pub with_environment: bool,
    pub outer_env: RefCell<Option<Environment>>,
}

impl ObjectEnvironmentRecord {
    pub fn new(bindings: JsObject, with_environment: bool, outer: Option<Environment>) -> Self {
        Self {
            bindings,
            with_environment,
            outer_env: RefCell::new(outer),
        }
    }
}

impl EnvironmentRecordTrait for ObjectEnvironmentRecord {
    fn has_binding(&self, name: &str) -> bool {
        self.bindings.has_property(&PropertyKey::from(name))
    }

    fn create_mutable_binding(
        &self,
        name: String,
        deletion: bool,
        _allow_name_reuse: bool,
        _context: &mut Context,
    ) -> JsResult<()> {
        let mut attributes = Attribute::WRITABLE | Attribute::ENUMERABLE;
        attributes.set_configurable(deletion);
        self.bindings.borrow_mut().insert(
            PropertyKey::from(name.as_str()),
            DataDescriptor::new(JsValue::undefined(), attributes),
        );
        Ok(())
    }

    fn create_immutable_binding(
        &self,
        _name: String,
        _strict: bool,
        _context: &mut Context,
    ) -> JsResult<()> {
        // Object records never hold immutable bindings; `const` always
        // lands in a declarative record.
        Ok(())
    }

    fn initialize_binding(
        &self,
        name: &str,
        value: JsValue,
        context: &mut Context,
    ) -> JsResult<()> {
        self.set_mutable_binding(name, value, false, context)
    }

    fn set_mutable_binding(
        &self,
        name: &str,
        value: JsValue,
        strict: bool,
        context: &mut Context,
    ) -> JsResult<()> {
        let receiver = JsValue::from(self.bindings.clone());
        self.bindings
            .set(PropertyKey::from(name), value, receiver, strict, context)?;
        Ok(())
    }

    fn get_binding_value(
        &self,
        name: &str,
        strict: bool,
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let key = PropertyKey::from(name);
        if !self.bindings.has_property(&key) {
            if strict {
                return context.throw_reference_error(format!("{name} is not defined"));
            }
            return Ok(JsValue::undefined());
        }
        let receiver = JsValue::from(self.bindings.clone());
        self.bindings.get(&key, receiver, context)
    }

    fn delete_binding(&self, name: &str) -> bool {
        self.bindings.delete(&PropertyKey::from(name))
    }

    fn has_this_binding(&self) -> bool {
        false
    }

    fn get_this_binding(&self, _context: &mut Context) -> JsResult<JsValue> {
        Ok(JsValue::undefined())
    }

    fn with_base_object(&self) -> Option<JsObject> {
        if self.with_environment {
            Some(self.bindings.clone())
        } else {
            None
        }
    }

    fn get_outer_environment(&self) -> Option<Environment> {
        self.outer_env.borrow().clone()
    }

    fn set_outer_environment(&self, env: Environment) {
        *self.outer_env.borrow_mut() = Some(env);
    }

    fn get_environment_type(&self) -> EnvironmentType {
        EnvironmentType::Object
    }

    fn get_global_object(&self) -> Option<JsValue> {
        if self.bindings.borrow().is_global() {
            return Some(self.bindings.clone().into());
        }
        let outer = self.outer_env.borrow().clone();
        outer.and_then(|outer| outer.borrow().get_global_object())
    }
}
