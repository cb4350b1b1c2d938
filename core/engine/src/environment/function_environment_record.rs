//! # Function Records
//!
//! A function environment record is a declarative record with a `this`
//! binding on top. Arrow functions never bind `this` (status `Lexical`),
//! ordinary calls arrive with it initialized, and constructor bodies may
//! observe it uninitialized until the base constructor runs.

use crate::{
    context::Context,
    environment::{
        declarative_environment_record::DeclarativeEnvironmentRecord,
        environment_record_trait::EnvironmentRecordTrait,
        lexical_environment::{Environment, EnvironmentType},
    },
    object::JsObject,
    value::JsValue,
    JsResult,
};
use std::cell::{Cell, RefCell};
use vesper_gc::{Finalize, Trace};

/// Whether the record binds `this`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingStatus {
    /// An arrow function: `this` resolves lexically.
    Lexical,
    /// `this` is bound and usable.
    Initialized,
    /// `this` exists but may not be accessed yet.
    Uninitialized,
}

#[derive(Debug, Trace, Finalize)]
pub struct FunctionEnvironmentRecord {
    pub declarative_record: DeclarativeEnvironmentRecord,
    /// The function whose invocation created this record.
    pub function: JsObject,
    pub this_value: RefCell<JsValue>,
    #[ignore_trace]
    pub this_binding_status: Cell<BindingStatus>,
}

impl FunctionEnvironmentRecord {
    pub fn new(
        function: JsObject,
        this: Option<JsValue>,
        outer: Option<Environment>,
        binding_status: BindingStatus,
    ) -> Self {
        Self {
            declarative_record: DeclarativeEnvironmentRecord::new(outer),
            function,
            this_value: RefCell::new(this.unwrap_or_default()),
            this_binding_status: Cell::new(binding_status),
        }
    }

    /// Binds `this` in a record created uninitialized; double binding is a
    /// `ReferenceError` per the super-call semantics.
    pub fn bind_this_value(&self, value: JsValue, context: &mut Context) -> JsResult<()> {
        match self.this_binding_status.get() {
            BindingStatus::Lexical => {
                context.throw_reference_error("cannot bind 'this' in an arrow function")
            }
            BindingStatus::Initialized => {
                context.throw_reference_error("'this' has already been initialized")
            }
            BindingStatus::Uninitialized => {
                *self.this_value.borrow_mut() = value;
                self.this_binding_status.set(BindingStatus::Initialized);
                Ok(())
            }
        }
    }
}

impl EnvironmentRecordTrait for FunctionEnvironmentRecord {
    fn has_binding(&self, name: &str) -> bool {
        self.declarative_record.has_binding(name)
    }

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
        self.declarative_record
            .initialize_binding(name, value, context)
    }

    fn set_mutable_binding(
        &self,
        name: &str,
        value: JsValue,
        strict: bool,
        context: &mut Context,
    ) -> JsResult<()> {
        self.declarative_record
            .set_mutable_binding(name, value, strict, context)
    }

    fn get_binding_value(
        &self,
        name: &str,
        strict: bool,
        context: &mut Context,
    ) -> JsResult<JsValue> {
        self.declarative_record
            .get_binding_value(name, strict, context)
    }

    fn delete_binding(&self, name: &str) -> bool {
        self.declarative_record.delete_binding(name)
    }

    fn has_this_binding(&self) -> bool {
        self.this_binding_status.get() != BindingStatus::Lexical
    }

    fn get_this_binding(&self, context: &mut Context) -> JsResult<JsValue> {
        match self.this_binding_status.get() {
            BindingStatus::Lexical => Ok(JsValue::undefined()),
            BindingStatus::Uninitialized => context.throw_reference_error(
                "must call super constructor before accessing 'this'",
            ),
            BindingStatus::Initialized => Ok(self.this_value.borrow().clone()),
        }
    }

    fn with_base_object(&self) -> Option<JsObject> {
        None
    }

    fn get_outer_environment(&self) -> Option<Environment> {
        self.declarative_record.outer_env.borrow().clone()
    }

    fn set_outer_environment(&self, env: Environment) {
        *self.declarative_record.outer_env.borrow_mut() = Some(env);
    }

    fn get_environment_type(&self) -> EnvironmentType {
        EnvironmentType::Function
    }

    fn get_global_object(&self) -> Option<JsValue> {
        self.declarative_record.get_global_object()
    }
}
