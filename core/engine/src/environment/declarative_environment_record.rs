//! # Declarative Records
//!
//! Each declarative environment record is associated with a program scope
//! containing variable, `const`, `let`, class and/or function declarations,
//! and binds the identifiers they define.

use crate::{
    context::Context,
    environment::{
        environment_record_trait::EnvironmentRecordTrait,
        lexical_environment::{Environment, EnvironmentType},
    },
    object::JsObject,
    value::JsValue,
    JsResult,
};
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use vesper_gc::{Finalize, Trace};

/// A binding slot: `value: None` means the binding exists but is still in
/// its temporal dead zone.
#[derive(Debug, Clone, Trace, Finalize)]
pub struct DeclarativeEnvironmentRecordBinding {
    pub value: Option<JsValue>,
    #[ignore_trace]
    pub can_delete: bool,
    #[ignore_trace]
    pub mutable: bool,
    #[ignore_trace]
    pub strict: bool,
}

/// A declarative environment record binds the set of identifiers defined by
/// the declarations contained within its scope.
#[derive(Debug, Default, Trace, Finalize)]
pub struct DeclarativeEnvironmentRecord {
    pub env_rec: RefCell<FxHashMap<String, DeclarativeEnvironmentRecordBinding>>,
    pub outer_env: RefCell<Option<Environment>>,
}

impl DeclarativeEnvironmentRecord {
    pub fn new(outer: Option<Environment>) -> Self {
        Self {
            env_rec: RefCell::default(),
            outer_env: RefCell::new(outer),
        }
    }
}

impl EnvironmentRecordTrait for DeclarativeEnvironmentRecord {
    fn has_binding(&self, name: &str) -> bool {
        self.env_rec.borrow().contains_key(name)
    }

    fn create_mutable_binding(
        &self,
        name: String,
        deletion: bool,
        allow_name_reuse: bool,
        context: &mut Context,
    ) -> JsResult<()> {
        if !allow_name_reuse && self.env_rec.borrow().contains_key(&name) {
            return context
                .throw_syntax_error(format!("identifier '{name}' has already been declared"));
        }

        self.env_rec.borrow_mut().insert(
            name,
            DeclarativeEnvironmentRecordBinding {
                value: None,
                can_delete: deletion,
                mutable: true,
                strict: false,
            },
        );
        Ok(())
    }

    fn create_immutable_binding(
        &self,
        name: String,
        strict: bool,
        context: &mut Context,
    ) -> JsResult<()> {
        if self.env_rec.borrow().contains_key(&name) {
            return context
                .throw_syntax_error(format!("identifier '{name}' has already been declared"));
        }

        self.env_rec.borrow_mut().insert(
            name,
            DeclarativeEnvironmentRecordBinding {
                value: None,
                can_delete: false,
                mutable: false,
                strict,
            },
        );
        Ok(())
    }

    fn initialize_binding(
        &self,
        name: &str,
        value: JsValue,
        context: &mut Context,
    ) -> JsResult<()> {
        if let Some(record) = self.env_rec.borrow_mut().get_mut(name) {
            if record.value.is_none() {
                record.value = Some(value);
                return Ok(());
            }
            // Fall through to the error below without the borrow alive.
        } else {
            return context
                .throw_reference_error(format!("cannot initialize unknown binding '{name}'"));
        }
        context.throw_syntax_error(format!("identifier '{name}' has already been defined"))
    }

    fn set_mutable_binding(
        &self,
        name: &str,
        value: JsValue,
        strict: bool,
        context: &mut Context,
    ) -> JsResult<()> {
        enum Outcome {
            Done,
            Missing,
            Uninitialized,
            Immutable,
        }

        let outcome = {
            let mut bindings = self.env_rec.borrow_mut();
            match bindings.get_mut(name) {
                None => Outcome::Missing,
                Some(record) if record.value.is_none() => Outcome::Uninitialized,
                Some(record) if record.mutable => {
                    record.value = Some(value.clone());
                    Outcome::Done
                }
                Some(_) => Outcome::Immutable,
            }
        };

        match outcome {
            Outcome::Done => Ok(()),
            Outcome::Missing => {
                if strict {
                    return context.throw_reference_error(format!("{name} is not defined"));
                }
                self.env_rec.borrow_mut().insert(
                    name.to_owned(),
                    DeclarativeEnvironmentRecordBinding {
                        value: Some(value),
                        can_delete: true,
                        mutable: true,
                        strict: false,
                    },
                );
                Ok(())
            }
            Outcome::Uninitialized => context
                .throw_reference_error(format!("cannot access '{name}' before initialization")),
            // `const` assignment throws regardless of mode.
            Outcome::Immutable => {
                context.throw_type_error(format!("assignment to constant variable '{name}'"))
            }
        }
    }

    fn get_binding_value(
        &self,
        name: &str,
        _strict: bool,
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let value = self
            .env_rec
            .borrow()
            .get(name)
            .map(|binding| binding.value.clone());
        match value {
            Some(Some(value)) => Ok(value),
            Some(None) => context
                .throw_reference_error(format!("cannot access '{name}' before initialization")),
            None => context.throw_reference_error(format!("{name} is not defined")),
        }
    }

    fn delete_binding(&self, name: &str) -> bool {
        let mut bindings = self.env_rec.borrow_mut();
        match bindings.get(name) {
            Some(binding) => {
                if binding.can_delete {
                    bindings.remove(name);
                    true
                } else {
                    false
                }
            }
            None => true,
        }
    }

    fn has_this_binding(&self) -> bool {
        false
    }

    fn get_this_binding(&self, _context: &mut Context) -> JsResult<JsValue> {
        Ok(JsValue::undefined())
    }

    fn with_base_object(&self) -> Option<JsObject> {
        None
    }

    fn get_outer_environment(&self) -> Option<Environment> {
        self.outer_env.borrow().clone()
    }

    fn set_outer_environment(&self, env: Environment) {
        *self.outer_env.borrow_mut() = Some(env);
    }

    fn get_environment_type(&self) -> EnvironmentType {
        EnvironmentType::Declarative
    }

    fn get_global_object(&self) -> Option<JsValue> {
        let outer = self.outer_env.borrow().clone();
        outer.and_then(|outer| outer.borrow().get_global_object())
    }
}
