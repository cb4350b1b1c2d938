//! # Environment Records
//!
//! In the ECMAScript specification environment records are hierarchical and
//! have a base class with abstract methods; here every record kind
//! implements this trait instead.
//!
//! Methods take `&self`: records sit behind shared garbage-collected
//! handles and binding operations on object-backed records can re-enter the
//! interpreter (getters, setters), so mutation is interior.

use crate::{
    context::Context,
    environment::lexical_environment::{Environment, EnvironmentType},
    object::JsObject,
    value::JsValue,
    JsResult,
};
use std::fmt::Debug;
use vesper_gc::{Finalize, Trace};

pub trait EnvironmentRecordTrait: Debug + Trace + Finalize {
    /// Determine if an environment record has a binding for the name.
    fn has_binding(&self, name: &str) -> bool;

    /// Create a new but uninitialized mutable binding.
    /// If `deletion` is true the binding may subsequently be deleted.
    /// `allow_name_reuse` permits shadowing an existing binding with the
    /// same name (function parameters may repeat).
    fn create_mutable_binding(
        &self,
        name: String,
        deletion: bool,
        allow_name_reuse: bool,
        context: &mut Context,
    ) -> JsResult<()>;

    /// Create a new but uninitialized immutable binding. Assignments after
    /// initialization throw.
    fn create_immutable_binding(
        &self,
        name: String,
        strict: bool,
        context: &mut Context,
    ) -> JsResult<()>;

    /// Set the value of an already existing but uninitialized binding.
    fn initialize_binding(
        &self,
        name: &str,
        value: JsValue,
        context: &mut Context,
    ) -> JsResult<()>;

    /// Set the value of an already existing mutable binding. With `strict`,
    /// a failed write throws a `TypeError`.
    fn set_mutable_binding(
        &self,
        name: &str,
        value: JsValue,
        strict: bool,
        context: &mut Context,
    ) -> JsResult<()>;

    /// Return the value of an existing binding. An uninitialized binding
    /// (temporal dead zone) raises a `ReferenceError` distinct from absence.
    fn get_binding_value(
        &self,
        name: &str,
        strict: bool,
        context: &mut Context,
    ) -> JsResult<JsValue>;

    /// Delete a binding. Returns `true` when the binding is gone afterwards
    /// and `false` when it exists but cannot be removed.
    fn delete_binding(&self, name: &str) -> bool;

    /// Determine if the record establishes a `this` binding.
    fn has_this_binding(&self) -> bool;

    /// Return the `this` binding of this record.
    fn get_this_binding(&self, context: &mut Context) -> JsResult<JsValue>;

    /// If this record is for a `with` statement, its base object.
    fn with_base_object(&self) -> Option<JsObject>;

    /// The next environment up the chain.
    fn get_outer_environment(&self) -> Option<Environment>;

    /// Set the next environment up the chain.
    fn set_outer_environment(&self, env: Environment);

    /// Which kind of record this is.
    fn get_environment_type(&self) -> EnvironmentType;

    /// The global object, resolved through the chain.
    fn get_global_object(&self) -> Option<JsValue>;

    /// `var` declarations reaching the global environment become properties
    /// of the global object; every other record treats them as ordinary
    /// mutable bindings.
    fn create_global_var_binding(
        &self,
        name: String,
        deletion: bool,
        context: &mut Context,
    ) -> JsResult<()> {
        if self.has_binding(&name) {
            return Ok(());
        }
        self.create_mutable_binding(name, deletion, false, context)
    }
}
