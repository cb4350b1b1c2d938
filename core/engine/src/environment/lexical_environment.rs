//! # Lexical Environment
//!
//! The scope-chain entry point: a stack of environments, each holding a
//! pointer to its enclosing environment. Name resolution walks outward
//! until found or the chain is exhausted.
//!
//! The chain operations are free functions over a cheap [`Environment`]
//! handle: the interpreter clones the current handle out of the context
//! first, so binding operations can re-enter the context freely.

use crate::{
    context::Context,
    environment::{
        declarative_environment_record::DeclarativeEnvironmentRecord,
        environment_record_trait::EnvironmentRecordTrait,
        function_environment_record::{BindingStatus, FunctionEnvironmentRecord},
        global_environment_record::GlobalEnvironmentRecord,
        object_environment_record::ObjectEnvironmentRecord,
    },
    object::JsObject,
    value::JsValue,
    JsResult,
};
use std::collections::VecDeque;
use vesper_gc::Gc;

/// Environments are boxed trait objects behind a garbage-collected cell, so
/// closures can capture and outlive them.
pub type Environment = Gc<Box<dyn EnvironmentRecordTrait>>;

/// Gives each environment an easy way to declare its own kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvironmentType {
    Declarative,
    Function,
    Global,
    Object,
}

/// The scope of a variable declaration.
#[derive(Debug, Clone, Copy)]
pub enum VariableScope {
    /// The declaration is scoped to the current block (`let` and `const`).
    Block,
    /// The declaration is scoped to the current function (`var`).
    Function,
}

/// The environment stack of one realm.
#[derive(Debug)]
pub struct LexicalEnvironment {
    environment_stack: VecDeque<Environment>,
}

pub fn new_declarative_environment(env: Option<Environment>) -> Environment {
    Gc::new(Box::new(DeclarativeEnvironmentRecord::new(env)) as Box<dyn EnvironmentRecordTrait>)
}

pub fn new_function_environment(
    function: JsObject,
    this: Option<JsValue>,
    outer: Option<Environment>,
    binding_status: BindingStatus,
) -> Environment {
    Gc::new(Box::new(FunctionEnvironmentRecord::new(
        function,
        this,
        outer,
        binding_status,
    )) as Box<dyn EnvironmentRecordTrait>)
}

pub fn new_object_environment(
    object: JsObject,
    with_environment: bool,
    environment: Option<Environment>,
) -> Environment {
    Gc::new(Box::new(ObjectEnvironmentRecord::new(
        object,
        with_environment,
        environment,
    )) as Box<dyn EnvironmentRecordTrait>)
}

pub fn new_global_environment(global: JsObject, this: JsObject) -> Environment {
    Gc::new(Box::new(GlobalEnvironmentRecord::new(global, this)) as Box<dyn EnvironmentRecordTrait>)
}

impl LexicalEnvironment {
    pub fn new(global: JsObject) -> Self {
        let global_env = new_global_environment(global.clone(), global);
        let mut environment_stack = VecDeque::new();
        environment_stack.push_back(global_env);
        Self { environment_stack }
    }

    /// Pushes `env` and wires its outer pointer to the current environment.
    pub fn push(&mut self, env: Environment) {
        let current = self.get_current_environment().clone();
        env.borrow().set_outer_environment(current);
        self.environment_stack.push_back(env);
    }

    pub fn pop(&mut self) -> Option<Environment> {
        // The global environment stays.
        if self.environment_stack.len() > 1 {
            self.environment_stack.pop_back()
        } else {
            None
        }
    }

    pub fn get_current_environment(&self) -> &Environment {
        self.environment_stack
            .back()
            .expect("environment stack underflow")
    }

    pub fn get_global_environment(&self) -> &Environment {
        self.environment_stack
            .front()
            .expect("environment stack underflow")
    }

    pub fn get_global_object(&self) -> Option<JsValue> {
        self.get_global_environment().borrow().get_global_object()
    }

    /// A cheap handle to the current environment; chain operations run on
    /// it through the free functions below.
    pub fn current(&self) -> Environment {
        self.get_current_environment().clone()
    }
}

/// Walks outward from `start`, applying `f` until it yields.
fn walk<T>(start: &Environment, mut f: impl FnMut(&Environment) -> Option<T>) -> Option<T> {
    let mut current = Some(start.clone());
    while let Some(env) = current {
        if let Some(result) = f(&env) {
            return Some(result);
        }
        current = env.borrow().get_outer_environment();
    }
    None
}

fn find_binding_holder(start: &Environment, name: &str) -> Option<Environment> {
    walk(start, |env| env.borrow().has_binding(name).then(|| env.clone()))
}

pub fn has_binding(start: &Environment, name: &str) -> bool {
    find_binding_holder(start, name).is_some()
}

/// Resolves `name` through the chain; an unresolved name is a
/// `ReferenceError`.
pub fn get_binding_value(
    start: &Environment,
    name: &str,
    context: &mut Context,
) -> JsResult<JsValue> {
    match find_binding_holder(start, name) {
        Some(env) => {
            let record = env.borrow();
            record.get_binding_value(name, false, context)
        }
        None => context.throw_reference_error(format!("{name} is not defined")),
    }
}

/// Writes `name` through the chain; when unresolved, sloppy mode lands on
/// the outermost (global) environment, strict mode throws.
pub fn set_mutable_binding(
    start: &Environment,
    name: &str,
    value: JsValue,
    strict: bool,
    context: &mut Context,
) -> JsResult<()> {
    match find_binding_holder(start, name) {
        Some(env) => env.borrow().set_mutable_binding(name, value, strict, context),
        None => {
            if strict {
                return context.throw_reference_error(format!("{name} is not defined"));
            }
            let global = outermost(start);
            let record = global.borrow();
            record.set_mutable_binding(name, value, false, context)
        }
    }
}

fn outermost(start: &Environment) -> Environment {
    let mut current = start.clone();
    loop {
        let outer = current.borrow().get_outer_environment();
        match outer {
            Some(outer) => current = outer,
            None => return current,
        }
    }
}

/// Declares a mutable binding at the scope the declaration form asks for:
/// the current block, or the innermost function/global environment.
pub fn create_mutable_binding(
    start: &Environment,
    name: String,
    deletion: bool,
    scope: VariableScope,
    context: &mut Context,
) -> JsResult<()> {
    match scope {
        VariableScope::Block => start
            .borrow()
            .create_mutable_binding(name, deletion, false, context),
        VariableScope::Function => {
            let env = walk(start, |env| {
                matches!(
                    env.borrow().get_environment_type(),
                    EnvironmentType::Function | EnvironmentType::Global
                )
                .then(|| env.clone())
            })
            .expect("no function or global environment");
            let record = env.borrow();
            record.create_global_var_binding(name, deletion, context)
        }
    }
}

pub fn create_immutable_binding(
    start: &Environment,
    name: String,
    context: &mut Context,
) -> JsResult<()> {
    start.borrow().create_immutable_binding(name, false, context)
}

/// Initializes a binding created earlier in this scope chain.
pub fn initialize_binding(
    start: &Environment,
    name: &str,
    value: JsValue,
    context: &mut Context,
) -> JsResult<()> {
    match find_binding_holder(start, name) {
        Some(env) => env.borrow().initialize_binding(name, value, context),
        None => {
            context.throw_reference_error(format!("cannot initialize unknown binding '{name}'"))
        }
    }
}

pub fn delete_binding(start: &Environment, name: &str) -> bool {
    match find_binding_holder(start, name) {
        Some(env) => env.borrow().delete_binding(name),
        None => true,
    }
}

/// The nearest `this` binding.
pub fn get_this_binding(start: &Environment, context: &mut Context) -> JsResult<JsValue> {
    let holder = walk(start, |env| env.borrow().has_this_binding().then(|| env.clone()));
    match holder {
        Some(env) => {
            let record = env.borrow();
            record.get_this_binding(context)
        }
        None => Ok(JsValue::undefined()),
    }
}

/// The innermost `with` base object containing `name`, used to pick method
/// receivers.
pub fn with_base_object(start: &Environment, name: &str) -> Option<JsObject> {
    walk(start, |env| {
        let record = env.borrow();
        if record.has_binding(name) {
            Some(record.with_base_object())
        } else {
            None
        }
    })
    .flatten()
}
