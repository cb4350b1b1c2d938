//! This module implements the `JsObject` handle: a garbage-collected
//! reference to an [`Object`] with the call/construct machinery.

use super::{Object, ObjectData, PROTOTYPE};
use crate::{
    builtins::function::{create_unmapped_arguments_object, Captures, Function},
    context::Context,
    environment::{
        function_environment_record::BindingStatus, lexical_environment::new_function_environment,
    },
    exec::{Executable, ExecutionState},
    syntax::ast::node::{FormalParameter, RcStatementList},
    value::{JsValue, PreferredType},
    JsResult,
};
use std::fmt::{self, Debug};
use vesper_gc::{Finalize, Gc, GcRef, GcRefMut, Trace, Tracer, WeakGc};

/// A wrapper type for an immutably borrowed `Object`.
pub type Ref<'a> = GcRef<'a, Object>;

/// A wrapper type for a mutably borrowed `Object`.
pub type RefMut<'a> = GcRefMut<'a, Object>;

/// Garbage collected `Object` handle.
#[derive(Clone)]
pub struct JsObject(Gc<Object>);

impl Default for JsObject {
    #[inline]
    fn default() -> Self {
        Self::new(Object::default())
    }
}

/// The body of a function: either native Rust code or an AST to walk.
///
/// Cloned out of the object so the borrow is released before the body runs.
enum FunctionBody {
    Native(crate::builtins::function::NativeFunction),
    Closure {
        function: std::rc::Rc<crate::builtins::function::ClosureFunction>,
        captures: Captures,
    },
    Ordinary {
        body: RcStatementList,
        params: Box<[FormalParameter]>,
        environment: crate::environment::lexical_environment::Environment,
        lexical_this: bool,
    },
    Bound {
        target: JsObject,
        this: JsValue,
        args: Vec<JsValue>,
    },
}

impl JsObject {
    /// Create a new `JsObject` from an `Object`.
    #[inline]
    pub fn new(object: Object) -> Self {
        Self(Gc::new(object))
    }

    /// Immutably borrows the `Object`.
    ///
    /// # Panics
    ///
    /// Panics if the object is currently mutably borrowed.
    #[inline]
    #[track_caller]
    pub fn borrow(&self) -> Ref<'_> {
        self.0.borrow()
    }

    /// Mutably borrows the `Object`.
    ///
    /// # Panics
    ///
    /// Panics if the object is currently borrowed.
    #[inline]
    #[track_caller]
    pub fn borrow_mut(&self) -> RefMut<'_> {
        self.0.borrow_mut()
    }

    /// Non-panicking variant of [`JsObject::borrow`].
    #[inline]
    pub fn try_borrow(&self) -> Result<Ref<'_>, vesper_gc::BorrowError> {
        self.0.try_borrow()
    }

    /// Non-panicking variant of [`JsObject::borrow_mut`].
    #[inline]
    pub fn try_borrow_mut(&self) -> Result<RefMut<'_>, vesper_gc::BorrowMutError> {
        self.0.try_borrow_mut()
    }

    /// Checks if the two handles share the same allocation.
    #[inline]
    pub fn equals(lhs: &Self, rhs: &Self) -> bool {
        Gc::ptr_eq(&lhs.0, &rhs.0)
    }

    /// Allocation address, used for identity sets.
    #[inline]
    pub fn addr(&self) -> usize {
        self.0.addr()
    }

    /// A weak handle to this object.
    #[inline]
    pub fn downgrade(&self) -> WeakGc<Object> {
        self.0.downgrade()
    }

    /// The raw garbage-collected handle, for weak-slot comparisons.
    #[inline]
    pub(crate) fn inner(&self) -> &Gc<Object> {
        &self.0
    }

    /// Rewraps a raw handle, the inverse of [`JsObject::inner`].
    #[inline]
    pub(crate) fn from_inner(gc: Gc<Object>) -> Self {
        Self(gc)
    }

    /// Whether the object is callable.
    #[inline]
    pub fn is_callable(&self) -> bool {
        self.borrow().is_callable()
    }

    /// Whether the object can be constructed.
    #[inline]
    pub fn is_constructable(&self) -> bool {
        self.borrow().is_constructable()
    }

    /// Whether the object is an array.
    #[inline]
    pub fn is_array(&self) -> bool {
        self.borrow().is_array()
    }

    /// The current prototype.
    #[inline]
    pub fn prototype(&self) -> JsValue {
        self.borrow().prototype().clone()
    }

    /// Inserts a data property without validation.
    pub fn insert_property<K, V>(
        &self,
        key: K,
        value: V,
        attribute: crate::property::Attribute,
    ) -> Option<crate::property::PropertyDescriptor>
    where
        K: Into<crate::property::PropertyKey>,
        V: Into<JsValue>,
    {
        self.borrow_mut().insert_property(key, value, attribute)
    }

    /// Call this object.
    // <https://tc39.es/ecma262/#sec-ecmascript-function-objects-call-thisargument-argumentslist>
    #[track_caller]
    pub fn call(
        &self,
        this: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let body = self.function_body(context)?;
        let name = self.function_name();
        context.push_frame(&name)?;
        let in_construct = context.clear_construct();
        let result = self.run_body(body, this, args, false, context);
        context.exit_construct(in_construct);
        context.pop_frame();
        result
    }

    /// Construct an instance of this object with the specified arguments.
    // <https://tc39.es/ecma262/#sec-ecmascript-function-objects-construct-argumentslist-newtarget>
    #[track_caller]
    pub fn construct(&self, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        if !self.is_constructable() {
            let name = self.function_name();
            return context.throw_type_error(format!("{name} is not a constructor"));
        }

        // The prototype of the constructor decides the prototype of the new
        // object, falling back to %Object.prototype%.
        let proto = self.get(&PROTOTYPE.into(), self.clone().into(), context)?;
        let proto = if proto.is_object() {
            proto
        } else {
            context.standard_objects().object_object().prototype().into()
        };
        let this: JsValue = JsObject::new(Object::create(proto)).into();

        let body = match self.function_body(context)? {
            FunctionBody::Bound { target, args: bound, .. } => {
                // Bound construction ignores the bound `this` and forwards to
                // the target with the bound arguments prepended.
                let mut all = bound;
                all.extend_from_slice(args);
                return target.construct(&all, context);
            }
            body => body,
        };

        let name = self.function_name();
        context.push_frame(&name)?;
        let was_construct = context.enter_construct(this.clone());
        let result = self.run_body(body, &this, args, true, context);
        context.exit_construct(was_construct);
        context.pop_frame();

        // A constructor returning an object overrides the allocated one.
        match result? {
            JsValue::Object(object) => Ok(object.into()),
            _ => Ok(this),
        }
    }

    /// Pulls the function body out of the object, releasing the borrow.
    fn function_body(&self, context: &mut Context) -> JsResult<FunctionBody> {
        let borrowed = self.borrow();
        let Some(function) = borrowed.as_function() else {
            drop(borrowed);
            return context.throw_type_error(format!(
                "{} is not a function",
                JsValue::from(self.clone()).display()
            ));
        };
        Ok(match function {
            Function::Native { function, .. } => FunctionBody::Native(function.0),
            Function::Closure {
                function, captures, ..
            } => FunctionBody::Closure {
                function: function.clone(),
                captures: captures.clone(),
            },
            Function::Ordinary {
                flags,
                body,
                params,
                environment,
            } => FunctionBody::Ordinary {
                body: body.clone(),
                params: params.clone(),
                environment: environment.clone(),
                lexical_this: flags.is_lexical_this_mode(),
            },
            Function::Bound { target, this, args } => FunctionBody::Bound {
                target: target.clone(),
                this: this.clone(),
                args: args.clone(),
            },
        })
    }

    /// The `name` own property, for frames and diagnostics.
    pub(crate) fn function_name(&self) -> String {
        self.get_own_property(&"name".into())
            .and_then(|descriptor| descriptor.value())
            .and_then(|value| value.as_string().map(|s| s.to_string()))
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "anonymous".to_owned())
    }

    fn run_body(
        &self,
        body: FunctionBody,
        this: &JsValue,
        args: &[JsValue],
        construct: bool,
        context: &mut Context,
    ) -> JsResult<JsValue> {
        match body {
            FunctionBody::Native(function) => function(this, args, context),
            FunctionBody::Closure { function, captures } => {
                function(this, args, &captures, context)
            }
            FunctionBody::Bound {
                target,
                this: bound_this,
                args: bound_args,
            } => {
                debug_assert!(!construct, "bound construction is handled by the caller");
                let mut all = bound_args;
                all.extend_from_slice(args);
                target.call(&bound_this, &all, context)
            }
            FunctionBody::Ordinary {
                body,
                params,
                environment,
                lexical_this,
            } => {
                // Sloppy-mode calls with no receiver observe the global
                // object as `this`.
                let this = if !lexical_this && this.is_null_or_undefined() && !context.strict() {
                    JsValue::from(context.global_object())
                } else {
                    this.clone()
                };
                // New function environment whose parent is the scope of the
                // function declaration; arrow functions keep the lexical
                // `this`.
                let local_env = new_function_environment(
                    self.clone(),
                    if lexical_this {
                        None
                    } else {
                        Some(this.clone())
                    },
                    Some(environment),
                    if lexical_this {
                        BindingStatus::Lexical
                    } else {
                        BindingStatus::Initialized
                    },
                );

                context.realm_mut().environment.push(local_env.clone());
                let result = bind_and_run(&local_env, &body, &params, args, lexical_this, context);
                context.realm_mut().environment.pop();

                let value = result?;
                match context.executor_state() {
                    ExecutionState::Return => {
                        context.set_executor_state(ExecutionState::Executing);
                        Ok(value)
                    }
                    _ => {
                        if construct {
                            Ok(this.clone())
                        } else {
                            Ok(JsValue::undefined())
                        }
                    }
                }
            }
        }
    }

    /// Converts an object to a primitive, trying `valueOf`/`toString` in the
    /// order the hint dictates.
    // <https://tc39.es/ecma262/#sec-ordinarytoprimitive>
    pub(crate) fn ordinary_to_primitive(
        &self,
        context: &mut Context,
        hint: PreferredType,
    ) -> JsResult<JsValue> {
        debug_assert!(hint == PreferredType::String || hint == PreferredType::Number);

        let method_names = if hint == PreferredType::String {
            ["toString", "valueOf"]
        } else {
            ["valueOf", "toString"]
        };

        let this = JsValue::from(self.clone());
        for name in method_names {
            let method = this.get_field(name, context)?;
            if method.is_function() {
                let result = context.call(&method, &this, &[])?;
                if !result.is_object() {
                    return Ok(result);
                }
            }
        }

        context.throw_type_error("cannot convert object to primitive value")
    }
}

/// Binds the parameters and the `arguments` object inside the freshly
/// pushed function environment, then runs the body.
fn bind_and_run(
    local_env: &crate::environment::lexical_environment::Environment,
    body: &RcStatementList,
    params: &[FormalParameter],
    args: &[JsValue],
    lexical_this: bool,
    context: &mut Context,
) -> JsResult<JsValue> {
    for (i, param) in params.iter().enumerate() {
        if param.is_rest_param() {
            let rest: Vec<JsValue> = args.get(i..).unwrap_or(&[]).to_vec();
            let array = crate::builtins::array::Array::new_array_of(&rest, context);
            local_env
                .borrow()
                .create_mutable_binding(param.name().into(), false, true, context)?;
            local_env
                .borrow()
                .initialize_binding(param.name(), array, context)?;
            break;
        }

        let value = match args.get(i).cloned() {
            None | Some(JsValue::Undefined) => match param.init() {
                Some(init) => init.run(context)?,
                None => JsValue::undefined(),
            },
            Some(value) => value,
        };
        local_env
            .borrow()
            .create_mutable_binding(param.name().into(), false, true, context)?;
        local_env
            .borrow()
            .initialize_binding(param.name(), value, context)?;
    }

    if !lexical_this {
        let arguments = create_unmapped_arguments_object(args, context);
        local_env
            .borrow()
            .create_mutable_binding("arguments".into(), false, true, context)?;
        local_env
            .borrow()
            .initialize_binding("arguments", arguments, context)?;
    }

    body.run(context)
}

impl Finalize for JsObject {}

impl Trace for JsObject {
    #[inline]
    fn trace(&self, tracer: &mut Tracer) {
        self.0.trace(tracer);
    }
}

impl Debug for JsObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.try_borrow() {
            Ok(object) => write!(f, "JsObject({})", object.data),
            Err(_) => f.write_str("JsObject(<borrowed>)"),
        }
    }
}

impl PartialEq for JsObject {
    fn eq(&self, other: &Self) -> bool {
        Self::equals(self, other)
    }
}

impl From<Object> for JsObject {
    fn from(object: Object) -> Self {
        Self::new(object)
    }
}
