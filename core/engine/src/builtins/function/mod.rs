//! This module implements the global `Function` object as well as the
//! native function representations.
//!
//! Objects wrap a [`Function`] and expose it through their call/construct
//! slots.

use crate::{
    builtins::BuiltIn,
    context::Context,
    environment::lexical_environment::Environment,
    object::{ConstructorBuilder, FunctionBuilder, JsObject, NativeObject, Object, ObjectData},
    property::{Attribute, DataDescriptor, PropertyKey},
    syntax::ast::node::{FormalParameter, RcStatementList},
    value::JsValue,
    JsResult,
};
use bitflags::bitflags;
use dyn_clone::DynClone;
use std::fmt::{self, Debug};
use std::rc::Rc;
use vesper_gc::{Finalize, Trace, Tracer};

#[cfg(test)]
mod tests;

/// Type representing a native built-in function a.k.a. function pointer.
///
/// Native functions need to have this signature in order to be callable
/// from JavaScript.
pub type NativeFunction = fn(&JsValue, &[JsValue], &mut Context) -> JsResult<JsValue>;

/// Type of the boxed closures used where native state must be captured,
/// such as promise resolving functions. Anything garbage collected lives in
/// the [`Captures`] threaded through the call, never in the closure itself,
/// so the collector can trace it.
pub type ClosureFunction =
    dyn Fn(&JsValue, &[JsValue], &Captures, &mut Context) -> JsResult<JsValue>;

// A standalone `NativeObject` does not guarantee that the internal type
// implements `Clone`. This private trait does, and `DynClone` lets
// `Box<dyn CapturesObject>` implement `Clone`.
trait CapturesObject: NativeObject + DynClone {}
impl<T: NativeObject + Clone> CapturesObject for T {}
dyn_clone::clone_trait_object!(CapturesObject);

/// Wrapper for `Box<dyn NativeObject + Clone>` holding the captured state of
/// a native closure.
///
/// Any type implementing `Trace + Any + Debug + Clone` can be used as a
/// capture context. The wrapper is traced by the collector, which is what
/// keeps captured objects alive while the function object is; shared
/// mutable capture state containing engine values must itself live behind a
/// `Gc` so every stored value stays visible to the mark phase.
#[derive(Debug, Clone, Trace, Finalize)]
pub struct Captures(Box<dyn CapturesObject>);

impl Captures {
    /// Creates a new capture context.
    pub(crate) fn new<T>(captures: T) -> Self
    where
        T: NativeObject + Clone,
    {
        Self(Box::new(captures))
    }

    /// Downcasts `Captures` to the specified type, returning a reference to
    /// the downcasted type if successful or `None` otherwise.
    pub fn downcast_ref<T>(&self) -> Option<&T>
    where
        T: NativeObject + Clone,
    {
        (*self.0).as_any().downcast_ref::<T>()
    }

    /// Downcasts `Captures` to the specified type, returning a reference to
    /// the downcasted type if successful or a `TypeError` otherwise.
    pub fn try_downcast_ref<T>(&self, context: &mut Context) -> JsResult<&T>
    where
        T: NativeObject + Clone,
    {
        match (*self.0).as_any().downcast_ref::<T>() {
            Some(captures) => Ok(captures),
            None => Err(context.construct_type_error("cannot downcast `Captures` to given type")),
        }
    }
}

/// Wrapper to give the raw function pointer a `Debug` form.
#[derive(Clone, Copy, Finalize)]
pub struct BuiltInFunction(pub(crate) NativeFunction);

impl Trace for BuiltInFunction {
    #[inline]
    fn trace(&self, _tracer: &mut Tracer) {}
}

impl From<NativeFunction> for BuiltInFunction {
    fn from(function: NativeFunction) -> Self {
        Self(function)
    }
}

impl Debug for BuiltInFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[native]")
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct FunctionFlags: u8 {
        const CONSTRUCTABLE = 0b0000_0010;
        const LEXICAL_THIS_MODE = 0b0000_0100;
    }
}

impl FunctionFlags {
    #[inline]
    pub(crate) fn is_constructable(&self) -> bool {
        self.contains(Self::CONSTRUCTABLE)
    }

    #[inline]
    pub(crate) fn is_lexical_this_mode(&self) -> bool {
        self.contains(Self::LEXICAL_THIS_MODE)
    }
}

impl Finalize for FunctionFlags {}

impl Trace for FunctionFlags {
    #[inline]
    fn trace(&self, _tracer: &mut Tracer) {}
}

/// The engine's representation of a function object: native Rust code, a
/// capturing native closure, an AST body closed over its environment, or a
/// bound-function wrapper carrying `[[BoundThis]]`/`[[BoundArgs]]`.
#[derive(Clone, Trace, Finalize)]
pub enum Function {
    Native {
        function: BuiltInFunction,
        constructable: bool,
    },
    Closure {
        #[ignore_trace]
        function: Rc<ClosureFunction>,
        constructable: bool,
        captures: Captures,
    },
    Ordinary {
        #[ignore_trace]
        flags: FunctionFlags,
        body: RcStatementList,
        params: Box<[FormalParameter]>,
        environment: Environment,
    },
    Bound {
        target: JsObject,
        this: JsValue,
        args: Vec<JsValue>,
    },
}

impl Function {
    #[inline]
    pub fn is_constructable(&self) -> bool {
        match self {
            Self::Native { constructable, .. } | Self::Closure { constructable, .. } => {
                *constructable
            }
            Self::Ordinary { flags, .. } => flags.is_constructable(),
            Self::Bound { target, .. } => target.is_constructable(),
        }
    }
}

impl Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native { .. } => f.write_str("Function::Native"),
            Self::Closure { .. } => f.write_str("Function::Closure"),
            Self::Ordinary { .. } => f.write_str("Function::Ordinary"),
            Self::Bound { .. } => f.write_str("Function::Bound"),
        }
    }
}

/// Creates the ordinary, unmapped `arguments` object for a call.
pub fn create_unmapped_arguments_object(args: &[JsValue], context: &mut Context) -> JsValue {
    let object_prototype = context.standard_objects().object_object().prototype();
    let arguments = JsObject::new(Object::with_prototype(
        object_prototype.into(),
        ObjectData::Arguments,
    ));

    let length = DataDescriptor::new(
        args.len(),
        Attribute::WRITABLE | Attribute::NON_ENUMERABLE | Attribute::CONFIGURABLE,
    );
    arguments.borrow_mut().insert("length", length);

    for (index, value) in args.iter().enumerate() {
        arguments.borrow_mut().insert(
            PropertyKey::from(index),
            DataDescriptor::new(value.clone(), Attribute::all()),
        );
    }

    arguments.into()
}

/// Creates a new ordinary function object from its compiled parts.
pub(crate) fn make_ordinary_function(
    params: Box<[FormalParameter]>,
    body: RcStatementList,
    flags: FunctionFlags,
    name: &str,
    context: &mut Context,
) -> JsValue {
    let function_prototype = context.standard_objects().function_object().prototype();

    let params_len = params
        .iter()
        .filter(|p| !p.is_rest_param() && p.init().is_none())
        .count();
    let environment = context
        .realm()
        .environment
        .get_current_environment()
        .clone();
    let function = Function::Ordinary {
        flags,
        body,
        params,
        environment,
    };

    let object = JsObject::new(Object::function(function, function_prototype.into()));
    let attribute = Attribute::READONLY | Attribute::NON_ENUMERABLE | Attribute::CONFIGURABLE;
    object.insert_property("length", params_len, attribute);
    object.insert_property("name", name, attribute);

    // Every ordinary function gets a fresh `prototype` object wired back to
    // it; arrow functions are never constructable and carry none.
    if flags.is_constructable() {
        let proto = context.construct_object();
        proto.insert_property(
            "constructor",
            object.clone(),
            Attribute::WRITABLE | Attribute::NON_ENUMERABLE | Attribute::CONFIGURABLE,
        );
        object.insert_property(
            "prototype",
            proto,
            Attribute::WRITABLE | Attribute::NON_ENUMERABLE | Attribute::PERMANENT,
        );
    }

    object.into()
}

/// Creates a closure-backed function object. The body receives its typed
/// captures on every call; the capture context is what the collector
/// traces, so the closure itself must not hold engine values.
pub fn make_closure_function<F, T>(
    body: F,
    captures: T,
    length: usize,
    name: &str,
    context: &mut Context,
) -> JsObject
where
    F: Fn(&JsValue, &[JsValue], &T, &mut Context) -> JsResult<JsValue> + 'static,
    T: NativeObject + Clone,
{
    let function_prototype = context.standard_objects().function_object().prototype();
    let function = Function::Closure {
        function: Rc::new(
            move |this: &JsValue, args: &[JsValue], captures: &Captures, context: &mut Context| {
                let captures = captures.try_downcast_ref::<T>(context)?;
                body(this, args, captures, context)
            },
        ),
        constructable: false,
        captures: Captures::new(captures),
    };
    let object = JsObject::new(Object::function(function, function_prototype.into()));
    let attribute = Attribute::READONLY | Attribute::NON_ENUMERABLE | Attribute::CONFIGURABLE;
    object.insert_property("length", length, attribute);
    object.insert_property("name", name, attribute);
    object
}

/// Built-in `Function` object.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BuiltInFunctionObject;

impl BuiltIn for BuiltInFunctionObject {
    const NAME: &'static str = "Function";

    fn init(context: &mut Context) -> (&'static str, JsValue, Attribute) {
        let function_object = ConstructorBuilder::with_standard_object(
            context,
            Self::constructor,
            context.standard_objects().function_object().clone(),
        )
        .name(Self::NAME)
        .length(1)
        .method(Self::call_method, "call", 1)
        .method(Self::apply, "apply", 2)
        .method(Self::bind, "bind", 1)
        .method(Self::to_string, "toString", 0)
        .build();

        (Self::NAME, function_object.into(), Self::attribute())
    }
}

impl BuiltInFunctionObject {
    /// `Function(...)` — dynamic function compilation is not carried; the
    /// constructor produces an empty function.
    fn constructor(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        if !args.is_empty() {
            return context
                .throw_type_error("dynamic function compilation is not supported");
        }
        let _ = this;
        Ok(make_ordinary_function(
            Box::new([]),
            RcStatementList::default(),
            FunctionFlags::CONSTRUCTABLE,
            "anonymous",
            context,
        ))
    }

    /// `Function.prototype.call(thisArg, ...args)`.
    fn call_method(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        if !this.is_function() {
            return context.throw_type_error("Function.prototype.call called on non-callable");
        }
        let this_arg = args.get(0).cloned().unwrap_or_default();
        let rest = args.get(1..).unwrap_or(&[]);
        context.call(this, &this_arg, rest)
    }

    /// `Function.prototype.apply(thisArg, argsArray)`.
    fn apply(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        if !this.is_function() {
            return context.throw_type_error("Function.prototype.apply called on non-callable");
        }
        let this_arg = args.get(0).cloned().unwrap_or_default();
        let arg_list = match args.get(1) {
            None | Some(JsValue::Undefined) | Some(JsValue::Null) => Vec::new(),
            Some(array_like) => create_list_from_array_like(array_like, context)?,
        };
        context.call(this, &this_arg, &arg_list)
    }

    /// `Function.prototype.bind(thisArg, ...args)`.
    ///
    /// The bound function prepends the bound arguments on call, forces the
    /// bound `this` for non-constructor calls, and has
    /// `length = max(0, target.length - boundArgs.count)`.
    fn bind(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let JsValue::Object(target) = this else {
            return context.throw_type_error("Function.prototype.bind called on non-callable");
        };
        if !target.is_callable() {
            return context.throw_type_error("Function.prototype.bind called on non-callable");
        }

        let bound_this = args.get(0).cloned().unwrap_or_default();
        let bound_args: Vec<JsValue> = args.get(1..).unwrap_or(&[]).to_vec();

        let target_length = target
            .get(&"length".into(), this.clone(), context)?
            .as_number()
            .unwrap_or(0.0);
        let length = (target_length - bound_args.len() as f64).max(0.0);

        let target_name = target
            .get(&"name".into(), this.clone(), context)?
            .as_string()
            .map_or_else(String::new, |s| s.to_string());

        let function_prototype = context.standard_objects().function_object().prototype();
        let bound = JsObject::new(Object::function(
            Function::Bound {
                target: target.clone(),
                this: bound_this,
                args: bound_args,
            },
            function_prototype.into(),
        ));
        let attribute = Attribute::READONLY | Attribute::NON_ENUMERABLE | Attribute::CONFIGURABLE;
        bound.insert_property("length", length, attribute);
        bound.insert_property("name", format!("bound {target_name}"), attribute);
        Ok(bound.into())
    }

    /// `Function.prototype.toString()`.
    fn to_string(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let JsValue::Object(object) = this else {
            return context.throw_type_error("Function.prototype.toString called on non-callable");
        };
        let name = object.function_name();
        Ok(JsValue::new(format!(
            "function {name}() {{ [native or compiled code] }}"
        )))
    }
}

/// Converts an array-like value into an argument vector.
pub(crate) fn create_list_from_array_like(
    array_like: &JsValue,
    context: &mut Context,
) -> JsResult<Vec<JsValue>> {
    let object = match array_like {
        JsValue::Object(object) => object.clone(),
        _ => {
            return context
                .throw_type_error("CreateListFromArrayLike called on non-object")
        }
    };
    let length = object
        .get(&"length".into(), array_like.clone(), context)?
        .to_length(context)?;
    let mut list = Vec::with_capacity(length.min(4096));
    for index in 0..length {
        list.push(object.get(&PropertyKey::from(index), array_like.clone(), context)?);
    }
    Ok(list)
}
