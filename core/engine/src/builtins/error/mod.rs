//! This module implements the global `Error` object and the derived error
//! constructors.
//!
//! Error objects are thrown when runtime errors occur; the prototype chain
//! of a thrown value determines its kind.

use crate::{
    builtins::BuiltIn,
    context::{Context, StandardConstructor},
    object::{ConstructorBuilder, JsObject, Object, ObjectData},
    property::Attribute,
    value::JsValue,
    JsResult,
};

/// The kinds of the error taxonomy; user subclasses extend the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Error,
    Type,
    Range,
    Reference,
    Syntax,
    Uri,
    Eval,
    Aggregate,
}

impl ErrorKind {
    /// The constructor name of the kind.
    pub fn name(self) -> &'static str {
        match self {
            Self::Error => "Error",
            Self::Type => "TypeError",
            Self::Range => "RangeError",
            Self::Reference => "ReferenceError",
            Self::Syntax => "SyntaxError",
            Self::Uri => "URIError",
            Self::Eval => "EvalError",
            Self::Aggregate => "AggregateError",
        }
    }

    /// Resolves a constructor name back to a kind; used when promoting
    /// `"<Kind>: <message>"` diagnostics to error instances.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "Error" => Self::Error,
            "TypeError" => Self::Type,
            "RangeError" => Self::Range,
            "ReferenceError" => Self::Reference,
            "SyntaxError" => Self::Syntax,
            "URIError" => Self::Uri,
            "EvalError" => Self::Eval,
            "AggregateError" => Self::Aggregate,
            _ => return None,
        })
    }

    fn standard_constructor(self, context: &Context) -> StandardConstructor {
        let objects = context.standard_objects();
        match self {
            Self::Error => objects.error_object().clone(),
            Self::Type => objects.type_error_object().clone(),
            Self::Range => objects.range_error_object().clone(),
            Self::Reference => objects.reference_error_object().clone(),
            Self::Syntax => objects.syntax_error_object().clone(),
            Self::Uri => objects.uri_error_object().clone(),
            Self::Eval => objects.eval_error_object().clone(),
            Self::Aggregate => objects.aggregate_error_object().clone(),
        }
    }
}

/// Allocates an error object of `kind` with `message` and a stack trace
/// captured from the live frames. This is the factory behind every
/// `Context::throw_*` helper.
pub(crate) fn create_error_object(
    kind: ErrorKind,
    message: String,
    context: &mut Context,
) -> JsObject {
    let prototype = kind.standard_constructor(context).prototype();
    let error = JsObject::new(Object::with_prototype(
        prototype.into(),
        ObjectData::Error(kind),
    ));

    let attribute = Attribute::WRITABLE | Attribute::NON_ENUMERABLE | Attribute::CONFIGURABLE;
    error.insert_property("message", message.clone(), attribute);

    // The trace is captured at throw time, not at catch time.
    let stack = format!("{}: {}\n{}", kind.name(), message, context.capture_stack_trace());
    error.insert_property("stack", stack, attribute);

    error
}

macro_rules! error_constructor {
    ($fn_name:ident, $kind:expr) => {
        fn $fn_name(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
            error_constructor_body(this, args, $kind, context)
        }
    };
}

/// Shared `Error(message)` behavior: usable with and without `new`.
fn error_constructor_body(
    this: &JsValue,
    args: &[JsValue],
    kind: ErrorKind,
    context: &mut Context,
) -> JsResult<JsValue> {
    let attribute = Attribute::WRITABLE | Attribute::NON_ENUMERABLE | Attribute::CONFIGURABLE;

    let object = match this {
        JsValue::Object(object) if context.is_in_constructor_call() => object.clone(),
        _ => {
            let prototype = kind.standard_constructor(context).prototype();
            JsObject::new(Object::with_prototype(prototype.into(), ObjectData::Error(kind)))
        }
    };
    object.borrow_mut().data = ObjectData::Error(kind);

    // `AggregateError(errors, message)` stores the aggregated list first.
    let message = if kind == ErrorKind::Aggregate {
        if let Some(errors) = args.get(0) {
            let list = crate::builtins::function::create_list_from_array_like(errors, context)?;
            let errors_array = crate::builtins::array::Array::create_array(list, context);
            object.insert_property("errors", errors_array, attribute);
        }
        args.get(1)
    } else {
        args.get(0)
    };

    let mut message_text = String::new();
    if let Some(message) = message {
        if !message.is_undefined() {
            let message = message.to_string(context)?;
            message_text = message.to_string();
            object.insert_property("message", message, attribute);
        }
    }

    // `Error(..., { cause })`.
    let options_index = if kind == ErrorKind::Aggregate { 2 } else { 1 };
    if let Some(JsValue::Object(options)) = args.get(options_index) {
        let cause = options.get(&"cause".into(), args[options_index].clone(), context)?;
        if !cause.is_undefined() {
            object.insert_property("cause", cause, attribute);
        }
    }

    let stack = if message_text.is_empty() {
        format!("{}\n{}", kind.name(), context.capture_stack_trace())
    } else {
        format!("{}: {}\n{}", kind.name(), message_text, context.capture_stack_trace())
    };
    object.insert_property("stack", stack, attribute);

    Ok(object.into())
}

error_constructor!(base_constructor, ErrorKind::Error);
error_constructor!(type_constructor, ErrorKind::Type);
error_constructor!(range_constructor, ErrorKind::Range);
error_constructor!(reference_constructor, ErrorKind::Reference);
error_constructor!(syntax_constructor, ErrorKind::Syntax);
error_constructor!(uri_constructor, ErrorKind::Uri);
error_constructor!(eval_constructor, ErrorKind::Eval);
error_constructor!(aggregate_constructor, ErrorKind::Aggregate);

/// Built-in `Error` object.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Error;

impl BuiltIn for Error {
    const NAME: &'static str = "Error";

    fn init(context: &mut Context) -> (&'static str, JsValue, Attribute) {
        let attribute = Attribute::WRITABLE | Attribute::NON_ENUMERABLE | Attribute::CONFIGURABLE;
        let error_object = ConstructorBuilder::with_standard_object(
            context,
            base_constructor,
            context.standard_objects().error_object().clone(),
        )
        .name(Self::NAME)
        .length(1)
        .property("name", Self::NAME, attribute)
        .property("message", "", attribute)
        .method(Self::to_string, "toString", 0)
        .build();

        (Self::NAME, error_object.into(), Self::attribute())
    }
}

impl Error {
    /// `Error.prototype.toString()`.
    #[allow(clippy::wrong_self_convention)]
    pub(crate) fn to_string(
        this: &JsValue,
        _: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let name = this.get_field("name", context)?;
        let name = if name.is_undefined() {
            "Error".into()
        } else {
            name.to_string(context)?
        };
        let message = this.get_field("message", context)?;
        let message = if message.is_undefined() {
            "".into()
        } else {
            message.to_string(context)?
        };

        if message.is_empty() {
            return Ok(JsValue::new(name));
        }
        if name.is_empty() {
            return Ok(JsValue::new(message));
        }
        Ok(JsValue::new(format!("{name}: {message}")))
    }
}

macro_rules! derived_error {
    ($type_name:ident, $js_name:literal, $constructor:ident, $accessor:ident) => {
        #[derive(Debug, Clone, Copy)]
        pub(crate) struct $type_name;

        impl BuiltIn for $type_name {
            const NAME: &'static str = $js_name;

            fn init(context: &mut Context) -> (&'static str, JsValue, Attribute) {
                let attribute =
                    Attribute::WRITABLE | Attribute::NON_ENUMERABLE | Attribute::CONFIGURABLE;
                let error_prototype = context.standard_objects().error_object().prototype();
                let constructor = ConstructorBuilder::with_standard_object(
                    context,
                    $constructor,
                    context.standard_objects().$accessor().clone(),
                )
                .name(Self::NAME)
                .length(1)
                .property("name", Self::NAME, attribute)
                .property("message", "", attribute)
                .inherit(error_prototype.into())
                .build();

                (Self::NAME, constructor.into(), Self::attribute())
            }
        }
    };
}

derived_error!(TypeError, "TypeError", type_constructor, type_error_object);
derived_error!(RangeError, "RangeError", range_constructor, range_error_object);
derived_error!(
    ReferenceError,
    "ReferenceError",
    reference_constructor,
    reference_error_object
);
derived_error!(SyntaxError, "SyntaxError", syntax_constructor, syntax_error_object);
derived_error!(UriError, "URIError", uri_constructor, uri_error_object);
derived_error!(EvalError, "EvalError", eval_constructor, eval_error_object);
derived_error!(
    AggregateError,
    "AggregateError",
    aggregate_constructor,
    aggregate_error_object
);
