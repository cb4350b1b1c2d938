//! Builtins live here, such as Object, String, Math etc.

pub mod array;
pub mod array_buffer;
pub mod bigint;
pub mod boolean;
#[cfg(feature = "console")]
pub mod console;
pub mod dataview;
pub mod date;
pub mod disposable_stack;
pub mod error;
pub mod function;
pub mod intl;
pub mod iterable;
pub mod json;
pub mod map;
pub mod math;
pub mod number;
pub mod object;
pub mod promise;
pub mod proxy;
pub mod reflect;
pub mod regexp;
pub mod set;
pub mod string;
pub mod symbol;
pub mod temporal;
pub mod typed_array;
pub mod uri;
pub mod weak;

pub(crate) use self::{
    array::Array,
    array_buffer::ArrayBufferBuiltin,
    bigint::BigInt,
    boolean::Boolean,
    dataview::DataViewBuiltin,
    date::DateBuiltin,
    disposable_stack::{AsyncDisposableStackBuiltin, DisposableStackBuiltin},
    error::{
        AggregateError, Error, EvalError, RangeError, ReferenceError, SyntaxError, TypeError,
        UriError,
    },
    function::BuiltInFunctionObject,
    intl::Intl,
    iterable::Iterator,
    json::Json,
    map::Map,
    math::Math,
    number::Number,
    object::BuiltInObjectObject,
    promise::PromiseBuiltin,
    proxy::ProxyBuiltin,
    reflect::Reflect,
    regexp::RegExpBuiltin,
    set::Set,
    string::String,
    symbol::Symbol,
    temporal::Temporal,
    typed_array::{
        BigInt64Array, BigUint64Array, Float32Array, Float64Array, Int16Array, Int32Array,
        Int8Array, TypedArrayBuiltin, Uint16Array, Uint32Array, Uint8Array, Uint8ClampedArray,
    },
    weak::{FinalizationRegistryBuiltin, WeakMapBuiltin, WeakRefBuiltin, WeakSetBuiltin},
};

use crate::{
    context::Context,
    property::Attribute,
    value::JsValue,
    JsResult,
};

/// Trait representing a global built-in object.
///
/// `init` builds the constructor (or namespace) and returns the triple the
/// installer writes onto the global object.
pub(crate) trait BuiltIn {
    /// Binding name of the built-in inside the global object.
    const NAME: &'static str;

    /// Property attributes of the global binding.
    fn attribute() -> Attribute {
        Attribute::WRITABLE | Attribute::NON_ENUMERABLE | Attribute::CONFIGURABLE
    }

    /// Initialization code for the built-in.
    fn init(context: &mut Context) -> (&'static str, JsValue, Attribute);
}

/// Initializes the builtin surface of the global object.
pub fn init(context: &mut Context) {
    // The iterator prototypes must exist before any collection builtin
    // installs its `Symbol.iterator` hook.
    iterable::init_iterator_prototypes(context);

    type Initializer = fn(&mut Context) -> (&'static str, JsValue, Attribute);
    let mut globals: Vec<Initializer> = vec![
        // The object/function pair underpins every other prototype chain.
        BuiltInObjectObject::init,
        BuiltInFunctionObject::init,
        Array::init,
        String::init,
        Number::init,
        Boolean::init,
        Symbol::init,
        BigInt::init,
        Error::init,
        TypeError::init,
        RangeError::init,
        ReferenceError::init,
        SyntaxError::init,
        UriError::init,
        EvalError::init,
        AggregateError::init,
        Map::init,
        Set::init,
        WeakMapBuiltin::init,
        WeakSetBuiltin::init,
        WeakRefBuiltin::init,
        FinalizationRegistryBuiltin::init,
        PromiseBuiltin::init,
        DateBuiltin::init,
        RegExpBuiltin::init,
        ArrayBufferBuiltin::init,
        DataViewBuiltin::init,
        TypedArrayBuiltin::init,
        Int8Array::init,
        Uint8Array::init,
        Uint8ClampedArray::init,
        Int16Array::init,
        Uint16Array::init,
        Int32Array::init,
        Uint32Array::init,
        Float32Array::init,
        Float64Array::init,
        BigInt64Array::init,
        BigUint64Array::init,
        ProxyBuiltin::init,
        Reflect::init,
        Math::init,
        Json::init,
        Intl::init,
        Temporal::init,
        Iterator::init,
        DisposableStackBuiltin::init,
        AsyncDisposableStackBuiltin::init,
    ];
    #[cfg(feature = "console")]
    globals.push(console::Console::init);

    for init in globals {
        let (name, value, attribute) = init(context);
        context.register_global_property(name, value, attribute);
    }

    install_iterator_methods(context);
    install_global_values(context);
    install_global_functions(context);
}

/// The `next` methods of the engine's iterator objects.
fn install_iterator_methods(context: &mut Context) {
    use crate::object::FunctionBuilder;
    use crate::property::PropertyKey;

    let pairs: [(crate::object::JsObject, crate::builtins::function::NativeFunction); 4] = [
        (
            context.iterator_prototypes().array_iterator_prototype(),
            array::array_iterator::ArrayIterator::next,
        ),
        (
            context.iterator_prototypes().string_iterator_prototype(),
            string::string_iterator::StringIterator::next,
        ),
        (
            context.iterator_prototypes().map_iterator_prototype(),
            map::map_iterator::MapIterator::next,
        ),
        (
            context.iterator_prototypes().set_iterator_prototype(),
            set::set_iterator::SetIterator::next,
        ),
    ];

    for (prototype, next) in pairs {
        let next_fn = FunctionBuilder::new(context, next).name("next").build();
        prototype.insert_property(
            PropertyKey::from("next"),
            next_fn,
            Attribute::WRITABLE | Attribute::NON_ENUMERABLE | Attribute::CONFIGURABLE,
        );
    }
}

/// `undefined`, `NaN`, `Infinity` and `globalThis`.
fn install_global_values(context: &mut Context) {
    let permanent = Attribute::READONLY | Attribute::NON_ENUMERABLE | Attribute::PERMANENT;
    context.register_global_property("undefined", JsValue::undefined(), permanent);
    context.register_global_property("NaN", JsValue::nan(), permanent);
    context.register_global_property("Infinity", JsValue::positive_infinity(), permanent);

    let global = context.global_object();
    context.register_global_property(
        "globalThis",
        global,
        Attribute::WRITABLE | Attribute::NON_ENUMERABLE | Attribute::CONFIGURABLE,
    );
}

/// The free functions of the global object.
fn install_global_functions(context: &mut Context) {
    context.register_global_function("parseInt", 2, number::parse_int);
    context.register_global_function("parseFloat", 1, number::parse_float);
    context.register_global_function("isNaN", 1, number::global_is_nan);
    context.register_global_function("isFinite", 1, number::global_is_finite);
    context.register_global_function("encodeURI", 1, uri::encode_uri);
    context.register_global_function("encodeURIComponent", 1, uri::encode_uri_component);
    context.register_global_function("decodeURI", 1, uri::decode_uri);
    context.register_global_function("decodeURIComponent", 1, uri::decode_uri_component);
    context.register_global_function("escape", 1, uri::escape);
    context.register_global_function("unescape", 1, uri::unescape);
    context.register_global_function("eval", 1, global_eval);
    context.register_global_function("setTimeout", 2, set_timer_stub);
    context.register_global_function("setInterval", 2, set_timer_stub);
    context.register_global_function("clearTimeout", 1, clear_timer_stub);
    context.register_global_function("clearInterval", 1, clear_timer_stub);
}

/// The global `eval` binding. Dynamic nested evaluation is not carried by
/// the core; a host embedding may replace this binding.
fn global_eval(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    match args.get(0) {
        // `eval` of a non-string is the identity, per the standard.
        Some(value) if !value.is_string() => Ok(value.clone()),
        None => Ok(JsValue::undefined()),
        Some(_) => context.throw_eval_error("dynamic code evaluation is not supported"),
    }
}

/// `setTimeout`/`setInterval` stubs: the core has no task queue; a real
/// embedding supplies one. The callback argument is validated and a handle
/// returned, but nothing is scheduled.
fn set_timer_stub(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    match args.get(0) {
        Some(callback) if callback.is_function() => Ok(JsValue::new(0)),
        _ => context.throw_type_error("the first argument must be a function"),
    }
}

fn clear_timer_stub(_: &JsValue, _: &[JsValue], _context: &mut Context) -> JsResult<JsValue> {
    Ok(JsValue::undefined())
}
