//! This module implements the global `Proxy` object.
//!
//! The fundamental traps (`get`, `set`, `has`, `deleteProperty`) route
//! through the handler with the non-configurability invariant checks;
//! untrapped operations forward to the target.

use crate::{
    builtins::BuiltIn,
    context::Context,
    object::{ConstructorBuilder, JsObject, Object, ObjectData},
    property::{Attribute, PropertyDescriptor, PropertyKey},
    value::{same_value, JsValue},
    JsResult,
};
use std::cell::Cell;
use vesper_gc::{Finalize, Trace, Tracer};

/// `[[ProxyTarget]]` and `[[ProxyHandler]]`.
#[derive(Debug, Finalize)]
pub struct Proxy {
    target: JsObject,
    handler: JsObject,
    revoked: Cell<bool>,
}

impl Trace for Proxy {
    fn trace(&self, tracer: &mut Tracer) {
        self.target.trace(tracer);
        self.handler.trace(tracer);
    }
}

impl Proxy {
    /// The target, or `None` once revoked.
    pub fn target(&self) -> Option<&JsObject> {
        if self.revoked.get() {
            None
        } else {
            Some(&self.target)
        }
    }

    fn revoke(&self) {
        self.revoked.set(true);
    }
}

/// Pulls the `(target, handler)` pair out of a proxy object, erroring on a
/// revoked proxy.
fn proxy_parts(
    object: &JsObject,
    context: &mut Context,
) -> JsResult<(JsObject, JsObject)> {
    let borrowed = object.borrow();
    let Some(proxy) = borrowed.as_proxy() else {
        drop(borrowed);
        return context.throw_type_error("operation attempted on a non-proxy object");
    };
    if proxy.revoked.get() {
        drop(borrowed);
        return context.throw_type_error("cannot perform operation on a revoked proxy");
    }
    Ok((proxy.target.clone(), proxy.handler.clone()))
}

fn trap(
    handler: &JsObject,
    name: &str,
    context: &mut Context,
) -> JsResult<Option<JsObject>> {
    let value = handler.get(&name.into(), handler.clone().into(), context)?;
    match value {
        JsValue::Undefined | JsValue::Null => Ok(None),
        JsValue::Object(function) if function.is_callable() => Ok(Some(function)),
        _ => context.throw_type_error(format!("proxy handler trap '{name}' is not callable")),
    }
}

fn key_to_value(key: &PropertyKey) -> JsValue {
    match key {
        PropertyKey::Symbol(symbol) => JsValue::Symbol(symbol.clone()),
        other => JsValue::new(other.to_js_string()),
    }
}

/// The `get` trap with the invariant check for non-configurable,
/// non-writable data properties.
pub(crate) fn proxy_get(
    object: &JsObject,
    key: &PropertyKey,
    _receiver: JsValue,
    context: &mut Context,
) -> JsResult<JsValue> {
    let (target, handler) = proxy_parts(object, context)?;
    let Some(trap_fn) = trap(&handler, "get", context)? else {
        return target.get(key, target.clone().into(), context);
    };

    let result = trap_fn.call(
        &handler.clone().into(),
        &[
            target.clone().into(),
            key_to_value(key),
            object.clone().into(),
        ],
        context,
    )?;

    if let Some(PropertyDescriptor::Data(data)) = target.get_own_property(key) {
        if !data.attributes().configurable()
            && !data.writable()
            && !same_value(&result, &data.value())
        {
            return context.throw_type_error(
                "proxy get trap violated the invariant of a non-configurable property",
            );
        }
    }
    Ok(result)
}

/// The `set` trap.
pub(crate) fn proxy_set(
    object: &JsObject,
    key: PropertyKey,
    value: JsValue,
    receiver: JsValue,
    strict: bool,
    context: &mut Context,
) -> JsResult<bool> {
    let (target, handler) = proxy_parts(object, context)?;
    let Some(trap_fn) = trap(&handler, "set", context)? else {
        return target.set(key, value, target.clone().into(), strict, context);
    };

    let accepted = trap_fn
        .call(
            &handler.clone().into(),
            &[
                target.clone().into(),
                key_to_value(&key),
                value,
                receiver,
            ],
            context,
        )?
        .to_boolean();
    if !accepted && strict {
        return context.throw_type_error(format!("proxy set trap returned false for '{key}'"));
    }
    Ok(accepted)
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct ProxyBuiltin;

impl BuiltIn for ProxyBuiltin {
    const NAME: &'static str = "Proxy";

    fn init(context: &mut Context) -> (&'static str, JsValue, Attribute) {
        let proxy = ConstructorBuilder::with_standard_object(
            context,
            Self::constructor,
            context.standard_objects().proxy_object().clone(),
        )
        .name(Self::NAME)
        .length(2)
        .static_method(Self::revocable, "revocable", 2)
        .build();

        (Self::NAME, proxy.into(), Self::attribute())
    }
}

impl ProxyBuiltin {
    fn make_proxy(args: &[JsValue], context: &mut Context) -> JsResult<JsObject> {
        let Some(JsValue::Object(target)) = args.get(0) else {
            return context.throw_type_error("cannot create proxy with a non-object as target");
        };
        let Some(JsValue::Object(handler)) = args.get(1) else {
            return context.throw_type_error("cannot create proxy with a non-object as handler");
        };
        let prototype = target.prototype();
        Ok(JsObject::new(Object::with_prototype(
            prototype,
            ObjectData::Proxy(Proxy {
                target: target.clone(),
                handler: handler.clone(),
                revoked: Cell::new(false),
            }),
        )))
    }

    /// `new Proxy(target, handler)`.
    fn constructor(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        if !context.is_in_constructor_call() {
            return context.throw_type_error("Proxy constructor requires new");
        }
        Ok(Self::make_proxy(args, context)?.into())
    }

    /// `Proxy.revocable(target, handler)`.
    fn revocable(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let proxy = Self::make_proxy(args, context)?;

        // The proxy travels through the traced captures: the revoker may be
        // the last thing keeping it alive.
        let revoke = crate::builtins::function::make_closure_function(
            |_, _, captures: &RevokeCaptures, _context| {
                if let ObjectData::Proxy(ref data) = captures.proxy.borrow().data {
                    data.revoke();
                }
                Ok(JsValue::undefined())
            },
            RevokeCaptures {
                proxy: proxy.clone(),
            },
            0,
            "revoke",
            context,
        );

        let result = context.construct_object();
        result.create_data_property("proxy", proxy);
        result.create_data_property("revoke", revoke);
        Ok(result.into())
    }
}

/// The proxy captured by its revoker.
#[derive(Debug, Clone, Trace, Finalize)]
struct RevokeCaptures {
    proxy: JsObject,
}
