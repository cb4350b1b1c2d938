//! This module implements the global `Reflect` namespace object, a direct
//! projection of the object internal methods.

use crate::{
    builtins::{function::create_list_from_array_like, object::from_property_descriptor, BuiltIn},
    context::Context,
    object::ObjectInitializer,
    property::Attribute,
    value::JsValue,
    JsResult,
};

#[derive(Debug, Clone, Copy)]
pub(crate) struct Reflect;

impl BuiltIn for Reflect {
    const NAME: &'static str = "Reflect";

    fn init(context: &mut Context) -> (&'static str, JsValue, Attribute) {
        let object = ObjectInitializer::new(context)
            .function(Self::apply, "apply", 3)
            .function(Self::construct, "construct", 2)
            .function(Self::define_property, "defineProperty", 3)
            .function(Self::delete_property, "deleteProperty", 2)
            .function(Self::get, "get", 2)
            .function(Self::get_own_property_descriptor, "getOwnPropertyDescriptor", 2)
            .function(Self::get_prototype_of, "getPrototypeOf", 1)
            .function(Self::has, "has", 2)
            .function(Self::is_extensible, "isExtensible", 1)
            .function(Self::own_keys, "ownKeys", 1)
            .function(Self::prevent_extensions, "preventExtensions", 1)
            .function(Self::set, "set", 3)
            .function(Self::set_prototype_of, "setPrototypeOf", 2)
            .build();

        (Self::NAME, object.into(), Self::attribute())
    }
}

impl Reflect {
    /// `Reflect.apply(target, thisArgument, argumentsList)`.
    fn apply(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let target = args.get(0).cloned().unwrap_or_default();
        let this_argument = args.get(1).cloned().unwrap_or_default();
        let arguments = create_list_from_array_like(
            &args.get(2).cloned().unwrap_or_default(),
            context,
        )?;
        context.call(&target, &this_argument, &arguments)
    }

    /// `Reflect.construct(target, argumentsList)`.
    fn construct(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let target = args.get(0).cloned().unwrap_or_default();
        let arguments = match args.get(1) {
            None | Some(JsValue::Undefined) => Vec::new(),
            Some(list) => create_list_from_array_like(list, context)?,
        };
        context.construct(&target, &arguments)
    }

    /// `Reflect.defineProperty(target, key, descriptor)`.
    fn define_property(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let Some(JsValue::Object(target)) = args.get(0) else {
            return context.throw_type_error("Reflect.defineProperty called on non-object");
        };
        let key = args
            .get(1)
            .cloned()
            .unwrap_or_default()
            .to_property_key(context)?;
        let descriptor = crate::builtins::object::to_property_descriptor(
            args.get(2).cloned().unwrap_or_default(),
            context,
        )?;
        Ok(target.define_own_property(key, descriptor).into())
    }

    /// `Reflect.deleteProperty(target, key)`.
    fn delete_property(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let Some(JsValue::Object(target)) = args.get(0) else {
            return context.throw_type_error("Reflect.deleteProperty called on non-object");
        };
        let key = args
            .get(1)
            .cloned()
            .unwrap_or_default()
            .to_property_key(context)?;
        Ok(target.delete(&key).into())
    }

    /// `Reflect.get(target, key[, receiver])`.
    fn get(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let Some(JsValue::Object(target)) = args.get(0) else {
            return context.throw_type_error("Reflect.get called on non-object");
        };
        let key = args
            .get(1)
            .cloned()
            .unwrap_or_default()
            .to_property_key(context)?;
        let receiver = args
            .get(2)
            .cloned()
            .unwrap_or_else(|| target.clone().into());
        target.get(&key, receiver, context)
    }

    fn get_own_property_descriptor(
        _: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let Some(JsValue::Object(target)) = args.get(0) else {
            return context
                .throw_type_error("Reflect.getOwnPropertyDescriptor called on non-object");
        };
        let key = args
            .get(1)
            .cloned()
            .unwrap_or_default()
            .to_property_key(context)?;
        match target.get_own_property(&key) {
            Some(descriptor) => Ok(from_property_descriptor(&descriptor, context).into()),
            None => Ok(JsValue::undefined()),
        }
    }

    fn get_prototype_of(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let Some(JsValue::Object(target)) = args.get(0) else {
            return context.throw_type_error("Reflect.getPrototypeOf called on non-object");
        };
        Ok(target.prototype())
    }

    /// `Reflect.has(target, key)`.
    fn has(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let Some(JsValue::Object(target)) = args.get(0) else {
            return context.throw_type_error("Reflect.has called on non-object");
        };
        let key = args
            .get(1)
            .cloned()
            .unwrap_or_default()
            .to_property_key(context)?;
        Ok(target.has_property(&key).into())
    }

    fn is_extensible(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let Some(JsValue::Object(target)) = args.get(0) else {
            return context.throw_type_error("Reflect.isExtensible called on non-object");
        };
        Ok(target.is_extensible().into())
    }

    /// `Reflect.ownKeys(target)`.
    fn own_keys(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let Some(JsValue::Object(target)) = args.get(0) else {
            return context.throw_type_error("Reflect.ownKeys called on non-object");
        };
        let keys: Vec<JsValue> = target
            .own_property_keys()
            .into_iter()
            .map(|key| match key {
                crate::property::PropertyKey::Symbol(symbol) => JsValue::Symbol(symbol),
                other => JsValue::new(other.to_js_string()),
            })
            .collect();
        Ok(crate::builtins::array::Array::create_array(keys, context))
    }

    fn prevent_extensions(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let Some(JsValue::Object(target)) = args.get(0) else {
            return context.throw_type_error("Reflect.preventExtensions called on non-object");
        };
        Ok(target.prevent_extensions().into())
    }

    /// `Reflect.set(target, key, value[, receiver])`.
    fn set(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let Some(JsValue::Object(target)) = args.get(0) else {
            return context.throw_type_error("Reflect.set called on non-object");
        };
        let key = args
            .get(1)
            .cloned()
            .unwrap_or_default()
            .to_property_key(context)?;
        let value = args.get(2).cloned().unwrap_or_default();
        let receiver = args
            .get(3)
            .cloned()
            .unwrap_or_else(|| target.clone().into());
        Ok(target.set(key, value, receiver, false, context)?.into())
    }

    fn set_prototype_of(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let Some(JsValue::Object(target)) = args.get(0) else {
            return context.throw_type_error("Reflect.setPrototypeOf called on non-object");
        };
        let prototype = args.get(1).cloned().unwrap_or_default();
        if !prototype.is_object() && !prototype.is_null() {
            return context.throw_type_error("prototype must be an object or null");
        }
        Ok(target.set_prototype(prototype).into())
    }
}
