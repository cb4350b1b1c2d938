//! This module implements the global `Object` object.
//!
//! The `Object` constructor creates object wrappers and carries the static
//! reflection surface; `Object.prototype` is the root of almost every
//! prototype chain.

use crate::{
    builtins::BuiltIn,
    context::Context,
    object::{ConstructorBuilder, JsObject, Object, ObjectData},
    property::{Attribute, PartialDescriptor, PropertyDescriptor, PropertyKey},
    value::{same_value, JsValue},
    JsResult,
};

#[cfg(test)]
mod tests;

#[derive(Debug, Clone, Copy)]
pub(crate) struct BuiltInObjectObject;

impl BuiltIn for BuiltInObjectObject {
    const NAME: &'static str = "Object";

    fn init(context: &mut Context) -> (&'static str, JsValue, Attribute) {
        let object = ConstructorBuilder::with_standard_object(
            context,
            Self::constructor,
            context.standard_objects().object_object().clone(),
        )
        .name(Self::NAME)
        .length(1)
        .inherit(JsValue::Null)
        .method(Self::has_own_property, "hasOwnProperty", 1)
        .method(Self::property_is_enumerable, "propertyIsEnumerable", 1)
        .method(Self::is_prototype_of, "isPrototypeOf", 1)
        .method(Self::to_string, "toString", 0)
        .method(Self::to_locale_string, "toLocaleString", 0)
        .method(Self::value_of, "valueOf", 0)
        .static_method(Self::assign, "assign", 2)
        .static_method(Self::create, "create", 2)
        .static_method(Self::define_property, "defineProperty", 3)
        .static_method(Self::define_properties, "defineProperties", 2)
        .static_method(Self::entries, "entries", 1)
        .static_method(Self::freeze, "freeze", 1)
        .static_method(Self::from_entries, "fromEntries", 1)
        .static_method(Self::get_own_property_descriptor, "getOwnPropertyDescriptor", 2)
        .static_method(Self::get_own_property_names, "getOwnPropertyNames", 1)
        .static_method(Self::get_own_property_symbols, "getOwnPropertySymbols", 1)
        .static_method(Self::get_prototype_of, "getPrototypeOf", 1)
        .static_method(Self::is, "is", 2)
        .static_method(Self::is_extensible, "isExtensible", 1)
        .static_method(Self::is_frozen, "isFrozen", 1)
        .static_method(Self::is_sealed, "isSealed", 1)
        .static_method(Self::keys, "keys", 1)
        .static_method(Self::prevent_extensions, "preventExtensions", 1)
        .static_method(Self::seal, "seal", 1)
        .static_method(Self::set_prototype_of, "setPrototypeOf", 2)
        .static_method(Self::values, "values", 1)
        .build();

        (Self::NAME, object.into(), Self::attribute())
    }
}

impl BuiltInObjectObject {
    /// `Object([value])`.
    fn constructor(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        match args.get(0) {
            None | Some(JsValue::Undefined) | Some(JsValue::Null) => {
                if context.is_in_constructor_call() {
                    if let JsValue::Object(object) = this {
                        return Ok(object.clone().into());
                    }
                }
                Ok(context.construct_object().into())
            }
            Some(value) => Ok(value.to_object(context)?.into()),
        }
    }

    /// `Object.prototype.hasOwnProperty(key)`.
    fn has_own_property(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let key = args
            .get(0)
            .cloned()
            .unwrap_or_default()
            .to_property_key(context)?;
        let object = this.to_object(context)?;
        Ok(object.get_own_property(&key).is_some().into())
    }

    /// `Object.prototype.propertyIsEnumerable(key)`.
    fn property_is_enumerable(
        this: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let key = args
            .get(0)
            .cloned()
            .unwrap_or_default()
            .to_property_key(context)?;
        let object = this.to_object(context)?;
        Ok(object
            .get_own_property(&key)
            .map_or(false, |desc| desc.enumerable())
            .into())
    }

    /// `Object.prototype.isPrototypeOf(value)`.
    fn is_prototype_of(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let target = this.to_object(context)?;
        let mut chain = match args.get(0) {
            Some(JsValue::Object(object)) => object.prototype(),
            _ => return Ok(false.into()),
        };
        while let JsValue::Object(link) = chain {
            if JsObject::equals(&link, &target) {
                return Ok(true.into());
            }
            chain = link.prototype();
        }
        Ok(false.into())
    }

    /// `Object.prototype.toString()`, honoring `Symbol.toStringTag`.
    #[allow(clippy::wrong_self_convention)]
    fn to_string(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let tag = match this {
            JsValue::Undefined => "Undefined".to_owned(),
            JsValue::Null => "Null".to_owned(),
            _ => {
                let object = this.to_object(context)?;
                let tag_key =
                    PropertyKey::from(context.well_known_symbols().to_string_tag_symbol());
                let custom = object.get(&tag_key, this.clone(), context)?;
                match custom.as_string() {
                    Some(tag) => tag.to_string(),
                    None => object.borrow().data.type_tag().to_owned(),
                }
            }
        };
        Ok(JsValue::new(format!("[object {tag}]")))
    }

    fn to_locale_string(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        this.invoke("toString", &[], context)
    }

    /// `Object.prototype.valueOf()`.
    fn value_of(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        Ok(this.to_object(context)?.into())
    }

    /// `Object.assign(target, ...sources)`.
    fn assign(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let target = args
            .get(0)
            .cloned()
            .unwrap_or_default()
            .to_object(context)?;
        for source in args.get(1..).unwrap_or(&[]) {
            if source.is_null_or_undefined() {
                continue;
            }
            let from = source.to_object(context)?;
            for key in from.own_property_keys() {
                let Some(desc) = from.get_own_property(&key) else {
                    continue;
                };
                if !desc.enumerable() {
                    continue;
                }
                let value = from.get(&key, source.clone(), context)?;
                target.set(key, value, target.clone().into(), true, context)?;
            }
        }
        Ok(target.into())
    }

    /// `Object.create(prototype, [properties])`.
    fn create(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let prototype = args.get(0).cloned().unwrap_or_default();
        if !prototype.is_object() && !prototype.is_null() {
            return context
                .throw_type_error("Object prototype may only be an Object or null");
        }
        let object = JsObject::new(Object::create(prototype));
        if let Some(properties) = args.get(1) {
            if !properties.is_undefined() {
                define_properties_on(&object, properties, context)?;
            }
        }
        Ok(object.into())
    }

    /// `Object.defineProperty(object, key, descriptor)`.
    fn define_property(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let Some(JsValue::Object(object)) = args.get(0) else {
            return context.throw_type_error("Object.defineProperty called on non-object");
        };
        let key = args
            .get(1)
            .cloned()
            .unwrap_or_default()
            .to_property_key(context)?;
        let descriptor = to_property_descriptor(args.get(2).cloned().unwrap_or_default(), context)?;
        if !object.define_own_property(key.clone(), descriptor) {
            return context.throw_type_error(format!("cannot redefine property '{key}'"));
        }
        Ok(object.clone().into())
    }

    /// `Object.defineProperties(object, properties)`.
    fn define_properties(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let Some(JsValue::Object(object)) = args.get(0) else {
            return context.throw_type_error("Object.defineProperties called on non-object");
        };
        define_properties_on(object, &args.get(1).cloned().unwrap_or_default(), context)?;
        Ok(object.clone().into())
    }

    /// `Object.entries(object)`.
    fn entries(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let value = args.get(0).cloned().unwrap_or_default();
        let object = value.to_object(context)?;
        let mut entries = Vec::new();
        for key in object.enumerable_keys() {
            let entry_value = object.get(&key, value.clone(), context)?;
            let pair = crate::builtins::array::Array::create_array(
                vec![JsValue::new(key.to_js_string()), entry_value],
                context,
            );
            entries.push(pair);
        }
        Ok(crate::builtins::array::Array::create_array(entries, context))
    }

    /// `Object.freeze(value)`.
    fn freeze(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let _ = context;
        let value = args.get(0).cloned().unwrap_or_default();
        if let JsValue::Object(object) = &value {
            object.freeze();
        }
        Ok(value)
    }

    /// `Object.fromEntries(iterable)`.
    fn from_entries(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let iterable = args.get(0).cloned().unwrap_or_default();
        iterable.require_object_coercible(context)?;
        let object = context.construct_object();
        let pairs = crate::builtins::iterable::iterate_to_vec(&iterable, context)?;
        for pair in pairs {
            let JsValue::Object(entry) = pair else {
                return context.throw_type_error("iterator entry is not an object");
            };
            let key = entry
                .get(&PropertyKey::Index(0), entry.clone().into(), context)?
                .to_property_key(context)?;
            let value = entry.get(&PropertyKey::Index(1), entry.clone().into(), context)?;
            object.create_data_property(key, value);
        }
        Ok(object.into())
    }

    /// `Object.getOwnPropertyDescriptor(object, key)`.
    fn get_own_property_descriptor(
        _: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let object = args
            .get(0)
            .cloned()
            .unwrap_or_default()
            .to_object(context)?;
        let key = args
            .get(1)
            .cloned()
            .unwrap_or_default()
            .to_property_key(context)?;
        match object.get_own_property(&key) {
            Some(descriptor) => Ok(from_property_descriptor(&descriptor, context).into()),
            None => Ok(JsValue::undefined()),
        }
    }

    /// `Object.getOwnPropertyNames(object)`.
    fn get_own_property_names(
        _: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let object = args
            .get(0)
            .cloned()
            .unwrap_or_default()
            .to_object(context)?;
        let names: Vec<JsValue> = object
            .own_property_keys()
            .into_iter()
            .filter(|key| !matches!(key, PropertyKey::Symbol(_)))
            .map(|key| JsValue::new(key.to_js_string()))
            .collect();
        Ok(crate::builtins::array::Array::create_array(names, context))
    }

    /// `Object.getOwnPropertySymbols(object)`.
    fn get_own_property_symbols(
        _: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let object = args
            .get(0)
            .cloned()
            .unwrap_or_default()
            .to_object(context)?;
        let symbols: Vec<JsValue> = object
            .own_property_keys()
            .into_iter()
            .filter_map(|key| match key {
                PropertyKey::Symbol(symbol) => Some(JsValue::Symbol(symbol)),
                _ => None,
            })
            .collect();
        Ok(crate::builtins::array::Array::create_array(symbols, context))
    }

    /// `Object.getPrototypeOf(object)`.
    fn get_prototype_of(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = args
            .get(0)
            .cloned()
            .unwrap_or_default()
            .to_object(context)?;
        Ok(object.prototype())
    }

    /// `Object.is(a, b)`: the `SameValue` comparison.
    fn is(_: &JsValue, args: &[JsValue], _context: &mut Context) -> JsResult<JsValue> {
        let x = args.get(0).cloned().unwrap_or_default();
        let y = args.get(1).cloned().unwrap_or_default();
        Ok(same_value(&x, &y).into())
    }

    fn is_extensible(_: &JsValue, args: &[JsValue], _context: &mut Context) -> JsResult<JsValue> {
        Ok(match args.get(0) {
            Some(JsValue::Object(object)) => object.is_extensible().into(),
            _ => false.into(),
        })
    }

    /// `Object.isFrozen(value)`; primitives count as frozen.
    fn is_frozen(_: &JsValue, args: &[JsValue], _context: &mut Context) -> JsResult<JsValue> {
        Ok(match args.get(0) {
            Some(JsValue::Object(object)) => object.is_frozen().into(),
            _ => true.into(),
        })
    }

    fn is_sealed(_: &JsValue, args: &[JsValue], _context: &mut Context) -> JsResult<JsValue> {
        Ok(match args.get(0) {
            Some(JsValue::Object(object)) => object.is_sealed().into(),
            _ => true.into(),
        })
    }

    /// `Object.keys(object)`.
    fn keys(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let value = args.get(0).cloned().unwrap_or_default();
        let object = value.to_object(context)?;
        let keys: Vec<JsValue> = object
            .enumerable_keys()
            .into_iter()
            .map(|key| JsValue::new(key.to_js_string()))
            .collect();
        Ok(crate::builtins::array::Array::create_array(keys, context))
    }

    fn prevent_extensions(_: &JsValue, args: &[JsValue], _context: &mut Context) -> JsResult<JsValue> {
        let value = args.get(0).cloned().unwrap_or_default();
        if let JsValue::Object(object) = &value {
            object.prevent_extensions();
        }
        Ok(value)
    }

    /// `Object.seal(value)`.
    fn seal(_: &JsValue, args: &[JsValue], _context: &mut Context) -> JsResult<JsValue> {
        let value = args.get(0).cloned().unwrap_or_default();
        if let JsValue::Object(object) = &value {
            object.seal();
        }
        Ok(value)
    }

    /// `Object.setPrototypeOf(object, prototype)`.
    fn set_prototype_of(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let value = args.get(0).cloned().unwrap_or_default();
        value.require_object_coercible(context)?;
        let prototype = args.get(1).cloned().unwrap_or_default();
        if !prototype.is_object() && !prototype.is_null() {
            return context
                .throw_type_error("Object prototype may only be an Object or null");
        }
        let JsValue::Object(object) = &value else {
            return Ok(value);
        };
        if !object.set_prototype(prototype) {
            return context.throw_type_error("could not set prototype: cycle or non-extensible");
        }
        Ok(value)
    }

    /// `Object.values(object)`.
    fn values(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let value = args.get(0).cloned().unwrap_or_default();
        let object = value.to_object(context)?;
        let mut values = Vec::new();
        for key in object.enumerable_keys() {
            values.push(object.get(&key, value.clone(), context)?);
        }
        Ok(crate::builtins::array::Array::create_array(values, context))
    }
}

/// `ObjectDefineProperties`: reads every enumerable own key of `properties`
/// as a descriptor and defines it on `object`.
fn define_properties_on(
    object: &JsObject,
    properties: &JsValue,
    context: &mut Context,
) -> JsResult<()> {
    let properties = properties.to_object(context)?;
    for key in properties.own_property_keys() {
        let Some(meta) = properties.get_own_property(&key) else {
            continue;
        };
        if !meta.enumerable() {
            continue;
        }
        let descriptor_value = properties.get(&key, properties.clone().into(), context)?;
        let descriptor = to_property_descriptor(descriptor_value, context)?;
        if !object.define_own_property(key.clone(), descriptor) {
            return context.throw_type_error(format!("cannot redefine property '{key}'"));
        }
    }
    Ok(())
}

/// `ToPropertyDescriptor`: reads the descriptor fields off an object.
pub(crate) fn to_property_descriptor(
    value: JsValue,
    context: &mut Context,
) -> JsResult<PartialDescriptor> {
    let JsValue::Object(object) = &value else {
        return context.throw_type_error("property descriptor must be an object");
    };

    let mut descriptor = PartialDescriptor::default();

    if object.has_property(&"enumerable".into()) {
        descriptor.enumerable = Some(
            object
                .get(&"enumerable".into(), value.clone(), context)?
                .to_boolean(),
        );
    }
    if object.has_property(&"configurable".into()) {
        descriptor.configurable = Some(
            object
                .get(&"configurable".into(), value.clone(), context)?
                .to_boolean(),
        );
    }
    if object.has_property(&"value".into()) {
        descriptor.value = Some(object.get(&"value".into(), value.clone(), context)?);
    }
    if object.has_property(&"writable".into()) {
        descriptor.writable = Some(
            object
                .get(&"writable".into(), value.clone(), context)?
                .to_boolean(),
        );
    }
    if object.has_property(&"get".into()) {
        let getter = object.get(&"get".into(), value.clone(), context)?;
        descriptor.get = Some(match getter {
            JsValue::Undefined => None,
            JsValue::Object(function) if function.is_callable() => Some(function),
            _ => return context.throw_type_error("property getter must be callable"),
        });
    }
    if object.has_property(&"set".into()) {
        let setter = object.get(&"set".into(), value.clone(), context)?;
        descriptor.set = Some(match setter {
            JsValue::Undefined => None,
            JsValue::Object(function) if function.is_callable() => Some(function),
            _ => return context.throw_type_error("property setter must be callable"),
        });
    }

    if (descriptor.get.is_some() || descriptor.set.is_some())
        && (descriptor.value.is_some() || descriptor.writable.is_some())
    {
        return context
            .throw_type_error("descriptor cannot be both a data and an accessor descriptor");
    }

    Ok(descriptor)
}

/// `FromPropertyDescriptor`: reifies a stored descriptor as an object.
pub(crate) fn from_property_descriptor(
    descriptor: &PropertyDescriptor,
    context: &mut Context,
) -> JsObject {
    let result = context.construct_object();
    match descriptor {
        PropertyDescriptor::Data(data) => {
            result.create_data_property("value", data.value());
            result.create_data_property("writable", data.writable());
        }
        PropertyDescriptor::Accessor(accessor) => {
            result.create_data_property(
                "get",
                accessor.getter().cloned().map_or(JsValue::undefined(), JsValue::from),
            );
            result.create_data_property(
                "set",
                accessor.setter().cloned().map_or(JsValue::undefined(), JsValue::from),
            );
        }
    }
    result.create_data_property("enumerable", descriptor.enumerable());
    result.create_data_property("configurable", descriptor.configurable());
    result
}
