//! Builders wiring native functions, plain objects and constructors with
//! the attribute conventions of the global surface.

use super::{JsObject, Object, ObjectData, PROTOTYPE};
use crate::{
    builtins::function::{BuiltInFunction, Function, NativeFunction},
    context::{Context, StandardConstructor},
    property::{AccessorDescriptor, Attribute, DataDescriptor, PropertyKey},
    value::JsValue,
};
use std::fmt::{self, Debug};

/// The binding name of a builtin function, possibly different from the
/// `name` property (`Symbol.iterator` methods bind under the symbol).
#[derive(Debug, Clone)]
pub struct FunctionBinding {
    binding: PropertyKey,
    name: String,
}

impl From<&str> for FunctionBinding {
    #[inline]
    fn from(name: &str) -> Self {
        Self {
            binding: name.into(),
            name: name.into(),
        }
    }
}

impl<B> From<(B, &str)> for FunctionBinding
where
    B: Into<PropertyKey>,
{
    #[inline]
    fn from((binding, name): (B, &str)) -> Self {
        Self {
            binding: binding.into(),
            name: name.into(),
        }
    }
}

/// Builder for creating native function objects.
#[derive(Debug)]
pub struct FunctionBuilder<'context> {
    context: &'context mut Context,
    function: NativeFunction,
    name: Option<String>,
    length: usize,
    constructable: bool,
}

impl<'context> FunctionBuilder<'context> {
    /// Create a new `FunctionBuilder`.
    #[inline]
    pub fn new(context: &'context mut Context, function: NativeFunction) -> Self {
        Self {
            context,
            function,
            name: None,
            length: 0,
            constructable: false,
        }
    }

    /// Specify the `name` property of the function object.
    ///
    /// The default is `""` (empty string).
    #[inline]
    pub fn name<N: AsRef<str>>(&mut self, name: N) -> &mut Self {
        self.name = Some(name.as_ref().into());
        self
    }

    /// Specify the `length` property of the function object: how many
    /// arguments it takes.
    ///
    /// The default is `0`.
    #[inline]
    pub fn length(&mut self, length: usize) -> &mut Self {
        self.length = length;
        self
    }

    /// Specify whether the function can be called with `new`.
    ///
    /// The default is `false`.
    #[inline]
    pub fn constructable(&mut self, yes: bool) -> &mut Self {
        self.constructable = yes;
        self
    }

    /// Build the function object.
    pub fn build(&mut self) -> JsObject {
        let mut function = Object::function(
            Function::Native {
                function: BuiltInFunction(self.function),
                constructable: self.constructable,
            },
            self.context
                .standard_objects()
                .function_object()
                .prototype()
                .into(),
        );
        let attribute = Attribute::READONLY | Attribute::NON_ENUMERABLE | Attribute::CONFIGURABLE;
        function.insert_property("name", self.name.take().unwrap_or_default(), attribute);
        function.insert_property("length", self.length, attribute);
        JsObject::new(function)
    }
}

/// Builder for creating objects with properties.
#[derive(Debug)]
pub struct ObjectInitializer<'context> {
    context: &'context mut Context,
    object: JsObject,
}

impl<'context> ObjectInitializer<'context> {
    /// Create a new `ObjectInitializer` over a fresh ordinary object.
    #[inline]
    pub fn new(context: &'context mut Context) -> Self {
        let object = context.construct_object();
        Self { context, object }
    }

    /// Create an `ObjectInitializer` over an existing object.
    #[inline]
    pub fn with_object(context: &'context mut Context, object: JsObject) -> Self {
        Self { context, object }
    }

    /// Add a function to the object.
    pub fn function<B>(&mut self, function: NativeFunction, binding: B, length: usize) -> &mut Self
    where
        B: Into<FunctionBinding>,
    {
        let binding = binding.into();
        let function = FunctionBuilder::new(self.context, function)
            .name(&binding.name)
            .length(length)
            .build();

        self.object.borrow_mut().insert_property(
            binding.binding,
            function,
            Attribute::WRITABLE | Attribute::NON_ENUMERABLE | Attribute::CONFIGURABLE,
        );
        self
    }

    /// Add a property to the object.
    pub fn property<K, V>(&mut self, key: K, value: V, attribute: Attribute) -> &mut Self
    where
        K: Into<PropertyKey>,
        V: Into<JsValue>,
    {
        self.object
            .borrow_mut()
            .insert(key, DataDescriptor::new(value, attribute));
        self
    }

    /// Build the object.
    #[inline]
    pub fn build(&mut self) -> JsObject {
        self.object.clone()
    }
}

/// Builder for creating constructor objects, like `Array`.
pub struct ConstructorBuilder<'context> {
    context: &'context mut Context,
    constructor_function: NativeFunction,
    constructor_object: JsObject,
    prototype: JsObject,
    name: Option<String>,
    length: usize,
    constructable: bool,
    inherit: Option<JsValue>,
}

impl Debug for ConstructorBuilder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorBuilder")
            .field("name", &self.name)
            .field("length", &self.length)
            .field("constructor", &self.constructor_object)
            .field("prototype", &self.prototype)
            .field("inherit", &self.inherit)
            .field("constructable", &self.constructable)
            .finish()
    }
}

impl<'context> ConstructorBuilder<'context> {
    /// Create a new `ConstructorBuilder` with fresh constructor and
    /// prototype objects.
    #[inline]
    pub fn new(context: &'context mut Context, constructor: NativeFunction) -> Self {
        Self {
            context,
            constructor_function: constructor,
            constructor_object: JsObject::new(Object::default()),
            prototype: JsObject::new(Object::default()),
            length: 0,
            name: None,
            constructable: true,
            inherit: None,
        }
    }

    /// Create a `ConstructorBuilder` over the pre-allocated standard object
    /// pair, so intrinsics can reference the prototype before installation
    /// runs.
    #[inline]
    pub(crate) fn with_standard_object(
        context: &'context mut Context,
        constructor: NativeFunction,
        object: StandardConstructor,
    ) -> Self {
        Self {
            context,
            constructor_function: constructor,
            constructor_object: object.constructor(),
            prototype: object.prototype(),
            length: 0,
            name: None,
            constructable: true,
            inherit: None,
        }
    }

    /// Add a new method to the constructor's prototype.
    pub fn method<B>(&mut self, function: NativeFunction, binding: B, length: usize) -> &mut Self
    where
        B: Into<FunctionBinding>,
    {
        let binding = binding.into();
        let function = FunctionBuilder::new(self.context, function)
            .name(&binding.name)
            .length(length)
            .build();

        self.prototype.borrow_mut().insert_property(
            binding.binding,
            function,
            Attribute::WRITABLE | Attribute::NON_ENUMERABLE | Attribute::CONFIGURABLE,
        );
        self
    }

    /// Add a new static method to the constructor object itself.
    pub fn static_method<B>(
        &mut self,
        function: NativeFunction,
        binding: B,
        length: usize,
    ) -> &mut Self
    where
        B: Into<FunctionBinding>,
    {
        let binding = binding.into();
        let function = FunctionBuilder::new(self.context, function)
            .name(&binding.name)
            .length(length)
            .build();

        self.constructor_object.borrow_mut().insert_property(
            binding.binding,
            function,
            Attribute::WRITABLE | Attribute::NON_ENUMERABLE | Attribute::CONFIGURABLE,
        );
        self
    }

    /// Add a new data property to the constructor's prototype.
    pub fn property<K, V>(&mut self, key: K, value: V, attribute: Attribute) -> &mut Self
    where
        K: Into<PropertyKey>,
        V: Into<JsValue>,
    {
        self.prototype
            .borrow_mut()
            .insert(key, DataDescriptor::new(value, attribute));
        self
    }

    /// Add a new static data property to the constructor object itself.
    pub fn static_property<K, V>(&mut self, key: K, value: V, attribute: Attribute) -> &mut Self
    where
        K: Into<PropertyKey>,
        V: Into<JsValue>,
    {
        self.constructor_object
            .borrow_mut()
            .insert(key, DataDescriptor::new(value, attribute));
        self
    }

    /// Add a new accessor property to the constructor's prototype.
    pub fn accessor<K>(
        &mut self,
        key: K,
        get: Option<JsObject>,
        set: Option<JsObject>,
        attribute: Attribute,
    ) -> &mut Self
    where
        K: Into<PropertyKey>,
    {
        self.prototype
            .borrow_mut()
            .insert(key, AccessorDescriptor::new(get, set, attribute));
        self
    }

    /// Specify how many arguments the constructor function takes.
    ///
    /// Default is `0`.
    #[inline]
    pub fn length(&mut self, length: usize) -> &mut Self {
        self.length = length;
        self
    }

    /// Specify the name of the constructor function.
    #[inline]
    pub fn name<N: AsRef<str>>(&mut self, name: N) -> &mut Self {
        self.name = Some(name.as_ref().into());
        self
    }

    /// Specify whether the constructor function can be called with `new`.
    ///
    /// Default is `true`.
    #[inline]
    pub fn constructable(&mut self, constructable: bool) -> &mut Self {
        self.constructable = constructable;
        self
    }

    /// Specify the prototype this constructor's prototype object inherits
    /// from.
    ///
    /// Default is `Object.prototype`.
    #[inline]
    pub fn inherit(&mut self, prototype: JsValue) -> &mut Self {
        debug_assert!(prototype.is_object() || prototype.is_null());
        self.inherit = Some(prototype);
        self
    }

    /// Return the current context.
    #[inline]
    pub fn context(&mut self) -> &'_ mut Context {
        self.context
    }

    /// Build the constructor function object.
    pub fn build(&mut self) -> JsObject {
        let function = Function::Native {
            function: BuiltInFunction(self.constructor_function),
            constructable: self.constructable,
        };

        let permanent = Attribute::READONLY | Attribute::NON_ENUMERABLE | Attribute::PERMANENT;
        let length = DataDescriptor::new(self.length, permanent);
        let name = DataDescriptor::new(
            self.name.take().unwrap_or_else(|| String::from("[object]")),
            permanent,
        );

        {
            let mut constructor = self.constructor_object.borrow_mut();
            constructor.data = ObjectData::Function(function);
            constructor.insert("length", length);
            constructor.insert("name", name);

            constructor.set_prototype_instance(
                self.context
                    .standard_objects()
                    .function_object()
                    .prototype()
                    .into(),
            );

            // Every constructor's `prototype` slot is non-writable,
            // non-enumerable, non-configurable.
            constructor.insert_property(PROTOTYPE, self.prototype.clone(), permanent);
        }

        {
            let mut prototype = self.prototype.borrow_mut();
            prototype.insert_property(
                "constructor",
                self.constructor_object.clone(),
                Attribute::WRITABLE | Attribute::NON_ENUMERABLE | Attribute::CONFIGURABLE,
            );

            if let Some(proto) = self.inherit.take() {
                prototype.set_prototype_instance(proto);
            } else {
                prototype.set_prototype_instance(
                    self.context
                        .standard_objects()
                        .object_object()
                        .prototype()
                        .into(),
                );
            }
        }

        self.constructor_object.clone()
    }
}
