//! This module implements the TypedArray family: the abstract
//! `%TypedArray%` that throws when invoked directly, and the concrete
//! element-typed constructors chaining to it.

use crate::{
    builtins::{array_buffer, BuiltIn},
    context::Context,
    object::{ConstructorBuilder, JsObject, Object, ObjectData},
    property::{Attribute, PropertyKey},
    value::JsValue,
    JsResult,
};
use vesper_gc::{Finalize, Trace, Tracer};

/// The element type of a typed array view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypedArrayKind {
    Int8,
    Uint8,
    Uint8Clamped,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Float32,
    Float64,
    BigInt64,
    BigUint64,
}

impl TypedArrayKind {
    pub fn element_size(self) -> usize {
        match self {
            Self::Int8 | Self::Uint8 | Self::Uint8Clamped => 1,
            Self::Int16 | Self::Uint16 => 2,
            Self::Int32 | Self::Uint32 | Self::Float32 => 4,
            Self::Float64 | Self::BigInt64 | Self::BigUint64 => 8,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Int8 => "Int8Array",
            Self::Uint8 => "Uint8Array",
            Self::Uint8Clamped => "Uint8ClampedArray",
            Self::Int16 => "Int16Array",
            Self::Uint16 => "Uint16Array",
            Self::Int32 => "Int32Array",
            Self::Uint32 => "Uint32Array",
            Self::Float32 => "Float32Array",
            Self::Float64 => "Float64Array",
            Self::BigInt64 => "BigInt64Array",
            Self::BigUint64 => "BigUint64Array",
        }
    }
}

/// The view slots: buffer reference, byte offset, element count.
#[derive(Debug, Finalize)]
pub struct TypedArray {
    pub kind: TypedArrayKind,
    pub buffer: JsObject,
    pub byte_offset: usize,
    pub length: usize,
}

impl Trace for TypedArray {
    fn trace(&self, tracer: &mut Tracer) {
        self.buffer.trace(tracer);
    }
}

impl TypedArray {
    /// Reads element `index` from the backing buffer.
    pub fn element(&self, index: usize) -> Option<JsValue> {
        if index >= self.length {
            return None;
        }
        let size = self.kind.element_size();
        let offset = self.byte_offset + index * size;
        let bytes = {
            let borrowed = self.buffer.borrow();
            let ObjectData::ArrayBuffer(ref buffer) = borrowed.data else {
                return None;
            };
            buffer.read(offset, size)?
        };
        Some(decode_element(self.kind, &bytes))
    }

    /// Stores `value` (already numeric) at element `index`.
    pub fn set_element(&self, index: usize, value: f64) -> bool {
        if index >= self.length {
            return false;
        }
        let size = self.kind.element_size();
        let offset = self.byte_offset + index * size;
        let bytes = encode_element(self.kind, value);
        let borrowed = self.buffer.borrow();
        let ObjectData::ArrayBuffer(ref buffer) = borrowed.data else {
            return false;
        };
        buffer.write(offset, &bytes[..size])
    }
}

fn decode_element(kind: TypedArrayKind, bytes: &[u8]) -> JsValue {
    match kind {
        TypedArrayKind::Int8 => JsValue::new(bytes[0] as i8),
        TypedArrayKind::Uint8 | TypedArrayKind::Uint8Clamped => JsValue::new(bytes[0]),
        TypedArrayKind::Int16 => JsValue::new(i16::from_le_bytes([bytes[0], bytes[1]])),
        TypedArrayKind::Uint16 => JsValue::new(u16::from_le_bytes([bytes[0], bytes[1]])),
        TypedArrayKind::Int32 => {
            JsValue::new(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
        }
        TypedArrayKind::Uint32 => {
            JsValue::new(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
        }
        TypedArrayKind::Float32 => {
            JsValue::new(f64::from(f32::from_le_bytes([
                bytes[0], bytes[1], bytes[2], bytes[3],
            ])))
        }
        TypedArrayKind::Float64 => JsValue::new(f64::from_le_bytes([
            bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
        ])),
        TypedArrayKind::BigInt64 => JsValue::new(crate::bigint::JsBigInt::from(
            i64::from_le_bytes([
                bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
            ]),
        )),
        TypedArrayKind::BigUint64 => JsValue::new(crate::bigint::JsBigInt::from(
            u64::from_le_bytes([
                bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
            ]),
        )),
    }
}

fn encode_element(kind: TypedArrayKind, value: f64) -> [u8; 8] {
    let mut out = [0u8; 8];
    match kind {
        TypedArrayKind::Int8 => out[0] = crate::builtins::number::f64_to_int32(value) as u8,
        TypedArrayKind::Uint8 => out[0] = crate::builtins::number::f64_to_uint32(value) as u8,
        TypedArrayKind::Uint8Clamped => {
            out[0] = if value.is_nan() {
                0
            } else {
                value.round().clamp(0.0, 255.0) as u8
            };
        }
        TypedArrayKind::Int16 => out[..2].copy_from_slice(
            &(crate::builtins::number::f64_to_int32(value) as i16).to_le_bytes(),
        ),
        TypedArrayKind::Uint16 => out[..2].copy_from_slice(
            &(crate::builtins::number::f64_to_uint32(value) as u16).to_le_bytes(),
        ),
        TypedArrayKind::Int32 => out[..4]
            .copy_from_slice(&crate::builtins::number::f64_to_int32(value).to_le_bytes()),
        TypedArrayKind::Uint32 => out[..4]
            .copy_from_slice(&crate::builtins::number::f64_to_uint32(value).to_le_bytes()),
        TypedArrayKind::Float32 => out[..4].copy_from_slice(&(value as f32).to_le_bytes()),
        TypedArrayKind::Float64 => out.copy_from_slice(&value.to_le_bytes()),
        TypedArrayKind::BigInt64 | TypedArrayKind::BigUint64 => {
            out.copy_from_slice(&(value as i64).to_le_bytes());
        }
    }
    out
}

/// The abstract `%TypedArray%` constructor.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TypedArrayBuiltin;

impl BuiltIn for TypedArrayBuiltin {
    const NAME: &'static str = "TypedArray";

    fn init(context: &mut Context) -> (&'static str, JsValue, Attribute) {
        let typed_array = ConstructorBuilder::with_standard_object(
            context,
            Self::abstract_constructor,
            context.standard_objects().typed_array_object().clone(),
        )
        .name(Self::NAME)
        .length(0)
        .method(Self::at, "at", 1)
        .method(Self::fill, "fill", 1)
        .method(Self::join, "join", 1)
        .method(Self::to_string, "toString", 0)
        .build();

        (Self::NAME, typed_array.into(), Self::attribute())
    }
}

impl TypedArrayBuiltin {
    /// Direct invocation of the abstract constructor always throws.
    fn abstract_constructor(
        _: &JsValue,
        _: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        context.throw_type_error("Abstract class TypedArray not directly constructable")
    }

    fn this_typed_array<'a>(
        this: &'a JsValue,
        context: &mut Context,
    ) -> JsResult<&'a JsObject> {
        if let JsValue::Object(object) = this {
            if matches!(object.borrow().data, ObjectData::TypedArray(_)) {
                return Ok(object);
            }
        }
        context.throw_type_error("TypedArray.prototype method called on incompatible receiver")
    }

    fn at(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = Self::this_typed_array(this, context)?.clone();
        let mut index = args
            .get(0)
            .cloned()
            .unwrap_or_default()
            .to_integer_or_infinity(context)? as i64;
        let borrowed = object.borrow();
        let ObjectData::TypedArray(ref view) = borrowed.data else {
            unreachable!("checked by this_typed_array");
        };
        if index < 0 {
            index += view.length as i64;
        }
        if index < 0 || index as usize >= view.length {
            return Ok(JsValue::undefined());
        }
        Ok(view.element(index as usize).unwrap_or_default())
    }

    fn fill(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = Self::this_typed_array(this, context)?.clone();
        let value = args.get(0).cloned().unwrap_or_default().to_number(context)?;
        let borrowed = object.borrow();
        let ObjectData::TypedArray(ref view) = borrowed.data else {
            unreachable!("checked by this_typed_array");
        };
        for index in 0..view.length {
            view.set_element(index, value);
        }
        drop(borrowed);
        Ok(this.clone())
    }

    fn join(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = Self::this_typed_array(this, context)?.clone();
        let separator = match args.get(0) {
            None | Some(JsValue::Undefined) => ",".into(),
            Some(value) => value.to_string(context)?,
        };
        let elements: Vec<JsValue> = {
            let borrowed = object.borrow();
            let ObjectData::TypedArray(ref view) = borrowed.data else {
                unreachable!("checked by this_typed_array");
            };
            (0..view.length)
                .map(|index| view.element(index).unwrap_or_default())
                .collect()
        };
        let mut pieces = Vec::with_capacity(elements.len());
        for element in elements {
            pieces.push(element.to_string(context)?.to_string());
        }
        Ok(JsValue::new(pieces.join(&separator)))
    }

    #[allow(clippy::wrong_self_convention)]
    fn to_string(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        Self::join(this, &[], context)
    }
}

/// Allocates a typed-array view object over a fresh buffer.
pub(crate) fn new_typed_array(
    kind: TypedArrayKind,
    length: usize,
    context: &mut Context,
) -> JsObject {
    let buffer = array_buffer::new_array_buffer_object(length * kind.element_size(), context);
    let prototype = context.standard_objects().typed_array_object().prototype();
    let object = JsObject::new(Object::with_prototype(
        prototype.into(),
        ObjectData::TypedArray(TypedArray {
            kind,
            buffer: buffer.clone(),
            byte_offset: 0,
            length,
        }),
    ));
    let permanent = Attribute::READONLY | Attribute::NON_ENUMERABLE | Attribute::PERMANENT;
    object.insert_property("length", length, permanent);
    object.insert_property("byteOffset", 0, permanent);
    object.insert_property("byteLength", length * kind.element_size(), permanent);
    object.insert_property("buffer", buffer, permanent);
    object
}

/// One concrete constructor (`Int32Array`, ...), parameterized by kind.
fn concrete_constructor(
    kind: TypedArrayKind,
    this: &JsValue,
    args: &[JsValue],
    context: &mut Context,
) -> JsResult<JsValue> {
    if !context.is_in_constructor_call() {
        return context.throw_type_error(format!("constructor {} requires new", kind.name()));
    }

    let object = match args.get(0) {
        None => new_typed_array(kind, 0, context),
        Some(JsValue::Object(source)) if source.is_array() => {
            let length = crate::builtins::array::array_length(source) as usize;
            let target = new_typed_array(kind, length, context);
            for index in 0..length {
                let element = source.get(
                    &PropertyKey::from(index),
                    source.clone().into(),
                    context,
                )?;
                let number = element.to_number(context)?;
                if let ObjectData::TypedArray(ref view) = target.borrow().data {
                    view.set_element(index, number);
                }
            }
            target
        }
        Some(JsValue::Object(source))
            if matches!(source.borrow().data, ObjectData::ArrayBuffer(_)) =>
        {
            let byte_length = {
                let borrowed = source.borrow();
                let ObjectData::ArrayBuffer(ref buffer) = borrowed.data else {
                    unreachable!("checked above");
                };
                buffer.byte_length()
            };
            let byte_offset = args.get(1).cloned().unwrap_or_default().to_index(context)?;
            let size = kind.element_size();
            if byte_offset % size != 0 || byte_offset > byte_length {
                return context
                    .throw_range_error("start offset is outside the bounds of the buffer");
            }
            let length = match args.get(2) {
                None | Some(JsValue::Undefined) => (byte_length - byte_offset) / size,
                Some(value) => value.to_index(context)?,
            };
            if byte_offset + length * size > byte_length {
                return context.throw_range_error("invalid typed array length");
            }

            let prototype = context.standard_objects().typed_array_object().prototype();
            let object = JsObject::new(Object::with_prototype(
                prototype.into(),
                ObjectData::TypedArray(TypedArray {
                    kind,
                    buffer: source.clone(),
                    byte_offset,
                    length,
                }),
            ));
            let permanent =
                Attribute::READONLY | Attribute::NON_ENUMERABLE | Attribute::PERMANENT;
            object.insert_property("length", length, permanent);
            object.insert_property("byteOffset", byte_offset, permanent);
            object.insert_property("byteLength", length * size, permanent);
            object.insert_property("buffer", source.clone(), permanent);
            object
        }
        Some(value) => {
            let length = value.to_index(context)?;
            new_typed_array(kind, length, context)
        }
    };
    let _ = this;
    Ok(object.into())
}

macro_rules! concrete_typed_array {
    ($type_name:ident, $js_name:literal, $kind:expr) => {
        #[derive(Debug, Clone, Copy)]
        pub(crate) struct $type_name;

        impl BuiltIn for $type_name {
            const NAME: &'static str = $js_name;

            fn init(context: &mut Context) -> (&'static str, JsValue, Attribute) {
                let permanent =
                    Attribute::READONLY | Attribute::NON_ENUMERABLE | Attribute::PERMANENT;
                // Concrete constructors chain to the abstract %TypedArray%.
                let typed_array_prototype =
                    context.standard_objects().typed_array_object().prototype();
                let constructor = ConstructorBuilder::new(context, |this, args, context| {
                    concrete_constructor($kind, this, args, context)
                })
                .name(Self::NAME)
                .length(3)
                .inherit(typed_array_prototype.into())
                .static_property("BYTES_PER_ELEMENT", $kind.element_size(), permanent)
                .build();

                (Self::NAME, constructor.into(), Self::attribute())
            }
        }
    };
}

concrete_typed_array!(Int8Array, "Int8Array", TypedArrayKind::Int8);
concrete_typed_array!(Uint8Array, "Uint8Array", TypedArrayKind::Uint8);
concrete_typed_array!(Uint8ClampedArray, "Uint8ClampedArray", TypedArrayKind::Uint8Clamped);
concrete_typed_array!(Int16Array, "Int16Array", TypedArrayKind::Int16);
concrete_typed_array!(Uint16Array, "Uint16Array", TypedArrayKind::Uint16);
concrete_typed_array!(Int32Array, "Int32Array", TypedArrayKind::Int32);
concrete_typed_array!(Uint32Array, "Uint32Array", TypedArrayKind::Uint32);
concrete_typed_array!(Float32Array, "Float32Array", TypedArrayKind::Float32);
concrete_typed_array!(Float64Array, "Float64Array", TypedArrayKind::Float64);
concrete_typed_array!(BigInt64Array, "BigInt64Array", TypedArrayKind::BigInt64);
concrete_typed_array!(BigUint64Array, "BigUint64Array", TypedArrayKind::BigUint64);
