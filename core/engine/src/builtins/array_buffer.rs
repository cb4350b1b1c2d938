//! This module implements the global `ArrayBuffer` object: a raw byte
//! store with a detached flag.

use crate::{
    builtins::BuiltIn,
    context::Context,
    object::{ConstructorBuilder, FunctionBuilder, JsObject, Object, ObjectData},
    property::Attribute,
    value::JsValue,
    JsResult,
};
use std::cell::RefCell;
use vesper_gc::{Finalize, Trace, Tracer};

/// The byte store; `None` once detached.
#[derive(Debug, Default, Finalize)]
pub struct ArrayBuffer {
    data: RefCell<Option<Vec<u8>>>,
}

impl Trace for ArrayBuffer {
    #[inline]
    fn trace(&self, _tracer: &mut Tracer) {}
}

impl ArrayBuffer {
    pub fn with_length(length: usize) -> Self {
        Self {
            data: RefCell::new(Some(vec![0; length])),
        }
    }

    pub fn is_detached(&self) -> bool {
        self.data.borrow().is_none()
    }

    pub fn byte_length(&self) -> usize {
        self.data.borrow().as_ref().map_or(0, Vec::len)
    }

    /// Reads `length` bytes at `offset`; `None` when detached or out of
    /// range.
    pub fn read(&self, offset: usize, length: usize) -> Option<Vec<u8>> {
        let data = self.data.borrow();
        let data = data.as_ref()?;
        data.get(offset..offset + length).map(<[u8]>::to_vec)
    }

    /// Writes `bytes` at `offset`; fails silently when detached or out of
    /// range.
    pub fn write(&self, offset: usize, bytes: &[u8]) -> bool {
        let mut data = self.data.borrow_mut();
        let Some(data) = data.as_mut() else {
            return false;
        };
        let Some(target) = data.get_mut(offset..offset + bytes.len()) else {
            return false;
        };
        target.copy_from_slice(bytes);
        true
    }

    pub fn detach(&self) {
        *self.data.borrow_mut() = None;
    }
}

pub(crate) fn new_array_buffer_object(length: usize, context: &mut Context) -> JsObject {
    let prototype = context.standard_objects().array_buffer_object().prototype();
    JsObject::new(Object::with_prototype(
        prototype.into(),
        ObjectData::ArrayBuffer(ArrayBuffer::with_length(length)),
    ))
}

/// Runs `f` against the buffer slots of `value`.
pub(crate) fn with_array_buffer<R>(
    value: &JsValue,
    context: &mut Context,
    f: impl FnOnce(&ArrayBuffer) -> R,
) -> JsResult<R> {
    if let JsValue::Object(object) = value {
        let borrowed = object.borrow();
        if let ObjectData::ArrayBuffer(ref buffer) = borrowed.data {
            return Ok(f(buffer));
        }
    }
    context.throw_type_error("ArrayBuffer.prototype method called on incompatible receiver")
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct ArrayBufferBuiltin;

impl BuiltIn for ArrayBufferBuiltin {
    const NAME: &'static str = "ArrayBuffer";

    fn init(context: &mut Context) -> (&'static str, JsValue, Attribute) {
        let byte_length_getter = FunctionBuilder::new(context, Self::byte_length)
            .name("get byteLength")
            .build();
        let array_buffer = ConstructorBuilder::with_standard_object(
            context,
            Self::constructor,
            context.standard_objects().array_buffer_object().clone(),
        )
        .name(Self::NAME)
        .length(1)
        .static_method(Self::is_view, "isView", 1)
        .method(Self::slice, "slice", 2)
        .accessor(
            "byteLength",
            Some(byte_length_getter),
            None,
            Attribute::NON_ENUMERABLE | Attribute::CONFIGURABLE,
        )
        .build();

        (Self::NAME, array_buffer.into(), Self::attribute())
    }
}

impl ArrayBufferBuiltin {
    fn constructor(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        if !context.is_in_constructor_call() {
            return context.throw_type_error("ArrayBuffer constructor requires new");
        }
        let length = args.get(0).cloned().unwrap_or_default().to_index(context)?;
        if length > i32::MAX as usize {
            return context.throw_range_error("ArrayBuffer allocation failed");
        }
        let JsValue::Object(object) = this else {
            return Ok(new_array_buffer_object(length, context).into());
        };
        object.borrow_mut().data = ObjectData::ArrayBuffer(ArrayBuffer::with_length(length));
        Ok(this.clone())
    }

    /// `ArrayBuffer.isView(value)`.
    fn is_view(_: &JsValue, args: &[JsValue], _context: &mut Context) -> JsResult<JsValue> {
        Ok(matches!(
            args.get(0),
            Some(JsValue::Object(object))
                if matches!(
                    object.borrow().data,
                    ObjectData::TypedArray(_) | ObjectData::DataView(_)
                )
        )
        .into())
    }

    /// The `byteLength` accessor; a detached buffer reports zero.
    fn byte_length(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let length = with_array_buffer(this, context, ArrayBuffer::byte_length)?;
        Ok(JsValue::new(length))
    }

    /// `ArrayBuffer.prototype.slice(start, end)`.
    fn slice(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let length = with_array_buffer(this, context, ArrayBuffer::byte_length)? as i64;
        let start = relative(args.get(0), length, 0, context)?;
        let end = relative(args.get(1), length, length, context)?;
        let span = (end - start).max(0) as usize;

        let bytes = with_array_buffer(this, context, |buffer| {
            buffer.read(start as usize, span)
        })?;
        let Some(bytes) = bytes else {
            return context.throw_type_error("cannot slice a detached ArrayBuffer");
        };
        let result = new_array_buffer_object(bytes.len(), context);
        if let ObjectData::ArrayBuffer(ref buffer) = result.borrow().data {
            buffer.write(0, &bytes);
        }
        Ok(result.into())
    }
}

fn relative(
    value: Option<&JsValue>,
    length: i64,
    default: i64,
    context: &mut Context,
) -> JsResult<i64> {
    let relative = match value {
        None | Some(JsValue::Undefined) => return Ok(default),
        Some(value) => value.to_integer_or_infinity(context)?,
    };
    if relative.is_infinite() {
        return Ok(if relative < 0.0 { 0 } else { length });
    }
    let relative = relative as i64;
    if relative < 0 {
        Ok((length + relative).max(0))
    } else {
        Ok(relative.min(length))
    }
}
