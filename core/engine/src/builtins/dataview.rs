//! This module implements the global `DataView` object.

use crate::{
    builtins::BuiltIn,
    context::Context,
    object::{ConstructorBuilder, JsObject, Object, ObjectData},
    property::Attribute,
    value::JsValue,
    JsResult,
};
use vesper_gc::{Finalize, Trace, Tracer};

/// The view slots over an `ArrayBuffer`.
#[derive(Debug, Finalize)]
pub struct DataView {
    pub buffer: JsObject,
    pub byte_offset: usize,
    pub byte_length: usize,
}

impl Trace for DataView {
    fn trace(&self, tracer: &mut Tracer) {
        self.buffer.trace(tracer);
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct DataViewBuiltin;

impl BuiltIn for DataViewBuiltin {
    const NAME: &'static str = "DataView";

    fn init(context: &mut Context) -> (&'static str, JsValue, Attribute) {
        let data_view = ConstructorBuilder::with_standard_object(
            context,
            Self::constructor,
            context.standard_objects().data_view_object().clone(),
        )
        .name(Self::NAME)
        .length(1)
        .method(Self::get_int8, "getInt8", 1)
        .method(Self::get_uint8, "getUint8", 1)
        .method(Self::get_int16, "getInt16", 1)
        .method(Self::get_uint16, "getUint16", 1)
        .method(Self::get_int32, "getInt32", 1)
        .method(Self::get_uint32, "getUint32", 1)
        .method(Self::get_float32, "getFloat32", 1)
        .method(Self::get_float64, "getFloat64", 1)
        .method(Self::set_int8, "setInt8", 2)
        .method(Self::set_uint8, "setUint8", 2)
        .method(Self::set_int16, "setInt16", 2)
        .method(Self::set_uint16, "setUint16", 2)
        .method(Self::set_int32, "setInt32", 2)
        .method(Self::set_uint32, "setUint32", 2)
        .method(Self::set_float32, "setFloat32", 2)
        .method(Self::set_float64, "setFloat64", 2)
        .build();

        (Self::NAME, data_view.into(), Self::attribute())
    }
}

fn this_data_view(this: &JsValue, context: &mut Context) -> JsResult<(JsObject, usize, usize)> {
    if let JsValue::Object(object) = this {
        let borrowed = object.borrow();
        if let ObjectData::DataView(ref view) = borrowed.data {
            return Ok((view.buffer.clone(), view.byte_offset, view.byte_length));
        }
    }
    context.throw_type_error("DataView.prototype method called on incompatible receiver")
}

/// Reads `SIZE` bytes honoring the requested endianness.
fn read_bytes<const SIZE: usize>(
    this: &JsValue,
    args: &[JsValue],
    context: &mut Context,
) -> JsResult<[u8; SIZE]> {
    let (buffer, view_offset, view_length) = this_data_view(this, context)?;
    let offset = args.get(0).cloned().unwrap_or_default().to_index(context)?;
    let little_endian = args.get(1).map_or(false, JsValue::to_boolean);
    if offset + SIZE > view_length {
        return context.throw_range_error("offset is outside the bounds of the DataView");
    }

    let bytes = {
        let borrowed = buffer.borrow();
        let ObjectData::ArrayBuffer(ref store) = borrowed.data else {
            drop(borrowed);
            return context.throw_type_error("DataView buffer is not an ArrayBuffer");
        };
        store.read(view_offset + offset, SIZE)
    };
    let Some(bytes) = bytes else {
        return context.throw_type_error("cannot read from a detached ArrayBuffer");
    };
    let mut out: [u8; SIZE] = bytes.try_into().expect("read returned SIZE bytes");
    if !little_endian {
        out.reverse();
    }
    Ok(out)
}

/// Writes the little-endian `bytes`, flipping for big-endian requests.
fn write_bytes<const SIZE: usize>(
    this: &JsValue,
    args: &[JsValue],
    mut bytes: [u8; SIZE],
    context: &mut Context,
) -> JsResult<JsValue> {
    let (buffer, view_offset, view_length) = this_data_view(this, context)?;
    let offset = args.get(0).cloned().unwrap_or_default().to_index(context)?;
    let little_endian = args.get(2).map_or(false, JsValue::to_boolean);
    if offset + SIZE > view_length {
        return context.throw_range_error("offset is outside the bounds of the DataView");
    }
    if !little_endian {
        bytes.reverse();
    }

    let written = {
        let borrowed = buffer.borrow();
        let ObjectData::ArrayBuffer(ref store) = borrowed.data else {
            drop(borrowed);
            return context.throw_type_error("DataView buffer is not an ArrayBuffer");
        };
        store.write(view_offset + offset, &bytes)
    };
    if !written {
        return context.throw_type_error("cannot write to a detached ArrayBuffer");
    }
    Ok(JsValue::undefined())
}

fn value_arg(args: &[JsValue], context: &mut Context) -> JsResult<f64> {
    args.get(1).cloned().unwrap_or_default().to_number(context)
}

impl DataViewBuiltin {
    /// `new DataView(buffer[, byteOffset[, byteLength]])`.
    fn constructor(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        if !context.is_in_constructor_call() {
            return context.throw_type_error("DataView constructor requires new");
        }
        let Some(JsValue::Object(buffer)) = args.get(0) else {
            return context.throw_type_error("first argument to DataView must be an ArrayBuffer");
        };
        let buffer_length = {
            let borrowed = buffer.borrow();
            let ObjectData::ArrayBuffer(ref store) = borrowed.data else {
                drop(borrowed);
                return context
                    .throw_type_error("first argument to DataView must be an ArrayBuffer");
            };
            store.byte_length()
        };

        let byte_offset = args.get(1).cloned().unwrap_or_default().to_index(context)?;
        if byte_offset > buffer_length {
            return context.throw_range_error("start offset is outside the bounds of the buffer");
        }
        let byte_length = match args.get(2) {
            None | Some(JsValue::Undefined) => buffer_length - byte_offset,
            Some(value) => value.to_index(context)?,
        };
        if byte_offset + byte_length > buffer_length {
            return context.throw_range_error("invalid DataView length");
        }

        let view = DataView {
            buffer: buffer.clone(),
            byte_offset,
            byte_length,
        };
        let JsValue::Object(object) = this else {
            let prototype = context.standard_objects().data_view_object().prototype();
            return Ok(JsObject::new(Object::with_prototype(
                prototype.into(),
                ObjectData::DataView(view),
            ))
            .into());
        };
        object.borrow_mut().data = ObjectData::DataView(view);
        let permanent = Attribute::READONLY | Attribute::NON_ENUMERABLE | Attribute::PERMANENT;
        object.insert_property("byteOffset", byte_offset, permanent);
        object.insert_property("byteLength", byte_length, permanent);
        object.insert_property("buffer", buffer.clone(), permanent);
        Ok(this.clone())
    }

    fn get_int8(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let bytes = read_bytes::<1>(this, args, context)?;
        Ok(JsValue::new(bytes[0] as i8))
    }

    fn get_uint8(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let bytes = read_bytes::<1>(this, args, context)?;
        Ok(JsValue::new(bytes[0]))
    }

    fn get_int16(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let bytes = read_bytes::<2>(this, args, context)?;
        Ok(JsValue::new(i16::from_le_bytes(bytes)))
    }

    fn get_uint16(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let bytes = read_bytes::<2>(this, args, context)?;
        Ok(JsValue::new(u16::from_le_bytes(bytes)))
    }

    fn get_int32(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let bytes = read_bytes::<4>(this, args, context)?;
        Ok(JsValue::new(i32::from_le_bytes(bytes)))
    }

    fn get_uint32(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let bytes = read_bytes::<4>(this, args, context)?;
        Ok(JsValue::new(u32::from_le_bytes(bytes)))
    }

    fn get_float32(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let bytes = read_bytes::<4>(this, args, context)?;
        Ok(JsValue::new(f64::from(f32::from_le_bytes(bytes))))
    }

    fn get_float64(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let bytes = read_bytes::<8>(this, args, context)?;
        Ok(JsValue::new(f64::from_le_bytes(bytes)))
    }

    fn set_int8(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let value = value_arg(args, context)?;
        write_bytes(this, args, [crate::builtins::number::f64_to_int32(value) as u8], context)
    }

    fn set_uint8(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let value = value_arg(args, context)?;
        write_bytes(
            this,
            args,
            [crate::builtins::number::f64_to_uint32(value) as u8],
            context,
        )
    }

    fn set_int16(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let value = value_arg(args, context)?;
        write_bytes(
            this,
            args,
            (crate::builtins::number::f64_to_int32(value) as i16).to_le_bytes(),
            context,
        )
    }

    fn set_uint16(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let value = value_arg(args, context)?;
        write_bytes(
            this,
            args,
            (crate::builtins::number::f64_to_uint32(value) as u16).to_le_bytes(),
            context,
        )
    }

    fn set_int32(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let value = value_arg(args, context)?;
        write_bytes(
            this,
            args,
            crate::builtins::number::f64_to_int32(value).to_le_bytes(),
            context,
        )
    }

    fn set_uint32(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let value = value_arg(args, context)?;
        write_bytes(
            this,
            args,
            crate::builtins::number::f64_to_uint32(value).to_le_bytes(),
            context,
        )
    }

    fn set_float32(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let value = value_arg(args, context)?;
        write_bytes(this, args, (value as f32).to_le_bytes(), context)
    }

    fn set_float64(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let value = value_arg(args, context)?;
        write_bytes(this, args, value.to_le_bytes(), context)
    }
}
