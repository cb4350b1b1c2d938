//! This module implements the global `Symbol` object.
//!
//! `Symbol()` returns a fresh unique symbol; the well-known symbols are
//! allocated once per realm and installed as static properties here.

use crate::{
    builtins::BuiltIn,
    context::Context,
    object::{ConstructorBuilder, ObjectData},
    property::Attribute,
    value::JsValue,
    JsResult,
};

#[derive(Debug, Clone, Copy)]
pub(crate) struct Symbol;

impl BuiltIn for Symbol {
    const NAME: &'static str = "Symbol";

    fn init(context: &mut Context) -> (&'static str, JsValue, Attribute) {
        let permanent = Attribute::READONLY | Attribute::NON_ENUMERABLE | Attribute::PERMANENT;
        let symbols = context.well_known_symbols().clone();

        let symbol = ConstructorBuilder::with_standard_object(
            context,
            Self::constructor,
            context.standard_objects().symbol_object().clone(),
        )
        .name(Self::NAME)
        .length(0)
        .constructable(false)
        .static_property("asyncIterator", symbols.async_iterator_symbol(), permanent)
        .static_property("hasInstance", symbols.has_instance_symbol(), permanent)
        .static_property(
            "isConcatSpreadable",
            symbols.is_concat_spreadable_symbol(),
            permanent,
        )
        .static_property("iterator", symbols.iterator_symbol(), permanent)
        .static_property("match", symbols.match_symbol(), permanent)
        .static_property("replace", symbols.replace_symbol(), permanent)
        .static_property("search", symbols.search_symbol(), permanent)
        .static_property("species", symbols.species_symbol(), permanent)
        .static_property("split", symbols.split_symbol(), permanent)
        .static_property("toPrimitive", symbols.to_primitive_symbol(), permanent)
        .static_property("toStringTag", symbols.to_string_tag_symbol(), permanent)
        .static_property("unscopables", symbols.unscopables_symbol(), permanent)
        .method(Self::to_string, "toString", 0)
        .method(Self::value_of, "valueOf", 0)
        .build();

        (Self::NAME, symbol.into(), Self::attribute())
    }
}

impl Symbol {
    /// `Symbol([description])`: callable, never constructable.
    fn constructor(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        if context.is_in_constructor_call() {
            return context.throw_type_error("Symbol is not a constructor");
        }
        let description = match args.get(0) {
            None | Some(JsValue::Undefined) => None,
            Some(value) => Some(value.to_string(context)?),
        };
        Ok(context.construct_symbol(description).into())
    }

    fn this_symbol_value(
        this: &JsValue,
        context: &mut Context,
    ) -> JsResult<crate::symbol::JsSymbol> {
        match this {
            JsValue::Symbol(symbol) => Ok(symbol.clone()),
            JsValue::Object(object) => match object.borrow().data {
                ObjectData::Symbol(ref symbol) => Ok(symbol.clone()),
                _ => context
                    .throw_type_error("Symbol.prototype method called on incompatible receiver"),
            },
            _ => context
                .throw_type_error("Symbol.prototype method called on incompatible receiver"),
        }
    }

    /// `Symbol.prototype.toString()`.
    #[allow(clippy::wrong_self_convention)]
    fn to_string(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let symbol = Self::this_symbol_value(this, context)?;
        Ok(JsValue::new(symbol.to_display_string()))
    }

    /// `Symbol.prototype.valueOf()`.
    fn value_of(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        Ok(Self::this_symbol_value(this, context)?.into())
    }
}
