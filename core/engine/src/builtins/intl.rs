//! The `Intl` namespace. Full internationalization tables are out of
//! scope; the namespace exists so feature probes see it.

use crate::{
    builtins::BuiltIn,
    context::Context,
    object::ObjectInitializer,
    property::{Attribute, PropertyKey},
    value::JsValue,
    JsResult,
};

#[derive(Debug, Clone, Copy)]
pub(crate) struct Intl;

impl BuiltIn for Intl {
    const NAME: &'static str = "Intl";

    fn init(context: &mut Context) -> (&'static str, JsValue, Attribute) {
        let tag_key = PropertyKey::from(context.well_known_symbols().to_string_tag_symbol());
        let intl = ObjectInitializer::new(context)
            .function(Self::get_canonical_locales, "getCanonicalLocales", 1)
            .property(
                tag_key,
                "Intl",
                Attribute::READONLY | Attribute::NON_ENUMERABLE | Attribute::CONFIGURABLE,
            )
            .build();

        (Self::NAME, intl.into(), Self::attribute())
    }
}

impl Intl {
    /// `Intl.getCanonicalLocales(locales)`: pass-through canonicalization.
    fn get_canonical_locales(
        _: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let locales = match args.get(0) {
            None | Some(JsValue::Undefined) => Vec::new(),
            Some(JsValue::String(locale)) => vec![JsValue::new(locale.clone())],
            Some(value) => {
                crate::builtins::function::create_list_from_array_like(value, context)?
            }
        };
        Ok(crate::builtins::array::Array::create_array(locales, context))
    }
}
