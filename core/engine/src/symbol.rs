//! JavaScript `Symbol` primitives and the per-realm well-known symbols.

use crate::string::JsString;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use vesper_gc::{Finalize, Trace, Tracer};

#[derive(Debug)]
struct Inner {
    hash: u64,
    description: Option<JsString>,
}

/// A JavaScript symbol: a unique identity with an optional description.
#[derive(Debug, Clone)]
pub struct JsSymbol(Rc<Inner>);

impl JsSymbol {
    /// Creates a new symbol. `hash` must be unique within the realm; the
    /// `Context` hands them out from its counter.
    pub fn new(hash: u64, description: Option<JsString>) -> Self {
        Self(Rc::new(Inner { hash, description }))
    }

    /// The symbol's description, if any.
    pub fn description(&self) -> Option<&JsString> {
        self.0.description.as_ref()
    }

    /// Realm-unique identity used for hashing.
    pub fn hash(&self) -> u64 {
        self.0.hash
    }

    /// `Symbol(desc)` display form.
    pub fn to_display_string(&self) -> String {
        match self.description() {
            Some(desc) => format!("Symbol({desc})"),
            None => "Symbol()".to_owned(),
        }
    }
}

impl PartialEq for JsSymbol {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for JsSymbol {}

impl Hash for JsSymbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash.hash(state);
    }
}

impl Finalize for JsSymbol {}

impl Trace for JsSymbol {
    #[inline]
    fn trace(&self, _tracer: &mut Tracer) {}
}

impl fmt::Display for JsSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_display_string())
    }
}

/// The well-known symbols, allocated once per realm and exposed on `Symbol`.
#[derive(Debug, Clone)]
pub struct WellKnownSymbols {
    async_iterator: JsSymbol,
    has_instance: JsSymbol,
    is_concat_spreadable: JsSymbol,
    iterator: JsSymbol,
    match_: JsSymbol,
    replace: JsSymbol,
    search: JsSymbol,
    species: JsSymbol,
    split: JsSymbol,
    to_primitive: JsSymbol,
    to_string_tag: JsSymbol,
    unscopables: JsSymbol,
}

impl WellKnownSymbols {
    /// Allocates the table. Returns the symbols together with the number of
    /// hashes consumed, so the context continues its counter from there.
    pub(crate) fn new() -> (Self, u64) {
        let mut count = 0;
        let mut next = |name: &str| {
            let symbol = JsSymbol::new(count, Some(name.into()));
            count += 1;
            symbol
        };

        let async_iterator = next("Symbol.asyncIterator");
        let has_instance = next("Symbol.hasInstance");
        let is_concat_spreadable = next("Symbol.isConcatSpreadable");
        let iterator = next("Symbol.iterator");
        let match_ = next("Symbol.match");
        let replace = next("Symbol.replace");
        let search = next("Symbol.search");
        let species = next("Symbol.species");
        let split = next("Symbol.split");
        let to_primitive = next("Symbol.toPrimitive");
        let to_string_tag = next("Symbol.toStringTag");
        let unscopables = next("Symbol.unscopables");

        (
            Self {
                async_iterator,
                has_instance,
                is_concat_spreadable,
                iterator,
                match_,
                replace,
                search,
                species,
                split,
                to_primitive,
                to_string_tag,
                unscopables,
            },
            count,
        )
    }

    /// The `Symbol.asyncIterator` well-known symbol.
    #[inline]
    pub fn async_iterator_symbol(&self) -> JsSymbol {
        self.async_iterator.clone()
    }

    /// The `Symbol.hasInstance` well-known symbol, consulted by
    /// `instanceof`.
    #[inline]
    pub fn has_instance_symbol(&self) -> JsSymbol {
        self.has_instance.clone()
    }

    /// The `Symbol.isConcatSpreadable` well-known symbol.
    #[inline]
    pub fn is_concat_spreadable_symbol(&self) -> JsSymbol {
        self.is_concat_spreadable.clone()
    }

    /// The `Symbol.iterator` well-known symbol, the iteration protocol hook.
    #[inline]
    pub fn iterator_symbol(&self) -> JsSymbol {
        self.iterator.clone()
    }

    /// The `Symbol.match` well-known symbol.
    #[inline]
    pub fn match_symbol(&self) -> JsSymbol {
        self.match_.clone()
    }

    /// The `Symbol.replace` well-known symbol.
    #[inline]
    pub fn replace_symbol(&self) -> JsSymbol {
        self.replace.clone()
    }

    /// The `Symbol.search` well-known symbol.
    #[inline]
    pub fn search_symbol(&self) -> JsSymbol {
        self.search.clone()
    }

    /// The `Symbol.species` well-known symbol.
    #[inline]
    pub fn species_symbol(&self) -> JsSymbol {
        self.species.clone()
    }

    /// The `Symbol.split` well-known symbol.
    #[inline]
    pub fn split_symbol(&self) -> JsSymbol {
        self.split.clone()
    }

    /// The `Symbol.toPrimitive` well-known symbol, consulted by the
    /// `ToPrimitive` conversion before `valueOf`/`toString`.
    #[inline]
    pub fn to_primitive_symbol(&self) -> JsSymbol {
        self.to_primitive.clone()
    }

    /// The `Symbol.toStringTag` well-known symbol, consulted by
    /// `Object.prototype.toString`.
    #[inline]
    pub fn to_string_tag_symbol(&self) -> JsSymbol {
        self.to_string_tag.clone()
    }

    /// The `Symbol.unscopables` well-known symbol.
    #[inline]
    pub fn unscopables_symbol(&self) -> JsSymbol {
        self.unscopables.clone()
    }
}
