//! Vesper is a JavaScript runtime core written in Rust.
//!
//! The crate provides the substrate every built-in sits on: the [`JsValue`]
//! tagged union, the prototype-based object model ([`object`]), the
//! environment-record machinery realizing scope ([`environment`]), execution
//! contexts ([`Context`]) and the embedded mark-and-sweep collector
//! (`vesper_gc`). A compact lexer/parser ([`syntax`]) and tree-walking
//! interpreter ([`exec`]) are carried so that sources can be evaluated end to
//! end:
//!
//! ```
//! use vesper_engine::Context;
//!
//! let mut context = Context::new();
//! let value = context.eval("1 + 3").unwrap();
//! assert_eq!(value.as_number(), Some(4.0));
//! ```

pub mod bigint;
pub mod builtins;
pub mod context;
pub mod environment;
pub mod exec;
pub mod object;
pub mod property;
pub mod realm;
pub mod string;
pub mod symbol;
pub mod syntax;
pub mod value;

pub use crate::{
    bigint::JsBigInt,
    context::Context,
    exec::Executable,
    object::JsObject,
    string::JsString,
    symbol::JsSymbol,
    value::JsValue,
};

/// The result of every fallible engine operation: the `Err` payload is the
/// thrown JavaScript value.
pub type JsResult<T> = Result<T, JsValue>;
