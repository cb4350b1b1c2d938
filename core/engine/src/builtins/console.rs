//! This module implements the `console` object.
//!
//! Output goes to stdout/stderr; `count` and `time` keep their state on
//! the console itself.

use crate::{
    builtins::BuiltIn,
    context::Context,
    object::ObjectInitializer,
    property::Attribute,
    value::JsValue,
    JsResult,
};
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::time::Instant;

thread_local! {
    static COUNTS: RefCell<FxHashMap<String, u64>> = RefCell::new(FxHashMap::default());
    static TIMERS: RefCell<FxHashMap<String, Instant>> = RefCell::new(FxHashMap::default());
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Console;

impl BuiltIn for Console {
    const NAME: &'static str = "console";

    fn init(context: &mut Context) -> (&'static str, JsValue, Attribute) {
        let console = ObjectInitializer::new(context)
            .function(Self::assert, "assert", 0)
            .function(Self::count, "count", 0)
            .function(Self::count_reset, "countReset", 0)
            .function(Self::debug, "debug", 0)
            .function(Self::error, "error", 0)
            .function(Self::group, "group", 0)
            .function(Self::group_end, "groupEnd", 0)
            .function(Self::info, "info", 0)
            .function(Self::log, "log", 0)
            .function(Self::time, "time", 0)
            .function(Self::time_end, "timeEnd", 0)
            .function(Self::trace, "trace", 0)
            .function(Self::warn, "warn", 0)
            .build();

        (Self::NAME, console.into(), Self::attribute())
    }
}

fn format_args(args: &[JsValue], context: &mut Context) -> JsResult<String> {
    let mut pieces = Vec::with_capacity(args.len());
    for arg in args {
        pieces.push(match arg {
            JsValue::String(string) => string.to_string(),
            other => other.display().to_string(),
        });
    }
    let _ = context;
    Ok(pieces.join(" "))
}

impl Console {
    fn log(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        println!("{}", format_args(args, context)?);
        Ok(JsValue::undefined())
    }

    fn info(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        Self::log(this, args, context)
    }

    fn debug(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        Self::log(this, args, context)
    }

    fn error(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        eprintln!("{}", format_args(args, context)?);
        Ok(JsValue::undefined())
    }

    fn warn(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        Self::error(this, args, context)
    }

    /// `console.trace(...)`: the message plus the live stack.
    fn trace(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        println!("Trace: {}", format_args(args, context)?);
        println!("{}", context.capture_stack_trace());
        Ok(JsValue::undefined())
    }

    /// `console.assert(condition, ...)`: prints only on a falsy condition.
    fn assert(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let passed = args.get(0).map_or(false, JsValue::to_boolean);
        if !passed {
            let rest = args.get(1..).unwrap_or(&[]);
            eprintln!("Assertion failed: {}", format_args(rest, context)?);
        }
        Ok(JsValue::undefined())
    }

    fn count_label(args: &[JsValue], context: &mut Context) -> JsResult<String> {
        Ok(match args.get(0) {
            None | Some(JsValue::Undefined) => "default".to_owned(),
            Some(value) => value.to_string(context)?.to_string(),
        })
    }

    fn count(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let label = Self::count_label(args, context)?;
        let count = COUNTS.with(|counts| {
            let mut counts = counts.borrow_mut();
            let entry = counts.entry(label.clone()).or_insert(0);
            *entry += 1;
            *entry
        });
        println!("{label}: {count}");
        Ok(JsValue::undefined())
    }

    fn count_reset(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let label = Self::count_label(args, context)?;
        COUNTS.with(|counts| counts.borrow_mut().remove(&label));
        Ok(JsValue::undefined())
    }

    fn time(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let label = Self::count_label(args, context)?;
        TIMERS.with(|timers| timers.borrow_mut().insert(label, Instant::now()));
        Ok(JsValue::undefined())
    }

    fn time_end(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let label = Self::count_label(args, context)?;
        let elapsed = TIMERS.with(|timers| timers.borrow_mut().remove(&label));
        match elapsed {
            Some(start) => println!("{label}: {:.3}ms", start.elapsed().as_secs_f64() * 1000.0),
            None => eprintln!("Timer '{label}' does not exist"),
        }
        Ok(JsValue::undefined())
    }

    fn group(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        Self::log(this, args, context)
    }

    fn group_end(_: &JsValue, _: &[JsValue], _context: &mut Context) -> JsResult<JsValue> {
        Ok(JsValue::undefined())
    }
}
