//! This module implements the global `Promise` object: a state machine
//! plus reaction queues, with every settlement delivered as a microtask.

#[cfg(test)]
mod tests;

use crate::{
    builtins::{
        error::ErrorKind,
        function::make_closure_function,
        iterable::get_iterator,
        BuiltIn,
    },
    context::{Context, Job},
    object::{ConstructorBuilder, JsObject, Object, ObjectData},
    property::Attribute,
    value::JsValue,
    JsResult,
};
use std::cell::Cell;
use std::rc::Rc;
use vesper_gc::{Finalize, Gc, Trace};

/// The state slot of a promise object.
#[derive(Debug, Trace, Finalize)]
pub enum PromiseState {
    Pending,
    Fulfilled(JsValue),
    Rejected(JsValue),
}

/// What a reaction does with the settled value.
#[derive(Debug, Clone, Trace, Finalize)]
pub enum ReactionHandler {
    /// Pass the value through (`then` with a non-callable fulfill slot).
    Identity,
    /// Rethrow the value (`then` with a non-callable reject slot).
    Thrower,
    Function(JsObject),
}

/// One queued reaction: the handler plus the derived promise it settles.
#[derive(Debug, Clone, Trace, Finalize)]
pub struct Reaction {
    handler: ReactionHandler,
    derived: JsObject,
}

/// The internal slots of a promise object.
#[derive(Debug, Trace, Finalize)]
pub struct Promise {
    state: PromiseState,
    fulfill_reactions: Vec<Reaction>,
    reject_reactions: Vec<Reaction>,
}

impl Promise {
    fn new() -> Self {
        Self {
            state: PromiseState::Pending,
            fulfill_reactions: Vec::new(),
            reject_reactions: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct PromiseBuiltin;

impl BuiltIn for PromiseBuiltin {
    const NAME: &'static str = "Promise";

    fn init(context: &mut Context) -> (&'static str, JsValue, Attribute) {
        let promise = ConstructorBuilder::with_standard_object(
            context,
            Self::constructor,
            context.standard_objects().promise_object().clone(),
        )
        .name(Self::NAME)
        .length(1)
        .static_method(Self::all, "all", 1)
        .static_method(Self::all_settled, "allSettled", 1)
        .static_method(Self::any, "any", 1)
        .static_method(Self::race, "race", 1)
        .static_method(Self::reject, "reject", 1)
        .static_method(Self::resolve, "resolve", 1)
        .method(Self::then, "then", 2)
        .method(Self::catch, "catch", 1)
        .method(Self::finally, "finally", 1)
        .build();

        (Self::NAME, promise.into(), Self::attribute())
    }
}

/// Allocates a pending promise object.
pub(crate) fn new_pending_promise(context: &mut Context) -> JsObject {
    let prototype = context.standard_objects().promise_object().prototype();
    JsObject::new(Object::with_prototype(
        prototype.into(),
        ObjectData::Promise(Promise::new()),
    ))
}

fn is_promise(value: &JsValue) -> Option<JsObject> {
    match value {
        JsValue::Object(object)
            if matches!(object.borrow().data, ObjectData::Promise(_)) =>
        {
            Some(object.clone())
        }
        _ => None,
    }
}

/// The captured state of one promise's resolving-function pair: the target
/// promise and the shared already-settled latch.
#[derive(Debug, Clone, Trace, Finalize)]
struct ResolvingCaptures {
    promise: JsObject,
    #[ignore_trace]
    settled: Rc<Cell<bool>>,
}

/// The `onFinally` callback captured by both `finally` reactions.
#[derive(Debug, Clone, Trace, Finalize)]
struct FinallyCaptures {
    on_finally: JsValue,
}

/// The pair of resolving functions of one promise, sharing an
/// already-settled latch.
fn make_resolving_functions(
    promise: &JsObject,
    context: &mut Context,
) -> (JsObject, JsObject) {
    let captures = ResolvingCaptures {
        promise: promise.clone(),
        settled: Rc::new(Cell::new(false)),
    };

    let resolve = make_closure_function(
        |_, args, captures: &ResolvingCaptures, context| {
            if !captures.settled.replace(true) {
                let value = args.get(0).cloned().unwrap_or_default();
                resolve_promise(&captures.promise, value, context)?;
            }
            Ok(JsValue::undefined())
        },
        captures.clone(),
        1,
        "resolve",
        context,
    );

    let reject = make_closure_function(
        |_, args, captures: &ResolvingCaptures, context| {
            if !captures.settled.replace(true) {
                let reason = args.get(0).cloned().unwrap_or_default();
                settle_promise(&captures.promise, PromiseState::Rejected(reason), context);
            }
            Ok(JsValue::undefined())
        },
        captures,
        1,
        "reject",
        context,
    );

    (resolve, reject)
}

/// The promise-resolution procedure: resolving with a thenable defers to
/// its `then`; resolving with the promise itself is a `TypeError`
/// rejection; anything else fulfills.
pub(crate) fn resolve_promise(
    promise: &JsObject,
    value: JsValue,
    context: &mut Context,
) -> JsResult<()> {
    if let JsValue::Object(object) = &value {
        if JsObject::equals(object, promise) {
            let reason = context.construct_error(ErrorKind::Type, "chaining cycle detected");
            settle_promise(promise, PromiseState::Rejected(reason), context);
            return Ok(());
        }
        let then = object.get(&"then".into(), value.clone(), context)?;
        if then.is_function() {
            // The thenable job runs as a microtask, never synchronously.
            let (resolve, reject) = make_resolving_functions(promise, context);
            context.enqueue_job(Job::Call {
                function: then,
                this: value,
                args: vec![resolve.into(), reject.into()],
            });
            return Ok(());
        }
    }
    settle_promise(promise, PromiseState::Fulfilled(value), context);
    Ok(())
}

/// Rejects a pending promise.
pub(crate) fn reject_promise(promise: &JsObject, reason: JsValue, context: &mut Context) {
    settle_promise(promise, PromiseState::Rejected(reason), context);
}

/// Moves a pending promise to a settled state and schedules its queued
/// reactions in registration order.
fn settle_promise(promise: &JsObject, state: PromiseState, context: &mut Context) {
    let scheduled = {
        let mut borrowed = promise.borrow_mut();
        let ObjectData::Promise(ref mut internals) = borrowed.data else {
            return;
        };
        if !matches!(internals.state, PromiseState::Pending) {
            return;
        }

        let (argument, reactions) = match state {
            PromiseState::Fulfilled(value) => {
                internals.state = PromiseState::Fulfilled(value.clone());
                (value, std::mem::take(&mut internals.fulfill_reactions))
            }
            PromiseState::Rejected(reason) => {
                internals.state = PromiseState::Rejected(reason.clone());
                (reason, std::mem::take(&mut internals.reject_reactions))
            }
            PromiseState::Pending => return,
        };
        internals.fulfill_reactions.clear();
        internals.reject_reactions.clear();
        (argument, reactions)
    };

    let (argument, reactions) = scheduled;
    for reaction in reactions {
        context.enqueue_job(Job::PromiseReaction {
            reaction,
            argument: argument.clone(),
        });
    }
}

/// Runs one queued reaction: the handler's result settles the derived
/// promise; a throwing handler rejects it.
pub(crate) fn run_reaction_job(
    reaction: Reaction,
    argument: JsValue,
    context: &mut Context,
) -> JsResult<()> {
    let result = match &reaction.handler {
        ReactionHandler::Identity => Ok(argument),
        ReactionHandler::Thrower => Err(argument),
        ReactionHandler::Function(function) => {
            function.call(&JsValue::undefined(), &[argument], context)
        }
    };
    match result {
        Ok(value) => resolve_promise(&reaction.derived, value, context)?,
        Err(reason) => settle_promise(&reaction.derived, PromiseState::Rejected(reason), context),
    }
    Ok(())
}

/// `PerformPromiseThen`: registers the reaction pair and returns the
/// derived promise.
fn perform_then(
    promise: &JsObject,
    on_fulfilled: ReactionHandler,
    on_rejected: ReactionHandler,
    context: &mut Context,
) -> JsResult<JsObject> {
    let derived = new_pending_promise(context);

    let fulfill = Reaction {
        handler: on_fulfilled,
        derived: derived.clone(),
    };
    let reject = Reaction {
        handler: on_rejected,
        derived: derived.clone(),
    };

    let immediate = {
        let mut borrowed = promise.borrow_mut();
        let ObjectData::Promise(ref mut internals) = borrowed.data else {
            drop(borrowed);
            return context.throw_type_error("Promise.prototype.then on incompatible receiver");
        };
        match &internals.state {
            PromiseState::Pending => {
                internals.fulfill_reactions.push(fulfill);
                internals.reject_reactions.push(reject);
                None
            }
            PromiseState::Fulfilled(value) => Some((fulfill, value.clone())),
            PromiseState::Rejected(reason) => Some((reject, reason.clone())),
        }
    };

    if let Some((reaction, argument)) = immediate {
        context.enqueue_job(Job::PromiseReaction { reaction, argument });
    }
    Ok(derived)
}

fn handler_or(value: Option<&JsValue>, fallback: ReactionHandler) -> ReactionHandler {
    match value {
        Some(JsValue::Object(object)) if object.is_callable() => {
            ReactionHandler::Function(object.clone())
        }
        _ => fallback,
    }
}

impl PromiseBuiltin {
    /// `new Promise(executor)`.
    fn constructor(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        if !context.is_in_constructor_call() {
            return context.throw_type_error("Promise constructor requires new");
        }
        let executor = match args.get(0) {
            Some(executor) if executor.is_function() => executor.clone(),
            _ => return context.throw_type_error("Promise executor is not callable"),
        };

        let JsValue::Object(promise) = this else {
            return context.throw_type_error("Promise constructor requires an object `this`");
        };
        promise.borrow_mut().data = ObjectData::Promise(Promise::new());

        let (resolve, reject) = make_resolving_functions(promise, context);
        let outcome = context.call(
            &executor,
            &JsValue::undefined(),
            &[resolve.into(), reject.clone().into()],
        );
        if let Err(reason) = outcome {
            reject.call(&JsValue::undefined(), &[reason], context)?;
        }
        Ok(this.clone())
    }

    /// `Promise.resolve(value)`.
    fn resolve(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let value = args.get(0).cloned().unwrap_or_default();
        if let Some(promise) = is_promise(&value) {
            return Ok(promise.into());
        }
        let promise = new_pending_promise(context);
        resolve_promise(&promise, value, context)?;
        Ok(promise.into())
    }

    /// `Promise.reject(reason)`.
    fn reject(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let reason = args.get(0).cloned().unwrap_or_default();
        let promise = new_pending_promise(context);
        settle_promise(&promise, PromiseState::Rejected(reason), context);
        Ok(promise.into())
    }

    /// `Promise.prototype.then(onFulfilled, onRejected)`.
    fn then(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let Some(promise) = is_promise(this) else {
            return context.throw_type_error("Promise.prototype.then on incompatible receiver");
        };
        let on_fulfilled = handler_or(args.get(0), ReactionHandler::Identity);
        let on_rejected = handler_or(args.get(1), ReactionHandler::Thrower);
        Ok(perform_then(&promise, on_fulfilled, on_rejected, context)?.into())
    }

    /// `Promise.prototype.catch(onRejected)`.
    fn catch(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let on_rejected = args.get(0).cloned().unwrap_or_default();
        this.invoke("then", &[JsValue::undefined(), on_rejected], context)
    }

    /// `Promise.prototype.finally(onFinally)`.
    fn finally(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let on_finally = args.get(0).cloned().unwrap_or_default();
        if !on_finally.is_function() {
            return this.invoke("then", &[on_finally.clone(), on_finally], context);
        }

        let captures = FinallyCaptures { on_finally };
        let pass_through = make_closure_function(
            |_, args, captures: &FinallyCaptures, context| {
                let value = args.get(0).cloned().unwrap_or_default();
                context.call(&captures.on_finally, &JsValue::undefined(), &[])?;
                Ok(value)
            },
            captures.clone(),
            1,
            "",
            context,
        );
        let rethrow = make_closure_function(
            |_, args, captures: &FinallyCaptures, context| {
                let reason = args.get(0).cloned().unwrap_or_default();
                context.call(&captures.on_finally, &JsValue::undefined(), &[])?;
                Err(reason)
            },
            captures,
            1,
            "",
            context,
        );
        this.invoke("then", &[pass_through.into(), rethrow.into()], context)
    }

    /// `Promise.all(iterable)`: resolves with the array of results once
    /// every input fulfills, rejects on the first rejection. Every input
    /// runs through the resolution procedure; settlement is always a
    /// microtask.
    fn all(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        combinator(args, context, CombinatorKind::All)
    }

    /// `Promise.allSettled(iterable)`.
    fn all_settled(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        combinator(args, context, CombinatorKind::AllSettled)
    }

    /// `Promise.any(iterable)`: rejects with an `AggregateError` once every
    /// input has rejected.
    fn any(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        combinator(args, context, CombinatorKind::Any)
    }

    /// `Promise.race(iterable)`.
    fn race(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        combinator(args, context, CombinatorKind::Race)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CombinatorKind {
    All,
    AllSettled,
    Any,
    Race,
}

/// The shared accumulator of one combinator call. It lives on the
/// collected heap so the reaction captures keep every stored result
/// visible to the mark phase while the combinator is pending.
#[derive(Debug, Trace, Finalize)]
struct CombinatorState {
    results: Vec<JsValue>,
    remaining: usize,
    settled: bool,
}

/// The captured state of one input's reaction pair.
#[derive(Debug, Clone, Trace, Finalize)]
struct CombinatorCaptures {
    result_promise: JsObject,
    state: Gc<CombinatorState>,
    #[ignore_trace]
    kind: CombinatorKind,
    index: usize,
}

fn combinator(
    args: &[JsValue],
    context: &mut Context,
    kind: CombinatorKind,
) -> JsResult<JsValue> {
    let iterable = args.get(0).cloned().unwrap_or_default();
    let record = get_iterator(&iterable, context)?;
    let mut inputs = Vec::new();
    while let Some(value) = record.step(context)? {
        inputs.push(value);
    }

    let result_promise = new_pending_promise(context);
    let count = inputs.len();

    if count == 0 {
        match kind {
            CombinatorKind::All | CombinatorKind::AllSettled => {
                let empty = crate::builtins::array::Array::create_array(Vec::new(), context);
                resolve_promise(&result_promise, empty, context)?;
            }
            CombinatorKind::Any => {
                let reason =
                    context.construct_error(ErrorKind::Aggregate, "all promises were rejected");
                settle_promise(&result_promise, PromiseState::Rejected(reason), context);
            }
            CombinatorKind::Race => {}
        }
        return Ok(result_promise.into());
    }

    let state = Gc::new(CombinatorState {
        results: vec![JsValue::undefined(); count],
        remaining: count,
        settled: false,
    });

    for (index, input) in inputs.into_iter().enumerate() {
        // Route each input through `Promise.resolve` so thenables and plain
        // values behave identically.
        let input_promise = PromiseBuiltin::resolve(&JsValue::undefined(), &[input], context)?;
        let Some(input_promise) = is_promise(&input_promise) else {
            continue;
        };

        let captures = CombinatorCaptures {
            result_promise: result_promise.clone(),
            state: state.clone(),
            kind,
            index,
        };
        let on_fulfilled = make_closure_function(
            |_, args, captures: &CombinatorCaptures, context| {
                let value = args.get(0).cloned().unwrap_or_default();
                combinator_on_fulfilled(captures, value, context)
            },
            captures.clone(),
            1,
            "",
            context,
        );
        let on_rejected = make_closure_function(
            |_, args, captures: &CombinatorCaptures, context| {
                let reason = args.get(0).cloned().unwrap_or_default();
                combinator_on_rejected(captures, reason, context)
            },
            captures,
            1,
            "",
            context,
        );

        perform_then(
            &input_promise,
            ReactionHandler::Function(on_fulfilled),
            ReactionHandler::Function(on_rejected),
            context,
        )?;
    }

    Ok(result_promise.into())
}

/// One fulfilled input. The state borrow is released before any promise
/// operation runs.
fn combinator_on_fulfilled(
    captures: &CombinatorCaptures,
    value: JsValue,
    context: &mut Context,
) -> JsResult<JsValue> {
    if captures.state.borrow().settled {
        return Ok(JsValue::undefined());
    }
    match captures.kind {
        CombinatorKind::Race | CombinatorKind::Any => {
            captures.state.borrow_mut().settled = true;
            resolve_promise(&captures.result_promise, value, context)?;
        }
        CombinatorKind::All => {
            let results = {
                let mut shared = captures.state.borrow_mut();
                shared.results[captures.index] = value;
                shared.remaining -= 1;
                if shared.remaining == 0 {
                    Some(std::mem::take(&mut shared.results))
                } else {
                    None
                }
            };
            if let Some(results) = results {
                let array = crate::builtins::array::Array::create_array(results, context);
                resolve_promise(&captures.result_promise, array, context)?;
            }
        }
        CombinatorKind::AllSettled => {
            let entry = context.construct_object();
            entry.create_data_property("status", "fulfilled");
            entry.create_data_property("value", value);
            let results = {
                let mut shared = captures.state.borrow_mut();
                shared.results[captures.index] = entry.into();
                shared.remaining -= 1;
                if shared.remaining == 0 {
                    Some(std::mem::take(&mut shared.results))
                } else {
                    None
                }
            };
            if let Some(results) = results {
                let array = crate::builtins::array::Array::create_array(results, context);
                resolve_promise(&captures.result_promise, array, context)?;
            }
        }
    }
    Ok(JsValue::undefined())
}

/// One rejected input.
fn combinator_on_rejected(
    captures: &CombinatorCaptures,
    reason: JsValue,
    context: &mut Context,
) -> JsResult<JsValue> {
    if captures.state.borrow().settled {
        return Ok(JsValue::undefined());
    }
    match captures.kind {
        CombinatorKind::All | CombinatorKind::Race => {
            captures.state.borrow_mut().settled = true;
            settle_promise(
                &captures.result_promise,
                PromiseState::Rejected(reason),
                context,
            );
        }
        CombinatorKind::Any => {
            let errors = {
                let mut shared = captures.state.borrow_mut();
                shared.results[captures.index] = reason;
                shared.remaining -= 1;
                if shared.remaining == 0 {
                    Some(std::mem::take(&mut shared.results))
                } else {
                    None
                }
            };
            if let Some(errors) = errors {
                let aggregate =
                    context.construct_error(ErrorKind::Aggregate, "all promises were rejected");
                if let JsValue::Object(aggregate_obj) = &aggregate {
                    let errors_array =
                        crate::builtins::array::Array::create_array(errors, context);
                    aggregate_obj.insert_property(
                        "errors",
                        errors_array,
                        Attribute::WRITABLE
                            | Attribute::NON_ENUMERABLE
                            | Attribute::CONFIGURABLE,
                    );
                }
                settle_promise(
                    &captures.result_promise,
                    PromiseState::Rejected(aggregate),
                    context,
                );
            }
        }
        CombinatorKind::AllSettled => {
            let entry = context.construct_object();
            entry.create_data_property("status", "rejected");
            entry.create_data_property("reason", reason);
            let results = {
                let mut shared = captures.state.borrow_mut();
                shared.results[captures.index] = entry.into();
                shared.remaining -= 1;
                if shared.remaining == 0 {
                    Some(std::mem::take(&mut shared.results))
                } else {
                    None
                }
            };
            if let Some(results) = results {
                let array = crate::builtins::array::Array::create_array(results, context);
                resolve_promise(&captures.result_promise, array, context)?;
            }
        }
    }
    Ok(JsValue::undefined())
}

/// Whether the promise has settled, and with what; used by the tests and
/// the CLI to inspect results after draining jobs.
pub fn promise_state(promise: &JsObject) -> Option<(bool, JsValue)> {
    let borrowed = promise.borrow();
    match &borrowed.data {
        ObjectData::Promise(internals) => match &internals.state {
            PromiseState::Pending => None,
            PromiseState::Fulfilled(value) => Some((true, value.clone())),
            PromiseState::Rejected(reason) => Some((false, reason.clone())),
        },
        _ => None,
    }
}
