//! This module implements `DisposableStack` and `AsyncDisposableStack`:
//! scoped resource containers with LIFO disposal on every exit path.

use crate::{
    builtins::BuiltIn,
    context::Context,
    object::{ConstructorBuilder, JsObject, ObjectData},
    property::Attribute,
    value::JsValue,
    JsResult,
};
use std::cell::{Cell, RefCell};
use vesper_gc::{Finalize, Trace, Tracer};

/// One queued disposal: the callback and the value passed back to it.
#[derive(Debug, Clone, Trace, Finalize)]
struct Resource {
    callback: Option<JsObject>,
    value: JsValue,
}

#[derive(Debug, Default, Finalize)]
pub struct DisposableStack {
    resources: RefCell<Vec<Resource>>,
    disposed: Cell<bool>,
    /// Distinguishes the async flavor for `toString` and the prototypes.
    pub(crate) asynchronous: bool,
}

impl Trace for DisposableStack {
    fn trace(&self, tracer: &mut Tracer) {
        if let Ok(resources) = self.resources.try_borrow() {
            for resource in resources.iter() {
                resource.callback.trace(tracer);
                resource.value.trace(tracer);
            }
        }
    }
}

impl DisposableStack {
    fn push(&self, callback: Option<JsObject>, value: JsValue) {
        self.resources.borrow_mut().push(Resource { callback, value });
    }

    /// Runs the disposals LIFO; the first error wins but every callback
    /// still runs.
    fn dispose_all(&self, context: &mut Context) -> JsResult<()> {
        if self.disposed.replace(true) {
            return Ok(());
        }
        let mut resources = std::mem::take(&mut *self.resources.borrow_mut());
        let mut first_error = None;
        while let Some(resource) = resources.pop() {
            let outcome = match &resource.callback {
                Some(callback) => callback
                    .call(&JsValue::undefined(), &[resource.value.clone()], context)
                    .map(|_| ()),
                None => {
                    // `use` without an explicit callback invokes the
                    // resource's own `dispose` method.
                    match resource.value.get_field("dispose", context) {
                        Ok(dispose) if dispose.is_function() => context
                            .call(&dispose, &resource.value, &[])
                            .map(|_| ()),
                        Ok(_) => Ok(()),
                        Err(e) => Err(e),
                    }
                }
            };
            if let Err(error) = outcome {
                first_error.get_or_insert(error);
            }
        }
        match first_error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

fn this_stack(this: &JsValue, context: &mut Context) -> JsResult<JsObject> {
    if let JsValue::Object(object) = this {
        if matches!(object.borrow().data, ObjectData::DisposableStack(_)) {
            return Ok(object.clone());
        }
    }
    context.throw_type_error("DisposableStack method called on incompatible receiver")
}

fn with_stack<R>(
    object: &JsObject,
    f: impl FnOnce(&DisposableStack) -> R,
) -> R {
    let borrowed = object.borrow();
    let ObjectData::DisposableStack(ref stack) = borrowed.data else {
        unreachable!("checked by this_stack");
    };
    f(stack)
}

macro_rules! disposable_stack_builtin {
    ($type_name:ident, $js_name:literal, $accessor:ident, $asynchronous:literal) => {
        #[derive(Debug, Clone, Copy)]
        pub(crate) struct $type_name;

        impl BuiltIn for $type_name {
            const NAME: &'static str = $js_name;

            fn init(context: &mut Context) -> (&'static str, JsValue, Attribute) {
                let constructor = ConstructorBuilder::with_standard_object(
                    context,
                    Self::constructor,
                    context.standard_objects().$accessor().clone(),
                )
                .name(Self::NAME)
                .length(0)
                .method(Self::use_resource, "use", 1)
                .method(Self::adopt, "adopt", 2)
                .method(Self::defer, "defer", 1)
                .method(Self::dispose, $asynchronous.then_some("disposeAsync").unwrap_or("dispose"), 0)
                .method(Self::move_stack, "move", 0)
                .build();

                (Self::NAME, constructor.into(), Self::attribute())
            }
        }

        impl $type_name {
            fn constructor(
                this: &JsValue,
                _: &[JsValue],
                context: &mut Context,
            ) -> JsResult<JsValue> {
                if !context.is_in_constructor_call() {
                    return context
                        .throw_type_error(concat!($js_name, " constructor requires new"));
                }
                let JsValue::Object(object) = this else {
                    return context.throw_type_error("constructor requires an object `this`");
                };
                object.borrow_mut().data = ObjectData::DisposableStack(DisposableStack {
                    resources: RefCell::default(),
                    disposed: Cell::new(false),
                    asynchronous: $asynchronous,
                });
                Ok(this.clone())
            }

            /// `use(value)`: disposed through the value's own `dispose`.
            fn use_resource(
                this: &JsValue,
                args: &[JsValue],
                context: &mut Context,
            ) -> JsResult<JsValue> {
                let object = this_stack(this, context)?;
                let value = args.get(0).cloned().unwrap_or_default();
                if !value.is_null_or_undefined() {
                    with_stack(&object, |stack| stack.push(None, value.clone()));
                }
                Ok(value)
            }

            /// `adopt(value, onDispose)`.
            fn adopt(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
                let object = this_stack(this, context)?;
                let value = args.get(0).cloned().unwrap_or_default();
                let callback = match args.get(1) {
                    Some(JsValue::Object(function)) if function.is_callable() => function.clone(),
                    _ => {
                        return context
                            .throw_type_error("adopt: the disposal callback must be callable")
                    }
                };
                with_stack(&object, |stack| {
                    stack.push(Some(callback), value.clone())
                });
                Ok(value)
            }

            /// `defer(onDispose)`.
            fn defer(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
                let object = this_stack(this, context)?;
                let callback = match args.get(0) {
                    Some(JsValue::Object(function)) if function.is_callable() => function.clone(),
                    _ => {
                        return context
                            .throw_type_error("defer: the disposal callback must be callable")
                    }
                };
                with_stack(&object, |stack| {
                    stack.push(Some(callback), JsValue::undefined())
                });
                Ok(JsValue::undefined())
            }

            /// `dispose()` / `disposeAsync()`: LIFO disposal.
            fn dispose(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
                let object = this_stack(this, context)?;
                let result = {
                    let borrowed = object.borrow();
                    let ObjectData::DisposableStack(ref stack) = borrowed.data else {
                        unreachable!("checked by this_stack");
                    };
                    // `dispose_all` may run user code; the stack contents
                    // were already detached inside.
                    stack.dispose_all(context)
                };
                if $asynchronous {
                    let promise = crate::builtins::promise::new_pending_promise(context);
                    match result {
                        Ok(()) => {
                            crate::builtins::promise::resolve_promise(
                                &promise,
                                JsValue::undefined(),
                                context,
                            )?;
                        }
                        Err(reason) => {
                            // Rejected promise rather than a synchronous throw.
                            crate::builtins::promise::reject_promise(&promise, reason, context);
                        }
                    }
                    return Ok(promise.into());
                }
                result.map(|()| JsValue::undefined())
            }

            /// `move()`: transfers the pending resources to a fresh stack.
            fn move_stack(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
                let object = this_stack(this, context)?;
                let resources = with_stack(&object, |stack| {
                    stack.disposed.set(true);
                    std::mem::take(&mut *stack.resources.borrow_mut())
                });

                let fresh = context.construct_object();
                fresh.borrow_mut().data = ObjectData::DisposableStack(DisposableStack {
                    resources: RefCell::new(resources),
                    disposed: Cell::new(false),
                    asynchronous: $asynchronous,
                });
                let prototype = context.standard_objects().$accessor().prototype();
                fresh.borrow_mut().set_prototype_instance(prototype.into());
                Ok(fresh.into())
            }
        }
    };
}

disposable_stack_builtin!(
    DisposableStackBuiltin,
    "DisposableStack",
    disposable_stack_object,
    false
);
disposable_stack_builtin!(
    AsyncDisposableStackBuiltin,
    "AsyncDisposableStack",
    async_disposable_stack_object,
    true
);
