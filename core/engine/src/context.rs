//! JavaScript execution context. It is the primary way to interact with the
//! runtime: it owns the realm, the call stack, the control-flow signals,
//! the microtask queue and the collector hooks, and it installs every
//! builtin at construction.

use crate::{
    builtins::{
        self,
        error::ErrorKind,
        function::NativeFunction,
        promise::Reaction,
    },
    exec::{Executable, ExecutionState},
    object::{FunctionBuilder, JsObject, Object},
    property::{Attribute, DataDescriptor, PropertyKey},
    realm::Realm,
    string::JsString,
    symbol::{JsSymbol, WellKnownSymbols},
    syntax::{ast::node::StatementList, Parser},
    value::{JsValue, PreferredType, Type},
    JsResult,
};
use std::collections::VecDeque;

/// The number of nested call frames after which a `RangeError` is raised,
/// keeping runaway recursion catchable instead of exhausting the machine
/// stack. The tree walker burns several native frames per JavaScript
/// frame, so the ceiling sits well under the default thread stack.
const RECURSION_LIMIT: usize = 200;

/// A pre-allocated constructor/prototype pair. Handing these out before
/// installation runs lets intrinsics reference each other freely.
#[derive(Debug, Clone)]
pub struct StandardConstructor {
    constructor: JsObject,
    prototype: JsObject,
}

impl Default for StandardConstructor {
    fn default() -> Self {
        Self {
            constructor: JsObject::new(Object::default()),
            prototype: JsObject::new(Object::default()),
        }
    }
}

impl StandardConstructor {
    /// The constructor object.
    #[inline]
    pub fn constructor(&self) -> JsObject {
        self.constructor.clone()
    }

    /// The prototype object.
    #[inline]
    pub fn prototype(&self) -> JsObject {
        self.prototype.clone()
    }
}

macro_rules! standard_objects {
    ($($field:ident => $accessor:ident),* $(,)?) => {
        /// Cached intrinsic constructor/prototype pairs of the realm.
        #[derive(Debug, Default, Clone)]
        pub struct StandardObjects {
            $($field: StandardConstructor,)*
        }

        impl StandardObjects {
            $(
                #[inline]
                pub fn $accessor(&self) -> &StandardConstructor {
                    &self.$field
                }
            )*
        }
    };
}

standard_objects! {
    object => object_object,
    function => function_object,
    array => array_object,
    string => string_object,
    number => number_object,
    boolean => boolean_object,
    symbol => symbol_object,
    bigint => bigint_object,
    error => error_object,
    type_error => type_error_object,
    range_error => range_error_object,
    reference_error => reference_error_object,
    syntax_error => syntax_error_object,
    uri_error => uri_error_object,
    eval_error => eval_error_object,
    aggregate_error => aggregate_error_object,
    map => map_object,
    set => set_object,
    weak_map => weak_map_object,
    weak_set => weak_set_object,
    weak_ref => weak_ref_object,
    finalization_registry => finalization_registry_object,
    promise => promise_object,
    date => date_object,
    regexp => regexp_object,
    array_buffer => array_buffer_object,
    data_view => data_view_object,
    typed_array => typed_array_object,
    proxy => proxy_object,
    iterator => iterator_object,
    plain_date => plain_date_object,
    plain_time => plain_time_object,
    plain_date_time => plain_date_time_object,
    instant => instant_object,
    duration => duration_object,
    disposable_stack => disposable_stack_object,
    async_disposable_stack => async_disposable_stack_object,
}

/// Prototypes of the iterator result objects produced by the engine's
/// iterators; all inherit from %IteratorPrototype%.
#[derive(Debug, Default, Clone)]
pub struct IteratorPrototypes {
    iterator: JsObject,
    array_iterator: JsObject,
    string_iterator: JsObject,
    map_iterator: JsObject,
    set_iterator: JsObject,
}

impl IteratorPrototypes {
    pub fn iterator_prototype(&self) -> JsObject {
        self.iterator.clone()
    }

    pub fn array_iterator_prototype(&self) -> JsObject {
        self.array_iterator.clone()
    }

    pub fn string_iterator_prototype(&self) -> JsObject {
        self.string_iterator.clone()
    }

    pub fn map_iterator_prototype(&self) -> JsObject {
        self.map_iterator.clone()
    }

    pub fn set_iterator_prototype(&self) -> JsObject {
        self.set_iterator.clone()
    }

    pub(crate) fn set(
        &mut self,
        iterator: JsObject,
        array_iterator: JsObject,
        string_iterator: JsObject,
        map_iterator: JsObject,
        set_iterator: JsObject,
    ) {
        self.iterator = iterator;
        self.array_iterator = array_iterator;
        self.string_iterator = string_iterator;
        self.map_iterator = map_iterator;
        self.set_iterator = set_iterator;
    }
}

/// One entry of the call stack, kept for stack traces.
#[derive(Debug, Clone)]
pub struct CallFrame {
    function_name: Box<str>,
}

impl CallFrame {
    pub fn function_name(&self) -> &str {
        &self.function_name
    }
}

/// A queued microtask.
#[derive(Debug)]
pub(crate) enum Job {
    /// Deliver a settled value to a promise reaction.
    PromiseReaction {
        reaction: Reaction,
        argument: JsValue,
    },
    /// Plain deferred call.
    Call {
        function: JsValue,
        this: JsValue,
        args: Vec<JsValue>,
    },
}

/// JavaScript context. It is the primary way to interact with the runtime.
///
/// ```
/// use vesper_engine::Context;
///
/// let mut context = Context::new();
/// let value = context.eval("1 + 3").unwrap();
/// assert_eq!(value.as_number(), Some(4.0));
/// ```
#[derive(Debug)]
pub struct Context {
    /// realm holds both the global object and the environment.
    realm: Realm,

    /// Cached intrinsics.
    standard_objects: StandardObjects,

    /// Cached iterator prototypes.
    iterator_prototypes: IteratorPrototypes,

    /// Cached well known symbols.
    well_known_symbols: WellKnownSymbols,

    /// Next symbol hash.
    symbol_count: u64,

    /// The control-flow signal of the running interpreter; exceptions travel
    /// separately as `Err` values.
    executor_state: ExecutionState,

    /// Call stack of the active frames.
    frames: Vec<CallFrame>,

    /// The `this` of the innermost constructor call, when one is active.
    constructor_this: Option<JsValue>,

    /// Whether the running code is strict.
    strict: bool,

    /// Source name used in diagnostics.
    filename: JsString,

    /// FIFO microtask queue, drained between turns.
    microtasks: VecDeque<Job>,

    /// FinalizationRegistry cleanup callbacks waiting to run.
    cleanup_callbacks: VecDeque<(JsObject, JsValue)>,

    /// Weak list of every live FinalizationRegistry, polled for dead
    /// targets between turns.
    finalization_registries: Vec<vesper_gc::WeakGc<Object>>,
}

impl Default for Context {
    fn default() -> Self {
        let realm = Realm::create();
        let (well_known_symbols, symbol_count) = WellKnownSymbols::new();
        let mut context = Self {
            realm,
            standard_objects: StandardObjects::default(),
            iterator_prototypes: IteratorPrototypes::default(),
            well_known_symbols,
            symbol_count,
            executor_state: ExecutionState::Executing,
            frames: Vec::new(),
            constructor_this: None,
            strict: false,
            filename: "<main>".into(),
            microtasks: VecDeque::new(),
            cleanup_callbacks: VecDeque::new(),
            finalization_registries: Vec::new(),
        };

        builtins::init(&mut context);
        context
    }
}

impl Context {
    /// Create a new `Context` with the full builtin surface installed.
    pub fn new() -> Self {
        Default::default()
    }

    pub fn realm(&self) -> &Realm {
        &self.realm
    }

    pub fn realm_mut(&mut self) -> &mut Realm {
        &mut self.realm
    }

    /// Return the global object.
    pub fn global_object(&self) -> JsObject {
        self.realm.global_object.clone()
    }

    #[inline]
    pub fn standard_objects(&self) -> &StandardObjects {
        &self.standard_objects
    }

    #[inline]
    pub fn iterator_prototypes(&self) -> &IteratorPrototypes {
        &self.iterator_prototypes
    }

    pub(crate) fn iterator_prototypes_mut(&mut self) -> &mut IteratorPrototypes {
        &mut self.iterator_prototypes
    }

    /// Returns the structure that contains the JavaScript well known
    /// symbols.
    #[inline]
    pub fn well_known_symbols(&self) -> &WellKnownSymbols {
        &self.well_known_symbols
    }

    /// Construct a new unique `Symbol` with an optional description.
    pub fn construct_symbol(&mut self, description: Option<JsString>) -> JsSymbol {
        let hash = self.symbol_count;
        self.symbol_count += 1;
        JsSymbol::new(hash, description)
    }

    /// Construct an empty object inheriting `Object.prototype`.
    pub fn construct_object(&self) -> JsObject {
        let prototype = self.standard_objects.object_object().prototype();
        JsObject::new(Object::create(prototype.into()))
    }

    /// <https://tc39.es/ecma262/#sec-call>
    pub fn call(&mut self, f: &JsValue, this: &JsValue, args: &[JsValue]) -> JsResult<JsValue> {
        match f {
            JsValue::Object(object) if object.is_callable() => object.call(this, args, self),
            _ => self.throw_type_error(format!("{} is not a function", f.display())),
        }
    }

    /// <https://tc39.es/ecma262/#sec-construct>
    pub fn construct(&mut self, f: &JsValue, args: &[JsValue]) -> JsResult<JsValue> {
        match f {
            JsValue::Object(object) => object.construct(args, self),
            _ => self.throw_type_error(format!("{} is not a constructor", f.display())),
        }
    }

    // === Control flow ===

    #[inline]
    pub(crate) fn executor_state(&self) -> &ExecutionState {
        &self.executor_state
    }

    #[inline]
    pub(crate) fn set_executor_state(&mut self, state: ExecutionState) {
        self.executor_state = state;
    }

    #[inline]
    pub(crate) fn take_executor_state(&mut self) -> ExecutionState {
        std::mem::replace(&mut self.executor_state, ExecutionState::Executing)
    }

    /// Whether the innermost running native function was invoked with `new`.
    pub fn is_in_constructor_call(&self) -> bool {
        self.constructor_this.is_some()
    }

    pub(crate) fn enter_construct(&mut self, this: JsValue) -> Option<JsValue> {
        self.constructor_this.replace(this)
    }

    /// Plain calls shadow any enclosing constructor activation.
    pub(crate) fn clear_construct(&mut self) -> Option<JsValue> {
        self.constructor_this.take()
    }

    pub(crate) fn exit_construct(&mut self, previous: Option<JsValue>) {
        self.constructor_this = previous;
    }

    /// Whether strict-mode semantics are active.
    #[inline]
    pub fn strict(&self) -> bool {
        self.strict
    }

    #[inline]
    pub(crate) fn set_strict(&mut self, strict: bool) -> bool {
        std::mem::replace(&mut self.strict, strict)
    }

    // === Call stack ===

    /// Pushes a frame, converting depth exhaustion into a catchable
    /// `RangeError`.
    pub fn push_frame(&mut self, function_name: &str) -> JsResult<()> {
        if self.frames.len() >= RECURSION_LIMIT {
            return self.throw_range_error("Maximum call stack size exceeded");
        }
        self.frames.push(CallFrame {
            function_name: function_name.into(),
        });
        Ok(())
    }

    pub fn pop_frame(&mut self) {
        self.frames.pop();
    }

    pub fn frames(&self) -> &[CallFrame] {
        &self.frames
    }

    /// Renders the live frames, innermost first, the shape `Error.stack`
    /// exposes.
    pub fn capture_stack_trace(&self) -> String {
        let mut trace = String::new();
        for frame in self.frames.iter().rev() {
            trace.push_str("    at ");
            trace.push_str(frame.function_name());
            trace.push('\n');
        }
        trace.push_str("    at <");
        trace.push_str(&self.filename);
        trace.push('>');
        trace
    }

    // === Error construction ===

    /// Constructs an error of `kind` with the proper prototype, `message`
    /// and a stack trace captured from the live frames.
    pub fn construct_error<M>(&mut self, kind: ErrorKind, message: M) -> JsValue
    where
        M: Into<String>,
    {
        builtins::error::create_error_object(kind, message.into(), self).into()
    }

    /// Promotes a `"<Kind>: <message>"` string to the matching error
    /// instance; anything else becomes a plain `Error`.
    pub fn construct_error_from_message<M>(&mut self, message: M) -> JsValue
    where
        M: Into<String>,
    {
        let message = message.into();
        let (kind, rest) = match message.split_once(": ") {
            Some((prefix, rest)) => match ErrorKind::from_name(prefix) {
                Some(kind) => (kind, rest.to_owned()),
                None => (ErrorKind::Error, message),
            },
            None => (ErrorKind::Error, message),
        };
        self.construct_error(kind, rest)
    }

    /// Throws the promoted form of a `"<Kind>: <message>"` diagnostic.
    pub fn throw_error<M: Into<String>, T>(&mut self, message: M) -> JsResult<T> {
        let error = self.construct_error_from_message(message);
        Err(error)
    }

    pub fn construct_type_error<M: Into<String>>(&mut self, message: M) -> JsValue {
        self.construct_error(ErrorKind::Type, message)
    }

    pub fn throw_type_error<M: Into<String>, T>(&mut self, message: M) -> JsResult<T> {
        Err(self.construct_type_error(message))
    }

    pub fn construct_range_error<M: Into<String>>(&mut self, message: M) -> JsValue {
        self.construct_error(ErrorKind::Range, message)
    }

    pub fn throw_range_error<M: Into<String>, T>(&mut self, message: M) -> JsResult<T> {
        Err(self.construct_range_error(message))
    }

    pub fn construct_reference_error<M: Into<String>>(&mut self, message: M) -> JsValue {
        self.construct_error(ErrorKind::Reference, message)
    }

    pub fn throw_reference_error<M: Into<String>, T>(&mut self, message: M) -> JsResult<T> {
        Err(self.construct_reference_error(message))
    }

    pub fn construct_syntax_error<M: Into<String>>(&mut self, message: M) -> JsValue {
        self.construct_error(ErrorKind::Syntax, message)
    }

    pub fn throw_syntax_error<M: Into<String>, T>(&mut self, message: M) -> JsResult<T> {
        Err(self.construct_syntax_error(message))
    }

    pub fn construct_uri_error<M: Into<String>>(&mut self, message: M) -> JsValue {
        self.construct_error(ErrorKind::Uri, message)
    }

    pub fn throw_uri_error<M: Into<String>, T>(&mut self, message: M) -> JsResult<T> {
        Err(self.construct_uri_error(message))
    }

    pub fn construct_eval_error<M: Into<String>>(&mut self, message: M) -> JsValue {
        self.construct_error(ErrorKind::Eval, message)
    }

    pub fn throw_eval_error<M: Into<String>, T>(&mut self, message: M) -> JsResult<T> {
        Err(self.construct_eval_error(message))
    }

    // === Jobs ===

    pub(crate) fn enqueue_job(&mut self, job: Job) {
        self.microtasks.push_back(job);
    }

    pub(crate) fn enqueue_cleanup_callback(&mut self, callback: JsObject, holdings: JsValue) {
        self.cleanup_callbacks.push_back((callback, holdings));
    }

    pub(crate) fn track_finalization_registry(&mut self, registry: &JsObject) {
        self.finalization_registries.push(registry.downgrade());
    }

    /// Queues the cleanup callbacks of every registration whose target has
    /// been collected.
    fn process_finalization_registries(&mut self) {
        let registries: Vec<_> = {
            self.finalization_registries
                .retain(|registry| registry.is_live());
            self.finalization_registries
                .iter()
                .filter_map(vesper_gc::WeakGc::upgrade)
                .map(JsObject::from_inner)
                .collect()
        };
        for registry in registries {
            let dead = {
                let borrowed = registry.borrow();
                match &borrowed.data {
                    crate::object::ObjectData::FinalizationRegistry(registry) => {
                        registry.take_dead_registrations()
                    }
                    _ => Vec::new(),
                }
            };
            for (callback, holdings) in dead {
                self.enqueue_cleanup_callback(callback, holdings);
            }
        }
    }

    /// Drains the microtask queue, then the pending finalization-registry
    /// callbacks. Runs between turns; an error in a job surfaces to the
    /// caller and leaves the remaining jobs queued.
    pub fn run_jobs(&mut self) -> JsResult<()> {
        loop {
            self.process_finalization_registries();
            while let Some(job) = self.microtasks.pop_front() {
                match job {
                    Job::PromiseReaction { reaction, argument } => {
                        builtins::promise::run_reaction_job(reaction, argument, self)?;
                    }
                    Job::Call {
                        function,
                        this,
                        args,
                    } => {
                        self.call(&function, &this, &args)?;
                    }
                }
            }
            if let Some((callback, holdings)) = self.cleanup_callbacks.pop_front() {
                callback.call(&JsValue::undefined(), &[holdings], self)?;
                continue;
            }
            break;
        }
        Ok(())
    }

    // === Collector ===

    /// Forces a full garbage collection.
    pub fn force_gc(&mut self) -> bool {
        vesper_gc::force_collect()
    }

    /// A snapshot of the collector statistics.
    pub fn gc_stats(&self) -> vesper_gc::GcStats {
        vesper_gc::stats()
    }

    // === Registration helpers ===

    /// Register a global native function, the way `parseInt` and friends
    /// are installed.
    pub fn register_global_function(
        &mut self,
        name: &str,
        length: usize,
        body: NativeFunction,
    ) {
        let function = FunctionBuilder::new(self, body)
            .name(name)
            .length(length)
            .build();
        self.global_object().insert_property(
            name,
            function,
            Attribute::WRITABLE | Attribute::NON_ENUMERABLE | Attribute::CONFIGURABLE,
        );
    }

    /// Register a global property with the given attributes.
    pub fn register_global_property<K, V>(&mut self, key: K, value: V, attribute: Attribute)
    where
        K: Into<PropertyKey>,
        V: Into<JsValue>,
    {
        self.global_object()
            .borrow_mut()
            .insert(key, DataDescriptor::new(value, attribute));
    }

    // === Conversion helpers shared by builtins ===

    /// <https://tc39.es/ecma262/#sec-ordinarytoprimitive>
    pub(crate) fn ordinary_to_primitive(
        &mut self,
        o: &JsValue,
        hint: PreferredType,
    ) -> JsResult<JsValue> {
        debug_assert!(o.get_type() == Type::Object);
        match o {
            JsValue::Object(object) => object.ordinary_to_primitive(self, hint),
            _ => unreachable!("checked type above"),
        }
    }

    // === Evaluation ===

    fn parse(src: &str) -> Result<StatementList, String> {
        Parser::new(src).parse_all().map_err(|e| e.to_string())
    }

    /// Evaluates the given source in the global context, reporting either
    /// the completion value or the thrown value. Microtasks and pending
    /// finalization callbacks are drained afterwards.
    pub fn eval(&mut self, src: &str) -> JsResult<JsValue> {
        let statements = match Self::parse(src) {
            Ok(statements) => statements,
            Err(e) => return self.throw_syntax_error(e),
        };

        let strict = self.set_strict(statements.strict());
        let result = statements.run(self);
        self.set_strict(strict);
        self.executor_state = ExecutionState::Executing;

        let result = match result {
            Ok(value) => {
                self.run_jobs()?;
                Ok(value)
            }
            Err(error) => Err(error),
        };
        result
    }

    /// Like [`Context::eval`], recording `filename` for diagnostics.
    pub fn eval_with_filename(&mut self, src: &str, filename: &str) -> JsResult<JsValue> {
        let previous = std::mem::replace(&mut self.filename, filename.into());
        let result = self.eval(src);
        self.filename = previous;
        result
    }

    /// Renders an uncaught error the way the top level reports it:
    /// `name: message` followed by the captured stack trace.
    pub fn report_uncaught(&self, error: &JsValue) -> String {
        let rendered = match error {
            JsValue::Object(object) if object.borrow().is_error() => {
                let name = object
                    .get_own_property(&"name".into())
                    .and_then(|d| d.value())
                    .map_or_else(|| "Error".to_owned(), |v| v.display().to_string());
                let message = object
                    .get_own_property(&"message".into())
                    .and_then(|d| d.value())
                    .map_or_else(String::new, |v| v.display().to_string());
                let stack = object
                    .get_own_property(&"stack".into())
                    .and_then(|d| d.value())
                    .map_or_else(String::new, |v| v.display().to_string());
                if stack.is_empty() {
                    format!("Uncaught {name}: {message}")
                } else {
                    format!("Uncaught {stack}")
                }
            }
            other => format!("Uncaught {}", other.display()),
        };
        rendered
    }
}
