//! The `Trace` and `Finalize` traits used by the collector.

use crate::Tracer;
use std::borrow::Cow;
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::rc::Rc;

/// Substitute for the `Drop` trait, run right before an allocation is
/// reclaimed by the collector.
pub trait Finalize {
    /// Cleanup hook. Must not allocate on the garbage-collected heap.
    fn finalize(&self) {}
}

/// Visitor trait reporting every `Gc` handle owned by a value.
///
/// An implementation must visit each handle exactly once; missing an edge
/// keeps the target conservatively alive, while reporting one twice can make
/// the collector reclaim a reachable object.
pub trait Trace: Finalize {
    /// Report every owned `Gc` edge to the `tracer`.
    fn trace(&self, tracer: &mut Tracer);
}

/// Implements an empty `Trace` and `Finalize` for types that can never own a
/// `Gc` handle.
#[macro_export]
macro_rules! empty_trace {
    ($($ty:ty),* $(,)?) => {
        $(
            impl $crate::Finalize for $ty {}
            impl $crate::Trace for $ty {
                #[inline]
                fn trace(&self, _tracer: &mut $crate::Tracer) {}
            }
        )*
    };
}

/// Implements `Trace` with a custom body; `$this` binds the receiver and
/// `mark!(..)` visits one field.
#[macro_export]
macro_rules! custom_trace {
    ($ty:ty, $this:ident, $body:expr) => {
        impl $crate::Trace for $ty {
            fn trace(&self, tracer: &mut $crate::Tracer) {
                macro_rules! mark {
                    ($it:expr) => {
                        $crate::Trace::trace($it, tracer)
                    };
                }
                let $this = self;
                $body
            }
        }
    };
}

empty_trace!(
    (),
    bool,
    char,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    f32,
    f64,
    String,
    &'static str,
    str,
    std::path::PathBuf,
);

impl<T: Finalize + ?Sized> Finalize for Box<T> {}
impl<T: Trace + ?Sized> Trace for Box<T> {
    fn trace(&self, tracer: &mut Tracer) {
        (**self).trace(tracer);
    }
}

impl<T: Finalize> Finalize for Option<T> {}
impl<T: Trace> Trace for Option<T> {
    fn trace(&self, tracer: &mut Tracer) {
        if let Some(value) = self {
            value.trace(tracer);
        }
    }
}

impl<T: Finalize, E: Finalize> Finalize for Result<T, E> {}
impl<T: Trace, E: Trace> Trace for Result<T, E> {
    fn trace(&self, tracer: &mut Tracer) {
        match self {
            Ok(value) => value.trace(tracer),
            Err(err) => err.trace(tracer),
        }
    }
}

impl<T: Finalize> Finalize for Vec<T> {}
impl<T: Trace> Trace for Vec<T> {
    fn trace(&self, tracer: &mut Tracer) {
        for value in self {
            value.trace(tracer);
        }
    }
}

impl<T: Finalize> Finalize for VecDeque<T> {}
impl<T: Trace> Trace for VecDeque<T> {
    fn trace(&self, tracer: &mut Tracer) {
        for value in self {
            value.trace(tracer);
        }
    }
}

impl<T: Finalize> Finalize for Box<[T]> {}
impl<T: Trace> Trace for Box<[T]> {
    fn trace(&self, tracer: &mut Tracer) {
        for value in self.iter() {
            value.trace(tracer);
        }
    }
}

impl<T: Finalize, const N: usize> Finalize for [T; N] {}
impl<T: Trace, const N: usize> Trace for [T; N] {
    fn trace(&self, tracer: &mut Tracer) {
        for value in self {
            value.trace(tracer);
        }
    }
}

impl<K: Finalize, V: Finalize, S> Finalize for HashMap<K, V, S> {}
impl<K: Trace, V: Trace, S> Trace for HashMap<K, V, S> {
    fn trace(&self, tracer: &mut Tracer) {
        for (key, value) in self {
            key.trace(tracer);
            value.trace(tracer);
        }
    }
}

impl<T: Finalize, S> Finalize for HashSet<T, S> {}
impl<T: Trace, S> Trace for HashSet<T, S> {
    fn trace(&self, tracer: &mut Tracer) {
        for value in self {
            value.trace(tracer);
        }
    }
}

impl<K: Finalize, V: Finalize> Finalize for BTreeMap<K, V> {}
impl<K: Trace, V: Trace> Trace for BTreeMap<K, V> {
    fn trace(&self, tracer: &mut Tracer) {
        for (key, value) in self {
            key.trace(tracer);
            value.trace(tracer);
        }
    }
}

impl<T: Finalize> Finalize for BTreeSet<T> {}
impl<T: Trace> Trace for BTreeSet<T> {
    fn trace(&self, tracer: &mut Tracer) {
        for value in self {
            value.trace(tracer);
        }
    }
}

impl<A: Finalize, B: Finalize> Finalize for (A, B) {}
impl<A: Trace, B: Trace> Trace for (A, B) {
    fn trace(&self, tracer: &mut Tracer) {
        self.0.trace(tracer);
        self.1.trace(tracer);
    }
}

impl<A: Finalize, B: Finalize, C: Finalize> Finalize for (A, B, C) {}
impl<A: Trace, B: Trace, C: Trace> Trace for (A, B, C) {
    fn trace(&self, tracer: &mut Tracer) {
        self.0.trace(tracer);
        self.1.trace(tracer);
        self.2.trace(tracer);
    }
}

// `Rc` is shared ownership: its contents may be reachable through several
// registered objects, and visiting the same handle twice would corrupt the
// collector's edge counts. Only `Rc`s of handle-free payloads are traceable.
impl Finalize for Rc<str> {}
impl Trace for Rc<str> {
    #[inline]
    fn trace(&self, _tracer: &mut Tracer) {}
}

impl<T: Finalize> Finalize for RefCell<T> {}
impl<T: Trace> Trace for RefCell<T> {
    fn trace(&self, tracer: &mut Tracer) {
        // A locked cell cannot be examined; the collection defers.
        match self.try_borrow() {
            Ok(value) => value.trace(tracer),
            Err(_) => tracer.notice_locked(),
        }
    }
}

impl<T: Finalize + Copy> Finalize for Cell<T> {}
impl<T: Trace + Copy> Trace for Cell<T> {
    fn trace(&self, tracer: &mut Tracer) {
        self.get().trace(tracer);
    }
}

impl Finalize for Cow<'static, str> {}
impl Trace for Cow<'static, str> {
    #[inline]
    fn trace(&self, _tracer: &mut Tracer) {}
}
