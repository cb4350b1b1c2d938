//! Garbage-collected pointer types.

use crate::{internals::GcBox, Finalize, Trace, Tracer, HEAP};
use std::cell::{Ref, RefMut};
use std::fmt::{self, Debug};
use std::rc::{Rc, Weak};

/// A borrowed view into a garbage-collected allocation.
pub type GcRef<'a, T> = Ref<'a, T>;

/// A mutably borrowed view into a garbage-collected allocation.
pub type GcRefMut<'a, T> = RefMut<'a, T>;

/// Error returned by the non-panicking borrow variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorrowError;

impl fmt::Display for BorrowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("allocation already mutably borrowed")
    }
}

/// Error returned by the non-panicking mutable borrow variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorrowMutError;

impl fmt::Display for BorrowMutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("allocation already borrowed")
    }
}

/// A handle to a garbage-collected allocation with interior mutability.
///
/// Handles are cheap to clone and compare by pointer identity. Every handle
/// held outside the heap graph (on the Rust stack, in a `Context`, in an
/// environment chain) keeps its target alive across collections; objects only
/// reachable through other heap objects are reclaimed once that subgraph
/// becomes unreachable, cycles included.
pub struct Gc<T: Trace + Finalize + 'static> {
    pub(crate) inner: Rc<GcBox<T>>,
}

impl<T: Trace + Finalize + 'static> Gc<T> {
    /// Allocates `value` on the garbage-collected heap.
    pub fn new(value: T) -> Self {
        HEAP.with(|heap| heap.borrow_mut().allocate(value))
    }

    /// Immutably borrows the allocation.
    ///
    /// # Panics
    ///
    /// Panics if the allocation is mutably borrowed or already reclaimed.
    #[inline]
    #[track_caller]
    pub fn borrow(&self) -> GcRef<'_, T> {
        self.try_borrow().expect("allocation already mutably borrowed")
    }

    /// Mutably borrows the allocation.
    ///
    /// # Panics
    ///
    /// Panics if the allocation is borrowed or already reclaimed.
    #[inline]
    #[track_caller]
    pub fn borrow_mut(&self) -> GcRefMut<'_, T> {
        self.try_borrow_mut().expect("allocation already borrowed")
    }

    /// Non-panicking variant of [`Gc::borrow`].
    pub fn try_borrow(&self) -> Result<GcRef<'_, T>, BorrowError> {
        let cell = self.inner.value.try_borrow().map_err(|_| BorrowError)?;
        if cell.is_none() {
            return Err(BorrowError);
        }
        Ok(Ref::map(cell, |value| {
            value.as_ref().expect("checked above")
        }))
    }

    /// Non-panicking variant of [`Gc::borrow_mut`].
    pub fn try_borrow_mut(&self) -> Result<GcRefMut<'_, T>, BorrowMutError> {
        let cell = self
            .inner
            .value
            .try_borrow_mut()
            .map_err(|_| BorrowMutError)?;
        if cell.is_none() {
            return Err(BorrowMutError);
        }
        Ok(RefMut::map(cell, |value| {
            value.as_mut().expect("checked above")
        }))
    }

    /// Checks whether two handles point at the same allocation.
    #[inline]
    pub fn ptr_eq(lhs: &Self, rhs: &Self) -> bool {
        Rc::ptr_eq(&lhs.inner, &rhs.inner)
    }

    /// Address of the allocation, stable for its lifetime.
    #[inline]
    pub fn addr(&self) -> usize {
        Rc::as_ptr(&self.inner) as *const () as usize
    }

    /// Creates a non-owning handle to the same allocation.
    pub fn downgrade(&self) -> WeakGc<T> {
        WeakGc {
            inner: Rc::downgrade(&self.inner),
        }
    }
}

impl<T: Trace + Finalize + 'static> Clone for Gc<T> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Trace + Finalize + 'static> Finalize for Gc<T> {}

impl<T: Trace + Finalize + 'static> Trace for Gc<T> {
    #[inline]
    fn trace(&self, tracer: &mut Tracer) {
        tracer.edge(self.addr());
    }
}

impl<T: Trace + Finalize + Debug + 'static> Debug for Gc<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.try_borrow() {
            Ok(value) => Debug::fmt(&*value, f),
            Err(_) => f.write_str("Gc(<borrowed>)"),
        }
    }
}

/// A weak handle: never keeps its target alive and is not followed by the
/// mark phase. `upgrade` returns `None` once the target has been collected.
pub struct WeakGc<T: Trace + Finalize + 'static> {
    pub(crate) inner: Weak<GcBox<T>>,
}

impl<T: Trace + Finalize + 'static> WeakGc<T> {
    /// Attempts to obtain a strong handle to the target.
    pub fn upgrade(&self) -> Option<Gc<T>> {
        let inner = self.inner.upgrade()?;
        // A target can linger unreclaimed for a moment while a collection is
        // unlinking its subgraph; a cleared payload counts as dead. An active
        // borrow means the payload is present.
        if let Ok(value) = inner.value.try_borrow() {
            if value.is_none() {
                return None;
            }
        }
        Some(Gc { inner })
    }

    /// Pointer identity with a strong handle.
    pub fn points_to(&self, gc: &Gc<T>) -> bool {
        self.inner.as_ptr() as *const () as usize == gc.addr()
    }

    /// Whether the target is still alive.
    pub fn is_live(&self) -> bool {
        self.upgrade().is_some()
    }
}

impl<T: Trace + Finalize + 'static> Clone for WeakGc<T> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<T: Trace + Finalize + 'static> Finalize for WeakGc<T> {}

impl<T: Trace + Finalize + 'static> Trace for WeakGc<T> {
    #[inline]
    fn trace(&self, _tracer: &mut Tracer) {}
}

impl<T: Trace + Finalize + Debug + 'static> Debug for WeakGc<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upgrade() {
            Some(gc) => {
                f.write_str("WeakGc(")?;
                Debug::fmt(&gc, f)?;
                f.write_str(")")
            }
            None => f.write_str("WeakGc(<dead>)"),
        }
    }
}
