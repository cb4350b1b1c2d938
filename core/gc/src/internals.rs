//! Heap-internal allocation box.

use crate::{Trace, Tracer};
use std::cell::RefCell;

/// One garbage-collected allocation: a size estimate plus the payload cell.
///
/// The payload is an `Option` so that the sweep phase can drop it in place,
/// unlinking any cycle the allocation participates in; the box itself is
/// released once the last handle disappears.
pub(crate) struct GcBox<T: Trace + 'static> {
    pub(crate) size: usize,
    pub(crate) value: RefCell<Option<T>>,
}

/// Object-safe view of a [`GcBox`] used by the collector.
pub(crate) trait ErasedGcBox {
    /// Visits the payload's edges. Returns `false` when the payload is
    /// mutably borrowed and cannot be traced.
    fn trace_value(&self, tracer: &mut Tracer) -> bool;

    /// Whether the payload is currently mutably borrowed.
    fn is_locked(&self) -> bool;

    /// Finalizes and drops the payload.
    fn clear(&self);

    /// Size estimate registered at allocation time.
    fn size(&self) -> usize;
}

impl<T: Trace + 'static> ErasedGcBox for GcBox<T> {
    fn trace_value(&self, tracer: &mut Tracer) -> bool {
        match self.value.try_borrow() {
            Ok(value) => {
                if let Some(value) = value.as_ref() {
                    value.trace(tracer);
                }
                true
            }
            Err(_) => false,
        }
    }

    fn is_locked(&self) -> bool {
        self.value.try_borrow().is_err()
    }

    fn clear(&self) {
        let taken = self.value.borrow_mut().take();
        if let Some(value) = &taken {
            value.finalize();
        }
        drop(taken);
    }

    fn size(&self) -> usize {
        self.size
    }
}
