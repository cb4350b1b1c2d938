//! Garbage collector for the Vesper JavaScript engine.
//!
//! A stop-the-world mark-and-sweep collector over a thread-local registry of
//! allocations. [`Gc`] handles are cheap shared pointers with interior
//! mutability; [`WeakGc`] handles are invisible to the mark phase.
//!
//! Roots are not registered explicitly. Instead, the collector counts the
//! heap-internal edges of every registered allocation by running its
//! [`Trace`] implementation and compares that number against the
//! allocation's actual handle count: any handle held outside the heap graph
//! (a `Context`, an environment chain, a Rust local in the interpreter) makes
//! its target a root. Marking then walks `trace` edges from the roots, and
//! the sweep finalizes and drops the payload of everything unmarked, which
//! unlinks unreachable cycles so their memory is released.
//!
//! A collection is attempted when an allocation-count or byte threshold is
//! crossed, or on [`force_collect`]. If any allocation is mutably borrowed at
//! that point the collection is deferred, so collections only ever observe
//! the heap at rest between interpreter steps.

mod internals;
mod pointers;
mod trace;

pub use pointers::{BorrowError, BorrowMutError, Gc, GcRef, GcRefMut, WeakGc};
pub use trace::{Finalize, Trace};
pub use vesper_macros::{Finalize, Trace};

use hashbrown::{HashMap, HashSet};
use internals::{ErasedGcBox, GcBox};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Default number of allocations between automatic collection attempts.
const DEFAULT_ALLOCATION_THRESHOLD: usize = 1024;

/// Default number of allocated bytes that triggers a collection attempt.
const DEFAULT_BYTES_THRESHOLD: usize = 4 * 1024 * 1024;

thread_local! {
    pub(crate) static HEAP: RefCell<Heap> = RefCell::new(Heap::new());
}

/// Collector statistics, readable through [`stats`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GcStats {
    /// Total number of allocations registered.
    pub allocations: u64,
    /// Total number of allocations reclaimed.
    pub deallocations: u64,
    /// Number of completed collections.
    pub collections: u64,
    /// Total bytes handed out.
    pub bytes_allocated: u64,
    /// Total bytes reclaimed.
    pub bytes_freed: u64,
    /// High-water mark of live bytes.
    pub peak_memory: u64,
}

impl GcStats {
    /// Number of allocations currently registered.
    pub fn live_objects(&self) -> u64 {
        self.allocations - self.deallocations
    }

    /// Bytes currently held by registered allocations.
    pub fn live_bytes(&self) -> u64 {
        self.bytes_allocated - self.bytes_freed
    }
}

/// Edge sink handed to [`Trace`] implementations.
pub struct Tracer {
    edges: Vec<usize>,
    locked: bool,
}

impl Tracer {
    fn new() -> Self {
        Self {
            edges: Vec::new(),
            locked: false,
        }
    }

    /// Records one handle edge to the allocation at `addr`.
    #[inline]
    pub(crate) fn edge(&mut self, addr: usize) {
        self.edges.push(addr);
    }

    /// Reports a borrowed interior cell; the ongoing collection defers.
    #[inline]
    pub(crate) fn notice_locked(&mut self) {
        self.locked = true;
    }
}

struct Registration {
    weak: Weak<dyn ErasedGcBox>,
    addr: usize,
    size: usize,
}

pub(crate) struct Heap {
    registry: Vec<Registration>,
    stats: GcStats,
    allocation_threshold: usize,
    bytes_threshold: usize,
    allocations_since_collect: usize,
    bytes_since_collect: usize,
    collecting: bool,
}

impl Heap {
    fn new() -> Self {
        Self {
            registry: Vec::new(),
            stats: GcStats::default(),
            allocation_threshold: DEFAULT_ALLOCATION_THRESHOLD,
            bytes_threshold: DEFAULT_BYTES_THRESHOLD,
            allocations_since_collect: 0,
            bytes_since_collect: 0,
            collecting: false,
        }
    }

    pub(crate) fn allocate<T: Trace + Finalize + 'static>(&mut self, value: T) -> Gc<T> {
        let size = std::mem::size_of::<GcBox<T>>();
        if !self.collecting
            && (self.allocations_since_collect >= self.allocation_threshold
                || self.bytes_since_collect >= self.bytes_threshold)
        {
            self.collect();
        }

        let inner = Rc::new(GcBox {
            size,
            value: RefCell::new(Some(value)),
        });
        let erased: Rc<dyn ErasedGcBox> = inner.clone();
        self.registry.push(Registration {
            weak: Rc::downgrade(&erased),
            addr: Rc::as_ptr(&erased) as *const () as usize,
            size,
        });

        self.allocations_since_collect += 1;
        self.bytes_since_collect += size;
        self.stats.allocations += 1;
        self.stats.bytes_allocated += size as u64;
        self.stats.peak_memory = self.stats.peak_memory.max(self.stats.live_bytes());

        Gc { inner }
    }

    /// Runs a full collection. Returns `false` when deferred because some
    /// allocation was mutably borrowed.
    pub(crate) fn collect(&mut self) -> bool {
        self.collecting = true;
        let performed = self.collect_inner();
        self.collecting = false;
        if performed {
            self.allocations_since_collect = 0;
            self.bytes_since_collect = 0;
            self.stats.collections += 1;
        }
        self.prune_registry();
        performed
    }

    fn collect_inner(&mut self) -> bool {
        // Snapshot the live allocations; anything that already died through
        // plain handle drops is pruned afterwards.
        let mut live: Vec<(usize, Rc<dyn ErasedGcBox>)> = Vec::new();
        for entry in &self.registry {
            if let Some(strong) = entry.weak.upgrade() {
                live.push((entry.addr, strong));
            }
        }

        // The heap must be at rest: a mutable borrow means an interpreter
        // step is mid-flight and the object graph cannot be examined.
        if live.iter().any(|(_, b)| b.is_locked()) {
            return false;
        }

        // Count heap-internal edges per allocation.
        let mut internal: HashMap<usize, usize> = HashMap::with_capacity(live.len());
        let mut tracer = Tracer::new();
        for (_, gc_box) in &live {
            gc_box.trace_value(&mut tracer);
        }
        if tracer.locked {
            return false;
        }
        for addr in tracer.edges.drain(..) {
            *internal.entry(addr).or_insert(0) += 1;
        }

        // An allocation with more handles than heap-internal edges is held
        // from outside the heap graph: a root. The snapshot above accounts
        // for exactly one extra strong count per allocation.
        let by_addr: HashMap<usize, &Rc<dyn ErasedGcBox>> =
            live.iter().map(|(addr, b)| (*addr, b)).collect();
        let mut worklist: Vec<usize> = Vec::new();
        for (addr, gc_box) in &live {
            let handles = Rc::strong_count(gc_box) - 1;
            let internal_edges = internal.get(addr).copied().unwrap_or(0);
            if handles > internal_edges {
                worklist.push(*addr);
            }
        }

        // Mark.
        let mut marked: HashSet<usize> = HashSet::with_capacity(live.len());
        while let Some(addr) = worklist.pop() {
            if !marked.insert(addr) {
                continue;
            }
            let Some(gc_box) = by_addr.get(&addr) else {
                continue;
            };
            let mut tracer = Tracer::new();
            gc_box.trace_value(&mut tracer);
            for edge in tracer.edges {
                if !marked.contains(&edge) {
                    worklist.push(edge);
                }
            }
        }

        // Sweep: drop unmarked payloads, unlinking their cycles. The boxes
        // deallocate as the snapshot and their mutual handles go away.
        drop(by_addr);
        for (addr, gc_box) in &live {
            if !marked.contains(addr) {
                gc_box.clear();
            }
        }
        drop(live);
        true
    }

    /// Drops registry entries whose allocation has been released and accounts
    /// for them in the statistics.
    fn prune_registry(&mut self) {
        let stats = &mut self.stats;
        self.registry.retain(|entry| {
            if entry.weak.strong_count() == 0 {
                stats.deallocations += 1;
                stats.bytes_freed += entry.size as u64;
                false
            } else {
                true
            }
        });
    }
}

/// Forces a full collection. Returns `false` when the collection had to be
/// deferred because the heap was not at rest.
pub fn force_collect() -> bool {
    HEAP.with(|heap| heap.borrow_mut().collect())
}

/// Returns a snapshot of the collector statistics.
pub fn stats() -> GcStats {
    HEAP.with(|heap| {
        let mut heap = heap.borrow_mut();
        heap.prune_registry();
        heap.stats
    })
}

/// Overrides the allocation-count threshold between automatic collections.
pub fn set_allocation_threshold(threshold: usize) {
    HEAP.with(|heap| heap.borrow_mut().allocation_threshold = threshold.max(1));
}

/// Overrides the byte threshold between automatic collections.
pub fn set_bytes_threshold(threshold: usize) {
    HEAP.with(|heap| heap.borrow_mut().bytes_threshold = threshold.max(1));
}
