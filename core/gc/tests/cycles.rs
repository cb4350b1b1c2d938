use vesper_gc::{force_collect, stats, Finalize, Gc, Trace};

#[derive(Trace, Finalize)]
struct Ring {
    next: Option<Gc<Ring>>,
}

fn make_cycle(len: usize) -> Gc<Ring> {
    let first = Gc::new(Ring { next: None });
    let mut prev = first.clone();
    for _ in 1..len {
        let node = Gc::new(Ring {
            next: Some(prev.clone()),
        });
        prev = node;
    }
    first.borrow_mut().next = Some(prev);
    first
}

#[test]
fn live_cycle_survives() {
    let ring = make_cycle(3);
    force_collect();
    assert!(ring.borrow().next.is_some());
}

#[test]
fn dead_cycle_is_reclaimed() {
    let ring = make_cycle(4);
    force_collect();
    let live_with_ring = stats().live_objects();

    drop(ring);
    // Reference counting alone cannot free the ring; the collector must.
    force_collect();
    assert!(stats().live_objects() <= live_with_ring - 4);
}

#[test]
fn cycle_reachable_through_root_survives() {
    let ring = make_cycle(2);
    let holder = Gc::new(Ring {
        next: Some(ring.clone()),
    });
    drop(ring);

    force_collect();
    assert!(holder.borrow().next.is_some());

    let live_before = stats().live_objects();
    drop(holder);
    force_collect();
    assert!(stats().live_objects() <= live_before - 3);
}
