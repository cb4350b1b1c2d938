use vesper_gc::{force_collect, Finalize, Gc, Trace, WeakGc};

#[derive(Trace, Finalize)]
struct Holder {
    strong: Option<Gc<Holder>>,
    weak: Option<WeakGc<Holder>>,
}

fn leaf() -> Gc<Holder> {
    Gc::new(Holder {
        strong: None,
        weak: None,
    })
}

#[test]
fn weak_upgrade_while_target_lives() {
    let target = leaf();
    let weak = target.downgrade();
    force_collect();
    assert!(weak.upgrade().is_some());
    assert!(weak.points_to(&target));
}

#[test]
fn weak_cleared_after_target_dies() {
    let target = leaf();
    let weak = target.downgrade();
    drop(target);
    force_collect();
    assert!(weak.upgrade().is_none());
    assert!(!weak.is_live());
}

#[test]
fn weak_edges_do_not_keep_targets_alive() {
    let target = leaf();
    let observer = Gc::new(Holder {
        strong: None,
        weak: Some(target.downgrade()),
    });

    drop(target);
    force_collect();
    assert!(observer
        .borrow()
        .weak
        .as_ref()
        .expect("observer keeps its slot")
        .upgrade()
        .is_none());
}

#[test]
fn cycle_through_weak_is_reclaimable() {
    let a = leaf();
    let b = Gc::new(Holder {
        strong: Some(a.clone()),
        weak: None,
    });
    a.borrow_mut().weak = Some(b.downgrade());

    let weak_a = a.downgrade();
    drop(a);
    drop(b);
    force_collect();
    assert!(weak_a.upgrade().is_none());
}
