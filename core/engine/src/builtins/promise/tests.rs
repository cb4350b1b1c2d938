use super::promise_state;
use crate::value::JsValue;
use crate::Context;

fn eval_promise(context: &mut Context, source: &str) -> (bool, JsValue) {
    let result = context
        .eval(source)
        .unwrap_or_else(|error| panic!("{source} threw {}", error.display()));
    let JsValue::Object(promise) = result else {
        panic!("{source} did not produce a promise");
    };
    promise_state(&promise).expect("promise must be settled after the job drain")
}

#[test]
fn executor_resolution_settles_through_microtasks() {
    let mut context = Context::new();
    let (fulfilled, value) = eval_promise(
        &mut context,
        "new Promise(function(resolve) { resolve(42); }).then(function(v) { return v * 2; })",
    );
    assert!(fulfilled);
    assert_eq!(value.as_number(), Some(84.0));
}

#[test]
fn rejections_flow_to_catch() {
    let mut context = Context::new();
    let (fulfilled, value) = eval_promise(
        &mut context,
        "new Promise(function(resolve, reject) { reject('boom'); })
             .catch(function(reason) { return 'caught:' + reason; })",
    );
    assert!(fulfilled);
    assert_eq!(value.display().to_string(), "caught:boom");
}

#[test]
fn throwing_executors_reject() {
    let mut context = Context::new();
    let (fulfilled, value) = eval_promise(
        &mut context,
        "new Promise(function() { throw 'bad'; }).catch(function(r) { return r; })",
    );
    assert!(fulfilled);
    assert_eq!(value.display().to_string(), "bad");
}

#[test]
fn then_chains_propagate_values() {
    let mut context = Context::new();
    let (fulfilled, value) = eval_promise(
        &mut context,
        "Promise.resolve(1)
             .then(function(v) { return v + 1; })
             .then(function(v) { return v * 10; })",
    );
    assert!(fulfilled);
    assert_eq!(value.as_number(), Some(20.0));
}

#[test]
fn resolving_with_a_thenable_adopts_its_state() {
    let mut context = Context::new();
    let (fulfilled, value) = eval_promise(
        &mut context,
        "Promise.resolve({ then: function(resolve) { resolve('adopted'); } })",
    );
    assert!(fulfilled);
    assert_eq!(value.display().to_string(), "adopted");
}

#[test]
fn reactions_on_one_promise_run_in_registration_order() {
    let mut context = Context::new();
    context
        .eval(
            "var order = '';
             var p = Promise.resolve('x');
             p.then(function() { order += '1'; });
             p.then(function() { order += '2'; });
             p.then(function() { order += '3'; });",
        )
        .unwrap();
    let order = context.eval("order").unwrap();
    assert_eq!(order.display().to_string(), "123");
}

#[test]
fn all_collects_in_input_order() {
    let mut context = Context::new();
    let (fulfilled, value) = eval_promise(
        &mut context,
        "Promise.all([Promise.resolve('a'), 'b', Promise.resolve('c')])
             .then(function(values) { return values.join(''); })",
    );
    assert!(fulfilled);
    assert_eq!(value.display().to_string(), "abc");
}

#[test]
fn all_rejects_on_the_first_rejection() {
    let mut context = Context::new();
    let (fulfilled, value) = eval_promise(
        &mut context,
        "Promise.all([Promise.resolve(1), Promise.reject('nope')])",
    );
    assert!(!fulfilled);
    assert_eq!(value.display().to_string(), "nope");
}

#[test]
fn all_settled_reports_both_outcomes() {
    let mut context = Context::new();
    let (fulfilled, value) = eval_promise(
        &mut context,
        "Promise.allSettled([Promise.resolve(1), Promise.reject('r')])
             .then(function(results) {
                 return results[0].status + ':' + results[1].status;
             })",
    );
    assert!(fulfilled);
    assert_eq!(value.display().to_string(), "fulfilled:rejected");
}

#[test]
fn any_aggregates_when_everything_rejects() {
    let mut context = Context::new();
    let (fulfilled, value) = eval_promise(
        &mut context,
        "Promise.any([Promise.reject('a'), Promise.reject('b')])
             .catch(function(e) { return e.name + ':' + e.errors.join(','); })",
    );
    assert!(fulfilled);
    assert_eq!(value.display().to_string(), "AggregateError:a,b");
}

#[test]
fn any_fulfills_with_the_first_fulfillment() {
    let mut context = Context::new();
    let (fulfilled, value) = eval_promise(
        &mut context,
        "Promise.any([Promise.reject('a'), Promise.resolve('winner')])",
    );
    assert!(fulfilled);
    assert_eq!(value.display().to_string(), "winner");
}

#[test]
fn race_settles_with_the_first_input() {
    let mut context = Context::new();
    let (fulfilled, value) = eval_promise(
        &mut context,
        "Promise.race([Promise.resolve('first'), Promise.resolve('second')])",
    );
    assert!(fulfilled);
    assert_eq!(value.display().to_string(), "first");
}

#[test]
fn finally_passes_values_through() {
    let mut context = Context::new();
    let (fulfilled, value) = eval_promise(
        &mut context,
        "Promise.resolve('kept').finally(function() { return 'ignored'; })",
    );
    assert!(fulfilled);
    assert_eq!(value.display().to_string(), "kept");
}

#[test]
fn combinator_captures_survive_a_forced_collection() {
    let mut context = Context::new();
    context
        .eval(
            "var resolveLate;
             var late = new Promise(function(resolve) { resolveLate = resolve; });
             var all = Promise.all([Promise.resolve({ tag: 'early' }), late]);",
        )
        .unwrap();

    // The early result now lives only in the pending combinator's captured
    // state; a collection must keep it alive.
    assert!(context.force_gc());

    context.eval("resolveLate('late');").unwrap();
    let result = context.eval("all").unwrap();
    let JsValue::Object(promise) = result else {
        panic!("expected a promise");
    };
    let (fulfilled, value) = promise_state(&promise).expect("must settle");
    assert!(fulfilled);
    let first = value
        .get_field(crate::property::PropertyKey::Index(0), &mut context)
        .unwrap();
    let tag = first.get_field("tag", &mut context).unwrap();
    assert_eq!(tag.display().to_string(), "early");
    let second = value
        .get_field(crate::property::PropertyKey::Index(1), &mut context)
        .unwrap();
    assert_eq!(second.display().to_string(), "late");
}

#[test]
fn resolving_function_captures_survive_a_forced_collection() {
    let mut context = Context::new();
    context
        .eval(
            "var resolveIt;
             var p = new Promise(function(resolve) { resolveIt = resolve; });
             p = undefined;",
        )
        .unwrap();

    // The pending promise is now only reachable through `resolveIt`'s
    // captures.
    assert!(context.force_gc());

    let result = context.eval("resolveIt(7); 'resolved'").unwrap();
    assert_eq!(result.display().to_string(), "resolved");
}

#[test]
fn resolving_with_itself_rejects_with_type_error() {
    let mut context = Context::new();
    context
        .eval(
            "var resolveOuter;
             var p = new Promise(function(resolve) { resolveOuter = resolve; });
             resolveOuter(p);",
        )
        .unwrap();
    let result = context.eval("p").unwrap();
    let JsValue::Object(promise) = result else {
        panic!("expected a promise");
    };
    let (fulfilled, reason) = promise_state(&promise).expect("must settle");
    assert!(!fulfilled);
    let name = reason.get_field("name", &mut context).unwrap();
    assert_eq!(name.display().to_string(), "TypeError");
}
