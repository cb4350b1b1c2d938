use crate::Context;

fn eval_display(context: &mut Context, source: &str) -> String {
    context
        .eval(source)
        .unwrap_or_else(|error| panic!("{source} threw {}", error.display()))
        .display()
        .to_string()
}

#[test]
fn basic_get_set_has_delete() {
    let mut context = Context::new();
    assert_eq!(
        eval_display(
            &mut context,
            "var m = new Map(); m.set('a', 1).set('b', 2); m.get('a') + m.size"
        ),
        "3"
    );
    assert_eq!(eval_display(&mut context, "m.has('b')"), "true");
    assert_eq!(eval_display(&mut context, "m.delete('b')"), "true");
    assert_eq!(eval_display(&mut context, "m.delete('b')"), "false");
    assert_eq!(eval_display(&mut context, "m.size"), "1");
}

#[test]
fn object_keys_use_identity() {
    let mut context = Context::new();
    assert_eq!(
        eval_display(
            &mut context,
            "var m = new Map(); var k = {}; m.set(k, 1); m.get(k)"
        ),
        "1"
    );
    assert_eq!(
        eval_display(&mut context, "m.get({}) === undefined"),
        "true"
    );
}

#[test]
fn nan_is_a_usable_key() {
    let mut context = Context::new();
    assert_eq!(
        eval_display(&mut context, "var m = new Map(); m.set(NaN, 'found'); m.get(NaN)"),
        "found"
    );
}

#[test]
fn iteration_order_is_insertion_order() {
    let mut context = Context::new();
    assert_eq!(
        eval_display(
            &mut context,
            "var m = new Map([['z', 1], ['a', 2]]);
             m.set('m', 3);
             var out = '';
             m.forEach(function(value, key) { out += key; });
             out"
        ),
        "zam"
    );
    assert_eq!(
        eval_display(
            &mut context,
            "var keys = ''; for (var entry of new Map([['x', 1], ['y', 2]])) { keys += entry[0]; } keys"
        ),
        "xy"
    );
}

#[test]
fn overwriting_keeps_the_original_position() {
    let mut context = Context::new();
    assert_eq!(
        eval_display(
            &mut context,
            "var m = new Map([['a', 1], ['b', 2]]);
             m.set('a', 10);
             var out = '';
             m.forEach(function(v, k) { out += k + v; });
             out"
        ),
        "a10b2"
    );
}

#[test]
fn sets_deduplicate_with_same_value_zero() {
    let mut context = Context::new();
    assert_eq!(
        eval_display(&mut context, "var s = new Set([1, 2, 2, 3]); s.size"),
        "3"
    );
    assert_eq!(
        eval_display(&mut context, "s.add(NaN); s.add(NaN); s.has(NaN) + ':' + s.size"),
        "true:4"
    );
    assert_eq!(eval_display(&mut context, "s.delete(2)"), "true");
    assert_eq!(
        eval_display(
            &mut context,
            "var out = ''; s.forEach(function(v) { out += v + ','; }); out"
        ),
        "1,3,NaN,"
    );
}

#[test]
fn constructor_requires_new() {
    let mut context = Context::new();
    assert_eq!(
        eval_display(&mut context, "try { Map(); } catch (e) { e.name }"),
        "TypeError"
    );
}
