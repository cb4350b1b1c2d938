use crate::Context;

fn eval_display(context: &mut Context, source: &str) -> String {
    context
        .eval(source)
        .unwrap_or_else(|error| panic!("{source} threw {}", error.display()))
        .display()
        .to_string()
}

#[test]
fn call_and_apply_forward_this_and_arguments() {
    let mut context = Context::new();
    assert_eq!(
        eval_display(
            &mut context,
            "function who() { return this.name; } who.call({ name: 'called' })"
        ),
        "called"
    );
    assert_eq!(
        eval_display(
            &mut context,
            "function sum(a, b, c) { return a + b + c; } sum.apply(undefined, [1, 2, 3])"
        ),
        "6"
    );
}

#[test]
fn bind_prepends_arguments_and_fixes_this() {
    let mut context = Context::new();
    assert_eq!(
        eval_display(
            &mut context,
            "function f(a, b) { return this.base + a + b; }
             var bound = f.bind({ base: 100 }, 10);
             bound(1)"
        ),
        "111"
    );
}

#[test]
fn bind_distributivity() {
    // f.bind(a, x).bind(b, y)(z) === f.call(a, x, y, z): the first bound
    // `this` wins.
    let mut context = Context::new();
    assert_eq!(
        eval_display(
            &mut context,
            "function f(x, y, z) { return this.tag + ':' + x + y + z; }
             var a = { tag: 'a' }, b = { tag: 'b' };
             f.bind(a, 1).bind(b, 2)(3) === f.call(a, 1, 2, 3)"
        ),
        "true"
    );
}

#[test]
fn bound_length_subtracts_bound_arguments() {
    let mut context = Context::new();
    assert_eq!(
        eval_display(
            &mut context,
            "function f(a, b, c) { return a; } f.bind(null, 1).length"
        ),
        "2"
    );
    assert_eq!(
        eval_display(
            &mut context,
            "function g(a) { return a; } g.bind(null, 1, 2, 3).length"
        ),
        "0"
    );
}

#[test]
fn bound_functions_construct_through_the_target() {
    let mut context = Context::new();
    assert_eq!(
        eval_display(
            &mut context,
            "function Pair(a, b) { this.sum = a + b; }
             var OnePlus = Pair.bind({ ignored: true }, 1);
             new OnePlus(2).sum"
        ),
        "3"
    );
}

#[test]
fn arguments_object_is_available_in_ordinary_functions() {
    let mut context = Context::new();
    assert_eq!(
        eval_display(
            &mut context,
            "function count() { return arguments.length; } count('a', 'b', 'c')"
        ),
        "3"
    );
    assert_eq!(
        eval_display(
            &mut context,
            "function second() { return arguments[1]; } second(10, 20)"
        ),
        "20"
    );
}

#[test]
fn function_name_and_length_attributes() {
    let mut context = Context::new();
    assert_eq!(
        eval_display(&mut context, "function named(a, b) {} named.name"),
        "named"
    );
    assert_eq!(
        eval_display(&mut context, "function two(a, b) {} two.length"),
        "2"
    );
    // Defaults and rest parameters do not count.
    assert_eq!(
        eval_display(&mut context, "function opt(a, b = 1, ...r) {} opt.length"),
        "1"
    );
}

#[test]
fn prototype_constructor_linkage() {
    let mut context = Context::new();
    assert_eq!(
        eval_display(&mut context, "function F() {} F.prototype.constructor === F"),
        "true"
    );
    assert_eq!(
        eval_display(&mut context, "Array.prototype.constructor === Array"),
        "true"
    );
}
