use crate::builtins::promise::promise_state;
use crate::value::JsValue;
use crate::Context;

fn eval_ok(context: &mut Context, source: &str) -> JsValue {
    context
        .eval(source)
        .unwrap_or_else(|error| panic!("{source} threw {}", error.display()))
}

fn eval_display(source: &str) -> String {
    let mut context = Context::new();
    eval_ok(&mut context, source).display().to_string()
}

#[test]
fn arithmetic_and_precedence() {
    assert_eq!(eval_display("1 + 2 * 3"), "7");
    assert_eq!(eval_display("(1 + 2) * 3"), "9");
    assert_eq!(eval_display("2 ** 3 ** 2"), "512");
    assert_eq!(eval_display("10 % 4"), "2");
    assert_eq!(eval_display("'a' + 1"), "a1");
}

#[test]
fn variable_declarations() {
    assert_eq!(eval_display("var a = 1; a"), "1");
    assert_eq!(eval_display("let b = 2; b = b + 1; b"), "3");
    assert_eq!(eval_display("var x; x === undefined"), "true");
    assert_eq!(eval_display("var y = 1; var y; y"), "1");
}

#[test]
fn const_assignment_throws_type_error() {
    let mut context = Context::new();
    let error = context.eval("const a = 1; a = 2;").unwrap_err();
    let name = error.get_field("name", &mut context).unwrap();
    assert_eq!(name.display().to_string(), "TypeError");
}

#[test]
fn let_shadows_in_blocks() {
    assert_eq!(eval_display("let a = 1; { let a = 2; } a"), "1");
    assert_eq!(eval_display("let a = 1; { a = 2; } a"), "2");
}

#[test]
fn temporal_dead_zone_is_a_reference_error() {
    let mut context = Context::new();
    let error = context
        .eval("{ tdz; let tdz = 1; }")
        .expect_err("TDZ access must throw");
    let name = error.get_field("name", &mut context).unwrap();
    assert_eq!(name.display().to_string(), "ReferenceError");
}

#[test]
fn functions_and_closures() {
    assert_eq!(eval_display("function add(a, b) { return a + b; } add(2, 3)"), "5");
    assert_eq!(
        eval_display(
            "function counter() { let n = 0; return function() { n = n + 1; return n; }; }
             let c = counter(); c(); c(); c()"
        ),
        "3"
    );
    assert_eq!(eval_display("let f = (x) => x * 2; f(21)"), "42");
    assert_eq!(eval_display("function d(a, b = 10) { return a + b; } d(5)"), "15");
    assert_eq!(
        eval_display("function rest(first, ...others) { return others.length; } rest(1, 2, 3, 4)"),
        "3"
    );
}

#[test]
fn this_binding_in_methods() {
    assert_eq!(
        eval_display("let o = { n: 7, get() { return this.n; } }; o.get()"),
        "7"
    );
}

#[test]
fn constructors_and_instanceof() {
    assert_eq!(
        eval_display(
            "function Point(x, y) { this.x = x; this.y = y; }
             let p = new Point(1, 2); p.x + p.y"
        ),
        "3"
    );
    assert_eq!(
        eval_display("function Animal() {} let a = new Animal(); a instanceof Animal"),
        "true"
    );
    assert_eq!(
        eval_display(
            "function B() {} B.prototype.kind = function() { return 'b'; };
             new B().kind()"
        ),
        "b"
    );
}

#[test]
fn loops_and_labels() {
    assert_eq!(
        eval_display("let sum = 0; for (let i = 1; i <= 4; i++) { sum += i; } sum"),
        "10"
    );
    assert_eq!(
        eval_display("let n = 0; while (n < 5) { n++; if (n === 3) break; } n"),
        "3"
    );
    assert_eq!(
        eval_display("let n = 0; do { n++; } while (n < 3); n"),
        "3"
    );
    assert_eq!(
        eval_display(
            "let hits = 0;
             outer: for (let i = 0; i < 3; i++) {
                 for (let j = 0; j < 3; j++) {
                     if (j === 1) continue outer;
                     hits++;
                 }
             }
             hits"
        ),
        "3"
    );
    assert_eq!(
        eval_display(
            "let found = -1;
             outer: for (let i = 0; i < 3; i++) {
                 for (let j = 0; j < 3; j++) {
                     if (i * 3 + j === 4) { found = j; break outer; }
                 }
             }
             found"
        ),
        "1"
    );
}

#[test]
fn for_in_and_for_of() {
    assert_eq!(
        eval_display("let keys = ''; for (let k in { a: 1, b: 2 }) { keys += k; } keys"),
        "ab"
    );
    assert_eq!(
        eval_display("let sum = 0; for (let v of [1, 2, 3]) { sum += v; } sum"),
        "6"
    );
    assert_eq!(
        eval_display("let out = ''; for (let ch of 'abc') { out = ch + out; } out"),
        "cba"
    );
}

#[test]
fn switch_statement() {
    assert_eq!(
        eval_display(
            "function pick(x) {
                 switch (x) {
                     case 1: return 'one';
                     case 2: return 'two';
                     default: return 'many';
                 }
             }
             pick(2)"
        ),
        "two"
    );
    assert_eq!(
        eval_display(
            "let log = '';
             switch (1) {
                 case 1: log += 'a';
                 case 2: log += 'b'; break;
                 case 3: log += 'c';
             }
             log"
        ),
        "ab"
    );
}

#[test]
fn try_catch_finally() {
    assert_eq!(
        eval_display("try { null.x } catch (e) { e.name + ':' + (e instanceof TypeError) }"),
        "TypeError:true"
    );
    assert_eq!(
        eval_display("let log = ''; try { log += 'a'; } finally { log += 'b'; } log"),
        "ab"
    );
    assert_eq!(
        eval_display(
            "let log = '';
             try { throw 'x'; } catch (e) { log += 'c' + e; } finally { log += 'f'; }
             log"
        ),
        "cxf"
    );
    assert_eq!(
        eval_display(
            "function f() { try { return 'try'; } finally { } } f()"
        ),
        "try"
    );
}

#[test]
fn thrown_values_pass_through_unchanged() {
    let mut context = Context::new();
    let error = context.eval("throw 42;").unwrap_err();
    assert_eq!(error.as_number(), Some(42.0));
}

#[test]
fn sort_then_stringify() {
    // let a = [3,1,2]; a.sort(); JSON.stringify(a) === "[1,2,3]"
    assert_eq!(
        eval_display("let a = [3, 1, 2]; a.sort(); JSON.stringify(a)"),
        "[1,2,3]"
    );
}

#[test]
fn promise_then_doubles_after_drain() {
    // const p = new Promise(r => r(42)); p.then(v => v * 2) resolves to 84
    // once the microtasks drain.
    let mut context = Context::new();
    let result = eval_ok(
        &mut context,
        "var result = new Promise(function(resolve) { resolve(42); }).then(function(v) { return v * 2; });
         result",
    );
    let JsValue::Object(promise) = result else {
        panic!("then() must return a promise");
    };
    // `eval` drains jobs before returning.
    let (fulfilled, value) = promise_state(&promise).expect("promise must settle");
    assert!(fulfilled);
    assert_eq!(value.as_number(), Some(84.0));
}

#[test]
fn promise_reactions_run_as_microtasks() {
    assert_eq!(
        eval_display(
            "var log = 'start';
             new Promise(function(resolve) { resolve(1); }).then(function() { log += ':reaction'; });
             log += ':sync';
             log"
        ),
        "start:sync"
    );
    // After the drain, the reaction has run.
    let mut context = Context::new();
    eval_ok(
        &mut context,
        "var log = 'start';
         new Promise(function(resolve) { resolve(1); }).then(function() { log += ':reaction'; });
         log += ':sync';",
    );
    let log = eval_ok(&mut context, "log");
    assert_eq!(log.display().to_string(), "start:sync:reaction");
}

#[test]
fn frozen_object_write_is_silent_in_sloppy_mode() {
    assert_eq!(
        eval_display("const o = Object.freeze({ a: 1 }); o.a = 2; o.a"),
        "1"
    );
}

#[test]
fn frozen_object_write_throws_in_strict_mode() {
    let mut context = Context::new();
    let error = context
        .eval("'use strict'; const o = Object.freeze({ a: 1 }); o.a = 2;")
        .expect_err("strict-mode write to a frozen object must throw");
    let name = error.get_field("name", &mut context).unwrap();
    assert_eq!(name.display().to_string(), "TypeError");
}

#[test]
fn runaway_recursion_is_a_catchable_range_error() {
    // function f(){ return f() } — the depth guard turns it into RangeError.
    assert_eq!(
        eval_display("function f() { return f(); } try { f(); } catch (e) { e.name }"),
        "RangeError"
    );
}

#[test]
fn map_identity_keys() {
    assert_eq!(
        eval_display("const m = new Map(); const k = {}; m.set(k, 1); m.get(k)"),
        "1"
    );
    assert_eq!(
        eval_display("const m = new Map(); m.set({}, 1); m.get({}) === undefined"),
        "true"
    );
}

#[test]
fn calling_a_non_function_is_a_type_error() {
    assert_eq!(
        eval_display("let x = 4; try { x(); } catch (e) { e.name }"),
        "TypeError"
    );
}

#[test]
fn delete_removes_configurable_properties() {
    assert_eq!(
        eval_display("let o = { a: 1 }; delete o.a; o.a === undefined"),
        "true"
    );
}

#[test]
fn typeof_operator() {
    assert_eq!(eval_display("typeof 1"), "number");
    assert_eq!(eval_display("typeof 'x'"), "string");
    assert_eq!(eval_display("typeof undefined"), "undefined");
    assert_eq!(eval_display("typeof null"), "object");
    assert_eq!(eval_display("typeof function() {}"), "function");
    assert_eq!(eval_display("typeof neverDeclared"), "undefined");
}

#[test]
fn spread_in_calls_and_arrays() {
    assert_eq!(
        eval_display("function add3(a, b, c) { return a + b + c; } add3(...[1, 2, 3])"),
        "6"
    );
    assert_eq!(eval_display("[0, ...[1, 2], 3].length"), "4");
}

#[test]
fn object_literals() {
    assert_eq!(eval_display("({ a: 1, b: 2 }).b"), "2");
    assert_eq!(eval_display("let key = 'dyn'; ({ [key]: 9 }).dyn"), "9");
    assert_eq!(eval_display("let a = 5; ({ a }).a"), "5");
    assert_eq!(eval_display("({ ...{ x: 1, y: 2 }, y: 3 }).y"), "3");
}

#[test]
fn uncaught_error_reports_name_message_and_stack() {
    let mut context = Context::new();
    let error = context
        .eval("function boom() { throw new TypeError('bad'); } boom();")
        .unwrap_err();
    let report = context.report_uncaught(&error);
    assert!(report.contains("TypeError: bad"), "report was {report}");
    assert!(report.contains("boom"), "report was {report}");
}
