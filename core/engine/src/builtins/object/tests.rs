use crate::Context;

fn eval_display(context: &mut Context, source: &str) -> String {
    context
        .eval(source)
        .unwrap_or_else(|error| panic!("{source} threw {}", error.display()))
        .display()
        .to_string()
}

#[test]
fn keys_values_entries_follow_insertion_order() {
    let mut context = Context::new();
    assert_eq!(
        eval_display(&mut context, "Object.keys({ b: 1, a: 2 }).join(',')"),
        "b,a"
    );
    assert_eq!(
        eval_display(&mut context, "Object.values({ b: 1, a: 2 }).join(',')"),
        "1,2"
    );
    assert_eq!(
        eval_display(
            &mut context,
            "Object.entries({ x: 1 })[0].join(':')"
        ),
        "x:1"
    );
}

#[test]
fn from_entries_round_trips_entries() {
    let mut context = Context::new();
    assert_eq!(
        eval_display(
            &mut context,
            "var o = { a: 1, b: 'two' };
             var copy = Object.fromEntries(Object.entries(o));
             JSON.stringify(copy) === JSON.stringify(o)"
        ),
        "true"
    );
}

#[test]
fn json_round_trip() {
    let mut context = Context::new();
    assert_eq!(
        eval_display(
            &mut context,
            "var v = { n: 1.5, s: 'x', b: true, z: null, arr: [1, 2], nested: { k: 'v' } };
             JSON.stringify(JSON.parse(JSON.stringify(v))) === JSON.stringify(v)"
        ),
        "true"
    );
    assert_eq!(
        eval_display(&mut context, "JSON.stringify({ u: undefined, f: function() {} })"),
        "{}"
    );
    assert_eq!(
        eval_display(
            &mut context,
            "try { var c = {}; c.self = c; JSON.stringify(c); } catch (e) { e.name }"
        ),
        "TypeError"
    );
}

#[test]
fn define_property_and_accessors() {
    let mut context = Context::new();
    assert_eq!(
        eval_display(
            &mut context,
            "var o = {};
             Object.defineProperty(o, 'answer', { value: 42, enumerable: false });
             o.answer + ':' + Object.keys(o).length"
        ),
        "42:0"
    );
    assert_eq!(
        eval_display(
            &mut context,
            "var o = { hidden: 5 };
             Object.defineProperty(o, 'twice', {
                 get: function() { return this.hidden * 2; }
             });
             o.twice"
        ),
        "10"
    );
    assert_eq!(
        eval_display(
            &mut context,
            "var o = {};
             Object.defineProperty(o, 'boxed', {
                 set: function(v) { this.raw = v; },
                 get: function() { return this.raw; },
                 configurable: true
             });
             o.boxed = 9; o.raw"
        ),
        "9"
    );
}

#[test]
fn redefining_non_configurable_throws() {
    let mut context = Context::new();
    assert_eq!(
        eval_display(
            &mut context,
            "var o = {};
             Object.defineProperty(o, 'p', { value: 1, configurable: false });
             try { Object.defineProperty(o, 'p', { configurable: true }); 'no throw' }
             catch (e) { e.name }"
        ),
        "TypeError"
    );
}

#[test]
fn get_own_property_descriptor_reifies() {
    let mut context = Context::new();
    assert_eq!(
        eval_display(
            &mut context,
            "var d = Object.getOwnPropertyDescriptor({ a: 1 }, 'a');
             d.value + ':' + d.writable + ':' + d.enumerable + ':' + d.configurable"
        ),
        "1:true:true:true"
    );
    assert_eq!(
        eval_display(
            &mut context,
            "Object.getOwnPropertyDescriptor({}, 'missing') === undefined"
        ),
        "true"
    );
}

#[test]
fn seal_and_freeze_predicates() {
    let mut context = Context::new();
    assert_eq!(
        eval_display(
            &mut context,
            "var o = Object.seal({ a: 1 });
             Object.isSealed(o) + ':' + Object.isFrozen(o)"
        ),
        "true:false"
    );
    assert_eq!(
        eval_display(
            &mut context,
            "var o = Object.freeze({ a: 1 });
             Object.isSealed(o) + ':' + Object.isFrozen(o)"
        ),
        "true:true"
    );
    // seal(seal(o)) = seal(o).
    assert_eq!(
        eval_display(&mut context, "Object.isSealed(Object.seal(Object.seal({})))"),
        "true"
    );
}

#[test]
fn assign_copies_own_enumerable_properties() {
    let mut context = Context::new();
    assert_eq!(
        eval_display(
            &mut context,
            "var target = Object.assign({ a: 1 }, { b: 2 }, { a: 3 });
             JSON.stringify(target)"
        ),
        "{\"a\":3,\"b\":2}"
    );
}

#[test]
fn create_builds_on_the_given_prototype() {
    let mut context = Context::new();
    assert_eq!(
        eval_display(
            &mut context,
            "var proto = { greet: function() { return 'hi'; } };
             Object.create(proto).greet()"
        ),
        "hi"
    );
    assert_eq!(
        eval_display(&mut context, "Object.getPrototypeOf(Object.create(null)) === null"),
        "true"
    );
}

#[test]
fn object_is_follows_same_value() {
    let mut context = Context::new();
    assert_eq!(eval_display(&mut context, "Object.is(NaN, NaN)"), "true");
    assert_eq!(eval_display(&mut context, "Object.is(0, -0)"), "false");
    assert_eq!(eval_display(&mut context, "NaN === NaN"), "false");
    assert_eq!(eval_display(&mut context, "0 === -0"), "true");
}

#[test]
fn to_string_uses_tags() {
    let mut context = Context::new();
    assert_eq!(
        eval_display(&mut context, "Object.prototype.toString.call([])"),
        "[object Array]"
    );
    assert_eq!(
        eval_display(&mut context, "Object.prototype.toString.call(null)"),
        "[object Null]"
    );
    assert_eq!(
        eval_display(
            &mut context,
            "var tagged = {};
             tagged[Symbol.toStringTag] = 'Custom';
             Object.prototype.toString.call(tagged)"
        ),
        "[object Custom]"
    );
}

#[test]
fn has_own_property_and_is_prototype_of() {
    let mut context = Context::new();
    assert_eq!(
        eval_display(&mut context, "({ a: 1 }).hasOwnProperty('a')"),
        "true"
    );
    assert_eq!(
        eval_display(&mut context, "({ a: 1 }).hasOwnProperty('toString')"),
        "false"
    );
    assert_eq!(
        eval_display(&mut context, "Object.prototype.isPrototypeOf({})"),
        "true"
    );
}

#[test]
fn proxy_traps_route_get_and_set() {
    let mut context = Context::new();
    assert_eq!(
        eval_display(
            &mut context,
            "var log = [];
             var p = new Proxy({ real: 1 }, {
                 get: function(target, key) { log.push(key); return target[key]; }
             });
             p.real + ':' + log.join(',')"
        ),
        "1:real"
    );
    assert_eq!(
        eval_display(
            &mut context,
            "var backing = {};
             var p = new Proxy(backing, {
                 set: function(target, key, value) { target[key] = value * 2; return true; }
             });
             p.n = 21; backing.n"
        ),
        "42"
    );
    assert_eq!(
        eval_display(
            &mut context,
            "var pair = Proxy.revocable({}, {});
             pair.revoke();
             try { pair.proxy.x; } catch (e) { e.name }"
        ),
        "TypeError"
    );
}

#[test]
fn revoker_captures_survive_a_forced_collection() {
    let mut context = Context::new();
    context
        .eval(
            "var pair = Proxy.revocable({ x: 1 }, {});
             var revoke = pair.revoke;
             pair = undefined;",
        )
        .unwrap();

    // The proxy is now only reachable through the revoker's captures; a
    // collection must not reclaim it out from under the closure.
    assert!(context.force_gc());

    let result = context.eval("revoke(); 'revoked'").unwrap();
    assert_eq!(result.display().to_string(), "revoked");
}

#[test]
fn reflect_mirrors_internal_methods() {
    let mut context = Context::new();
    assert_eq!(
        eval_display(&mut context, "Reflect.get({ a: 7 }, 'a')"),
        "7"
    );
    assert_eq!(
        eval_display(
            &mut context,
            "var o = {}; Reflect.set(o, 'k', 1); Reflect.has(o, 'k')"
        ),
        "true"
    );
    assert_eq!(
        eval_display(
            &mut context,
            "Reflect.ownKeys({ a: 1, b: 2 }).join(',')"
        ),
        "a,b"
    );
    assert_eq!(
        eval_display(
            &mut context,
            "function Ctor(v) { this.v = v; } Reflect.construct(Ctor, [5]).v"
        ),
        "5"
    );
}
