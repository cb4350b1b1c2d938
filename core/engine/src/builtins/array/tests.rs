use crate::Context;

fn eval_display(context: &mut Context, source: &str) -> String {
    context
        .eval(source)
        .unwrap_or_else(|error| panic!("{source} threw {}", error.display()))
        .display()
        .to_string()
}

#[test]
fn push_pop_shift_unshift() {
    let mut context = Context::new();
    assert_eq!(
        eval_display(&mut context, "var a = [1, 2]; a.push(3); a.join(',')"),
        "1,2,3"
    );
    assert_eq!(eval_display(&mut context, "a.pop()"), "3");
    assert_eq!(eval_display(&mut context, "a.shift()"), "1");
    assert_eq!(eval_display(&mut context, "a.unshift(0); a.join(',')"), "0,2");
}

#[test]
fn map_filter_reduce() {
    let mut context = Context::new();
    assert_eq!(
        eval_display(&mut context, "[1, 2, 3].map(function(x) { return x * 2; }).join(',')"),
        "2,4,6"
    );
    assert_eq!(
        eval_display(
            &mut context,
            "[1, 2, 3, 4].filter(function(x) { return x % 2 === 0; }).join(',')"
        ),
        "2,4"
    );
    assert_eq!(
        eval_display(
            &mut context,
            "[1, 2, 3].reduce(function(acc, x) { return acc + x; })"
        ),
        "6"
    );
    assert_eq!(
        eval_display(
            &mut context,
            "[].reduce(function(acc, x) { return acc + x; }, 'seed')"
        ),
        "seed"
    );
}

#[test]
fn reduce_of_empty_array_without_initial_value_throws() {
    let mut context = Context::new();
    assert_eq!(
        eval_display(
            &mut context,
            "try { [].reduce(function(a, b) { return a + b; }); } catch (e) { e.name }"
        ),
        "TypeError"
    );
}

#[test]
fn slice_concat_and_flat_produce_arrays() {
    let mut context = Context::new();
    assert_eq!(
        eval_display(&mut context, "[1, 2, 3, 4].slice(1, 3).join(',')"),
        "2,3"
    );
    assert_eq!(
        eval_display(&mut context, "[1].concat([2, 3], 4).join(',')"),
        "1,2,3,4"
    );
    assert_eq!(
        eval_display(&mut context, "[1, [2, [3, [4]]]].flat(2).join(',')"),
        "1,2,3,4"
    );
    assert_eq!(
        eval_display(&mut context, "Array.isArray([1].map(function(x) { return x; }))"),
        "true"
    );
}

#[test]
fn index_of_and_includes() {
    let mut context = Context::new();
    assert_eq!(eval_display(&mut context, "[1, 2, 3].indexOf(2)"), "1");
    assert_eq!(eval_display(&mut context, "[1, 2, 3].indexOf(9)"), "-1");
    // includes uses SameValueZero, so NaN is findable; indexOf is not.
    assert_eq!(eval_display(&mut context, "[NaN].includes(NaN)"), "true");
    assert_eq!(eval_display(&mut context, "[NaN].indexOf(NaN)"), "-1");
}

#[test]
fn sort_is_stable_and_supports_comparators() {
    let mut context = Context::new();
    assert_eq!(
        eval_display(&mut context, "[3, 1, 2].sort().join(',')"),
        "1,2,3"
    );
    assert_eq!(
        eval_display(
            &mut context,
            "[5, 30, 4].sort(function(a, b) { return a - b; }).join(',')"
        ),
        "4,5,30"
    );
    // Default sort is lexicographic.
    assert_eq!(
        eval_display(&mut context, "[10, 9, 1].sort().join(',')"),
        "1,10,9"
    );
    // Stability: equal keys keep their original relative order.
    assert_eq!(
        eval_display(
            &mut context,
            "var items = [
                 { k: 1, tag: 'a' }, { k: 0, tag: 'b' }, { k: 1, tag: 'c' },
                 { k: 0, tag: 'd' }, { k: 1, tag: 'e' }
             ];
             items.sort(function(x, y) { return x.k - y.k; });
             items.map(function(i) { return i.tag; }).join('')"
        ),
        "bdace"
    );
    // undefined elements sink to the end.
    assert_eq!(
        eval_display(&mut context, "var u = [undefined, 2, 1]; u.sort(); u[2] === undefined"),
        "true"
    );
}

#[test]
fn splice_removes_and_inserts() {
    let mut context = Context::new();
    assert_eq!(
        eval_display(
            &mut context,
            "var a = [1, 2, 3, 4]; var removed = a.splice(1, 2, 'x'); removed.join(',') + '|' + a.join(',')"
        ),
        "2,3|1,x,4"
    );
}

#[test]
fn iteration_order_is_ascending_indexes() {
    let mut context = Context::new();
    assert_eq!(
        eval_display(
            &mut context,
            "var a = []; a[2] = 'c'; a[0] = 'a'; a[1] = 'b'; Object.keys(a).join(',')"
        ),
        "0,1,2"
    );
}

#[test]
fn array_from_iterables_and_array_likes() {
    let mut context = Context::new();
    assert_eq!(
        eval_display(&mut context, "Array.from('abc').join(',')"),
        "a,b,c"
    );
    assert_eq!(
        eval_display(
            &mut context,
            "Array.from({ length: 2, 0: 'x', 1: 'y' }).join(',')"
        ),
        "x,y"
    );
    assert_eq!(
        eval_display(
            &mut context,
            "Array.from([1, 2], function(x) { return x * 10; }).join(',')"
        ),
        "10,20"
    );
    assert_eq!(eval_display(&mut context, "Array.of(7, 8).join(',')"), "7,8");
}

#[test]
fn for_of_uses_the_values_iterator() {
    let mut context = Context::new();
    assert_eq!(
        eval_display(
            &mut context,
            "var out = ''; for (var entry of [10, 20].entries()) { out += entry[0] + ':' + entry[1] + ';'; } out"
        ),
        "0:10;1:20;"
    );
}
