use crate::Context;

fn eval_display(context: &mut Context, source: &str) -> String {
    context
        .eval(source)
        .unwrap_or_else(|error| panic!("{source} threw {}", error.display()))
        .display()
        .to_string()
}

#[test]
fn methods_coerce_this_through_wrappers() {
    let mut context = Context::new();
    assert_eq!(eval_display(&mut context, "'abc'.toUpperCase()"), "ABC");
    assert_eq!(
        eval_display(&mut context, "new String('abc').toUpperCase()"),
        "ABC"
    );
    assert_eq!(eval_display(&mut context, "new String('xyz').length"), "3");
    assert_eq!(eval_display(&mut context, "new String('xyz')[1]"), "y");
}

#[test]
fn methods_throw_on_null_and_undefined_this() {
    let mut context = Context::new();
    assert_eq!(
        eval_display(
            &mut context,
            "try { String.prototype.trim.call(null); } catch (e) { e.name }"
        ),
        "TypeError"
    );
}

#[test]
fn slicing_and_searching() {
    let mut context = Context::new();
    assert_eq!(eval_display(&mut context, "'hello'.slice(1, 3)"), "el");
    assert_eq!(eval_display(&mut context, "'hello'.slice(-2)"), "lo");
    assert_eq!(eval_display(&mut context, "'hello'.substring(3, 1)"), "el");
    assert_eq!(eval_display(&mut context, "'hello'.indexOf('ll')"), "2");
    assert_eq!(eval_display(&mut context, "'hello'.indexOf('z')"), "-1");
    assert_eq!(eval_display(&mut context, "'hello'.includes('ell')"), "true");
    assert_eq!(eval_display(&mut context, "'hello'.startsWith('he')"), "true");
    assert_eq!(eval_display(&mut context, "'hello'.endsWith('lo')"), "true");
    assert_eq!(eval_display(&mut context, "'hello'.charAt(1)"), "e");
    assert_eq!(eval_display(&mut context, "'hello'.charCodeAt(0)"), "104");
    assert_eq!(eval_display(&mut context, "'hello'.at(-1)"), "o");
}

#[test]
fn trimming_and_padding() {
    let mut context = Context::new();
    assert_eq!(eval_display(&mut context, "'  x  '.trim()"), "x");
    assert_eq!(eval_display(&mut context, "'  x'.trimStart()"), "x");
    assert_eq!(eval_display(&mut context, "'x  '.trimEnd()"), "x");
    assert_eq!(eval_display(&mut context, "'7'.padStart(3, '0')"), "007");
    assert_eq!(eval_display(&mut context, "'7'.padEnd(3)"), "7  ");
    assert_eq!(eval_display(&mut context, "'ab'.repeat(3)"), "ababab");
}

#[test]
fn split_and_replace() {
    let mut context = Context::new();
    assert_eq!(
        eval_display(&mut context, "'a,b,c'.split(',').join('|')"),
        "a|b|c"
    );
    assert_eq!(
        eval_display(&mut context, "'abc'.split('').join('-')"),
        "a-b-c"
    );
    assert_eq!(
        eval_display(&mut context, "'a,b,c'.split(',', 2).length"),
        "2"
    );
    assert_eq!(
        eval_display(&mut context, "'aaa'.replace('a', 'b')"),
        "baa"
    );
    assert_eq!(
        eval_display(&mut context, "'aaa'.replaceAll('a', 'b')"),
        "bbb"
    );
    assert_eq!(
        eval_display(
            &mut context,
            "'a-b'.replace('-', function(m, i) { return '[' + i + ']'; })"
        ),
        "a[1]b"
    );
}

#[test]
fn regexp_routing_through_exec() {
    let mut context = Context::new();
    assert_eq!(
        eval_display(&mut context, "'a1b2c3'.match(new RegExp('[0-9]'))[0]"),
        "1"
    );
    assert_eq!(
        eval_display(
            &mut context,
            "'a1b2c3'.match(new RegExp('[0-9]', 'g')).join(',')"
        ),
        "1,2,3"
    );
    assert_eq!(
        eval_display(&mut context, "'hello world'.search(new RegExp('world'))"),
        "6"
    );
    assert_eq!(
        eval_display(
            &mut context,
            "'one two  three'.split(new RegExp('\\\\s+')).join('|')"
        ),
        "one|two|three"
    );
    assert_eq!(
        eval_display(
            &mut context,
            "'x1y2'.replace(new RegExp('[0-9]', 'g'), '#')"
        ),
        "x#y#"
    );
}

#[test]
fn regexp_exec_and_test() {
    let mut context = Context::new();
    assert_eq!(
        eval_display(&mut context, "new RegExp('b(c)').exec('abcd')[1]"),
        "c"
    );
    assert_eq!(
        eval_display(&mut context, "new RegExp('b').exec('abcd').index"),
        "1"
    );
    assert_eq!(
        eval_display(&mut context, "new RegExp('^d').test('abcd')"),
        "false"
    );
    assert_eq!(
        eval_display(
            &mut context,
            "var r = new RegExp('a', 'g'); r.exec('aa'); r.lastIndex"
        ),
        "1"
    );
    assert_eq!(
        eval_display(
            &mut context,
            "try { new RegExp('x', 'gg'); } catch (e) { e.name }"
        ),
        "SyntaxError"
    );
}

#[test]
fn iteration_yields_code_points() {
    let mut context = Context::new();
    assert_eq!(
        eval_display(&mut context, "Array.from('héllo').length"),
        "5"
    );
}
