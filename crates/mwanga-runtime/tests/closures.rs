//! Closure semantic behavior tests
//!
//! Documents the language's scoping model:
//! - Closures capture the environment they were created in, by
//!   reference; later mutation of a captured name is visible at call
//!   time.
//! - `env.set` writes the local scope only, so assigning inside a
//!   function body shadows an outer binding instead of updating it.
//!   Test authors rely on this; it is frozen behavior.

use mwanga_runtime::{Mwanga, Value};
use pretty_assertions::assert_eq;

fn eval(source: &str) -> Value {
    Mwanga::new()
        .eval(source)
        .unwrap_or_else(|err| panic!("evaluation failed for {:?}: {}", source, err))
}

fn eval_err(source: &str) -> String {
    Mwanga::new()
        .eval(source)
        .expect_err("expected an error")
        .to_string()
}

#[test]
fn test_function_literal_is_a_value() {
    assert_eq!(eval("fanya f = unda(x) { x }; aina(f)"), Value::string("FUNCTION"));
}

#[test]
fn test_implicit_return_of_last_expression() {
    assert_eq!(eval("unda() { 5 }()"), Value::Int(5));
}

#[test]
fn test_explicit_return_stops_the_body() {
    assert_eq!(eval("fanya f = unda() { rudisha 7; 9 }; f()"), Value::Int(7));
}

#[test]
fn test_return_without_value_yields_null() {
    assert_eq!(eval("fanya f = unda() { rudisha; }; f()"), Value::Null);
}

#[test]
fn test_parameters_bind_positionally() {
    assert_eq!(eval("fanya f = unda(a, b) { a - b }; f(10, 4)"), Value::Int(6));
}

#[test]
fn test_extra_arguments_are_ignored() {
    assert_eq!(eval("fanya f = unda(a) { a }; f(1, 2, 3)"), Value::Int(1));
}

#[test]
fn test_missing_argument_leaves_parameter_unbound() {
    assert_eq!(
        eval_err("fanya f = unda(a, b) { b }; f(1)"),
        "Mstari 1: Neno Halifahamiki: b"
    );
}

#[test]
fn test_calling_a_non_function() {
    assert_eq!(eval_err("5(1)"), "Mstari 1: Hii sio function: NAMBA");
    assert_eq!(
        eval_err("fanya s = \"x\"; s()"),
        "Mstari 1: Hii sio function: NENO"
    );
}

#[test]
fn test_closure_captures_defining_environment() {
    assert_eq!(
        eval("fanya mk = unda(x) { unda(y) { x + y } }; fanya ongeza2 = mk(2); ongeza2(3)"),
        Value::Int(5)
    );
}

#[test]
fn test_two_closures_capture_independent_frames() {
    let source = "
        fanya mk = unda(x) { unda(y) { x + y } };
        fanya a = mk(1);
        fanya b = mk(100);
        a(1) + b(1)
    ";
    assert_eq!(eval(source), Value::Int(103));
}

#[test]
fn test_capture_is_by_reference_not_by_value() {
    // The closure resolves x at call time, so a later rebinding in the
    // defining scope is visible
    assert_eq!(
        eval("fanya x = 1; fanya f = unda() { x }; x = 2; f()"),
        Value::Int(2)
    );
}

#[test]
fn test_assignment_in_body_shadows_outer_binding() {
    // Frozen: set writes the call scope, the outer x stays 1
    assert_eq!(
        eval("fanya x = 1; unda() { x = 2 }(); x"),
        Value::Int(1)
    );
}

#[test]
fn test_counter_closure_never_advances() {
    // A consequence of non-walking set: the captured count is read
    // through the chain but each call writes its own frame
    let source = "
        fanya kihesabu = unda() {
            fanya idadi = 0;
            unda() { idadi = idadi + 1; idadi }
        };
        fanya ongeza = kihesabu();
        ongeza();
        ongeza()
    ";
    assert_eq!(eval(source), Value::Int(1));
}

#[test]
fn test_higher_order_functions() {
    assert_eq!(
        eval("fanya mara_mbili = unda(f, x) { f(f(x)) }; mara_mbili(unda(n) { n + 1 }, 3)"),
        Value::Int(5)
    );
}

#[test]
fn test_functions_stored_in_arrays() {
    assert_eq!(
        eval("fanya ops = [unda(n) { n + 1 }, unda(n) { n * 2 }]; ops[1](21)"),
        Value::Int(42)
    );
}

#[test]
fn test_recursion() {
    let source = "
        fanya fib = unda(n) {
            kama (n < 2) { rudisha n }
            fib(n - 1) + fib(n - 2)
        };
        fib(10)
    ";
    assert_eq!(eval(source), Value::Int(55));
}

#[test]
fn test_recursive_accumulation() {
    let source = "
        fanya jumla = unda(orodha, i) {
            kama (i >= urefu(orodha)) { rudisha 0 }
            orodha[i] + jumla(orodha, i + 1)
        };
        jumla([1, 2, 3, 4], 0)
    ";
    assert_eq!(eval(source), Value::Int(10));
}

#[test]
fn test_call_arguments_evaluate_left_to_right() {
    // Element assignment mutates the shared array, so the recorded
    // order is observable across call frames
    let source = "
        fanya logi = [\"\"];
        fanya weka = unda(x) { logi[0] = logi[0] + x; x };
        fanya f = unda(a, b) { logi[0] };
        f(weka(\"a\"), weka(\"b\"))
    ";
    assert_eq!(eval(source), Value::string("ab"));
}

#[test]
fn test_argument_error_short_circuits_the_call() {
    assert_eq!(
        eval_err("fanya f = unda(a, b) { a }; f(1, haipo)"),
        "Mstari 1: Neno Halifahamiki: haipo"
    );
}
