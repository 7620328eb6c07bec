//! Control-flow tests
//!
//! Loops, `vunja`/`endelea`/`rudisha` propagation, `badili` matching,
//! and the for-in binding protocol.

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

// ============================================================================
// While
// ============================================================================

#[test]
fn test_while_runs_until_condition_fails() {
    assert_eq!(eval("fanya i = 0; wakati (i < 5) { i++; }; i"), Value::Int(5));
}

#[test]
fn test_while_body_may_never_run() {
    assert_eq!(eval("fanya i = 9; wakati (i < 5) { i++; }; i"), Value::Int(9));
}

#[test]
fn test_while_break() {
    let source = "
        fanya i = 0;
        wakati (kweli) {
            i++;
            kama (i == 3) { vunja }
        };
        i
    ";
    assert_eq!(eval(source), Value::Int(3));
}

#[test]
fn test_break_unwinds_through_nested_while() {
    // Frozen: a while loop hands a break outward as its own outcome,
    // so `vunja` exits every enclosing `wakati` at once
    let source = "
        fanya i = 0;
        wakati (i < 3) {
            i++;
            wakati (kweli) { vunja }
        };
        i
    ";
    assert_eq!(eval(source), Value::Int(1));
}

#[test]
fn test_return_escapes_while() {
    let source = "
        fanya f = unda() {
            fanya i = 0;
            wakati (kweli) {
                i++;
                kama (i == 4) { rudisha i }
            }
        };
        f()
    ";
    assert_eq!(eval(source), Value::Int(4));
}

#[test]
fn test_while_condition_error_propagates() {
    assert_eq!(
        eval_err("wakati (haipo) { 1 }"),
        "Mstari 1: Neno Halifahamiki: haipo"
    );
}

// ============================================================================
// For-in
// ============================================================================

#[test]
fn test_for_in_over_array_binds_index_and_element() {
    let source = "
        fanya funguo = 0;
        fanya jumla = 0;
        kwa i, v ktk [10, 20, 30] {
            funguo = funguo + i;
            jumla = jumla + v;
        };
        [funguo, jumla]
    ";
    assert_eq!(eval(source).to_string(), "[3, 60]");
}

#[test]
fn test_for_in_over_string_yields_characters() {
    assert_eq!(
        eval("fanya s = \"\"; kwa i, c ktk \"abc\" { s += c; }; s"),
        Value::string("abc")
    );
}

#[test]
fn test_for_in_over_dict_yields_values() {
    assert_eq!(
        eval("fanya jumla = 0; kwa k, v ktk {\"a\": 1, \"b\": 2} { jumla += v; }; jumla"),
        Value::Int(3)
    );
}

#[test]
fn test_for_in_continue_skips_iteration() {
    let source = "
        fanya jumla = 0;
        kwa i, v ktk [1, 2, 3, 4] {
            kama (v % 2 == 0) { endelea }
            jumla += v;
        };
        jumla
    ";
    assert_eq!(eval(source), Value::Int(4));
}

#[test]
fn test_for_in_break_stops_iteration() {
    let source = "
        fanya jumla = 0;
        kwa i, v ktk [1, 2, 3, 4] {
            kama (v == 3) { vunja }
            jumla += v;
        };
        jumla
    ";
    assert_eq!(eval(source), Value::Int(3));
}

#[test]
fn test_for_in_return_propagates() {
    let source = "
        fanya tafuta = unda(orodha, lengo) {
            kwa i, v ktk orodha {
                kama (v == lengo) { rudisha i }
            }
            -1
        };
        tafuta([\"a\", \"b\", \"c\"], \"b\")
    ";
    assert_eq!(eval(source), Value::Int(1));
}

#[test]
fn test_for_in_restores_prior_bindings() {
    let source = "
        fanya i = \"zamani\";
        fanya v = 99;
        kwa i, v ktk [1, 2] { };
        [i, v]
    ";
    assert_eq!(eval(source).to_string(), "[zamani, 99]");
}

#[test]
fn test_for_in_loop_value_is_null() {
    assert_eq!(eval("kwa i, v ktk [1] { v }"), Value::Null);
}

#[test]
fn test_for_in_over_non_iterable_errors() {
    assert_eq!(
        eval_err("kwa i, v ktk 5 { }"),
        "Mstari 1: Huwezi kufanya operesheni hii na NAMBA"
    );
    assert_eq!(
        eval_err("kwa i, v ktk kweli { }"),
        "Mstari 1: Huwezi kufanya operesheni hii na BOOLEAN"
    );
}

#[test]
fn test_for_in_error_in_body_restores_bindings() {
    let runtime = Mwanga::new();
    runtime.eval("fanya i = \"kabla\"").unwrap();
    assert!(runtime.eval("kwa i, v ktk [1, 2] { haipo }").is_err());
    assert_eq!(runtime.eval("i").unwrap(), Value::string("kabla"));
}

// ============================================================================
// Switch
// ============================================================================

#[test]
fn test_switch_first_matching_clause_wins() {
    assert_eq!(
        eval("badili 1 { ikiwa 1: \"a\" ikiwa 1, 2: \"b\" }"),
        Value::string("a")
    );
}

#[test]
fn test_switch_falls_back_to_default() {
    assert_eq!(
        eval("badili 9 { ikiwa 1: \"a\" kawaida: \"c\" }"),
        Value::string("c")
    );
}

#[test]
fn test_switch_without_match_or_default_is_null() {
    assert_eq!(eval("badili 9 { ikiwa 1: \"a\" }"), Value::Null);
}

#[test]
fn test_switch_matches_strings() {
    assert_eq!(
        eval("badili \"b\" { ikiwa \"a\": 1 ikiwa \"b\": 2 }"),
        Value::Int(2)
    );
}

#[test]
fn test_switch_requires_matching_type_tag() {
    // 1 and 1.0 are == under mixed comparison, but clause matching
    // compares type tags, so they never match each other
    assert_eq!(
        eval("badili 1 { ikiwa 1.0: \"desimali\" kawaida: \"namba\" }"),
        Value::string("namba")
    );
}

#[test]
fn test_switch_return_propagates_from_clause() {
    let source = "
        fanya f = unda(x) {
            badili x {
                ikiwa 1: rudisha \"moja\"
                kawaida: rudisha \"nyingine\"
            }
        };
        f(1)
    ";
    assert_eq!(eval(source), Value::string("moja"));
}

// ============================================================================
// Sentinels at odd boundaries
// ============================================================================

#[test]
fn test_break_escapes_through_function_call_only_at_loop() {
    // A function body absorbs rudisha but not vunja; a stray vunja at
    // program level evaluates to null
    assert_eq!(eval("vunja"), Value::Null);
    assert_eq!(eval("endelea"), Value::Null);
}

#[test]
fn test_if_passes_sentinels_through() {
    let source = "
        fanya f = unda(x) {
            kama (x) { rudisha 1 }
            2
        };
        f(kweli) + f(sikweli)
    ";
    assert_eq!(eval(source), Value::Int(3));
}
