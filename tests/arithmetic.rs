use el::{evaluate, evaluate_with, ErrorKind, Value};
use std::collections::HashMap;

fn approxv(v: Value, b: f64) -> bool {
    matches!(v, Value::Number(a) if (a - b).abs() < 1e-9)
}

#[test]
fn precedence_and_parentheses() {
    assert!(approxv(evaluate("2 + 3 * 4").unwrap(), 14.0));
    assert!(approxv(evaluate("(2 + 3) * 4").unwrap(), 20.0));
    assert!(approxv(evaluate("1 + 2 * 3").unwrap(), 7.0));
    assert!(approxv(evaluate("10 - 4 - 3").unwrap(), 3.0));
}

#[test]
fn equals_prefix_is_ignored() {
    assert!(approxv(evaluate("= 10 + 20 * 3").unwrap(), 70.0));
    assert!(approxv(evaluate("  =2+3").unwrap(), 5.0));
}

#[test]
fn division_is_floating() {
    assert!(approxv(evaluate("7 / 2").unwrap(), 3.5));
    assert!(approxv(evaluate("7.5 % 2").unwrap(), 1.5));
    assert!(approxv(evaluate("-7 % 3").unwrap(), -1.0));
    assert_eq!(evaluate("1 / 0").unwrap(), Value::Number(f64::INFINITY));
}

#[test]
fn booleans_and_numeric_strings_coerce() {
    assert!(approxv(evaluate("true + 1").unwrap(), 2.0));
    assert!(approxv(evaluate("'3' * 2").unwrap(), 6.0));
    assert!(approxv(evaluate("2 - '0.5'").unwrap(), 1.5));
    assert!(approxv(evaluate("-'4'").unwrap(), -4.0));
    assert!(approxv(evaluate("+true").unwrap(), 1.0));
}

#[test]
fn concatenation() {
    assert_eq!(evaluate("'a' + 'b'").unwrap(), Value::from("ab"));
    assert_eq!(evaluate("'1' + '2'").unwrap(), Value::from("12"));
    assert_eq!(evaluate("[1, 2] + [3]").unwrap().to_string(), "[ 1, 2, 3 ]");
    assert_eq!(
        evaluate("{a: 1, b: 2} + {b: 3, c: 4}").unwrap().to_string(),
        "{ \"a\": 1, \"b\": 3, \"c\": 4 }"
    );
}

#[test]
fn mismatched_operands_name_both_sides() {
    let err = evaluate("1 + 'x'").unwrap_err();
    assert_eq!(err.kind, ErrorKind::Evaluation);
    assert!(err.message.contains("'1' of type 'Number'"), "{}", err.message);
    assert!(err.message.contains("'\"x\"' of type 'String'"), "{}", err.message);

    let err = evaluate("[1] * 2").unwrap_err();
    assert!(err.message.starts_with("Cannot multiply"), "{}", err.message);
    assert!(evaluate("'a' - 'b'").is_err());
    assert!(evaluate("{} / {}").is_err());
}

#[test]
fn bitwise_operators_truncate() {
    assert!(approxv(evaluate("6 & 3").unwrap(), 2.0));
    assert!(approxv(evaluate("6 | 3").unwrap(), 7.0));
    assert!(approxv(evaluate("6 ^ 3").unwrap(), 5.0));
    assert!(approxv(evaluate("1 << 3").unwrap(), 8.0));
    assert!(approxv(evaluate("-16 >> 2").unwrap(), -4.0));
    assert!(approxv(evaluate("~5").unwrap(), -6.0));
    assert!(approxv(evaluate("5.9 & 7").unwrap(), 5.0));
    assert!(evaluate("[1] & 1").is_err());
    assert!(evaluate("~true").is_err());
}

#[test]
fn variables() {
    let mut vars = HashMap::new();
    vars.insert("price".to_string(), Value::from(19.99));
    vars.insert("quantity".to_string(), Value::from(3.0));
    assert!(approxv(evaluate_with("price * quantity", &vars).unwrap(), 59.97));
    assert!(approxv(evaluate_with("=price + 0.01", &vars).unwrap(), 20.0));
}
