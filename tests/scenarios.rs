//! End-to-end scenarios through the public API.

use std::collections::HashMap;

use boolex_rs::{
    configure, parse, settings, ErrorCode, Expression, ParserStrategy, Settings,
};

#[test]
fn nested_mixed_operators_evaluate() {
    let e = Expression::parse("((A & B) | !(C => true)) <=> D").unwrap();
    assert_eq!(e.evaluate(&[false, false, false, false]), Ok(true));
    assert_eq!(e.evaluate(&[true, true, false, true]), Ok(true));
    assert_eq!(e.evaluate(&[true, false, false, true]), Ok(false));
}

#[test]
fn tautology_and_contradiction_checks() {
    let e = Expression::parse("A | ~A").unwrap();
    assert!(e.is_tautology());
    assert!(!e.is_contradiction());

    let e = Expression::parse("A & ~A").unwrap();
    assert!(e.is_contradiction());
    assert!(!e.is_tautology());
}

#[test]
fn consensus_minimization() {
    let e = Expression::parse("(A & B) | (A & ~B) | (~A & C)").unwrap();
    let expected = Expression::parse("A | C").unwrap();
    assert!(e.minimize().equivalent_to(&expected));

    let e = Expression::parse("(A & B) | (A & ~B)").unwrap();
    let a = Expression::parse("A").unwrap();
    assert!(!e.structural_eq(&a));
    assert!(e.minimize().equivalent_to(&a));
}

#[test]
fn error_positions() {
    let err = parse("A$").unwrap_err();
    assert_eq!(err.code, ErrorCode::UnknownToken);
    assert_eq!(err.char_start, 1);

    let err = parse(")A").unwrap_err();
    assert_eq!(err.code, ErrorCode::UnmatchedClosingParenthesis);
    assert_eq!(err.char_start, 0);

    let err = parse("A &").unwrap_err();
    assert_eq!(err.code, ErrorCode::BinaryOperatorAtEnds);
    assert_eq!(err.char_start, 2);
}

#[test]
fn error_messages_mark_the_column() {
    let err = parse("A & $ & B").unwrap_err();
    let message = err.to_string();
    let mut lines = message.lines().rev();
    let caret = lines.next().unwrap();
    let quoted = lines.next().unwrap();
    assert!(quoted.contains("A & $ & B"));
    assert_eq!(caret.find('^'), Some(quoted.find('$').unwrap()));
}

#[test]
fn strategy_is_configurable() {
    let original = settings();

    configure(Settings {
        strategy: ParserStrategy::Pratt,
        ..original.clone()
    });
    assert_eq!(settings().strategy, ParserStrategy::Pratt);
    let via_pratt = Expression::parse("p => q => r").unwrap();

    configure(Settings {
        strategy: ParserStrategy::ShuntingYard,
        ..original.clone()
    });
    let via_yard = Expression::parse("p => q => r").unwrap();

    assert!(via_pratt.structural_eq(&via_yard));
    configure(original);
}

#[test]
fn unicode_and_word_aliases_parse() {
    let plain = Expression::parse("(A & B) => ~C").unwrap();
    for spelling in ["(A ∧ B) → ¬C", "(A AND B) IMPLIES NOT C", "(A && B) -> !C"] {
        let aliased = Expression::parse(spelling).unwrap();
        assert!(aliased.equivalent_to(&plain), "{spelling} diverged");
    }
}

#[test]
fn named_evaluation_round_trip() {
    let e = Expression::parse("(x1 | x2) & ~x3").unwrap();
    let mut inputs = HashMap::new();
    inputs.insert("x1".to_string(), false);
    inputs.insert("x2".to_string(), true);
    inputs.insert("x3".to_string(), false);
    assert_eq!(e.evaluate_named(&inputs), Ok(true));
}

#[test]
fn normal_forms_keep_meaning() {
    let e = Expression::parse("(A <=> B) ^ C").unwrap();
    assert!(e.to_dnf().equivalent_to(&e));
    assert!(e.to_cnf().equivalent_to(&e));
    assert!(e.normalize().equivalent_to(&e));
}

#[test]
fn model_counting() {
    use num_bigint::BigUint;
    let e = Expression::parse("(A | B) & C").unwrap();
    // Satisfied by 3 of 4 AB-combinations, C forced: 3 models.
    assert_eq!(e.sat_count(), BigUint::from(3u32));
}
