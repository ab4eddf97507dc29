use crate::shape::{Shape, alt, gated, many, opt, rule, seq, tok};
use crate::test_utils::{
    Calc, CalcContext, CalcKind::*, CalcOps, CalcValue, calc_parser, calc_rules, vocabulary,
};
use crate::{CompositionError, Parser, Registry, Rule, TokenSet};

fn stub(name: &'static str, shape: Shape<crate::test_utils::CalcKind>) -> Rule<Calc> {
    Rule::new(name, shape, |_: &mut CalcOps<'_>, _| Ok(CalcValue::Unit))
}

fn link(rules: Vec<Rule<Calc>>, entry: &str) -> Result<Parser<Calc>, CompositionError> {
    Registry::create(rules)?
        .entries(&[entry])?
        .consume_to_parser(vocabulary(), CalcContext::default)
}

#[test]
fn token_outside_vocabulary() {
    let err = link(vec![stub("S", tok(Garbage))], "S").err().unwrap();

    insta::assert_snapshot!(err.to_string(), @"rule `S` uses token `garbage` outside the vocabulary");
}

#[test]
fn unresolved_reference() {
    let err = link(vec![stub("S", seq([tok(Num), rule("T")]))], "S")
        .err()
        .unwrap();

    assert_eq!(
        err,
        CompositionError::UnresolvedRule {
            rule: "S".into(),
            target: "T".into(),
        }
    );
}

#[test]
fn missing_entry_rule() {
    let err = Registry::create(calc_rules())
        .unwrap()
        .consume_to_parser(vocabulary(), CalcContext::default)
        .err()
        .unwrap();

    assert_eq!(err, CompositionError::NoEntryRule);
}

#[test]
fn unreachable_rule() {
    let mut rules = calc_rules();
    rules.push(stub("Orphan", tok(Num)));

    let err = link(rules, "Program").err().unwrap();

    assert_eq!(err, CompositionError::UnreachableRule("Orphan".into()));
}

#[test]
fn left_recursion_through_optional_prefix() {
    let rules = vec![
        stub("A", seq([rule("B"), tok(Num)])),
        stub("B", seq([opt(tok(Plus)), rule("A")])),
    ];

    let err = link(rules, "A").err().unwrap();

    insta::assert_snapshot!(err.to_string(), @"left recursion: A -> B -> A");
}

#[test]
fn guarded_recursion_is_fine() {
    let rules = vec![
        stub("A", seq([rule("B"), tok(Num)])),
        stub("B", seq([tok(Plus), opt(rule("A"))])),
    ];

    assert!(link(rules, "A").is_ok());
}

#[test]
fn overlapping_alternatives() {
    let rules = vec![stub(
        "S",
        alt([seq([tok(Num), tok(Plus)]), seq([tok(Num), tok(Minus)])]),
    )];

    let err = link(rules, "S").err().unwrap();

    insta::assert_snapshot!(err.to_string(), @"ambiguous alternatives in `S`: branches 0 and 1 both start with number");
}

#[test]
fn gated_alternatives_may_overlap() {
    let rules = vec![
        stub("S", alt([gated(rule("X")), rule("Y")])),
        stub("X", seq([tok(Num), tok(Plus)])),
        stub("Y", seq([tok(Num), tok(Minus)])),
    ];

    assert!(link(rules, "S").is_ok());
}

#[test]
fn nullable_alternative_must_be_last() {
    let rules = vec![stub("S", alt([opt(tok(Num)), tok(Ident)]))];

    let err = link(rules, "S").err().unwrap();

    assert_eq!(
        err,
        CompositionError::NullableAlternative {
            rule: "S".into(),
            index: 0,
        }
    );
}

#[test]
fn nullable_last_alternative_is_fine() {
    let rules = vec![stub("S", seq([alt([tok(Ident), opt(tok(Num))]), tok(Comma)]))];

    assert!(link(rules, "S").is_ok());
}

#[test]
fn repetition_of_nullable() {
    let rules = vec![stub("S", seq([many(opt(tok(Num))), tok(Ident)]))];

    let err = link(rules, "S").err().unwrap();

    assert_eq!(err, CompositionError::NullableRepetition("S".into()));
}

#[test]
fn first_sets_follow_references() {
    let parser = calc_parser();

    let atom = TokenSet::of::<Calc>(&[Num, Ident, ParenOpen, Minus]);
    assert_eq!(parser.first_set("Atom"), Some(atom));
    assert_eq!(parser.first_set("Expr"), Some(atom));
    assert_eq!(
        parser.first_set("Program"),
        Some(atom.union(TokenSet::single::<Calc>(Let)))
    );
    assert_eq!(parser.first_set("Missing"), None);
}

#[test]
fn nullability() {
    let rules = vec![
        stub("S", seq([rule("Maybe"), tok(Num)])),
        stub("Maybe", opt(tok(Plus))),
    ];

    let parser = link(rules, "S").unwrap();

    assert_eq!(parser.is_nullable("Maybe"), Some(true));
    assert_eq!(parser.is_nullable("S"), Some(false));
    assert_eq!(
        parser.first_set("S"),
        Some(TokenSet::of::<Calc>(&[Plus, Num]))
    );
}
