use crate::shape::{alt, rule, seq, tok};
use crate::test_utils::{
    Calc, CalcContext, CalcKind, CalcOps, CalcValue, calc_registry, calc_rules, eval, vocabulary,
};
use crate::{Alt, CompositionError, Registry, Rule};

fn doubled_number() -> Rule<Calc> {
    Rule::new("Number", tok(CalcKind::Num), |ops: &mut CalcOps<'_>, _| {
        let token = ops.consume(CalcKind::Num)?;
        let n: i64 = ops.text(&token).parse().unwrap_or_default();
        Ok(CalcValue::Num(n * 2))
    })
}

fn atom_without_negative() -> Rule<Calc> {
    Rule::new(
        "Atom",
        alt([rule("Number"), rule("Variable"), rule("Group")]),
        |ops: &mut CalcOps<'_>, _| {
            ops.alternate(&[
                Alt::rule("Number"),
                Alt::rule("Variable"),
                Alt::rule("Group"),
            ])
        },
    )
}

#[test]
fn create_rejects_duplicate_names() {
    let mut rules = calc_rules();
    rules.push(doubled_number());

    let err = Registry::create(rules).unwrap_err();

    assert_eq!(err, CompositionError::DuplicateRule("Number".into()));
}

#[test]
fn add_rejects_existing_name() {
    let err = calc_registry().add(doubled_number()).unwrap_err();

    insta::assert_snapshot!(err.to_string(), @"duplicate rule name `Number`");
}

#[test]
fn add_many_is_atomic() {
    let base = calc_registry();
    let extra = Rule::new("Unused", tok(CalcKind::Num), |ops: &mut CalcOps<'_>, _| {
        ops.consume(CalcKind::Num)?;
        Ok(CalcValue::Unit)
    });

    let err = base
        .clone()
        .add_many([extra.clone(), extra])
        .unwrap_err();

    assert_eq!(err, CompositionError::DuplicateRule("Unused".into()));
    assert!(!base.contains("Unused"));
    assert_eq!(base.len(), calc_rules().len());
}

#[test]
fn delete_missing_rule_fails() {
    let err = calc_registry().delete("Missing").unwrap_err();

    insta::assert_snapshot!(err.to_string(), @"rule not found: `Missing`");
}

#[test]
fn delete_leaves_dangling_reference_until_patched() {
    let registry = calc_registry().delete("Negative").unwrap();

    let err = registry
        .clone()
        .consume_to_parser(vocabulary(), CalcContext::default)
        .err()
        .unwrap();
    assert_eq!(
        err,
        CompositionError::UnresolvedRule {
            rule: "Atom".into(),
            target: "Negative".into(),
        }
    );

    let parser = registry
        .patch(atom_without_negative())
        .unwrap()
        .consume_to_parser(vocabulary(), || CalcContext {
            negatives_allowed: true,
            ..CalcContext::default()
        })
        .unwrap();
    assert_eq!(eval(&parser, "2 - 1").unwrap(), 1);
    assert!(eval(&parser, "-1").is_err());
}

#[test]
fn patch_keeps_position() {
    let before: Vec<_> = calc_registry().names().collect();

    let after: Vec<_> = calc_registry()
        .patch(doubled_number())
        .unwrap()
        .names()
        .collect();

    assert_eq!(before, after);
}

#[test]
fn patch_requires_existing_rule() {
    let rule = Rule::new("Nope", tok(CalcKind::Num), |ops: &mut CalcOps<'_>, _| {
        ops.consume(CalcKind::Num)?;
        Ok(CalcValue::Unit)
    });

    let err = calc_registry().patch(rule).unwrap_err();

    assert_eq!(err, CompositionError::RuleNotFound("Nope".into()));
}

#[test]
fn merge_without_override_is_ambiguous() {
    let fragment = Registry::create([doubled_number()]).unwrap();

    let err = calc_registry().merge(fragment, []).unwrap_err();

    insta::assert_snapshot!(err.to_string(), @"ambiguous rule `Number` defined by both registries, supply an override");
}

#[test]
fn merge_with_override_uses_override() {
    let fragment = Registry::create([doubled_number()]).unwrap();

    let parser = calc_registry()
        .merge(fragment, [doubled_number()])
        .unwrap()
        .consume_to_parser(vocabulary(), CalcContext::default)
        .unwrap();

    assert_eq!(eval(&parser, "1 + 2 * 3").unwrap(), 26);
}

#[test]
fn merge_adds_new_rules_and_entries() {
    let sum = Rule::new(
        "Sum",
        seq([rule("Expr"), tok(CalcKind::Comma), rule("Expr")]),
        |ops: &mut CalcOps<'_>, _| {
            let a: i64 = ops.sub("Expr", &[])?;
            ops.consume(CalcKind::Comma)?;
            let b: i64 = ops.sub("Expr", &[])?;
            Ok(CalcValue::Num(a + b))
        },
    );
    let fragment = Registry::create([sum]).unwrap();

    let parser = calc_registry()
        .merge(fragment, [])
        .unwrap()
        .entries(&["Sum"])
        .unwrap()
        .consume_to_parser(vocabulary(), CalcContext::default)
        .unwrap();

    let source = "1 + 1, 3";
    let tokens = crate::test_utils::lex(source);
    let value = parser.parse("Sum", source, &tokens).unwrap();
    assert_eq!(value, CalcValue::Num(5));
    assert_eq!(parser.entry_names().collect::<Vec<_>>(), vec!["Program", "Sum"]);
}

#[test]
fn merge_override_must_name_known_rule() {
    let fragment = Registry::create([doubled_number()]).unwrap();
    let stray = Rule::new("Stray", tok(CalcKind::Num), |ops: &mut CalcOps<'_>, _| {
        ops.consume(CalcKind::Num)?;
        Ok(CalcValue::Unit)
    });

    let err = calc_registry()
        .merge(fragment, [doubled_number(), stray])
        .unwrap_err();

    assert_eq!(err, CompositionError::RuleNotFound("Stray".into()));
}

#[test]
fn entries_must_exist() {
    let err = calc_registry().entries(&["Main"]).unwrap_err();

    assert_eq!(err, CompositionError::RuleNotFound("Main".into()));
}
