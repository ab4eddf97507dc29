use crate::shape::{many, rule, seq, tok};
use crate::test_utils::{
    CalcContext, CalcError, CalcKind, CalcOps, CalcValue, calc_parser, calc_registry, eval, lex,
    vocabulary,
};
use crate::{EngineError, Parser, ParserConfig, Rule};

fn parser_with(config: ParserConfig) -> Parser<crate::test_utils::Calc> {
    calc_registry()
        .consume_to_parser_with(vocabulary(), CalcContext::default, config)
        .unwrap()
}

fn negatives_parser() -> Parser<crate::test_utils::Calc> {
    calc_registry()
        .consume_to_parser(vocabulary(), || CalcContext {
            negatives_allowed: true,
            ..CalcContext::default()
        })
        .unwrap()
}

#[test]
fn precedence_and_grouping() {
    let parser = calc_parser();

    assert_eq!(eval(&parser, "1 + 2 * 3").unwrap(), 7);
    assert_eq!(eval(&parser, "(1 + 2) * 3").unwrap(), 9);
    assert_eq!(eval(&parser, "10 - 4 - 3").unwrap(), 3);
}

#[test]
fn actions_thread_context_through_rules() {
    let parser = calc_parser();

    let value = eval(&parser, "let x = 4, let y = x * 2, x + y").unwrap();

    assert_eq!(value, 12);
}

#[test]
fn rule_errors_propagate() {
    let err = eval(&calc_parser(), "x + 1").unwrap_err();

    assert_eq!(err, CalcError::Unbound("x".into()));
}

#[test]
fn context_is_fresh_per_parse() {
    let parser = calc_parser();

    assert_eq!(eval(&parser, "let x = 1, x").unwrap(), 1);
    assert!(eval(&parser, "x").is_err());
}

#[test]
fn parse_with_caller_context() {
    let parser = calc_parser();
    let source = "let y = x * 2, y";
    let tokens = lex(source);
    let mut ctx = CalcContext {
        bindings: vec![("x".into(), 5)],
        ..CalcContext::default()
    };

    let value = parser.parse_with("Program", source, &tokens, &mut ctx).unwrap();

    assert_eq!(value, CalcValue::Num(10));
    assert_eq!(
        ctx.bindings,
        vec![("x".to_string(), 5), ("y".to_string(), 10)]
    );
}

#[test]
fn closed_gate_hides_alternative() {
    let err = eval(&calc_parser(), "-1").unwrap_err();

    insta::assert_snapshot!(err.to_string(), @"unexpected `-`, expected one of number, identifier, `(`");
}

#[test]
fn open_gate_admits_alternative() {
    let parser = negatives_parser();

    assert_eq!(eval(&parser, "-2 * 3").unwrap(), -6);
    assert_eq!(eval(&parser, "--1").unwrap(), 1);
    assert_eq!(eval(&parser, "4 - -1").unwrap(), 5);
}

#[test]
fn unexpected_token_carries_range() {
    let err = eval(&calc_parser(), "1 + )").unwrap_err();

    let CalcError::Engine(EngineError::UnexpectedToken { found, range, .. }) = &err else {
        panic!("expected unexpected token, got {err:?}");
    };
    assert_eq!(found, "`)`");
    assert_eq!(u32::from(range.start()), 4);
    assert_eq!(u32::from(range.end()), 5);
}

#[test]
fn premature_end_of_input() {
    let err = eval(&calc_parser(), "1 +").unwrap_err();

    insta::assert_snapshot!(err.to_string(), @"unexpected end of input, expected one of number, identifier, `(`");
}

#[test]
fn trailing_input_is_rejected() {
    let err = eval(&calc_parser(), "1 2").unwrap_err();

    insta::assert_snapshot!(err.to_string(), @"unexpected `2`, expected end of input");
}

#[test]
fn missing_token_names_it() {
    let err = eval(&calc_parser(), "(1 + 2").unwrap_err();

    insta::assert_snapshot!(err.to_string(), @"unexpected end of input, expected `)`");
}

#[test]
fn exec_fuel_is_enforced() {
    let parser = parser_with(ParserConfig::default().with_exec_fuel(Some(3)));

    let err = eval(&parser, "1 + 2 + 3").unwrap_err();

    assert_eq!(err, CalcError::Engine(EngineError::ExecFuelExhausted));
}

#[test]
fn unlimited_fuel() {
    let parser = parser_with(ParserConfig::default().with_exec_fuel(None));

    assert_eq!(eval(&parser, "1 + 2 + 3").unwrap(), 6);
}

#[test]
fn recursion_limit_is_enforced() {
    let parser = parser_with(ParserConfig::default().with_max_depth(5));

    assert_eq!(eval(&parser, "1").unwrap(), 1);
    assert_eq!(
        eval(&parser, "((((1))))").unwrap_err(),
        CalcError::Engine(EngineError::RecursionLimitExceeded)
    );
}

#[test]
fn undeclared_rule_call() {
    let program = Rule::new(
        "Program",
        seq([many(rule("Let")), rule("Expr")]),
        |ops: &mut CalcOps<'_>, _| ops.subrule("Term", &[]),
    );
    let parser = calc_registry()
        .patch(program)
        .unwrap()
        .consume_to_parser(vocabulary(), CalcContext::default)
        .unwrap();

    let err = eval(&parser, "1").unwrap_err();

    assert_eq!(
        err,
        CalcError::Engine(EngineError::UndeclaredRule {
            caller: "Program".into(),
            callee: "Term".into(),
        })
    );
}

#[test]
fn value_mismatch() {
    let number = Rule::new("Number", tok(CalcKind::Num), |ops: &mut CalcOps<'_>, _| {
        ops.consume(CalcKind::Num)?;
        Ok(CalcValue::Unit)
    });
    let parser = calc_registry()
        .patch(number)
        .unwrap()
        .consume_to_parser(vocabulary(), CalcContext::default)
        .unwrap();

    let err = eval(&parser, "1").unwrap_err();

    insta::assert_snapshot!(err.to_string(), @"rule `Atom` did not produce a i64");
}

#[test]
fn unknown_entry() {
    let parser = calc_parser();
    let tokens = lex("1");

    let err = parser.parse("Expr", "1", &tokens).unwrap_err();

    assert_eq!(err, CalcError::Engine(EngineError::UnknownEntry("Expr".into())));
}

#[test]
fn parser_is_shared_across_threads() {
    let parser = calc_parser();

    let results: Vec<i64> = std::thread::scope(|scope| {
        let handles: Vec<_> = (1..=4)
            .map(|n| {
                let parser = &parser;
                scope.spawn(move || eval(parser, &format!("{n} * {n}")).unwrap())
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(results, vec![1, 4, 9, 16]);
}
