use crate::DiagnosticKind;
use crate::test_utils::{dump_expression, parser, syntax_error};

fn expression_error(text: &str) -> crate::Diagnostic {
    syntax_error(parser().parse_expression(text))
}

#[test]
fn single_operand_collapses() {
    insta::assert_snapshot!(dump_expression("((?x))"), @"?x");
}

#[test]
fn precedence() {
    insta::assert_snapshot!(dump_expression("1 + 2 * 3"), @r#"
    Op +
      "1"^^xsd:integer
      Op *
        "2"^^xsd:integer
        "3"^^xsd:integer
    "#);
}

#[test]
fn binary_operators_associate_left() {
    insta::assert_snapshot!(dump_expression("?a - ?b - ?c"), @r"
    Op -
      Op -
        ?a
        ?b
      ?c
    ");
}

#[test]
fn logical_operators() {
    insta::assert_snapshot!(dump_expression("?a || ?b && !?c"), @r"
    Op ||
      ?a
      Op &&
        ?b
        Op !
          ?c
    ");
}

#[test]
fn negative_literal_in_operator_position() {
    insta::assert_snapshot!(dump_expression("?a -1"), @r#"
    Op -
      ?a
      "1"^^xsd:integer
    "#);
}

#[test]
fn positive_literal_in_operator_position() {
    insta::assert_snapshot!(dump_expression("?a +1"), @r#"
    Op +
      ?a
      "+1"^^xsd:integer
    "#);
}

#[test]
fn signed_tail_binds_factors() {
    insta::assert_snapshot!(dump_expression("?a -2 * ?b"), @r#"
    Op -
      ?a
      Op *
        "2"^^xsd:integer
        ?b
    "#);
}

#[test]
fn unary_operators() {
    insta::assert_snapshot!(dump_expression("-?x * +?y"), @r"
    Op *
      Op UMINUS
        ?x
      Op UPLUS
        ?y
    ");
}

#[test]
fn in_and_not_in() {
    insta::assert_snapshot!(dump_expression("?a IN (1, ?b)"), @r#"
    Op in
      ?a
      List
        "1"^^xsd:integer
        ?b
    "#);
    insta::assert_snapshot!(dump_expression("?a NOT IN ()"), @r"
    Op notin
      ?a
      List
    ");
}

#[test]
fn comparisons_do_not_chain() {
    let diagnostic = expression_error("?a = ?b = ?c");

    insta::assert_snapshot!(diagnostic.text(), @"unexpected `=`, expected end of input");
}

#[test]
fn literals() {
    insta::assert_snapshot!(
        dump_expression(r#"COALESCE("chat"@EN, "1"^^<http://ex.org/t>, true, 1.5, 1e3, 'it\'s')"#),
        @r#"
    Op coalesce
      "chat"@en
      "1"^^<http://ex.org/t>
      "true"^^xsd:boolean
      "1.5"^^xsd:decimal
      "1e3"^^xsd:double
      "it's"
    "#
    );
}

#[test]
fn builtin_templates() {
    insta::assert_snapshot!(dump_expression(r#"REGEX(STR(?x), "^a", "i")"#), @r#"
    Op regex
      Op str
        ?x
      "^a"
      "i"
    "#);
    insta::assert_snapshot!(dump_expression("CONCAT()"), @"Op concat");
    insta::assert_snapshot!(dump_expression("BNODE()"), @"Op bnode");
    insta::assert_snapshot!(dump_expression("BOUND(?x)"), @r"
    Op bound
      ?x
    ");
}

#[test]
fn optional_third_argument() {
    insta::assert_snapshot!(dump_expression("SUBSTR(?s, 1)"), @r#"
    Op substr
      ?s
      "1"^^xsd:integer
    "#);
}

#[test]
fn too_many_arguments() {
    let diagnostic = expression_error("STR(?x, ?y)");

    insta::assert_snapshot!(diagnostic.text(), @"unexpected `,`, expected `)`");
}

#[test]
fn too_few_arguments() {
    let diagnostic = expression_error("IF(?a, 1)");

    insta::assert_snapshot!(diagnostic.text(), @"unexpected `)`, expected `,`");
}

#[test]
fn function_calls() {
    insta::assert_snapshot!(dump_expression("<http://ex.org/f>(DISTINCT ?x, 2)"), @r#"
    Call <http://ex.org/f> DISTINCT
      ?x
      "2"^^xsd:integer
    "#);
    insta::assert_snapshot!(dump_expression("<http://ex.org/f>()"), @"Call <http://ex.org/f>");
    insta::assert_snapshot!(dump_expression("<http://ex.org/c>"), @"<http://ex.org/c>");
}

#[test]
fn aggregates() {
    insta::assert_snapshot!(dump_expression("COUNT(*)"), @r"
    Aggregate count
      *
    ");
    insta::assert_snapshot!(dump_expression(r#"GROUP_CONCAT(DISTINCT ?x; SEPARATOR=", ")"#), @r#"
    Aggregate group_concat DISTINCT SEPARATOR ", "
      ?x
    "#);
}

#[test]
fn nested_aggregate() {
    let diagnostic = expression_error("SUM(COUNT(?x))");

    assert_eq!(diagnostic.kind(), DiagnosticKind::NestedAggregate);
    insta::assert_snapshot!(diagnostic.to_string(), @"error at 4..9: aggregates cannot be nested");
}
