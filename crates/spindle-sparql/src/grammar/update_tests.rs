use crate::test_utils::{dump_update, syntax_error, update_error};
use crate::{DiagnosticKind, SparqlParser};

#[test]
fn graph_management() {
    let text = indoc::indoc! {"
        LOAD SILENT <http://ex.org/d> INTO GRAPH <g> ;
        CLEAR DEFAULT ;
        DROP NAMED ;
        CREATE SILENT GRAPH <g> ;
        ADD <a> TO DEFAULT ;
        MOVE GRAPH <a> TO <b> ;
        COPY SILENT DEFAULT TO GRAPH <c>
    "};

    insta::assert_snapshot!(dump_update(text), @r"
    Update
      Load SILENT <http://ex.org/d> INTO <g>
      Clear DEFAULT
      Drop NAMED
      Create SILENT <g>
      Add GRAPH <a> TO DEFAULT
      Move GRAPH <a> TO GRAPH <b>
      Copy SILENT DEFAULT TO GRAPH <c>
    ");
}

#[test]
fn trailing_separator() {
    insta::assert_snapshot!(dump_update("CLEAR ALL ;"), @r"
    Update
      Clear ALL
    ");
}

#[test]
fn prologue_per_operation() {
    let text = "PREFIX a: <http://a/> CLEAR GRAPH a:g ; PREFIX b: <http://b/> DROP SILENT GRAPH b:g";

    insta::assert_snapshot!(dump_update(text), @r"
    Update
      Clear GRAPH <http://a/g>
      Drop SILENT GRAPH <http://b/g>
    ");
}

#[test]
fn insert_data_quads() {
    insta::assert_snapshot!(
        dump_update("INSERT DATA { <s> <p> 1 . GRAPH <g> { <s> <q> _:b } <t> <u> [] }"),
        @r#"
    Update
      InsertData
        Triples
          <s> <p> "1"^^xsd:integer
        Graph <g>
          <s> <q> _:e_b
        Triples
          <t> <u> _:g_0
    "#
    );
}

#[test]
fn data_takes_no_variables() {
    let diagnostic = update_error("INSERT DATA { ?s <p> 1 }");

    assert_eq!(diagnostic.kind(), DiagnosticKind::VariableNotAllowed);
    insta::assert_snapshot!(diagnostic.to_string(), @"error at 14..16: variable `?s` is not allowed in data blocks");
}

#[test]
fn delete_data_takes_no_blank_nodes() {
    let diagnostic = update_error("DELETE DATA { <s> <p> [] }");

    insta::assert_snapshot!(diagnostic.to_string(), @"error at 22..24: blank nodes are not allowed here");
}

#[test]
fn delete_where() {
    insta::assert_snapshot!(dump_update("DELETE WHERE { ?s <p> ?o . GRAPH ?g { ?s <q> ?o } }"), @r"
    Update
      DeleteWhere
        Triples
          ?s <p> ?o
        Graph ?g
          ?s <q> ?o
    ");

    let diagnostic = update_error("DELETE WHERE { _:b <p> ?o }");
    assert_eq!(diagnostic.kind(), DiagnosticKind::BlankNodeNotAllowed);
}

#[test]
fn modify() {
    let text = indoc::indoc! {"
        WITH <g>
        DELETE { ?s <p> ?o }
        INSERT { ?s <q> ?o }
        USING <a>
        USING NAMED <b>
        WHERE { ?s <p> ?o }
    "};

    insta::assert_snapshot!(dump_update(text), @r"
    Update
      Modify
        With <g>
        Delete
          Triples
            ?s <p> ?o
        Insert
          Triples
            ?s <q> ?o
        Using <a>
        UsingNamed <b>
        Where
          Bgp
            ?s <p> ?o
    ");
}

#[test]
fn insert_template_allows_fresh_blank_nodes() {
    insta::assert_snapshot!(dump_update("INSERT { ?s <p> [] } WHERE { ?s ?p ?o }"), @r"
    Update
      Modify
        Insert
          Triples
            ?s <p> _:g_0
        Where
          Bgp
            ?s ?p ?o
    ");
}

#[test]
fn delete_template_takes_no_blank_nodes() {
    let diagnostic = update_error("DELETE { ?s <p> _:b } WHERE { ?s ?p ?o }");

    assert_eq!(diagnostic.kind(), DiagnosticKind::BlankNodeNotAllowed);
}

#[test]
fn modify_needs_a_template() {
    let diagnostic = update_error("WITH <g> WHERE { ?s ?p ?o }");

    insta::assert_snapshot!(diagnostic.text(), @"unexpected `WHERE`, expected one of `INSERT`, `DELETE`");
}

#[test]
fn template_and_where_are_separate_label_scopes() {
    let diagnostic = update_error("INSERT { _:b <p> ?o } WHERE { _:b <q> ?o }");

    assert_eq!(diagnostic.kind(), DiagnosticKind::DuplicateBlankNodeLabel);
}

const REUSED_LABEL: &str = "INSERT DATA { _:b <p> 1 } ; INSERT DATA { _:b <p> 2 }";

#[test]
fn labels_may_be_reused_by_later_operations() {
    insta::assert_snapshot!(dump_update(REUSED_LABEL), @r#"
    Update
      InsertData
        Triples
          _:e_b <p> "1"^^xsd:integer
      InsertData
        Triples
          _:e_b <p> "2"^^xsd:integer
    "#);
}

#[test]
fn strict_scope_rejects_reuse_across_operations() {
    let parser = SparqlParser::builder()
        .with_strict_blank_node_scope(true)
        .build()
        .unwrap();

    let diagnostic = syntax_error(parser.parse_update(REUSED_LABEL));

    insta::assert_snapshot!(diagnostic.to_string(), @"error at 42..45: blank node label `b` is already used in another graph pattern (related: first used here at 14..17)");
}

#[test]
fn strict_scope_allows_reuse_within_one_group() {
    let parser = SparqlParser::builder()
        .with_strict_blank_node_scope(true)
        .build()
        .unwrap();

    let update = parser
        .parse_update("INSERT DATA { _:b <p> 1 . _:b <q> 2 } ; CLEAR ALL")
        .unwrap();

    assert_eq!(update.operations.len(), 2);
}
