use crate::test_utils::{dump_path, parser, syntax_error};

#[test]
fn single_iri() {
    insta::assert_snapshot!(dump_path("<p>"), @"<p>");
}

#[test]
fn single_item_levels_collapse() {
    assert_eq!(dump_path("((<p>))"), dump_path("<p>"));
}

#[test]
fn alternative_of_sequences() {
    insta::assert_snapshot!(dump_path("<p> | <q>/<r>"), @r"
    Alt
      <p>
      Seq
        <q>
        <r>
    ");
}

#[test]
fn inverse_wraps_modified_element() {
    insta::assert_snapshot!(dump_path("^<p>*"), @r"
    Inverse
      Mod *
        <p>
    ");
}

#[test]
fn modifier_on_group() {
    insta::assert_snapshot!(dump_path("(<p>|<q>)+ / <r>?"), @r"
    Seq
      Mod +
        Alt
          <p>
          <q>
      Mod ?
        <r>
    ");
}

#[test]
fn a_is_rdf_type() {
    insta::assert_snapshot!(dump_path("a"), @"<http://www.w3.org/1999/02/22-rdf-syntax-ns#type>");
}

#[test]
fn negated_single_element_is_bare() {
    let bare = dump_path("!<p>");
    let parenthesized = dump_path("!(<p>)");

    insta::assert_snapshot!(bare, @r"
    Negated
      <p>
    ");
    assert_eq!(parenthesized, bare);
}

#[test]
fn negated_set_of_several_is_one_alternative() {
    insta::assert_snapshot!(dump_path("!(<p> | ^<q> | ^a)"), @r"
    Negated
      Alt
        <p>
        Inverse
          <q>
        Inverse
          <http://www.w3.org/1999/02/22-rdf-syntax-ns#type>
    ");
}

#[test]
fn empty_negated_set() {
    insta::assert_snapshot!(dump_path("!()"), @"Negated");
}

#[test]
fn dangling_separator() {
    let diagnostic = syntax_error(parser().parse_path("<p>/"));

    insta::assert_snapshot!(diagnostic.text(), @"unexpected end of input, expected one of IRI, prefix, prefixed name");
}
