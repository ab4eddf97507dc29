//! Tests for CLI dispatch logic.
//!
//! These tests verify:
//! 1. Parser flags: every command that parses queries accepts the same set
//! 2. Conflicts: inline text and a file cannot both be given
//! 3. Params extraction: correct fields are extracted from ArgMatches

use std::path::PathBuf;

use spindle_sparql::Dialect;

use super::*;
use crate::cli::commands::{ast_command, check_command, path_command};

#[test]
fn ast_accepts_parser_flags() {
    let result = ast_command().try_get_matches_from([
        "ast",
        "query.rq",
        "--base",
        "http://ex.org/",
        "--prefix",
        "ex=http://ex.org/ns#",
        "--prefix",
        "foaf:=http://xmlns.com/foaf/0.1/",
        "--strict-blank-nodes",
        "--dialect",
        "adjust",
        "--fuel",
        "500",
    ]);
    assert!(result.is_ok(), "ast should accept parser flags: {:?}", result.err());

    let m = result.unwrap();
    let params = AstParams::from_matches(&m);

    assert_eq!(params.input_path, Some(PathBuf::from("query.rq")));
    assert_eq!(params.input_text, None);
    assert_eq!(params.parser.base.as_deref(), Some("http://ex.org/"));
    assert_eq!(
        params.parser.prefixes,
        [
            ("ex".to_string(), "http://ex.org/ns#".to_string()),
            ("foaf".to_string(), "http://xmlns.com/foaf/0.1/".to_string()),
        ]
    );
    assert!(params.parser.strict_blank_nodes);
    assert_eq!(params.parser.dialect, Dialect::Adjust);
    assert_eq!(params.parser.fuel, Some(500));
}

#[test]
fn check_defaults() {
    let m = check_command()
        .try_get_matches_from(["check", "-q", "ASK {}"])
        .unwrap();
    let params = CheckParams::from_matches(&m);

    assert_eq!(params.input_path, None);
    assert_eq!(params.input_text.as_deref(), Some("ASK {}"));
    assert!(!params.json);
    assert_eq!(params.color, ColorChoice::Auto);
    assert_eq!(params.parser.base, None);
    assert!(params.parser.prefixes.is_empty());
    assert!(!params.parser.strict_blank_nodes);
    assert_eq!(params.parser.dialect, Dialect::Sparql11);
    assert_eq!(params.parser.fuel, None);
}

#[test]
fn stdin_is_a_path() {
    let m = check_command()
        .try_get_matches_from(["check", "-", "--color", "never", "--json"])
        .unwrap();
    let params = CheckParams::from_matches(&m);

    assert_eq!(params.input_path, Some(PathBuf::from("-")));
    assert_eq!(params.color, ColorChoice::Never);
    assert!(params.json);
}

#[test]
fn text_conflicts_with_file() {
    let result = ast_command().try_get_matches_from(["ast", "query.rq", "-q", "ASK {}"]);
    assert!(result.is_err());
}

#[test]
fn prefix_needs_an_iri() {
    let result = ast_command().try_get_matches_from(["ast", "-q", "ASK {}", "--prefix", "ex"]);
    assert!(result.is_err());

    let result = ast_command().try_get_matches_from(["ast", "-q", "ASK {}", "--prefix", "ex="]);
    assert!(result.is_err());
}

#[test]
fn unknown_dialect_is_rejected() {
    let result =
        check_command().try_get_matches_from(["check", "-q", "ASK {}", "--dialect", "sparql12"]);
    assert!(result.is_err());
}

#[test]
fn no_prologue_conflicts_with_json() {
    let result =
        ast_command().try_get_matches_from(["ast", "-q", "ASK {}", "--json", "--no-prologue"]);
    assert!(result.is_err());

    let m = ast_command()
        .try_get_matches_from(["ast", "-q", "ASK {}", "--no-prologue"])
        .unwrap();
    assert!(AstParams::from_matches(&m).no_prologue);
}

#[test]
fn path_takes_inline_text() {
    let m = path_command()
        .try_get_matches_from(["path", "<p>/<q>", "--json", "--fuel", "10"])
        .unwrap();
    let params = PathParams::from_matches(&m);

    assert_eq!(params.text, "<p>/<q>");
    assert!(params.json);
    assert_eq!(params.fuel, Some(10));
}

#[test]
fn path_requires_text() {
    let result = path_command().try_get_matches_from(["path"]);
    assert!(result.is_err());
}

#[test]
fn path_has_no_prefix_flag() {
    let result =
        path_command().try_get_matches_from(["path", "ex:p", "--prefix", "ex=http://ex.org/"]);
    assert!(result.is_err());
}

#[test]
fn cli_lists_subcommands() {
    let cli = build_cli();
    let names: Vec<_> = cli.get_subcommands().map(|c| c.get_name()).collect();

    assert_eq!(names, ["ast", "check", "path"]);
}
