//! Command builders for the CLI.
//!
//! Each command is built from the shared arg builders in `args.rs`. Every
//! command accepts the same parser flags, so a flag set can be moved between
//! `ast` and `check` unchanged.

use clap::Command;

use super::args::*;

/// Add the flags that configure the parser itself.
fn with_parser_args(cmd: Command) -> Command {
    cmd.arg(base_arg())
        .arg(prefix_arg())
        .arg(strict_blank_nodes_arg())
        .arg(dialect_arg())
        .arg(fuel_arg())
}

/// Build the complete CLI with all subcommands.
pub fn build_cli() -> Command {
    Command::new("spindle")
        .about("Composable SPARQL 1.1 query and update parser")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(ast_command())
        .subcommand(check_command())
        .subcommand(path_command())
}

/// Show the AST of a query or update.
pub fn ast_command() -> Command {
    let cmd = Command::new("ast")
        .about("Show the AST of a query or update")
        .override_usage(
            "\
  spindle ast <FILE>
  spindle ast -q <TEXT>",
        )
        .after_help(
            r#"EXAMPLES:
  spindle ast query.rq                          # indented tree
  spindle ast query.rq --json                   # JSON tree
  spindle ast -q 'ASK { ?s ?p ?o }'             # inline text
  cat update.ru | spindle ast -                 # stdin
  spindle ast -q 'ASK { ex:s ?p ?o }' --prefix ex=http://ex.org/"#,
        )
        .arg(input_path_arg())
        .arg(input_text_arg())
        .arg(json_arg())
        .arg(no_prologue_arg())
        .arg(color_arg());

    with_parser_args(cmd)
}

/// Validate a query or update.
pub fn check_command() -> Command {
    let cmd = Command::new("check")
        .about("Validate a query or update")
        .override_usage(
            "\
  spindle check <FILE>
  spindle check -q <TEXT>",
        )
        .after_help(
            r#"EXAMPLES:
  spindle check query.rq                        # silent on success
  spindle check update.ru --strict-blank-nodes  # reject labels reused across operations
  spindle check -q 'SELECT (ADJUST(?d, ?tz) AS ?a) {}' --dialect adjust
  spindle check query.rq --json                 # diagnostics as JSON"#,
        )
        .arg(input_path_arg())
        .arg(input_text_arg())
        .arg(json_arg().help("Print diagnostics as JSON"))
        .arg(color_arg());

    with_parser_args(cmd)
}

/// Show the AST of a property path.
pub fn path_command() -> Command {
    Command::new("path")
        .about("Show the AST of a property path")
        .override_usage("  spindle path <PATH>")
        .after_help(
            r#"EXAMPLES:
  spindle path '<p>/^<q>*'
  spindle path '!(<a>|^<b>)' --json"#,
        )
        .arg(path_text_arg())
        .arg(json_arg())
        .arg(color_arg())
        .arg(fuel_arg())
}
