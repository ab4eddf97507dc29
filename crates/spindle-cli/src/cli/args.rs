//! Shared argument builders for CLI commands.
//!
//! Each function returns a `clap::Arg` that can be composed into commands,
//! so every subcommand spells its parser flags the same way.

use std::path::PathBuf;

use clap::{Arg, ArgAction, value_parser};

/// Query or update file (positional, `-` for stdin).
pub fn input_path_arg() -> Arg {
    Arg::new("input_path")
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
        .help("Query or update file (use \"-\" for stdin)")
}

/// Inline text (-q/--query).
pub fn input_text_arg() -> Arg {
    Arg::new("input_text")
        .short('q')
        .long("query")
        .value_name("TEXT")
        .conflicts_with("input_path")
        .help("Inline query or update text")
}

/// Inline property path (positional).
pub fn path_text_arg() -> Arg {
    Arg::new("path_text")
        .value_name("PATH")
        .required(true)
        .help("Property path text")
}

/// Base IRI (--base).
pub fn base_arg() -> Arg {
    Arg::new("base")
        .long("base")
        .value_name("IRI")
        .help("Base IRI for resolving relative IRIs")
}

/// Predeclared prefix (--prefix NAME=IRI, repeatable).
pub fn prefix_arg() -> Arg {
    Arg::new("prefix")
        .long("prefix")
        .value_name("NAME=IRI")
        .action(ArgAction::Append)
        .value_parser(parse_prefix)
        .help("Predeclare a prefix (repeatable)")
}

/// Reject blank node labels reused across operations (--strict-blank-nodes).
pub fn strict_blank_nodes_arg() -> Arg {
    Arg::new("strict_blank_nodes")
        .long("strict-blank-nodes")
        .action(ArgAction::SetTrue)
        .help("Reject blank node labels reused across update operations")
}

/// Grammar variant (--dialect).
pub fn dialect_arg() -> Arg {
    Arg::new("dialect")
        .long("dialect")
        .value_name("DIALECT")
        .default_value("sparql11")
        .value_parser(["sparql11", "adjust"])
        .help("Grammar variant")
}

/// Execution fuel limit (--fuel).
pub fn fuel_arg() -> Arg {
    Arg::new("fuel")
        .long("fuel")
        .value_name("N")
        .value_parser(value_parser!(u32))
        .help("Execution fuel limit")
}

/// Color output control (--color).
pub fn color_arg() -> Arg {
    Arg::new("color")
        .long("color")
        .value_name("WHEN")
        .default_value("auto")
        .value_parser(["auto", "always", "never"])
        .help("Colorize diagnostics")
}

/// JSON output (--json).
pub fn json_arg() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Print JSON instead of the indented tree")
}

/// Hide `Base`/`Prefix` lines in the tree dump (--no-prologue).
pub fn no_prologue_arg() -> Arg {
    Arg::new("no_prologue")
        .long("no-prologue")
        .action(ArgAction::SetTrue)
        .conflicts_with("json")
        .help("Omit BASE and PREFIX declarations from the tree")
}

fn parse_prefix(value: &str) -> Result<(String, String), String> {
    let Some((name, iri)) = value.split_once('=') else {
        return Err(format!("expected NAME=IRI, got '{}'", value));
    };
    if iri.is_empty() {
        return Err(format!("prefix '{}' has an empty IRI", name));
    }
    Ok((name.trim_end_matches(':').to_string(), iri.to_string()))
}
