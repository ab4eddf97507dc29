//! Dispatch logic: extract params from ArgMatches and convert to command args.
//!
//! This module contains:
//! - `*Params` structs that mirror command `*Args` but are populated from clap
//! - `from_matches()` extractors
//! - `Into<*Args>` impls to bridge dispatch → command handlers

use std::path::PathBuf;

use clap::ArgMatches;
use spindle_sparql::Dialect;

use super::ColorChoice;
use crate::commands::ast::AstArgs;
use crate::commands::check::CheckArgs;
use crate::commands::path::PathArgs;
use crate::commands::run_common::ParserOptions;

/// Parser flags shared by `ast` and `check`.
pub struct ParserParams {
    pub base: Option<String>,
    pub prefixes: Vec<(String, String)>,
    pub strict_blank_nodes: bool,
    pub dialect: Dialect,
    pub fuel: Option<u32>,
}

impl ParserParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            base: m.get_one::<String>("base").cloned(),
            prefixes: m
                .get_many::<(String, String)>("prefix")
                .map(|values| values.cloned().collect())
                .unwrap_or_default(),
            strict_blank_nodes: m.get_flag("strict_blank_nodes"),
            dialect: parse_dialect(m),
            fuel: m.get_one::<u32>("fuel").copied(),
        }
    }
}

impl From<ParserParams> for ParserOptions {
    fn from(p: ParserParams) -> Self {
        Self {
            base: p.base,
            prefixes: p.prefixes,
            strict_blank_nodes: p.strict_blank_nodes,
            dialect: p.dialect,
            fuel: p.fuel,
        }
    }
}

pub struct AstParams {
    pub input_path: Option<PathBuf>,
    pub input_text: Option<String>,
    pub json: bool,
    pub no_prologue: bool,
    pub color: ColorChoice,
    pub parser: ParserParams,
}

impl AstParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            input_path: m.get_one::<PathBuf>("input_path").cloned(),
            input_text: m.get_one::<String>("input_text").cloned(),
            json: m.get_flag("json"),
            no_prologue: m.get_flag("no_prologue"),
            color: parse_color(m),
            parser: ParserParams::from_matches(m),
        }
    }
}

impl From<AstParams> for AstArgs {
    fn from(p: AstParams) -> Self {
        Self {
            input_path: p.input_path,
            input_text: p.input_text,
            json: p.json,
            prologue: !p.no_prologue,
            color: p.color.should_colorize(),
            parser: p.parser.into(),
        }
    }
}

pub struct CheckParams {
    pub input_path: Option<PathBuf>,
    pub input_text: Option<String>,
    pub json: bool,
    pub color: ColorChoice,
    pub parser: ParserParams,
}

impl CheckParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            input_path: m.get_one::<PathBuf>("input_path").cloned(),
            input_text: m.get_one::<String>("input_text").cloned(),
            json: m.get_flag("json"),
            color: parse_color(m),
            parser: ParserParams::from_matches(m),
        }
    }
}

impl From<CheckParams> for CheckArgs {
    fn from(p: CheckParams) -> Self {
        Self {
            input_path: p.input_path,
            input_text: p.input_text,
            json: p.json,
            color: p.color.should_colorize(),
            parser: p.parser.into(),
        }
    }
}

pub struct PathParams {
    pub text: String,
    pub json: bool,
    pub color: ColorChoice,
    pub fuel: Option<u32>,
}

impl PathParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            text: m
                .get_one::<String>("path_text")
                .cloned()
                .unwrap_or_default(),
            json: m.get_flag("json"),
            color: parse_color(m),
            fuel: m.get_one::<u32>("fuel").copied(),
        }
    }
}

impl From<PathParams> for PathArgs {
    fn from(p: PathParams) -> Self {
        Self {
            text: p.text,
            json: p.json,
            color: p.color.should_colorize(),
            fuel: p.fuel,
        }
    }
}

fn parse_color(m: &ArgMatches) -> ColorChoice {
    match m.get_one::<String>("color").map(|s| s.as_str()) {
        Some("always") => ColorChoice::Always,
        Some("never") => ColorChoice::Never,
        _ => ColorChoice::Auto,
    }
}

fn parse_dialect(m: &ArgMatches) -> Dialect {
    match m.get_one::<String>("dialect").map(|s| s.as_str()) {
        Some("adjust") => Dialect::Adjust,
        _ => Dialect::Sparql11,
    }
}
