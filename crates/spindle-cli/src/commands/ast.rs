//! Show the AST of a query or update.

use std::path::PathBuf;

use spindle_sparql::{AstPrinter, Parsed};

use super::run_common::{ParserOptions, fail, load_input, render_error};

pub struct AstArgs {
    pub input_path: Option<PathBuf>,
    pub input_text: Option<String>,
    pub json: bool,
    pub prologue: bool,
    pub color: bool,
    pub parser: ParserOptions,
}

pub fn run(args: AstArgs) {
    let input = load_input(args.input_path.as_deref(), args.input_text.as_deref())
        .unwrap_or_else(|e| fail(e));
    let parser = args.parser.build().unwrap_or_else(|e| fail(e));

    let parsed = match parser.parse(&input.text) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("{}", render_error(&e, &input, args.color));
            std::process::exit(1);
        }
    };

    if args.json {
        let json = to_json(&parsed).unwrap_or_else(|e| fail(e));
        println!("{}", json);
    } else {
        print!("{}", dump(&parsed, args.prologue));
    }
}

pub fn dump(parsed: &Parsed, prologue: bool) -> String {
    let printer = match parsed {
        Parsed::Query(query) => AstPrinter::query(query),
        Parsed::Update(update) => AstPrinter::update(update),
    };
    printer.with_prologue(prologue).dump()
}

pub fn to_json(parsed: &Parsed) -> serde_json::Result<String> {
    match parsed {
        Parsed::Query(query) => serde_json::to_string_pretty(query),
        Parsed::Update(update) => serde_json::to_string_pretty(update),
    }
}
