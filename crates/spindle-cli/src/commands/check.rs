use std::path::PathBuf;

use serde::Serialize;
use spindle_sparql::Diagnostic;

use super::run_common::{ParserOptions, fail, load_input, render_error};

pub struct CheckArgs {
    pub input_path: Option<PathBuf>,
    pub input_text: Option<String>,
    pub json: bool,
    pub color: bool,
    pub parser: ParserOptions,
}

/// Machine-readable outcome printed by `check --json`.
#[derive(Serialize)]
pub struct CheckReport<'a> {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<&'a Diagnostic>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub fn run(args: CheckArgs) {
    let input = load_input(args.input_path.as_deref(), args.input_text.as_deref())
        .unwrap_or_else(|e| fail(e));
    let parser = args.parser.build().unwrap_or_else(|e| fail(e));

    let result = parser.parse(&input.text);

    if args.json {
        let report = match &result {
            Ok(_) => CheckReport {
                valid: true,
                diagnostic: None,
                error: None,
            },
            Err(e) => CheckReport {
                valid: false,
                diagnostic: e.diagnostic(),
                error: e.diagnostic().is_none().then(|| e.to_string()),
            },
        };
        let json = serde_json::to_string(&report).unwrap_or_else(|e| fail(e));
        println!("{}", json);
    } else if let Err(e) = &result {
        eprintln!("{}", render_error(e, &input, args.color));
    }

    if result.is_err() {
        std::process::exit(1);
    }

    // Silent on success (like cargo check)
}
