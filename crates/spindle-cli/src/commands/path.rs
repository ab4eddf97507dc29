//! Show the AST of a property path.

use spindle_sparql::{AstPrinter, SparqlParser};

use super::run_common::{Input, fail, render_error};

pub struct PathArgs {
    pub text: String,
    pub json: bool,
    pub color: bool,
    pub fuel: Option<u32>,
}

pub fn run(args: PathArgs) {
    let mut builder = SparqlParser::builder();
    if let Some(fuel) = args.fuel {
        builder = builder.with_exec_fuel(Some(fuel));
    }
    let parser = builder.build().unwrap_or_else(|e| fail(e));

    let (path, _) = match parser.parse_path(&args.text) {
        Ok(parsed) => parsed,
        Err(e) => {
            let input = Input {
                text: args.text,
                name: None,
            };
            eprintln!("{}", render_error(&e, &input, args.color));
            std::process::exit(1);
        }
    };

    if args.json {
        let json = serde_json::to_string_pretty(&path).unwrap_or_else(|e| fail(e));
        println!("{}", json);
    } else {
        print!("{}", AstPrinter::path(&path).dump());
    }
}
