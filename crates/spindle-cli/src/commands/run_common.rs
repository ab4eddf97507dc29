//! Input loading, parser construction and error reporting shared by commands.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use spindle_sparql::{Dialect, Error, SparqlParser};

#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("failed to read stdin: {0}")]
    Stdin(#[source] io::Error),

    #[error("failed to read '{}': {source}", path.display())]
    File { path: PathBuf, source: io::Error },

    #[error("input is required: use a file argument, `-` for stdin, or -q/--query")]
    Missing,
}

/// Text to parse plus the name diagnostics point at.
pub struct Input {
    pub text: String,
    pub name: Option<String>,
}

pub fn load_input(path: Option<&Path>, text: Option<&str>) -> Result<Input, InputError> {
    let input = match (text, path) {
        (Some(text), _) => Input {
            text: text.to_string(),
            name: None,
        },
        (None, Some(path)) if path.as_os_str() == "-" => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .map_err(InputError::Stdin)?;
            Input {
                text: buf,
                name: Some("<stdin>".to_string()),
            }
        }
        (None, Some(path)) => Input {
            text: fs::read_to_string(path).map_err(|source| InputError::File {
                path: path.to_path_buf(),
                source,
            })?,
            name: Some(path.to_string_lossy().into_owned()),
        },
        (None, None) => return Err(InputError::Missing),
    };

    tracing::debug!(name = ?input.name, bytes = input.text.len(), "loaded input");
    Ok(input)
}

/// Parser settings collected from the command line.
#[derive(Debug, Clone, Default)]
pub struct ParserOptions {
    pub base: Option<String>,
    pub prefixes: Vec<(String, String)>,
    pub strict_blank_nodes: bool,
    pub dialect: Dialect,
    pub fuel: Option<u32>,
}

impl ParserOptions {
    pub fn build(&self) -> spindle_sparql::Result<SparqlParser> {
        let mut builder = SparqlParser::builder()
            .with_strict_blank_node_scope(self.strict_blank_nodes)
            .with_dialect(self.dialect);
        if let Some(fuel) = self.fuel {
            builder = builder.with_exec_fuel(Some(fuel));
        }
        if let Some(base) = &self.base {
            builder = builder.with_base_iri(base);
        }
        for (name, iri) in &self.prefixes {
            builder = builder.with_prefix(name, iri);
        }
        builder.build()
    }
}

/// Renders a parse failure. Syntax errors are drawn against the input text.
pub fn render_error(err: &Error, input: &Input, colored: bool) -> String {
    let Some(diagnostic) = err.diagnostic() else {
        return format!("error: {}", err);
    };

    let mut printer = diagnostic
        .printer()
        .source(&input.text)
        .colored(colored);
    if let Some(name) = &input.name {
        printer = printer.path(name);
    }
    printer.render()
}

/// Prints `msg` as an error and exits with status 1.
pub fn fail(msg: impl std::fmt::Display) -> ! {
    eprintln!("error: {}", msg);
    std::process::exit(1);
}
