//! Term construction and lexical decoding.
//!
//! Rule bodies never build [`Term`]s directly: every IRI, blank node, literal and
//! variable goes through the session's [`TermFactory`], so an embedder can swap in
//! its own blank node labelling.

use std::sync::atomic::{AtomicU64, Ordering};

use oxiri::{Iri, IriParseError, IriRef};

use crate::ast::{Literal, RDF_LANG_STRING, Term, XSD_STRING};

/// Builds the terms of a syntax tree. Shared by every parse of one session.
pub trait TermFactory: Send + Sync {
    fn named_node(&self, iri: &str) -> Term {
        Term::Iri(iri.to_string())
    }

    /// Explicit labels come from `_:label`; `None` asks for a fresh node.
    fn blank_node(&self, label: Option<&str>) -> Term;

    fn literal(&self, value: &str, language: Option<&str>, datatype: Option<&str>) -> Term {
        let datatype = match (language, datatype) {
            (_, Some(dt)) => dt,
            (Some(_), None) => RDF_LANG_STRING,
            (None, None) => XSD_STRING,
        };
        Term::Literal(Literal {
            value: value.to_string(),
            language: language.map(str::to_lowercase),
            datatype: datatype.to_string(),
        })
    }

    fn variable(&self, name: &str) -> Term {
        Term::Variable(name.to_string())
    }

    /// Forget session state so repeated parses label blank nodes identically.
    fn reset(&self) {}
}

/// Fresh blank nodes are `g_0`, `g_1`, ... and explicit labels become `e_<label>`.
#[derive(Debug, Default)]
pub struct DefaultTermFactory {
    counter: AtomicU64,
}

impl DefaultTermFactory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TermFactory for DefaultTermFactory {
    fn blank_node(&self, label: Option<&str>) -> Term {
        match label {
            Some(label) => Term::Blank(format!("e_{}", label)),
            None => {
                let n = self.counter.fetch_add(1, Ordering::Relaxed);
                Term::Blank(format!("g_{}", n))
            }
        }
    }

    fn reset(&self) {
        self.counter.store(0, Ordering::Relaxed);
    }
}

/// Resolves an IRI reference against the base, or validates it as-is when there
/// is no base.
pub fn resolve_iri(base: Option<&Iri<String>>, iri: &str) -> Result<String, IriParseError> {
    match base {
        Some(base) => Ok(base.resolve(iri)?.into_inner()),
        None => Ok(IriRef::parse(iri.to_string())?.into_inner()),
    }
}

/// Strips the quotes of any of the four string forms and decodes escapes.
/// Returns `None` on an escape that encodes no scalar value.
pub fn unquote(text: &str) -> Option<String> {
    let quote = if text.starts_with("\"\"\"") || text.starts_with("'''") {
        3
    } else {
        1
    };
    let inner = text.get(quote..text.len().checked_sub(quote)?)?;
    unescape_string(inner)
}

/// Decodes `ECHAR` escapes plus `\uXXXX` and `\UXXXXXXXX`.
pub fn unescape_string(input: &str) -> Option<String> {
    if !input.contains('\\') {
        return Some(input.to_string());
    }

    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let decoded = match chars.next()? {
            't' => '\t',
            'b' => '\u{08}',
            'n' => '\n',
            'r' => '\r',
            'f' => '\u{0C}',
            '"' => '"',
            '\'' => '\'',
            '\\' => '\\',
            'u' => hex_char(&mut chars, 4)?,
            'U' => hex_char(&mut chars, 8)?,
            _ => return None,
        };
        out.push(decoded);
    }
    Some(out)
}

fn hex_char(chars: &mut std::str::Chars<'_>, len: usize) -> Option<char> {
    let digits: String = chars.by_ref().take(len).collect();
    if digits.len() != len {
        return None;
    }
    u32::from_str_radix(&digits, 16).ok().and_then(char::from_u32)
}

/// Drops the backslash of `PN_LOCAL_ESC` sequences. Percent encodings stay.
pub fn unescape_local_name(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            }
            c => out.push(c),
        }
    }
    out
}
