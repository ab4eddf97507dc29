//! Lexer for SPARQL text.
//!
//! Produces span-based tokens without storing text; text is sliced from source only
//! when a rule needs it.
//!
//! ## Post-processing
//!
//! - Trivia (whitespace, `#` comments) is dropped.
//! - Consecutive unrecognized characters coalesce into one `Garbage` token.
//! - Prefixed names and blank node labels may not end with `.`, but the terminal
//!   patterns accept them; trailing dots are split off into `Dot` tokens so
//!   `ex:s ex:p ex:o.` ends the triple.

use logos::Logos;
use rowan::TextRange;
use std::ops::Range;

use crate::SyntaxKind;

pub type Token = spindle_core::Token<SyntaxKind>;

fn range_to_text_range(range: Range<usize>) -> TextRange {
    TextRange::new((range.start as u32).into(), (range.end as u32).into())
}

/// Tokenizes source into a vector of span-based tokens.
pub fn lex(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut lexer = SyntaxKind::lexer(source);
    let mut error_start: Option<usize> = None;

    loop {
        match lexer.next() {
            Some(Ok(kind)) => {
                if let Some(start) = error_start.take() {
                    let end = lexer.span().start;
                    tokens.push(Token::new(
                        SyntaxKind::Garbage,
                        range_to_text_range(start..end),
                    ));
                }

                if kind.is_trivia() {
                    continue;
                }

                let span = lexer.span();
                if matches!(kind, SyntaxKind::PnameLn | SyntaxKind::BlankNodeLabel) {
                    split_trailing_dots(source, kind, span, &mut tokens);
                } else {
                    tokens.push(Token::new(kind, range_to_text_range(span)));
                }
            }
            Some(Err(())) => {
                if error_start.is_none() {
                    error_start = Some(lexer.span().start);
                }
            }
            None => {
                if let Some(start) = error_start.take() {
                    tokens.push(Token::new(
                        SyntaxKind::Garbage,
                        range_to_text_range(start..source.len()),
                    ));
                }
                break;
            }
        }
    }

    tracing::trace!(tokens = tokens.len(), "lexed");
    tokens
}

/// Splits `ex:a.b..` into `ex:a.b`, `.`, `.`
fn split_trailing_dots(
    source: &str,
    kind: SyntaxKind,
    span: Range<usize>,
    tokens: &mut Vec<Token>,
) {
    let bytes = source.as_bytes();
    let mut end = span.end;
    // `\.` is an escaped dot and stays part of the local name.
    while end - 1 > span.start && bytes[end - 1] == b'.' && bytes[end - 2] != b'\\' {
        end -= 1;
    }

    tokens.push(Token::new(kind, range_to_text_range(span.start..end)));
    for offset in end..span.end {
        tokens.push(Token::new(
            SyntaxKind::Dot,
            range_to_text_range(offset..offset + 1),
        ));
    }
}
