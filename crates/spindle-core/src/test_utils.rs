//! Toy arithmetic language used to exercise the engine.
//!
//! ```text
//! Program = Let* Expr
//! Let     = 'let' ident '=' Expr ','
//! Expr    = Term (('+' | '-') Term)*
//! Term    = Atom ('*' Atom)*
//! Atom    = number | ident | '(' Expr ')' | Negative
//! Negative = '-' Atom          (gated on `negatives_allowed`)
//! ```

use std::fmt;

use rowan::{TextRange, TextSize};

use crate::shape::{alt, gated, many, rule, seq, tok};
use crate::{
    Alt, EngineError, Language, Lookahead, Ops, Parser, Registry, Rule, Token, TokenSet,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum CalcKind {
    Num,
    Ident,
    Let,
    Plus,
    Minus,
    Star,
    Eq,
    Comma,
    ParenOpen,
    ParenClose,
    Garbage,
    Eof,
}

use CalcKind::*;

impl fmt::Display for CalcKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Num => "number",
            Ident => "identifier",
            Let => "`let`",
            Plus => "`+`",
            Minus => "`-`",
            Star => "`*`",
            Eq => "`=`",
            Comma => "`,`",
            ParenOpen => "`(`",
            ParenClose => "`)`",
            Garbage => "garbage",
            Eof => "end of input",
        };
        f.write_str(s)
    }
}

impl From<CalcKind> for Lookahead<CalcKind> {
    fn from(kind: CalcKind) -> Self {
        Lookahead::Token(kind)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CalcValue {
    Unit,
    Num(i64),
}

impl From<i64> for CalcValue {
    fn from(n: i64) -> Self {
        CalcValue::Num(n)
    }
}

impl TryFrom<CalcValue> for i64 {
    type Error = CalcValue;

    fn try_from(value: CalcValue) -> Result<Self, CalcValue> {
        match value {
            CalcValue::Num(n) => Ok(n),
            other => Err(other),
        }
    }
}

#[derive(Debug, Default)]
pub struct CalcContext {
    pub bindings: Vec<(String, i64)>,
    pub negatives_allowed: bool,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CalcError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("unbound variable `{0}`")]
    Unbound(String),
}

pub enum Calc {}

impl Language for Calc {
    type Kind = CalcKind;
    type Value = CalcValue;
    type Context = CalcContext;
    type Error = CalcError;

    const EOF: CalcKind = Eof;

    fn kind_to_raw(kind: CalcKind) -> u16 {
        kind as u16
    }
}

pub type CalcOps<'a> = Ops<'a, Calc>;

pub fn vocabulary() -> TokenSet {
    TokenSet::of::<Calc>(&[
        Num, Ident, Let, Plus, Minus, Star, Eq, Comma, ParenOpen, ParenClose,
    ])
}

pub fn lex(source: &str) -> Vec<Token<CalcKind>> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let start = i;
        let c = bytes[i];
        let kind = match c {
            b' ' | b'\n' | b'\t' => {
                i += 1;
                continue;
            }
            b'0'..=b'9' => {
                while i < bytes.len() && bytes[i].is_ascii_digit() {
                    i += 1;
                }
                Num
            }
            b'a'..=b'z' => {
                while i < bytes.len() && bytes[i].is_ascii_alphanumeric() {
                    i += 1;
                }
                if &source[start..i] == "let" { Let } else { Ident }
            }
            _ => {
                i += 1;
                match c {
                    b'+' => Plus,
                    b'-' => Minus,
                    b'*' => Star,
                    b'=' => Eq,
                    b',' => Comma,
                    b'(' => ParenOpen,
                    b')' => ParenClose,
                    _ => Garbage,
                }
            }
        };
        let span = TextRange::new(TextSize::from(start as u32), TextSize::from(i as u32));
        tokens.push(Token::new(kind, span));
    }
    tokens
}

fn program(ops: &mut CalcOps<'_>, _: &[bool]) -> Result<CalcValue, CalcError> {
    ops.many(Let, |ops| ops.subrule("Let", &[]))?;
    ops.subrule("Expr", &[])
}

fn let_binding(ops: &mut CalcOps<'_>, _: &[bool]) -> Result<CalcValue, CalcError> {
    ops.consume(Let)?;
    let name = ops.consume(Ident)?;
    let name = ops.text(&name).to_string();
    ops.consume(Eq)?;
    let value: i64 = ops.sub("Expr", &[])?;
    ops.consume(Comma)?;
    ops.action(|ctx| ctx.bindings.push((name, value)));
    Ok(CalcValue::Unit)
}

fn expr(ops: &mut CalcOps<'_>, _: &[bool]) -> Result<CalcValue, CalcError> {
    let mut acc: i64 = ops.sub("Term", &[])?;
    let tail = ops.many(TokenSet::of::<Calc>(&[Plus, Minus]), |ops| {
        let sign = if ops.eat(Plus).is_some() {
            1
        } else {
            ops.consume(Minus)?;
            -1
        };
        let rhs: i64 = ops.sub("Term", &[])?;
        Ok(sign * rhs)
    })?;
    acc += tail.iter().sum::<i64>();
    Ok(acc.into())
}

fn term(ops: &mut CalcOps<'_>, _: &[bool]) -> Result<CalcValue, CalcError> {
    let first: i64 = ops.sub("Atom", &[])?;
    let rest = ops.many(Star, |ops| {
        ops.consume(Star)?;
        ops.sub::<i64>("Atom", &[])
    })?;
    Ok(rest.iter().fold(first, |acc, n| acc * n).into())
}

fn atom(ops: &mut CalcOps<'_>, _: &[bool]) -> Result<CalcValue, CalcError> {
    ops.alternate(&[
        Alt::rule("Number"),
        Alt::rule("Variable"),
        Alt::rule("Group"),
        Alt::rule("Negative").gate(|ops| ops.gate(|ctx| ctx.negatives_allowed)),
    ])
}

fn number(ops: &mut CalcOps<'_>, _: &[bool]) -> Result<CalcValue, CalcError> {
    let token = ops.consume(Num)?;
    let n = ops.text(&token).parse::<i64>().unwrap_or_default();
    Ok(n.into())
}

fn variable(ops: &mut CalcOps<'_>, _: &[bool]) -> Result<CalcValue, CalcError> {
    let token = ops.consume(Ident)?;
    let name = ops.text(&token);
    let found = ops.gate(|ctx| ctx.bindings.iter().any(|(n, _)| n == name));
    if !found {
        return Err(CalcError::Unbound(name.to_string()));
    }
    let value = ops.action(|ctx| {
        ctx.bindings
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map_or(0, |(_, v)| *v)
    });
    Ok(value.into())
}

fn group(ops: &mut CalcOps<'_>, _: &[bool]) -> Result<CalcValue, CalcError> {
    ops.consume(ParenOpen)?;
    let inner = ops.subrule("Expr", &[])?;
    ops.consume(ParenClose)?;
    Ok(inner)
}

fn negative(ops: &mut CalcOps<'_>, _: &[bool]) -> Result<CalcValue, CalcError> {
    ops.consume(Minus)?;
    let n: i64 = ops.sub("Atom", &[])?;
    Ok((-n).into())
}

pub fn calc_rules() -> Vec<Rule<Calc>> {
    vec![
        Rule::new("Program", seq([many(rule("Let")), rule("Expr")]), program),
        Rule::new(
            "Let",
            seq([tok(Let), tok(Ident), tok(Eq), rule("Expr"), tok(Comma)]),
            let_binding,
        ),
        Rule::new(
            "Expr",
            seq([
                rule("Term"),
                many(seq([alt([tok(Plus), tok(Minus)]), rule("Term")])),
            ]),
            expr,
        ),
        Rule::new(
            "Term",
            seq([rule("Atom"), many(seq([tok(Star), rule("Atom")]))]),
            term,
        ),
        Rule::new(
            "Atom",
            alt([
                rule("Number"),
                rule("Variable"),
                rule("Group"),
                gated(rule("Negative")),
            ]),
            atom,
        ),
        Rule::new("Number", tok(Num), number),
        Rule::new("Variable", tok(Ident), variable),
        Rule::new(
            "Group",
            seq([tok(ParenOpen), rule("Expr"), tok(ParenClose)]),
            group,
        ),
        Rule::new("Negative", seq([tok(Minus), rule("Atom")]), negative),
    ]
}

pub fn calc_registry() -> Registry<Calc> {
    Registry::create(calc_rules())
        .and_then(|r| r.entries(&["Program"]))
        .unwrap()
}

pub fn calc_parser() -> Parser<Calc> {
    calc_registry()
        .consume_to_parser(vocabulary(), CalcContext::default)
        .unwrap()
}

pub fn eval(parser: &Parser<Calc>, source: &str) -> Result<i64, CalcError> {
    let tokens = lex(source);
    match parser.parse("Program", source, &tokens)? {
        CalcValue::Num(n) => Ok(n),
        CalcValue::Unit => Ok(0),
    }
}
