//! Linked parser and the operations rule bodies run against.
//!
//! Execution is single-threaded, ordered-choice recursive descent. Rule bodies get an
//! [`Ops`] handle over the token stream and the per-parse context; values are built
//! inline during the one top-down pass. There is no backtracking past a committed
//! alternative and no error recovery: the first failure aborts the parse.

use std::collections::HashMap;

use indexmap::{IndexMap, IndexSet};
use rowan::{TextRange, TextSize};

use crate::analysis::Analysis;
use crate::rule::RuleBody;
use crate::{EngineError, Language, Rule, Token, TokenSet, token_text};

const DEFAULT_EXEC_FUEL: u32 = 1_000_000;
const DEFAULT_MAX_DEPTH: u32 = 256;

/// Index of a rule in a linked parser's dispatch table.
pub type RuleId = usize;

/// Resource limits applied to every parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserConfig {
    /// Rule calls, loop iterations and consumed tokens allowed per parse.
    /// `None` disables the limit.
    pub exec_fuel: Option<u32>,
    /// Maximum nesting of rule calls. The default fits a 2 MiB thread stack.
    pub max_depth: u32,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            exec_fuel: Some(DEFAULT_EXEC_FUEL),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ParserConfig {
    pub fn with_exec_fuel(mut self, fuel: Option<u32>) -> Self {
        self.exec_fuel = fuel;
        self
    }

    pub fn with_max_depth(mut self, depth: u32) -> Self {
        self.max_depth = depth;
        self
    }
}

struct LinkedRule<L: Language> {
    name: &'static str,
    body: RuleBody<L>,
    /// Rules this one may call, resolved at link time.
    refs: Box<[(&'static str, RuleId)]>,
    first: TokenSet,
    nullable: bool,
}

/// Immutable, linked rule catalog. Safe to share across threads and reuse for
/// any number of independent parses.
pub struct Parser<L: Language> {
    rules: Vec<LinkedRule<L>>,
    index: IndexMap<&'static str, RuleId>,
    entries: Vec<RuleId>,
    kind_names: HashMap<u16, String>,
    context: Box<dyn Fn() -> L::Context + Send + Sync>,
    config: ParserConfig,
}

impl<L: Language> Parser<L> {
    pub(crate) fn link(
        rules: IndexMap<&'static str, Rule<L>>,
        entries: IndexSet<&'static str>,
        analysis: Analysis,
        context: Box<dyn Fn() -> L::Context + Send + Sync>,
        config: ParserConfig,
    ) -> Self {
        let index: IndexMap<&'static str, RuleId> = rules
            .keys()
            .enumerate()
            .map(|(id, &name)| (name, id))
            .collect();

        let mut kind_names = HashMap::new();
        let linked = rules
            .into_values()
            .map(|rule| {
                for kind in rule.shape.tokens() {
                    kind_names
                        .entry(L::kind_to_raw(kind))
                        .or_insert_with(|| kind.to_string());
                }
                // Analysis already rejected unresolved references.
                let refs = rule
                    .shape
                    .refs()
                    .into_iter()
                    .filter_map(|target| index.get(target).map(|&id| (target, id)))
                    .collect();
                LinkedRule {
                    name: rule.name,
                    first: analysis.first.get(rule.name).copied().unwrap_or_default(),
                    nullable: analysis.nullable.get(rule.name).copied().unwrap_or(false),
                    body: rule.body,
                    refs,
                }
            })
            .collect();

        let entries = entries.iter().filter_map(|name| index.get(name).copied()).collect();

        Self {
            rules: linked,
            index,
            entries,
            kind_names,
            context,
            config,
        }
    }

    pub fn with_config(mut self, config: ParserConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> ParserConfig {
        self.config
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub fn rule_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(|r| r.name)
    }

    pub fn entry_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|&id| self.rules[id].name)
    }

    pub fn first_set(&self, rule: &str) -> Option<TokenSet> {
        self.index.get(rule).map(|&id| self.rules[id].first)
    }

    pub fn is_nullable(&self, rule: &str) -> Option<bool> {
        self.index.get(rule).map(|&id| self.rules[id].nullable)
    }

    /// Fresh context from the factory supplied at link time.
    pub fn new_context(&self) -> L::Context {
        (self.context)()
    }

    pub fn parse(
        &self,
        entry: &str,
        source: &str,
        tokens: &[Token<L::Kind>],
    ) -> Result<L::Value, L::Error> {
        let mut ctx = self.new_context();
        self.parse_with(entry, source, tokens, &mut ctx)
    }

    /// Parses with a caller-owned context, e.g. one seeded with a base IRI.
    /// The whole token stream must be consumed.
    pub fn parse_with(
        &self,
        entry: &str,
        source: &str,
        tokens: &[Token<L::Kind>],
        ctx: &mut L::Context,
    ) -> Result<L::Value, L::Error> {
        let Some(&id) = self.index.get(entry).filter(|id| self.entries.contains(*id)) else {
            return Err(EngineError::UnknownEntry(entry.to_string()).into());
        };

        let mut ops = Ops {
            parser: self,
            source,
            tokens,
            pos: 0,
            ctx,
            current: id,
            depth: 0,
            fuel: self.config.exec_fuel,
        };

        let value = ops.call(id, &[])?;
        if !ops.at_eof() {
            return Err(ops.unexpected("end of input"));
        }
        Ok(value)
    }

    /// Kinds sharing a display name are listed once.
    fn describe_set(&self, set: TokenSet) -> String {
        let names: IndexSet<String> = set
            .iter_raw()
            .map(|raw| {
                self.kind_names
                    .get(&raw)
                    .cloned()
                    .unwrap_or_else(|| raw.to_string())
            })
            .collect();
        let names: Vec<String> = names.into_iter().collect();
        match names.as_slice() {
            [] => "end of input".to_string(),
            [one] => one.clone(),
            _ => format!("one of {}", names.join(", ")),
        }
    }
}

/// What decides whether an optional or repeated part is entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookahead<K> {
    Token(K),
    Set(TokenSet),
    /// FIRST set of a rule the current rule's shape declares.
    Rule(&'static str),
}

impl<K> From<TokenSet> for Lookahead<K> {
    fn from(set: TokenSet) -> Self {
        Lookahead::Set(set)
    }
}

/// One branch of an ordered choice.
pub struct Alt<'r, L: Language> {
    rule: &'static str,
    args: &'r [bool],
    gate: Option<fn(&Ops<'_, L>) -> bool>,
}

impl<'r, L: Language> Alt<'r, L> {
    pub fn rule(rule: &'static str) -> Self {
        Self {
            rule,
            args: &[],
            gate: None,
        }
    }

    pub fn args(mut self, args: &'r [bool]) -> Self {
        self.args = args;
        self
    }

    /// Branch is only considered when the predicate holds.
    pub fn gate(mut self, gate: fn(&Ops<'_, L>) -> bool) -> Self {
        self.gate = Some(gate);
        self
    }
}

/// Operations available to a rule body during one parse.
pub struct Ops<'a, L: Language> {
    parser: &'a Parser<L>,
    source: &'a str,
    tokens: &'a [Token<L::Kind>],
    pos: usize,
    ctx: &'a mut L::Context,
    current: RuleId,
    depth: u32,
    fuel: Option<u32>,
}

impl<'a, L: Language> Ops<'a, L> {
    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn peek(&self) -> L::Kind {
        self.peek_nth(0)
    }

    /// LL(k) lookahead.
    pub fn peek_nth(&self, n: usize) -> L::Kind {
        self.tokens.get(self.pos + n).map_or(L::EOF, |t| t.kind)
    }

    pub fn at(&self, kind: L::Kind) -> bool {
        self.peek() == kind
    }

    pub fn at_any(&self, set: TokenSet) -> bool {
        set.contains::<L>(self.peek())
    }

    pub fn at_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Span of the next token, or an empty range at the end of input.
    pub fn span(&self) -> TextRange {
        self.tokens
            .get(self.pos)
            .map_or_else(|| TextRange::empty(self.eof_offset()), |t| t.span)
    }

    /// Span of the most recently consumed token.
    pub fn prev_span(&self) -> TextRange {
        match self.pos.checked_sub(1).and_then(|i| self.tokens.get(i)) {
            Some(token) => token.span,
            None => TextRange::empty(TextSize::from(0)),
        }
    }

    /// Position marker for spanning a whole construct with [`Ops::span_from`].
    pub fn mark(&self) -> TextSize {
        self.span().start()
    }

    pub fn span_from(&self, start: TextSize) -> TextRange {
        let end = self.prev_span().end().max(start);
        TextRange::new(start, end)
    }

    pub fn text(&self, token: &Token<L::Kind>) -> &'a str {
        token_text(self.source, token)
    }

    fn eof_offset(&self) -> TextSize {
        TextSize::from(self.source.len() as u32)
    }

    fn burn(&mut self) -> Result<(), L::Error> {
        if let Some(remaining) = self.fuel.as_mut() {
            if *remaining == 0 {
                return Err(EngineError::ExecFuelExhausted.into());
            }
            *remaining -= 1;
        }
        Ok(())
    }

    fn bump(&mut self) -> Token<L::Kind> {
        let token = self.tokens[self.pos];
        self.pos += 1;
        token
    }

    pub fn consume(&mut self, kind: L::Kind) -> Result<Token<L::Kind>, L::Error> {
        if self.at_eof() || !self.at(kind) {
            return Err(self.unexpected(kind.to_string()));
        }
        self.burn()?;
        Ok(self.bump())
    }

    /// Consumes any token from `set`.
    pub fn consume_any(&mut self, set: TokenSet) -> Result<Token<L::Kind>, L::Error> {
        if self.at_eof() || !self.at_any(set) {
            return Err(self.unexpected(self.parser.describe_set(set)));
        }
        self.burn()?;
        Ok(self.bump())
    }

    pub fn eat(&mut self, kind: L::Kind) -> Option<Token<L::Kind>> {
        if !self.at_eof() && self.at(kind) {
            Some(self.bump())
        } else {
            None
        }
    }

    pub fn matches(&self, lookahead: Lookahead<L::Kind>) -> bool {
        match lookahead {
            Lookahead::Token(kind) => self.at(kind),
            Lookahead::Set(set) => self.at_any(set),
            Lookahead::Rule(name) => self.starts(name),
        }
    }

    fn describe(&self, lookahead: Lookahead<L::Kind>) -> String {
        match lookahead {
            Lookahead::Token(kind) => kind.to_string(),
            Lookahead::Set(set) => self.parser.describe_set(set),
            Lookahead::Rule(name) => self
                .parser
                .first_set(name)
                .map_or_else(|| name.to_string(), |set| self.parser.describe_set(set)),
        }
    }

    /// Does the next token start `rule`?
    pub fn starts(&self, rule: &str) -> bool {
        self.parser
            .index
            .get(rule)
            .is_some_and(|&id| self.rules_first(id).contains::<L>(self.peek()))
    }

    fn rules_first(&self, id: RuleId) -> TokenSet {
        self.parser.rules[id].first
    }

    /// Runs `f` zero or one time.
    pub fn option<T>(
        &mut self,
        lookahead: impl Into<Lookahead<L::Kind>>,
        f: impl FnOnce(&mut Self) -> Result<T, L::Error>,
    ) -> Result<Option<T>, L::Error> {
        if self.matches(lookahead.into()) {
            f(self).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Runs `f` while the lookahead matches.
    pub fn many<T>(
        &mut self,
        lookahead: impl Into<Lookahead<L::Kind>>,
        mut f: impl FnMut(&mut Self) -> Result<T, L::Error>,
    ) -> Result<Vec<T>, L::Error> {
        let lookahead = lookahead.into();
        let mut out = Vec::new();
        while self.matches(lookahead) {
            self.burn()?;
            let before = self.pos;
            out.push(f(self)?);
            if self.pos == before {
                break;
            }
        }
        Ok(out)
    }

    /// Like [`Ops::many`], but the first iteration is mandatory.
    pub fn at_least_one<T>(
        &mut self,
        lookahead: impl Into<Lookahead<L::Kind>>,
        f: impl FnMut(&mut Self) -> Result<T, L::Error>,
    ) -> Result<Vec<T>, L::Error> {
        let lookahead = lookahead.into();
        if !self.matches(lookahead) {
            return Err(self.unexpected(self.describe(lookahead)));
        }
        self.many(lookahead, f)
    }

    /// `(f (sep f)*)?`
    pub fn many_sep<T>(
        &mut self,
        lookahead: impl Into<Lookahead<L::Kind>>,
        sep: L::Kind,
        f: impl FnMut(&mut Self) -> Result<T, L::Error>,
    ) -> Result<Vec<T>, L::Error> {
        if self.matches(lookahead.into()) {
            self.at_least_one_sep(sep, f)
        } else {
            Ok(Vec::new())
        }
    }

    /// `f (sep f)*`
    pub fn at_least_one_sep<T>(
        &mut self,
        sep: L::Kind,
        mut f: impl FnMut(&mut Self) -> Result<T, L::Error>,
    ) -> Result<Vec<T>, L::Error> {
        let mut out = vec![f(self)?];
        while self.eat(sep).is_some() {
            self.burn()?;
            out.push(f(self)?);
        }
        Ok(out)
    }

    fn resolve(&self, name: &str) -> Result<RuleId, L::Error> {
        let rule = &self.parser.rules[self.current];
        rule.refs
            .iter()
            .find(|(target, _)| *target == name)
            .map(|&(_, id)| id)
            .ok_or_else(|| {
                EngineError::UndeclaredRule {
                    caller: rule.name.to_string(),
                    callee: name.to_string(),
                }
                .into()
            })
    }

    fn call(&mut self, id: RuleId, args: &[bool]) -> Result<L::Value, L::Error> {
        self.burn()?;
        if self.depth >= self.parser.config.max_depth {
            return Err(EngineError::RecursionLimitExceeded.into());
        }

        let parser = self.parser;
        let rule = &parser.rules[id];
        tracing::trace!(rule = rule.name, pos = self.pos, "enter rule");

        let caller = std::mem::replace(&mut self.current, id);
        self.depth += 1;
        let result = (rule.body)(self, args);
        self.depth -= 1;
        self.current = caller;
        result
    }

    /// Invokes a named rule declared by the current rule's shape.
    pub fn subrule(&mut self, name: &str, args: &[bool]) -> Result<L::Value, L::Error> {
        let id = self.resolve(name)?;
        self.call(id, args)
    }

    /// [`Ops::subrule`] plus conversion of the produced value.
    pub fn sub<T>(&mut self, name: &'static str, args: &[bool]) -> Result<T, L::Error>
    where
        T: TryFrom<L::Value>,
    {
        let value = self.subrule(name, args)?;
        T::try_from(value).map_err(|_| {
            EngineError::ValueMismatch {
                rule: name.to_string(),
                expected: std::any::type_name::<T>(),
            }
            .into()
        })
    }

    /// Ordered choice: commits to the first branch whose gate holds and whose
    /// FIRST set contains the next token (or which can match empty input).
    pub fn alternate(&mut self, alts: &[Alt<'_, L>]) -> Result<L::Value, L::Error> {
        let mut expected = TokenSet::EMPTY;
        for alt in alts {
            if let Some(gate) = alt.gate
                && !gate(self)
            {
                continue;
            }
            let id = self.resolve(alt.rule)?;
            let linked = &self.parser.rules[id];
            if linked.first.contains::<L>(self.peek()) || linked.nullable {
                return self.call(id, alt.args);
            }
            expected = expected.union(linked.first);
        }
        Err(self.unexpected(self.parser.describe_set(expected)))
    }

    /// Runs a context effect immediately, inline with the traversal.
    pub fn action<R>(&mut self, f: impl FnOnce(&mut L::Context) -> R) -> R {
        f(&mut *self.ctx)
    }

    /// Evaluates a predicate over the context without mutating it.
    pub fn gate(&self, pred: impl FnOnce(&L::Context) -> bool) -> bool {
        pred(&*self.ctx)
    }

    pub fn context(&self) -> &L::Context {
        &*self.ctx
    }

    pub fn context_mut(&mut self) -> &mut L::Context {
        &mut *self.ctx
    }

    /// "Unexpected token" error naming what the lookahead would have accepted.
    pub fn expected(&self, lookahead: impl Into<Lookahead<L::Kind>>) -> L::Error {
        self.unexpected(self.describe(lookahead.into()))
    }

    /// "Unexpected token" error at the next token.
    pub fn unexpected(&self, expected: impl Into<String>) -> L::Error {
        let found = match self.tokens.get(self.pos) {
            Some(token) => format!("`{}`", self.text(token)),
            None => "end of input".to_string(),
        };
        EngineError::UnexpectedToken {
            expected: expected.into(),
            found,
            range: self.span(),
        }
        .into()
    }
}
