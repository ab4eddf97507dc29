//! Per-parse state threaded through every rule call.

use std::sync::Arc;

use indexmap::IndexMap;
use oxiri::Iri;
use rowan::TextRange;

use crate::ast::{Prefixes, Term};
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::terms::{TermFactory, resolve_iri};

/// Capabilities of the grammar position currently being parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseMode {
    /// Cleared inside `INSERT DATA` / `DELETE DATA`.
    pub variables_allowed: bool,
    /// Cleared inside `DELETE DATA`, `DELETE WHERE` and delete templates.
    pub blank_nodes_allowed: bool,
    /// Set while parsing SELECT expressions, HAVING and ORDER BY.
    pub aggregates_allowed: bool,
    pub in_aggregate: bool,
}

impl Default for ParseMode {
    fn default() -> Self {
        Self {
            variables_allowed: true,
            blank_nodes_allowed: true,
            aggregates_allowed: false,
            in_aggregate: false,
        }
    }
}

/// Where an explicit blank node label was first seen.
#[derive(Debug, Clone, Copy)]
struct LabelUse {
    scope: u32,
    range: TextRange,
}

#[derive(Debug, Default)]
struct BlankLabels {
    used: IndexMap<String, LabelUse>,
    flushed: IndexMap<String, TextRange>,
    scopes: Vec<u32>,
    next_scope: u32,
}

pub struct ParseContext {
    pub(crate) base_iri: Option<Iri<String>>,
    pub(crate) prefixes: Prefixes,
    pub(crate) factory: Arc<dyn TermFactory>,
    pub(crate) mode: ParseMode,
    strict_blank_node_scope: bool,
    labels: BlankLabels,
}

impl std::fmt::Debug for ParseContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParseContext")
            .field("base_iri", &self.base_iri.as_ref().map(|iri| iri.as_str()))
            .field("prefixes", &self.prefixes)
            .field("mode", &self.mode)
            .field("used_labels", &self.labels.used.keys().collect::<Vec<_>>())
            .field("flushed_labels", &self.labels.flushed.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ParseContext {
    pub fn new(factory: Arc<dyn TermFactory>) -> Self {
        Self {
            base_iri: None,
            prefixes: Prefixes::new(),
            factory,
            mode: ParseMode::default(),
            strict_blank_node_scope: false,
            labels: BlankLabels::default(),
        }
    }

    pub fn with_base_iri(mut self, base: Option<Iri<String>>) -> Self {
        self.base_iri = base;
        self
    }

    pub fn with_prefixes(mut self, prefixes: Prefixes) -> Self {
        self.prefixes = prefixes;
        self
    }

    pub fn with_strict_blank_node_scope(mut self, strict: bool) -> Self {
        self.strict_blank_node_scope = strict;
        self
    }

    pub fn base_iri(&self) -> Option<&str> {
        self.base_iri.as_ref().map(|iri| iri.as_str())
    }

    pub fn prefixes(&self) -> &Prefixes {
        &self.prefixes
    }

    pub fn mode(&self) -> ParseMode {
        self.mode
    }

    /// `BASE <iri>`: later relative IRIs, including later bases, resolve against it.
    pub(crate) fn set_base(&mut self, iri: &str, range: TextRange) -> Result<(), Diagnostic> {
        let resolved = self.resolve_iri(iri, range)?;
        let base = Iri::parse(resolved)
            .map_err(|e| Diagnostic::new(DiagnosticKind::InvalidIri, range).message(e.to_string()))?;
        self.base_iri = Some(base);
        Ok(())
    }

    pub(crate) fn resolve_iri(&self, iri: &str, range: TextRange) -> Result<String, Diagnostic> {
        resolve_iri(self.base_iri.as_ref(), iri)
            .map_err(|e| Diagnostic::new(DiagnosticKind::InvalidIri, range).message(e.to_string()))
    }

    /// Expands `prefix:local` (local name already unescaped).
    pub(crate) fn expand(
        &self,
        prefix: &str,
        local: &str,
        range: TextRange,
    ) -> Result<String, Diagnostic> {
        let Some(namespace) = self.prefixes.get(prefix) else {
            return Err(Diagnostic::new(DiagnosticKind::UnknownPrefix, range).message(prefix));
        };
        Ok(format!("{}{}", namespace, local))
    }

    pub(crate) fn fresh_blank(&self) -> Term {
        self.factory.blank_node(None)
    }

    pub(crate) fn enter_label_scope(&mut self) {
        let id = self.labels.next_scope;
        self.labels.next_scope += 1;
        self.labels.scopes.push(id);
    }

    pub(crate) fn exit_label_scope(&mut self) {
        self.labels.scopes.pop();
    }

    /// Registers one textual occurrence of `_:label`.
    pub(crate) fn use_label(&mut self, label: &str, range: TextRange) -> Result<Term, Diagnostic> {
        let scope = self.labels.scopes.last().copied().unwrap_or(0);

        if self.strict_blank_node_scope
            && let Some(&first) = self.labels.flushed.get(label)
        {
            return Err(duplicate_label(label, range, first));
        }

        match self.labels.used.get(label) {
            Some(seen) if seen.scope != scope => {
                return Err(duplicate_label(label, range, seen.range));
            }
            Some(_) => {}
            None => {
                self.labels
                    .used
                    .insert(label.to_string(), LabelUse { scope, range });
            }
        }
        Ok(self.factory.blank_node(Some(label)))
    }

    /// Operation boundary of an update request.
    pub(crate) fn flush_labels(&mut self) {
        for (label, seen) in self.labels.used.drain(..) {
            self.labels.flushed.entry(label).or_insert(seen.range);
        }
    }
}

fn duplicate_label(label: &str, range: TextRange, first: TextRange) -> Diagnostic {
    Diagnostic::new(DiagnosticKind::DuplicateBlankNodeLabel, range)
        .message(label)
        .related_to("first used here", first)
}
