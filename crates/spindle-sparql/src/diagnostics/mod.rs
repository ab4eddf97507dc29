//! Parse-time diagnostics.
//!
//! A parse stops at its first error, so there is exactly one [`Diagnostic`] per
//! failed parse. Its kind selects the message template and the default hint.

mod message;
mod printer;


use rowan::TextRange;
use serde::{Serialize, Serializer};

pub use message::{DiagnosticKind, RelatedInfo};
pub use printer::DiagnosticPrinter;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub(crate) kind: DiagnosticKind,
    #[serde(serialize_with = "serialize_text_range")]
    pub(crate) range: TextRange,
    pub(crate) message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) related: Vec<RelatedInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) hint: Option<String>,
}

pub(crate) fn serialize_text_range<S: Serializer>(
    range: &TextRange,
    s: S,
) -> Result<S::Ok, S::Error> {
    use serde::ser::SerializeStruct;
    let mut state = s.serialize_struct("TextRange", 2)?;
    state.serialize_field("start", &u32::from(range.start()))?;
    state.serialize_field("end", &u32::from(range.end()))?;
    state.end()
}

impl Diagnostic {
    /// Diagnostic with the kind's default message and hint.
    pub fn new(kind: DiagnosticKind, range: TextRange) -> Self {
        Self {
            kind,
            range,
            message: kind.fallback_message().to_string(),
            related: Vec::new(),
            hint: kind.default_hint().map(str::to_string),
        }
    }

    /// Provide custom detail for this diagnostic, rendered using the kind's template.
    pub fn message(mut self, detail: impl AsRef<str>) -> Self {
        self.message = self.kind.message(Some(detail.as_ref()));
        self
    }

    pub fn related_to(mut self, msg: impl Into<String>, range: TextRange) -> Self {
        self.related.push(RelatedInfo::new(range, msg));
        self
    }

    pub fn hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn kind(&self) -> DiagnosticKind {
        self.kind
    }

    pub fn range(&self) -> TextRange {
        self.range
    }

    pub fn text(&self) -> &str {
        &self.message
    }

    pub fn related(&self) -> &[RelatedInfo] {
        &self.related
    }

    pub fn hint_text(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    pub fn printer(&self) -> DiagnosticPrinter<'_, '_> {
        DiagnosticPrinter::new(self)
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "error at {}..{}: {}",
            u32::from(self.range.start()),
            u32::from(self.range.end()),
            self.message
        )?;
        for related in &self.related {
            write!(
                f,
                " (related: {} at {}..{})",
                related.message,
                u32::from(related.range.start()),
                u32::from(related.range.end())
            )?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " (hint: {})", hint)?;
        }
        Ok(())
    }
}

impl std::error::Error for Diagnostic {}
