use rowan::TextRange;
use serde::Serialize;

use super::serialize_text_range;

/// Parse-time diagnostic kinds, grouped roughly by the stage that raises them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum DiagnosticKind {
    // Lexical and syntactic
    UnrecognizedInput,
    UnexpectedToken,
    InvalidInteger,
    InvalidEscape,

    // Term resolution
    InvalidIri,
    UnknownPrefix,

    // Blank node and variable placement
    DuplicateBlankNodeLabel,
    BlankNodeNotAllowed,
    VariableNotAllowed,

    // Scoping and projection
    VariableAlreadyBound,
    WildcardWithGroupBy,
    UngroupedVariable,
    DuplicateProjection,

    // Aggregates
    AggregateNotAllowed,
    NestedAggregate,

    // Inline data
    ValuesArityMismatch,
}

impl DiagnosticKind {
    /// Default hint for this kind, included unless the call site supplies its own.
    pub fn default_hint(&self) -> Option<&'static str> {
        match self {
            Self::UnknownPrefix => Some("declare it with `PREFIX name: <iri>`"),
            Self::AggregateNotAllowed => {
                Some("aggregates may appear in SELECT expressions, HAVING and ORDER BY")
            }
            Self::WildcardWithGroupBy => Some("list the grouped variables explicitly"),
            Self::UngroupedVariable => {
                Some("add it to GROUP BY or wrap it in an aggregate such as `SAMPLE`")
            }
            Self::VariableAlreadyBound => Some("BIND must introduce a fresh variable"),
            _ => None,
        }
    }

    /// Base message for this diagnostic kind, used when no custom message is provided.
    pub fn fallback_message(&self) -> &'static str {
        match self {
            Self::UnrecognizedInput => "unrecognized input",
            Self::UnexpectedToken => "unexpected token",
            Self::InvalidInteger => "invalid integer",
            Self::InvalidEscape => "invalid escape sequence",
            Self::InvalidIri => "invalid IRI",
            Self::UnknownPrefix => "unknown prefix",
            Self::DuplicateBlankNodeLabel => "blank node label is used in another graph pattern",
            Self::BlankNodeNotAllowed => "blank nodes are not allowed here",
            Self::VariableNotAllowed => "variables are not allowed here",
            Self::VariableAlreadyBound => "variable is already in scope",
            Self::WildcardWithGroupBy => "`SELECT *` cannot be combined with GROUP BY",
            Self::UngroupedVariable => "variable is not grouped",
            Self::DuplicateProjection => "variable is already projected",
            Self::AggregateNotAllowed => "aggregate is not allowed here",
            Self::NestedAggregate => "aggregates cannot be nested",
            Self::ValuesArityMismatch => "VALUES row does not match the declared variables",
        }
    }

    /// Template for a custom message. `{}` is replaced by the call-site detail.
    pub fn custom_message(&self) -> String {
        match self {
            Self::UnexpectedToken => "unexpected {}".to_string(),
            Self::UnrecognizedInput => "unrecognized input `{}`".to_string(),
            Self::InvalidEscape => "invalid escape sequence in `{}`".to_string(),
            Self::UnknownPrefix => "prefix `{}` is not declared".to_string(),
            Self::DuplicateBlankNodeLabel => {
                "blank node label `{}` is already used in another graph pattern".to_string()
            }
            Self::VariableNotAllowed => "variable `{}` is not allowed in data blocks".to_string(),
            Self::VariableAlreadyBound => "`{}` is already in scope".to_string(),
            Self::UngroupedVariable => "`{}` is neither grouped nor aggregated".to_string(),
            Self::DuplicateProjection => "`{}` is already projected".to_string(),
            Self::ValuesArityMismatch => "VALUES row has {}".to_string(),

            // Standard pattern: fallback + context
            _ => format!("{}: {{}}", self.fallback_message()),
        }
    }

    /// Render the final message.
    ///
    /// - `None` → returns `fallback_message()`
    /// - `Some(detail)` → returns `custom_message()` with `{}` replaced by detail
    pub fn message(&self, msg: Option<&str>) -> String {
        match msg {
            None => self.fallback_message().to_string(),
            Some(detail) => self.custom_message().replace("{}", detail),
        }
    }
}

/// Secondary location, e.g. where a blank node label was first used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelatedInfo {
    #[serde(serialize_with = "serialize_text_range")]
    pub range: TextRange,
    pub message: String,
}

impl RelatedInfo {
    pub fn new(range: TextRange, message: impl Into<String>) -> Self {
        Self {
            range,
            message: message.into(),
        }
    }
}
