use rowan::TextRange;

/// Failures raised while composing or linking a rule catalog.
///
/// All of these surface before any input is parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompositionError {
    #[error("duplicate rule name `{0}`")]
    DuplicateRule(String),

    #[error("rule not found: `{0}`")]
    RuleNotFound(String),

    #[error("ambiguous rule `{0}` defined by both registries, supply an override")]
    AmbiguousMerge(String),

    #[error("rule `{rule}` references undefined rule `{target}`")]
    UnresolvedRule { rule: String, target: String },

    #[error("rule `{rule}` uses token `{token}` outside the vocabulary")]
    UnknownToken { rule: String, token: String },

    #[error("grammar declares no entry rule")]
    NoEntryRule,

    #[error("rule `{0}` is unreachable from every entry rule")]
    UnreachableRule(String),

    #[error("left recursion: {}", .chain.join(" -> "))]
    LeftRecursion { chain: Vec<String> },

    #[error("ambiguous alternatives in `{rule}`: branches {first} and {second} both start with {tokens}")]
    AmbiguousAlternatives {
        rule: String,
        first: usize,
        second: usize,
        tokens: String,
    },

    #[error("alternative {index} of `{rule}` can match empty input but is not last")]
    NullableAlternative { rule: String, index: usize },

    #[error("repetition in `{0}` can match empty input")]
    NullableRepetition(String),
}

/// Failures raised by the parse engine itself.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("unexpected {found}, expected {expected}")]
    UnexpectedToken {
        expected: String,
        found: String,
        range: TextRange,
    },

    /// Execution fuel exhausted (too many parser operations).
    #[error("execution limit exceeded")]
    ExecFuelExhausted,

    /// Recursion fuel exhausted (input nested too deeply).
    #[error("recursion limit exceeded")]
    RecursionLimitExceeded,

    #[error("rule `{caller}` calls `{callee}`, which its shape does not declare")]
    UndeclaredRule { caller: String, callee: String },

    #[error("rule `{rule}` did not produce a {expected}")]
    ValueMismatch {
        rule: String,
        expected: &'static str,
    },

    #[error("`{0}` is not an entry rule")]
    UnknownEntry(String),
}
