//! The `ADJUST(expression, expression)` dialect fragment.
//!
//! On its own the fragment only knows its new built-in. Merged into the full
//! grammar, its `BuiltInCall` collides with the standard one; the composition
//! resolves that with an override listing both sets of built-ins.

use super::SparqlRule;
use super::builtins::{BuiltIn, Template, builtin_call, builtin_rule};
use crate::SyntaxKind::KwAdjust;

const ADJUST: BuiltIn = BuiltIn {
    rule: "BuiltInAdjust",
    keyword: KwAdjust,
    operator: "adjust",
    template: Template::Exprs { min: 2, max: 2 },
};

pub fn adjust_rules() -> Vec<SparqlRule> {
    vec![builtin_rule(ADJUST), builtin_call(vec![ADJUST.rule])]
}
