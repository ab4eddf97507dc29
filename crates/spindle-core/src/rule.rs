use std::fmt;
use std::sync::Arc;

use crate::Language;
use crate::parser::Ops;
use crate::shape::Shape;

/// Value-producing implementation of a rule.
///
/// The slice carries positional parameters, so one body can serve two related
/// productions (e.g. the path and non-path variants of a triple pattern).
pub type RuleBody<L> = Arc<
    dyn Fn(&mut Ops<'_, L>, &[bool]) -> Result<<L as Language>::Value, <L as Language>::Error>
        + Send
        + Sync,
>;

/// Named grammar production plus its implementation.
pub struct Rule<L: Language> {
    pub(crate) name: &'static str,
    pub(crate) shape: Shape<L::Kind>,
    pub(crate) body: RuleBody<L>,
}

impl<L: Language> Rule<L> {
    pub fn new<F>(name: &'static str, shape: Shape<L::Kind>, body: F) -> Self
    where
        F: Fn(&mut Ops<'_, L>, &[bool]) -> Result<L::Value, L::Error> + Send + Sync + 'static,
    {
        Self {
            name,
            shape,
            body: Arc::new(body),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn shape(&self) -> &Shape<L::Kind> {
        &self.shape
    }
}

impl<L: Language> Clone for Rule<L> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            shape: self.shape.clone(),
            body: Arc::clone(&self.body),
        }
    }
}

impl<L: Language> fmt::Debug for Rule<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("shape", &self.shape)
            .finish_non_exhaustive()
    }
}
