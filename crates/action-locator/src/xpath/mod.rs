//! XPath subset evaluated over a [`UiSnapshot`]
//!
//! Supports element-name steps (short tag or full class), `*`, `.`, `..`,
//! `/` and `//` anywhere, and predicates built from attributes, string
//! literals, numbers, comparisons, `and`/`or`, `not()`, `contains()`,
//! `starts-with()`, `ends-with()`, `text()`, `position()` and `last()`.
//!
//! Positional predicates index the ordered set produced by the step across
//! all context nodes, so `//text[last()]` is the last `text` node in the
//! document.

mod eval;
mod lexer;
mod parser;

use thiserror::Error;
use ui_snapshot::{NodeId, UiSnapshot};

use crate::errors::LocatorError;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum XPathError {
    #[error("expression is empty")]
    Empty,

    #[error("{message} at offset {offset}")]
    Lex { offset: usize, message: String },

    #[error("{0}")]
    Parse(String),

    #[error("unknown function '{0}()'")]
    UnknownFunction(String),

    #[error("{function}() takes {expected} argument(s), got {found}")]
    Arity {
        function: String,
        expected: usize,
        found: usize,
    },
}

/// A compiled XPath expression
#[derive(Debug, Clone, PartialEq)]
pub struct XPath {
    source: String,
    path: parser::Path,
}

impl XPath {
    pub fn compile(expression: &str) -> Result<Self, XPathError> {
        let toks = lexer::tokenize(expression)?;
        let path = parser::parse(toks)?;
        Ok(Self {
            source: expression.to_string(),
            path,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Matching nodes in document order. With a scope, the scope node acts as
    /// the document element.
    pub fn select(&self, snapshot: &UiSnapshot, scope: Option<NodeId>) -> Vec<NodeId> {
        if snapshot.is_empty() {
            return Vec::new();
        }
        let root = scope.unwrap_or_else(|| snapshot.root());
        eval::Evaluator::new(snapshot, root).select(&self.path, scope.is_some())
    }
}

/// Compile and evaluate in one go, reporting malformed expressions as
/// invalid selectors.
pub fn evaluate(
    snapshot: &UiSnapshot,
    expression: &str,
    scope: Option<NodeId>,
) -> Result<Vec<NodeId>, LocatorError> {
    let xpath = XPath::compile(expression).map_err(|err| {
        LocatorError::invalid_selector(format!("xpath selector '{expression}' is malformed: {err}"))
    })?;
    Ok(xpath.select(snapshot, scope))
}
