//! Compiled predicates for repeated evaluation.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use super::ast::Expr;
use super::eval::evaluate;
use super::parser::{ParseError, parse};
use crate::record::Record;

/// A parsed predicate ready for evaluation against many records.
///
/// Cloning is cheap and the tree is read-only, so one filter can be shared
/// across threads.
#[derive(Clone, PartialEq)]
pub struct Filter {
    expr: Arc<Expr>,
    source: String,
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filter")
            .field("source", &self.source)
            .finish()
    }
}

impl Filter {
    /// Compile predicate text into a filter.
    pub fn compile(source: &str) -> Result<Self, ParseError> {
        let expr = parse(source)?;
        Ok(Filter {
            expr: Arc::new(expr),
            source: source.to_string(),
        })
    }

    pub fn matches(&self, record: Option<&Record>) -> bool {
        evaluate(&self.expr, record)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }
}

impl FromStr for Filter {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Filter::compile(s)
    }
}

impl FromStr for Expr {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}
