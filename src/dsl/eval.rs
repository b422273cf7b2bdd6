//! Evaluator for the filter DSL AST.

use super::ast::Expr;
use super::coerce::{compare_value, set_test};
use super::parser::{ParseError, parse};
use crate::record::Record;

/// Evaluate an expression against a record.
///
/// Never fails. A comparison on a field the record lacks is `false`, negated
/// operators included, and an absent record fails every comparison.
pub fn evaluate(expr: &Expr, record: Option<&Record>) -> bool {
    match record {
        Some(record) => evaluate_record(expr, record),
        None => false,
    }
}

fn evaluate_record(expr: &Expr, record: &Record) -> bool {
    match expr {
        Expr::And(left, right) => evaluate_record(left, record) && evaluate_record(right, record),

        Expr::Or(left, right) => evaluate_record(left, record) || evaluate_record(right, record),

        Expr::Compare { field, op, literal } => match record.get(field) {
            None => false,
            Some(value) => compare_value(value.shape(), *op, &literal.text),
        },

        Expr::SetTest {
            field,
            op,
            literals,
        } => match record.get(field) {
            None => false,
            Some(value) => set_test(value.shape(), *op, literals),
        },
    }
}

/// Parse `predicate` and evaluate it against `record` in one step.
pub fn matches(predicate: &str, record: Option<&Record>) -> Result<bool, ParseError> {
    let expr = parse(predicate)?;
    Ok(evaluate(&expr, record))
}
