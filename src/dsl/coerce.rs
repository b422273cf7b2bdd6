//! Coercion and set logic shared by comparisons and set tests.
//!
//! A literal is always text. It is compared against a record value by first
//! trying a numeric reading of both sides, then falling back to exact string
//! equality. Two numbers are equal when they differ by less than [`EPSILON`];
//! ordering is exact. Ordering against a non-numeric operand is `false`.

use std::cmp::Ordering;

use super::ast::{CompareOp, Literal, SetOp};
use crate::record::{Scalar, Shape};

/// Tolerance for numeric equality. Absorbs float rounding noise such as
/// `10.00000000001` vs `10.0`, but not `10.00001` vs `10.0`.
pub const EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }
}

/// Numeric reading of text; NaN counts as non-numeric.
fn parse_number(text: &str) -> Option<Number> {
    if let Ok(i) = text.parse::<i64>() {
        return Some(Number::Int(i));
    }
    match text.parse::<f64>() {
        Ok(f) if !f.is_nan() => Some(Number::Float(f)),
        _ => None,
    }
}

fn scalar_number(value: Scalar<'_>) -> Option<Number> {
    match value {
        Scalar::Int(i) => Some(Number::Int(i)),
        Scalar::Float(f) if !f.is_nan() => Some(Number::Float(f)),
        Scalar::Float(_) => None,
        Scalar::Str(s) => parse_number(s),
    }
}

fn numbers_equal(left: Number, right: Number) -> bool {
    match (left, right) {
        (Number::Int(l), Number::Int(r)) => l == r,
        _ => {
            let (l, r) = (left.as_f64(), right.as_f64());
            l == r || (l - r).abs() < EPSILON
        }
    }
}

fn numbers_cmp(left: Number, right: Number) -> Option<Ordering> {
    match (left, right) {
        (Number::Int(l), Number::Int(r)) => Some(l.cmp(&r)),
        _ => left.as_f64().partial_cmp(&right.as_f64()),
    }
}

fn text_equal(value: Scalar<'_>, literal: &str) -> bool {
    match value {
        Scalar::Str(s) => s == literal,
        Scalar::Int(i) => i.to_string() == literal,
        Scalar::Float(f) => f.to_string() == literal,
    }
}

/// Coerced equality between a record scalar and a literal's text.
pub fn scalar_equals(value: Scalar<'_>, literal: &str) -> bool {
    match (scalar_number(value), parse_number(literal)) {
        (Some(l), Some(r)) => numbers_equal(l, r),
        _ => text_equal(value, literal),
    }
}

/// Apply a comparison operator between a record scalar and a literal's text.
pub fn compare_scalar(value: Scalar<'_>, op: CompareOp, literal: &str) -> bool {
    let (left, right) = match (scalar_number(value), parse_number(literal)) {
        (Some(l), Some(r)) => (l, r),
        _ => {
            return match op {
                CompareOp::Eq => text_equal(value, literal),
                CompareOp::Ne => !text_equal(value, literal),
                CompareOp::Lt | CompareOp::Le | CompareOp::Gt | CompareOp::Ge => false,
            };
        }
    };

    match op {
        CompareOp::Eq => numbers_equal(left, right),
        CompareOp::Ne => !numbers_equal(left, right),
        CompareOp::Lt => numbers_cmp(left, right) == Some(Ordering::Less),
        CompareOp::Le => matches!(
            numbers_cmp(left, right),
            Some(Ordering::Less | Ordering::Equal)
        ),
        CompareOp::Gt => numbers_cmp(left, right) == Some(Ordering::Greater),
        CompareOp::Ge => matches!(
            numbers_cmp(left, right),
            Some(Ordering::Greater | Ordering::Equal)
        ),
    }
}

/// Apply a comparison operator to a whole field value. A list field satisfies
/// a comparison when any of its elements does.
pub fn compare_value(value: Shape<'_>, op: CompareOp, literal: &str) -> bool {
    match value {
        Shape::Scalar(scalar) => compare_scalar(scalar, op, literal),
        Shape::List(list) => list.iter().any(|item| compare_scalar(item, op, literal)),
    }
}

fn is_member(value: Scalar<'_>, literals: &[Literal]) -> bool {
    literals
        .iter()
        .any(|literal| scalar_equals(value, &literal.text))
}

/// Apply a set operator.
///
/// For a scalar, `in` and `∩` both test membership. For a list, `in` asks
/// whether every element is in the literal set (subset) and `∩` whether at
/// least one is (overlap). The negated forms are the plain negation.
pub fn set_test(value: Shape<'_>, op: SetOp, literals: &[Literal]) -> bool {
    let holds = match (value, op) {
        (Shape::Scalar(scalar), _) => is_member(scalar, literals),
        (Shape::List(list), SetOp::In | SetOp::NotIn) => {
            list.iter().all(|item| is_member(item, literals))
        }
        (Shape::List(list), SetOp::Intersects | SetOp::NotIntersects) => {
            list.iter().any(|item| is_member(item, literals))
        }
    };

    if op.is_negated() { !holds } else { holds }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::FieldValue;

    fn lits(items: &[&str]) -> Vec<Literal> {
        items.iter().map(|s| Literal::bare(*s)).collect()
    }

    #[test]
    fn test_numeric_equality_across_kinds() {
        assert!(scalar_equals(Scalar::Int(10), "10"));
        assert!(scalar_equals(Scalar::Float(10.0), "10"));
        assert!(scalar_equals(Scalar::Str("10"), "10.0"));
        assert!(!scalar_equals(Scalar::Int(9), "10"));
    }

    #[test]
    fn test_equality_tolerance() {
        assert!(scalar_equals(Scalar::Float(10.0), "10.00000000001"));
        assert!(!scalar_equals(Scalar::Float(10.0), "10.00001"));
        assert!(scalar_equals(Scalar::Float(2.000000000000001), "2"));
    }

    #[test]
    fn test_large_integers_compare_exactly() {
        let big = 9_007_199_254_740_993i64;
        assert!(scalar_equals(Scalar::Int(big), "9007199254740993"));
        assert!(!scalar_equals(Scalar::Int(big), "9007199254740992"));
    }

    #[test]
    fn test_string_fallback_is_exact() {
        assert!(scalar_equals(Scalar::Str("boy"), "boy"));
        assert!(!scalar_equals(Scalar::Str("Boy"), "boy"));
        assert!(!scalar_equals(Scalar::Int(5), "five"));
    }

    #[test]
    fn test_ordering_is_exact() {
        assert!(compare_scalar(Scalar::Float(10.0), CompareOp::Ge, "10"));
        assert!(!compare_scalar(Scalar::Float(10.0), CompareOp::Gt, "10"));
        assert!(compare_scalar(
            Scalar::Float(10.0),
            CompareOp::Gt,
            "9.99999999999"
        ));
        assert!(compare_scalar(Scalar::Str("00"), CompareOp::Le, "10"));
    }

    #[test]
    fn test_ordering_against_text_is_false() {
        for op in [CompareOp::Lt, CompareOp::Le, CompareOp::Gt, CompareOp::Ge] {
            assert!(!compare_scalar(Scalar::Str("abc"), op, "abd"));
            assert!(!compare_scalar(Scalar::Int(3), op, "abc"));
        }
        assert!(compare_scalar(Scalar::Str("abc"), CompareOp::Ne, "abd"));
    }

    #[test]
    fn test_nan_is_not_numeric() {
        assert!(scalar_equals(Scalar::Str("NaN"), "NaN"));
        assert!(!compare_scalar(Scalar::Str("NaN"), CompareOp::Lt, "1"));
    }

    #[test]
    fn test_subset_and_overlap_diverge_for_lists() {
        let value = FieldValue::from(vec![2i64, 3]);
        let small = lits(&["1", "2", "10"]);
        let large = lits(&["1", "2", "3", "10"]);

        assert!(!set_test(value.shape(), SetOp::In, &small));
        assert!(set_test(value.shape(), SetOp::NotIn, &small));
        assert!(set_test(value.shape(), SetOp::Intersects, &small));
        assert!(!set_test(value.shape(), SetOp::NotIntersects, &small));

        assert!(set_test(value.shape(), SetOp::In, &large));
        assert!(set_test(value.shape(), SetOp::Intersects, &large));
    }

    #[test]
    fn test_scalar_membership_is_the_same_for_in_and_intersects() {
        let value = FieldValue::from("c");
        let set = lits(&["a", "b", "c"]);
        assert!(set_test(value.shape(), SetOp::In, &set));
        assert!(set_test(value.shape(), SetOp::Intersects, &set));
        assert!(!set_test(value.shape(), SetOp::NotIn, &set));
        assert!(!set_test(value.shape(), SetOp::NotIntersects, &set));
    }

    #[test]
    fn test_empty_list_field() {
        let value = FieldValue::IntList(Vec::new());
        let set = lits(&["1"]);
        assert!(set_test(value.shape(), SetOp::In, &set));
        assert!(!set_test(value.shape(), SetOp::Intersects, &set));
    }

    #[test]
    fn test_comparison_on_list_matches_any_element() {
        let value = FieldValue::from(vec![1i64, 5]);
        assert!(compare_value(value.shape(), CompareOp::Eq, "5"));
        assert!(!compare_value(value.shape(), CompareOp::Gt, "5"));
    }
}
