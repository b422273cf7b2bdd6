//! Loosely-typed records that predicates are evaluated against.

use serde_json::{Map, Value};
use std::collections::HashMap;

/// A record: field name to value. Field names are case-sensitive.
pub type Record = HashMap<String, FieldValue>;

/// A field value: a scalar or a homogeneous list of scalars.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Str(String),
    Int(i64),
    Float(f64),
    StrList(Vec<String>),
    IntList(Vec<i64>),
    FloatList(Vec<f64>),
}

/// A borrowed scalar, either a field value or one element of a list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar<'a> {
    Str(&'a str),
    Int(i64),
    Float(f64),
}

/// The shape a value takes when a predicate inspects it.
#[derive(Debug, Clone, Copy)]
pub enum Shape<'a> {
    Scalar(Scalar<'a>),
    List(List<'a>),
}

#[derive(Debug, Clone, Copy)]
pub enum List<'a> {
    Str(&'a [String]),
    Int(&'a [i64]),
    Float(&'a [f64]),
}

impl<'a> List<'a> {
    pub fn len(&self) -> usize {
        match self {
            List::Str(items) => items.len(),
            List::Int(items) => items.len(),
            List::Float(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(self) -> Box<dyn Iterator<Item = Scalar<'a>> + 'a> {
        match self {
            List::Str(items) => Box::new(items.iter().map(|s| Scalar::Str(s.as_str()))),
            List::Int(items) => Box::new(items.iter().copied().map(Scalar::Int)),
            List::Float(items) => Box::new(items.iter().copied().map(Scalar::Float)),
        }
    }
}

impl FieldValue {
    pub fn shape(&self) -> Shape<'_> {
        match self {
            FieldValue::Str(s) => Shape::Scalar(Scalar::Str(s)),
            FieldValue::Int(i) => Shape::Scalar(Scalar::Int(*i)),
            FieldValue::Float(f) => Shape::Scalar(Scalar::Float(*f)),
            FieldValue::StrList(items) => Shape::List(List::Str(items)),
            FieldValue::IntList(items) => Shape::List(List::Int(items)),
            FieldValue::FloatList(items) => Shape::List(List::Float(items)),
        }
    }

    /// Convert a JSON value, or `None` when it has no `FieldValue` form.
    ///
    /// Arrays mixing integers and floats widen to `FloatList`. Booleans, nulls,
    /// objects, and arrays mixing strings with numbers are not representable.
    pub fn from_json(value: &Value) -> Option<FieldValue> {
        match value {
            Value::String(s) => Some(FieldValue::Str(s.clone())),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Some(FieldValue::Int(i)),
                None => n.as_f64().map(FieldValue::Float),
            },
            Value::Array(items) => list_from_json(items),
            Value::Bool(_) | Value::Null | Value::Object(_) => None,
        }
    }
}

fn list_from_json(items: &[Value]) -> Option<FieldValue> {
    if items.is_empty() {
        return Some(FieldValue::StrList(Vec::new()));
    }

    if items.iter().all(Value::is_string) {
        let strings = items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect();
        return Some(FieldValue::StrList(strings));
    }

    if !items.iter().all(Value::is_number) {
        return None;
    }

    let ints: Option<Vec<i64>> = items.iter().map(Value::as_i64).collect();
    match ints {
        Some(ints) => Some(FieldValue::IntList(ints)),
        None => items
            .iter()
            .map(Value::as_f64)
            .collect::<Option<Vec<f64>>>()
            .map(FieldValue::FloatList),
    }
}

/// Build a record from a JSON object, skipping fields with no `FieldValue` form.
pub fn record_from_json(object: &Map<String, Value>) -> Record {
    object
        .iter()
        .filter_map(|(key, value)| FieldValue::from_json(value).map(|v| (key.clone(), v)))
        .collect()
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Str(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Str(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        FieldValue::StrList(value)
    }
}

impl From<Vec<&str>> for FieldValue {
    fn from(value: Vec<&str>) -> Self {
        FieldValue::StrList(value.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<i64>> for FieldValue {
    fn from(value: Vec<i64>) -> Self {
        FieldValue::IntList(value)
    }
}

impl From<Vec<f64>> for FieldValue {
    fn from(value: Vec<f64>) -> Self {
        FieldValue::FloatList(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalars_from_json() {
        assert_eq!(
            FieldValue::from_json(&json!("x")),
            Some(FieldValue::Str("x".into()))
        );
        assert_eq!(FieldValue::from_json(&json!(7)), Some(FieldValue::Int(7)));
        assert_eq!(
            FieldValue::from_json(&json!(2.5)),
            Some(FieldValue::Float(2.5))
        );
    }

    #[test]
    fn test_lists_from_json() {
        assert_eq!(
            FieldValue::from_json(&json!([1, 2])),
            Some(FieldValue::IntList(vec![1, 2]))
        );
        assert_eq!(
            FieldValue::from_json(&json!([1, 2.5])),
            Some(FieldValue::FloatList(vec![1.0, 2.5]))
        );
        assert_eq!(
            FieldValue::from_json(&json!(["a", "b"])),
            Some(FieldValue::StrList(vec!["a".into(), "b".into()]))
        );
        assert_eq!(FieldValue::from_json(&json!(["a", 1])), None);
    }

    #[test]
    fn test_unrepresentable_fields_are_skipped() {
        let value = json!({"a": 1, "b": true, "c": null, "d": {"x": 1}, "e": "s"});
        let record = record_from_json(value.as_object().unwrap());
        assert_eq!(record.len(), 2);
        assert_eq!(record.get("a"), Some(&FieldValue::Int(1)));
        assert_eq!(record.get("e"), Some(&FieldValue::Str("s".into())));
    }

    #[test]
    fn test_list_iteration() {
        let value = FieldValue::from(vec![1i64, 5]);
        let Shape::List(list) = value.shape() else {
            panic!("expected list shape");
        };
        assert_eq!(list.len(), 2);
        let items: Vec<Scalar> = list.iter().collect();
        assert_eq!(items, vec![Scalar::Int(1), Scalar::Int(5)]);
    }
}
