//! Predicates and comparisons over sibling field values.

use std::cmp::Ordering;
use std::fmt::{self, Display};

use crate::value::Value;

/// Comparison operator used by conditional requirements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl ConditionOp {
    pub fn name(&self) -> &'static str {
        match self {
            ConditionOp::Eq => "eq",
            ConditionOp::Ne => "ne",
            ConditionOp::Gt => "gt",
            ConditionOp::Gte => "gte",
            ConditionOp::Lt => "lt",
            ConditionOp::Lte => "lte",
        }
    }

    /// Applies the operator to `a` and `b`.
    ///
    /// Returns `None` when the operands cannot be related: missing, null,
    /// NaN, mismatched kinds, or an ordering operator applied to containers.
    pub(crate) fn relate(&self, a: &Value, b: &Value, case: Case) -> Option<bool> {
        match self {
            ConditionOp::Eq => values_equal(a, b, case),
            ConditionOp::Ne => values_equal(a, b, case).map(|equal| !equal),
            _ => compare_values(a, b, case).map(|ordering| self.accepts(ordering)),
        }
    }

    fn accepts(&self, ordering: Ordering) -> bool {
        match self {
            ConditionOp::Eq => ordering == Ordering::Equal,
            ConditionOp::Ne => ordering != Ordering::Equal,
            ConditionOp::Gt => ordering == Ordering::Greater,
            ConditionOp::Gte => ordering != Ordering::Less,
            ConditionOp::Lt => ordering == Ordering::Less,
            ConditionOp::Lte => ordering != Ordering::Greater,
        }
    }
}

impl Display for ConditionOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How strings are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Case {
    Sensitive,
    Insensitive,
}

/// Orders two scalars of the same kind.
///
/// Numbers compare across widths, strings per `case`, and booleans with
/// `false < true`. Missing, null, NaN, containers and mismatched kinds are
/// unordered.
pub(crate) fn compare_values(a: &Value, b: &Value, case: Case) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.compare(y),
        (Value::String(x), Value::String(y)) => match case {
            Case::Sensitive => Some(x.cmp(y)),
            Case::Insensitive => Some(x.to_lowercase().cmp(&y.to_lowercase())),
        },
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// Tests two values for equality; arrays and objects compare structurally.
pub(crate) fn values_equal(a: &Value, b: &Value, case: Case) -> Option<bool> {
    match (a, b) {
        (Value::Array(_), Value::Array(_)) | (Value::Object(_), Value::Object(_)) => Some(a == b),
        _ => compare_values(a, b, case).map(|ordering| ordering == Ordering::Equal),
    }
}

/// A predicate on the value found at a dotted path.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Condition {
    pub(crate) path: String,
    pub(crate) op: ConditionOp,
    pub(crate) expected: Value,
}

impl Condition {
    pub(crate) fn new(path: impl Into<String>, op: ConditionOp, expected: Value) -> Self {
        Self {
            path: path.into(),
            op,
            expected,
        }
    }

    /// Evaluates the condition against the value resolved for `path`.
    pub(crate) fn holds(&self, actual: &Value) -> bool {
        match (actual, &self.expected) {
            (Value::Missing, Value::Missing) | (Value::Null, Value::Null) => {
                self.op.accepts(Ordering::Equal)
            }
            // Unrelated operands satisfy only `Ne`.
            _ => self
                .op
                .relate(actual, &self.expected, Case::Sensitive)
                .unwrap_or(self.op == ConditionOp::Ne),
        }
    }

    /// Renders the expected operand for issue metadata.
    pub(crate) fn expected_text(&self) -> String {
        match &self.expected {
            Value::String(s) => s.clone(),
            Value::Missing => "missing".to_string(),
            other => other.to_json().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numbers_compare_across_widths() {
        assert_eq!(
            compare_values(&Value::from(5u64), &Value::from(5.0), Case::Sensitive),
            Some(Ordering::Equal)
        );
        assert_eq!(
            compare_values(&Value::from(f64::NAN), &Value::from(1), Case::Sensitive),
            None
        );
    }

    #[test]
    fn test_string_case_modes() {
        let a = Value::from("Alice");
        let b = Value::from("alice");
        assert_eq!(compare_values(&a, &b, Case::Insensitive), Some(Ordering::Equal));
        assert_ne!(compare_values(&a, &b, Case::Sensitive), Some(Ordering::Equal));
    }

    #[test]
    fn test_mismatched_kinds_are_unordered() {
        assert_eq!(
            compare_values(&Value::from("5"), &Value::from(5), Case::Sensitive),
            None
        );
        assert_eq!(compare_values(&Value::Missing, &Value::Missing, Case::Sensitive), None);
    }

    #[test]
    fn test_containers_relate_by_structural_equality() {
        let a = Value::from(json!([1, 2]));
        let b = Value::from(json!([3, 4]));
        assert_eq!(ConditionOp::Eq.relate(&a, &b, Case::Sensitive), Some(false));
        assert_eq!(ConditionOp::Ne.relate(&a, &b, Case::Sensitive), Some(true));
        assert_eq!(ConditionOp::Eq.relate(&a, &a, Case::Sensitive), Some(true));
        assert_eq!(ConditionOp::Gt.relate(&a, &b, Case::Sensitive), None);

        let x = Value::from(json!({"x": 1}));
        let y = Value::from(json!({"x": 2}));
        assert_eq!(ConditionOp::Eq.relate(&x, &y, Case::Sensitive), Some(false));
        assert_eq!(ConditionOp::Ne.relate(&x, &y, Case::Sensitive), Some(true));
    }

    #[test]
    fn test_condition_holds() {
        let is_card = Condition::new("method", ConditionOp::Eq, Value::from("card"));
        assert!(is_card.holds(&Value::from("card")));
        assert!(!is_card.holds(&Value::from("cash")));
        assert!(!is_card.holds(&Value::Missing));

        let not_card = Condition::new("method", ConditionOp::Ne, Value::from("card"));
        assert!(not_card.holds(&Value::Missing));

        let adult = Condition::new("age", ConditionOp::Gte, Value::from(18));
        assert!(adult.holds(&Value::from(18)));
        assert!(!adult.holds(&Value::from(17.5)));
    }

    #[test]
    fn test_condition_on_null() {
        let is_null = Condition::new("parent", ConditionOp::Eq, Value::Null);
        assert!(is_null.holds(&Value::Null));
        assert!(!is_null.holds(&Value::from("x")));
    }
}
