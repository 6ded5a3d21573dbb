//! Length rules shared by array and record schemas.

use crate::error::Meta;
use crate::rule::Rule;

use super::traits::FieldKind;

/// A comparison between a collection's length and a bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CountOp {
    Min,
    Max,
    Len,
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl CountOp {
    fn name(self) -> &'static str {
        match self {
            CountOp::Min => "min",
            CountOp::Max => "max",
            CountOp::Len => "len",
            CountOp::Eq => "eq",
            CountOp::Ne => "ne",
            CountOp::Gt => "gt",
            CountOp::Gte => "gte",
            CountOp::Lt => "lt",
            CountOp::Lte => "lte",
        }
    }

    fn holds(self, actual: usize, bound: usize) -> bool {
        match self {
            CountOp::Min | CountOp::Gte => actual >= bound,
            CountOp::Max | CountOp::Lte => actual <= bound,
            CountOp::Len | CountOp::Eq => actual == bound,
            CountOp::Ne => actual != bound,
            CountOp::Gt => actual > bound,
            CountOp::Lt => actual < bound,
        }
    }

    fn message(self, kind: FieldKind) -> &'static str {
        match (self, kind) {
            (CountOp::Min, FieldKind::Array) => "too short",
            (CountOp::Max, FieldKind::Array) => "too long",
            (CountOp::Min, _) => "too few items",
            (CountOp::Max, _) => "too many items",
            (CountOp::Len | CountOp::Eq, _) => "invalid length",
            (CountOp::Ne, _) => "length must differ",
            (CountOp::Gt, _) => "must have more items",
            (CountOp::Gte, _) => "must not have fewer items",
            (CountOp::Lt, _) => "must have fewer items",
            (CountOp::Lte, _) => "must not have more items",
        }
    }
}

/// Builds the `<kind>.<op>` rule over a collection length.
pub(crate) fn count_rule(kind: FieldKind, op: CountOp, bound: usize) -> Rule<usize> {
    let name = op.name();
    Rule::predicate(
        name,
        format!("{}.{}", kind.code_prefix(), name),
        op.message(kind),
        move |actual: &usize| {
            if op.holds(*actual, bound) {
                Ok(())
            } else {
                Err(Meta::new().with(name, bound).with("actual", *actual))
            }
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{Context, Options};

    #[test]
    fn test_count_rule_codes_and_meta() {
        let ctx = Context::new(Options::default());
        count_rule(FieldKind::Record, CountOp::Max, 2).apply(3, &ctx);
        let errors = ctx
            .finish(crate::value::Value::Missing)
            .into_result()
            .unwrap_err();
        let issue = errors.first();
        assert_eq!(issue.code, "record.max");
        assert_eq!(issue.message, "too many items");
        assert_eq!(issue.meta.get("max"), Some(&crate::error::MetaValue::UInt(2)));
        assert_eq!(issue.meta.get("actual"), Some(&crate::error::MetaValue::UInt(3)));
    }

    #[test]
    fn test_ops() {
        assert!(CountOp::Gt.holds(3, 2));
        assert!(!CountOp::Gt.holds(2, 2));
        assert!(CountOp::Lte.holds(2, 2));
        assert!(CountOp::Ne.holds(1, 2));
        assert_eq!(CountOp::Min.message(FieldKind::Array), "too short");
    }
}
