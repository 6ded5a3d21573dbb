//! Field slots and the rules attached to them.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::context::Context;
use crate::error::Meta;
use crate::schema::traits::AnySchema;
use crate::value::Value;

use super::condition::{Case, Condition, ConditionOp};

/// A declared field: its schema plus conditional and cross-field rules.
#[derive(Clone)]
pub(crate) struct FieldDef {
    pub(crate) schema: Arc<dyn AnySchema>,
    pub(crate) rules: Vec<FieldRule>,
}

impl FieldDef {
    pub(crate) fn new(schema: Arc<dyn AnySchema>) -> Self {
        Self {
            schema,
            rules: Vec::new(),
        }
    }

    /// Conditions gating this field; the field is only validated when all hold.
    pub(crate) fn gates(&self) -> impl Iterator<Item = &Condition> {
        self.rules.iter().filter_map(|rule| match rule {
            FieldRule::SkipUnless(condition) => Some(condition),
            _ => None,
        })
    }

    pub(crate) fn is_gated(&self) -> bool {
        self.gates().next().is_some()
    }

    /// True when `value` counts as provided for this field.
    pub(crate) fn is_present(&self, value: &Value) -> bool {
        !(value.is_missing() || (value.is_null() && !self.schema.is_nullable()))
    }
}

/// A rule evaluated in the cross-field pass.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum FieldRule {
    RequiredIf(Condition),
    RequiredWith(Vec<String>),
    RequiredWithout(Vec<String>),
    ExcludedIf(Condition),
    SkipUnless(Condition),
    Compare {
        op: ConditionOp,
        other: String,
        case: Case,
    },
    Contains(String),
    Excludes(String),
}

impl FieldRule {
    /// True for conditional requirements, which run before comparisons.
    pub(crate) fn is_conditional(&self) -> bool {
        matches!(
            self,
            FieldRule::RequiredIf(_)
                | FieldRule::RequiredWith(_)
                | FieldRule::RequiredWithout(_)
                | FieldRule::ExcludedIf(_)
        )
    }

    /// Evaluates the rule for a field holding `value`.
    ///
    /// `ctx` is positioned at the field. Returns whether to stop.
    pub(crate) fn evaluate(
        &self,
        value: &Value,
        present: bool,
        view: &FieldView<'_>,
        ctx: &Context,
    ) -> bool {
        match self {
            FieldRule::RequiredIf(condition) => {
                if present || !condition.holds(view.lookup(&condition.path)) {
                    return false;
                }
                ctx.add_issue_with_meta("object.required_if", "is required", condition_meta(condition))
            }
            FieldRule::ExcludedIf(condition) => {
                if !present || !condition.holds(view.lookup(&condition.path)) {
                    return false;
                }
                ctx.add_issue_with_meta(
                    "object.excluded_if",
                    "must be absent",
                    condition_meta(condition),
                )
            }
            FieldRule::RequiredWith(paths) => {
                if present || !paths.iter().any(|p| !view.lookup(p).is_blank()) {
                    return false;
                }
                ctx.add_issue_with_meta(
                    "object.required_with",
                    format!("is required when {} is present", paths.join(" or ")),
                    Meta::new().with("fields", paths.join(", ")),
                )
            }
            FieldRule::RequiredWithout(paths) => {
                if present || !paths.iter().any(|p| view.lookup(p).is_blank()) {
                    return false;
                }
                ctx.add_issue_with_meta(
                    "object.required_without",
                    format!("is required when {} is absent", paths.join(" or ")),
                    Meta::new().with("fields", paths.join(", ")),
                )
            }
            FieldRule::SkipUnless(_) => false,
            FieldRule::Compare { op, other, case } => {
                if !present {
                    return false;
                }
                // Operands that cannot be related pass.
                if op.relate(value, view.lookup(other), *case) != Some(false) {
                    return false;
                }
                let suffix = match case {
                    Case::Insensitive => "field",
                    Case::Sensitive => "cs_field",
                };
                ctx.add_issue_with_meta(
                    format!("object.{}_{}", op.name(), suffix),
                    format!("{} field '{}'", comparison_phrase(*op), other),
                    Meta::new().with("field", other.as_str()),
                )
            }
            FieldRule::Contains(other) => {
                let (Some(haystack), Some(needle)) = (value.as_str(), view.lookup(other).as_str())
                else {
                    return false;
                };
                if haystack.contains(needle) {
                    return false;
                }
                ctx.add_issue_with_meta(
                    "object.field_contains",
                    format!("must contain the value of field '{}'", other),
                    Meta::new().with("field", other.as_str()),
                )
            }
            FieldRule::Excludes(other) => {
                let (Some(haystack), Some(needle)) = (value.as_str(), view.lookup(other).as_str())
                else {
                    return false;
                };
                if !haystack.contains(needle) {
                    return false;
                }
                ctx.add_issue_with_meta(
                    "object.field_excludes",
                    format!("must not contain the value of field '{}'", other),
                    Meta::new().with("field", other.as_str()),
                )
            }
        }
    }
}

fn condition_meta(condition: &Condition) -> Meta {
    Meta::new()
        .with("field", condition.path.as_str())
        .with("op", condition.op.name())
        .with("expected", condition.expected_text())
}

fn comparison_phrase(op: ConditionOp) -> &'static str {
    match op {
        ConditionOp::Eq => "must equal",
        ConditionOp::Ne => "must differ from",
        ConditionOp::Gt => "must be greater than",
        ConditionOp::Gte => "must not be less than",
        ConditionOp::Lt => "must be less than",
        ConditionOp::Lte => "must not be greater than",
    }
}

/// Read access to the per-call field values of an object.
///
/// Declared fields resolve to their validated value when validation
/// succeeded and to the raw input otherwise. Undeclared keys resolve to the
/// raw input.
///
/// # Example
///
/// ```rust
/// use assay::{AnySchema, FieldPath, Issue, Options, Schema, ValidationError, Value};
/// use serde_json::json;
/// use stillwater::Validation;
///
/// let schema = Schema::object()
///     .field("name", Schema::text().trim())
///     .custom(|view| {
///         if view.get("name").as_str() == Some("root") {
///             Validation::Failure(ValidationError::single(Issue::new(
///                 FieldPath::from_field("name"),
///                 "user.reserved",
///                 "name is reserved",
///             )))
///         } else {
///             Validation::Success(())
///         }
///     });
///
/// let result = schema.validate_any(&Value::from(json!({"name": " root "})), Options::default());
/// assert_eq!(result.into_result().unwrap_err().first().code, "user.reserved");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FieldView<'a> {
    fields: &'a IndexMap<String, Value>,
    raw: &'a Value,
}

impl<'a> FieldView<'a> {
    pub(crate) fn new(fields: &'a IndexMap<String, Value>, raw: &'a Value) -> Self {
        Self { fields, raw }
    }

    /// Returns the value of a top-level key.
    pub fn get(&self, key: &str) -> &'a Value {
        match self.fields.get(key) {
            Some(value) => value,
            None => self.raw.get(key),
        }
    }

    /// Descends a dotted path such as `address.city`, starting from the
    /// resolved value of its first segment.
    pub fn lookup(&self, path: &str) -> &'a Value {
        let mut segments = path.split('.');
        let head = match segments.next() {
            Some(head) if !head.is_empty() => head,
            _ => return self.raw,
        };
        segments.fold(self.get(head), |current, segment| current.step(segment))
    }

    /// The object as it was received.
    pub fn raw(&self) -> &'a Value {
        self.raw
    }
}
