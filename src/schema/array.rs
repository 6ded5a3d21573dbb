//! Array schema validation.
//!
//! This module provides [`ArraySchema`] for validating arrays with an item
//! schema, length constraints, and uniqueness requirements.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use stillwater::Validation;

use crate::context::{Context, Options};
use crate::error::{Meta, SchemaBuildError, ValidationError};
use crate::rule::Ruleset;
use crate::value::Value;

use super::count::{count_rule, CountOp};
use super::traits::{report_invalid, run_root, AnySchema, FieldKind, Presence, PresencePolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Length,
    Unique,
}

/// A schema for validating arrays.
///
/// Length rules run first; when any of them fails the items are not
/// validated. Each item is then validated with the item schema and its
/// issues are re-rooted under `[index]`.
///
/// # Example
///
/// ```rust
/// use assay::{AnySchema, Options, Schema, Value};
/// use serde_json::json;
///
/// let schema = Schema::array()
///     .items(Schema::object().field("name", Schema::text().required()))
///     .min(1);
///
/// let input = Value::from(json!([{"name": "a"}, {"name": "b"}, {}]));
/// let errors = schema
///     .validate_any(&input, Options::default())
///     .into_result()
///     .unwrap_err();
///
/// assert_eq!(errors.paths(), vec!["[2].name"]);
/// ```
#[derive(Clone)]
pub struct ArraySchema {
    presence: PresencePolicy,
    items: Option<Arc<dyn AnySchema>>,
    length: Ruleset<usize>,
    unique: Option<String>,
    last: Option<Stage>,
}

impl ArraySchema {
    /// Creates a new, optional array schema accepting items of any kind.
    pub fn new() -> Self {
        Self {
            presence: PresencePolicy::new(FieldKind::Array),
            items: None,
            length: Ruleset::new(),
            unique: None,
            last: None,
        }
    }

    /// Validates every item with `schema`.
    pub fn items<S: AnySchema + 'static>(mut self, schema: S) -> Self {
        self.items = Some(Arc::new(schema));
        self
    }

    pub fn required(mut self) -> Self {
        self.presence.set_required();
        self
    }

    pub fn non_nullable(mut self) -> Self {
        self.presence.set_non_nullable();
        self
    }

    /// Substitutes `items` for a missing input.
    pub fn default(mut self, items: Vec<Value>) -> Self {
        self.presence.set_default(Value::Array(items));
        self
    }

    /// Requires at least `min` items.
    pub fn min(self, min: usize) -> Self {
        self.count(CountOp::Min, min)
    }

    /// Requires at most `max` items.
    pub fn max(self, max: usize) -> Self {
        self.count(CountOp::Max, max)
    }

    /// Requires exactly `len` items.
    pub fn len(self, len: usize) -> Self {
        self.count(CountOp::Len, len)
    }

    pub fn eq(self, count: usize) -> Self {
        self.count(CountOp::Eq, count)
    }

    pub fn ne(self, count: usize) -> Self {
        self.count(CountOp::Ne, count)
    }

    pub fn gt(self, count: usize) -> Self {
        self.count(CountOp::Gt, count)
    }

    pub fn gte(self, count: usize) -> Self {
        self.count(CountOp::Gte, count)
    }

    pub fn lt(self, count: usize) -> Self {
        self.count(CountOp::Lt, count)
    }

    pub fn lte(self, count: usize) -> Self {
        self.count(CountOp::Lte, count)
    }

    /// Requires all items to be distinct.
    ///
    /// Each repeated item is reported as `array.unique` with its `index` and
    /// the index it duplicates.
    pub fn unique(mut self) -> Self {
        self.unique = Some("duplicate item".to_string());
        self.last = Some(Stage::Unique);
        self
    }

    /// Sets a custom message for the most recent rule, or the type message
    /// when no rule exists yet.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        let message = message.into();
        match self.last {
            Some(Stage::Length) => {
                self.length.set_last_message(message);
            }
            Some(Stage::Unique) => self.unique = Some(message),
            None => self.presence.set_type_message(message),
        }
        self
    }

    /// Validates a native slice of values.
    pub fn validate(&self, input: &[Value]) -> Validation<Vec<Value>, ValidationError> {
        self.validate_any(&Value::Array(input.to_vec()), Options::default())
            .map(|value| match value {
                Value::Array(items) => items,
                _ => input.to_vec(),
            })
    }

    fn count(mut self, op: CountOp, bound: usize) -> Self {
        self.length.push(count_rule(FieldKind::Array, op, bound));
        self.last = Some(Stage::Length);
        self
    }

    pub(crate) fn check(&self, value: &Value, ctx: &Context) -> Value {
        if let Some(error) = self.construction_error() {
            report_invalid(error, ctx);
            return value.clone();
        }
        let value = match self.presence.resolve(value, ctx) {
            Presence::Present(value) => value,
            Presence::Done(value) => return value,
        };
        let Some(items) = value.as_array() else {
            self.presence.type_mismatch(&value, ctx);
            return value.into_owned();
        };

        let before = ctx.issue_count();
        self.length.run(items.len(), ctx);
        if ctx.issue_count() > before {
            return value.into_owned();
        }

        let mut out = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let Some(schema) = &self.items else {
                out.push(item.clone());
                continue;
            };
            match schema.validate_any(item, ctx.options()) {
                Validation::Success(validated) => out.push(validated),
                Validation::Failure(error) => {
                    tracing::trace!(index, issues = error.len(), "array item rejected");
                    ctx.absorb(error, index);
                    out.push(item.clone());
                    if ctx.should_stop() {
                        return Value::Array(out);
                    }
                }
            }
        }

        if let Some(message) = &self.unique {
            for (index, duplicate_of) in find_duplicates(&out) {
                let stop = ctx.add_issue_with_meta(
                    "array.unique",
                    message.clone(),
                    Meta::new()
                        .with("index", index)
                        .with("duplicate_of", duplicate_of),
                );
                if stop {
                    break;
                }
            }
        }

        Value::Array(out)
    }
}

/// Returns `(index, first_index)` for every item equal to an earlier one.
///
/// Items are compared through their JSON rendering, so `1` and `1.0` differ.
fn find_duplicates(items: &[Value]) -> Vec<(usize, usize)> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut duplicates = Vec::new();
    for (index, item) in items.iter().enumerate() {
        let key = item.to_json().to_string();
        match seen.get(&key) {
            Some(&first) => duplicates.push((index, first)),
            None => {
                seen.insert(key, index);
            }
        }
    }
    duplicates
}

impl Default for ArraySchema {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ArraySchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArraySchema")
            .field("presence", &self.presence)
            .field("items", &self.items.as_ref().map(|s| s.kind()))
            .field("length", &self.length)
            .field("unique", &self.unique.is_some())
            .finish()
    }
}

impl AnySchema for ArraySchema {
    fn validate_any(&self, value: &Value, options: Options) -> Validation<Value, ValidationError> {
        run_root(value, options, |value, ctx| self.check(value, ctx))
    }

    fn kind(&self) -> FieldKind {
        FieldKind::Array
    }

    fn is_nullable(&self) -> bool {
        self.presence.is_nullable()
    }

    /// The item schema's construction error, if any.
    fn construction_error(&self) -> Option<&SchemaBuildError> {
        self.items.as_ref().and_then(|items| items.construction_error())
    }
}
