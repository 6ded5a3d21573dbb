//! Record (string-keyed map) schema validation.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use stillwater::Validation;

use crate::context::{Context, Options};
use crate::error::{Meta, SchemaBuildError, ValidationError};
use crate::path::PathSegment;
use crate::rule::Ruleset;
use crate::value::Value;

use super::count::{count_rule, CountOp};
use super::traits::{report_invalid, run_root, AnySchema, FieldKind, Presence, PresencePolicy};

/// A schema for maps with arbitrary keys.
///
/// Unlike an object schema, a record has no declared fields: every key is
/// validated with the key schema and every value with the value schema.
/// Value issues are re-rooted under the key with dot notation; key issues
/// are reported as `record.key` at the record itself, carrying the key.
///
/// # Example
///
/// ```rust
/// use assay::{AnySchema, Options, Schema, Value};
/// use serde_json::json;
///
/// let labels = Schema::record()
///     .keys(Schema::text().pattern("^[a-z]+$"))
///     .values(Schema::text().max(8));
///
/// let input = Value::from(json!({"env": "production", "Team": "core"}));
/// let errors = labels
///     .validate_any(&input, Options::default())
///     .into_result()
///     .unwrap_err();
///
/// assert_eq!(errors.paths(), vec!["env", ""]);
/// assert_eq!(errors.codes(), vec!["text.max", "record.key"]);
/// ```
#[derive(Clone)]
pub struct RecordSchema {
    presence: PresencePolicy,
    keys: Option<Arc<dyn AnySchema>>,
    values: Option<Arc<dyn AnySchema>>,
    count: Ruleset<usize>,
}

impl RecordSchema {
    pub fn new() -> Self {
        Self {
            presence: PresencePolicy::new(FieldKind::Record),
            keys: None,
            values: None,
            count: Ruleset::new(),
        }
    }

    /// Validates every key (as a string value) with `schema`.
    pub fn keys<S: AnySchema + 'static>(mut self, schema: S) -> Self {
        self.keys = Some(Arc::new(schema));
        self
    }

    /// Validates every value with `schema`.
    pub fn values<S: AnySchema + 'static>(mut self, schema: S) -> Self {
        self.values = Some(Arc::new(schema));
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

    /// Requires at least `min` entries.
    pub fn min(self, min: usize) -> Self {
        self.push(CountOp::Min, min)
    }

    /// Requires at most `max` entries.
    pub fn max(self, max: usize) -> Self {
        self.push(CountOp::Max, max)
    }

    /// Requires exactly `len` entries.
    pub fn len(self, len: usize) -> Self {
        self.push(CountOp::Len, len)
    }

    pub fn eq(self, count: usize) -> Self {
        self.push(CountOp::Eq, count)
    }

    pub fn ne(self, count: usize) -> Self {
        self.push(CountOp::Ne, count)
    }

    pub fn gt(self, count: usize) -> Self {
        self.push(CountOp::Gt, count)
    }

    pub fn gte(self, count: usize) -> Self {
        self.push(CountOp::Gte, count)
    }

    pub fn lt(self, count: usize) -> Self {
        self.push(CountOp::Lt, count)
    }

    pub fn lte(self, count: usize) -> Self {
        self.push(CountOp::Lte, count)
    }

    /// Sets a custom message for the most recent count rule, or the type
    /// message when no rule exists yet.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        let message = message.into();
        if self.count.is_empty() {
            self.presence.set_type_message(message);
        } else {
            self.count.set_last_message(message);
        }
        self
    }

    /// Validates a native map.
    pub fn validate(
        &self,
        input: &IndexMap<String, Value>,
    ) -> Validation<IndexMap<String, Value>, ValidationError> {
        self.validate_any(&Value::Object(input.clone()), Options::default())
            .map(|value| match value {
                Value::Object(map) => map,
                _ => input.clone(),
            })
    }

    fn push(mut self, op: CountOp, bound: usize) -> Self {
        self.count.push(count_rule(FieldKind::Record, op, bound));
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
        let Some(entries) = value.as_object() else {
            self.presence.type_mismatch(&value, ctx);
            return value.into_owned();
        };

        let before = ctx.issue_count();
        self.count.run(entries.len(), ctx);
        if ctx.issue_count() > before {
            return value.into_owned();
        }

        let mut out = IndexMap::with_capacity(entries.len());
        for (key, entry) in entries {
            if let Some(schema) = &self.keys {
                if let Validation::Failure(error) =
                    schema.validate_any(&Value::String(key.clone()), ctx.options())
                {
                    tracing::trace!(key = %key, issues = error.len(), "record key rejected");
                    for issue in error {
                        ctx.add_issue_with_meta(
                            "record.key",
                            "invalid key",
                            Meta::new()
                                .with("key", key.as_str())
                                .with("code", issue.code)
                                .with("details", issue.message),
                        );
                    }
                    if ctx.should_stop() {
                        return Value::Object(out);
                    }
                }
            }

            let Some(schema) = &self.values else {
                out.insert(key.clone(), entry.clone());
                continue;
            };
            match schema.validate_any(entry, ctx.options()) {
                Validation::Success(validated) => {
                    out.insert(key.clone(), validated);
                }
                Validation::Failure(error) => {
                    tracing::trace!(key = %key, issues = error.len(), "record value rejected");
                    ctx.absorb(error, PathSegment::key(key.as_str()));
                    out.insert(key.clone(), entry.clone());
                    if ctx.should_stop() {
                        return Value::Object(out);
                    }
                }
            }
        }
        Value::Object(out)
    }
}

impl Default for RecordSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RecordSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordSchema")
            .field("presence", &self.presence)
            .field("keys", &self.keys.as_ref().map(|s| s.kind()))
            .field("values", &self.values.as_ref().map(|s| s.kind()))
            .field("count", &self.count)
            .finish()
    }
}

impl AnySchema for RecordSchema {
    fn validate_any(&self, value: &Value, options: Options) -> Validation<Value, ValidationError> {
        run_root(value, options, |value, ctx| self.check(value, ctx))
    }

    fn kind(&self) -> FieldKind {
        FieldKind::Record
    }

    fn is_nullable(&self) -> bool {
        self.presence.is_nullable()
    }

    fn construction_error(&self) -> Option<&SchemaBuildError> {
        [&self.keys, &self.values]
            .into_iter()
            .flatten()
            .find_map(|schema| schema.construction_error())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MetaValue;
    use crate::schema::{NumberSchema, TextSchema};
    use serde_json::json;

    fn unwrap_failure<T: std::fmt::Debug, E>(v: Validation<T, E>) -> E {
        v.into_result().unwrap_err()
    }

    fn run(schema: &RecordSchema, value: serde_json::Value) -> Validation<Value, ValidationError> {
        schema.validate_any(&Value::from(value), Options::default())
    }

    #[test]
    fn test_rejects_non_object() {
        let errors = unwrap_failure(run(&RecordSchema::new(), json!([1, 2])));
        assert_eq!(errors.first().code, "record.type");
    }

    #[test]
    fn test_value_issue_uses_key_path() {
        let schema = RecordSchema::new().values(NumberSchema::<u16>::new());
        let errors = unwrap_failure(run(&schema, json!({"http": 80, "big": 70000})));
        assert_eq!(errors.paths(), vec!["big"]);
        assert_eq!(errors.first().code, "number.overflow");
    }

    #[test]
    fn test_key_issue_carries_key_and_keeps_siblings() {
        let schema = RecordSchema::new()
            .keys(TextSchema::new().max(3))
            .values(NumberSchema::<i64>::new().positive());
        let errors = unwrap_failure(run(&schema, json!({"long_key": 1, "ok": -1})));

        assert_eq!(errors.codes(), vec!["record.key", "number.positive"]);
        let key_issue = errors.first();
        assert!(key_issue.path.is_root());
        assert_eq!(
            key_issue.meta.get("key"),
            Some(&MetaValue::Text("long_key".to_string()))
        );
        assert_eq!(
            key_issue.meta.get("code"),
            Some(&MetaValue::Text("text.max".to_string()))
        );
        assert_eq!(errors.paths()[1], "ok");
    }

    #[test]
    fn test_count_failure_skips_entries() {
        let schema = RecordSchema::new()
            .values(NumberSchema::<i64>::new().positive())
            .max(1);
        let errors = unwrap_failure(run(&schema, json!({"a": -1, "b": -2})));
        assert_eq!(errors.codes(), vec!["record.max"]);
    }

    #[test]
    fn test_nested_value_paths() {
        let schema = RecordSchema::new().values(
            crate::schema::ArraySchema::new().items(TextSchema::new().min(2)),
        );
        let errors = unwrap_failure(run(&schema, json!({"team": ["ok", "x"]})));
        assert_eq!(errors.paths(), vec!["team[1]"]);
    }

    #[test]
    fn test_native_validate() {
        let mut map = IndexMap::new();
        map.insert("env".to_string(), Value::from("prod"));
        let schema = RecordSchema::new().min(1).values(TextSchema::new());
        assert_eq!(schema.validate(&map).into_result().unwrap(), map);
        assert!(schema.validate(&IndexMap::new()).is_failure());
    }

    #[test]
    fn test_broken_value_schema_is_reported_even_when_empty() {
        let schema = RecordSchema::new().values(TextSchema::new().pattern("([a-z"));
        let errors = unwrap_failure(run(&schema, json!({})));
        assert_eq!(errors.codes(), vec!["schema.invalid"]);

        let keyed = RecordSchema::new().keys(TextSchema::new().pattern("(x"));
        let errors = unwrap_failure(run(&keyed, json!({"a": 1})));
        assert_eq!(errors.codes(), vec!["schema.invalid"]);
    }
}
