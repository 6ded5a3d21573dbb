//! Object schema validation.
//!
//! This module provides [`ObjectSchema`], the composition root: it binds a
//! kind schema to each declared field, handles additional properties, and
//! evaluates conditional requirements and cross-field comparisons in a
//! second pass over the per-call field values.

mod condition;
mod field;
mod shape;

use std::collections::HashSet;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use stillwater::Validation;

use crate::context::{Context, Options};
use crate::error::{Issue, SchemaBuildError, ValidationError};
use crate::path::FieldPath;
use crate::value::Value;

use super::traits::{report_invalid, run_root, AnySchema, FieldKind, Presence, PresencePolicy};

pub use condition::ConditionOp;
pub use field::FieldView;
pub use shape::{Dynamic, FieldSpec, Shape};

use condition::{Case, Condition};
use field::{FieldDef, FieldRule};

type ObjectValidator = Arc<dyn Fn(&FieldView<'_>) -> Validation<(), ValidationError> + Send + Sync>;

/// How to handle properties not declared as fields.
#[derive(Clone)]
enum AdditionalProperties {
    /// Pass unknown properties through (default).
    Allow,
    /// Report unknown properties as `object.unknown_field`.
    Deny,
    /// Validate unknown properties against a schema.
    Validate(Arc<dyn AnySchema>),
}

/// A setting accepted by [`ObjectSchema::additional_properties`].
///
/// - `bool`: `true` to allow, `false` to deny
/// - any schema: validate unknown properties against it
pub struct AdditionalPropertiesSetting(AdditionalProperties);

impl From<bool> for AdditionalPropertiesSetting {
    fn from(allow: bool) -> Self {
        if allow {
            AdditionalPropertiesSetting(AdditionalProperties::Allow)
        } else {
            AdditionalPropertiesSetting(AdditionalProperties::Deny)
        }
    }
}

impl<S: AnySchema + 'static> From<S> for AdditionalPropertiesSetting {
    fn from(schema: S) -> Self {
        AdditionalPropertiesSetting(AdditionalProperties::Validate(Arc::new(schema)))
    }
}

/// A schema for validating objects with declared fields.
///
/// Fields are validated in declaration order with their own schema, and
/// their issues are re-rooted under the field key. Conditional requirements,
/// cross-field comparisons and custom validators then run in a second pass,
/// reading the values resolved in the first one.
///
/// `T` is the [`Shape`] the fields must match. The default, [`Dynamic`],
/// accepts any field.
///
/// # Example
///
/// ```rust
/// use assay::{AnySchema, ConditionOp, Options, Schema, Value};
/// use serde_json::json;
///
/// let schema = Schema::object()
///     .field("method", Schema::text().required().one_of(["card", "cash"]))
///     .field("card_number", Schema::text().len(16))
///     .field("password", Schema::text().required().min(8))
///     .field("confirm", Schema::text())
///     .required_if("card_number", "method", ConditionOp::Eq, "card")
///     .eq_cs_field("confirm", "password")
///     .additional_properties(false);
///
/// let input = Value::from(json!({
///     "method": "card",
///     "password": "correct horse",
///     "confirm": "Correct horse",
/// }));
/// let errors = schema
///     .validate_any(&input, Options::default())
///     .into_result()
///     .unwrap_err();
///
/// assert_eq!(errors.paths(), vec!["card_number", "confirm"]);
/// assert_eq!(errors.codes(), vec!["object.required_if", "object.eq_cs_field"]);
/// ```
pub struct ObjectSchema<T: Shape = Dynamic> {
    presence: PresencePolicy,
    fields: IndexMap<String, FieldDef>,
    additional_properties: AdditionalProperties,
    validators: Vec<ObjectValidator>,
    build_error: Option<SchemaBuildError>,
    shape: PhantomData<fn() -> T>,
}

impl<T: Shape> ObjectSchema<T> {
    /// Creates a new object schema with no fields.
    pub fn new() -> Self {
        Self {
            presence: PresencePolicy::new(FieldKind::Object),
            fields: IndexMap::new(),
            additional_properties: AdditionalProperties::Allow,
            validators: Vec::new(),
            build_error: None,
            shape: PhantomData,
        }
    }

    /// Declares a field, or replaces the schema of an existing one.
    ///
    /// A field is optional unless its schema is `required()`. Re-declaring a
    /// field keeps its position and the rules already attached to it. When
    /// `T` declares fields, an unknown key or a kind mismatch is recorded as
    /// the schema's construction error; the first such error is kept even if
    /// a later declaration replaces the offending schema.
    ///
    /// ```rust
    /// use assay::{AnySchema, Options, Schema, Value};
    /// use serde_json::json;
    ///
    /// let schema = Schema::object()
    ///     .field("name", Schema::text().required())
    ///     .field("age", Schema::number::<u8>())
    ///     .field("name", Schema::text());
    ///
    /// let result = schema.validate_any(&Value::from(json!({})), Options::default());
    /// assert!(result.is_success());
    /// ```
    pub fn field<S>(mut self, key: impl Into<String>, schema: S) -> Self
    where
        S: AnySchema + 'static,
    {
        let key = key.into();
        if !T::FIELDS.is_empty() {
            match T::spec(&key) {
                None => self.record_error(SchemaBuildError::UnknownField(key.clone())),
                Some(spec) if spec.kind != schema.kind() => {
                    self.record_error(SchemaBuildError::KindMismatch {
                        field: key.clone(),
                        declared: spec.kind,
                        attached: schema.kind(),
                    })
                }
                Some(_) => {}
            }
        }
        if let Some(error) = schema.construction_error() {
            let nested = error.clone().nested(key.as_str());
            self.record_error(nested);
        }
        match self.fields.get_mut(&key) {
            Some(def) => def.schema = Arc::new(schema),
            None => {
                self.fields.insert(key, FieldDef::new(Arc::new(schema)));
            }
        }
        self
    }

    /// Rejects a missing object with `object.required`.
    pub fn required(mut self) -> Self {
        self.presence.set_required();
        self
    }

    pub fn non_nullable(mut self) -> Self {
        self.presence.set_non_nullable();
        self
    }

    /// Sets the message used when the value is not an object.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        self.presence.set_type_message(message);
        self
    }

    /// Controls handling of properties that are not declared fields.
    ///
    /// ```rust
    /// use assay::{AnySchema, Options, Schema, Value};
    /// use serde_json::json;
    ///
    /// let strict = Schema::object()
    ///     .field("id", Schema::number::<u64>())
    ///     .additional_properties(false);
    /// let errors = strict
    ///     .validate_any(&Value::from(json!({"id": 1, "debug": true})), Options::default())
    ///     .into_result()
    ///     .unwrap_err();
    /// assert_eq!(errors.first().code, "object.unknown_field");
    ///
    /// let numeric_extras = Schema::object().additional_properties(Schema::number::<i64>());
    /// assert!(numeric_extras
    ///     .validate_any(&Value::from(json!({"x": 1})), Options::default())
    ///     .is_success());
    /// ```
    pub fn additional_properties<S>(mut self, setting: S) -> Self
    where
        S: Into<AdditionalPropertiesSetting>,
    {
        self.additional_properties = setting.into().0;
        self
    }

    /// Requires `field` whenever the value at `path` satisfies `op expected`.
    pub fn required_if(
        self,
        field: &str,
        path: impl Into<String>,
        op: ConditionOp,
        expected: impl Into<Value>,
    ) -> Self {
        let condition = Condition::new(path, op, expected.into());
        self.attach(field, "required_if", FieldRule::RequiredIf(condition))
    }

    /// Requires `field` whenever any of `paths` is present.
    pub fn required_with<I, P>(self, field: &str, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        let paths = paths.into_iter().map(Into::into).collect();
        self.attach(field, "required_with", FieldRule::RequiredWith(paths))
    }

    /// Requires `field` whenever any of `paths` is absent.
    pub fn required_without<I, P>(self, field: &str, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        let paths = paths.into_iter().map(Into::into).collect();
        self.attach(field, "required_without", FieldRule::RequiredWithout(paths))
    }

    /// Forbids `field` whenever the value at `path` satisfies `op expected`.
    pub fn excluded_if(
        self,
        field: &str,
        path: impl Into<String>,
        op: ConditionOp,
        expected: impl Into<Value>,
    ) -> Self {
        let condition = Condition::new(path, op, expected.into());
        self.attach(field, "excluded_if", FieldRule::ExcludedIf(condition))
    }

    /// Validates `field` only when the value at `path` satisfies `op expected`.
    ///
    /// Otherwise the field's issues and rules are skipped and its input is
    /// passed through unchanged.
    pub fn skip_unless(
        self,
        field: &str,
        path: impl Into<String>,
        op: ConditionOp,
        expected: impl Into<Value>,
    ) -> Self {
        let condition = Condition::new(path, op, expected.into());
        self.attach(field, "skip_unless", FieldRule::SkipUnless(condition))
    }

    /// Requires `field` to equal the field at `other` (strings ignore case).
    pub fn eq_field(self, field: &str, other: impl Into<String>) -> Self {
        self.compare(field, other, ConditionOp::Eq, Case::Insensitive, "eq_field")
    }

    pub fn ne_field(self, field: &str, other: impl Into<String>) -> Self {
        self.compare(field, other, ConditionOp::Ne, Case::Insensitive, "ne_field")
    }

    pub fn gt_field(self, field: &str, other: impl Into<String>) -> Self {
        self.compare(field, other, ConditionOp::Gt, Case::Insensitive, "gt_field")
    }

    pub fn gte_field(self, field: &str, other: impl Into<String>) -> Self {
        self.compare(field, other, ConditionOp::Gte, Case::Insensitive, "gte_field")
    }

    pub fn lt_field(self, field: &str, other: impl Into<String>) -> Self {
        self.compare(field, other, ConditionOp::Lt, Case::Insensitive, "lt_field")
    }

    pub fn lte_field(self, field: &str, other: impl Into<String>) -> Self {
        self.compare(field, other, ConditionOp::Lte, Case::Insensitive, "lte_field")
    }

    /// Requires `field` to equal the field at `other`, comparing strings
    /// case-sensitively.
    pub fn eq_cs_field(self, field: &str, other: impl Into<String>) -> Self {
        self.compare(field, other, ConditionOp::Eq, Case::Sensitive, "eq_cs_field")
    }

    pub fn ne_cs_field(self, field: &str, other: impl Into<String>) -> Self {
        self.compare(field, other, ConditionOp::Ne, Case::Sensitive, "ne_cs_field")
    }

    pub fn gt_cs_field(self, field: &str, other: impl Into<String>) -> Self {
        self.compare(field, other, ConditionOp::Gt, Case::Sensitive, "gt_cs_field")
    }

    pub fn gte_cs_field(self, field: &str, other: impl Into<String>) -> Self {
        self.compare(field, other, ConditionOp::Gte, Case::Sensitive, "gte_cs_field")
    }

    pub fn lt_cs_field(self, field: &str, other: impl Into<String>) -> Self {
        self.compare(field, other, ConditionOp::Lt, Case::Sensitive, "lt_cs_field")
    }

    pub fn lte_cs_field(self, field: &str, other: impl Into<String>) -> Self {
        self.compare(field, other, ConditionOp::Lte, Case::Sensitive, "lte_cs_field")
    }

    /// Requires the string in `field` to contain the string at `other`.
    pub fn field_contains(self, field: &str, other: impl Into<String>) -> Self {
        self.attach(field, "field_contains", FieldRule::Contains(other.into()))
    }

    /// Requires the string in `field` not to contain the string at `other`.
    pub fn field_excludes(self, field: &str, other: impl Into<String>) -> Self {
        self.attach(field, "field_excludes", FieldRule::Excludes(other.into()))
    }

    /// Adds an object-level validator that runs after every field rule.
    ///
    /// Issue paths returned by the validator are relative to the object.
    pub fn custom<F>(mut self, validator: F) -> Self
    where
        F: Fn(&FieldView<'_>) -> Validation<(), ValidationError> + Send + Sync + 'static,
    {
        self.validators.push(Arc::new(validator));
        self
    }

    /// Finalizes the schema, surfacing the first construction error.
    ///
    /// Building does not change the schema, so it may be called repeatedly.
    pub fn build(self) -> Result<Self, SchemaBuildError> {
        match &self.build_error {
            Some(error) => {
                tracing::warn!(error = %error, "object schema failed to build");
                Err(error.clone())
            }
            None => Ok(self),
        }
    }

    /// Names of the declared fields, in declaration order.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.keys().map(String::as_str).collect()
    }

    fn record_error(&mut self, error: SchemaBuildError) {
        if self.build_error.is_none() {
            self.build_error = Some(error);
        }
    }

    fn attach(mut self, field: &str, rule_name: &'static str, rule: FieldRule) -> Self {
        match self.fields.get_mut(field) {
            Some(def) => def.rules.push(rule),
            None => self.record_error(SchemaBuildError::UndeclaredField {
                field: field.to_string(),
                rule: rule_name,
            }),
        }
        self
    }

    fn compare(
        self,
        field: &str,
        other: impl Into<String>,
        op: ConditionOp,
        case: Case,
        rule_name: &'static str,
    ) -> Self {
        let rule = FieldRule::Compare {
            op,
            other: other.into(),
            case,
        };
        self.attach(field, rule_name, rule)
    }

    pub(crate) fn check(&self, value: &Value, ctx: &Context) -> Value {
        if let Some(error) = &self.build_error {
            report_invalid(error, ctx);
            return value.clone();
        }
        let value = match self.presence.resolve(value, ctx) {
            Presence::Present(value) => value,
            Presence::Done(value) => return value,
        };
        let Some(input) = value.as_object() else {
            self.presence.type_mismatch(&value, ctx);
            return value.into_owned();
        };

        let span = tracing::debug_span!("validate_object", fields = self.fields.len());
        let _guard = span.enter();
        let before = ctx.issue_count();

        // Pass 1: per-field validation.
        let mut resolved: IndexMap<String, Value> = IndexMap::with_capacity(self.fields.len());
        let mut invalid: HashSet<&str> = HashSet::new();
        let mut deferred: Vec<(&str, Context)> = Vec::new();
        for (key, def) in &self.fields {
            if ctx.should_stop() {
                break;
            }
            let raw = value.get(key);
            let target = if def.is_gated() {
                ctx.detached()
            } else {
                ctx.clone()
            };
            match def.schema.validate_any(raw, ctx.options()) {
                Validation::Success(validated) => {
                    resolved.insert(key.clone(), validated);
                }
                Validation::Failure(error) => {
                    target.absorb(error, key.as_str());
                    invalid.insert(key.as_str());
                    resolved.insert(key.clone(), raw.clone());
                }
            }
            if def.is_gated() {
                deferred.push((key.as_str(), target));
            }
        }

        let mut extras: IndexMap<String, Value> = IndexMap::new();
        for (key, extra) in input {
            if self.fields.contains_key(key) || ctx.should_stop() {
                continue;
            }
            match &self.additional_properties {
                AdditionalProperties::Allow => {
                    extras.insert(key.clone(), extra.clone());
                }
                AdditionalProperties::Deny => {
                    ctx.child(key.as_str())
                        .add_issue("object.unknown_field", format!("unknown field '{}'", key));
                }
                AdditionalProperties::Validate(schema) => {
                    match schema.validate_any(extra, ctx.options()) {
                        Validation::Success(validated) => {
                            extras.insert(key.clone(), validated);
                        }
                        Validation::Failure(error) => ctx.absorb(error, key.as_str()),
                    }
                }
            }
        }

        // Pass 2: gates, then conditional requirements, then comparisons.
        let view = FieldView::new(&resolved, &value);
        let mut skipped: HashSet<&str> = HashSet::new();
        for (key, def) in &self.fields {
            if !def.is_gated() {
                continue;
            }
            if ctx.should_stop() {
                break;
            }
            let open = def
                .gates()
                .all(|gate| gate.holds(view.lookup(&gate.path)));
            if !open {
                skipped.insert(key.as_str());
                continue;
            }
            if let Some((_, buffer)) = deferred
                .iter()
                .find(|(deferred_key, _)| *deferred_key == key.as_str())
            {
                ctx.commit(buffer);
            }
        }

        for conditional in [true, false] {
            for (key, def) in &self.fields {
                if ctx.should_stop() {
                    break;
                }
                if skipped.contains(key.as_str()) {
                    continue;
                }
                let field_ctx = ctx.child(key.as_str());
                let current = view.get(key);
                let present = def.is_present(current);
                let field_before = ctx.issue_count();
                for rule in def
                    .rules
                    .iter()
                    .filter(|rule| rule.is_conditional() == conditional)
                {
                    if rule.evaluate(current, present, &view, &field_ctx) {
                        break;
                    }
                }
                if ctx.issue_count() > field_before {
                    invalid.insert(key.as_str());
                }
            }
        }

        for validator in &self.validators {
            if ctx.should_stop() {
                break;
            }
            if let Validation::Failure(error) = validator(&view) {
                ctx.absorb_here(error);
            }
        }

        tracing::debug!(issues = ctx.issue_count() - before, "object validated");

        // Reassemble from the fields that validated and are present.
        let mut out = IndexMap::with_capacity(resolved.len() + extras.len());
        for key in self.fields.keys() {
            if invalid.contains(key.as_str()) && !skipped.contains(key.as_str()) {
                continue;
            }
            let field_value = if skipped.contains(key.as_str()) {
                value.get(key)
            } else {
                view.get(key)
            };
            if !field_value.is_missing() {
                out.insert(key.clone(), field_value.clone());
            }
        }
        out.extend(extras);
        Value::Object(out)
    }
}

impl<T> ObjectSchema<T>
where
    T: Shape + Serialize + DeserializeOwned,
{
    /// Validates a native value and rebuilds it from the validated fields.
    ///
    /// ```rust
    /// use assay::{shape, Schema};
    /// use serde::{Deserialize, Serialize};
    ///
    /// #[derive(Debug, PartialEq, Serialize, Deserialize)]
    /// struct User {
    ///     name: String,
    ///     age: u32,
    /// }
    ///
    /// shape!(User { "name": Text, "age": Number });
    ///
    /// let schema = Schema::object_of::<User>()
    ///     .field("name", Schema::text().required().trim())
    ///     .field("age", Schema::number::<u32>().max(150));
    ///
    /// let user = User { name: " Ann ".to_string(), age: 31 };
    /// let validated = schema.validate(&user).into_result().unwrap();
    /// assert_eq!(validated.name, "Ann");
    /// ```
    pub fn validate(&self, input: &T) -> Validation<T, ValidationError> {
        let lifted = match Value::lift(input) {
            Ok(lifted) => lifted,
            Err(e) => return Validation::Failure(decode_error("object.encode", e)),
        };
        match self.validate_any(&lifted, Options::default()) {
            Validation::Success(value) => match serde_json::from_value(value.to_json()) {
                Ok(native) => Validation::Success(native),
                Err(e) => Validation::Failure(decode_error("object.decode", e)),
            },
            Validation::Failure(error) => Validation::Failure(error),
        }
    }
}

fn decode_error(code: &str, error: serde_json::Error) -> ValidationError {
    ValidationError::single(Issue::new(FieldPath::root(), code, error.to_string()))
}

impl<T: Shape> Clone for ObjectSchema<T> {
    fn clone(&self) -> Self {
        Self {
            presence: self.presence.clone(),
            fields: self.fields.clone(),
            additional_properties: self.additional_properties.clone(),
            validators: self.validators.clone(),
            build_error: self.build_error.clone(),
            shape: PhantomData,
        }
    }
}

impl<T: Shape> Default for ObjectSchema<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Shape> fmt::Debug for ObjectSchema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectSchema")
            .field("fields", &self.field_names())
            .field("validators", &self.validators.len())
            .field("build_error", &self.build_error)
            .finish()
    }
}

impl<T: Shape> AnySchema for ObjectSchema<T> {
    fn validate_any(&self, value: &Value, options: Options) -> Validation<Value, ValidationError> {
        run_root(value, options, |value, ctx| self.check(value, ctx))
    }

    fn kind(&self) -> FieldKind {
        FieldKind::Object
    }

    fn is_nullable(&self) -> bool {
        self.presence.is_nullable()
    }

    fn construction_error(&self) -> Option<&SchemaBuildError> {
        self.build_error.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ArraySchema, NumberSchema, TextSchema};
    use serde_json::json;

    fn unwrap_success<T, E: std::fmt::Debug>(v: Validation<T, E>) -> T {
        v.into_result().unwrap()
    }

    fn unwrap_failure<T: std::fmt::Debug, E>(v: Validation<T, E>) -> E {
        v.into_result().unwrap_err()
    }

    fn run<T: Shape>(
        schema: &ObjectSchema<T>,
        value: serde_json::Value,
    ) -> Validation<Value, ValidationError> {
        schema.validate_any(&Value::from(value), Options::default())
    }

    #[test]
    fn test_empty_object_schema() {
        let schema: ObjectSchema = ObjectSchema::new();
        assert!(run(&schema, json!({})).is_success());
        assert!(run(&schema, json!({"extra": 1})).is_success());
    }

    #[test]
    fn test_rejects_non_object() {
        let schema: ObjectSchema = ObjectSchema::new();
        let errors = unwrap_failure(run(&schema, json!("nope")));
        assert_eq!(errors.first().code, "object.type");
    }

    #[test]
    fn test_required_field_missing() {
        let schema: ObjectSchema = ObjectSchema::new().field("name", TextSchema::new().required());
        let errors = unwrap_failure(run(&schema, json!({})));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.first().path.to_string(), "name");
        assert_eq!(errors.first().code, "text.required");
    }

    #[test]
    fn test_redeclared_field_keeps_slot() {
        let schema: ObjectSchema = ObjectSchema::new()
            .field("a", TextSchema::new())
            .field("b", TextSchema::new())
            .field("a", NumberSchema::<i64>::new());
        assert_eq!(schema.field_names(), vec!["a", "b"]);
        let errors = unwrap_failure(run(&schema, json!({"a": "text"})));
        assert_eq!(errors.first().code, "number.type");
    }

    #[test]
    fn test_redeclared_field_keeps_rules() {
        let schema: ObjectSchema = ObjectSchema::new()
            .field("password", TextSchema::new())
            .field("confirm", TextSchema::new())
            .eq_cs_field("confirm", "password")
            .field("confirm", TextSchema::new().min(1));
        let errors = unwrap_failure(run(&schema, json!({"password": "a", "confirm": "b"})));
        assert_eq!(errors.codes(), vec!["object.eq_cs_field"]);

        let errors = unwrap_failure(run(&schema, json!({"password": "", "confirm": ""})));
        assert_eq!(errors.codes(), vec!["text.min"]);
    }

    #[test]
    fn test_first_shape_error_survives_redeclaration() {
        struct Login;
        crate::shape!(Login { "user": Text });

        let schema = ObjectSchema::<Login>::new()
            .field("user", NumberSchema::<i64>::new())
            .field("user", TextSchema::new());
        assert!(matches!(
            schema.build(),
            Err(SchemaBuildError::KindMismatch { ref field, .. }) if field == "user"
        ));
    }

    #[test]
    fn test_conditionals_run_before_comparisons_across_fields() {
        let schema: ObjectSchema = ObjectSchema::new()
            .field("floor", NumberSchema::<i64>::new())
            .field("bid", NumberSchema::<i64>::new())
            .field("reason", TextSchema::new())
            .gt_field("bid", "floor")
            .required_if("reason", "floor", ConditionOp::Gt, 0);
        let errors = unwrap_failure(run(&schema, json!({"floor": 5, "bid": 1})));
        assert_eq!(errors.paths(), vec!["reason", "bid"]);
        assert_eq!(errors.codes(), vec!["object.required_if", "object.gt_field"]);
    }

    #[test]
    fn test_nested_paths() {
        let schema: ObjectSchema = ObjectSchema::new().field(
            "users",
            ArraySchema::new().items(
                ObjectSchema::<Dynamic>::new().field("email", TextSchema::new().email()),
            ),
        );
        let errors = unwrap_failure(run(
            &schema,
            json!({"users": [{"email": "a@example.com"}, {"email": "bad"}]}),
        ));
        assert_eq!(errors.paths(), vec!["users[1].email"]);
    }

    #[test]
    fn test_reassembles_validated_values() {
        let schema: ObjectSchema = ObjectSchema::new()
            .field("name", TextSchema::new().trim())
            .field("role", TextSchema::new().default("user"))
            .field("nickname", TextSchema::new());
        let value = unwrap_success(run(&schema, json!({"name": " Ann ", "extra": true})));
        assert_eq!(
            value.to_json(),
            json!({"name": "Ann", "role": "user", "extra": true})
        );
    }

    #[test]
    fn test_deny_additional_properties() {
        let schema: ObjectSchema = ObjectSchema::new()
            .field("id", NumberSchema::<u64>::new())
            .additional_properties(false);
        let errors = unwrap_failure(run(&schema, json!({"id": 1, "x": 1, "y": 2})));
        assert_eq!(errors.paths(), vec!["x", "y"]);
    }

    #[test]
    fn test_validate_additional_properties() {
        let schema: ObjectSchema =
            ObjectSchema::new().additional_properties(NumberSchema::<i64>::new().positive());
        let errors = unwrap_failure(run(&schema, json!({"a": 1, "b": -1})));
        assert_eq!(errors.paths(), vec!["b"]);
    }

    #[test]
    fn test_undeclared_rule_target_is_build_error() {
        let schema: ObjectSchema = ObjectSchema::new()
            .field("a", TextSchema::new())
            .eq_field("missing", "a");
        let error = schema.clone().build().unwrap_err();
        assert_eq!(
            error,
            SchemaBuildError::UndeclaredField {
                field: "missing".to_string(),
                rule: "eq_field",
            }
        );
        let errors = unwrap_failure(run(&schema, json!({"a": "x"})));
        assert_eq!(errors.codes(), vec!["schema.invalid"]);
    }

    #[test]
    fn test_build_is_repeatable() {
        let schema: ObjectSchema = ObjectSchema::new().field("a", TextSchema::new());
        let schema = schema.build().unwrap().build().unwrap();
        assert!(run(&schema, json!({"a": "x"})).is_success());
    }

    #[test]
    fn test_nested_construction_error() {
        let schema: ObjectSchema =
            ObjectSchema::new().field("code", TextSchema::new().pattern("[unclosed"));
        assert!(matches!(
            schema.build(),
            Err(SchemaBuildError::Nested { ref field, .. }) if field == "code"
        ));
    }

    #[test]
    fn test_skip_unless_discards_buffered_issues() {
        let schema: ObjectSchema = ObjectSchema::new()
            .field("method", TextSchema::new())
            .field("card", TextSchema::new().required().len(16))
            .skip_unless("card", "method", ConditionOp::Eq, "card");

        assert!(run(&schema, json!({"method": "cash"})).is_success());
        let errors = unwrap_failure(run(&schema, json!({"method": "card"})));
        assert_eq!(errors.paths(), vec!["card"]);
        assert_eq!(errors.first().code, "text.required");
    }

    #[test]
    fn test_stop_on_first_error_across_fields() {
        let schema: ObjectSchema = ObjectSchema::new()
            .field("a", TextSchema::new().required())
            .field("b", TextSchema::new().required());
        let collect = unwrap_failure(run(&schema, json!({})));
        assert_eq!(collect.len(), 2);

        let fail_fast = schema.validate_any(
            &Value::from(json!({})),
            Options::new().stop_on_first_error(true),
        );
        assert_eq!(unwrap_failure(fail_fast).len(), 1);
    }

    #[test]
    fn test_custom_validator_reads_resolved_values() {
        let schema: ObjectSchema = ObjectSchema::new()
            .field("quantity", NumberSchema::<i64>::new())
            .field("unit_price", NumberSchema::<i64>::new())
            .field("total", NumberSchema::<i64>::new())
            .custom(|view| {
                let get = |k: &str| {
                    view.get(k)
                        .as_number()
                        .and_then(|n| n.as_i128())
                        .unwrap_or(0)
                };
                if get("quantity") * get("unit_price") == get("total") {
                    Validation::Success(())
                } else {
                    Validation::Failure(ValidationError::single(Issue::new(
                        FieldPath::from_field("total"),
                        "order.total",
                        "total must equal quantity * unit_price",
                    )))
                }
            });

        assert!(run(&schema, json!({"quantity": 5, "unit_price": 10, "total": 50})).is_success());
        let errors = unwrap_failure(run(
            &schema,
            json!({"quantity": 5, "unit_price": 10, "total": 30}),
        ));
        assert_eq!(errors.first().code, "order.total");
        assert_eq!(errors.first().path.to_string(), "total");
    }
}
