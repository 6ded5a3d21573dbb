//! Traits and shared plumbing for schema polymorphism.
//!
//! This module provides the [`AnySchema`] trait that lets schemas of different
//! kinds (text, number, array, object, ...) be nested inside each other, and
//! the presence handling every kind schema runs before its rule chain.

use std::borrow::Cow;
use std::fmt::{self, Display};
use std::sync::Arc;

use stillwater::Validation;

use crate::context::{Context, Options};
use crate::error::{Meta, SchemaBuildError, ValidationError};
use crate::value::Value;

/// The native kind a schema validates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Text,
    Number,
    Bool,
    Array,
    Record,
    Object,
}

impl FieldKind {
    /// Prefix used for issue codes of this kind (e.g. `text.required`).
    pub fn code_prefix(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Number => "number",
            FieldKind::Bool => "bool",
            FieldKind::Array => "array",
            FieldKind::Record => "record",
            FieldKind::Object => "object",
        }
    }

    /// Name of the [`Value`] tag this kind accepts.
    pub fn expected_type(&self) -> &'static str {
        match self {
            FieldKind::Text => "string",
            FieldKind::Number => "number",
            FieldKind::Bool => "bool",
            FieldKind::Array => "array",
            FieldKind::Record | FieldKind::Object => "object",
        }
    }
}

impl Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code_prefix())
    }
}

/// A schema that validates [`Value`] trees.
///
/// `AnySchema` is the uniform entry point shared by every schema kind, so
/// schemas can be composed: an array holds an item schema, a record holds
/// key and value schemas, and an object holds one schema per field, all as
/// `Arc<dyn AnySchema>`.
///
/// The `Send + Sync` bounds allow a built schema to be shared across threads
/// and used concurrently for independent validation calls.
///
/// # Example
///
/// ```rust
/// use assay::{AnySchema, Options, Schema, Value};
///
/// let schemas: Vec<Box<dyn AnySchema>> = vec![
///     Box::new(Schema::text().min(1)),
///     Box::new(Schema::number::<i64>().positive()),
/// ];
///
/// let result = schemas[1].validate_any(&Value::from(-3), Options::default());
/// assert!(result.is_failure());
/// ```
pub trait AnySchema: Send + Sync {
    /// Validates `value`, returning the reconstructed value or every issue.
    ///
    /// Issue paths are relative to `value`.
    fn validate_any(&self, value: &Value, options: Options) -> Validation<Value, ValidationError>;

    /// The kind of value this schema accepts.
    fn kind(&self) -> FieldKind;

    /// Whether an explicit `Null` short-circuits to success.
    fn is_nullable(&self) -> bool {
        true
    }

    /// The construction error recorded while building this schema, if any.
    fn construction_error(&self) -> Option<&SchemaBuildError> {
        None
    }
}

impl<S: AnySchema + ?Sized> AnySchema for Arc<S> {
    fn validate_any(&self, value: &Value, options: Options) -> Validation<Value, ValidationError> {
        (**self).validate_any(value, options)
    }

    fn kind(&self) -> FieldKind {
        (**self).kind()
    }

    fn is_nullable(&self) -> bool {
        (**self).is_nullable()
    }

    fn construction_error(&self) -> Option<&SchemaBuildError> {
        (**self).construction_error()
    }
}

/// A default substituted for absent values.
#[derive(Clone)]
pub(crate) enum DefaultValue {
    Static(Value),
    Computed(Arc<dyn Fn() -> Value + Send + Sync>),
}

impl DefaultValue {
    fn produce(&self) -> Value {
        match self {
            DefaultValue::Static(value) => value.clone(),
            DefaultValue::Computed(make) => make(),
        }
    }
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Static(value) => f.debug_tuple("Static").field(value).finish(),
            DefaultValue::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// Outcome of the presence checks.
pub(crate) enum Presence<'a> {
    /// A concrete value (possibly a substituted default) the rules should see.
    Present(Cow<'a, Value>),
    /// Validation of this value is finished.
    Done(Value),
}

/// Required/nullable/default policy shared by every kind schema.
#[derive(Debug, Clone)]
pub(crate) struct PresencePolicy {
    kind: FieldKind,
    required: bool,
    nullable: bool,
    default: Option<DefaultValue>,
    type_message: Option<String>,
}

impl PresencePolicy {
    pub(crate) fn new(kind: FieldKind) -> Self {
        Self {
            kind,
            required: false,
            nullable: true,
            default: None,
            type_message: None,
        }
    }

    pub(crate) fn set_required(&mut self) {
        self.required = true;
    }

    pub(crate) fn set_non_nullable(&mut self) {
        self.nullable = false;
    }

    pub(crate) fn set_default(&mut self, value: Value) {
        self.default = Some(DefaultValue::Static(value));
    }

    pub(crate) fn set_default_with(&mut self, make: Arc<dyn Fn() -> Value + Send + Sync>) {
        self.default = Some(DefaultValue::Computed(make));
    }

    pub(crate) fn set_type_message(&mut self, message: impl Into<String>) {
        self.type_message = Some(message.into());
    }

    pub(crate) fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Applies the missing/null/default rules to `value`.
    pub(crate) fn resolve<'a>(&self, value: &'a Value, ctx: &Context) -> Presence<'a> {
        let absent = value.is_missing() || (value.is_null() && !self.nullable);
        if absent {
            if let Some(default) = &self.default {
                return Presence::Present(Cow::Owned(default.produce()));
            }
            if self.required {
                let code = format!("{}.required", self.kind.code_prefix());
                ctx.add_issue(code, "is required");
            }
            return Presence::Done(value.clone());
        }
        if value.is_null() {
            return Presence::Done(Value::Null);
        }
        Presence::Present(Cow::Borrowed(value))
    }

    /// Records a `<kind>.type` issue for a value of the wrong tag.
    pub(crate) fn type_mismatch(&self, value: &Value, ctx: &Context) -> bool {
        let expected = self.kind.expected_type();
        let message = self
            .type_message
            .clone()
            .unwrap_or_else(|| format!("expected {}, got {}", expected, value.type_name()));
        ctx.add_issue_with_meta(
            format!("{}.type", self.kind.code_prefix()),
            message,
            Meta::new()
                .with("expected", expected)
                .with("actual", value.type_name()),
        )
    }
}

/// Records a `schema.invalid` issue for a schema that failed to build.
pub(crate) fn report_invalid(error: &SchemaBuildError, ctx: &Context) {
    tracing::error!(error = %error, "validating with a schema that failed to build");
    ctx.add_issue_with_meta(
        "schema.invalid",
        "schema is invalid",
        Meta::new().with("details", error.to_string()),
    );
}

/// Runs a kind schema's body in a fresh root context.
pub(crate) fn run_root<F>(value: &Value, options: Options, body: F) -> Validation<Value, ValidationError>
where
    F: FnOnce(&Value, &Context) -> Value,
{
    let ctx = Context::new(options);
    let out = body(value, &ctx);
    ctx.finish(out)
}

/// Formats a list of allowed values for `one_of` metadata.
pub(crate) fn join_display<T: Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
