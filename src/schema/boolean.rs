//! Boolean schema validation.

use stillwater::Validation;

use crate::context::{Context, Options};
use crate::error::{Meta, ValidationError};
use crate::rule::{Rule, Ruleset};
use crate::value::Value;

use super::traits::{run_root, AnySchema, FieldKind, Presence, PresencePolicy};

/// A schema for validating boolean values.
///
/// # Example
///
/// ```rust
/// use assay::{AnySchema, Options, Schema, Value};
///
/// let accepted_terms = Schema::boolean().required().eq(true);
///
/// assert!(accepted_terms.validate_any(&Value::from(true), Options::default()).is_success());
/// assert!(accepted_terms.validate_any(&Value::from(false), Options::default()).is_failure());
/// ```
#[derive(Clone, Debug)]
pub struct BoolSchema {
    presence: PresencePolicy,
    rules: Ruleset<bool>,
}

impl BoolSchema {
    pub fn new() -> Self {
        Self {
            presence: PresencePolicy::new(FieldKind::Bool),
            rules: Ruleset::new(),
        }
    }

    pub fn required(mut self) -> Self {
        self.presence.set_required();
        self
    }

    pub fn non_nullable(mut self) -> Self {
        self.presence.set_non_nullable();
        self
    }

    pub fn default(mut self, value: bool) -> Self {
        self.presence.set_default(Value::Bool(value));
        self
    }

    /// Requires the value to equal `expected`.
    pub fn eq(mut self, expected: bool) -> Self {
        self.rules.push(Rule::predicate(
            "eq",
            "bool.eq",
            "must be equal",
            move |b: &bool| {
                if *b == expected {
                    Ok(())
                } else {
                    Err(Meta::new().with("expected", expected).with("actual", *b))
                }
            },
        ));
        self
    }

    pub fn rule(mut self, rule: Rule<bool>) -> Self {
        self.rules.push(rule);
        self
    }

    /// Sets a custom message for the most recent rule, or the type message
    /// when no rule exists yet.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        let message = message.into();
        if self.rules.is_empty() {
            self.presence.set_type_message(message);
        } else {
            self.rules.set_last_message(message);
        }
        self
    }

    /// Validates a native boolean.
    pub fn validate(&self, input: bool) -> Validation<bool, ValidationError> {
        self.validate_any(&Value::Bool(input), Options::default())
            .map(|value| value.as_bool().unwrap_or(input))
    }

    pub(crate) fn check(&self, value: &Value, ctx: &Context) -> Value {
        let value = match self.presence.resolve(value, ctx) {
            Presence::Present(value) => value,
            Presence::Done(value) => return value,
        };
        let Some(b) = value.as_bool() else {
            self.presence.type_mismatch(&value, ctx);
            return value.into_owned();
        };
        let (b, _) = self.rules.run(b, ctx);
        Value::Bool(b)
    }
}

impl Default for BoolSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl AnySchema for BoolSchema {
    fn validate_any(&self, value: &Value, options: Options) -> Validation<Value, ValidationError> {
        run_root(value, options, |value, ctx| self.check(value, ctx))
    }

    fn kind(&self) -> FieldKind {
        FieldKind::Bool
    }

    fn is_nullable(&self) -> bool {
        self.presence.is_nullable()
    }
}
