//! Text schema validation.
//!
//! This module provides [`TextSchema`] for validating string values with
//! length bounds, patterns, categorical sets, semantic formats and transforms.

use std::sync::Arc;

use regex::Regex;
use stillwater::Validation;

use crate::context::{Context, Options};
use crate::error::{Meta, SchemaBuildError, ValidationError};
use crate::rule::{Rule, Ruleset};
use crate::value::Value;

use super::format::{self, Digest};
use super::traits::{
    join_display, report_invalid, run_root, AnySchema, FieldKind, Presence, PresencePolicy,
};

/// A schema for validating string values.
///
/// Rules run in declaration order. Transforms such as [`TextSchema::trim`]
/// change the value seen by every later rule and the reconstructed output.
///
/// # Example
///
/// ```rust
/// use assay::{AnySchema, Options, Schema, Value};
///
/// let schema = Schema::text()
///     .required()
///     .trim()
///     .min(3)
///     .max(20);
///
/// let result = schema.validate_any(&Value::from("  alice "), Options::default());
/// assert_eq!(result.into_result().unwrap(), Value::from("alice"));
///
/// let result = schema.validate_any(&Value::from("al"), Options::default());
/// assert!(result.is_failure());
/// ```
#[derive(Clone, Debug)]
pub struct TextSchema {
    presence: PresencePolicy,
    rules: Ruleset<String>,
    build_error: Option<SchemaBuildError>,
}

impl TextSchema {
    /// Creates a new, optional text schema with no rules.
    pub fn new() -> Self {
        Self {
            presence: PresencePolicy::new(FieldKind::Text),
            rules: Ruleset::new(),
            build_error: None,
        }
    }

    /// Rejects a missing value with `text.required`.
    pub fn required(mut self) -> Self {
        self.presence.set_required();
        self
    }

    /// Treats an explicit `null` like a missing value.
    pub fn non_nullable(mut self) -> Self {
        self.presence.set_non_nullable();
        self
    }

    /// Substitutes `value` for a missing input before any rule runs.
    pub fn default(mut self, value: impl Into<String>) -> Self {
        self.presence.set_default(Value::String(value.into()));
        self
    }

    /// Substitutes a freshly computed value for a missing input.
    pub fn default_with<F>(mut self, make: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        self.presence
            .set_default_with(Arc::new(move || Value::String(make())));
        self
    }

    /// Requires exactly `len` characters.
    pub fn len(self, len: usize) -> Self {
        self.push(Rule::predicate("len", "text.len", "invalid length", move |s: &String| {
            let actual = s.chars().count();
            if actual == len {
                Ok(())
            } else {
                Err(Meta::new().with("len", len).with("actual", actual))
            }
        }))
    }

    /// Requires at least `min` characters.
    pub fn min(self, min: usize) -> Self {
        self.push(Rule::predicate("min", "text.min", "too short", move |s: &String| {
            let actual = s.chars().count();
            if actual < min {
                Err(Meta::new().with("min", min).with("actual", actual))
            } else {
                Ok(())
            }
        }))
    }

    /// Requires at most `max` characters.
    pub fn max(self, max: usize) -> Self {
        self.push(Rule::predicate("max", "text.max", "too long", move |s: &String| {
            let actual = s.chars().count();
            if actual > max {
                Err(Meta::new().with("max", max).with("actual", actual))
            } else {
                Ok(())
            }
        }))
    }

    /// Requires a match of the regular expression `pattern`.
    ///
    /// An invalid expression is recorded as the schema's construction error;
    /// the builder stays chainable.
    ///
    /// ```rust
    /// use assay::{AnySchema, Schema};
    ///
    /// let broken = Schema::text().pattern("([a-z").min(1);
    /// assert!(broken.construction_error().is_some());
    /// ```
    pub fn pattern(mut self, pattern: &str) -> Self {
        let regex = match Regex::new(pattern) {
            Ok(regex) => regex,
            Err(e) => {
                if self.build_error.is_none() {
                    self.build_error = Some(SchemaBuildError::InvalidPattern {
                        pattern: pattern.to_string(),
                        reason: e.to_string(),
                    });
                }
                return self;
            }
        };
        let source = pattern.to_string();
        self.push(Rule::predicate(
            "pattern",
            "text.pattern",
            "does not match pattern",
            move |s: &String| {
                if regex.is_match(s) {
                    Ok(())
                } else {
                    Err(Meta::new().with("pattern", source.as_str()))
                }
            },
        ))
    }

    /// Requires one of `allowed`, compared exactly.
    pub fn one_of<I, S>(self, allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let allowed: Vec<String> = allowed.into_iter().map(Into::into).collect();
        self.push(Rule::predicate(
            "one_of",
            "text.one_of",
            "not an allowed value",
            move |s: &String| {
                if allowed.contains(s) {
                    Ok(())
                } else {
                    Err(Meta::new()
                        .with("allowed", join_display(&allowed))
                        .with("actual", s))
                }
            },
        ))
    }

    pub fn email(self) -> Self {
        self.format("email", "text.email", "invalid email", format::is_email)
    }

    /// Requires an absolute URL with a host.
    pub fn url(self) -> Self {
        self.format("url", "text.url", "invalid url", format::is_url)
    }

    /// Requires any absolute URI.
    pub fn uri(self) -> Self {
        self.format("uri", "text.uri", "invalid uri", format::is_uri)
    }

    /// Requires a hyphenated UUID.
    pub fn uuid(self) -> Self {
        self.format("uuid", "text.uuid", "invalid uuid", format::is_uuid)
    }

    /// Requires an IPv4 or IPv6 network in CIDR notation.
    pub fn cidr(self) -> Self {
        self.format("cidr", "text.cidr", "invalid cidr", format::is_cidr)
    }

    /// Requires a hex-encoded MD5 digest (16 bytes).
    pub fn md5(self) -> Self {
        self.digest(Digest::Md5)
    }

    /// Requires a hex-encoded SHA-1 digest (20 bytes).
    pub fn sha1(self) -> Self {
        self.digest(Digest::Sha1)
    }

    /// Requires a hex-encoded SHA-224 digest (28 bytes).
    pub fn sha224(self) -> Self {
        self.digest(Digest::Sha224)
    }

    /// Requires a hex-encoded SHA-256 digest (32 bytes).
    ///
    /// ```rust
    /// use assay::{AnySchema, Options, Schema, Value};
    ///
    /// let schema = Schema::text().sha256();
    /// let digest = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";
    /// assert!(schema.validate_any(&Value::from(digest), Options::default()).is_success());
    /// assert!(schema.validate_any(&Value::from(&digest[..62]), Options::default()).is_failure());
    /// ```
    pub fn sha256(self) -> Self {
        self.digest(Digest::Sha256)
    }

    /// Requires a hex-encoded SHA-384 digest (48 bytes).
    pub fn sha384(self) -> Self {
        self.digest(Digest::Sha384)
    }

    pub fn starts_with(self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        self.push(Rule::predicate(
            "starts_with",
            "text.starts_with",
            format!("must start with '{}'", prefix),
            move |s: &String| {
                if s.starts_with(prefix.as_str()) {
                    Ok(())
                } else {
                    Err(Meta::new().with("prefix", prefix.as_str()))
                }
            },
        ))
    }

    pub fn ends_with(self, suffix: impl Into<String>) -> Self {
        let suffix = suffix.into();
        self.push(Rule::predicate(
            "ends_with",
            "text.ends_with",
            format!("must end with '{}'", suffix),
            move |s: &String| {
                if s.ends_with(suffix.as_str()) {
                    Ok(())
                } else {
                    Err(Meta::new().with("suffix", suffix.as_str()))
                }
            },
        ))
    }

    pub fn contains(self, needle: impl Into<String>) -> Self {
        let needle = needle.into();
        self.push(Rule::predicate(
            "contains",
            "text.contains",
            format!("must contain '{}'", needle),
            move |s: &String| {
                if s.contains(needle.as_str()) {
                    Ok(())
                } else {
                    Err(Meta::new().with("substring", needle.as_str()))
                }
            },
        ))
    }

    pub fn excludes(self, needle: impl Into<String>) -> Self {
        let needle = needle.into();
        self.push(Rule::predicate(
            "excludes",
            "text.excludes",
            format!("must not contain '{}'", needle),
            move |s: &String| {
                if s.contains(needle.as_str()) {
                    Err(Meta::new().with("substring", needle.as_str()))
                } else {
                    Ok(())
                }
            },
        ))
    }

    /// Strips leading and trailing whitespace.
    pub fn trim(self) -> Self {
        self.push(Rule::transform("trim", |s: String| {
            let trimmed = s.trim();
            if trimmed.len() == s.len() {
                s
            } else {
                trimmed.to_string()
            }
        }))
    }

    pub fn lowercase(self) -> Self {
        self.push(Rule::transform("lowercase", |s: String| s.to_lowercase()))
    }

    /// Appends a custom rule.
    pub fn rule(self, rule: Rule<String>) -> Self {
        self.push(rule)
    }

    /// Sets a custom message for the most recent rule.
    ///
    /// If no rule has been added yet, this sets the type error message.
    ///
    /// ```rust
    /// use assay::{AnySchema, Options, Schema, Value};
    ///
    /// let schema = Schema::text().min(5).error("username must be at least 5 characters");
    /// let errors = schema
    ///     .validate_any(&Value::from("bob"), Options::default())
    ///     .into_result()
    ///     .unwrap_err();
    /// assert_eq!(errors.first().message, "username must be at least 5 characters");
    /// ```
    pub fn error(mut self, message: impl Into<String>) -> Self {
        let message = message.into();
        if self.rules.is_empty() {
            self.presence.set_type_message(message);
        } else {
            self.rules.set_last_message(message);
        }
        self
    }

    /// Validates a native string.
    pub fn validate(&self, input: &str) -> Validation<String, ValidationError> {
        self.validate_any(&Value::from(input), Options::default())
            .map(|value| match value {
                Value::String(s) => s,
                _ => input.to_string(),
            })
    }

    fn push(mut self, rule: Rule<String>) -> Self {
        self.rules.push(rule);
        self
    }

    fn format(
        self,
        name: &'static str,
        code: &'static str,
        message: &'static str,
        check: fn(&str) -> bool,
    ) -> Self {
        self.push(Rule::predicate(name, code, message, move |s: &String| {
            if check(s) {
                Ok(())
            } else {
                Err(Meta::new().with("actual", s))
            }
        }))
    }

    fn digest(self, digest: Digest) -> Self {
        let size = digest.size();
        self.push(Rule::predicate(
            digest.name(),
            format!("text.{}", digest.name()),
            format!("invalid {}", digest.name()),
            move |s: &String| {
                if format::is_hex_digest(s, size) {
                    Ok(())
                } else {
                    Err(Meta::new().with("size", size).with("actual", s))
                }
            },
        ))
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
        let Some(text) = value.as_str() else {
            self.presence.type_mismatch(&value, ctx);
            return value.into_owned();
        };
        let (text, _) = self.rules.run(text.to_string(), ctx);
        Value::String(text)
    }
}

impl Default for TextSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl AnySchema for TextSchema {
    fn validate_any(&self, value: &Value, options: Options) -> Validation<Value, ValidationError> {
        run_root(value, options, |value, ctx| self.check(value, ctx))
    }

    fn kind(&self) -> FieldKind {
        FieldKind::Text
    }

    fn is_nullable(&self) -> bool {
        self.presence.is_nullable()
    }

    fn construction_error(&self) -> Option<&SchemaBuildError> {
        self.build_error.as_ref()
    }
}
