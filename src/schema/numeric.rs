//! Numeric schema validation.
//!
//! This module provides [`NumberSchema`] for validating numbers of any
//! primitive width, and the [`Numeric`] trait that maps decoded numbers into
//! that width.

use std::fmt::{self, Display};
use std::ops::RangeInclusive;

use stillwater::Validation;

use crate::context::{Context, Options};
use crate::error::{Meta, MetaValue, ValidationError};
use crate::rule::{Rule, Ruleset};
use crate::value::{Number, Value};

use super::traits::{join_display, run_root, AnySchema, FieldKind, Presence, PresencePolicy};

/// Why a decoded number does not fit a [`Numeric`] width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberError {
    /// A fractional (or NaN) value for an integer width.
    NotInteger,
    /// The value lies outside the width's range.
    Overflow,
}

impl Display for NumberError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumberError::NotInteger => write!(f, "not an integer"),
            NumberError::Overflow => write!(f, "out of range"),
        }
    }
}

/// A primitive numeric width a [`NumberSchema`] can validate into.
///
/// Implemented for every primitive integer and float type.
pub trait Numeric:
    Copy + PartialOrd + Display + Into<Value> + Into<MetaValue> + Send + Sync + 'static
{
    /// Name of the width, used in messages (e.g. `u8`).
    const NAME: &'static str;

    /// Normalizes a decoded number into this width.
    fn from_number(number: &Number) -> Result<Self, NumberError>;

    /// True only for a float NaN.
    fn is_nan(self) -> bool;

    fn zero() -> Self;
}

macro_rules! impl_numeric_integer {
    ($($t:ty),*) => {$(
        impl Numeric for $t {
            const NAME: &'static str = stringify!($t);

            fn from_number(number: &Number) -> Result<Self, NumberError> {
                if let Number::Float(f) = *number {
                    if f.is_nan() || (f.is_finite() && f.fract() != 0.0) {
                        return Err(NumberError::NotInteger);
                    }
                }
                let wide = number.as_i128().ok_or(NumberError::Overflow)?;
                <$t>::try_from(wide).map_err(|_| NumberError::Overflow)
            }

            fn is_nan(self) -> bool {
                false
            }

            fn zero() -> Self {
                0
            }
        }
    )*};
}

impl_numeric_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl Numeric for f64 {
    const NAME: &'static str = "f64";

    fn from_number(number: &Number) -> Result<Self, NumberError> {
        Ok(number.as_f64())
    }

    fn is_nan(self) -> bool {
        f64::is_nan(self)
    }

    fn zero() -> Self {
        0.0
    }
}

impl Numeric for f32 {
    const NAME: &'static str = "f32";

    fn from_number(number: &Number) -> Result<Self, NumberError> {
        let wide = number.as_f64();
        if wide.is_finite() && wide.abs() > f32::MAX as f64 {
            return Err(NumberError::Overflow);
        }
        Ok(wide as f32)
    }

    fn is_nan(self) -> bool {
        f32::is_nan(self)
    }

    fn zero() -> Self {
        0.0
    }
}

/// A schema for validating numbers of width `N`.
///
/// Ordering rules (`min`, `max`, `gt`, `positive`, ...) pass vacuously on
/// NaN. Equality rules compare after normalization into `N`.
///
/// # Example
///
/// ```rust
/// use assay::{AnySchema, Options, Schema, Value};
///
/// let schema = Schema::number::<u8>().required().range(1..=100);
///
/// assert!(schema.validate_any(&Value::from(42), Options::default()).is_success());
///
/// let errors = schema
///     .validate_any(&Value::from(300), Options::default())
///     .into_result()
///     .unwrap_err();
/// assert_eq!(errors.first().code, "number.overflow");
/// ```
pub struct NumberSchema<N: Numeric> {
    presence: PresencePolicy,
    rules: Ruleset<N>,
}

impl<N: Numeric> Clone for NumberSchema<N> {
    fn clone(&self) -> Self {
        Self {
            presence: self.presence.clone(),
            rules: self.rules.clone(),
        }
    }
}

impl<N: Numeric> fmt::Debug for NumberSchema<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NumberSchema")
            .field("width", &N::NAME)
            .field("presence", &self.presence)
            .field("rules", &self.rules)
            .finish()
    }
}

impl<N: Numeric> NumberSchema<N> {
    /// Creates a new, optional number schema with no rules.
    pub fn new() -> Self {
        Self {
            presence: PresencePolicy::new(FieldKind::Number),
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

    /// Substitutes `value` for a missing input before any rule runs.
    pub fn default(mut self, value: N) -> Self {
        self.presence.set_default(value.into());
        self
    }

    /// Requires a value of at least `min` (inclusive).
    pub fn min(self, min: N) -> Self {
        self.ordering("min", "number.min", "too small", min, |v, b| v < b)
    }

    /// Requires a value of at most `max` (inclusive).
    ///
    /// ```rust
    /// use assay::{AnySchema, Options, Schema, Value};
    ///
    /// let schema = Schema::number::<f64>().max(10.0);
    /// assert!(schema.validate_any(&Value::from(f64::NAN), Options::default()).is_success());
    /// assert!(schema.validate_any(&Value::from(10.5), Options::default()).is_failure());
    /// ```
    pub fn max(self, max: N) -> Self {
        self.ordering("max", "number.max", "too large", max, |v, b| v > b)
    }

    /// Equivalent to `.min(start).max(end)`.
    pub fn range(self, range: RangeInclusive<N>) -> Self {
        let (start, end) = range.into_inner();
        self.min(start).max(end)
    }

    pub fn gt(self, bound: N) -> Self {
        self.ordering("gt", "number.gt", "must be greater", bound, |v, b| v <= b)
    }

    pub fn gte(self, bound: N) -> Self {
        self.ordering("gte", "number.gte", "must be greater or equal", bound, |v, b| v < b)
    }

    pub fn lt(self, bound: N) -> Self {
        self.ordering("lt", "number.lt", "must be less", bound, |v, b| v >= b)
    }

    pub fn lte(self, bound: N) -> Self {
        self.ordering("lte", "number.lte", "must be less or equal", bound, |v, b| v > b)
    }

    /// Requires a value strictly greater than zero.
    pub fn positive(self) -> Self {
        self.sign("positive", "must be positive", |v| v > N::zero())
    }

    /// Requires a value strictly less than zero.
    pub fn negative(self) -> Self {
        self.sign("negative", "must be negative", |v| v < N::zero())
    }

    /// Requires a value of zero or more.
    pub fn non_negative(self) -> Self {
        self.sign("non_negative", "must not be negative", |v| v >= N::zero())
    }

    pub fn eq(self, expected: N) -> Self {
        self.push(Rule::predicate("eq", "number.eq", "must be equal", move |v: &N| {
            if *v == expected {
                Ok(())
            } else {
                Err(Meta::new().with("expected", expected).with("actual", *v))
            }
        }))
    }

    pub fn ne(self, unexpected: N) -> Self {
        self.push(Rule::predicate("ne", "number.ne", "must not be equal", move |v: &N| {
            if *v == unexpected {
                Err(Meta::new().with("unexpected", unexpected).with("actual", *v))
            } else {
                Ok(())
            }
        }))
    }

    pub fn one_of<I>(self, allowed: I) -> Self
    where
        I: IntoIterator<Item = N>,
    {
        let allowed: Vec<N> = allowed.into_iter().collect();
        self.push(Rule::predicate(
            "one_of",
            "number.one_of",
            "not an allowed value",
            move |v: &N| {
                if allowed.iter().any(|a| a == v) {
                    Ok(())
                } else {
                    Err(Meta::new()
                        .with("allowed", join_display(&allowed))
                        .with("actual", *v))
                }
            },
        ))
    }

    /// Appends a custom rule.
    pub fn rule(self, rule: Rule<N>) -> Self {
        self.push(rule)
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

    /// Validates a native number.
    pub fn validate(&self, input: N) -> Validation<N, ValidationError> {
        self.validate_any(&input.into(), Options::default())
            .map(|value| {
                value
                    .as_number()
                    .and_then(|n| N::from_number(n).ok())
                    .unwrap_or(input)
            })
    }

    fn push(mut self, rule: Rule<N>) -> Self {
        self.rules.push(rule);
        self
    }

    fn ordering(
        self,
        name: &'static str,
        code: &'static str,
        message: &'static str,
        bound: N,
        violates: fn(N, N) -> bool,
    ) -> Self {
        self.push(Rule::predicate(name, code, message, move |v: &N| {
            if v.is_nan() || !violates(*v, bound) {
                Ok(())
            } else {
                Err(Meta::new().with(name, bound).with("actual", *v))
            }
        }))
    }

    fn sign(self, name: &'static str, message: &'static str, holds: fn(N) -> bool) -> Self {
        self.push(Rule::predicate(
            name,
            format!("number.{}", name),
            message,
            move |v: &N| {
                if v.is_nan() || holds(*v) {
                    Ok(())
                } else {
                    Err(Meta::new().with("actual", *v))
                }
            },
        ))
    }

    pub(crate) fn check(&self, value: &Value, ctx: &Context) -> Value {
        let value = match self.presence.resolve(value, ctx) {
            Presence::Present(value) => value,
            Presence::Done(value) => return value,
        };
        let Some(number) = value.as_number() else {
            self.presence.type_mismatch(&value, ctx);
            return value.into_owned();
        };
        let n = match N::from_number(number) {
            Ok(n) => n,
            Err(error) => {
                let (code, message) = match error {
                    NumberError::NotInteger => {
                        ("number.integer", format!("expected an integer ({})", N::NAME))
                    }
                    NumberError::Overflow => {
                        ("number.overflow", format!("out of range for {}", N::NAME))
                    }
                };
                ctx.add_issue_with_meta(
                    code,
                    message,
                    Meta::new()
                        .with("type", N::NAME)
                        .with("actual", number.to_string()),
                );
                return value.into_owned();
            }
        };
        let (n, _) = self.rules.run(n, ctx);
        n.into()
    }
}

impl<N: Numeric> Default for NumberSchema<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: Numeric> AnySchema for NumberSchema<N> {
    fn validate_any(&self, value: &Value, options: Options) -> Validation<Value, ValidationError> {
        run_root(value, options, |value, ctx| self.check(value, ctx))
    }

    fn kind(&self) -> FieldKind {
        FieldKind::Number
    }

    fn is_nullable(&self) -> bool {
        self.presence.is_nullable()
    }
}
