//! Rules and rule chains.
//!
//! A [`Rule`] is a named unit of logic over a typed value. It may transform
//! the value and either passes or fails with structured metadata. A failing
//! rule records an issue under its stable `code`. A [`Ruleset`] runs rules in
//! declaration order and halts at the first rule that asks to stop.

use std::fmt;
use std::sync::Arc;

use crate::context::Context;
use crate::error::Meta;

/// Outcome of a single rule check.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Pass,
    Fail(Meta),
}

type CheckFn<T> = Arc<dyn Fn(T) -> (T, Verdict) + Send + Sync>;

/// A named check or transform over values of type `T`.
///
/// # Example
///
/// ```rust
/// use assay::{AnySchema, Meta, Options, Rule, Schema, Value};
///
/// let no_spaces = Rule::predicate("no_spaces", "username.spaces", "must not contain spaces",
///     |s: &String| if s.contains(' ') { Err(Meta::new()) } else { Ok(()) });
///
/// let schema = Schema::text().rule(no_spaces);
/// let result = schema.validate_any(&Value::from("john doe"), Options::default());
/// assert!(result.is_failure());
/// ```
pub struct Rule<T> {
    name: &'static str,
    code: String,
    message: String,
    check: CheckFn<T>,
}

impl<T> Clone for Rule<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            code: self.code.clone(),
            message: self.message.clone(),
            check: Arc::clone(&self.check),
        }
    }
}

impl<T> fmt::Debug for Rule<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("code", &self.code)
            .field("message", &self.message)
            .finish()
    }
}

impl<T: 'static> Rule<T> {
    /// Creates a rule from a check that may transform its input.
    pub fn new<F>(
        name: &'static str,
        code: impl Into<String>,
        message: impl Into<String>,
        check: F,
    ) -> Self
    where
        F: Fn(T) -> (T, Verdict) + Send + Sync + 'static,
    {
        Self {
            name,
            code: code.into(),
            message: message.into(),
            check: Arc::new(check),
        }
    }

    /// Creates a non-transforming rule from a predicate.
    ///
    /// The predicate returns `Ok(())` on success and `Err(meta)` on failure.
    pub fn predicate<F>(
        name: &'static str,
        code: impl Into<String>,
        message: impl Into<String>,
        test: F,
    ) -> Self
    where
        F: Fn(&T) -> Result<(), Meta> + Send + Sync + 'static,
    {
        Self::new(name, code, message, move |value: T| {
            let verdict = match test(&value) {
                Ok(()) => Verdict::Pass,
                Err(meta) => Verdict::Fail(meta),
            };
            (value, verdict)
        })
    }

    /// Creates a rule that only transforms its input and never fails.
    pub fn transform<F>(name: &'static str, map: F) -> Self
    where
        F: Fn(T) -> T + Send + Sync + 'static,
    {
        Self::new(name, "", "", move |value: T| (map(value), Verdict::Pass))
    }
}

impl<T> Rule<T> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Replaces the stable issue code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    /// Replaces the issue message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Runs the rule, recording an issue on failure.
    ///
    /// Returns the (possibly transformed) value and whether the chain stops.
    pub fn apply(&self, value: T, ctx: &Context) -> (T, bool) {
        let (value, verdict) = (self.check)(value);
        match verdict {
            Verdict::Pass => (value, false),
            Verdict::Fail(meta) => {
                let stop = ctx.add_issue_with_meta(self.code.clone(), self.message.clone(), meta);
                (value, stop)
            }
        }
    }
}

/// An ordered chain of rules for one value kind.
pub struct Ruleset<T> {
    rules: Vec<Rule<T>>,
}

impl<T> Clone for Ruleset<T> {
    fn clone(&self) -> Self {
        Self {
            rules: self.rules.clone(),
        }
    }
}

impl<T> fmt::Debug for Ruleset<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.rules.iter()).finish()
    }
}

impl<T> Default for Ruleset<T> {
    fn default() -> Self {
        Self { rules: Vec::new() }
    }
}

impl<T> Ruleset<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, rule: Rule<T>) {
        self.rules.push(rule);
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Names of the rules in evaluation order.
    pub fn names(&self) -> Vec<&'static str> {
        self.rules.iter().map(Rule::name).collect()
    }

    /// Overrides the message of the most recently added rule.
    ///
    /// Returns false when the chain is empty.
    pub fn set_last_message(&mut self, message: impl Into<String>) -> bool {
        match self.rules.last_mut() {
            Some(rule) => {
                rule.message = message.into();
                true
            }
            None => false,
        }
    }

    /// Runs every rule in order until one asks to stop.
    pub fn run(&self, mut value: T, ctx: &Context) -> (T, bool) {
        for rule in &self.rules {
            let (next, stop) = rule.apply(value, ctx);
            value = next;
            if stop {
                return (value, true);
            }
        }
        (value, false)
    }
}
