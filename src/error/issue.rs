//! Validation issue types.
//!
//! This module provides [`Issue`] for a single violation, [`IssueList`] for the
//! per-call accumulator, and [`ValidationError`] for the non-empty aggregate
//! returned to callers.

use std::fmt::{self, Display};

use indexmap::IndexMap;
use stillwater::prelude::*;

use crate::path::FieldPath;

/// A primitive metadata value attached to an [`Issue`].
#[derive(Debug, Clone, PartialEq)]
pub enum MetaValue {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
}

impl Display for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetaValue::Bool(b) => write!(f, "{}", b),
            MetaValue::Int(i) => write!(f, "{}", i),
            MetaValue::UInt(u) => write!(f, "{}", u),
            MetaValue::Float(x) => write!(f, "{}", x),
            MetaValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<bool> for MetaValue {
    fn from(b: bool) -> Self {
        MetaValue::Bool(b)
    }
}

impl From<&str> for MetaValue {
    fn from(s: &str) -> Self {
        MetaValue::Text(s.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(s: String) -> Self {
        MetaValue::Text(s)
    }
}

impl From<&String> for MetaValue {
    fn from(s: &String) -> Self {
        MetaValue::Text(s.clone())
    }
}

impl From<f32> for MetaValue {
    fn from(x: f32) -> Self {
        MetaValue::Float(x as f64)
    }
}

impl From<f64> for MetaValue {
    fn from(x: f64) -> Self {
        MetaValue::Float(x)
    }
}

macro_rules! meta_from_signed {
    ($($t:ty),*) => {$(
        impl From<$t> for MetaValue {
            fn from(n: $t) -> Self {
                MetaValue::Int(n as i64)
            }
        }
    )*};
}

macro_rules! meta_from_unsigned {
    ($($t:ty),*) => {$(
        impl From<$t> for MetaValue {
            fn from(n: $t) -> Self {
                MetaValue::UInt(n as u64)
            }
        }
    )*};
}

meta_from_signed!(i8, i16, i32, i64, isize);
meta_from_unsigned!(u8, u16, u32, u64, usize);

/// Structured, machine-readable details of an [`Issue`].
///
/// Consumers can localize or reformat messages from these entries without
/// parsing the human message.
///
/// # Example
///
/// ```rust
/// use assay::{Meta, MetaValue};
///
/// let meta = Meta::new().with("min", 3usize).with("actual", 1usize);
/// assert_eq!(meta.get("min"), Some(&MetaValue::UInt(3)));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Meta(IndexMap<String, MetaValue>);

impl Meta {
    /// Creates an empty metadata map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry and returns self for chaining.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<MetaValue>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Adds an entry in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<MetaValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &MetaValue)> {
        self.0.iter()
    }
}

/// A single constraint violation.
///
/// # Example
///
/// ```rust
/// use assay::{FieldPath, Issue};
///
/// let issue = Issue::new(FieldPath::from_field("name"), "text.min", "too short")
///     .with_meta("min", 3usize)
///     .with_meta("actual", 1usize);
///
/// assert_eq!(issue.code, "text.min");
/// assert_eq!(issue.path.to_string(), "name");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Issue {
    /// Stable machine-readable code (e.g. `text.min`).
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// Location of the offending value, relative to the validation root.
    pub path: FieldPath,
    /// Structured details such as bounds and actual values.
    pub meta: Meta,
}

impl Issue {
    /// Creates an issue with empty metadata.
    pub fn new(path: FieldPath, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            path,
            meta: Meta::new(),
        }
    }

    /// Adds a metadata entry and returns self for chaining.
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<MetaValue>) -> Self {
        self.meta.insert(key, value);
        self
    }

    /// Replaces the metadata map.
    pub fn with_meta_map(mut self, meta: Meta) -> Self {
        self.meta = meta;
        self
    }

    /// Returns a copy of this issue with `prefix` prepended to its path.
    pub fn rerooted(mut self, prefix: &FieldPath) -> Self {
        self.path = prefix.join(&self.path);
        self
    }
}

impl Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path_str = if self.path.is_root() {
            "(root)".to_string()
        } else {
            self.path.to_string()
        };

        write!(f, "{}: {} [{}]", path_str, self.message, self.code)?;

        if !self.meta.is_empty() {
            let details: Vec<String> = self
                .meta
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            write!(f, " ({})", details.join(", "))?;
        }

        Ok(())
    }
}

impl std::error::Error for Issue {}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<Issue>();
    assert_sync::<Issue>();
};

/// Ordered, append-only accumulator of issues for one validation call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IssueList(Vec<Issue>);

impl IssueList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an issue. Issues are never deduplicated.
    pub fn push(&mut self, issue: Issue) {
        self.0.push(issue);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Issue> {
        self.0.iter()
    }

    /// Converts the list into a [`ValidationError`], or `None` when empty.
    pub fn into_error(self) -> Option<ValidationError> {
        NonEmptyVec::from_vec(self.0).map(ValidationError)
    }
}

impl Extend<Issue> for IssueList {
    fn extend<I: IntoIterator<Item = Issue>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

/// The aggregate error returned when validation records at least one issue.
///
/// `ValidationError` wraps a `NonEmptyVec<Issue>`, so a failure always carries
/// at least one issue. Errors combine through `Semigroup`:
///
/// ```rust
/// use assay::{FieldPath, Issue, ValidationError};
/// use stillwater::prelude::*;
///
/// let a = ValidationError::single(Issue::new(FieldPath::from_field("name"), "text.required", "required"));
/// let b = ValidationError::single(Issue::new(FieldPath::from_field("email"), "text.email", "invalid email"));
///
/// assert_eq!(a.combine(b).len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError(NonEmptyVec<Issue>);

impl ValidationError {
    /// Creates an error containing a single issue.
    pub fn single(issue: Issue) -> Self {
        Self(NonEmptyVec::singleton(issue))
    }

    /// Creates an error from a `NonEmptyVec` of issues.
    pub fn from_non_empty(issues: NonEmptyVec<Issue>) -> Self {
        Self(issues)
    }

    /// Creates an error from a vec, or `None` if the vec is empty.
    pub fn from_vec(issues: Vec<Issue>) -> Option<Self> {
        NonEmptyVec::from_vec(issues).map(Self)
    }

    /// Returns the number of issues.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; present for API consistency.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> impl Iterator<Item = &Issue> {
        self.0.iter()
    }

    /// Returns all issues at the given path.
    pub fn at_path(&self, path: &FieldPath) -> Vec<&Issue> {
        self.0.iter().filter(|i| &i.path == path).collect()
    }

    /// Returns all issues whose rendered path equals `path`.
    pub fn at(&self, path: &str) -> Vec<&Issue> {
        self.0.iter().filter(|i| i.path.to_string() == path).collect()
    }

    /// Returns all issues with the given code.
    pub fn with_code(&self, code: &str) -> Vec<&Issue> {
        self.0.iter().filter(|i| i.code == code).collect()
    }

    /// Returns the first issue.
    pub fn first(&self) -> &Issue {
        self.0.head()
    }

    /// Returns the rendered paths of all issues, in order.
    pub fn paths(&self) -> Vec<String> {
        self.0.iter().map(|i| i.path.to_string()).collect()
    }

    /// Returns the codes of all issues, in order.
    pub fn codes(&self) -> Vec<&str> {
        self.0.iter().map(|i| i.code.as_str()).collect()
    }

    pub fn into_vec(self) -> Vec<Issue> {
        self.0.into_vec()
    }

    pub fn as_non_empty_vec(&self) -> &NonEmptyVec<Issue> {
        &self.0
    }
}

impl Semigroup for ValidationError {
    fn combine(self, other: Self) -> Self {
        ValidationError(self.0.combine(other.0))
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "validation failed with {} issue(s):", self.len())?;
        for (i, issue) in self.iter().enumerate() {
            writeln!(f, "  {}. {}", i + 1, issue)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

impl IntoIterator for ValidationError {
    type Item = Issue;
    type IntoIter = std::vec::IntoIter<Issue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_vec().into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationError {
    type Item = &'a Issue;
    type IntoIter = Box<dyn Iterator<Item = &'a Issue> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.0.iter())
    }
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<ValidationError>();
    assert_sync::<ValidationError>();
};
