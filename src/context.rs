//! Per-call validation state.
//!
//! A [`Context`] is created fresh for every top-level `validate_any` call. It
//! carries the current [`FieldPath`], the immutable [`Options`], and a shared
//! [`IssueList`]. Child contexts extend the path while sharing the list.

use std::cell::RefCell;
use std::rc::Rc;

use stillwater::Validation;

use crate::error::{Issue, IssueList, Meta, ValidationError};
use crate::path::{FieldPath, PathSegment};
use crate::value::Value;

/// Options recognised by every schema.
///
/// # Example
///
/// ```rust
/// use assay::Options;
///
/// let options = Options::new().stop_on_first_error(true);
/// assert!(options.stops_on_first_error());
/// assert!(!Options::default().stops_on_first_error());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Options {
    stop_on_first_error: bool,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop the current rule chain (and further field passes) after the first
    /// recorded issue.
    pub fn stop_on_first_error(mut self, stop: bool) -> Self {
        self.stop_on_first_error = stop;
        self
    }

    pub fn stops_on_first_error(&self) -> bool {
        self.stop_on_first_error
    }
}

/// Mutable state threaded through one validation call.
///
/// Cloning a context or calling [`Context::child`] yields a view onto the same
/// issue list. A context is never shared across threads.
#[derive(Debug, Clone)]
pub struct Context {
    path: FieldPath,
    issues: Rc<RefCell<IssueList>>,
    options: Options,
}

impl Context {
    /// Creates a root context with an empty issue list.
    pub fn new(options: Options) -> Self {
        Self {
            path: FieldPath::root(),
            issues: Rc::new(RefCell::new(IssueList::new())),
            options,
        }
    }

    pub fn options(&self) -> Options {
        self.options
    }

    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    /// Renders the current path with dot/bracket notation.
    pub fn path_string(&self) -> String {
        self.path.to_string()
    }

    /// Returns a context whose path is extended by `segment`, sharing this
    /// context's issues and options.
    pub fn child(&self, segment: impl Into<PathSegment>) -> Self {
        Self {
            path: self.path.push(segment),
            issues: Rc::clone(&self.issues),
            options: self.options,
        }
    }

    /// Returns a context at the same path with its own, empty issue list.
    ///
    /// Issues recorded there stay out of this context until [`Context::commit`].
    pub fn detached(&self) -> Self {
        Self {
            path: self.path.clone(),
            issues: Rc::new(RefCell::new(IssueList::new())),
            options: self.options,
        }
    }

    /// Moves every issue recorded on `other` into this context's list.
    pub fn commit(&self, other: &Context) {
        if Rc::ptr_eq(&self.issues, &other.issues) {
            return;
        }
        let taken = std::mem::take(&mut *other.issues.borrow_mut());
        self.issues.borrow_mut().extend(taken.iter().cloned());
    }

    /// Records an issue at the current path.
    ///
    /// Returns whether the caller should stop its rule chain.
    pub fn add_issue(&self, code: impl Into<String>, message: impl Into<String>) -> bool {
        self.add_issue_with_meta(code, message, Meta::new())
    }

    /// Records an issue with structured metadata at the current path.
    pub fn add_issue_with_meta(
        &self,
        code: impl Into<String>,
        message: impl Into<String>,
        meta: Meta,
    ) -> bool {
        let issue = Issue::new(self.path.clone(), code, message).with_meta_map(meta);
        self.issues.borrow_mut().push(issue);
        self.options.stop_on_first_error
    }

    /// Appends every issue of a nested call, re-rooted under
    /// `self.path + segment`.
    pub fn absorb(&self, error: ValidationError, segment: impl Into<PathSegment>) {
        let prefix = self.path.push(segment);
        let mut issues = self.issues.borrow_mut();
        for issue in error {
            issues.push(issue.rerooted(&prefix));
        }
    }

    /// Appends every issue of a nested call re-rooted at the current path.
    pub fn absorb_here(&self, error: ValidationError) {
        let mut issues = self.issues.borrow_mut();
        for issue in error {
            issues.push(issue.rerooted(&self.path));
        }
    }

    pub fn issue_count(&self) -> usize {
        self.issues.borrow().len()
    }

    pub fn has_issues(&self) -> bool {
        !self.issues.borrow().is_empty()
    }

    /// True once an issue exists and the options ask to stop at the first one.
    pub fn should_stop(&self) -> bool {
        self.options.stop_on_first_error && self.has_issues()
    }

    /// Finishes the call: success with `value` when no issue was recorded,
    /// otherwise a [`ValidationError`] carrying every issue.
    pub fn finish(&self, value: Value) -> Validation<Value, ValidationError> {
        let issues = std::mem::take(&mut *self.issues.borrow_mut());
        match issues.into_error() {
            None => Validation::Success(value),
            Some(error) => Validation::Failure(error),
        }
    }
}
