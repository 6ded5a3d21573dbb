//! Error types for validation and schema construction.
//!
//! Validation failures are accumulated as [`Issue`]s and returned together as a
//! [`ValidationError`]. Problems with the schema itself are reported as
//! [`SchemaBuildError`].

mod build;
mod issue;

pub use build::SchemaBuildError;
pub use issue::{Issue, IssueList, Meta, MetaValue, ValidationError};
