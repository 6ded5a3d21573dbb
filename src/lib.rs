//! # Assay
//!
//! A structural validation engine that reports every issue with the exact
//! path where it occurred, rather than stopping at the first failure.
//!
//! ## Overview
//!
//! Input is decoded into a [`Value`] tree and checked against a schema built
//! with the [`Schema`] factories. A successful run returns the validated
//! value (with defaults applied and transforms run); a failed run returns a
//! [`ValidationError`] holding a non-empty list of [`Issue`]s. Results use
//! stillwater's `Validation` type for applicative error accumulation.
//!
//! ## Core Types
//!
//! - [`Value`]: the tagged input tree, with `Missing` distinct from `Null`
//! - [`Issue`]: one failure with its path, code, message and metadata
//! - [`ValidationError`]: a non-empty collection of issues
//! - [`Rule`]: a named check or transform over a native value
//! - [`Schema`]: entry point for creating validation schemas
//!
//! ## Example
//!
//! ```rust
//! use assay::{AnySchema, Options, Schema, Value};
//! use serde_json::json;
//!
//! let schema = Schema::object()
//!     .field("email", Schema::text().required().email())
//!     .field("tags", Schema::array().items(Schema::text().min(2)).max(3));
//!
//! let input = Value::from(json!({"email": "nope", "tags": ["ok", "x"]}));
//! let errors = schema
//!     .validate_any(&input, Options::default())
//!     .into_result()
//!     .unwrap_err();
//!
//! assert_eq!(errors.paths(), vec!["email", "tags[1]"]);
//! assert_eq!(errors.codes(), vec!["text.email", "text.min"]);
//! ```

pub mod context;
pub mod error;
pub mod path;
pub mod rule;
pub mod schema;
pub mod value;

pub use context::{Context, Options};
pub use error::{Issue, IssueList, Meta, MetaValue, SchemaBuildError, ValidationError};
pub use path::{FieldPath, PathSegment};
pub use rule::{Rule, Ruleset, Verdict};
pub use schema::{
    AdditionalPropertiesSetting, AnySchema, ArraySchema, BoolSchema, ConditionOp, Dynamic,
    FieldKind, FieldSpec, FieldView, NumberError, NumberSchema, Numeric, ObjectSchema,
    RecordSchema, Schema, Shape, TextSchema,
};
pub use value::{Number, Value};

/// Type alias for validation results carrying a [`ValidationError`].
pub type ValidationResult<T> = stillwater::Validation<T, ValidationError>;
