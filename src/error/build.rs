//! Schema construction errors.

use crate::schema::FieldKind;

/// A failure detected while composing a schema.
///
/// Builders never panic mid-chain. The first construction error is recorded
/// on the schema and surfaces from `build()` or on the next validation call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaBuildError {
    /// A schema of one kind was attached to a field declared as another kind.
    #[error("field '{field}' is declared as {declared}, attached schema is {attached}")]
    KindMismatch {
        field: String,
        declared: FieldKind,
        attached: FieldKind,
    },

    /// The field key is not part of the declared shape.
    #[error("field '{0}' is not declared by the shape")]
    UnknownField(String),

    /// A conditional or cross-field rule targets a field that was not declared.
    #[error("{rule} targets undeclared field '{field}'")]
    UndeclaredField { field: String, rule: &'static str },

    /// A text pattern failed to compile.
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// A nested schema carries its own construction error.
    #[error("field '{field}': {source}")]
    Nested {
        field: String,
        #[source]
        source: Box<SchemaBuildError>,
    },
}

impl SchemaBuildError {
    /// Wraps this error as belonging to `field`.
    pub fn nested(self, field: impl Into<String>) -> Self {
        SchemaBuildError::Nested {
            field: field.into(),
            source: Box::new(self),
        }
    }
}
