//! Schema definitions for validation.
//!
//! This module provides one schema type per value kind. Each schema validates
//! a [`Value`](crate::Value), accumulating every issue rather than stopping
//! at the first failure unless [`Options`](crate::Options) asks it to.
//!
//! # Example
//!
//! ```rust
//! use assay::{AnySchema, Options, Schema, Value};
//!
//! let schema = Schema::text().min(1).max(100);
//!
//! let result = schema.validate_any(&Value::from("hello"), Options::default());
//! assert!(result.is_success());
//! ```

mod array;
mod boolean;
mod count;
mod format;
mod numeric;
mod object;
mod record;
mod text;
pub(crate) mod traits;

pub use array::ArraySchema;
pub use boolean::BoolSchema;
pub use numeric::{NumberError, NumberSchema, Numeric};
pub use object::{
    AdditionalPropertiesSetting, ConditionOp, Dynamic, FieldSpec, FieldView, ObjectSchema, Shape,
};
pub use record::RecordSchema;
pub use text::TextSchema;
pub use traits::{AnySchema, FieldKind};

/// Entry point for creating validation schemas.
///
/// `Schema` provides one factory per value kind. Each schema supports
/// constraints through a builder pattern, and every builder returns a new
/// schema that can be shared across threads once built.
///
/// # Example
///
/// ```rust
/// use assay::Schema;
///
/// let name = Schema::text().required().min(1).max(100);
/// let age = Schema::number::<u8>().max(150);
/// let tags = Schema::array().items(Schema::text()).unique();
/// ```
pub struct Schema;

impl Schema {
    /// Creates a new text schema.
    ///
    /// # Example
    ///
    /// ```rust
    /// use assay::{AnySchema, Options, Schema, Value};
    ///
    /// let schema = Schema::text().min(5);
    ///
    /// assert!(schema.validate_any(&Value::from("hello"), Options::default()).is_success());
    /// assert!(schema.validate_any(&Value::from("hi"), Options::default()).is_failure());
    /// ```
    pub fn text() -> TextSchema {
        TextSchema::new()
    }

    /// Creates a new number schema for the target type `N`.
    ///
    /// Integer targets reject fractional values and values outside the
    /// target's range.
    ///
    /// # Example
    ///
    /// ```rust
    /// use assay::{AnySchema, Options, Schema, Value};
    ///
    /// let schema = Schema::number::<i32>().min(0).max(100);
    ///
    /// assert!(schema.validate_any(&Value::from(50), Options::default()).is_success());
    /// assert!(schema.validate_any(&Value::from(-5), Options::default()).is_failure());
    /// assert!(schema.validate_any(&Value::from(1.5), Options::default()).is_failure());
    /// ```
    pub fn number<N: Numeric>() -> NumberSchema<N> {
        NumberSchema::new()
    }

    /// Creates a new boolean schema.
    pub fn boolean() -> BoolSchema {
        BoolSchema::new()
    }

    /// Creates a new array schema.
    ///
    /// ```rust
    /// use assay::{AnySchema, Options, Schema, Value};
    /// use serde_json::json;
    ///
    /// let schema = Schema::array().items(Schema::number::<i64>()).min(1);
    /// let errors = schema
    ///     .validate_any(&Value::from(json!([1, "two"])), Options::default())
    ///     .into_result()
    ///     .unwrap_err();
    /// assert_eq!(errors.paths(), vec!["[1]"]);
    /// ```
    pub fn array() -> ArraySchema {
        ArraySchema::new()
    }

    /// Creates a new record schema for maps with arbitrary keys.
    pub fn record() -> RecordSchema {
        RecordSchema::new()
    }

    /// Creates a new object schema accepting any field declaration.
    ///
    /// # Example
    ///
    /// ```rust
    /// use assay::{AnySchema, Options, Schema, Value};
    /// use serde_json::json;
    ///
    /// let schema = Schema::object()
    ///     .field("name", Schema::text().required().min(1))
    ///     .field("age", Schema::number::<u32>().positive())
    ///     .field("role", Schema::text().default("user"))
    ///     .additional_properties(false);
    ///
    /// let result = schema.validate_any(
    ///     &Value::from(json!({"name": "Alice", "age": 30})),
    ///     Options::default(),
    /// );
    /// assert_eq!(
    ///     result.into_result().unwrap().to_json(),
    ///     json!({"name": "Alice", "age": 30, "role": "user"})
    /// );
    ///
    /// let result = schema.validate_any(&Value::from(json!({"age": 30})), Options::default());
    /// assert!(result.is_failure());
    /// ```
    pub fn object() -> ObjectSchema {
        ObjectSchema::new()
    }

    /// Creates a new object schema whose fields must match the shape of `T`.
    pub fn object_of<T: Shape>() -> ObjectSchema<T> {
        ObjectSchema::new()
    }
}
