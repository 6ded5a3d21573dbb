//! Static field tables for native types.
//!
//! A [`Shape`] lists the keys and kinds of a native struct so an
//! [`ObjectSchema`](super::ObjectSchema) can reject field declarations that do
//! not fit it while the schema is being built.

use crate::schema::traits::FieldKind;

/// One entry of a [`Shape`] table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub key: &'static str,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub const fn new(key: &'static str, kind: FieldKind) -> Self {
        Self { key, kind }
    }
}

/// The declared fields of a native type.
///
/// Implement it with the [`shape!`](crate::shape) macro:
///
/// ```rust
/// use assay::{shape, Schema, AnySchema};
///
/// struct Signup {
///     email: String,
///     age: u8,
/// }
///
/// shape!(Signup {
///     "email": Text,
///     "age": Number,
/// });
///
/// let schema = Schema::object_of::<Signup>()
///     .field("email", Schema::text().email())
///     .field("age", Schema::text());
/// assert!(schema.construction_error().is_some());
/// ```
pub trait Shape {
    /// Every declared field. An empty table disables shape checks.
    const FIELDS: &'static [FieldSpec];

    /// Looks up the declaration of `key`.
    fn spec(key: &str) -> Option<&'static FieldSpec> {
        Self::FIELDS.iter().find(|spec| spec.key == key)
    }
}

/// The shape of an untyped object: no declared fields, no checks.
#[derive(Debug, Clone, Copy, Default)]
pub struct Dynamic;

impl Shape for Dynamic {
    const FIELDS: &'static [FieldSpec] = &[];
}

/// Implements [`Shape`] for a type from a table of `"key": Kind` entries.
///
/// `Kind` is a [`FieldKind`] variant name.
#[macro_export]
macro_rules! shape {
    ($ty:ty { $($key:literal : $kind:ident),* $(,)? }) => {
        impl $crate::Shape for $ty {
            const FIELDS: &'static [$crate::FieldSpec] = &[
                $($crate::FieldSpec::new($key, $crate::FieldKind::$kind)),*
            ];
        }
    };
}
