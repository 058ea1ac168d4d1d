//! Property model.
//!
//! Every module carries a property tree shaped by its module type's
//! [`Schema`]. This module provides:
//! - [`Properties`] / [`Value`]: the typed tree itself, addressed by dot paths
//! - [`populate`]: building a tree from parsed records, checked against a schema
//! - [`append_properties`] / [`append_matching`]: structural merge
//! - [`select`]: folding a conditional sub-tree into its parent
//!
//! Unset fields are simply absent from the tree; accessors return the type's
//! zero value (`None` for scalars, an empty slice for lists).

pub mod merge;
pub mod populate;
pub mod schema;
pub mod select;
pub mod value;

use thiserror::Error;

pub use merge::{append_matching, append_properties};
pub use populate::populate;
pub use schema::{Condition, Field, FieldKind, Schema};
pub use select::select;
pub use value::{Properties, Value};

/// Errors raised while populating, merging or selecting properties.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PropertyError {
  /// A parsed property has no matching field in the schema.
  #[error("unrecognized property \"{path}\"")]
  UnknownProperty { path: String },

  /// A parsed property has the wrong value type for its field.
  #[error("property \"{path}\" must be {expected}, found {found}")]
  TypeMismatch {
    path: String,
    expected: &'static str,
    found: String,
  },

  /// A conditional property names a condition that can never be selected.
  #[error("property \"{path}\" has unknown condition \"{condition}\"")]
  UnknownCondition { path: String, condition: String },

  /// Two trees being merged disagree on the shape of a field.
  #[error("cannot merge property \"{path}\": {dst} and {src} have incompatible shapes")]
  ShapeMismatch { path: String, dst: String, src: String },

  /// A dotted path walks through a value that is not a nested map.
  #[error("property path \"{path}\" goes through a non-map value")]
  NotAMap { path: String },
}

/// Join a parent path and a field name with a dot.
pub(crate) fn join_path(prefix: &str, name: &str) -> String {
  if prefix.is_empty() {
    name.to_string()
  } else {
    format!("{}.{}", prefix, name)
  }
}
