//! Conditional selection.
//!
//! A conditional field holds one sub-tree per named condition. Selecting
//! removes the field from its parent and appends the branches named by the
//! selector keys, in order. When no key matches, `conditions_default` is
//! appended instead if present; otherwise the parent is left untouched,
//! conditional field included.

use tracing::trace;

use super::merge::append_properties;
use super::{Properties, PropertyError, Value};
use crate::consts::CONDITIONS_DEFAULT;

/// Fold the conditional field `field` of `props` into `props`.
///
/// Returns whether a branch other than `conditions_default` was applied.
pub fn select(props: &mut Properties, field: &str, keys: &[&str]) -> Result<bool, PropertyError> {
  let Some(value) = props.get(field) else {
    return Ok(false);
  };

  let branches = match value {
    Value::Map(branches) => branches,
    other => {
      return Err(PropertyError::TypeMismatch {
        path: field.to_string(),
        expected: "a map",
        found: other.kind_name().to_string(),
      });
    }
  };

  let mut chosen = Vec::new();
  for key in keys {
    if let Some(branch) = branch(branches, field, key)? {
      trace!(field, condition = *key, "selecting branch");
      chosen.push(branch.clone());
    }
  }
  let matched = !chosen.is_empty();

  if !matched && let Some(default) = branch(branches, field, CONDITIONS_DEFAULT)? {
    trace!(field, "selecting conditions_default");
    chosen.push(default.clone());
  }

  if chosen.is_empty() {
    return Ok(false);
  }

  props.remove(field);
  for branch in &chosen {
    append_properties(props, branch)?;
  }

  Ok(matched)
}

fn branch<'a>(branches: &'a Properties, field: &str, key: &str) -> Result<Option<&'a Properties>, PropertyError> {
  match branches.iter().find(|(name, _)| name.as_str() == key) {
    None => Ok(None),
    Some((_, Value::Map(branch))) => Ok(Some(branch)),
    Some((_, other)) => Err(PropertyError::TypeMismatch {
      path: format!("{}.{}", field, key),
      expected: "a map",
      found: other.kind_name().to_string(),
    }),
  }
}
