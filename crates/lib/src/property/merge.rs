//! Structural merge of property trees.
//!
//! Appending `src` onto `dst`:
//! - scalars set in `src` overwrite `dst`
//! - lists concatenate, `dst` items first
//! - maps union key-wise, recursing into shared keys
//!
//! Merging two values of different shapes is a [`PropertyError::ShapeMismatch`].

use super::schema::{FieldKind, Schema};
use super::{Properties, PropertyError, Value, join_path};

/// Append every field of `src` onto `dst`.
pub fn append_properties(dst: &mut Properties, src: &Properties) -> Result<(), PropertyError> {
  append_at("", dst, src)
}

/// Append only the fields of `src` that exist in `schema`, skipping `exclude`.
///
/// Used by defaults propagation: a defaults module may carry fields its users
/// do not have, and those are silently left out. A field the user does have
/// must carry the shape the user's schema declares for it.
pub fn append_matching(
  dst: &mut Properties,
  src: &Properties,
  schema: &Schema,
  exclude: &[&str],
) -> Result<(), PropertyError> {
  for (name, value) in src.iter() {
    if exclude.contains(&name.as_str()) {
      continue;
    }
    let Some(field) = schema.get(name) else {
      continue;
    };
    if !shape_matches(&field.kind, value) {
      return Err(PropertyError::TypeMismatch {
        path: name.clone(),
        expected: field.kind.describe(),
        found: value.kind_name().to_string(),
      });
    }
    append_field(name, dst, name, value)?;
  }
  Ok(())
}

fn append_at(prefix: &str, dst: &mut Properties, src: &Properties) -> Result<(), PropertyError> {
  for (name, value) in src.iter() {
    let path = join_path(prefix, name);
    append_field(&path, dst, name, value)?;
  }
  Ok(())
}

fn append_field(path: &str, dst: &mut Properties, name: &str, src: &Value) -> Result<(), PropertyError> {
  match dst.entries_mut().get_mut(name) {
    None => {
      dst.insert(name, src.clone());
      Ok(())
    }
    Some(existing) => append_value(path, existing, src),
  }
}

fn append_value(path: &str, dst: &mut Value, src: &Value) -> Result<(), PropertyError> {
  match (dst, src) {
    (Value::List(d), Value::List(s)) => {
      d.extend(s.iter().cloned());
      Ok(())
    }
    (Value::Map(d), Value::Map(s)) => append_at(path, d, s),
    (d @ Value::Bool(_), Value::Bool(_))
    | (d @ Value::Int(_), Value::Int(_))
    | (d @ Value::String(_), Value::String(_)) => {
      *d = src.clone();
      Ok(())
    }
    (d, s) => Err(PropertyError::ShapeMismatch {
      path: path.to_string(),
      dst: d.kind_name().to_string(),
      src: s.kind_name().to_string(),
    }),
  }
}

/// Check that a value has the shape a schema field expects.
fn shape_matches(kind: &FieldKind, value: &Value) -> bool {
  matches!(
    (kind, value),
    (FieldKind::Bool, Value::Bool(_))
      | (FieldKind::Int, Value::Int(_))
      | (FieldKind::String, Value::String(_))
      | (FieldKind::StringList, Value::List(_))
      | (FieldKind::Deps(_), Value::List(_))
      | (FieldKind::Struct(_), Value::Map(_))
      | (FieldKind::Conditional(_), Value::Map(_))
      | (FieldKind::ConfigVariables, Value::Map(_))
  )
}

#[cfg(test)]
mod tests {
  use proptest::prelude::*;

  use super::*;

  fn list(items: &[&str]) -> Value {
    Value::List(items.iter().map(|s| s.to_string()).collect())
  }

  #[test]
  fn scalars_are_overwritten() {
    let mut dst = Properties::new();
    dst.insert("stl", "libc++");
    let mut src = Properties::new();
    src.insert("stl", "none");

    append_properties(&mut dst, &src).unwrap();
    assert_eq!(dst.get_str("stl"), Some("none"));
  }

  #[test]
  fn lists_concatenate_in_order() {
    let mut dst = Properties::new();
    dst.insert("srcs", list(&["x"]));
    let mut src = Properties::new();
    src.insert("srcs", list(&["y"]));

    append_properties(&mut dst, &src).unwrap();
    assert_eq!(dst.get_list("srcs"), ["x", "y"]);
  }

  #[test]
  fn maps_union_and_recurse() {
    let mut dst = Properties::new();
    dst.set("arch.arm64.srcs", list(&["a.c"])).unwrap();
    let mut src = Properties::new();
    src.set("arch.arm64.srcs", list(&["b.c"])).unwrap();
    src.set("arch.x86.srcs", list(&["c.c"])).unwrap();

    append_properties(&mut dst, &src).unwrap();
    assert_eq!(dst.get_list("arch.arm64.srcs"), ["a.c", "b.c"]);
    assert_eq!(dst.get_list("arch.x86.srcs"), ["c.c"]);
  }

  #[test]
  fn unset_fields_in_src_leave_dst_alone() {
    let mut dst = Properties::new();
    dst.insert("enabled", false);
    append_properties(&mut dst, &Properties::new()).unwrap();
    assert_eq!(dst.get_bool("enabled"), Some(false));
  }

  #[test]
  fn incompatible_shapes_fail() {
    let mut dst = Properties::new();
    dst.set("external_build.label", "x").unwrap();
    let mut src = Properties::new();
    src.insert("external_build", list(&["y"]));

    let err = append_properties(&mut dst, &src).unwrap_err();
    assert_eq!(
      err,
      PropertyError::ShapeMismatch {
        path: "external_build".to_string(),
        dst: "map".to_string(),
        src: "list".to_string(),
      }
    );
  }

  #[test]
  fn matching_append_skips_unknown_and_excluded_fields() {
    let schema = Schema::new()
      .with("srcs", FieldKind::StringList)
      .with("visibility", FieldKind::StringList);
    let mut src = Properties::new();
    src.insert("srcs", list(&["d.c"]));
    src.insert("visibility", list(&["//visibility:public"]));
    src.insert("cmd", "not in schema");

    let mut dst = Properties::new();
    append_matching(&mut dst, &src, &schema, &["visibility"]).unwrap();

    assert_eq!(dst.get_list("srcs"), ["d.c"]);
    assert!(!dst.contains("visibility"));
    assert!(!dst.contains("cmd"));
  }

  #[test]
  fn matching_append_checks_the_destination_schema() {
    let schema = Schema::new().with("stl", FieldKind::String);
    let mut src = Properties::new();
    src.insert("stl", list(&["libc++"]));

    let mut dst = Properties::new();
    let err = append_matching(&mut dst, &src, &schema, &[]).unwrap_err();
    assert_eq!(
      err,
      PropertyError::TypeMismatch {
        path: "stl".to_string(),
        expected: "a string",
        found: "list".to_string(),
      }
    );
    assert!(!dst.contains("stl"));
  }

  proptest! {
    #[test]
    fn list_merge_is_concatenation(a in prop::collection::vec("[a-z]{1,4}", 0..6), b in prop::collection::vec("[a-z]{1,4}", 0..6)) {
      let mut dst = Properties::new();
      dst.insert("srcs", Value::List(a.clone()));
      let mut src = Properties::new();
      src.insert("srcs", Value::List(b.clone()));

      append_properties(&mut dst, &src).unwrap();

      let mut expected = a;
      expected.extend(b);
      prop_assert_eq!(dst.get_list("srcs"), expected.as_slice());
    }

    #[test]
    fn later_scalar_wins(a in "[a-z]{1,6}", b in "[a-z]{1,6}", c in "[a-z]{1,6}") {
      let tree = |v: &str| {
        let mut p = Properties::new();
        p.insert("stl", v);
        p
      };

      // (A, B) then C
      let mut left = tree(&a);
      append_properties(&mut left, &tree(&b)).unwrap();
      append_properties(&mut left, &tree(&c)).unwrap();

      // A then (B, C)
      let mut bc = tree(&b);
      append_properties(&mut bc, &tree(&c)).unwrap();
      let mut right = tree(&a);
      append_properties(&mut right, &bc).unwrap();

      prop_assert_eq!(left.get_str("stl"), Some(c.as_str()));
      prop_assert_eq!(left, right);
    }
  }
}
