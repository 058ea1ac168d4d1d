//! Populating property trees from parsed module records.

use serde_json::{Map, Value as Json};

use super::schema::{Condition, FieldKind, Schema};
use super::{Properties, PropertyError, Value, join_path};
use crate::consts::CONDITIONS_DEFAULT;

/// Build a property tree from a parsed record, checking it against `schema`.
///
/// `null` values are treated as unset. Every other key must name a schema
/// field and hold a value of that field's type.
pub fn populate(schema: &Schema, raw: &Map<String, Json>) -> Result<Properties, PropertyError> {
  populate_at("", schema, raw)
}

fn populate_at(prefix: &str, schema: &Schema, raw: &Map<String, Json>) -> Result<Properties, PropertyError> {
  let mut props = Properties::new();
  for (name, json) in raw {
    if json.is_null() {
      continue;
    }
    let path = join_path(prefix, name);
    let field = schema
      .get(name)
      .ok_or_else(|| PropertyError::UnknownProperty { path: path.clone() })?;
    let value = convert(&path, &field.kind, schema, json)?;
    props.insert(name.clone(), value);
  }
  Ok(props)
}

fn convert(path: &str, kind: &FieldKind, parent: &Schema, json: &Json) -> Result<Value, PropertyError> {
  let mismatch = || PropertyError::TypeMismatch {
    path: path.to_string(),
    expected: kind.describe(),
    found: json_kind(json).to_string(),
  };

  match kind {
    FieldKind::Bool => json.as_bool().map(Value::Bool).ok_or_else(mismatch),
    FieldKind::Int => json.as_i64().map(Value::Int).ok_or_else(mismatch),
    FieldKind::String => json
      .as_str()
      .map(|s| Value::String(s.to_string()))
      .ok_or_else(mismatch),
    FieldKind::StringList | FieldKind::Deps(_) => {
      let items = json.as_array().ok_or_else(mismatch)?;
      items
        .iter()
        .map(|item| item.as_str().map(str::to_string).ok_or_else(mismatch))
        .collect::<Result<Vec<_>, _>>()
        .map(Value::List)
    }
    FieldKind::Struct(inner) => {
      let object = json.as_object().ok_or_else(mismatch)?;
      populate_at(path, inner, object).map(Value::Map)
    }
    FieldKind::Conditional(condition) => {
      let object = json.as_object().ok_or_else(mismatch)?;
      conditional(path, *condition, &parent.variant_schema(), object).map(Value::Map)
    }
    FieldKind::ConfigVariables => {
      let object = json.as_object().ok_or_else(mismatch)?;
      config_variables(path, &parent.variant_schema(), object).map(Value::Map)
    }
  }
}

fn conditional(
  path: &str,
  condition: Condition,
  branch_schema: &Schema,
  raw: &Map<String, Json>,
) -> Result<Properties, PropertyError> {
  let mut branches = Properties::new();
  for (key, json) in raw {
    let branch_path = join_path(path, key);
    if !condition.accepts(key) {
      return Err(PropertyError::UnknownCondition {
        path: path.to_string(),
        condition: key.clone(),
      });
    }
    let object = json.as_object().ok_or_else(|| PropertyError::TypeMismatch {
      path: branch_path.clone(),
      expected: "a map",
      found: json_kind(json).to_string(),
    })?;
    branches.insert(key.clone(), populate_at(&branch_path, branch_schema, object)?);
  }
  Ok(branches)
}

/// `soong_config_variables: { <var>: { ... } }`
///
/// Inside a variable, keys naming variant fields are properties applied when
/// the variable is set; any other key is a branch of variant fields selected
/// by the variable's value.
fn config_variables(path: &str, branch_schema: &Schema, raw: &Map<String, Json>) -> Result<Properties, PropertyError> {
  let mut variables = Properties::new();
  for (variable, json) in raw {
    let var_path = join_path(path, variable);
    let object = json.as_object().ok_or_else(|| PropertyError::TypeMismatch {
      path: var_path.clone(),
      expected: "a map",
      found: json_kind(json).to_string(),
    })?;

    let mut entries = Properties::new();
    for (key, json) in object {
      if json.is_null() {
        continue;
      }
      let key_path = join_path(&var_path, key);
      let value = match branch_schema.get(key) {
        Some(field) if key != CONDITIONS_DEFAULT => convert(&key_path, &field.kind, branch_schema, json)?,
        _ => {
          let branch = json.as_object().ok_or_else(|| PropertyError::UnknownProperty {
            path: key_path.clone(),
          })?;
          Value::Map(populate_at(&key_path, branch_schema, branch)?)
        }
      };
      entries.insert(key.clone(), value);
    }
    variables.insert(variable.clone(), entries);
  }
  Ok(variables)
}

fn json_kind(json: &Json) -> &'static str {
  match json {
    Json::Null => "null",
    Json::Bool(_) => "a bool",
    Json::Number(_) => "a number",
    Json::String(_) => "a string",
    Json::Array(_) => "a list",
    Json::Object(_) => "a map",
  }
}
