//! Typed property values and trees.

use std::collections::BTreeMap;

use serde::Serialize;

use super::{PropertyError, join_path};

/// A single property value.
///
/// Lists only ever hold strings: every list-valued field in the property
/// model (sources, flags, module references) is a list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
  Bool(bool),
  Int(i64),
  String(String),
  List(Vec<String>),
  Map(Properties),
}

impl Value {
  /// Short name of the value's shape, used in error messages.
  pub fn kind_name(&self) -> &'static str {
    match self {
      Value::Bool(_) => "bool",
      Value::Int(_) => "int",
      Value::String(_) => "string",
      Value::List(_) => "list",
      Value::Map(_) => "map",
    }
  }

  pub fn as_bool(&self) -> Option<bool> {
    match self {
      Value::Bool(b) => Some(*b),
      _ => None,
    }
  }

  pub fn as_int(&self) -> Option<i64> {
    match self {
      Value::Int(i) => Some(*i),
      _ => None,
    }
  }

  pub fn as_str(&self) -> Option<&str> {
    match self {
      Value::String(s) => Some(s),
      _ => None,
    }
  }

  pub fn as_list(&self) -> Option<&[String]> {
    match self {
      Value::List(l) => Some(l),
      _ => None,
    }
  }

  pub fn as_map(&self) -> Option<&Properties> {
    match self {
      Value::Map(m) => Some(m),
      _ => None,
    }
  }

  pub fn as_map_mut(&mut self) -> Option<&mut Properties> {
    match self {
      Value::Map(m) => Some(m),
      _ => None,
    }
  }
}

impl From<bool> for Value {
  fn from(b: bool) -> Self {
    Value::Bool(b)
  }
}

impl From<i64> for Value {
  fn from(i: i64) -> Self {
    Value::Int(i)
  }
}

impl From<&str> for Value {
  fn from(s: &str) -> Self {
    Value::String(s.to_string())
  }
}

impl From<String> for Value {
  fn from(s: String) -> Self {
    Value::String(s)
  }
}

impl From<Vec<String>> for Value {
  fn from(l: Vec<String>) -> Self {
    Value::List(l)
  }
}

impl From<Properties> for Value {
  fn from(m: Properties) -> Self {
    Value::Map(m)
  }
}

/// A property tree: field name to value, unset fields absent.
///
/// Backed by a [`BTreeMap`] so iteration and serialization order never
/// depend on insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Properties(BTreeMap<String, Value>);

impl Properties {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
    self.0.iter()
  }

  pub fn contains(&self, path: &str) -> bool {
    self.get(path).is_some()
  }

  /// Insert a top-level field, replacing any previous value.
  pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
    self.0.insert(name.into(), value.into())
  }

  /// Look up a value by dotted path (e.g. `"external_build.label"`).
  pub fn get(&self, path: &str) -> Option<&Value> {
    let mut parts = path.split('.');
    let first = parts.next()?;
    let mut current = self.0.get(first)?;
    for part in parts {
      current = current.as_map()?.0.get(part)?;
    }
    Some(current)
  }

  /// Mutable lookup by dotted path.
  pub fn get_mut(&mut self, path: &str) -> Option<&mut Value> {
    let mut parts = path.split('.');
    let first = parts.next()?;
    let mut current = self.0.get_mut(first)?;
    for part in parts {
      current = current.as_map_mut()?.0.get_mut(part)?;
    }
    Some(current)
  }

  /// Set a value by dotted path, creating intermediate maps as needed.
  pub fn set(&mut self, path: &str, value: impl Into<Value>) -> Result<(), PropertyError> {
    let (parents, leaf) = match path.rsplit_once('.') {
      Some((parents, leaf)) => (Some(parents), leaf),
      None => (None, path),
    };

    let mut target = self;
    let mut walked = String::new();
    if let Some(parents) = parents {
      for part in parents.split('.') {
        walked = join_path(&walked, part);
        let entry = target
          .0
          .entry(part.to_string())
          .or_insert_with(|| Value::Map(Properties::new()));
        target = entry
          .as_map_mut()
          .ok_or_else(|| PropertyError::NotAMap { path: walked.clone() })?;
      }
    }

    target.0.insert(leaf.to_string(), value.into());
    Ok(())
  }

  /// Remove a value by dotted path, returning it if it was set.
  pub fn remove(&mut self, path: &str) -> Option<Value> {
    match path.rsplit_once('.') {
      Some((parents, leaf)) => self.get_mut(parents)?.as_map_mut()?.0.remove(leaf),
      None => self.0.remove(path),
    }
  }

  pub fn get_bool(&self, path: &str) -> Option<bool> {
    self.get(path).and_then(Value::as_bool)
  }

  pub fn get_int(&self, path: &str) -> Option<i64> {
    self.get(path).and_then(Value::as_int)
  }

  pub fn get_str(&self, path: &str) -> Option<&str> {
    self.get(path).and_then(Value::as_str)
  }

  /// List value at `path`, or an empty slice when unset.
  pub fn get_list(&self, path: &str) -> &[String] {
    self.get(path).and_then(Value::as_list).unwrap_or(&[])
  }

  pub fn get_map(&self, path: &str) -> Option<&Properties> {
    self.get(path).and_then(Value::as_map)
  }

  pub(crate) fn entries_mut(&mut self) -> &mut BTreeMap<String, Value> {
    &mut self.0
  }
}

impl FromIterator<(String, Value)> for Properties {
  fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
    Self(iter.into_iter().collect())
  }
}
