//! Property schemas.
//!
//! A schema is a fixed tree of typed fields registered once per module type.
//! Population and merging work generically over it, so type errors in parsed
//! input surface when the module is created rather than when a mutator first
//! reads the field.

use std::collections::BTreeMap;

use crate::consts::{AXIS_ARCH, AXIS_LINK, AXIS_OS, CONDITIONS_DEFAULT};
use crate::graph::DependencyRole;
use crate::platform::{Arch, Os};

/// Selector driving a conditional property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Condition {
  /// `arch: { arm64: {...}, x86_64: {...} }`
  Arch,
  /// `target: { android: {...}, linux: {...}, host: {...} }`
  Target,
  /// `link: { static: {...}, shared: {...} }`
  Link,
}

impl Condition {
  /// Variation axis whose value selects the branch.
  pub fn axis(&self) -> &'static str {
    match self {
      Condition::Arch => AXIS_ARCH,
      Condition::Target => AXIS_OS,
      Condition::Link => AXIS_LINK,
    }
  }

  /// Whether `key` names a branch this condition can ever select.
  pub fn accepts(&self, key: &str) -> bool {
    if key == CONDITIONS_DEFAULT {
      return true;
    }
    match self {
      Condition::Arch => key.parse::<Arch>().is_ok(),
      Condition::Target => key == "host" || key.parse::<Os>().is_ok(),
      Condition::Link => key == "static" || key == "shared",
    }
  }
}

/// The type of a schema field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
  Bool,
  Int,
  String,
  StringList,
  /// A list of module references turned into dependency edges with this role.
  Deps(DependencyRole),
  /// A nested structure with its own fields.
  Struct(Schema),
  /// Branches keyed by condition value, each holding variant fields of the
  /// enclosing schema.
  Conditional(Condition),
  /// `soong_config_variables`: per configuration variable, either variant
  /// fields directly (bool/value variables) or branches of them (string
  /// variables), plus an optional `conditions_default`.
  ConfigVariables,
}

impl FieldKind {
  /// Human-readable shape, used in type errors.
  pub fn describe(&self) -> &'static str {
    match self {
      FieldKind::Bool => "a bool",
      FieldKind::Int => "an int",
      FieldKind::String => "a string",
      FieldKind::StringList | FieldKind::Deps(_) => "a list of strings",
      FieldKind::Struct(_) | FieldKind::Conditional(_) | FieldKind::ConfigVariables => "a map",
    }
  }
}

/// A schema field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
  pub kind: FieldKind,
  /// Whether the field may also appear inside conditional branches.
  pub variant: bool,
}

/// A fixed tree of typed fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
  fields: BTreeMap<String, Field>,
}

impl Schema {
  pub fn new() -> Self {
    Self::default()
  }

  /// Add a field that may only appear at the top level.
  pub fn with(mut self, name: &str, kind: FieldKind) -> Self {
    self.fields.insert(name.to_string(), Field { kind, variant: false });
    self
  }

  /// Add a field that may also appear inside `arch`/`target`/`link`/config branches.
  pub fn with_variant(mut self, name: &str, kind: FieldKind) -> Self {
    self.fields.insert(name.to_string(), Field { kind, variant: true });
    self
  }

  /// Add every field of `other`, replacing same-named fields.
  pub fn extend(mut self, other: &Schema) -> Self {
    for (name, field) in &other.fields {
      self.fields.insert(name.clone(), field.clone());
    }
    self
  }

  pub fn get(&self, name: &str) -> Option<&Field> {
    self.fields.get(name)
  }

  pub fn contains(&self, name: &str) -> bool {
    self.fields.contains_key(name)
  }

  pub fn fields(&self) -> impl Iterator<Item = (&str, &Field)> {
    self.fields.iter().map(|(name, field)| (name.as_str(), field))
  }

  /// The schema of a conditional branch: every variant field.
  pub fn variant_schema(&self) -> Schema {
    Schema {
      fields: self
        .fields
        .iter()
        .filter(|(_, field)| field.variant)
        .map(|(name, field)| (name.clone(), field.clone()))
        .collect(),
    }
  }

  /// Top-level fields holding module references, with their roles.
  pub fn dependency_fields(&self) -> impl Iterator<Item = (&str, &DependencyRole)> {
    self.fields.iter().filter_map(|(name, field)| match &field.kind {
      FieldKind::Deps(role) => Some((name.as_str(), role)),
      _ => None,
    })
  }

  /// Top-level conditional fields.
  pub fn conditional_fields(&self) -> impl Iterator<Item = (&str, Condition)> {
    self.fields.iter().filter_map(|(name, field)| match field.kind {
      FieldKind::Conditional(condition) => Some((name.as_str(), condition)),
      _ => None,
    })
  }
}
