//! Module graph types.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

use crate::module_types::Capability;
use crate::namespace::VisibilityRule;
use crate::property::Properties;

/// Index of a declared module in the graph arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModuleId(pub usize);

/// Index of a variant in the graph arena.
///
/// Ids are never reused: a split allocates fresh ids and retires the old one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VariantId(pub usize);

impl fmt::Display for VariantId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "#{}", self.0)
  }
}

/// Semantic role of a dependency edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyRole {
  SharedLib,
  StaticLib,
  Tool,
  Data,
  /// Plain dependency with no role-specific handling.
  #[default]
  Dep,
}

impl DependencyRole {
  pub fn as_str(&self) -> &'static str {
    match self {
      DependencyRole::SharedLib => "shared lib",
      DependencyRole::StaticLib => "static lib",
      DependencyRole::Tool => "tool",
      DependencyRole::Data => "data",
      DependencyRole::Dep => "dep",
    }
  }
}

impl fmt::Display for DependencyRole {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A variation key: resolved value per axis (e.g. `{os: android, arch: arm64}`).
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Variations(BTreeMap<String, String>);

impl Variations {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn get(&self, axis: &str) -> Option<&str> {
    self.0.get(axis).map(String::as_str)
  }

  pub fn has_axis(&self, axis: &str) -> bool {
    self.0.contains_key(axis)
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self.0.iter().map(|(axis, value)| (axis.as_str(), value.as_str()))
  }

  pub fn insert(&mut self, axis: impl Into<String>, value: impl Into<String>) {
    self.0.insert(axis.into(), value.into());
  }

  /// A copy of `self` with `axis` set to `value`.
  pub fn with(&self, axis: &str, value: &str) -> Self {
    let mut next = self.clone();
    next.insert(axis, value);
    next
  }

  /// Whether every axis set in both `self` and `other` has the same value.
  pub fn compatible_with(&self, other: &Variations) -> bool {
    self
      .0
      .iter()
      .all(|(axis, value)| other.get(axis).is_none_or(|v| v == value.as_str()))
  }
}

impl fmt::Display for Variations {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("{")?;
    for (i, (axis, value)) in self.0.iter().enumerate() {
      if i > 0 {
        f.write_str(", ")?;
      }
      write!(f, "{}: {}", axis, value)?;
    }
    f.write_str("}")
  }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Variations {
  fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
    Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
  }
}

/// Tag on a dependency edge: its role plus the variant-matching constraints.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DependencyTag {
  pub role: DependencyRole,
  /// Far dependencies only match on `required`; the depending variant's own
  /// variations do not constrain the target.
  pub far: bool,
  /// Axis values the target variant must have once it is split on that axis.
  pub required: Variations,
  /// Axis values the depending variant must have for the edge to apply at all
  /// (dependencies declared inside a conditional branch).
  pub from: Variations,
}

impl DependencyTag {
  pub fn new(role: DependencyRole) -> Self {
    Self {
      role,
      ..Default::default()
    }
  }

  pub fn far(mut self) -> Self {
    self.far = true;
    self
  }

  pub fn require(mut self, axis: &str, value: &str) -> Self {
    self.required.insert(axis, value);
    self
  }

  pub fn only_from(mut self, axis: &str, value: &str) -> Self {
    self.from.insert(axis, value);
    self
  }

  /// Whether the edge exists at all for a depending variant with `from`.
  pub fn applies_to(&self, from: &Variations) -> bool {
    self.from.compatible_with(from)
  }

  /// Whether a depending variant with `from` may point at a target with `to`.
  ///
  /// Axes not yet resolved on either side never exclude a target, so an edge
  /// added before a split fans out to every new variant and narrows once the
  /// depending side splits too.
  pub fn allows(&self, from: &Variations, to: &Variations) -> bool {
    if !self.applies_to(from) || !self.required.compatible_with(to) {
      return false;
    }
    if self.far {
      return true;
    }
    self
      .from
      .iter()
      .chain(from.iter())
      .filter(|(axis, _)| !self.required.has_axis(axis))
      .all(|(axis, value)| to.get(axis).is_none_or(|v| v == value))
  }
}

/// A declared module.
#[derive(Debug, Clone)]
pub struct Module {
  pub id: ModuleId,
  pub name: String,
  pub module_type: String,
  pub package: String,
  pub namespace: String,
  pub capabilities: BTreeSet<Capability>,
  /// Parsed `visibility`; `None` falls back to the package default.
  pub visibility: Option<Vec<VisibilityRule>>,
  /// Parsed `defaults_visibility` of a defaults module.
  pub defaults_visibility: Option<Vec<VisibilityRule>>,
  pub(crate) variants: Vec<VariantId>,
}

impl Module {
  pub fn new(name: impl Into<String>, module_type: impl Into<String>, package: impl Into<String>) -> Self {
    Self {
      id: ModuleId(0),
      name: name.into(),
      module_type: module_type.into(),
      package: package.into(),
      namespace: String::new(),
      capabilities: BTreeSet::new(),
      visibility: None,
      defaults_visibility: None,
      variants: Vec::new(),
    }
  }

  pub fn has_capability(&self, capability: Capability) -> bool {
    self.capabilities.contains(&capability)
  }

  /// Current variants, in split order.
  pub fn variants(&self) -> &[VariantId] {
    &self.variants
  }
}

/// A dependency of one variant on a module, resolved to that module's
/// matching variants.
#[derive(Debug, Clone)]
pub struct Dependency {
  pub tag: DependencyTag,
  pub module: ModuleId,
  /// Property the reference came from, for error attribution.
  pub property: String,
  pub targets: Vec<VariantId>,
  /// The referencing package was checked against the target's visibility.
  pub visibility_checked: bool,
}

/// One concrete instantiation of a module.
#[derive(Debug, Clone)]
pub struct Variant {
  pub id: VariantId,
  pub module: ModuleId,
  pub variations: Variations,
  pub properties: Properties,
  pub deps: Vec<Dependency>,
  pub(crate) live: bool,
}

impl Variant {
  pub fn is_live(&self) -> bool {
    self.live
  }
}
