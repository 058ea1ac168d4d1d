//! Module types and capabilities.
//!
//! A module type pairs a property [`Schema`] with the set of capabilities
//! its modules implement. Mutators query capabilities rather than type
//! names, so a registered extra type takes part in the same stages as the
//! built-in ones.

mod builtin;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

pub use builtin::{common_schema, register_builtin_types};

use crate::property::Schema;

/// Behavior a module type opts into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
  /// Property-only module merged into users; never built.
  Defaults,
  /// Split into host and/or device OS variants.
  OsVariants,
  /// Split into one variant per target architecture.
  ArchVariants,
  /// Split into `static` and `shared` variants.
  LinkVariants,
  /// May be used under `tools` of a generator.
  HostToolProvider,
  /// May be converted for and delegated to the external build orchestrator.
  ExternalBuildable,
}

impl Capability {
  pub fn as_str(&self) -> &'static str {
    match self {
      Capability::Defaults => "defaults",
      Capability::OsVariants => "os_variants",
      Capability::ArchVariants => "arch_variants",
      Capability::LinkVariants => "link_variants",
      Capability::HostToolProvider => "host_tool_provider",
      Capability::ExternalBuildable => "external_buildable",
    }
  }
}

impl fmt::Display for Capability {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A registered module type.
#[derive(Debug, Clone)]
pub struct ModuleType {
  pub name: String,
  pub schema: Schema,
  pub capabilities: BTreeSet<Capability>,
}

impl ModuleType {
  /// A type whose schema is `fields` on top of the properties every module has.
  pub fn new(name: &str, fields: Schema, capabilities: &[Capability]) -> Self {
    Self {
      name: name.to_string(),
      schema: common_schema().extend(&fields),
      capabilities: capabilities.iter().copied().collect(),
    }
  }

  pub fn has_capability(&self, capability: Capability) -> bool {
    self.capabilities.contains(&capability)
  }
}

/// Module types by name.
#[derive(Debug, Clone, Default)]
pub struct ModuleTypeRegistry {
  types: BTreeMap<String, ModuleType>,
}

impl ModuleTypeRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  /// A registry holding the built-in types.
  pub fn with_builtins() -> Self {
    let mut registry = Self::new();
    register_builtin_types(&mut registry);
    registry
  }

  /// Register a type, replacing any previous type of the same name.
  pub fn register(&mut self, module_type: ModuleType) {
    self.types.insert(module_type.name.clone(), module_type);
  }

  pub fn get(&self, name: &str) -> Option<&ModuleType> {
    self.types.get(name)
  }

  pub fn iter(&self) -> impl Iterator<Item = &ModuleType> {
    self.types.values()
  }

  pub fn len(&self) -> usize {
    self.types.len()
  }

  pub fn is_empty(&self) -> bool {
    self.types.is_empty()
  }
}
