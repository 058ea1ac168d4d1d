//! The resolved graph handed to lowering.
//!
//! One entry per final variant of every non-defaults module, in module
//! declaration order and then split order. Every collection is ordered, so
//! the JSON form (and its hash) only depends on the input and configuration.

use serde::Serialize;

use crate::delegation::{ExternalBuildConfig, ExternalBuildStatus};
use crate::graph::{DependencyRole, ModuleGraph, Variations};
use crate::module_types::Capability;
use crate::namespace::NamespaceRegistry;
use crate::property::Properties;
use crate::util::hash::Hashable;

/// A dependency edge of a final variant, pointing at one concrete variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedDependency {
  pub role: DependencyRole,
  pub name: String,
  pub package: String,
  pub variations: Variations,
}

/// A final variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedVariant {
  pub name: String,
  pub module_type: String,
  pub package: String,
  pub variations: Variations,
  pub properties: Properties,
  pub deps: Vec<ResolvedDependency>,
  /// Effective visibility of the module, as labels.
  pub visibility: Vec<String>,
  /// Every dependency of this variant passed its visibility check.
  pub visibility_checked: bool,
  pub external_build: ExternalBuildStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedGraph {
  pub variants: Vec<ResolvedVariant>,
}

impl Hashable for ResolvedGraph {}

impl ResolvedGraph {
  /// Snapshot a graph the pipeline finished without errors.
  pub fn from_graph(graph: &ModuleGraph, namespaces: &NamespaceRegistry, external: &ExternalBuildConfig) -> Self {
    let mut variants = Vec::new();
    for module in graph.modules() {
      if module.has_capability(Capability::Defaults) {
        continue;
      }
      let visibility: Vec<String> = namespaces
        .effective_visibility(module)
        .iter()
        .map(ToString::to_string)
        .collect();

      for id in module.variants() {
        let variant = graph.variant(*id);
        let deps = variant
          .deps
          .iter()
          .flat_map(|dep| {
            dep.targets.iter().map(move |target| {
              let target = graph.variant(*target);
              let target_module = graph.module(target.module);
              ResolvedDependency {
                role: dep.tag.role,
                name: target_module.name.clone(),
                package: target_module.package.clone(),
                variations: target.variations.clone(),
              }
            })
          })
          .collect();

        variants.push(ResolvedVariant {
          name: module.name.clone(),
          module_type: module.module_type.clone(),
          package: module.package.clone(),
          variations: variant.variations.clone(),
          properties: variant.properties.clone(),
          deps,
          visibility: visibility.clone(),
          visibility_checked: variant.deps.iter().all(|dep| dep.visibility_checked),
          external_build: external.status(module, variant),
        });
      }
    }
    Self { variants }
  }

  /// Every variant of the module `name`.
  pub fn variants_of<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a ResolvedVariant> + 'a {
    self.variants.iter().filter(move |v| v.name == name)
  }

  /// Number of edges across all variants.
  pub fn edge_count(&self) -> usize {
    self.variants.iter().map(|v| v.deps.len()).sum()
  }
}
