//! The module graph.
//!
//! Modules and variants live in an arena owned by [`ModuleGraph`]. A module
//! starts with a single variant; splits allocate new variant entries and
//! retire the original rather than mutating it in place. Edges are stored per
//! variant as [`Dependency`] records naming a target module, and the concrete
//! target variants are recomputed from the tag whenever either side splits.
//!
//! A dependents index (module to the variants depending on it) keeps that
//! recomputation local to the split module's neighbors.

mod dag;
mod types;

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

pub use dag::Cycle;
pub(crate) use dag::find_cycles;
pub use types::{Dependency, DependencyRole, DependencyTag, Module, ModuleId, Variant, VariantId, Variations};

use crate::property::Properties;

/// Arena of modules, their variants and dependency edges.
#[derive(Debug, Default)]
pub struct ModuleGraph {
  modules: Vec<Module>,
  variants: Vec<Variant>,
  /// Target module to the variants holding a dependency on it.
  dependents: BTreeMap<ModuleId, BTreeSet<VariantId>>,
}

impl ModuleGraph {
  pub fn new() -> Self {
    Self::default()
  }

  /// Add a module with a single unsplit variant carrying `properties`.
  pub fn add_module(&mut self, mut module: Module, properties: Properties) -> ModuleId {
    let id = ModuleId(self.modules.len());
    let variant = self.alloc_variant(id, Variations::new(), properties, Vec::new());
    module.id = id;
    module.variants = vec![variant];
    self.modules.push(module);
    id
  }

  pub fn module(&self, id: ModuleId) -> &Module {
    &self.modules[id.0]
  }

  pub fn modules(&self) -> impl Iterator<Item = &Module> {
    self.modules.iter()
  }

  pub fn module_count(&self) -> usize {
    self.modules.len()
  }

  pub fn variant(&self, id: VariantId) -> &Variant {
    &self.variants[id.0]
  }

  pub fn variant_mut(&mut self, id: VariantId) -> &mut Variant {
    &mut self.variants[id.0]
  }

  /// The module a variant belongs to.
  pub fn module_of(&self, id: VariantId) -> &Module {
    self.module(self.variant(id).module)
  }

  /// All current variants, in allocation order.
  pub fn live_variants(&self) -> impl Iterator<Item = &Variant> {
    self.variants.iter().filter(|v| v.live)
  }

  pub fn live_variant_count(&self) -> usize {
    self.live_variants().count()
  }

  /// `name{axis: value, ...}` for diagnostics.
  pub fn describe(&self, id: VariantId) -> String {
    let variant = self.variant(id);
    let module = self.module(variant.module);
    if variant.variations.is_empty() {
      module.name.clone()
    } else {
      format!("{}{}", module.name, variant.variations)
    }
  }

  /// Add a dependency from `from` on `target`, pointing at every current
  /// variant of `target` the tag allows.
  ///
  /// Returns false if the same tag already links the two.
  pub fn add_dependency(&mut self, from: VariantId, tag: DependencyTag, target: ModuleId, property: &str) -> bool {
    let exists = self.variants[from.0]
      .deps
      .iter()
      .any(|dep| dep.module == target && dep.tag == tag);
    if exists {
      return false;
    }

    let targets = self.matching_targets(&self.variants[from.0].variations, &tag, target);
    debug!(
      from = %self.describe(from),
      to = %self.module(target).name,
      role = %tag.role,
      targets = targets.len(),
      "adding dependency"
    );
    self.variants[from.0].deps.push(Dependency {
      tag,
      module: target,
      property: property.to_string(),
      targets,
      visibility_checked: false,
    });
    self.dependents.entry(target).or_default().insert(from);
    true
  }

  /// [`Self::add_dependency`] for a reference whose visibility the caller
  /// already checked.
  pub fn add_checked_dependency(
    &mut self,
    from: VariantId,
    tag: DependencyTag,
    target: ModuleId,
    property: &str,
  ) -> bool {
    let added = self.add_dependency(from, tag.clone(), target, property);
    if let Some(dep) = self.variants[from.0]
      .deps
      .iter_mut()
      .find(|dep| dep.module == target && dep.tag == tag)
    {
      dep.visibility_checked = true;
    }
    added
  }

  /// Replace `variant` by one new variant per `(value, properties)` entry,
  /// each with `axis` set to `value`.
  ///
  /// The new variants inherit the original's dependencies, narrowed to the
  /// targets their variations allow, and every variant depending on this
  /// module has its targets recomputed. Returns the new variant ids in the
  /// order given; an empty split leaves the graph untouched.
  pub fn split(&mut self, variant: VariantId, axis: &str, variations: Vec<(String, Properties)>) -> Vec<VariantId> {
    if variations.is_empty() {
      return Vec::new();
    }

    let original = self.variants[variant.0].clone();
    let module = original.module;
    let mut created = Vec::with_capacity(variations.len());
    for (value, properties) in variations {
      let key = original.variations.with(axis, &value);
      let deps = original
        .deps
        .iter()
        .map(|dep| Dependency {
          targets: self.matching_targets(&key, &dep.tag, dep.module),
          ..dep.clone()
        })
        .collect();
      created.push(self.alloc_variant(module, key, properties, deps));
    }

    self.variants[variant.0].live = false;
    let slots = std::mem::take(&mut self.modules[module.0].variants);
    self.modules[module.0].variants = slots
      .into_iter()
      .flat_map(|v| if v == variant { created.clone() } else { vec![v] })
      .collect();

    for dep in &original.deps {
      if let Some(set) = self.dependents.get_mut(&dep.module) {
        set.remove(&variant);
        set.extend(created.iter().copied());
      }
    }

    let dependents: Vec<VariantId> = self
      .dependents
      .get(&module)
      .map(|set| set.iter().copied().collect())
      .unwrap_or_default();
    for dependent in dependents {
      self.refresh_targets(dependent, module);
    }

    debug!(
      variant = %self.describe(variant),
      axis,
      count = created.len(),
      "split variant"
    );
    created
  }

  /// Dependencies that apply to their variant but match no target variant.
  pub fn missing_variants(&self) -> Vec<(VariantId, &Dependency)> {
    self
      .live_variants()
      .flat_map(|v| {
        v.deps
          .iter()
          .filter(|dep| dep.targets.is_empty() && dep.tag.applies_to(&v.variations))
          .map(move |dep| (v.id, dep))
      })
      .collect()
  }

  fn alloc_variant(
    &mut self,
    module: ModuleId,
    variations: Variations,
    properties: Properties,
    deps: Vec<Dependency>,
  ) -> VariantId {
    let id = VariantId(self.variants.len());
    self.variants.push(Variant {
      id,
      module,
      variations,
      properties,
      deps,
      live: true,
    });
    id
  }

  fn matching_targets(&self, from: &Variations, tag: &DependencyTag, target: ModuleId) -> Vec<VariantId> {
    self.modules[target.0]
      .variants
      .iter()
      .copied()
      .filter(|id| tag.allows(from, &self.variants[id.0].variations))
      .collect()
  }

  fn refresh_targets(&mut self, dependent: VariantId, module: ModuleId) {
    if !self.variants[dependent.0].live {
      return;
    }
    let from = self.variants[dependent.0].variations.clone();
    let refreshed: Vec<(usize, Vec<VariantId>)> = self.variants[dependent.0]
      .deps
      .iter()
      .enumerate()
      .filter(|(_, dep)| dep.module == module)
      .map(|(i, dep)| (i, self.matching_targets(&from, &dep.tag, module)))
      .collect();
    for (i, targets) in refreshed {
      self.variants[dependent.0].deps[i].targets = targets;
    }
  }
}
