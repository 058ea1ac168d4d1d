//! Per-variant view handed to a mutator.

use crate::config::Config;
use crate::error::BuildError;
use crate::graph::{Dependency, DependencyTag, Module, ModuleGraph, Variant, VariantId};
use crate::module_types::{Capability, ModuleType, ModuleTypeRegistry};
use crate::namespace::NamespaceRegistry;
use crate::property::{Properties, PropertyError};

/// Read-only state shared by every stage of one run.
#[derive(Debug, Clone, Copy)]
pub struct Environment<'a> {
  pub config: &'a Config,
  pub module_types: &'a ModuleTypeRegistry,
  pub namespaces: &'a NamespaceRegistry,
}

/// A dependency requested by reference, resolved when the wave is applied.
#[derive(Debug, Clone)]
pub(crate) struct DependencyRequest {
  pub tag: DependencyTag,
  pub reference: String,
  pub property: String,
}

/// A requested split of the visited variant.
#[derive(Debug, Clone)]
pub(crate) struct SplitRequest {
  pub axis: String,
  pub variations: Vec<(String, Properties)>,
}

/// Everything a mutator asked for while visiting one variant.
#[derive(Debug, Default)]
pub(crate) struct MutatorOutput {
  pub properties: Option<Properties>,
  pub dependencies: Vec<DependencyRequest>,
  pub split: Option<SplitRequest>,
  pub errors: Vec<BuildError>,
}

/// What a mutator sees of the variant it visits.
///
/// The graph itself is never written through the context: property changes,
/// new dependencies and splits are recorded and applied by the pipeline after
/// the wave, so every mutator in a wave reads the same graph.
pub struct MutatorContext<'a> {
  mutator: &'a str,
  graph: &'a ModuleGraph,
  env: Environment<'a>,
  module: &'a Module,
  variant: &'a Variant,
  output: MutatorOutput,
}

impl<'a> MutatorContext<'a> {
  pub(crate) fn new(mutator: &'a str, graph: &'a ModuleGraph, env: Environment<'a>, variant: VariantId) -> Self {
    let variant = graph.variant(variant);
    Self {
      mutator,
      graph,
      env,
      module: graph.module(variant.module),
      variant,
      output: MutatorOutput::default(),
    }
  }

  pub fn graph(&self) -> &'a ModuleGraph {
    self.graph
  }

  pub fn config(&self) -> &'a Config {
    self.env.config
  }

  pub fn namespaces(&self) -> &'a NamespaceRegistry {
    self.env.namespaces
  }

  pub fn module(&self) -> &'a Module {
    self.module
  }

  pub fn variant(&self) -> &'a Variant {
    self.variant
  }

  pub fn module_type(&self) -> Option<&'a ModuleType> {
    self.env.module_types.get(&self.module.module_type)
  }

  pub fn has_capability(&self, capability: Capability) -> bool {
    self.module.has_capability(capability)
  }

  /// Value of `axis` for this variant, if it has been split on it.
  pub fn variation(&self, axis: &str) -> Option<&'a str> {
    self.variant.variations.get(axis)
  }

  /// Current properties, including changes made earlier in this visit.
  pub fn properties(&self) -> &Properties {
    self.output.properties.as_ref().unwrap_or(&self.variant.properties)
  }

  pub fn properties_mut(&mut self) -> &mut Properties {
    let variant = self.variant;
    self
      .output
      .properties
      .get_or_insert_with(|| variant.properties.clone())
  }

  /// Dependencies recorded on this variant by earlier stages.
  pub fn direct_deps(&self) -> impl Iterator<Item = &'a Dependency> {
    self.variant.deps.iter()
  }

  /// Request a dependency on the module `reference` names, declared by
  /// `property`. Resolution and visibility are checked when applied.
  pub fn add_dependency(&mut self, tag: DependencyTag, reference: &str, property: &str) {
    self.output.dependencies.push(DependencyRequest {
      tag,
      reference: reference.to_string(),
      property: property.to_string(),
    });
  }

  /// Split this variant on `axis`, one new variant per value.
  ///
  /// Each new variant starts from a copy of the current properties; adjust
  /// them with [`variation_properties_mut`](Self::variation_properties_mut).
  pub fn create_variations(&mut self, axis: &str, values: &[&str]) {
    let properties = self.properties().clone();
    self.output.split = Some(SplitRequest {
      axis: axis.to_string(),
      variations: values
        .iter()
        .map(|value| (value.to_string(), properties.clone()))
        .collect(),
    });
  }

  /// Properties of the variant about to be created for `value`.
  pub fn variation_properties_mut(&mut self, value: &str) -> Option<&mut Properties> {
    self
      .output
      .split
      .as_mut()?
      .variations
      .iter_mut()
      .find(|(v, _)| v == value)
      .map(|(_, props)| props)
  }

  /// Report an error against the whole module.
  pub fn module_error(&mut self, message: impl Into<String>) {
    let error = self.mutator_error(None, message.into());
    self.output.errors.push(error);
  }

  /// Report an error against one of the module's properties.
  pub fn property_error(&mut self, property: &str, message: impl Into<String>) {
    let error = self.mutator_error(Some(property.to_string()), message.into());
    self.output.errors.push(error);
  }

  /// Report a failed property operation.
  pub fn report(&mut self, source: PropertyError) {
    self.output.errors.push(BuildError::Property {
      module: self.module.name.clone(),
      package: self.module.package.clone(),
      source,
    });
  }

  pub(crate) fn finish(self) -> MutatorOutput {
    self.output
  }

  fn mutator_error(&self, property: Option<String>, message: String) -> BuildError {
    BuildError::Mutator {
      mutator: self.mutator.to_string(),
      module: self.module.name.clone(),
      package: self.module.package.clone(),
      property,
      message,
    }
  }
}
