//! One graph construction run.
//!
//! A [`Context`] owns every registry of a run: configuration, module types,
//! mutators, namespaces and the graph itself. Nothing is global, so two
//! contexts never observe each other.

use tracing::{debug, info};

use crate::config::Config;
use crate::error::{BuildError, ErrorList};
use crate::graph::{Module, ModuleGraph, ModuleId};
use crate::input::{ModuleRecord, PackageRecord, PackageSet};
use crate::module_types::ModuleTypeRegistry;
use crate::mutator::{Environment, MutatorRegistry, Pipeline};
use crate::namespace::{NamespaceError, NamespaceRegistry, VisibilityRule, parse_rules};
use crate::property::{Properties, populate};
use crate::resolved::ResolvedGraph;

pub struct Context {
  pub config: Config,
  pub module_types: ModuleTypeRegistry,
  pub mutators: MutatorRegistry,
  namespaces: NamespaceRegistry,
  graph: ModuleGraph,
}

impl Context {
  /// A context with the built-in module types and stages.
  pub fn new(config: Config) -> Self {
    let namespaces = NamespaceRegistry::new(config.import_precedence);
    Self {
      config,
      module_types: ModuleTypeRegistry::with_builtins(),
      mutators: MutatorRegistry::with_builtins(),
      namespaces,
      graph: ModuleGraph::new(),
    }
  }

  pub fn graph(&self) -> &ModuleGraph {
    &self.graph
  }

  pub fn namespaces(&self) -> &NamespaceRegistry {
    &self.namespaces
  }

  /// Register every package, namespace and module of `set`.
  ///
  /// Namespaces are declared before any module is registered, so a module's
  /// namespace never depends on package order.
  pub fn add_packages(&mut self, set: &PackageSet) -> Result<(), ErrorList> {
    let mut errors = ErrorList::new();

    for package in &set.packages {
      if let Err(err) = self.add_package(package) {
        errors.push(err);
      }
    }
    for err in self.namespaces.validate_imports() {
      let package = match &err {
        NamespaceError::UnknownImport { namespace, .. } => namespace.clone(),
        _ => String::new(),
      };
      errors.push(BuildError::Namespace { package, source: err });
    }

    for package in &set.packages {
      for record in &package.modules {
        if let Err(err) = self.add_module(&package.path, record) {
          errors.push(err);
        }
      }
    }

    info!(
      packages = set.packages.len(),
      modules = self.graph.module_count(),
      errors = errors.len(),
      "loaded packages"
    );
    errors.into_result(())
  }

  fn add_package(&mut self, package: &PackageRecord) -> Result<(), BuildError> {
    let path = &package.path;
    let namespace_error = |source: NamespaceError| BuildError::Namespace {
      package: path.clone(),
      source,
    };

    let default_visibility = match &package.default_visibility {
      Some(labels) => Some(
        parse_rules(path, labels).map_err(|source| BuildError::InvalidDefaultVisibility {
          package: path.clone(),
          source,
        })?,
      ),
      None => None,
    };

    if let Some(namespace) = &package.namespace {
      self
        .namespaces
        .add_namespace(path, namespace.imports.clone())
        .map_err(namespace_error)?;
    }
    self
      .namespaces
      .add_package(path, default_visibility)
      .map_err(namespace_error)
  }

  /// Populate and register one module.
  pub fn add_module(&mut self, package: &str, record: &ModuleRecord) -> Result<ModuleId, BuildError> {
    let Some(module_type) = self.module_types.get(&record.module_type) else {
      return Err(BuildError::UnknownModuleType {
        module: record.name.clone(),
        package: package.to_string(),
        module_type: record.module_type.clone(),
      });
    };

    let properties = populate(&module_type.schema, &record.properties).map_err(|source| BuildError::Property {
      module: record.name.clone(),
      package: package.to_string(),
      source,
    })?;

    let mut module = Module::new(&record.name, &record.module_type, package);
    module.capabilities = module_type.capabilities.clone();
    module.visibility = visibility_rules(&record.name, package, &properties, "visibility")?;
    module.defaults_visibility = visibility_rules(&record.name, package, &properties, "defaults_visibility")?;

    let id = ModuleId(self.graph.module_count());
    module.namespace = self
      .namespaces
      .register_module(package, &record.name, id)
      .map_err(|err| match err {
        NamespaceError::DuplicateModule { name, namespace, existing } => BuildError::DuplicateModuleName {
          name,
          namespace,
          package: package.to_string(),
          previous_package: self.graph.module(existing).package.clone(),
        },
        source => BuildError::Namespace {
          package: package.to_string(),
          source,
        },
      })?;

    debug!(module = %record.name, package, namespace = %module.namespace, "registered module");
    Ok(self.graph.add_module(module, properties))
  }

  /// Run defaults propagation and every stage.
  pub fn run(&mut self) -> Result<(), ErrorList> {
    let env = Environment {
      config: &self.config,
      module_types: &self.module_types,
      namespaces: &self.namespaces,
    };
    Pipeline::new(&self.mutators, env).run(&mut self.graph)
  }

  /// The resolved graph as it currently stands.
  pub fn resolved(&self) -> ResolvedGraph {
    ResolvedGraph::from_graph(&self.graph, &self.namespaces, &self.config.external_build)
  }

  /// Run the pipeline and return the resolved graph.
  pub fn resolve(mut self) -> Result<ResolvedGraph, ErrorList> {
    self.run()?;
    Ok(self.resolved())
  }
}

fn visibility_rules(
  module: &str,
  package: &str,
  properties: &Properties,
  property: &str,
) -> Result<Option<Vec<VisibilityRule>>, BuildError> {
  if !properties.contains(property) {
    return Ok(None);
  }
  parse_rules(package, properties.get_list(property))
    .map(Some)
    .map_err(|source| BuildError::InvalidVisibility {
      module: module.to_string(),
      package: package.to_string(),
      property: property.to_string(),
      source,
    })
}

/// Load `set` into a fresh context and resolve it.
pub fn resolve_packages(config: Config, set: &PackageSet) -> Result<ResolvedGraph, ErrorList> {
  let mut ctx = Context::new(config);
  ctx.add_packages(set)?;
  ctx.resolve()
}
