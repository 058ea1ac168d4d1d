//! Namespace registry and name resolution.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::reference::ModuleReference;
use super::visibility::{VisibilityRule, is_within, rules_allow};
use super::{NamespaceError, ResolveError};
use crate::consts::GLOBAL_NAMESPACE;
use crate::graph::{Module, ModuleId};

/// How an unqualified reference is resolved when it matches both an
/// imported namespace and the global namespace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportPrecedence {
  /// The imported namespace wins.
  #[default]
  PreferImports,
  /// The reference is ambiguous and must be qualified.
  Strict,
}

/// A scope for module-name uniqueness.
#[derive(Debug, Clone, Default)]
pub struct Namespace {
  /// Path of the declaring package; empty for the global namespace.
  pub name: String,
  /// Namespaces searched, in order, for unqualified references.
  pub imports: Vec<String>,
  modules: BTreeMap<String, ModuleId>,
}

impl Namespace {
  fn new(name: &str, imports: Vec<String>) -> Self {
    Self {
      name: name.to_string(),
      imports,
      modules: BTreeMap::new(),
    }
  }

  pub fn get(&self, name: &str) -> Option<ModuleId> {
    self.modules.get(name).copied()
  }

  pub fn module_count(&self) -> usize {
    self.modules.len()
  }
}

/// A directory-scoped group of modules.
#[derive(Debug, Clone)]
pub struct Package {
  pub path: String,
  pub default_visibility: Option<Vec<VisibilityRule>>,
}

/// All namespaces and packages of one graph construction run.
#[derive(Debug, Clone)]
pub struct NamespaceRegistry {
  namespaces: BTreeMap<String, Namespace>,
  packages: BTreeMap<String, Package>,
  precedence: ImportPrecedence,
}

impl Default for NamespaceRegistry {
  fn default() -> Self {
    Self::new(ImportPrecedence::default())
  }
}

impl NamespaceRegistry {
  pub fn new(precedence: ImportPrecedence) -> Self {
    let mut namespaces = BTreeMap::new();
    namespaces.insert(
      GLOBAL_NAMESPACE.to_string(),
      Namespace::new(GLOBAL_NAMESPACE, Vec::new()),
    );
    Self {
      namespaces,
      packages: BTreeMap::new(),
      precedence,
    }
  }

  pub fn precedence(&self) -> ImportPrecedence {
    self.precedence
  }

  /// Declare the namespace defined by package `path`.
  pub fn add_namespace(&mut self, path: &str, imports: Vec<String>) -> Result<(), NamespaceError> {
    if path == GLOBAL_NAMESPACE || self.namespaces.contains_key(path) {
      return Err(NamespaceError::DuplicateNamespace {
        namespace: path.to_string(),
      });
    }
    self.namespaces.insert(path.to_string(), Namespace::new(path, imports));
    Ok(())
  }

  pub fn add_package(&mut self, path: &str, default_visibility: Option<Vec<VisibilityRule>>) -> Result<(), NamespaceError> {
    if self.packages.contains_key(path) {
      return Err(NamespaceError::DuplicatePackage {
        package: path.to_string(),
      });
    }
    self.packages.insert(
      path.to_string(),
      Package {
        path: path.to_string(),
        default_visibility,
      },
    );
    Ok(())
  }

  /// Imports naming namespaces that were never declared.
  pub fn validate_imports(&self) -> Vec<NamespaceError> {
    self
      .namespaces
      .values()
      .flat_map(|ns| {
        ns.imports
          .iter()
          .filter(|import| import.as_str() == GLOBAL_NAMESPACE || !self.namespaces.contains_key(import.as_str()))
          .map(|import| NamespaceError::UnknownImport {
            namespace: ns.name.clone(),
            import: import.clone(),
          })
      })
      .collect()
  }

  pub fn namespace(&self, name: &str) -> Option<&Namespace> {
    self.namespaces.get(name)
  }

  pub fn namespaces(&self) -> impl Iterator<Item = &Namespace> {
    self.namespaces.values()
  }

  pub fn package(&self, path: &str) -> Option<&Package> {
    self.packages.get(path)
  }

  /// The deepest namespace whose path is `package` or one of its ancestors,
  /// else the global namespace.
  pub fn enclosing_namespace(&self, package: &str) -> &str {
    self
      .namespaces
      .keys()
      .filter(|ns| !ns.is_empty() && is_within(package, ns))
      .max_by_key(|ns| ns.len())
      .map(String::as_str)
      .unwrap_or(GLOBAL_NAMESPACE)
  }

  /// Register `name` in the namespace enclosing `package`, returning that
  /// namespace's name.
  pub fn register_module(&mut self, package: &str, name: &str, id: ModuleId) -> Result<String, NamespaceError> {
    let namespace = self.enclosing_namespace(package).to_string();
    let Some(ns) = self.namespaces.get_mut(&namespace) else {
      return Err(NamespaceError::UnknownNamespace { namespace });
    };
    if let Some(&existing) = ns.modules.get(name) {
      return Err(NamespaceError::DuplicateModule {
        name: name.to_string(),
        namespace,
        existing,
      });
    }
    ns.modules.insert(name.to_string(), id);
    Ok(namespace)
  }

  /// Resolve a module reference written in `from_package`.
  pub fn resolve(&self, from_package: &str, reference: &str) -> Result<ModuleId, ResolveError> {
    match reference.parse::<ModuleReference>()? {
      ModuleReference::Qualified { namespace, name } => {
        let ns = self
          .namespaces
          .get(&namespace)
          .ok_or_else(|| ResolveError::UnknownNamespace {
            namespace: namespace.clone(),
          })?;
        ns.get(&name).ok_or(ResolveError::UnknownModule {
          name,
          searched: vec![namespace],
        })
      }
      ModuleReference::Unqualified(name) => self.resolve_unqualified(from_package, &name),
    }
  }

  fn resolve_unqualified(&self, from_package: &str, name: &str) -> Result<ModuleId, ResolveError> {
    let enclosing = self.enclosing_namespace(from_package);
    let own = &self.namespaces[enclosing];
    if let Some(id) = own.get(name) {
      trace!(name, namespace = enclosing, "resolved in enclosing namespace");
      return Ok(id);
    }

    let imported: Vec<(&str, ModuleId)> = own
      .imports
      .iter()
      .filter_map(|import| {
        let id = self.namespaces.get(import)?.get(name)?;
        Some((import.as_str(), id))
      })
      .collect();
    let global = if enclosing == GLOBAL_NAMESPACE {
      None
    } else {
      self.namespaces[GLOBAL_NAMESPACE].get(name)
    };

    match imported.as_slice() {
      [] => {}
      [(import, id)] => {
        if self.precedence == ImportPrecedence::Strict && global.is_some() {
          return Err(ResolveError::AmbiguousModule {
            name: name.to_string(),
            namespaces: vec![import.to_string(), GLOBAL_NAMESPACE.to_string()],
          });
        }
        trace!(name, namespace = *import, "resolved through import");
        return Ok(*id);
      }
      many => {
        return Err(ResolveError::AmbiguousModule {
          name: name.to_string(),
          namespaces: many.iter().map(|(ns, _)| ns.to_string()).collect(),
        });
      }
    }

    if let Some(id) = global {
      trace!(name, "resolved in global namespace");
      return Ok(id);
    }

    let mut searched = vec![enclosing.to_string()];
    searched.extend(own.imports.iter().cloned());
    if enclosing != GLOBAL_NAMESPACE {
      searched.push(GLOBAL_NAMESPACE.to_string());
    }
    Err(ResolveError::UnknownModule {
      name: name.to_string(),
      searched,
    })
  }

  /// `default_visibility` of `package` or its nearest ancestor package that
  /// sets one.
  pub fn default_visibility(&self, package: &str) -> Option<&[VisibilityRule]> {
    let mut current = package;
    loop {
      if let Some(rules) = self.packages.get(current).and_then(|p| p.default_visibility.as_deref()) {
        return Some(rules);
      }
      if current.is_empty() {
        return None;
      }
      current = current.rsplit_once('/').map(|(parent, _)| parent).unwrap_or("");
    }
  }

  /// Effective visibility of `module`: its own rules, else the inherited
  /// package default, else legacy public.
  pub fn effective_visibility(&self, module: &Module) -> Vec<VisibilityRule> {
    self.effective(module.visibility.as_deref(), &module.package)
  }

  /// Check that `from_package` may depend on `target`.
  ///
  /// On failure returns the rules that denied it.
  pub fn check_visibility(&self, from_package: &str, target: &Module) -> Result<(), Vec<VisibilityRule>> {
    self.check(from_package, target.visibility.as_deref(), &target.package)
  }

  /// Check that `from_package` may list the defaults module `target` under
  /// `defaults`.
  pub fn check_defaults_visibility(&self, from_package: &str, target: &Module) -> Result<(), Vec<VisibilityRule>> {
    self.check(from_package, target.defaults_visibility.as_deref(), &target.package)
  }

  fn check(&self, from_package: &str, own: Option<&[VisibilityRule]>, target_package: &str) -> Result<(), Vec<VisibilityRule>> {
    if from_package == target_package {
      return Ok(());
    }
    let rules = self.effective(own, target_package);
    if rules_allow(&rules, from_package) {
      Ok(())
    } else {
      Err(rules)
    }
  }

  fn effective(&self, own: Option<&[VisibilityRule]>, package: &str) -> Vec<VisibilityRule> {
    own
      .or_else(|| self.default_visibility(package))
      .map(|rules| rules.to_vec())
      .unwrap_or_else(|| vec![VisibilityRule::LegacyPublic])
  }
}
