//! Namespaces, name resolution and visibility.
//!
//! Every module is registered in the namespace enclosing its package: the
//! deepest package path that declares a namespace, or the implicit global
//! namespace. References resolve either by exact namespace (`//scope:name`)
//! or by searching the referencing package's namespace, its imports, and
//! finally the global namespace.

mod reference;
mod registry;
mod visibility;

use thiserror::Error;

pub use reference::ModuleReference;
pub use registry::{ImportPrecedence, Namespace, NamespaceRegistry, Package};
pub use visibility::{VisibilityRule, VisibilityRuleError, parse_rules, rules_allow};

use crate::graph::ModuleId;

/// Errors turning a reference into a module.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
  /// The reference is neither `//scope:name` nor a plain name.
  #[error("invalid module reference \"{reference}\"")]
  InvalidReference { reference: String },

  /// A qualified reference names a namespace that does not exist.
  #[error("namespace \"{namespace}\" does not exist")]
  UnknownNamespace { namespace: String },

  /// No searched namespace holds the name.
  #[error("module \"{name}\" not found in {}", describe_namespaces(.searched))]
  UnknownModule { name: String, searched: Vec<String> },

  /// Several equally ranked namespaces hold the name.
  #[error("module \"{name}\" is ambiguous: found in {}", describe_namespaces(.namespaces))]
  AmbiguousModule { name: String, namespaces: Vec<String> },
}

/// Errors registering namespaces, packages and module names.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NamespaceError {
  #[error("namespace \"{namespace}\" is declared twice")]
  DuplicateNamespace { namespace: String },

  #[error("package \"{package}\" is declared twice")]
  DuplicatePackage { package: String },

  #[error("namespace \"{namespace}\" imports unknown namespace \"{import}\"")]
  UnknownImport { namespace: String, import: String },

  #[error("namespace \"{namespace}\" does not exist")]
  UnknownNamespace { namespace: String },

  /// A same-named module already lives in the namespace.
  #[error("module \"{name}\" already defined in {}", describe_namespace(.namespace))]
  DuplicateModule {
    name: String,
    namespace: String,
    existing: ModuleId,
  },
}

/// Human-readable namespace name; the global namespace has an empty name.
pub fn describe_namespace(namespace: &str) -> String {
  if namespace.is_empty() {
    "the global namespace".to_string()
  } else {
    format!("namespace \"{}\"", namespace)
  }
}

fn describe_namespaces(namespaces: &[String]) -> String {
  namespaces
    .iter()
    .map(|ns| describe_namespace(ns))
    .collect::<Vec<_>>()
    .join(", ")
}
