//! Module references as written in dependency lists.

use std::fmt;
use std::str::FromStr;

use super::ResolveError;

/// A reference to a module from a dependency list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleReference {
  /// `//scope:name`; `//:name` names the global namespace.
  Qualified { namespace: String, name: String },
  /// A plain name, searched through the referencing package's namespaces.
  Unqualified(String),
}

impl ModuleReference {
  pub fn name(&self) -> &str {
    match self {
      ModuleReference::Qualified { name, .. } => name,
      ModuleReference::Unqualified(name) => name,
    }
  }
}

impl FromStr for ModuleReference {
  type Err = ResolveError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let invalid = || ResolveError::InvalidReference {
      reference: s.to_string(),
    };

    if let Some(rest) = s.strip_prefix("//") {
      let (namespace, name) = rest.split_once(':').ok_or_else(invalid)?;
      if name.is_empty() || name.contains(':') || namespace.ends_with('/') {
        return Err(invalid());
      }
      return Ok(ModuleReference::Qualified {
        namespace: namespace.to_string(),
        name: name.to_string(),
      });
    }

    if s.is_empty() || s.contains(':') || s.contains('/') {
      return Err(invalid());
    }
    Ok(ModuleReference::Unqualified(s.to_string()))
  }
}

impl fmt::Display for ModuleReference {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ModuleReference::Qualified { namespace, name } => write!(f, "//{}:{}", namespace, name),
      ModuleReference::Unqualified(name) => f.write_str(name),
    }
  }
}
