//! Build errors.
//!
//! Every error a graph construction run can report, each attributed to the
//! module and package responsible. Errors are collected into an
//! [`ErrorList`] rather than returned one at a time, so a single run reports
//! as many independent problems as it can find.

use std::fmt;

use thiserror::Error;

use crate::namespace::{NamespaceError, ResolveError, VisibilityRule, VisibilityRuleError, describe_namespace};
use crate::property::PropertyError;

/// A user-facing error attributed to a module or package.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
  /// Two modules with the same name in one namespace.
  #[error(
    "module \"{name}\" in package \"{package}\" is already defined in {} by package \"{previous_package}\"",
    describe_namespace(.namespace)
  )]
  DuplicateModuleName {
    name: String,
    namespace: String,
    package: String,
    previous_package: String,
  },

  /// A namespace or package declaration problem.
  #[error("package \"{package}\": {source}")]
  Namespace {
    package: String,
    #[source]
    source: NamespaceError,
  },

  /// A module declared with a type nobody registered.
  #[error("module \"{module}\" in package \"{package}\": unknown module type \"{module_type}\"")]
  UnknownModuleType {
    module: String,
    package: String,
    module_type: String,
  },

  /// Population, merge or selection of a module's properties failed.
  #[error("module \"{module}\" in package \"{package}\": {source}")]
  Property {
    module: String,
    package: String,
    #[source]
    source: PropertyError,
  },

  /// A `visibility`, `defaults_visibility` or `default_visibility` list is malformed.
  #[error("module \"{module}\" in package \"{package}\": property \"{property}\": {source}")]
  InvalidVisibility {
    module: String,
    package: String,
    property: String,
    #[source]
    source: VisibilityRuleError,
  },

  /// A package's `default_visibility` list is malformed.
  #[error("package \"{package}\": property \"default_visibility\": {source}")]
  InvalidDefaultVisibility {
    package: String,
    #[source]
    source: VisibilityRuleError,
  },

  /// A module reference could not be resolved.
  #[error("module \"{module}\" in package \"{package}\": property \"{property}\": {source}")]
  Reference {
    module: String,
    package: String,
    property: String,
    #[source]
    source: ResolveError,
  },

  /// A reference to a module the referencing package may not see.
  #[error(
    "module \"{module}\" in package \"{package}\" may not reference \"{target}\" in package \"{target_package}\" (property \"{property}\"): not visible under [{}]",
    join_rules(.rules)
  )]
  Visibility {
    module: String,
    package: String,
    property: String,
    target: String,
    target_package: String,
    rules: Vec<VisibilityRule>,
  },

  /// A name listed under `defaults` that is not a defaults module.
  #[error("module \"{module}\" in package \"{package}\": \"{target}\" is not a defaults module")]
  NotDefaults {
    module: String,
    package: String,
    target: String,
  },

  /// A dependency list naming a defaults module.
  #[error(
    "module \"{module}\" in package \"{package}\": property \"{property}\": cannot depend on defaults module \"{target}\""
  )]
  DependsOnDefaults {
    module: String,
    package: String,
    property: String,
    target: String,
  },

  /// A dependency cycle among ordinary modules.
  #[error("dependency cycle: {}", .path.join(" -> "))]
  DependencyCycle { path: Vec<String> },

  /// A cycle among defaults modules.
  #[error("defaults cycle: {}", .path.join(" -> "))]
  DefaultsCycle { path: Vec<String> },

  /// A dependency that no variant of its target satisfies.
  #[error(
    "module \"{module}\" in package \"{package}\" variant {variations}: property \"{property}\": no variant of \"{target}\" matches"
  )]
  MissingVariant {
    module: String,
    package: String,
    variations: String,
    property: String,
    target: String,
  },

  /// A mutator's own check failed.
  #[error("{mutator}: module \"{module}\" in package \"{package}\"{}: {message}", describe_property(.property))]
  Mutator {
    mutator: String,
    module: String,
    package: String,
    property: Option<String>,
    message: String,
  },
}

impl BuildError {
  /// Package the error is reported against, if it has one.
  pub fn package(&self) -> Option<&str> {
    match self {
      BuildError::DependencyCycle { .. } | BuildError::DefaultsCycle { .. } => None,
      BuildError::DuplicateModuleName { package, .. }
      | BuildError::Namespace { package, .. }
      | BuildError::UnknownModuleType { package, .. }
      | BuildError::Property { package, .. }
      | BuildError::InvalidVisibility { package, .. }
      | BuildError::InvalidDefaultVisibility { package, .. }
      | BuildError::Reference { package, .. }
      | BuildError::Visibility { package, .. }
      | BuildError::NotDefaults { package, .. }
      | BuildError::DependsOnDefaults { package, .. }
      | BuildError::MissingVariant { package, .. }
      | BuildError::Mutator { package, .. } => Some(package),
    }
  }
}

fn join_rules(rules: &[VisibilityRule]) -> String {
  rules.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

fn describe_property(property: &Option<String>) -> String {
  match property {
    Some(p) => format!(" property \"{}\"", p),
    None => String::new(),
  }
}

/// Errors collected over one run, in the order they were found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorList(Vec<BuildError>);

impl ErrorList {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn push(&mut self, error: BuildError) {
    self.0.push(error);
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn iter(&self) -> impl Iterator<Item = &BuildError> {
    self.0.iter()
  }

  pub fn into_vec(self) -> Vec<BuildError> {
    self.0
  }

  /// `Ok(value)` if nothing was collected.
  pub fn into_result<T>(self, value: T) -> Result<T, ErrorList> {
    if self.is_empty() { Ok(value) } else { Err(self) }
  }
}

impl Extend<BuildError> for ErrorList {
  fn extend<I: IntoIterator<Item = BuildError>>(&mut self, iter: I) {
    self.0.extend(iter);
  }
}

impl From<Vec<BuildError>> for ErrorList {
  fn from(errors: Vec<BuildError>) -> Self {
    Self(errors)
  }
}

impl From<BuildError> for ErrorList {
  fn from(error: BuildError) -> Self {
    Self(vec![error])
  }
}

impl IntoIterator for ErrorList {
  type Item = BuildError;
  type IntoIter = std::vec::IntoIter<BuildError>;

  fn into_iter(self) -> Self::IntoIter {
    self.0.into_iter()
  }
}

impl fmt::Display for ErrorList {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (i, error) in self.0.iter().enumerate() {
      if i > 0 {
        writeln!(f)?;
      }
      write!(f, "{}", error)?;
    }
    Ok(())
  }
}

impl std::error::Error for ErrorList {}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn visibility_error_names_both_packages() {
    let err = BuildError::Visibility {
      module: "bar".to_string(),
      package: "c/d".to_string(),
      property: "shared_libs".to_string(),
      target: "foo".to_string(),
      target_package: "a/b".to_string(),
      rules: vec![VisibilityRule::Private],
    };
    let message = err.to_string();
    assert!(message.contains("\"c/d\""), "{message}");
    assert!(message.contains("\"a/b\""), "{message}");
    assert!(message.contains("//visibility:private"), "{message}");
  }

  #[test]
  fn cycle_path_is_joined() {
    let err = BuildError::DefaultsCycle {
      path: vec!["d1".to_string(), "d2".to_string(), "d1".to_string()],
    };
    assert_eq!(err.to_string(), "defaults cycle: d1 -> d2 -> d1");
    assert_eq!(err.package(), None);
  }

  #[test]
  fn mutator_error_mentions_property_when_given() {
    let err = BuildError::Mutator {
      mutator: "soong_config".to_string(),
      module: "foo".to_string(),
      package: "a".to_string(),
      property: Some("soong_config_variables.board".to_string()),
      message: "bad".to_string(),
    };
    assert_eq!(
      err.to_string(),
      "soong_config: module \"foo\" in package \"a\" property \"soong_config_variables.board\": bad"
    );
  }

  #[test]
  fn list_prints_one_error_per_line() {
    let mut list = ErrorList::new();
    list.push(BuildError::DependencyCycle {
      path: vec!["a".to_string(), "a".to_string()],
    });
    list.push(BuildError::DefaultsCycle {
      path: vec!["d".to_string(), "d".to_string()],
    });
    assert_eq!(list.to_string(), "dependency cycle: a -> a\ndefaults cycle: d -> d");
    assert!(list.clone().into_result(()).is_err());
    assert!(ErrorList::new().into_result(()).is_ok());
  }
}
