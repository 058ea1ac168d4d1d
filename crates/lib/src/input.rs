//! Parsed module records handed over by the front end.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors reading a record file.
#[derive(Debug, Error)]
pub enum InputError {
  #[error("failed to read {path}: {source}")]
  Io {
    path: String,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse module records: {0}")]
  Parse(#[from] serde_json::Error),
}

/// Namespace declared by a package.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamespaceDecl {
  pub imports: Vec<String>,
}

/// One module as parsed: type tag, name and raw property tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleRecord {
  #[serde(rename = "type")]
  pub module_type: String,
  pub name: String,
  #[serde(default)]
  pub properties: Map<String, Value>,
}

/// A package and the modules it declares.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageRecord {
  pub path: String,
  #[serde(default)]
  pub default_visibility: Option<Vec<String>>,
  #[serde(default)]
  pub namespace: Option<NamespaceDecl>,
  #[serde(default)]
  pub modules: Vec<ModuleRecord>,
}

/// Every package of one build.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackageSet {
  pub packages: Vec<PackageRecord>,
}

impl PackageSet {
  pub fn from_json(content: &str) -> Result<Self, InputError> {
    Ok(serde_json::from_str(content)?)
  }

  pub fn from_file(path: &Path) -> Result<Self, InputError> {
    let content = std::fs::read_to_string(path).map_err(|source| InputError::Io {
      path: path.display().to_string(),
      source,
    })?;
    Self::from_json(&content)
  }

  pub fn module_count(&self) -> usize {
    self.packages.iter().map(|p| p.modules.len()).sum()
  }
}
