//! Build configuration: the selector context consulted by mutators.
//!
//! Loaded from TOML; every field has a default, so an empty file (or no
//! file at all) describes a host build on the running machine plus an
//! `android` device with `arm64` and `arm`.
//!
//! ```toml
//! parallelism = 4
//! import_precedence = "strict"
//!
//! [host]
//! os = "linux"
//! arch = "x86_64"
//!
//! [device]
//! os = "android"
//! archs = ["arm64"]
//!
//! [soong_config.variables.feature]
//! kind = "bool"
//!
//! [soong_config.values]
//! feature = "true"
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::delegation::ExternalBuildConfig;
use crate::namespace::ImportPrecedence;
use crate::platform::{Arch, Os, Target};

/// Errors loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read config {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse config: {0}")]
  Parse(#[from] toml::de::Error),

  /// A value that parses but cannot be used.
  #[error("invalid config: {0}")]
  Invalid(String),
}

/// Device target settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
  pub os: Os,
  /// Architectures device variants are built for, primary first.
  pub archs: Vec<Arch>,
}

impl Default for DeviceConfig {
  fn default() -> Self {
    Self {
      os: Os::Android,
      archs: vec![Arch::Arm64, Arch::Arm],
    }
  }
}

/// Declaration of a configuration variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VariableDecl {
  /// Selects its properties when truthy.
  Bool,
  /// Selects the branch named by its value, which must be declared.
  String { values: Vec<String> },
  /// Substitutes its value for `%s` in its properties.
  Value,
}

/// Configuration variables and their values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoongConfig {
  pub variables: BTreeMap<String, VariableDecl>,
  pub values: BTreeMap<String, String>,
}

impl SoongConfig {
  pub fn value(&self, variable: &str) -> Option<&str> {
    self.values.get(variable).map(String::as_str)
  }
}

/// Full configuration of one graph construction run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  pub host: Target,
  pub device: DeviceConfig,
  pub soong_config: SoongConfig,
  pub import_precedence: ImportPrecedence,
  pub external_build: ExternalBuildConfig,
  /// Worker threads per stage.
  pub parallelism: usize,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      host: Target::default(),
      device: DeviceConfig::default(),
      soong_config: SoongConfig::default(),
      import_precedence: ImportPrecedence::default(),
      external_build: ExternalBuildConfig::default(),
      parallelism: std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1),
    }
  }
}

impl Config {
  /// Parse a TOML document.
  pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
    let config: Config = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
  }

  /// Read and parse a TOML file.
  pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
      path: path.to_path_buf(),
      source,
    })?;
    Self::from_toml(&content)
  }

  fn validate(&self) -> Result<(), ConfigError> {
    if self.device.archs.is_empty() {
      return Err(ConfigError::Invalid("device.archs must not be empty".to_string()));
    }
    if self.device.os.is_host() {
      return Err(ConfigError::Invalid(format!(
        "device.os must be a device OS, found {}",
        self.device.os
      )));
    }
    for (name, decl) in &self.soong_config.variables {
      if let VariableDecl::String { values } = decl {
        let unique: BTreeSet<&String> = values.iter().collect();
        if unique.len() != values.len() {
          return Err(ConfigError::Invalid(format!(
            "soong config variable \"{}\" declares a value twice",
            name
          )));
        }
      }
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_document_uses_defaults() {
    let config = Config::from_toml("").unwrap();
    assert_eq!(config.device.os, Os::Android);
    assert_eq!(config.device.archs, vec![Arch::Arm64, Arch::Arm]);
    assert_eq!(config.import_precedence, ImportPrecedence::PreferImports);
    assert!(config.parallelism >= 1);
  }

  #[test]
  fn parses_all_sections() {
    let config = Config::from_toml(
      r#"
parallelism = 2
import_precedence = "strict"

[host]
os = "linux"
arch = "x86_64"

[device]
archs = ["arm64"]

[soong_config.variables.feature]
kind = "bool"

[soong_config.variables.board]
kind = "string"
values = ["alpha", "beta"]

[soong_config.values]
feature = "true"
board = "beta"

[external_build]
enabled = true
do_not_convert = ["libbad"]

[external_build.packages]
"a" = "default_true_recursively"
"#,
    )
    .unwrap();

    assert_eq!(config.parallelism, 2);
    assert_eq!(config.import_precedence, ImportPrecedence::Strict);
    assert_eq!(config.host, Target::new(Os::Linux, Arch::X86_64));
    assert_eq!(config.device.archs, vec![Arch::Arm64]);
    assert_eq!(config.soong_config.variables["feature"], VariableDecl::Bool);
    assert_eq!(
      config.soong_config.variables["board"],
      VariableDecl::String {
        values: vec!["alpha".to_string(), "beta".to_string()]
      }
    );
    assert_eq!(config.soong_config.value("board"), Some("beta"));
    assert!(config.external_build.enabled);
    assert!(config.external_build.do_not_convert.contains("libbad"));
  }

  #[test]
  fn rejects_empty_device_archs() {
    let err = Config::from_toml("[device]\narchs = []\n").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
  }

  #[test]
  fn rejects_host_os_as_device() {
    let err = Config::from_toml("[device]\nos = \"linux\"\n").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
  }

  #[test]
  fn rejects_malformed_toml() {
    assert!(matches!(Config::from_toml("parallelism = ["), Err(ConfigError::Parse(_))));
  }

  #[test]
  fn reads_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("modgraph.toml");
    std::fs::write(&path, "parallelism = 3\n").unwrap();
    assert_eq!(Config::from_file(&path).unwrap().parallelism, 3);

    let missing = dir.path().join("missing.toml");
    assert!(matches!(Config::from_file(&missing), Err(ConfigError::Io { .. })));
  }
}
