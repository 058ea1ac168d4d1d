//! External build orchestrator flags.
//!
//! Each final variant records whether its module is converted for the
//! external orchestrator and, in mixed mode, whether its compilation is
//! delegated there. These flags come from configuration plus the module's
//! `external_build` properties; they never influence the graph itself.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::consts::{AXIS_OS, ROOT_PACKAGE_KEY};
use crate::graph::{Module, Variant};
use crate::module_types::Capability;
use crate::platform::Os;

/// Per-package conversion default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageDefault {
  /// Modules in this package and every subpackage convert unless they opt out.
  DefaultTrueRecursively,
  /// Modules in exactly this package convert unless they opt out.
  DefaultTrue,
  /// Modules in exactly this package only convert when they opt in.
  DefaultFalse,
}

/// Configuration of the external orchestrator integration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExternalBuildConfig {
  /// Mixed mode: delegate converted modules' compilation.
  pub enabled: bool,
  /// Conversion defaults by package path; `"."` is the top-level package.
  pub packages: BTreeMap<String, PackageDefault>,
  /// Modules never converted, by name.
  pub do_not_convert: BTreeSet<String>,
  /// Converted modules that are still built locally in mixed mode.
  pub mixed_builds_disabled: BTreeSet<String>,
}

/// Orchestrator flags of one variant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExternalBuildStatus {
  pub converted: bool,
  pub delegated: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub label: Option<String>,
}

impl ExternalBuildConfig {
  /// Whether modules in `package` convert by default.
  pub fn package_defaults_to_convert(&self, package: &str) -> bool {
    let key = if package.is_empty() { ROOT_PACKAGE_KEY } else { package };
    match self.packages.get(key) {
      Some(PackageDefault::DefaultTrue | PackageDefault::DefaultTrueRecursively) => return true,
      Some(PackageDefault::DefaultFalse) => return false,
      None => {}
    }

    if self.packages.get(ROOT_PACKAGE_KEY) == Some(&PackageDefault::DefaultTrueRecursively) {
      return true;
    }

    // x, x/y, x/y/z: the first recursive entry wins
    let mut prefix = String::new();
    for part in package.split('/') {
      if !prefix.is_empty() {
        prefix.push('/');
      }
      prefix.push_str(part);
      if self.packages.get(&prefix) == Some(&PackageDefault::DefaultTrueRecursively) {
        return true;
      }
    }
    false
  }

  /// Whether `module` is converted, given its merged properties.
  pub fn converted(&self, module: &Module, variant: &Variant) -> bool {
    let props = &variant.properties;
    if props.get_str("external_build.label").is_some() {
      return true;
    }
    if self.do_not_convert.contains(&module.name) || !module.has_capability(Capability::ExternalBuildable) {
      return false;
    }
    let default = self.package_defaults_to_convert(&module.package);
    props.get_bool("external_build.available").unwrap_or(default)
  }

  /// Compute the orchestrator flags of `variant`.
  pub fn status(&self, module: &Module, variant: &Variant) -> ExternalBuildStatus {
    let converted = self.converted(module, variant);
    let label = match variant.properties.get_str("external_build.label") {
      Some(label) => Some(label.to_string()),
      None if converted => Some(format!("//{}:{}", module.package, module.name)),
      None => None,
    };

    let enabled = variant.properties.get_bool("enabled").unwrap_or(true);
    let windows = variant.variations.get(AXIS_OS) == Some(Os::Windows.as_str());
    let delegated = self.enabled
      && converted
      && enabled
      && !windows
      && !self.mixed_builds_disabled.contains(&module.name);

    ExternalBuildStatus {
      converted,
      delegated,
      label,
    }
  }
}
