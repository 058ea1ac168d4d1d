//! Shared fixtures for the library integration tests.

use modgraph_lib::platform::{Arch, Os, Target};
use modgraph_lib::{BuildError, Config, PackageSet, ResolvedGraph, resolve_packages};

/// Linux x86_64 host, android device with arm64 and arm.
pub fn config() -> Config {
  Config {
    host: Target::new(Os::Linux, Arch::X86_64),
    parallelism: 2,
    ..Config::default()
  }
}

/// A package set from the JSON array of a record file.
pub fn packages(value: serde_json::Value) -> PackageSet {
  serde_json::from_value(serde_json::json!({ "packages": value })).unwrap()
}

pub fn resolve(config: Config, value: serde_json::Value) -> Result<ResolvedGraph, Vec<BuildError>> {
  resolve_packages(config, &packages(value)).map_err(|errors| errors.into_vec())
}
