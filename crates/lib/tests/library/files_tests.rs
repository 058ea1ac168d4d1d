//! Loading configuration and records from disk.

use modgraph_lib::config::ConfigError;
use modgraph_lib::input::InputError;
use modgraph_lib::{Config, PackageSet, resolve_packages};
use tempfile::TempDir;

#[test]
fn config_and_records_load_from_files() {
  let dir = TempDir::new().unwrap();
  let config_path = dir.path().join("modgraph.toml");
  std::fs::write(
    &config_path,
    r#"
parallelism = 3

[host]
os = "linux"
arch = "x86_64"

[device]
archs = ["x86_64"]

[soong_config.variables.feature]
kind = "bool"

[soong_config.values]
feature = "true"
"#,
  )
  .unwrap();

  let records_path = dir.path().join("modules.json");
  std::fs::write(
    &records_path,
    r#"{ "packages": [{ "path": "p", "modules": [{
      "type": "cc_library",
      "name": "libfeature",
      "properties": { "soong_config_variables": { "feature": { "cflags": ["-DFEATURE"] } } }
    }] }] }"#,
  )
  .unwrap();

  let config = Config::from_file(&config_path).unwrap();
  assert_eq!(config.parallelism, 3);
  let set = PackageSet::from_file(&records_path).unwrap();
  assert_eq!(set.module_count(), 1);

  let resolved = resolve_packages(config, &set).unwrap();
  let variants: Vec<_> = resolved.variants_of("libfeature").collect();
  assert_eq!(variants.len(), 2, "static and shared on the one device arch");
  for variant in variants {
    assert_eq!(variant.variations.get("arch"), Some("x86_64"));
    assert_eq!(variant.properties.get_list("cflags"), ["-DFEATURE"]);
  }
}

#[test]
fn missing_files_are_reported() {
  let dir = TempDir::new().unwrap();
  let missing = dir.path().join("absent.toml");
  assert!(matches!(Config::from_file(&missing), Err(ConfigError::Io { .. })));
  assert!(matches!(
    PackageSet::from_file(&dir.path().join("absent.json")),
    Err(InputError::Io { .. })
  ));
}

#[test]
fn invalid_config_is_rejected() {
  let dir = TempDir::new().unwrap();
  let path = dir.path().join("modgraph.toml");
  std::fs::write(&path, "[device]\narchs = []\n").unwrap();
  assert!(matches!(Config::from_file(&path), Err(ConfigError::Invalid(_))));
}
