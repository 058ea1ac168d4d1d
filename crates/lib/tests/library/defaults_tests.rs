//! Defaults propagation through the whole pipeline.

use modgraph_lib::BuildError;
use serde_json::json;

use super::common::{config, resolve};

#[test]
fn defaults_are_merged_before_splitting() {
  let resolved = resolve(
    config(),
    json!([{ "path": "p", "modules": [
      { "type": "cc_defaults", "name": "base", "properties": {
        "cflags": ["-Wall"],
        "arch": { "arm": { "cflags": ["-mthumb"] } }
      } },
      { "type": "cc_defaults", "name": "strict", "properties": { "cflags": ["-Werror"], "stl": "none" } },
      { "type": "cc_binary", "name": "bin", "properties": {
        "defaults": ["base", "strict"],
        "cflags": ["-O2"],
        "stl": "libc++"
      } }
    ] }]),
  )
  .unwrap();

  let flags: Vec<Vec<String>> = resolved
    .variants_of("bin")
    .map(|v| v.properties.get_list("cflags").to_vec())
    .collect();
  assert_eq!(
    flags,
    vec![
      vec!["-Wall", "-Werror", "-O2"],
      vec!["-Wall", "-Werror", "-O2", "-mthumb"],
    ]
  );
  for bin in resolved.variants_of("bin") {
    assert_eq!(bin.properties.get_str("stl"), Some("libc++"));
  }
  assert_eq!(resolved.variants_of("base").count(), 0, "defaults modules are not built");
}

#[test]
fn defaults_cycle_names_both_modules() {
  let errors = resolve(
    config(),
    json!([{ "path": "p", "modules": [
      { "type": "cc_defaults", "name": "d1", "properties": { "defaults": ["d2"] } },
      { "type": "cc_defaults", "name": "d2", "properties": { "defaults": ["d1"] } },
      { "type": "cc_binary", "name": "bin", "properties": { "defaults": ["d1"] } }
    ] }]),
  )
  .unwrap_err();

  assert_eq!(
    errors,
    vec![BuildError::DefaultsCycle {
      path: vec!["d1".to_string(), "d2".to_string(), "d1".to_string()],
    }]
  );
}

#[test]
fn non_defaults_module_in_defaults_is_rejected() {
  let errors = resolve(
    config(),
    json!([{ "path": "p", "modules": [
      { "type": "cc_library", "name": "lib" },
      { "type": "cc_binary", "name": "bin", "properties": { "defaults": ["lib"] } }
    ] }]),
  )
  .unwrap_err();

  assert!(matches!(
    &errors[..],
    [BuildError::NotDefaults { module, target, .. }] if module == "bin" && target == "lib"
  ));
}

#[test]
fn depending_on_a_defaults_module_is_rejected() {
  let errors = resolve(
    config(),
    json!([{ "path": "p", "modules": [
      { "type": "cc_defaults", "name": "base" },
      { "type": "cc_binary", "name": "bin", "properties": { "shared_libs": ["base"] } }
    ] }]),
  )
  .unwrap_err();

  assert!(matches!(
    &errors[..],
    [BuildError::DependsOnDefaults { target, property, .. }] if target == "base" && property == "shared_libs"
  ));
}
