//! Edges after both ends of a dependency split.

use modgraph_lib::graph::DependencyRole;
use modgraph_lib::platform::Arch;
use serde_json::json;

use super::common::{config, resolve};

#[test]
fn split_dependents_only_link_matching_variants() {
  let mut config = config();
  config.device.archs = vec![Arch::Arm64, Arch::X86_64];
  let resolved = resolve(
    config,
    json!([{ "path": "p", "modules": [
      { "type": "cc_library", "name": "parent", "properties": { "static_libs": ["child"] } },
      { "type": "cc_library", "name": "child" }
    ] }]),
  )
  .unwrap();

  let parents: Vec<_> = resolved.variants_of("parent").collect();
  assert_eq!(parents.len(), 4);
  for parent in parents {
    assert_eq!(parent.deps.len(), 1, "{}", parent.variations);
    let dep = &parent.deps[0];
    assert_eq!(dep.role, DependencyRole::StaticLib);
    assert_eq!(dep.name, "child");
    assert_eq!(dep.variations.get("arch"), parent.variations.get("arch"));
    assert_eq!(dep.variations.get("os"), parent.variations.get("os"));
    assert_eq!(dep.variations.get("link"), Some("static"));
  }
}

#[test]
fn host_and_device_variants_stay_apart() {
  let resolved = resolve(
    config(),
    json!([{ "path": "p", "modules": [
      { "type": "cc_binary", "name": "tool",
        "properties": { "host_supported": true, "shared_libs": ["libbase"] } },
      { "type": "cc_library", "name": "libbase", "properties": { "host_supported": true } }
    ] }]),
  )
  .unwrap();

  let tools: Vec<_> = resolved.variants_of("tool").collect();
  assert_eq!(tools.len(), 3, "two device archs and the host");
  for tool in tools {
    assert_eq!(tool.deps.len(), 1);
    assert_eq!(tool.deps[0].variations.get("os"), tool.variations.get("os"));
    assert_eq!(tool.deps[0].variations.get("arch"), tool.variations.get("arch"));
  }
}

#[test]
fn genrule_tools_run_on_the_host() {
  let resolved = resolve(
    config(),
    json!([{ "path": "p", "modules": [
      { "type": "genrule", "name": "gen", "properties": { "tools": ["protoc"], "cmd": "$(location protoc)" } },
      { "type": "cc_binary", "name": "protoc", "properties": { "host_supported": true } }
    ] }]),
  )
  .unwrap();

  for r#gen in resolved.variants_of("gen") {
    assert_eq!(r#gen.variations.get("os"), Some("android"));
    assert_eq!(r#gen.deps.len(), 1);
    let tool = &r#gen.deps[0];
    assert_eq!(tool.role, DependencyRole::Tool);
    assert_eq!(tool.variations.get("os"), Some("linux"));
    assert_eq!(tool.variations.get("arch"), Some("x86_64"));
  }
}

#[test]
fn device_only_library_cannot_serve_a_host_binary() {
  let errors = resolve(
    config(),
    json!([{ "path": "p", "modules": [
      { "type": "cc_binary", "name": "tool",
        "properties": { "host_supported": true, "device_supported": false, "shared_libs": ["libdevice"] } },
      { "type": "cc_library", "name": "libdevice" }
    ] }]),
  )
  .unwrap_err();

  assert!(!errors.is_empty());
  for err in &errors {
    assert!(
      matches!(err, modgraph_lib::BuildError::MissingVariant { module, target, .. }
        if module == "tool" && target == "libdevice"),
      "unexpected error: {err}"
    );
  }
}
