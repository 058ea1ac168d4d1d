//! Name resolution across namespaces.

use modgraph_lib::BuildError;
use modgraph_lib::namespace::{ImportPrecedence, ResolveError};
use serde_json::json;

use super::common::{config, resolve};

fn vendor_build() -> serde_json::Value {
  json!([
    { "path": "vendor/x", "namespace": {}, "modules": [{ "type": "filegroup", "name": "conf", "properties": { "srcs": ["x.conf"] } }] },
    { "path": "vendor/y", "namespace": {}, "modules": [{ "type": "filegroup", "name": "conf", "properties": { "srcs": ["y.conf"] } }] },
    { "path": "vendor/z", "namespace": { "imports": ["vendor/x"] }, "modules": [
      { "type": "genrule", "name": "gen", "properties": { "srcs": [], "cmd": "cat", "tools": ["cat"] } }
    ] },
    { "path": "tools", "modules": [{ "type": "cc_binary", "name": "cat", "properties": { "host_supported": true } }] }
  ])
}

#[test]
fn same_name_in_separate_namespaces_resolves() {
  let resolved = resolve(config(), vendor_build()).unwrap();
  let confs: Vec<_> = resolved.variants_of("conf").map(|v| v.package.as_str()).collect();
  assert_eq!(confs, vec!["vendor/x", "vendor/y"]);
}

#[test]
fn global_modules_are_visible_from_namespaces() {
  let resolved = resolve(config(), vendor_build()).unwrap();
  for r#gen in resolved.variants_of("gen") {
    assert_eq!(r#gen.deps.len(), 1);
    assert_eq!((r#gen.deps[0].name.as_str(), r#gen.deps[0].package.as_str()), ("cat", "tools"));
  }
}

fn import_or_global(precedence: ImportPrecedence) -> Result<modgraph_lib::ResolvedGraph, Vec<BuildError>> {
  let mut config = config();
  config.import_precedence = precedence;
  resolve(
    config,
    json!([
      { "path": "vendor/x", "namespace": {}, "modules": [{ "type": "cc_library", "name": "libfoo" }] },
      { "path": "legacy", "modules": [{ "type": "cc_library", "name": "libfoo" }] },
      { "path": "vendor/z", "namespace": { "imports": ["vendor/x"] }, "modules": [
        { "type": "cc_binary", "name": "app", "properties": { "shared_libs": ["libfoo"] } }
      ] }
    ]),
  )
}

#[test]
fn imports_shadow_the_global_namespace_by_default() {
  let resolved = import_or_global(ImportPrecedence::PreferImports).unwrap();
  for app in resolved.variants_of("app") {
    assert_eq!(app.deps[0].package, "vendor/x");
  }
}

#[test]
fn strict_precedence_reports_the_ambiguity() {
  let errors = import_or_global(ImportPrecedence::Strict).unwrap_err();
  match &errors[..] {
    [BuildError::Reference { module, source: ResolveError::AmbiguousModule { name, .. }, .. }] => {
      assert_eq!(module, "app");
      assert_eq!(name, "libfoo");
    }
    other => panic!("unexpected errors: {other:?}"),
  }
}

#[test]
fn qualified_reference_reaches_any_namespace() {
  let resolved = resolve(
    config(),
    json!([
      { "path": "vendor/x", "namespace": {}, "modules": [{ "type": "cc_library", "name": "libfoo" }] },
      { "path": "app", "modules": [
        { "type": "cc_binary", "name": "app", "properties": { "shared_libs": ["//vendor/x:libfoo"] } }
      ] }
    ]),
  )
  .unwrap();
  for app in resolved.variants_of("app") {
    assert_eq!(app.deps[0].package, "vendor/x");
  }
}

#[test]
fn unimported_namespace_is_not_searched() {
  let errors = resolve(
    config(),
    json!([
      { "path": "vendor/x", "namespace": {}, "modules": [{ "type": "cc_library", "name": "libfoo" }] },
      { "path": "app", "modules": [
        { "type": "cc_binary", "name": "app", "properties": { "shared_libs": ["libfoo"] } }
      ] }
    ]),
  )
  .unwrap_err();
  assert!(matches!(
    &errors[..],
    [BuildError::Reference { source: ResolveError::UnknownModule { .. }, .. }]
  ));
}
