//! A library in one package used by a binary in another.

use modgraph_lib::BuildError;
use modgraph_lib::graph::DependencyRole;
use serde_json::json;

use super::common::{config, resolve};

fn build(foo_visibility: Option<&str>) -> serde_json::Value {
  let mut foo = json!({ "srcs": ["x.c"] });
  if let Some(rule) = foo_visibility {
    foo["visibility"] = json!([rule]);
  }
  json!([
    { "path": "a/b", "modules": [{ "type": "cc_library", "name": "foo", "properties": foo }] },
    { "path": "c/d", "modules": [{ "type": "cc_binary", "name": "bar", "properties": { "shared_libs": ["foo"] } }] }
  ])
}

#[test]
fn legacy_public_library_is_linked() {
  let resolved = resolve(config(), build(None)).unwrap();

  let bars: Vec<_> = resolved.variants_of("bar").collect();
  assert_eq!(bars.len(), 2, "one binary per device arch");
  for bar in bars {
    assert_eq!(bar.deps.len(), 1);
    let dep = &bar.deps[0];
    assert_eq!(dep.role, DependencyRole::SharedLib);
    assert_eq!((dep.name.as_str(), dep.package.as_str()), ("foo", "a/b"));
    assert_eq!(dep.variations.get("arch"), bar.variations.get("arch"));
    assert_eq!(dep.variations.get("link"), Some("shared"));
    assert!(bar.visibility_checked);
  }

  let foo = resolved.variants_of("foo").next().unwrap();
  assert_eq!(foo.visibility, vec!["//visibility:legacy_public"]);
  assert_eq!(foo.properties.get_list("srcs"), ["x.c"]);
}

#[test]
fn private_library_is_rejected() {
  let errors = resolve(config(), build(Some("//visibility:private"))).unwrap_err();

  assert!(!errors.is_empty());
  for err in &errors {
    match err {
      BuildError::Visibility {
        module,
        package,
        property,
        target,
        target_package,
        ..
      } => {
        assert_eq!((module.as_str(), package.as_str()), ("bar", "c/d"));
        assert_eq!((target.as_str(), target_package.as_str()), ("foo", "a/b"));
        assert_eq!(property, "shared_libs");
        let message = err.to_string();
        assert!(message.contains("c/d") && message.contains("a/b"), "{message}");
      }
      other => panic!("unexpected error: {other}"),
    }
  }
}

#[test]
fn public_library_is_visible_everywhere() {
  let resolved = resolve(config(), build(Some("//visibility:public"))).unwrap();
  assert_eq!(resolved.variants_of("bar").count(), 2);
  assert_eq!(resolved.edge_count(), 2);
}

#[test]
fn private_library_is_usable_in_its_own_package() {
  let resolved = resolve(
    config(),
    json!([{ "path": "a/b", "modules": [
      { "type": "cc_library", "name": "foo", "properties": { "visibility": ["//visibility:private"] } },
      { "type": "cc_binary", "name": "bar", "properties": { "shared_libs": ["foo"] } }
    ] }]),
  )
  .unwrap();
  assert_eq!(resolved.edge_count(), 2);
}

#[test]
fn package_default_visibility_applies_to_its_modules() {
  let errors = resolve(
    config(),
    json!([
      { "path": "a/b", "default_visibility": ["//visibility:private"],
        "modules": [{ "type": "cc_library", "name": "foo" }] },
      { "path": "c/d", "modules": [{ "type": "cc_binary", "name": "bar", "properties": { "shared_libs": ["foo"] } }] }
    ]),
  )
  .unwrap_err();
  assert!(errors.iter().all(|err| matches!(err, BuildError::Visibility { .. })));
}

#[test]
fn unknown_dependency_is_a_reference_error() {
  let errors = resolve(
    config(),
    json!([{ "path": "c/d", "modules": [
      { "type": "cc_binary", "name": "bar", "properties": { "shared_libs": ["nowhere"] } }
    ] }]),
  )
  .unwrap_err();
  assert!(matches!(
    &errors[..],
    [BuildError::Reference { module, property, .. }] if module == "bar" && property == "shared_libs"
  ));
}
