//! Defaults propagation.
//!
//! Runs once, before every other mutator, while each module still has a
//! single variant. It resolves every `defaults` list, checks the targets are
//! defaults modules visible to the user under their `defaults_visibility`,
//! rejects cycles among defaults, and only then merges properties.
//!
//! A module's effective properties are its defaults' flattened properties in
//! listed order followed by its own: later defaults win on scalars, lists
//! concatenate defaults first, and the module's own settings come last.
//! Fields the user's schema lacks, and the visibility fields, never merge.

use std::collections::BTreeMap;

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::{debug, info};

use crate::consts::NON_MERGED_PROPERTIES;
use crate::error::{BuildError, ErrorList};
use crate::graph::{ModuleGraph, ModuleId, find_cycles};
use crate::module_types::{Capability, ModuleTypeRegistry};
use crate::namespace::NamespaceRegistry;
use crate::property::{Properties, PropertyError, append_matching, append_properties};

const DEFAULTS_PROPERTY: &str = "defaults";

/// Merge every module's defaults into its properties.
pub fn propagate_defaults(
  graph: &mut ModuleGraph,
  namespaces: &NamespaceRegistry,
  module_types: &ModuleTypeRegistry,
) -> Result<(), ErrorList> {
  let mut errors = ErrorList::new();
  let references = resolve_references(graph, namespaces, &mut errors);

  for path in defaults_cycles(graph, &references) {
    errors.push(BuildError::DefaultsCycle {
      path: path.into_iter().map(|id| graph.module(id).name.clone()).collect(),
    });
  }
  if !errors.is_empty() {
    return Err(errors);
  }

  info!(
    users = references.values().filter(|refs| !refs.is_empty()).count(),
    "propagating defaults"
  );

  let mut flattened: BTreeMap<ModuleId, Properties> = BTreeMap::new();
  let users: Vec<ModuleId> = references
    .iter()
    .filter(|(_, refs)| !refs.is_empty())
    .map(|(id, _)| *id)
    .collect();
  for id in users {
    match flatten(graph, module_types, &references, &mut flattened, id) {
      Ok(props) => {
        let variant = graph.module(id).variants()[0];
        graph.variant_mut(variant).properties = props;
      }
      Err(source) => {
        let module = graph.module(id);
        errors.push(BuildError::Property {
          module: module.name.clone(),
          package: module.package.clone(),
          source,
        });
      }
    }
  }

  errors.into_result(())
}

/// Resolve every `defaults` entry, keeping only valid targets.
fn resolve_references(
  graph: &ModuleGraph,
  namespaces: &NamespaceRegistry,
  errors: &mut ErrorList,
) -> BTreeMap<ModuleId, Vec<ModuleId>> {
  let mut references = BTreeMap::new();
  for module in graph.modules() {
    let variant = graph.variant(module.variants()[0]);
    let mut targets = Vec::new();
    for reference in variant.properties.get_list(DEFAULTS_PROPERTY) {
      let target = match namespaces.resolve(&module.package, reference) {
        Ok(target) => graph.module(target),
        Err(source) => {
          errors.push(BuildError::Reference {
            module: module.name.clone(),
            package: module.package.clone(),
            property: DEFAULTS_PROPERTY.to_string(),
            source,
          });
          continue;
        }
      };

      if !target.has_capability(Capability::Defaults) {
        errors.push(BuildError::NotDefaults {
          module: module.name.clone(),
          package: module.package.clone(),
          target: target.name.clone(),
        });
        continue;
      }

      if let Err(rules) = namespaces.check_defaults_visibility(&module.package, target) {
        errors.push(BuildError::Visibility {
          module: module.name.clone(),
          package: module.package.clone(),
          property: DEFAULTS_PROPERTY.to_string(),
          target: target.name.clone(),
          target_package: target.package.clone(),
          rules,
        });
        continue;
      }

      targets.push(target.id);
    }
    references.insert(module.id, targets);
  }
  references
}

/// Cycles in the defaults graph, as module paths.
fn defaults_cycles(graph: &ModuleGraph, references: &BTreeMap<ModuleId, Vec<ModuleId>>) -> Vec<Vec<ModuleId>> {
  let mut dag: DiGraph<ModuleId, ()> = DiGraph::new();
  let nodes: BTreeMap<ModuleId, NodeIndex> = graph.modules().map(|m| (m.id, dag.add_node(m.id))).collect();
  for (user, targets) in references {
    for target in targets {
      dag.add_edge(nodes[user], nodes[target], ());
    }
  }

  find_cycles(&dag, Direction::Outgoing)
    .into_iter()
    .map(|cycle| cycle.into_iter().map(|idx| dag[idx]).collect())
    .collect()
}

/// Properties of `id` with its defaults applied, memoized in `flattened`.
fn flatten(
  graph: &ModuleGraph,
  module_types: &ModuleTypeRegistry,
  references: &BTreeMap<ModuleId, Vec<ModuleId>>,
  flattened: &mut BTreeMap<ModuleId, Properties>,
  id: ModuleId,
) -> Result<Properties, PropertyError> {
  if let Some(props) = flattened.get(&id) {
    return Ok(props.clone());
  }

  let module = graph.module(id);
  let own = &graph.variant(module.variants()[0]).properties;
  let targets = references.get(&id).map(Vec::as_slice).unwrap_or_default();
  if targets.is_empty() {
    return Ok(own.clone());
  }

  let mut merged = Properties::new();
  match module_types.get(&module.module_type) {
    Some(module_type) => {
      for target in targets {
        let inherited = flatten(graph, module_types, references, flattened, *target)?;
        append_matching(&mut merged, &inherited, &module_type.schema, NON_MERGED_PROPERTIES)?;
      }
    }
    None => {
      for target in targets {
        let inherited = flatten(graph, module_types, references, flattened, *target)?;
        append_properties(&mut merged, &without_non_merged(inherited))?;
      }
    }
  }
  append_properties(&mut merged, own)?;

  debug!(
    module = %module.name,
    defaults = ?targets.iter().map(|t| graph.module(*t).name.as_str()).collect::<Vec<_>>(),
    "merged defaults"
  );
  flattened.insert(id, merged.clone());
  Ok(merged)
}

fn without_non_merged(mut props: Properties) -> Properties {
  for name in NON_MERGED_PROPERTIES {
    props.remove(name);
  }
  props
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::graph::Module;
  use crate::namespace::parse_rules;

  struct Fixture {
    graph: ModuleGraph,
    namespaces: NamespaceRegistry,
    types: ModuleTypeRegistry,
  }

  impl Fixture {
    fn new() -> Self {
      Self {
        graph: ModuleGraph::new(),
        namespaces: NamespaceRegistry::default(),
        types: ModuleTypeRegistry::with_builtins(),
      }
    }

    fn add(&mut self, package: &str, name: &str, module_type: &str, props: Properties) -> ModuleId {
      let mut module = Module::new(name, module_type, package);
      if let Some(ty) = self.types.get(module_type) {
        module.capabilities = ty.capabilities.clone();
      }
      let labels: Vec<String> = props.get_list("defaults_visibility").to_vec();
      if !labels.is_empty() {
        module.defaults_visibility = Some(parse_rules(package, &labels).unwrap());
      }
      let id = self.graph.add_module(module, props);
      self.namespaces.register_module(package, name, id).unwrap();
      id
    }

    fn props(&self, id: ModuleId) -> &Properties {
      &self.graph.variant(self.graph.module(id).variants()[0]).properties
    }

    fn run(&mut self) -> Result<(), ErrorList> {
      propagate_defaults(&mut self.graph, &self.namespaces, &self.types)
    }
  }

  fn props(pairs: &[(&str, crate::property::Value)]) -> Properties {
    pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
  }

  fn list(items: &[&str]) -> crate::property::Value {
    crate::property::Value::List(items.iter().map(|s| s.to_string()).collect())
  }

  mod merge {
    use super::*;

    #[test]
    fn later_defaults_win_on_scalars_and_lists_concatenate() {
      let mut f = Fixture::new();
      f.add(
        "a",
        "d1",
        "cc_defaults",
        props(&[("stl", "libc++".into()), ("cflags", list(&["-d1"]))]),
      );
      f.add(
        "a",
        "d2",
        "cc_defaults",
        props(&[("stl", "none".into()), ("cflags", list(&["-d2"]))]),
      );
      let user = f.add(
        "a",
        "lib",
        "cc_library",
        props(&[("defaults", list(&["d1", "d2"])), ("cflags", list(&["-own"]))]),
      );

      f.run().unwrap();
      assert_eq!(f.props(user).get_str("stl"), Some("none"));
      assert_eq!(f.props(user).get_list("cflags"), ["-d1", "-d2", "-own"]);
    }

    #[test]
    fn own_scalars_beat_defaults() {
      let mut f = Fixture::new();
      f.add("a", "d", "cc_defaults", props(&[("stl", "none".into())]));
      let user = f.add(
        "a",
        "lib",
        "cc_library",
        props(&[("defaults", list(&["d"])), ("stl", "libc++".into())]),
      );
      f.run().unwrap();
      assert_eq!(f.props(user).get_str("stl"), Some("libc++"));
    }

    #[test]
    fn transitive_defaults_apply_first() {
      let mut f = Fixture::new();
      f.add("a", "base", "cc_defaults", props(&[("cflags", list(&["-base"]))]));
      f.add(
        "a",
        "mid",
        "cc_defaults",
        props(&[("defaults", list(&["base"])), ("cflags", list(&["-mid"]))]),
      );
      let user = f.add("a", "lib", "cc_library", props(&[("defaults", list(&["mid"]))]));

      f.run().unwrap();
      assert_eq!(f.props(user).get_list("cflags"), ["-base", "-mid"]);
    }

    #[test]
    fn fields_outside_the_user_schema_and_visibility_are_skipped() {
      let mut f = Fixture::new();
      f.add(
        "a",
        "d",
        "cc_defaults",
        props(&[
          ("stem", "tool".into()),
          ("srcs", list(&["d.c"])),
          ("visibility", list(&["//visibility:private"])),
        ]),
      );
      let user = f.add("a", "lib", "cc_library", props(&[("defaults", list(&["d"]))]));

      f.run().unwrap();
      assert!(!f.props(user).contains("stem"));
      assert!(!f.props(user).contains("visibility"));
      assert_eq!(f.props(user).get_list("srcs"), ["d.c"]);
    }
  }

  mod checks {
    use super::*;

    #[test]
    fn cycle_is_reported_before_merging() {
      let mut f = Fixture::new();
      let d1 = f.add(
        "a",
        "d1",
        "cc_defaults",
        props(&[("defaults", list(&["d2"])), ("cflags", list(&["-d1"]))]),
      );
      f.add(
        "a",
        "d2",
        "cc_defaults",
        props(&[("defaults", list(&["d1"])), ("cflags", list(&["-d2"]))]),
      );

      let errors = f.run().unwrap_err();
      assert_eq!(
        errors.into_vec(),
        vec![BuildError::DefaultsCycle {
          path: vec!["d1".to_string(), "d2".to_string(), "d1".to_string()]
        }]
      );
      assert_eq!(f.props(d1).get_list("cflags"), ["-d1"]);
    }

    #[test]
    fn non_defaults_target_is_rejected() {
      let mut f = Fixture::new();
      f.add("a", "other", "cc_library", Properties::new());
      f.add("a", "lib", "cc_library", props(&[("defaults", list(&["other"]))]));

      let errors = f.run().unwrap_err();
      assert!(matches!(
        errors.iter().next(),
        Some(BuildError::NotDefaults { target, .. }) if target == "other"
      ));
    }

    #[test]
    fn unknown_defaults_is_a_reference_error() {
      let mut f = Fixture::new();
      f.add("a", "lib", "cc_library", props(&[("defaults", list(&["missing"]))]));
      let errors = f.run().unwrap_err();
      assert!(matches!(errors.iter().next(), Some(BuildError::Reference { .. })));
    }

    #[test]
    fn defaults_visibility_governs_use() {
      let mut f = Fixture::new();
      f.add(
        "a",
        "d",
        "cc_defaults",
        props(&[
          ("defaults_visibility", list(&["//visibility:private"])),
          ("visibility", list(&["//visibility:public"])),
        ]),
      );
      f.add("a", "same_package", "cc_library", props(&[("defaults", list(&["d"]))]));
      f.add("b", "other_package", "cc_library", props(&[("defaults", list(&["d"]))]));

      let errors = f.run().unwrap_err().into_vec();
      assert_eq!(errors.len(), 1);
      assert!(matches!(
        &errors[0],
        BuildError::Visibility { module, target_package, .. } if module == "other_package" && target_package == "a"
      ));
    }
  }
}
