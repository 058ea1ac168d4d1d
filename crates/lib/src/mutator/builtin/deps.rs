//! Dependency lists to edges.

use crate::consts::{AXIS_ARCH, AXIS_LINK, AXIS_OS, CONDITIONS_DEFAULT};
use crate::graph::{DependencyRole, DependencyTag};
use crate::module_types::Capability;
use crate::mutator::{Direction, Mutator, MutatorContext};
use crate::platform::Target;
use crate::property::Condition;

/// Requests one edge per reference in every dependency-list property,
/// including those inside conditional branches.
pub struct DepsMutator;

/// The tag an edge of `role` carries.
///
/// Tools run on the build machine, so they ignore the dependent's own
/// variations and require the host variant. Libraries require the link mode
/// their role names.
pub fn tag_for(role: DependencyRole, host: Target) -> DependencyTag {
  let tag = DependencyTag::new(role);
  match role {
    DependencyRole::Tool => tag
      .far()
      .require(AXIS_OS, host.os.as_str())
      .require(AXIS_ARCH, host.arch.as_str()),
    DependencyRole::SharedLib => tag.require(AXIS_LINK, "shared"),
    DependencyRole::StaticLib => tag.require(AXIS_LINK, "static"),
    DependencyRole::Data | DependencyRole::Dep => tag,
  }
}

impl Mutator for DepsMutator {
  fn name(&self) -> &str {
    "deps"
  }

  fn direction(&self) -> Direction {
    Direction::BottomUp
  }

  fn mutate(&self, ctx: &mut MutatorContext<'_>) {
    if ctx.has_capability(Capability::Defaults) {
      return;
    }
    let Some(module_type) = ctx.module_type() else {
      return;
    };
    let schema = &module_type.schema;
    let host = ctx.config().host;

    let mut requests: Vec<(DependencyTag, String, String)> = Vec::new();
    let mut misplaced: Vec<String> = Vec::new();
    let props = ctx.properties();

    for (field, role) in schema.dependency_fields() {
      for reference in props.get_list(field) {
        requests.push((tag_for(*role, host), reference.clone(), field.to_string()));
      }
    }

    for (name, condition) in schema.conditional_fields() {
      let Some(branches) = props.get_map(name) else {
        continue;
      };
      for (key, branch) in branches.iter() {
        let Some(branch) = branch.as_map() else {
          continue;
        };
        for (field, role) in schema.dependency_fields() {
          let references = branch.get_list(field);
          if references.is_empty() {
            continue;
          }
          let property = format!("{}.{}.{}", name, key, field);
          if key == CONDITIONS_DEFAULT {
            misplaced.push(property);
            continue;
          }

          let value = if condition == Condition::Target && key == "host" {
            host.os.as_str()
          } else {
            key.as_str()
          };
          for reference in references {
            let tag = tag_for(*role, host).only_from(condition.axis(), value);
            requests.push((tag, reference.clone(), property.clone()));
          }
        }
      }
    }

    for property in misplaced {
      ctx.property_error(&property, "dependencies may not be listed under conditions_default");
    }
    for (tag, reference, property) in requests {
      ctx.add_dependency(tag, &reference, &property);
    }
  }
}
