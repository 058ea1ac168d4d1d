//! Final edge validation.

use crate::graph::DependencyRole;
use crate::module_types::Capability;
use crate::mutator::{Direction, Mutator, MutatorContext};

/// Rejects tools that are not host tool providers and edges to disabled
/// variants. Disabled variants themselves are not checked.
pub struct DependencyCheckMutator;

impl Mutator for DependencyCheckMutator {
  fn name(&self) -> &str {
    "dependency_check"
  }

  fn direction(&self) -> Direction {
    Direction::BottomUp
  }

  fn mutate(&self, ctx: &mut MutatorContext<'_>) {
    if ctx.properties().get_bool("enabled") == Some(false) {
      return;
    }
    let graph = ctx.graph();

    let mut problems = Vec::new();
    for dep in ctx.direct_deps() {
      let target = graph.module(dep.module);
      if dep.tag.role == DependencyRole::Tool && !target.has_capability(Capability::HostToolProvider) {
        problems.push((dep.property.clone(), format!("\"{}\" is not a host tool provider", target.name)));
        continue;
      }
      let disabled = dep
        .targets
        .iter()
        .any(|t| graph.variant(*t).properties.get_bool("enabled") == Some(false));
      if disabled {
        problems.push((dep.property.clone(), format!("depends on disabled module \"{}\"", target.name)));
      }
    }

    for (property, message) in problems {
      ctx.property_error(&property, message);
    }
  }
}
