//! Built-in stages.
//!
//! In order: `soong_config` folds configuration-variable branches,
//! `deps` turns dependency lists into edges, `os`, `arch` and `link` split
//! variants along their axes and select the matching conditional branches,
//! and `dependency_check` validates the final edges.

mod arch;
mod check;
mod deps;
mod link;
mod os;
mod soong_config;

pub use arch::ArchMutator;
pub use check::DependencyCheckMutator;
pub use deps::{DepsMutator, tag_for};
pub use link::LinkMutator;
pub use os::OsMutator;
pub use soong_config::SoongConfigMutator;

use super::{MutatorContext, MutatorRegistry};
use crate::property::select;

pub fn register_builtin_mutators(registry: &mut MutatorRegistry) {
  registry.register(SoongConfigMutator);
  registry.register(DepsMutator);
  registry.register(OsMutator);
  registry.register(ArchMutator);
  registry.register(LinkMutator);
  registry.register(DependencyCheckMutator);
}

/// Split on `axis`, then fold the conditional `field` of each new variant
/// with that variant's selector keys.
fn split_and_select(ctx: &mut MutatorContext<'_>, axis: &str, field: &str, variations: &[(&str, Vec<&str>)]) {
  let values: Vec<&str> = variations.iter().map(|(value, _)| *value).collect();
  ctx.create_variations(axis, &values);

  for (value, keys) in variations {
    let selected = match ctx.variation_properties_mut(value) {
      Some(props) => select(props, field, keys),
      None => Ok(false),
    };
    if let Err(err) = selected {
      ctx.report(err);
    }
  }
}

#[cfg(test)]
pub(crate) mod testing {
  use crate::config::Config;
  use crate::context::Context;
  use crate::error::ErrorList;
  use crate::graph::Variant;
  use crate::input::PackageSet;
  use crate::platform::{Arch, Os, Target};

  /// Linux x86_64 host, android device with arm64 and arm.
  pub fn config() -> Config {
    Config {
      host: Target::new(Os::Linux, Arch::X86_64),
      parallelism: 2,
      ..Config::default()
    }
  }

  /// Load `packages` (the JSON array of a record file) and run every stage.
  pub fn run(config: Config, packages: serde_json::Value) -> (Context, Result<(), ErrorList>) {
    let set: PackageSet = serde_json::from_value(serde_json::json!({ "packages": packages })).unwrap();
    let mut ctx = Context::new(config);
    ctx.add_packages(&set).unwrap();
    let result = ctx.run();
    (ctx, result)
  }

  /// Current variants of the module named `name`, described.
  pub fn variant_names(ctx: &Context, name: &str) -> Vec<String> {
    variants(ctx, name)
      .into_iter()
      .map(|v| ctx.graph().describe(v.id))
      .collect()
  }

  pub fn variants<'a>(ctx: &'a Context, name: &str) -> Vec<&'a Variant> {
    let graph = ctx.graph();
    graph
      .modules()
      .filter(|m| m.name == name)
      .flat_map(|m| m.variants().iter().map(|id| graph.variant(*id)))
      .collect()
  }

  /// `(from, to)` pairs of every edge, described.
  pub fn edges(ctx: &Context) -> Vec<(String, String)> {
    let graph = ctx.graph();
    graph
      .live_variants()
      .flat_map(|v| {
        v.deps
          .iter()
          .flat_map(|dep| dep.targets.iter())
          .map(|t| (graph.describe(v.id), graph.describe(*t)))
          .collect::<Vec<_>>()
      })
      .collect()
  }
}
