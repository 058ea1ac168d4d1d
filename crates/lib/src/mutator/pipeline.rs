//! Stage execution.
//!
//! A run is defaults propagation followed by every registered stage. Each
//! stage computes its waves, visits every variant of a wave in parallel on a
//! rayon pool, then applies the recorded outputs one variant at a time in
//! wave order. Errors are collected for the whole stage; a stage that
//! produced any stops the run before the next one starts.

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, error, info, warn};

use super::context::{DependencyRequest, Environment, MutatorContext, MutatorOutput};
use super::{Direction, Mutator, MutatorRegistry};
use crate::defaults::propagate_defaults;
use crate::error::{BuildError, ErrorList};
use crate::graph::{Cycle, ModuleGraph, VariantId};
use crate::module_types::Capability;

/// Runs the registered stages over a graph.
pub struct Pipeline<'a> {
  mutators: &'a MutatorRegistry,
  env: Environment<'a>,
}

impl<'a> Pipeline<'a> {
  pub fn new(mutators: &'a MutatorRegistry, env: Environment<'a>) -> Self {
    Self { mutators, env }
  }

  /// Propagate defaults, then run every stage in order.
  ///
  /// Returns the errors of the first failing step; the graph is left as that
  /// step finished it.
  pub fn run(&self, graph: &mut ModuleGraph) -> Result<(), ErrorList> {
    let pool = thread_pool(self.env.config.parallelism);

    info!(modules = graph.module_count(), "running defaults");
    propagate_defaults(graph, self.env.namespaces, self.env.module_types).inspect_err(|errors| {
      error!(stage = "defaults", errors = errors.len(), "stage failed");
    })?;

    for mutator in self.mutators.iter() {
      let errors = self.run_stage(mutator, graph, pool.as_ref());
      if !errors.is_empty() {
        error!(stage = mutator.name(), errors = errors.len(), "stage failed");
        return Err(errors);
      }
    }

    if let Some(cycle) = graph.find_cycle() {
      return Err(cycle_error(graph, &cycle).into());
    }
    info!(variants = graph.live_variant_count(), "pipeline finished");
    Ok(())
  }

  fn run_stage(&self, mutator: &dyn Mutator, graph: &mut ModuleGraph, pool: Option<&ThreadPool>) -> ErrorList {
    let mut waves = match graph.bottom_up_waves() {
      Ok(waves) => waves,
      Err(cycle) => return cycle_error(graph, &cycle).into(),
    };
    if mutator.direction() == Direction::TopDown {
      waves.reverse();
    }

    info!(
      stage = mutator.name(),
      direction = %mutator.direction(),
      waves = waves.len(),
      variants = graph.live_variant_count(),
      "running stage"
    );

    let mut errors = ErrorList::new();
    for (index, wave) in waves.iter().enumerate() {
      debug!(stage = mutator.name(), wave = index, variants = wave.len(), "visiting wave");
      let outputs = visit_wave(mutator, graph, self.env, wave, pool);
      for (variant, output) in wave.iter().zip(outputs) {
        apply(graph, self.env, *variant, output, &mut errors);
      }
    }

    for (variant, dep) in graph.missing_variants() {
      let module = graph.module_of(variant);
      errors.push(BuildError::MissingVariant {
        module: module.name.clone(),
        package: module.package.clone(),
        variations: graph.variant(variant).variations.to_string(),
        property: dep.property.clone(),
        target: graph.module(dep.module).name.clone(),
      });
    }
    errors
  }
}

fn thread_pool(parallelism: usize) -> Option<ThreadPool> {
  match ThreadPoolBuilder::new()
    .num_threads(parallelism.max(1))
    .thread_name(|i| format!("modgraph-{}", i))
    .build()
  {
    Ok(pool) => Some(pool),
    Err(err) => {
      warn!(error = %err, "failed to build worker pool, using the global pool");
      None
    }
  }
}

fn visit_wave(
  mutator: &dyn Mutator,
  graph: &ModuleGraph,
  env: Environment<'_>,
  wave: &[VariantId],
  pool: Option<&ThreadPool>,
) -> Vec<MutatorOutput> {
  let visit = || -> Vec<MutatorOutput> {
    wave
      .par_iter()
      .map(|variant| {
        let mut ctx = MutatorContext::new(mutator.name(), graph, env, *variant);
        mutator.mutate(&mut ctx);
        ctx.finish()
      })
      .collect()
  };
  match pool {
    Some(pool) => pool.install(visit),
    None => visit(),
  }
}

/// Apply one variant's recorded output: properties, then dependencies, then
/// the split, so new variants inherit both.
fn apply(graph: &mut ModuleGraph, env: Environment<'_>, variant: VariantId, output: MutatorOutput, errors: &mut ErrorList) {
  errors.extend(output.errors);
  if let Some(properties) = output.properties {
    graph.variant_mut(variant).properties = properties;
  }
  for request in output.dependencies {
    add_requested(graph, env, variant, request, errors);
  }
  if let Some(split) = output.split {
    graph.split(variant, &split.axis, split.variations);
  }
}

fn add_requested(
  graph: &mut ModuleGraph,
  env: Environment<'_>,
  variant: VariantId,
  request: DependencyRequest,
  errors: &mut ErrorList,
) {
  let module = graph.module_of(variant);
  let name = module.name.clone();
  let package = module.package.clone();

  let target = match env.namespaces.resolve(&package, &request.reference) {
    Ok(target) => target,
    Err(source) => {
      errors.push(BuildError::Reference {
        module: name,
        package,
        property: request.property,
        source,
      });
      return;
    }
  };

  let target_module = graph.module(target);
  if target_module.has_capability(Capability::Defaults) {
    errors.push(BuildError::DependsOnDefaults {
      module: name,
      package,
      property: request.property,
      target: target_module.name.clone(),
    });
    return;
  }
  if let Err(rules) = env.namespaces.check_visibility(&package, target_module) {
    errors.push(BuildError::Visibility {
      module: name,
      package,
      property: request.property,
      target: target_module.name.clone(),
      target_package: target_module.package.clone(),
      rules,
    });
    return;
  }

  graph.add_checked_dependency(variant, request.tag, target, &request.property);
}

fn cycle_error(graph: &ModuleGraph, cycle: &Cycle) -> BuildError {
  BuildError::DependencyCycle {
    path: cycle.path.iter().map(|id| graph.describe(*id)).collect(),
  }
}
