//! Mutator pipeline.
//!
//! This module provides:
//! - [`Mutator`]: one named graph-rewrite stage, bottom-up or top-down
//! - [`MutatorContext`]: what a mutator sees and may request for one variant
//! - [`MutatorRegistry`]: the ordered list of stages
//! - [`Pipeline`]: runs defaults propagation and then every stage in order
//!
//! Each stage visits every live variant in waves: a wave only holds variants
//! whose dependencies (bottom-up) or dependents (top-down) were all in earlier
//! waves. Within a wave, mutators run in parallel against the unchanged graph
//! and their requested changes are applied afterwards, in variant order.

pub mod builtin;
mod context;
mod pipeline;

use std::fmt;

pub use context::{Environment, MutatorContext};
pub use pipeline::Pipeline;

/// Traversal discipline of a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
  /// Dependencies before dependents.
  BottomUp,
  /// Dependents before dependencies.
  TopDown,
}

impl fmt::Display for Direction {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Direction::BottomUp => f.write_str("bottom-up"),
      Direction::TopDown => f.write_str("top-down"),
    }
  }
}

/// One graph-rewrite stage.
pub trait Mutator: Send + Sync {
  fn name(&self) -> &str;

  fn direction(&self) -> Direction;

  /// Visit one variant. Changes are requested through `ctx` and applied once
  /// the whole wave has been visited.
  fn mutate(&self, ctx: &mut MutatorContext<'_>);
}

/// A mutator backed by a closure.
pub struct FnMutator<F> {
  name: String,
  direction: Direction,
  f: F,
}

impl<F> Mutator for FnMutator<F>
where
  F: Fn(&mut MutatorContext<'_>) + Send + Sync,
{
  fn name(&self) -> &str {
    &self.name
  }

  fn direction(&self) -> Direction {
    self.direction
  }

  fn mutate(&self, ctx: &mut MutatorContext<'_>) {
    (self.f)(ctx)
  }
}

pub fn bottom_up<F>(name: &str, f: F) -> FnMutator<F>
where
  F: Fn(&mut MutatorContext<'_>) + Send + Sync,
{
  FnMutator {
    name: name.to_string(),
    direction: Direction::BottomUp,
    f,
  }
}

pub fn top_down<F>(name: &str, f: F) -> FnMutator<F>
where
  F: Fn(&mut MutatorContext<'_>) + Send + Sync,
{
  FnMutator {
    name: name.to_string(),
    direction: Direction::TopDown,
    f,
  }
}

/// Stages in the order they run.
#[derive(Default)]
pub struct MutatorRegistry {
  mutators: Vec<Box<dyn Mutator>>,
}

impl MutatorRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  /// `soong_config`, `deps`, `os`, `arch`, `link`, `dependency_check`.
  pub fn with_builtins() -> Self {
    let mut registry = Self::new();
    builtin::register_builtin_mutators(&mut registry);
    registry
  }

  /// Append a stage after every stage registered so far.
  pub fn register(&mut self, mutator: impl Mutator + 'static) {
    self.mutators.push(Box::new(mutator));
  }

  pub fn iter(&self) -> impl Iterator<Item = &dyn Mutator> {
    self.mutators.iter().map(|m| m.as_ref())
  }

  pub fn names(&self) -> Vec<&str> {
    self.iter().map(|m| m.name()).collect()
  }

  pub fn len(&self) -> usize {
    self.mutators.len()
  }

  pub fn is_empty(&self) -> bool {
    self.mutators.is_empty()
  }
}

impl fmt::Debug for MutatorRegistry {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_list().entries(self.names()).finish()
  }
}
