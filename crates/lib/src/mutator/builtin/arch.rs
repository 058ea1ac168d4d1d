//! Architecture variants.

use super::split_and_select;
use crate::consts::{AXIS_ARCH, AXIS_OS};
use crate::module_types::Capability;
use crate::mutator::{Direction, Mutator, MutatorContext};

/// Splits `ArchVariants` modules into one variant per architecture of their
/// OS and selects their `arch` branches. Host variants get the host
/// architecture; everything else gets the configured device architectures.
pub struct ArchMutator;

impl Mutator for ArchMutator {
  fn name(&self) -> &str {
    "arch"
  }

  fn direction(&self) -> Direction {
    Direction::BottomUp
  }

  fn mutate(&self, ctx: &mut MutatorContext<'_>) {
    if !ctx.has_capability(Capability::ArchVariants) {
      return;
    }
    let config = ctx.config();
    let is_host = ctx.variation(AXIS_OS) == Some(config.host.os.as_str());
    let archs = if is_host {
      vec![config.host.arch]
    } else {
      config.device.archs.clone()
    };

    let variations: Vec<(&str, Vec<&str>)> = archs.iter().map(|arch| (arch.as_str(), vec![arch.as_str()])).collect();
    split_and_select(ctx, AXIS_ARCH, "arch", &variations);
  }
}
