//! Host and device variants.

use super::split_and_select;
use crate::consts::AXIS_OS;
use crate::module_types::Capability;
use crate::mutator::{Direction, Mutator, MutatorContext};

/// Splits `OsVariants` modules into the device OS and/or the host OS and
/// selects their `target` branches.
pub struct OsMutator;

impl Mutator for OsMutator {
  fn name(&self) -> &str {
    "os"
  }

  fn direction(&self) -> Direction {
    Direction::BottomUp
  }

  fn mutate(&self, ctx: &mut MutatorContext<'_>) {
    if !ctx.has_capability(Capability::OsVariants) {
      return;
    }
    let props = ctx.properties();
    let device_supported = props.get_bool("device_supported").unwrap_or(true);
    let host_supported = props.get_bool("host_supported").unwrap_or(false);

    let config = ctx.config();
    let mut variations = Vec::new();
    if device_supported {
      variations.push((config.device.os.as_str(), vec![config.device.os.as_str()]));
    }
    if host_supported {
      variations.push((config.host.os.as_str(), vec![config.host.os.as_str(), "host"]));
    }

    if variations.is_empty() {
      ctx.module_error("module is supported on neither host nor device");
      return;
    }
    split_and_select(ctx, AXIS_OS, "target", &variations);
  }
}
