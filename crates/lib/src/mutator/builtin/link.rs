//! Static and shared variants.

use super::split_and_select;
use crate::consts::AXIS_LINK;
use crate::module_types::Capability;
use crate::mutator::{Direction, Mutator, MutatorContext};

pub struct LinkMutator;

impl Mutator for LinkMutator {
  fn name(&self) -> &str {
    "link"
  }

  fn direction(&self) -> Direction {
    Direction::BottomUp
  }

  fn mutate(&self, ctx: &mut MutatorContext<'_>) {
    if !ctx.has_capability(Capability::LinkVariants) {
      return;
    }
    split_and_select(
      ctx,
      AXIS_LINK,
      "link",
      &[("static", vec!["static"]), ("shared", vec!["shared"])],
    );
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;
  use crate::mutator::builtin::testing;

  #[test]
  fn libraries_split_into_static_and_shared() {
    let mut config = testing::config();
    config.device.archs.truncate(1);
    let (ctx, result) = testing::run(
      config,
      json!([{ "path": "p", "modules": [{ "type": "cc_library", "name": "libfoo", "properties": {
        "cflags": ["-common"],
        "link": { "shared": { "cflags": ["-fPIC"] } }
      } }] }]),
    );
    result.unwrap();

    let variants = testing::variants(&ctx, "libfoo");
    assert_eq!(variants.len(), 2);
    assert_eq!(variants[0].variations.get(AXIS_LINK), Some("static"));
    assert_eq!(variants[0].properties.get_list("cflags"), ["-common"]);
    assert_eq!(variants[1].variations.get(AXIS_LINK), Some("shared"));
    assert_eq!(variants[1].properties.get_list("cflags"), ["-common", "-fPIC"]);
  }

  #[test]
  fn static_libs_point_at_static_variants() {
    let mut config = testing::config();
    config.device.archs.truncate(1);
    let (ctx, result) = testing::run(
      config,
      json!([{ "path": "p", "modules": [
        { "type": "cc_library", "name": "libouter", "properties": { "static_libs": ["libinner"] } },
        { "type": "cc_library", "name": "libinner" }
      ] }]),
    );
    result.unwrap();

    assert_eq!(
      testing::edges(&ctx),
      vec![
        (
          "libouter{arch: arm64, link: static, os: android}".to_string(),
          "libinner{arch: arm64, link: static, os: android}".to_string()
        ),
        (
          "libouter{arch: arm64, link: shared, os: android}".to_string(),
          "libinner{arch: arm64, link: static, os: android}".to_string()
        ),
      ]
    );
  }
}
