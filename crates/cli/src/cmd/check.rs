//! Implementation of the `modgraph check` command.

use std::path::Path;

use anyhow::{Result, bail};
use modgraph_lib::resolve_packages;

use super::{load_config, load_records};
use crate::output::{OutputFormat, print_build_errors, print_json, print_success};

pub fn cmd_check(records: &Path, config: Option<&Path>, format: OutputFormat) -> Result<()> {
  let config = load_config(config)?;
  let set = load_records(records)?;

  match resolve_packages(config, &set) {
    Ok(resolved) => {
      if format.is_json() {
        print_json(&serde_json::json!({ "ok": true, "variants": resolved.variants.len() }))
      } else {
        print_success(&format!(
          "{} module(s) in {} package(s) resolve cleanly",
          set.module_count(),
          set.packages.len()
        ));
        Ok(())
      }
    }
    Err(errors) => {
      print_build_errors(&errors, format)?;
      bail!("check failed with {} error(s)", errors.len());
    }
  }
}
