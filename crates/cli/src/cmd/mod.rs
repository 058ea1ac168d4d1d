mod check;
mod info;
mod resolve;
mod types;

pub use check::cmd_check;
pub use info::cmd_info;
pub use resolve::cmd_resolve;
pub use types::cmd_types;

use std::path::Path;

use anyhow::{Context, Result};
use modgraph_lib::{Config, PackageSet};

/// The configuration at `path`, or the defaults.
fn load_config(path: Option<&Path>) -> Result<Config> {
  match path {
    Some(path) => Config::from_file(path).with_context(|| format!("Failed to load config: {}", path.display())),
    None => Ok(Config::default()),
  }
}

fn load_records(path: &Path) -> Result<PackageSet> {
  PackageSet::from_file(path).with_context(|| format!("Failed to load module records: {}", path.display()))
}
