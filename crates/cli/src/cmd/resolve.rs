//! Implementation of the `modgraph resolve` command.
//!
//! Loads module records and configuration, runs the whole pipeline and
//! prints the resolved variant graph.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use modgraph_lib::resolve_packages;
use modgraph_lib::util::hash::Hashable;
use tracing::info;

use super::{load_config, load_records};
use crate::output::{
  OutputFormat, format_duration, format_variant, print_build_errors, print_json, print_stat, print_success,
  symbols, truncate_hash,
};

pub fn cmd_resolve(records: &Path, config: Option<&Path>, parallelism: Option<usize>, format: OutputFormat) -> Result<()> {
  let mut config = load_config(config)?;
  if let Some(parallelism) = parallelism {
    if parallelism == 0 {
      bail!("--parallelism must be at least 1");
    }
    config.parallelism = parallelism;
  }
  let set = load_records(records)?;

  let start = Instant::now();
  let resolved = match resolve_packages(config, &set) {
    Ok(resolved) => resolved,
    Err(errors) => {
      print_build_errors(&errors, format)?;
      bail!("resolution failed with {} error(s)", errors.len());
    }
  };
  let elapsed = start.elapsed();
  let hash = resolved.compute_hash().context("Failed to hash resolved graph")?;
  info!(variants = resolved.variants.len(), hash = %hash, "resolved graph");

  if format.is_json() {
    return print_json(&serde_json::json!({ "hash": hash.0, "variants": resolved.variants }));
  }

  print_success(&format!(
    "Resolved {} module(s) into {} variant(s) in {}",
    set.module_count(),
    resolved.variants.len(),
    format_duration(elapsed)
  ));
  print_stat("Edges", &resolved.edge_count().to_string());
  print_stat("Hash", truncate_hash(&hash.0));
  println!();

  for variant in &resolved.variants {
    println!(
      "{} {} ({}, //{})",
      symbols::INFO,
      format_variant(&variant.name, &variant.variations),
      variant.module_type,
      variant.package
    );
    for dep in &variant.deps {
      println!(
        "    {} {} [{}]",
        symbols::ARROW,
        format_variant(&dep.name, &dep.variations),
        dep.role
      );
    }
  }

  Ok(())
}
