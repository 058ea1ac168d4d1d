//! Implementation of the `modgraph info` command.

use std::path::Path;

use anyhow::Result;
use modgraph_lib::mutator::MutatorRegistry;
use modgraph_lib::platform::Target;

use super::load_config;
use crate::output::{OutputFormat, print_json, print_stat};

pub fn cmd_info(config: Option<&Path>, format: OutputFormat) -> Result<()> {
  let config = load_config(config)?;
  let detected = Target::current().map(|t| t.triple());
  let mutators = MutatorRegistry::with_builtins();
  let stages = mutators.names();

  if format.is_json() {
    return print_json(&serde_json::json!({
      "version": env!("CARGO_PKG_VERSION"),
      "detected_host": detected,
      "stages": stages,
      "config": config,
    }));
  }

  println!("modgraph {}", env!("CARGO_PKG_VERSION"));
  println!();
  println!("System:");
  print_stat("Detected host", detected.as_deref().unwrap_or("unsupported platform"));
  println!();
  println!("Configuration:");
  print_stat("Host", &config.host.to_string());
  let archs: Vec<&str> = config.device.archs.iter().map(|a| a.as_str()).collect();
  print_stat("Device", &format!("{} [{}]", config.device.os, archs.join(", ")));
  print_stat("Parallelism", &config.parallelism.to_string());
  print_stat("Import precedence", &format!("{:?}", config.import_precedence));
  print_stat("Config variables", &config.soong_config.variables.len().to_string());
  print_stat("External build", if config.external_build.enabled { "mixed" } else { "off" });
  println!();
  println!("Stages: defaults, {}", stages.join(", "));
  Ok(())
}
