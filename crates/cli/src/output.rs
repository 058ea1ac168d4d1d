//! CLI output formatting utilities.
//!
//! Colored status lines on the terminal, plain text when piped, and JSON
//! when `--format json` is given.

use std::time::Duration;

use anyhow::Context;
use clap::ValueEnum;
use modgraph_lib::ErrorList;
use modgraph_lib::graph::Variations;
use owo_colors::{OwoColorize, Stream};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Text,
  Json,
}

impl OutputFormat {
  pub fn is_json(self) -> bool {
    matches!(self, OutputFormat::Json)
  }
}

pub mod symbols {
  pub const SUCCESS: &str = "✓";
  pub const ERROR: &str = "✗";
  pub const INFO: &str = "•";
  pub const ARROW: &str = "→";
}

pub fn truncate_hash(hash: &str) -> &str {
  let len = hash.len().min(12);
  &hash[..len]
}

pub fn format_duration(duration: Duration) -> String {
  let secs = duration.as_secs();
  let millis = duration.subsec_millis();

  if secs >= 60 {
    format!("{}m {}s", secs / 60, secs % 60)
  } else if secs > 0 {
    format!("{}.{:02}s", secs, millis / 10)
  } else {
    format!("{}ms", millis)
  }
}

/// `name` followed by its variations, or just `name` before any split.
pub fn format_variant(name: &str, variations: &Variations) -> String {
  if variations.is_empty() {
    name.to_string()
  } else {
    format!("{}{}", name, variations)
  }
}

pub fn print_success(message: &str) {
  println!(
    "{} {}",
    symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
    message
  );
}

pub fn print_error(message: &str) {
  eprintln!(
    "{} {}",
    symbols::ERROR.if_supports_color(Stream::Stderr, |s| s.red()),
    message.if_supports_color(Stream::Stderr, |s| s.red())
  );
}

pub fn print_info(message: &str) {
  println!(
    "{} {}",
    symbols::INFO.if_supports_color(Stream::Stdout, |s| s.blue()),
    message
  );
}

pub fn print_stat(label: &str, value: &str) {
  println!(
    "  {}: {}",
    label.if_supports_color(Stream::Stdout, |s| s.dimmed()),
    value
  );
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
  println!("{}", json);
  Ok(())
}

/// Print every collected error, as text on stderr or as a JSON document on
/// stdout.
pub fn print_build_errors(errors: &ErrorList, format: OutputFormat) -> anyhow::Result<()> {
  if format.is_json() {
    let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
    return print_json(&serde_json::json!({ "ok": false, "errors": messages }));
  }
  for error in errors.iter() {
    print_error(&error.to_string());
  }
  Ok(())
}
