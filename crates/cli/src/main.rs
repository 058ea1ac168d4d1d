mod cmd;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::output::OutputFormat;

/// modgraph - resolve declarative build modules into a variant graph
#[derive(Parser)]
#[command(name = "modgraph")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable debug logging (overridden by RUST_LOG)
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Output format
  #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
  format: OutputFormat,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Resolve module records into the final variant graph
  Resolve {
    /// Parsed module records (JSON)
    records: PathBuf,

    /// Build configuration (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured worker count
    #[arg(short = 'j', long)]
    parallelism: Option<usize>,
  },

  /// Run the pipeline and report errors without printing the graph
  Check {
    /// Parsed module records (JSON)
    records: PathBuf,

    /// Build configuration (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,
  },

  /// List registered module types
  Types,

  /// Show host detection and the effective configuration
  Info {
    /// Build configuration (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,
  },
}

fn main() -> Result<()> {
  let cli = Cli::parse();
  init_logging(cli.verbose);

  match cli.command {
    Commands::Resolve {
      records,
      config,
      parallelism,
    } => cmd::cmd_resolve(&records, config.as_deref(), parallelism, cli.format),
    Commands::Check { records, config } => cmd::cmd_check(&records, config.as_deref(), cli.format),
    Commands::Types => cmd::cmd_types(cli.format),
    Commands::Info { config } => cmd::cmd_info(config.as_deref(), cli.format),
  }
}

fn init_logging(verbose: bool) {
  let default = if verbose { "debug" } else { "warn" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();
}
