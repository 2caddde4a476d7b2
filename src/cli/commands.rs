use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use crate::config::{load_config, DispatchConfig};
use crate::registry::HandlerRegistry;

/// Command-line interface for ajax-dispatch
#[derive(Parser)]
#[command(name = "ajax-dispatch")]
#[command(about = "Inspect and validate ajax-dispatch handler tables", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Validate a handler table config (YAML, TOML or JSON)
    Check {
        /// Path to the config file
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Print every (method, discriminator value) → handler entry
    Routes {
        /// Path to the config file
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Execute the CLI command provided by the user
///
/// # Errors
///
/// Returns an error if the config cannot be read, parsed or validated, or
/// if writing to stdout fails.
pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let stdout = io::stdout();
    run_command(&cli.command, &mut stdout.lock())
}

/// Run a parsed command, writing its report to `out`.
pub fn run_command<W: Write>(command: &Commands, out: &mut W) -> anyhow::Result<()> {
    match command {
        Commands::Check { config } => {
            let (cfg, registry) = load_registry(config)?;
            info!(
                config = %config.display(),
                handlers = registry.len(),
                "Handler table is valid"
            );
            writeln!(
                out,
                "ok: {} handler(s), discriminator '{}'",
                registry.len(),
                cfg.dispatcher_config().discriminator
            )?;
        }
        Commands::Routes { config } => {
            let (cfg, registry) = load_registry(config)?;
            let field = cfg.dispatcher_config().discriminator;
            for (method, value, descriptor) in registry.entries() {
                writeln!(out, "{method:<6} {field}={value} -> {descriptor}")?;
            }
        }
    }
    Ok(())
}

fn load_registry(path: &Path) -> anyhow::Result<(DispatchConfig, HandlerRegistry)> {
    let cfg = load_config(path)?;
    let registry = cfg
        .registry()
        .with_context(|| format!("in {}", path.display()))?;
    Ok((cfg, registry))
}
