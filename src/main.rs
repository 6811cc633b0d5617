//! Entry point for glitch, a token-budget-aware conversational AI assistant
//! for the terminal.
//!
//! This binary loads environment variables, wires diagnostics to an
//! append-only log file, parses CLI arguments via [`cli`], and dispatches to
//! the appropriate subcommand handler.

mod bot;
mod chunker;
mod cli;
mod config;
mod constants;
mod conversation;
mod error;
mod extract;
mod message;
mod provider;
mod repl;
mod retry;
mod tokens;
mod tools;
mod transcript;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

/// Runs the glitch CLI.
///
/// Loads `.env` files (silently ignored if absent), initializes the
/// diagnostics log, parses command-line arguments into a [`cli::Cli`]
/// struct, and dispatches the chosen subcommand via [`cli::run`].
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_diagnostics()?;
    let cli = cli::parse();
    cli::run(cli).await
}

/// Routes tracing output to `~/.local/share/glitch/glitch.log` (append-only,
/// no ANSI), filtered by `RUST_LOG` with an `info` default.
fn init_diagnostics() -> Result<()> {
    let dir = config::Config::data_dir()?;
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create data directory {}", dir.display()))?;
    let path = dir.join(constants::DIAGNOSTICS_FILENAME);
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open diagnostics log {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
