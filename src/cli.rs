//! Command-line interface definition and dispatch for glitch.
//!
//! Uses [`clap`] for argument parsing with derive macros. `chat` starts the
//! interactive loop, `ask` runs a single exchange, and `config show` prints
//! the resolved configuration.

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;

use crate::bot::Chatbot;
use crate::config::Config;
use crate::repl;

/// Top-level CLI structure for glitch.
#[derive(Parser)]
#[command(name = "glitch", about = "A token-budget-aware conversational AI assistant")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands. The `///` doc comments on variants double as
/// `--help` text rendered by clap.
#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive chat session
    Chat {
        /// Model to use (overrides config)
        #[arg(short, long)]
        model: Option<String>,
    },
    /// Ask a one-shot question
    Ask {
        /// The question to ask
        prompt: Vec<String>,
        /// Model to use (overrides config)
        #[arg(short, long)]
        model: Option<String>,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Subcommands for the `config` command.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current config
    Show,
}

/// Parses command-line arguments into a [`Cli`] struct.
pub fn parse() -> Cli {
    Cli::parse()
}

/// Dispatches the parsed CLI command to its handler.
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Chat { model } => {
            let mut config = Config::load()?;
            if let Some(model) = model {
                config.model = model;
            }
            repl::run(config).await
        }
        Commands::Ask { prompt, model } => {
            let prompt = prompt.join(" ");
            if prompt.is_empty() {
                anyhow::bail!("No prompt provided. Usage: glitch ask \"your question here\"");
            }

            let mut config = Config::load()?;
            if let Some(model) = model {
                config.model = model;
            }

            println!(
                "{} [model: {}]",
                crate::constants::BOT_NAME.bold().cyan(),
                config.model.yellow(),
            );
            println!();
            println!("{} {}", ">".green().bold(), prompt);
            println!();

            let mut bot = Chatbot::from_config(&config)?;
            let reply = bot.chat(&prompt).await?;
            println!("{reply}");

            let (used, budget) = bot.token_usage();
            println!();
            println!("{}", format!("tokens: {used} / {budget}").dimmed());
            Ok(())
        }
        Commands::Config { action } => {
            let config = Config::load()?;
            match action {
                ConfigAction::Show => {
                    let path = Config::config_path()?;
                    println!("{} {}", "Config path:".bold(), path.display());
                    println!();
                    let toml_str = toml::to_string_pretty(&config)?;
                    println!("{toml_str}");
                }
            }
            Ok(())
        }
    }
}
