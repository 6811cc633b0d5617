//! Interactive chat REPL.
//!
//! Multi-turn conversation loop using [`rustyline`] for readline support
//! (history, line editing). Input is sent through the [`Chatbot`]
//! orchestrator; a `files:` keyword switches the turn to file ingestion,
//! where everything after the keyword is a comma-separated list of files or
//! directories whose extracted text becomes the user message.
//!
//! # Readline behavior
//!
//! - **exit / quit / bye** (case-insensitive): leaves the loop
//! - **Ctrl+C**: cancels current input, stays in the REPL
//! - **Ctrl+D**: exits cleanly
//! - History is persisted to `~/.cache/glitch/chat_history.txt`

use std::time::Instant;

use anyhow::Result;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::info;

use crate::bot::Chatbot;
use crate::config::Config;
use crate::constants::{BOT_NAME, EXIT_WORDS, FILES_KEYWORD};
use crate::extract::{self, FileExtractor};

/// Runs the interactive chat loop until the user exits.
pub async fn run(config: Config) -> Result<()> {
    let started = Instant::now();
    info!("starting chatbot setup");
    let mut bot = Chatbot::from_config(&config)?;
    info!(conversation = bot.id(), "chatbot ready");

    let short = &bot.id()[..8];
    println!(
        "{} [conversation: {}] [model: {}] (Ctrl+D to exit)",
        format!("{BOT_NAME} chat").bold().cyan(),
        short.yellow(),
        config.model.yellow(),
    );
    println!(
        "{}",
        format!("ready in {:.2}s", started.elapsed().as_secs_f64()).dimmed()
    );
    println!();
    println!("{} Hi! How can I assist you today?", bot_label());

    let mut rl = DefaultEditor::new()?;
    let history_path = Config::cache_dir()?.join(crate::constants::HISTORY_FILENAME);
    if history_path.exists() {
        let _ = rl.load_history(&history_path);
    }

    loop {
        let readline = rl.readline(&format!("{} ", ">".green().bold()));
        match readline {
            Ok(line) => {
                let line = line.trim().to_string();
                if line.is_empty() {
                    continue;
                }
                if EXIT_WORDS.contains(&line.to_lowercase().as_str()) {
                    println!("{} Goodbye! Have a great day.", bot_label());
                    break;
                }
                let _ = rl.add_history_entry(&line);

                // `files:` turns: extract and combine listed paths, then
                // send the combined text instead of the raw line.
                let input = if let Some((_, list)) = line.split_once(FILES_KEYWORD) {
                    let outcome = extract::gather(&FileExtractor, list);
                    for notice in &outcome.notices {
                        println!("{} {}", bot_label(), notice.yellow());
                    }
                    if outcome.is_empty() {
                        println!("{} No valid files were provided.", bot_label());
                        continue;
                    }
                    outcome.combined
                } else {
                    line
                };

                match bot.chat(&input).await {
                    Ok(reply) => {
                        println!("{} {}", bot_label(), reply);
                        let (used, budget) = bot.token_usage();
                        println!("{}", format!("tokens: {used} / {budget}").dimmed());
                        println!();
                    }
                    Err(e) => {
                        eprintln!("{} {}", "error:".red().bold(), e);
                        println!();
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "^C".dimmed());
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "goodbye.".dimmed());
                break;
            }
            Err(e) => {
                eprintln!("{} {}", "error:".red().bold(), e);
                break;
            }
        }
    }

    if let Some(parent) = history_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let _ = rl.save_history(&history_path);

    Ok(())
}

fn bot_label() -> colored::ColoredString {
    format!("{BOT_NAME}:").bold().cyan()
}
