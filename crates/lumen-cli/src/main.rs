//! Lumen CLI - Topic insights from a local LLM
//!
//! Usage:
//!   lumen serve --port 3000     Start web server
//!   lumen ask "Tides"           Print an insight for a topic
//!   lumen prompt "Tides"        Show the prompt sent to the model
//!   lumen check                 Probe the backend and show configuration

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match &cli.command {
        Commands::Serve {
            port,
            host,
            allowed_origins,
        } => {
            let config = commands::load_config(&cli)?;
            commands::cmd_serve(config, host, *port, allowed_origins.clone()).await
        }
        Commands::Ask { topic, json } => {
            let config = commands::load_config(&cli)?;
            commands::cmd_ask(&config, topic, *json).await
        }
        Commands::Prompt { topic } => commands::cmd_prompt(topic),
        Commands::Check => {
            let config = commands::load_config(&cli)?;
            commands::cmd_check(&config).await
        }
    }
}
