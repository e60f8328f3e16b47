//! CLI argument definitions using clap
//!
//! This module contains the clap structs for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Lumen - Structured insights on any topic from a local LLM
#[derive(Parser)]
#[command(name = "lumen")]
#[command(about = "Topic insight service backed by Ollama", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (defaults to <data dir>/lumen/config.toml when present)
    #[arg(long, env = "LUMEN_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Ollama base URL (overrides OLLAMA_API_URL / OLLAMA_HOST and the config file)
    #[arg(long, global = true)]
    pub ollama_url: Option<String>,

    /// Model name (overrides OLLAMA_MODEL and the config file)
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Request timeout in seconds for model calls
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_secs: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Allowed CORS origin (repeatable or comma-separated)
        #[arg(
            long = "allow-origin",
            env = "LUMEN_ALLOWED_ORIGINS",
            value_delimiter = ','
        )]
        allowed_origins: Vec<String>,
    },

    /// Generate an insight for a topic and print it
    Ask {
        /// Topic to explain
        topic: String,

        /// Print the raw JSON result instead of formatted text
        #[arg(long)]
        json: bool,
    },

    /// Print the prompt that would be sent for a topic
    Prompt {
        /// Topic to build the prompt for
        topic: String,
    },

    /// Check backend connectivity and show the effective configuration
    Check,
}
