//! CLI command implementations
//!
//! - `ask` - One-shot insight for a topic
//! - `check` - Backend probe and effective configuration
//! - `prompt` - Print the prompt for a topic
//! - `serve` - Web server command

pub mod ask;
pub mod check;
pub mod prompt;
pub mod serve;

// Re-export command functions for main.rs
pub use ask::*;
pub use check::*;
pub use prompt::*;
pub use serve::*;

use anyhow::{Context, Result};
use lumen_core::{ConfigOverrides, ResolvedConfig};

use crate::cli::Cli;

/// Resolve model configuration from global flags, environment and config file
pub fn load_config(cli: &Cli) -> Result<ResolvedConfig> {
    let overrides = ConfigOverrides {
        api_url: cli.ollama_url.clone(),
        model: cli.model.clone(),
        timeout_secs: cli.timeout_secs,
    };
    ResolvedConfig::load(cli.config.as_deref(), &overrides).context("Failed to load configuration")
}
