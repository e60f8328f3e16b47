//! Check command implementation

use std::io::Write;

use anyhow::{bail, Context, Result};
use lumen_core::{AIClient, CompletionBackend, DefaultedSetting, ResolvedConfig};

/// Show the effective configuration and probe the backend
pub async fn cmd_check(config: &ResolvedConfig) -> Result<()> {
    println!("🔍 Checking model backend...\n");
    println!("{}\n", describe_config(config));

    let client = AIClient::from_config(config).context("Failed to create AI client")?;

    print!("Checking {} availability... ", client.host());
    std::io::stdout().flush().ok();
    if client.health_check().await {
        println!("✅ Connected");
        Ok(())
    } else {
        println!("❌ Failed");
        println!("\nTo set up Ollama:");
        println!("  1. Install Ollama: https://ollama.com/download");
        println!("  2. Start the server: ollama serve");
        println!("  3. Pull the model: ollama pull {}", client.model());
        println!("  4. Point Lumen at it: export OLLAMA_API_URL={}", client.host());
        bail!("Model backend not reachable at {}", client.host())
    }
}

/// One line per setting, marking the ones that fell back to defaults
pub fn describe_config(config: &ResolvedConfig) -> String {
    let mark = |setting: DefaultedSetting| {
        if config.is_defaulted(setting) {
            "  ⚠️  default"
        } else {
            ""
        }
    };

    [
        format!(
            "  API URL: {}{}",
            config.api_url,
            mark(DefaultedSetting::ApiUrl)
        ),
        format!("  Model:   {}{}", config.model, mark(DefaultedSetting::Model)),
        format!(
            "  Timeout: {}s{}",
            config.timeout.as_secs(),
            mark(DefaultedSetting::TimeoutSecs)
        ),
    ]
    .join("\n")
}
