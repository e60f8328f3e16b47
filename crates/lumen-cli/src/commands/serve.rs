//! Server command implementation

use anyhow::Result;
use lumen_core::ResolvedConfig;
use lumen_server::ServerConfig;

pub async fn cmd_serve(
    config: ResolvedConfig,
    host: &str,
    port: u16,
    allowed_origins: Vec<String>,
) -> Result<()> {
    println!("🚀 Starting Lumen web server...");
    println!("   Listening: http://{}:{}", host, port);
    println!("   Ollama: {} (model: {})", config.api_url, config.model);
    println!("   Timeout: {}s", config.timeout.as_secs());
    if allowed_origins.is_empty() {
        println!("   CORS: same-origin only");
    } else {
        println!("   CORS: {}", allowed_origins.join(", "));
    }
    println!();

    let server = ServerConfig { allowed_origins };
    lumen_server::serve_with_config(host, port, config, server).await
}
