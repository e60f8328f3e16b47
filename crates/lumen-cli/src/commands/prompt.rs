//! Prompt command implementation

use anyhow::Result;
use lumen_core::{build_prompt, Topic};

/// Print the prompt that `ask` and the server would send for `topic`
pub fn cmd_prompt(topic: &str) -> Result<()> {
    println!("{}", render_prompt(topic)?);
    Ok(())
}

pub fn render_prompt(topic: &str) -> Result<String> {
    let topic = Topic::parse(topic)?;
    Ok(build_prompt(&topic))
}
