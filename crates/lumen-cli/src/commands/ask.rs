//! Ask command implementation

use anyhow::{bail, Context, Result};
use lumen_core::{AIClient, Insight, InsightResult, InsightService, ResolvedConfig, Topic};

/// Generate an insight for `topic` and print it
pub async fn cmd_ask(config: &ResolvedConfig, topic: &str, json: bool) -> Result<()> {
    config.warn_defaults();
    let client = AIClient::from_config(config).context("Failed to create AI client")?;
    let output = ask_with(client, topic, json).await?;
    println!("{}", output);
    Ok(())
}

/// Run one insight request against `client` and render the result
///
/// An error result is returned as `Err` so the process exits non-zero.
pub async fn ask_with(client: AIClient, topic: &str, json: bool) -> Result<String> {
    let topic = Topic::parse(topic)?;
    let service = InsightService::new(client);

    match service.get_insights(&topic).await {
        InsightResult::Success(insight) if json => Ok(serde_json::to_string_pretty(&insight)?),
        InsightResult::Success(insight) => Ok(format_insight(&topic, &insight)),
        InsightResult::Error { message } => bail!(message),
    }
}

/// Human-readable rendering of an insight
pub fn format_insight(topic: &Topic, insight: &Insight) -> String {
    let mut out = String::new();

    out.push_str(&format!("💡 {}\n\n", topic));
    out.push_str(&insight.overview);
    out.push_str("\n\n");

    out.push_str("Key concepts:\n");
    for concept in &insight.key_concepts {
        out.push_str(&format!("  • {}\n", concept));
    }

    if let Some(facts) = &insight.facts {
        out.push_str("\nFacts:\n");
        for fact in facts {
            out.push_str(&format!("  • {}\n", fact));
        }
    }

    if let Some(applications) = &insight.applications {
        out.push_str(&format!("\nApplications:\n  {}\n", applications));
    }

    out.push_str("\nRelated:\n");
    for link in &insight.related_links {
        out.push_str(&format!("  {} - {}\n", link.title, link.url));
    }

    out.trim_end().to_string()
}
