//! Built-in web search command.

use crate::{Command, CommandArgs, CommandContext};
use async_trait::async_trait;
use log::info;
use parley_rs_protocol::CommandError;
use std::fmt::Write;

/// Searches the web through the configured provider and lists title/url
/// pairs in provider order.
#[derive(Debug, Default)]
pub struct WebSearchCommand;

#[async_trait]
impl Command for WebSearchCommand {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web"
    }

    fn parameters(&self) -> &[&str] {
        &["query"]
    }

    async fn call(&self, ctx: &CommandContext, args: CommandArgs) -> Result<String, CommandError> {
        let query = args.get("query").map(|query| query.trim()).unwrap_or("");
        if query.is_empty() {
            return Err(CommandError::InvalidArguments(
                "query cannot be empty".to_string(),
            ));
        }
        let provider = ctx
            .services
            .web
            .as_ref()
            .ok_or_else(|| CommandError::Unavailable("web provider not configured".to_string()))?;
        let limit = ctx.services.web_results.max(1);
        info!("web search (query_len={}, limit={})", query.len(), limit);

        let results = provider.search(query, limit).await?;
        if results.is_empty() {
            return Ok(format!("❌ No web results found for '{query}'"));
        }
        let mut out = format!("🔍 **Web results for '{query}':**\n\n");
        for result in results.iter().take(limit) {
            let _ = writeln!(out, "• **{}**\n  {}", result.title, result.url);
        }
        Ok(out)
    }
}
