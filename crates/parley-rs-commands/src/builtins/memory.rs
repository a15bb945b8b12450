use crate::{Command, CommandArgs, CommandContext};
use async_trait::async_trait;
use log::debug;
use parley_rs_memory::MemoryRecord;
use parley_rs_protocol::CommandError;
use std::fmt::Write;

/// Searches the memory store and shows the top matches' summaries.
///
/// A blank query shows the most recent records instead of relying on the
/// empty string matching everything.
#[derive(Debug, Default)]
pub struct SearchMemoryCommand;

#[async_trait]
impl Command for SearchMemoryCommand {
    fn name(&self) -> &str {
        "search_memory"
    }

    fn description(&self) -> &str {
        "Search stored conversations"
    }

    fn parameters(&self) -> &[&str] {
        &["query"]
    }

    async fn call(&self, ctx: &CommandContext, args: CommandArgs) -> Result<String, CommandError> {
        let query = args.get("query").map(|query| query.trim()).unwrap_or("");
        let memory = &ctx.services.memory;
        let limit = ctx.services.search_display.max(1);

        let (heading, records) = if query.is_empty() {
            ("🧠 **Most recent memories:**".to_string(), memory.recent(limit))
        } else {
            (
                format!("🔍 **Memory results for '{query}':**"),
                memory.search(query, limit),
            )
        };
        debug!(
            "memory command (query_len={}, hits={})",
            query.len(),
            records.len()
        );

        if records.is_empty() {
            return Ok(if query.is_empty() {
                "❌ No results: memory is empty".to_string()
            } else {
                format!("❌ No results for '{query}'")
            });
        }
        Ok(render(&heading, &records))
    }
}

fn render(heading: &str, records: &[MemoryRecord]) -> String {
    let mut out = format!("{heading}\n\n");
    for (idx, record) in records.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", idx + 1, record.summary);
    }
    out
}
