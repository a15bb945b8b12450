//! Prompt assembly for free-text messages.

use parley_rs_memory::MemoryRecord;
use std::fmt::Write;

/// Build the completion prompt from the message, the sender's name and any
/// related memories (most relevant first).
pub fn build_prompt(message: &str, display_name: &str, memories: &[MemoryRecord]) -> String {
    let mut prompt = format!("Message: {message}\n\nUser: {display_name}");
    if !memories.is_empty() {
        prompt.push_str("\n\nPrevious context:");
        for (idx, record) in memories.iter().enumerate() {
            let _ = write!(prompt, "\n{}. {}", idx + 1, record.summary);
        }
    }
    prompt
}

#[cfg(test)]
mod tests {
    use super::build_prompt;
    use parley_rs_memory::MemoryRecord;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    #[test]
    fn prompt_without_memories() {
        assert_eq!(
            build_prompt("hi there", "Ada", &[]),
            "Message: hi there\n\nUser: Ada"
        );
    }

    #[test]
    fn prompt_lists_memory_summaries() {
        let memories = vec![
            MemoryRecord::new("user: cats\nassistant: meow", BTreeMap::new()),
            MemoryRecord::new("user: more cats", BTreeMap::new()),
        ];
        assert_eq!(
            build_prompt("cats?", "Ada", &memories),
            "Message: cats?\n\nUser: Ada\n\nPrevious context:\n1. user: cats\nassistant: meow\n2. user: more cats"
        );
    }
}
