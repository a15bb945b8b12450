use crate::{Command, CommandArgs, CommandContext};
use async_trait::async_trait;
use log::debug;
use parley_rs_protocol::CommandError;

/// Level used when none is given or the argument is not a number.
pub const DEFAULT_CHALLENGE_LEVEL: u32 = 1;

/// Instructions for each memory challenge level.
fn instructions(level: u32) -> &'static str {
    match level {
        1 => "Remember 3 random numbers",
        2 => "Remember 5 words in a sentence",
        3 => "Remember a sequence of 7 items",
        _ => "Unknown challenge",
    }
}

/// Parse a level argument; anything non-numeric falls back to the default.
pub fn parse_level(raw: Option<&str>) -> u32 {
    raw.and_then(|value| value.trim().parse().ok())
        .unwrap_or(DEFAULT_CHALLENGE_LEVEL)
}

/// Starts a memory challenge at the requested level.
#[derive(Debug, Default)]
pub struct ChallengeCommand;

#[async_trait]
impl Command for ChallengeCommand {
    fn name(&self) -> &str {
        "challenge"
    }

    fn description(&self) -> &str {
        "Start a memory challenge (levels 1-3)"
    }

    fn parameters(&self) -> &[&str] {
        &["level"]
    }

    async fn call(&self, ctx: &CommandContext, args: CommandArgs) -> Result<String, CommandError> {
        let level = parse_level(args.get("level").map(String::as_str));
        debug!(
            "challenge started (user_id={}, level={})",
            ctx.user_id.as_deref().unwrap_or("-"),
            level
        );
        Ok(format!(
            "✅ **🎯 Memory challenge, level {level}**\n\n📋 **Instructions:** {}\n💡 Use your memory well!",
            instructions(level)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::{instructions, parse_level};
    use pretty_assertions::assert_eq;

    #[test]
    fn non_numeric_levels_default_to_one() {
        assert_eq!(parse_level(None), 1);
        assert_eq!(parse_level(Some("hard")), 1);
        assert_eq!(parse_level(Some("-2")), 1);
        assert_eq!(parse_level(Some(" 3 ")), 3);
    }

    #[test]
    fn levels_outside_range_are_unknown() {
        assert_eq!(instructions(2), "Remember 5 words in a sentence");
        assert_eq!(instructions(9), "Unknown challenge");
    }
}
