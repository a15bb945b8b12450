//! Slash-command routing.

use super::Orchestrator;
use crate::sessions::Session;
use chrono::Utc;
use log::{debug, warn};
use parley_rs_commands::{CommandContext, HostUsage, parse_invocation, tokenize};
use parley_rs_protocol::{CommandError, InboundMessage};

const HELP_TEXT: &str = "🆘 **Help**

**Basic commands:**
/start - start a session
/help - this list
/status - system status
/search [words] - search the web
/challenge [level] - start a memory challenge

**Advanced commands:**
`/cmd list_files [path]` - list files
`/cmd write_file \"name.txt\" \"content\"` - write a file
`/cmd search_memory \"query\"` - search stored conversations
`/cmd system_info` - host information
`/cmd web_search \"query\"` - search the web

**Examples:**
/cmd list_files .
/cmd write_file \"test.txt\" \"Hello World\"
/search \"rust async\"
/challenge 1";

const CMD_USAGE: &str = "⚡ **Using advanced commands:**

/cmd command_name [arguments]

**Available commands:**
- `list_files [path]` - list files
- `write_file \"name.txt\" \"content\"` - write a file
- `search_memory \"query\"` - search stored conversations
- `system_info` - host information
- `web_search \"query\"` - search the web

**Examples:**
/cmd list_files .
/cmd write_file \"test.txt\" \"Hello World\"
/cmd search_memory \"rust\"
/cmd web_search \"latest releases\"";

const SEARCH_USAGE: &str = "⚠️ Please provide something to search for\nExample: `/search rust async`";

/// Reply for a command name nobody registered.
pub(super) fn not_found_reply(name: &str) -> String {
    format!("❌ Command '{name}' does not exist. Use /help to see available commands.")
}

/// Split `/name@bot rest` into `("name", "rest")`.
pub(super) fn split_slash(text: &str) -> Option<(&str, &str)> {
    let body = text.trim_start().strip_prefix('/')?;
    let (word, rest) = match body.find(char::is_whitespace) {
        Some(idx) => (&body[..idx], body[idx..].trim()),
        None => (body, ""),
    };
    let name = word.split('@').next().unwrap_or(word);
    Some((name, rest))
}

impl Orchestrator {
    /// Route a slash command to its handler and return the reply text.
    pub(super) async fn dispatch_slash(
        &self,
        message: &InboundMessage,
        session: &Session,
    ) -> String {
        let Some((name, rest)) = split_slash(&message.text) else {
            return not_found_reply("");
        };
        debug!(
            "dispatching slash command (user_id={}, name={})",
            message.user_id, name
        );
        match name {
            "start" => self.welcome(session),
            "help" => HELP_TEXT.to_string(),
            "status" => self.status().await,
            "cmd" => match parse_invocation(rest) {
                Some(invocation) => {
                    self.run_command(&message.user_id, &invocation.name, &invocation.args)
                        .await
                }
                None => CMD_USAGE.to_string(),
            },
            "search" => {
                let tokens = tokenize(rest);
                if tokens.iter().all(|token| token.trim().is_empty()) {
                    return SEARCH_USAGE.to_string();
                }
                self.run_command(&message.user_id, "web_search", &tokens)
                    .await
            }
            other => {
                self.run_command(&message.user_id, other, &tokenize(rest))
                    .await
            }
        }
    }

    /// Bind `tokens` for `name` and execute it through the registry.
    async fn run_command(&self, user_id: &str, name: &str, tokens: &[String]) -> String {
        let args = match self.bindings.bind(name, tokens) {
            Ok(args) => args,
            Err(err) => {
                debug!("argument binding failed (name={}, err={})", name, err);
                return match err {
                    CommandError::InvalidArguments(message) => format!("❌ {message}"),
                    other => format!("❌ {other}"),
                };
            }
        };
        let ctx = CommandContext::for_user(self.command_services.clone(), user_id);
        match self.commands.execute(name, &ctx, args).await {
            Ok(reply) => reply,
            Err(CommandError::CommandNotFound(name)) => not_found_reply(&name),
            Err(err) => {
                warn!("command dispatch failed (name={}, err={})", name, err);
                format!("❌ {err}")
            }
        }
    }

    fn welcome(&self, session: &Session) -> String {
        let ai = if self.completion.is_some() {
            "AI replies"
        } else {
            "basic mode (no AI)"
        };
        format!(
            "🎊 **Welcome {}!**\n\n\
             🤖 **Active systems:**\n\
             ✅ Memory ({} records)\n\
             ✅ Commands ({} commands)\n\
             ✅ Plugins ({} plugins)\n\
             ✅ {}\n\n\
             Send /help for the command list, or just write anything to start a conversation.",
            session.display_name,
            self.memory().count(),
            self.commands.len(),
            self.plugins.len(),
            ai
        )
    }

    async fn status(&self) -> String {
        let host = match tokio::task::spawn_blocking(HostUsage::sample).await {
            Ok(usage) => format!(
                "- Memory: {}% used\n- Disk: {}% used\n- OS: {}",
                usage.memory_percent, usage.disk_percent, usage.os
            ),
            Err(err) => {
                warn!("host sampling failed (err={})", err);
                "- Host metrics unavailable".to_string()
            }
        };
        let mark = |on: bool| if on { "✅" } else { "❌" };
        format!(
            "📊 **System status**\n\n\
             👥 **Users:** {}\n\
             💬 **Messages:** {}\n\
             🧠 **Memories:** {}\n\n\
             💻 **Performance:**\n{}\n\n\
             🔧 **Subsystems:**\n\
             - Commands: {}\n\
             - Plugins: {}\n\
             - Web search: {}\n\
             - AI: {}\n\n\
             🕒 **Updated:** {}",
            self.sessions.len(),
            self.sessions.total_messages(),
            self.memory().count(),
            host,
            mark(!self.commands.is_empty()),
            mark(!self.plugins.is_empty()),
            mark(self.command_services.web.is_some()),
            mark(self.completion.is_some()),
            Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::split_slash;
    use pretty_assertions::assert_eq;

    #[test]
    fn splits_name_and_rest() {
        assert_eq!(split_slash("/cmd list_files ."), Some(("cmd", "list_files .")));
        assert_eq!(split_slash("  /help"), Some(("help", "")));
        assert_eq!(split_slash("/start@parley_bot"), Some(("start", "")));
        assert_eq!(split_slash("no slash"), None);
    }
}
