//! Shared value types passed between the transport, the orchestrator and
//! the collaborators it consumes.

mod command;
mod completion;

pub use command::CommandError;
pub use completion::{CompletionError, CompletionRequest};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a single request through the orchestrator.
pub type RequestId = Uuid;
/// Transport-assigned user identifier.
pub type UserId = String;

/// Display name used when the transport does not provide one.
pub const DEFAULT_DISPLAY_NAME: &str = "user";

/// A text message delivered by the messaging transport.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InboundMessage {
    /// Sender identifier.
    pub user_id: UserId,
    /// Sender display name.
    pub display_name: String,
    /// Raw message text, including any leading slash command.
    pub text: String,
    /// Time the transport received the message.
    pub received_at: DateTime<Utc>,
}

impl InboundMessage {
    /// Build an inbound message stamped with the current time.
    pub fn new(
        user_id: impl Into<UserId>,
        display_name: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        let display_name = display_name.into();
        let display_name = if display_name.trim().is_empty() {
            DEFAULT_DISPLAY_NAME.to_string()
        } else {
            display_name
        };
        Self {
            user_id: user_id.into(),
            display_name,
            text: text.into(),
            received_at: Utc::now(),
        }
    }

    /// Whether the text is a slash command.
    pub fn is_command(&self) -> bool {
        self.text.trim_start().starts_with('/')
    }
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_DISPLAY_NAME, InboundMessage};
    use pretty_assertions::assert_eq;

    #[test]
    fn blank_display_name_falls_back_to_default() {
        let message = InboundMessage::new("42", "  ", "hi");
        assert_eq!(message.display_name, DEFAULT_DISPLAY_NAME);
        assert_eq!(message.user_id, "42");
    }

    #[test]
    fn detects_slash_commands() {
        assert!(InboundMessage::new("1", "a", "/help").is_command());
        assert!(InboundMessage::new("1", "a", "  /status").is_command());
        assert!(!InboundMessage::new("1", "a", "hello /there").is_command());
    }
}
