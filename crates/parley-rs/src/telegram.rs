//! Telegram Bot API transport: long polling in, placeholder-then-edit out.

use log::{debug, info, warn};
use parley_rs_config::TelegramConfig;
use parley_rs_core::{FALLBACK_REPLY, ReplyHandle, UserLanes};
use parley_rs_protocol::InboundMessage;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

/// Text shown while a request is in flight.
pub const PROCESSING_PLACEHOLDER: &str = "🔄 Processing…";
/// Longest text Telegram accepts in one message.
pub const MAX_MESSAGE_CHARS: usize = 4096;
const API_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, thiserror::Error)]
pub enum TelegramError {
    #[error("telegram request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("telegram api error (code={code}): {description}")]
    Api { code: i64, description: String },
    #[error("unexpected telegram response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl TelegramError {
    /// The bot token was rejected.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, TelegramError::Api { code: 401, .. })
    }

    /// The text could not be parsed with the requested parse mode.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            TelegramError::Api { code: 400, description } if description.contains("can't parse entities")
        )
    }

    fn is_not_modified(&self) -> bool {
        matches!(
            self,
            TelegramError::Api { description, .. } if description.contains("message is not modified")
        )
    }
}

#[derive(Debug, Deserialize)]
struct TelegramResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
    error_code: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    pub from: Option<User>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub first_name: String,
    pub username: Option<String>,
}

/// Decode a Bot API response body. Telegram reports failures in the body
/// (`ok: false`) alongside a non-2xx status, so the status is not consulted.
fn decode_response<T: DeserializeOwned>(body: &str) -> Result<T, TelegramError> {
    let response: TelegramResponse<T> = serde_json::from_str(body)?;
    if !response.ok {
        return Err(TelegramError::Api {
            code: response.error_code.unwrap_or_default(),
            description: response.description.unwrap_or_default(),
        });
    }
    response.result.ok_or_else(|| TelegramError::Api {
        code: 0,
        description: "ok response without result".to_string(),
    })
}

/// Chat id and inbound message for a text update from a user. Other updates
/// yield `None`.
pub fn inbound_from_update(update: &Update) -> Option<(i64, InboundMessage)> {
    let message = update.message.as_ref()?;
    let from = message.from.as_ref()?;
    let text = message.text.as_deref()?;
    if text.trim().is_empty() {
        return None;
    }
    let display_name = if from.first_name.trim().is_empty() {
        from.username.clone().unwrap_or_default()
    } else {
        from.first_name.clone()
    };
    Some((
        message.chat.id,
        InboundMessage::new(from.id.to_string(), display_name, text),
    ))
}

/// Cut `text` to Telegram's message limit.
pub fn clamp_message(text: &str) -> String {
    if text.chars().count() <= MAX_MESSAGE_CHARS {
        return text.to_string();
    }
    let mut clamped: String = text.chars().take(MAX_MESSAGE_CHARS - 1).collect();
    clamped.push('…');
    clamped
}

/// Bot API client. The update offset survives transport restarts.
pub struct TelegramClient {
    client: reqwest::Client,
    base_url: String,
    polling_timeout_secs: u32,
    parse_mode: Option<String>,
    next_offset: AtomicI64,
}

impl TelegramClient {
    pub fn new(config: &TelegramConfig, token: &str) -> Result<Self, TelegramError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            base_url: format!("{}/bot{}", config.api_base.trim_end_matches('/'), token),
            polling_timeout_secs: config.polling_timeout_secs,
            parse_mode: config.parse_mode.clone(),
            next_offset: AtomicI64::new(0),
        })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &Value,
        timeout: Duration,
    ) -> Result<T, TelegramError> {
        let url = format!("{}/{}", self.base_url, method);
        let body = self
            .client
            .post(&url)
            .json(params)
            .timeout(timeout)
            .send()
            .await?
            .text()
            .await?;
        decode_response(&body)
    }

    /// Long-poll for new updates and advance the offset past them.
    pub async fn get_updates(&self) -> Result<Vec<Update>, TelegramError> {
        let params = json!({
            "offset": self.next_offset.load(Ordering::SeqCst),
            "timeout": self.polling_timeout_secs,
            "allowed_updates": ["message"],
        });
        let timeout = Duration::from_secs(u64::from(self.polling_timeout_secs) + 10);
        let updates: Vec<Update> = self.call("getUpdates", &params, timeout).await?;
        if let Some(last) = updates.iter().map(|update| update.update_id).max() {
            self.next_offset.store(last + 1, Ordering::SeqCst);
        }
        Ok(updates)
    }

    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        parse_mode: Option<&str>,
    ) -> Result<Message, TelegramError> {
        let mut params = json!({ "chat_id": chat_id, "text": text });
        if let Some(mode) = parse_mode {
            params["parse_mode"] = Value::String(mode.to_string());
        }
        self.call(
            "sendMessage",
            &params,
            Duration::from_secs(API_TIMEOUT_SECS),
        )
        .await
    }

    pub async fn edit_message_text(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        parse_mode: Option<&str>,
    ) -> Result<(), TelegramError> {
        let mut params = json!({ "chat_id": chat_id, "message_id": message_id, "text": text });
        if let Some(mode) = parse_mode {
            params["parse_mode"] = Value::String(mode.to_string());
        }
        let _: Value = self
            .call(
                "editMessageText",
                &params,
                Duration::from_secs(API_TIMEOUT_SECS),
            )
            .await?;
        Ok(())
    }

    /// Show the placeholder, wait for the reply, then swap it in.
    pub async fn respond(&self, chat_id: i64, handle: ReplyHandle) {
        let placeholder = match self
            .send_message(chat_id, PROCESSING_PLACEHOLDER, None)
            .await
        {
            Ok(message) => Some(message.message_id),
            Err(err) => {
                warn!(
                    "failed to send placeholder (chat_id={}, err={})",
                    chat_id, err
                );
                None
            }
        };
        let text = match handle.wait().await {
            Ok(reply) => reply.text,
            Err(err) => {
                warn!("reply lost (chat_id={}, err={})", chat_id, err);
                FALLBACK_REPLY.to_string()
            }
        };
        self.deliver(chat_id, placeholder, &clamp_message(&text))
            .await;
    }

    async fn deliver(&self, chat_id: i64, placeholder: Option<i64>, text: &str) {
        let parse_mode = self.parse_mode.as_deref();
        let result = self.put_text(chat_id, placeholder, text, parse_mode).await;
        let result = match result {
            Err(err) if err.is_parse_error() && parse_mode.is_some() => {
                debug!(
                    "formatted reply rejected; resending as plain text (chat_id={})",
                    chat_id
                );
                self.put_text(chat_id, placeholder, text, None).await
            }
            other => other,
        };
        match result {
            Ok(()) => {}
            Err(err) if err.is_not_modified() => {}
            Err(err) => warn!("failed to deliver reply (chat_id={}, err={})", chat_id, err),
        }
    }

    async fn put_text(
        &self,
        chat_id: i64,
        placeholder: Option<i64>,
        text: &str,
        parse_mode: Option<&str>,
    ) -> Result<(), TelegramError> {
        match placeholder {
            Some(message_id) => {
                self.edit_message_text(chat_id, message_id, text, parse_mode)
                    .await
            }
            None => self.send_message(chat_id, text, parse_mode).await.map(|_| ()),
        }
    }
}

/// Poll until the API fails. Each text message is queued on its sender's
/// lane in update order and answered on its own task.
pub async fn serve(client: Arc<TelegramClient>, lanes: Arc<UserLanes>) -> Result<(), TelegramError> {
    info!(
        "telegram polling started (timeout_secs={})",
        client.polling_timeout_secs
    );
    loop {
        let updates = client.get_updates().await?;
        for update in updates {
            let Some((chat_id, message)) = inbound_from_update(&update) else {
                debug!("skipping non-text update (update_id={})", update.update_id);
                continue;
            };
            debug!(
                "update received (update_id={}, user_id={})",
                update.update_id, message.user_id
            );
            let handle = lanes.enqueue(message);
            let client = client.clone();
            tokio::spawn(async move {
                client.respond(chat_id, handle).await;
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        MAX_MESSAGE_CHARS, Message, TelegramError, Update, clamp_message, decode_response,
        inbound_from_update,
    };
    use pretty_assertions::assert_eq;

    fn update(json: &str) -> Update {
        serde_json::from_str(json).expect("update")
    }

    #[test]
    fn text_updates_become_inbound_messages() {
        let update = update(
            r#"{"update_id":7,"message":{"message_id":3,"date":0,
                "chat":{"id":-100,"type":"private"},
                "from":{"id":42,"is_bot":false,"first_name":"Ada","username":"ada"},
                "text":"/cmd list_files ."}}"#,
        );
        let (chat_id, message) = inbound_from_update(&update).expect("inbound");
        assert_eq!(chat_id, -100);
        assert_eq!(message.user_id, "42");
        assert_eq!(message.display_name, "Ada");
        assert_eq!(message.text, "/cmd list_files .");
    }

    #[test]
    fn non_text_updates_are_skipped() {
        let photo = update(
            r#"{"update_id":8,"message":{"message_id":4,"chat":{"id":1},
                "from":{"id":42,"first_name":"Ada"}}}"#,
        );
        assert!(inbound_from_update(&photo).is_none());
        let edited = update(r#"{"update_id":9}"#);
        assert!(inbound_from_update(&edited).is_none());
    }

    #[test]
    fn api_errors_are_classified() {
        let err = decode_response::<Message>(
            r#"{"ok":false,"error_code":400,"description":"Bad Request: can't parse entities: Can't find end of the entity"}"#,
        )
        .unwrap_err();
        assert!(err.is_parse_error());

        let err = decode_response::<Vec<Update>>(
            r#"{"ok":false,"error_code":401,"description":"Unauthorized"}"#,
        )
        .unwrap_err();
        assert!(err.is_unauthorized());

        let err = decode_response::<Vec<Update>>("<html>bad gateway</html>").unwrap_err();
        assert!(matches!(err, TelegramError::Decode(_)));
    }

    #[test]
    fn successful_responses_yield_results() {
        let updates = decode_response::<Vec<Update>>(r#"{"ok":true,"result":[]}"#).expect("ok");
        assert!(updates.is_empty());
    }

    #[test]
    fn long_replies_are_clamped() {
        let long = "a".repeat(MAX_MESSAGE_CHARS + 10);
        let clamped = clamp_message(&long);
        assert_eq!(clamped.chars().count(), MAX_MESSAGE_CHARS);
        assert!(clamped.ends_with('…'));
        assert_eq!(clamp_message("short"), "short");
    }
}
