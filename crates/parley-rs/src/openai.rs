//! Chat-completions client for OpenAI-compatible endpoints.

use async_trait::async_trait;
use log::debug;
use parley_rs_config::AiConfig;
use parley_rs_core::CompletionProvider;
use parley_rs_protocol::{CompletionError, CompletionRequest};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

/// Completion provider backed by `POST {base_url}/chat/completions`.
#[derive(Clone)]
pub struct OpenAiCompletion {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    timeout_secs: u64,
}

impl OpenAiCompletion {
    /// Client for `config.base_url`. A blank `api_key` is `NotConfigured`.
    pub fn new(config: &AiConfig, api_key: impl Into<String>) -> Result<Self, CompletionError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(CompletionError::NotConfigured);
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|err| CompletionError::Unavailable(format!("http client: {err}")))?;
        Ok(Self {
            client,
            endpoint: chat_completions_url(&config.base_url),
            api_key,
            model: config.model.clone(),
            timeout_secs: config.timeout_secs,
        })
    }

    /// Model name sent with every request.
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl CompletionProvider for OpenAiCompletion {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": request.system_instruction },
                { "role": "user", "content": request.prompt }
            ],
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
        });
        debug!(
            "sending chat completion (model={}, prompt_len={})",
            self.model,
            request.prompt.len()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    CompletionError::TimedOut(self.timeout_secs)
                } else {
                    CompletionError::Unavailable(err.to_string())
                }
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| CompletionError::InvalidResponse(format!("body read failed: {err}")))?;
        if !status.is_success() {
            return Err(CompletionError::Unavailable(format!(
                "status {}: {}",
                status.as_u16(),
                error_message(&text)
            )));
        }
        parse_completion(&text)
    }
}

fn chat_completions_url(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim_end_matches('/'))
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Text of the first choice.
fn parse_completion(body: &str) -> Result<String, CompletionError> {
    let parsed: ChatCompletionResponse = serde_json::from_str(body)
        .map_err(|err| CompletionError::InvalidResponse(err.to_string()))?;
    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| CompletionError::InvalidResponse("no choices returned".to_string()))
}

/// Provider error message, or the raw body when it is not the usual envelope.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => envelope.error.message,
        Err(_) => body.chars().take(200).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::{OpenAiCompletion, chat_completions_url, error_message, parse_completion};
    use parley_rs_config::AiConfig;
    use parley_rs_protocol::CompletionError;
    use pretty_assertions::assert_eq;

    #[test]
    fn endpoint_joins_without_double_slash() {
        assert_eq!(
            chat_completions_url("https://api.openai.com/v1/"),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn blank_api_key_is_not_configured() {
        let err = OpenAiCompletion::new(&AiConfig::default(), "  ")
            .err()
            .expect("blank key rejected");
        assert!(matches!(err, CompletionError::NotConfigured));
        let client = OpenAiCompletion::new(&AiConfig::default(), "sk-test").expect("client");
        assert_eq!(client.model(), "gpt-3.5-turbo");
    }

    #[test]
    fn first_choice_content_is_returned() {
        let body = r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"Hi!"}}]}"#;
        assert_eq!(parse_completion(body).expect("content"), "Hi!");
    }

    #[test]
    fn empty_choices_are_invalid() {
        let err = parse_completion(r#"{"choices":[]}"#).unwrap_err();
        assert!(matches!(err, CompletionError::InvalidResponse(_)));
        let err = parse_completion("not json").unwrap_err();
        assert!(matches!(err, CompletionError::InvalidResponse(_)));
    }

    #[test]
    fn error_envelope_message_is_extracted() {
        let body = r#"{"error":{"message":"Incorrect API key","type":"invalid_request_error"}}"#;
        assert_eq!(error_message(body), "Incorrect API key");
        assert_eq!(error_message("gateway down"), "gateway down");
    }
}
