//! Request and error types for the generative completion collaborator.

use serde::{Deserialize, Serialize};

/// Single completion request sent to an AI provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompletionRequest {
    /// System instruction for the model.
    pub system_instruction: String,
    /// User prompt assembled by the orchestrator.
    pub prompt: String,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
}

/// Errors returned by completion providers.
#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    /// No provider credentials were configured.
    #[error("completion provider not configured")]
    NotConfigured,
    /// Provider is unreachable or returned a transient failure.
    #[error("completion provider unavailable: {0}")]
    Unavailable(String),
    /// Provider answered with a payload that could not be used.
    #[error("invalid completion response: {0}")]
    InvalidResponse(String),
    /// Provider did not answer within the configured timeout.
    #[error("completion timed out after {0}s")]
    TimedOut(u64),
}
