//! Completion collaborator interface.

use async_trait::async_trait;
use parley_rs_protocol::{CompletionError, CompletionRequest};

/// Generates a reply for a prompt. Implementations report transport and
/// provider failures as `CompletionError`; the orchestrator turns those into
/// a fallback reply.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError>;
}
