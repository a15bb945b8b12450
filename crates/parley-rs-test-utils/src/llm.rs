use async_trait::async_trait;
use parking_lot::Mutex;
use parley_rs_core::CompletionProvider;
use parley_rs_protocol::{CompletionError, CompletionRequest};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct FixedCompletion {
    response: String,
}

impl FixedCompletion {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
        }
    }
}

#[async_trait]
impl CompletionProvider for FixedCompletion {
    async fn complete(&self, _request: &CompletionRequest) -> Result<String, CompletionError> {
        Ok(self.response.clone())
    }
}

#[derive(Debug, Clone, Default)]
pub struct FailingCompletion;

#[async_trait]
impl CompletionProvider for FailingCompletion {
    async fn complete(&self, _request: &CompletionRequest) -> Result<String, CompletionError> {
        Err(CompletionError::Unavailable("service down".to_string()))
    }
}

#[derive(Debug, Clone, Default)]
pub struct PanickingCompletion;

#[async_trait]
impl CompletionProvider for PanickingCompletion {
    async fn complete(&self, _request: &CompletionRequest) -> Result<String, CompletionError> {
        panic!("completion provider crashed");
    }
}

/// Sleeps before answering; pair with a short completion timeout.
#[derive(Debug, Clone)]
pub struct SlowCompletion {
    delay: Duration,
}

impl SlowCompletion {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl CompletionProvider for SlowCompletion {
    async fn complete(&self, _request: &CompletionRequest) -> Result<String, CompletionError> {
        tokio::time::sleep(self.delay).await;
        Ok("too late".to_string())
    }
}

/// Captures every request and answers with a fixed response.
#[derive(Debug, Clone)]
pub struct RecordingCompletion {
    response: String,
    seen: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl RecordingCompletion {
    pub fn new(response: impl Into<String>) -> (Self, Arc<Mutex<Vec<CompletionRequest>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                response: response.into(),
                seen: seen.clone(),
            },
            seen,
        )
    }
}

#[async_trait]
impl CompletionProvider for RecordingCompletion {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        self.seen.lock().push(request.clone());
        Ok(self.response.clone())
    }
}
