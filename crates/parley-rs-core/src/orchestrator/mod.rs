//! Orchestrator core.
//!
//! Every inbound message walks the same stages in order: received,
//! pre-processed, dispatched, post-processed, recorded, replied. Dispatch
//! failures degrade to a fixed reply, so every request ends with text for
//! the user.

mod dispatch;
pub mod prompt;

use crate::error::CoreError;
use crate::llm::CompletionProvider;
use crate::plugins::{PluginChain, PluginContext};
use crate::sessions::{Session, SessionTable};
use futures_util::FutureExt;
use log::{debug, info, warn};
use parley_rs_commands::{
    BindingTable, CommandRegistry, CommandServices, WebProvider, builtin_command_registry,
};
use parley_rs_config::ParleyConfig;
use parley_rs_memory::MemoryStore;
use parley_rs_protocol::{CompletionError, CompletionRequest, InboundMessage, RequestId};
use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Reply used for free text when no completion provider is configured.
pub const NO_AI_REPLY: &str = "💡 I'm here to help! Use /help to get started.";
/// Reply used when the completion provider fails or times out.
pub const FALLBACK_REPLY: &str = "⚠️ Sorry, something went wrong while processing your message.";

const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful assistant. Give useful, accurate answers and reply in the user's language.";

/// Stages a request passes through, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStage {
    Received,
    PreProcessed,
    Dispatched,
    PostProcessed,
    Recorded,
    Replied,
}

/// What produced the reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    Conversation,
    Command,
}

impl ReplyKind {
    fn as_str(self) -> &'static str {
        match self {
            ReplyKind::Conversation => "conversation",
            ReplyKind::Command => "command",
        }
    }
}

/// Final result of one request.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub request_id: RequestId,
    pub text: String,
    pub kind: ReplyKind,
    /// Stages the request went through, in order.
    pub stages: Vec<RequestStage>,
}

/// Completion parameters used for free-text messages.
#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    pub system_prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub completion_timeout: Duration,
    /// Memory matches included in the prompt.
    pub recall_k: usize,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            max_tokens: 500,
            temperature: 0.7,
            completion_timeout: Duration::from_secs(60),
            recall_k: 2,
        }
    }
}

impl From<&ParleyConfig> for OrchestratorSettings {
    fn from(config: &ParleyConfig) -> Self {
        Self {
            system_prompt: config.ai.system_prompt.clone(),
            max_tokens: config.ai.max_tokens,
            temperature: config.ai.temperature,
            completion_timeout: Duration::from_secs(config.ai.timeout_secs),
            recall_k: config.memory.recall_k,
        }
    }
}

/// Owns the per-process state and runs requests through it.
pub struct Orchestrator {
    sessions: SessionTable,
    commands: CommandRegistry,
    bindings: BindingTable,
    plugins: PluginChain,
    completion: Option<Arc<dyn CompletionProvider>>,
    command_services: Arc<CommandServices>,
    settings: OrchestratorSettings,
}

impl Orchestrator {
    /// Orchestrator over `commands`, with the built-in binding table, no
    /// plugins and no completion provider.
    pub fn new(command_services: Arc<CommandServices>, commands: CommandRegistry) -> Self {
        Self {
            sessions: SessionTable::new(),
            commands,
            bindings: BindingTable::builtin(),
            plugins: PluginChain::new(),
            completion: None,
            command_services,
            settings: OrchestratorSettings::default(),
        }
    }

    /// Build the full runtime from config: workspace directory, built-in
    /// commands and built-in plugins over `memory`.
    ///
    /// The caller owns the store. Every orchestrator in a process must share
    /// the one instance, since each instance rewrites the whole file.
    pub fn from_config(
        config: &ParleyConfig,
        memory: Arc<MemoryStore>,
        completion: Option<Arc<dyn CompletionProvider>>,
        web: Option<Arc<dyn WebProvider>>,
    ) -> Result<Self, CoreError> {
        let workspace_root = config.workspace_root();
        std::fs::create_dir_all(&workspace_root)?;
        let services = CommandServices {
            workspace_root,
            memory,
            web,
            timeout: Duration::from_secs(config.commands.timeout_secs),
            search_display: config.memory.search_display,
            web_results: config.commands.web_results,
        };
        let orchestrator = Self::new(Arc::new(services), builtin_command_registry())
            .with_plugins(PluginChain::with_builtins())
            .with_settings(OrchestratorSettings::from(config));
        let orchestrator = match completion {
            Some(provider) => orchestrator.with_completion(provider),
            None => orchestrator,
        };
        info!(
            "orchestrator ready (commands={}, plugins={}, memories={}, ai={})",
            orchestrator.commands.len(),
            orchestrator.plugins.len(),
            orchestrator.memory().count(),
            orchestrator.completion.is_some()
        );
        Ok(orchestrator)
    }

    /// Answer free text with `provider`.
    pub fn with_completion(mut self, provider: Arc<dyn CompletionProvider>) -> Self {
        self.completion = Some(provider);
        self
    }

    /// Replace the plugin chain.
    pub fn with_plugins(mut self, plugins: PluginChain) -> Self {
        self.plugins = plugins;
        self
    }

    /// Replace the argument binding table.
    pub fn with_bindings(mut self, bindings: BindingTable) -> Self {
        self.bindings = bindings;
        self
    }

    /// Replace the completion settings.
    pub fn with_settings(mut self, settings: OrchestratorSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Per-user session state.
    pub fn sessions(&self) -> &SessionTable {
        &self.sessions
    }

    /// Store every exchange is recorded in.
    pub fn memory(&self) -> &Arc<MemoryStore> {
        &self.command_services.memory
    }

    pub fn commands(&self) -> &CommandRegistry {
        &self.commands
    }

    pub fn plugins(&self) -> &PluginChain {
        &self.plugins
    }

    /// Run one message through every stage and return the reply.
    pub async fn handle(&self, message: InboundMessage) -> Reply {
        let request_id = Uuid::new_v4();
        let mut stages = Vec::with_capacity(6);

        self.sessions.touch(&message.user_id, &message.display_name);
        let session = self.sessions.increment(&message.user_id);
        stages.push(RequestStage::Received);
        debug!(
            "request received (request_id={}, user_id={}, message_count={})",
            request_id, message.user_id, session.message_count
        );

        let mut context = PluginContext::new();
        context.insert("user_id", message.user_id.clone());
        context.insert("timestamp", message.received_at.to_rfc3339());
        let context = self
            .plugins
            .run_on_message(&message.user_id, &message.text, context)
            .await;
        stages.push(RequestStage::PreProcessed);

        let (response, kind) = if message.is_command() {
            (
                self.dispatch_slash(&message, &session).await,
                ReplyKind::Command,
            )
        } else {
            (
                self.converse(request_id, &message, &session).await,
                ReplyKind::Conversation,
            )
        };
        stages.push(RequestStage::Dispatched);

        let response = self
            .plugins
            .run_on_response(&message.user_id, response, &context)
            .await;
        stages.push(RequestStage::PostProcessed);

        let mut metadata = BTreeMap::new();
        metadata.insert("user_id".to_string(), message.user_id.clone());
        metadata.insert("type".to_string(), kind.as_str().to_string());
        let memory = self.memory().clone();
        let content = format!("user: {}\nassistant: {}", message.text, response);
        if let Err(err) =
            tokio::task::spawn_blocking(move || memory.append(content, metadata)).await
        {
            warn!(
                "memory append aborted (request_id={}, err={})",
                request_id, err
            );
        }
        stages.push(RequestStage::Recorded);

        stages.push(RequestStage::Replied);
        info!(
            "request replied (request_id={}, user_id={}, kind={}, reply_len={})",
            request_id,
            message.user_id,
            kind.as_str(),
            response.len()
        );
        Reply {
            request_id,
            text: response,
            kind,
            stages,
        }
    }

    /// Free-text path: ask the completion provider, or fall back.
    async fn converse(
        &self,
        request_id: RequestId,
        message: &InboundMessage,
        session: &Session,
    ) -> String {
        let Some(provider) = &self.completion else {
            return NO_AI_REPLY.to_string();
        };
        let memories = self.memory().search(&message.text, self.settings.recall_k);
        let request = CompletionRequest {
            system_instruction: self.settings.system_prompt.clone(),
            prompt: prompt::build_prompt(&message.text, &session.display_name, &memories),
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
        };
        debug!(
            "requesting completion (request_id={}, prompt_len={}, recalled={})",
            request_id,
            request.prompt.len(),
            memories.len()
        );

        let timeout = self.settings.completion_timeout;
        let call = AssertUnwindSafe(provider.complete(&request)).catch_unwind();
        let outcome = match tokio::time::timeout(timeout, call).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(CompletionError::Unavailable(
                "provider panicked".to_string(),
            )),
            Err(_) => Err(CompletionError::TimedOut(timeout.as_secs())),
        };
        match outcome {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => {
                warn!("completion was empty (request_id={})", request_id);
                FALLBACK_REPLY.to_string()
            }
            Err(err) => {
                warn!(
                    "completion failed; using fallback (request_id={}, err={})",
                    request_id, err
                );
                FALLBACK_REPLY.to_string()
            }
        }
    }
}
