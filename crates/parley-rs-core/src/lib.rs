//! Request orchestration for parley.
//!
//! This crate owns the session table, the plugin chain, the completion
//! collaborator interface and the orchestrator that threads every inbound
//! message through them.

pub mod error;
pub mod lanes;
pub mod llm;
pub mod orchestrator;
pub mod plugins;
pub mod sessions;

pub use error::CoreError;
pub use lanes::{ReplyHandle, UserLanes};
pub use llm::CompletionProvider;
/// Orchestrator facade and per-request types.
pub use orchestrator::{
    FALLBACK_REPLY, NO_AI_REPLY, Orchestrator, OrchestratorSettings, Reply, ReplyKind,
    RequestStage, prompt::build_prompt,
};
/// Plugin hooks and the built-in script detector.
pub use plugins::{ArabicScriptPlugin, Plugin, PluginChain, PluginContext};
pub use sessions::{Session, SessionTable};
