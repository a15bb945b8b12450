//! Command execution context.

use crate::web::WebProvider;
use parley_rs_memory::MemoryStore;
use parley_rs_protocol::UserId;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Long-lived collaborators shared by every command invocation.
pub struct CommandServices {
    /// Root that filesystem commands are confined to.
    pub workspace_root: PathBuf,
    /// Interaction memory; commands only read from it.
    pub memory: Arc<MemoryStore>,
    /// Optional web search provider.
    pub web: Option<Arc<dyn WebProvider>>,
    /// Upper bound on a single handler invocation.
    pub timeout: Duration,
    /// Matches shown by `search_memory`.
    pub search_display: usize,
    /// Results requested by `web_search`.
    pub web_results: usize,
}

impl CommandServices {
    /// Services with default limits and no web provider.
    pub fn new(workspace_root: impl Into<PathBuf>, memory: Arc<MemoryStore>) -> Self {
        Self {
            workspace_root: workspace_root.into(),
            memory,
            web: None,
            timeout: Duration::from_secs(30),
            search_display: 3,
            web_results: 3,
        }
    }

    /// Attach a web search provider.
    pub fn with_web(mut self, web: Arc<dyn WebProvider>) -> Self {
        self.web = Some(web);
        self
    }

    /// Override the per-invocation timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Context handed to a command for one invocation.
///
/// Cloning is cheap; the services live behind an `Arc`.
#[derive(Clone)]
pub struct CommandContext {
    /// User that issued the command, when known.
    pub user_id: Option<UserId>,
    pub services: Arc<CommandServices>,
}

impl CommandContext {
    /// Context with no issuing user.
    pub fn new(services: Arc<CommandServices>) -> Self {
        Self {
            user_id: None,
            services,
        }
    }

    /// Context for a command issued by `user_id`.
    pub fn for_user(services: Arc<CommandServices>, user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            services,
        }
    }
}
