//! Configuration schema for parley.

use crate::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable holding the Telegram bot token.
pub const ENV_TELEGRAM_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
/// Environment variable holding the AI provider key.
pub const ENV_AI_API_KEY: &str = "OPENAI_API_KEY";
/// Environment variable overriding the AI model name.
pub const ENV_AI_MODEL: &str = "OPENAI_MODEL";
/// Environment variable overriding the AI endpoint base URL.
pub const ENV_AI_BASE_URL: &str = "OPENAI_BASE_URL";
/// Environment variable overriding the workspace root.
pub const ENV_WORKSPACE: &str = "PARLEY_WORKSPACE";

/// Root config for parley.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ParleyConfig {
    #[serde(default, rename = "$schema")]
    pub schema: Option<String>,
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub commands: CommandsConfig,
    #[serde(default)]
    pub workspace: WorkspaceConfig,
    #[serde(default)]
    pub supervisor: SupervisorConfig,
}

impl ParleyConfig {
    /// Apply environment overrides from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply environment overrides using an explicit lookup function.
    ///
    /// Empty values are treated as unset.
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        if let Some(token) = lookup(ENV_TELEGRAM_TOKEN) {
            self.telegram.token = Some(token);
        }
        if let Some(key) = lookup(ENV_AI_API_KEY) {
            self.ai.api_key = Some(key);
        }
        if let Some(model) = lookup(ENV_AI_MODEL) {
            self.ai.model = model;
        }
        if let Some(base_url) = lookup(ENV_AI_BASE_URL) {
            self.ai.base_url = base_url;
        }
        if let Some(root) = lookup(ENV_WORKSPACE) {
            self.workspace.root = root;
        }
        self
    }

    /// Resolve the credentials needed at startup.
    ///
    /// The transport token is required; the AI key is optional and its
    /// absence only disables generated replies.
    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        let telegram_token = self
            .telegram
            .token
            .clone()
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingSetting(ENV_TELEGRAM_TOKEN.to_string()))?;
        let ai_api_key = self
            .ai
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty());
        Ok(Credentials {
            telegram_token,
            ai_api_key,
        })
    }

    /// Workspace root as a path.
    pub fn workspace_root(&self) -> PathBuf {
        PathBuf::from(&self.workspace.root)
    }

    /// Location of the persisted memory file.
    pub fn memory_path(&self) -> PathBuf {
        match &self.memory.path {
            Some(path) => PathBuf::from(path),
            None => self
                .workspace_root()
                .join("memory")
                .join(DEFAULT_MEMORY_FILE),
        }
    }
}

/// Default memory file name under `<workspace>/memory`.
pub const DEFAULT_MEMORY_FILE: &str = "parley_memory.json";

/// Credentials resolved at startup.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Messaging transport token.
    pub telegram_token: String,
    /// Optional AI provider key.
    pub ai_api_key: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("telegram_token", &"[REDACTED]")
            .field("ai_api_key", &self.ai_api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Telegram Bot API transport settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_telegram_api_base")]
    pub api_base: String,
    #[serde(default = "default_polling_timeout_secs")]
    pub polling_timeout_secs: u32,
    #[serde(default = "default_parse_mode")]
    pub parse_mode: Option<String>,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_base: default_telegram_api_base(),
            polling_timeout_secs: default_polling_timeout_secs(),
            parse_mode: default_parse_mode(),
        }
    }
}

fn default_telegram_api_base() -> String {
    "https://api.telegram.org".to_string()
}

fn default_polling_timeout_secs() -> u32 {
    30
}

fn default_parse_mode() -> Option<String> {
    Some("Markdown".to_string())
}

/// Generative completion provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_ai_base_url")]
    pub base_url: String,
    #[serde(default = "default_ai_model")]
    pub model: String,
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_ai_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_ai_base_url(),
            model: default_ai_model(),
            system_prompt: default_system_prompt(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_ai_timeout_secs(),
        }
    }
}

fn default_ai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_ai_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_system_prompt() -> String {
    "You are a helpful assistant. Give useful, accurate answers and reply in the user's language."
        .to_string()
}

fn default_max_tokens() -> u32 {
    500
}

fn default_temperature() -> f32 {
    0.7
}

fn default_ai_timeout_secs() -> u64 {
    60
}

/// Memory store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    #[serde(default)]
    pub path: Option<String>,
    /// Maximum retained records; `null` disables the bound.
    #[serde(default = "default_max_records")]
    pub max_records: Option<usize>,
    /// Number of memory matches included in a completion prompt.
    #[serde(default = "default_recall_k")]
    pub recall_k: usize,
    /// Number of matches shown by the memory search command.
    #[serde(default = "default_search_display")]
    pub search_display: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            path: None,
            max_records: default_max_records(),
            recall_k: default_recall_k(),
            search_display: default_search_display(),
        }
    }
}

fn default_max_records() -> Option<usize> {
    Some(100)
}

fn default_recall_k() -> usize {
    2
}

fn default_search_display() -> usize {
    3
}

/// Command registry settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandsConfig {
    /// Upper bound on a single handler invocation.
    #[serde(default = "default_command_timeout_secs")]
    pub timeout_secs: u64,
    /// Number of results requested from the web search provider.
    #[serde(default = "default_web_results")]
    pub web_results: usize,
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_command_timeout_secs(),
            web_results: default_web_results(),
        }
    }
}

fn default_command_timeout_secs() -> u64 {
    30
}

fn default_web_results() -> usize {
    3
}

/// Workspace used by the filesystem commands and default memory path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    #[serde(default = "default_workspace_root")]
    pub root: String,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            root: default_workspace_root(),
        }
    }
}

fn default_workspace_root() -> String {
    "/tmp/parley_workspace".to_string()
}

/// Restart policy for the top-level run loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupervisorConfig {
    #[serde(default = "default_restart_delay_secs")]
    pub restart_delay_secs: u64,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            restart_delay_secs: default_restart_delay_secs(),
        }
    }
}

fn default_restart_delay_secs() -> u64 {
    10
}

#[cfg(test)]
mod tests {
    use super::{ENV_AI_API_KEY, ENV_TELEGRAM_TOKEN, ENV_WORKSPACE, ParleyConfig};
    use crate::ConfigError;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn missing_transport_token_is_reported_by_name() {
        let config = ParleyConfig::default();
        let err = config.credentials().unwrap_err();
        let ConfigError::MissingSetting(name) = err else {
            panic!("expected missing setting");
        };
        assert_eq!(name, ENV_TELEGRAM_TOKEN);
    }

    #[test]
    fn ai_key_is_optional() {
        let config =
            ParleyConfig::default().with_overrides_from(lookup(&[(ENV_TELEGRAM_TOKEN, "123:abc")]));
        let credentials = config.credentials().expect("credentials");
        assert_eq!(credentials.telegram_token, "123:abc");
        assert_eq!(credentials.ai_api_key, None);
    }

    #[test]
    fn blank_env_values_are_ignored() {
        let config = ParleyConfig::default().with_overrides_from(lookup(&[
            (ENV_TELEGRAM_TOKEN, "   "),
            (ENV_AI_API_KEY, ""),
        ]));
        assert!(config.telegram.token.is_none());
        assert!(config.ai.api_key.is_none());
    }

    #[test]
    fn memory_path_defaults_under_workspace() {
        let config =
            ParleyConfig::default().with_overrides_from(lookup(&[(ENV_WORKSPACE, "/srv/parley")]));
        assert_eq!(
            config.memory_path(),
            PathBuf::from("/srv/parley/memory/parley_memory.json")
        );
    }

    #[test]
    fn credentials_debug_redacts_secrets() {
        let config = ParleyConfig::default().with_overrides_from(lookup(&[
            (ENV_TELEGRAM_TOKEN, "secret-token"),
            (ENV_AI_API_KEY, "sk-secret"),
        ]));
        let rendered = format!("{:?}", config.credentials().expect("credentials"));
        assert!(!rendered.contains("secret-token"));
        assert!(!rendered.contains("sk-secret"));
    }
}
