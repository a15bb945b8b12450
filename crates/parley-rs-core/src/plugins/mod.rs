//! Message and response hooks run around every request.
//!
//! Plugins run in registration order. Each `on_message` hook receives the
//! context produced by the previous plugin, and each `before_response` hook
//! receives the previous plugin's output, so later plugins see earlier
//! plugins' changes. A hook that panics is skipped: the value it was given
//! passes through unchanged.

mod arabic;

pub use arabic::ArabicScriptPlugin;

use async_trait::async_trait;
use futures_util::FutureExt;
use log::{debug, warn};
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// Scratch space shared by the plugins for one message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PluginContext {
    values: BTreeMap<String, Value>,
}

impl PluginContext {
    /// Empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw value for `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// String value for `key`, if present and a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    /// Set `key`, replacing any earlier value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A message/response transformer. Both hooks default to the identity, so a
/// plugin only overrides what it needs.
#[async_trait]
pub trait Plugin: Send + Sync {
    fn name(&self) -> &str;

    async fn on_message(
        &self,
        _user_id: &str,
        _message: &str,
        context: PluginContext,
    ) -> PluginContext {
        context
    }

    async fn before_response(
        &self,
        _user_id: &str,
        response: String,
        _context: &PluginContext,
    ) -> String {
        response
    }
}

/// Ordered plugin list.
#[derive(Default, Clone)]
pub struct PluginChain {
    plugins: Arc<RwLock<Vec<Arc<dyn Plugin>>>>,
}

impl PluginChain {
    /// Empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Chain with the plugins parley ships with.
    pub fn with_builtins() -> Self {
        let chain = Self::new();
        chain.register(Arc::new(ArabicScriptPlugin));
        chain
    }

    /// Append a plugin; it runs after every plugin registered before it.
    pub fn register(&self, plugin: Arc<dyn Plugin>) {
        debug!("registered plugin (name={})", plugin.name());
        self.plugins.write().push(plugin);
    }

    pub fn len(&self) -> usize {
        self.plugins.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn names(&self) -> Vec<String> {
        self.plugins
            .read()
            .iter()
            .map(|plugin| plugin.name().to_string())
            .collect()
    }

    fn snapshot(&self) -> Vec<Arc<dyn Plugin>> {
        self.plugins.read().clone()
    }

    /// Fold every plugin's message hook over `context`.
    pub async fn run_on_message(
        &self,
        user_id: &str,
        message: &str,
        mut context: PluginContext,
    ) -> PluginContext {
        for plugin in self.snapshot() {
            let hook = plugin.on_message(user_id, message, context.clone());
            match AssertUnwindSafe(hook).catch_unwind().await {
                Ok(next) => context = next,
                Err(_) => warn!(
                    "plugin message hook panicked; skipping (plugin={}, user_id={})",
                    plugin.name(),
                    user_id
                ),
            }
        }
        context
    }

    /// Fold every plugin's response hook over `response`.
    pub async fn run_on_response(
        &self,
        user_id: &str,
        mut response: String,
        context: &PluginContext,
    ) -> String {
        for plugin in self.snapshot() {
            let hook = plugin.before_response(user_id, response.clone(), context);
            match AssertUnwindSafe(hook).catch_unwind().await {
                Ok(next) => response = next,
                Err(_) => warn!(
                    "plugin response hook panicked; skipping (plugin={}, user_id={})",
                    plugin.name(),
                    user_id
                ),
            }
        }
        response
    }
}
