use async_trait::async_trait;
use parley_rs_core::{Plugin, PluginContext};

/// Appends a fixed suffix to every response.
#[derive(Debug, Clone)]
pub struct AppendPlugin {
    name: String,
    suffix: String,
}

impl AppendPlugin {
    pub fn new(name: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            suffix: suffix.into(),
        }
    }
}

#[async_trait]
impl Plugin for AppendPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    async fn before_response(
        &self,
        _user_id: &str,
        mut response: String,
        _context: &PluginContext,
    ) -> String {
        response.push_str(&self.suffix);
        response
    }
}

/// Panics in both hooks.
#[derive(Debug, Clone)]
pub struct PanickingPlugin {
    name: String,
}

impl PanickingPlugin {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl Plugin for PanickingPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    async fn on_message(
        &self,
        _user_id: &str,
        _message: &str,
        _context: PluginContext,
    ) -> PluginContext {
        panic!("{} message hook crashed", self.name);
    }

    async fn before_response(
        &self,
        _user_id: &str,
        _response: String,
        _context: &PluginContext,
    ) -> String {
        panic!("{} response hook crashed", self.name);
    }
}
