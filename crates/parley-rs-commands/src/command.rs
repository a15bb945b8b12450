//! Command trait definition and descriptor.

use crate::context::CommandContext;
use async_trait::async_trait;
use parley_rs_protocol::CommandError;
use std::collections::BTreeMap;
use std::fmt::Debug;

/// Named arguments passed to a command handler.
pub type CommandArgs = BTreeMap<String, String>;

/// Descriptor for listing and help output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub name: String,
    pub description: String,
    /// Parameter names, in the order the binding table fills them.
    pub parameters: Vec<String>,
}

/// A named operation the registry can dispatch to.
#[async_trait]
pub trait Command: Send + Sync + Debug {
    /// Unique registry key.
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn parameters(&self) -> &[&str] {
        &[]
    }

    /// Run the command. Missing optional arguments fall back to the
    /// command's own defaults.
    async fn call(&self, ctx: &CommandContext, args: CommandArgs) -> Result<String, CommandError>;

    fn spec(&self) -> CommandSpec {
        CommandSpec {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self
                .parameters()
                .iter()
                .map(|param| param.to_string())
                .collect(),
        }
    }
}
