//! Built-in commands bundled with parley.

mod challenge;
mod filesystem;
mod memory;
mod system;
mod utils;
mod web;

use crate::CommandRegistry;
use log::info;
use std::sync::Arc;

pub use challenge::{ChallengeCommand, DEFAULT_CHALLENGE_LEVEL, parse_level};
pub use filesystem::{ListFilesCommand, WriteFileCommand};
pub use memory::SearchMemoryCommand;
pub use system::{HostUsage, SystemInfoCommand};
pub use web::WebSearchCommand;

/// Register all built-in commands with the provided registry.
pub fn register_builtin_commands(registry: &CommandRegistry) {
    registry.register(Arc::new(ListFilesCommand));
    registry.register(Arc::new(WriteFileCommand));
    registry.register(Arc::new(SearchMemoryCommand));
    registry.register(Arc::new(SystemInfoCommand));
    registry.register(Arc::new(WebSearchCommand));
    registry.register(Arc::new(ChallengeCommand));
    info!("registered built-in commands (count={})", registry.len());
}

/// Build a registry pre-populated with built-in commands.
pub fn builtin_command_registry() -> CommandRegistry {
    let registry = CommandRegistry::new();
    register_builtin_commands(&registry);
    registry
}
