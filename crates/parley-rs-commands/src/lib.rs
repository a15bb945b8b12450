//! Command registry, argument binding and built-in commands for parley.

pub mod binding;
pub mod builtins;
pub mod command;
pub mod context;
pub mod registry;
pub mod web;

/// Positional-to-named argument binding.
pub use binding::{ArgumentRule, BindingTable, Invocation, parse_invocation, tokenize};
/// Built-in command registry and registration helper.
pub use builtins::{HostUsage, builtin_command_registry, register_builtin_commands};
/// Command trait and descriptor.
pub use command::{Command, CommandArgs, CommandSpec};
/// Command execution context.
pub use context::{CommandContext, CommandServices};
/// Command registry type.
pub use registry::CommandRegistry;
/// Web provider types.
pub use web::{WebProvider, WebSearchResult};
