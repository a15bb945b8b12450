//! Telegram front end for parley.
//!
//! The library half of the `parley` binary: HTTP adapters for the
//! completion and web search collaborators, the Telegram long-poll
//! transport and the restart supervisor.

pub mod bot;
pub mod duckduckgo;
pub mod openai;
pub mod supervisor;
pub mod telegram;

/// Re-export for convenience.
pub use parley_rs_commands as commands;
pub use parley_rs_config as config;
pub use parley_rs_core as core;
/// Re-export for convenience.
pub use parley_rs_memory as memory;
/// Re-export for convenience.
pub use parley_rs_protocol as protocol;
