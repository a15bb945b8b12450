//! Error type shared by the command registry and command handlers.

/// Errors returned by command lookup and command handlers.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// Command name was not found in the registry.
    #[error("command not found: {0}")]
    CommandNotFound(String),
    /// Command received invalid arguments.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
    /// Command execution failed.
    #[error("execution failed: {0}")]
    ExecutionFailed(String),
    /// An external collaborator (search provider, filesystem) is unavailable.
    #[error("collaborator unavailable: {0}")]
    Unavailable(String),
    /// Command exceeded the configured timeout.
    #[error("timed out after {0}s")]
    TimedOut(u64),
}
