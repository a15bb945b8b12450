//! Error types for the core crate.

use parley_rs_protocol::UserId;
use thiserror::Error;

/// Errors returned while building or driving the orchestrator.
///
/// Request handling itself never fails; these cover setup and the lane
/// plumbing around it.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The worker serving a user's lane stopped before replying.
    #[error("request lane closed (user_id={0})")]
    LaneClosed(UserId),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
