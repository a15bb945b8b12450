//! Error types for memory persistence.

/// Errors raised while reading or writing the memory file.
///
/// These never escape `MemoryStore::append`; they are logged and the
/// in-memory sequence stays authoritative.
#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
