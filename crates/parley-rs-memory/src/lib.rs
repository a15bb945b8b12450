//! Bounded, file-backed interaction memory for parley.

pub mod error;
pub mod model;
pub mod store;

/// Memory error type.
pub use error::MemoryError;
/// Memory record model and summary derivation.
pub use model::{MemoryRecord, SUMMARY_MAX_CHARS, summarize};
/// Memory store.
pub use store::MemoryStore;
