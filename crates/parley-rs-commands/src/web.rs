//! Web search collaborator interface.

use async_trait::async_trait;
use parley_rs_protocol::CommandError;
use serde::{Deserialize, Serialize};

/// Search result returned by a web provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WebSearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// Web search provider. Results come back in provider order; an empty list is
/// a valid answer, not an error.
#[async_trait]
pub trait WebProvider: Send + Sync {
    async fn search(&self, query: &str, limit: usize)
    -> Result<Vec<WebSearchResult>, CommandError>;
}
