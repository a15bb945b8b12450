use async_trait::async_trait;
use parking_lot::Mutex;
use parley_rs_commands::{WebProvider, WebSearchResult};
use parley_rs_protocol::CommandError;
use std::sync::Arc;

/// Returns canned results (truncated to the requested limit) and records the
/// queries it saw.
#[derive(Debug, Clone, Default)]
pub struct StubWebProvider {
    results: Vec<WebSearchResult>,
    queries: Arc<Mutex<Vec<String>>>,
}

impl StubWebProvider {
    pub fn new(results: Vec<WebSearchResult>) -> Self {
        Self {
            results,
            queries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// One result per title, with `https://example.com/<n>` URLs.
    pub fn with_titles(titles: &[&str]) -> Self {
        Self::new(
            titles
                .iter()
                .enumerate()
                .map(|(idx, title)| WebSearchResult {
                    title: title.to_string(),
                    url: format!("https://example.com/{idx}"),
                    snippet: String::new(),
                })
                .collect(),
        )
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().clone()
    }
}

#[async_trait]
impl WebProvider for StubWebProvider {
    async fn search(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<WebSearchResult>, CommandError> {
        self.queries.lock().push(query.to_string());
        Ok(self.results.iter().take(limit).cloned().collect())
    }
}
