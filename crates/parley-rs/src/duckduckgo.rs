//! Web search over the DuckDuckGo HTML results page.

use async_trait::async_trait;
use log::debug;
use parley_rs_commands::{WebProvider, WebSearchResult};
use parley_rs_protocol::CommandError;
use scraper::{Html, Selector};
use std::time::Duration;
use url::Url;

const DEFAULT_ENDPOINT: &str = "https://html.duckduckgo.com/html/";
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36";
const REQUEST_TIMEOUT_SECS: u64 = 20;

/// [`WebProvider`] that scrapes DuckDuckGo's JavaScript-free results page.
#[derive(Clone)]
pub struct DuckDuckGoSearch {
    client: reqwest::Client,
    endpoint: String,
}

impl DuckDuckGoSearch {
    /// Client pointed at the public results page.
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            endpoint: DEFAULT_ENDPOINT.to_string(),
        })
    }

    /// Query `endpoint` instead of the public results page.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl WebProvider for DuckDuckGoSearch {
    async fn search(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<WebSearchResult>, CommandError> {
        let url = Url::parse_with_params(&self.endpoint, &[("q", query)])
            .map_err(|err| CommandError::ExecutionFailed(format!("invalid search url: {err}")))?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| CommandError::Unavailable(format!("search request failed: {err}")))?;
        if !response.status().is_success() {
            return Err(CommandError::Unavailable(format!(
                "search returned status {}",
                response.status()
            )));
        }
        let html = response
            .text()
            .await
            .map_err(|err| CommandError::Unavailable(format!("search body read failed: {err}")))?;
        let results = parse_results(&html, limit)?;
        debug!(
            "web search finished (query_len={}, results={})",
            query.len(),
            results.len()
        );
        Ok(results)
    }
}

fn selector(css: &str) -> Result<Selector, CommandError> {
    Selector::parse(css)
        .map_err(|_| CommandError::ExecutionFailed(format!("invalid selector: {css}")))
}

/// Results from a DuckDuckGo HTML page, in page order, at most `limit`.
fn parse_results(html: &str, limit: usize) -> Result<Vec<WebSearchResult>, CommandError> {
    let result_sel = selector(".result")?;
    let link_sel = selector(".result__a")?;
    let snippet_sel = selector(".result__snippet")?;

    let document = Html::parse_document(html);
    let mut results = Vec::new();
    for element in document.select(&result_sel) {
        if results.len() >= limit {
            break;
        }
        let Some(link) = element.select(&link_sel).next() else {
            continue;
        };
        let title = link.text().collect::<String>().trim().to_string();
        let url = normalize_url(link.value().attr("href").unwrap_or(""));
        let snippet = element
            .select(&snippet_sel)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .unwrap_or_default();
        if title.is_empty() || url.is_empty() {
            continue;
        }
        results.push(WebSearchResult {
            title,
            url,
            snippet,
        });
    }
    Ok(results)
}

/// Resolve DuckDuckGo redirect links (`/l/?uddg=<target>`) to the target.
/// Protocol-relative links are treated as https.
fn normalize_url(raw: &str) -> String {
    let absolute = if raw.starts_with("//") {
        format!("https:{raw}")
    } else {
        raw.to_string()
    };
    let Ok(parsed) = Url::parse(&absolute) else {
        return absolute;
    };
    if parsed.domain() == Some("duckduckgo.com")
        && parsed.path().starts_with("/l/")
        && let Some((_, target)) = parsed.query_pairs().find(|(key, _)| key == "uddg")
    {
        return target.into_owned();
    }
    absolute
}
