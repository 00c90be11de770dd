//! DuckDuckGo web search tool.
//!
//! Scrapes the HTML results page rather than calling an API; DuckDuckGo has
//! no official search API. Returns at most `max_results` result snippets.

use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};

use super::ToolExecutor;
use crate::error::PlannerError;

const SEARCH_URL: &str = "https://html.duckduckgo.com/html/";
const USER_AGENT: &str = "Mozilla/5.0 (compatible; itinera/0.1)";

/// Web-search tool returning a bounded number of result snippets.
pub struct DuckDuckGoSearch {
    client: Client,
    max_results: usize,
}

impl DuckDuckGoSearch {
    /// Creates a search tool capped at `max_results` snippets per query.
    pub fn new(max_results: usize) -> Result<Self, PlannerError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| PlannerError::HttpError(e.to_string()))?;
        Ok(Self {
            client,
            max_results,
        })
    }
}

/// Extracts result snippets from a DuckDuckGo HTML results page.
fn parse_snippets(html: &str, max_results: usize) -> Vec<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(".result__snippet").expect("static selector");
    document
        .select(&selector)
        .map(|el| el.text().collect::<Vec<_>>().join("").trim().to_string())
        .filter(|s| !s.is_empty())
        .take(max_results)
        .collect()
}

#[async_trait]
impl ToolExecutor for DuckDuckGoSearch {
    fn name(&self) -> &str {
        "duckduckgo_search"
    }

    fn description(&self) -> &str {
        "Search the web for current information such as events, prices and schedules. \
         Input should be a search query."
    }

    async fn call(&self, query: &str) -> Result<String, PlannerError> {
        let response = self
            .client
            .get(SEARCH_URL)
            .query(&[("q", query)])
            .send()
            .await
            .map_err(|e| PlannerError::ToolError(format!("duckduckgo request failed: {e}")))?;

        log::debug!("DuckDuckGo HTTP status: {}", response.status());

        if !response.status().is_success() {
            return Err(PlannerError::ToolError(format!(
                "duckduckgo returned status {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| PlannerError::ToolError(format!("duckduckgo body read failed: {e}")))?;

        let snippets = parse_snippets(&body, self.max_results);
        if snippets.is_empty() {
            return Err(PlannerError::ToolError(format!(
                "duckduckgo returned no results for: {query}"
            )));
        }
        Ok(snippets.join("\n"))
    }
}
