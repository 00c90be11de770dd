//! Wikipedia lookup tool.
//!
//! Two MediaWiki API round-trips per call: a title search, then plain-text
//! extracts for the matched pages. Each article is truncated to a configured
//! maximum length before being handed back to the agent.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{truncate_chars, ToolExecutor};
use crate::error::PlannerError;

const API_URL: &str = "https://en.wikipedia.org/w/api.php";
const USER_AGENT: &str = "Mozilla/5.0 (compatible; itinera/0.1)";

/// Encyclopedia-lookup tool returning up to `top_k` summarized articles.
pub struct WikipediaLookup {
    client: Client,
    top_k: usize,
    max_len: usize,
}

#[derive(Deserialize)]
struct SearchResponse {
    query: Option<SearchQuery>,
}

#[derive(Deserialize)]
struct SearchQuery {
    search: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct SearchHit {
    title: String,
}

#[derive(Deserialize)]
struct ExtractResponse {
    query: Option<ExtractQuery>,
}

#[derive(Deserialize)]
struct ExtractQuery {
    pages: HashMap<String, ExtractPage>,
}

#[derive(Deserialize)]
struct ExtractPage {
    title: String,
    extract: Option<String>,
}

impl WikipediaLookup {
    /// Creates a lookup tool returning at most `top_k` articles, each
    /// truncated to `max_len` characters.
    pub fn new(top_k: usize, max_len: usize) -> Result<Self, PlannerError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| PlannerError::HttpError(e.to_string()))?;
        Ok(Self {
            client,
            top_k,
            max_len,
        })
    }

    async fn search_titles(&self, query: &str) -> Result<Vec<String>, PlannerError> {
        let limit = self.top_k.to_string();
        let response = self
            .client
            .get(API_URL)
            .query(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", query),
                ("srlimit", limit.as_str()),
                ("format", "json"),
            ])
            .send()
            .await
            .map_err(|e| PlannerError::ToolError(format!("wikipedia search failed: {e}")))?;

        log::debug!("Wikipedia search HTTP status: {}", response.status());

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| PlannerError::ToolError(format!("wikipedia search decode failed: {e}")))?;

        Ok(parsed
            .query
            .map(|q| q.search.into_iter().map(|hit| hit.title).collect())
            .unwrap_or_default())
    }

    async fn fetch_extracts(&self, titles: &[String]) -> Result<Vec<String>, PlannerError> {
        let joined = titles.join("|");
        let response = self
            .client
            .get(API_URL)
            .query(&[
                ("action", "query"),
                ("prop", "extracts"),
                ("explaintext", "1"),
                ("exintro", "0"),
                ("titles", joined.as_str()),
                ("format", "json"),
            ])
            .send()
            .await
            .map_err(|e| PlannerError::ToolError(format!("wikipedia extracts failed: {e}")))?;

        let parsed: ExtractResponse = response.json().await.map_err(|e| {
            PlannerError::ToolError(format!("wikipedia extracts decode failed: {e}"))
        })?;

        let pages = parsed
            .query
            .map(|q| q.pages)
            .unwrap_or_default();

        // The pages map is keyed by page id; restore the search ranking order.
        let mut by_title: HashMap<String, String> = pages
            .into_values()
            .filter_map(|p| p.extract.map(|e| (p.title, e)))
            .collect();

        Ok(titles
            .iter()
            .filter_map(|title| {
                by_title
                    .remove(title)
                    .map(|extract| format!("Page: {title}\n{}", truncate_chars(&extract, self.max_len)))
            })
            .collect())
    }
}

#[async_trait]
impl ToolExecutor for WikipediaLookup {
    fn name(&self) -> &str {
        "wikipedia_lookup"
    }

    fn description(&self) -> &str {
        "Look up background information about destinations, landmarks and events \
         on Wikipedia. Input should be a topic or place name."
    }

    async fn call(&self, query: &str) -> Result<String, PlannerError> {
        let titles = self.search_titles(query).await?;
        if titles.is_empty() {
            return Err(PlannerError::ToolError(format!(
                "wikipedia found no articles for: {query}"
            )));
        }

        let articles = self.fetch_extracts(&titles).await?;
        if articles.is_empty() {
            return Err(PlannerError::ToolError(format!(
                "wikipedia returned no extracts for: {query}"
            )));
        }
        Ok(articles.join("\n\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_respects_char_boundaries() {
        let text = "café horário";
        let truncated = truncate_chars(text, 5);
        assert_eq!(truncated, "café ");
    }

    #[test]
    fn truncation_is_noop_for_short_text() {
        assert_eq!(truncate_chars("short", 4000), "short");
    }
}
