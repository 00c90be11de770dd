//! Reference-document fetching.
//!
//! The retriever never talks HTTP directly; it goes through the
//! `DocumentFetcher` trait so tests can stub the reference page. The real
//! implementation retrieves raw HTML and restricts it to the subtree matching
//! a CSS selector. Fetch failures are fatal for the run and are not retried.

use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};

use crate::error::PlannerError;

const USER_AGENT: &str = "Mozilla/5.0 (compatible; itinera/0.1)";

/// Narrow interface for retrieving a reference page.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Returns the raw HTML of the subtree(s) matching `selector` at `url`.
    async fn fetch(&self, url: &str, selector: &str) -> Result<String, PlannerError>;
}

/// HTTP implementation of [`DocumentFetcher`].
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, PlannerError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| PlannerError::FetchError(e.to_string()))?;
        Ok(Self { client })
    }
}

/// Reduces an HTML document to the subtree(s) matching a CSS selector.
///
/// Kept synchronous and separate from the network call: `scraper`'s parsed
/// DOM is not `Send`, so it must not be held across an await point.
pub fn select_fragment(html: &str, selector: &str) -> Result<String, PlannerError> {
    let parsed = Selector::parse(selector)
        .map_err(|e| PlannerError::FetchError(format!("invalid selector {selector:?}: {e}")))?;
    let document = Html::parse_document(html);

    let fragments: Vec<String> = document.select(&parsed).map(|el| el.html()).collect();
    if fragments.is_empty() {
        return Err(PlannerError::FetchError(format!(
            "selector {selector:?} matched nothing"
        )));
    }
    Ok(fragments.join("\n"))
}

#[async_trait]
impl DocumentFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, selector: &str) -> Result<String, PlannerError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| PlannerError::FetchError(e.to_string()))?;

        log::debug!("fetch {} HTTP status: {}", url, response.status());

        if !response.status().is_success() {
            return Err(PlannerError::FetchError(format!(
                "{url} returned status {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| PlannerError::FetchError(e.to_string()))?;

        select_fragment(&body, selector)
    }
}
