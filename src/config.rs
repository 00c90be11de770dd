//! Immutable pipeline configuration.
//!
//! All knobs are fixed at construction time and passed into the pipeline
//! explicitly, so the whole system stays testable with stubbed collaborators.
//! `from_env` is the only place that reads process environment.

use std::env;

use crate::error::PlannerError;

/// Static configuration for a travel-planning pipeline.
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    /// API key for the chat-completion and embedding provider
    pub api_key: String,
    /// Optional override for the provider base URL
    pub base_url: Option<String>,
    /// Chat model identifier
    pub model: String,
    /// Embedding model identifier
    pub embedding_model: String,
    /// Sampling temperature for chat calls
    pub temperature: f32,
    /// Optional request timeout in seconds
    pub timeout_seconds: Option<u64>,
    /// Maximum number of web-search result snippets per tool call
    pub search_max_results: usize,
    /// Maximum number of encyclopedia articles per lookup
    pub lookup_top_k: usize,
    /// Maximum characters kept from each encyclopedia article
    pub lookup_max_len: usize,
    /// Step budget for the search agent's reasoning loop
    pub max_steps: u32,
    /// Target chunk size (characters) for document splitting
    pub chunk_size: usize,
    /// Overlap (characters) between consecutive chunks
    pub chunk_overlap: usize,
    /// Vector store collection name
    pub collection: String,
    /// Reference page indexed for retrieval
    pub source_url: String,
    /// CSS selector restricting the fetched page to its content subtree
    pub selector: String,
    /// Number of chunks retrieved per query
    pub top_k: usize,
}

impl PlannerConfig {
    /// Creates a configuration with defaults for everything but the API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: None,
            model: "gpt-3.5-turbo".to_string(),
            embedding_model: "text-embedding-3-small".to_string(),
            temperature: 0.0,
            timeout_seconds: None,
            search_max_results: 1,
            lookup_top_k: 3,
            lookup_max_len: 4000,
            max_steps: 8,
            chunk_size: 1000,
            chunk_overlap: 100,
            collection: "travel-docs".to_string(),
            source_url: "https://en.wikivoyage.org/wiki/Itineraries".to_string(),
            selector: "#mw-content-text".to_string(),
            top_k: 4,
        }
    }

    /// Builds a configuration from process environment.
    ///
    /// `OPENAI_API_KEY` is required. `ITINERA_MODEL`, `ITINERA_EMBEDDING_MODEL`,
    /// `ITINERA_SOURCE_URL`, `ITINERA_SELECTOR` and `ITINERA_COLLECTION`
    /// override their defaults when set.
    pub fn from_env() -> Result<Self, PlannerError> {
        let api_key = env::var("OPENAI_API_KEY")
            .map_err(|_| PlannerError::AuthError("OPENAI_API_KEY not set".to_string()))?;

        let mut config = Self::new(api_key);
        if let Ok(model) = env::var("ITINERA_MODEL") {
            config.model = model;
        }
        if let Ok(model) = env::var("ITINERA_EMBEDDING_MODEL") {
            config.embedding_model = model;
        }
        if let Ok(url) = env::var("ITINERA_SOURCE_URL") {
            config.source_url = url;
        }
        if let Ok(selector) = env::var("ITINERA_SELECTOR") {
            config.selector = selector;
        }
        if let Ok(collection) = env::var("ITINERA_COLLECTION") {
            config.collection = collection;
        }
        Ok(config)
    }

    /// Sets the chat model identifier
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the embedding model identifier
    pub fn embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }

    /// Sets the sampling temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sets the request timeout in seconds
    pub fn timeout_seconds(mut self, seconds: u64) -> Self {
        self.timeout_seconds = Some(seconds);
        self
    }

    /// Sets the agent step budget
    pub fn max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Sets the reference page and CSS selector used for retrieval
    pub fn source(mut self, url: impl Into<String>, selector: impl Into<String>) -> Self {
        self.source_url = url.into();
        self.selector = selector.into();
        self
    }

    /// Sets chunk size and overlap for document splitting
    pub fn chunking(mut self, size: usize, overlap: usize) -> Self {
        self.chunk_size = size;
        self.chunk_overlap = overlap;
        self
    }

    /// Sets the number of chunks retrieved per query
    pub fn top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }
}
