//! Pipeline composition: search agent → document retriever → plan synthesizer.
//!
//! The three stages run strictly sequentially; each invocation is independent
//! and builds its own index. Tool errors are absorbed inside the agent loop;
//! every other stage error propagates to the caller unchanged.

use std::sync::Arc;

use crate::{
    agent::SearchAgent,
    backends::openai::OpenAI,
    chat::ChatProvider,
    config::PlannerConfig,
    embedding::EmbeddingProvider,
    error::PlannerError,
    fetcher::HttpFetcher,
    retriever::{DocumentRetriever, Index},
    splitter::RecursiveHtmlSplitter,
    synthesizer::PlanSynthesizer,
    tools::{DuckDuckGoSearch, ToolExecutor, WikipediaLookup},
    vector_store::InMemoryVectorStore,
};

/// The full travel-planning pipeline.
pub struct TravelPlanner {
    agent: SearchAgent,
    retriever: DocumentRetriever,
    synthesizer: PlanSynthesizer,
    config: PlannerConfig,
}

impl TravelPlanner {
    /// Wires the pipeline from explicit collaborators. Used directly by tests
    /// with stubbed stages.
    pub fn new(
        agent: SearchAgent,
        retriever: DocumentRetriever,
        synthesizer: PlanSynthesizer,
        config: PlannerConfig,
    ) -> Self {
        Self {
            agent,
            retriever,
            synthesizer,
            config,
        }
    }

    /// Wires the pipeline with production collaborators: the OpenAI backend
    /// for chat and embeddings, live search/lookup tools, an HTTP fetcher and
    /// an in-memory vector store.
    pub fn from_config(config: PlannerConfig) -> Result<Self, PlannerError> {
        let agent_llm: Arc<dyn ChatProvider> = Arc::new(OpenAI::from_config(
            &config,
            Some(SearchAgent::system_prompt().to_string()),
        )?);
        let tools: Vec<Box<dyn ToolExecutor>> = vec![
            Box::new(DuckDuckGoSearch::new(config.search_max_results)?),
            Box::new(WikipediaLookup::new(
                config.lookup_top_k,
                config.lookup_max_len,
            )?),
        ];
        let agent = SearchAgent::new(agent_llm, tools, config.max_steps);

        let openai = Arc::new(OpenAI::from_config(&config, None)?);
        let embedder: Arc<dyn EmbeddingProvider> = openai.clone();
        let retriever = DocumentRetriever::new(
            Arc::new(HttpFetcher::new()?),
            embedder,
            Arc::new(InMemoryVectorStore::new()),
            RecursiveHtmlSplitter::new(config.chunk_size, config.chunk_overlap),
            config.collection.clone(),
        );

        let synthesizer = PlanSynthesizer::new(openai);

        Ok(Self {
            agent,
            retriever,
            synthesizer,
            config,
        })
    }

    /// Runs the full pipeline for one request and returns the itinerary.
    pub async fn plan(&self, request: &str) -> Result<String, PlannerError> {
        log::debug!("planning trip for request: {request}");

        let research = self.agent.run(request).await?;
        log::debug!("research summary: {} chars", research.len());

        let index = self
            .retriever
            .build_index(&self.config.source_url, &self.config.selector)
            .await?;
        log::debug!("built index {:?} with {} chunk(s)", index.collection, index.size);

        let result = self.retrieve_and_synthesize(&index, request, &research).await;
        if let Err(e) = self.retriever.drop_index(&index).await {
            log::debug!("failed to drop index {:?}: {e}", index.collection);
        }
        result
    }

    async fn retrieve_and_synthesize(
        &self,
        index: &Index,
        request: &str,
        research: &str,
    ) -> Result<String, PlannerError> {
        let chunks = self
            .retriever
            .query(index, request, self.config.top_k)
            .await?;

        self.synthesizer
            .synthesize(request, research, &chunks)
            .await
    }
}
