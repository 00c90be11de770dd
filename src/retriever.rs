//! Document retriever: fetch, split, transform, embed, index, query.
//!
//! Composes the retrieval stages as an explicit ordered sequence of pure
//! functions between the external collaborators. Embedding failures are fatal
//! for the run; a partial index is never used.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::{
    embedding::EmbeddingProvider,
    error::PlannerError,
    fetcher::DocumentFetcher,
    splitter::{Chunk, RecursiveHtmlSplitter},
    transform::html_to_prose,
    vector_store::{EmbeddedChunk, VectorStore},
};

/// Handle to a built collection. Valid for the run that built it.
#[derive(Debug, Clone)]
pub struct Index {
    /// Collection name in the vector store
    pub collection: String,
    /// Number of chunks indexed
    pub size: usize,
}

/// Builds and queries a per-run index over a reference document.
///
/// Each `build_index` call writes into its own collection, so a retriever
/// shared between concurrent runs never mixes their chunks.
pub struct DocumentRetriever {
    fetcher: Arc<dyn DocumentFetcher>,
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    splitter: RecursiveHtmlSplitter,
    collection: String,
    runs: AtomicU64,
}

impl DocumentRetriever {
    pub fn new(
        fetcher: Arc<dyn DocumentFetcher>,
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
        splitter: RecursiveHtmlSplitter,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            fetcher,
            embedder,
            store,
            splitter,
            collection: collection.into(),
            runs: AtomicU64::new(0),
        }
    }

    /// Fetches the reference page, splits and transforms it, embeds the
    /// chunks and indexes them under the configured collection.
    pub async fn build_index(&self, url: &str, selector: &str) -> Result<Index, PlannerError> {
        let html = self.fetcher.fetch(url, selector).await?;
        self.build_index_from_html(url, &html).await
    }

    /// Same as [`build_index`](Self::build_index) but over already-fetched
    /// markup. The split runs over raw markup so block boundaries are still
    /// visible; each chunk is then transformed to prose before embedding.
    pub async fn build_index_from_html(
        &self,
        source: &str,
        html: &str,
    ) -> Result<Index, PlannerError> {
        let chunks: Vec<Chunk> = self
            .splitter
            .split(source, html)
            .into_iter()
            .filter_map(|chunk| {
                let prose = html_to_prose(&chunk.text);
                if prose.is_empty() {
                    None
                } else {
                    Some(Chunk {
                        text: prose,
                        ..chunk
                    })
                }
            })
            .collect();

        if chunks.is_empty() {
            return Err(PlannerError::IndexError(format!(
                "{source} produced no indexable chunks"
            )));
        }
        log::debug!("indexing {} chunk(s) from {source}", chunks.len());

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = self
            .embedder
            .embed(texts)
            .await
            .map_err(|e| PlannerError::EmbeddingError(e.to_string()))?;
        if vectors.len() != chunks.len() {
            return Err(PlannerError::EmbeddingError(format!(
                "embedding count mismatch: {} chunks, {} vectors",
                chunks.len(),
                vectors.len()
            )));
        }

        let size = chunks.len();
        let items: Vec<EmbeddedChunk> = chunks
            .into_iter()
            .zip(vectors)
            .map(|(chunk, vector)| EmbeddedChunk { chunk, vector })
            .collect();
        let collection = format!(
            "{}-{}",
            self.collection,
            self.runs.fetch_add(1, Ordering::Relaxed)
        );
        self.store.upsert(&collection, items).await?;

        Ok(Index { collection, size })
    }

    /// Drops a built index's collection from the store. Called once the run
    /// that built it is finished with it.
    pub async fn drop_index(&self, index: &Index) -> Result<(), PlannerError> {
        self.store.remove(&index.collection).await
    }

    /// Embeds the request with the same embedding function and returns the
    /// `top_k` chunks by ascending cosine distance.
    pub async fn query(
        &self,
        index: &Index,
        request: &str,
        top_k: usize,
    ) -> Result<Vec<Chunk>, PlannerError> {
        let mut vectors = self
            .embedder
            .embed(vec![request.to_string()])
            .await
            .map_err(|e| PlannerError::EmbeddingError(e.to_string()))?;
        let vector = vectors
            .pop()
            .ok_or_else(|| PlannerError::EmbeddingError("empty embedding response".to_string()))?;

        let scored = self.store.query(&index.collection, &vector, top_k).await?;
        Ok(scored.into_iter().map(|s| s.chunk).collect())
    }
}
