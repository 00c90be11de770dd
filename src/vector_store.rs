//! Vector index over embedded chunks.
//!
//! The store is a narrow interface: upsert pairs into a named collection,
//! query nearest neighbors by cosine distance. The in-memory implementation
//! is a brute-force scan; each pipeline run builds its own collection, so no
//! cross-run state is shared. Reads take a shared lock so a future persistent
//! variant could serve concurrent queries; rebuild takes the exclusive lock.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{error::PlannerError, splitter::Chunk};

/// A chunk paired with its embedding vector.
#[derive(Debug, Clone)]
pub struct EmbeddedChunk {
    pub chunk: Chunk,
    pub vector: Vec<f32>,
}

/// A chunk returned from a query, with its cosine distance to the query
/// vector (smaller is closer).
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub distance: f32,
}

/// Narrow interface for a nearest-neighbor index service.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Inserts items into the named collection, creating it if needed.
    async fn upsert(&self, collection: &str, items: Vec<EmbeddedChunk>) -> Result<(), PlannerError>;

    /// Returns up to `top_k` items ordered by ascending cosine distance.
    async fn query(
        &self,
        collection: &str,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<ScoredChunk>, PlannerError>;

    /// Drops the named collection. Removing a collection that does not exist
    /// is a no-op.
    async fn remove(&self, collection: &str) -> Result<(), PlannerError>;
}

/// Brute-force in-memory vector store.
#[derive(Default)]
pub struct InMemoryVectorStore {
    collections: RwLock<HashMap<String, Vec<EmbeddedChunk>>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Cosine distance between two vectors: `1 - cos(a, b)`. Zero-norm vectors
/// are treated as maximally distant.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 2.0;
    }
    1.0 - dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn upsert(&self, collection: &str, items: Vec<EmbeddedChunk>) -> Result<(), PlannerError> {
        let mut collections = self.collections.write().await;
        if let Some(dim) = items.first().map(|i| i.vector.len()) {
            if items.iter().any(|i| i.vector.len() != dim) {
                return Err(PlannerError::IndexError(
                    "mixed embedding dimensions in upsert batch".to_string(),
                ));
            }
            if let Some(existing) = collections.get(collection).and_then(|v| v.first()) {
                if existing.vector.len() != dim {
                    return Err(PlannerError::IndexError(format!(
                        "dimension {dim} does not match collection {collection} (dimension {})",
                        existing.vector.len()
                    )));
                }
            }
        }
        collections
            .entry(collection.to_string())
            .or_default()
            .extend(items);
        Ok(())
    }

    async fn query(
        &self,
        collection: &str,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<ScoredChunk>, PlannerError> {
        let collections = self.collections.read().await;
        let items = collections.get(collection).ok_or_else(|| {
            PlannerError::IndexError(format!("unknown collection: {collection}"))
        })?;
        if let Some(item) = items.first() {
            if item.vector.len() != vector.len() {
                return Err(PlannerError::IndexError(format!(
                    "query dimension {} does not match stored dimension {}",
                    vector.len(),
                    item.vector.len()
                )));
            }
        }

        let mut scored: Vec<ScoredChunk> = items
            .iter()
            .map(|item| ScoredChunk {
                chunk: item.chunk.clone(),
                distance: cosine_distance(&item.vector, vector),
            })
            .collect();
        scored.sort_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        Ok(scored)
    }

    async fn remove(&self, collection: &str) -> Result<(), PlannerError> {
        let mut collections = self.collections.write().await;
        collections.remove(collection);
        Ok(())
    }
}
