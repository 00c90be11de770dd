use async_trait::async_trait;

use crate::error::PlannerError;

/// Trait for providers that can map text to fixed-length embedding vectors.
///
/// One batched call covers any number of inputs; the returned vectors are in
/// input order, one per text.
#[async_trait]
pub trait EmbeddingProvider: Sync + Send {
    async fn embed(&self, input: Vec<String>) -> Result<Vec<Vec<f32>>, PlannerError>;
}
