use async_trait::async_trait;

use crate::errors::NoemaResult;
use crate::models::Extraction;

/// Embedding generation provider. Failures map to `ExternalService`.
#[async_trait]
pub trait IEmbeddingProvider: Send + Sync {
    /// Embed a single text, returning a vector of floats.
    async fn embed(&self, text: &str) -> NoemaResult<Vec<f32>>;

    /// Embed a batch of texts.
    async fn embed_batch(&self, texts: &[String]) -> NoemaResult<Vec<Vec<f32>>>;

    /// The dimensionality of embeddings produced by this provider.
    fn dimensions(&self) -> usize;

    /// Human-readable provider name.
    fn name(&self) -> &str;
}

/// Entity/relation recognition provider. Failures map to `ExternalService`.
#[async_trait]
pub trait IEntityExtractor: Send + Sync {
    /// Extract entities and relations, with confidences, from free text.
    async fn extract(&self, text: &str, domain_id: &str) -> NoemaResult<Extraction>;
}
