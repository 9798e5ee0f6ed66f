use async_trait::async_trait;

use crate::errors::NoemaResult;
use crate::models::{CollectionStats, VectorHit, VectorMetric, VectorRecord};

/// ANN vector index: collection lifecycle, upserts, top-K search.
#[async_trait]
pub trait IVectorIndex: Send + Sync {
    async fn create_collection(
        &self,
        name: &str,
        dimension: usize,
        metric: VectorMetric,
    ) -> NoemaResult<()>;

    async fn drop_collection(&self, name: &str) -> NoemaResult<()>;

    async fn has_collection(&self, name: &str) -> NoemaResult<bool>;

    /// Insert new records. Embedding length must match the collection
    /// dimension; duplicate ids are rejected.
    async fn insert(&self, collection: &str, records: Vec<VectorRecord>) -> NoemaResult<()>;

    /// Full-record replacement of existing ids.
    async fn update(&self, collection: &str, records: Vec<VectorRecord>) -> NoemaResult<()>;

    async fn delete(&self, collection: &str, ids: &[String]) -> NoemaResult<()>;

    /// Top-K similarity search. Scores come back in the collection
    /// metric's native scale, best first.
    async fn search(
        &self,
        collection: &str,
        query: &[f32],
        top_k: usize,
    ) -> NoemaResult<Vec<VectorHit>>;

    async fn collection_stats(&self, name: &str) -> NoemaResult<CollectionStats>;
}
