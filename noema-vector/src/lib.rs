//! In-process vector index client.
//!
//! Implements the `IVectorIndex` contract with per-collection dimension
//! enforcement and top-K scan search under cosine / inner-product / L2.
//! Collections are logically partitioned per domain, so concurrent
//! queries against different domains never contend on the same rows.

pub mod score;

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use noema_core::errors::{NoemaError, NoemaResult};
use noema_core::models::{CollectionStats, VectorHit, VectorMetric, VectorRecord};
use noema_core::traits::IVectorIndex;

use crate::score::{higher_is_better, native_score};

struct Collection {
    dimension: usize,
    metric: VectorMetric,
    records: HashMap<String, VectorRecord>,
}

/// In-memory `IVectorIndex` implementation.
pub struct MemoryVectorIndex {
    collections: RwLock<HashMap<String, Collection>>,
}

impl MemoryVectorIndex {
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
        }
    }

    fn check_dimension(collection: &Collection, record: &VectorRecord) -> NoemaResult<()> {
        if record.embedding.len() != collection.dimension {
            return Err(NoemaError::invalid(format!(
                "embedding for {} has dimension {}, collection expects {}",
                record.id,
                record.embedding.len(),
                collection.dimension
            )));
        }
        Ok(())
    }
}

impl Default for MemoryVectorIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IVectorIndex for MemoryVectorIndex {
    async fn create_collection(
        &self,
        name: &str,
        dimension: usize,
        metric: VectorMetric,
    ) -> NoemaResult<()> {
        if dimension == 0 {
            return Err(NoemaError::invalid("collection dimension must be positive"));
        }
        let mut collections = self.collections.write().await;
        if collections.contains_key(name) {
            return Err(NoemaError::invalid(format!(
                "collection {name} already exists"
            )));
        }
        collections.insert(
            name.to_string(),
            Collection {
                dimension,
                metric,
                records: HashMap::new(),
            },
        );
        debug!(collection = name, dimension, "created collection");
        Ok(())
    }

    async fn drop_collection(&self, name: &str) -> NoemaResult<()> {
        let mut collections = self.collections.write().await;
        collections
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| NoemaError::not_found("collection", name))
    }

    async fn has_collection(&self, name: &str) -> NoemaResult<bool> {
        Ok(self.collections.read().await.contains_key(name))
    }

    async fn insert(&self, collection: &str, records: Vec<VectorRecord>) -> NoemaResult<()> {
        let mut collections = self.collections.write().await;
        let coll = collections
            .get_mut(collection)
            .ok_or_else(|| NoemaError::not_found("collection", collection))?;
        for record in &records {
            Self::check_dimension(coll, record)?;
            if coll.records.contains_key(&record.id) {
                return Err(NoemaError::invalid(format!(
                    "duplicate vector id {} in collection {collection}",
                    record.id
                )));
            }
        }
        for record in records {
            coll.records.insert(record.id.clone(), record);
        }
        Ok(())
    }

    async fn update(&self, collection: &str, records: Vec<VectorRecord>) -> NoemaResult<()> {
        let mut collections = self.collections.write().await;
        let coll = collections
            .get_mut(collection)
            .ok_or_else(|| NoemaError::not_found("collection", collection))?;
        for record in &records {
            Self::check_dimension(coll, record)?;
            if !coll.records.contains_key(&record.id) {
                return Err(NoemaError::not_found("vector", &record.id));
            }
        }
        for record in records {
            coll.records.insert(record.id.clone(), record);
        }
        Ok(())
    }

    async fn delete(&self, collection: &str, ids: &[String]) -> NoemaResult<()> {
        let mut collections = self.collections.write().await;
        let coll = collections
            .get_mut(collection)
            .ok_or_else(|| NoemaError::not_found("collection", collection))?;
        for id in ids {
            coll.records.remove(id);
        }
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        query: &[f32],
        top_k: usize,
    ) -> NoemaResult<Vec<VectorHit>> {
        let collections = self.collections.read().await;
        let coll = collections
            .get(collection)
            .ok_or_else(|| NoemaError::not_found("collection", collection))?;
        if query.len() != coll.dimension {
            return Err(NoemaError::invalid(format!(
                "query has dimension {}, collection expects {}",
                query.len(),
                coll.dimension
            )));
        }

        let mut hits: Vec<VectorHit> = coll
            .records
            .values()
            .map(|record| VectorHit {
                id: record.id.clone(),
                score: native_score(coll.metric, query, &record.embedding),
                metadata: record.metadata.clone(),
            })
            .collect();

        // Best first: descending for similarity metrics, ascending for L2.
        let best_first_desc = higher_is_better(coll.metric);
        hits.sort_by(|a, b| {
            let ord = a
                .score
                .partial_cmp(&b.score)
                .unwrap_or(std::cmp::Ordering::Equal);
            let ord = if best_first_desc { ord.reverse() } else { ord };
            ord.then_with(|| a.id.cmp(&b.id))
        });
        hits.truncate(top_k);

        debug!(
            collection,
            top_k,
            hits = hits.len(),
            "vector search complete"
        );
        Ok(hits)
    }

    async fn collection_stats(&self, name: &str) -> NoemaResult<CollectionStats> {
        let collections = self.collections.read().await;
        let coll = collections
            .get(name)
            .ok_or_else(|| NoemaError::not_found("collection", name))?;
        Ok(CollectionStats {
            row_count: coll.records.len(),
            dimension: coll.dimension,
        })
    }
}
