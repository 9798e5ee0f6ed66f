use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants;

/// Similarity metric used by a domain's vector collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VectorMetric {
    /// Cosine similarity, native range [-1, 1].
    #[default]
    Cosine,
    /// Inner product, native range roughly [-1, 1] for normalized vectors.
    InnerProduct,
    /// Euclidean distance, native range [0, ∞) where smaller is closer.
    L2,
}

/// A named knowledge partition. Owns its own vector collection and scopes
/// all graph and metadata queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Domain {
    pub id: String,
    /// Globally unique domain name.
    pub name: String,
    pub description: String,
    pub config: DomainConfig,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Domain {
    /// Name of this domain's vector collection.
    pub fn collection_name(&self) -> String {
        format!("domain_{}", self.id)
    }
}

/// Per-domain retrieval configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainConfig {
    /// Embedding dimension every vector in the collection must match.
    pub vector_dimension: usize,
    pub metric: VectorMetric,
    /// Maximum graph traversal depth for this domain.
    pub max_traversal_depth: usize,
    /// Minimum path score for graph traversal.
    pub traversal_min_score: f64,
    /// TTL for cached search responses, seconds.
    pub cache_ttl_secs: u64,
}

impl Default for DomainConfig {
    fn default() -> Self {
        Self {
            vector_dimension: constants::DEFAULT_VECTOR_DIMENSION,
            metric: VectorMetric::default(),
            max_traversal_depth: constants::DEFAULT_MAX_TRAVERSAL_DEPTH,
            traversal_min_score: constants::DEFAULT_TRAVERSAL_MIN_SCORE,
            cache_ttl_secs: constants::DEFAULT_CACHE_TTL_SECS,
        }
    }
}
