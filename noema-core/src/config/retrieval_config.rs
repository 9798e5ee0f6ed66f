use serde::{Deserialize, Serialize};

use crate::constants;

/// Retrieval orchestrator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Result limit applied when the caller does not set one.
    pub default_limit: usize,
    /// Hard cap on the caller-supplied limit.
    pub max_limit: usize,
    /// Vector top-K is `limit * overfetch_factor`.
    pub overfetch_factor: usize,
    /// Per-source timeout (milliseconds), strictly below the deadline.
    pub source_timeout_ms: u64,
    /// Overall search deadline (milliseconds).
    pub deadline_ms: u64,
    /// Weight of the base score in the default reranker blend.
    pub rerank_base_weight: f64,
    /// Weight of lexical query overlap in the default reranker blend.
    pub rerank_lexical_weight: f64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            default_limit: constants::DEFAULT_SEARCH_LIMIT,
            max_limit: constants::MAX_SEARCH_LIMIT,
            overfetch_factor: constants::DEFAULT_OVERFETCH_FACTOR,
            source_timeout_ms: constants::DEFAULT_SOURCE_TIMEOUT_MS,
            deadline_ms: constants::DEFAULT_SEARCH_DEADLINE_MS,
            rerank_base_weight: 0.7,
            rerank_lexical_weight: 0.3,
        }
    }
}
