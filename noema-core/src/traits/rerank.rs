use async_trait::async_trait;

use crate::errors::NoemaResult;
use crate::models::SearchResult;

/// Pluggable second-stage ranker applied after merge and pagination.
///
/// Implementations may call out to an external model, so the contract is
/// async. The default implementation blends lexical query overlap with
/// the base score.
#[async_trait]
pub trait IReranker: Send + Sync {
    async fn rerank(
        &self,
        query_text: &str,
        results: Vec<SearchResult>,
    ) -> NoemaResult<Vec<SearchResult>>;
}
