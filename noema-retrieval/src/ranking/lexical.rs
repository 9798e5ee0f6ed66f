//! Default reranker: blends lexical query overlap with the base score.

use std::collections::HashSet;

use async_trait::async_trait;

use noema_core::errors::NoemaResult;
use noema_core::models::SearchResult;
use noema_core::traits::IReranker;

use crate::merge;

/// Weighted blend of base score and query-token overlap.
///
/// `blended = base_weight * score + lexical_weight * overlap`, where
/// overlap is the fraction of query tokens present in the result's title
/// or content.
pub struct LexicalReranker {
    base_weight: f64,
    lexical_weight: f64,
}

impl LexicalReranker {
    pub fn new(base_weight: f64, lexical_weight: f64) -> Self {
        Self {
            base_weight,
            lexical_weight,
        }
    }

    fn overlap(&self, query_tokens: &HashSet<String>, result: &SearchResult) -> f64 {
        if query_tokens.is_empty() {
            return 0.0;
        }
        let haystack = format!("{} {}", result.title, result.content).to_lowercase();
        let matched = query_tokens
            .iter()
            .filter(|token| haystack.contains(token.as_str()))
            .count();
        matched as f64 / query_tokens.len() as f64
    }
}

impl Default for LexicalReranker {
    fn default() -> Self {
        Self::new(0.7, 0.3)
    }
}

#[async_trait]
impl IReranker for LexicalReranker {
    async fn rerank(
        &self,
        query_text: &str,
        mut results: Vec<SearchResult>,
    ) -> NoemaResult<Vec<SearchResult>> {
        let query_tokens: HashSet<String> = query_text
            .split_whitespace()
            .map(|t| t.to_lowercase())
            .collect();

        for result in &mut results {
            let overlap = self.overlap(&query_tokens, result);
            result.score =
                (self.base_weight * result.score + self.lexical_weight * overlap).clamp(0.0, 1.0);
        }
        merge::order(&mut results);
        Ok(results)
    }
}
