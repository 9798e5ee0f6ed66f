use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants;

/// A ranked-retrieval request against one domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    pub text: String,
    pub domain_id: String,
    /// Schema-less filter bag, e.g. `{"tags": ["kb"]}`.
    #[serde(default)]
    pub filters: serde_json::Value,
    #[serde(default)]
    pub options: SearchOptions,
    #[serde(default)]
    pub context: SearchContext,
}

impl SearchQuery {
    pub fn new(text: impl Into<String>, domain_id: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            domain_id: domain_id.into(),
            filters: serde_json::Value::Null,
            options: SearchOptions::default(),
            context: SearchContext::default(),
        }
    }
}

/// Caller-tunable knobs on a search.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    pub limit: usize,
    pub offset: usize,
    pub score_threshold: f64,
    /// Empty means all result kinds.
    pub result_types: Vec<ResultKind>,
    /// Force graph traversal even when `result_types` excludes entities.
    pub include_graph: bool,
    pub rerank: bool,
    pub highlight: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            limit: constants::DEFAULT_SEARCH_LIMIT,
            offset: 0,
            score_threshold: 0.0,
            result_types: Vec::new(),
            include_graph: false,
            rerank: false,
            highlight: false,
        }
    }
}

/// Where the query came from; logged, never used for ranking.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchContext {
    pub session_id: Option<String>,
    pub conversation_id: Option<String>,
    pub user_id: Option<String>,
}

/// The closed set of things a search can return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultKind {
    Document,
    Chunk,
    Conversation,
    Entity,
}

impl ResultKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Chunk => "chunk",
            Self::Conversation => "conversation",
            Self::Entity => "entity",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "document" => Some(Self::Document),
            "chunk" => Some(Self::Chunk),
            "conversation" => Some(Self::Conversation),
            "entity" => Some(Self::Entity),
            _ => None,
        }
    }
}

/// One merged, normalized result. Score is always in [0,1] regardless of
/// the originating store's native scale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: String,
    pub kind: ResultKind,
    pub title: String,
    pub content: String,
    pub source: String,
    pub score: f64,
    pub highlights: Vec<String>,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// The assembled response for one search call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query_id: String,
    pub query: String,
    pub total_hits: usize,
    pub processing_ms: u64,
    pub results: Vec<SearchResult>,
    /// Counts per result kind.
    pub aggregations: Vec<(String, usize)>,
    /// True when one or more sources were degraded for this call.
    pub partial: bool,
    /// Names of degraded sources: "vector", "graph", "metadata".
    pub degraded_sources: Vec<String>,
    /// True when served from the result cache.
    pub from_cache: bool,
}

/// Durable record of one executed search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchLog {
    pub id: String,
    pub query_id: String,
    pub domain_id: String,
    pub user_id: Option<String>,
    pub query_text: String,
    pub options: serde_json::Value,
    pub total_hits: usize,
    pub response_time_ms: u64,
    pub created_at: DateTime<Utc>,
}

/// Aggregates over persisted search logs, the `Stats` observability surface.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchStats {
    pub total_searches: usize,
    pub avg_response_time_ms: f64,
    /// Share of searches that returned nothing, in [0,1].
    pub zero_result_rate: f64,
    pub top_queries: Vec<(String, usize)>,
}
