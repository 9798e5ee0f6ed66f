//! Shared data models.

mod confidence;
mod conversation;
mod document;
mod domain;
mod feedback;
mod knowledge_graph;
mod search;
mod user;
mod vector;

pub use confidence::Confidence;
pub use conversation::Conversation;
pub use document::{Document, DocumentChunk, DocumentStatus};
pub use domain::{Domain, DomainConfig, VectorMetric};
pub use feedback::{Feedback, FeedbackKind};
pub use knowledge_graph::{
    Direction, Extraction, GraphPath, GraphStats, GraphTraversalSpec, KnowledgeEntity,
    KnowledgeRelation,
};
pub use search::{
    ResultKind, SearchLog, SearchOptions, SearchQuery, SearchResponse, SearchResult, SearchStats,
};
pub use user::User;
pub use vector::{CollectionStats, VectorHit, VectorRecord};

/// Read a string field out of a schema-less metadata bag.
///
/// Metadata travels as a JSON object; this is the typed accessor the
/// merge path uses instead of poking at raw maps.
pub fn metadata_str<'a>(metadata: &'a serde_json::Value, key: &str) -> Option<&'a str> {
    metadata.get(key).and_then(|v| v.as_str())
}
