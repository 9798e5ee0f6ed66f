use serde::{Deserialize, Serialize};

/// A stored vector. The id correlates 1:1 with a chunk or entity id and
/// the embedding length must equal the collection's configured dimension.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorRecord {
    pub id: String,
    pub embedding: Vec<f32>,
    pub metadata: serde_json::Value,
}

/// One hit from a top-K similarity search. The score is in the index's
/// native scale; normalization to [0,1] happens in the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorHit {
    pub id: String,
    pub score: f64,
    pub metadata: serde_json::Value,
}

/// Per-collection counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectionStats {
    pub row_count: usize,
    pub dimension: usize,
}
