use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Document ingestion status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Processing,
    Completed,
    Failed,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "processing" => Some(Self::Processing),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// A source document belonging to exactly one domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub domain_id: String,
    pub title: String,
    pub content_type: String,
    pub source: String,
    pub tags: Vec<String>,
    pub metadata: serde_json::Value,
    pub status: DocumentStatus,
    pub chunk_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A contiguous slice of a document's content. The embedding itself lives
/// in the vector index, keyed by the chunk id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub id: String,
    pub document_id: String,
    pub content: String,
    pub start_pos: usize,
    pub end_pos: usize,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}
