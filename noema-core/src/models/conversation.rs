use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A captured conversation, stored per domain so its content can surface
/// in retrieval alongside documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub domain_id: String,
    pub user_id: Option<String>,
    /// Message list as captured, `[{role, content}, ...]`.
    pub messages: serde_json::Value,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Flatten message contents into one searchable text blob.
    pub fn text(&self) -> String {
        self.messages
            .as_array()
            .map(|msgs| {
                msgs.iter()
                    .filter_map(|m| m.get("content").and_then(|c| c.as_str()))
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .unwrap_or_default()
    }
}
