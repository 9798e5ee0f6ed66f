use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What kind of feedback the user gave on a query result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackKind {
    Rating,
    Thumbs,
    Correction,
}

impl FeedbackKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rating => "rating",
            Self::Thumbs => "thumbs",
            Self::Correction => "correction",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "rating" => Some(Self::Rating),
            "thumbs" => Some(Self::Thumbs),
            "correction" => Some(Self::Correction),
            _ => None,
        }
    }
}

/// User feedback attached to a logged query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feedback {
    pub id: String,
    pub query_id: String,
    pub user_id: Option<String>,
    pub kind: FeedbackKind,
    /// Rating in [1, 5] when kind is `Rating`, ±1 for `Thumbs`.
    pub rating: Option<i32>,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}
