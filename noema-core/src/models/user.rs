use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered user. Kept minimal — authentication is out of scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}
