//! Row-level query functions, grouped per aggregate.

pub mod conversation_ops;
pub mod document_ops;
pub mod domain_ops;
pub mod search_ops;

use chrono::{DateTime, Utc};

use noema_core::errors::{NoemaError, NoemaResult, StorageError};

/// Parse a stored RFC3339 timestamp column.
pub(crate) fn parse_ts(raw: &str) -> NoemaResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            StorageError::Serialization {
                message: format!("bad timestamp {raw:?}: {e}"),
            }
            .into()
        })
}

/// Parse a stored JSON column.
pub(crate) fn parse_json(raw: &str) -> NoemaResult<serde_json::Value> {
    serde_json::from_str(raw).map_err(|e| {
        NoemaError::from(StorageError::Serialization {
            message: format!("bad json column: {e}"),
        })
    })
}

/// Comma-separated `?` placeholders for an IN clause.
pub(crate) fn in_placeholders(n: usize) -> String {
    let mut s = String::with_capacity(n * 2);
    for i in 0..n {
        if i > 0 {
            s.push(',');
        }
        s.push('?');
    }
    s
}
