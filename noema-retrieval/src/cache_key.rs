//! Cache key derivation.
//!
//! Keys fold in the domain's generation counter, so bumping the counter
//! on ingest makes every prior key unreachable without touching the
//! cache itself. Query text is normalized (trim, lowercase, whitespace
//! collapse) so trivially different spellings share an entry.

use noema_core::models::SearchQuery;

/// Canonical form of the query text used for key derivation.
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// JSON serialization with object keys sorted at every level.
fn canonical_json(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let inner = keys
                .iter()
                .map(|k| format!("{}:{}", k, canonical_json(&map[*k])))
                .collect::<Vec<_>>()
                .join(",");
            format!("{{{inner}}}")
        }
        serde_json::Value::Array(items) => {
            let inner = items
                .iter()
                .map(canonical_json)
                .collect::<Vec<_>>()
                .join(",");
            format!("[{inner}]")
        }
        other => other.to_string(),
    }
}

/// Derive the cache key for one search against one domain generation.
pub fn cache_key(query: &SearchQuery, generation: u64) -> String {
    let options = serde_json::to_value(&query.options).unwrap_or(serde_json::Value::Null);

    let mut hasher = blake3::Hasher::new();
    hasher.update(query.domain_id.as_bytes());
    hasher.update(&generation.to_le_bytes());
    hasher.update(normalize_text(&query.text).as_bytes());
    hasher.update(canonical_json(&query.filters).as_bytes());
    hasher.update(canonical_json(&options).as_bytes());
    hasher.finalize().to_hex().to_string()
}
