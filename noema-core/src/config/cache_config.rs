use serde::{Deserialize, Serialize};

use crate::constants;

/// Result cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of cached responses.
    pub capacity: u64,
    /// Default TTL for cached responses, seconds. Domains may override.
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: constants::DEFAULT_CACHE_CAPACITY,
            ttl_secs: constants::DEFAULT_CACHE_TTL_SECS,
        }
    }
}
