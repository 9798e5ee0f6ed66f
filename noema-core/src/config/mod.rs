//! Configuration structs, TOML-loadable with serde defaults.

mod cache_config;
mod retrieval_config;

pub use cache_config::CacheConfig;
pub use retrieval_config::RetrievalConfig;

use serde::{Deserialize, Serialize};

use crate::errors::{NoemaError, NoemaResult};

/// Top-level configuration for the backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NoemaConfig {
    pub retrieval: RetrievalConfig,
    pub cache: CacheConfig,
}

impl NoemaConfig {
    /// Parse a TOML document. Unknown keys are ignored, missing keys take
    /// their defaults.
    pub fn from_toml(raw: &str) -> NoemaResult<Self> {
        toml::from_str(raw).map_err(|e| NoemaError::InvalidArgument {
            reason: format!("config parse error: {e}"),
        })
    }
}
