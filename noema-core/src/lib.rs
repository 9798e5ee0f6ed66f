//! # noema-core
//!
//! Foundation crate for the noema knowledge-retrieval backend.
//! Defines all types, traits, errors, config, and constants.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::{CacheConfig, NoemaConfig, RetrievalConfig};
pub use errors::{NoemaError, NoemaResult};
pub use models::{Confidence, ResultKind, SearchQuery, SearchResponse, SearchResult};
