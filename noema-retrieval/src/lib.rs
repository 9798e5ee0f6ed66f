//! # noema-retrieval
//!
//! The retrieval orchestrator: fuses the vector index, graph store, and
//! metadata store into one ranked result list behind a generation-keyed
//! result cache.
//!
//! Pipeline: validate → cache probe → fan-out with per-source timeouts →
//! normalize to [0,1] → enrich → dedup (keep-max) → threshold → sort →
//! paginate → optional rerank/highlight → cache write + async log.

pub mod cache_key;
pub mod engine;
pub mod highlight;
pub mod merge;
pub mod normalize;
pub mod ranking;

pub use engine::SearchEngine;
pub use ranking::LexicalReranker;
