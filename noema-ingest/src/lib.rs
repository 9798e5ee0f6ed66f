//! # noema-ingest
//!
//! The ingestion pipeline: chunks content, embeds it, extracts graph
//! facts, writes all three stores, and invalidates cached searches by
//! bumping the domain's cache generation.

pub mod chunking;
pub mod pipeline;

pub use chunking::{ChunkingConfig, ChunkSpan};
pub use pipeline::{DocumentInput, IngestPipeline};
