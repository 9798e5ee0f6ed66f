//! Trait seams between the orchestrator and its collaborators.
//!
//! Every store is accessed over the network in production, so all
//! contracts are async and object-safe; the orchestrator holds
//! `Arc<dyn ...>` handles injected at construction.

mod cache;
mod embedding;
mod graph;
mod metadata;
mod rerank;
mod vector;

pub use cache::IResultCache;
pub use embedding::{IEmbeddingProvider, IEntityExtractor};
pub use graph::IGraphStore;
pub use metadata::IMetadataStore;
pub use rerank::IReranker;
pub use vector::IVectorIndex;
