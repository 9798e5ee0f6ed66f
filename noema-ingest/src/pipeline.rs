//! IngestPipeline: turns raw content into rows, vectors, and graph
//! facts, then bumps the domain's cache generation.
//!
//! Writes are not transactional across stores; readers may observe a
//! document mid-ingest until its status flips to completed.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::{debug, info, warn};
use uuid::Uuid;

use noema_core::errors::{NoemaError, NoemaResult};
use noema_core::models::{
    Conversation, Document, DocumentChunk, DocumentStatus, Domain, Extraction, Feedback,
    VectorRecord,
};
use noema_core::traits::{
    IEmbeddingProvider, IEntityExtractor, IGraphStore, IMetadataStore, IResultCache, IVectorIndex,
};

use crate::chunking::{self, ChunkingConfig};

/// Caller-supplied document fields; ids, status, and counts are owned by
/// the pipeline.
#[derive(Debug, Clone, Default)]
pub struct DocumentInput {
    pub title: String,
    pub content_type: String,
    pub source: String,
    pub tags: Vec<String>,
    pub metadata: serde_json::Value,
}

/// The ingestion pipeline. Holds the same collaborator handles as the
/// search engine, plus chunking configuration.
pub struct IngestPipeline {
    metadata: Arc<dyn IMetadataStore>,
    vector: Arc<dyn IVectorIndex>,
    graph: Arc<dyn IGraphStore>,
    cache: Arc<dyn IResultCache>,
    embedder: Arc<dyn IEmbeddingProvider>,
    extractor: Arc<dyn IEntityExtractor>,
    chunking: ChunkingConfig,
}

impl IngestPipeline {
    pub fn new(
        metadata: Arc<dyn IMetadataStore>,
        vector: Arc<dyn IVectorIndex>,
        graph: Arc<dyn IGraphStore>,
        cache: Arc<dyn IResultCache>,
        embedder: Arc<dyn IEmbeddingProvider>,
        extractor: Arc<dyn IEntityExtractor>,
    ) -> Self {
        Self {
            metadata,
            vector,
            graph,
            cache,
            embedder,
            extractor,
            chunking: ChunkingConfig::default(),
        }
    }

    pub fn with_chunking(mut self, chunking: ChunkingConfig) -> Self {
        self.chunking = chunking;
        self
    }

    /// Create a domain and its vector collection.
    pub async fn provision_domain(&self, domain: Domain) -> NoemaResult<()> {
        if self
            .metadata
            .get_domain_by_name(&domain.name)
            .await?
            .is_some()
        {
            return Err(NoemaError::invalid(format!(
                "domain name {:?} already taken",
                domain.name
            )));
        }
        self.vector
            .create_collection(
                &domain.collection_name(),
                domain.config.vector_dimension,
                domain.config.metric,
            )
            .await?;
        self.metadata.create_domain(domain).await
    }

    /// Ingest one document: chunk, embed, index, extract, complete.
    ///
    /// The document row is created with status `processing` up front; on
    /// any downstream failure it is marked `failed` (best-effort) and the
    /// error is returned.
    pub async fn ingest_document(
        &self,
        domain_id: &str,
        input: DocumentInput,
        content: &str,
    ) -> NoemaResult<Document> {
        if content.trim().is_empty() {
            return Err(NoemaError::invalid("document content must not be empty"));
        }
        let domain = self
            .metadata
            .get_domain(domain_id)
            .await?
            .ok_or_else(|| NoemaError::not_found("domain", domain_id))?;

        let now = Utc::now();
        let mut document = Document {
            id: Uuid::new_v4().to_string(),
            domain_id: domain_id.into(),
            title: input.title,
            content_type: input.content_type,
            source: input.source,
            tags: input.tags,
            metadata: input.metadata,
            status: DocumentStatus::Processing,
            chunk_count: 0,
            created_at: now,
            updated_at: now,
        };
        self.metadata.create_document(document.clone()).await?;

        match self.index_document(&domain, &document, content).await {
            Ok(chunk_count) => {
                document.status = DocumentStatus::Completed;
                document.chunk_count = chunk_count;
                document.updated_at = Utc::now();
                self.metadata.update_document(document.clone()).await?;
                self.bump_generation(domain_id).await;
                info!(document = %document.id, chunks = chunk_count, "document ingested");
                Ok(document)
            }
            Err(error) => {
                document.status = DocumentStatus::Failed;
                document.updated_at = Utc::now();
                if let Err(mark_error) = self.metadata.update_document(document.clone()).await {
                    warn!(error = %mark_error, "failed to mark document as failed");
                }
                Err(error)
            }
        }
    }

    /// Store a conversation, index its flattened text, extract entities.
    pub async fn ingest_conversation(&self, conversation: Conversation) -> NoemaResult<()> {
        let domain = self
            .metadata
            .get_domain(&conversation.domain_id)
            .await?
            .ok_or_else(|| NoemaError::not_found("domain", &conversation.domain_id))?;

        self.metadata
            .create_conversation(conversation.clone())
            .await?;

        let text = conversation.text();
        if !text.trim().is_empty() {
            let embedding = self.embedder.embed(&text).await?;
            self.vector
                .insert(
                    &domain.collection_name(),
                    vec![VectorRecord {
                        id: conversation.id.clone(),
                        embedding,
                        metadata: json!({"kind": "conversation"}),
                    }],
                )
                .await?;

            let extraction = self
                .extractor
                .extract(&text, &conversation.domain_id)
                .await?;
            self.apply_extraction(extraction).await?;
        }

        self.bump_generation(&conversation.domain_id).await;
        Ok(())
    }

    /// Store feedback. No indexing and no cache impact.
    pub async fn ingest_feedback(&self, feedback: Feedback) -> NoemaResult<()> {
        self.metadata.create_feedback(feedback).await
    }

    async fn index_document(
        &self,
        domain: &Domain,
        document: &Document,
        content: &str,
    ) -> NoemaResult<usize> {
        let spans = chunking::split(content, &self.chunking);
        if spans.is_empty() {
            return Err(NoemaError::invalid("content chunked to nothing"));
        }
        debug!(document = %document.id, chunks = spans.len(), "chunked document");

        let texts: Vec<String> = spans.iter().map(|s| s.text.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;
        if embeddings.len() != spans.len() {
            return Err(NoemaError::Internal {
                reason: format!(
                    "embedder returned {} vectors for {} chunks",
                    embeddings.len(),
                    spans.len()
                ),
            });
        }

        let mut rows = Vec::with_capacity(spans.len());
        let mut records = Vec::with_capacity(spans.len());
        for (span, embedding) in spans.iter().zip(embeddings) {
            let chunk_id = Uuid::new_v4().to_string();
            rows.push(DocumentChunk {
                id: chunk_id.clone(),
                document_id: document.id.clone(),
                content: span.text.clone(),
                start_pos: span.start,
                end_pos: span.end,
                metadata: json!({}),
                created_at: Utc::now(),
            });
            records.push(VectorRecord {
                id: chunk_id,
                embedding,
                metadata: json!({"kind": "chunk", "document_id": document.id}),
            });
        }

        self.metadata.create_chunks(rows).await?;
        self.vector
            .insert(&domain.collection_name(), records)
            .await?;

        let extraction = self.extractor.extract(content, &document.domain_id).await?;
        self.apply_extraction(extraction).await?;

        Ok(spans.len())
    }

    /// Upsert extracted entities and relations. Relations whose endpoints
    /// the extractor hallucinated are skipped, not fatal.
    async fn apply_extraction(&self, extraction: Extraction) -> NoemaResult<()> {
        for entity in extraction.entities {
            if self.graph.get_entity(&entity.id).await?.is_some() {
                self.graph.update_entity(entity).await?;
            } else {
                self.graph.create_entity(entity).await?;
            }
        }
        for relation in extraction.relations {
            match self.graph.create_relation(relation.clone()).await {
                Ok(()) => {}
                Err(NoemaError::NotFound { .. }) => {
                    warn!(relation = %relation.id, "skipping relation with missing endpoint");
                }
                Err(error) => return Err(error),
            }
        }
        Ok(())
    }

    async fn bump_generation(&self, domain_id: &str) {
        match self.cache.bump_generation(domain_id).await {
            Ok(generation) => debug!(domain = domain_id, generation, "cache generation bumped"),
            Err(error) => warn!(error = %error, "generation bump failed"),
        }
    }
}
