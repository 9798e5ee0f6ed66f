use async_trait::async_trait;

use crate::errors::NoemaResult;
use crate::models::{
    Conversation, Document, DocumentChunk, Domain, Feedback, SearchLog, SearchStats, User,
};

/// Relational metadata store: durable identity for domains, documents,
/// chunks, conversations, users, feedback, and search logs.
#[async_trait]
pub trait IMetadataStore: Send + Sync {
    // --- Domains ---
    async fn create_domain(&self, domain: Domain) -> NoemaResult<()>;
    async fn get_domain(&self, id: &str) -> NoemaResult<Option<Domain>>;
    async fn get_domain_by_name(&self, name: &str) -> NoemaResult<Option<Domain>>;
    async fn update_domain(&self, domain: Domain) -> NoemaResult<()>;
    async fn delete_domain(&self, id: &str) -> NoemaResult<()>;
    async fn list_domains(&self, offset: usize, limit: usize) -> NoemaResult<Vec<Domain>>;

    // --- Users ---
    async fn create_user(&self, user: User) -> NoemaResult<()>;
    async fn get_user(&self, id: &str) -> NoemaResult<Option<User>>;

    // --- Documents ---
    async fn create_document(&self, document: Document) -> NoemaResult<()>;
    async fn get_document(&self, id: &str) -> NoemaResult<Option<Document>>;
    async fn update_document(&self, document: Document) -> NoemaResult<()>;
    async fn delete_document(&self, id: &str) -> NoemaResult<()>;
    async fn list_documents(
        &self,
        domain_id: &str,
        offset: usize,
        limit: usize,
    ) -> NoemaResult<Vec<Document>>;
    /// Batched lookup for result enrichment.
    async fn get_documents_by_ids(&self, ids: &[String]) -> NoemaResult<Vec<Document>>;

    // --- Chunks ---
    async fn create_chunks(&self, chunks: Vec<DocumentChunk>) -> NoemaResult<()>;
    async fn get_chunks_by_ids(&self, ids: &[String]) -> NoemaResult<Vec<DocumentChunk>>;
    async fn list_chunks(&self, document_id: &str) -> NoemaResult<Vec<DocumentChunk>>;
    /// Remove every chunk of a document.
    async fn delete_chunks(&self, document_id: &str) -> NoemaResult<()>;

    // --- Conversations ---
    async fn create_conversation(&self, conversation: Conversation) -> NoemaResult<()>;
    async fn get_conversations_by_ids(&self, ids: &[String]) -> NoemaResult<Vec<Conversation>>;

    // --- Feedback ---
    async fn create_feedback(&self, feedback: Feedback) -> NoemaResult<()>;
    async fn list_feedback(&self, query_id: &str) -> NoemaResult<Vec<Feedback>>;

    // --- Search logs ---
    async fn record_search(&self, log: SearchLog) -> NoemaResult<()>;
    async fn search_stats(&self, domain_id: &str) -> NoemaResult<SearchStats>;
}
