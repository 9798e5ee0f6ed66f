//! SQLite metadata store.
//!
//! Owns durable identity for domains, users, documents, chunks,
//! conversations, feedback, and search logs. File-backed mode runs WAL
//! with a read pool; in-memory mode (tests) routes reads through the
//! writer.

pub mod migrations;
pub mod pool;
pub mod queries;

use std::path::Path;

use async_trait::async_trait;

use noema_core::errors::NoemaResult;
use noema_core::models::{
    Conversation, Document, DocumentChunk, Domain, Feedback, SearchLog, SearchStats, User,
};
use noema_core::traits::IMetadataStore;

use crate::pool::ConnectionPool;

/// The metadata store engine. Owns the connection pool and provides the
/// full `IMetadataStore` interface.
pub struct SqliteMetadataStore {
    pool: ConnectionPool,
}

impl SqliteMetadataStore {
    /// Open a store backed by a file on disk.
    pub fn open(path: &Path) -> NoemaResult<Self> {
        let pool = ConnectionPool::open(path, ConnectionPool::default_size())?;
        let store = Self { pool };
        store.initialize()?;
        Ok(store)
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory() -> NoemaResult<Self> {
        let pool = ConnectionPool::open_in_memory()?;
        let store = Self { pool };
        store.initialize()?;
        Ok(store)
    }

    fn initialize(&self) -> NoemaResult<()> {
        self.pool.with_writer(|conn| migrations::run_migrations(conn))
    }

    /// Access the underlying pool (for maintenance operations).
    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }
}

#[async_trait]
impl IMetadataStore for SqliteMetadataStore {
    // --- Domains ---

    async fn create_domain(&self, domain: Domain) -> NoemaResult<()> {
        self.pool.with_writer(|conn| queries::domain_ops::insert(conn, &domain))
    }

    async fn get_domain(&self, id: &str) -> NoemaResult<Option<Domain>> {
        self.pool.with_reader(|conn| queries::domain_ops::get(conn, id))
    }

    async fn get_domain_by_name(&self, name: &str) -> NoemaResult<Option<Domain>> {
        self.pool
            .with_reader(|conn| queries::domain_ops::get_by_name(conn, name))
    }

    async fn update_domain(&self, domain: Domain) -> NoemaResult<()> {
        self.pool.with_writer(|conn| queries::domain_ops::update(conn, &domain))
    }

    async fn delete_domain(&self, id: &str) -> NoemaResult<()> {
        self.pool.with_writer(|conn| queries::domain_ops::delete(conn, id))
    }

    async fn list_domains(&self, offset: usize, limit: usize) -> NoemaResult<Vec<Domain>> {
        self.pool
            .with_reader(|conn| queries::domain_ops::list(conn, offset, limit))
    }

    // --- Users ---

    async fn create_user(&self, user: User) -> NoemaResult<()> {
        self.pool
            .with_writer(|conn| queries::conversation_ops::insert_user(conn, &user))
    }

    async fn get_user(&self, id: &str) -> NoemaResult<Option<User>> {
        self.pool
            .with_reader(|conn| queries::conversation_ops::get_user(conn, id))
    }

    // --- Documents ---

    async fn create_document(&self, document: Document) -> NoemaResult<()> {
        self.pool
            .with_writer(|conn| queries::document_ops::insert(conn, &document))
    }

    async fn get_document(&self, id: &str) -> NoemaResult<Option<Document>> {
        self.pool.with_reader(|conn| queries::document_ops::get(conn, id))
    }

    async fn update_document(&self, document: Document) -> NoemaResult<()> {
        self.pool
            .with_writer(|conn| queries::document_ops::update(conn, &document))
    }

    async fn delete_document(&self, id: &str) -> NoemaResult<()> {
        self.pool.with_writer(|conn| queries::document_ops::delete(conn, id))
    }

    async fn list_documents(
        &self,
        domain_id: &str,
        offset: usize,
        limit: usize,
    ) -> NoemaResult<Vec<Document>> {
        self.pool
            .with_reader(|conn| queries::document_ops::list_by_domain(conn, domain_id, offset, limit))
    }

    async fn get_documents_by_ids(&self, ids: &[String]) -> NoemaResult<Vec<Document>> {
        self.pool
            .with_reader(|conn| queries::document_ops::get_by_ids(conn, ids))
    }

    // --- Chunks ---

    async fn create_chunks(&self, chunks: Vec<DocumentChunk>) -> NoemaResult<()> {
        self.pool
            .with_writer(|conn| queries::document_ops::insert_chunks(conn, &chunks))
    }

    async fn get_chunks_by_ids(&self, ids: &[String]) -> NoemaResult<Vec<DocumentChunk>> {
        self.pool
            .with_reader(|conn| queries::document_ops::chunks_by_ids(conn, ids))
    }

    async fn list_chunks(&self, document_id: &str) -> NoemaResult<Vec<DocumentChunk>> {
        self.pool
            .with_reader(|conn| queries::document_ops::chunks_by_document(conn, document_id))
    }

    async fn delete_chunks(&self, document_id: &str) -> NoemaResult<()> {
        self.pool
            .with_writer(|conn| queries::document_ops::delete_chunks(conn, document_id))
    }

    // --- Conversations ---

    async fn create_conversation(&self, conversation: Conversation) -> NoemaResult<()> {
        self.pool
            .with_writer(|conn| queries::conversation_ops::insert_conversation(conn, &conversation))
    }

    async fn get_conversations_by_ids(&self, ids: &[String]) -> NoemaResult<Vec<Conversation>> {
        self.pool
            .with_reader(|conn| queries::conversation_ops::conversations_by_ids(conn, ids))
    }

    // --- Feedback ---

    async fn create_feedback(&self, feedback: Feedback) -> NoemaResult<()> {
        self.pool
            .with_writer(|conn| queries::conversation_ops::insert_feedback(conn, &feedback))
    }

    async fn list_feedback(&self, query_id: &str) -> NoemaResult<Vec<Feedback>> {
        self.pool
            .with_reader(|conn| queries::conversation_ops::feedback_by_query(conn, query_id))
    }

    // --- Search logs ---

    async fn record_search(&self, log: SearchLog) -> NoemaResult<()> {
        self.pool.with_writer(|conn| queries::search_ops::insert(conn, &log))
    }

    async fn search_stats(&self, domain_id: &str) -> NoemaResult<SearchStats> {
        self.pool
            .with_reader(|conn| queries::search_ops::stats(conn, domain_id))
    }
}
