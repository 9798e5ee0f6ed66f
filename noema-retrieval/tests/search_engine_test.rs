//! Integration tests for the search orchestrator, run against the
//! in-process store implementations and mock model providers.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;

use noema_cache::MemoryResultCache;
use noema_core::config::{CacheConfig, RetrievalConfig};
use noema_core::errors::{NoemaError, NoemaResult};
use noema_core::models::{
    CollectionStats, Confidence, Conversation, Document, DocumentChunk, DocumentStatus, Domain,
    DomainConfig, Extraction, Feedback, KnowledgeEntity, ResultKind, SearchLog, SearchQuery,
    SearchStats, User, VectorHit, VectorMetric, VectorRecord,
};
use noema_core::traits::{IEmbeddingProvider, IEntityExtractor, IGraphStore, IMetadataStore,
    IResultCache, IVectorIndex};
use noema_graph::MemoryGraphStore;
use noema_retrieval::SearchEngine;
use noema_storage::SqliteMetadataStore;
use noema_vector::MemoryVectorIndex;

const DIM: usize = 4;

/// Deterministic topic-axis embeddings.
fn axis_embedding(text: &str) -> Vec<f32> {
    let t = text.to_lowercase();
    if t.contains("password") {
        vec![1.0, 0.0, 0.0, 0.0]
    } else if t.contains("billing") {
        vec![0.0, 1.0, 0.0, 0.0]
    } else if t.contains("export") {
        vec![0.0, 0.0, 1.0, 0.0]
    } else {
        vec![0.0, 0.0, 0.0, 1.0]
    }
}

struct MockEmbedder;

#[async_trait]
impl IEmbeddingProvider for MockEmbedder {
    async fn embed(&self, text: &str) -> NoemaResult<Vec<f32>> {
        Ok(axis_embedding(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> NoemaResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| axis_embedding(t)).collect())
    }

    fn dimensions(&self) -> usize {
        DIM
    }

    fn name(&self) -> &str {
        "mock-embedder"
    }
}

struct FailingEmbedder;

#[async_trait]
impl IEmbeddingProvider for FailingEmbedder {
    async fn embed(&self, _text: &str) -> NoemaResult<Vec<f32>> {
        Err(NoemaError::ExternalService {
            service: "embedder".into(),
            reason: "connection refused".into(),
        })
    }

    async fn embed_batch(&self, _texts: &[String]) -> NoemaResult<Vec<Vec<f32>>> {
        Err(NoemaError::ExternalService {
            service: "embedder".into(),
            reason: "connection refused".into(),
        })
    }

    fn dimensions(&self) -> usize {
        DIM
    }

    fn name(&self) -> &str {
        "failing-embedder"
    }
}

/// Yields one entity mention per query token.
struct MockExtractor;

#[async_trait]
impl IEntityExtractor for MockExtractor {
    async fn extract(&self, text: &str, domain_id: &str) -> NoemaResult<Extraction> {
        let entities = text
            .split_whitespace()
            .map(|token| entity(&format!("mention-{token}"), domain_id, token, 0.9))
            .collect();
        Ok(Extraction {
            entities,
            relations: Vec::new(),
        })
    }
}

struct FailingVectorIndex;

#[async_trait]
impl IVectorIndex for FailingVectorIndex {
    async fn create_collection(
        &self,
        _name: &str,
        _dimension: usize,
        _metric: VectorMetric,
    ) -> NoemaResult<()> {
        Err(NoemaError::unavailable("vector", "index offline"))
    }

    async fn drop_collection(&self, _name: &str) -> NoemaResult<()> {
        Err(NoemaError::unavailable("vector", "index offline"))
    }

    async fn has_collection(&self, _name: &str) -> NoemaResult<bool> {
        Err(NoemaError::unavailable("vector", "index offline"))
    }

    async fn insert(&self, _collection: &str, _records: Vec<VectorRecord>) -> NoemaResult<()> {
        Err(NoemaError::unavailable("vector", "index offline"))
    }

    async fn update(&self, _collection: &str, _records: Vec<VectorRecord>) -> NoemaResult<()> {
        Err(NoemaError::unavailable("vector", "index offline"))
    }

    async fn delete(&self, _collection: &str, _ids: &[String]) -> NoemaResult<()> {
        Err(NoemaError::unavailable("vector", "index offline"))
    }

    async fn search(
        &self,
        _collection: &str,
        _query: &[f32],
        _top_k: usize,
    ) -> NoemaResult<Vec<VectorHit>> {
        Err(NoemaError::unavailable("vector", "index offline"))
    }

    async fn collection_stats(&self, _name: &str) -> NoemaResult<CollectionStats> {
        Err(NoemaError::unavailable("vector", "index offline"))
    }
}

/// Delegates to SQLite everywhere except chunk enrichment, which hangs.
struct StalledChunkLookups {
    inner: Arc<SqliteMetadataStore>,
}

#[async_trait]
impl IMetadataStore for StalledChunkLookups {
    async fn create_domain(&self, domain: Domain) -> NoemaResult<()> {
        self.inner.create_domain(domain).await
    }

    async fn get_domain(&self, id: &str) -> NoemaResult<Option<Domain>> {
        self.inner.get_domain(id).await
    }

    async fn get_domain_by_name(&self, name: &str) -> NoemaResult<Option<Domain>> {
        self.inner.get_domain_by_name(name).await
    }

    async fn update_domain(&self, domain: Domain) -> NoemaResult<()> {
        self.inner.update_domain(domain).await
    }

    async fn delete_domain(&self, id: &str) -> NoemaResult<()> {
        self.inner.delete_domain(id).await
    }

    async fn list_domains(&self, offset: usize, limit: usize) -> NoemaResult<Vec<Domain>> {
        self.inner.list_domains(offset, limit).await
    }

    async fn create_user(&self, user: User) -> NoemaResult<()> {
        self.inner.create_user(user).await
    }

    async fn get_user(&self, id: &str) -> NoemaResult<Option<User>> {
        self.inner.get_user(id).await
    }

    async fn create_document(&self, document: Document) -> NoemaResult<()> {
        self.inner.create_document(document).await
    }

    async fn get_document(&self, id: &str) -> NoemaResult<Option<Document>> {
        self.inner.get_document(id).await
    }

    async fn update_document(&self, document: Document) -> NoemaResult<()> {
        self.inner.update_document(document).await
    }

    async fn delete_document(&self, id: &str) -> NoemaResult<()> {
        self.inner.delete_document(id).await
    }

    async fn list_documents(
        &self,
        domain_id: &str,
        offset: usize,
        limit: usize,
    ) -> NoemaResult<Vec<Document>> {
        self.inner.list_documents(domain_id, offset, limit).await
    }

    async fn get_documents_by_ids(&self, ids: &[String]) -> NoemaResult<Vec<Document>> {
        self.inner.get_documents_by_ids(ids).await
    }

    async fn create_chunks(&self, chunks: Vec<DocumentChunk>) -> NoemaResult<()> {
        self.inner.create_chunks(chunks).await
    }

    async fn get_chunks_by_ids(&self, _ids: &[String]) -> NoemaResult<Vec<DocumentChunk>> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(Vec::new())
    }

    async fn list_chunks(&self, document_id: &str) -> NoemaResult<Vec<DocumentChunk>> {
        self.inner.list_chunks(document_id).await
    }

    async fn delete_chunks(&self, document_id: &str) -> NoemaResult<()> {
        self.inner.delete_chunks(document_id).await
    }

    async fn create_conversation(&self, conversation: Conversation) -> NoemaResult<()> {
        self.inner.create_conversation(conversation).await
    }

    async fn get_conversations_by_ids(&self, ids: &[String]) -> NoemaResult<Vec<Conversation>> {
        self.inner.get_conversations_by_ids(ids).await
    }

    async fn create_feedback(&self, feedback: Feedback) -> NoemaResult<()> {
        self.inner.create_feedback(feedback).await
    }

    async fn list_feedback(&self, query_id: &str) -> NoemaResult<Vec<Feedback>> {
        self.inner.list_feedback(query_id).await
    }

    async fn record_search(&self, log: SearchLog) -> NoemaResult<()> {
        self.inner.record_search(log).await
    }

    async fn search_stats(&self, domain_id: &str) -> NoemaResult<SearchStats> {
        self.inner.search_stats(domain_id).await
    }
}

fn domain(id: &str, name: &str) -> Domain {
    let now = Utc::now();
    Domain {
        id: id.into(),
        name: name.into(),
        description: String::new(),
        config: DomainConfig {
            vector_dimension: DIM,
            ..DomainConfig::default()
        },
        created_at: now,
        updated_at: now,
    }
}

fn document(id: &str, domain_id: &str, title: &str) -> Document {
    let now = Utc::now();
    Document {
        id: id.into(),
        domain_id: domain_id.into(),
        title: title.into(),
        content_type: "text/plain".into(),
        source: "kb".into(),
        tags: Vec::new(),
        metadata: json!({}),
        status: DocumentStatus::Completed,
        chunk_count: 0,
        created_at: now,
        updated_at: now,
    }
}

fn chunk(id: &str, document_id: &str, content: &str) -> DocumentChunk {
    DocumentChunk {
        id: id.into(),
        document_id: document_id.into(),
        content: content.into(),
        start_pos: 0,
        end_pos: content.len(),
        metadata: json!({}),
        created_at: Utc::now(),
    }
}

fn entity(id: &str, domain_id: &str, name: &str, confidence: f64) -> KnowledgeEntity {
    let now = Utc::now();
    KnowledgeEntity {
        id: id.into(),
        domain_id: domain_id.into(),
        entity_type: "concept".into(),
        name: name.into(),
        labels: Vec::new(),
        properties: json!({}),
        source: "test".into(),
        confidence: Confidence::new(confidence),
        created_at: now,
        updated_at: now,
    }
}

struct Fixture {
    metadata: Arc<SqliteMetadataStore>,
    vector: Arc<MemoryVectorIndex>,
    graph: Arc<MemoryGraphStore>,
    cache: Arc<MemoryResultCache>,
}

impl Fixture {
    fn new() -> Self {
        Self {
            metadata: Arc::new(SqliteMetadataStore::open_in_memory().unwrap()),
            vector: Arc::new(MemoryVectorIndex::new()),
            graph: Arc::new(MemoryGraphStore::new()),
            cache: Arc::new(MemoryResultCache::new(&CacheConfig::default())),
        }
    }

    fn engine(&self) -> SearchEngine {
        SearchEngine::new(
            self.metadata.clone(),
            self.vector.clone(),
            self.graph.clone(),
            self.cache.clone(),
            Arc::new(MockEmbedder),
            Arc::new(MockExtractor),
            RetrievalConfig::default(),
        )
    }
}

/// "general" domain: 3 documents, 10 chunks, topic-axis embeddings.
async fn seed_general(fixture: &Fixture) {
    fixture.metadata.create_domain(domain("d1", "general")).await.unwrap();
    fixture
        .vector
        .create_collection("domain_d1", DIM, VectorMetric::Cosine)
        .await
        .unwrap();

    let docs = [
        ("doc-pass", "Password guide"),
        ("doc-bill", "Billing guide"),
        ("doc-exp", "Export guide"),
    ];
    for (id, title) in docs {
        fixture.metadata.create_document(document(id, "d1", title)).await.unwrap();
    }

    let chunks = [
        ("c-p1", "doc-pass", "how to reset your password from settings"),
        ("c-p2", "doc-pass", "password strength requirements"),
        ("c-p3", "doc-pass", "forgot password recovery flow"),
        ("c-p4", "doc-pass", "password expiry policy"),
        ("c-b1", "doc-bill", "billing cycle overview"),
        ("c-b2", "doc-bill", "billing invoice downloads"),
        ("c-b3", "doc-bill", "billing payment methods"),
        ("c-e1", "doc-exp", "export data as csv"),
        ("c-e2", "doc-exp", "export scheduling"),
        ("c-e3", "doc-exp", "export size limits"),
    ];
    let mut rows = Vec::new();
    let mut records = Vec::new();
    for (id, doc_id, content) in chunks {
        rows.push(chunk(id, doc_id, content));
        records.push(VectorRecord {
            id: id.into(),
            embedding: axis_embedding(content),
            metadata: json!({"kind": "chunk"}),
        });
    }
    fixture.metadata.create_chunks(rows).await.unwrap();
    fixture.vector.insert("domain_d1", records).await.unwrap();
}

fn chunk_query(text: &str) -> SearchQuery {
    let mut query = SearchQuery::new(text, "d1");
    query.options.result_types = vec![ResultKind::Chunk];
    query
}

#[tokio::test]
async fn empty_query_text_is_rejected() {
    let fixture = Fixture::new();
    let err = fixture.engine().search(SearchQuery::new("   ", "d1")).await.unwrap_err();
    assert!(matches!(err, NoemaError::InvalidArgument { .. }));
}

#[tokio::test]
async fn out_of_range_threshold_is_rejected() {
    let fixture = Fixture::new();
    let mut query = SearchQuery::new("anything", "d1");
    query.options.score_threshold = 1.5;
    let err = fixture.engine().search(query).await.unwrap_err();
    assert!(matches!(err, NoemaError::InvalidArgument { .. }));
}

#[tokio::test]
async fn unknown_domain_is_not_found() {
    let fixture = Fixture::new();
    let err = fixture
        .engine()
        .search(SearchQuery::new("anything", "ghost"))
        .await
        .unwrap_err();
    assert!(matches!(err, NoemaError::NotFound { .. }));
}

#[tokio::test]
async fn general_domain_end_to_end() {
    let fixture = Fixture::new();
    seed_general(&fixture).await;
    let engine = fixture.engine();

    let mut query = chunk_query("reset password");
    query.options.limit = 5;
    let response = engine.search(query).await.unwrap();

    assert_eq!(response.results.len(), 5);
    assert_eq!(response.total_hits, 10);
    assert!(!response.partial);
    assert!(response.degraded_sources.is_empty());
    assert!(!response.from_cache);

    // Scores normalized and descending.
    for result in &response.results {
        assert!((0.0..=1.0).contains(&result.score));
    }
    for pair in response.results.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }

    // Password chunks rank first; they match the query axis exactly.
    let top_ids: Vec<&str> = response.results[..4].iter().map(|r| r.id.as_str()).collect();
    for id in ["c-p1", "c-p2", "c-p3", "c-p4"] {
        assert!(top_ids.contains(&id), "missing {id} in {top_ids:?}");
    }

    // Enrichment pulled titles from the parent document.
    assert_eq!(response.results[0].title, "Password guide");
    assert_eq!(response.aggregations, vec![("chunk".to_string(), 10)]);
}

#[tokio::test]
async fn repeat_search_is_served_from_cache() {
    let fixture = Fixture::new();
    seed_general(&fixture).await;
    let engine = fixture.engine();

    let first = engine.search(chunk_query("reset password")).await.unwrap();
    let second = engine.search(chunk_query("reset password")).await.unwrap();

    assert!(!first.from_cache);
    assert!(second.from_cache);
    assert_eq!(first.total_hits, second.total_hits);
    let ids = |r: &noema_core::models::SearchResponse| {
        r.results.iter().map(|x| x.id.clone()).collect::<Vec<_>>()
    };
    assert_eq!(ids(&first), ids(&second));
}

#[tokio::test]
async fn generation_bump_invalidates_cached_responses() {
    let fixture = Fixture::new();
    seed_general(&fixture).await;
    let engine = fixture.engine();

    engine.search(chunk_query("reset password")).await.unwrap();
    fixture.cache.bump_generation("d1").await.unwrap();
    let after = engine.search(chunk_query("reset password")).await.unwrap();
    assert!(!after.from_cache);
}

#[tokio::test]
async fn offset_pages_are_disjoint() {
    let fixture = Fixture::new();
    seed_general(&fixture).await;
    let engine = fixture.engine();

    let mut first = chunk_query("reset password");
    first.options.limit = 3;
    let mut second = chunk_query("reset password");
    second.options.limit = 3;
    second.options.offset = 3;

    let a = engine.search(first).await.unwrap();
    let b = engine.search(second).await.unwrap();
    assert_eq!(a.results.len(), 3);
    assert_eq!(b.results.len(), 3);
    for result in &b.results {
        assert!(a.results.iter().all(|r| r.id != result.id));
    }
}

#[tokio::test]
async fn score_threshold_drops_off_axis_chunks() {
    let fixture = Fixture::new();
    seed_general(&fixture).await;
    let engine = fixture.engine();

    // On-axis chunks normalize to 1.0, orthogonal ones to 0.5.
    let mut query = chunk_query("reset password");
    query.options.score_threshold = 0.8;
    let response = engine.search(query).await.unwrap();
    assert_eq!(response.total_hits, 4);
    assert!(response.results.iter().all(|r| r.id.starts_with("c-p")));
}

#[tokio::test]
async fn corroborated_result_keeps_the_max_score() {
    let fixture = Fixture::new();
    fixture.metadata.create_domain(domain("d1", "general")).await.unwrap();
    fixture
        .vector
        .create_collection("domain_d1", DIM, VectorMetric::Cosine)
        .await
        .unwrap();

    // Same id reachable from both sources: graph gives 0.9, the vector
    // index an orthogonal hit normalizing to 0.5.
    fixture
        .graph
        .create_entity(entity("ent-1", "d1", "Password Policy", 0.9))
        .await
        .unwrap();
    fixture
        .vector
        .insert(
            "domain_d1",
            vec![VectorRecord {
                id: "ent-1".into(),
                embedding: vec![0.0, 0.0, 0.0, 1.0],
                metadata: json!({"kind": "entity", "title": "Password Policy"}),
            }],
        )
        .await
        .unwrap();

    let response = fixture.engine().search(SearchQuery::new("password", "d1")).await.unwrap();
    let hits: Vec<_> = response.results.iter().filter(|r| r.id == "ent-1").collect();
    assert_eq!(hits.len(), 1);
    assert!((hits[0].score - 0.9).abs() < 1e-9);
}

#[tokio::test]
async fn degraded_vector_store_still_answers_from_graph() {
    let fixture = Fixture::new();
    fixture.metadata.create_domain(domain("d1", "general")).await.unwrap();
    fixture
        .graph
        .create_entity(entity("ent-1", "d1", "Password Policy", 0.8))
        .await
        .unwrap();

    let engine = SearchEngine::new(
        fixture.metadata.clone(),
        Arc::new(FailingVectorIndex),
        fixture.graph.clone(),
        fixture.cache.clone(),
        Arc::new(MockEmbedder),
        Arc::new(MockExtractor),
        RetrievalConfig::default(),
    );

    let response = engine.search(SearchQuery::new("password", "d1")).await.unwrap();
    assert!(response.partial);
    assert_eq!(response.degraded_sources, vec!["vector".to_string()]);
    assert!(response.results.iter().any(|r| r.id == "ent-1"));
}

#[tokio::test]
async fn embed_failure_degrades_to_graph_results() {
    let fixture = Fixture::new();
    fixture.metadata.create_domain(domain("d1", "general")).await.unwrap();
    fixture
        .graph
        .create_entity(entity("ent-1", "d1", "Password Policy", 0.8))
        .await
        .unwrap();

    let engine = SearchEngine::new(
        fixture.metadata.clone(),
        fixture.vector.clone(),
        fixture.graph.clone(),
        fixture.cache.clone(),
        Arc::new(FailingEmbedder),
        Arc::new(MockExtractor),
        RetrievalConfig::default(),
    );

    let response = engine.search(SearchQuery::new("password", "d1")).await.unwrap();
    assert!(response.partial);
    assert!(response.degraded_sources.contains(&"vector".to_string()));
    assert!(response.results.iter().any(|r| r.id == "ent-1"));
}

#[tokio::test]
async fn all_sources_failing_is_unavailable() {
    let fixture = Fixture::new();
    fixture.metadata.create_domain(domain("d1", "general")).await.unwrap();

    let engine = SearchEngine::new(
        fixture.metadata.clone(),
        Arc::new(FailingVectorIndex),
        fixture.graph.clone(),
        fixture.cache.clone(),
        Arc::new(MockEmbedder),
        Arc::new(MockExtractor),
        RetrievalConfig::default(),
    );

    // Chunk-only search never consults the graph, so the failing vector
    // index is the only attempted source.
    let err = engine.search(chunk_query("password")).await.unwrap_err();
    assert!(matches!(err, NoemaError::Unavailable { .. }));
}

#[tokio::test]
async fn stalled_enrichment_degrades_instead_of_hanging() {
    let fixture = Fixture::new();
    seed_general(&fixture).await;

    let engine = SearchEngine::new(
        Arc::new(StalledChunkLookups {
            inner: fixture.metadata.clone(),
        }),
        fixture.vector.clone(),
        fixture.graph.clone(),
        fixture.cache.clone(),
        Arc::new(MockEmbedder),
        Arc::new(MockExtractor),
        RetrievalConfig {
            source_timeout_ms: 100,
            ..RetrievalConfig::default()
        },
    );

    let response = tokio::time::timeout(
        Duration::from_secs(5),
        engine.search(chunk_query("reset password")),
    )
    .await
    .expect("a hung metadata store must not stall the search")
    .unwrap();

    assert!(response.partial);
    assert!(response.degraded_sources.contains(&"metadata".to_string()));
    // Results fall back to what the vector index carries.
    assert_eq!(response.total_hits, 10);
}

#[tokio::test]
async fn rerank_and_highlight_flags_apply() {
    let fixture = Fixture::new();
    seed_general(&fixture).await;
    let engine = fixture.engine();

    let mut query = chunk_query("reset password");
    query.options.rerank = true;
    query.options.highlight = true;
    let response = engine.search(query).await.unwrap();

    let top = &response.results[0];
    assert!(top.content.contains("password"));
    assert!(!top.highlights.is_empty());
    assert!(top.highlights[0].to_lowercase().contains("password"));
}

#[tokio::test]
async fn limit_is_clamped_to_the_configured_max() {
    let fixture = Fixture::new();
    seed_general(&fixture).await;
    let engine = fixture.engine();

    let mut query = chunk_query("reset password");
    query.options.limit = 100_000;
    let response = engine.search(query).await.unwrap();
    assert!(response.results.len() <= RetrievalConfig::default().max_limit);
}

#[tokio::test]
async fn stats_aggregate_persisted_search_logs() {
    let fixture = Fixture::new();
    seed_general(&fixture).await;
    let engine = fixture.engine();

    engine.search(chunk_query("reset password")).await.unwrap();
    engine.search(chunk_query("billing invoice")).await.unwrap();

    // Log writes are spawned off the request path.
    tokio::time::sleep(Duration::from_millis(100)).await;

    let stats = engine.stats("d1").await.unwrap();
    assert_eq!(stats.total_searches, 2);
    assert!(stats.top_queries.iter().any(|(q, _)| q == "reset password"));

    let err = engine.stats("ghost").await.unwrap_err();
    assert!(matches!(err, NoemaError::NotFound { .. }));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_searches_agree() {
    let fixture = Fixture::new();
    seed_general(&fixture).await;
    let engine = Arc::new(fixture.engine());

    let mut handles = Vec::new();
    for _ in 0..100 {
        let engine = Arc::clone(&engine);
        handles.push(tokio::spawn(async move {
            engine.search(chunk_query("reset password")).await
        }));
    }

    let mut totals = Vec::new();
    for handle in handles {
        let response = handle.await.unwrap().unwrap();
        totals.push(response.total_hits);
    }
    assert!(totals.iter().all(|&t| t == totals[0]));
    assert_eq!(totals[0], 10);
}
