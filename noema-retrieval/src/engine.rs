//! SearchEngine: orchestrates one search across the three stores.
//!
//! Pipeline: validate → cache probe → concurrent fan-out (vector +
//! graph, per-source timeouts) → normalize → enrich → merge/dedup →
//! threshold/sort/paginate → optional rerank → highlights → cache write
//! and async log persist.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use noema_core::config::RetrievalConfig;
use noema_core::errors::{NoemaError, NoemaResult};
use noema_core::models::{
    metadata_str, Domain, GraphTraversalSpec, KnowledgeEntity, ResultKind, SearchLog,
    SearchOptions, SearchQuery, SearchResponse, SearchResult, SearchStats,
};
use noema_core::traits::{
    IEmbeddingProvider, IEntityExtractor, IGraphStore, IMetadataStore, IReranker, IResultCache,
    IVectorIndex,
};

use crate::ranking::LexicalReranker;
use crate::{cache_key, highlight, merge, normalize};

/// Source names surfaced in `degraded_sources`.
const SOURCE_VECTOR: &str = "vector";
const SOURCE_GRAPH: &str = "graph";
const SOURCE_METADATA: &str = "metadata";

/// Cap on distinct extracted names resolved to graph seeds.
const MAX_SEED_QUERIES: usize = 5;

/// Seeds resolved per extracted name.
const SEEDS_PER_NAME: usize = 3;

/// A pre-enrichment candidate from the vector index.
struct Candidate {
    id: String,
    kind: ResultKind,
    score: f64,
    metadata: serde_json::Value,
}

/// Fan-out output: already-normalized candidates plus degraded sources.
struct Gathered {
    vector: Vec<Candidate>,
    graph: Vec<SearchResult>,
    degraded: Vec<String>,
}

/// The retrieval orchestrator. Holds shared handles to every collaborator
/// and owns no state of its own beyond configuration.
pub struct SearchEngine {
    metadata: Arc<dyn IMetadataStore>,
    vector: Arc<dyn IVectorIndex>,
    graph: Arc<dyn IGraphStore>,
    cache: Arc<dyn IResultCache>,
    embedder: Arc<dyn IEmbeddingProvider>,
    extractor: Arc<dyn IEntityExtractor>,
    reranker: Arc<dyn IReranker>,
    config: RetrievalConfig,
}

impl SearchEngine {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        metadata: Arc<dyn IMetadataStore>,
        vector: Arc<dyn IVectorIndex>,
        graph: Arc<dyn IGraphStore>,
        cache: Arc<dyn IResultCache>,
        embedder: Arc<dyn IEmbeddingProvider>,
        extractor: Arc<dyn IEntityExtractor>,
        config: RetrievalConfig,
    ) -> Self {
        let reranker = Arc::new(LexicalReranker::new(
            config.rerank_base_weight,
            config.rerank_lexical_weight,
        ));
        Self {
            metadata,
            vector,
            graph,
            cache,
            embedder,
            extractor,
            reranker,
            config,
        }
    }

    /// Swap in a custom reranker.
    pub fn with_reranker(mut self, reranker: Arc<dyn IReranker>) -> Self {
        self.reranker = reranker;
        self
    }

    /// Execute one search. Validation failures surface before any
    /// downstream call; per-source failures degrade the response instead
    /// of failing it as long as at least one source answered.
    pub async fn search(&self, mut query: SearchQuery) -> NoemaResult<SearchResponse> {
        let started = Instant::now();
        query.options = self.validate(&query)?;

        let domain = self
            .metadata
            .get_domain(&query.domain_id)
            .await?
            .ok_or_else(|| NoemaError::not_found("domain", &query.domain_id))?;

        let generation = match self.cache.generation(&query.domain_id).await {
            Ok(generation) => generation,
            Err(error) => {
                warn!(error = %error, "generation lookup failed, keying against 0");
                0
            }
        };
        let key = cache_key::cache_key(&query, generation);

        if let Ok(Some(bytes)) = self.cache.get(&key).await {
            if let Ok(mut response) = serde_json::from_slice::<SearchResponse>(&bytes) {
                debug!(domain = %query.domain_id, "cache hit");
                response.from_cache = true;
                return Ok(response);
            }
        }

        let deadline = Duration::from_millis(self.config.deadline_ms);
        let gathered = tokio::time::timeout(deadline, self.gather(&query, &domain))
            .await
            .map_err(|_| NoemaError::DeadlineExceeded {
                elapsed_ms: started.elapsed().as_millis() as u64,
            })??;

        let mut degraded = gathered.degraded;
        // Enrichment gets the same per-source timeout as the fan-out; a
        // hung metadata store degrades the response instead of stalling it.
        let source_timeout = Duration::from_millis(self.config.source_timeout_ms);
        let enriched = tokio::time::timeout(source_timeout, self.enrich(&gathered.vector)).await;
        let mut candidates = match enriched {
            Ok(Ok(results)) => results,
            Ok(Err((fallback, error))) => {
                warn!(error = %error, "metadata enrichment failed, degrading");
                degraded.push(SOURCE_METADATA.into());
                fallback
            }
            Err(_) => {
                warn!(
                    timeout_ms = self.config.source_timeout_ms,
                    "metadata enrichment timed out"
                );
                degraded.push(SOURCE_METADATA.into());
                gathered.vector.iter().map(fallback_result).collect()
            }
        };
        candidates.extend(gathered.graph);

        if !query.options.result_types.is_empty() {
            candidates.retain(|c| query.options.result_types.contains(&c.kind));
        }

        let deduped = merge::dedup_max(candidates);
        let aggregations = count_kinds(&deduped, query.options.score_threshold);
        let (mut results, total_hits) = merge::page(
            deduped,
            query.options.score_threshold,
            query.options.offset,
            query.options.limit,
        );

        if query.options.rerank {
            match self.reranker.rerank(&query.text, results.clone()).await {
                Ok(reranked) => results = reranked,
                Err(error) => {
                    warn!(error = %error, "rerank failed, keeping base order");
                }
            }
        }

        if query.options.highlight {
            for result in &mut results {
                result.highlights = highlight::snippets(&query.text, &result.content);
            }
        }

        let response = SearchResponse {
            query_id: Uuid::new_v4().to_string(),
            query: query.text.clone(),
            total_hits,
            processing_ms: started.elapsed().as_millis() as u64,
            results,
            aggregations,
            partial: !degraded.is_empty(),
            degraded_sources: degraded,
            from_cache: false,
        };

        info!(
            domain = %query.domain_id,
            hits = response.total_hits,
            returned = response.results.len(),
            partial = response.partial,
            ms = response.processing_ms,
            "search complete"
        );

        self.cache_write(&key, &response, &domain).await;
        self.persist_log(&query, &response);

        Ok(response)
    }

    /// Aggregates over this domain's persisted search logs.
    pub async fn stats(&self, domain_id: &str) -> NoemaResult<SearchStats> {
        self.metadata
            .get_domain(domain_id)
            .await?
            .ok_or_else(|| NoemaError::not_found("domain", domain_id))?;
        self.metadata.search_stats(domain_id).await
    }

    /// Effective options: empty text and out-of-range thresholds are
    /// rejected, limits clamped.
    fn validate(&self, query: &SearchQuery) -> NoemaResult<SearchOptions> {
        if query.text.trim().is_empty() {
            return Err(NoemaError::invalid("query text must not be empty"));
        }
        let mut options = query.options.clone();
        if !(0.0..=1.0).contains(&options.score_threshold) {
            return Err(NoemaError::invalid(format!(
                "score_threshold {} outside [0, 1]",
                options.score_threshold
            )));
        }
        if options.limit == 0 {
            options.limit = self.config.default_limit;
        }
        options.limit = options.limit.min(self.config.max_limit);
        Ok(options)
    }

    /// Concurrent fan-out to the vector index and the graph store, each
    /// behind its own timeout. Errors become degraded-source markers
    /// unless every attempted source failed.
    async fn gather(&self, query: &SearchQuery, domain: &Domain) -> NoemaResult<Gathered> {
        let source_timeout = Duration::from_millis(self.config.source_timeout_ms);
        let top_k = query.options.limit * self.config.overfetch_factor;
        let wants_graph = query.options.include_graph
            || query.options.result_types.is_empty()
            || query.options.result_types.contains(&ResultKind::Entity);

        let vector_fut =
            tokio::time::timeout(source_timeout, self.vector_candidates(query, domain, top_k));
        let mut degraded = Vec::new();

        let (vector_outcome, graph_outcome) = if wants_graph {
            let graph_fut =
                tokio::time::timeout(source_timeout, self.graph_candidates(query, domain));
            let (v, g) = tokio::join!(vector_fut, graph_fut);
            (v, Some(g))
        } else {
            (vector_fut.await, None)
        };

        let vector = match vector_outcome {
            Ok(Ok(candidates)) => candidates,
            Ok(Err(error)) => {
                warn!(error = %error, "vector source failed");
                degraded.push(SOURCE_VECTOR.into());
                Vec::new()
            }
            Err(_) => {
                warn!(timeout_ms = self.config.source_timeout_ms, "vector source timed out");
                degraded.push(SOURCE_VECTOR.into());
                Vec::new()
            }
        };

        let graph = match graph_outcome {
            None => Vec::new(),
            Some(Ok(Ok(results))) => results,
            Some(Ok(Err(error))) => {
                warn!(error = %error, "graph source failed");
                degraded.push(SOURCE_GRAPH.into());
                Vec::new()
            }
            Some(Err(_)) => {
                warn!(timeout_ms = self.config.source_timeout_ms, "graph source timed out");
                degraded.push(SOURCE_GRAPH.into());
                Vec::new()
            }
        };

        let attempted = if wants_graph { 2 } else { 1 };
        if degraded.len() == attempted {
            return Err(NoemaError::unavailable(
                "search",
                "all retrieval sources failed",
            ));
        }

        Ok(Gathered {
            vector,
            graph,
            degraded,
        })
    }

    /// Embed the query and run top-K similarity search, normalizing
    /// native scores to [0,1].
    async fn vector_candidates(
        &self,
        query: &SearchQuery,
        domain: &Domain,
        top_k: usize,
    ) -> NoemaResult<Vec<Candidate>> {
        let embedding = self.embedder.embed(&query.text).await?;
        let hits = self
            .vector
            .search(&domain.collection_name(), &embedding, top_k)
            .await?;

        debug!(hits = hits.len(), top_k, "vector search returned");

        Ok(hits
            .into_iter()
            .map(|hit| {
                let kind = metadata_str(&hit.metadata, "kind")
                    .and_then(ResultKind::parse)
                    .unwrap_or(ResultKind::Chunk);
                Candidate {
                    id: hit.id,
                    kind,
                    score: normalize::vector_score(domain.config.metric, hit.score),
                    metadata: hit.metadata,
                }
            })
            .collect())
    }

    /// Extract entity mentions, resolve them to graph seeds, and traverse
    /// from each seed. Path scores are confidence products, already in
    /// [0,1].
    async fn graph_candidates(
        &self,
        query: &SearchQuery,
        domain: &Domain,
    ) -> NoemaResult<Vec<SearchResult>> {
        let extraction = self.extractor.extract(&query.text, &query.domain_id).await?;
        let mut names: Vec<String> = extraction
            .entities
            .iter()
            .map(|e| e.name.clone())
            .collect();
        if names.is_empty() {
            names.push(cache_key::normalize_text(&query.text));
        }
        names.truncate(MAX_SEED_QUERIES);

        let mut seeds: Vec<KnowledgeEntity> = Vec::new();
        for name in &names {
            let found = self
                .graph
                .search_entities(&query.domain_id, name, &[], SEEDS_PER_NAME)
                .await?;
            for entity in found {
                if seeds.iter().all(|s| s.id != entity.id) {
                    seeds.push(entity);
                }
            }
        }

        debug!(seeds = seeds.len(), "resolved graph seeds");

        let mut results = Vec::new();
        for seed in seeds {
            let spec = GraphTraversalSpec {
                start_entity: seed.id.clone(),
                max_depth: domain.config.max_traversal_depth,
                min_score: domain.config.traversal_min_score,
                ..GraphTraversalSpec::default()
            };
            let paths = self.graph.traverse(&spec).await?;

            results.push(entity_result(&seed, seed.confidence.value(), 0));
            for path in &paths {
                if let Some(terminal) = path.terminal() {
                    results.push(entity_result(terminal, path.score, path.length));
                }
            }
        }
        Ok(results)
    }

    /// Batched metadata enrichment of vector candidates. On failure,
    /// returns source-local fallback results built from vector metadata
    /// alone, plus the error for degradation marking.
    async fn enrich(
        &self,
        candidates: &[Candidate],
    ) -> Result<Vec<SearchResult>, (Vec<SearchResult>, NoemaError)> {
        let chunk_ids = ids_of_kind(candidates, ResultKind::Chunk);
        let document_ids = ids_of_kind(candidates, ResultKind::Document);
        let conversation_ids = ids_of_kind(candidates, ResultKind::Conversation);

        let fetched = async {
            let chunks = self.metadata.get_chunks_by_ids(&chunk_ids).await?;
            let parent_ids: Vec<String> = chunks.iter().map(|c| c.document_id.clone()).collect();
            let parents = self.metadata.get_documents_by_ids(&parent_ids).await?;
            let documents = self.metadata.get_documents_by_ids(&document_ids).await?;
            let conversations = self
                .metadata
                .get_conversations_by_ids(&conversation_ids)
                .await?;
            Ok::<_, NoemaError>((chunks, parents, documents, conversations))
        }
        .await;

        let (chunks, parents, documents, conversations) = match fetched {
            Ok(rows) => rows,
            Err(error) => {
                let fallback = candidates.iter().map(fallback_result).collect();
                return Err((fallback, error));
            }
        };

        let mut results = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let result = match candidate.kind {
                ResultKind::Chunk => chunks.iter().find(|c| c.id == candidate.id).map(|chunk| {
                    let parent = parents.iter().find(|d| d.id == chunk.document_id);
                    SearchResult {
                        id: chunk.id.clone(),
                        kind: ResultKind::Chunk,
                        title: parent.map(|d| d.title.clone()).unwrap_or_default(),
                        content: chunk.content.clone(),
                        source: parent.map(|d| d.source.clone()).unwrap_or_default(),
                        score: candidate.score,
                        highlights: Vec::new(),
                        metadata: chunk.metadata.clone(),
                        created_at: chunk.created_at,
                    }
                }),
                ResultKind::Document => {
                    documents.iter().find(|d| d.id == candidate.id).map(|doc| SearchResult {
                        id: doc.id.clone(),
                        kind: ResultKind::Document,
                        title: doc.title.clone(),
                        content: String::new(),
                        source: doc.source.clone(),
                        score: candidate.score,
                        highlights: Vec::new(),
                        metadata: doc.metadata.clone(),
                        created_at: doc.created_at,
                    })
                }
                ResultKind::Conversation => conversations
                    .iter()
                    .find(|c| c.id == candidate.id)
                    .map(|conv| SearchResult {
                        id: conv.id.clone(),
                        kind: ResultKind::Conversation,
                        title: "conversation".into(),
                        content: conv.text(),
                        source: conv.user_id.clone().unwrap_or_default(),
                        score: candidate.score,
                        highlights: Vec::new(),
                        metadata: conv.metadata.clone(),
                        created_at: conv.created_at,
                    }),
                ResultKind::Entity => None,
            };
            // A vector record with no metadata row is stale; fall back to
            // what the index carries instead of dropping the hit.
            results.push(result.unwrap_or_else(|| fallback_result(candidate)));
        }
        Ok(results)
    }

    async fn cache_write(&self, key: &str, response: &SearchResponse, domain: &Domain) {
        let bytes = match serde_json::to_vec(response) {
            Ok(bytes) => bytes,
            Err(error) => {
                warn!(error = %error, "response serialization for cache failed");
                return;
            }
        };
        let ttl = Duration::from_secs(domain.config.cache_ttl_secs);
        if let Err(error) = self.cache.set(key, bytes, ttl).await {
            warn!(error = %error, "cache write failed");
        }
    }

    /// Best-effort, off the request path.
    fn persist_log(&self, query: &SearchQuery, response: &SearchResponse) {
        let log = SearchLog {
            id: Uuid::new_v4().to_string(),
            query_id: response.query_id.clone(),
            domain_id: query.domain_id.clone(),
            user_id: query.context.user_id.clone(),
            query_text: query.text.clone(),
            options: serde_json::to_value(&query.options).unwrap_or(serde_json::Value::Null),
            total_hits: response.total_hits,
            response_time_ms: response.processing_ms,
            created_at: Utc::now(),
        };
        let metadata = Arc::clone(&self.metadata);
        tokio::spawn(async move {
            if let Err(error) = metadata.record_search(log).await {
                warn!(error = %error, "search log persist failed");
            }
        });
    }
}

fn ids_of_kind(candidates: &[Candidate], kind: ResultKind) -> Vec<String> {
    candidates
        .iter()
        .filter(|c| c.kind == kind)
        .map(|c| c.id.clone())
        .collect()
}

/// Result built from vector metadata alone, used when enrichment is
/// unavailable or the row is missing.
fn fallback_result(candidate: &Candidate) -> SearchResult {
    SearchResult {
        id: candidate.id.clone(),
        kind: candidate.kind,
        title: metadata_str(&candidate.metadata, "title")
            .unwrap_or_default()
            .to_string(),
        content: metadata_str(&candidate.metadata, "content")
            .unwrap_or_default()
            .to_string(),
        source: metadata_str(&candidate.metadata, "source")
            .unwrap_or_default()
            .to_string(),
        score: candidate.score,
        highlights: Vec::new(),
        metadata: candidate.metadata.clone(),
        created_at: Utc::now(),
    }
}

fn entity_result(entity: &KnowledgeEntity, score: f64, path_length: usize) -> SearchResult {
    SearchResult {
        id: entity.id.clone(),
        kind: ResultKind::Entity,
        title: entity.name.clone(),
        content: metadata_str(&entity.properties, "description")
            .unwrap_or(&entity.name)
            .to_string(),
        source: entity.source.clone(),
        score,
        highlights: Vec::new(),
        metadata: serde_json::json!({
            "entity_type": entity.entity_type,
            "labels": entity.labels,
            "path_length": path_length,
        }),
        created_at: entity.created_at,
    }
}

/// Counts per result kind over the thresholded candidate set.
fn count_kinds(candidates: &[SearchResult], threshold: f64) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for candidate in candidates.iter().filter(|c| c.score >= threshold) {
        let kind = candidate.kind.as_str();
        match counts.iter_mut().find(|(name, _)| name == kind) {
            Some((_, count)) => *count += 1,
            None => counts.push((kind.to_string(), 1)),
        }
    }
    counts.sort_by(|a, b| a.0.cmp(&b.0));
    counts
}
