use async_trait::async_trait;

use crate::errors::NoemaResult;
use crate::models::{
    GraphPath, GraphStats, GraphTraversalSpec, KnowledgeEntity, KnowledgeRelation,
};

/// Labeled property graph: entity/relation CRUD, bounded traversal,
/// path-finding.
#[async_trait]
pub trait IGraphStore: Send + Sync {
    // --- Entities ---
    async fn create_entity(&self, entity: KnowledgeEntity) -> NoemaResult<()>;
    async fn get_entity(&self, id: &str) -> NoemaResult<Option<KnowledgeEntity>>;
    /// Full-record replacement; partial patches are not supported.
    async fn update_entity(&self, entity: KnowledgeEntity) -> NoemaResult<()>;
    /// Deletes the entity and cascades to all incident relations.
    async fn delete_entity(&self, id: &str) -> NoemaResult<()>;

    // --- Relations ---
    async fn create_relation(&self, relation: KnowledgeRelation) -> NoemaResult<()>;
    async fn get_relation(&self, id: &str) -> NoemaResult<Option<KnowledgeRelation>>;
    async fn update_relation(&self, relation: KnowledgeRelation) -> NoemaResult<()>;
    async fn delete_relation(&self, id: &str) -> NoemaResult<()>;
    /// List relations filtered by endpoint ids and/or type; `None` means
    /// no filter on that slot.
    async fn list_relations(
        &self,
        from: Option<&str>,
        to: Option<&str>,
        relation_type: Option<&str>,
    ) -> NoemaResult<Vec<KnowledgeRelation>>;

    // --- Traversal ---
    /// Bounded BFS from the spec's start entity. A missing start entity
    /// yields an empty path set, not an error.
    async fn traverse(&self, spec: &GraphTraversalSpec) -> NoemaResult<Vec<GraphPath>>;

    /// All acyclic paths between two entities up to `max_depth` edges,
    /// ranked like traversal results.
    async fn find_path(
        &self,
        from: &str,
        to: &str,
        max_depth: usize,
    ) -> NoemaResult<Vec<GraphPath>>;

    /// Case-insensitive name search scoped by domain.
    async fn search_entities(
        &self,
        domain_id: &str,
        name_query: &str,
        entity_types: &[String],
        limit: usize,
    ) -> NoemaResult<Vec<KnowledgeEntity>>;

    async fn stats(&self, domain_id: &str) -> NoemaResult<GraphStats>;
}
