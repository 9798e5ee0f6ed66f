//! Property-graph store on petgraph.
//!
//! Entities are nodes, typed relations are directed edges. Endpoints of
//! a relation must exist and belong to the same domain; deleting an
//! entity cascades to its incident relations.

mod traverse;

use std::collections::HashMap;

use async_trait::async_trait;
use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::stable_graph::StableDiGraph;
use petgraph::visit::EdgeRef;
use tokio::sync::RwLock;
use tracing::debug;

use noema_core::errors::{NoemaError, NoemaResult};
use noema_core::models::{
    Direction, GraphPath, GraphStats, GraphTraversalSpec, KnowledgeEntity, KnowledgeRelation,
};
use noema_core::traits::IGraphStore;

#[derive(Default)]
struct GraphInner {
    graph: StableDiGraph<KnowledgeEntity, KnowledgeRelation>,
    nodes: HashMap<String, NodeIndex>,
    edges: HashMap<String, EdgeIndex>,
}

/// In-memory `IGraphStore` implementation.
pub struct MemoryGraphStore {
    inner: RwLock<GraphInner>,
}

impl MemoryGraphStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(GraphInner::default()),
        }
    }
}

impl Default for MemoryGraphStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IGraphStore for MemoryGraphStore {
    async fn create_entity(&self, entity: KnowledgeEntity) -> NoemaResult<()> {
        let mut inner = self.inner.write().await;
        if inner.nodes.contains_key(&entity.id) {
            return Err(NoemaError::invalid(format!(
                "entity {} already exists",
                entity.id
            )));
        }
        let id = entity.id.clone();
        let idx = inner.graph.add_node(entity);
        inner.nodes.insert(id, idx);
        Ok(())
    }

    async fn get_entity(&self, id: &str) -> NoemaResult<Option<KnowledgeEntity>> {
        let inner = self.inner.read().await;
        Ok(inner.nodes.get(id).map(|idx| inner.graph[*idx].clone()))
    }

    async fn update_entity(&self, entity: KnowledgeEntity) -> NoemaResult<()> {
        let mut inner = self.inner.write().await;
        let idx = *inner
            .nodes
            .get(&entity.id)
            .ok_or_else(|| NoemaError::not_found("entity", &entity.id))?;
        inner.graph[idx] = entity;
        Ok(())
    }

    async fn delete_entity(&self, id: &str) -> NoemaResult<()> {
        let mut inner = self.inner.write().await;
        let idx = inner
            .nodes
            .remove(id)
            .ok_or_else(|| NoemaError::not_found("entity", id))?;
        // Cascade: removing the node drops incident edges from the graph;
        // the id map has to follow.
        let incident: Vec<String> = inner
            .graph
            .edges_directed(idx, petgraph::Direction::Outgoing)
            .chain(inner.graph.edges_directed(idx, petgraph::Direction::Incoming))
            .map(|e| e.weight().id.clone())
            .collect();
        for relation_id in &incident {
            inner.edges.remove(relation_id);
        }
        inner.graph.remove_node(idx);
        debug!(
            entity = id,
            cascaded_relations = incident.len(),
            "deleted entity"
        );
        Ok(())
    }

    async fn create_relation(&self, relation: KnowledgeRelation) -> NoemaResult<()> {
        let mut inner = self.inner.write().await;
        if inner.edges.contains_key(&relation.id) {
            return Err(NoemaError::invalid(format!(
                "relation {} already exists",
                relation.id
            )));
        }
        let from = *inner
            .nodes
            .get(&relation.from_entity)
            .ok_or_else(|| NoemaError::not_found("entity", &relation.from_entity))?;
        let to = *inner
            .nodes
            .get(&relation.to_entity)
            .ok_or_else(|| NoemaError::not_found("entity", &relation.to_entity))?;
        let (from_domain, to_domain) = (&inner.graph[from].domain_id, &inner.graph[to].domain_id);
        if from_domain != to_domain || *from_domain != relation.domain_id {
            return Err(NoemaError::invalid(format!(
                "relation {} crosses domains",
                relation.id
            )));
        }
        let id = relation.id.clone();
        let idx = inner.graph.add_edge(from, to, relation);
        inner.edges.insert(id, idx);
        Ok(())
    }

    async fn get_relation(&self, id: &str) -> NoemaResult<Option<KnowledgeRelation>> {
        let inner = self.inner.read().await;
        Ok(inner.edges.get(id).map(|idx| inner.graph[*idx].clone()))
    }

    async fn update_relation(&self, relation: KnowledgeRelation) -> NoemaResult<()> {
        let mut inner = self.inner.write().await;
        let idx = *inner
            .edges
            .get(&relation.id)
            .ok_or_else(|| NoemaError::not_found("relation", &relation.id))?;
        let existing = &inner.graph[idx];
        if existing.from_entity != relation.from_entity || existing.to_entity != relation.to_entity
        {
            return Err(NoemaError::invalid(
                "relation endpoints are immutable; delete and recreate instead",
            ));
        }
        inner.graph[idx] = relation;
        Ok(())
    }

    async fn delete_relation(&self, id: &str) -> NoemaResult<()> {
        let mut inner = self.inner.write().await;
        let idx = inner
            .edges
            .remove(id)
            .ok_or_else(|| NoemaError::not_found("relation", id))?;
        inner.graph.remove_edge(idx);
        Ok(())
    }

    async fn list_relations(
        &self,
        from: Option<&str>,
        to: Option<&str>,
        relation_type: Option<&str>,
    ) -> NoemaResult<Vec<KnowledgeRelation>> {
        let inner = self.inner.read().await;
        let mut relations: Vec<KnowledgeRelation> = inner
            .graph
            .edge_weights()
            .filter(|r| from.map_or(true, |f| r.from_entity == f))
            .filter(|r| to.map_or(true, |t| r.to_entity == t))
            .filter(|r| relation_type.map_or(true, |t| r.relation_type == t))
            .cloned()
            .collect();
        relations.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(relations)
    }

    async fn traverse(&self, spec: &GraphTraversalSpec) -> NoemaResult<Vec<GraphPath>> {
        let inner = self.inner.read().await;
        // A missing seed yields an empty path set, not an error.
        let Some(&start) = inner.nodes.get(&spec.start_entity) else {
            return Ok(Vec::new());
        };
        let mut paths = traverse::expand(&inner.graph, start, spec);
        traverse::rank_paths(&mut paths, spec.limit);
        debug!(
            start = %spec.start_entity,
            max_depth = spec.max_depth,
            paths = paths.len(),
            "traversal complete"
        );
        Ok(paths)
    }

    async fn find_path(
        &self,
        from: &str,
        to: &str,
        max_depth: usize,
    ) -> NoemaResult<Vec<GraphPath>> {
        let spec = GraphTraversalSpec {
            start_entity: from.to_string(),
            max_depth,
            direction: Direction::Both,
            relation_types: Vec::new(),
            entity_types: Vec::new(),
            min_score: 0.0,
            limit: 0,
        };
        let inner = self.inner.read().await;
        let Some(&start) = inner.nodes.get(from) else {
            return Ok(Vec::new());
        };
        let mut paths: Vec<GraphPath> = traverse::expand(&inner.graph, start, &spec)
            .into_iter()
            .filter(|p| p.terminal().is_some_and(|e| e.id == to))
            .collect();
        traverse::rank_paths(&mut paths, 0);
        Ok(paths)
    }

    async fn search_entities(
        &self,
        domain_id: &str,
        name_query: &str,
        entity_types: &[String],
        limit: usize,
    ) -> NoemaResult<Vec<KnowledgeEntity>> {
        let needle = name_query.to_lowercase();
        let inner = self.inner.read().await;
        let mut entities: Vec<KnowledgeEntity> = inner
            .graph
            .node_weights()
            .filter(|e| e.domain_id == domain_id)
            .filter(|e| entity_types.is_empty() || entity_types.contains(&e.entity_type))
            .filter(|e| e.name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        entities.sort_by(|a, b| {
            b.confidence
                .value()
                .partial_cmp(&a.confidence.value())
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        entities.truncate(limit);
        Ok(entities)
    }

    async fn stats(&self, domain_id: &str) -> NoemaResult<GraphStats> {
        let inner = self.inner.read().await;
        let mut entity_types: HashMap<String, usize> = HashMap::new();
        let mut relation_types: HashMap<String, usize> = HashMap::new();
        let mut total_entities = 0;
        let mut total_relations = 0;
        for entity in inner.graph.node_weights() {
            if entity.domain_id == domain_id {
                total_entities += 1;
                *entity_types.entry(entity.entity_type.clone()).or_default() += 1;
            }
        }
        for relation in inner.graph.edge_weights() {
            if relation.domain_id == domain_id {
                total_relations += 1;
                *relation_types
                    .entry(relation.relation_type.clone())
                    .or_default() += 1;
            }
        }
        let mut entity_types: Vec<(String, usize)> = entity_types.into_iter().collect();
        entity_types.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        let mut relation_types: Vec<(String, usize)> = relation_types.into_iter().collect();
        relation_types.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        Ok(GraphStats {
            total_entities,
            total_relations,
            entity_types,
            relation_types,
        })
    }
}
