use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Confidence;

/// An entity in a domain's knowledge graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeEntity {
    pub id: String,
    pub domain_id: String,
    /// person, organization, concept, ...
    pub entity_type: String,
    pub name: String,
    pub labels: Vec<String>,
    pub properties: serde_json::Value,
    /// Originating document or conversation id.
    pub source: String,
    pub confidence: Confidence,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A directed, typed edge between two entities of the same domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeRelation {
    pub id: String,
    pub domain_id: String,
    pub relation_type: String,
    pub from_entity: String,
    pub to_entity: String,
    pub properties: serde_json::Value,
    pub source: String,
    pub confidence: Confidence,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Edge direction filter for traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    In,
    Out,
    #[default]
    Both,
}

/// Bounded traversal request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphTraversalSpec {
    pub start_entity: String,
    pub max_depth: usize,
    pub direction: Direction,
    /// Empty means no relation-type filter.
    pub relation_types: Vec<String>,
    /// Empty means no entity-type filter.
    pub entity_types: Vec<String>,
    /// Paths whose accumulated score falls below this are pruned.
    pub min_score: f64,
    pub limit: usize,
}

impl Default for GraphTraversalSpec {
    fn default() -> Self {
        Self {
            start_entity: String::new(),
            max_depth: crate::constants::DEFAULT_MAX_TRAVERSAL_DEPTH,
            direction: Direction::Both,
            relation_types: Vec::new(),
            entity_types: Vec::new(),
            min_score: crate::constants::DEFAULT_TRAVERSAL_MIN_SCORE,
            limit: 50,
        }
    }
}

/// An alternating entity/relation path through the graph.
///
/// `entities.len() == relations.len() + 1`; the score is the product of
/// all constituent confidences and never increases with depth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphPath {
    pub entities: Vec<KnowledgeEntity>,
    pub relations: Vec<KnowledgeRelation>,
    pub score: f64,
    /// Edge count.
    pub length: usize,
}

impl GraphPath {
    /// Entity id sequence, used for deterministic tie-breaking.
    pub fn entity_ids(&self) -> Vec<&str> {
        self.entities.iter().map(|e| e.id.as_str()).collect()
    }

    /// Last entity on the path.
    pub fn terminal(&self) -> Option<&KnowledgeEntity> {
        self.entities.last()
    }
}

/// Aggregate graph counts for observability.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphStats {
    pub total_entities: usize,
    pub total_relations: usize,
    pub entity_types: Vec<(String, usize)>,
    pub relation_types: Vec<(String, usize)>,
}

/// Output contract of the entity-extraction function.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Extraction {
    pub entities: Vec<KnowledgeEntity>,
    pub relations: Vec<KnowledgeRelation>,
}
