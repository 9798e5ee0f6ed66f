//! Bounded breadth-first expansion with monotonic-score pruning.
//!
//! Path score is the product of constituent entity and relation
//! confidences, so it never increases with depth — any branch whose
//! accumulated score falls below the requested minimum can be pruned
//! without losing a qualifying path.

use std::collections::VecDeque;

use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;
use petgraph::visit::EdgeRef;
use petgraph::Direction as PetDirection;

use noema_core::models::{
    Direction, GraphPath, GraphTraversalSpec, KnowledgeEntity, KnowledgeRelation,
};

/// One frontier element: the node reached, the path so far, its score.
struct Frontier {
    node: NodeIndex,
    entities: Vec<KnowledgeEntity>,
    relations: Vec<KnowledgeRelation>,
    score: f64,
    depth: usize,
}

/// Expand from `start`, collecting every qualifying path of length >= 1.
///
/// An entity may not repeat within a single path (cycle avoidance), but
/// may be reached via multiple independent paths.
pub(crate) fn expand(
    graph: &StableDiGraph<KnowledgeEntity, KnowledgeRelation>,
    start: NodeIndex,
    spec: &GraphTraversalSpec,
) -> Vec<GraphPath> {
    let seed = &graph[start];
    let mut paths = Vec::new();
    let mut frontier = VecDeque::new();
    frontier.push_back(Frontier {
        node: start,
        entities: vec![seed.clone()],
        relations: Vec::new(),
        score: seed.confidence.value(),
        depth: 0,
    });

    while let Some(current) = frontier.pop_front() {
        if current.depth == spec.max_depth {
            continue;
        }
        for (edge_idx, next_node) in incident_edges(graph, current.node, spec.direction) {
            let relation = &graph[edge_idx];
            if !spec.relation_types.is_empty()
                && !spec.relation_types.contains(&relation.relation_type)
            {
                continue;
            }
            let entity = &graph[next_node];
            if !spec.entity_types.is_empty() && !spec.entity_types.contains(&entity.entity_type) {
                continue;
            }
            // Cycle avoidance: an entity appears at most once per path.
            if current.entities.iter().any(|e| e.id == entity.id) {
                continue;
            }
            let score = current.score * relation.confidence.value() * entity.confidence.value();
            // Monotonic-decrease pruning: the product can only shrink, so
            // a branch below min_score can never recover.
            if score < spec.min_score {
                continue;
            }

            let mut entities = current.entities.clone();
            entities.push(entity.clone());
            let mut relations = current.relations.clone();
            relations.push(relation.clone());

            paths.push(GraphPath {
                entities: entities.clone(),
                relations: relations.clone(),
                score,
                length: relations.len(),
            });

            frontier.push_back(Frontier {
                node: next_node,
                entities,
                relations,
                score,
                depth: current.depth + 1,
            });
        }
    }

    paths
}

/// Edges incident to `node` under the requested direction, paired with
/// the node on the far side.
fn incident_edges(
    graph: &StableDiGraph<KnowledgeEntity, KnowledgeRelation>,
    node: NodeIndex,
    direction: Direction,
) -> Vec<(petgraph::graph::EdgeIndex, NodeIndex)> {
    let mut edges = Vec::new();
    if matches!(direction, Direction::Out | Direction::Both) {
        for edge in graph.edges_directed(node, PetDirection::Outgoing) {
            edges.push((edge.id(), edge.target()));
        }
    }
    if matches!(direction, Direction::In | Direction::Both) {
        for edge in graph.edges_directed(node, PetDirection::Incoming) {
            edges.push((edge.id(), edge.source()));
        }
    }
    edges
}

/// Order paths: score descending, shorter paths first on ties, then
/// lexicographic entity-id sequence. Fully deterministic.
pub(crate) fn rank_paths(paths: &mut Vec<GraphPath>, limit: usize) {
    paths.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.length.cmp(&b.length))
            .then_with(|| a.entity_ids().cmp(&b.entity_ids()))
    });
    if limit > 0 {
        paths.truncate(limit);
    }
}
