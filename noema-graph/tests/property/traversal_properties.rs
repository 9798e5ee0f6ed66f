//! Property tests: traversal invariants hold for arbitrary chains.

use chrono::Utc;
use proptest::prelude::*;
use serde_json::json;

use noema_core::models::{
    Confidence, Direction, GraphTraversalSpec, KnowledgeEntity, KnowledgeRelation,
};
use noema_core::traits::IGraphStore;
use noema_graph::MemoryGraphStore;

fn entity(id: String, confidence: f64) -> KnowledgeEntity {
    KnowledgeEntity {
        id: id.clone(),
        domain_id: "d1".to_string(),
        entity_type: "concept".to_string(),
        name: id,
        labels: vec![],
        properties: json!({}),
        source: "prop".to_string(),
        confidence: Confidence::new(confidence),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn relation(i: usize, from: &str, to: &str, confidence: f64) -> KnowledgeRelation {
    KnowledgeRelation {
        id: format!("r{i}"),
        domain_id: "d1".to_string(),
        relation_type: "related_to".to_string(),
        from_entity: from.to_string(),
        to_entity: to.to_string(),
        properties: json!({}),
        source: "prop".to_string(),
        confidence: Confidence::new(confidence),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// Seed a chain e0 -> e1 -> ... with the given confidences and traverse
/// from e0.
fn traverse_chain(confidences: Vec<f64>, min_score: f64) -> Vec<noema_core::models::GraphPath> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime");
    rt.block_on(async move {
        let store = MemoryGraphStore::new();
        for (i, conf) in confidences.iter().enumerate() {
            store
                .create_entity(entity(format!("e{i}"), *conf))
                .await
                .unwrap();
        }
        for i in 1..confidences.len() {
            store
                .create_relation(relation(
                    i,
                    &format!("e{}", i - 1),
                    &format!("e{i}"),
                    confidences[i],
                ))
                .await
                .unwrap();
        }
        store
            .traverse(&GraphTraversalSpec {
                start_entity: "e0".to_string(),
                max_depth: confidences.len(),
                direction: Direction::Out,
                relation_types: vec![],
                entity_types: vec![],
                min_score,
                limit: 0,
            })
            .await
            .unwrap()
    })
}

proptest! {
    #[test]
    fn path_scores_stay_in_unit_interval(
        confidences in proptest::collection::vec(0.0f64..=1.0, 1..8),
    ) {
        let paths = traverse_chain(confidences, 0.0);
        for path in &paths {
            prop_assert!((0.0..=1.0).contains(&path.score));
        }
    }

    #[test]
    fn no_returned_path_scores_below_min(
        confidences in proptest::collection::vec(0.1f64..=1.0, 2..8),
        min_score in 0.0f64..=1.0,
    ) {
        let paths = traverse_chain(confidences, min_score);
        for path in &paths {
            prop_assert!(path.score >= min_score);
        }
    }

    #[test]
    fn longer_paths_never_outscore_their_prefixes(
        confidences in proptest::collection::vec(0.1f64..=1.0, 2..8),
    ) {
        let paths = traverse_chain(confidences, 0.0);
        // In a chain there is exactly one path per length; scores must be
        // non-increasing as length grows.
        let mut by_length = paths.clone();
        by_length.sort_by_key(|p| p.length);
        for pair in by_length.windows(2) {
            prop_assert!(pair[1].score <= pair[0].score + 1e-12);
        }
    }
}
