//! Property tests for score normalization and the merge path.

use std::collections::HashMap;

use chrono::Utc;
use proptest::prelude::*;

use noema_core::models::{ResultKind, SearchResult, VectorMetric};
use noema_retrieval::{merge, normalize};

fn result(id: String, score: f64) -> SearchResult {
    SearchResult {
        id,
        kind: ResultKind::Chunk,
        title: String::new(),
        content: String::new(),
        source: String::new(),
        score,
        highlights: Vec::new(),
        metadata: serde_json::Value::Null,
        created_at: Utc::now(),
    }
}

fn candidates() -> impl Strategy<Value = Vec<SearchResult>> {
    proptest::collection::vec((0usize..5, 0.0f64..=1.0), 0..40)
        .prop_map(|entries| {
            entries
                .into_iter()
                .map(|(n, score)| result(format!("id{n}"), score))
                .collect()
        })
}

proptest! {
    #[test]
    fn normalized_scores_stay_in_unit_range(native in -1.0e6f64..1.0e6) {
        for metric in [
            VectorMetric::Cosine,
            VectorMetric::InnerProduct,
            VectorMetric::L2,
        ] {
            let score = normalize::vector_score(metric, native);
            prop_assert!((0.0..=1.0).contains(&score), "{metric:?} gave {score}");
        }
    }

    #[test]
    fn dedup_keeps_exactly_the_max_per_id(candidates in candidates()) {
        let mut expected: HashMap<String, f64> = HashMap::new();
        for candidate in &candidates {
            let best = expected.entry(candidate.id.clone()).or_insert(f64::MIN);
            if candidate.score > *best {
                *best = candidate.score;
            }
        }

        let merged = merge::dedup_max(candidates);
        prop_assert_eq!(merged.len(), expected.len());
        for result in &merged {
            prop_assert_eq!(result.score, expected[&result.id]);
        }
    }

    #[test]
    fn paging_is_sorted_thresholded_and_bounded(
        candidates in candidates(),
        threshold in 0.0f64..=1.0,
        offset in 0usize..10,
        limit in 1usize..10,
    ) {
        let (page, total) = merge::page(candidates, threshold, offset, limit);
        prop_assert!(page.len() <= limit);
        prop_assert!(total >= page.len());
        for result in &page {
            prop_assert!(result.score >= threshold);
        }
        for pair in page.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
        }
    }
}
