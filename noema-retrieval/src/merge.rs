//! Merge, dedup, ordering, and pagination of normalized candidates.

use std::collections::HashMap;

use noema_core::models::SearchResult;

/// Collapse duplicate ids, keeping the highest score per id.
///
/// A chunk surfacing from both the vector index and a graph path is
/// corroboration, not two results.
pub fn dedup_max(candidates: Vec<SearchResult>) -> Vec<SearchResult> {
    let mut best: HashMap<String, SearchResult> = HashMap::with_capacity(candidates.len());
    for candidate in candidates {
        match best.get(&candidate.id) {
            Some(existing) if existing.score >= candidate.score => {}
            _ => {
                best.insert(candidate.id.clone(), candidate);
            }
        }
    }
    best.into_values().collect()
}

/// Deterministic ordering: score descending, id ascending on ties.
pub fn order(results: &mut [SearchResult]) {
    results.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Apply threshold, ordering, and offset/limit. Returns the page and the
/// total hit count before pagination.
pub fn page(
    candidates: Vec<SearchResult>,
    threshold: f64,
    offset: usize,
    limit: usize,
) -> (Vec<SearchResult>, usize) {
    let mut kept: Vec<SearchResult> = candidates
        .into_iter()
        .filter(|c| c.score >= threshold)
        .collect();
    order(&mut kept);
    let total = kept.len();
    let page = kept.into_iter().skip(offset).take(limit).collect();
    (page, total)
}
