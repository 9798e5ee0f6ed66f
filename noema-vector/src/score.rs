//! Native similarity scoring per metric.
//!
//! Scores here stay in each metric's native scale; mapping to [0,1]
//! happens in the orchestrator's normalization stage.

use noema_core::models::VectorMetric;

/// Score a candidate against the query under the given metric.
pub fn native_score(metric: VectorMetric, query: &[f32], candidate: &[f32]) -> f64 {
    match metric {
        VectorMetric::Cosine => cosine(query, candidate),
        VectorMetric::InnerProduct => dot(query, candidate),
        VectorMetric::L2 => l2_distance(query, candidate),
    }
}

/// Whether a higher native score means a better match under this metric.
pub fn higher_is_better(metric: VectorMetric) -> bool {
    !matches!(metric, VectorMetric::L2)
}

fn dot(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (*x as f64) * (*y as f64))
        .sum()
}

fn cosine(a: &[f32], b: &[f32]) -> f64 {
    let norm_a: f64 = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot(a, b) / (norm_a * norm_b)
}

fn l2_distance(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| ((*x as f64) - (*y as f64)).powi(2))
        .sum::<f64>()
        .sqrt()
}
