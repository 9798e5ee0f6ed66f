//! Score normalization across dissimilar metric spaces.
//!
//! Every source must land in [0,1] before results can be merged. Graph
//! path scores are confidence products and already live there; vector
//! scores arrive in the collection metric's native scale.

use noema_core::models::VectorMetric;

/// Map a native vector score to [0,1].
///
/// Cosine and inner-product sit in [-1,1] for normalized embeddings and
/// map linearly; L2 is a distance where smaller is closer, mapped by
/// `1/(1+d)`.
pub fn vector_score(metric: VectorMetric, native: f64) -> f64 {
    match metric {
        VectorMetric::Cosine | VectorMetric::InnerProduct => ((native + 1.0) / 2.0).clamp(0.0, 1.0),
        VectorMetric::L2 => 1.0 / (1.0 + native.max(0.0)),
    }
}
