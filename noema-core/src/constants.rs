//! Workspace-wide constants.

/// Default number of results returned when the caller does not set a limit.
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

/// Hard cap on the per-query result limit, bounding downstream cost.
pub const MAX_SEARCH_LIMIT: usize = 100;

/// Multiplier applied to the limit when fetching vector candidates,
/// leaving room for post-filtering and dedup.
pub const DEFAULT_OVERFETCH_FACTOR: usize = 3;

/// Default per-source timeout inside a search call (milliseconds).
/// Strictly less than the overall deadline so merging always has time.
pub const DEFAULT_SOURCE_TIMEOUT_MS: u64 = 2_000;

/// Default overall search deadline (milliseconds).
pub const DEFAULT_SEARCH_DEADLINE_MS: u64 = 5_000;

/// Default TTL for cached search responses (seconds).
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Default maximum number of cached responses.
pub const DEFAULT_CACHE_CAPACITY: u64 = 10_000;

/// Default maximum graph traversal depth.
pub const DEFAULT_MAX_TRAVERSAL_DEPTH: usize = 3;

/// Default minimum path score for graph traversal.
pub const DEFAULT_TRAVERSAL_MIN_SCORE: f64 = 0.0;

/// Default vector dimension for new domains.
pub const DEFAULT_VECTOR_DIMENSION: usize = 768;
