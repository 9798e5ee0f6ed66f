use std::time::Duration;

use async_trait::async_trait;

use crate::errors::NoemaResult;

/// Read-through result cache with per-domain generation counters.
///
/// Never a source of truth: a miss or failure is always recoverable by
/// recomputing. Invalidation is generation-based — ingestion bumps the
/// domain's counter, which is folded into cache keys, so stale entries
/// become unreachable and expire by TTL.
#[async_trait]
pub trait IResultCache: Send + Sync {
    async fn get(&self, key: &str) -> NoemaResult<Option<Vec<u8>>>;
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> NoemaResult<()>;
    async fn delete(&self, key: &str) -> NoemaResult<()>;

    /// Current generation for a domain, 0 if never bumped.
    async fn generation(&self, domain_id: &str) -> NoemaResult<u64>;

    /// Increment a domain's generation, returning the new value.
    async fn bump_generation(&self, domain_id: &str) -> NoemaResult<u64>;
}
