//! In-memory result cache: moka TTL cache plus per-domain generation
//! counters.
//!
//! TinyLFU admission policy, size-aware eviction, per-entry TTL. The
//! cache is a pure accelerator — callers must treat every miss as
//! recoverable. Invalidation is generation-based: ingestion bumps a
//! domain's counter, which the orchestrator folds into cache keys, so
//! stale entries become unreachable and age out by TTL.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use moka::sync::Cache;
use tracing::debug;

use noema_core::config::CacheConfig;
use noema_core::errors::NoemaResult;
use noema_core::traits::IResultCache;

/// A cached value with its own expiry deadline.
#[derive(Clone)]
struct Entry {
    expires_at: Instant,
    bytes: Vec<u8>,
}

/// In-memory `IResultCache` implementation.
pub struct MemoryResultCache {
    cache: Cache<String, Entry>,
    generations: DashMap<String, u64>,
    default_ttl: Duration,
}

impl MemoryResultCache {
    pub fn new(config: &CacheConfig) -> Self {
        let default_ttl = Duration::from_secs(config.ttl_secs);
        let cache = Cache::builder()
            .max_capacity(config.capacity)
            // Upper bound; per-entry deadlines below may expire sooner.
            .time_to_live(default_ttl.max(Duration::from_secs(1)) * 2)
            .build();
        Self {
            cache,
            generations: DashMap::new(),
            default_ttl,
        }
    }

    /// TTL applied when a caller passes a zero duration.
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Number of live entries (approximate, moka updates lazily).
    pub fn len(&self) -> u64 {
        self.cache.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.cache.invalidate_all();
    }
}

#[async_trait]
impl IResultCache for MemoryResultCache {
    async fn get(&self, key: &str) -> NoemaResult<Option<Vec<u8>>> {
        match self.cache.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Ok(Some(entry.bytes)),
            Some(_) => {
                // Past its per-entry deadline but not yet evicted.
                self.cache.invalidate(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> NoemaResult<()> {
        let ttl = if ttl.is_zero() { self.default_ttl } else { ttl };
        self.cache.insert(
            key.to_string(),
            Entry {
                expires_at: Instant::now() + ttl,
                bytes: value,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> NoemaResult<()> {
        self.cache.invalidate(key);
        Ok(())
    }

    async fn generation(&self, domain_id: &str) -> NoemaResult<u64> {
        Ok(self.generations.get(domain_id).map(|g| *g).unwrap_or(0))
    }

    async fn bump_generation(&self, domain_id: &str) -> NoemaResult<u64> {
        let mut entry = self.generations.entry(domain_id.to_string()).or_insert(0);
        *entry += 1;
        let gen = *entry;
        drop(entry);
        debug!(domain_id, generation = gen, "bumped cache generation");
        Ok(gen)
    }
}
