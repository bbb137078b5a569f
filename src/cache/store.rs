//! Response Cache Implementation
//!
//! TTL cache for upstream JSON payloads using Moka.
//! The cache is an owned object handed to the proxy, never a global.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use moka::sync::Cache;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, trace};

/// Default time-to-live for cached responses: 5 minutes
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Longest TTL Moka accepts (1000 years); its builder panics above this
pub const MAX_TTL: Duration = Duration::from_secs(1000 * 365 * 24 * 3600);

/// Cache entry for an upstream response
#[derive(Clone, Debug)]
pub struct CachedResponse {
    /// The decoded JSON payload
    pub payload: Arc<Value>,
    /// When this entry was cached
    pub cached_at: Instant,
}

/// Snapshot of cache counters for the health report
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Hit percentage in the range 0..=100
    pub hit_rate: f64,
}

/// Upstream response cache with TTL support
///
/// Every key shares the same TTL. A newer insert for a key replaces the
/// old entry and restarts its expiry window.
pub struct ResponseCache {
    entries: Cache<String, CachedResponse>,
    /// Cache hit counter
    hits: AtomicU64,
    /// Cache miss counter
    misses: AtomicU64,
}

impl ResponseCache {
    /// Create a new response cache with the default TTL
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    /// Create a cache with a custom TTL
    ///
    /// `ttl` must not exceed [`MAX_TTL`].
    pub fn with_ttl(ttl: Duration) -> Self {
        let entries = Cache::builder()
            .time_to_live(ttl)
            .name("upstream_response_cache")
            .build();

        Self {
            entries,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Get a fresh payload from cache
    ///
    /// Expired entries are never returned, even before Moka sweeps them.
    /// Updates hit/miss counters.
    pub fn get(&self, key: &str) -> Option<Arc<Value>> {
        match self.entries.get(key) {
            Some(cached) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                trace!(
                    key = key,
                    age_ms = cached.cached_at.elapsed().as_millis() as u64,
                    "Cache HIT"
                );
                Some(cached.payload)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                trace!(key = key, "Cache MISS");
                None
            }
        }
    }

    /// Insert a payload, replacing any previous entry for `key`
    pub fn insert(&self, key: String, payload: Value) -> Arc<Value> {
        let payload = Arc::new(payload);
        let cached = CachedResponse {
            payload: Arc::clone(&payload),
            cached_at: Instant::now(),
        };
        debug!(key = %key, "Cached upstream response");
        self.entries.insert(key, cached);
        payload
    }

    /// Number of live keys
    ///
    /// Runs Moka's pending maintenance first so expired
    /// entries are not counted.
    pub fn key_count(&self) -> u64 {
        self.entries.run_pending_tasks();
        self.entries.entry_count()
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total > 0 {
            (hits as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        CacheStats {
            hits,
            misses,
            hit_rate,
        }
    }

    /// Log current cache metrics
    pub fn log_metrics(&self) {
        let stats = self.stats();
        debug!(
            hits = stats.hits,
            misses = stats.misses,
            hit_rate = format!("{:.1}%", stats.hit_rate),
            keys = self.key_count(),
            "Cache metrics"
        );
    }
}
