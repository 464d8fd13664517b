//! In-process LRU metric cache with optional TTL

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use lru::LruCache;
use parking_lot::Mutex;
use serde::Serialize;

use crate::engine::traits::MetricCache;
use crate::error::CacheResult;

/// Default maximum number of cached entries
pub const DEFAULT_CACHE_CAPACITY: usize = 100_000;

// ============================================================================
// Configuration
// ============================================================================

/// Configuration for the in-memory metric cache
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of entries before LRU eviction
    pub capacity: NonZeroUsize,

    /// Time-to-live per entry (None = entries never expire)
    pub ttl: Option<Duration>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: NonZeroUsize::new(DEFAULT_CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN),
            ttl: None,
        }
    }
}

// ============================================================================
// Statistics
// ============================================================================

/// Atomic counters for cache activity
#[derive(Debug, Default)]
pub struct CacheStats {
    /// Lookups answered from the cache
    pub hits: AtomicU64,
    /// Lookups that found nothing usable
    pub misses: AtomicU64,
    /// Values written
    pub inserts: AtomicU64,
    /// Entries dropped to make room
    pub evictions: AtomicU64,
    /// Entries dropped because their TTL passed
    pub expirations: AtomicU64,
}

impl CacheStats {
    /// Create a snapshot of current counters
    pub fn snapshot(&self) -> CacheStatsSnapshot {
        CacheStatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            inserts: self.inserts.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
        }
    }
}

/// Non-atomic snapshot of cache counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStatsSnapshot {
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that found nothing usable
    pub misses: u64,
    /// Values written
    pub inserts: u64,
    /// Entries dropped to make room
    pub evictions: u64,
    /// Entries dropped because their TTL passed
    pub expirations: u64,
}

impl CacheStatsSnapshot {
    /// Fraction of lookups served from cache (0.0-1.0)
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            0.0
        } else {
            self.hits as f64 / lookups as f64
        }
    }
}

// ============================================================================
// Cache
// ============================================================================

#[derive(Debug)]
struct CacheEntry {
    value: Bytes,
    inserted_at: Instant,
}

/// Bounded in-memory cache shared by all queries of a process
///
/// Eviction only ever drops entries, so a later lookup recomputes the same
/// value from the event store.
pub struct InMemoryMetricCache {
    entries: Mutex<LruCache<String, CacheEntry>>,
    ttl: Option<Duration>,
    stats: CacheStats,
}

impl InMemoryMetricCache {
    /// Create a new cache
    pub fn new(config: CacheConfig) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(config.capacity)),
            ttl: config.ttl,
            stats: CacheStats::default(),
        }
    }

    /// Number of live and not-yet-reaped entries
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Whether a key is present, without touching recency or TTL
    pub fn contains(&self, key: &str) -> bool {
        self.entries.lock().contains(key)
    }

    /// Access the cache counters
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    fn is_expired(&self, entry: &CacheEntry) -> bool {
        self.ttl
            .map(|ttl| entry.inserted_at.elapsed() >= ttl)
            .unwrap_or(false)
    }
}

impl Default for InMemoryMetricCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

#[async_trait]
impl MetricCache for InMemoryMetricCache {
    async fn get(&self, key: &str) -> CacheResult<Option<Bytes>> {
        let mut entries = self.entries.lock();

        let expired = match entries.get(key) {
            Some(entry) if !self.is_expired(entry) => {
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                return Ok(Some(entry.value.clone()));
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            entries.pop(key);
            self.stats.expirations.fetch_add(1, Ordering::Relaxed);
        }
        self.stats.misses.fetch_add(1, Ordering::Relaxed);
        Ok(None)
    }

    async fn set(&self, key: &str, value: Bytes) -> CacheResult<()> {
        let entry = CacheEntry {
            value,
            inserted_at: Instant::now(),
        };

        let displaced = self.entries.lock().push(key.to_string(), entry);
        if let Some((old_key, _)) = displaced {
            if old_key != key {
                self.stats.evictions.fetch_add(1, Ordering::Relaxed);
            }
        }
        self.stats.inserts.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<bool> {
        Ok(self.entries.lock().pop(key).is_some())
    }

    async fn clear(&self) -> CacheResult<()> {
        self.entries.lock().clear();
        Ok(())
    }

    fn backend_name(&self) -> &str {
        "in-memory-lru"
    }
}
