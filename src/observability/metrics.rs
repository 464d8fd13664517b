//! Engine-level analytics metrics
//!
//! Counts how metric requests were served (cache hit, recomputation) and how
//! long recomputations against the event store took.
//!
//! # Example
//!
//! ```rust
//! use impression_analytics::observability::AnalyticsMetrics;
//! use std::time::Duration;
//!
//! let metrics = AnalyticsMetrics::new();
//! metrics.record_cache_miss();
//! metrics.record_computation(Duration::from_micros(250));
//!
//! let snapshot = metrics.snapshot();
//! assert_eq!(snapshot.computations, 1);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use serde::Serialize;

/// Atomic counters shared by every query an engine serves
#[derive(Debug)]
pub struct AnalyticsMetrics {
    /// Requests answered from cache
    pub cache_hits: AtomicU64,
    /// Requests that found no usable cache entry
    pub cache_misses: AtomicU64,
    /// Values written to the cache
    pub cache_writes: AtomicU64,
    /// Cache entries that could not be decoded
    pub decode_failures: AtomicU64,
    /// Successful recomputations against the event store
    pub computations: AtomicU64,
    /// Failed recomputations
    pub compute_errors: AtomicU64,
    /// Total recomputation time in microseconds
    pub compute_time_us: AtomicU64,
    created_at: Instant,
}

impl AnalyticsMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self {
            cache_hits: AtomicU64::new(0),
            cache_misses: AtomicU64::new(0),
            cache_writes: AtomicU64::new(0),
            decode_failures: AtomicU64::new(0),
            computations: AtomicU64::new(0),
            compute_errors: AtomicU64::new(0),
            compute_time_us: AtomicU64::new(0),
            created_at: Instant::now(),
        }
    }

    /// Record a request served from cache
    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a request that had to recompute
    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a value written to the cache
    pub fn record_cache_write(&self) {
        self.cache_writes.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a cache entry that failed to decode
    pub fn record_decode_failure(&self) {
        self.decode_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successful recomputation
    pub fn record_computation(&self, elapsed: Duration) {
        self.computations.fetch_add(1, Ordering::Relaxed);
        self.compute_time_us
            .fetch_add(elapsed.as_micros() as u64, Ordering::Relaxed);
    }

    /// Record a failed recomputation
    pub fn record_compute_error(&self) {
        self.compute_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Create a snapshot of current metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            cache_writes: self.cache_writes.load(Ordering::Relaxed),
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
            computations: self.computations.load(Ordering::Relaxed),
            compute_errors: self.compute_errors.load(Ordering::Relaxed),
            compute_time_us: self.compute_time_us.load(Ordering::Relaxed),
            uptime: self.created_at.elapsed(),
        }
    }
}

impl Default for AnalyticsMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Non-atomic snapshot of analytics metrics for serialization
#[derive(Debug, Clone, Default, Serialize)]
pub struct MetricsSnapshot {
    /// Requests answered from cache
    pub cache_hits: u64,
    /// Requests that found no usable cache entry
    pub cache_misses: u64,
    /// Values written to the cache
    pub cache_writes: u64,
    /// Cache entries that could not be decoded
    pub decode_failures: u64,
    /// Successful recomputations
    pub computations: u64,
    /// Failed recomputations
    pub compute_errors: u64,
    /// Total recomputation time in microseconds
    pub compute_time_us: u64,
    /// Time since the metrics were created
    #[serde(skip)]
    pub uptime: Duration,
}

impl MetricsSnapshot {
    /// Fraction of requests served from cache (0.0-1.0)
    pub fn hit_rate(&self) -> f64 {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 {
            0.0
        } else {
            self.cache_hits as f64 / total as f64
        }
    }

    /// Average recomputation time in microseconds
    pub fn avg_compute_time_us(&self) -> f64 {
        if self.computations == 0 {
            0.0
        } else {
            self.compute_time_us as f64 / self.computations as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_rate() {
        let metrics = AnalyticsMetrics::new();
        assert_eq!(metrics.snapshot().hit_rate(), 0.0);

        metrics.record_cache_hit();
        metrics.record_cache_hit();
        metrics.record_cache_hit();
        metrics.record_cache_miss();
        assert!((metrics.snapshot().hit_rate() - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_avg_compute_time() {
        let metrics = AnalyticsMetrics::new();
        metrics.record_computation(Duration::from_micros(100));
        metrics.record_computation(Duration::from_micros(300));

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.computations, 2);
        assert!((snapshot.avg_compute_time_us() - 200.0).abs() < f64::EPSILON);
    }
}
