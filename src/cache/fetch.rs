//! Fetch-or-compute memoization over a [`MetricCache`]

use std::future::Future;
use std::time::Instant;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::cache::key::CacheKey;
use crate::engine::traits::MetricCache;
use crate::error::Result;
use crate::observability::AnalyticsMetrics;

/// Return the cached value for `key`, or compute, store and return it
///
/// The value is written only after `compute` resolves successfully, so a
/// failed or cancelled computation leaves the key untouched. Concurrent
/// misses on one key may each compute; they write identical values.
/// An entry that no longer decodes as `T` is recomputed and overwritten.
pub async fn fetch_or_compute<T, F, Fut>(
    cache: &dyn MetricCache,
    metrics: &AnalyticsMetrics,
    key: &CacheKey,
    compute: F,
) -> Result<T>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    match cache.get(key.as_str()).await? {
        Some(encoded) => match serde_json::from_slice::<T>(&encoded) {
            Ok(value) => {
                metrics.record_cache_hit();
                debug!(key = %key, "Cache hit");
                return Ok(value);
            }
            Err(e) => {
                metrics.record_decode_failure();
                metrics.record_cache_miss();
                warn!(key = %key, error = %e, "Discarding undecodable cache entry");
            }
        },
        None => {
            metrics.record_cache_miss();
            debug!(key = %key, "Cache miss");
        }
    }

    let started = Instant::now();
    let value = match compute().await {
        Ok(value) => value,
        Err(e) => {
            metrics.record_compute_error();
            return Err(e);
        }
    };
    metrics.record_computation(started.elapsed());

    let encoded = serde_json::to_vec(&value)?;
    cache.set(key.as_str(), Bytes::from(encoded)).await?;
    metrics.record_cache_write();

    Ok(value)
}
