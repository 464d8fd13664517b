//! Analytics engine builder with pluggable collaborators

use std::future::Future;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use super::traits::{EventStore, MetricCache};
use crate::cache::{fetch_or_compute, CacheKey, InMemoryMetricCache, MetricName};
use crate::entity::HasImpressionMetrics;
use crate::error::{Error, Result};
use crate::observability::AnalyticsMetrics;
use crate::types::{DateRange, DateSpan};

/// Default upper bound on ranges that are iterated day by day
pub const DEFAULT_MAX_RANGE_DAYS: u32 = 3660;

/// Engine configuration
///
/// Display dates are derived by the event store in its own reference zone;
/// the engine only ever sees calendar dates.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Maximum days in a range iterated per calendar date
    pub max_range_days: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_range_days: DEFAULT_MAX_RANGE_DAYS,
        }
    }
}

/// Builder for configuring the analytics engine with custom collaborators
pub struct AnalyticsEngineBuilder {
    store: Option<Arc<dyn EventStore>>,
    cache: Option<Arc<dyn MetricCache>>,
    metrics: Option<Arc<AnalyticsMetrics>>,
    config: EngineConfig,
}

impl AnalyticsEngineBuilder {
    /// Create a new engine builder
    pub fn new() -> Self {
        Self {
            store: None,
            cache: None,
            metrics: None,
            config: EngineConfig::default(),
        }
    }

    /// Set the event store implementation
    pub fn with_store<S>(mut self, store: S) -> Self
    where
        S: EventStore + 'static,
    {
        self.store = Some(Arc::new(store));
        self
    }

    /// Set an event store that is shared with other owners
    pub fn with_shared_store(mut self, store: Arc<dyn EventStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the metric cache implementation
    pub fn with_cache<C>(mut self, cache: C) -> Self
    where
        C: MetricCache + 'static,
    {
        self.cache = Some(Arc::new(cache));
        self
    }

    /// Set a metric cache that is shared with other owners
    pub fn with_shared_cache(mut self, cache: Arc<dyn MetricCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Set the metrics sink
    pub fn with_metrics(mut self, metrics: Arc<AnalyticsMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Set engine configuration
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the engine with configured collaborators
    ///
    /// An event store is required. Without a cache an unbounded-TTL
    /// in-memory LRU cache with default capacity is used.
    pub fn build(self) -> Result<AnalyticsEngine> {
        let store = self
            .store
            .ok_or_else(|| Error::Configuration("No event store configured".to_string()))?;

        if self.config.max_range_days == 0 {
            return Err(Error::Configuration(
                "max_range_days must be greater than zero".to_string(),
            ));
        }

        let cache = self
            .cache
            .unwrap_or_else(|| Arc::new(InMemoryMetricCache::default()));

        info!(
            store = store.engine_name(),
            cache = cache.backend_name(),
            max_range_days = self.config.max_range_days,
            "Analytics engine initialized"
        );

        Ok(AnalyticsEngine {
            store,
            cache,
            metrics: self.metrics.unwrap_or_default(),
            config: self.config,
        })
    }
}

impl Default for AnalyticsEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Impression and click analytics over an event store and a metric cache
///
/// Cloning is cheap; clones share the store, cache and metrics.
#[derive(Clone)]
pub struct AnalyticsEngine {
    store: Arc<dyn EventStore>,
    cache: Arc<dyn MetricCache>,
    metrics: Arc<AnalyticsMetrics>,
    config: EngineConfig,
}

impl AnalyticsEngine {
    /// Start building an engine
    pub fn builder() -> AnalyticsEngineBuilder {
        AnalyticsEngineBuilder::new()
    }

    /// Get reference to the event store
    pub fn store(&self) -> &Arc<dyn EventStore> {
        &self.store
    }

    /// Get reference to the metric cache
    pub fn cache(&self) -> &Arc<dyn MetricCache> {
        &self.cache
    }

    /// Get reference to the metrics sink
    pub fn metrics(&self) -> &Arc<AnalyticsMetrics> {
        &self.metrics
    }

    /// Get engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Drop the cached all-time values of an entity
    ///
    /// All-time totals and date scans are keyed without dates, so they only
    /// refresh on a new version token or through this call. Returns how many
    /// entries were present.
    pub async fn invalidate_all_time<E>(&self, entity: &E) -> Result<usize>
    where
        E: HasImpressionMetrics + ?Sized,
    {
        const ALL_TIME_METRICS: [MetricName; 5] = [
            MetricName::TotalImpressionsCount,
            MetricName::TotalClicksCount,
            MetricName::ProbableDatesWithImpressions,
            MetricName::DatesWithImpressions,
            MetricName::DatesWithClickedImpressions,
        ];

        let token = entity.version_token();
        let mut removed = 0;
        for metric in ALL_TIME_METRICS {
            let key = CacheKey::build(&token, metric, &DateSpan::AllTime);
            if self.cache.delete(key.as_str()).await? {
                removed += 1;
            }
        }

        debug!(entity = %entity.entity_key(), removed, "Invalidated all-time metrics");
        Ok(removed)
    }

    /// Memoize `compute` under the entity's key for this metric and span
    pub(crate) async fn memoize<E, T, F, Fut>(
        &self,
        entity: &E,
        metric: MetricName,
        span: DateSpan,
        compute: F,
    ) -> Result<T>
    where
        E: HasImpressionMetrics + ?Sized,
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let key = CacheKey::for_entity(entity, metric, &span);
        fetch_or_compute(self.cache.as_ref(), &self.metrics, &key, compute).await
    }

    /// Reject ranges longer than the configured maximum
    pub(crate) fn check_range_len(&self, range: &DateRange) -> Result<()> {
        let days = range.num_days();
        if days > i64::from(self.config.max_range_days) {
            return Err(Error::RangeTooLarge {
                days,
                max: self.config.max_range_days,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::NullCache;
    use crate::store::InMemoryEventStore;

    #[test]
    fn test_engine_config_default() {
        let config = EngineConfig::default();
        assert_eq!(config.max_range_days, DEFAULT_MAX_RANGE_DAYS);
    }

    #[test]
    fn test_builder_creation() {
        let builder = AnalyticsEngineBuilder::new();
        assert!(builder.store.is_none());
        assert!(builder.cache.is_none());
        assert!(builder.metrics.is_none());
    }

    #[test]
    fn test_build_requires_store() {
        let result = AnalyticsEngineBuilder::new().with_cache(NullCache).build();
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_build_defaults_cache() {
        let engine = AnalyticsEngine::builder()
            .with_store(InMemoryEventStore::default())
            .build()
            .unwrap();
        assert_eq!(engine.cache().backend_name(), "in-memory-lru");
        assert_eq!(engine.store().engine_name(), "in-memory-partitioned");
    }

    #[test]
    fn test_build_rejects_zero_range_limit() {
        let result = AnalyticsEngine::builder()
            .with_store(InMemoryEventStore::default())
            .with_config(EngineConfig { max_range_days: 0 })
            .build();
        assert!(matches!(result, Err(Error::Configuration(_))));
    }
}
