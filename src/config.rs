//! Analytics configuration loaded from TOML
//!
//! Configuration is looked up in order:
//! 1. `ANALYTICS_CONFIG` environment variable (path to TOML file)
//! 2. `./analytics.toml` in current directory
//! 3. Default configuration
//!
//! # Example
//!
//! ```toml
//! cache_capacity = 50000
//! cache_ttl_secs = 3600
//! utc_offset_minutes = 60
//! ```

use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::FixedOffset;
use serde::Deserialize;
use tracing::{info, warn};

use crate::cache::{CacheConfig, InMemoryMetricCache, NullCache, DEFAULT_CACHE_CAPACITY};
use crate::engine::{
    AnalyticsEngine, EngineConfig, EventStore, MetricCache, DEFAULT_MAX_RANGE_DAYS,
};
use crate::error::{Error, Result};
use crate::observability::{PrometheusConfig, DEFAULT_METRIC_PREFIX};
use crate::store::InMemoryEventStore;

/// Environment variable naming the configuration file
pub const CONFIG_ENV_VAR: &str = "ANALYTICS_CONFIG";

/// Configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "analytics.toml";

const MAX_OFFSET_MINUTES: u32 = 18 * 60;

/// Analytics configuration loaded from TOML or environment
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnalyticsConfig {
    /// Cache derived values (false = recompute on every call)
    #[serde(default = "default_true")]
    pub cache_enabled: bool,

    /// Maximum cached entries
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    /// Entry time-to-live in seconds (None = never expire)
    #[serde(default)]
    pub cache_ttl_secs: Option<u64>,

    /// Offset from UTC of the zone display dates are derived in
    #[serde(default)]
    pub utc_offset_minutes: i32,

    /// Longest range iterated per calendar date
    #[serde(default = "default_max_range_days")]
    pub max_range_days: u32,

    /// Prefix for exported Prometheus metrics
    #[serde(default = "default_metric_prefix")]
    pub metric_prefix: String,
}

fn default_true() -> bool {
    true
}

fn default_cache_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}

fn default_max_range_days() -> u32 {
    DEFAULT_MAX_RANGE_DAYS
}

fn default_metric_prefix() -> String {
    DEFAULT_METRIC_PREFIX.to_string()
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            cache_enabled: true,
            cache_capacity: default_cache_capacity(),
            cache_ttl_secs: None,
            utc_offset_minutes: 0,
            max_range_days: default_max_range_days(),
            metric_prefix: default_metric_prefix(),
        }
    }
}

impl AnalyticsConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| Error::Configuration(format!("invalid TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if self.cache_capacity == 0 {
            return Err(Error::Configuration(
                "cache_capacity must be greater than zero".to_string(),
            ));
        }
        if self.max_range_days == 0 {
            return Err(Error::Configuration(
                "max_range_days must be greater than zero".to_string(),
            ));
        }
        if self.utc_offset_minutes.unsigned_abs() > MAX_OFFSET_MINUTES {
            return Err(Error::Configuration(format!(
                "utc_offset_minutes {} is outside +/-{}",
                self.utc_offset_minutes, MAX_OFFSET_MINUTES
            )));
        }
        Ok(())
    }

    /// Zone in which display dates are derived
    pub fn reference_zone(&self) -> Result<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).ok_or_else(|| {
            Error::Configuration(format!(
                "invalid utc_offset_minutes: {}",
                self.utc_offset_minutes
            ))
        })
    }

    /// Engine settings
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            max_range_days: self.max_range_days,
        }
    }

    /// Empty in-memory store deriving display dates in the configured zone
    pub fn build_store(&self) -> Result<InMemoryEventStore> {
        Ok(InMemoryEventStore::new(self.reference_zone()?))
    }

    /// In-memory cache settings
    pub fn cache_config(&self) -> Result<CacheConfig> {
        let capacity = NonZeroUsize::new(self.cache_capacity).ok_or_else(|| {
            Error::Configuration("cache_capacity must be greater than zero".to_string())
        })?;
        Ok(CacheConfig {
            capacity,
            ttl: self.cache_ttl_secs.map(Duration::from_secs),
        })
    }

    /// Exporter settings
    pub fn prometheus_config(&self) -> PrometheusConfig {
        PrometheusConfig {
            metric_prefix: self.metric_prefix.clone(),
            ..Default::default()
        }
    }

    /// Build an engine over `store` with the configured cache
    pub fn build_engine(&self, store: Arc<dyn EventStore>) -> Result<AnalyticsEngine> {
        self.validate()?;

        let cache: Arc<dyn MetricCache> = if self.cache_enabled {
            Arc::new(InMemoryMetricCache::new(self.cache_config()?))
        } else {
            Arc::new(NullCache)
        };

        AnalyticsEngine::builder()
            .with_shared_store(store)
            .with_shared_cache(cache)
            .with_config(self.engine_config())
            .build()
    }
}

/// Load configuration from file or environment
///
/// Unreadable or invalid files fall back to defaults with a warning.
pub fn load_config() -> AnalyticsConfig {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        match AnalyticsConfig::from_file(&path) {
            Ok(config) => {
                info!(path = %path, "Loaded configuration from file");
                return config;
            }
            Err(e) => {
                warn!(path = %path, error = %e, "Failed to load config file, using defaults");
            }
        }
    }

    if Path::new(DEFAULT_CONFIG_FILE).exists() {
        match AnalyticsConfig::from_file(DEFAULT_CONFIG_FILE) {
            Ok(config) => {
                info!("Loaded configuration from {}", DEFAULT_CONFIG_FILE);
                return config;
            }
            Err(e) => {
                warn!(error = %e, "Ignoring invalid {}", DEFAULT_CONFIG_FILE);
            }
        }
    }

    info!("Using default configuration");
    AnalyticsConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = AnalyticsConfig::from_toml_str("").unwrap();
        assert_eq!(config, AnalyticsConfig::default());
        assert!(config.cache_enabled);
        assert_eq!(config.cache_capacity, 100_000);
        assert_eq!(config.max_range_days, 3660);
        assert_eq!(config.metric_prefix, "impression_analytics");
    }

    #[test]
    fn test_partial_document() {
        let config = AnalyticsConfig::from_toml_str(
            "cache_ttl_secs = 60\nutc_offset_minutes = -300\ncache_enabled = false\n",
        )
        .unwrap();
        assert!(!config.cache_enabled);
        assert_eq!(config.cache_ttl_secs, Some(60));
        assert_eq!(config.reference_zone().unwrap().local_minus_utc(), -300 * 60);
        assert_eq!(config.cache_config().unwrap().ttl, Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(AnalyticsConfig::from_toml_str("cache_capacity = 0").is_err());
        assert!(AnalyticsConfig::from_toml_str("max_range_days = 0").is_err());
        assert!(AnalyticsConfig::from_toml_str("utc_offset_minutes = 1200").is_err());
        assert!(AnalyticsConfig::from_toml_str("cache_capacity = \"lots\"").is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_range_days = 31").unwrap();

        let config = AnalyticsConfig::from_file(file.path()).unwrap();
        assert_eq!(config.max_range_days, 31);
        assert_eq!(config.engine_config().max_range_days, 31);
    }

    #[test]
    fn test_from_missing_file() {
        let result = AnalyticsConfig::from_file("/nonexistent/analytics.toml");
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_build_engine_respects_cache_switch() {
        let store: Arc<dyn EventStore> = Arc::new(InMemoryEventStore::default());

        let cached = AnalyticsConfig::default().build_engine(store.clone()).unwrap();
        assert_eq!(cached.cache().backend_name(), "in-memory-lru");

        let uncached = AnalyticsConfig {
            cache_enabled: false,
            ..Default::default()
        }
        .build_engine(store)
        .unwrap();
        assert_eq!(uncached.cache().backend_name(), "null");
    }

    #[tokio::test]
    async fn test_configured_zone_drives_display_dates() {
        use chrono::{NaiveDate, TimeZone, Utc};

        use crate::entity::{EntityKind, EntityRef};
        use crate::types::ImpressionRecord;

        let config = AnalyticsConfig::from_toml_str("utc_offset_minutes = 540").unwrap();
        let store = config.build_store().unwrap();
        assert_eq!(store.zone(), config.reference_zone().unwrap());

        // 23:00 UTC on Jan 1 is already Jan 2 at +09:00
        let displayed_at = Utc.with_ymd_and_hms(2024, 1, 1, 23, 0, 0).unwrap();
        store
            .record(ImpressionRecord {
                id: None,
                advertiser_id: 1,
                campaign_id: 2,
                campaign_name: "launch".to_string(),
                property_id: 3,
                property_name: "home".to_string(),
                displayed_at,
                clicked_at: None,
                payable: true,
                fallback_campaign: false,
            })
            .unwrap();

        let engine = config.build_engine(Arc::new(store)).unwrap();
        let entity = EntityRef::new(EntityKind::Advertiser, 1, displayed_at);
        let jan1 = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let jan2 = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();

        assert_eq!(engine.daily_impressions_count(&entity, jan1).await.unwrap(), 0);
        assert_eq!(engine.daily_impressions_count(&entity, jan2).await.unwrap(), 1);
    }
}
