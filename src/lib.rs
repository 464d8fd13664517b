//! Impression and click analytics over a partitioned event log
//!
//! Given an entity (advertiser, campaign or property) and an optional date
//! range, the engine answers impression counts, click counts, click-through
//! rates, date scans and per-day sparklines. Every answer is computed from
//! event store queries and memoized in a metric cache under a key that embeds
//! the entity's version token, so cached values are never served for a newer
//! version of the entity.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                    AnalyticsEngine                      │
//! │   aggregation (counts, rates, dates)   timeseries       │
//! └──────────────┬──────────────────────────────┬──────────┘
//!                │ fetch_or_compute             │
//!        ┌───────▼────────┐            ┌────────▼────────┐
//!        │  MetricCache   │            │   EventStore    │
//!        │ LRU/TTL, null  │            │ month/advertiser│
//!        └────────────────┘            │   partitions    │
//!                                      └─────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use chrono::{NaiveDate, TimeZone, Utc};
//! use impression_analytics::{
//!     AnalyticsEngine, DateRange, EntityKind, EntityRef, ImpressionRecord, InMemoryEventStore,
//! };
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> impression_analytics::Result<()> {
//! let store = InMemoryEventStore::default();
//! store.record(ImpressionRecord {
//!     id: None,
//!     advertiser_id: 1,
//!     campaign_id: 10,
//!     campaign_name: "spring".to_string(),
//!     property_id: 20,
//!     property_name: "blog".to_string(),
//!     displayed_at: Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
//!     clicked_at: None,
//!     payable: true,
//!     fallback_campaign: false,
//! })?;
//!
//! let engine = AnalyticsEngine::builder().with_store(store).build()?;
//! let advertiser = EntityRef::new(EntityKind::Advertiser, 1, Utc::now());
//! let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//!
//! assert_eq!(engine.total_impressions_count(&advertiser, None).await?, 1);
//! assert_eq!(engine.total_click_rate(&advertiser, Some(DateRange::single(day))).await?, 0.0);
//! # Ok(())
//! # }
//! ```

pub mod aggregation;
pub mod cache;
pub mod config;
pub mod engine;
pub mod entity;
pub mod error;
pub mod observability;
pub mod store;
pub mod timeseries;
pub mod types;

pub use aggregation::{click_rate, per_mille};
pub use cache::{CacheConfig, CacheKey, InMemoryMetricCache, MetricName, NullCache};
pub use config::{load_config, AnalyticsConfig};
pub use engine::{AnalyticsEngine, AnalyticsEngineBuilder, EngineConfig, EventStore, MetricCache};
pub use entity::{EntityKey, EntityKind, EntityRef, HasImpressionMetrics};
pub use error::{CacheError, Error, Result, StoreError};
pub use observability::{AnalyticsMetrics, MetricsSnapshot, PrometheusExporter};
pub use store::{InMemoryEventStore, PartitionKey};
pub use types::{
    Activity, DailyCount, DailyRate, DateRange, DateSpan, Event, EventId, ImpressionRecord,
    SparklinePoint,
};
