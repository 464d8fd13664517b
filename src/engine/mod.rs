//! Pluggable analytics engine: event store and metric cache are injected

pub mod builder;
pub mod traits;

pub use builder::{AnalyticsEngine, AnalyticsEngineBuilder, EngineConfig, DEFAULT_MAX_RANGE_DAYS};
pub use traits::{EventStore, MetricCache};
