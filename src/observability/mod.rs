//! Observability for the analytics engine
//!
//! # Components
//!
//! - **AnalyticsMetrics**: atomic counters for cache hits, misses and
//!   recomputations, shared by every query of an engine
//! - **PrometheusExporter**: text exposition of those counters

pub mod metrics;
pub mod prometheus_exporter;

pub use metrics::{AnalyticsMetrics, MetricsSnapshot};
pub use prometheus_exporter::{PrometheusConfig, PrometheusExporter, DEFAULT_METRIC_PREFIX};
