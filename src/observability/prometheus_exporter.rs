//! Prometheus metrics exporter for the analytics engine
//!
//! Renders engine and cache counters in the Prometheus text exposition
//! format and appends whatever is registered in the global registry.

use std::fmt::Write;
use std::sync::Arc;

use prometheus::{Encoder, TextEncoder};

use crate::cache::CacheStatsSnapshot;
use crate::observability::metrics::{AnalyticsMetrics, MetricsSnapshot};

/// Default prefix for exported metric names
pub const DEFAULT_METRIC_PREFIX: &str = "impression_analytics";

/// Configuration for Prometheus exporter
#[derive(Debug, Clone)]
pub struct PrometheusConfig {
    /// Prefix for all metric names (default: "impression_analytics")
    pub metric_prefix: String,
    /// Append metrics from the global prometheus registry
    pub include_global_registry: bool,
}

impl Default for PrometheusConfig {
    fn default() -> Self {
        Self {
            metric_prefix: DEFAULT_METRIC_PREFIX.to_string(),
            include_global_registry: true,
        }
    }
}

/// Prometheus metrics exporter
pub struct PrometheusExporter {
    config: PrometheusConfig,
    metrics: Arc<AnalyticsMetrics>,
}

impl PrometheusExporter {
    /// Create a new Prometheus exporter
    pub fn new(config: PrometheusConfig, metrics: Arc<AnalyticsMetrics>) -> Self {
        Self { config, metrics }
    }

    /// Export engine metrics, plus cache counters when a local cache is in use
    pub fn export(&self, cache: Option<&CacheStatsSnapshot>) -> String {
        let mut output = String::new();
        let snapshot = self.metrics.snapshot();
        let prefix = &self.config.metric_prefix;

        self.export_engine_metrics(&mut output, prefix, &snapshot);
        if let Some(cache) = cache {
            self.export_cache_metrics(&mut output, prefix, cache);
        }

        if self.config.include_global_registry {
            if let Ok(global_metrics) = self.export_global_metrics() {
                output.push_str(&global_metrics);
            }
        }

        output
    }

    fn write_metric(
        output: &mut String,
        name: &str,
        kind: &str,
        help: &str,
        value: impl std::fmt::Display,
    ) {
        let _ = writeln!(output, "# HELP {} {}", name, help);
        let _ = writeln!(output, "# TYPE {} {}", name, kind);
        let _ = writeln!(output, "{} {}\n", name, value);
    }

    fn export_engine_metrics(
        &self,
        output: &mut String,
        prefix: &str,
        snapshot: &MetricsSnapshot,
    ) {
        let counters = [
            ("cache_hits_total", "Metric requests served from cache", snapshot.cache_hits),
            ("cache_misses_total", "Metric requests that recomputed", snapshot.cache_misses),
            ("cache_writes_total", "Computed values written to cache", snapshot.cache_writes),
            (
                "cache_decode_failures_total",
                "Cache entries discarded because they could not be decoded",
                snapshot.decode_failures,
            ),
            (
                "computations_total",
                "Successful recomputations against the event store",
                snapshot.computations,
            ),
            ("compute_errors_total", "Failed recomputations", snapshot.compute_errors),
        ];
        for (name, help, value) in counters {
            Self::write_metric(output, &format!("{}_{}", prefix, name), "counter", help, value);
        }

        Self::write_metric(
            output,
            &format!("{}_compute_latency_avg_microseconds", prefix),
            "gauge",
            "Average recomputation latency in microseconds",
            format!("{:.2}", snapshot.avg_compute_time_us()),
        );
        Self::write_metric(
            output,
            &format!("{}_cache_hit_rate", prefix),
            "gauge",
            "Fraction of metric requests served from cache (0.0-1.0)",
            format!("{:.4}", snapshot.hit_rate()),
        );
        Self::write_metric(
            output,
            &format!("{}_uptime_seconds", prefix),
            "gauge",
            "Engine uptime in seconds",
            snapshot.uptime.as_secs(),
        );
    }

    fn export_cache_metrics(
        &self,
        output: &mut String,
        prefix: &str,
        cache: &CacheStatsSnapshot,
    ) {
        Self::write_metric(
            output,
            &format!("{}_cache_evictions_total", prefix),
            "counter",
            "Cache entries evicted to stay within capacity",
            cache.evictions,
        );
        Self::write_metric(
            output,
            &format!("{}_cache_expirations_total", prefix),
            "counter",
            "Cache entries dropped after their TTL",
            cache.expirations,
        );
    }

    /// Export global metrics from prometheus crate registry
    fn export_global_metrics(&self) -> Result<String, String> {
        let encoder = TextEncoder::new();
        let metric_families = prometheus::gather();
        let mut buffer = vec![];

        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|e| format!("Failed to encode metrics: {}", e))?;

        String::from_utf8(buffer).map_err(|e| format!("Metrics contain invalid UTF-8: {}", e))
    }

    /// Export metrics as HTTP response body with correct content type
    pub fn export_http(&self, cache: Option<&CacheStatsSnapshot>) -> (String, &'static str) {
        let body = self.export(cache);
        let content_type = "text/plain; version=0.0.4; charset=utf-8";
        (body, content_type)
    }
}
