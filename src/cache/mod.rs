//! Derived-value cache for analytics metrics
//!
//! Every metric the engine computes is memoized under a key derived from the
//! entity's version token, the metric name and its date boundaries. The cache
//! is purely an optimization: dropping any or all entries changes latency,
//! never results.
//!
//! - **Keys** (`key.rs`): deterministic `{token}/{metric}[/{dates}]` keys
//! - **In-memory cache** (`memory.rs`): LRU bounded, optional TTL
//! - **Null cache** (`null.rs`): always misses, for cache-less operation
//! - **Fetch or compute** (`fetch.rs`): the memoization primitive
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  miss   ┌──────────────────┐  query  ┌──────────────┐
//! │ Aggregation  │────────▶│ fetch_or_compute │────────▶│ Event Store  │
//! │   Engine     │◀────────│                  │◀────────│              │
//! └──────────────┘   hit   └────────┬─────────┘         └──────────────┘
//!                                   │ get / set
//!                          ┌────────▼─────────┐
//!                          │   MetricCache    │
//!                          └──────────────────┘
//! ```

mod fetch;
mod key;
mod memory;
mod null;

pub use fetch::fetch_or_compute;
pub use key::{CacheKey, MetricName};
pub use memory::{
    CacheConfig, CacheStats, CacheStatsSnapshot, InMemoryMetricCache, DEFAULT_CACHE_CAPACITY,
};
pub use null::NullCache;
