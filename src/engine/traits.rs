//! Collaborator traits the analytics engine is built on
//!
//! The engine never owns event storage or cache infrastructure. Both are
//! injected behind these traits so production backends, the in-memory
//! reference implementations and test doubles are interchangeable.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::NaiveDate;

use crate::entity::EntityKey;
use crate::error::{CacheResult, StoreResult};
use crate::types::{DailyCount, DateRange, DateSpan};

/// Read-only query contract of the impression event store
///
/// The store may be physically partitioned; every method answers over the
/// whole logical collection of events for the entity.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Count events for the entity within the span
    async fn count(
        &self,
        entity: &EntityKey,
        span: &DateSpan,
        clicked_only: bool,
    ) -> StoreResult<u64>;

    /// Event counts grouped by display date, ascending by date
    ///
    /// Dates without events are omitted.
    async fn group_counts_by_date(
        &self,
        entity: &EntityKey,
        range: &DateRange,
        clicked_only: bool,
    ) -> StoreResult<Vec<DailyCount>>;

    /// Earliest and latest display date within the span, in one scan
    async fn min_max_date(
        &self,
        entity: &EntityKey,
        span: &DateSpan,
    ) -> StoreResult<Option<(NaiveDate, NaiveDate)>>;

    /// Distinct display dates within the span, ascending
    async fn distinct_dates(
        &self,
        entity: &EntityKey,
        span: &DateSpan,
        clicked_only: bool,
    ) -> StoreResult<Vec<NaiveDate>>;

    /// Get storage engine name
    fn engine_name(&self) -> &str;
}

/// Key/value contract of the derived-value cache
///
/// Values are opaque encoded bytes; no transactional semantics are assumed.
#[async_trait]
pub trait MetricCache: Send + Sync {
    /// Look up a key, `None` on a miss or an expired entry
    async fn get(&self, key: &str) -> CacheResult<Option<Bytes>>;

    /// Store a value under a key, replacing any previous value
    async fn set(&self, key: &str, value: Bytes) -> CacheResult<()>;

    /// Remove a key, returning whether it was present
    async fn delete(&self, key: &str) -> CacheResult<bool>;

    /// Remove every entry
    async fn clear(&self) -> CacheResult<()>;

    /// Get cache backend name
    fn backend_name(&self) -> &str;
}
