//! Test doubles and fixtures shared by the integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use impression_analytics::error::{CacheResult, StoreResult};
use impression_analytics::{
    CacheError, DailyCount, DateRange, DateSpan, EntityKey, EntityKind, EntityRef, EventStore,
    ImpressionRecord, InMemoryEventStore, MetricCache, StoreError,
};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

pub fn range(start: NaiveDate, end: NaiveDate) -> DateRange {
    DateRange::new(start, end).unwrap()
}

pub fn advertiser(id: i64) -> EntityRef {
    EntityRef::new(EntityKind::Advertiser, id, at(2023, 12, 1, 0))
}

pub fn impression(
    advertiser_id: i64,
    displayed_at: DateTime<Utc>,
    clicked: bool,
) -> ImpressionRecord {
    ImpressionRecord {
        id: None,
        advertiser_id,
        campaign_id: advertiser_id * 10,
        campaign_name: "winter-sale".to_string(),
        property_id: 7,
        property_name: "news-portal".to_string(),
        displayed_at,
        clicked_at: clicked.then(|| displayed_at + chrono::Duration::seconds(30)),
        payable: true,
        fallback_campaign: false,
    }
}

/// 2024-01-01: 3 impressions, 1 clicked. 2024-01-03: 2 impressions, none clicked.
pub fn scenario_store() -> InMemoryEventStore {
    let store = InMemoryEventStore::default();
    store
        .record_all(vec![
            impression(1, at(2024, 1, 1, 9), true),
            impression(1, at(2024, 1, 1, 13), false),
            impression(1, at(2024, 1, 1, 17), false),
            impression(1, at(2024, 1, 3, 9), false),
            impression(1, at(2024, 1, 3, 21), false),
        ])
        .unwrap();
    store
}

/// Store whose every query fails
pub struct FailingStore;

#[async_trait]
impl EventStore for FailingStore {
    async fn count(&self, _: &EntityKey, _: &DateSpan, _: bool) -> StoreResult<u64> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn group_counts_by_date(
        &self,
        _: &EntityKey,
        _: &DateRange,
        _: bool,
    ) -> StoreResult<Vec<DailyCount>> {
        Err(StoreError::QueryFailed("relation does not exist".to_string()))
    }

    async fn min_max_date(
        &self,
        _: &EntityKey,
        _: &DateSpan,
    ) -> StoreResult<Option<(NaiveDate, NaiveDate)>> {
        Err(StoreError::Timeout(5_000))
    }

    async fn distinct_dates(
        &self,
        _: &EntityKey,
        _: &DateSpan,
        _: bool,
    ) -> StoreResult<Vec<NaiveDate>> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    fn engine_name(&self) -> &str {
        "failing"
    }
}

/// Cache whose backend is down
pub struct FailingCache;

#[async_trait]
impl MetricCache for FailingCache {
    async fn get(&self, _: &str) -> CacheResult<Option<Bytes>> {
        Err(CacheError::Unavailable("cache node down".to_string()))
    }

    async fn set(&self, _: &str, _: Bytes) -> CacheResult<()> {
        Err(CacheError::Unavailable("cache node down".to_string()))
    }

    async fn delete(&self, _: &str) -> CacheResult<bool> {
        Err(CacheError::Unavailable("cache node down".to_string()))
    }

    async fn clear(&self) -> CacheResult<()> {
        Err(CacheError::Unavailable("cache node down".to_string()))
    }

    fn backend_name(&self) -> &str {
        "failing"
    }
}

/// Store that counts the queries reaching it
pub struct CountingStore {
    inner: InMemoryEventStore,
    queries: Arc<AtomicUsize>,
}

impl CountingStore {
    pub fn new(inner: InMemoryEventStore) -> (Self, Arc<AtomicUsize>) {
        let queries = Arc::new(AtomicUsize::new(0));
        (
            Self {
                inner,
                queries: queries.clone(),
            },
            queries,
        )
    }

    fn hit(&self) {
        self.queries.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl EventStore for CountingStore {
    async fn count(
        &self,
        entity: &EntityKey,
        span: &DateSpan,
        clicked_only: bool,
    ) -> StoreResult<u64> {
        self.hit();
        self.inner.count(entity, span, clicked_only).await
    }

    async fn group_counts_by_date(
        &self,
        entity: &EntityKey,
        range: &DateRange,
        clicked_only: bool,
    ) -> StoreResult<Vec<DailyCount>> {
        self.hit();
        self.inner.group_counts_by_date(entity, range, clicked_only).await
    }

    async fn min_max_date(
        &self,
        entity: &EntityKey,
        span: &DateSpan,
    ) -> StoreResult<Option<(NaiveDate, NaiveDate)>> {
        self.hit();
        self.inner.min_max_date(entity, span).await
    }

    async fn distinct_dates(
        &self,
        entity: &EntityKey,
        span: &DateSpan,
        clicked_only: bool,
    ) -> StoreResult<Vec<NaiveDate>> {
        self.hit();
        self.inner.distinct_dates(entity, span, clicked_only).await
    }

    fn engine_name(&self) -> &str {
        "counting"
    }
}

/// Store whose queries never complete
pub struct StalledStore;

#[async_trait]
impl EventStore for StalledStore {
    async fn count(&self, _: &EntityKey, _: &DateSpan, _: bool) -> StoreResult<u64> {
        std::future::pending().await
    }

    async fn group_counts_by_date(
        &self,
        _: &EntityKey,
        _: &DateRange,
        _: bool,
    ) -> StoreResult<Vec<DailyCount>> {
        std::future::pending().await
    }

    async fn min_max_date(
        &self,
        _: &EntityKey,
        _: &DateSpan,
    ) -> StoreResult<Option<(NaiveDate, NaiveDate)>> {
        std::future::pending().await
    }

    async fn distinct_dates(
        &self,
        _: &EntityKey,
        _: &DateSpan,
        _: bool,
    ) -> StoreResult<Vec<NaiveDate>> {
        std::future::pending().await
    }

    fn engine_name(&self) -> &str {
        "stalled"
    }
}
