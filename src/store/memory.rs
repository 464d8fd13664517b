//! Partitioned in-memory event store
//!
//! Events are split into one partition per (month, advertiser), the same
//! layout the production impressions tables use. Date-bounded queries prune
//! partitions whose month lies outside the requested span and advertiser
//! queries prune on the advertiser id; every query still answers over the
//! whole logical collection.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use chrono::{Datelike, FixedOffset, NaiveDate, Offset, Utc};
use parking_lot::RwLock;
use tracing::debug;

use crate::engine::traits::EventStore;
use crate::entity::{EntityKey, EntityKind};
use crate::error::{Result, StoreResult};
use crate::types::{DailyCount, DateRange, DateSpan, Event, EventId, ImpressionRecord};

/// Identifies one physical partition of the event log
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PartitionKey {
    /// Calendar year of the display dates held
    pub year: i32,
    /// Calendar month of the display dates held
    pub month: u32,
    /// Advertiser whose impressions are held
    pub advertiser_id: i64,
}

impl PartitionKey {
    /// Partition an event belongs to
    pub fn for_event(event: &Event) -> Self {
        let date = event.displayed_at_date();
        Self {
            year: date.year(),
            month: date.month(),
            advertiser_id: event.advertiser_id(),
        }
    }

    /// Table-style partition name, e.g. `impressions_2018_03_advertiser_15`
    pub fn name(&self) -> String {
        format!(
            "impressions_{:04}_{:02}_advertiser_{}",
            self.year, self.month, self.advertiser_id
        )
    }

    /// Whether this partition may hold events within the span
    pub fn overlaps(&self, span: &DateSpan) -> bool {
        match span.bounds() {
            None => true,
            Some((start, end)) => {
                let month = (self.year, self.month);
                (start.year(), start.month()) <= month && month <= (end.year(), end.month())
            }
        }
    }

    fn may_hold(&self, entity: &EntityKey) -> bool {
        entity.kind != EntityKind::Advertiser || entity.id == self.advertiser_id
    }
}

/// Append-only event store held in memory
pub struct InMemoryEventStore {
    partitions: RwLock<BTreeMap<PartitionKey, Vec<Event>>>,
    zone: FixedOffset,
}

impl InMemoryEventStore {
    /// Create an empty store deriving display dates in `zone`
    pub fn new(zone: FixedOffset) -> Self {
        Self {
            partitions: RwLock::new(BTreeMap::new()),
            zone,
        }
    }

    /// Reference time zone used for display dates
    pub fn zone(&self) -> FixedOffset {
        self.zone
    }

    /// Append an already-built event
    pub fn append(&self, event: Event) {
        let key = PartitionKey::for_event(&event);
        self.partitions.write().entry(key).or_default().push(event);
    }

    /// Build an event from a raw record and append it
    pub fn record(&self, record: ImpressionRecord) -> Result<EventId> {
        let event = Event::from_record(record, self.zone)?;
        let id = event.id();
        self.append(event);
        Ok(id)
    }

    /// Build and append many records, stopping at the first invalid one
    pub fn record_all<I>(&self, records: I) -> Result<usize>
    where
        I: IntoIterator<Item = ImpressionRecord>,
    {
        let mut appended = 0;
        for record in records {
            self.record(record)?;
            appended += 1;
        }
        Ok(appended)
    }

    /// Total number of events
    pub fn len(&self) -> usize {
        self.partitions.read().values().map(Vec::len).sum()
    }

    /// Whether the store holds no events
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Names of all partitions, in key order
    pub fn partition_names(&self) -> Vec<String> {
        self.partitions.read().keys().map(PartitionKey::name).collect()
    }

    fn scan<F>(&self, entity: &EntityKey, span: &DateSpan, clicked_only: bool, mut visit: F)
    where
        F: FnMut(&Event),
    {
        let partitions = self.partitions.read();
        let mut scanned = 0usize;

        for (key, events) in partitions.iter() {
            if !key.may_hold(entity) || !key.overlaps(span) {
                continue;
            }
            scanned += 1;
            events
                .iter()
                .filter(|e| e.subject_id(entity.kind) == entity.id)
                .filter(|e| span.contains(e.displayed_at_date()))
                .filter(|e| !clicked_only || e.is_clicked())
                .for_each(&mut visit);
        }

        debug!(
            entity = %entity,
            scanned,
            total = partitions.len(),
            "Scanned event partitions"
        );
    }
}

impl Default for InMemoryEventStore {
    fn default() -> Self {
        Self::new(Utc.fix())
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn count(
        &self,
        entity: &EntityKey,
        span: &DateSpan,
        clicked_only: bool,
    ) -> StoreResult<u64> {
        let mut count = 0u64;
        self.scan(entity, span, clicked_only, |_| count += 1);
        Ok(count)
    }

    async fn group_counts_by_date(
        &self,
        entity: &EntityKey,
        range: &DateRange,
        clicked_only: bool,
    ) -> StoreResult<Vec<DailyCount>> {
        let mut groups: BTreeMap<NaiveDate, u64> = BTreeMap::new();
        self.scan(entity, &DateSpan::Range(*range), clicked_only, |e| {
            *groups.entry(e.displayed_at_date()).or_default() += 1;
        });
        Ok(groups
            .into_iter()
            .map(|(date, count)| DailyCount::new(date, count))
            .collect())
    }

    async fn min_max_date(
        &self,
        entity: &EntityKey,
        span: &DateSpan,
    ) -> StoreResult<Option<(NaiveDate, NaiveDate)>> {
        let mut bounds: Option<(NaiveDate, NaiveDate)> = None;
        self.scan(entity, span, false, |e| {
            let date = e.displayed_at_date();
            bounds = Some(match bounds {
                None => (date, date),
                Some((min, max)) => (min.min(date), max.max(date)),
            });
        });
        Ok(bounds)
    }

    async fn distinct_dates(
        &self,
        entity: &EntityKey,
        span: &DateSpan,
        clicked_only: bool,
    ) -> StoreResult<Vec<NaiveDate>> {
        let mut dates = BTreeSet::new();
        self.scan(entity, span, clicked_only, |e| {
            dates.insert(e.displayed_at_date());
        });
        Ok(dates.into_iter().collect())
    }

    fn engine_name(&self) -> &str {
        "in-memory-partitioned"
    }
}
