//! Dates on which an entity has events
//!
//! Two scans with different cost and precision are kept side by side. The
//! probable scan asks the store for the earliest and latest date only and
//! fills in everything between, so it never misses a date but may report
//! empty ones. The exact scan returns distinct dates and is the expensive one.

use chrono::NaiveDate;

use crate::cache::MetricName;
use crate::engine::AnalyticsEngine;
use crate::entity::HasImpressionMetrics;
use crate::error::{Error, Result};
use crate::types::{Activity, DateRange, DateSpan};

impl AnalyticsEngine {
    /// Every date between the earliest and latest event within the span
    ///
    /// Only the `(min, max)` pair is queried and cached. The expanded list
    /// is not held to `max_range_days`: its length is bounded by the span of
    /// the entity's data, or by `span` when one is given.
    pub async fn probable_dates_with_events<E>(
        &self,
        entity: &E,
        span: DateSpan,
    ) -> Result<Vec<NaiveDate>>
    where
        E: HasImpressionMetrics + ?Sized,
    {
        let key = entity.entity_key();
        let bounds = self
            .memoize(entity, MetricName::ProbableDatesWithImpressions, span, || async move {
                self.store()
                    .min_max_date(&key, &span)
                    .await
                    .map_err(Error::from)
            })
            .await?;

        Ok(match bounds {
            Some((first, last)) => DateRange::new_unchecked(first, last).iter_days().collect(),
            None => Vec::new(),
        })
    }

    /// Probable dates for a single day
    pub async fn probable_dates_on<E>(&self, entity: &E, date: NaiveDate) -> Result<Vec<NaiveDate>>
    where
        E: HasImpressionMetrics + ?Sized,
    {
        self.probable_dates_with_events(entity, DateSpan::Day(date)).await
    }

    /// Distinct dates with events within the span, ascending
    pub async fn exact_dates_with_events<E>(
        &self,
        entity: &E,
        span: DateSpan,
        only_clicked: bool,
    ) -> Result<Vec<NaiveDate>>
    where
        E: HasImpressionMetrics + ?Sized,
    {
        let activity = if only_clicked {
            Activity::Clicks
        } else {
            Activity::Impressions
        };
        let key = entity.entity_key();
        self.memoize(entity, MetricName::exact_dates(activity), span, || async move {
            self.store()
                .distinct_dates(&key, &span, only_clicked)
                .await
                .map_err(Error::from)
        })
        .await
    }

    /// Distinct dates with any impression
    pub async fn dates_with_impressions<E>(
        &self,
        entity: &E,
        span: DateSpan,
    ) -> Result<Vec<NaiveDate>>
    where
        E: HasImpressionMetrics + ?Sized,
    {
        self.exact_dates_with_events(entity, span, false).await
    }

    /// Distinct dates with a clicked impression
    pub async fn dates_with_clicked_impressions<E>(
        &self,
        entity: &E,
        span: DateSpan,
    ) -> Result<Vec<NaiveDate>>
    where
        E: HasImpressionMetrics + ?Sized,
    {
        self.exact_dates_with_events(entity, span, true).await
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use super::*;

    #[tokio::test]
    async fn test_probable_dates_fill_gaps() {
        let engine = scenario_engine();
        let dates = engine
            .probable_dates_with_events(&advertiser(1), DateSpan::AllTime)
            .await
            .unwrap();
        assert_eq!(dates, vec![date(2024, 1, 1), date(2024, 1, 2), date(2024, 1, 3)]);
    }

    #[tokio::test]
    async fn test_exact_dates_skip_gaps() {
        let engine = scenario_engine();
        let entity = advertiser(1);

        let all = engine.dates_with_impressions(&entity, DateSpan::AllTime).await.unwrap();
        assert_eq!(all, vec![date(2024, 1, 1), date(2024, 1, 3)]);

        let clicked = engine
            .dates_with_clicked_impressions(&entity, DateSpan::AllTime)
            .await
            .unwrap();
        assert_eq!(clicked, vec![date(2024, 1, 1)]);
    }

    #[tokio::test]
    async fn test_probable_dates_cover_exact_dates() {
        let engine = scenario_engine();
        let entity = advertiser(1);
        let span = DateSpan::Range(DateRange::new(date(2024, 1, 2), date(2024, 1, 31)).unwrap());

        let probable = engine.probable_dates_with_events(&entity, span).await.unwrap();
        let exact = engine.dates_with_impressions(&entity, span).await.unwrap();
        assert_eq!(exact, vec![date(2024, 1, 3)]);
        assert!(exact.iter().all(|d| probable.contains(d)));
    }

    #[tokio::test]
    async fn test_no_events_gives_empty_dates() {
        let engine = scenario_engine();
        let nobody = advertiser(42);

        assert!(engine
            .probable_dates_with_events(&nobody, DateSpan::AllTime)
            .await
            .unwrap()
            .is_empty());
        assert!(engine.probable_dates_on(&nobody, date(2024, 1, 1)).await.unwrap().is_empty());
        assert!(engine
            .dates_with_impressions(&nobody, DateSpan::AllTime)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_probable_dates_follow_data_span_past_range_limit() {
        let store = crate::store::InMemoryEventStore::default();
        store
            .record_all(vec![
                record(5, at(2022, 1, 1, 10), false),
                record(5, at(2024, 1, 1, 10), false),
            ])
            .unwrap();
        let engine = AnalyticsEngine::builder()
            .with_store(store)
            .with_config(crate::engine::EngineConfig { max_range_days: 31 })
            .build()
            .unwrap();

        let dates = engine
            .probable_dates_with_events(&advertiser(5), DateSpan::AllTime)
            .await
            .unwrap();
        assert_eq!(dates.len(), 731);
        assert_eq!(dates.first(), Some(&date(2022, 1, 1)));
        assert_eq!(dates.last(), Some(&date(2024, 1, 1)));
    }

    #[tokio::test]
    async fn test_probable_dates_on_single_day() {
        let engine = scenario_engine();
        let entity = advertiser(1);

        assert_eq!(
            engine.probable_dates_on(&entity, date(2024, 1, 3)).await.unwrap(),
            vec![date(2024, 1, 3)]
        );
        assert!(engine.probable_dates_on(&entity, date(2024, 1, 2)).await.unwrap().is_empty());
    }
}
