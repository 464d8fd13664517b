//! Impression and click counts

use chrono::NaiveDate;

use super::rates::per_mille;
use crate::cache::MetricName;
use crate::engine::AnalyticsEngine;
use crate::entity::HasImpressionMetrics;
use crate::error::{Error, Result};
use crate::types::{Activity, DailyCount, DateRange, DateSpan};

impl AnalyticsEngine {
    /// Count events of an activity, all-time or over an inclusive range
    ///
    /// A ranged total is the sum of the per-date groups for that range, so
    /// it shares their cache entry.
    pub async fn total_count<E>(
        &self,
        entity: &E,
        activity: Activity,
        range: Option<DateRange>,
    ) -> Result<u64>
    where
        E: HasImpressionMetrics + ?Sized,
    {
        if let Some(range) = range {
            let groups = self.daily_counts(entity, activity, range).await?;
            return Ok(groups.iter().map(|g| g.count).sum());
        }

        let key = entity.entity_key();
        self.memoize(entity, MetricName::total(activity), DateSpan::AllTime, || async move {
            self.store()
                .count(&key, &DateSpan::AllTime, activity.clicked_only())
                .await
                .map_err(Error::from)
        })
        .await
    }

    /// Count events of an activity displayed on one date
    pub async fn daily_count<E>(
        &self,
        entity: &E,
        activity: Activity,
        date: NaiveDate,
    ) -> Result<u64>
    where
        E: HasImpressionMetrics + ?Sized,
    {
        let key = entity.entity_key();
        let span = DateSpan::Day(date);
        self.memoize(entity, MetricName::daily(activity), span, || async move {
            self.store()
                .count(&key, &span, activity.clicked_only())
                .await
                .map_err(Error::from)
        })
        .await
    }

    /// Per-date counts of an activity across a range, ascending by date
    ///
    /// Dates without events are omitted; see the sparkline operations for a
    /// dense series.
    pub async fn daily_counts<E>(
        &self,
        entity: &E,
        activity: Activity,
        range: DateRange,
    ) -> Result<Vec<DailyCount>>
    where
        E: HasImpressionMetrics + ?Sized,
    {
        let key = entity.entity_key();
        self.memoize(entity, MetricName::daily_counts(activity), range.into(), || async move {
            self.store()
                .group_counts_by_date(&key, &range, activity.clicked_only())
                .await
                .map_err(Error::from)
        })
        .await
    }

    // =========================================================================
    // Impressions
    // =========================================================================

    /// Impressions for the entity, all-time or over a range
    pub async fn total_impressions_count<E>(
        &self,
        entity: &E,
        range: Option<DateRange>,
    ) -> Result<u64>
    where
        E: HasImpressionMetrics + ?Sized,
    {
        self.total_count(entity, Activity::Impressions, range).await
    }

    /// Impressions displayed on one date
    pub async fn daily_impressions_count<E>(&self, entity: &E, date: NaiveDate) -> Result<u64>
    where
        E: HasImpressionMetrics + ?Sized,
    {
        self.daily_count(entity, Activity::Impressions, date).await
    }

    /// Non-empty per-date impression counts across a range
    pub async fn daily_impressions_counts<E>(
        &self,
        entity: &E,
        range: DateRange,
    ) -> Result<Vec<DailyCount>>
    where
        E: HasImpressionMetrics + ?Sized,
    {
        self.daily_counts(entity, Activity::Impressions, range).await
    }

    /// All-time impressions in thousands
    pub async fn total_impressions_per_mille<E>(&self, entity: &E) -> Result<f64>
    where
        E: HasImpressionMetrics + ?Sized,
    {
        Ok(per_mille(self.total_impressions_count(entity, None).await?))
    }

    /// Impressions on one date in thousands
    pub async fn daily_impressions_per_mille<E>(&self, entity: &E, date: NaiveDate) -> Result<f64>
    where
        E: HasImpressionMetrics + ?Sized,
    {
        Ok(per_mille(self.daily_impressions_count(entity, date).await?))
    }

    // =========================================================================
    // Clicks
    // =========================================================================

    /// Clicks for the entity, all-time or over a range
    pub async fn total_clicks_count<E>(&self, entity: &E, range: Option<DateRange>) -> Result<u64>
    where
        E: HasImpressionMetrics + ?Sized,
    {
        self.total_count(entity, Activity::Clicks, range).await
    }

    /// Clicks on impressions displayed on one date
    pub async fn daily_clicks_count<E>(&self, entity: &E, date: NaiveDate) -> Result<u64>
    where
        E: HasImpressionMetrics + ?Sized,
    {
        self.daily_count(entity, Activity::Clicks, date).await
    }

    /// Non-empty per-date click counts across a range
    pub async fn daily_clicks_counts<E>(
        &self,
        entity: &E,
        range: DateRange,
    ) -> Result<Vec<DailyCount>>
    where
        E: HasImpressionMetrics + ?Sized,
    {
        self.daily_counts(entity, Activity::Clicks, range).await
    }

    /// All-time clicks in thousands
    pub async fn total_clicks_per_mille<E>(&self, entity: &E) -> Result<f64>
    where
        E: HasImpressionMetrics + ?Sized,
    {
        Ok(per_mille(self.total_clicks_count(entity, None).await?))
    }

    /// Clicks on one date in thousands
    pub async fn daily_clicks_per_mille<E>(&self, entity: &E, date: NaiveDate) -> Result<f64>
    where
        E: HasImpressionMetrics + ?Sized,
    {
        Ok(per_mille(self.daily_clicks_count(entity, date).await?))
    }
}
