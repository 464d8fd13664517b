//! Sparkline construction
//!
//! A sparkline holds one point per calendar date of its range, zero-valued
//! dates included. Each point is read through the cached single-day count,
//! and the finished series is cached again as one value for the range.

use tracing::debug;

use crate::cache::MetricName;
use crate::engine::AnalyticsEngine;
use crate::entity::HasImpressionMetrics;
use crate::error::Result;
use crate::types::{Activity, DateRange, DateSpan, SparklinePoint};

impl AnalyticsEngine {
    /// One point per date of `range` with that date's count of `activity`
    pub async fn sparkline<E>(
        &self,
        entity: &E,
        activity: Activity,
        range: DateRange,
    ) -> Result<Vec<SparklinePoint>>
    where
        E: HasImpressionMetrics + ?Sized,
    {
        self.check_range_len(&range)?;
        self.memoize(entity, MetricName::sparkline(activity), DateSpan::Range(range), || {
            self.build_sparkline(entity, activity, range)
        })
        .await
    }

    /// Daily impressions across the range, labelled "Impressions"
    pub async fn impression_sparkline<E>(
        &self,
        entity: &E,
        range: DateRange,
    ) -> Result<Vec<SparklinePoint>>
    where
        E: HasImpressionMetrics + ?Sized,
    {
        self.sparkline(entity, Activity::Impressions, range).await
    }

    /// Daily clicks across the range, labelled "Clicks"
    pub async fn click_sparkline<E>(
        &self,
        entity: &E,
        range: DateRange,
    ) -> Result<Vec<SparklinePoint>>
    where
        E: HasImpressionMetrics + ?Sized,
    {
        self.sparkline(entity, Activity::Clicks, range).await
    }

    async fn build_sparkline<E>(
        &self,
        entity: &E,
        activity: Activity,
        range: DateRange,
    ) -> Result<Vec<SparklinePoint>>
    where
        E: HasImpressionMetrics + ?Sized,
    {
        let mut points = Vec::with_capacity(range.num_days() as usize);
        for date in range.iter_days() {
            let value = self.daily_count(entity, activity, date).await?;
            points.push(SparklinePoint::new(activity, date, value));
        }

        debug!(
            entity = %entity.entity_key(),
            series = activity.label(),
            points = points.len(),
            "Built sparkline"
        );
        Ok(points)
    }
}
