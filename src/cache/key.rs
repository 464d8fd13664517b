//! Deterministic cache key derivation
//!
//! Keys have the shape `{version_token}/{metric}[/{dates}]`:
//!
//! - no date boundary: `advertisers/15-20240101120000000000/total_impressions_count`
//! - one boundary (single day): `.../daily_impressions_count/2024-01-01`
//! - two boundaries (range): `.../daily_impressions_counts/20240101-20240103`
//!
//! Day and range suffixes use different date formats, so a one-day range
//! never collides with the single-day key for the same date.

use std::fmt;

use crate::entity::HasImpressionMetrics;
use crate::types::{Activity, DateSpan};

/// Name of a cached metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    /// All-time or ranged impression total
    TotalImpressionsCount,
    /// Impressions on one date
    DailyImpressionsCount,
    /// Impressions grouped by date over a range
    DailyImpressionsCounts,
    /// All-time or ranged click total
    TotalClicksCount,
    /// Clicks on one date
    DailyClicksCount,
    /// Clicks grouped by date over a range
    DailyClicksCounts,
    /// Min..max date span of impressions
    ProbableDatesWithImpressions,
    /// Exact distinct dates with impressions
    DatesWithImpressions,
    /// Exact distinct dates with clicked impressions
    DatesWithClickedImpressions,
    /// Dense per-day impression series
    SparklineImpressions,
    /// Dense per-day click series
    SparklineClicks,
}

impl MetricName {
    /// Stable name used inside keys
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::TotalImpressionsCount => "total_impressions_count",
            MetricName::DailyImpressionsCount => "daily_impressions_count",
            MetricName::DailyImpressionsCounts => "daily_impressions_counts",
            MetricName::TotalClicksCount => "total_clicks_count",
            MetricName::DailyClicksCount => "daily_clicks_count",
            MetricName::DailyClicksCounts => "daily_clicks_counts",
            MetricName::ProbableDatesWithImpressions => "probable_dates_with_impressions",
            MetricName::DatesWithImpressions => "dates_with_impressions",
            MetricName::DatesWithClickedImpressions => "dates_with_clicked_impressions",
            MetricName::SparklineImpressions => "sparkline_impressions",
            MetricName::SparklineClicks => "sparkline_clicks",
        }
    }

    /// Total count metric for an activity
    pub fn total(activity: Activity) -> Self {
        match activity {
            Activity::Impressions => MetricName::TotalImpressionsCount,
            Activity::Clicks => MetricName::TotalClicksCount,
        }
    }

    /// Single-day count metric for an activity
    pub fn daily(activity: Activity) -> Self {
        match activity {
            Activity::Impressions => MetricName::DailyImpressionsCount,
            Activity::Clicks => MetricName::DailyClicksCount,
        }
    }

    /// Grouped per-date counts metric for an activity
    pub fn daily_counts(activity: Activity) -> Self {
        match activity {
            Activity::Impressions => MetricName::DailyImpressionsCounts,
            Activity::Clicks => MetricName::DailyClicksCounts,
        }
    }

    /// Exact distinct-dates metric for an activity
    pub fn exact_dates(activity: Activity) -> Self {
        match activity {
            Activity::Impressions => MetricName::DatesWithImpressions,
            Activity::Clicks => MetricName::DatesWithClickedImpressions,
        }
    }

    /// Sparkline metric for an activity
    pub fn sparkline(activity: Activity) -> Self {
        match activity {
            Activity::Impressions => MetricName::SparklineImpressions,
            Activity::Clicks => MetricName::SparklineClicks,
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cache key for one (entity version, metric, date span) triple
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Build a key from an explicit version token
    ///
    /// Range ordering is not validated here.
    pub fn build(version_token: &str, metric: MetricName, span: &DateSpan) -> Self {
        let key = match span {
            DateSpan::AllTime => format!("{}/{}", version_token, metric),
            DateSpan::Day(day) => format!("{}/{}/{}", version_token, metric, day.format("%F")),
            DateSpan::Range(range) => format!(
                "{}/{}/{}-{}",
                version_token,
                metric,
                range.start.format("%Y%m%d"),
                range.end.format("%Y%m%d")
            ),
        };
        Self(key)
    }

    /// Build a key for an entity at its current version
    pub fn for_entity<E>(entity: &E, metric: MetricName, span: &DateSpan) -> Self
    where
        E: HasImpressionMetrics + ?Sized,
    {
        Self::build(&entity.version_token(), metric, span)
    }

    /// Key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DateRange;
    use chrono::NaiveDate;

    const TOKEN: &str = "advertisers/15-20240101120000000000";

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_all_time_key() {
        let key = CacheKey::build(TOKEN, MetricName::TotalImpressionsCount, &DateSpan::AllTime);
        assert_eq!(
            key.as_str(),
            "advertisers/15-20240101120000000000/total_impressions_count"
        );
    }

    #[test]
    fn test_day_and_range_keys() {
        let day = CacheKey::build(
            TOKEN,
            MetricName::DailyClicksCount,
            &DateSpan::Day(date(2024, 1, 1)),
        );
        assert!(day.as_str().ends_with("/daily_clicks_count/2024-01-01"));

        let range = DateRange::new(date(2024, 1, 1), date(2024, 1, 3)).unwrap();
        let ranged = CacheKey::build(TOKEN, MetricName::DailyClicksCounts, &range.into());
        assert!(ranged.as_str().ends_with("/daily_clicks_counts/20240101-20240103"));
    }

    #[test]
    fn test_keys_are_deterministic() {
        let span = DateSpan::Day(date(2024, 5, 6));
        let a = CacheKey::build(TOKEN, MetricName::DailyImpressionsCount, &span);
        let b = CacheKey::build(TOKEN, MetricName::DailyImpressionsCount, &span);
        assert_eq!(a, b);
    }

    #[test]
    fn test_keys_differ_by_metric_dates_and_token() {
        let span = DateSpan::Day(date(2024, 5, 6));
        let base = CacheKey::build(TOKEN, MetricName::DailyImpressionsCount, &span);

        let other_metric = CacheKey::build(TOKEN, MetricName::DailyClicksCount, &span);
        let other_day = CacheKey::build(
            TOKEN,
            MetricName::DailyImpressionsCount,
            &DateSpan::Day(date(2024, 5, 7)),
        );
        let one_day_range = CacheKey::build(
            TOKEN,
            MetricName::DailyImpressionsCount,
            &DateRange::single(date(2024, 5, 6)).into(),
        );
        let other_token = CacheKey::build(
            "advertisers/15-20240101120000000001",
            MetricName::DailyImpressionsCount,
            &span,
        );

        assert_ne!(base, other_metric);
        assert_ne!(base, other_day);
        assert_ne!(base, one_day_range);
        assert_ne!(base, other_token);
    }

    #[test]
    fn test_range_key_is_order_sensitive() {
        let forward = DateRange::new_unchecked(date(2024, 1, 1), date(2024, 1, 3));
        let backward = DateRange::new_unchecked(date(2024, 1, 3), date(2024, 1, 1));
        let a = CacheKey::build(TOKEN, MetricName::SparklineImpressions, &forward.into());
        let b = CacheKey::build(TOKEN, MetricName::SparklineImpressions, &backward.into());
        assert_ne!(a, b);
    }
}
