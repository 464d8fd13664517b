//! Click-through rates

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::engine::AnalyticsEngine;
use crate::entity::HasImpressionMetrics;
use crate::error::Result;
use crate::types::{Activity, DailyRate, DateRange};

/// Count expressed in thousands
pub fn per_mille(count: u64) -> f64 {
    count as f64 / 1000.0
}

/// Clicks per hundred impressions
///
/// Returns 0 when there are no impressions. Never NaN or infinite.
pub fn click_rate(clicks: u64, impressions: u64) -> f64 {
    if impressions == 0 {
        return 0.0;
    }
    let rate = clicks as f64 / impressions as f64 * 100.0;
    if rate.is_finite() {
        rate
    } else {
        0.0
    }
}

impl AnalyticsEngine {
    /// Click-through rate, all-time or over an inclusive range
    pub async fn total_click_rate<E>(&self, entity: &E, range: Option<DateRange>) -> Result<f64>
    where
        E: HasImpressionMetrics + ?Sized,
    {
        let impressions = self.total_impressions_count(entity, range).await?;
        if impressions == 0 {
            return Ok(0.0);
        }
        let clicks = self.total_clicks_count(entity, range).await?;
        Ok(click_rate(clicks, impressions))
    }

    /// Click-through rate of impressions displayed on one date
    pub async fn daily_click_rate<E>(&self, entity: &E, date: NaiveDate) -> Result<f64>
    where
        E: HasImpressionMetrics + ?Sized,
    {
        let impressions = self.daily_impressions_count(entity, date).await?;
        if impressions == 0 {
            return Ok(0.0);
        }
        let clicks = self.daily_clicks_count(entity, date).await?;
        Ok(click_rate(clicks, impressions))
    }

    /// One click-through rate per calendar date of the range
    ///
    /// Both grouped series are zero-filled over the range and paired by
    /// date, so a date missing from either side yields a rate of 0 rather
    /// than shifting later dates.
    pub async fn daily_click_rates<E>(&self, entity: &E, range: DateRange) -> Result<Vec<DailyRate>>
    where
        E: HasImpressionMetrics + ?Sized,
    {
        self.check_range_len(&range)?;

        let impressions = self.daily_counts(entity, Activity::Impressions, range).await?;
        let clicks = self.daily_counts(entity, Activity::Clicks, range).await?;

        let impressions: HashMap<NaiveDate, u64> =
            impressions.into_iter().map(|g| (g.date, g.count)).collect();
        let clicks: HashMap<NaiveDate, u64> =
            clicks.into_iter().map(|g| (g.date, g.count)).collect();

        let rates = range
            .iter_days()
            .map(|date| DailyRate {
                date,
                rate: click_rate(
                    clicks.get(&date).copied().unwrap_or(0),
                    impressions.get(&date).copied().unwrap_or(0),
                ),
            })
            .collect();

        Ok(rates)
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use super::*;

    #[test]
    fn test_click_rate_zero_guard() {
        assert_eq!(click_rate(0, 0), 0.0);
        assert_eq!(click_rate(5, 0), 0.0);
        assert_eq!(click_rate(1, 5), 20.0);
        assert_eq!(click_rate(3, 3), 100.0);
    }

    #[test]
    fn test_per_mille() {
        assert_eq!(per_mille(0), 0.0);
        assert_eq!(per_mille(2500), 2.5);
    }

    #[tokio::test]
    async fn test_total_click_rate() {
        let engine = scenario_engine();
        let entity = advertiser(1);
        let range = DateRange::new(date(2024, 1, 1), date(2024, 1, 3)).unwrap();

        assert_eq!(engine.total_click_rate(&entity, Some(range)).await.unwrap(), 20.0);
        assert_eq!(engine.total_click_rate(&entity, None).await.unwrap(), 20.0);
    }

    #[tokio::test]
    async fn test_click_rate_without_impressions_is_zero() {
        let engine = scenario_engine();
        let nobody = advertiser(99);

        assert_eq!(engine.total_click_rate(&nobody, None).await.unwrap(), 0.0);
        assert_eq!(engine.daily_click_rate(&nobody, date(2024, 1, 1)).await.unwrap(), 0.0);
    }

    #[tokio::test]
    async fn test_daily_click_rate() {
        let engine = scenario_engine();
        let entity = advertiser(1);

        let rate = engine.daily_click_rate(&entity, date(2024, 1, 1)).await.unwrap();
        assert!((rate - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(engine.daily_click_rate(&entity, date(2024, 1, 3)).await.unwrap(), 0.0);
    }

    #[tokio::test]
    async fn test_daily_click_rates_pair_by_date() {
        let engine = scenario_engine();
        let entity = advertiser(1);
        let range = DateRange::new(date(2024, 1, 1), date(2024, 1, 3)).unwrap();

        let rates = engine.daily_click_rates(&entity, range).await.unwrap();
        assert_eq!(rates.len(), 3);
        assert_eq!(rates[0].date, date(2024, 1, 1));
        assert!((rates[0].rate - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(rates[1], DailyRate { date: date(2024, 1, 2), rate: 0.0 });
        assert_eq!(rates[2], DailyRate { date: date(2024, 1, 3), rate: 0.0 });
    }

    #[tokio::test]
    async fn test_daily_click_rates_reject_oversized_range() {
        let engine = scenario_engine();
        let range = DateRange::new(date(2000, 1, 1), date(2024, 1, 1)).unwrap();

        let result = engine.daily_click_rates(&advertiser(1), range).await;
        assert!(matches!(result, Err(crate::error::Error::RangeTooLarge { .. })));
    }
}
