//! Core data types used throughout the analytics engine

use chrono::{DateTime, Days, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::entity::EntityKind;
use crate::error::{Error, Result};

/// Unique identifier for an impression event
pub type EventId = Uuid;

// =============================================================================
// Dates
// =============================================================================

/// Inclusive calendar-date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    /// First date (inclusive)
    pub start: NaiveDate,
    /// Last date (inclusive)
    pub end: NaiveDate,
}

impl DateRange {
    /// Create a new range, rejecting an end before the start
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            return Err(Error::InvalidRange(format!(
                "end {} is before start {}",
                end, start
            )));
        }
        Ok(Self { start, end })
    }

    /// Create a range without validating its ordering
    pub fn new_unchecked(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Range covering a single day
    pub fn single(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    /// Check if a date falls within this range
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Number of calendar dates in the range, zero when inverted
    pub fn num_days(&self) -> i64 {
        ((self.end - self.start).num_days() + 1).max(0)
    }

    /// Trailing `days` dates of the range, or the whole range when shorter
    pub fn last_days(&self, days: u32) -> Self {
        if days == 0 || self.num_days() <= i64::from(days) {
            return *self;
        }
        match self.end.checked_sub_days(Days::new(u64::from(days) - 1)) {
            Some(start) => Self { start, end: self.end },
            None => *self,
        }
    }

    /// Iterate every calendar date from start to end
    pub fn iter_days(&self) -> DateIter {
        DateIter {
            next: Some(self.start),
            end: self.end,
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

/// Iterator over the calendar dates of a [`DateRange`]
#[derive(Debug, Clone)]
pub struct DateIter {
    next: Option<NaiveDate>,
    end: NaiveDate,
}

impl Iterator for DateIter {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.filter(|d| *d <= self.end)?;
        self.next = current.checked_add_days(Days::new(1));
        Some(current)
    }
}

/// Date window for store queries and cache keys
///
/// Mirrors the zero, one or two date boundaries a metric may be asked for:
/// no boundary is all-time, one boundary a single day, two a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DateSpan {
    /// Every event regardless of date
    AllTime,
    /// Events on one calendar date
    Day(NaiveDate),
    /// Events within an inclusive range
    Range(DateRange),
}

impl DateSpan {
    /// Build a span from optional boundaries
    ///
    /// An end without a start is rejected, as is an inverted range.
    pub fn from_bounds(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<Self> {
        match (start, end) {
            (None, None) => Ok(DateSpan::AllTime),
            (Some(day), None) => Ok(DateSpan::Day(day)),
            (Some(start), Some(end)) => Ok(DateSpan::Range(DateRange::new(start, end)?)),
            (None, Some(end)) => Err(Error::InvalidRange(format!(
                "end {} given without a start date",
                end
            ))),
        }
    }

    /// Check if a date falls within this span
    pub fn contains(&self, date: NaiveDate) -> bool {
        match self {
            DateSpan::AllTime => true,
            DateSpan::Day(day) => *day == date,
            DateSpan::Range(range) => range.contains(date),
        }
    }

    /// Bounding dates, if any
    pub fn bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        match self {
            DateSpan::AllTime => None,
            DateSpan::Day(day) => Some((*day, *day)),
            DateSpan::Range(range) => Some((range.start, range.end)),
        }
    }
}

impl From<DateRange> for DateSpan {
    fn from(range: DateRange) -> Self {
        DateSpan::Range(range)
    }
}

impl From<Option<DateRange>> for DateSpan {
    fn from(range: Option<DateRange>) -> Self {
        range.map_or(DateSpan::AllTime, DateSpan::Range)
    }
}

// =============================================================================
// Events
// =============================================================================

/// Raw impression as delivered by the ad server, before date derivation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpressionRecord {
    /// Event identifier, generated when absent
    #[serde(default)]
    pub id: Option<EventId>,
    /// Advertiser that paid for the impression
    pub advertiser_id: i64,
    /// Campaign the ad belongs to
    pub campaign_id: i64,
    /// Campaign name at display time
    #[serde(default)]
    pub campaign_name: String,
    /// Publisher property the ad was rendered on
    pub property_id: i64,
    /// Property name at display time
    #[serde(default)]
    pub property_name: String,
    /// When the ad was rendered
    pub displayed_at: DateTime<Utc>,
    /// When the ad was clicked, if ever
    #[serde(default)]
    pub clicked_at: Option<DateTime<Utc>>,
    /// Whether the impression counts toward billing
    #[serde(default)]
    pub payable: bool,
    /// Whether a fallback campaign was served
    #[serde(default)]
    pub fallback_campaign: bool,
}

/// Immutable impression event
///
/// `displayed_at_date` is always the calendar date of `displayed_at` in the
/// reference time zone, and `clicked_at`, when present, never precedes
/// `displayed_at`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    id: EventId,
    advertiser_id: i64,
    campaign_id: i64,
    campaign_name: String,
    property_id: i64,
    property_name: String,
    displayed_at: DateTime<Utc>,
    displayed_at_date: NaiveDate,
    clicked_at: Option<DateTime<Utc>>,
    payable: bool,
    fallback_campaign: bool,
}

impl Event {
    /// Build an event from a raw record, deriving its display date in `zone`
    pub fn from_record(record: ImpressionRecord, zone: FixedOffset) -> Result<Self> {
        if let Some(clicked_at) = record.clicked_at {
            if clicked_at < record.displayed_at {
                return Err(Error::InvalidEvent(format!(
                    "clicked_at {} precedes displayed_at {}",
                    clicked_at, record.displayed_at
                )));
            }
        }

        Ok(Self {
            id: record.id.unwrap_or_else(Uuid::new_v4),
            advertiser_id: record.advertiser_id,
            campaign_id: record.campaign_id,
            campaign_name: record.campaign_name,
            property_id: record.property_id,
            property_name: record.property_name,
            displayed_at: record.displayed_at,
            displayed_at_date: record.displayed_at.with_timezone(&zone).date_naive(),
            clicked_at: record.clicked_at,
            payable: record.payable,
            fallback_campaign: record.fallback_campaign,
        })
    }

    /// Event identifier
    pub fn id(&self) -> EventId {
        self.id
    }

    /// Identifier of the subject of the given kind
    pub fn subject_id(&self, kind: EntityKind) -> i64 {
        match kind {
            EntityKind::Advertiser => self.advertiser_id,
            EntityKind::Campaign => self.campaign_id,
            EntityKind::Property => self.property_id,
        }
    }

    /// Advertiser identifier
    pub fn advertiser_id(&self) -> i64 {
        self.advertiser_id
    }

    /// Campaign name at display time
    pub fn campaign_name(&self) -> &str {
        &self.campaign_name
    }

    /// Property name at display time
    pub fn property_name(&self) -> &str {
        &self.property_name
    }

    /// Display timestamp
    pub fn displayed_at(&self) -> DateTime<Utc> {
        self.displayed_at
    }

    /// Display date in the reference time zone
    pub fn displayed_at_date(&self) -> NaiveDate {
        self.displayed_at_date
    }

    /// Click timestamp, if clicked
    pub fn clicked_at(&self) -> Option<DateTime<Utc>> {
        self.clicked_at
    }

    /// Whether this impression was clicked
    pub fn is_clicked(&self) -> bool {
        self.clicked_at.is_some()
    }

    /// Whether the impression counts toward billing
    pub fn is_payable(&self) -> bool {
        self.payable
    }

    /// Whether a fallback campaign was served
    pub fn is_fallback_campaign(&self) -> bool {
        self.fallback_campaign
    }
}

/// Which side of the funnel a metric counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Activity {
    /// Every displayed impression
    Impressions,
    /// Only impressions with a click
    Clicks,
}

impl Activity {
    /// Whether store queries should be restricted to clicked events
    pub fn clicked_only(&self) -> bool {
        matches!(self, Activity::Clicks)
    }

    /// Human-readable series label
    pub fn label(&self) -> &'static str {
        match self {
            Activity::Impressions => "Impressions",
            Activity::Clicks => "Clicks",
        }
    }
}

// =============================================================================
// Results
// =============================================================================

/// Event count for one calendar date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCount {
    /// Calendar date
    pub date: NaiveDate,
    /// Events on that date
    pub count: u64,
}

impl DailyCount {
    /// Create a new daily count
    pub fn new(date: NaiveDate, count: u64) -> Self {
        Self { date, count }
    }
}

/// Click-through rate for one calendar date, as a percentage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyRate {
    /// Calendar date
    pub date: NaiveDate,
    /// Clicks per hundred impressions, 0 when nothing was displayed
    pub rate: f64,
}

/// One point of a sparkline series
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SparklinePoint {
    /// Series label, e.g. "Impressions"
    pub label: String,
    /// ISO-8601 calendar date
    pub date: String,
    /// Count for that date
    pub value: u64,
}

impl SparklinePoint {
    /// Create a point for a date
    pub fn new(activity: Activity, date: NaiveDate, value: u64) -> Self {
        Self {
            label: activity.label().to_string(),
            date: date.format("%F").to_string(),
            value,
        }
    }
}
