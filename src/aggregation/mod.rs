//! Impression and click aggregation
//!
//! Every operation here is expressed as event store queries wrapped in a
//! cache fetch keyed on the entity version, the metric and its dates:
//!
//! - **Counts** (`counts.rs`): totals, single-day counts and per-date groups
//!   for impressions and clicks, plus per-mille helpers
//! - **Rates** (`rates.rs`): click-through rates that are 0 whenever nothing
//!   was displayed
//! - **Dates** (`dates.rs`): the cheap min..max probable-date scan and the
//!   exact distinct-date scan
//!
//! # Example
//!
//! ```rust,ignore
//! let engine = AnalyticsEngine::builder().with_store(store).build()?;
//! let range = DateRange::new(start, end)?;
//!
//! let impressions = engine.total_impressions_count(&advertiser, Some(range)).await?;
//! let ctr = engine.total_click_rate(&advertiser, Some(range)).await?;
//! ```

mod counts;
mod dates;
mod rates;

pub use rates::{click_rate, per_mille};
