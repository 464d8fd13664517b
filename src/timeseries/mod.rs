//! Dense per-day series for charting

mod sparkline;
