//! Impression Analytics Report
//!
//! Loads impression events from a JSON file into the in-memory store and
//! prints a metrics report for one entity as JSON on stdout.
//!
//! # Configuration
//!
//! Configuration is loaded from (in order):
//! 1. `ANALYTICS_CONFIG` environment variable (path to TOML file)
//! 2. `./analytics.toml` in current directory
//! 3. Default configuration
//!
//! # Example
//!
//! ```bash
//! analytics_report --events impressions.json --kind advertiser --id 15 \
//!     --start 2024-01-01 --end 2024-01-31
//!
//! # Append Prometheus counters to stderr
//! RUST_LOG=debug analytics_report --events impressions.json --id 15 --prometheus
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use clap::Parser;
use serde_json::json;
use tracing::info;

use impression_analytics::{
    load_config, DateRange, DateSpan, EntityKind, EntityRef, ImpressionRecord, PrometheusExporter,
};

#[derive(Parser, Debug)]
#[command(
    name = "analytics_report",
    version,
    about = "Impression and click metrics for one advertiser, campaign or property"
)]
struct Args {
    /// JSON file holding an array of impression records
    #[arg(long, env = "ANALYTICS_EVENTS")]
    events: PathBuf,

    /// Entity kind: advertiser, campaign or property
    #[arg(long, default_value = "advertiser")]
    kind: EntityKind,

    /// Entity identifier
    #[arg(long)]
    id: i64,

    /// First date of the report (YYYY-MM-DD)
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Last date of the report (YYYY-MM-DD), defaults to the start date
    #[arg(long, requires = "start")]
    end: Option<NaiveDate>,

    /// Print Prometheus counters to stderr after the report
    #[arg(long)]
    prometheus: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // stdout carries the report
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("impression_analytics=info".parse()?)
                .add_directive("analytics_report=info".parse()?),
        )
        .init();

    let args = Args::parse();
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = load_config();
    let store = config.build_store()?;

    let content = std::fs::read_to_string(&args.events)?;
    let records: Vec<ImpressionRecord> = serde_json::from_str(&content)?;
    let loaded = store.record_all(records)?;
    info!(
        events = loaded,
        partitions = store.partition_names().len(),
        path = %args.events.display(),
        "Loaded impression events"
    );

    let store = Arc::new(store);
    let engine = config.build_engine(store)?;
    let entity = EntityRef::new(args.kind, args.id, Utc::now());

    let range = match DateSpan::from_bounds(args.start, args.end)? {
        DateSpan::AllTime => {
            let dates = engine.probable_dates_with_events(&entity, DateSpan::AllTime).await?;
            match (dates.first(), dates.last()) {
                // keep the per-day sections within the engine's range limit
                (Some(first), Some(last)) => Some(
                    DateRange::new(*first, *last)?.last_days(engine.config().max_range_days),
                ),
                _ => None,
            }
        }
        DateSpan::Day(day) => Some(DateRange::single(day)),
        DateSpan::Range(range) => Some(range),
    };

    let mut report = json!({
        "entity": { "kind": args.kind, "id": args.id },
        "all_time": {
            "impressions": engine.total_impressions_count(&entity, None).await?,
            "clicks": engine.total_clicks_count(&entity, None).await?,
            "click_rate": engine.total_click_rate(&entity, None).await?,
            "impressions_per_mille": engine.total_impressions_per_mille(&entity).await?,
            "dates_with_impressions": engine
                .dates_with_impressions(&entity, DateSpan::AllTime)
                .await?
                .len(),
        },
    });

    if let Some(range) = range {
        report["range"] = json!({
            "start": range.start,
            "end": range.end,
            "impressions": engine.total_impressions_count(&entity, Some(range)).await?,
            "clicks": engine.total_clicks_count(&entity, Some(range)).await?,
            "click_rate": engine.total_click_rate(&entity, Some(range)).await?,
            "daily_click_rates": engine.daily_click_rates(&entity, range).await?,
            "impression_sparkline": engine.impression_sparkline(&entity, range).await?,
            "click_sparkline": engine.click_sparkline(&entity, range).await?,
        });
    }

    report["metrics"] = serde_json::to_value(engine.metrics().snapshot())?;

    println!("{}", serde_json::to_string_pretty(&report)?);

    if args.prometheus {
        let exporter =
            PrometheusExporter::new(config.prometheus_config(), engine.metrics().clone());
        eprint!("{}", exporter.export(None));
    }

    Ok(())
}
