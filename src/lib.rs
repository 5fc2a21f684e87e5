//! # Stock Forecast Workspace
//!
//! Umbrella crate over the forecasting workspace. It re-exports the two
//! member crates and adds a one-call entry point for SQLite inventories.
//!
//! ## Example
//!
//! ```
//! use stock_forecast_workspace::demo_ledger;
//!
//! let ledger = demo_ledger(1, "Hex bolts", 2024, 12, 36).unwrap();
//! assert_eq!(ledger.len(), 72);
//! ```

use std::path::Path;

pub use forecast_math;
pub use stock_forecast;

pub use stock_forecast::{
    run_forecast, CoreError, ForecastConfig, ForecastPipeline, ForecastReport, ForecastRequest,
    InMemoryLedger, LedgerSource, Period, Product, TransactionFlow,
};

use stock_forecast::ledger::SqliteLedger;
use stock_forecast::synthetic::SyntheticDemand;

/// Forecasts one product from a SQLite inventory file.
///
/// The configuration decides which transaction table is read as well as
/// the horizon, confidence level and order ranges.
pub fn forecast_database<P: AsRef<Path>>(
    path: P,
    product_id: i64,
    config: ForecastConfig,
) -> Result<ForecastReport, CoreError> {
    let ledger = SqliteLedger::open(path, config.flow)?;
    let request = ForecastRequest::from_config(product_id, &config);
    ForecastPipeline::arima(ledger, config).run(&request)
}

/// Builds an in-memory ledger with `months` of seasonal demand ending at
/// `year`-`month`.
///
/// # Examples
///
/// ```
/// use stock_forecast_workspace::{demo_ledger, LedgerSource};
///
/// let ledger = demo_ledger(7, "Paint", 2023, 6, 24).unwrap();
/// let catalog = ledger.fetch_product_catalog().unwrap();
/// assert_eq!(catalog[0].name, "Paint");
/// ```
pub fn demo_ledger(
    product_id: i64,
    name: &str,
    year: i32,
    month: u32,
    months: usize,
) -> Result<InMemoryLedger, CoreError> {
    let last = Period::from_ymd(year, month).ok_or_else(|| {
        CoreError::InvalidRequest(format!("{}-{} is not a calendar month", year, month))
    })?;
    SyntheticDemand::new(120.0)
        .with_seasonality(30.0)
        .with_noise(8.0)
        .ledger(Product::new(product_id, name), last, months)
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use stock_forecast::error::ErrorKind;

    #[test]
    fn test_demo_ledger_covers_requested_months() {
        let ledger = demo_ledger(3, "Washers", 2024, 12, 36).unwrap();
        let since = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
        let events = ledger.fetch_events(3, since).unwrap();

        assert_eq!(events.first().unwrap().timestamp.date().to_string(), "2022-01-05");
        assert_eq!(events.last().unwrap().timestamp.date().to_string(), "2024-12-20");
    }

    #[test]
    fn test_demo_ledger_rejects_bad_month() {
        let err = demo_ledger(3, "Washers", 2024, 13, 36).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
    }

    #[test]
    fn test_forecast_database_reads_configured_flow() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stock.db");
        let ledger = SqliteLedger::open(&path, TransactionFlow::Incoming).unwrap();
        ledger.create_schema().unwrap();
        let id = ledger.insert_product("Rivets", 0, "box").unwrap();
        let this_month = Period::from_date(chrono::Local::now().date_naive());
        let events = SyntheticDemand::new(90.0)
            .with_noise(10.0)
            .events_ending(id, this_month, 24)
            .unwrap();
        for event in events {
            ledger
                .record_transaction(TransactionFlow::Incoming, id, event.quantity, event.timestamp)
                .unwrap();
        }

        let config = ForecastConfig {
            flow: TransactionFlow::Incoming,
            horizon_months: 3,
            ..ForecastConfig::default()
        };
        let report = forecast_database(&path, id, config).unwrap();
        assert_eq!(report.forecast_points.len(), 3);

        let outgoing = forecast_database(&path, id, ForecastConfig::default()).unwrap_err();
        assert_eq!(outgoing.kind(), ErrorKind::InsufficientData);
    }
}
