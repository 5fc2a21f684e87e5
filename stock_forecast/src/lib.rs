//! # Stock Forecast
//!
//! Monthly demand forecasting for an inventory ledger.
//!
//! ## Features
//!
//! - Ledger sources (in memory, SQLite, CSV) behind the `LedgerSource` trait
//! - Aggregation of irregular transactions into a gap-free monthly series
//! - Augmented Dickey-Fuller stationarity analysis that picks the differencing order
//! - ARIMA grid search scored by in-sample MSE, optionally in parallel
//! - Interval forecasts clamped to non-negative demand
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use stock_forecast::ledger::SqliteLedger;
//! use stock_forecast::{run_forecast, TransactionFlow};
//!
//! let ledger = SqliteLedger::open("inventory.db", TransactionFlow::Outgoing)?;
//!
//! // Three years of history, twelve months ahead, 95% intervals
//! let report = run_forecast(&ledger, 1, 3, 12, 95)?;
//! println!("{}", report);
//! # Ok::<(), stock_forecast::ForecastError>(())
//! ```
//!
//! For control over the model search, build a [`ForecastPipeline`] from a
//! [`ForecastConfig`] and run it with an explicit [`ForecastRequest`].

pub mod config;
pub mod data;
pub mod error;
pub mod forecaster;
pub mod ledger;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod selection;
pub mod stationarity;
pub mod synthetic;

// Re-export commonly used types
pub use crate::config::{ForecastConfig, OrderRange, TransactionFlow};
pub use crate::data::{aggregate_monthly, Event, MonthlyObservation, MonthlySeries, Period, Product};
pub use crate::error::{ErrorKind, ForecastError};
pub use crate::forecaster::{ForecastPoint, Forecaster};
pub use crate::ledger::{InMemoryLedger, LedgerSource};
pub use crate::models::arima::{ArimaModel, FittedArima};
pub use crate::models::{
    FitFailure, FitResult, FittedModel, ForecastModel, ForecastResult, ModelOrder,
};
pub use crate::pipeline::{run_forecast, ForecastPipeline, ForecastReport, ForecastRequest};
pub use crate::selection::{ModelCandidate, ModelSelector, SelectedModel, Selection};
pub use crate::stationarity::{analyze, StationarityAnalysis, StationarityReport};

/// Error type surfaced by the forecasting core
pub type CoreError = ForecastError;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
