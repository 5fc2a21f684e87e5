//! End-to-end forecast runs against a ledger
//!
//! A run fetches one product's events, aggregates them by month, decides the
//! differencing order, searches the order grid and forecasts the following
//! months. Stage errors stop the run; nothing is returned until every stage
//! has succeeded.

use crate::config::{validate_confidence, validate_horizon, validate_lookback, ForecastConfig};
use crate::data::{aggregate_monthly, MonthlyObservation, Product};
use crate::error::{ForecastError, Result};
use crate::forecaster::{ForecastPoint, Forecaster};
use crate::ledger::LedgerSource;
use crate::metrics::{in_sample_accuracy, ForecastAccuracy};
use crate::models::arima::ArimaModel;
use crate::models::{ForecastModel, ModelOrder};
use crate::selection::{ModelCandidate, ModelSelector};
use crate::stationarity::{analyze, StationarityAnalysis};
use chrono::{Local, Months, NaiveDate};
use log::info;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Parameters of a single forecast run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastRequest {
    pub product_id: i64,
    /// Years of history before `as_of`
    pub lookback_years: u32,
    pub horizon_months: usize,
    pub confidence_pct: u8,
    /// Date that anchors the lookback window
    pub as_of: NaiveDate,
}

impl ForecastRequest {
    /// Request with default parameters anchored on today
    pub fn new(product_id: i64) -> Self {
        Self::from_config(product_id, &ForecastConfig::default())
    }

    /// Request with the parameters of `config`, anchored on today
    pub fn from_config(product_id: i64, config: &ForecastConfig) -> Self {
        Self {
            product_id,
            lookback_years: config.lookback_years,
            horizon_months: config.horizon_months,
            confidence_pct: config.confidence_pct,
            as_of: Local::now().date_naive(),
        }
    }

    pub fn with_lookback_years(mut self, years: u32) -> Self {
        self.lookback_years = years;
        self
    }

    pub fn with_horizon(mut self, months: usize) -> Self {
        self.horizon_months = months;
        self
    }

    pub fn with_confidence(mut self, pct: u8) -> Self {
        self.confidence_pct = pct;
        self
    }

    pub fn as_of(mut self, date: NaiveDate) -> Self {
        self.as_of = date;
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_lookback(self.lookback_years)?;
        validate_horizon(self.horizon_months)?;
        validate_confidence(self.confidence_pct)
    }

    /// First date inside the lookback window
    pub fn window_start(&self) -> Result<NaiveDate> {
        self.lookback_years
            .checked_mul(12)
            .and_then(|months| self.as_of.checked_sub_months(Months::new(months)))
            .ok_or_else(|| {
                ForecastError::InvalidRequest(format!(
                    "A {} year lookback from {} is out of range",
                    self.lookback_years, self.as_of
                ))
            })
    }
}

/// Everything a presentation layer needs from a successful run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastReport {
    pub product: Product,
    pub monthly_history: Vec<MonthlyObservation>,
    pub stationarity: StationarityAnalysis,
    /// Every order tried, in grid order
    pub attempted_candidates: Vec<ModelCandidate>,
    pub selected_model_order: ModelOrder,
    /// In-sample accuracy of the selected model on the level history
    pub selected_accuracy: ForecastAccuracy,
    pub forecast_points: Vec<ForecastPoint>,
    pub confidence_pct: u8,
}

impl ForecastReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Candidates that fitted successfully
    pub fn fitted_candidates(&self) -> impl Iterator<Item = &ModelCandidate> {
        self.attempted_candidates.iter().filter(|c| c.fitted)
    }
}

impl fmt::Display for ForecastReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Demand forecast for {} (id {})", self.product.name, self.product.id)?;
        let history = &self.monthly_history;
        if let (Some(first), Some(last)) = (history.first(), history.last()) {
            writeln!(
                f,
                "  History:    {} to {} ({} months)",
                first.period,
                last.period,
                self.monthly_history.len()
            )?;
        }
        let report = self.stationarity.final_report();
        writeln!(
            f,
            "  ADF:        statistic {:.4}, p-value {:.4}, d = {}",
            report.test_statistic, report.p_value, self.stationarity.differencing_order
        )?;
        writeln!(
            f,
            "  Model:      ARIMA{} chosen from {} fitted of {} tried",
            self.selected_model_order,
            self.fitted_candidates().count(),
            self.attempted_candidates.len()
        )?;
        writeln!(
            f,
            "  In-sample:  MSE {:.4}, MAE {:.4}",
            self.selected_accuracy.mse, self.selected_accuracy.mae
        )?;
        writeln!(f, "  Month      Forecast    {}% interval", self.confidence_pct)?;
        for point in &self.forecast_points {
            writeln!(
                f,
                "  {}    {:>9.2}    [{:.2}, {:.2}]",
                point.period, point.point_estimate, point.lower_bound, point.upper_bound
            )?;
        }
        Ok(())
    }
}

/// A ledger, a model family and the settings to run them with
#[derive(Debug, Clone)]
pub struct ForecastPipeline<L, M> {
    ledger: L,
    model: M,
    config: ForecastConfig,
}

impl<L: LedgerSource> ForecastPipeline<L, ArimaModel> {
    /// ARIMA pipeline configured from `config`
    pub fn arima(ledger: L, config: ForecastConfig) -> Self {
        let model = ArimaModel::from_config(&config);
        Self::new(ledger, model, config)
    }
}

impl<L: LedgerSource, M: ForecastModel> ForecastPipeline<L, M> {
    pub fn new(ledger: L, model: M, config: ForecastConfig) -> Self {
        Self {
            ledger,
            model,
            config,
        }
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Request for `product_id` using this pipeline's defaults
    pub fn request(&self, product_id: i64) -> ForecastRequest {
        ForecastRequest::from_config(product_id, &self.config)
    }

    pub fn run(&self, request: &ForecastRequest) -> Result<ForecastReport> {
        self.config.validate()?;
        request.validate()?;
        let forecaster = Forecaster::new(request.horizon_months, request.confidence_pct)?;

        let product = self
            .ledger
            .fetch_product_catalog()?
            .into_iter()
            .find(|p| p.id == request.product_id)
            .ok_or(ForecastError::UnknownProduct(request.product_id))?;

        let since = request.window_start()?;
        let events: Vec<_> = self
            .ledger
            .fetch_events(product.id, since)?
            .into_iter()
            .filter(|e| e.timestamp.date() <= request.as_of)
            .collect();
        info!(
            "Fetched {} events for '{}' between {} and {}",
            events.len(),
            product.name,
            since,
            request.as_of
        );

        let history = aggregate_monthly(&events)?;
        info!(
            "Aggregated {} months from {} to {}",
            history.len(),
            history.first_period(),
            history.last_period()
        );

        let stationarity = analyze(&history.values())?;

        let selection = ModelSelector::from_config(&self.model, &self.config)
            .select(&stationarity.series, stationarity.differencing_order)?;
        let selected = selection.selected;

        let forecast_points = forecaster.forecast(&selected.model, history.last_period())?;
        let selected_accuracy = in_sample_accuracy(&selected.model, &stationarity.series)?;

        Ok(ForecastReport {
            product,
            monthly_history: history.into_observations(),
            stationarity,
            attempted_candidates: selection.candidates,
            selected_model_order: selected.candidate.order,
            selected_accuracy,
            forecast_points,
            confidence_pct: request.confidence_pct,
        })
    }
}

/// Forecast one product with the ARIMA pipeline, looking back from today
pub fn run_forecast<L: LedgerSource>(
    ledger: L,
    product_id: i64,
    lookback_years: u32,
    horizon_months: usize,
    confidence_pct: u8,
) -> Result<ForecastReport> {
    let request = ForecastRequest::new(product_id)
        .with_lookback_years(lookback_years)
        .with_horizon(horizon_months)
        .with_confidence(confidence_pct);
    ForecastPipeline::arima(ledger, ForecastConfig::default()).run(&request)
}
