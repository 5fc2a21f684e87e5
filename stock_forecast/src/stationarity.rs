//! Stationarity analysis of a monthly series
//!
//! The series is tested with an augmented Dickey-Fuller test. A series that
//! cannot reject the unit root is differenced once and tested again. The
//! resulting differencing order is what the model search uses for `d`.

use crate::error::{ForecastError, Result};
use forecast_math::{acf, adf_test, difference, has_zero_variance, max_lag, pacf, AdfTest};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fewest monthly observations a series (or its difference) may have
pub const MIN_OBSERVATIONS: usize = 12;
/// Largest ADF p-value at which a series counts as stationary
pub const STATIONARITY_P_VALUE: f64 = 0.05;
/// Highest differencing order the analysis will apply
pub const MAX_DIFFERENCING: usize = 1;

/// Result of one unit-root test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationarityReport {
    pub test_statistic: f64,
    pub p_value: f64,
    /// Critical values keyed by "1%", "5%" and "10%"
    pub critical_values: BTreeMap<String, f64>,
    pub used_lag: usize,
    pub n_obs: usize,
    pub is_stationary: bool,
}

impl From<AdfTest> for StationarityReport {
    fn from(test: AdfTest) -> Self {
        Self {
            test_statistic: test.statistic,
            p_value: test.p_value,
            is_stationary: test.p_value <= STATIONARITY_P_VALUE,
            critical_values: test.critical_values,
            used_lag: test.used_lag,
            n_obs: test.n_obs,
        }
    }
}

/// Everything the analyzer learned about a series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationarityAnalysis {
    /// Test on the series as given
    pub original: StationarityReport,
    /// Test on the first difference, when differencing was applied
    pub differenced: Option<StationarityReport>,
    /// `d` for the model search
    pub differencing_order: usize,
    /// Lag depth of `acf` and `pacf`
    pub max_lag: usize,
    /// Autocorrelations of `modeled`, lag 0 first
    pub acf: Vec<f64>,
    /// Partial autocorrelations of `modeled`, lag 0 first
    pub pacf: Vec<f64>,
    /// The series as given
    pub series: Vec<f64>,
    /// The series after `differencing_order` differences
    pub modeled: Vec<f64>,
}

impl StationarityAnalysis {
    /// Report for the series the model will be fitted to
    pub fn final_report(&self) -> &StationarityReport {
        self.differenced.as_ref().unwrap_or(&self.original)
    }
}

/// Run the unit-root test and classify the result
pub fn test_stationarity(series: &[f64]) -> Result<StationarityReport> {
    let test = adf_test(series, None).map_err(|e| {
        ForecastError::DegenerateSeries(format!(
            "Series is not analysable, unit-root regression failed: {}",
            e
        ))
    })?;
    debug!(
        "ADF statistic {:.4}, p-value {:.4}, lag {} over {} observations",
        test.statistic, test.p_value, test.used_lag, test.n_obs
    );
    Ok(test.into())
}

/// Analyze `series` and decide its differencing order
pub fn analyze(series: &[f64]) -> Result<StationarityAnalysis> {
    check_modelable(series, "series")?;
    if has_zero_variance(&difference(series, 1)) {
        return Err(ForecastError::DegenerateSeries(
            "The series changes by the same amount every month".to_string(),
        ));
    }
    let original = test_stationarity(series)?;

    let (differenced, modeled) = if original.is_stationary {
        (None, series.to_vec())
    } else {
        let diffed = difference(series, MAX_DIFFERENCING);
        check_modelable(&diffed, "differenced series")?;
        (Some(test_stationarity(&diffed)?), diffed)
    };
    let differencing_order = if differenced.is_some() { MAX_DIFFERENCING } else { 0 };

    let max_lag = max_lag(modeled.len());
    let correlation_error = |e: forecast_math::MathError| {
        ForecastError::DegenerateSeries(format!(
            "Series is not analysable, correlogram failed: {}",
            e
        ))
    };
    let acf = acf(&modeled, max_lag).map_err(correlation_error)?;
    let pacf = pacf(&modeled, max_lag).map_err(correlation_error)?;

    info!(
        "Stationarity: p-value {:.4} -> d = {} ({} observations modeled)",
        original.p_value,
        differencing_order,
        modeled.len()
    );

    Ok(StationarityAnalysis {
        original,
        differenced,
        differencing_order,
        max_lag,
        acf,
        pacf,
        series: series.to_vec(),
        modeled,
    })
}

fn check_modelable(series: &[f64], label: &str) -> Result<()> {
    if series.len() < MIN_OBSERVATIONS {
        return Err(ForecastError::SeriesTooShort(format!(
            "The {} has {} months, at least {} are needed",
            label,
            series.len(),
            MIN_OBSERVATIONS
        )));
    }
    if has_zero_variance(series) {
        return Err(ForecastError::DegenerateSeries(format!(
            "The {} is constant",
            label
        )));
    }
    Ok(())
}
