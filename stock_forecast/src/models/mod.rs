//! Forecasting models for monthly demand series

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use std::fmt::{self, Debug};
use thiserror::Error;

pub mod arima;

/// ARIMA order `(p, d, q)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModelOrder {
    /// Autoregressive order
    pub p: usize,
    /// Differencing order
    pub d: usize,
    /// Moving-average order
    pub q: usize,
}

impl ModelOrder {
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self { p, d, q }
    }
}

impl fmt::Display for ModelOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.p, self.d, self.q)
    }
}

/// Why a candidate order could not be fitted
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitFailure {
    #[error("order {order} is not supported: {reason}")]
    UnsupportedOrder { order: ModelOrder, reason: String },

    #[error("{available} observations are too few for order {order}, {needed} needed")]
    TooFewObservations {
        order: ModelOrder,
        needed: usize,
        available: usize,
    },

    #[error("optimiser did not converge after {iterations} iterations")]
    NotConverged { iterations: usize },

    #[error("AR coefficients {0:?} are not stationary")]
    NonStationary(Vec<f64>),

    #[error("MA coefficients {0:?} are not invertible")]
    NonInvertible(Vec<f64>),

    #[error("residual variance {0} is not usable")]
    DegenerateResiduals(f64),

    #[error("numerical failure: {0}")]
    Numerical(String),
}

/// Outcome of fitting one candidate order
pub type FitResult<F> = std::result::Result<F, FitFailure>;

/// Point forecasts for the next `horizons` months, with optional intervals
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastResult {
    values: Vec<f64>,
    horizons: usize,
    /// Confidence intervals as `(lower, upper)`
    intervals: Option<Vec<(f64, f64)>>,
    /// Standard error of each forecast
    std_errors: Option<Vec<f64>>,
}

impl ForecastResult {
    /// Point forecasts only; `values` must hold exactly `horizons` entries
    pub fn new(values: Vec<f64>, horizons: usize) -> Result<Self> {
        check_length("Values", values.len(), horizons)?;
        Ok(Self {
            values,
            horizons,
            intervals: None,
            std_errors: None,
        })
    }

    /// Point forecasts with one interval and standard error per month
    pub fn new_with_intervals(
        values: Vec<f64>,
        horizons: usize,
        intervals: Vec<(f64, f64)>,
        std_errors: Vec<f64>,
    ) -> Result<Self> {
        check_length("Values", values.len(), horizons)?;
        check_length("Intervals", intervals.len(), horizons)?;
        check_length("Standard errors", std_errors.len(), horizons)?;

        Ok(Self {
            values,
            horizons,
            intervals: Some(intervals),
            std_errors: Some(std_errors),
        })
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn horizons(&self) -> usize {
        self.horizons
    }

    /// `(lower, upper)` per month, when the model produced them
    pub fn intervals(&self) -> Option<&[(f64, f64)]> {
        self.intervals.as_deref()
    }

    pub fn std_errors(&self) -> Option<&[f64]> {
        self.std_errors.as_deref()
    }

    /// True when every value and bound is finite
    pub fn is_finite(&self) -> bool {
        self.values.iter().all(|v| v.is_finite())
            && self
                .intervals
                .iter()
                .flatten()
                .all(|(lo, hi)| lo.is_finite() && hi.is_finite())
    }
}

fn check_length(label: &str, len: usize, horizons: usize) -> Result<()> {
    if len != horizons {
        return Err(ForecastError::ForecastUnavailable(format!(
            "{} length ({}) doesn't match horizons ({})",
            label, len, horizons
        )));
    }
    Ok(())
}

/// Two-sided standard normal critical value for `confidence_pct` percent
pub fn z_score(confidence_pct: u8) -> Result<f64> {
    if confidence_pct == 0 || confidence_pct >= 100 {
        return Err(ForecastError::InvalidRequest(format!(
            "Confidence must be strictly between 0 and 100 percent, got {}",
            confidence_pct
        )));
    }
    let alpha = 1.0 - f64::from(confidence_pct) / 100.0;
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| ForecastError::ForecastUnavailable(format!("Normal distribution: {}", e)))?;
    Ok(normal.inverse_cdf(1.0 - alpha / 2.0))
}

/// A model fitted to one series at one order
pub trait FittedModel: Debug {
    /// Order the model was fitted at
    fn order(&self) -> ModelOrder;

    /// Mean squared one-step error over the fitted sample
    fn in_sample_error(&self) -> f64;

    /// Akaike information criterion
    fn info_criterion(&self) -> f64;

    /// One-step in-sample predictions on the level scale
    fn fitted_values(&self) -> &[f64];

    /// Innovation variance estimate
    fn residual_variance(&self) -> f64;

    /// Forecast `horizon` steps past the sample with a two-sided interval
    fn forecast(&self, horizon: usize, confidence_pct: u8) -> Result<ForecastResult>;
}

/// Model family that can be fitted at a given order
pub trait ForecastModel: Debug + Sync {
    /// The type of fitted model produced
    type Fitted: FittedModel + Send;

    /// Fit to a level series at `order`
    fn fit(&self, series: &[f64], order: ModelOrder) -> FitResult<Self::Fitted>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_display() {
        assert_eq!(ModelOrder::new(2, 1, 0).to_string(), "(2,1,0)");
    }

    #[test]
    fn test_z_score() {
        assert!((z_score(95).unwrap() - 1.959964).abs() < 1e-4);
        assert!((z_score(80).unwrap() - 1.281552).abs() < 1e-4);
        assert!(z_score(100).is_err());
    }

    #[test]
    fn test_forecast_result_length_checks() {
        assert!(ForecastResult::new(vec![1.0, 2.0], 3).is_err());
        let err = ForecastResult::new_with_intervals(vec![1.0], 1, vec![], vec![0.5]).unwrap_err();
        assert!(matches!(err, ForecastError::ForecastUnavailable(_)));
    }
}
