//! Interval forecasts for the months after the history

use crate::config::{validate_confidence, validate_horizon, ForecastConfig};
use crate::data::Period;
use crate::error::{ForecastError, Result};
use crate::models::FittedModel;
use log::info;
use serde::{Deserialize, Serialize};

/// Forecast for one future month
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub period: Period,
    pub point_estimate: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

/// Demand cannot be negative
pub fn clamp_non_negative(value: f64) -> f64 {
    value.max(0.0)
}

/// Turns a fitted model into dated, clamped forecast points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Forecaster {
    horizon_months: usize,
    confidence_pct: u8,
}

impl Forecaster {
    pub fn new(horizon_months: usize, confidence_pct: u8) -> Result<Self> {
        validate_horizon(horizon_months)?;
        validate_confidence(confidence_pct)?;
        Ok(Self {
            horizon_months,
            confidence_pct,
        })
    }

    pub fn from_config(config: &ForecastConfig) -> Result<Self> {
        Self::new(config.horizon_months, config.confidence_pct)
    }

    pub fn horizon_months(&self) -> usize {
        self.horizon_months
    }

    pub fn confidence_pct(&self) -> u8 {
        self.confidence_pct
    }

    /// Forecast the `horizon_months` months following `last_period`
    pub fn forecast<F: FittedModel>(
        &self,
        model: &F,
        last_period: Period,
    ) -> Result<Vec<ForecastPoint>> {
        let result = model.forecast(self.horizon_months, self.confidence_pct)?;
        let unavailable = |reason: String| {
            ForecastError::ForecastUnavailable(format!("Model {}: {}", model.order(), reason))
        };

        if result.values().len() != self.horizon_months {
            return Err(unavailable(format!(
                "{} values for a {} month horizon",
                result.values().len(),
                self.horizon_months
            )));
        }
        let intervals = result
            .intervals()
            .filter(|i| i.len() == self.horizon_months)
            .ok_or_else(|| unavailable("no confidence interval".to_string()))?;

        let points = result
            .values()
            .iter()
            .zip(intervals)
            .enumerate()
            .map(|(h, (&value, &(lower, upper)))| {
                if !(value.is_finite() && lower.is_finite() && upper.is_finite()) {
                    return Err(unavailable(format!("non-finite forecast at step {}", h + 1)));
                }
                if lower > value || value > upper {
                    return Err(unavailable(format!(
                        "interval does not contain the point at step {}",
                        h + 1
                    )));
                }
                let period = last_period
                    .succ(h as u32 + 1)
                    .ok_or_else(|| unavailable(format!("month {} is out of range", h + 1)))?;
                Ok(ForecastPoint {
                    period,
                    point_estimate: clamp_non_negative(value),
                    lower_bound: clamp_non_negative(lower),
                    upper_bound: clamp_non_negative(upper),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        info!(
            "Forecast {} months from {} at {}% confidence",
            points.len(),
            last_period,
            self.confidence_pct
        );
        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp() {
        assert_eq!(clamp_non_negative(-3.5), 0.0);
        assert_eq!(clamp_non_negative(2.0), 2.0);
    }

    #[test]
    fn test_bounds_are_validated() {
        assert!(Forecaster::new(0, 95).is_err());
        assert!(Forecaster::new(25, 95).is_err());
        assert!(Forecaster::new(12, 79).is_err());
        assert!(Forecaster::new(12, 100).is_err());
        assert!(Forecaster::new(24, 99).is_ok());
    }
}
