//! Pipeline configuration
//!
//! Every field has a default, so a JSON document only needs the keys it
//! overrides:
//!
//! ```json
//! { "horizon_months": 6, "q_range": { "min": 0, "max": 1 } }
//! ```

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Longest forecast horizon accepted, in months
pub const MAX_HORIZON_MONTHS: usize = 24;
/// Narrowest two-sided interval accepted, in percent
pub const MIN_CONFIDENCE_PCT: u8 = 80;
/// Widest two-sided interval accepted, in percent
pub const MAX_CONFIDENCE_PCT: u8 = 99;

/// Inclusive range of candidate orders for one ARMA component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRange {
    pub min: usize,
    pub max: usize,
}

impl OrderRange {
    pub fn new(min: usize, max: usize) -> Result<Self> {
        let range = Self { min, max };
        range.validate("order range")?;
        Ok(range)
    }

    /// Orders in ascending order
    pub fn iter(&self) -> impl Iterator<Item = usize> {
        self.min..=self.max
    }

    pub fn len(&self) -> usize {
        if self.max < self.min {
            0
        } else {
            self.max - self.min + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn validate(&self, label: &str) -> Result<()> {
        if self.min > self.max {
            return Err(ForecastError::InvalidRequest(format!(
                "{} is empty: min {} exceeds max {}",
                label, self.min, self.max
            )));
        }
        Ok(())
    }
}

impl Default for OrderRange {
    fn default() -> Self {
        Self { min: 0, max: 2 }
    }
}

/// Which side of the ledger counts as demand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionFlow {
    /// Stock leaving the warehouse
    #[default]
    Outgoing,
    /// Stock arriving at the warehouse
    Incoming,
}

/// Settings shared by every forecast run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Years of history pulled from the ledger
    pub lookback_years: u32,
    /// Months to forecast
    pub horizon_months: usize,
    /// Two-sided interval width in percent
    pub confidence_pct: u8,
    /// Candidate AR orders
    pub p_range: OrderRange,
    /// Candidate MA orders
    pub q_range: OrderRange,
    /// Fit candidates on the rayon pool
    pub parallel_search: bool,
    /// Optimiser iteration budget per candidate
    pub max_iterations: usize,
    /// Optimiser convergence tolerance
    pub tolerance: f64,
    /// Ledger side that is forecast
    pub flow: TransactionFlow,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            lookback_years: 3,
            horizon_months: 12,
            confidence_pct: 95,
            p_range: OrderRange::default(),
            q_range: OrderRange::default(),
            parallel_search: true,
            max_iterations: 1000,
            tolerance: 1e-8,
            flow: TransactionFlow::Outgoing,
        }
    }
}

impl ForecastConfig {
    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ForecastError::Config(format!("Malformed configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            ForecastError::Config(format!("Cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        validate_lookback(self.lookback_years)?;
        validate_horizon(self.horizon_months)?;
        validate_confidence(self.confidence_pct)?;
        self.p_range.validate("p_range")?;
        self.q_range.validate("q_range")?;
        if self.max_iterations == 0 {
            return Err(ForecastError::InvalidRequest(
                "max_iterations must be positive".to_string(),
            ));
        }
        if self.tolerance.is_nan() || self.tolerance <= 0.0 {
            return Err(ForecastError::InvalidRequest(format!(
                "tolerance must be positive, got {}",
                self.tolerance
            )));
        }
        Ok(())
    }
}

pub fn validate_lookback(lookback_years: u32) -> Result<()> {
    if lookback_years == 0 {
        return Err(ForecastError::InvalidRequest(
            "lookback_years must be at least 1".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_horizon(horizon_months: usize) -> Result<()> {
    if horizon_months == 0 || horizon_months > MAX_HORIZON_MONTHS {
        return Err(ForecastError::InvalidRequest(format!(
            "horizon_months must be in 1..={}, got {}",
            MAX_HORIZON_MONTHS, horizon_months
        )));
    }
    Ok(())
}

pub fn validate_confidence(confidence_pct: u8) -> Result<()> {
    if !(MIN_CONFIDENCE_PCT..=MAX_CONFIDENCE_PCT).contains(&confidence_pct) {
        return Err(ForecastError::InvalidRequest(format!(
            "confidence_pct must be in {}..={}, got {}",
            MIN_CONFIDENCE_PCT, MAX_CONFIDENCE_PCT, confidence_pct
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_range_len() {
        assert_eq!(OrderRange::default().len(), 3);
        assert_eq!(OrderRange::default().iter().collect::<Vec<_>>(), vec![0, 1, 2]);
        assert!(OrderRange::new(3, 1).is_err());
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(ForecastConfig::default().validate().is_ok());
    }
}
