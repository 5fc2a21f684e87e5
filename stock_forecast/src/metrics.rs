//! Accuracy of predicted against observed monthly demand

use crate::error::{ForecastError, Result};
use crate::models::FittedModel;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Error summary of a set of predictions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastAccuracy {
    pub mae: f64,
    pub mse: f64,
    pub rmse: f64,
    /// Percentage error, averaged over months with non-zero demand only
    pub mape: f64,
    /// Symmetric percentage error, zero for months where both sides are zero
    pub smape: f64,
}

/// Compare `predicted` with `observed`, month by month
pub fn forecast_accuracy(predicted: &[f64], observed: &[f64]) -> Result<ForecastAccuracy> {
    if predicted.is_empty() || predicted.len() != observed.len() {
        return Err(ForecastError::InvalidRequest(format!(
            "Cannot score {} predictions against {} observations",
            predicted.len(),
            observed.len()
        )));
    }

    let mut abs_sum = 0.0;
    let mut sq_sum = 0.0;
    let mut pct_sum = 0.0;
    let mut pct_months = 0usize;
    let mut sym_sum = 0.0;
    for (&p, &o) in predicted.iter().zip(observed) {
        let miss = (o - p).abs();
        abs_sum += miss;
        sq_sum += miss * miss;
        if o != 0.0 {
            pct_sum += 100.0 * miss / o.abs();
            pct_months += 1;
        }
        let scale = o.abs() + p.abs();
        if scale > 0.0 {
            sym_sum += 200.0 * miss / scale;
        }
    }

    let months = predicted.len() as f64;
    let mse = sq_sum / months;
    Ok(ForecastAccuracy {
        mae: abs_sum / months,
        mse,
        rmse: mse.sqrt(),
        mape: if pct_months == 0 {
            0.0
        } else {
            pct_sum / pct_months as f64
        },
        smape: sym_sum / months,
    })
}

/// Accuracy of a model's one-step predictions against the level history.
///
/// Fitted values cover the tail of `series` (differenced models lose the first
/// observations), so the comparison is aligned on the last months.
pub fn in_sample_accuracy<F: FittedModel>(model: &F, series: &[f64]) -> Result<ForecastAccuracy> {
    let fitted = model.fitted_values();
    let offset = series.len().checked_sub(fitted.len()).ok_or_else(|| {
        ForecastError::InvalidRequest(format!(
            "{} fitted values for {} observations",
            fitted.len(),
            series.len()
        ))
    })?;
    forecast_accuracy(fitted, &series[offset..])
}

impl fmt::Display for ForecastAccuracy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MAE {:.3}, RMSE {:.3}, MAPE {:.2}%, sMAPE {:.2}%",
            self.mae, self.rmse, self.mape, self.smape
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_accuracy_values() {
        let acc = forecast_accuracy(&[10.0, 12.0, 0.0], &[8.0, 12.0, 4.0]).unwrap();
        assert_approx_eq!(acc.mae, 2.0);
        assert_approx_eq!(acc.mse, 20.0 / 3.0);
        assert_approx_eq!(acc.rmse, (20.0f64 / 3.0).sqrt());
        // 25% and 0% and 100% over three non-zero months
        assert_approx_eq!(acc.mape, 125.0 / 3.0);
        assert_approx_eq!(acc.smape, (200.0 * 2.0 / 18.0 + 200.0) / 3.0);
    }

    #[test]
    fn test_zero_demand_months_are_skipped_for_mape() {
        let acc = forecast_accuracy(&[1.0, 0.0], &[0.0, 0.0]).unwrap();
        assert_eq!(acc.mape, 0.0);
        assert_approx_eq!(acc.smape, 100.0);
    }

    #[test]
    fn test_length_mismatch() {
        assert!(forecast_accuracy(&[1.0], &[1.0, 2.0]).is_err());
        assert!(forecast_accuracy(&[], &[]).is_err());
    }

    #[test]
    fn test_display() {
        let acc = forecast_accuracy(&[2.0], &[4.0]).unwrap();
        assert_eq!(acc.to_string(), "MAE 2.000, RMSE 2.000, MAPE 50.00%, sMAPE 66.67%");
    }
}
