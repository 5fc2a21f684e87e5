//! Augmented Dickey-Fuller unit-root test (constant, no trend)
//!
//! The regression is
//! `dy_t = alpha + gamma * y_{t-1} + sum_i beta_i * dy_{t-i} + e_t`
//! and the test statistic is the t value of `gamma`. The lag depth is
//! picked by minimum AIC on a common sample, then the regression is re-run
//! on every usable observation. p-values use MacKinnon's (1994) response
//! surface, critical values MacKinnon (2010).

use crate::descriptive::difference;
use crate::regression::{ols, OlsFit};
use crate::{MathError, Result};
use serde::{Deserialize, Serialize};
use statrs::function::erf::erfc;
use std::collections::BTreeMap;

/// Outcome of an augmented Dickey-Fuller test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdfTest {
    /// t statistic of the lagged level coefficient
    pub statistic: f64,
    /// Approximate p-value under the unit-root null
    pub p_value: f64,
    /// Number of lagged differences in the final regression
    pub used_lag: usize,
    /// Observations used in the final regression
    pub n_obs: usize,
    /// Critical values keyed by "1%", "5%" and "10%"
    pub critical_values: BTreeMap<String, f64>,
    /// Best information criterion found during lag selection
    pub ic_best: f64,
}

// Response surface for one variable with a constant term.
const TAU_MAX: f64 = 2.74;
const TAU_MIN: f64 = -18.83;
const TAU_STAR: f64 = -1.61;
const TAU_SMALL_P: [f64; 3] = [2.1659, 1.4412, 0.038269];
const TAU_LARGE_P: [f64; 4] = [1.7339, 0.93202, -0.12745, -0.010368];

const CRITICAL_SURFACE: [(&str, [f64; 4]); 3] = [
    ("1%", [-3.43035, -6.5393, -16.786, -79.433]),
    ("5%", [-2.86154, -2.8903, -4.234, -40.040]),
    ("10%", [-2.56677, -1.5384, -2.809, 0.0]),
];

/// Schwert's rule `ceil(12 * (n / 100)^(1/4))`, bounded by `n / 2 - 2`
pub fn default_max_lag(nobs: usize) -> Option<usize> {
    let schwert = (12.0 * (nobs as f64 / 100.0).powf(0.25)).ceil() as usize;
    let bound = (nobs / 2).checked_sub(2)?;
    Some(schwert.min(bound))
}

/// Run the test on `series`; `max_lag = None` applies [`default_max_lag`]
pub fn adf_test(series: &[f64], max_lag: Option<usize>) -> Result<AdfTest> {
    let max_lag = match max_lag {
        Some(lag) => lag,
        None => default_max_lag(series.len()).ok_or_else(|| {
            MathError::InsufficientData(format!(
                "{} observations are too few for a unit-root test",
                series.len()
            ))
        })?,
    };

    let diffs = difference(series, 1);
    if diffs.len() <= 2 * max_lag + 2 {
        return Err(MathError::InsufficientData(format!(
            "{} differences cannot support {} lags",
            diffs.len(),
            max_lag
        )));
    }

    let mut best: Option<(f64, usize)> = None;
    for lag in 0..=max_lag {
        let fit = match regress(series, &diffs, lag, max_lag) {
            Ok(fit) => fit,
            Err(_) => continue,
        };
        let aic = fit.aic();
        if aic.is_nan() {
            continue;
        }
        if best.map_or(true, |(best_aic, _)| aic < best_aic) {
            best = Some((aic, lag));
        }
    }

    let (ic_best, used_lag) = best.ok_or_else(|| {
        MathError::CalculationError("No lag depth produced a usable regression".to_string())
    })?;

    let fit = regress(series, &diffs, used_lag, used_lag)?;
    let statistic = fit
        .t_value(0)
        .filter(|t| t.is_finite())
        .ok_or_else(|| {
            MathError::CalculationError(
                "Unit-root regression has no residual variation".to_string(),
            )
        })?;

    Ok(AdfTest {
        statistic,
        p_value: mackinnon_p_value(statistic),
        used_lag,
        n_obs: fit.nobs,
        critical_values: mackinnon_critical_values(fit.nobs),
        ic_best,
    })
}

/// Regression with `lag` lagged differences over rows `start..diffs.len()`.
///
/// Column 0 holds the lagged level, column 1 the constant.
fn regress(series: &[f64], diffs: &[f64], lag: usize, start: usize) -> Result<OlsFit> {
    let rows: Vec<Vec<f64>> = (start..diffs.len())
        .map(|t| {
            let mut row = Vec::with_capacity(lag + 2);
            row.push(series[t]);
            row.push(1.0);
            row.extend((1..=lag).map(|i| diffs[t - i]));
            row
        })
        .collect();

    ols(&rows, &diffs[start..])
}

/// MacKinnon (1994) approximate p-value for the constant-only statistic
pub fn mackinnon_p_value(statistic: f64) -> f64 {
    if statistic > TAU_MAX {
        return 1.0;
    }
    if statistic < TAU_MIN {
        return 0.0;
    }

    let z = if statistic <= TAU_STAR {
        polyval(&TAU_SMALL_P, statistic)
    } else {
        polyval(&TAU_LARGE_P, statistic)
    };
    standard_normal_cdf(z)
}

/// MacKinnon (2010) finite-sample critical values for `nobs` observations
pub fn mackinnon_critical_values(nobs: usize) -> BTreeMap<String, f64> {
    let inv = 1.0 / nobs.max(1) as f64;
    CRITICAL_SURFACE
        .iter()
        .map(|(label, coeffs)| (label.to_string(), polyval(coeffs, inv)))
        .collect()
}

/// Evaluate `c[0] + c[1] x + c[2] x^2 + ...`
fn polyval(coeffs: &[f64], x: f64) -> f64 {
    coeffs.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

fn standard_normal_cdf(z: f64) -> f64 {
    0.5 * erfc(-z / std::f64::consts::SQRT_2)
}
