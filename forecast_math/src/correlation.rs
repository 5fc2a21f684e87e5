//! Autocorrelation and partial autocorrelation
//!
//! Both functions return `max_lag + 1` values, with lag 0 first.

use crate::descriptive::mean;
use crate::{MathError, Result};

/// Upper bound on the number of correlation lags reported
pub const MAX_LAG_CAP: usize = 20;

/// Deepest lag the sample supports: `min(20, floor((n - 1) / 2) - 1)`.
///
/// Saturates at zero for very short series.
pub fn max_lag(n: usize) -> usize {
    let supported = (n.saturating_sub(1) / 2).saturating_sub(1);
    supported.min(MAX_LAG_CAP)
}

/// Sample autocorrelation function using the biased (1/n) autocovariance
pub fn acf(data: &[f64], max_lag: usize) -> Result<Vec<f64>> {
    let n = data.len();
    if max_lag >= n {
        return Err(MathError::InsufficientData(format!(
            "Cannot compute {} autocorrelation lags from {} observations",
            max_lag, n
        )));
    }

    let m = mean(data)?;
    let centered: Vec<f64> = data.iter().map(|x| x - m).collect();

    let autocovariance = |lag: usize| -> f64 {
        centered[lag..]
            .iter()
            .zip(centered.iter())
            .map(|(a, b)| a * b)
            .sum::<f64>()
            / n as f64
    };

    let c0 = autocovariance(0);
    if c0.abs() < 1e-12 {
        return Err(MathError::CalculationError(
            "Series has zero variance, autocorrelation is undefined".to_string(),
        ));
    }

    Ok((0..=max_lag).map(|lag| autocovariance(lag) / c0).collect())
}

/// Partial autocorrelation function via the Durbin-Levinson recursion
pub fn pacf(data: &[f64], max_lag: usize) -> Result<Vec<f64>> {
    let rho = acf(data, max_lag)?;
    let (_, partial) = levinson_durbin(&rho, max_lag)?;

    let mut result = Vec::with_capacity(max_lag + 1);
    result.push(1.0);
    result.extend(partial);
    Ok(result)
}

/// Solve the Yule-Walker equations for an AR(`order`) model.
///
/// Returns the AR coefficients and the partial autocorrelations for lags
/// `1..=order`.
pub fn levinson_durbin(rho: &[f64], order: usize) -> Result<(Vec<f64>, Vec<f64>)> {
    if rho.len() <= order {
        return Err(MathError::InvalidInput(format!(
            "Need {} autocorrelations for order {}, got {}",
            order + 1,
            order,
            rho.len()
        )));
    }

    let mut phi = vec![0.0; order];
    let mut partial = Vec::with_capacity(order);
    let mut error = rho[0];

    for k in 0..order {
        let mut acc = rho[k + 1];
        for j in 0..k {
            acc -= phi[j] * rho[k - j];
        }

        if error.abs() < 1e-12 {
            return Err(MathError::CalculationError(
                "Prediction error vanished in Durbin-Levinson recursion".to_string(),
            ));
        }

        let reflection = acc / error;
        let previous = phi.clone();
        phi[k] = reflection;
        for j in 0..k {
            phi[j] = previous[j] - reflection * previous[k - 1 - j];
        }

        error *= 1.0 - reflection * reflection;
        partial.push(reflection);
    }

    Ok((phi, partial))
}
