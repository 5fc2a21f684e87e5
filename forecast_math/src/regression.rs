//! Ordinary least squares

use crate::{MathError, Result};
use nalgebra::{DMatrix, DVector};

/// Result of an ordinary least squares fit
#[derive(Debug, Clone)]
pub struct OlsFit {
    /// Estimated coefficients, one per regressor column
    pub coefficients: Vec<f64>,
    /// Standard errors of the coefficients
    pub std_errors: Vec<f64>,
    /// Residuals `y - X·beta`
    pub residuals: Vec<f64>,
    /// Residual sum of squares
    pub ssr: f64,
    /// Number of observations
    pub nobs: usize,
}

impl OlsFit {
    /// Number of estimated coefficients
    pub fn n_params(&self) -> usize {
        self.coefficients.len()
    }

    /// t statistic of coefficient `index`
    pub fn t_value(&self, index: usize) -> Option<f64> {
        let coef = self.coefficients.get(index)?;
        let se = self.std_errors.get(index)?;
        Some(coef / se)
    }

    /// Gaussian log-likelihood with the variance concentrated out
    pub fn log_likelihood(&self) -> f64 {
        let n = self.nobs as f64;
        -0.5 * n * ((2.0 * std::f64::consts::PI).ln() + (self.ssr / n).ln() + 1.0)
    }

    /// Akaike information criterion
    pub fn aic(&self) -> f64 {
        -2.0 * self.log_likelihood() + 2.0 * self.n_params() as f64
    }
}

/// Fit `response` on the given regressor rows (one row per observation).
pub fn ols(rows: &[Vec<f64>], response: &[f64]) -> Result<OlsFit> {
    let n = rows.len();
    if n != response.len() {
        return Err(MathError::InvalidInput(format!(
            "Regressor rows ({}) don't match response length ({})",
            n,
            response.len()
        )));
    }

    let k = rows.first().map(|r| r.len()).unwrap_or(0);
    if k == 0 {
        return Err(MathError::InvalidInput(
            "Regression needs at least one regressor".to_string(),
        ));
    }
    if rows.iter().any(|r| r.len() != k) {
        return Err(MathError::InvalidInput(
            "Regressor rows have inconsistent widths".to_string(),
        ));
    }
    if n <= k {
        return Err(MathError::InsufficientData(format!(
            "{} observations cannot identify {} coefficients",
            n, k
        )));
    }

    let x = DMatrix::from_fn(n, k, |i, j| rows[i][j]);
    let y = DVector::from_column_slice(response);

    let xt = x.transpose();
    let xtx = &xt * &x;
    let xtx_inv = xtx
        .try_inverse()
        .ok_or_else(|| MathError::SingularMatrix("X'X is not invertible".to_string()))?;

    let beta = &xtx_inv * (&xt * &y);
    let residuals = &y - &x * &beta;
    let ssr = residuals.dot(&residuals);

    let sigma2 = ssr / (n - k) as f64;
    let mut std_errors = Vec::with_capacity(k);
    for j in 0..k {
        let v = sigma2 * xtx_inv[(j, j)];
        if !v.is_finite() || v < 0.0 {
            return Err(MathError::SingularMatrix(
                "Coefficient covariance is not positive".to_string(),
            ));
        }
        std_errors.push(v.sqrt());
    }

    Ok(OlsFit {
        coefficients: beta.iter().copied().collect(),
        std_errors,
        residuals: residuals.iter().copied().collect(),
        ssr,
        nobs: n,
    })
}
