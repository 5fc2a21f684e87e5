//! ARIMA models fitted by conditional least squares
//!
//! The level series is differenced `d` times and an ARMA(p, q) is fitted to
//! the result. One-step innovations are computed over the whole differenced
//! sample with pre-sample deviations and innovations set to zero, so every
//! order in a search is scored on the same observations. Minimising their
//! sum of squares is Gaussian maximum likelihood conditional on those
//! pre-sample values, with the innovation variance concentrated out.

use crate::config::ForecastConfig;
use crate::error::{ForecastError, Result};
use crate::models::{
    z_score, FitFailure, FitResult, FittedModel, ForecastModel, ForecastResult, ModelOrder,
};
use forecast_math::{
    difference, integrate, is_invertible_ma, is_stationary_ar, mean, nelder_mead, ols,
    NelderMeadConfig,
};
use std::f64::consts::PI;

/// Highest differencing order the model accepts
pub const MAX_D: usize = 1;

/// ARIMA model family
#[derive(Debug, Clone)]
pub struct ArimaModel {
    /// Name of the model
    name: String,
    /// Settings for the likelihood optimiser
    optimizer: NelderMeadConfig,
}

impl ArimaModel {
    /// Create a new ARIMA model family with default optimiser settings
    pub fn new() -> Self {
        Self {
            name: "ARIMA".to_string(),
            optimizer: NelderMeadConfig::default(),
        }
    }

    /// Take the optimiser budget and tolerance from `config`
    pub fn from_config(config: &ForecastConfig) -> Self {
        Self::new().with_optimizer(NelderMeadConfig {
            max_iter: config.max_iterations,
            tolerance: config.tolerance,
            ..NelderMeadConfig::default()
        })
    }

    pub fn with_optimizer(mut self, optimizer: NelderMeadConfig) -> Self {
        self.optimizer = optimizer;
        self
    }

    pub fn optimizer(&self) -> &NelderMeadConfig {
        &self.optimizer
    }
}

impl Default for ArimaModel {
    fn default() -> Self {
        Self::new()
    }
}

impl ForecastModel for ArimaModel {
    type Fitted = FittedArima;

    fn fit(&self, series: &[f64], order: ModelOrder) -> FitResult<FittedArima> {
        if order.d > MAX_D {
            return Err(FitFailure::UnsupportedOrder {
                order,
                reason: format!("differencing beyond d = {}", MAX_D),
            });
        }

        let modeled = difference(series, order.d);
        let with_mean = order.d == 0;
        let n_params = order.p + order.q + usize::from(with_mean) + 1;
        let needed = n_params + order.p.max(order.q) + 1;
        if modeled.len() < needed {
            return Err(FitFailure::TooFewObservations {
                order,
                needed: needed + order.d,
                available: series.len(),
            });
        }

        let mu = if with_mean {
            mean(&modeled).map_err(|e| FitFailure::Numerical(e.to_string()))?
        } else {
            0.0
        };
        let deviations: Vec<f64> = modeled.iter().map(|w| w - mu).collect();
        let (phi0, theta0) = hannan_rissanen(&deviations, order.p, order.q)
            .unwrap_or_else(|| default_start(order.p, order.q));

        let mut initial = Vec::with_capacity(n_params);
        if with_mean {
            initial.push(mu);
        }
        initial.extend(&phi0);
        initial.extend(&theta0);

        let (p, q) = (order.p, order.q);
        let objective = |params: &[f64]| {
            let (mu, phi, theta) = split_params(params, with_mean, p, q);
            if !is_stationary_ar(phi) || !is_invertible_ma(theta) {
                return f64::INFINITY;
            }
            let residuals = innovations(&modeled, mu, phi, theta);
            residuals.iter().map(|e| e * e).sum::<f64>() / residuals.len() as f64
        };

        let minimum = nelder_mead(objective, &initial, self.optimizer)
            .map_err(|e| FitFailure::Numerical(e.to_string()))?;
        if !minimum.converged {
            return Err(FitFailure::NotConverged {
                iterations: minimum.iterations,
            });
        }

        let (mu, phi, theta) = split_params(&minimum.point, with_mean, p, q);
        let mut fitted =
            FittedArima::from_parameters(series, order, mu, phi.to_vec(), theta.to_vec())?;
        fitted.iterations = minimum.iterations;
        Ok(fitted)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// ARIMA model fitted to a level series
#[derive(Debug, Clone)]
pub struct FittedArima {
    order: ModelOrder,
    /// Mean of the differenced series, zero when `d > 0`
    mu: f64,
    /// Fitted AR coefficients
    ar_coefficients: Vec<f64>,
    /// Fitted MA coefficients
    ma_coefficients: Vec<f64>,
    /// Historical level data
    historical_data: Vec<f64>,
    /// Series after differencing
    modeled: Vec<f64>,
    /// One-step innovations on the differenced scale
    residuals: Vec<f64>,
    /// One-step predictions on the level scale
    fitted_values: Vec<f64>,
    sigma2: f64,
    aic: f64,
    iterations: usize,
}

impl FittedArima {
    /// Build a fitted model from known coefficients.
    ///
    /// The coefficients must be stationary and invertible, and the implied
    /// innovation variance must be positive.
    pub fn from_parameters(
        series: &[f64],
        order: ModelOrder,
        mu: f64,
        ar_coefficients: Vec<f64>,
        ma_coefficients: Vec<f64>,
    ) -> FitResult<Self> {
        if order.d > MAX_D {
            return Err(FitFailure::UnsupportedOrder {
                order,
                reason: format!("differencing beyond d = {}", MAX_D),
            });
        }
        if ar_coefficients.len() != order.p || ma_coefficients.len() != order.q {
            return Err(FitFailure::Numerical(format!(
                "order {} does not match {} AR and {} MA coefficients",
                order,
                ar_coefficients.len(),
                ma_coefficients.len()
            )));
        }
        if !is_stationary_ar(&ar_coefficients) {
            return Err(FitFailure::NonStationary(ar_coefficients));
        }
        if !is_invertible_ma(&ma_coefficients) {
            return Err(FitFailure::NonInvertible(ma_coefficients));
        }

        let modeled = difference(series, order.d);
        if modeled.is_empty() {
            return Err(FitFailure::TooFewObservations {
                order,
                needed: order.d + 1,
                available: series.len(),
            });
        }

        let residuals = innovations(&modeled, mu, &ar_coefficients, &ma_coefficients);
        let n = residuals.len() as f64;
        let sigma2 = residuals.iter().map(|e| e * e).sum::<f64>() / n;
        if !sigma2.is_finite() || sigma2 <= 0.0 {
            return Err(FitFailure::DegenerateResiduals(sigma2));
        }

        // Level prediction is the observed level minus the innovation
        let fitted_values: Vec<f64> = series[order.d..]
            .iter()
            .zip(&residuals)
            .map(|(y, e)| y - e)
            .collect();

        let k = (order.p + order.q + usize::from(order.d == 0) + 1) as f64;
        let log_likelihood = -0.5 * n * ((2.0 * PI * sigma2).ln() + 1.0);
        let aic = -2.0 * log_likelihood + 2.0 * k;

        Ok(Self {
            order,
            mu,
            ar_coefficients,
            ma_coefficients,
            historical_data: series.to_vec(),
            modeled,
            residuals,
            fitted_values,
            sigma2,
            aic,
            iterations: 0,
        })
    }

    pub fn ar_coefficients(&self) -> &[f64] {
        &self.ar_coefficients
    }

    pub fn ma_coefficients(&self) -> &[f64] {
        &self.ma_coefficients
    }

    /// Mean of the differenced series
    pub fn mean(&self) -> f64 {
        self.mu
    }

    pub fn residuals(&self) -> &[f64] {
        &self.residuals
    }

    /// Optimiser iterations spent on the fit
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Point forecasts on the differenced scale
    fn forecast_modeled(&self, horizon: usize) -> Vec<f64> {
        let mut deviations: Vec<f64> = self.modeled.iter().map(|w| w - self.mu).collect();
        let mut errors = self.residuals.clone();

        for _ in 0..horizon {
            let t = deviations.len();
            let ar: f64 = self
                .ar_coefficients
                .iter()
                .enumerate()
                .filter(|(i, _)| t > *i)
                .map(|(i, phi)| phi * deviations[t - 1 - i])
                .sum();
            let ma: f64 = self
                .ma_coefficients
                .iter()
                .enumerate()
                .filter(|(j, _)| t > *j)
                .map(|(j, theta)| theta * errors[t - 1 - j])
                .sum();
            deviations.push(ar + ma);
            errors.push(0.0);
        }

        deviations[self.modeled.len()..]
            .iter()
            .map(|x| x + self.mu)
            .collect()
    }

    /// MA(infinity) weights of the level process, `psi[0] = 1`
    fn psi_weights(&self, horizon: usize) -> Vec<f64> {
        let mut psi = vec![0.0; horizon];
        if horizon == 0 {
            return psi;
        }
        psi[0] = 1.0;
        for j in 1..horizon {
            let ma = self.ma_coefficients.get(j - 1).copied().unwrap_or(0.0);
            let ar: f64 = self
                .ar_coefficients
                .iter()
                .enumerate()
                .take_while(|(i, _)| *i < j)
                .map(|(i, phi)| phi * psi[j - 1 - i])
                .sum();
            psi[j] = ma + ar;
        }

        for _ in 0..self.order.d {
            psi = integrate(&psi, 0.0);
        }
        psi
    }
}

impl FittedModel for FittedArima {
    fn order(&self) -> ModelOrder {
        self.order
    }

    fn in_sample_error(&self) -> f64 {
        self.sigma2
    }

    fn info_criterion(&self) -> f64 {
        self.aic
    }

    fn fitted_values(&self) -> &[f64] {
        &self.fitted_values
    }

    fn residual_variance(&self) -> f64 {
        self.sigma2
    }

    fn forecast(&self, horizon: usize, confidence_pct: u8) -> Result<ForecastResult> {
        if horizon == 0 {
            return Err(ForecastError::InvalidRequest(
                "Forecast horizon must be at least one month".to_string(),
            ));
        }
        let z = z_score(confidence_pct)?;

        let modeled = self.forecast_modeled(horizon);
        let values = match (self.order.d, self.historical_data.last()) {
            (0, _) => modeled,
            (_, Some(&last)) => integrate(&modeled, last),
            (_, None) => {
                return Err(ForecastError::ForecastUnavailable(
                    "No history to integrate from".to_string(),
                ))
            }
        };

        let mut cumulative = 0.0;
        let std_errors: Vec<f64> = self
            .psi_weights(horizon)
            .iter()
            .map(|psi| {
                cumulative += psi * psi;
                (self.sigma2 * cumulative).sqrt()
            })
            .collect();

        let intervals = values
            .iter()
            .zip(&std_errors)
            .map(|(v, se)| (v - z * se, v + z * se))
            .collect();

        let result = ForecastResult::new_with_intervals(values, horizon, intervals, std_errors)?;
        if !result.is_finite() {
            return Err(ForecastError::ForecastUnavailable(format!(
                "ARIMA{} produced non-finite forecasts",
                self.order
            )));
        }
        Ok(result)
    }
}

fn split_params(params: &[f64], with_mean: bool, p: usize, q: usize) -> (f64, &[f64], &[f64]) {
    let (mu, rest) = if with_mean {
        (params[0], &params[1..])
    } else {
        (0.0, params)
    };
    (mu, &rest[..p], &rest[p..p + q])
}

/// One-step innovations of the ARMA recursion with zero pre-sample values
fn innovations(modeled: &[f64], mu: f64, phi: &[f64], theta: &[f64]) -> Vec<f64> {
    let mut errors: Vec<f64> = Vec::with_capacity(modeled.len());
    for t in 0..modeled.len() {
        let mut prediction = 0.0;
        for (i, coeff) in phi.iter().enumerate().take(t) {
            prediction += coeff * (modeled[t - 1 - i] - mu);
        }
        for (j, coeff) in theta.iter().enumerate().take(t) {
            prediction += coeff * errors[t - 1 - j];
        }
        errors.push(modeled[t] - mu - prediction);
    }
    errors
}

fn default_start(p: usize, q: usize) -> (Vec<f64>, Vec<f64>) {
    let small = |i: usize| 0.1 / (i + 1) as f64;
    ((0..p).map(small).collect(), (0..q).map(small).collect())
}

/// Two-stage regression estimate of ARMA coefficients for a zero-mean series.
///
/// A long autoregression supplies innovation estimates, then the series is
/// regressed on its own lags and the lagged innovations. Returns `None` when
/// the sample is too short or the estimate lies outside the admissible region.
fn hannan_rissanen(x: &[f64], p: usize, q: usize) -> Option<(Vec<f64>, Vec<f64>)> {
    if p == 0 && q == 0 {
        return Some((Vec::new(), Vec::new()));
    }
    let n = x.len();

    let (innovations, start) = if q > 0 {
        let long = (p + q).max(3);
        if n <= 2 * long + 1 {
            return None;
        }
        let rows: Vec<Vec<f64>> = (long..n)
            .map(|t| (1..=long).map(|i| x[t - i]).collect())
            .collect();
        let fit = ols(&rows, &x[long..]).ok()?;
        let mut e = vec![0.0; n];
        e[long..].copy_from_slice(&fit.residuals);
        (e, p.max(long + q))
    } else {
        (vec![0.0; n], p)
    };

    if n <= start + p + q {
        return None;
    }
    let rows: Vec<Vec<f64>> = (start..n)
        .map(|t| {
            (1..=p)
                .map(|i| x[t - i])
                .chain((1..=q).map(|j| innovations[t - j]))
                .collect()
        })
        .collect();
    let fit = ols(&rows, &x[start..]).ok()?;

    let phi = fit.coefficients[..p].to_vec();
    let theta = fit.coefficients[p..p + q].to_vec();
    if is_stationary_ar(&phi) && is_invertible_ma(&theta) {
        Some((phi, theta))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_innovations_white_noise_model() {
        let e = innovations(&[3.0, 5.0, 4.0], 4.0, &[], &[]);
        assert_eq!(e, vec![-1.0, 1.0, 0.0]);
    }

    #[test]
    fn test_innovations_ar1() {
        let e = innovations(&[1.0, 2.0, 2.0], 0.0, &[0.5], &[]);
        assert_eq!(e, vec![1.0, 1.5, 1.0]);
    }

    #[test]
    fn test_psi_weights_ar1_and_integration() {
        let series: Vec<f64> = (0..20).map(|i| (i as f64 * 0.7).sin() * 5.0 + 20.0).collect();
        let model =
            FittedArima::from_parameters(&series, ModelOrder::new(1, 0, 0), 20.0, vec![0.5], vec![])
                .unwrap();
        let psi = model.psi_weights(4);
        assert_approx_eq!(psi[1], 0.5);
        assert_approx_eq!(psi[3], 0.125);

        let walk =
            FittedArima::from_parameters(&series, ModelOrder::new(0, 1, 0), 0.0, vec![], vec![])
                .unwrap();
        assert_eq!(walk.psi_weights(3), vec![1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_inadmissible_parameters_are_rejected() {
        let series = vec![1.0, 3.0, 2.0, 4.0, 3.0];
        let result =
            FittedArima::from_parameters(&series, ModelOrder::new(1, 0, 0), 0.0, vec![1.1], vec![]);
        assert!(matches!(result, Err(FitFailure::NonStationary(_))));
    }
}
