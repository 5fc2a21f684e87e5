//! Grid search over candidate ARMA orders

use crate::config::{ForecastConfig, OrderRange};
use crate::error::{ForecastError, Result};
use crate::models::{FitResult, FittedModel, ForecastModel, ModelOrder};
use log::{debug, info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Outcome of one attempted order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelCandidate {
    pub order: ModelOrder,
    /// Whether the fit succeeded
    pub fitted: bool,
    /// Mean squared in-sample error, for fitted candidates
    pub in_sample_error: Option<f64>,
    /// AIC, for fitted candidates
    pub info_criterion: Option<f64>,
    /// Reason the fit failed
    pub failure: Option<String>,
}

impl ModelCandidate {
    pub fn succeeded(order: ModelOrder, in_sample_error: f64, info_criterion: f64) -> Self {
        Self {
            order,
            fitted: true,
            in_sample_error: Some(in_sample_error),
            info_criterion: Some(info_criterion),
            failure: None,
        }
    }

    pub fn failed(order: ModelOrder, reason: impl Into<String>) -> Self {
        Self {
            order,
            fitted: false,
            in_sample_error: None,
            info_criterion: None,
            failure: Some(reason.into()),
        }
    }
}

/// The winning candidate together with its fitted model
#[derive(Debug, Clone)]
pub struct SelectedModel<F> {
    pub candidate: ModelCandidate,
    pub model: F,
}

/// Every attempted candidate, in grid order, and the winner
#[derive(Debug, Clone)]
pub struct Selection<F> {
    pub candidates: Vec<ModelCandidate>,
    pub selected: SelectedModel<F>,
}

/// True when `(mse, ic)` beats the current best.
///
/// Lower error wins, an exact tie falls to the lower criterion, and a full
/// tie keeps the incumbent.
pub fn is_better(mse: f64, ic: f64, best_mse: f64, best_ic: f64) -> bool {
    mse < best_mse || (mse == best_mse && ic < best_ic)
}

/// Fits every order in a `p` by `q` grid and keeps the best
#[derive(Debug, Clone)]
pub struct ModelSelector<'a, M> {
    model: &'a M,
    p_range: OrderRange,
    q_range: OrderRange,
    parallel: bool,
}

impl<'a, M: ForecastModel> ModelSelector<'a, M> {
    pub fn new(model: &'a M) -> Self {
        Self {
            model,
            p_range: OrderRange::default(),
            q_range: OrderRange::default(),
            parallel: false,
        }
    }

    /// Ranges and parallelism taken from `config`
    pub fn from_config(model: &'a M, config: &ForecastConfig) -> Self {
        Self::new(model)
            .with_p_range(config.p_range)
            .with_q_range(config.q_range)
            .parallel(config.parallel_search)
    }

    pub fn with_p_range(mut self, range: OrderRange) -> Self {
        self.p_range = range;
        self
    }

    pub fn with_q_range(mut self, range: OrderRange) -> Self {
        self.q_range = range;
        self
    }

    /// Fit candidates on the rayon pool
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Orders tried for differencing order `d`, `p` major and `q` minor
    pub fn grid(&self, d: usize) -> Vec<ModelOrder> {
        self.p_range
            .iter()
            .flat_map(|p| self.q_range.iter().map(move |q| ModelOrder::new(p, d, q)))
            .collect()
    }

    /// Fit every candidate to the level `series` and select the best
    pub fn select(&self, series: &[f64], d: usize) -> Result<Selection<M::Fitted>> {
        let grid = self.grid(d);
        if grid.is_empty() {
            return Err(ForecastError::InvalidRequest(
                "The order grid is empty".to_string(),
            ));
        }

        let fit = |order: &ModelOrder| -> (ModelOrder, FitResult<M::Fitted>) {
            (*order, self.model.fit(series, *order))
        };
        let attempts: Vec<_> = if self.parallel {
            grid.par_iter().map(fit).collect()
        } else {
            grid.iter().map(fit).collect()
        };

        let mut candidates = Vec::with_capacity(attempts.len());
        let mut best: Option<SelectedModel<M::Fitted>> = None;

        for (order, attempt) in attempts {
            let fitted = match attempt {
                Ok(fitted) => fitted,
                Err(failure) => {
                    warn!("{}{} failed to fit: {}", self.model.name(), order, failure);
                    candidates.push(ModelCandidate::failed(order, failure.to_string()));
                    continue;
                }
            };

            let (mse, ic) = (fitted.in_sample_error(), fitted.info_criterion());
            if !mse.is_finite() || ic.is_nan() {
                warn!("{}{} produced an unusable score", self.model.name(), order);
                candidates.push(ModelCandidate::failed(order, "non-finite score"));
                continue;
            }
            debug!(
                "{}{}: MSE {:.4}, AIC {:.4}",
                self.model.name(),
                order,
                mse,
                ic
            );

            let candidate = ModelCandidate::succeeded(order, mse, ic);
            candidates.push(candidate.clone());
            let replace = match &best {
                None => true,
                Some(current) => is_better(
                    mse,
                    ic,
                    current.model.in_sample_error(),
                    current.model.info_criterion(),
                ),
            };
            if replace {
                best = Some(SelectedModel {
                    candidate,
                    model: fitted,
                });
            }
        }

        let selected = best.ok_or_else(|| {
            ForecastError::NoViableModel(format!(
                "All {} candidate orders failed to fit",
                candidates.len()
            ))
        })?;

        info!(
            "Selected {}{} with MSE {:.4} out of {} candidates",
            self.model.name(),
            selected.candidate.order,
            selected.model.in_sample_error(),
            candidates.len()
        );

        Ok(Selection {
            candidates,
            selected,
        })
    }
}
