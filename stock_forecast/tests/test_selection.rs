use pretty_assertions::assert_eq;
use std::collections::HashMap;
use stock_forecast::config::OrderRange;
use stock_forecast::error::{ForecastError, Result};
use stock_forecast::models::arima::ArimaModel;
use stock_forecast::models::{
    FitFailure, FitResult, FittedModel, ForecastModel, ForecastResult, ModelOrder,
};
use stock_forecast::selection::ModelSelector;
use stock_forecast::synthetic::SyntheticDemand;

/// Model whose fit outcome per `(p, q)` is fixed in advance
#[derive(Debug, Default)]
struct ScriptedModel {
    scores: HashMap<(usize, usize), (f64, f64)>,
}

impl ScriptedModel {
    fn score(mut self, p: usize, q: usize, mse: f64, aic: f64) -> Self {
        self.scores.insert((p, q), (mse, aic));
        self
    }
}

#[derive(Debug)]
struct ScriptedFit {
    order: ModelOrder,
    mse: f64,
    aic: f64,
}

impl FittedModel for ScriptedFit {
    fn order(&self) -> ModelOrder {
        self.order
    }

    fn in_sample_error(&self) -> f64 {
        self.mse
    }

    fn info_criterion(&self) -> f64 {
        self.aic
    }

    fn fitted_values(&self) -> &[f64] {
        &[]
    }

    fn residual_variance(&self) -> f64 {
        self.mse
    }

    fn forecast(&self, horizon: usize, _confidence_pct: u8) -> Result<ForecastResult> {
        ForecastResult::new(vec![0.0; horizon], horizon)
    }
}

impl ForecastModel for ScriptedModel {
    type Fitted = ScriptedFit;

    fn fit(&self, _series: &[f64], order: ModelOrder) -> FitResult<ScriptedFit> {
        match self.scores.get(&(order.p, order.q)) {
            Some(&(mse, aic)) => Ok(ScriptedFit { order, mse, aic }),
            None => Err(FitFailure::NotConverged { iterations: 1000 }),
        }
    }

    fn name(&self) -> &str {
        "Scripted"
    }
}

const SERIES: [f64; 3] = [1.0, 2.0, 3.0];

#[test]
fn test_grid_is_p_major() {
    let model = ScriptedModel::default();
    let orders: Vec<String> = ModelSelector::new(&model)
        .grid(1)
        .iter()
        .map(|o| o.to_string())
        .collect();

    assert_eq!(
        orders,
        vec![
            "(0,1,0)", "(0,1,1)", "(0,1,2)", "(1,1,0)", "(1,1,1)", "(1,1,2)", "(2,1,0)",
            "(2,1,1)", "(2,1,2)"
        ]
    );
}

#[test]
fn test_lowest_error_wins() {
    let model = ScriptedModel::default()
        .score(0, 0, 9.0, 10.0)
        .score(1, 2, 4.0, 50.0)
        .score(2, 1, 6.0, 1.0);
    let selection = ModelSelector::new(&model).select(&SERIES, 0).unwrap();

    assert_eq!(selection.selected.candidate.order, ModelOrder::new(1, 0, 2));
    assert_eq!(selection.candidates.len(), 9);
    assert_eq!(selection.candidates.iter().filter(|c| c.fitted).count(), 3);
}

#[test]
fn test_error_tie_falls_to_lower_aic() {
    let model = ScriptedModel::default()
        .score(0, 1, 5.0, 30.0)
        .score(1, 0, 5.0, 20.0)
        .score(2, 2, 5.0, 25.0);
    let selection = ModelSelector::new(&model).select(&SERIES, 1).unwrap();

    assert_eq!(selection.selected.candidate.order, ModelOrder::new(1, 1, 0));
}

#[test]
fn test_full_tie_keeps_first_in_grid_order() {
    let model = ScriptedModel::default()
        .score(2, 0, 5.0, 20.0)
        .score(0, 2, 5.0, 20.0)
        .score(1, 1, 5.0, 20.0);
    let selection = ModelSelector::new(&model).select(&SERIES, 0).unwrap();

    assert_eq!(selection.selected.candidate.order, ModelOrder::new(0, 0, 2));
}

#[test]
fn test_failures_are_recorded_not_fatal() {
    let model = ScriptedModel::default().score(2, 2, 1.0, 1.0);
    let selection = ModelSelector::new(&model).select(&SERIES, 0).unwrap();

    let failed: Vec<_> = selection.candidates.iter().filter(|c| !c.fitted).collect();
    assert_eq!(failed.len(), 8);
    for candidate in failed {
        assert!(candidate.in_sample_error.is_none());
        assert!(candidate.info_criterion.is_none());
        assert!(candidate.failure.as_deref().unwrap().contains("converge"));
    }
    assert_eq!(selection.candidates.last().unwrap().failure, None);
}

#[test]
fn test_non_finite_scores_are_failures() {
    let model = ScriptedModel::default()
        .score(0, 0, f64::NAN, 1.0)
        .score(0, 1, 3.0, 1.0);
    let selection = ModelSelector::new(&model).select(&SERIES, 0).unwrap();

    assert!(!selection.candidates[0].fitted);
    assert_eq!(selection.selected.candidate.order, ModelOrder::new(0, 0, 1));
}

#[test]
fn test_no_viable_model() {
    let model = ScriptedModel::default();
    let err = ModelSelector::new(&model).select(&SERIES, 0).unwrap_err();
    assert!(matches!(err, ForecastError::NoViableModel(_)));
}

#[test]
fn test_custom_ranges() {
    let model = ScriptedModel::default().score(3, 0, 1.0, 1.0);
    let selector = ModelSelector::new(&model)
        .with_p_range(OrderRange::new(3, 3).unwrap())
        .with_q_range(OrderRange::new(0, 1).unwrap());

    assert_eq!(selector.grid(0).len(), 2);
    let selection = selector.select(&SERIES, 0).unwrap();
    assert_eq!(selection.selected.candidate.order, ModelOrder::new(3, 0, 0));
}

#[test]
fn test_parallel_search_matches_sequential() {
    let series: Vec<f64> = SyntheticDemand::new(80.0)
        .with_seasonality(15.0)
        .with_noise(6.0)
        .with_seed(12)
        .monthly_quantities(36)
        .unwrap()
        .into_iter()
        .map(f64::from)
        .collect();
    let model = ArimaModel::new();

    let sequential = ModelSelector::new(&model).select(&series, 0).unwrap();
    let parallel = ModelSelector::new(&model)
        .parallel(true)
        .select(&series, 0)
        .unwrap();

    assert_eq!(sequential.candidates, parallel.candidates);
    assert_eq!(
        sequential.selected.candidate,
        parallel.selected.candidate
    );
}
