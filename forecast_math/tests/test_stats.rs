use assert_approx_eq::assert_approx_eq;
use forecast_math::unit_root::{mackinnon_critical_values, mackinnon_p_value};
use forecast_math::{
    acf, adf_test, difference, integrate, is_stationary_ar, max_lag, nelder_mead, ols, pacf,
    MathError, NelderMeadConfig,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

fn ar(n: usize, phi: &[f64], seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let noise = Normal::new(0.0, 1.0).unwrap();
    let mut x = vec![0.0; n];
    for t in 0..n {
        let lagged: f64 = phi
            .iter()
            .enumerate()
            .filter(|(i, _)| t > *i)
            .map(|(i, c)| c * x[t - 1 - i])
            .sum();
        x[t] = lagged + noise.sample(&mut rng);
    }
    x
}

#[test]
fn test_drifting_random_walk_has_unit_root() {
    let steps: Vec<f64> = ar(120, &[], 5).iter().map(|e| e + 0.8).collect();
    let walk = integrate(&steps, 200.0);
    let result = adf_test(&walk, None).unwrap();

    assert!(result.p_value > 0.05, "p = {}", result.p_value);
    assert!(result.statistic > result.critical_values["5%"]);
}

#[test]
fn test_differenced_walk_is_stationary() {
    let walk = integrate(&ar(120, &[], 6), 50.0);
    let steps = difference(&walk, 1);
    let result = adf_test(&steps, None).unwrap();

    assert!(result.p_value < 0.05, "p = {}", result.p_value);
}

#[test]
fn test_explicit_lag_is_respected() {
    let series = ar(80, &[0.5], 9);
    let result = adf_test(&series, Some(0)).unwrap();
    assert_eq!(result.used_lag, 0);
    assert_eq!(result.n_obs, 79);
}

#[test]
fn test_too_many_lags_is_insufficient_data() {
    let err = adf_test(&ar(12, &[], 1), Some(6)).unwrap_err();
    assert!(matches!(err, MathError::InsufficientData(_)));
}

#[test]
fn test_p_value_is_monotone_in_statistic() {
    let stats = [-6.0, -4.0, -3.0, -2.0, -1.0, 0.0, 1.0, 2.0];
    let p: Vec<f64> = stats.iter().map(|&s| mackinnon_p_value(s)).collect();
    for pair in p.windows(2) {
        assert!(pair[0] <= pair[1]);
    }
}

#[test]
fn test_critical_values_converge_to_asymptotic() {
    let crit = mackinnon_critical_values(1_000_000);
    assert_approx_eq!(crit["1%"], -3.43035, 1e-4);
    assert_approx_eq!(crit["5%"], -2.86154, 1e-4);
    assert_approx_eq!(crit["10%"], -2.56677, 1e-4);
}

#[test]
fn test_pacf_cuts_off_for_ar2() {
    let series = ar(2000, &[0.5, 0.3], 12);
    let lag = max_lag(series.len());
    let partial = pacf(&series, lag).unwrap();

    assert_eq!(lag, 20);
    assert_approx_eq!(partial[2], 0.3, 0.06);
    for value in &partial[3..] {
        assert!(value.abs() < 0.08, "pacf {:?}", partial);
    }
}

#[test]
fn test_acf_decays_for_ar1() {
    let series = ar(2000, &[0.7], 3);
    let rho = acf(&series, 3).unwrap();
    assert_approx_eq!(rho[1], 0.7, 0.05);
    assert_approx_eq!(rho[2], 0.49, 0.07);
}

#[test]
fn test_ols_recovers_ar_coefficients() {
    let series = ar(1500, &[0.6, -0.2], 44);
    let rows: Vec<Vec<f64>> = (2..series.len())
        .map(|t| vec![series[t - 1], series[t - 2]])
        .collect();
    let fit = ols(&rows, &series[2..]).unwrap();

    assert_approx_eq!(fit.coefficients[0], 0.6, 0.06);
    assert_approx_eq!(fit.coefficients[1], -0.2, 0.06);
    assert!(is_stationary_ar(&fit.coefficients));
}

#[test]
fn test_nelder_mead_recovers_least_squares_line() {
    let xs: Vec<f64> = (0..30).map(|i| i as f64).collect();
    let ys: Vec<f64> = xs.iter().map(|x| 2.5 * x - 4.0).collect();
    let objective = |b: &[f64]| {
        xs.iter()
            .zip(&ys)
            .map(|(x, y)| (y - b[0] - b[1] * x).powi(2))
            .sum::<f64>()
    };
    let min = nelder_mead(objective, &[0.0, 1.0], NelderMeadConfig::default()).unwrap();

    assert!(min.converged);
    assert_approx_eq!(min.point[0], -4.0, 1e-2);
    assert_approx_eq!(min.point[1], 2.5, 1e-3);
}
