//! Derivative-free minimisation with the Nelder-Mead simplex method

use crate::{MathError, Result};

/// Settings for [`nelder_mead`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NelderMeadConfig {
    /// Maximum number of simplex iterations
    pub max_iter: usize,
    /// Relative tolerance on the spread of objective values
    pub tolerance: f64,
    /// Edge length of the initial simplex for coordinates near zero
    pub initial_step: f64,
}

impl Default for NelderMeadConfig {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            tolerance: 1e-8,
            initial_step: 0.1,
        }
    }
}

/// Best point found by the optimiser
#[derive(Debug, Clone)]
pub struct Minimum {
    /// Location of the minimum
    pub point: Vec<f64>,
    /// Objective value at `point`
    pub value: f64,
    /// Iterations performed
    pub iterations: usize,
    /// Whether the tolerance was met before `max_iter`
    pub converged: bool,
}

const REFLECTION: f64 = 1.0;
const EXPANSION: f64 = 2.0;
const CONTRACTION: f64 = 0.5;
const SHRINK: f64 = 0.5;

/// Minimise `objective` starting from `initial`.
///
/// Non-finite objective values are treated as `+inf`, so the objective can
/// reject infeasible points by returning `f64::INFINITY`. The starting point
/// itself must be feasible.
pub fn nelder_mead<F>(objective: F, initial: &[f64], config: NelderMeadConfig) -> Result<Minimum>
where
    F: Fn(&[f64]) -> f64,
{
    if config.max_iter == 0 || config.tolerance.is_nan() || config.tolerance <= 0.0 {
        return Err(MathError::InvalidInput(
            "Nelder-Mead needs a positive iteration budget and tolerance".to_string(),
        ));
    }

    let eval = |x: &[f64]| {
        let v = objective(x);
        if v.is_finite() {
            v
        } else {
            f64::INFINITY
        }
    };

    let start_value = eval(initial);
    if !start_value.is_finite() {
        return Err(MathError::InvalidInput(
            "Objective is not finite at the starting point".to_string(),
        ));
    }

    let dim = initial.len();
    if dim == 0 {
        return Ok(Minimum {
            point: Vec::new(),
            value: start_value,
            iterations: 0,
            converged: true,
        });
    }

    let mut simplex: Vec<(Vec<f64>, f64)> = Vec::with_capacity(dim + 1);
    simplex.push((initial.to_vec(), start_value));
    for i in 0..dim {
        let mut vertex = initial.to_vec();
        let step = if vertex[i].abs() > config.initial_step {
            0.05 * vertex[i]
        } else {
            config.initial_step
        };
        vertex[i] += step;
        let value = eval(&vertex);
        simplex.push((vertex, value));
    }

    let x_tolerance = config.tolerance.sqrt();
    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iter {
        simplex.sort_by(|a, b| a.1.total_cmp(&b.1));
        if has_converged(&simplex, config.tolerance, x_tolerance) {
            converged = true;
            break;
        }
        iterations += 1;

        let worst = dim;
        let centroid: Vec<f64> = (0..dim)
            .map(|j| simplex[..worst].iter().map(|(x, _)| x[j]).sum::<f64>() / dim as f64)
            .collect();

        let reflected = along(&centroid, &simplex[worst].0, -REFLECTION);
        let f_reflected = eval(&reflected);

        if f_reflected < simplex[0].1 {
            let expanded = along(&centroid, &simplex[worst].0, -EXPANSION);
            let f_expanded = eval(&expanded);
            simplex[worst] = if f_expanded < f_reflected {
                (expanded, f_expanded)
            } else {
                (reflected, f_reflected)
            };
            continue;
        }

        if f_reflected < simplex[worst - 1].1 {
            simplex[worst] = (reflected, f_reflected);
            continue;
        }

        let (contracted, f_contracted) = if f_reflected < simplex[worst].1 {
            let x = along(&centroid, &reflected, CONTRACTION);
            let f = eval(&x);
            (x, f)
        } else {
            let x = along(&centroid, &simplex[worst].0, CONTRACTION);
            let f = eval(&x);
            (x, f)
        };

        if f_contracted < simplex[worst].1.min(f_reflected) {
            simplex[worst] = (contracted, f_contracted);
            continue;
        }

        let best = simplex[0].0.clone();
        for vertex in simplex.iter_mut().skip(1) {
            let shrunk = along(&best, &vertex.0, SHRINK);
            let value = eval(&shrunk);
            *vertex = (shrunk, value);
        }
    }

    simplex.sort_by(|a, b| a.1.total_cmp(&b.1));
    if !converged {
        converged = has_converged(&simplex, config.tolerance, x_tolerance);
    }

    let (point, value) = simplex.swap_remove(0);
    Ok(Minimum {
        point,
        value,
        iterations,
        converged: converged && value.is_finite(),
    })
}

/// `origin + t * (target - origin)`
fn along(origin: &[f64], target: &[f64], t: f64) -> Vec<f64> {
    origin
        .iter()
        .zip(target)
        .map(|(o, x)| o + t * (x - o))
        .collect()
}

fn has_converged(sorted: &[(Vec<f64>, f64)], f_tolerance: f64, x_tolerance: f64) -> bool {
    let (best, f_best) = &sorted[0];
    let f_spread = sorted
        .iter()
        .map(|(_, f)| (f - f_best).abs())
        .fold(0.0, f64::max);
    if !f_spread.is_finite() || f_spread > f_tolerance * (1.0 + f_best.abs()) {
        return false;
    }

    let scale = 1.0 + best.iter().map(|x| x.abs()).fold(0.0, f64::max);
    sorted.iter().all(|(x, _)| {
        x.iter()
            .zip(best)
            .all(|(a, b)| (a - b).abs() <= x_tolerance * scale)
    })
}
