//! Descriptive statistics and differencing

use crate::{MathError, Result};

/// Arithmetic mean of a series
pub fn mean(data: &[f64]) -> Result<f64> {
    if data.is_empty() {
        return Err(MathError::InsufficientData(
            "Cannot take the mean of an empty series".to_string(),
        ));
    }

    Ok(data.iter().sum::<f64>() / data.len() as f64)
}

/// Sample variance (n - 1 denominator)
pub fn variance(data: &[f64]) -> Result<f64> {
    if data.len() < 2 {
        return Err(MathError::InsufficientData(
            "Variance needs at least 2 points".to_string(),
        ));
    }

    let m = mean(data)?;
    let ss: f64 = data.iter().map(|x| (x - m).powi(2)).sum();
    Ok(ss / (data.len() - 1) as f64)
}

/// True when every value equals the first one.
///
/// Series shorter than two points carry no variation and count as constant.
pub fn has_zero_variance(data: &[f64]) -> bool {
    match data.first() {
        None => true,
        Some(&first) => {
            let tolerance = f64::EPSILON * first.abs().max(1.0);
            data.iter().all(|x| (x - first).abs() <= tolerance)
        }
    }
}

/// Difference a series `order` times, losing one observation per pass
pub fn difference(data: &[f64], order: usize) -> Vec<f64> {
    let mut result = data.to_vec();
    for _ in 0..order {
        if result.len() < 2 {
            return Vec::new();
        }
        result = result.windows(2).map(|w| w[1] - w[0]).collect();
    }
    result
}

/// Undo one pass of differencing, starting from the last known level
pub fn integrate(diffs: &[f64], start: f64) -> Vec<f64> {
    diffs
        .iter()
        .scan(start, |level, &d| {
            *level += d;
            Some(*level)
        })
        .collect()
}
