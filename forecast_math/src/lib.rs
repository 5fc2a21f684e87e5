//! # Forecast Math
//!
//! Numerical building blocks for monthly demand forecasting.
//! This crate provides the statistics the forecasting pipeline is built on:
//!
//! - Descriptive statistics and differencing
//! - Autocorrelation and partial autocorrelation
//! - Ordinary least squares
//! - The augmented Dickey-Fuller unit-root test
//! - Stationarity/invertibility checks for lag polynomials
//! - A Nelder-Mead minimiser

use thiserror::Error;

pub mod correlation;
pub mod descriptive;
pub mod optimize;
pub mod polynomial;
pub mod regression;
pub mod unit_root;

/// Errors that can occur in forecasting calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),

    #[error("Singular matrix: {0}")]
    SingularMatrix(String),
}

/// Result type for forecasting math operations
pub type Result<T> = std::result::Result<T, MathError>;

pub use correlation::{acf, max_lag, pacf};
pub use descriptive::{difference, has_zero_variance, integrate, mean, variance};
pub use optimize::{nelder_mead, Minimum, NelderMeadConfig};
pub use polynomial::{is_invertible_ma, is_stationary_ar};
pub use regression::{ols, OlsFit};
pub use unit_root::{adf_test, AdfTest};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MathError::InsufficientData("need 3 points".to_string());
        assert_eq!(
            err.to_string(),
            "Insufficient data for calculation: need 3 points"
        );
    }
}
