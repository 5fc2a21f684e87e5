//! Error types for the stock_forecast crate

use thiserror::Error;

/// Errors produced by the forecasting pipeline
#[derive(Debug, Error)]
pub enum ForecastError {
    /// The ledger returned no events for the product in the lookback window
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Events exist but span too few months to model
    #[error("Series too short: {0}")]
    SeriesTooShort(String),

    /// The series has no variation left to model
    #[error("Degenerate series: {0}")]
    DegenerateSeries(String),

    /// Every candidate order failed to fit
    #[error("No viable model: {0}")]
    NoViableModel(String),

    /// A model was selected but could not produce the requested forecast
    #[error("Forecast unavailable: {0}")]
    ForecastUnavailable(String),

    /// The product is not in the ledger's catalog
    #[error("Unknown product: {0}")]
    UnknownProduct(i64),

    /// A request or configuration parameter is out of bounds
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The ledger collaborator failed
    #[error("Ledger error: {0}")]
    Ledger(String),

    /// The configuration could not be read or parsed
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from JSON serialization
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Error from the numerical core outside of a classified stage
    #[error("Numerical error: {0}")]
    Numerical(#[from] forecast_math::MathError),
}

/// Fieldless mirror of [`ForecastError`] for matching on the failure kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InsufficientData,
    SeriesTooShort,
    DegenerateSeries,
    NoViableModel,
    ForecastUnavailable,
    UnknownProduct,
    InvalidRequest,
    Ledger,
    Config,
    Io,
    Serialization,
    Numerical,
}

impl ForecastError {
    /// The kind of this error, without its message
    pub fn kind(&self) -> ErrorKind {
        match self {
            ForecastError::InsufficientData(_) => ErrorKind::InsufficientData,
            ForecastError::SeriesTooShort(_) => ErrorKind::SeriesTooShort,
            ForecastError::DegenerateSeries(_) => ErrorKind::DegenerateSeries,
            ForecastError::NoViableModel(_) => ErrorKind::NoViableModel,
            ForecastError::ForecastUnavailable(_) => ErrorKind::ForecastUnavailable,
            ForecastError::UnknownProduct(_) => ErrorKind::UnknownProduct,
            ForecastError::InvalidRequest(_) => ErrorKind::InvalidRequest,
            ForecastError::Ledger(_) => ErrorKind::Ledger,
            ForecastError::Config(_) => ErrorKind::Config,
            ForecastError::IoError(_) => ErrorKind::Io,
            ForecastError::SerializationError(_) => ErrorKind::Serialization,
            ForecastError::Numerical(_) => ErrorKind::Numerical,
        }
    }

    /// Errors the caller resolves by supplying more data or other parameters
    pub fn is_caller_input(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::InsufficientData
                | ErrorKind::SeriesTooShort
                | ErrorKind::UnknownProduct
                | ErrorKind::InvalidRequest
        )
    }

    /// Errors that mean the data was read but no forecast can be produced
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::DegenerateSeries
                | ErrorKind::NoViableModel
                | ErrorKind::ForecastUnavailable
                | ErrorKind::Numerical
        )
    }
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<rusqlite::Error> for ForecastError {
    fn from(err: rusqlite::Error) -> Self {
        ForecastError::Ledger(err.to_string())
    }
}

impl From<csv::Error> for ForecastError {
    fn from(err: csv::Error) -> Self {
        ForecastError::Ledger(err.to_string())
    }
}
