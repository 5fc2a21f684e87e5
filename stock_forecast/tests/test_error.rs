use forecast_math::MathError;
use std::io;
use stock_forecast::error::{ErrorKind, ForecastError};
use stock_forecast::CoreError;

#[test]
fn test_error_conversion() {
    let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
    match ForecastError::from(io_error) {
        ForecastError::IoError(_) => {}
        other => panic!("Expected IoError variant, got {:?}", other),
    }

    let json_error = serde_json::from_str::<u8>("nope").unwrap_err();
    assert_eq!(ForecastError::from(json_error).kind(), ErrorKind::Serialization);

    let math_error = MathError::SingularMatrix("X'X".to_string());
    assert_eq!(ForecastError::from(math_error).kind(), ErrorKind::Numerical);

    let sqlite_error = rusqlite::Error::InvalidQuery;
    assert_eq!(ForecastError::from(sqlite_error).kind(), ErrorKind::Ledger);
}

#[test]
fn test_error_display() {
    let error = ForecastError::SeriesTooShort("The series has 4 months".to_string());
    assert_eq!(error.to_string(), "Series too short: The series has 4 months");

    let error = ForecastError::UnknownProduct(17);
    assert_eq!(error.to_string(), "Unknown product: 17");

    let io_error = io::Error::new(io::ErrorKind::PermissionDenied, "permission denied");
    let error_string = ForecastError::from(io_error).to_string();
    assert!(error_string.contains("IO error"));
    assert!(error_string.contains("permission denied"));
}

#[test]
fn test_classification() {
    let caller: [CoreError; 4] = [
        ForecastError::InsufficientData(String::new()),
        ForecastError::SeriesTooShort(String::new()),
        ForecastError::UnknownProduct(1),
        ForecastError::InvalidRequest(String::new()),
    ];
    for error in &caller {
        assert!(error.is_caller_input(), "{:?}", error);
        assert!(!error.is_terminal(), "{:?}", error);
    }

    let terminal = [
        ForecastError::DegenerateSeries(String::new()),
        ForecastError::NoViableModel(String::new()),
        ForecastError::ForecastUnavailable(String::new()),
    ];
    for error in &terminal {
        assert!(error.is_terminal(), "{:?}", error);
        assert!(!error.is_caller_input(), "{:?}", error);
    }

    let ledger = ForecastError::Ledger("locked".to_string());
    assert!(!ledger.is_caller_input() && !ledger.is_terminal());
}
