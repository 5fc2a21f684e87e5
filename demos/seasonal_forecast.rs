// Walks a synthetic inventory through the forecasting pipeline
use stock_forecast::ledger::SqliteLedger;
use stock_forecast::synthetic::SyntheticDemand;
use stock_forecast::{ForecastConfig, ForecastPipeline, Period, TransactionFlow};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Stock forecast demo\n");

    let ledger = SqliteLedger::open_in_memory(TransactionFlow::Outgoing)?;
    ledger.create_schema()?;
    let id = ledger.insert_product("Hex bolts M8", 1200, "pcs")?;

    let this_month = Period::from_date(chrono::Local::now().date_naive());
    let demand = SyntheticDemand::new(140.0)
        .with_trend(0.8)
        .with_seasonality(35.0)
        .with_noise(9.0);
    for event in demand.events_ending(id, this_month, 36)? {
        ledger.record_transaction(TransactionFlow::Outgoing, id, event.quantity, event.timestamp)?;
    }

    let config = ForecastConfig {
        horizon_months: 6,
        confidence_pct: 90,
        ..ForecastConfig::default()
    };
    let pipeline = ForecastPipeline::arima(&ledger, config);
    let report = pipeline.run(&pipeline.request(id))?;

    println!("=== Stationarity ===");
    let original = &report.stationarity.original;
    println!(
        "ADF statistic {:.3}, p-value {:.3}, lag {}",
        original.test_statistic, original.p_value, original.used_lag
    );
    println!("Differencing order: {}", report.stationarity.differencing_order);

    println!("\n=== Candidates ===");
    for candidate in &report.attempted_candidates {
        match (candidate.in_sample_error, &candidate.failure) {
            (Some(mse), _) => println!("{} mse {:.2}", candidate.order, mse),
            (None, Some(reason)) => println!("{} failed: {}", candidate.order, reason),
            (None, None) => println!("{} not scored", candidate.order),
        }
    }

    println!("\n=== Forecast ===");
    println!("{}", report);

    println!("\n=== JSON ===");
    println!("{}", report.to_json()?);
    Ok(())
}
