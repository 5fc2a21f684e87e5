use chrono::{NaiveDate, NaiveDateTime};
use pretty_assertions::assert_eq;
use stock_forecast::data::{aggregate_monthly, Event, MonthlySeries, Period};
use stock_forecast::error::ForecastError;

fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, 15, 0)
        .unwrap()
}

#[test]
fn test_same_month_events_are_summed() {
    let events = vec![
        Event::new(1, 3, at(2024, 5, 1, 0)),
        Event::new(1, 4, at(2024, 5, 17, 9)),
        Event::new(1, 5, at(2024, 5, 31, 23)),
    ];
    let series = aggregate_monthly(&events).unwrap();

    assert_eq!(series.len(), 1);
    assert_eq!(series.observations()[0].period, Period::from_ymd(2024, 5).unwrap());
    assert_eq!(series.observations()[0].quantity, 12);
}

#[test]
fn test_series_spans_first_to_last_month_with_zero_gaps() {
    let events = vec![
        Event::new(7, 10, at(2023, 11, 2, 8)),
        Event::new(7, 2, at(2024, 3, 9, 8)),
    ];
    let series = aggregate_monthly(&events).unwrap();

    let periods: Vec<String> = series
        .observations()
        .iter()
        .map(|o| o.period.to_string())
        .collect();
    assert_eq!(
        periods,
        vec!["2023-11", "2023-12", "2024-01", "2024-02", "2024-03"]
    );
    assert_eq!(series.values(), vec![10.0, 0.0, 0.0, 0.0, 2.0]);
    assert_eq!(series.first_period(), Period::from_ymd(2023, 11).unwrap());
    assert_eq!(series.last_period(), Period::from_ymd(2024, 3).unwrap());
}

#[test]
fn test_aggregation_preserves_total_quantity() {
    let events: Vec<Event> = (0..40)
        .map(|i| {
            let timestamp = at(2022, 1 + (i % 12) as u32, 1 + (i % 28) as u32, 12);
            Event::new(2, (i * 7 % 13) as u32, timestamp)
        })
        .collect();
    let expected: u64 = events.iter().map(|e| u64::from(e.quantity)).sum();

    let series = aggregate_monthly(&events).unwrap();
    assert_eq!(series.total(), expected);
}

#[test]
fn test_input_order_does_not_matter() {
    let mut events = vec![
        Event::new(1, 1, at(2024, 1, 5, 1)),
        Event::new(1, 2, at(2024, 2, 5, 1)),
        Event::new(1, 3, at(2024, 4, 5, 1)),
    ];
    let forward = aggregate_monthly(&events).unwrap();
    events.reverse();
    let backward = aggregate_monthly(&events).unwrap();

    assert_eq!(forward, backward);
}

#[test]
fn test_observations_are_contiguous() {
    let events = vec![
        Event::new(1, 1, at(2021, 12, 31, 23)),
        Event::new(1, 1, at(2023, 1, 1, 0)),
    ];
    let series = aggregate_monthly(&events).unwrap();

    assert_eq!(series.len(), 14);
    for pair in series.observations().windows(2) {
        assert_eq!(pair[0].period.next(), Some(pair[1].period));
    }
}

#[test]
fn test_empty_ledger_is_insufficient_data() {
    let err = aggregate_monthly(&[]).unwrap_err();
    assert!(matches!(err, ForecastError::InsufficientData(_)));
}

#[test]
fn test_deserialized_series_must_be_contiguous() {
    let events = vec![
        Event::new(2, 5, at(2024, 1, 9, 10)),
        Event::new(2, 8, at(2024, 3, 2, 14)),
    ];
    let series = aggregate_monthly(&events).unwrap();
    let json = serde_json::to_string(&series).unwrap();
    let restored: MonthlySeries = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, series);
    assert_eq!(restored.last_period(), Period::from_ymd(2024, 3).unwrap());

    let gappy = r#"[
        { "period": "2024-01", "quantity": 5 },
        { "period": "2024-05", "quantity": 8 }
    ]"#;
    let err = serde_json::from_str::<MonthlySeries>(gappy).unwrap_err();
    assert!(err.to_string().contains("not consecutive"), "{}", err);

    let err = serde_json::from_str::<MonthlySeries>("[]").unwrap_err();
    assert!(err.to_string().contains("at least one observation"), "{}", err);
}
