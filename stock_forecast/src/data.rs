//! Ledger records and the monthly demand series built from them

use crate::error::{ForecastError, Result};
use chrono::{Datelike, Months, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// One stock movement for a product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Product the movement belongs to
    pub product_id: i64,
    /// Units moved
    pub quantity: u32,
    /// When the movement was recorded
    pub timestamp: NaiveDateTime,
}

impl Event {
    pub fn new(product_id: i64, quantity: u32, timestamp: NaiveDateTime) -> Self {
        Self {
            product_id,
            quantity,
            timestamp,
        }
    }
}

/// Catalog entry for a product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
}

impl Product {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// A calendar month, stored as its first day
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Period(NaiveDate);

impl Period {
    /// Month containing `date`
    pub fn from_date(date: NaiveDate) -> Self {
        // Day 1 exists in every month chrono can represent
        Self(date.with_day(1).unwrap_or(date))
    }

    pub fn from_ymd(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(Self)
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// First day of the month
    pub fn first_day(&self) -> NaiveDate {
        self.0
    }

    /// The following month
    pub fn next(&self) -> Option<Self> {
        self.succ(1)
    }

    /// The month `n` months later
    pub fn succ(&self, n: u32) -> Option<Self> {
        self.0.checked_add_months(Months::new(n)).map(Self)
    }

    /// The month `n` months earlier
    pub fn pred(&self, n: u32) -> Option<Self> {
        self.0.checked_sub_months(Months::new(n)).map(Self)
    }

    /// Signed number of months from `self` to `other`
    pub fn months_until(&self, other: &Period) -> i64 {
        let index = |p: &Period| p.year() as i64 * 12 + p.month() as i64;
        index(other) - index(self)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl FromStr for Period {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || ForecastError::InvalidRequest(format!("Invalid period '{}'", s));
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::from_ymd(year, month).ok_or_else(invalid)
    }
}

impl From<Period> for String {
    fn from(period: Period) -> Self {
        period.to_string()
    }
}

impl TryFrom<String> for Period {
    type Error = ForecastError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// Total demand for one month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyObservation {
    pub period: Period,
    pub quantity: u64,
}

/// Contiguous run of monthly observations, oldest first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "Vec<MonthlyObservation>",
    into = "Vec<MonthlyObservation>"
)]
pub struct MonthlySeries {
    observations: Vec<MonthlyObservation>,
}

impl MonthlySeries {
    /// Wrap observations that are already contiguous and increasing
    pub fn new(observations: Vec<MonthlyObservation>) -> Result<Self> {
        if observations.is_empty() {
            return Err(ForecastError::InsufficientData(
                "A monthly series needs at least one observation".to_string(),
            ));
        }

        for pair in observations.windows(2) {
            if pair[0].period.months_until(&pair[1].period) != 1 {
                return Err(ForecastError::InvalidRequest(format!(
                    "Months {} and {} are not consecutive",
                    pair[0].period, pair[1].period
                )));
            }
        }

        Ok(Self { observations })
    }

    pub fn observations(&self) -> &[MonthlyObservation] {
        &self.observations
    }

    pub fn into_observations(self) -> Vec<MonthlyObservation> {
        self.observations
    }

    /// Quantities as floating point, for modelling
    pub fn values(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.quantity as f64).collect()
    }

    pub fn first_period(&self) -> Period {
        self.observations[0].period
    }

    pub fn last_period(&self) -> Period {
        self.observations[self.observations.len() - 1].period
    }

    pub fn total(&self) -> u64 {
        self.observations.iter().map(|o| o.quantity).sum()
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

impl TryFrom<Vec<MonthlyObservation>> for MonthlySeries {
    type Error = ForecastError;

    fn try_from(observations: Vec<MonthlyObservation>) -> Result<Self> {
        Self::new(observations)
    }
}

impl From<MonthlySeries> for Vec<MonthlyObservation> {
    fn from(series: MonthlySeries) -> Self {
        series.observations
    }
}

/// Sum events into calendar months, filling months without events with zero.
///
/// The result spans the earliest to the latest event month inclusive.
pub fn aggregate_monthly(events: &[Event]) -> Result<MonthlySeries> {
    let mut totals: BTreeMap<Period, u64> = BTreeMap::new();
    for event in events {
        *totals
            .entry(Period::from_date(event.timestamp.date()))
            .or_insert(0) += u64::from(event.quantity);
    }

    let (first, last) = match (totals.keys().next(), totals.keys().next_back()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => {
            return Err(ForecastError::InsufficientData(
                "No transactions in the lookback window".to_string(),
            ))
        }
    };

    let span = first.months_until(&last) as u32;
    let observations = (0..=span)
        .map(|offset| {
            let period = first.succ(offset).ok_or_else(|| {
                ForecastError::InvalidRequest(format!(
                    "Month {} + {} is out of range",
                    first, offset
                ))
            })?;
            Ok(MonthlyObservation {
                period,
                quantity: totals.get(&period).copied().unwrap_or(0),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    MonthlySeries::new(observations)
}
