//! Seeded synthetic demand for demos and tests

use crate::config::TransactionFlow;
use crate::data::{Event, Period, Product};
use crate::error::{ForecastError, Result};
use crate::ledger::InMemoryLedger;
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use std::f64::consts::PI;

/// Monthly demand as level + trend + yearly seasonality + Gaussian noise
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticDemand {
    base: f64,
    trend: f64,
    seasonal_amplitude: f64,
    noise_sd: f64,
    seed: u64,
}

impl SyntheticDemand {
    pub fn new(base: f64) -> Self {
        Self {
            base,
            trend: 0.0,
            seasonal_amplitude: 0.0,
            noise_sd: 0.0,
            seed: 42,
        }
    }

    /// Units added per month
    pub fn with_trend(mut self, trend: f64) -> Self {
        self.trend = trend;
        self
    }

    /// Peak deviation of the twelve-month cycle
    pub fn with_seasonality(mut self, amplitude: f64) -> Self {
        self.seasonal_amplitude = amplitude;
        self
    }

    pub fn with_noise(mut self, sd: f64) -> Self {
        self.noise_sd = sd;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Demand per month, rounded and floored at zero
    pub fn monthly_quantities(&self, months: usize) -> Result<Vec<u32>> {
        let noise = Normal::new(0.0, self.noise_sd).map_err(|e| {
            ForecastError::InvalidRequest(format!("Invalid noise level {}: {}", self.noise_sd, e))
        })?;
        let mut rng = StdRng::seed_from_u64(self.seed);

        Ok((0..months)
            .map(|t| {
                let t = t as f64;
                let level = self.base
                    + self.trend * t
                    + self.seasonal_amplitude * (2.0 * PI * t / 12.0).sin()
                    + noise.sample(&mut rng);
                level.round().clamp(0.0, u32::MAX as f64) as u32
            })
            .collect())
    }

    /// Events for `months` months from `start`, two per month on the 5th and 20th
    pub fn events(&self, product_id: i64, start: Period, months: usize) -> Result<Vec<Event>> {
        let quantities = self.monthly_quantities(months)?;
        let mut events = Vec::new();
        for (offset, quantity) in quantities.into_iter().enumerate() {
            let period = start.succ(offset as u32).ok_or_else(|| {
                ForecastError::InvalidRequest(format!(
                    "Month {} + {} is out of range",
                    start, offset
                ))
            })?;
            let early = quantity / 2;
            for (day, part) in [(5, early), (20, quantity - early)] {
                if part == 0 {
                    continue;
                }
                let timestamp = NaiveDate::from_ymd_opt(period.year(), period.month(), day)
                    .and_then(|d| d.and_hms_opt(12, 0, 0))
                    .ok_or_else(|| {
                        ForecastError::InvalidRequest(format!(
                            "Day {} of {} does not exist",
                            day, period
                        ))
                    })?;
                events.push(Event::new(product_id, part, timestamp));
            }
        }
        Ok(events)
    }

    /// Events for `months` months ending with `last`
    pub fn events_ending(
        &self,
        product_id: i64,
        last: Period,
        months: usize,
    ) -> Result<Vec<Event>> {
        let back = months.saturating_sub(1) as u32;
        let start = last.pred(back).ok_or_else(|| {
            ForecastError::InvalidRequest(format!("Month {} - {} is out of range", last, back))
        })?;
        self.events(product_id, start, months)
    }

    /// Single-product outgoing ledger for `months` months ending with `last`
    pub fn ledger(&self, product: Product, last: Period, months: usize) -> Result<InMemoryLedger> {
        let events = self.events_ending(product.id, last, months)?;
        let mut ledger = InMemoryLedger::new();
        ledger.add_product(product);
        ledger.extend(TransactionFlow::Outgoing, events);
        Ok(ledger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_is_reproducible() {
        let demand = SyntheticDemand::new(100.0).with_noise(10.0).with_seed(9);
        assert_eq!(demand.monthly_quantities(24).unwrap(), demand.monthly_quantities(24).unwrap());
    }

    #[test]
    fn test_events_preserve_monthly_totals() {
        let demand = SyntheticDemand::new(57.0);
        let start = Period::from_ymd(2024, 1).unwrap();
        let events = demand.events(3, start, 2).unwrap();
        assert_eq!(events.len(), 4);
        assert_eq!(events.iter().map(|e| e.quantity).sum::<u32>(), 114);
    }
}
