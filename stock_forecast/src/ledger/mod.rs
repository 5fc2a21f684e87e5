//! Read-only access to the transaction ledger
//!
//! The pipeline only ever asks a ledger for the catalog and for the events
//! of one product since a given date. [`InMemoryLedger`] backs tests and
//! demos, [`SqliteLedger`] reads the inventory database and [`CsvLedger`]
//! reads a flat export.

use crate::config::TransactionFlow;
use crate::data::{Event, Product};
use crate::error::{ForecastError, Result};
use chrono::{NaiveDate, NaiveDateTime};

pub mod csv_file;
pub mod sqlite;

pub use csv_file::CsvLedger;
pub use sqlite::SqliteLedger;

/// Source of ledger events and product metadata
pub trait LedgerSource {
    /// Events for `product_id` dated on or after `since`, oldest first
    fn fetch_events(&self, product_id: i64, since: NaiveDate) -> Result<Vec<Event>>;

    /// Every product the ledger knows about
    fn fetch_product_catalog(&self) -> Result<Vec<Product>>;
}

impl<T: LedgerSource + ?Sized> LedgerSource for &T {
    fn fetch_events(&self, product_id: i64, since: NaiveDate) -> Result<Vec<Event>> {
        (**self).fetch_events(product_id, since)
    }

    fn fetch_product_catalog(&self) -> Result<Vec<Product>> {
        (**self).fetch_product_catalog()
    }
}

impl<T: LedgerSource + ?Sized> LedgerSource for Box<T> {
    fn fetch_events(&self, product_id: i64, since: NaiveDate) -> Result<Vec<Event>> {
        (**self).fetch_events(product_id, since)
    }

    fn fetch_product_catalog(&self) -> Result<Vec<Product>> {
        (**self).fetch_product_catalog()
    }
}

/// Ledger held in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    products: Vec<Product>,
    outgoing: Vec<Event>,
    incoming: Vec<Event>,
    flow: TransactionFlow,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve events from `flow` instead of outgoing transactions
    pub fn with_flow(mut self, flow: TransactionFlow) -> Self {
        self.flow = flow;
        self
    }

    pub fn add_product(&mut self, product: Product) {
        self.products.retain(|p| p.id != product.id);
        self.products.push(product);
    }

    pub fn record(&mut self, flow: TransactionFlow, event: Event) {
        match flow {
            TransactionFlow::Outgoing => self.outgoing.push(event),
            TransactionFlow::Incoming => self.incoming.push(event),
        }
    }

    pub fn extend<I: IntoIterator<Item = Event>>(&mut self, flow: TransactionFlow, events: I) {
        for event in events {
            self.record(flow, event);
        }
    }

    pub fn len(&self) -> usize {
        self.outgoing.len() + self.incoming.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LedgerSource for InMemoryLedger {
    fn fetch_events(&self, product_id: i64, since: NaiveDate) -> Result<Vec<Event>> {
        let source = match self.flow {
            TransactionFlow::Outgoing => &self.outgoing,
            TransactionFlow::Incoming => &self.incoming,
        };

        let mut events: Vec<Event> = source
            .iter()
            .filter(|e| e.product_id == product_id && e.timestamp.date() >= since)
            .cloned()
            .collect();
        events.sort_by_key(|e| e.timestamp);
        Ok(events)
    }

    fn fetch_product_catalog(&self) -> Result<Vec<Product>> {
        let mut products = self.products.clone();
        products.sort_by_key(|p| p.id);
        Ok(products)
    }
}

const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Parse a ledger timestamp; a bare date is taken as midnight
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime> {
    let raw = raw.trim();
    for format in TIMESTAMP_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(ts);
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| ForecastError::Ledger(format!("Unrecognised timestamp '{}'", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("2024-03-05 14:22:01")]
    #[case("2024-03-05T14:22:01")]
    #[case("2024-03-05 14:22:01.250")]
    #[case("2024-03-05 14:22")]
    #[case(" 2024-03-05 ")]
    fn test_parse_timestamp(#[case] raw: &str) {
        let ts = parse_timestamp(raw).unwrap();
        assert_eq!(ts.date(), NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        assert!(parse_timestamp("05/03/2024").is_err());
    }
}
