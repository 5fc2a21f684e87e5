//! Flat-file ledger
//!
//! Rows are `product_id,product_name,quantity,timestamp` with a header line.
//! The catalog is the distinct set of products seen in the file.

use super::{parse_timestamp, InMemoryLedger, LedgerSource};
use crate::config::TransactionFlow;
use crate::data::{Event, Product};
use crate::error::Result;
use chrono::NaiveDate;
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct CsvRow {
    product_id: i64,
    product_name: String,
    quantity: u32,
    timestamp: String,
}

/// Ledger loaded from a CSV export
#[derive(Debug, Clone)]
pub struct CsvLedger {
    inner: InMemoryLedger,
}

impl CsvLedger {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut inner = InMemoryLedger::new();
        let mut seen: Vec<i64> = Vec::new();
        for row in reader.deserialize() {
            let row: CsvRow = row?;
            if !seen.contains(&row.product_id) {
                seen.push(row.product_id);
                inner.add_product(Product::new(row.product_id, row.product_name));
            }
            let timestamp = parse_timestamp(&row.timestamp)?;
            inner.record(
                TransactionFlow::Outgoing,
                Event::new(row.product_id, row.quantity, timestamp),
            );
        }

        Ok(Self { inner })
    }

    /// Number of events loaded
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl LedgerSource for CsvLedger {
    fn fetch_events(&self, product_id: i64, since: NaiveDate) -> Result<Vec<Event>> {
        self.inner.fetch_events(product_id, since)
    }

    fn fetch_product_catalog(&self) -> Result<Vec<Product>> {
        self.inner.fetch_product_catalog()
    }
}
