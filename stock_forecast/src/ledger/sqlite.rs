//! SQLite-backed ledger

use super::{parse_timestamp, LedgerSource};
use crate::config::TransactionFlow;
use crate::data::{Event, Product};
use crate::error::{ForecastError, Result};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS products (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    stock INTEGER NOT NULL DEFAULT 0,
    unit TEXT NOT NULL DEFAULT 'pcs'
);
CREATE TABLE IF NOT EXISTS incoming_transactions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    product_id INTEGER NOT NULL REFERENCES products(id),
    quantity INTEGER NOT NULL,
    transacted_at TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS outgoing_transactions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    product_id INTEGER NOT NULL REFERENCES products(id),
    quantity INTEGER NOT NULL,
    transacted_at TEXT NOT NULL
);
";

fn table(flow: TransactionFlow) -> &'static str {
    match flow {
        TransactionFlow::Outgoing => "outgoing_transactions",
        TransactionFlow::Incoming => "incoming_transactions",
    }
}

/// Ledger reading the inventory database
#[derive(Debug)]
pub struct SqliteLedger {
    conn: Connection,
    flow: TransactionFlow,
}

impl SqliteLedger {
    pub fn open<P: AsRef<Path>>(path: P, flow: TransactionFlow) -> Result<Self> {
        let conn = Connection::open(path)?;
        Ok(Self { conn, flow })
    }

    pub fn open_in_memory(flow: TransactionFlow) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn, flow })
    }

    /// Create the products and transaction tables if they are missing
    pub fn create_schema(&self) -> Result<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Insert a product and return its id
    pub fn insert_product(&self, name: &str, stock: i64, unit: &str) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO products (name, stock, unit) VALUES (?1, ?2, ?3)",
            params![name, stock, unit],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Record a transaction and return its id.
    ///
    /// The product's stock moves by `quantity` in the same transaction:
    /// incoming adds, outgoing subtracts.
    pub fn record_transaction(
        &self,
        flow: TransactionFlow,
        product_id: i64,
        quantity: u32,
        at: NaiveDateTime,
    ) -> Result<i64> {
        let delta = match flow {
            TransactionFlow::Incoming => i64::from(quantity),
            TransactionFlow::Outgoing => -i64::from(quantity),
        };
        let tx = self.conn.unchecked_transaction()?;

        let updated = tx.execute(
            "UPDATE products SET stock = stock + ?1 WHERE id = ?2",
            params![delta, product_id],
        )?;
        if updated == 0 {
            return Err(ForecastError::UnknownProduct(product_id));
        }

        let sql = format!(
            "INSERT INTO {} (product_id, quantity, transacted_at) VALUES (?1, ?2, ?3)",
            table(flow)
        );
        tx.execute(
            &sql,
            params![
                product_id,
                i64::from(quantity),
                at.format("%Y-%m-%d %H:%M:%S").to_string()
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(id)
    }

    /// Current stock level of a product
    pub fn stock(&self, product_id: i64) -> Result<i64> {
        self.conn
            .query_row(
                "SELECT stock FROM products WHERE id = ?1",
                params![product_id],
                |row| row.get(0),
            )
            .optional()?
            .ok_or(ForecastError::UnknownProduct(product_id))
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl LedgerSource for SqliteLedger {
    fn fetch_events(&self, product_id: i64, since: NaiveDate) -> Result<Vec<Event>> {
        // ISO timestamps order correctly as text against a bare date
        let sql = format!(
            "SELECT quantity, transacted_at FROM {} \
             WHERE product_id = ?1 AND transacted_at >= ?2 \
             ORDER BY transacted_at, id",
            table(self.flow)
        );
        let since = since.format("%Y-%m-%d").to_string();
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![product_id, since], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut events = Vec::new();
        for row in rows {
            let (quantity, raw_ts) = row?;
            let timestamp = parse_timestamp(&raw_ts)?;
            let quantity = u32::try_from(quantity).map_err(|_| {
                ForecastError::Ledger(format!(
                    "Quantity {} for product {} is out of range",
                    quantity, product_id
                ))
            })?;
            events.push(Event::new(product_id, quantity, timestamp));
        }

        events.sort_by_key(|e| e.timestamp);
        Ok(events)
    }

    fn fetch_product_catalog(&self) -> Result<Vec<Product>> {
        let mut stmt = self.conn.prepare("SELECT id, name FROM products ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(Product {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?;

        rows.map(|r| r.map_err(ForecastError::from)).collect()
    }
}
