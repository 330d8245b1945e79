//! Bonus-share reference prices. The B3 feed reports how many bonus shares
//! were credited but never their unit value; the value comes from an
//! external per-(ticker, date) reference table resolved by the caller.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;

/// Lookup for the unit value of a bonus-share event
pub trait BonusPriceSource {
    fn unit_price(&self, ticker: &str, date: NaiveDate) -> Option<Decimal>;
}

/// Map-backed source, loadable from a JSON reference table
#[derive(Debug, Default, Clone)]
pub struct StaticBonusPrices {
    prices: HashMap<(String, NaiveDate), Decimal>,
}

/// One row of the JSON reference table
#[derive(Debug, Clone, Deserialize)]
pub struct BonusPriceRow {
    pub ticker: String,
    pub date: NaiveDate,
    pub unit_price: Decimal,
}

impl StaticBonusPrices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, ticker: &str, date: NaiveDate, unit_price: Decimal) {
        self.prices.insert((ticker.to_string(), date), unit_price);
    }

    pub fn from_rows(rows: Vec<BonusPriceRow>) -> Self {
        let mut source = Self::new();
        for row in rows {
            source.insert(&row.ticker, row.date, row.unit_price);
        }
        source
    }
}

impl BonusPriceSource for StaticBonusPrices {
    fn unit_price(&self, ticker: &str, date: NaiveDate) -> Option<Decimal> {
        self.prices.get(&(ticker.to_string(), date)).copied()
    }
}

/// Source with no data; every bonus-share event fails the batch
#[derive(Debug, Default, Clone, Copy)]
pub struct NoBonusPrices;

impl BonusPriceSource for NoBonusPrices {
    fn unit_price(&self, _ticker: &str, _date: NaiveDate) -> Option<Decimal> {
        None
    }
}
