//! File-based input loading for the CLI: movement feeds (JSON or CSV by
//! extension), seed ledgers, bonus-share reference tables and persisted
//! monthly tax records. Decimals travel as strings in JSON.

use anyhow::{anyhow, Context};
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;
use tracing::info;

use crate::error::Result;
use crate::models::{LedgerEntry, Movement};
use crate::reference::{BonusPriceRow, StaticBonusPrices};
use crate::tax::MonthlyTaxRecord;

/// Load a movement feed, dispatching on the file extension
pub fn load_movements(path: &Path) -> Result<Vec<Movement>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    let movements = match extension.as_deref() {
        Some("json") => load_movements_json(path)?,
        Some("csv") => load_movements_csv(path)?,
        _ => return Err(anyhow!("unsupported movement file format: {:?}", path)),
    };

    info!(count = movements.len(), file = %path.display(), "loaded movement feed");
    Ok(movements)
}

fn load_movements_json(path: &Path) -> Result<Vec<Movement>> {
    let file = File::open(path).context(format!("failed to open {:?}", path))?;
    serde_json::from_reader(file).context(format!("failed to parse movements from {:?}", path))
}

fn load_movements_csv(path: &Path) -> Result<Vec<Movement>> {
    let mut reader =
        csv::Reader::from_path(path).context(format!("failed to open {:?}", path))?;
    let mut movements = Vec::new();
    for row in reader.deserialize() {
        let movement: Movement =
            row.context(format!("failed to parse movement row in {:?}", path))?;
        movements.push(movement);
    }
    Ok(movements)
}

/// Load a seed ledger (`{ "TICKER": { average_price, cost_basis, quantity } }`)
/// for incremental runs
pub fn load_seed_ledger(path: &Path) -> Result<BTreeMap<String, LedgerEntry>> {
    let file = File::open(path).context(format!("failed to open {:?}", path))?;
    serde_json::from_reader(file).context(format!("failed to parse seed ledger from {:?}", path))
}

/// Load the bonus-share reference table (list of `{ticker, date, unit_price}`)
pub fn load_bonus_prices(path: &Path) -> Result<StaticBonusPrices> {
    let file = File::open(path).context(format!("failed to open {:?}", path))?;
    let rows: Vec<BonusPriceRow> = serde_json::from_reader(file)
        .context(format!("failed to parse bonus prices from {:?}", path))?;
    Ok(StaticBonusPrices::from_rows(rows))
}

/// Load persisted monthly tax records for DARF assembly
pub fn load_tax_records(path: &Path) -> Result<Vec<MonthlyTaxRecord>> {
    let file = File::open(path).context(format!("failed to open {:?}", path))?;
    serde_json::from_reader(file).context(format!("failed to parse tax records from {:?}", path))
}
