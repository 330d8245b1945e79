//! Monthly orchestration: buckets the normalized movement stream by
//! calendar month and asset class, dispatches each pair to the shared
//! calculator and threads the single ledger instance across months in
//! chronological order.

use chrono::Datelike;
use itertools::Itertools;
use std::collections::BTreeMap;
use tracing::{info, warn};

use crate::error::{EngineError, Result};
use crate::ledger::Ledger;
use crate::models::{AssetClass, Movement, MonthlyAssetResult};
use crate::normalizer::normalize;
use crate::reference::BonusPriceSource;
use crate::tax::calculator::compute_month_class;

/// Everything one calculation run produced. Monthly results are write-once
/// outputs for the persistence collaborator; the unresolved tickers are the
/// soft failures recorded instead of thrown.
#[derive(Debug, Clone)]
pub struct CalculationReport {
    pub monthly_results: Vec<MonthlyAssetResult>,
    pub unresolved_tickers: Vec<String>,
}

/// Run the full engine over one account's movement batch.
///
/// The ledger is owned by the caller: pass a fresh one for a full-history
/// run or a seeded one for an incremental (single-month) run. Entries left
/// in it afterwards are the updated positions to persist.
pub fn calculate(
    movements: Vec<Movement>,
    ledger: &mut Ledger,
    bonus_prices: &dyn BonusPriceSource,
) -> Result<CalculationReport> {
    let movements = normalize(movements);
    if movements.is_empty() {
        return Err(EngineError::EmptyInput.into());
    }

    // BTreeMap keyed by (year, month) keeps chronological month order;
    // within a month the normalized order is preserved.
    let mut months: BTreeMap<(i32, u32), Vec<Movement>> = BTreeMap::new();
    for movement in movements {
        months
            .entry((movement.reference_date.year(), movement.reference_date.month()))
            .or_default()
            .push(movement);
    }

    let mut monthly_results = Vec::new();

    for ((year, month), month_movements) in months {
        let by_class = month_movements
            .into_iter()
            .into_group_map_by(|m| m.asset_class);

        // Fixed class order keeps the output deterministic
        for class in AssetClass::ALL {
            let Some(class_movements) = by_class.get(&class) else {
                continue;
            };
            let result =
                compute_month_class(year, month, class, class_movements, ledger, bonus_prices)?;
            monthly_results.push(result);
        }
    }

    let unresolved_tickers: Vec<String> =
        ledger.unresolved_tickers().map(str::to_string).collect();
    if !unresolved_tickers.is_empty() {
        warn!(
            tickers = ?unresolved_tickers,
            "tickers excluded from profit computation; manual average-price entry required"
        );
    }

    info!(
        months = monthly_results.len(),
        open_positions = ledger.entries().len(),
        "calculation finished"
    );

    Ok(CalculationReport {
        monthly_results,
        unresolved_tickers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MovementKind;
    use crate::reference::{NoBonusPrices, StaticBonusPrices};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn movement(
        ticker: &str,
        class: AssetClass,
        kind: MovementKind,
        qty: Decimal,
        price: Decimal,
        date: (i32, u32, u32),
    ) -> Movement {
        Movement {
            ticker: ticker.to_string(),
            issuer: ticker.to_string(),
            asset_class: class,
            kind,
            operation_value: qty * price,
            quantity: qty,
            unit_price: price,
            reference_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            day_traded: false,
        }
    }

    #[test]
    fn test_empty_input_is_an_error() {
        let mut ledger = Ledger::new();
        let err = calculate(vec![], &mut ledger, &NoBonusPrices).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EngineError>(),
            Some(EngineError::EmptyInput)
        ));
    }

    #[test]
    fn test_only_other_kinds_is_an_error_too() {
        let m = movement(
            "PETR4",
            AssetClass::Stock,
            MovementKind::Other,
            dec!(10),
            dec!(10),
            (2023, 1, 2),
        );
        let mut ledger = Ledger::new();
        let err = calculate(vec![m], &mut ledger, &NoBonusPrices).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EngineError>(),
            Some(EngineError::EmptyInput)
        ));
    }

    #[test]
    fn test_ledger_threads_across_months() {
        // Buy in January, sell in February: February's profit is computed
        // against January's average price.
        let movements = vec![
            movement(
                "PETR4",
                AssetClass::Stock,
                MovementKind::Buy,
                dec!(1000),
                dec!(20),
                (2023, 1, 5),
            ),
            movement(
                "PETR4",
                AssetClass::Stock,
                MovementKind::Sell,
                dec!(1000),
                dec!(25),
                (2023, 2, 10),
            ),
        ];
        let mut ledger = Ledger::new();
        let report = calculate(movements, &mut ledger, &NoBonusPrices).unwrap();

        assert_eq!(report.monthly_results.len(), 2);
        let january = &report.monthly_results[0];
        assert_eq!(january.reference, "01/2023");
        assert_eq!(january.total_sold, dec!(0));

        let february = &report.monthly_results[1];
        assert_eq!(february.reference, "02/2023");
        assert_eq!(february.total_sold, dec!(25000));
        assert_eq!(february.swing_trade_profit, dec!(5000));
        assert_eq!(february.tax_owed, dec!(750.00));

        // Full divestment: no position left behind
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_month_buckets_split_by_asset_class() {
        let movements = vec![
            movement(
                "PETR4",
                AssetClass::Stock,
                MovementKind::Buy,
                dec!(10),
                dec!(10),
                (2023, 3, 6),
            ),
            movement(
                "MXRF11",
                AssetClass::Fii,
                MovementKind::Buy,
                dec!(10),
                dec!(10),
                (2023, 3, 6),
            ),
        ];
        let mut ledger = Ledger::new();
        let report = calculate(movements, &mut ledger, &NoBonusPrices).unwrap();

        let classes: Vec<AssetClass> = report
            .monthly_results
            .iter()
            .map(|r| r.asset_class)
            .collect();
        assert_eq!(classes, vec![AssetClass::Stock, AssetClass::Fii]);
    }

    #[test]
    fn test_missing_bonus_price_fails_the_batch() {
        let movements = vec![
            movement(
                "TAEE11",
                AssetClass::Stock,
                MovementKind::Buy,
                dec!(100),
                dec!(30),
                (2023, 4, 3),
            ),
            movement(
                "TAEE11",
                AssetClass::Stock,
                MovementKind::BonusShare,
                dec!(10),
                dec!(0),
                (2023, 4, 20),
            ),
        ];
        let mut ledger = Ledger::new();
        let err = calculate(movements, &mut ledger, &NoBonusPrices).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EngineError>(),
            Some(EngineError::MissingReferenceData { .. })
        ));
    }

    #[test]
    fn test_bonus_price_resolved_from_reference_source() {
        let date = NaiveDate::from_ymd_opt(2023, 4, 20).unwrap();
        let mut prices = StaticBonusPrices::new();
        prices.insert("TAEE11", date, dec!(25));

        let movements = vec![
            movement(
                "TAEE11",
                AssetClass::Stock,
                MovementKind::Buy,
                dec!(100),
                dec!(30),
                (2023, 4, 3),
            ),
            movement(
                "TAEE11",
                AssetClass::Stock,
                MovementKind::BonusShare,
                dec!(10),
                dec!(0),
                (2023, 4, 20),
            ),
        ];
        let mut ledger = Ledger::new();
        calculate(movements, &mut ledger, &prices).unwrap();

        let entry = ledger.get("TAEE11").unwrap();
        assert_eq!(entry.quantity, dec!(110));
        assert_eq!(entry.cost_basis, dec!(3250)); // 3000 + 10 * 25
    }

    #[test]
    fn test_unresolved_tickers_reported_not_thrown() {
        let movements = vec![
            movement(
                "VALE3",
                AssetClass::Stock,
                MovementKind::Sell,
                dec!(10),
                dec!(70),
                (2023, 1, 5),
            ),
            movement(
                "PETR4",
                AssetClass::Stock,
                MovementKind::Buy,
                dec!(10),
                dec!(10),
                (2023, 1, 6),
            ),
        ];
        let mut ledger = Ledger::new();
        let report = calculate(movements, &mut ledger, &NoBonusPrices).unwrap();
        assert_eq!(report.unresolved_tickers, vec!["VALE3".to_string()]);
        assert_eq!(report.monthly_results.len(), 1);
    }
}
