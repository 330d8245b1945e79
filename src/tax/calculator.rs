//! Asset-class tax calculation. One shared routine parameterized by the
//! class configuration (rates and optional sale-value exemption) replaces
//! a per-class calculator family: the class maps to its config through a
//! pure lookup, with no shared mutable state.

use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::str::FromStr;
use tracing::debug;

use crate::error::Result;
use crate::ledger::{Ledger, LedgerEffect};
use crate::models::{month_reference, AssetClass, Movement, MovementKind, MonthlyAssetResult, OperationRecord};
use crate::reference::BonusPriceSource;
use crate::utils::weekday_name;

/// Rates and exemption for one asset class in one month
#[derive(Debug, Clone, PartialEq)]
pub struct AssetTaxConfig {
    pub swing_rate: Decimal,
    pub day_rate: Decimal,
    /// Monthly total-sales value under which swing-trade profit is exempt.
    /// Only Stocks carries one (R$20,000).
    pub exemption_threshold: Option<Decimal>,
}

/// Day-trade profit is taxed at a flat 20% for every class
fn day_trade_rate() -> Decimal {
    Decimal::from_str("0.20").unwrap()
}

/// Tax configuration for an asset class
pub fn config_for(class: AssetClass) -> AssetTaxConfig {
    let fifteen = Decimal::from_str("0.15").unwrap();
    match class {
        AssetClass::Stock => AssetTaxConfig {
            swing_rate: fifteen,
            day_rate: day_trade_rate(),
            exemption_threshold: Some(Decimal::from(20_000)),
        },
        AssetClass::Fii => AssetTaxConfig {
            swing_rate: day_trade_rate(), // FII swing trades pay 20%
            day_rate: day_trade_rate(),
            exemption_threshold: None,
        },
        AssetClass::Etf | AssetClass::Bdr | AssetClass::Gold | AssetClass::InvestmentFund => {
            AssetTaxConfig {
                swing_rate: fifteen,
                day_rate: day_trade_rate(),
                exemption_threshold: None,
            }
        }
    }
}

/// Per-ticker running profit, split by trade style. A sale contributes to
/// exactly one of the two sums, never both.
#[derive(Debug, Default, Clone)]
struct TickerBucket {
    swing_trade: Decimal,
    day_trade: Decimal,
}

/// Compute the monthly tax result for one asset class.
///
/// `movements` must be the normalized movements of this (month, class)
/// pair in chronological order; `ledger` carries position state from
/// earlier months and leaves this month's state behind for later ones.
pub fn compute_month_class(
    year: i32,
    month: u32,
    class: AssetClass,
    movements: &[Movement],
    ledger: &mut Ledger,
    bonus_prices: &dyn BonusPriceSource,
) -> Result<MonthlyAssetResult> {
    let config = config_for(class);

    let mut buckets: BTreeMap<String, TickerBucket> = BTreeMap::new();
    let mut operations: Vec<OperationRecord> = Vec::new();
    let mut total_sold = Decimal::ZERO;
    let mut running_profit = Decimal::ZERO;

    for movement in movements {
        let bonus_unit_price = match movement.kind {
            MovementKind::BonusShare => {
                bonus_prices.unit_price(&movement.ticker, movement.reference_date)
            }
            _ => None,
        };

        let effect = ledger.apply(movement, bonus_unit_price)?;

        match effect {
            LedgerEffect::Sale(sale) => {
                let bucket = buckets.entry(sale.ticker.clone()).or_default();
                if sale.day_trade {
                    bucket.day_trade += sale.profit;
                } else {
                    bucket.swing_trade += sale.profit;
                }
                total_sold += sale.sale_value;
                running_profit += sale.profit;
            }
            LedgerEffect::Position => {}
            LedgerEffect::Skipped | LedgerEffect::Ignored => continue,
        }

        operations.push(OperationRecord {
            date: movement.reference_date,
            day_of_week: weekday_name(movement.reference_date).to_string(),
            ticker: movement.ticker.clone(),
            issuer: movement.issuer.clone(),
            kind: movement.kind,
            quantity: movement.quantity,
            value: movement.operation_value,
            running_profit,
        });
    }

    let swing_profit: Decimal = buckets.values().map(|b| b.swing_trade).sum();
    let day_profit: Decimal = buckets.values().map(|b| b.day_trade).sum();

    // The two components are independent: a loss in one bucket never
    // offsets a profit in the other, and a loss never taxes negatively.
    let day_tax = if day_profit > Decimal::ZERO {
        day_profit * config.day_rate
    } else {
        Decimal::ZERO
    };

    let swing_exempt = config
        .exemption_threshold
        .is_some_and(|threshold| total_sold < threshold);
    let swing_tax = if swing_profit > Decimal::ZERO && !swing_exempt {
        swing_profit * config.swing_rate
    } else {
        Decimal::ZERO
    };

    let tax_owed = (day_tax + swing_tax).round_dp(2);

    debug!(
        class = class.as_str(),
        reference = %month_reference(year, month),
        %total_sold,
        %swing_profit,
        %day_profit,
        %tax_owed,
        "computed monthly asset result"
    );

    Ok(MonthlyAssetResult {
        year,
        month,
        reference: month_reference(year, month),
        asset_class: class,
        total_sold,
        swing_trade_profit: swing_profit,
        day_trade_profit: day_profit,
        tax_owed,
        operations: serde_json::to_string(&operations)?,
    })
}
