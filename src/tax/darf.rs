//! DARF assembly and the minimum-payment carry-forward rule: a month whose
//! aggregated tax stays under R$10 cannot be paid on its own, so it rides
//! along with a later month until the combined amount reaches the minimum.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::Result;
use crate::models::AssetClass;
use crate::utils::{format_currency, month_name};

/// Revenue code for capital gains on exchange-traded assets
pub const DARF_CODE_EQUITY: &str = "6015";

/// The smallest amount a DARF can be issued for
pub fn minimum_darf_amount() -> Decimal {
    Decimal::TEN
}

/// One persisted monthly tax figure, as the records store reports it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyTaxRecord {
    pub year: i32,
    pub month: u32,
    pub asset_class: AssetClass,
    pub tax_owed: Decimal,
    pub paid: bool,
}

/// A prior unpaid month whose tax rides along with the target voucher
#[derive(Debug, Clone, PartialEq)]
pub struct CarriedMonth {
    pub year: i32,
    pub month: u32,
    pub tax_owed: Decimal,
}

/// A payable tax voucher for one target month, possibly including
/// carried-forward amounts from earlier sub-minimum months
#[derive(Debug, Clone)]
pub struct DarfVoucher {
    pub year: i32,
    pub month: u32,
    pub darf_code: String,
    pub amount: Decimal,
    pub carried: Vec<CarriedMonth>,
    pub due_date: NaiveDate,
}

/// Prior unpaid months whose aggregated tax sits under the DARF minimum.
///
/// Records are aggregated per month across asset classes; months at or
/// above the minimum are payable on their own and excluded, as are months
/// with nothing owed. Result is in chronological order.
pub fn months_below_minimum(
    records: &[MonthlyTaxRecord],
    target_year: i32,
    target_month: u32,
) -> Vec<CarriedMonth> {
    let minimum = minimum_darf_amount();

    let mut totals: BTreeMap<(i32, u32), Decimal> = BTreeMap::new();
    for record in records {
        if record.paid {
            continue;
        }
        if (record.year, record.month) >= (target_year, target_month) {
            continue;
        }
        *totals.entry((record.year, record.month)).or_default() += record.tax_owed;
    }

    totals
        .into_iter()
        .filter(|(_, total)| *total > Decimal::ZERO && *total < minimum)
        .map(|((year, month), tax_owed)| CarriedMonth {
            year,
            month,
            tax_owed,
        })
        .collect()
}

/// Assemble the payable voucher for a target month.
///
/// The voucher combines the target month's unpaid tax with every prior
/// sub-minimum unpaid month. Returns `None` while the combined amount is
/// still under the minimum (nothing payable yet). Payment state itself is
/// persistence and stays untouched.
pub fn assemble_darf(
    records: &[MonthlyTaxRecord],
    target_year: i32,
    target_month: u32,
) -> Result<Option<DarfVoucher>> {
    let target_tax: Decimal = records
        .iter()
        .filter(|r| !r.paid && (r.year, r.month) == (target_year, target_month))
        .map(|r| r.tax_owed)
        .sum();

    let carried = months_below_minimum(records, target_year, target_month);
    let carried_total: Decimal = carried.iter().map(|m| m.tax_owed).sum();
    let amount = target_tax + carried_total;

    if amount < minimum_darf_amount() {
        return Ok(None);
    }

    Ok(Some(DarfVoucher {
        year: target_year,
        month: target_month,
        darf_code: DARF_CODE_EQUITY.to_string(),
        amount,
        carried,
        due_date: darf_due_date(target_year, target_month)?,
    }))
}

/// DARF due date: last day of the month following the computation month
/// (business-day adjustment is left to the issuing collaborator).
fn darf_due_date(year: i32, month: u32) -> Result<NaiveDate> {
    let (due_year, due_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };

    let first_of_next = if due_month == 12 {
        NaiveDate::from_ymd_opt(due_year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(due_year, due_month + 1, 1)
    };

    first_of_next
        .and_then(|d| d.pred_opt())
        .ok_or_else(|| anyhow::anyhow!("invalid due date for {}/{}", month, year))
}

/// Format a voucher for display
pub fn format_darf_voucher(voucher: &DarfVoucher) -> String {
    let mut output = format!(
        "DARF {code} referente a {month}/{year}\n  Vencimento: {due}\n  Valor: {amount}",
        code = voucher.darf_code,
        month = month_name(voucher.month),
        year = voucher.year,
        due = voucher.due_date.format("%d/%m/%Y"),
        amount = format_currency(voucher.amount)
    );

    if !voucher.carried.is_empty() {
        output.push_str("\n  Meses acumulados:");
        for carried in &voucher.carried {
            output.push_str(&format!(
                "\n    {:02}/{}: {}",
                carried.month,
                carried.year,
                format_currency(carried.tax_owed)
            ));
        }
    }

    output
}
