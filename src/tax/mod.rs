// Tax module - monthly capital-gains calculation and DARF assembly

pub mod calculator;
pub mod darf;
pub mod orchestrator;

pub use calculator::{compute_month_class, config_for, AssetTaxConfig};
pub use darf::{
    assemble_darf, format_darf_voucher, minimum_darf_amount, months_below_minimum, CarriedMonth,
    DarfVoucher, MonthlyTaxRecord, DARF_CODE_EQUITY,
};
pub use orchestrator::{calculate, CalculationReport};
