//! Apurador - Brazilian B3 capital-gains engine
//!
//! This library turns a chronological feed of equity movements (buys,
//! sells, splits, reverse splits, bonus shares) into running average
//! acquisition costs per ticker, realized day-trade/swing-trade profit,
//! monthly tax results per asset class and DARF vouchers with the
//! minimum-payment carry-forward rule.

pub mod error;
pub mod feed;
pub mod ledger;
pub mod models;
pub mod normalizer;
pub mod reference;
pub mod tax;
pub mod utils;
