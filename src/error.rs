//! Error handling for the capital-gains engine
//!
//! Defines the hard-failure taxonomy and establishes a unified Result type
//! using anyhow for context chaining and error propagation. The one soft
//! failure (a sell with no prior acquisition in range) is never raised as
//! an error; it is recorded on the calculation report instead.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// Hard failures of the calculation engine
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("no movements to compute after filtering")]
    EmptyInput,

    #[error("invalid quantity {quantity} for {kind} of {ticker} on {date}")]
    InvalidQuantity {
        ticker: String,
        kind: &'static str,
        date: NaiveDate,
        quantity: Decimal,
    },

    #[error("missing bonus share reference price for {ticker} on {date}")]
    MissingReferenceData { ticker: String, date: NaiveDate },

    #[error("selling {requested} units of {ticker} on {date} but only {held} held")]
    Oversell {
        ticker: String,
        date: NaiveDate,
        requested: Decimal,
        held: Decimal,
    },
}

/// Result type alias for engine operations
pub type Result<T> = anyhow::Result<T>;
