//! Average-cost ledger: per-ticker position state threaded through the
//! whole calculation. Every buy, sell and corporate action mutates the
//! position; every sell realizes profit against the running average price
//! and classifies it as day-trade or swing-trade.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

use crate::error::{EngineError, Result};
use crate::models::{LedgerEntry, Movement, MovementKind};

/// Profit realized by one sell, already classified by trade style
#[derive(Debug, Clone, PartialEq)]
pub struct RealizedSale {
    pub ticker: String,
    pub date: NaiveDate,
    pub profit: Decimal,
    pub sale_value: Decimal,
    pub day_trade: bool,
}

/// What applying one movement did to the ledger
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerEffect {
    /// Position created or adjusted (buy or corporate action)
    Position,
    /// Sell matched against the position; profit realized
    Sale(RealizedSale),
    /// Movement belongs to a ticker flagged as acquired before the feed
    /// starts; excluded from profit computation for the rest of the batch
    Skipped,
    /// Corporate action for a ticker with no open position
    Ignored,
}

/// Explicit arena of per-ticker positions, owned by the caller and passed
/// by mutable reference through the orchestrator so state accumulated in
/// earlier months is visible to later months.
#[derive(Debug, Default, Clone)]
pub struct Ledger {
    entries: BTreeMap<String, LedgerEntry>,
    unresolved: BTreeSet<String>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a ledger pre-loaded with positions from an earlier run, for
    /// incremental (single-month) calculations.
    pub fn seeded(entries: BTreeMap<String, LedgerEntry>) -> Self {
        Self {
            entries,
            unresolved: BTreeSet::new(),
        }
    }

    pub fn get(&self, ticker: &str) -> Option<&LedgerEntry> {
        self.entries.get(ticker)
    }

    pub fn entries(&self) -> &BTreeMap<String, LedgerEntry> {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Tickers sold without a prior acquisition in the feed's range.
    /// They need a manual average-price entry before they can be computed.
    pub fn unresolved_tickers(&self) -> impl Iterator<Item = &str> {
        self.unresolved.iter().map(String::as_str)
    }

    pub fn has_unresolved(&self) -> bool {
        !self.unresolved.is_empty()
    }

    /// Apply one movement to the position state.
    ///
    /// `bonus_unit_price` must carry the externally resolved unit value for
    /// `BonusShare` movements (the feed never reports it); it is ignored
    /// for every other kind.
    pub fn apply(
        &mut self,
        movement: &Movement,
        bonus_unit_price: Option<Decimal>,
    ) -> Result<LedgerEffect> {
        if self.unresolved.contains(&movement.ticker) {
            debug!(
                ticker = %movement.ticker,
                kind = movement.kind.as_str(),
                "skipping movement for ticker acquired before feed range"
            );
            return Ok(LedgerEffect::Skipped);
        }

        // Quantities must stay positive: a zero-share buy or a grouping
        // down to zero shares would zero the divisor of the average price.
        if movement.kind != MovementKind::Other && movement.quantity <= Decimal::ZERO {
            return Err(EngineError::InvalidQuantity {
                ticker: movement.ticker.clone(),
                kind: movement.kind.as_str(),
                date: movement.reference_date,
                quantity: movement.quantity,
            }
            .into());
        }

        match movement.kind {
            MovementKind::Buy => {
                self.apply_buy(movement);
                Ok(LedgerEffect::Position)
            }
            MovementKind::Sell => self.apply_sell(movement),
            MovementKind::Split => Ok(self.apply_split(movement)),
            MovementKind::ReverseSplit => Ok(self.apply_reverse_split(movement)),
            MovementKind::BonusShare => self.apply_bonus(movement, bonus_unit_price),
            MovementKind::Other => Ok(LedgerEffect::Ignored),
        }
    }

    fn apply_buy(&mut self, movement: &Movement) {
        let entry = self
            .entries
            .entry(movement.ticker.clone())
            .or_insert(LedgerEntry {
                average_price: Decimal::ZERO,
                cost_basis: Decimal::ZERO,
                quantity: Decimal::ZERO,
            });

        entry.cost_basis += movement.operation_value;
        entry.quantity += movement.quantity;
        entry.average_price = entry.cost_basis / entry.quantity;
    }

    fn apply_sell(&mut self, movement: &Movement) -> Result<LedgerEffect> {
        let Some(entry) = self.entries.get_mut(&movement.ticker) else {
            // Acquired before the earliest data the feed covers. Soft
            // failure: flag the ticker and carry on with the batch.
            warn!(
                ticker = %movement.ticker,
                date = %movement.reference_date,
                "sell without prior buy in range; excluding ticker from this batch"
            );
            self.unresolved.insert(movement.ticker.clone());
            return Ok(LedgerEffect::Skipped);
        };

        if movement.quantity > entry.quantity {
            return Err(EngineError::Oversell {
                ticker: movement.ticker.clone(),
                date: movement.reference_date,
                requested: movement.quantity,
                held: entry.quantity,
            }
            .into());
        }

        let profit_per_share = movement.unit_price - entry.average_price;
        let profit = profit_per_share * movement.quantity;

        entry.cost_basis -= movement.operation_value;
        entry.quantity -= movement.quantity;

        if entry.quantity.is_zero() {
            // Full divestment: the next buy starts a fresh position
            self.entries.remove(&movement.ticker);
        } else {
            entry.average_price = entry.cost_basis / entry.quantity;
        }

        Ok(LedgerEffect::Sale(RealizedSale {
            ticker: movement.ticker.clone(),
            date: movement.reference_date,
            profit,
            sale_value: movement.operation_value,
            day_trade: movement.day_traded,
        }))
    }

    /// The feed reports the number of shares *added* by the split
    fn apply_split(&mut self, movement: &Movement) -> LedgerEffect {
        let Some(entry) = self.entries.get_mut(&movement.ticker) else {
            debug!(ticker = %movement.ticker, "split for ticker with no open position");
            return LedgerEffect::Ignored;
        };

        entry.quantity += movement.quantity;
        entry.average_price = entry.cost_basis / entry.quantity;
        LedgerEffect::Position
    }

    /// The feed reports the *new absolute* quantity after grouping
    fn apply_reverse_split(&mut self, movement: &Movement) -> LedgerEffect {
        let Some(entry) = self.entries.get_mut(&movement.ticker) else {
            debug!(ticker = %movement.ticker, "reverse split for ticker with no open position");
            return LedgerEffect::Ignored;
        };

        entry.quantity = movement.quantity;
        entry.average_price = entry.cost_basis / entry.quantity;
        LedgerEffect::Position
    }

    fn apply_bonus(
        &mut self,
        movement: &Movement,
        bonus_unit_price: Option<Decimal>,
    ) -> Result<LedgerEffect> {
        let unit_price = bonus_unit_price.ok_or_else(|| EngineError::MissingReferenceData {
            ticker: movement.ticker.clone(),
            date: movement.reference_date,
        })?;

        // Bonus shares arrive even for tickers with no open position
        let entry = self
            .entries
            .entry(movement.ticker.clone())
            .or_insert(LedgerEntry {
                average_price: Decimal::ZERO,
                cost_basis: Decimal::ZERO,
                quantity: Decimal::ZERO,
            });

        entry.cost_basis += unit_price * movement.quantity;
        entry.quantity += movement.quantity;
        entry.average_price = entry.cost_basis / entry.quantity;
        Ok(LedgerEffect::Position)
    }
}
