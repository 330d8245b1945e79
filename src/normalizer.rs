//! Movement normalizer: filters the raw feed down to the five recognized
//! movement kinds, puts it in deterministic chronological order and marks
//! same-day buy/sell pairs as day-trades.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use tracing::debug;

use crate::models::{Movement, MovementKind};

/// Filter, order and day-trade-mark a raw movement batch.
///
/// Ordering is an explicit composite key `(reference_date, kind rank)`:
/// on the same date, buys and corporate actions always precede sells, so a
/// same-day acquisition is already in the ledger when its sale is matched.
pub fn normalize(movements: Vec<Movement>) -> Vec<Movement> {
    let total = movements.len();
    let mut kept: Vec<Movement> = movements
        .into_iter()
        .filter(|m| m.kind != MovementKind::Other)
        .collect();

    if kept.len() < total {
        debug!(
            discarded = total - kept.len(),
            "discarded unrecognized movement kinds"
        );
    }

    kept.sort_by_key(|m| (m.reference_date, m.kind.sort_rank()));
    mark_day_trades(&mut kept);
    kept
}

/// A sell is a day-trade when the same ticker has a buy dated the same day.
/// The flag is assigned on every sell, overwriting whatever the raw feed
/// carried; the classification comes from the batch itself, never the input.
fn mark_day_trades(movements: &mut [Movement]) {
    let mut buy_dates: HashMap<String, HashSet<NaiveDate>> = HashMap::new();
    for m in movements.iter() {
        if m.kind == MovementKind::Buy {
            buy_dates
                .entry(m.ticker.clone())
                .or_default()
                .insert(m.reference_date);
        }
    }

    for m in movements.iter_mut() {
        if m.kind == MovementKind::Sell {
            m.day_traded = buy_dates
                .get(&m.ticker)
                .is_some_and(|dates| dates.contains(&m.reference_date));
        }
    }
}
