//! Weighted random selection of the next item to present.

use chrono::{DateTime, Utc};
use rand::Rng;

use crate::error::{EngineError, Result};
use crate::progress::ProgressStore;
use crate::types::{CatalogItem, ItemKind, ProgressRecord, SessionFilters};

/// Selection weight for one candidate. The constants are empirical tuning.
pub fn selection_weight(record: &ProgressRecord, only_due: bool, now: DateTime<Utc>) -> u32 {
    let overdue = record.due_at.map_or(true, |due| due < now);

    let base = if only_due {
        if overdue {
            10
        } else {
            0
        }
    } else {
        let due_bonus = if overdue { 3 } else { 0 };
        let fresh_penalty = if record.seen_count < 2 { 1 } else { 0 };
        let recent_wrong_bonus = if record.recently_wrong() { 2 } else { 0 };
        5 + due_bonus + recent_wrong_bonus - fresh_penalty
    };

    let unseen_bonus = if record.seen_count == 0 { 6 } else { 0 };
    base + unseen_bonus
}

/// Pick the next item to present.
///
/// Candidates are filtered by kind, then drawn roulette-wheel style over
/// their weights, walking the pool in catalog order so equal-weight ties
/// resolve deterministically under a fixed RNG seed. A pool whose weights
/// all come out zero (e.g. `only_due` with nothing due) falls back to a
/// uniform draw; an empty pool is an error.
pub fn select_next<'a, R: Rng + ?Sized>(
    items: &'a [CatalogItem],
    store: &ProgressStore,
    filters: &SessionFilters,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Result<&'a CatalogItem> {
    let pool: Vec<&CatalogItem> = items
        .iter()
        .filter(|it| match it.kind {
            ItemKind::Word => filters.include_words,
            ItemKind::Sentence => filters.include_sentences,
        })
        .collect();

    if pool.is_empty() {
        return Err(EngineError::EmptyPool);
    }

    let fresh = ProgressRecord::default();
    let weights: Vec<u32> = pool
        .iter()
        .map(|it| {
            let record = store.get(&it.id).unwrap_or(&fresh);
            selection_weight(record, filters.only_due, now)
        })
        .collect();

    let total: u32 = weights.iter().sum();
    if total == 0 {
        return Ok(pool[rng.gen_range(0..pool.len())]);
    }

    let mut ticket = rng.gen_range(0.0..f64::from(total));
    for (item, weight) in pool.iter().copied().zip(&weights) {
        ticket -= f64::from(*weight);
        if ticket <= 0.0 {
            return Ok(item);
        }
    }
    Ok(pool[pool.len() - 1])
}
