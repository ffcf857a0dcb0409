//! Category-balanced slot allocation
//!
//! A page of `P` slots is split across the `C` non-empty categories:
//! every category gets `P / C`, the first `P % C` categories by ascending id
//! get one more, and no category is asked for more than it holds.

use chrono::{Datelike, NaiveDate};
use rand::Rng;

use crate::domain::category::CategoryCount;

/// Slots one category contributes to a balanced page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotAllocation {
    pub category_id: i32,
    /// Fair share before capping
    pub requested: u32,
    /// `min(requested, product_count)`
    pub granted: u32,
}

pub fn allocate_slots(counts: &[CategoryCount], page_size: u32) -> Vec<SlotAllocation> {
    let mut eligible: Vec<CategoryCount> = counts
        .iter()
        .copied()
        .filter(|c| c.product_count > 0)
        .collect();
    eligible.sort_by_key(|c| c.category_id);
    eligible.dedup_by_key(|c| c.category_id);

    if eligible.is_empty() {
        return Vec::new();
    }

    let categories = eligible.len() as u32;
    let base = page_size / categories;
    let remainder = page_size % categories;

    eligible
        .into_iter()
        .enumerate()
        .map(|(i, c)| {
            let requested = base + u32::from((i as u32) < remainder);
            let granted = (requested as u64).min(c.product_count) as u32;
            SlotAllocation {
                category_id: c.category_id,
                requested,
                granted,
            }
        })
        .collect()
}

/// Seed for "today": the UTC date as the integer `YYYYMMDD`.
pub fn daily_seed(date: NaiveDate) -> u64 {
    date.year() as u64 * 10_000 + date.month() as u64 * 100 + date.day() as u64
}

/// Pick `amount` distinct ids from `ids`.
pub fn draw_without_replacement<R: Rng + ?Sized>(
    rng: &mut R,
    ids: &[i32],
    amount: usize,
) -> Vec<i32> {
    let amount = amount.min(ids.len());
    rand::seq::index::sample(rng, ids.len(), amount)
        .into_iter()
        .map(|i| ids[i])
        .collect()
}
