// src/aggregate.rs
//! Pure merge/rank logic over already-filtered items. No I/O.
//!
//! Batch-level dedup is separate from the ledger on purpose: the ledger
//! answers "seen in an earlier run", this module answers "seen twice within
//! this run" (e.g. the same release surfaced by two search passes).

use std::collections::HashSet;

use crate::model::ContentItem;

/// Cap for the cross-entity "latest releases" view.
pub const LATEST_VIEW_CAP: usize = 10;

/// Drop repeated ids, keeping the first occurrence (input is newest-first).
pub fn dedup_by_id(items: Vec<ContentItem>) -> Vec<ContentItem> {
    let mut seen = HashSet::with_capacity(items.len());
    items
        .into_iter()
        .filter(|it| seen.insert(it.id.clone()))
        .collect()
}

/// Merge per-entity batches into one ranked view: normalized date descending,
/// deduplicated by id, truncated to `cap`. Date strings from both sources
/// share the `YYYY-MM-DD HH:MM:SS` shape, so plain string order is date order.
pub fn latest_view(batches: &[Vec<ContentItem>], cap: usize) -> Vec<ContentItem> {
    let mut merged: Vec<ContentItem> = batches.iter().flatten().cloned().collect();
    merged.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    let mut out = dedup_by_id(merged);
    out.truncate(cap);
    out
}
