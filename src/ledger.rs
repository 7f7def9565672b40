// src/ledger.rs
//! Append-only record of already-notified items — the deduplication
//! authority across runs.
//!
//! `known_ids` is read once at run start and every decision in that run uses
//! the snapshot; rows are only ever appended. If the append fails after a
//! notification went out, the next run re-notifies the same item: delivery is
//! at-least-once, never silently lost.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::sync::Arc;

use crate::model::ContentItem;
use crate::store::{record, Record, TableStore};

pub const LEDGER_TABLE: &str = "sent_works";

#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEntry {
    pub item_id: String,
    pub title: String,
    /// Coarse release day, `YYYY-MM-DD`.
    pub date: String,
    pub entity: String,
}

impl LedgerEntry {
    pub fn from_item(item: &ContentItem) -> Self {
        Self {
            item_id: item.id.clone(),
            title: item.title.clone(),
            date: item.release_day().to_string(),
            entity: item.entity.clone(),
        }
    }

    fn to_record(&self) -> Record {
        record(&[
            ("item_id", &self.item_id),
            ("title", &self.title),
            ("date", &self.date),
            ("entity", &self.entity),
        ])
    }
}

pub struct Ledger {
    store: Arc<dyn TableStore>,
}

impl Ledger {
    pub fn new(store: Arc<dyn TableStore>) -> Self {
        Self { store }
    }

    /// Snapshot of every item id ever recorded. Called once per run.
    pub async fn known_ids(&self) -> Result<HashSet<String>> {
        let rows = self
            .store
            .read_all(LEDGER_TABLE)
            .await
            .context("reading notification ledger")?;
        Ok(rows
            .into_iter()
            .filter_map(|r| r.get("item_id").cloned())
            .filter(|id| !id.is_empty())
            .collect())
    }

    /// Append-only; rows are never updated or deleted here.
    pub async fn append(&self, entries: &[LedgerEntry]) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }
        self.store
            .append_rows(LEDGER_TABLE, entries.iter().map(LedgerEntry::to_record).collect())
            .await
            .context("appending to notification ledger")
    }
}
