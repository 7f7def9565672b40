// src/subscriptions.rs
//! Subscription list access.
//!
//! The poll run reads the list once and never writes it; `register_all` is
//! the append half used by the registration bin. Rows with an empty external
//! ref are skipped on read — a half-registered row must not break the run.

use anyhow::{Context, Result};

use crate::model::{SourceKind, Subscription};
use crate::store::{record, Record, TableStore};

pub const SUBSCRIPTIONS_TABLE: &str = "performers";

fn from_record(row: &Record) -> Option<Subscription> {
    let name = row.get("name").cloned().unwrap_or_default();
    let external_ref = row.get("external_ref").cloned().unwrap_or_default();
    if name.is_empty() || external_ref.is_empty() {
        return None;
    }
    let source = row
        .get("source")
        .and_then(|s| s.parse::<SourceKind>().ok())
        .unwrap_or(SourceKind::Catalog);
    Some(Subscription {
        display_name: name,
        external_ref,
        source,
        group_label: row.get("group").cloned().unwrap_or_default(),
    })
}

fn to_record(sub: &Subscription) -> Record {
    record(&[
        ("name", &sub.display_name),
        ("external_ref", &sub.external_ref),
        ("source", sub.source.as_str()),
        ("group", &sub.group_label),
    ])
}

/// Read the full subscription list, preserving row order.
pub async fn load(store: &dyn TableStore) -> Result<Vec<Subscription>> {
    let rows = store
        .read_all(SUBSCRIPTIONS_TABLE)
        .await
        .context("reading subscription list")?;
    Ok(rows.iter().filter_map(from_record).collect())
}

/// Append newly registered subscriptions.
pub async fn register_all(store: &dyn TableStore, subs: &[Subscription]) -> Result<()> {
    if subs.is_empty() {
        return Ok(());
    }
    store
        .append_rows(SUBSCRIPTIONS_TABLE, subs.iter().map(to_record).collect())
        .await
        .context("appending subscriptions")
}
