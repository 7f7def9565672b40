// src/orchestrator.rs
//! Per-run driver: fetch → filter → ledger diff → notify → record, one
//! subscribed entity at a time.
//!
//! A single entity's outage never aborts the run; only the subscription read
//! and the ledger snapshot are fatal preconditions. The ledger is written
//! after the notification attempt, which makes delivery at-least-once: a
//! crash between the two may repeat a notification on the next run, but a
//! rerun against an unchanged upstream finds nothing new.

use anyhow::{Context, Result};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge};
use once_cell::sync::OnceCell;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use crate::aggregate::{self, LATEST_VIEW_CAP};
use crate::cache::FetchCache;
use crate::error::RadarError;
use crate::filter::{self, MAX_ITEMS_PER_ENTITY};
use crate::ledger::{Ledger, LedgerEntry};
use crate::model::{ContentItem, SourceKind, Subscription};
use crate::notify::{Notifier, ReleaseBatch};
use crate::sources::SourceAdapter;
use crate::store::TableStore;
use crate::subscriptions;

/// One-time metrics registration (so series show up for any installed recorder).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("poll_runs_total", "Completed poll runs.");
        describe_counter!("poll_entities_total", "Entities processed across runs.");
        describe_counter!(
            "poll_failures_total",
            "Per-entity failures by category (source/ledger/sink)."
        );
        describe_counter!("poll_new_items_total", "Items first seen this run.");
        describe_counter!("notify_batches_total", "Notification batches delivered.");
        describe_counter!("fetch_cache_hits_total", "Fetches served from the TTL cache.");
        describe_counter!("source_items_total", "Raw items parsed per source.");
        describe_histogram!("source_parse_ms", "Source parse time in milliseconds.");
        describe_gauge!("poll_last_run_ts", "Unix ts when the last run finished.");
        describe_gauge!("fetch_cache_ttl_secs", "Configured fetch cache TTL.");
    });
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    /// How many raw items to request per entity.
    pub fetch_hits: usize,
    /// Filter cap used for the notification diff. Deliberately larger than
    /// the display cap so a release burst is not silently dropped.
    pub notify_scan_cap: usize,
    /// Filter cap for the per-entity display strip.
    pub display_cap: usize,
    pub require_sample_media: bool,
    /// Courtesy pause between entities; kindness to the upstream API, not a
    /// correctness requirement.
    pub pace: Duration,
    pub latest_cap: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            fetch_hits: 30,
            notify_scan_cap: 30,
            display_cap: MAX_ITEMS_PER_ENTITY,
            require_sample_media: false,
            pace: Duration::from_secs(1),
            latest_cap: LATEST_VIEW_CAP,
        }
    }
}

#[derive(Debug, Default)]
pub struct RunReport {
    pub entities: usize,
    pub skipped_entities: usize,
    pub new_items: usize,
    pub notified_batches: usize,
    pub sink_failures: usize,
    pub ledger_failures: usize,
    /// Cross-entity, cross-source ranked view of this run's filtered items.
    pub latest: Vec<ContentItem>,
}

pub struct Orchestrator {
    catalog: Box<dyn SourceAdapter>,
    blog: Box<dyn SourceAdapter>,
    sink: Box<dyn Notifier>,
    store: Arc<dyn TableStore>,
    cache: FetchCache,
    opts: RunOptions,
}

impl Orchestrator {
    pub fn new(
        catalog: Box<dyn SourceAdapter>,
        blog: Box<dyn SourceAdapter>,
        sink: Box<dyn Notifier>,
        store: Arc<dyn TableStore>,
        cache: FetchCache,
        opts: RunOptions,
    ) -> Self {
        Self {
            catalog,
            blog,
            sink,
            store,
            cache,
            opts,
        }
    }

    fn adapter_for(&self, kind: SourceKind) -> &dyn SourceAdapter {
        match kind {
            SourceKind::Catalog => self.catalog.as_ref(),
            SourceKind::Blog => self.blog.as_ref(),
        }
    }

    // Cache drží surové položky; filtr běží vždy znovu.
    async fn fetch_cached(&self, sub: &Subscription) -> Result<Vec<ContentItem>> {
        if let Some(items) = self.cache.get(sub.source, &sub.external_ref) {
            counter!("fetch_cache_hits_total").increment(1);
            return Ok(items);
        }
        let items = self
            .adapter_for(sub.source)
            .fetch_latest(sub, self.opts.fetch_hits)
            .await?;
        self.cache.put(sub.source, &sub.external_ref, items.clone());
        Ok(items)
    }

    /// Fetch + filter for one entity with the given cap. The blog source is
    /// curated upstream, so only catalog items go through the rule chain.
    async fn filtered(&self, sub: &Subscription, cap: usize) -> Result<Vec<ContentItem>> {
        let raw = self.fetch_cached(sub).await?;
        let mut items = match sub.source {
            SourceKind::Catalog => {
                filter::filter_items(&raw, cap, self.opts.require_sample_media)
            }
            SourceKind::Blog => {
                let mut v = raw;
                v.truncate(cap);
                v
            }
        };
        items = aggregate::dedup_by_id(items);
        Ok(items)
    }

    /// Entity-scoped display strip (short, curated).
    pub async fn entity_feed(&self, sub: &Subscription) -> Result<Vec<ContentItem>> {
        self.filtered(sub, self.opts.display_cap).await
    }

    /// One full poll run over all subscriptions.
    pub async fn run(&self) -> Result<RunReport> {
        ensure_metrics_described();

        let subs = subscriptions::load(self.store.as_ref())
            .await
            .context("loading subscriptions")?;
        let ledger = Ledger::new(self.store.clone());
        let mut known: HashSet<String> = ledger
            .known_ids()
            .await
            .context("reading ledger snapshot")?;

        let mut report = RunReport::default();
        let mut batches: Vec<Vec<ContentItem>> = Vec::with_capacity(subs.len());

        for (i, sub) in subs.iter().enumerate() {
            if i > 0 && !self.opts.pace.is_zero() {
                tokio::time::sleep(self.opts.pace).await;
            }
            report.entities += 1;
            counter!("poll_entities_total").increment(1);
            tracing::debug!(entity = %sub.display_name, source = sub.source.as_str(), "fetching");

            let items = match self.filtered(sub, self.opts.notify_scan_cap).await {
                Ok(v) => v,
                Err(e) => {
                    let err = RadarError::SourceUnavailable(e);
                    tracing::warn!(entity = %sub.display_name, error = %err, "entity skipped");
                    counter!("poll_failures_total", "category" => err.category()).increment(1);
                    report.skipped_entities += 1;
                    continue;
                }
            };
            batches.push(items.clone());

            let new_items: Vec<ContentItem> = items
                .into_iter()
                .filter(|it| !known.contains(&it.id))
                .collect();
            if new_items.is_empty() {
                tracing::debug!(entity = %sub.display_name, "no new releases");
                continue;
            }

            tracing::info!(
                entity = %sub.display_name,
                count = new_items.len(),
                "new releases detected"
            );
            report.new_items += new_items.len();
            counter!("poll_new_items_total").increment(new_items.len() as u64);

            let batch = ReleaseBatch::from_items(&sub.display_name, &new_items);
            match self.sink.send(&batch).await {
                Ok(()) => {
                    report.notified_batches += 1;
                    counter!("notify_batches_total").increment(1);
                }
                Err(e) => {
                    let err = RadarError::SinkDelivery(e);
                    tracing::warn!(entity = %sub.display_name, error = %err, "notification lost");
                    counter!("poll_failures_total", "category" => err.category()).increment(1);
                    report.sink_failures += 1;
                    // Fall through: the ledger append still happens so the
                    // items are not silently dropped from the record.
                }
            }

            let entries: Vec<LedgerEntry> = new_items.iter().map(LedgerEntry::from_item).collect();
            if let Err(e) = ledger.append(&entries).await {
                let err = RadarError::LedgerWrite(e);
                tracing::warn!(entity = %sub.display_name, error = %err, "ledger append failed");
                counter!("poll_failures_total", "category" => err.category()).increment(1);
                report.ledger_failures += 1;
            }
            // In-run dedup continues from the snapshot either way; a failed
            // append means a possible duplicate next run, not this run.
            known.extend(new_items.into_iter().map(|it| it.id));
        }

        report.latest = aggregate::latest_view(&batches, self.opts.latest_cap);

        counter!("poll_runs_total").increment(1);
        gauge!("poll_last_run_ts").set(chrono::Utc::now().timestamp().max(0) as f64);
        tracing::info!(
            entities = report.entities,
            skipped = report.skipped_entities,
            new_items = report.new_items,
            notified = report.notified_batches,
            "poll run finished"
        );
        Ok(report)
    }
}
