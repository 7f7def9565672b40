// src/sources/mod.rs
pub mod blog;
pub mod catalog;

use anyhow::Result;
use time::{format_description::well_known::Rfc2822, OffsetDateTime, UtcOffset};

use crate::model::{ContentItem, SourceKind, Subscription};

/// One source of releases for a subscribed performer.
///
/// Implemented as a trait with two variants (catalog API, blog feed) so a new
/// source adds an implementation without touching the aggregator or the
/// orchestrator.
#[async_trait::async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Fetch up to `limit` items for `sub`, newest first, already normalized.
    async fn fetch_latest(&self, sub: &Subscription, limit: usize) -> Result<Vec<ContentItem>>;

    fn kind(&self) -> SourceKind;

    fn name(&self) -> &'static str;
}

/// Parse an RFC 2822 feed timestamp into unix seconds (0 on failure).
pub(crate) fn parse_rfc2822_to_unix(ts: &str) -> i64 {
    OffsetDateTime::parse(ts, &Rfc2822)
        .ok()
        .map(|dt| dt.to_offset(UtcOffset::UTC).unix_timestamp())
        .unwrap_or(0)
}

/// Normalize a feed timestamp to `YYYY-MM-DD HH:MM:SS` (UTC) so blog dates
/// compare lexicographically against catalog dates. Empty on parse failure.
pub fn normalize_feed_date(ts: &str) -> String {
    let unix = parse_rfc2822_to_unix(ts);
    if unix <= 0 {
        return String::new();
    }
    chrono::DateTime::from_timestamp(unix, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default()
}

/// Catalog dates already arrive as `YYYY-MM-DD HH:MM:SS`; just trim.
pub fn normalize_catalog_date(ts: &str) -> String {
    ts.trim().to_string()
}
